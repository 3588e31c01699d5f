//! Lane registry: one fixed target zone per instrument plus its feedback state.

use glam::Vec2;
use handbeats_core::{Activation, Instrument, LaneSnapshot, ZoneLayout, ZoneRect};

/// State of a single lane stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Lane {
    pub(crate) instrument: Instrument,
    pub(crate) zone: ZoneRect,
    pub(crate) spawn_point: Vec2,
    activation: Activation,
    activation_expiry_ms: u64,
}

impl Lane {
    fn new(instrument: Instrument, zone: ZoneRect, spawn_y: f32) -> Self {
        Self {
            instrument,
            zone,
            spawn_point: Vec2::new(zone.center().x, spawn_y),
            activation: Activation::Idle,
            activation_expiry_ms: 0,
        }
    }

    /// Activation after decay, recomputed from the stored expiry on every read.
    pub(crate) fn current_activation(&self, now_ms: u64) -> Activation {
        if now_ms > self.activation_expiry_ms {
            Activation::Idle
        } else {
            self.activation
        }
    }

    /// Stores a new activation. Returns `false` when a live hit or miss flash
    /// suppressed a glow request.
    fn set_activation(&mut self, activation: Activation, now_ms: u64) -> bool {
        let flashing = matches!(
            self.current_activation(now_ms),
            Activation::Hit | Activation::Miss
        );
        if activation == Activation::Glowing && flashing {
            return false;
        }

        self.activation = activation;
        self.activation_expiry_ms = now_ms.saturating_add(activation.hold_ms());
        true
    }

    pub(crate) fn snapshot(&self, now_ms: u64) -> LaneSnapshot {
        LaneSnapshot {
            instrument: self.instrument,
            zone: self.zone,
            activation: self.current_activation(now_ms),
        }
    }
}

/// Lanes created once at session start from a validated layout.
#[derive(Clone, Debug)]
pub(crate) struct LaneSet {
    lanes: Vec<Lane>,
}

impl LaneSet {
    pub(crate) fn from_layout(layout: &ZoneLayout) -> Self {
        let lanes = layout
            .zones
            .iter()
            .map(|lane| Lane::new(lane.instrument, lane.zone, layout.spawn_y))
            .collect();
        Self { lanes }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter()
    }

    pub(crate) fn get(&self, instrument: Instrument) -> Option<&Lane> {
        self.lanes.iter().find(|lane| lane.instrument == instrument)
    }

    pub(crate) fn zone_for(&self, instrument: Instrument) -> Option<ZoneRect> {
        self.get(instrument).map(|lane| lane.zone)
    }

    pub(crate) fn set_activation(
        &mut self,
        instrument: Instrument,
        activation: Activation,
        now_ms: u64,
    ) -> bool {
        self.lanes
            .iter_mut()
            .find(|lane| lane.instrument == instrument)
            .map_or(false, |lane| lane.set_activation(activation, now_ms))
    }

    pub(crate) fn current_activation(&self, instrument: Instrument, now_ms: u64) -> Activation {
        self.get(instrument)
            .map_or(Activation::Idle, |lane| lane.current_activation(now_ms))
    }
}
