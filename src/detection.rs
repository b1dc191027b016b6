//! Detection probe state and sample accumulation.
//!
//! After a charged release the probe grows from its rest radius toward the
//! charge's target radius. Obstacles overlapping the probe each contribute a
//! unit "push-away" vector (from the contact toward the character origin),
//! accumulated into the sample that aims the launch. Each obstacle
//! contributes once per cycle.

use bevy::prelude::*;

/// Probe radius while no detection is running.
pub const PROBE_REST_RADIUS: f32 = 0.1;

/// Circular detection probe around one character.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct DetectionProbe {
    /// Current probe radius.
    pub radius: f32,
    /// Whether the probe is overlapping this tick.
    pub active: bool,
    sample: Vec2,
    seen: Vec<Entity>,
}

impl Default for DetectionProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionProbe {
    /// An inactive probe at rest radius.
    pub fn new() -> Self {
        Self {
            radius: PROBE_REST_RADIUS,
            active: false,
            sample: Vec2::ZERO,
            seen: Vec::new(),
        }
    }

    /// Begin a detection cycle.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Record an obstacle contact. The contribution is the unit vector from
    /// the contact point toward the character origin; a contact exactly at
    /// the origin contributes nothing.
    pub fn absorb(&mut self, origin: Vec2, contact: Vec2) {
        self.sample += (origin - contact).normalize_or_zero();
    }

    /// Track an entity; returns `true` the first time it is seen this cycle.
    pub fn mark_seen(&mut self, entity: Entity) -> bool {
        if self.seen.contains(&entity) {
            return false;
        }
        self.seen.push(entity);
        true
    }

    /// The accumulated push-away sample.
    pub fn sample(&self) -> Vec2 {
        self.sample
    }

    /// End the cycle: rest radius, empty sample, nothing seen.
    pub fn reset(&mut self) {
        self.radius = PROBE_REST_RADIUS;
        self.active = false;
        self.sample = Vec2::ZERO;
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_probe_is_at_rest() {
        let probe = DetectionProbe::new();
        assert!(!probe.active);
        assert_eq!(probe.radius, PROBE_REST_RADIUS);
        assert_eq!(probe.sample(), Vec2::ZERO);
    }

    #[test]
    fn absorb_accumulates_unit_push_away_vectors() {
        let mut probe = DetectionProbe::new();
        let origin = Vec2::new(0.0, 1.0);

        // Ground right below: pushes straight up.
        probe.absorb(origin, Vec2::new(0.0, 0.0));
        // Wall to the right: pushes left.
        probe.absorb(origin, Vec2::new(2.0, 1.0));

        assert!((probe.sample() - Vec2::new(-1.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn contact_at_origin_contributes_nothing() {
        let mut probe = DetectionProbe::new();
        probe.absorb(Vec2::ONE, Vec2::ONE);
        assert_eq!(probe.sample(), Vec2::ZERO);
    }

    #[test]
    fn entities_are_seen_once_per_cycle() {
        let mut probe = DetectionProbe::new();
        let entity = Entity::PLACEHOLDER;
        assert!(probe.mark_seen(entity));
        assert!(!probe.mark_seen(entity));

        probe.reset();
        assert!(probe.mark_seen(entity));
    }

    #[test]
    fn reset_restores_rest_state() {
        let mut probe = DetectionProbe::new();
        probe.activate();
        probe.radius = 1.4;
        probe.absorb(Vec2::ZERO, Vec2::X);

        probe.reset();
        assert!(!probe.active);
        assert_eq!(probe.radius, PROBE_REST_RADIUS);
        assert_eq!(probe.sample(), Vec2::ZERO);
    }
}
