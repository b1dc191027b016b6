//! Bump-reactive objects.
//!
//! Objects carrying [`BumpReactive`] get shoved away when a character's
//! detection probe reaches them: crates, loose debris, anything with a
//! dynamic body. One configurable component instead of a subclass per object
//! kind; the impulse scales inversely with mass so a single multiplier tunes
//! light and heavy objects together.

use bevy::prelude::*;

/// Marks an object as reactive to bump probes.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct BumpReactive {
    /// Base impulse multiplier; the applied impulse is
    /// `base_multiplier / mass`.
    pub base_multiplier: f32,
    /// Extra vector added to the unit push-away direction (e.g. an upward
    /// bias so crates pop rather than slide).
    pub extra: Vec2,
}

impl Default for BumpReactive {
    fn default() -> Self {
        Self {
            base_multiplier: 500.0,
            extra: Vec2::ZERO,
        }
    }
}

/// Impulse applied to a reactive object hit by a probe.
///
/// Pushes the object away from the probe origin. A zero or non-finite mass
/// yields a zero impulse; the object just doesn't move.
pub fn reactive_impulse(
    object_pos: Vec2,
    probe_origin: Vec2,
    reactive: &BumpReactive,
    mass: f32,
) -> Vec2 {
    if mass <= 0.0 || !mass.is_finite() {
        return Vec2::ZERO;
    }
    let away = (object_pos - probe_origin).normalize_or_zero();
    (away + reactive.extra) * (reactive.base_multiplier / mass)
}
