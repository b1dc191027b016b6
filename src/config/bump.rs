//! Configuration for the charged bump ability.

use bevy::prelude::*;

use crate::authorization::BumpRestriction;

/// Configuration for the charged bump ability.
///
/// The mapping degenerates if `hold_time_min >= hold_time_max` or
/// `force_min >= force_max`; the charge logic clamps and guards the
/// divide-by-zero case (a zero-width window counts as a full charge).
#[derive(Reflect, Debug, Clone, Copy)]
pub struct BumpConfig {
    /// Where bumping is allowed.
    pub restriction: BumpRestriction,

    /// Bump budget before the character has to land again.
    pub bumps: u32,

    /// Movement speed override while charging (the "shrink" crawl).
    pub shrink_speed: f32,

    /// Whether down + bump drops through one-way platforms.
    pub can_drop_through_one_way: bool,

    /// Minimum launch force (at minimum charge).
    pub force_min: f32,

    /// Maximum launch force (at full charge).
    pub force_max: f32,

    /// Hold duration (seconds) below which a release is a tap.
    pub hold_time_min: f32,

    /// Hold duration (seconds) at which the charge saturates.
    pub hold_time_max: f32,

    /// Detection probe radius at minimum charge.
    pub radius_min: f32,

    /// Detection probe radius at full charge.
    pub radius_max: f32,

    /// Per-tick lerp factor for probe radius growth (0.0-1.0).
    pub probe_lerp: f32,

    /// Vertical launch speed of the tap-release plain jump.
    pub tap_jump_speed: f32,

    /// Duration (seconds) collisions with one-way platforms stay disabled
    /// when dropping through one.
    pub one_way_passthrough_duration: f32,

    /// Duration (seconds) collisions with a moving platform stay disabled
    /// when bumping off of one.
    pub moving_platform_detach_duration: f32,
}

impl Default for BumpConfig {
    fn default() -> Self {
        Self {
            restriction: BumpRestriction::Anywhere,
            bumps: 2,
            shrink_speed: 1.0,
            can_drop_through_one_way: true,
            force_min: 8.0,
            force_max: 20.0,
            hold_time_min: 0.2,
            hold_time_max: 0.7,
            radius_min: 0.7,
            radius_max: 1.5,
            probe_lerp: 0.5,
            tap_jump_speed: 12.0,
            one_way_passthrough_duration: 0.3,
            moving_platform_detach_duration: 0.05,
        }
    }
}
