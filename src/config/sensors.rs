//! Configuration for surface sensor dimensions.

use bevy::prelude::*;

/// Configuration for the shapecast sensors that feed
/// [`CharacterState`](crate::state::CharacterState).
///
/// Distances extend from the collider surface; widths/heights size the
/// segment shapes being cast, as in a capsule-shaped character.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct SensorConfig {
    /// Distance below the collider within which the character is grounded.
    pub ground_distance: f32,

    /// Width of the ground detection shapecast.
    pub ground_cast_width: f32,

    /// Distance to the sides within which a wall is detected.
    pub wall_distance: f32,

    /// Height of wall detection shapecasts.
    pub wall_cast_height: f32,

    /// Distance above the collider within which a ceiling is detected.
    pub ceiling_distance: f32,

    /// Width of the ceiling detection shapecast.
    pub ceiling_cast_width: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            ground_distance: 0.1,
            ground_cast_width: 0.8,
            wall_distance: 0.1,
            wall_cast_height: 1.2,
            ceiling_distance: 0.1,
            ceiling_cast_width: 0.8,
        }
    }
}
