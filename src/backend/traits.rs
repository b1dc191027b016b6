//! Physics backend abstraction.
//!
//! The abilities never talk to a physics engine directly; they go through
//! this trait so backends can be swapped (Avian2D ships behind the `avian2d`
//! feature, others can be added the same way).

use bevy::prelude::*;

/// Trait for physics backend implementations.
///
/// The backend covers the primitives the backend-generic systems need:
/// velocity access for impulse application, the fixed timestep for
/// passthrough timers, and collision groups for platform passthrough.
/// Everything else (sensing, probe overlap, mass scaling) lives in the
/// backend's own plugin systems.
pub trait BumpPhysicsBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend's systems (sensors,
    /// probe overlap, cling damping).
    fn plugin() -> impl Plugin;

    /// Get the current velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec2;

    /// Set the velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2);

    /// Get the fixed timestep delta time.
    fn get_fixed_timestep(world: &World) -> f32;

    /// Get the collision groups for an entity (memberships, filters).
    /// Returns None if the entity doesn't have collision groups.
    fn get_collision_groups(_world: &World, _entity: Entity) -> Option<(u32, u32)> {
        None
    }

    /// Set the collision groups for an entity. Used to open a passthrough
    /// window through one-way and moving platforms. No-op by default.
    fn set_collision_groups(_world: &mut World, _entity: Entity, _memberships: u32, _filters: u32) {
    }
}
