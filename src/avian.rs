//! Avian2D physics backend implementation.
//!
//! This module provides the physics backend for Avian2D (bevy_avian2d).
//! Enable with the `avian2d` feature.

use avian2d::prelude::*;
use bevy::log::warn_once;
use bevy::prelude::*;

use crate::backend::BumpPhysicsBackend;
use crate::charge::BumpCharge;
use crate::config::AbilityConfig;
use crate::detection::DetectionProbe;
use crate::interact::{reactive_impulse, BumpReactive};
use crate::state::{
    CharacterState, MovingOneWayPlatform, MovingPlatform, OneWayPlatform, Stairs, Surface,
    SurfaceFlags,
};
use crate::systems::{ImpulseKind, ImpulseRequested};
use crate::wall::WallState;
use crate::BumpAbilitySet;

/// Avian2D physics backend for the bump abilities.
///
/// Velocity and collision-layer access go through Avian's components;
/// surface and probe detection are dedicated Avian systems using
/// `SpatialQuery` as a system parameter.
pub struct Avian2dBackend;

impl BumpPhysicsBackend for Avian2dBackend {
    fn plugin() -> impl Plugin {
        Avian2dBackendPlugin
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<LinearVelocity>(entity)
            .map(|v| v.0)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut vel) = world.get_mut::<LinearVelocity>(entity) {
            vel.0 = velocity;
        }
    }

    fn get_fixed_timestep(world: &World) -> f32 {
        world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.delta_secs())
            .filter(|&d| d > 0.0)
            .unwrap_or(1.0 / 60.0)
    }

    fn get_collision_groups(world: &World, entity: Entity) -> Option<(u32, u32)> {
        world
            .get::<CollisionLayers>(entity)
            .map(|cl| (cl.memberships.0, cl.filters.0))
    }

    fn set_collision_groups(world: &mut World, entity: Entity, memberships: u32, filters: u32) {
        if let Some(mut layers) = world.get_mut::<CollisionLayers>(entity) {
            layers.memberships = LayerMask(memberships);
            layers.filters = LayerMask(filters);
        }
    }
}

/// Plugin that sets up Avian2D-specific systems for the bump abilities.
pub struct Avian2dBackendPlugin;

impl Plugin for Avian2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            avian_surface_sensors.in_set(BumpAbilitySet::Sensors),
        );
        app.add_systems(
            FixedUpdate,
            avian_probe_overlap
                .after(crate::systems::grow_probe)
                .in_set(BumpAbilitySet::Probe),
        );
        app.add_systems(
            FixedUpdate,
            avian_wall_cling_damping.in_set(BumpAbilitySet::Application),
        );
    }
}

/// Get the distance from collider center to bottom for a given collider.
/// For capsules, this is half_height + radius.
fn collider_bottom_offset(collider: &Collider) -> f32 {
    if let Some(capsule) = collider.shape_scaled().as_capsule() {
        let segment = capsule.segment;
        let half_height = (segment.a.y - segment.b.y).abs() / 2.0;
        half_height + capsule.radius
    } else if let Some(ball) = collider.shape_scaled().as_ball() {
        ball.radius
    } else if let Some(cuboid) = collider.shape_scaled().as_cuboid() {
        cuboid.half_extents.y
    } else {
        0.0
    }
}

/// Get the half width of a collider (capsule/ball radius, cuboid half extent).
fn collider_half_width(collider: &Collider) -> f32 {
    if let Some(capsule) = collider.shape_scaled().as_capsule() {
        capsule.radius
    } else if let Some(ball) = collider.shape_scaled().as_ball() {
        ball.radius
    } else if let Some(cuboid) = collider.shape_scaled().as_cuboid() {
        cuboid.half_extents.x
    } else {
        0.0
    }
}

/// Build the spatial query filter for a character's casts: respect its
/// collision layers and never hit itself.
fn sensor_filter(entity: Entity, layers: Option<&CollisionLayers>) -> SpatialQueryFilter {
    if let Some(layers) = layers {
        // Use the character's filters as the mask - this finds entities whose
        // memberships overlap with what the character is allowed to collide with
        SpatialQueryFilter::from_mask(layers.filters).with_excluded_entities([entity])
    } else {
        SpatialQueryFilter::default().with_excluded_entities([entity])
    }
}

fn classify_surface(
    q_markers: &Query<(
        Has<OneWayPlatform>,
        Has<MovingPlatform>,
        Has<MovingOneWayPlatform>,
        Has<Stairs>,
    )>,
    entity: Entity,
) -> SurfaceFlags {
    let (one_way, moving, moving_one_way, stairs) =
        q_markers.get(entity).unwrap_or((false, false, false, false));
    SurfaceFlags {
        one_way,
        moving,
        moving_one_way,
        stairs,
    }
}

/// Surface sensors: ground (with surface classification), walls, ceiling,
/// vertical speed and gravity, refreshed into [`CharacterState`] every tick.
fn avian_surface_sensors(
    spatial_query: SpatialQuery,
    gravity: Res<Gravity>,
    mut q_characters: Query<(
        Entity,
        &GlobalTransform,
        &AbilityConfig,
        &mut CharacterState,
        Option<&Collider>,
        Option<&CollisionLayers>,
        Option<&LinearVelocity>,
    )>,
    q_markers: Query<(
        Has<OneWayPlatform>,
        Has<MovingPlatform>,
        Has<MovingOneWayPlatform>,
        Has<Stairs>,
    )>,
) {
    for (entity, transform, config, mut state, collider, layers, velocity) in &mut q_characters {
        let Some(collider) = collider else {
            warn_once!("bump character {entity} has no collider, surface sensors disabled");
            continue;
        };

        let position = transform.translation().xy();
        let bottom = collider_bottom_offset(collider);
        let half_width = collider_half_width(collider);
        let sensors = &config.sensors;
        let filter = sensor_filter(entity, layers);

        state.vertical_speed = velocity.map(|v| v.y).unwrap_or(0.0);
        state.gravity = gravity.0.y;
        state.grounded = false;
        state.wall_left = false;
        state.wall_right = false;
        state.ceiling = false;
        state.standing_on.clear();

        // Ground: collect every surface within grounding distance, nearest
        // first, so stacked platforms all end up in the surface list.
        let half = sensors.ground_cast_width / 2.0;
        let ground_shape = Collider::segment(Vec2::new(-half, 0.0), Vec2::new(half, 0.0));
        let ground_config = ShapeCastConfig::from_max_distance(bottom + sensors.ground_distance);
        let hits = spatial_query.shape_hits(
            &ground_shape,
            position,
            0.0,
            Dir2::NEG_Y,
            4,
            &ground_config,
            &filter,
        );
        for hit in hits {
            state.grounded = true;
            state.standing_on.push(Surface {
                entity: hit.entity,
                flags: classify_surface(&q_markers, hit.entity),
            });
        }

        // Walls.
        let half = sensors.wall_cast_height / 2.0;
        let wall_shape = Collider::segment(Vec2::new(0.0, -half), Vec2::new(0.0, half));
        let wall_config = ShapeCastConfig::from_max_distance(half_width + sensors.wall_distance);
        state.wall_left = spatial_query
            .cast_shape(&wall_shape, position, 0.0, Dir2::NEG_X, &wall_config, &filter)
            .is_some();
        state.wall_right = spatial_query
            .cast_shape(&wall_shape, position, 0.0, Dir2::X, &wall_config, &filter)
            .is_some();

        // Ceiling.
        let half = sensors.ceiling_cast_width / 2.0;
        let ceiling_shape = Collider::segment(Vec2::new(-half, 0.0), Vec2::new(half, 0.0));
        let ceiling_config =
            ShapeCastConfig::from_max_distance(bottom + sensors.ceiling_distance);
        state.ceiling = spatial_query
            .cast_shape(&ceiling_shape, position, 0.0, Dir2::Y, &ceiling_config, &filter)
            .is_some();
    }
}

/// Probe overlap: collect push-away contributions from everything inside the
/// growing probe, and shove reactive objects on first contact.
fn avian_probe_overlap(
    spatial_query: SpatialQuery,
    mut q_characters: Query<(
        Entity,
        &GlobalTransform,
        &BumpCharge,
        &mut DetectionProbe,
        Option<&CollisionLayers>,
    )>,
    q_obstacles: Query<&GlobalTransform>,
    q_reactive: Query<(&BumpReactive, Option<&ComputedMass>)>,
    mut impulses: MessageWriter<ImpulseRequested>,
) {
    for (entity, transform, charge, mut probe, layers) in &mut q_characters {
        if !charge.is_detecting() || !probe.active {
            continue;
        }

        let origin = transform.translation().xy();
        let shape = Collider::circle(probe.radius);
        let filter = sensor_filter(entity, layers);

        for obstacle in spatial_query.shape_intersections(&shape, origin, 0.0, &filter) {
            if !probe.mark_seen(obstacle) {
                continue;
            }

            let Ok(obstacle_transform) = q_obstacles.get(obstacle) else {
                continue;
            };
            let contact = obstacle_transform.translation().xy();
            probe.absorb(origin, contact);

            if let Ok((reactive, mass)) = q_reactive.get(obstacle) {
                let mass = mass.map(|m| m.value()).unwrap_or(0.0);
                if mass <= 0.0 || !mass.is_finite() {
                    warn_once!("bump-reactive object {obstacle} has no usable mass");
                    continue;
                }
                let impulse = reactive_impulse(contact, origin, reactive, mass);
                if impulse != Vec2::ZERO {
                    impulses.write(ImpulseRequested {
                        entity: obstacle,
                        kind: ImpulseKind::Nudge(impulse),
                    });
                }
            }
        }
    }
}

/// Slow the fall while clinging by cancelling most of gravity's pull.
fn avian_wall_cling_damping(
    time: Res<Time>,
    gravity: Res<Gravity>,
    mut q_characters: Query<(
        &CharacterState,
        &WallState,
        &AbilityConfig,
        &mut LinearVelocity,
    )>,
) {
    for (_state, wall, config, mut velocity) in &mut q_characters {
        if wall.clinging && velocity.y < 0.0 {
            let counter =
                gravity.0.y.abs() * time.delta_secs() * (1.0 - config.wall_cling.slow_factor);
            velocity.y = (velocity.y + counter).min(0.0);
        }
    }
}
