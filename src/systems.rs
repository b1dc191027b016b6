//! Backend-generic ability systems.
//!
//! Everything here runs in `FixedUpdate`, phased by
//! [`BumpAbilitySet`](crate::BumpAbilitySet). Physics access goes through
//! the backend trait in the two exclusive systems at the bottom; the rest
//! only touches this crate's components.

use bevy::prelude::*;

use crate::authorization::{bump_authorized, evaluate_bump, wall_jump_allowed, BumpVerdict};
use crate::backend::BumpPhysicsBackend;
use crate::charge::{BumpCharge, ProbeStep, ReleaseOutcome};
use crate::config::{AbilityConfig, ForceMode};
use crate::detection::DetectionProbe;
use crate::intent::AbilityIntent;
use crate::state::{CharacterState, ConditionMode, MovementMode};
use crate::wall::{should_cling, wall_jump_impulse, WallState};

// ==================== Messages ====================

/// A charged bump committed and launched the character.
#[derive(Message, Debug, Clone)]
pub struct BumpCommitted {
    /// The character that bumped.
    pub entity: Entity,
    /// The applied launch vector.
    pub impulse: Vec2,
}

/// A wall jump fired.
#[derive(Message, Debug, Clone)]
pub struct WallJumped {
    /// The character that jumped.
    pub entity: Entity,
    /// The applied launch vector.
    pub impulse: Vec2,
}

/// The character started dropping through a one-way platform stack.
#[derive(Message, Debug, Clone)]
pub struct PlatformDropStarted {
    /// The dropping character.
    pub entity: Entity,
    /// How long collisions with the stack stay disabled.
    pub duration: f32,
}

/// The character detached from a moving platform while bumping off it.
#[derive(Message, Debug, Clone)]
pub struct PlatformDetached {
    /// The detaching character.
    pub entity: Entity,
    /// How long collisions with the platform stay disabled.
    pub duration: f32,
}

/// Internal: a tap release waiting for its alternate action.
#[derive(Message, Debug, Clone)]
pub(crate) struct TapActionRequested {
    pub entity: Entity,
}

/// Internal: velocity change to apply through the backend.
#[derive(Message, Debug, Clone)]
pub(crate) struct ImpulseRequested {
    pub entity: Entity,
    pub kind: ImpulseKind,
}

/// How a requested impulse combines with the current velocity.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ImpulseKind {
    /// Bump launch: horizontal adds; vertical replaces when meaningfully
    /// upward (>= 0.1), adds otherwise.
    Bump(Vec2),
    /// Replace the vertical speed (tap jump, cling entry reset).
    SetVertical(f32),
    /// Wall jump, additive or replacing per config.
    WallJump { velocity: Vec2, additive: bool },
    /// Direct velocity delta (reactive objects; already mass-scaled).
    Nudge(Vec2),
}

/// Internal: open a collision passthrough window through the given surfaces.
#[derive(Message, Debug, Clone)]
pub(crate) struct PassthroughRequested {
    pub entity: Entity,
    pub surfaces: Vec<Entity>,
    pub duration: f32,
    pub kind: PassthroughKind,
}

/// Why collisions are currently disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassthroughKind {
    /// Dropping down through a one-way stack.
    Drop,
    /// Detaching from a moving platform mid-bump.
    Detach,
}

/// Active collision passthrough window on a character.
#[derive(Component, Debug, Clone)]
pub struct PlatformPassthrough {
    /// Why the window is open.
    pub kind: PassthroughKind,
    remaining: f32,
    restore: Option<(u32, u32)>,
}

// ==================== Bump budget ====================

/// Remaining bumps before the character has to land.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
pub struct BumpBudget {
    /// Bumps left.
    pub left: u32,
}

impl Default for BumpBudget {
    fn default() -> Self {
        Self { left: 2 }
    }
}

impl BumpBudget {
    /// Spend one bump.
    pub fn spend(&mut self) {
        self.left = self.left.saturating_sub(1);
    }

    /// Restore the full budget.
    pub fn refill(&mut self, bumps: u32) {
        self.left = bumps;
    }
}

// ==================== Preparation ====================

/// Clear one-shot flags and re-arm per-tick guards.
pub(crate) fn begin_ability_tick(
    mut q_characters: Query<(&mut BumpCharge, &mut CharacterState)>,
) {
    for (mut charge, mut state) in &mut q_characters {
        charge.begin_tick();
        state.just_bumped = false;
        state.just_landed = false;
    }
}

// ==================== Input ====================

/// Landing edge: refill budgets and flag the landing.
pub(crate) fn handle_landing(
    mut q_characters: Query<(
        &mut CharacterState,
        &mut WallState,
        &mut BumpBudget,
        &AbilityConfig,
    )>,
) {
    for (mut state, mut wall, mut budget, config) in &mut q_characters {
        if state.grounded && !state.was_grounded {
            state.just_landed = true;
        }
        if state.grounded {
            budget.refill(config.bump.bumps);
            wall.refill(config.wall_jump.max_wall_jumps);
        }
    }
}

/// Enter, hold, or leave the wall cling.
pub(crate) fn update_wall_cling(
    mut q_characters: Query<(
        Entity,
        &mut CharacterState,
        &mut WallState,
        &AbilityIntent,
        &AbilityConfig,
    )>,
    mut impulses: MessageWriter<ImpulseRequested>,
) {
    for (entity, mut state, mut wall, intent, config) in &mut q_characters {
        if wall.clinging {
            let wall_present = if wall.facing_right_while_clinging {
                state.wall_right
            } else {
                state.wall_left
            };
            let input_away = if config.wall_cling.input_independent {
                false
            } else if wall.facing_right_while_clinging {
                intent.horizontal() <= crate::authorization::INPUT_THRESHOLD
            } else {
                intent.horizontal() >= -crate::authorization::INPUT_THRESHOLD
            };

            if state.grounded || state.vertical_speed > 0.0 || !wall_present || input_away {
                wall.clinging = false;
                if state.is_clinging() {
                    state.movement = MovementMode::Idle;
                }
            } else {
                // Still clinging; the latch only matters after leaving.
                wall.has_wall_jumped = false;
            }
        } else if state.condition == ConditionMode::Normal
            && should_cling(&config.wall_cling, &state, intent.horizontal())
        {
            wall.clinging = true;
            wall.facing_right_while_clinging = if config.wall_cling.input_independent {
                state.facing_right
            } else {
                intent.horizontal() > 0.0
            };
            state.facing_right = wall.facing_right_while_clinging;
            if state.movement != MovementMode::WallShrinking {
                state.movement = MovementMode::WallClinging;
            }
            if config.wall_cling.reset_vertical_speed_on_entry {
                impulses.write(ImpulseRequested {
                    entity,
                    kind: ImpulseKind::SetVertical(0.0),
                });
            }
        }
    }
}

/// Accumulate charge while the button is held; map the release to a tap or
/// a detection cycle.
pub(crate) fn handle_charge_input(
    time: Res<Time>,
    mut q_characters: Query<(
        Entity,
        &mut BumpCharge,
        &mut CharacterState,
        &WallState,
        &BumpBudget,
        &AbilityIntent,
        &AbilityConfig,
    )>,
    mut taps: MessageWriter<TapActionRequested>,
) {
    let dt = time.delta_secs();

    for (entity, mut charge, mut state, wall, budget, intent, config) in &mut q_characters {
        if intent.bump_held() {
            charge.hold(dt);
            if charge.is_charging() {
                state.movement = if wall.clinging {
                    MovementMode::WallShrinking
                } else {
                    MovementMode::Shrinking
                };
                if bump_authorized(
                    config.bump.restriction,
                    &state,
                    budget.left,
                    config.bump.bumps,
                ) {
                    state.speed_override = Some(config.bump.shrink_speed);
                }
            }
        }

        if intent.bump_released() {
            state.speed_override = None;

            match charge.release(&config.bump) {
                Some(ReleaseOutcome::Tap) => {
                    taps.write(TapActionRequested { entity });
                }
                Some(ReleaseOutcome::Charged { .. }) | None => {}
            }

            match state.movement {
                MovementMode::Shrinking => state.movement = MovementMode::Idle,
                MovementMode::WallShrinking => state.movement = MovementMode::WallClinging,
                _ => {}
            }
        }
    }
}

// ==================== Probe ====================

/// Grow the detection probe toward the charge's target radius.
pub(crate) fn grow_probe(
    mut q_characters: Query<(&BumpCharge, &mut DetectionProbe, &AbilityConfig)>,
) {
    for (charge, mut probe, config) in &mut q_characters {
        if !charge.is_detecting() {
            continue;
        }
        probe.activate();
        if let ProbeStep::Growing(next) = charge.probe_step(probe.radius, config.bump.probe_lerp)
        {
            probe.radius = next;
        }
    }
}

// ==================== Resolution ====================

/// Fire the alternate action for tap releases: a wall jump while clinging,
/// a plain jump on the ground, nothing in the air.
pub(crate) fn resolve_tap_actions(
    mut taps: MessageReader<TapActionRequested>,
    mut q_characters: Query<(
        &mut CharacterState,
        &mut WallState,
        &AbilityConfig,
    )>,
    mut impulses: MessageWriter<ImpulseRequested>,
    mut wall_jumps: MessageWriter<WallJumped>,
) {
    for tap in taps.read() {
        let Ok((mut state, mut wall, config)) = q_characters.get_mut(tap.entity) else {
            continue;
        };

        if state.condition != ConditionMode::Normal {
            continue;
        }

        if wall.clinging || state.is_clinging() {
            if !wall_jump_allowed(&state, &wall, config.wall_jump.limited) {
                continue;
            }

            let velocity = wall_jump_impulse(
                wall.facing_right_while_clinging,
                config.wall_jump.force,
                state.gravity,
            );
            impulses.write(ImpulseRequested {
                entity: tap.entity,
                kind: ImpulseKind::WallJump {
                    velocity,
                    additive: config.wall_jump.force_mode == ForceMode::Add,
                },
            });

            state.movement = MovementMode::WallJumping;
            wall.clinging = false;
            wall.has_wall_jumped = true;
            if config.wall_jump.limited {
                wall.wall_jumps_left = wall.wall_jumps_left.saturating_sub(1);
            }
            if config.wall_jump.flip_towards_direction {
                state.facing_right = velocity.x > 0.0;
            }
            wall_jumps.write(WallJumped {
                entity: tap.entity,
                impulse: velocity,
            });
        } else if state.grounded {
            impulses.write(ImpulseRequested {
                entity: tap.entity,
                kind: ImpulseKind::SetVertical(config.bump.tap_jump_speed),
            });
            state.movement = MovementMode::Jumping;
        }
    }
}

/// Commit charged bumps whose probe reached its target radius.
pub(crate) fn commit_bumps(
    mut q_characters: Query<(
        Entity,
        &mut BumpCharge,
        &mut DetectionProbe,
        &mut CharacterState,
        &mut BumpBudget,
        &AbilityIntent,
        &AbilityConfig,
        Option<&PlatformPassthrough>,
    )>,
    mut impulses: MessageWriter<ImpulseRequested>,
    mut commits: MessageWriter<BumpCommitted>,
    mut passthroughs: MessageWriter<PassthroughRequested>,
    mut drops: MessageWriter<PlatformDropStarted>,
    mut detaches: MessageWriter<PlatformDetached>,
) {
    for (entity, mut charge, mut probe, mut state, mut budget, intent, config, passthrough) in
        &mut q_characters
    {
        if !charge.is_detecting()
            || charge.probe_step(probe.radius, config.bump.probe_lerp) != ProbeStep::Ready
        {
            continue;
        }

        let dropping_through =
            passthrough.is_some_and(|p| p.kind == PassthroughKind::Drop);
        let verdict = evaluate_bump(
            &config.bump,
            &state,
            budget.left,
            intent.pressing_down(),
            dropping_through,
        );

        match verdict {
            BumpVerdict::Denied => {
                charge.commit(Vec2::ZERO, false);
                probe.reset();
            }
            BumpVerdict::DropThrough => {
                charge.reset();
                probe.reset();
                state.movement = MovementMode::Jumping;
                state.speed_override = None;
                let surfaces = state.standing_on.iter().map(|s| s.entity).collect();
                passthroughs.write(PassthroughRequested {
                    entity,
                    surfaces,
                    duration: config.bump.one_way_passthrough_duration,
                    kind: PassthroughKind::Drop,
                });
                drops.write(PlatformDropStarted {
                    entity,
                    duration: config.bump.one_way_passthrough_duration,
                });
            }
            BumpVerdict::Approved { detach } => {
                let sample = probe.sample();
                probe.reset();
                let Some(impulse) = charge.commit(sample, true) else {
                    continue;
                };

                if detach {
                    let surfaces = state
                        .standing_on
                        .iter()
                        .filter(|s| s.flags.detaches())
                        .map(|s| s.entity)
                        .collect();
                    passthroughs.write(PassthroughRequested {
                        entity,
                        surfaces,
                        duration: config.bump.moving_platform_detach_duration,
                        kind: PassthroughKind::Detach,
                    });
                    detaches.write(PlatformDetached {
                        entity,
                        duration: config.bump.moving_platform_detach_duration,
                    });
                }

                impulses.write(ImpulseRequested {
                    entity,
                    kind: ImpulseKind::Bump(impulse),
                });
                budget.spend();
                state.just_bumped = true;
                commits.write(BumpCommitted { entity, impulse });
            }
        }
    }
}

// ==================== Application ====================

/// Refresh the presentation signals.
pub(crate) fn update_animation(
    mut q_characters: Query<(
        &BumpCharge,
        &CharacterState,
        &mut crate::animation::AbilityAnimation,
    )>,
) {
    for (charge, state, mut animation) in &mut q_characters {
        animation.shrinking = state.movement == MovementMode::Shrinking;
        animation.wall_shrinking = state.movement == MovementMode::WallShrinking;
        animation.wall_clinging = state.is_clinging();
        animation.charge_time = charge.held_time();
        animation.bumped = state.just_bumped;
        animation.just_landed = state.just_landed;
    }
}

/// Close out the tick: edge bookkeeping.
pub(crate) fn finish_ability_tick(
    mut q_characters: Query<(&mut AbilityIntent, &mut CharacterState)>,
) {
    for (mut intent, mut state) in &mut q_characters {
        intent.finish_tick();
        state.was_grounded = state.grounded;
    }
}

/// Apply requested velocity changes through the backend.
pub(crate) fn apply_requested_impulses<B: BumpPhysicsBackend>(world: &mut World) {
    let requests: Vec<ImpulseRequested> = world
        .resource_mut::<Messages<ImpulseRequested>>()
        .drain()
        .collect();

    for request in requests {
        let mut velocity = B::get_velocity(world, request.entity);
        match request.kind {
            ImpulseKind::Bump(v) => {
                velocity.x += v.x;
                if v.y >= 0.1 {
                    velocity.y = v.y;
                } else {
                    velocity.y += v.y;
                }
            }
            ImpulseKind::SetVertical(y) => velocity.y = y,
            ImpulseKind::WallJump {
                velocity: v,
                additive,
            } => {
                if additive {
                    velocity += v;
                } else {
                    velocity = v;
                }
            }
            ImpulseKind::Nudge(v) => velocity += v,
        }
        B::set_velocity(world, request.entity, velocity);
    }
}

/// Open, tick, and close collision passthrough windows.
pub(crate) fn manage_passthrough<B: BumpPhysicsBackend>(world: &mut World) {
    let dt = B::get_fixed_timestep(world);

    // Open new windows.
    let requests: Vec<PassthroughRequested> = world
        .resource_mut::<Messages<PassthroughRequested>>()
        .drain()
        .collect();
    for request in requests {
        let current = B::get_collision_groups(world, request.entity);
        let existing = world.get::<PlatformPassthrough>(request.entity).cloned();

        if let Some((memberships, filters)) = current {
            let mut mask = 0u32;
            for surface in &request.surfaces {
                if let Some((surface_memberships, _)) = B::get_collision_groups(world, *surface) {
                    mask |= surface_memberships;
                }
            }
            B::set_collision_groups(world, request.entity, memberships, filters & !mask);
        }

        // A window opened on top of an active one must keep the original
        // snapshot; the current filters are already stripped.
        let (restore, remaining, kind) = match existing {
            Some(window) => (
                window.restore,
                window.remaining.max(request.duration),
                if window.kind == PassthroughKind::Drop || request.kind == PassthroughKind::Drop {
                    PassthroughKind::Drop
                } else {
                    PassthroughKind::Detach
                },
            ),
            None => (current, request.duration, request.kind),
        };

        if let Ok(mut entity) = world.get_entity_mut(request.entity) {
            entity.insert(PlatformPassthrough {
                kind,
                remaining,
                restore,
            });
        }
    }

    // Tick and close expired windows.
    let mut expired = Vec::new();
    let mut q_windows = world.query::<(Entity, &mut PlatformPassthrough)>();
    for (entity, mut window) in q_windows.iter_mut(world) {
        window.remaining -= dt;
        if window.remaining <= 0.0 {
            expired.push((entity, window.restore));
        }
    }
    for (entity, restore) in expired {
        if let Some((memberships, filters)) = restore {
            B::set_collision_groups(world, entity, memberships, filters);
        }
        if let Ok(mut entity) = world.get_entity_mut(entity) {
            entity.remove::<PlatformPassthrough>();
        }
    }
}

// ==================== Passthrough Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NoOpBackendPlugin;

    #[derive(Component)]
    struct Groups {
        memberships: u32,
        filters: u32,
    }

    struct GroupBackend;

    impl BumpPhysicsBackend for GroupBackend {
        fn plugin() -> impl Plugin {
            NoOpBackendPlugin
        }

        fn get_velocity(_world: &World, _entity: Entity) -> Vec2 {
            Vec2::ZERO
        }

        fn set_velocity(_world: &mut World, _entity: Entity, _velocity: Vec2) {}

        fn get_fixed_timestep(_world: &World) -> f32 {
            1.0 / 60.0
        }

        fn get_collision_groups(world: &World, entity: Entity) -> Option<(u32, u32)> {
            world
                .get::<Groups>(entity)
                .map(|groups| (groups.memberships, groups.filters))
        }

        fn set_collision_groups(world: &mut World, entity: Entity, memberships: u32, filters: u32) {
            if let Some(mut groups) = world.get_mut::<Groups>(entity) {
                groups.memberships = memberships;
                groups.filters = filters;
            }
        }
    }

    fn request(
        world: &mut World,
        entity: Entity,
        surfaces: Vec<Entity>,
        duration: f32,
        kind: PassthroughKind,
    ) {
        world
            .resource_mut::<Messages<PassthroughRequested>>()
            .write(PassthroughRequested {
                entity,
                surfaces,
                duration,
                kind,
            });
    }

    fn filters_of(world: &World, entity: Entity) -> u32 {
        world.get::<Groups>(entity).unwrap().filters
    }

    #[test]
    fn passthrough_window_strips_and_restores_filters() {
        let mut world = World::new();
        world.init_resource::<Messages<PassthroughRequested>>();

        let platform = world
            .spawn(Groups {
                memberships: 0b010,
                filters: 0b111,
            })
            .id();
        let character = world
            .spawn(Groups {
                memberships: 0b001,
                filters: 0b111,
            })
            .id();

        request(&mut world, character, vec![platform], 0.05, PassthroughKind::Drop);
        manage_passthrough::<GroupBackend>(&mut world);
        assert_eq!(filters_of(&world, character), 0b101);
        assert!(world.get::<PlatformPassthrough>(character).is_some());

        for _ in 0..5 {
            manage_passthrough::<GroupBackend>(&mut world);
        }
        assert_eq!(filters_of(&world, character), 0b111);
        assert!(world.get::<PlatformPassthrough>(character).is_none());
    }

    #[test]
    fn overlapping_windows_restore_the_original_filters() {
        let mut world = World::new();
        world.init_resource::<Messages<PassthroughRequested>>();

        let one_way = world
            .spawn(Groups {
                memberships: 0b010,
                filters: 0b111,
            })
            .id();
        let moving = world
            .spawn(Groups {
                memberships: 0b100,
                filters: 0b111,
            })
            .id();
        let character = world
            .spawn(Groups {
                memberships: 0b001,
                filters: 0b111,
            })
            .id();

        request(&mut world, character, vec![one_way], 0.3, PassthroughKind::Drop);
        manage_passthrough::<GroupBackend>(&mut world);
        assert_eq!(filters_of(&world, character), 0b101);

        // A second window opens while the first is still active; the
        // original snapshot must survive it.
        request(&mut world, character, vec![moving], 0.05, PassthroughKind::Detach);
        manage_passthrough::<GroupBackend>(&mut world);
        assert_eq!(filters_of(&world, character), 0b001);

        let window = world.get::<PlatformPassthrough>(character).unwrap();
        assert_eq!(window.kind, PassthroughKind::Drop);

        for _ in 0..30 {
            manage_passthrough::<GroupBackend>(&mut world);
        }
        assert!(world.get::<PlatformPassthrough>(character).is_none());
        assert_eq!(filters_of(&world, character), 0b111);
        assert_eq!(world.get::<Groups>(character).unwrap().memberships, 0b001);
    }
}
