//! Mirrored host-controller state consumed by the authorization rules.
//!
//! The abilities do not own movement or collision; they read a per-character
//! snapshot of the host state, refreshed by the backend's sensor systems
//! every fixed tick. Game code (or another controller crate) is free to
//! write the fields the sensors don't cover.

use bevy::prelude::*;

/// Marker for platforms that can be passed through from below and dropped
/// through with down + bump.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct OneWayPlatform;

/// Marker for moving platforms the character detaches from when bumping.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct MovingPlatform;

/// Marker for platforms that are both moving and one-way.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct MovingOneWayPlatform;

/// Marker for stair surfaces; these count as droppable like one-way
/// platforms.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Stairs;

/// Classification of one surface the character is standing on.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceFlags {
    /// Passable from below, droppable from above.
    pub one_way: bool,
    /// Carries the character while standing on it.
    pub moving: bool,
    /// Both of the above.
    pub moving_one_way: bool,
    /// Stair surface.
    pub stairs: bool,
}

impl SurfaceFlags {
    /// Whether this surface can be dropped through with down + bump.
    pub fn droppable(&self) -> bool {
        self.one_way || self.moving_one_way || self.stairs
    }

    /// Whether bumping off this surface requires detaching from it.
    pub fn detaches(&self) -> bool {
        self.moving || self.moving_one_way
    }
}

/// One surface contact under the character.
#[derive(Reflect, Debug, Clone, Copy)]
pub struct Surface {
    /// The platform entity.
    pub entity: Entity,
    /// Its classification.
    pub flags: SurfaceFlags,
}

/// Coarse movement mode, mirrored from (and written back to) the host
/// controller's state machine.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovementMode {
    /// Standing or otherwise unremarkable.
    #[default]
    Idle,
    /// Moving on the ground.
    Walking,
    /// Rising or falling from a jump.
    Jumping,
    /// Mid wall jump.
    WallJumping,
    /// Charging a bump on the ground.
    Shrinking,
    /// Sliding down a wall.
    WallClinging,
    /// Charging a bump while clinging.
    WallShrinking,
    /// Climbing a ladder.
    LadderClimbing,
    /// Host-owned dash; bumping is excluded.
    Dashing,
    /// Host-owned pushing; bumping is excluded.
    Pushing,
    /// Host-owned swimming; bumping is excluded.
    Swimming,
}

/// Overall character condition.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionMode {
    /// Regular play.
    #[default]
    Normal,
    /// Scripted or guided movement that still allows bumping.
    ControlledMovement,
    /// Stunned, frozen, dead, etc. No bumping.
    Incapacitated,
}

/// Per-character snapshot of host state.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct CharacterState {
    /// Current movement mode.
    pub movement: MovementMode,
    /// Current condition.
    pub condition: ConditionMode,
    /// Standing on ground (or within the sensor's grounding distance).
    pub grounded: bool,
    /// Grounded during the previous tick; used for landing edges.
    pub was_grounded: bool,
    /// Touching a ceiling.
    pub ceiling: bool,
    /// Wall within sensor reach on the left.
    pub wall_left: bool,
    /// Wall within sensor reach on the right.
    pub wall_right: bool,
    /// Current vertical speed (negative when falling).
    pub vertical_speed: f32,
    /// Whether the character has room to return to full size. Charging
    /// shrinks the character; a bump that would leave it stuck is denied.
    pub can_stand_up: bool,
    /// External veto other abilities or zones can set; a bump never commits
    /// while this is true.
    pub bump_blocked: bool,
    /// Which way the character faces.
    pub facing_right: bool,
    /// Gravity acceleration acting on the character (negative is down).
    /// Backends refresh this from their gravity settings.
    pub gravity: f32,
    /// Movement speed override for the host while charging (shrink crawl).
    pub speed_override: Option<f32>,
    /// Surfaces currently stood on, nearest first.
    pub standing_on: Vec<Surface>,
    /// One-shot: a bump committed this tick.
    pub just_bumped: bool,
    /// One-shot: became grounded this tick.
    pub just_landed: bool,
}

impl Default for CharacterState {
    fn default() -> Self {
        Self::new()
    }
}

impl CharacterState {
    /// State with sensible defaults for a freshly spawned character.
    pub fn new() -> Self {
        Self {
            movement: MovementMode::default(),
            condition: ConditionMode::default(),
            grounded: false,
            was_grounded: false,
            ceiling: false,
            wall_left: false,
            wall_right: false,
            vertical_speed: 0.0,
            can_stand_up: true,
            bump_blocked: false,
            facing_right: true,
            gravity: -25.0,
            speed_override: None,
            standing_on: Vec::new(),
            just_bumped: false,
            just_landed: false,
        }
    }

    /// Whether every surface under the character can be dropped through.
    ///
    /// Empty surface stacks don't count; there has to be something to drop
    /// through.
    pub fn all_surfaces_droppable(&self) -> bool {
        !self.standing_on.is_empty() && self.standing_on.iter().all(|s| s.flags.droppable())
    }

    /// Whether the character stands on at least one droppable surface.
    pub fn on_droppable_surface(&self) -> bool {
        self.standing_on.iter().any(|s| s.flags.droppable())
    }

    /// Whether the character stands on a surface it must detach from when
    /// bumping (moving platforms).
    pub fn on_detaching_surface(&self) -> bool {
        self.standing_on.iter().any(|s| s.flags.detaches())
    }

    /// Whether the character currently clings to a wall (either plain
    /// clinging or charging while clinging).
    pub fn is_clinging(&self) -> bool {
        matches!(
            self.movement,
            MovementMode::WallClinging | MovementMode::WallShrinking
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(flags: SurfaceFlags) -> Surface {
        Surface {
            entity: Entity::PLACEHOLDER,
            flags,
        }
    }

    #[test]
    fn empty_stack_is_not_droppable() {
        let state = CharacterState::new();
        assert!(!state.all_surfaces_droppable());
    }

    #[test]
    fn mixed_stack_is_not_droppable() {
        let mut state = CharacterState::new();
        state.standing_on = vec![
            surface(SurfaceFlags {
                one_way: true,
                ..Default::default()
            }),
            surface(SurfaceFlags::default()), // solid ground
        ];
        assert!(!state.all_surfaces_droppable());
        assert!(state.on_droppable_surface());
    }

    #[test]
    fn stairs_count_as_droppable() {
        let mut state = CharacterState::new();
        state.standing_on = vec![surface(SurfaceFlags {
            stairs: true,
            ..Default::default()
        })];
        assert!(state.all_surfaces_droppable());
    }

    #[test]
    fn moving_one_way_detaches_and_drops() {
        let flags = SurfaceFlags {
            moving_one_way: true,
            ..Default::default()
        };
        assert!(flags.droppable());
        assert!(flags.detaches());
    }
}
