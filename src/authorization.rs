//! Authorization rules for bumps and wall jumps.
//!
//! Pure predicates over the mirrored [`CharacterState`]; the commit systems
//! evaluate them at release/commit time and nowhere else. A denial is a
//! normal control-flow outcome: the charge is discarded silently, nothing is
//! retried and no error surfaces.

use bevy::prelude::*;

use crate::config::BumpConfig;
use crate::state::{CharacterState, ConditionMode, MovementMode};
use crate::wall::WallState;

/// Input axis magnitude below which directional input is ignored.
pub const INPUT_THRESHOLD: f32 = 0.1;

/// Where bumping is allowed.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BumpRestriction {
    /// Only when grounded (air bumps still allowed once one was spent).
    OnGround,
    /// Grounded or on a ladder.
    OnGroundAndLadders,
    /// No restriction.
    #[default]
    Anywhere,
    /// Bumping disabled.
    Never,
}

/// Verdict of a full bump evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpVerdict {
    /// The bump may commit. `detach` is set when the character stands on a
    /// moving platform it has to let go of first.
    Approved {
        /// Detach from the moving platform under the character.
        detach: bool,
    },
    /// Down + bump on an all-one-way surface stack: drop through instead of
    /// launching.
    DropThrough,
    /// No bump; the charge is discarded.
    Denied,
}

/// The positional/budget gate (the original's `BumpAuthorized`).
///
/// Restriction-dependent: `Anywhere` always passes (outside of swimming),
/// the grounded variants also pass in the air once a bump has been spent,
/// because that air time was bought with a bump.
pub fn bump_authorized(
    restriction: BumpRestriction,
    state: &CharacterState,
    bumps_left: u32,
    total_bumps: u32,
) -> bool {
    if state.movement == MovementMode::Swimming {
        return false;
    }

    match restriction {
        BumpRestriction::Anywhere => true,
        BumpRestriction::Never => false,
        BumpRestriction::OnGround => state.grounded || bumps_left < total_bumps,
        BumpRestriction::OnGroundAndLadders => {
            state.grounded
                || state.movement == MovementMode::LadderClimbing
                || bumps_left < total_bumps
        }
    }
}

/// Full bump evaluation at commit time (the original's
/// `EvaluateBumpConditions`).
///
/// `pressing_down` is [`AbilityIntent::pressing_down`]; down + bump on a
/// droppable surface stack turns the bump into a platform drop.
///
/// [`AbilityIntent::pressing_down`]: crate::intent::AbilityIntent::pressing_down
pub fn evaluate_bump(
    config: &BumpConfig,
    state: &CharacterState,
    bumps_left: u32,
    pressing_down: bool,
    dropping_through: bool,
) -> BumpVerdict {
    let on_one_way = state.on_droppable_surface();

    if !bump_authorized(config.restriction, state, bumps_left, config.bumps)
        || state.bump_blocked
        || (!state.can_stand_up && !on_one_way)
        || state.condition == ConditionMode::Incapacitated
        || state.movement == MovementMode::Dashing
        || state.movement == MovementMode::Pushing
        || (state.ceiling && !on_one_way)
    {
        return BumpVerdict::Denied;
    }

    // Out of bumps: denied whether grounded or not. Ladder climbing is the
    // one airborne stance exempt from the budget.
    if bumps_left == 0 && (state.grounded || state.movement != MovementMode::LadderClimbing) {
        return BumpVerdict::Denied;
    }

    // Down + bump on a stack made entirely of droppable surfaces.
    if config.can_drop_through_one_way
        && !dropping_through
        && state.grounded
        && pressing_down
        && state.all_surfaces_droppable()
    {
        return BumpVerdict::DropThrough;
    }

    BumpVerdict::Approved {
        detach: state.grounded && state.on_detaching_surface(),
    }
}

/// Wall jump gate (the original's `EvaluateWallJumpConditions`).
pub fn wall_jump_allowed(state: &CharacterState, wall: &WallState, limited: bool) -> bool {
    if limited && wall.wall_jumps_left == 0 {
        return false;
    }
    if wall.has_wall_jumped {
        return false;
    }
    if state.grounded {
        return false;
    }
    state.is_clinging()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Surface, SurfaceFlags};

    fn grounded_state() -> CharacterState {
        let mut state = CharacterState::new();
        state.grounded = true;
        state
    }

    fn on_surface(flags: SurfaceFlags) -> CharacterState {
        let mut state = grounded_state();
        state.standing_on = vec![Surface {
            entity: Entity::PLACEHOLDER,
            flags,
        }];
        state
    }

    fn one_way() -> SurfaceFlags {
        SurfaceFlags {
            one_way: true,
            ..Default::default()
        }
    }

    // ==================== bump_authorized ====================

    #[test]
    fn anywhere_allows_airborne_bumps() {
        let state = CharacterState::new(); // not grounded
        assert!(bump_authorized(BumpRestriction::Anywhere, &state, 2, 2));
    }

    #[test]
    fn never_denies_everything() {
        assert!(!bump_authorized(
            BumpRestriction::Never,
            &grounded_state(),
            2,
            2
        ));
    }

    #[test]
    fn on_ground_denies_a_fresh_airborne_bump() {
        let state = CharacterState::new();
        assert!(!bump_authorized(BumpRestriction::OnGround, &state, 2, 2));
        // ...but allows it once a bump was already spent (that airtime was
        // bought with a bump).
        assert!(bump_authorized(BumpRestriction::OnGround, &state, 1, 2));
    }

    #[test]
    fn ladders_count_for_the_ladder_variant_only() {
        let mut state = CharacterState::new();
        state.movement = MovementMode::LadderClimbing;
        assert!(bump_authorized(
            BumpRestriction::OnGroundAndLadders,
            &state,
            2,
            2
        ));
        assert!(!bump_authorized(BumpRestriction::OnGround, &state, 2, 2));
    }

    #[test]
    fn swimming_denies_regardless_of_restriction() {
        let mut state = grounded_state();
        state.movement = MovementMode::Swimming;
        assert!(!bump_authorized(BumpRestriction::Anywhere, &state, 2, 2));
    }

    // ==================== evaluate_bump ====================

    #[test]
    fn plain_grounded_bump_is_approved() {
        let verdict = evaluate_bump(&BumpConfig::default(), &grounded_state(), 2, false, false);
        assert_eq!(verdict, BumpVerdict::Approved { detach: false });
    }

    #[test]
    fn blocked_state_denies() {
        let mut state = grounded_state();
        state.bump_blocked = true;
        let verdict = evaluate_bump(&BumpConfig::default(), &state, 2, false, false);
        assert_eq!(verdict, BumpVerdict::Denied);
    }

    #[test]
    fn no_standing_room_denies_on_solid_ground() {
        let mut state = grounded_state();
        state.can_stand_up = false;
        let verdict = evaluate_bump(&BumpConfig::default(), &state, 2, false, false);
        assert_eq!(verdict, BumpVerdict::Denied);
    }

    #[test]
    fn no_standing_room_is_waived_on_one_way_platforms() {
        let mut state = on_surface(one_way());
        state.can_stand_up = false;
        let verdict = evaluate_bump(&BumpConfig::default(), &state, 2, false, false);
        assert_eq!(verdict, BumpVerdict::Approved { detach: false });
    }

    #[test]
    fn ceiling_contact_denies_unless_on_one_way() {
        let mut state = grounded_state();
        state.ceiling = true;
        assert_eq!(
            evaluate_bump(&BumpConfig::default(), &state, 2, false, false),
            BumpVerdict::Denied
        );

        let mut state = on_surface(one_way());
        state.ceiling = true;
        assert_eq!(
            evaluate_bump(&BumpConfig::default(), &state, 2, false, false),
            BumpVerdict::Approved { detach: false }
        );
    }

    #[test]
    fn dashing_and_pushing_deny() {
        for movement in [MovementMode::Dashing, MovementMode::Pushing] {
            let mut state = grounded_state();
            state.movement = movement;
            assert_eq!(
                evaluate_bump(&BumpConfig::default(), &state, 2, false, false),
                BumpVerdict::Denied
            );
        }
    }

    #[test]
    fn exhausted_budget_denies() {
        assert_eq!(
            evaluate_bump(&BumpConfig::default(), &grounded_state(), 0, false, false),
            BumpVerdict::Denied
        );
        // Airborne with no bumps left: also denied.
        assert_eq!(
            evaluate_bump(&BumpConfig::default(), &CharacterState::new(), 0, false, false),
            BumpVerdict::Denied
        );
    }

    #[test]
    fn ladder_climbing_ignores_the_budget() {
        let mut state = CharacterState::new();
        state.movement = MovementMode::LadderClimbing;
        assert_eq!(
            evaluate_bump(&BumpConfig::default(), &state, 0, false, false),
            BumpVerdict::Approved { detach: false }
        );
    }

    #[test]
    fn down_bump_on_one_way_stack_drops_through() {
        let state = on_surface(one_way());
        assert_eq!(
            evaluate_bump(&BumpConfig::default(), &state, 2, true, false),
            BumpVerdict::DropThrough
        );
        // Without down input it's a regular bump.
        assert_eq!(
            evaluate_bump(&BumpConfig::default(), &state, 2, false, false),
            BumpVerdict::Approved { detach: false }
        );
    }

    #[test]
    fn drop_through_respects_config_and_reentry() {
        let state = on_surface(one_way());
        let config = BumpConfig {
            can_drop_through_one_way: false,
            ..BumpConfig::default()
        };
        assert_eq!(
            evaluate_bump(&config, &state, 2, true, false),
            BumpVerdict::Approved { detach: false }
        );
        // Already mid-drop: no second drop.
        assert_eq!(
            evaluate_bump(&BumpConfig::default(), &state, 2, true, true),
            BumpVerdict::Approved { detach: false }
        );
    }

    #[test]
    fn moving_platform_bump_requests_detach() {
        let state = on_surface(SurfaceFlags {
            moving: true,
            ..Default::default()
        });
        assert_eq!(
            evaluate_bump(&BumpConfig::default(), &state, 2, false, false),
            BumpVerdict::Approved { detach: true }
        );
    }

    // ==================== wall_jump_allowed ====================

    fn clinging_state() -> CharacterState {
        let mut state = CharacterState::new();
        state.movement = MovementMode::WallClinging;
        state
    }

    #[test]
    fn wall_jump_requires_clinging_and_airborne() {
        let wall = WallState::new(1);
        assert!(wall_jump_allowed(&clinging_state(), &wall, true));

        let mut grounded = clinging_state();
        grounded.grounded = true;
        assert!(!wall_jump_allowed(&grounded, &wall, true));

        let idle = CharacterState::new();
        assert!(!wall_jump_allowed(&idle, &wall, true));
    }

    #[test]
    fn wall_jump_budget_and_latch() {
        let mut wall = WallState::new(1);
        wall.wall_jumps_left = 0;
        assert!(!wall_jump_allowed(&clinging_state(), &wall, true));
        // Unlimited ignores the budget.
        assert!(wall_jump_allowed(&clinging_state(), &wall, false));

        let mut wall = WallState::new(1);
        wall.has_wall_jumped = true;
        assert!(!wall_jump_allowed(&clinging_state(), &wall, true));
    }

    #[test]
    fn wall_shrinking_counts_as_clinging() {
        let mut state = CharacterState::new();
        state.movement = MovementMode::WallShrinking;
        assert!(wall_jump_allowed(&state, &WallState::new(1), true));
    }
}
