//! Charge-and-release bump abilities for 2D platformer characters.
//!
//! Holding the bump button charges a launch; releasing it grows a circular
//! detection probe around the character, and everything the probe touches
//! pushes the character away from it, so a character on the ground launches
//! up, one in a corner launches diagonally, and one clinging to a wall
//! launches off it. A short tap falls through to a plain jump on the ground
//! or a wall jump while clinging. Objects marked [`BumpReactive`] get shoved
//! away when a probe reaches them.
//!
//! The abilities are physics-engine agnostic: all physics access goes
//! through [`BumpPhysicsBackend`]. An Avian2D backend ships behind the
//! `avian2d` feature.
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bump_abilities::prelude::*;
//!
//! # #[cfg(feature = "avian2d")]
//! fn plugin(app: &mut App) {
//!     app.add_plugins(BumpAbilityPlugin::<Avian2dBackend>::default());
//! }
//! ```
//!
//! [`BumpReactive`]: crate::interact::BumpReactive
//! [`BumpPhysicsBackend`]: crate::backend::BumpPhysicsBackend

use std::marker::PhantomData;

use bevy::prelude::*;

pub mod animation;
pub mod authorization;
pub mod backend;
pub mod charge;
pub mod config;
pub mod detection;
pub mod intent;
pub mod interact;
pub mod state;
pub mod systems;
pub mod wall;

#[cfg(feature = "avian2d")]
pub mod avian;

/// Commonly used types.
pub mod prelude {
    pub use crate::animation::AbilityAnimation;
    pub use crate::authorization::{BumpRestriction, BumpVerdict};
    pub use crate::backend::BumpPhysicsBackend;
    pub use crate::charge::{BumpCharge, ChargePhase};
    pub use crate::config::{
        AbilityConfig, BumpConfig, ForceMode, SensorConfig, WallClingConfig, WallJumpConfig,
    };
    pub use crate::detection::DetectionProbe;
    pub use crate::intent::AbilityIntent;
    pub use crate::interact::BumpReactive;
    pub use crate::state::{
        CharacterState, ConditionMode, MovementMode, MovingOneWayPlatform, MovingPlatform,
        OneWayPlatform, Stairs,
    };
    pub use crate::systems::{
        BumpBudget, BumpCommitted, PlatformDetached, PlatformDropStarted, PlatformPassthrough,
        WallJumped,
    };
    pub use crate::wall::WallState;
    pub use crate::{BumpAbilityPlugin, BumpAbilitySet};

    #[cfg(feature = "avian2d")]
    pub use crate::avian::Avian2dBackend;
}

/// Fixed-update phases of the bump ability pipeline, run in order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BumpAbilitySet {
    /// Clear one-shots, re-arm per-tick guards.
    Preparation,
    /// Backend surface detection into [`CharacterState`](state::CharacterState).
    Sensors,
    /// Landing edges, wall cling transitions, charge accumulation, release.
    Input,
    /// Probe growth and backend overlap collection.
    Probe,
    /// Tap actions and bump commits.
    Resolution,
    /// Velocity application, passthrough windows, animation, tick close-out.
    Application,
}

/// Main plugin, generic over the physics backend.
///
/// ```no_run
/// # use bevy::prelude::*;
/// # use bump_abilities::prelude::*;
/// # #[cfg(feature = "avian2d")]
/// App::new().add_plugins(BumpAbilityPlugin::<Avian2dBackend>::default());
/// ```
pub struct BumpAbilityPlugin<B: backend::BumpPhysicsBackend> {
    _backend: PhantomData<B>,
}

impl<B: backend::BumpPhysicsBackend> Default for BumpAbilityPlugin<B> {
    fn default() -> Self {
        Self {
            _backend: PhantomData,
        }
    }
}

impl<B: backend::BumpPhysicsBackend> Plugin for BumpAbilityPlugin<B> {
    fn build(&self, app: &mut App) {
        app.register_type::<charge::BumpCharge>()
            .register_type::<detection::DetectionProbe>()
            .register_type::<intent::AbilityIntent>()
            .register_type::<state::CharacterState>()
            .register_type::<state::OneWayPlatform>()
            .register_type::<state::MovingPlatform>()
            .register_type::<state::MovingOneWayPlatform>()
            .register_type::<state::Stairs>()
            .register_type::<wall::WallState>()
            .register_type::<animation::AbilityAnimation>()
            .register_type::<config::AbilityConfig>()
            .register_type::<interact::BumpReactive>()
            .register_type::<systems::BumpBudget>();

        app.add_message::<systems::BumpCommitted>()
            .add_message::<systems::WallJumped>()
            .add_message::<systems::PlatformDropStarted>()
            .add_message::<systems::PlatformDetached>();

        // Internal plumbing; drained by the application systems, never
        // carried across frames.
        app.add_message::<systems::TapActionRequested>()
            .add_message::<systems::ImpulseRequested>()
            .add_message::<systems::PassthroughRequested>();

        app.configure_sets(
            FixedUpdate,
            (
                BumpAbilitySet::Preparation,
                BumpAbilitySet::Sensors,
                BumpAbilitySet::Input,
                BumpAbilitySet::Probe,
                BumpAbilitySet::Resolution,
                BumpAbilitySet::Application,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            systems::begin_ability_tick.in_set(BumpAbilitySet::Preparation),
        );
        app.add_systems(
            FixedUpdate,
            (
                systems::handle_landing,
                systems::update_wall_cling,
                systems::handle_charge_input,
            )
                .chain()
                .in_set(BumpAbilitySet::Input),
        );
        app.add_systems(
            FixedUpdate,
            systems::grow_probe.in_set(BumpAbilitySet::Probe),
        );
        app.add_systems(
            FixedUpdate,
            (systems::resolve_tap_actions, systems::commit_bumps)
                .chain()
                .in_set(BumpAbilitySet::Resolution),
        );
        app.add_systems(
            FixedUpdate,
            (
                systems::apply_requested_impulses::<B>,
                systems::manage_passthrough::<B>,
                systems::update_animation,
                systems::finish_ability_tick,
            )
                .chain()
                .in_set(BumpAbilitySet::Application),
        );

        app.add_plugins(B::plugin());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BumpPhysicsBackend, NoOpBackendPlugin};

    /// Minimal backend for plugin tests that don't need physics.
    struct TestBackend;

    impl BumpPhysicsBackend for TestBackend {
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
    }

    #[test]
    fn plugin_builds_and_spawns_a_character() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(BumpAbilityPlugin::<TestBackend>::default());

        let entity = app.world_mut().spawn(charge::BumpCharge::new()).id();
        app.update();

        assert!(app
            .world()
            .get::<detection::DetectionProbe>(entity)
            .is_some());
        assert!(app.world().get::<state::CharacterState>(entity).is_some());
        assert!(app.world().get::<systems::BumpBudget>(entity).is_some());
    }
}
