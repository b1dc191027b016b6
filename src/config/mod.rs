//! Designer-tunable configuration, one file per concern.

mod bump;
mod sensors;
mod wall_clinging;
mod wall_jumping;

pub use bump::BumpConfig;
pub use sensors::SensorConfig;
pub use wall_clinging::WallClingConfig;
pub use wall_jumping::{ForceMode, WallJumpConfig};

use bevy::prelude::*;

/// Aggregated ability configuration for one character.
///
/// Immutable per activation from the abilities' point of view: systems only
/// read it. Defaults mirror the reference tuning.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct AbilityConfig {
    /// Charged bump tuning.
    pub bump: BumpConfig,
    /// Wall cling tuning.
    pub wall_cling: WallClingConfig,
    /// Wall jump tuning.
    pub wall_jump: WallJumpConfig,
    /// Surface sensor dimensions.
    pub sensors: SensorConfig,
}

impl AbilityConfig {
    /// Config with a replaced bump section.
    pub fn with_bump(mut self, bump: BumpConfig) -> Self {
        self.bump = bump;
        self
    }

    /// Config with a replaced wall cling section.
    pub fn with_wall_cling(mut self, wall_cling: WallClingConfig) -> Self {
        self.wall_cling = wall_cling;
        self
    }

    /// Config with a replaced wall jump section.
    pub fn with_wall_jump(mut self, wall_jump: WallJumpConfig) -> Self {
        self.wall_jump = wall_jump;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_form_a_valid_charge_window() {
        let config = AbilityConfig::default();
        assert!(config.bump.hold_time_min < config.bump.hold_time_max);
        assert!(config.bump.force_min < config.bump.force_max);
        assert!(config.bump.radius_min < config.bump.radius_max);
        assert!(config.bump.probe_lerp > 0.0 && config.bump.probe_lerp <= 1.0);
    }

    #[test]
    fn builder_replaces_sections() {
        let config = AbilityConfig::default().with_bump(BumpConfig {
            force_max: 30.0,
            ..BumpConfig::default()
        });
        assert_eq!(config.bump.force_max, 30.0);
        assert_eq!(config.wall_jump.max_wall_jumps, 1);
    }
}
