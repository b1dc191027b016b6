//! Charge state machine for the bump ability.
//!
//! A bump is a press-and-hold gesture: holding the bump button accumulates
//! charge, releasing it converts the held duration into a detection probe
//! radius and a launch force. Short presses fall through to an immediate
//! alternate action (a plain jump, or a wall jump when clinging).

use bevy::math::FloatExt;
use bevy::prelude::*;

use crate::config::BumpConfig;

/// Tolerance (in world units) under which the probe radius is considered
/// to have reached its target.
pub const PROBE_EPSILON: f32 = 0.05;

/// Phase of the charge cycle.
///
/// `Idle` is both the initial state and the state reached after every
/// completed cycle (commit, denial, or tap).
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChargePhase {
    /// No charge in progress.
    #[default]
    Idle,
    /// The bump button is held, charge is accumulating.
    Charging,
    /// The button was released with enough charge; the detection probe is
    /// growing toward its target radius.
    Detecting,
}

/// Outcome of releasing the bump button.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    /// Released at or under the minimum hold time: fire the immediate
    /// alternate action instead of a charged bump.
    Tap,
    /// Enough charge: grow the detection probe toward `radius`, then commit
    /// with `force`.
    Charged {
        /// Target probe radius.
        radius: f32,
        /// Launch force magnitude.
        force: f32,
    },
}

/// One step of probe growth while in [`ChargePhase::Detecting`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeStep {
    /// The probe has not reached its target yet; grow it to the given radius.
    Growing(f32),
    /// The probe reached its target; the bump is ready to commit.
    Ready,
}

/// Charge state for one character.
///
/// Owned exclusively by the character entity; all transitions happen through
/// the methods below, driven once per fixed tick by the plugin systems.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
#[require(
    crate::detection::DetectionProbe,
    crate::intent::AbilityIntent,
    crate::state::CharacterState,
    crate::wall::WallState,
    crate::animation::AbilityAnimation,
    crate::config::AbilityConfig,
    crate::systems::BumpBudget
)]
pub struct BumpCharge {
    phase: ChargePhase,
    held_time: f32,
    /// Guards against accumulating twice within one tick.
    accumulated_this_tick: bool,
    target_radius: f32,
    pending_force: f32,
}

impl BumpCharge {
    /// Create an idle charge.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> ChargePhase {
        self.phase
    }

    /// Accumulated hold duration, in seconds.
    pub fn held_time(&self) -> f32 {
        self.held_time
    }

    /// Whether the button is currently held and charging.
    pub fn is_charging(&self) -> bool {
        self.phase == ChargePhase::Charging
    }

    /// Whether a released charge is waiting on the detection probe.
    pub fn is_detecting(&self) -> bool {
        self.phase == ChargePhase::Detecting
    }

    /// Probe radius the current cycle is growing toward.
    pub fn target_radius(&self) -> f32 {
        self.target_radius
    }

    /// Force the current cycle will commit with.
    pub fn pending_force(&self) -> f32 {
        self.pending_force
    }

    /// Re-arm the per-tick accumulation guard. Called once per fixed tick,
    /// before input handling.
    pub fn begin_tick(&mut self) {
        self.accumulated_this_tick = false;
    }

    /// Accumulate held duration while the button is down.
    ///
    /// Calling this a second time within the same tick is a no-op; the guard
    /// prevents double-counting when two input paths observe the same press.
    pub fn hold(&mut self, dt: f32) {
        if self.phase == ChargePhase::Detecting || self.accumulated_this_tick {
            return;
        }
        self.phase = ChargePhase::Charging;
        self.held_time += dt;
        self.accumulated_this_tick = true;
    }

    /// Terminate charging and map the held duration to a release outcome.
    ///
    /// Returns `None` when no charge was in progress. A hold at or under
    /// `hold_time_min` yields [`ReleaseOutcome::Tap`]; anything longer maps
    /// linearly into the configured radius and force ranges. A degenerate
    /// window (`hold_time_max == hold_time_min`) counts as fully charged;
    /// an inverted window behaves as if its bounds were swapped.
    pub fn release(&mut self, config: &BumpConfig) -> Option<ReleaseOutcome> {
        if self.phase != ChargePhase::Charging {
            return None;
        }

        // Normalize the window; a misconfigured min > max must not panic.
        let min = config.hold_time_min.min(config.hold_time_max);
        let max = config.hold_time_min.max(config.hold_time_max);
        let clamped = self.held_time.clamp(min, max);
        self.held_time = 0.0;

        if clamped <= min {
            self.phase = ChargePhase::Idle;
            return Some(ReleaseOutcome::Tap);
        }

        let span = max - min;
        let factor = if span <= f32::EPSILON {
            1.0
        } else {
            (clamped - min) / span
        };

        self.target_radius = config.radius_min.lerp(config.radius_max, factor);
        self.pending_force = config.force_min.lerp(config.force_max, factor);
        self.phase = ChargePhase::Detecting;

        Some(ReleaseOutcome::Charged {
            radius: self.target_radius,
            force: self.pending_force,
        })
    }

    /// Compute the next probe growth step while detecting.
    ///
    /// The probe approaches the target geometrically; once within
    /// [`PROBE_EPSILON`] of it the bump is ready to commit.
    pub fn probe_step(&self, current_radius: f32, lerp_value: f32) -> ProbeStep {
        if current_radius < self.target_radius - PROBE_EPSILON {
            ProbeStep::Growing(current_radius.lerp(self.target_radius, lerp_value))
        } else {
            ProbeStep::Ready
        }
    }

    /// Consume the charge and produce the launch impulse.
    ///
    /// Returns `None` unless a detection cycle is in progress. An
    /// unauthorized commit silently discards the charge (no retry). A zero
    /// detection sample yields a zero impulse, never NaN. Either way the
    /// charge returns to `Idle`, so a second commit returns `None`.
    pub fn commit(&mut self, sample: Vec2, authorized: bool) -> Option<Vec2> {
        if self.phase != ChargePhase::Detecting {
            return None;
        }
        let force = self.pending_force;
        self.reset();
        if !authorized {
            return None;
        }
        Some(sample.normalize_or_zero() * force)
    }

    /// Drop any in-progress cycle and return to `Idle`.
    pub fn reset(&mut self) {
        self.phase = ChargePhase::Idle;
        self.held_time = 0.0;
        self.target_radius = 0.0;
        self.pending_force = 0.0;
    }
}
