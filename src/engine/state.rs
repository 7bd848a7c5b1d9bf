//! The deformation state machine as a plain value with a pure transition function.

use crate::float_types::STAGE_BANDS;

/// Where a run stands. Counters are the band or pass the next step will work on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeformationState {
    #[default]
    NotStarted,
    PrepareGauss { band: usize },
    PrepareUniformity { band: usize },
    UpdateGeo { iteration: usize },
    Finished,
}

/// [`DeformationState`] without its counters, for logging and instrumentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeformationPhase {
    NotStarted,
    PrepareGauss,
    PrepareUniformity,
    UpdateGeo,
    Finished,
}

/// What the work of one step reported back to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// The unit of work completed; only the counter moves.
    Continue,
    /// A relaxation pass moved no vertex by `convergence_epsilon` or more.
    Converged,
    /// The last relaxation pass allowed by `max_iterations` ran without converging.
    IterationCap,
}

impl StageOutcome {
    /// Whether this outcome ends relaxation.
    pub const fn ends_relaxation(self) -> bool {
        matches!(self, StageOutcome::Converged | StageOutcome::IterationCap)
    }
}

impl DeformationState {
    pub const fn phase(&self) -> DeformationPhase {
        match self {
            DeformationState::NotStarted => DeformationPhase::NotStarted,
            DeformationState::PrepareGauss { .. } => DeformationPhase::PrepareGauss,
            DeformationState::PrepareUniformity { .. } => DeformationPhase::PrepareUniformity,
            DeformationState::UpdateGeo { .. } => DeformationPhase::UpdateGeo,
            DeformationState::Finished => DeformationPhase::Finished,
        }
    }

    pub const fn is_finished(&self) -> bool {
        matches!(self, DeformationState::Finished)
    }

    /// The state after one step that ended with `outcome`.
    ///
    /// Transitions only move forward: the band stages each take exactly
    /// [`STAGE_BANDS`] steps, and relaxation ends only on `Converged` or
    /// `IterationCap`. Both are treated like `Continue` outside of `UpdateGeo`.
    pub const fn advance(self, outcome: StageOutcome) -> DeformationState {
        match self {
            DeformationState::NotStarted => DeformationState::PrepareGauss { band: 0 },
            DeformationState::PrepareGauss { band } if band + 1 >= STAGE_BANDS => {
                DeformationState::PrepareUniformity { band: 0 }
            },
            DeformationState::PrepareGauss { band } => {
                DeformationState::PrepareGauss { band: band + 1 }
            },
            DeformationState::PrepareUniformity { band } if band + 1 >= STAGE_BANDS => {
                DeformationState::UpdateGeo { iteration: 0 }
            },
            DeformationState::PrepareUniformity { band } => {
                DeformationState::PrepareUniformity { band: band + 1 }
            },
            DeformationState::UpdateGeo { iteration } => match outcome {
                StageOutcome::Converged | StageOutcome::IterationCap => DeformationState::Finished,
                StageOutcome::Continue => DeformationState::UpdateGeo {
                    iteration: iteration + 1,
                },
            },
            DeformationState::Finished => DeformationState::Finished,
        }
    }
}
