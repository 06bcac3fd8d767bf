mod checksum;
mod composer;
mod scheduler;
mod solver;
mod types;

pub use checksum::{checksum, djb2, scenario_checksum};
pub use composer::Composer;
pub use scheduler::{DEFAULT_DEBOUNCE, RecalcScheduler, SchedulerState, Trigger};
pub use solver::{
    FiSnapshot, SolverConfig, coast_number, display_percent, fi_number, investable_return,
    progress_percent, real_rate, required_monthly_contribution, years_to_target,
};
pub use types::{
    AdjustmentEdit, Allocation, AssetBreakdown, MonteCarloRequest, OverrideEdit, OverrideField,
    Plan, ProjectionRequest, ScenarioOverride, ScenarioState, WhatIfAdjustments,
};
