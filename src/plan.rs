//! Upgrade plan tree: construction, preview and interactive execution.

pub mod builder;
pub mod executor;
pub mod prompt;
pub mod report;
pub mod step;

pub use builder::{PlanConfig, generate_plan};
pub use executor::{ExecutionReport, Executor, StepOutcome};
pub use prompt::TerminalPrompter;
pub use report::dump_plan;
