pub mod discovery;
pub mod emit;
pub mod execute;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod plan;
pub mod project;
pub mod reorder;
pub mod resolve;
pub mod symbols;

pub use execute::ExecResult;
pub use pipeline::{build_plan, effective_exit_code, run, run_link, run_passthrough};
pub use plan::LinkPlan;
