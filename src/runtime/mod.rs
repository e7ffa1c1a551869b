mod context;
mod loops;
mod state;

pub use context::ExecutionContext;
pub use loops::{LoopController, LoopDecision};
pub use state::{ExecutionReport, ExecutionState};
