//! Pipeline execution: sequential and parallel pipelines, the processor
//! executor they share, and wiring validation

pub mod events;
pub mod executor;
pub mod parallel;
pub mod sequential;
pub mod validation;

pub use events::{EventHandler, ExecutionEvent};
pub use executor::ProcessorExecutor;
pub use parallel::ParallelPipeline;
pub use sequential::SequentialPipeline;
pub use validation::{validate_parallel, validate_sequence, WiringError};
