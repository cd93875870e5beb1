pub mod buffer;
pub mod gate;
pub mod reporter;
pub mod shutdown;
pub mod station;

pub use buffer::{BatchWriter, FlushReport, RecordBuffer, RetryPolicy};
pub use gate::{OperatingWindow, WaitNotice, allowed};
pub use reporter::{Reporter, ReporterHandle, StatusPublisher, TickOutcome};
pub use shutdown::{Shutdown, ShutdownTrigger};
pub use station::{CycleOutcome, SkipReason, Station};
