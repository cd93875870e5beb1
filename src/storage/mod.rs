pub mod day_store;
pub mod oplog;

pub use day_store::{DayFile, DayStore};
pub use oplog::OpLog;
