pub mod record;
pub mod relay_phase;

pub use record::Record;
pub use relay_phase::RelayPhase;
