/// Which electrical quantity the power meter is wired to during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayPhase {
    SenseCurrent,
    SenseVoltage,
}

impl RelayPhase {
    /// The relay is off at boot, so the first cycle energizes it and samples voltage.
    pub const INITIAL: RelayPhase = RelayPhase::SenseVoltage;

    pub fn next(self) -> Self {
        match self {
            RelayPhase::SenseCurrent => RelayPhase::SenseVoltage,
            RelayPhase::SenseVoltage => RelayPhase::SenseCurrent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelayPhase::SenseCurrent => "current",
            RelayPhase::SenseVoltage => "voltage",
        }
    }
}
