use crate::utils::time::time_key;
use chrono::NaiveTime;

/// One successful acquisition cycle. Built once, never modified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    time: NaiveTime,
    power: f64,
    temperature: f64,
    heading: f64,
}

impl Record {
    pub fn new(time: NaiveTime, power: f64, temperature: f64, heading: f64) -> Self {
        Self {
            time,
            power,
            temperature,
            heading,
        }
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// Watts.
    pub fn power(&self) -> f64 {
        self.power
    }

    /// °C, from the compass die.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Degrees, declination already applied.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// CSV fields: `HH_MM_SS`, power (3 dp), temperature (2 dp), heading (1 dp).
    pub fn to_row(&self) -> [String; 4] {
        [
            time_key(self.time),
            format!("{:.3}", self.power),
            format!("{:.2}", self.temperature),
            format!("{:.1}", self.heading),
        ]
    }
}
