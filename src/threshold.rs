//! Frequency thresholds
//!
//! A qualitative level is turned into a minimum count by dividing a grand
//! total by a fixed divisor.

use crate::error::{Result, TallyError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThresholdLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl ThresholdLevel {
    /// Divisor applied to the grand total
    pub const fn divisor(self) -> u64 {
        match self {
            ThresholdLevel::Low => 10_000,
            ThresholdLevel::Medium => 5_000,
            ThresholdLevel::High => 2_500,
        }
    }
}

/// Minimum total an entry needs to be kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Threshold {
    Absolute(u64),
    Level(ThresholdLevel),
}

impl Default for Threshold {
    fn default() -> Self {
        Threshold::Level(ThresholdLevel::default())
    }
}

impl Threshold {
    pub fn resolve(self, grand_total: u64) -> u64 {
        match self {
            Threshold::Absolute(n) => n,
            Threshold::Level(level) => grand_total / level.divisor(),
        }
    }
}

impl FromStr for Threshold {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Threshold::Level(ThresholdLevel::Low)),
            "medium" => Ok(Threshold::Level(ThresholdLevel::Medium)),
            "high" => Ok(Threshold::Level(ThresholdLevel::High)),
            _ => s.parse().map(Threshold::Absolute).map_err(|_| {
                TallyError::config(format!(
                    "threshold {:?} must be low, medium, high or a number",
                    s
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!(Threshold::Level(ThresholdLevel::Low).resolve(1_000_000), 100);
        assert_eq!(Threshold::default().resolve(1_000_000), 200);
        assert_eq!(Threshold::Level(ThresholdLevel::High).resolve(1_000_000), 400);
        assert_eq!(Threshold::Level(ThresholdLevel::High).resolve(100), 0);
        assert_eq!(Threshold::Absolute(3).resolve(1_000_000), 3);
    }

    #[test]
    fn test_parse() {
        assert_eq!("high".parse::<Threshold>().unwrap(), Threshold::Level(ThresholdLevel::High));
        assert_eq!("0".parse::<Threshold>().unwrap(), Threshold::Absolute(0));
        assert!("huge".parse::<Threshold>().is_err());
    }

    #[test]
    fn test_serde_forms() {
        let t: Threshold = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(t, Threshold::Level(ThresholdLevel::Low));
        let t: Threshold = serde_json::from_str("12").unwrap();
        assert_eq!(t, Threshold::Absolute(12));
    }
}
