//! Confidence scores
//!
//! AI detections, evidence matches and whole assessments all carry a
//! confidence expressed as a whole percentage.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// A whole-number percentage in the range 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    /// Highest possible score
    pub const MAX: Confidence = Confidence(100);

    /// Creates a score, rejecting values above 100
    pub fn new(value: u8) -> Result<Self, CoreError> {
        if value > 100 {
            return Err(CoreError::validation(format!(
                "confidence must be between 0 and 100, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Returns the raw percentage
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Confidence {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Confidence::new(value)
    }
}

impl From<Confidence> for u8 {
    fn from(c: Confidence) -> u8 {
        c.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
