use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Image size used to resolve relative lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Average of width and height
    pub fn diagonal(&self) -> f64 {
        (self.width as f64 + self.height as f64) / 2.0
    }

    /// Size of the given reference dimension in pixels
    pub fn reference(&self, reference: Reference) -> f64 {
        match reference {
            Reference::Width => self.width as f64,
            Reference::Height => self.height as f64,
            Reference::Diagonal => self.diagonal(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Which image dimension a relative length is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reference {
    Width,
    Height,
    Diagonal,
}

/// A length entered either in pixels or as a percentage of an image dimension
///
/// Accepted forms are `"12px"`, `"12"` and `"2.5%"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    Pixels(f64),
    Percent(f64),
}

impl Length {
    /// Convert to an absolute pixel count against `reference` pixels
    pub fn resolve(&self, reference: f64) -> f64 {
        match *self {
            Length::Pixels(px) => px,
            Length::Percent(pct) => pct * reference / 100.0,
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self, Length::Percent(_))
    }
}

impl FromStr for Length {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ConfigError::InvalidValue {
            key: "length".to_string(),
            value: s.to_string(),
        };

        let (number, relative) = if let Some(rest) = trimmed.strip_suffix('%') {
            (rest, true)
        } else if let Some(rest) = trimmed.strip_suffix("px") {
            (rest, false)
        } else {
            (trimmed, false)
        };

        let value: f64 = number.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }

        Ok(if relative {
            Length::Percent(value)
        } else {
            Length::Pixels(value)
        })
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Pixels(px) => write!(f, "{}px", px),
            Length::Percent(pct) => write!(f, "{}%", pct),
        }
    }
}
