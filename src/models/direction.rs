use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WindRoseError};
use crate::utils::constants::CALM_CODE;

/// One of the sixteen compass points, declared clockwise from north.
///
/// The declaration order is the column order of every pivot table and the
/// sector order of the plotted rose; `ALL` must never be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompassDirection {
    N,
    NNE,
    NE,
    ENE,
    E,
    ESE,
    SE,
    SSE,
    S,
    SSW,
    SW,
    WSW,
    W,
    WNW,
    NW,
    NNW,
}

impl CompassDirection {
    pub const COUNT: usize = 16;

    pub const ALL: [CompassDirection; Self::COUNT] = [
        CompassDirection::N,
        CompassDirection::NNE,
        CompassDirection::NE,
        CompassDirection::ENE,
        CompassDirection::E,
        CompassDirection::ESE,
        CompassDirection::SE,
        CompassDirection::SSE,
        CompassDirection::S,
        CompassDirection::SSW,
        CompassDirection::SW,
        CompassDirection::WSW,
        CompassDirection::W,
        CompassDirection::WNW,
        CompassDirection::NW,
        CompassDirection::NNW,
    ];

    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "N" => Ok(CompassDirection::N),
            "NNE" => Ok(CompassDirection::NNE),
            "NE" => Ok(CompassDirection::NE),
            "ENE" => Ok(CompassDirection::ENE),
            "E" => Ok(CompassDirection::E),
            "ESE" => Ok(CompassDirection::ESE),
            "SE" => Ok(CompassDirection::SE),
            "SSE" => Ok(CompassDirection::SSE),
            "S" => Ok(CompassDirection::S),
            "SSW" => Ok(CompassDirection::SSW),
            "SW" => Ok(CompassDirection::SW),
            "WSW" => Ok(CompassDirection::WSW),
            "W" => Ok(CompassDirection::W),
            "WNW" => Ok(CompassDirection::WNW),
            "NW" => Ok(CompassDirection::NW),
            "NNW" => Ok(CompassDirection::NNW),
            other => Err(WindRoseError::UnknownDirection(other.to_string())),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CompassDirection::N => "N",
            CompassDirection::NNE => "NNE",
            CompassDirection::NE => "NE",
            CompassDirection::ENE => "ENE",
            CompassDirection::E => "E",
            CompassDirection::ESE => "ESE",
            CompassDirection::SE => "SE",
            CompassDirection::SSE => "SSE",
            CompassDirection::S => "S",
            CompassDirection::SSW => "SSW",
            CompassDirection::SW => "SW",
            CompassDirection::WSW => "WSW",
            CompassDirection::W => "W",
            CompassDirection::WNW => "WNW",
            CompassDirection::NW => "NW",
            CompassDirection::NNW => "NNW",
        }
    }

    /// Azimuth in degrees, north = 0, clockwise in 22.5 steps.
    pub fn degrees(&self) -> f64 {
        match self {
            CompassDirection::N => 0.0,
            CompassDirection::NNE => 22.5,
            CompassDirection::NE => 45.0,
            CompassDirection::ENE => 67.5,
            CompassDirection::E => 90.0,
            CompassDirection::ESE => 112.5,
            CompassDirection::SE => 135.0,
            CompassDirection::SSE => 157.5,
            CompassDirection::S => 180.0,
            CompassDirection::SSW => 202.5,
            CompassDirection::SW => 225.0,
            CompassDirection::WSW => 247.5,
            CompassDirection::W => 270.0,
            CompassDirection::WNW => 292.5,
            CompassDirection::NW => 315.0,
            CompassDirection::NNW => 337.5,
        }
    }

    /// Short label used in report tables.
    pub fn label(&self) -> &'static str {
        match self {
            CompassDirection::N => "С",
            CompassDirection::NNE => "ССВ",
            CompassDirection::NE => "СВ",
            CompassDirection::ENE => "СВС",
            CompassDirection::E => "В",
            CompassDirection::ESE => "ВЮВ",
            CompassDirection::SE => "ЮВ",
            CompassDirection::SSE => "ЮЮВ",
            CompassDirection::S => "Ю",
            CompassDirection::SSW => "ЮЮЗ",
            CompassDirection::SW => "ЮЗ",
            CompassDirection::WSW => "ЗЮЗ",
            CompassDirection::W => "З",
            CompassDirection::WNW => "ЗСЗ",
            CompassDirection::NW => "СЗ",
            CompassDirection::NNW => "ССЗ",
        }
    }

    /// Column position in pivot tables.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for CompassDirection {
    type Err = WindRoseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_code(s)
    }
}

/// Azimuth for a direction code. Fails for anything outside the sixteen
/// compass codes, "CALM" included.
pub fn to_degrees(code: &str) -> Result<f64> {
    CompassDirection::from_code(code).map(|d| d.degrees())
}

/// Display label for a direction code, same domain as [`to_degrees`].
pub fn to_label(code: &str) -> Result<&'static str> {
    CompassDirection::from_code(code).map(|d| d.label())
}

/// Direction field of an observation as read from the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindDirection {
    Calm,
    Compass(CompassDirection),
    /// Text that is neither a compass code nor the calm sentinel. Kept so
    /// the defect surfaces when the codec sees it.
    Unrecognized(String),
}

impl WindDirection {
    /// Parse trimmed source text; empty text means the field is absent.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim().trim_matches('"').trim();
        if value.is_empty() {
            return None;
        }

        if value == CALM_CODE {
            return Some(WindDirection::Calm);
        }

        Some(match CompassDirection::from_code(value) {
            Ok(direction) => WindDirection::Compass(direction),
            Err(_) => WindDirection::Unrecognized(value.to_string()),
        })
    }

    pub fn is_calm(&self) -> bool {
        matches!(self, WindDirection::Calm)
    }

    pub fn code(&self) -> &str {
        match self {
            WindDirection::Calm => CALM_CODE,
            WindDirection::Compass(direction) => direction.code(),
            WindDirection::Unrecognized(text) => text,
        }
    }

    /// Resolve to a compass point, failing for calm and unrecognized text.
    pub fn compass(&self) -> Result<CompassDirection> {
        match self {
            WindDirection::Compass(direction) => Ok(*direction),
            other => Err(WindRoseError::UnknownDirection(other.code().to_string())),
        }
    }
}
