//! Movement and resolution payloads
//!
//! Movement payloads are comma-joined decimal fields in fixed order:
//! `dx,dy,left,right,middle[,wheel]`. Buttons are `1` (held) or `0`.
//! Whether the wheel field is present depends on the personality's
//! [`WheelField`] policy.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::personality::WheelField;

/// Mouse button state carried by a movement report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Buttons {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

impl Buttons {
    /// Returns true if no button is held
    pub fn is_empty(&self) -> bool {
        !(self.left || self.right || self.middle)
    }
}

/// A single pointer report
///
/// `dx`/`dy` are deltas for relative reports and coordinates for absolute
/// ones. No range checks are applied; the firmware gets what it is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MouseReport {
    pub dx: i32,
    pub dy: i32,
    pub buttons: Buttons,
    /// Wheel delta; `None` lets PS/2 send the short 5-field form
    pub wheel: Option<i32>,
}

impl MouseReport {
    /// Report with motion only
    pub fn new(dx: i32, dy: i32) -> Self {
        Self {
            dx,
            dy,
            ..Default::default()
        }
    }

    pub fn with_left(mut self, held: bool) -> Self {
        self.buttons.left = held;
        self
    }

    pub fn with_right(mut self, held: bool) -> Self {
        self.buttons.right = held;
        self
    }

    pub fn with_middle(mut self, held: bool) -> Self {
        self.buttons.middle = held;
        self
    }

    pub fn with_wheel(mut self, wheel: Option<i32>) -> Self {
        self.wheel = wheel;
        self
    }

    /// Render the comma-joined payload
    pub fn to_fields(&self, policy: WheelField) -> String {
        let mut fields = format!(
            "{},{},{},{},{}",
            self.dx,
            self.dy,
            flag(self.buttons.left),
            flag(self.buttons.right),
            flag(self.buttons.middle)
        );
        match (policy, self.wheel) {
            (WheelField::Always, wheel) => {
                fields.push_str(&format!(",{}", wheel.unwrap_or(0)));
            }
            (WheelField::WhenSet, Some(wheel)) => {
                fields.push_str(&format!(",{}", wheel));
            }
            (WheelField::WhenSet, None) => {}
        }
        fields
    }

    /// Parse a 5- or 6-field payload
    pub fn parse(payload: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = payload.split(',').map(str::trim).collect();
        if fields.len() != 5 && fields.len() != 6 {
            return Err(ParseError::InvalidMovement(payload.into()));
        }

        let number = |s: &str| {
            s.parse::<i32>()
                .map_err(|_| ParseError::InvalidMovement(payload.into()))
        };

        Ok(Self {
            dx: number(fields[0])?,
            dy: number(fields[1])?,
            buttons: Buttons {
                left: parse_flag(fields[2])?,
                right: parse_flag(fields[3])?,
                middle: parse_flag(fields[4])?,
            },
            wheel: fields.get(5).map(|w| number(*w)).transpose()?,
        })
    }
}

fn flag(held: bool) -> u8 {
    if held {
        1
    } else {
        0
    }
}

fn parse_flag(s: &str) -> Result<bool, ParseError> {
    match s {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(ParseError::InvalidButton(other.into())),
    }
}

/// Target screen size for USB absolute mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| ParseError::InvalidResolution(s.into()))?;
        let width = w
            .parse()
            .map_err(|_| ParseError::InvalidResolution(s.into()))?;
        let height = h
            .parse()
            .map_err(|_| ParseError::InvalidResolution(s.into()))?;
        Ok(Self { width, height })
    }
}
