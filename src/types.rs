//! Value vocabularies shared by the descriptor and the system section.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::INIT_YEAR_EPOCH;
use crate::error::{Error, Result};

/// Position of the unit in the rig.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::FromRepr,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum UnitType {
    #[default]
    None = 0,
    Left = 1,
    Right = 2,
    Front = 3,
    Speaker = 4,
}

impl TryFrom<u8> for UnitType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        UnitType::from_repr(value).ok_or(Error::InvalidEnumValue {
            field: "unit_type",
            value,
        })
    }
}

/// Mounting orientation as recorded in the hardware descriptor.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::FromRepr,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[repr(u8)]
pub enum UnitOrientation {
    #[default]
    VerticalUp = 0,
    VerticalDown = 1,
    Flat = 2,
}

impl TryFrom<u8> for UnitOrientation {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        UnitOrientation::from_repr(value).ok_or(Error::InvalidEnumValue {
            field: "unit_orientation",
            value,
        })
    }
}

/// Orientation code packed into the config flags.
///
/// Units shipped before the orientation feature carry the reserved code, which
/// decodes to `Unspecified` instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Orientation {
    VerticalUp,
    VerticalDown,
    Flat,
    #[default]
    Unspecified,
}

impl Orientation {
    pub const fn from_code(code: u8) -> Self {
        match code & 0b11 {
            0 => Orientation::VerticalUp,
            1 => Orientation::VerticalDown,
            2 => Orientation::Flat,
            _ => Orientation::Unspecified,
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            Orientation::VerticalUp => 0,
            Orientation::VerticalDown => 1,
            Orientation::Flat => 2,
            Orientation::Unspecified => 3,
        }
    }
}

impl From<UnitOrientation> for Orientation {
    fn from(value: UnitOrientation) -> Self {
        Orientation::from_code(value as u8)
    }
}

/// Motor-driver slave tuning triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SlaveTuning {
    pub slave_addr: u8,
    pub speed: u8,
    pub accel: u8,
}

/// Manufacturing/activation date. The year is stored as an offset from 2000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InitDate {
    year_offset: u8,
    month: u8,
    day: u8,
}

impl InitDate {
    pub fn from_ymd(year: u16, month: u8, day: u8) -> Result<Self> {
        let invalid = Error::InvalidDate { year, month, day };
        let year_offset = year
            .checked_sub(INIT_YEAR_EPOCH)
            .and_then(|y| u8::try_from(y).ok())
            .ok_or(invalid)?;
        let date = InitDate {
            year_offset,
            month,
            day,
        };
        if !date.is_valid() {
            return Err(Error::InvalidDate { year, month, day });
        }
        Ok(date)
    }

    /// Bytes as stored, without validation.
    pub const fn from_raw(year_offset: u8, month: u8, day: u8) -> Self {
        InitDate {
            year_offset,
            month,
            day,
        }
    }

    pub const fn to_raw(self) -> [u8; 3] {
        [self.year_offset, self.month, self.day]
    }

    pub const fn year(&self) -> u16 {
        INIT_YEAR_EPOCH + self.year_offset as u16
    }

    pub const fn month(&self) -> u8 {
        self.month
    }

    pub const fn day(&self) -> u8 {
        self.day
    }

    /// Blank or erased stores hold dates that fail this check.
    pub const fn is_valid(&self) -> bool {
        self.month >= 1 && self.month <= 12 && self.day >= 1 && self.day <= 31
    }
}

impl fmt::Display for InitDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.year(), self.month, self.day)
    }
}

impl std::str::FromStr for InitDate {
    type Err = Error;

    /// Parses `YYYY-MM-DD`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidDate {
            year: 0,
            month: 0,
            day: 0,
        };
        let mut parts = s.trim().splitn(3, '-');
        let year = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let month = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let day = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        InitDate::from_ymd(year, month, day)
    }
}

impl Serialize for InitDate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InitDate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s: String = Deserialize::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_type_rejects_unknown_codes() {
        assert_eq!(UnitType::try_from(4).unwrap(), UnitType::Speaker);
        assert!(matches!(
            UnitType::try_from(5),
            Err(Error::InvalidEnumValue { field: "unit_type", value: 5 })
        ));
    }

    #[test]
    fn unit_orientation_rejects_reserved_code() {
        assert_eq!(UnitOrientation::try_from(2).unwrap(), UnitOrientation::Flat);
        assert!(UnitOrientation::try_from(3).is_err());
    }

    #[test]
    fn orientation_codes() {
        for code in 0..4 {
            assert_eq!(Orientation::from_code(code).code(), code);
        }
        assert_eq!(Orientation::from_code(3), Orientation::Unspecified);
        assert_eq!(Orientation::from(UnitOrientation::VerticalDown), Orientation::VerticalDown);
    }

    #[test]
    fn init_date_epoch() {
        let date = InitDate::from_ymd(2024, 6, 1).unwrap();
        assert_eq!(date.to_raw(), [24, 6, 1]);
        assert_eq!(date.year(), 2024);
        assert_eq!(date.to_string(), "2024-06-01");
        assert_eq!("2024-06-01".parse::<InitDate>().unwrap(), date);
    }

    #[test]
    fn init_date_out_of_range() {
        assert!(InitDate::from_ymd(1999, 1, 1).is_err());
        assert!(InitDate::from_ymd(2256, 1, 1).is_err());
        assert!(InitDate::from_ymd(2024, 13, 1).is_err());
        assert!(InitDate::from_ymd(2024, 1, 0).is_err());
        assert!("2024/06/01".parse::<InitDate>().is_err());
    }

    #[test]
    fn erased_date_is_kept_but_flagged() {
        let date = InitDate::from_raw(0xff, 0xff, 0xff);
        assert!(!date.is_valid());
        assert_eq!(date.year(), 2255);
    }
}
