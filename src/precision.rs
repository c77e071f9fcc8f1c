//! Timestamp precision for encoded points.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Unit in which an encoded timestamp is expressed.
///
/// Serialized as the short code InfluxDB expects in its `precision` query parameter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Precision {
    /// Nanoseconds (`n`).
    #[serde(rename = "n")]
    Nanosecond,
    /// Microseconds (`u`).
    #[serde(rename = "u")]
    Microsecond,
    /// Milliseconds (`ms`).
    #[default]
    #[serde(rename = "ms")]
    Millisecond,
    /// Seconds (`s`).
    #[serde(rename = "s")]
    Second,
    /// Minutes (`m`).
    #[serde(rename = "m")]
    Minute,
    /// Hours (`h`).
    #[serde(rename = "h")]
    Hour,
}

impl Precision {
    /// The code sent to the server for this unit.
    pub fn code(&self) -> &'static str {
        match self {
            Precision::Nanosecond => "n",
            Precision::Microsecond => "u",
            Precision::Millisecond => "ms",
            Precision::Second => "s",
            Precision::Minute => "m",
            Precision::Hour => "h",
        }
    }

    fn nanos_per_unit(&self) -> i128 {
        match self {
            Precision::Nanosecond => 1,
            Precision::Microsecond => 1_000,
            Precision::Millisecond => 1_000_000,
            Precision::Second => 1_000_000_000,
            Precision::Minute => 60 * 1_000_000_000,
            Precision::Hour => 3_600 * 1_000_000_000,
        }
    }

    /// Whole units elapsed between the Unix epoch and `instant`, truncated toward zero.
    ///
    /// Fails when the count does not fit in an `i64`, which only happens at nanosecond
    /// precision for instants centuries away from 1970.
    pub fn ticks(&self, instant: &DateTime<Utc>) -> Result<i64> {
        let nanos = i128::from(instant.timestamp()) * 1_000_000_000
            + i128::from(instant.timestamp_subsec_nanos());
        // i128 division truncates toward zero, so pre-epoch instants round up
        let ticks = nanos / self.nanos_per_unit();
        i64::try_from(ticks).map_err(|_| Error::UnsupportedValue {
            message: format!(
                "timestamp {} does not fit in a 64-bit count of unit '{}'",
                instant.to_rfc3339(),
                self.code()
            ),
        })
    }
}

impl FromStr for Precision {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        match input {
            "n" | "ns" => Ok(Self::Nanosecond),
            "u" | "us" => Ok(Self::Microsecond),
            "ms" => Ok(Self::Millisecond),
            "s" => Ok(Self::Second),
            "m" => Ok(Self::Minute),
            "h" => Ok(Self::Hour),
            _ => Err(Error::Config {
                message: format!("unknown precision '{}'", input),
            }),
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
