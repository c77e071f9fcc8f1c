//! # influxdb-line-writer
//!
//! Encodes measurement samples into InfluxDB's line protocol and delivers them over HTTP
//! or UDP.
//!
//! ## Why?
//!
//! Line protocol is a permissive text format. An unescaped comma in a tag value, a float
//! printed as `NaN`, or a timestamp in the wrong unit is often accepted by the server and
//! silently stored as the wrong data. This crate makes every one of those cases either
//! encode correctly or fail loudly before anything is sent.
//!
//! ## Quick Start
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use influxdb_line_writer::{LineProtocolWriter, Point, Precision};
//!
//! let point = Point::builder("weather,station")?
//!     .tag("loc ation", "north")?
//!     .field("temp", 72.5)
//!     .field("ok", true)
//!     .field("count", 5)
//!     .timestamp(Utc.timestamp_millis_opt(2_000).unwrap())
//!     .build();
//!
//! let mut writer = LineProtocolWriter::new(Precision::Second);
//! writer.write(&point)?;
//! assert_eq!(
//!     writer.render(),
//!     r"weather\,station,loc\ ation=north temp=72.5,ok=t,count=5i 2"
//! );
//! # Ok::<(), influxdb_line_writer::Error>(())
//! ```
//!
//! Sending over HTTP:
//!
//! ```ignore
//! use influxdb_line_writer::{ClientConfig, HttpClient};
//!
//! let client = HttpClient::new(ClientConfig::new("telemetry"))?;
//! client.write(&points).await?;
//! ```
//!
//! ## Features
//!
//! - **Single-pass escaping**: measurement, tag and field keys, tag values and string fields
//! - **Deterministic output**: tags sorted byte-wise, fields in insertion order
//! - **Typed fields**: integers get the `i` suffix, floats print their shortest round-trip
//!   form, `u64` values beyond `i64::MAX` are rejected
//! - **Atomic writes**: a point that fails to encode leaves the batch untouched
//! - **Precision scaling**: nanoseconds through hours

pub mod client;
pub mod config;
pub mod error;
pub mod point;
pub mod precision;
pub mod udp;
pub mod value;
pub mod writer;

// Re-export main types at crate root
pub use client::HttpClient;
pub use config::{ClientConfig, Credentials};
pub use error::{Error, Result};
pub use point::{Point, PointBuilder};
pub use precision::Precision;
pub use udp::UdpClient;
pub use value::FieldValue;
pub use writer::LineProtocolWriter;
