//! The point data model.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::{Error, Result};
use crate::value::FieldValue;

/// A single sample: measurement, tags, fields and an optional timestamp.
///
/// Points are built with [`Point::builder`] and are read-only afterwards.
///
/// # Example
///
/// ```
/// use influxdb_line_writer::Point;
///
/// let point = Point::builder("cpu")?
///     .tag("host", "server01")?
///     .field("value", 0.64)
///     .build();
///
/// assert_eq!(point.measurement(), "cpu");
/// assert_eq!(point.tag("host"), Some("server01"));
/// # Ok::<(), influxdb_line_writer::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    measurement: String,
    tags: BTreeMap<String, String>,
    fields: Vec<(String, FieldValue)>,
    timestamp: Option<DateTime<Utc>>,
}

impl Point {
    /// Start building a point for `measurement`.
    ///
    /// Fails with [`Error::InvalidIdentifier`] when the measurement is empty or whitespace.
    pub fn builder(measurement: impl Into<String>) -> Result<PointBuilder> {
        let measurement = measurement.into();
        if measurement.trim().is_empty() {
            return Err(Error::InvalidIdentifier(
                "measurement must not be empty".to_string(),
            ));
        }

        Ok(PointBuilder {
            point: Point {
                measurement,
                tags: BTreeMap::new(),
                fields: Vec::new(),
                timestamp: None,
            },
        })
    }

    /// Get the measurement name.
    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    /// Tags ordered by key.
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Get a tag value by key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Get a field value by key.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Get the timestamp, normalized to UTC.
    pub fn timestamp(&self) -> Option<&DateTime<Utc>> {
        self.timestamp.as_ref()
    }
}

/// Builder for [`Point`].
#[derive(Clone, Debug)]
pub struct PointBuilder {
    point: Point,
}

impl PointBuilder {
    /// Set a tag, replacing any previous value for the same key.
    ///
    /// Empty keys fail with [`Error::InvalidIdentifier`] and empty values with
    /// [`Error::UnsupportedValue`]: line protocol cannot express either.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let value = value.into();
        if key.is_empty() {
            return Err(Error::InvalidIdentifier(format!(
                "empty tag key on measurement '{}'",
                self.point.measurement
            )));
        }
        if value.is_empty() {
            return Err(Error::UnsupportedValue {
                message: format!("empty value for tag '{}'", key),
            });
        }

        self.point.tags.insert(key, value);
        Ok(self)
    }

    /// Set a field, replacing any previous value for the same key in place.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.point.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.point.fields.push((key, value)),
        }
        self
    }

    /// Set the timestamp. Any timezone is accepted; it is stored as UTC.
    pub fn timestamp<Tz: TimeZone>(mut self, instant: DateTime<Tz>) -> Self {
        self.point.timestamp = Some(instant.with_timezone(&Utc));
        self
    }

    /// Finish the point.
    pub fn build(self) -> Point {
        self.point
    }
}
