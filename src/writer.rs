//! Line protocol encoder.
//!
//! Serializes [`Point`]s into InfluxDB's line protocol:
//!
//! ```text
//! measurement[,tag=value...] field=value[,field=value...] [timestamp]
//! ```
//!
//! Lines are joined by a single `\n` with no trailing newline, so the rendered batch can be
//! used directly as an HTTP body or UDP payload.

use std::fmt::Write as _;

use crate::error::{Error, Result};
use crate::point::Point;
use crate::precision::Precision;
use crate::value::FieldValue;

/// Characters escaped in measurement names.
const MEASUREMENT_SPECIAL: &[char] = &[',', ' '];
/// Characters escaped in tag keys, tag values and field keys.
const KEY_SPECIAL: &[char] = &[',', '=', ' '];
/// Characters escaped inside quoted string field values.
const STRING_SPECIAL: &[char] = &['\\', '"'];

/// Accumulates encoded points into one newline-separated batch.
///
/// A failing [`write`](Self::write) leaves the buffer exactly as it was, so a batch never
/// contains a partial line.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use influxdb_line_writer::{LineProtocolWriter, Point, Precision};
///
/// let point = Point::builder("cpu")?
///     .tag("host", "server01")?
///     .field("value", 0.64)
///     .timestamp(Utc.timestamp_millis_opt(1_520_000_000_000).unwrap())
///     .build();
///
/// let mut writer = LineProtocolWriter::new(Precision::Millisecond);
/// writer.write(&point)?;
/// assert_eq!(writer.render(), "cpu,host=server01 value=0.64 1520000000000");
/// # Ok::<(), influxdb_line_writer::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineProtocolWriter {
    buf: String,
    precision: Precision,
    lines: usize,
}

impl LineProtocolWriter {
    /// Create an empty writer encoding timestamps at `precision`.
    pub fn new(precision: Precision) -> Self {
        Self {
            buf: String::new(),
            precision,
            lines: 0,
        }
    }

    /// Precision used for timestamps.
    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Encode `point` and append it to the batch.
    ///
    /// On error nothing is appended.
    pub fn write(&mut self, point: &Point) -> Result<()> {
        let mark = self.buf.len();
        if mark > 0 {
            self.buf.push('\n');
        }

        if let Err(e) = self.encode(point) {
            self.buf.truncate(mark);
            return Err(e);
        }

        self.lines += 1;
        Ok(())
    }

    /// Encode every point in `points`, stopping at the first failure.
    ///
    /// Points written before the failure stay in the batch.
    pub fn write_all<'a, I>(&mut self, points: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        for point in points {
            self.write(point)?;
        }
        Ok(())
    }

    /// The batch accumulated so far.
    ///
    /// Writing after rendering continues the same batch.
    pub fn render(&self) -> &str {
        &self.buf
    }

    /// Number of bytes in the batch.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no point has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of lines (points) in the batch.
    pub fn line_count(&self) -> usize {
        self.lines
    }

    /// Drop the accumulated batch, keeping the allocation and precision.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.lines = 0;
    }

    /// Consume the writer and return the batch text.
    pub fn into_string(self) -> String {
        self.buf
    }

    /// Consume the writer and return the batch as UTF-8 bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.into_bytes()
    }

    fn encode(&mut self, point: &Point) -> Result<()> {
        if point.fields().is_empty() {
            return Err(Error::EmptyFieldSet {
                measurement: point.measurement().to_string(),
            });
        }

        check_text(point.measurement(), "measurement")?;
        escape_into(&mut self.buf, point.measurement(), MEASUREMENT_SPECIAL);

        // BTreeMap<String, _> iterates in byte-wise key order
        for (key, value) in point.tags() {
            check_key(key, "tag")?;
            check_text(value, "tag value")?;
            self.buf.push(',');
            escape_into(&mut self.buf, key, KEY_SPECIAL);
            self.buf.push('=');
            escape_into(&mut self.buf, value, KEY_SPECIAL);
        }

        for (i, (key, value)) in point.fields().iter().enumerate() {
            check_key(key, "field")?;
            self.buf.push(if i == 0 { ' ' } else { ',' });
            escape_into(&mut self.buf, key, KEY_SPECIAL);
            self.buf.push('=');
            self.append_field_value(key, value)?;
        }

        if let Some(ts) = point.timestamp() {
            let ticks = self.precision.ticks(ts)?;
            self.buf.push(' ');
            push_display(&mut self.buf, ticks);
        }

        Ok(())
    }

    fn append_field_value(&mut self, key: &str, value: &FieldValue) -> Result<()> {
        let buf = &mut self.buf;
        match value {
            FieldValue::String(s) => append_quoted(buf, key, s)?,
            FieldValue::Char(c) => append_quoted(buf, key, c.encode_utf8(&mut [0; 4]))?,
            FieldValue::Bool(b) => buf.push(if *b { 't' } else { 'f' }),
            FieldValue::F32(v) => {
                check_finite(key, f64::from(*v))?;
                push_display(buf, v);
            }
            FieldValue::F64(v) => {
                check_finite(key, *v)?;
                push_display(buf, v);
            }
            FieldValue::I8(v) => append_integer(buf, v),
            FieldValue::I16(v) => append_integer(buf, v),
            FieldValue::I32(v) => append_integer(buf, v),
            FieldValue::I64(v) => append_integer(buf, v),
            FieldValue::U8(v) => append_integer(buf, v),
            FieldValue::U16(v) => append_integer(buf, v),
            FieldValue::U32(v) => append_integer(buf, v),
            FieldValue::U64(v) => {
                // Line protocol integers are signed 64-bit
                if i64::try_from(*v).is_err() {
                    return Err(Error::UnsupportedValue {
                        message: format!(
                            "field '{}' value {} exceeds the signed 64-bit integer range",
                            key, v
                        ),
                    });
                }
                append_integer(buf, v);
            }
            FieldValue::Other {
                text: Some(text), ..
            } => append_quoted(buf, key, text)?,
            FieldValue::Other {
                type_name,
                text: None,
            } => {
                return Err(Error::UnsupportedType {
                    field: key.to_string(),
                    type_name: type_name.clone(),
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for LineProtocolWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.buf)
    }
}

/// Append `s` to `buf`, prefixing every character in `special` with a backslash.
///
/// Single left-to-right pass: a backslash emitted for one character is never re-examined.
fn escape_into(buf: &mut String, s: &str, special: &[char]) {
    buf.reserve(s.len());
    for c in s.chars() {
        if special.contains(&c) {
            buf.push('\\');
        }
        buf.push(c);
    }
}

fn append_quoted(buf: &mut String, key: &str, s: &str) -> Result<()> {
    if s.contains('\n') {
        return Err(Error::UnsupportedValue {
            message: format!("field '{}' contains a newline: {:?}", key, s),
        });
    }
    buf.push('"');
    escape_into(buf, s, STRING_SPECIAL);
    buf.push('"');
    Ok(())
}

fn append_integer(buf: &mut String, v: impl std::fmt::Display) {
    push_display(buf, v);
    buf.push('i');
}

fn push_display(buf: &mut String, v: impl std::fmt::Display) {
    // Writing into a String cannot fail
    let _ = write!(buf, "{}", v);
}

fn check_key(key: &str, kind: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidIdentifier(format!("empty {} key", kind)));
    }
    check_text(key, &format!("{} key", kind))
}

/// Reject unquoted text the line protocol cannot carry: a newline ends the line, and a
/// trailing backslash would escape the separator written after it.
fn check_text(s: &str, what: &str) -> Result<()> {
    if s.contains('\n') {
        return Err(Error::UnsupportedValue {
            message: format!("{} contains a newline: {:?}", what, s),
        });
    }
    if s.ends_with('\\') {
        return Err(Error::UnsupportedValue {
            message: format!("{} ends with a backslash: {:?}", what, s),
        });
    }
    Ok(())
}

fn check_finite(key: &str, v: f64) -> Result<()> {
    if !v.is_finite() {
        return Err(Error::UnsupportedValue {
            message: format!("field '{}' is not a finite number: {}", key, v),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn encode(point: &Point) -> Result<String> {
        let mut w = LineProtocolWriter::new(Precision::Millisecond);
        w.write(point)?;
        Ok(w.into_string())
    }

    fn single_field(value: impl Into<FieldValue>) -> Result<String> {
        encode(&Point::builder("m").unwrap().field("f", value).build())
    }

    // =========================================================================
    // Escaping tests
    // =========================================================================

    #[test]
    fn test_escape_measurement() {
        let mut s = String::new();
        escape_into(&mut s, "a,b c=d", MEASUREMENT_SPECIAL);
        assert_eq!(s, r"a\,b\ c=d");
    }

    #[test]
    fn test_escape_key() {
        let mut s = String::new();
        escape_into(&mut s, "a,b c=d", KEY_SPECIAL);
        assert_eq!(s, r"a\,b\ c\=d");
    }

    #[test]
    fn test_escape_string_single_pass() {
        let mut s = String::new();
        escape_into(&mut s, r#"say "hi" \o/"#, STRING_SPECIAL);
        assert_eq!(s, r#"say \"hi\" \\o/"#);
    }

    #[test]
    fn test_escape_keeps_backslash_in_keys() {
        let mut s = String::new();
        escape_into(&mut s, r"C:\temp", KEY_SPECIAL);
        assert_eq!(s, r"C:\temp");
    }

    // =========================================================================
    // Field formatting tests
    // =========================================================================

    #[test]
    fn test_format_integers() {
        assert_eq!(single_field(5i32).unwrap(), "m f=5i");
        assert_eq!(single_field(-128i8).unwrap(), "m f=-128i");
        assert_eq!(single_field(65535u16).unwrap(), "m f=65535i");
        assert_eq!(single_field(i64::MIN).unwrap(), "m f=-9223372036854775808i");
        assert_eq!(single_field(u32::MAX).unwrap(), "m f=4294967295i");
    }

    #[test]
    fn test_format_u64_bounds() {
        assert_eq!(
            single_field(i64::MAX as u64).unwrap(),
            "m f=9223372036854775807i"
        );
        assert!(matches!(
            single_field(i64::MAX as u64 + 1),
            Err(Error::UnsupportedValue { .. })
        ));
    }

    #[test]
    fn test_format_floats() {
        assert_eq!(single_field(72.5).unwrap(), "m f=72.5");
        assert_eq!(single_field(0.1f32).unwrap(), "m f=0.1");
        assert_eq!(single_field(1.0).unwrap(), "m f=1");
        assert_eq!(single_field(-0.000123).unwrap(), "m f=-0.000123");
    }

    #[test]
    fn test_format_non_finite_floats_rejected() {
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(single_field(v), Err(Error::UnsupportedValue { .. })));
        }
        assert!(matches!(
            single_field(f32::NAN),
            Err(Error::UnsupportedValue { .. })
        ));
    }

    #[test]
    fn test_format_bool() {
        assert_eq!(single_field(true).unwrap(), "m f=t");
        assert_eq!(single_field(false).unwrap(), "m f=f");
    }

    #[test]
    fn test_format_strings() {
        assert_eq!(single_field("a\\b").unwrap(), r#"m f="a\\b""#);
        assert_eq!(single_field(r#"x"y"#).unwrap(), r#"m f="x\"y""#);
        assert_eq!(single_field("a, b=c").unwrap(), r#"m f="a, b=c""#);
        assert_eq!(single_field('"').unwrap(), r#"m f="\"""#);
        assert_eq!(single_field('é').unwrap(), "m f=\"é\"");
    }

    #[test]
    fn test_format_other() {
        let v = FieldValue::display(&std::net::Ipv4Addr::LOCALHOST);
        assert_eq!(single_field(v).unwrap(), r#"m f="127.0.0.1""#);

        let err = single_field(FieldValue::opaque::<Vec<u8>>()).unwrap_err();
        match err {
            Error::UnsupportedType { field, .. } => assert_eq!(field, "f"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_newline_rejected() {
        assert!(matches!(
            single_field("two\nlines"),
            Err(Error::UnsupportedValue { .. })
        ));

        let p = Point::builder("m\n").unwrap().field("f", 1).build();
        assert!(matches!(encode(&p), Err(Error::UnsupportedValue { .. })));

        let p = Point::builder("m")
            .unwrap()
            .tag("k", "v\n")
            .unwrap()
            .field("f", 1)
            .build();
        assert!(matches!(encode(&p), Err(Error::UnsupportedValue { .. })));
    }

    #[test]
    fn test_empty_field_key_rejected() {
        let p = Point::builder("m").unwrap().field("", 1).build();
        assert!(matches!(encode(&p), Err(Error::InvalidIdentifier(_))));
    }

    #[test]
    fn test_trailing_backslash_rejected_outside_quotes() {
        let good = Point::builder("m").unwrap().field("f", 1).build();
        let bad = Point::builder("m")
            .unwrap()
            .tag("path", r"C:\")
            .unwrap()
            .field("f", 1)
            .build();

        let mut w = LineProtocolWriter::new(Precision::Second);
        w.write(&good).unwrap();
        assert!(matches!(w.write(&bad), Err(Error::UnsupportedValue { .. })));
        assert_eq!(w.render(), "m f=1i");

        // quoted strings escape the backslash, so they are fine
        assert_eq!(single_field(r"C:\").unwrap(), r#"m f="C:\\""#);
    }

    // =========================================================================
    // Batch tests
    // =========================================================================

    #[test]
    fn test_failed_write_leaves_buffer_untouched() {
        let good = Point::builder("m").unwrap().field("f", 1).build();
        let bad = Point::builder("m")
            .unwrap()
            .field("ok", 1)
            .field("bad", f64::NAN)
            .build();

        let mut w = LineProtocolWriter::new(Precision::Second);
        w.write(&good).unwrap();
        let before = w.render().to_string();

        assert!(w.write(&bad).is_err());
        assert_eq!(w.render(), before);
        assert_eq!(w.line_count(), 1);

        w.write(&good).unwrap();
        assert_eq!(w.render(), "m f=1i\nm f=1i");
    }

    #[test]
    fn test_first_failed_write_leaves_buffer_empty() {
        let bad = Point::builder("m").unwrap().build();
        let mut w = LineProtocolWriter::default();
        assert!(matches!(w.write(&bad), Err(Error::EmptyFieldSet { .. })));
        assert!(w.is_empty());
        assert_eq!(w.line_count(), 0);
    }

    #[test]
    fn test_write_after_render_continues() {
        let p = Point::builder("m").unwrap().field("f", 1).build();
        let mut w = LineProtocolWriter::default();
        w.write(&p).unwrap();
        assert_eq!(w.render(), "m f=1i");
        w.write(&p).unwrap();
        assert_eq!(w.to_string(), "m f=1i\nm f=1i");
    }

    #[test]
    fn test_clear_resets_batch() {
        let p = Point::builder("m").unwrap().field("f", 1).build();
        let mut w = LineProtocolWriter::new(Precision::Hour);
        w.write(&p).unwrap();
        w.clear();
        assert!(w.is_empty());
        assert_eq!(w.line_count(), 0);
        assert_eq!(w.precision(), Precision::Hour);
        w.write(&p).unwrap();
        assert_eq!(w.render(), "m f=1i");
    }

    #[test]
    fn test_timestamp_precision() {
        let ts = Utc.timestamp_millis_opt(2_000).unwrap();
        let p = Point::builder("m").unwrap().field("f", 1).timestamp(ts).build();

        let mut w = LineProtocolWriter::new(Precision::Second);
        w.write(&p).unwrap();
        assert_eq!(w.render(), "m f=1i 2");

        let mut w = LineProtocolWriter::new(Precision::Nanosecond);
        w.write(&p).unwrap();
        assert_eq!(w.render(), "m f=1i 2000000000");
    }
}
