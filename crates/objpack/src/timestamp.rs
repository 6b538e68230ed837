//! Timestamp value and its MessagePack extension payload (type -1)

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{DecodeError, TimestampError};
use crate::wire::ByteSink;

/// Nanoseconds in one second.
pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Seconds that fit the 34-bit field of the 8-byte form.
const SECONDS_34_MASK: u64 = 0x0000_0003_ffff_ffff;

/// A point in time as seconds plus nanoseconds since the Unix epoch.
///
/// Ordered by `(seconds, nanoseconds)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    seconds: i64,
    nanoseconds: u32,
}

impl Timestamp {
    /// Create a timestamp, rejecting `nanoseconds >= 1_000_000_000`.
    pub fn new(seconds: i64, nanoseconds: u32) -> Result<Self, TimestampError> {
        if nanoseconds >= NANOS_PER_SEC {
            return Err(TimestampError::NanosecondsOutOfRange { nanoseconds });
        }
        Ok(Self {
            seconds,
            nanoseconds,
        })
    }

    /// Whole seconds, no fraction.
    pub fn from_secs(seconds: i64) -> Self {
        Self {
            seconds,
            nanoseconds: 0,
        }
    }

    /// Convert fractional seconds, rounding to the nearest nanosecond.
    ///
    /// Negative fractions borrow a second so `nanoseconds` stays positive:
    /// `-1.5` becomes `(-2, 500_000_000)`.
    pub fn from_secs_f64(value: f64) -> Result<Self, TimestampError> {
        if !value.is_finite() {
            return Err(TimestampError::OutOfRange);
        }
        let mut seconds = value.trunc();
        let mut nanoseconds = ((value - seconds) * NANOS_PER_SEC as f64).round();
        if nanoseconds >= NANOS_PER_SEC as f64 {
            nanoseconds -= NANOS_PER_SEC as f64;
            seconds += 1.0;
        } else if nanoseconds < 0.0 {
            nanoseconds += NANOS_PER_SEC as f64;
            seconds -= 1.0;
        }
        // i64::MAX is not representable; 2^63 is the first value out of range
        if seconds < i64::MIN as f64 || seconds >= i64::MAX as f64 {
            return Err(TimestampError::OutOfRange);
        }
        Self::new(seconds as i64, nanoseconds as u32)
    }

    /// Seconds since the epoch
    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Nanoseconds within the second
    pub fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }

    /// Fractional seconds since the epoch (lossy).
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + self.nanoseconds as f64 / NANOS_PER_SEC as f64
    }

    /// Write the 4, 8 or 12-byte payload.
    pub(crate) fn write_payload(&self, sink: &mut ByteSink) {
        let seconds = self.seconds as u64;
        if seconds >> 34 == 0 {
            let value = ((self.nanoseconds as u64) << 34) | seconds;
            if value >> 32 == 0 {
                sink.put_slice(&(value as u32).to_be_bytes());
            } else {
                sink.put_slice(&value.to_be_bytes());
            }
        } else {
            sink.put_slice(&self.nanoseconds.to_be_bytes());
            sink.put_slice(&self.seconds.to_be_bytes());
        }
    }

    /// Parse a payload of exactly 4, 8 or 12 bytes.
    pub(crate) fn read_payload(payload: &[u8]) -> Result<Self, DecodeError> {
        let (seconds, nanoseconds) = match *payload {
            [a, b, c, d] => (u32::from_be_bytes([a, b, c, d]) as i64, 0),
            [a, b, c, d, e, f, g, h] => {
                let value = u64::from_be_bytes([a, b, c, d, e, f, g, h]);
                ((value & SECONDS_34_MASK) as i64, (value >> 34) as u32)
            }
            [a, b, c, d, ref rest @ ..] if rest.len() == 8 => {
                let mut seconds = [0u8; 8];
                seconds.copy_from_slice(rest);
                (
                    i64::from_be_bytes(seconds),
                    u32::from_be_bytes([a, b, c, d]),
                )
            }
            _ => {
                return Err(DecodeError::InvalidSize {
                    what: "timestamp",
                    size: payload.len(),
                })
            }
        };
        Ok(Self::new(seconds, nanoseconds)?)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Timestamp(seconds={}, nanoseconds={:09})",
            self.seconds, self.nanoseconds
        )
    }
}

impl TryFrom<SystemTime> for Timestamp {
    type Error = TimestampError;

    fn try_from(time: SystemTime) -> Result<Self, Self::Error> {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => {
                let seconds =
                    i64::try_from(after.as_secs()).map_err(|_| TimestampError::OutOfRange)?;
                Self::new(seconds, after.subsec_nanos())
            }
            Err(err) => {
                let before = err.duration();
                let seconds =
                    i64::try_from(before.as_secs()).map_err(|_| TimestampError::OutOfRange)?;
                match before.subsec_nanos() {
                    0 => Self::new(-seconds, 0),
                    nanos => Self::new(-seconds - 1, NANOS_PER_SEC - nanos),
                }
            }
        }
    }
}

impl TryFrom<Timestamp> for SystemTime {
    type Error = TimestampError;

    fn try_from(ts: Timestamp) -> Result<Self, Self::Error> {
        let time = if ts.seconds >= 0 {
            UNIX_EPOCH.checked_add(Duration::new(ts.seconds as u64, ts.nanoseconds))
        } else {
            UNIX_EPOCH
                .checked_sub(Duration::from_secs(ts.seconds.unsigned_abs()))
                .and_then(|t| t.checked_add(Duration::from_nanos(ts.nanoseconds as u64)))
        };
        time.ok_or(TimestampError::OutOfRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(ts: Timestamp) -> Vec<u8> {
        let mut sink = ByteSink::new();
        ts.write_payload(&mut sink);
        sink.into_vec()
    }

    #[test]
    fn test_payload_widths() {
        assert_eq!(payload(Timestamp::from_secs(0)).len(), 4);
        assert_eq!(payload(Timestamp::from_secs(u32::MAX as i64)).len(), 4);
        assert_eq!(payload(Timestamp::from_secs(1 << 32)).len(), 8);
        assert_eq!(payload(Timestamp::new(0, 1).unwrap()).len(), 8);
        assert_eq!(payload(Timestamp::from_secs((1 << 34) - 1)).len(), 8);
        assert_eq!(payload(Timestamp::from_secs(1 << 34)).len(), 12);
        assert_eq!(payload(Timestamp::from_secs(-1)).len(), 12);
    }

    #[test]
    fn test_eight_byte_layout() {
        let ts = Timestamp::new(1, 1).unwrap();
        let expected = ((1u64 << 34) | 1).to_be_bytes().to_vec();
        assert_eq!(payload(ts), expected);
    }

    #[test]
    fn test_read_payload() {
        for ts in [
            Timestamp::from_secs(7),
            Timestamp::new(1_700_000_000, 999_999_999).unwrap(),
            Timestamp::new(-5, 3).unwrap(),
        ] {
            assert_eq!(Timestamp::read_payload(&payload(ts)).unwrap(), ts);
        }
        assert!(matches!(
            Timestamp::read_payload(&[0; 5]),
            Err(DecodeError::InvalidSize {
                what: "timestamp",
                size: 5
            })
        ));
    }

    #[test]
    fn test_read_payload_rejects_large_nanos() {
        let mut bytes = NANOS_PER_SEC.to_be_bytes().to_vec();
        bytes.extend_from_slice(&0i64.to_be_bytes());
        assert!(matches!(
            Timestamp::read_payload(&bytes),
            Err(DecodeError::InvalidTimestamp(
                TimestampError::NanosecondsOutOfRange { .. }
            ))
        ));
    }

    #[test]
    fn test_new_validates_nanos() {
        assert!(Timestamp::new(0, 999_999_999).is_ok());
        assert_eq!(
            Timestamp::new(0, 1_000_000_000),
            Err(TimestampError::NanosecondsOutOfRange {
                nanoseconds: 1_000_000_000
            })
        );
    }

    #[test]
    fn test_from_secs_f64() {
        assert_eq!(
            Timestamp::from_secs_f64(1.5).unwrap(),
            Timestamp::new(1, 500_000_000).unwrap()
        );
        assert_eq!(
            Timestamp::from_secs_f64(-1.5).unwrap(),
            Timestamp::new(-2, 500_000_000).unwrap()
        );
        assert_eq!(Timestamp::from_secs_f64(f64::NAN), Err(TimestampError::OutOfRange));
        assert_eq!(Timestamp::from_secs_f64(1e19), Err(TimestampError::OutOfRange));
    }

    #[test]
    fn test_ordering_and_display() {
        let a = Timestamp::new(1, 5).unwrap();
        let b = Timestamp::new(1, 6).unwrap();
        assert!(a < b);
        assert!(Timestamp::from_secs(0) < a);
        assert_eq!(a.to_string(), "Timestamp(seconds=1, nanoseconds=000000005)");
    }

    #[test]
    fn test_system_time_conversion() {
        let ts = Timestamp::new(-2, 250_000_000).unwrap();
        let time = SystemTime::try_from(ts).unwrap();
        assert_eq!(Timestamp::try_from(time).unwrap(), ts);
        assert_eq!(
            Timestamp::try_from(UNIX_EPOCH + Duration::from_millis(1500)).unwrap(),
            Timestamp::new(1, 500_000_000).unwrap()
        );
    }
}
