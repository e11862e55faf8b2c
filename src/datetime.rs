//! A BSON datetime with millisecond precision.

use std::{
    fmt,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use time::format_description::well_known::Rfc3339;

use crate::error::{Error, Result};

/// A point in time, stored as a signed number of milliseconds since the Unix
/// epoch, the exact precision the wire format carries.
///
/// Construction from a higher-precision source such as [`SystemTime`]
/// truncates to the millisecond, so two timestamps that land in the same
/// millisecond compare equal:
///
/// ```
/// use binary_json::DateTime;
/// use std::time::Duration;
///
/// let st = std::time::SystemTime::UNIX_EPOCH + Duration::new(3, 500_600_700);
/// let dt = DateTime::from_system_time(st);
/// assert_eq!(dt, DateTime::from_millis(3_500));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime(i64);

impl DateTime {
    /// The current time, truncated to the millisecond.
    pub fn now() -> DateTime {
        Self::from_system_time(SystemTime::now())
    }

    /// Construct from the given number of milliseconds since the Unix epoch.
    pub const fn from_millis(millis: i64) -> DateTime {
        DateTime(millis)
    }

    /// The number of milliseconds since the Unix epoch.
    pub const fn timestamp_millis(self) -> i64 {
        self.0
    }

    /// Convert from a [`SystemTime`], truncating to the millisecond.
    ///
    /// Times outside the representable range are clamped.
    pub fn from_system_time(st: SystemTime) -> DateTime {
        match st.duration_since(UNIX_EPOCH) {
            Ok(d) => {
                let millis = d.as_millis();
                if millis > i64::MAX as u128 {
                    DateTime(i64::MAX)
                } else {
                    DateTime(millis as i64)
                }
            }
            // handle SystemTime instances that represent times before the epoch
            Err(e) => {
                let millis = e.duration().as_millis();
                if millis > i64::MAX as u128 {
                    DateTime(i64::MIN)
                } else {
                    DateTime(-(millis as i64))
                }
            }
        }
    }

    /// Convert to a [`SystemTime`].
    pub fn to_system_time(self) -> SystemTime {
        if self.0 >= 0 {
            UNIX_EPOCH + Duration::from_millis(self.0 as u64)
        } else {
            UNIX_EPOCH - Duration::from_millis(self.0.unsigned_abs())
        }
    }

    /// Format as an RFC 3339 / ISO-8601 string. Fails for datetimes outside
    /// the formattable year range.
    pub fn try_to_rfc3339_string(self) -> Result<String> {
        let odt = time::OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.0) * 1_000_000)
            .map_err(|e| {
                Error::malformed(format!("datetime {} ms is outside the RFC 3339 range: {}", self.0, e))
            })?;
        odt.format(&Rfc3339)
            .map_err(|e| Error::malformed(format!("cannot format {} as RFC 3339: {}", self.0, e)))
    }

    /// Parse an RFC 3339 formatted string, truncating to the millisecond.
    pub fn parse_rfc3339_str(s: impl AsRef<str>) -> Result<DateTime> {
        let odt = time::OffsetDateTime::parse(s.as_ref(), &Rfc3339)
            .map_err(|e| Error::malformed(format!("invalid RFC 3339 datetime: {}", e)))?;
        Ok(DateTime((odt.unix_timestamp_nanos() / 1_000_000) as i64))
    }
}

impl From<SystemTime> for DateTime {
    fn from(st: SystemTime) -> Self {
        Self::from_system_time(st)
    }
}

impl From<DateTime> for SystemTime {
    fn from(dt: DateTime) -> Self {
        dt.to_system_time()
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_to_rfc3339_string() {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{} ms", self.0),
        }
    }
}

impl fmt::Debug for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DateTime({})", self)
    }
}
