use std::fmt::{self, Display};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Offset between 0001-01-01 and 1970-01-01 in 100 nanosecond ticks
const UNIX_EPOCH_TICKS: u64 = 621_355_968_000_000_000;

const TICKS_PER_SECOND: u64 = 10_000_000;

/// The top two bits of a raw .NET tick value carry the `DateTimeKind`
const KIND_MASK: u64 = 0x3FFF_FFFF_FFFF_FFFF;

/// An instant in time as stored in world save data.
///
/// World files embed .NET `DateTime` values: a 62 bit count of 100 nanosecond
/// ticks since 0001-01-01, with the kind of the time in the top two bits. A
/// [Timestamp] is the decoded form of that value, re-based onto the Unix
/// epoch. Tick counts that precede the Unix epoch decode to the
/// [Timestamp::EPOCH] sentinel, which the format uses for "no timestamp".
///
/// ```
/// use burrow::Timestamp;
/// let created = Timestamp::from_dotnet_ticks(638_081_280_000_000_000);
/// assert_eq!(created.to_string(), "2023-01-01T00:00:00Z");
/// assert_eq!(Timestamp::from_dotnet_ticks(42), Timestamp::EPOCH);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    ticks: u64,
}

impl Timestamp {
    /// The zero instant, 1970-01-01T00:00:00Z. Doubles as the "no timestamp"
    /// sentinel.
    pub const EPOCH: Timestamp = Timestamp { ticks: 0 };

    /// Decode a raw .NET tick value: mask the kind bits and re-base onto the
    /// Unix epoch, clamping anything earlier to [Timestamp::EPOCH].
    #[inline]
    pub fn from_dotnet_ticks(raw: u64) -> Self {
        let ticks = raw & KIND_MASK;
        if ticks < UNIX_EPOCH_TICKS {
            Timestamp::EPOCH
        } else {
            Timestamp {
                ticks: ticks - UNIX_EPOCH_TICKS,
            }
        }
    }

    /// An instant from 100 nanosecond ticks since the Unix epoch
    #[inline]
    pub const fn from_unix_ticks(ticks: u64) -> Self {
        Timestamp { ticks }
    }

    /// 100 nanosecond ticks since the Unix epoch
    #[inline]
    pub const fn unix_ticks(&self) -> u64 {
        self.ticks
    }

    /// Re-encode as a raw .NET tick value. The sentinel encodes as 0.
    #[inline]
    pub fn to_dotnet_ticks(&self) -> u64 {
        if self.is_epoch() {
            0
        } else {
            self.ticks + UNIX_EPOCH_TICKS
        }
    }

    #[inline]
    pub const fn is_epoch(&self) -> bool {
        self.ticks == 0
    }

    /// Whole seconds since the Unix epoch
    #[inline]
    pub const fn unix_seconds(&self) -> u64 {
        self.ticks / TICKS_PER_SECOND
    }

    /// Nanoseconds within the current second
    #[inline]
    pub const fn subsec_nanos(&self) -> u32 {
        ((self.ticks % TICKS_PER_SECOND) * 100) as u32
    }
}

impl From<Timestamp> for SystemTime {
    fn from(t: Timestamp) -> Self {
        UNIX_EPOCH + Duration::new(t.unix_seconds(), t.subsec_nanos())
    }
}

/// Gregorian date from days since the Unix epoch
fn civil_from_days(days: u64) -> (u64, u64, u64) {
    let z = days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + u64::from(month <= 2);
    (year, month, day)
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let secs = self.unix_seconds();
        let (year, month, day) = civil_from_days(secs / 86_400);
        let rem = secs % 86_400;
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            year,
            month,
            day,
            rem / 3600,
            rem % 3600 / 60,
            rem % 60,
        )?;

        let frac = self.ticks % TICKS_PER_SECOND;
        if frac != 0 {
            write!(f, ".{:07}", frac)?;
        }

        write!(f, "Z")
    }
}

#[cfg(feature = "serde")]
mod timestampserde {
    use super::Timestamp;
    use serde::{de, de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    impl Serialize for Timestamp {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(self.to_string().as_str())
        }
    }

    struct TimestampVisitor;

    impl<'de> Visitor<'de> for TimestampVisitor {
        type Value = Timestamp;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a datetime tick count")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Timestamp::from_dotnet_ticks(v))
        }
    }

    impl<'de> Deserialize<'de> for Timestamp {
        fn deserialize<D>(deserializer: D) -> Result<Timestamp, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_u64(TimestampVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(0, Timestamp::EPOCH)]
    #[case(42, Timestamp::EPOCH)]
    #[case(UNIX_EPOCH_TICKS - 1, Timestamp::EPOCH)]
    #[case(UNIX_EPOCH_TICKS, Timestamp::EPOCH)]
    #[case(UNIX_EPOCH_TICKS + 1, Timestamp::from_unix_ticks(1))]
    fn test_from_dotnet_ticks(#[case] raw: u64, #[case] expected: Timestamp) {
        assert_eq!(Timestamp::from_dotnet_ticks(raw), expected);
    }

    #[test]
    fn test_kind_bits_masked() {
        let raw = UNIX_EPOCH_TICKS + 500;
        let with_kind = raw | (0b10 << 62);
        assert_eq!(
            Timestamp::from_dotnet_ticks(with_kind),
            Timestamp::from_unix_ticks(500)
        );
    }

    #[rstest]
    #[case(0, "1970-01-01T00:00:00Z")]
    #[case(1_672_531_200, "2023-01-01T00:00:00Z")]
    #[case(1_709_164_800, "2024-02-29T00:00:00Z")]
    #[case(951_827_696, "2000-02-29T12:34:56Z")]
    fn test_display(#[case] secs: u64, #[case] expected: &str) {
        let t = Timestamp::from_unix_ticks(secs * TICKS_PER_SECOND);
        assert_eq!(t.to_string(), expected);
    }

    #[test]
    fn test_display_fractional() {
        let t = Timestamp::from_unix_ticks(TICKS_PER_SECOND + 1);
        assert_eq!(t.to_string(), "1970-01-01T00:00:01.0000001Z");
    }

    #[test]
    fn test_dotnet_round_trip() {
        let t = Timestamp::from_unix_ticks(16_725_312_000_000_001);
        assert_eq!(Timestamp::from_dotnet_ticks(t.to_dotnet_ticks()), t);
        assert_eq!(Timestamp::EPOCH.to_dotnet_ticks(), 0);
    }

    #[test]
    fn test_system_time() {
        let t = Timestamp::from_unix_ticks(TICKS_PER_SECOND * 3 + 5);
        assert_eq!(
            SystemTime::from(t),
            UNIX_EPOCH + Duration::new(3, 500)
        );
    }
}
