use std::fmt::{self, Display};
use std::str::FromStr;

/// A uuid error.
#[derive(Debug, PartialEq, Eq)]
pub struct UuidError;

impl std::error::Error for UuidError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

impl fmt::Display for UuidError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unable to decode uuid")
    }
}

/// A 128 bit identifier as stored in world save data.
///
/// The 16 bytes are kept in the order they appear on disk and render in the
/// standard hyphenated form.
///
/// ```
/// use burrow::Uuid;
/// let id = Uuid::from_bytes([
///     0x72, 0xce, 0x90, 0xe3, 0xef, 0xf3, 0x4b, 0xe4,
///     0x93, 0x95, 0xf1, 0xc3, 0xd3, 0x3f, 0xd1, 0xc7,
/// ]);
/// assert_eq!(id.to_string(), "72ce90e3-eff3-4be4-9395-f1c3d33fd1c7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uuid {
    bytes: [u8; 16],
}

impl Uuid {
    /// The all-zero identifier
    pub const NIL: Uuid = Uuid { bytes: [0u8; 16] };

    #[inline]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Uuid { bytes }
    }

    /// Create an identifier from a slice, failing unless it is exactly 16
    /// bytes long.
    #[inline]
    pub fn from_slice(data: &[u8]) -> Result<Self, UuidError> {
        if data.len() != 16 {
            return Err(UuidError);
        }

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(data);
        Ok(Uuid { bytes })
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    #[inline]
    pub const fn is_nil(&self) -> bool {
        u128::from_ne_bytes(self.bytes) == 0
    }
}

impl Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, byte) in self.bytes.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                write!(f, "-")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

fn hex_value(c: u8) -> Result<u8, UuidError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(UuidError),
    }
}

impl FromStr for Uuid {
    type Err = UuidError;

    /// Parse the hyphenated form
    ///
    /// ```
    /// use burrow::Uuid;
    /// let id: Uuid = "72ce90e3-eff3-4be4-9395-f1c3d33fd1c7".parse().unwrap();
    /// assert_eq!(id.as_bytes()[0], 0x72);
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.as_bytes();
        if s.len() != 36 || s[8] != b'-' || s[13] != b'-' || s[18] != b'-' || s[23] != b'-' {
            return Err(UuidError);
        }

        let mut bytes = [0u8; 16];
        let mut idx = 0;
        let mut i = 0;
        while i < s.len() {
            if matches!(i, 8 | 13 | 18 | 23) {
                i += 1;
                continue;
            }

            bytes[idx] = (hex_value(s[i])? << 4) | hex_value(s[i + 1])?;
            idx += 1;
            i += 2;
        }

        Ok(Uuid { bytes })
    }
}

#[cfg(feature = "serde")]
mod uuidserde {
    use super::Uuid;
    use serde::{de, de::SeqAccess, de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;

    impl Serialize for Uuid {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(self.to_string().as_str())
        }
    }

    struct UuidVisitor;

    impl<'de> Visitor<'de> for UuidVisitor {
        type Value = Uuid;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a uuid")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut bytes = [0u8; 16];
            for (i, slot) in bytes.iter_mut().enumerate() {
                *slot = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(i, &self))?;
            }
            Ok(Uuid::from_bytes(bytes))
        }

        fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Uuid::from_slice(v).map_err(|_| de::Error::custom("invalid uuid length"))
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            v.parse()
                .map_err(|_| de::Error::custom(format!("invalid uuid: {}", v)))
        }
    }

    impl<'de> Deserialize<'de> for Uuid {
        fn deserialize<D>(deserializer: D) -> Result<Uuid, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_tuple(16, UuidVisitor)
        }
    }
}
