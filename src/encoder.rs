use crate::{Timestamp, Uuid};

/// Write side twin of [Decoder](crate::Decoder)
///
/// Appends little endian values to a growable in-memory buffer. Every value
/// written by the encoder decodes back to itself, which makes it the natural
/// way to produce fixtures and to patch world data.
///
/// ```
/// use burrow::{Decoder, Encoder};
/// let mut encoder = Encoder::new();
/// encoder.write_u16(42);
/// encoder.write_string("abc");
/// let data = encoder.into_inner();
/// assert_eq!(data, vec![0x2a, 0x00, 0x03, b'a', b'b', b'c']);
///
/// let mut decoder = Decoder::new(&data);
/// assert_eq!(decoder.read_u16()?, 42);
/// assert_eq!(decoder.read_string(None)?, String::from("abc"));
/// # Ok::<(), burrow::DecoderError>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct Encoder {
    data: Vec<u8>,
}

impl Encoder {
    #[inline]
    pub fn new() -> Self {
        Encoder { data: Vec::new() }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Encoder {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far
    #[inline]
    pub fn position(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn write_u8(&mut self, val: u8) {
        self.data.push(val);
    }

    #[inline]
    pub fn write_u16(&mut self, val: u16) {
        self.data.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_u32(&mut self, val: u32) {
        self.data.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_u64(&mut self, val: u64) {
        self.data.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_i8(&mut self, val: i8) {
        self.data.push(val as u8);
    }

    #[inline]
    pub fn write_i16(&mut self, val: i16) {
        self.data.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_i32(&mut self, val: i32) {
        self.data.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_i64(&mut self, val: i64) {
        self.data.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_f32(&mut self, val: f32) {
        self.data.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_f64(&mut self, val: f64) {
        self.data.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_bool(&mut self, val: bool) {
        self.data.push(val as u8);
    }

    /// Pack 8 flags into one byte, least significant bit first
    #[inline]
    pub fn write_bitflags(&mut self, flags: [bool; 8]) {
        let mut val = 0u8;
        for (i, flag) in flags.iter().enumerate() {
            val |= (*flag as u8) << i;
        }
        self.data.push(val);
    }

    /// Write a ULEB128 encoded unsigned integer using the minimal number of
    /// bytes
    ///
    /// ```
    /// use burrow::Encoder;
    /// let mut encoder = Encoder::new();
    /// encoder.write_varuint(150);
    /// assert_eq!(encoder.as_slice(), &[0x96, 0x01]);
    /// ```
    pub fn write_varuint(&mut self, mut val: u64) {
        loop {
            let byte = (val & 0x7f) as u8;
            val >>= 7;
            if val == 0 {
                self.data.push(byte);
                return;
            }
            self.data.push(byte | 0x80);
        }
    }

    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write a ULEB128 length prefixed string
    #[inline]
    pub fn write_string(&mut self, val: &str) {
        self.write_varuint(val.len() as u64);
        self.data.extend_from_slice(val.as_bytes());
    }

    /// Write string bytes with no length prefix, for fields whose length is
    /// known to the reader
    #[inline]
    pub fn write_raw_string(&mut self, val: &str) {
        self.data.extend_from_slice(val.as_bytes());
    }

    #[inline]
    pub fn write_uuid(&mut self, val: Uuid) {
        self.data.extend_from_slice(val.as_bytes());
    }

    /// Write a [Timestamp] as a raw .NET tick value. The
    /// [EPOCH](Timestamp::EPOCH) sentinel is written as 0.
    #[inline]
    pub fn write_datetime(&mut self, val: Timestamp) {
        self.write_u64(val.to_dotnet_ticks());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(0, &[0x00][..])]
    #[case(127, &[0x7f][..])]
    #[case(128, &[0x80, 0x01][..])]
    #[case(255, &[0xff, 0x01][..])]
    #[case(150, &[0x96, 0x01][..])]
    #[case(u64::MAX, &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01][..])]
    fn test_varuint_encode(#[case] input: u64, #[case] expected: &[u8]) {
        let mut encoder = Encoder::new();
        encoder.write_varuint(input);
        assert_eq!(encoder.as_slice(), expected);
    }

    #[test]
    fn test_bitflags_pack() {
        let mut encoder = Encoder::new();
        encoder.write_bitflags([true, false, true, false, false, false, false, false]);
        assert_eq!(encoder.as_slice(), &[0b0000_0101]);
    }

    #[test]
    fn test_little_endian_layout() {
        let mut encoder = Encoder::new();
        encoder.write_u32(0x0102_0304);
        assert_eq!(encoder.as_slice(), &[0x04, 0x03, 0x02, 0x01]);
    }
}
