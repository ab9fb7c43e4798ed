/*!

A low level, performance orientated reader for the binary world save data
used by [Terraria](https://terraria.wiki.gg/wiki/World_file_format)-style
titles.

Burrow is the substrate a world file parser builds on. It does not know any
particular record layout, it knows how the bytes inside one are shaped:
little endian primitives, ULEB128 length prefixed strings, 16 byte
identifiers, and .NET `DateTime` tick counts. Every read is bounds checked,
so corrupted or truncated files surface as precise errors instead of
panics.

## Features

- ✔ Typed: fixed width integers, floats, bools, bit flags, strings, uuids, and timestamps
- ✔ Safe: every read is bounds checked; malformed input never panics
- ✔ Precise: every error carries the exact byte offset it occurred at
- ✔ Independent: decoded values are copies that outlive the source buffer
- ✔ Symmetric: an [Encoder] that writes everything the [Decoder] reads
- ✔ Ergonomic: optional [serde](https://serde.rs) support so record layouts are plain derived structs

## Quick Start

```rust
use burrow::Decoder;

let data = [
    0x17, 0x01, 0x00, 0x00,       // world format version
    0x04, b'G', b'a', b'i', b'a', // length prefixed world name
    0x05,                         // modifier flags
];

let mut decoder = Decoder::new(&data);
assert_eq!(decoder.read_i32()?, 279);
assert_eq!(decoder.read_string(None)?, String::from("Gaia"));

let flags = decoder.read_bitflags()?;
assert!(flags[0] && flags[2]);
assert_eq!(decoder.position(), data.len());
# Ok::<(), burrow::DecoderError>(())
```

Reads advance an internal cursor, which can also be positioned directly:
[seek](Decoder::seek) validates the target, [set_position](Decoder::set_position)
does not (an out of range cursor is caught by the next read), and
[slice_bytes](Decoder::slice_bytes) addresses the buffer absolutely without
touching the cursor at all. World files lean on this for their offset
directory: the header records where each section starts, and the reader
jumps between them.

## Deserialization

With the `serde` feature enabled, a record layout is a derived struct and
fields decode positionally:

```rust
# #[cfg(feature = "serde")] {
use serde::Deserialize;

#[derive(Deserialize, PartialEq, Debug)]
struct Header {
    version: i32,
    name: String,
    hardcore: bool,
}

let data = [
    0x17, 0x01, 0x00, 0x00, 0x04, b'G', b'a', b'i', b'a', 0x01,
];

let actual: Header = burrow::de::from_slice(&data)?;
assert_eq!(
    actual,
    Header {
        version: 279,
        name: String::from("Gaia"),
        hardcore: true,
    }
);
# }
# Ok::<(), burrow::Error>(())
```

## Caveats

Caller is responsible for:

- Knowing the record layout: the format is not self describing, so reads
  must be issued in the order and at the offsets the format dictates
- String contents: bytes decode permissively (malformed UTF-8 is replaced,
  never rejected); use [read_bytes](Decoder::read_bytes) when the exact
  bytes matter

*/

mod decoder;
#[cfg(feature = "serde")]
pub mod de;
mod encoder;
mod errors;
mod timestamp;
mod uuid;

pub use self::decoder::{DecodeError, Decoder, DecoderError};
pub use self::encoder::Encoder;
pub use self::errors::{DeserializeError, DeserializeErrorKind, Error, ErrorKind};
pub use self::timestamp::Timestamp;
pub use self::uuid::{Uuid, UuidError};
