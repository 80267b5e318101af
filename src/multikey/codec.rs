//! # GMK Container Wire Codec
//!
//! The binary encoding shared by public and secret containers:
//!
//! ```text
//! magic         : 3 bytes, ASCII "GMK"
//! version       : 1 byte,  ASCII 'a' (stable); '$' reserved for dev builds
//! secrecy       : 1 byte,  0 = public, 1 = secret
//! tag_count     : uvarint, number of non-empty tag entries
//! repeat tag_count times, in ascending wire-ID order:
//!   tag_id      : uvarint holding the wire ID of the tag
//!   key_count   : uvarint
//!   repeat key_count times:
//!     key_len   : uvarint
//!     key_bytes : key_len bytes
//! ```
//!
//! `uvarint` is a little-endian base-128 varint. Decoding is strict: wrong
//! magic or version, secrecy mismatch, unknown tags, out-of-order or
//! repeated tags, empty tag entries, truncation, and trailing bytes are all
//! rejected.

use super::container::{KeyContainer, KeyMaterial};
use super::error::MultikeyError;
use super::{CryptoTag, Result};

/// Container magic bytes
pub const MAGIC: [u8; 3] = *b"GMK";

/// Stable format version byte
pub const VERSION_STABLE: u8 = b'a';

/// Reserved development version byte (never accepted by this build)
pub const VERSION_DEV: u8 = b'$';

/// Append `value` as a little-endian base-128 varint.
pub fn write_uvarint(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Strict cursor over an encoded container.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(MultikeyError::format(format!(
                "truncated: wanted {len} bytes, {} left",
                self.remaining()
            )));
        }
        let out = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_uvarint(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            let byte = self
                .read_u8()
                .map_err(|_| MultikeyError::format("truncated uvarint"))?;
            if shift == 63 && byte > 1 {
                return Err(MultikeyError::format("uvarint overflows 64 bits"));
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 63 {
                return Err(MultikeyError::format("uvarint overflows 64 bits"));
            }
        }
    }
}

/// Encode a container. Tags are emitted in ascending wire-ID order and
/// empty lists are omitted.
pub(crate) fn serialize<M: KeyMaterial>(container: &KeyContainer<M>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    out.push(VERSION_STABLE);
    out.push(M::SECRECY.wire_byte());

    write_uvarint(&mut out, container.count_systems_used() as u64);
    for tag in CryptoTag::ALL {
        let keys = container.keys_in(tag);
        if keys.is_empty() {
            continue;
        }
        write_uvarint(&mut out, u64::from(tag.wire_id()));
        write_uvarint(&mut out, keys.len() as u64);
        for key in keys {
            let bytes = key.as_bytes();
            write_uvarint(&mut out, bytes.len() as u64);
            out.extend_from_slice(bytes);
        }
    }
    out
}

/// Decode a container of secrecy `M`, rejecting every malformed shape.
pub(crate) fn deserialize<M: KeyMaterial>(bytes: &[u8]) -> Result<KeyContainer<M>> {
    let mut reader = Reader::new(bytes);

    if reader.read_bytes(3)? != MAGIC {
        return Err(MultikeyError::format("bad magic"));
    }
    match reader.read_u8()? {
        VERSION_STABLE => {}
        VERSION_DEV => {
            return Err(MultikeyError::format(
                "dev-reserved version byte not accepted",
            ))
        }
        other => {
            return Err(MultikeyError::format(format!(
                "unknown version byte 0x{other:02x}"
            )))
        }
    }
    let secrecy = reader.read_u8()?;
    if secrecy != M::SECRECY.wire_byte() {
        return Err(MultikeyError::format(format!(
            "secrecy byte {} does not match target container ({})",
            secrecy,
            M::SECRECY.wire_byte()
        )));
    }

    let tag_count = reader.read_uvarint()?;
    if tag_count > CryptoTag::ALL.len() as u64 {
        return Err(MultikeyError::format(format!(
            "tag count {tag_count} exceeds known tags"
        )));
    }

    let mut container = KeyContainer::<M>::new();
    let mut prev_id: Option<u8> = None;
    for _ in 0..tag_count {
        let raw_id = reader.read_uvarint()?;
        let id = u8::try_from(raw_id)
            .map_err(|_| MultikeyError::format(format!("tag id {raw_id} out of byte range")))?;
        let tag = CryptoTag::from_wire_id(id)
            .ok_or_else(|| MultikeyError::format(format!("unknown tag id 0x{id:02x}")))?;
        if let Some(prev) = prev_id {
            if id <= prev {
                return Err(MultikeyError::format(
                    "tag entries out of order or repeated",
                ));
            }
        }
        prev_id = Some(id);

        let key_count = reader.read_uvarint()?;
        if key_count == 0 {
            return Err(MultikeyError::format("empty tag entry"));
        }
        if key_count > reader.remaining() as u64 {
            return Err(MultikeyError::format("key count exceeds payload"));
        }
        for _ in 0..key_count {
            let key_len = reader.read_uvarint()?;
            if key_len > reader.remaining() as u64 {
                return Err(MultikeyError::format("key length exceeds payload"));
            }
            let key_bytes = reader.read_bytes(key_len as usize)?;
            container.add_key(tag, M::from_plain(key_bytes.to_vec())?);
        }
    }

    if reader.remaining() != 0 {
        return Err(MultikeyError::format(format!(
            "{} trailing bytes after container",
            reader.remaining()
        )));
    }

    Ok(container)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_uvarint(bytes: &[u8]) -> Result<(u64, usize)> {
        let mut r = Reader::new(bytes);
        let v = r.read_uvarint()?;
        Ok((v, r.pos))
    }

    // -- uvarint ------------------------------------------------------------

    #[test]
    fn test_uvarint_single_byte() {
        for v in [0u64, 1, 0x7f] {
            let mut out = Vec::new();
            write_uvarint(&mut out, v);
            assert_eq!(out.len(), 1);
            assert_eq!(decode_uvarint(&out).unwrap(), (v, 1));
        }
    }

    #[test]
    fn test_uvarint_multi_byte() {
        let cases: [(u64, &[u8]); 2] = [(0x80, &[0x80, 0x01]), (300, &[0xac, 0x02])];
        for (v, expected) in cases {
            let mut out = Vec::new();
            write_uvarint(&mut out, v);
            assert_eq!(out, expected);
            assert_eq!(decode_uvarint(&out).unwrap().0, v);
        }
    }

    #[test]
    fn test_uvarint_u64_max_roundtrip() {
        let mut out = Vec::new();
        write_uvarint(&mut out, u64::MAX);
        assert_eq!(out.len(), 10);
        assert_eq!(decode_uvarint(&out).unwrap().0, u64::MAX);
    }

    #[test]
    fn test_uvarint_overflow_rejected() {
        // 10 continuation bytes followed by a value > 1 in the last slot
        let bytes = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        assert!(decode_uvarint(&bytes).is_err());
    }

    #[test]
    fn test_uvarint_truncated_rejected() {
        assert!(decode_uvarint(&[0x80]).is_err());
        assert!(decode_uvarint(&[]).is_err());
    }
}
