// Partially signed transaction library
// by LNP/BP Association (https://lnp-bp.org)
// Written in 2020-2022 by
//     Dr. Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the Apache-2.0 License
// along with this software.
// If not, see <https://opensource.org/licenses/Apache-2.0>.

//! Raw key-value pairs of PSBT maps (BIP174 framing).
//!
//! ```text
//! <pair>      := <keylen> <keytype> <keydata> <valuelen> <value>
//! <separator> := 0x00
//! ```
//!
//! Both `keylen` and `valuelen` are bitcoin compact-size integers; `keylen`
//! covers the type byte and the key data. A zero key length terminates a map.

use std::io::{self, Read};

use bitcoin::consensus::{Decodable, Encodable};
use bitcoin::consensus::encode::VarInt;

use crate::{DecodeError, Limits};

/// Byte terminating every PSBT map (a key of zero length).
pub const SEPARATOR: u8 = 0x00;

/// Key of a raw PSBT pair: a type byte followed by optional key data.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Key {
    /// Type of the key, determining the meaning of key data and value.
    pub type_value: u8,

    /// Key data following the type byte. Empty key data are represented as
    /// `None`: the format does not distinguish them from absent ones.
    pub key_data: Option<Vec<u8>>,
}

impl Key {
    /// Constructs key, normalizing empty key data to `None`.
    pub fn new(type_value: u8, key_data: impl Into<Vec<u8>>) -> Self {
        let key_data = key_data.into();
        Key {
            type_value,
            key_data: if key_data.is_empty() {
                None
            } else {
                Some(key_data)
            },
        }
    }

    /// Returns key data, if present.
    #[inline]
    pub fn key_data(&self) -> Option<&[u8]> { self.key_data.as_deref() }

    /// Returns whether the key has no key data.
    #[inline]
    pub fn has_no_data(&self) -> bool { self.key_data.is_none() }
}

/// Reads a key, returning `None` when the map separator is read instead.
///
/// Keys longer than [`Limits::max_key_len`] are rejected with
/// [`DecodeError::InvalidKeyData`] before their bytes are read.
pub fn read_key<R: io::Read + ?Sized>(
    reader: &mut R,
    limits: &Limits,
) -> Result<Option<Key>, DecodeError> {
    let VarInt(len) = VarInt::consensus_decode(reader)?;
    if len == 0 {
        return Ok(None);
    }
    if len > limits.max_key_len as u64 {
        return Err(DecodeError::InvalidKeyData);
    }

    let mut type_value = [0u8; 1];
    reader.read_exact(&mut type_value)?;
    let key_data = read_exact_len(reader, len - 1)?;
    Ok(Some(Key::new(type_value[0], key_data)))
}

/// Reads a length-prefixed value no longer than `max_len` bytes.
///
/// The declared length is checked before any allocation; the returned buffer
/// only grows with the bytes actually present in the stream.
pub fn read_value<R: io::Read + ?Sized>(
    reader: &mut R,
    max_len: usize,
) -> Result<Vec<u8>, DecodeError> {
    let VarInt(len) = VarInt::consensus_decode(reader)?;
    if len > max_len as u64 {
        return Err(DecodeError::OversizedValue {
            declared: len,
            max: max_len,
        });
    }
    read_exact_len(reader, len)
}

fn read_exact_len<R: io::Read + ?Sized>(reader: &mut R, len: u64) -> Result<Vec<u8>, DecodeError> {
    let mut data = Vec::new();
    reader.take(len).read_to_end(&mut data)?;
    if data.len() as u64 != len {
        return Err(DecodeError::Truncated);
    }
    Ok(data)
}

/// Writes a single key-value pair, returning the number of bytes written.
///
/// Empty key data are written exactly as absent ones.
pub fn write_pair<W: io::Write + ?Sized>(
    writer: &mut W,
    type_value: u8,
    key_data: Option<&[u8]>,
    value: &[u8],
) -> Result<usize, io::Error> {
    let key_data = key_data.unwrap_or_default();

    let mut len = VarInt(key_data.len() as u64 + 1).consensus_encode(writer)?;
    writer.write_all(&[type_value])?;
    writer.write_all(key_data)?;
    len += 1 + key_data.len();

    len += VarInt(value.len() as u64).consensus_encode(writer)?;
    writer.write_all(value)?;
    Ok(len + value.len())
}

/// Writes the map separator.
pub fn write_separator<W: io::Write + ?Sized>(writer: &mut W) -> Result<usize, io::Error> {
    writer.write_all(&[SEPARATOR])?;
    Ok(1)
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn separator() {
        let mut cursor = Cursor::new(vec![SEPARATOR, 0xff]);
        assert_eq!(read_key(&mut cursor, &Limits::default()).unwrap(), None);
        assert_eq!(cursor.position(), 1);
    }

    #[test]
    fn key_without_data() {
        let mut cursor = Cursor::new(vec![0x01, 0x05]);
        let key = read_key(&mut cursor, &Limits::default()).unwrap().unwrap();
        assert_eq!(key, Key::new(0x05, vec![]));
        assert!(key.has_no_data());
    }

    #[test]
    fn key_with_data() {
        let mut cursor = Cursor::new(vec![0x03, 0x02, 0xaa, 0xbb]);
        let key = read_key(&mut cursor, &Limits::default()).unwrap().unwrap();
        assert_eq!(key.type_value, 0x02);
        assert_eq!(key.key_data(), Some(&[0xaa, 0xbb][..]));
    }

    #[test]
    fn oversized_key() {
        let limits = Limits {
            max_key_len: 2,
            ..Limits::default()
        };
        let mut cursor = Cursor::new(vec![0x03, 0x02, 0xaa, 0xbb]);
        assert!(matches!(read_key(&mut cursor, &limits), Err(DecodeError::InvalidKeyData)));
    }

    #[test]
    fn truncated() {
        assert!(matches!(
            read_key(&mut Cursor::new(vec![]), &Limits::default()),
            Err(DecodeError::Truncated)
        ));
        assert!(matches!(
            read_key(&mut Cursor::new(vec![0x03, 0x02, 0xaa]), &Limits::default()),
            Err(DecodeError::Truncated)
        ));
        assert!(matches!(
            read_value(&mut Cursor::new(vec![0x02, 0x51]), 100),
            Err(DecodeError::Truncated)
        ));
    }

    #[test]
    fn oversized_value() {
        // declares 0xffffffff bytes but carries none of them
        let mut cursor = Cursor::new(vec![0xfe, 0xff, 0xff, 0xff, 0xff]);
        match read_value(&mut cursor, 1000) {
            Err(DecodeError::OversizedValue { declared, max }) => {
                assert_eq!(declared, 0xffff_ffff);
                assert_eq!(max, 1000);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn non_canonical_length() {
        let mut cursor = Cursor::new(vec![0xfd, 0x01, 0x00, 0x51]);
        assert!(matches!(read_value(&mut cursor, 100), Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn write_read() {
        let mut data = vec![];
        assert_eq!(write_pair(&mut data, 0x02, Some(&[0xaa; 3]), &[0x51, 0x52]).unwrap(), 8);
        assert_eq!(write_pair(&mut data, 0x00, Some(&[]), &[]).unwrap(), 3);
        assert_eq!(write_separator(&mut data).unwrap(), 1);
        assert_eq!(data, vec![0x04, 0x02, 0xaa, 0xaa, 0xaa, 0x02, 0x51, 0x52, 0x01, 0x00, 0x00, 0x00]);

        let mut cursor = Cursor::new(data);
        let limits = Limits::default();
        let key = read_key(&mut cursor, &limits).unwrap().unwrap();
        assert_eq!(key, Key::new(0x02, vec![0xaa; 3]));
        assert_eq!(read_value(&mut cursor, 10).unwrap(), vec![0x51, 0x52]);
        assert_eq!(read_key(&mut cursor, &limits).unwrap(), Some(Key::new(0x00, vec![])));
        assert_eq!(read_value(&mut cursor, 10).unwrap(), Vec::<u8>::new());
        assert_eq!(read_key(&mut cursor, &limits).unwrap(), None);
    }
}
