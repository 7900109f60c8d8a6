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

use std::io::{self, Cursor};

use crate::DecodeError;

/// Default upper bound on the length of a single key.
pub const MAX_KEY_LEN: usize = 10_000;

/// Default upper bound on the length of a single value.
pub const MAX_VALUE_LEN: usize = 4_000_000;

/// Bounds applied to length prefixes read from untrusted data, capping the
/// memory a single pair may allocate.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase", default)
)]
pub struct Limits {
    /// Maximum key length, including the key type byte.
    pub max_key_len: usize,

    /// Maximum value length.
    pub max_value_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_key_len: MAX_KEY_LEN,
            max_value_len: MAX_VALUE_LEN,
        }
    }
}

impl Limits {
    /// Constructs limits with a custom value bound and the default key bound.
    pub fn with_max_value_len(max_value_len: usize) -> Self {
        Limits {
            max_value_len,
            ..Limits::default()
        }
    }
}

/// Key-value map of a partially signed transaction.
pub trait Map: Sized {
    /// Reads the map up to and including its separator.
    fn decode_map<R: io::Read + ?Sized>(reader: &mut R, limits: &Limits)
        -> Result<Self, DecodeError>;

    /// Writes all pairs of the map in canonical order followed by the
    /// separator. Returns number of bytes written.
    fn encode_map<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error>;

    /// Serializes the map into a byte vector.
    fn serialize(&self) -> Vec<u8> {
        let mut data = vec![];
        self.encode_map(&mut data)
            .expect("in-memory writers don't error");
        data
    }

    /// Deserializes the map from a byte slice using default [`Limits`]. Bytes
    /// after the separator are an error.
    fn deserialize(data: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(data);
        let map = Self::decode_map(&mut cursor, &Limits::default())?;
        if cursor.position() as usize != data.len() {
            return Err(DecodeError::InvalidFormat);
        }
        Ok(map)
    }
}
