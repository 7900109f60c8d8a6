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

//! Public keys as they appear inside PSBT maps.
//!
//! Keys are checked only for their byte structure (length and, for compressed
//! keys, the parity prefix). Curve membership is left to whoever turns these
//! bytes into `secp256k1` keys.

use core::fmt::{self, Display, Formatter};
use core::str::FromStr;

use bitcoin::hashes::hex::{FromHex, ToHex};
#[cfg(feature = "serde")]
use serde_with::{hex::Hex, As};

/// Length of a serialized compressed public key.
pub const COMPRESSED_PUBKEY_LEN: usize = 33;

/// Length of a serialized x-only (BIP340) public key.
pub const XONLY_PUBKEY_LEN: usize = 32;

/// Checks that `data` is shaped as a compressed public key: 33 bytes starting
/// with either `0x02` or `0x03`.
pub fn validate_compressed_pubkey(data: &[u8]) -> bool {
    data.len() == COMPRESSED_PUBKEY_LEN && matches!(data[0], 0x02 | 0x03)
}

/// Checks that `data` is shaped as an x-only public key, i.e. has exactly 32
/// bytes.
#[inline]
pub fn validate_xonly_pubkey(data: &[u8]) -> bool { data.len() == XONLY_PUBKEY_LEN }

/// Errors constructing public keys from raw bytes.
#[derive(
    Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, Error
)]
#[display(doc_comments)]
pub enum KeyError {
    /// public key data has length {0} while {1} bytes are required.
    InvalidLength(usize, usize),

    /// compressed public key starts with byte {0}; only `0x02` and `0x03`
    /// prefixes are allowed.
    InvalidPrefix(u8),

    /// public key is not a valid hexadecimal string.
    InvalidHex,
}

/// Compressed public key, checked to be structurally valid.
///
/// Ordering matches the lexicographic order of the serialized key, which is the
/// order BIP32 derivation pairs are written in.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct CompressedPubkey(
    #[cfg_attr(feature = "serde", serde(with = "As::<Hex>"))] [u8; COMPRESSED_PUBKEY_LEN],
);

impl CompressedPubkey {
    /// Constructs key from a byte slice, checking its structure.
    pub fn from_slice(data: &[u8]) -> Result<Self, KeyError> {
        let bytes = data
            .try_into()
            .map_err(|_| KeyError::InvalidLength(data.len(), COMPRESSED_PUBKEY_LEN))?;
        Self::from_bytes(bytes)
    }

    /// Constructs key from a fixed-size array, checking the prefix byte.
    pub fn from_bytes(bytes: [u8; COMPRESSED_PUBKEY_LEN]) -> Result<Self, KeyError> {
        if !validate_compressed_pubkey(&bytes) {
            return Err(KeyError::InvalidPrefix(bytes[0]));
        }
        Ok(CompressedPubkey(bytes))
    }

    /// Returns serialized key bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; COMPRESSED_PUBKEY_LEN] { &self.0 }

    /// Returns copy of the serialized key bytes.
    #[inline]
    pub fn to_bytes(&self) -> [u8; COMPRESSED_PUBKEY_LEN] { self.0 }
}

impl AsRef<[u8]> for CompressedPubkey {
    #[inline]
    fn as_ref(&self) -> &[u8] { &self.0 }
}

impl TryFrom<&[u8]> for CompressedPubkey {
    type Error = KeyError;

    #[inline]
    fn try_from(data: &[u8]) -> Result<Self, Self::Error> { CompressedPubkey::from_slice(data) }
}

impl Display for CompressedPubkey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str(&self.0[..].to_hex()) }
}

impl FromStr for CompressedPubkey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data = Vec::<u8>::from_hex(s).map_err(|_| KeyError::InvalidHex)?;
        CompressedPubkey::from_slice(&data)
    }
}

/// X-only public key, checked to be 32 bytes long.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", transparent)
)]
pub struct XOnlyPubkey(
    #[cfg_attr(feature = "serde", serde(with = "As::<Hex>"))] [u8; XONLY_PUBKEY_LEN],
);

impl XOnlyPubkey {
    /// Constructs key from a byte slice, checking its length.
    pub fn from_slice(data: &[u8]) -> Result<Self, KeyError> {
        data.try_into()
            .map(XOnlyPubkey)
            .map_err(|_| KeyError::InvalidLength(data.len(), XONLY_PUBKEY_LEN))
    }

    /// Returns serialized key bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; XONLY_PUBKEY_LEN] { &self.0 }

    /// Returns copy of the serialized key bytes.
    #[inline]
    pub fn to_bytes(&self) -> [u8; XONLY_PUBKEY_LEN] { self.0 }
}

impl From<[u8; XONLY_PUBKEY_LEN]> for XOnlyPubkey {
    #[inline]
    fn from(bytes: [u8; XONLY_PUBKEY_LEN]) -> Self { XOnlyPubkey(bytes) }
}

impl AsRef<[u8]> for XOnlyPubkey {
    #[inline]
    fn as_ref(&self) -> &[u8] { &self.0 }
}

impl TryFrom<&[u8]> for XOnlyPubkey {
    type Error = KeyError;

    #[inline]
    fn try_from(data: &[u8]) -> Result<Self, Self::Error> { XOnlyPubkey::from_slice(data) }
}

impl Display for XOnlyPubkey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str(&self.0[..].to_hex()) }
}

impl FromStr for XOnlyPubkey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data = Vec::<u8>::from_hex(s).map_err(|_| KeyError::InvalidHex)?;
        XOnlyPubkey::from_slice(&data)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const PUBKEY: &str = "029583bf39ae0a609747ad199addd634fa6108559d6c5cd39b4c2183f1ab96e07f";

    #[test]
    fn compressed_structure() {
        let mut data = Vec::<u8>::from_hex(PUBKEY).unwrap();
        assert!(validate_compressed_pubkey(&data));
        data[0] = 0x03;
        assert!(validate_compressed_pubkey(&data));
        data[0] = 0x04;
        assert!(!validate_compressed_pubkey(&data));
        data[0] = 0x02;
        assert!(!validate_compressed_pubkey(&data[..32]));
        assert!(!validate_compressed_pubkey(&[]));
    }

    #[test]
    fn compressed_errors() {
        let mut data = Vec::<u8>::from_hex(PUBKEY).unwrap();
        data[0] = 0x04;
        assert_eq!(
            CompressedPubkey::from_slice(&data),
            Err(KeyError::InvalidPrefix(0x04))
        );
        assert_eq!(
            CompressedPubkey::from_slice(&data[1..]),
            Err(KeyError::InvalidLength(32, 33))
        );
        assert_eq!(CompressedPubkey::from_str("02zz"), Err(KeyError::InvalidHex));
    }

    #[test]
    fn compressed_display() {
        let key = CompressedPubkey::from_str(PUBKEY).unwrap();
        assert_eq!(key.to_string(), PUBKEY);
        assert_eq!(key.as_ref(), &Vec::<u8>::from_hex(PUBKEY).unwrap()[..]);
    }

    #[test]
    fn xonly_structure() {
        assert!(validate_xonly_pubkey(&[0u8; 32]));
        assert!(!validate_xonly_pubkey(&[0u8; 31]));
        assert!(!validate_xonly_pubkey(&[0u8; 33]));
        assert_eq!(
            XOnlyPubkey::from_slice(&[7u8; 33]),
            Err(KeyError::InvalidLength(33, 32))
        );
        let key = XOnlyPubkey::from_slice(&[7u8; 32]).unwrap();
        assert_eq!(key, XOnlyPubkey::from([7u8; 32]));
        assert_eq!(key.to_string(), "07".repeat(32));
    }
}
