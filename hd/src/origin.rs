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

use core::fmt::{self, Display, Formatter};

use bitcoin::util::bip32::{ChildNumber, DerivationPath, Fingerprint, KeySource};

/// Length of the master key fingerprint prefixing every key origin.
pub const FINGERPRINT_LEN: usize = 4;

/// Errors parsing serialized key origin data.
#[derive(
    Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, Error
)]
#[display(doc_comments)]
pub enum KeyOriginError {
    /// key origin data has {0} bytes, which is not enough for the master key
    /// fingerprint.
    TooShort(usize),

    /// key origin data of {0} bytes does not consist of a 4-byte fingerprint
    /// followed by whole 32-bit derivation indexes.
    MisalignedPath(usize),
}

/// Origin of a key: fingerprint of the master key and the derivation path
/// from it, as serialized in PSBT `*_BIP32_DERIVATION` values.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct KeyOrigin {
    /// Fingerprint of the master extended key.
    pub master_fingerprint: Fingerprint,

    /// Derivation path from the master key.
    pub path: DerivationPath,
}

impl KeyOrigin {
    /// Constructs key origin from a master fingerprint and raw path indexes
    /// (hardened indexes have their most significant bit set).
    pub fn with(master_fingerprint: Fingerprint, path: impl IntoIterator<Item = u32>) -> Self {
        KeyOrigin {
            master_fingerprint,
            path: path.into_iter().map(ChildNumber::from).collect::<Vec<_>>().into(),
        }
    }

    /// Parses `<4-byte fingerprint> <32-bit little-endian index>*`.
    ///
    /// An empty path (fingerprint only) is allowed and denotes the master key
    /// itself.
    pub fn deserialize(data: &[u8]) -> Result<Self, KeyOriginError> {
        if data.len() < FINGERPRINT_LEN {
            return Err(KeyOriginError::TooShort(data.len()));
        }
        if (data.len() - FINGERPRINT_LEN) % 4 != 0 {
            return Err(KeyOriginError::MisalignedPath(data.len()));
        }

        let (fingerprint, path) = data.split_at(FINGERPRINT_LEN);
        let path = path
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        Ok(KeyOrigin::with(Fingerprint::from(fingerprint), path))
    }

    /// Serializes key origin into the layout read by
    /// [`KeyOrigin::deserialize`].
    pub fn serialize(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.serialized_len());
        data.extend_from_slice(&self.master_fingerprint[..]);
        for index in self.indexes() {
            data.extend_from_slice(&index.to_le_bytes());
        }
        data
    }

    /// Number of bytes produced by [`KeyOrigin::serialize`].
    #[inline]
    pub fn serialized_len(&self) -> usize { FINGERPRINT_LEN + self.path.as_ref().len() * 4 }

    /// Iterates derivation path as raw 32-bit indexes.
    pub fn indexes(&self) -> impl Iterator<Item = u32> + '_ {
        self.path.as_ref().iter().copied().map(u32::from)
    }
}

impl Display for KeyOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.master_fingerprint)?;
        for child in self.path.as_ref() {
            write!(f, "/{}", child)?;
        }
        Ok(())
    }
}

impl From<KeySource> for KeyOrigin {
    fn from((master_fingerprint, path): KeySource) -> Self {
        KeyOrigin {
            master_fingerprint,
            path,
        }
    }
}

impl From<KeyOrigin> for KeySource {
    fn from(origin: KeyOrigin) -> Self { (origin.master_fingerprint, origin.path) }
}

#[cfg(test)]
mod test {
    use core::str::FromStr;

    use bitcoin::hashes::hex::FromHex;

    use super::*;

    #[test]
    fn deserialize_path() {
        // m/0'/1/2'
        let data = Vec::<u8>::from_hex("d90c6a4f000000800100000002000080").unwrap();
        let origin = KeyOrigin::deserialize(&data).unwrap();
        assert_eq!(origin.master_fingerprint, Fingerprint::from_str("d90c6a4f").unwrap());
        assert_eq!(origin.path, DerivationPath::from_str("m/0'/1/2'").unwrap());
        assert_eq!(origin.indexes().collect::<Vec<_>>(), vec![0x8000_0000, 1, 0x8000_0002]);
        assert_eq!(origin.serialized_len(), data.len());
        assert_eq!(origin.serialize(), data);
        assert_eq!(origin.to_string(), "[d90c6a4f]/0'/1/2'");
    }

    #[test]
    fn master_only() {
        let origin = KeyOrigin::deserialize(&[0xde, 0xad, 0xbe, 0xef]).unwrap();
        assert!(origin.path.as_ref().is_empty());
        assert_eq!(origin.serialize(), vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn malformed() {
        assert_eq!(KeyOrigin::deserialize(&[]), Err(KeyOriginError::TooShort(0)));
        assert_eq!(KeyOrigin::deserialize(&[1, 2, 3]), Err(KeyOriginError::TooShort(3)));
        assert_eq!(
            KeyOrigin::deserialize(&[1, 2, 3, 4, 5]),
            Err(KeyOriginError::MisalignedPath(5))
        );
        assert_eq!(
            KeyOrigin::deserialize(&[0u8; 11]),
            Err(KeyOriginError::MisalignedPath(11))
        );
    }

    #[test]
    fn key_source_conversion() {
        let origin = KeyOrigin::with(
            Fingerprint::from(&[1u8, 2, 3, 4][..]),
            [crate::HARDENED_INDEX_BOUNDARY | 44, 7],
        );
        let source = KeySource::from(origin.clone());
        assert_eq!(source.1, DerivationPath::from_str("m/44'/7").unwrap());
        assert_eq!(KeyOrigin::from(source), origin);
    }
}
