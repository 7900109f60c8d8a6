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

use std::cmp::Ordering;
use std::io::Cursor;

use bitcoin::consensus::encode::VarInt;
use bitcoin::consensus::{Decodable, Encodable};
use bitcoin::hashes::Hash;
use bitcoin::util::taproot::TapLeafHash;
use pst_hd::{CompressedPubkey, KeyOrigin, XOnlyPubkey};

use crate::MalformedValue;

const LEAF_HASH_LEN: usize = 32;

/// BIP32 origin of a compressed public key used by an output
/// (`PSBT_OUT_BIP32_DERIVATION`).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct Bip32Derivation {
    /// Public key, also serving as the key data of the pair.
    pub pubkey: CompressedPubkey,

    /// Master key fingerprint and derivation path of the key.
    pub origin: KeyOrigin,
}

impl Bip32Derivation {
    /// Constructs derivation entry.
    #[inline]
    pub fn new(pubkey: CompressedPubkey, origin: KeyOrigin) -> Self {
        Bip32Derivation { pubkey, origin }
    }

    /// Serializes the value part of the pair.
    #[inline]
    pub fn serialize_value(&self) -> Vec<u8> { self.origin.serialize() }
}

/// BIP32 origin of an x-only key together with the tap leaves it is used in
/// (`PSBT_OUT_TAP_BIP32_DERIVATION`).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct TapBip32Derivation {
    /// X-only public key, also serving as the key data of the pair.
    pub xonly_pubkey: XOnlyPubkey,

    /// Hashes of the leaves the key participates in; empty for the key-path
    /// spending key.
    pub leaf_hashes: Vec<TapLeafHash>,

    /// Master key fingerprint and derivation path of the key.
    pub origin: KeyOrigin,
}

impl TapBip32Derivation {
    /// Constructs derivation entry.
    #[inline]
    pub fn new(xonly_pubkey: XOnlyPubkey, leaf_hashes: Vec<TapLeafHash>, origin: KeyOrigin) -> Self {
        TapBip32Derivation {
            xonly_pubkey,
            leaf_hashes,
            origin,
        }
    }

    /// Parses the value of a taproot derivation pair:
    /// `<compact-size n> <32-byte leaf hash>*n <key origin>`.
    pub fn deserialize_value(
        xonly_pubkey: XOnlyPubkey,
        value: &[u8],
    ) -> Result<Self, MalformedValue> {
        let mut cursor = Cursor::new(value);
        let VarInt(count) =
            VarInt::consensus_decode(&mut cursor).map_err(|_| MalformedValue::LeafCount)?;
        let rest = &value[cursor.position() as usize..];

        let hashes_len = count
            .checked_mul(LEAF_HASH_LEN as u64)
            .filter(|len| *len <= rest.len() as u64)
            .ok_or(MalformedValue::LeafHashes(count, rest.len()))? as usize;
        let (hashes, origin) = rest.split_at(hashes_len);

        let leaf_hashes = hashes
            .chunks_exact(LEAF_HASH_LEN)
            .map(|chunk| {
                let mut inner = [0u8; LEAF_HASH_LEN];
                inner.copy_from_slice(chunk);
                TapLeafHash::from_inner(inner)
            })
            .collect();
        let origin = KeyOrigin::deserialize(origin)?;

        Ok(TapBip32Derivation::new(xonly_pubkey, leaf_hashes, origin))
    }

    /// Serializes the value part of the pair, inverse of
    /// [`TapBip32Derivation::deserialize_value`].
    pub fn serialize_value(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(
            9 + self.leaf_hashes.len() * LEAF_HASH_LEN + self.origin.serialized_len(),
        );
        VarInt(self.leaf_hashes.len() as u64)
            .consensus_encode(&mut data)
            .expect("in-memory writers don't error");
        for hash in &self.leaf_hashes {
            data.extend_from_slice(hash.as_inner());
        }
        data.extend(self.origin.serialize());
        data
    }

    /// Order in which taproot derivations are serialized: by x-only key bytes.
    ///
    /// This is not an identity relation: entries with equal keys but different
    /// origins compare equal here.
    #[inline]
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.xonly_pubkey.cmp(&other.xonly_pubkey)
    }

    /// Whether `self` is serialized before `other`.
    #[inline]
    pub fn sort_before(&self, other: &Self) -> bool {
        self.canonical_cmp(other) == Ordering::Less
    }
}

#[cfg(test)]
mod test {
    use bitcoin::hashes::hex::FromHex;
    use bitcoin::util::bip32::Fingerprint;
    use pst_hd::KeyOriginError;

    use super::*;

    fn origin() -> KeyOrigin {
        // m/86'/0'/0'/0/5
        let path = [0x8000_0056, 0x8000_0000, 0x8000_0000, 0, 5];
        KeyOrigin::with(Fingerprint::from(&[0xde, 0xad, 0xbe, 0xef][..]), path)
    }

    #[test]
    fn key_path_value() {
        let xonly = XOnlyPubkey::from([1u8; 32]);
        let value = Vec::<u8>::from_hex(
            "00deadbeef5600008000000080000000800000000005000000",
        )
        .unwrap();
        let derivation = TapBip32Derivation::deserialize_value(xonly, &value).unwrap();
        assert!(derivation.leaf_hashes.is_empty());
        assert_eq!(derivation.origin, origin());
        assert_eq!(derivation.serialize_value(), value);
    }

    #[test]
    fn script_path_value() {
        let leaf = TapLeafHash::from_inner([0x11; 32]);
        let derivation =
            TapBip32Derivation::new(XOnlyPubkey::from([2u8; 32]), vec![leaf, leaf], origin());
        let value = derivation.serialize_value();
        assert_eq!(value.len(), 1 + 64 + 4 + 20);
        assert_eq!(value[0], 2);
        assert_eq!(&value[1..33], &[0x11; 32][..]);
        assert_eq!(
            TapBip32Derivation::deserialize_value(derivation.xonly_pubkey, &value).unwrap(),
            derivation
        );
    }

    #[test]
    fn malformed_values() {
        let xonly = XOnlyPubkey::from([3u8; 32]);
        assert_eq!(
            TapBip32Derivation::deserialize_value(xonly, &[]),
            Err(MalformedValue::LeafCount)
        );
        // one leaf hash declared, only the fingerprint present
        assert_eq!(
            TapBip32Derivation::deserialize_value(xonly, &[0x01, 0xde, 0xad, 0xbe, 0xef]),
            Err(MalformedValue::LeafHashes(1, 4))
        );
        // absurd leaf count must not overflow
        assert_eq!(
            TapBip32Derivation::deserialize_value(xonly, &[
                0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff
            ]),
            Err(MalformedValue::LeafHashes(u64::MAX, 0))
        );
        // misaligned derivation path after the hashes
        assert_eq!(
            TapBip32Derivation::deserialize_value(xonly, &[0x00, 0xde, 0xad, 0xbe, 0xef, 0x01]),
            Err(MalformedValue::KeyOrigin(KeyOriginError::MisalignedPath(5)))
        );
    }

    #[test]
    fn canonical_order() {
        let low = TapBip32Derivation::new(XOnlyPubkey::from([1u8; 32]), vec![], origin());
        let mut high = low.clone();
        high.xonly_pubkey = XOnlyPubkey::from([2u8; 32]);
        assert!(low.sort_before(&high));
        assert!(!high.sort_before(&low));

        let mut same_key = low.clone();
        same_key.origin = KeyOrigin::with(Fingerprint::from(&[0u8; 4][..]), Vec::new());
        assert_eq!(low.canonical_cmp(&same_key), Ordering::Equal);
        assert_ne!(low, same_key);
    }
}
