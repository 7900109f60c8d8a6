// Partially signed transaction library
// by LNP/BP Association (https://lnp-bp.org)
// Written in 2020-2022 by
//     Dr. Maxim Orlovsky <orlovsky@pandoracore.com>
//
// To the extent possible under law, the author(s) have dedicated all
// copyright and related and neighboring rights to this software to
// the public domain worldwide. This software is distributed without
// any warranty.
//
// You should have received a copy of the Apache-2.0 License
// along with this software.
// If not, see <https://opensource.org/licenses/Apache-2.0>.

use std::io;

use bitcoin::Script;
use pst_hd::{CompressedPubkey, KeyOrigin, XOnlyPubkey};
#[cfg(feature = "serde")]
use serde_with::{hex::Hex, As};
use tracing::{debug, trace};

use crate::lex_order::{bip32_cmp, tap_bip32_cmp};
use crate::raw::{self, Key};
use crate::{Bip32Derivation, DecodeError, Limits, Map, TapBip32Derivation};

/// Types of keys allowed in an output map. Any other key type makes the map
/// invalid.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display)]
#[repr(u8)]
pub enum OutputType {
    /// `PSBT_OUT_REDEEM_SCRIPT`
    #[display("PSBT_OUT_REDEEM_SCRIPT")]
    RedeemScript = 0x00,

    /// `PSBT_OUT_WITNESS_SCRIPT`
    #[display("PSBT_OUT_WITNESS_SCRIPT")]
    WitnessScript = 0x01,

    /// `PSBT_OUT_BIP32_DERIVATION`
    #[display("PSBT_OUT_BIP32_DERIVATION")]
    Bip32Derivation = 0x02,

    /// `PSBT_OUT_TAP_INTERNAL_KEY`
    #[display("PSBT_OUT_TAP_INTERNAL_KEY")]
    TapInternalKey = 0x05,

    /// `PSBT_OUT_TAP_TREE`
    #[display("PSBT_OUT_TAP_TREE")]
    TapTree = 0x06,

    /// `PSBT_OUT_TAP_BIP32_DERIVATION`
    #[display("PSBT_OUT_TAP_BIP32_DERIVATION")]
    TapBip32Derivation = 0x07,
}

impl OutputType {
    /// Returns the key type byte.
    #[inline]
    pub const fn type_value(self) -> u8 { self as u8 }
}

impl From<OutputType> for u8 {
    #[inline]
    fn from(ty: OutputType) -> Self { ty.type_value() }
}

impl TryFrom<u8> for OutputType {
    type Error = DecodeError;

    fn try_from(type_value: u8) -> Result<Self, Self::Error> {
        Ok(match type_value {
            0x00 => OutputType::RedeemScript,
            0x01 => OutputType::WitnessScript,
            0x02 => OutputType::Bip32Derivation,
            0x05 => OutputType::TapInternalKey,
            0x06 => OutputType::TapTree,
            0x07 => OutputType::TapBip32Derivation,
            _ => return Err(DecodeError::InvalidFormat),
        })
    }
}

/// Key-value map attached to a single transaction output.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "camelCase")
)]
pub struct Output {
    /// The redeem script for this output.
    pub redeem_script: Option<Script>,

    /// The witness script for this output.
    pub witness_script: Option<Script>,

    /// Public keys needed to spend this output with their master key
    /// fingerprints and derivation paths. Unique by public key.
    pub bip32_derivation: Vec<Bip32Derivation>,

    /// The taproot internal key.
    pub tap_internal_key: Option<XOnlyPubkey>,

    /// Taproot script tree, kept in its serialized form.
    #[cfg_attr(feature = "serde", serde(with = "As::<Option<Hex>>"))]
    pub tap_tree: Option<Vec<u8>>,

    /// Taproot x-only keys with their origins and the leaves they are used in.
    /// Unique by x-only key.
    pub tap_bip32_derivation: Vec<TapBip32Derivation>,
}

impl Output {
    /// Constructs output map from the fields which are not taproot-specific;
    /// any of them may be empty.
    pub fn new(
        redeem_script: Option<Script>,
        witness_script: Option<Script>,
        bip32_derivation: Vec<Bip32Derivation>,
    ) -> Self {
        Output {
            redeem_script,
            witness_script,
            bip32_derivation,
            ..Output::default()
        }
    }

    /// Detects whether the map has no fields.
    pub fn is_empty(&self) -> bool { self == &Output::default() }

    /// Adds a single decoded pair to the map, checking the key data and value
    /// structure for its type and rejecting duplicates.
    ///
    /// On error the map is left unchanged.
    pub fn insert_pair(&mut self, key: Key, value: Vec<u8>) -> Result<(), DecodeError> {
        match OutputType::try_from(key.type_value)? {
            OutputType::RedeemScript => {
                if self.redeem_script.is_some() {
                    return Err(DecodeError::DuplicateKey);
                }
                if !key.has_no_data() {
                    return Err(DecodeError::InvalidKeyData);
                }
                self.redeem_script = Some(value.into());
            }

            OutputType::WitnessScript => {
                if self.witness_script.is_some() {
                    return Err(DecodeError::DuplicateKey);
                }
                if !key.has_no_data() {
                    return Err(DecodeError::InvalidKeyData);
                }
                self.witness_script = Some(value.into());
            }

            OutputType::Bip32Derivation => {
                let pubkey = key
                    .key_data()
                    .and_then(|data| CompressedPubkey::from_slice(data).ok())
                    .ok_or(DecodeError::InvalidKeyData)?;
                let origin = KeyOrigin::deserialize(&value)?;
                if self.bip32_derivation.iter().any(|d| d.pubkey == pubkey) {
                    return Err(DecodeError::DuplicateKey);
                }
                self.bip32_derivation
                    .push(Bip32Derivation::new(pubkey, origin));
            }

            OutputType::TapInternalKey => {
                if self.tap_internal_key.is_some() {
                    return Err(DecodeError::DuplicateKey);
                }
                if !key.has_no_data() {
                    return Err(DecodeError::InvalidKeyData);
                }
                let internal_key =
                    XOnlyPubkey::from_slice(&value).map_err(|_| DecodeError::InvalidKeyData)?;
                self.tap_internal_key = Some(internal_key);
            }

            OutputType::TapTree => {
                if self.tap_tree.is_some() {
                    return Err(DecodeError::DuplicateKey);
                }
                if !key.has_no_data() {
                    return Err(DecodeError::InvalidKeyData);
                }
                self.tap_tree = Some(value);
            }

            OutputType::TapBip32Derivation => {
                let xonly_pubkey = key
                    .key_data()
                    .and_then(|data| XOnlyPubkey::from_slice(data).ok())
                    .ok_or(DecodeError::InvalidKeyData)?;
                let derivation = TapBip32Derivation::deserialize_value(xonly_pubkey, &value)?;
                if self
                    .tap_bip32_derivation
                    .iter()
                    .any(|d| d.xonly_pubkey == xonly_pubkey)
                {
                    return Err(DecodeError::DuplicateKey);
                }
                self.tap_bip32_derivation.push(derivation);
            }
        }
        Ok(())
    }
}

impl Map for Output {
    fn decode_map<R: io::Read + ?Sized>(
        reader: &mut R,
        limits: &Limits,
    ) -> Result<Self, DecodeError> {
        let mut output = Output::default();
        while let Some(key) = raw::read_key(reader, limits)? {
            let value = raw::read_value(reader, limits.max_value_len)?;
            trace!(type_value = key.type_value, len = value.len(), "output map pair");
            let type_value = key.type_value;
            output.insert_pair(key, value).map_err(|err| {
                debug!(type_value, %err, "rejecting output map");
                err
            })?;
        }
        Ok(output)
    }

    fn encode_map<W: io::Write + ?Sized>(&self, writer: &mut W) -> Result<usize, io::Error> {
        let mut len = 0usize;

        if let Some(script) = &self.redeem_script {
            len += raw::write_pair(
                writer,
                OutputType::RedeemScript.into(),
                None,
                script.as_bytes(),
            )?;
        }

        if let Some(script) = &self.witness_script {
            len += raw::write_pair(
                writer,
                OutputType::WitnessScript.into(),
                None,
                script.as_bytes(),
            )?;
        }

        let mut bip32_derivation = self.bip32_derivation.iter().collect::<Vec<_>>();
        bip32_derivation.sort_by(|a, b| bip32_cmp(a, b));
        for derivation in bip32_derivation {
            len += raw::write_pair(
                writer,
                OutputType::Bip32Derivation.into(),
                Some(derivation.pubkey.as_ref()),
                &derivation.serialize_value(),
            )?;
        }

        if let Some(key) = &self.tap_internal_key {
            len += raw::write_pair(writer, OutputType::TapInternalKey.into(), None, key.as_ref())?;
        }

        if let Some(tree) = &self.tap_tree {
            len += raw::write_pair(writer, OutputType::TapTree.into(), None, tree)?;
        }

        let mut tap_bip32_derivation = self.tap_bip32_derivation.iter().collect::<Vec<_>>();
        tap_bip32_derivation.sort_by(|a, b| tap_bip32_cmp(a, b));
        for derivation in tap_bip32_derivation {
            len += raw::write_pair(
                writer,
                OutputType::TapBip32Derivation.into(),
                Some(derivation.xonly_pubkey.as_ref()),
                &derivation.serialize_value(),
            )?;
        }

        len += raw::write_separator(writer)?;
        trace!(len, "output map serialized");
        Ok(len)
    }
}
