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

use std::io;

use bitcoin::consensus::encode;
use pst_hd::KeyOriginError;

/// Errors in the byte layout of a field value (see [`DecodeError::Malformed`]).
#[derive(
    Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Display, Error, From
)]
#[display(doc_comments)]
pub enum MalformedValue {
    /// Key origin part of a derivation value is invalid (see
    /// [`KeyOriginError`]).
    #[from]
    #[display(inner)]
    KeyOrigin(KeyOriginError),

    /// taproot derivation value has no valid compact-size leaf hash count.
    LeafCount,

    /// taproot derivation value declares {0} leaf hashes, but has only {1}
    /// bytes after the count.
    LeafHashes(u64, usize),
}

/// Errors decoding a PSBT key-value map.
///
/// Every error is terminal for the current decode call: the map being read is
/// discarded and the stream position is undefined.
#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum DecodeError {
    /// the stream ended before the declared length was satisfied.
    Truncated,

    /// declared value length {declared} exceeds the maximum of {max} bytes.
    OversizedValue {
        /// Value length read from the stream.
        declared: u64,
        /// Maximum allowed by the decoding [`Limits`](crate::Limits).
        max: usize,
    },

    /// duplicate key in the map.
    DuplicateKey,

    /// key data are present where forbidden, absent where required, or are not
    /// a structurally valid public key.
    InvalidKeyData,

    /// field value is malformed: {0}
    #[from]
    Malformed(MalformedValue),

    /// invalid map format: unknown field type, non-canonical length prefix or
    /// data after the map separator.
    InvalidFormat,

    /// I/O error reading the map: {0}
    Io(io::Error),
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => DecodeError::Truncated,
            _ => DecodeError::Io(err),
        }
    }
}

impl From<encode::Error> for DecodeError {
    fn from(err: encode::Error) -> Self {
        match err {
            encode::Error::Io(err) => err.into(),
            _ => DecodeError::InvalidFormat,
        }
    }
}

impl From<KeyOriginError> for DecodeError {
    #[inline]
    fn from(err: KeyOriginError) -> Self { DecodeError::Malformed(err.into()) }
}

impl DecodeError {
    /// Detects whether the error was caused by the stream (rather than by the
    /// data read from it).
    pub fn is_io(&self) -> bool { matches!(self, DecodeError::Io(_)) }
}
