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

//! Field validators shared by partially signed transaction maps.
//!
//! Includes structural checks for compressed and x-only public keys and the
//! encoding of BIP32 key origins (master fingerprint and derivation path).

// Coding conventions
#![recursion_limit = "256"]
#![deny(dead_code, missing_docs)]

#[macro_use]
extern crate amplify;

#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

mod keys;
mod origin;

pub use keys::{
    validate_compressed_pubkey, validate_xonly_pubkey, CompressedPubkey, KeyError, XOnlyPubkey,
    COMPRESSED_PUBKEY_LEN, XONLY_PUBKEY_LEN,
};
pub use origin::{KeyOrigin, KeyOriginError, FINGERPRINT_LEN};

/// Constant determining BIP32 boundary for u32 values after which index
/// is treated as hardened
pub const HARDENED_INDEX_BOUNDARY: u32 = 1 << 31;
