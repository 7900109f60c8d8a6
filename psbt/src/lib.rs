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

// Coding conventions
#![recursion_limit = "256"]
#![deny(dead_code, missing_docs)]

//! Codec for the per-output key-value maps of partially signed transactions
//! (BIP174 output fields and their BIP371 taproot extensions).
//!
//! Decoding accepts only well-formed maps: duplicate keys, key data of a wrong
//! shape, malformed values and unknown key types are all rejected. Encoding
//! always produces the canonical serialization, so decoding and re-encoding a
//! map is byte-identical.

#[macro_use]
extern crate amplify;
#[cfg(feature = "serde")]
#[macro_use]
extern crate serde_crate as serde;

mod derivation;
mod errors;
pub mod lex_order;
mod map;
mod output;
pub mod raw;

pub use derivation::{Bip32Derivation, TapBip32Derivation};
pub use errors::{DecodeError, MalformedValue};
pub use lex_order::LexOrder;
pub use map::{Limits, Map, MAX_KEY_LEN, MAX_VALUE_LEN};
pub use output::{Output, OutputType};
