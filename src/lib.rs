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

//! Partially signed transaction output maps: key validation, key origins and
//! the canonical output map codec.

// Coding conventions
#![recursion_limit = "256"]
#![deny(dead_code, missing_docs)]

pub extern crate pst_hd as hd;
pub extern crate pst_maps as maps;

pub mod lex_order {
    //! Lexicographic sorting functions.
    pub use maps::lex_order::*;
}

pub use hd::{CompressedPubkey, KeyOrigin, XOnlyPubkey};
pub use maps::{
    Bip32Derivation, DecodeError, Limits, Map, Output, OutputType, TapBip32Derivation,
};
