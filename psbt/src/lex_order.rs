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

//! Lexicographic sorting functions.
//!
//! Repeated fields of a map are always serialized in the order defined here,
//! so the same logical map has exactly one serialization.

use std::cmp::Ordering;

use crate::{Bip32Derivation, Output, TapBip32Derivation};

/// Types which can be put into canonical (lexicographic) order.
pub trait LexOrder {
    /// Sorts in place.
    fn lex_order(&mut self);

    /// Returns sorted value.
    fn lex_ordered(mut self) -> Self
    where
        Self: Sized,
    {
        self.lex_order();
        self
    }
}

/// Orders BIP32 derivations by the bytes of their public keys.
#[inline]
pub fn bip32_cmp(left: &Bip32Derivation, right: &Bip32Derivation) -> Ordering {
    left.pubkey.cmp(&right.pubkey)
}

/// Orders taproot derivations (see [`TapBip32Derivation::canonical_cmp`]).
#[inline]
pub fn tap_bip32_cmp(left: &TapBip32Derivation, right: &TapBip32Derivation) -> Ordering {
    left.canonical_cmp(right)
}

impl LexOrder for Vec<Bip32Derivation> {
    fn lex_order(&mut self) { self.sort_by(bip32_cmp) }
}

impl LexOrder for Vec<TapBip32Derivation> {
    fn lex_order(&mut self) { self.sort_by(tap_bip32_cmp) }
}

impl LexOrder for Output {
    fn lex_order(&mut self) {
        self.bip32_derivation.lex_order();
        self.tap_bip32_derivation.lex_order();
    }
}
