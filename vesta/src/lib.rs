//! Rust-native building blocks for constructing and signing Cardano
//! transactions
//!
//! Vesta is a collection of crates covering the path from caller intents to
//! a canonically encoded, witnessed transaction: CBOR codecs, crypto
//! primitives, addresses, Conway-era ledger types, HD key custody and the
//! balancing transaction builder. This crate re-exports them under one
//! roof; no functionality of its own.

#[doc(inline)]
pub use vesta_codec as codec;

#[doc(inline)]
pub use vesta_crypto as crypto;

pub mod ledger {
    //! Ledger primitives and their cbor codecs

    #[doc(inline)]
    pub use vesta_addresses as addresses;

    #[doc(inline)]
    pub use vesta_primitives as primitives;
}

#[doc(inline)]
pub use vesta_wallet as wallet;

#[doc(inline)]
pub use vesta_txbuilder as txbuilder;
