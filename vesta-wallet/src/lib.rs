use vesta_crypto::key::{
    PublicKey, SecretKey, SecretKeyExtended, Signature, TryFromSecretKeyExtendedError,
};

use thiserror::Error;

pub mod hd;
pub mod keystore;
pub mod wrapper;

#[derive(Error, Debug)]
pub enum Error {
    /// Sealed key data of unexpected length or layout
    #[error("Sealed key data has an invalid size or layout")]
    WrapperDataInvalidSize,
    /// Sealed key data with an unknown magic prefix
    #[error("Sealed key data has an unknown magic prefix")]
    WrapperBadMagic,
    /// Sealed key data written by an unsupported format version
    #[error("Sealed key format version {0} is not supported")]
    WrapperUnsupportedVersion(u8),
    /// Failed to decrypt sealed key data
    #[error("Failed to decrypt sealed key data")]
    WrapperDataFailedToDecrypt,
    /// The passphrase callback reported a failure
    #[error("Passphrase source failed: {0}")]
    PassphraseUnavailable(String),
    /// Unexpected bech32 HRP prefix
    #[error("Unexpected bech32 HRP prefix")]
    InvalidBech32Hrp,
    /// Unable to decode bech32 string
    #[error("Unable to decode bech32: {0}")]
    InvalidBech32(bech32::Error),
    /// Decoded bech32 data of unexpected length
    #[error("Decoded bech32 data of unexpected length")]
    UnexpectedBech32Length,
    /// Error relating to ed25519-bip32 private key
    #[error("Error relating to ed25519-bip32 private key: {0}")]
    Xprv(ed25519_bip32::PrivateKeyError),
    /// Error relating to bip39 mnemonic
    #[error("Error relating to bip39 mnemonic: {0}")]
    Mnemonic(bip39::Error),
    /// Error when attempting to derive ed25519-bip32 key
    #[error("Error when attempting to derive ed25519-bip32 key: {0}")]
    DerivationError(ed25519_bip32::DerivationError),
    /// Error that may occur when decrypting an invalid private key
    #[error("Invalid Ed25519 Extended Secret Key: {0}")]
    InvalidSecretKeyExtended(#[from] TryFromSecretKeyExtendedError),
}

/// A standard or extended Ed25519 secret key
pub enum PrivateKey {
    Normal(SecretKey),
    Extended(SecretKeyExtended),
}

impl PrivateKey {
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        match self {
            Self::Normal(_) => SecretKey::SIZE,
            Self::Extended(_) => SecretKeyExtended::SIZE,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            Self::Normal(x) => x.public_key(),
            Self::Extended(x) => x.public_key(),
        }
    }

    pub fn sign<T>(&self, msg: T) -> Signature
    where
        T: AsRef<[u8]>,
    {
        match self {
            Self::Normal(x) => x.sign(msg),
            Self::Extended(x) => x.sign(msg),
        }
    }
}

impl From<SecretKey> for PrivateKey {
    fn from(key: SecretKey) -> Self {
        PrivateKey::Normal(key)
    }
}

impl From<SecretKeyExtended> for PrivateKey {
    fn from(key: SecretKeyExtended) -> Self {
        PrivateKey::Extended(key)
    }
}
