//! Ed25519-BIP32 hierarchical-deterministic keys, CIP-1852 flavored

use bech32::{FromBase32, ToBase32};
use bip39::rand_core::{CryptoRng, RngCore};
use bip39::{Language, Mnemonic};
use cryptoxide::{hmac::Hmac, pbkdf2::pbkdf2, sha2::Sha512};
use ed25519_bip32::{self, XPrv, XPub, XPRV_SIZE};
use vesta_crypto::key::{self, SecretKeyExtended};
use vesta_crypto::memsec::Scrubbed as _;

use crate::{Error, PrivateKey};

/// Root-seed stretching rounds, the count used by Cardano wallets since Byron
const PBKDF2_ITERATIONS: u32 = 4096;

pub fn harden(index: u32) -> u32 {
    index | 0x8000_0000
}

/// `m / 1852' / 1815' / account' / role / index`
pub const PURPOSE: u32 = 1852;
pub const COIN_TYPE: u32 = 1815;

/// The chain-role level of a CIP-1852 derivation path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    External,
    Internal,
    Staking,
    DRep,
    CommitteeCold,
    CommitteeHot,
}

impl Role {
    pub fn index(&self) -> u32 {
        match self {
            Role::External => 0,
            Role::Internal => 1,
            Role::Staking => 2,
            Role::DRep => 3,
            Role::CommitteeCold => 4,
            Role::CommitteeHot => 5,
        }
    }
}

/// Account-relative derivation coordinates below the 1852'/1815' prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    pub account: u32,
    pub role: Role,
    pub index: u32,
}

impl DerivationPath {
    pub fn payment(account: u32, index: u32) -> Self {
        Self {
            account,
            role: Role::External,
            index,
        }
    }

    pub fn staking(account: u32) -> Self {
        Self {
            account,
            role: Role::Staking,
            index: 0,
        }
    }

    pub fn drep(account: u32) -> Self {
        Self {
            account,
            role: Role::DRep,
            index: 0,
        }
    }
}

/// Ed25519-BIP32 HD private key (96 bytes: extended scalar + chain code)
#[derive(Debug, PartialEq, Eq)]
pub struct Bip32PrivateKey(ed25519_bip32::XPrv);

impl Bip32PrivateKey {
    const BECH32_HRP: &'static str = "xprv";

    pub fn generate<T: RngCore + CryptoRng>(mut rng: T) -> Self {
        let mut buf = [0u8; XPRV_SIZE];
        rng.fill_bytes(&mut buf);
        let xprv = XPrv::normalize_bytes_force3rd(buf);

        Self(xprv)
    }

    pub fn generate_with_mnemonic<T: RngCore + CryptoRng>(
        mut rng: T,
        password: &str,
    ) -> (Self, Mnemonic) {
        let mnemonic = Mnemonic::generate_in_with(&mut rng, Language::English, 24)
            .expect("24 is a valid word count");

        let key = Self::from_entropy(&mnemonic.to_entropy(), password);

        (key, mnemonic)
    }

    /// Stretch BIP39 entropy into the 96-byte root via
    /// PBKDF2-HMAC-SHA512(passphrase, entropy, 4096)
    pub fn from_entropy(entropy: &[u8], password: &str) -> Self {
        let mut stretched = [0u8; XPRV_SIZE];

        let mut mac = Hmac::new(Sha512::new(), password.as_bytes());
        pbkdf2(&mut mac, entropy, PBKDF2_ITERATIONS, &mut stretched);

        let xprv = XPrv::normalize_bytes_force3rd(stretched);

        stretched.scrub();

        Self(xprv)
    }

    pub fn from_bip39_mnemonic(mnemonic: &str, password: &str) -> Result<Self, Error> {
        let bip39 = Mnemonic::parse(mnemonic).map_err(Error::Mnemonic)?;

        Ok(Self::from_entropy(&bip39.to_entropy(), password))
    }

    pub fn from_bytes(bytes: [u8; XPRV_SIZE]) -> Result<Self, Error> {
        XPrv::from_bytes_verified(bytes).map(Self).map_err(Error::Xprv)
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        self.0.as_ref().to_vec()
    }

    pub fn derive(&self, index: u32) -> Self {
        Self(self.0.derive(ed25519_bip32::DerivationScheme::V2, index))
    }

    /// Derive the `m/1852'/1815'/account'` node
    pub fn derive_account(&self, account: u32) -> Self {
        self.derive(harden(PURPOSE))
            .derive(harden(COIN_TYPE))
            .derive(harden(account))
    }

    /// Derive the leaf at `m/1852'/1815'/account'/role/index`
    pub fn derive_for_path(&self, path: DerivationPath) -> Self {
        self.derive_account(path.account)
            .derive(path.role.index())
            .derive(path.index)
    }

    pub fn to_ed25519_private_key(&self) -> PrivateKey {
        // the key passed through the ed25519_bip32 structural checks already
        PrivateKey::Extended(unsafe {
            SecretKeyExtended::from_bytes_unchecked(self.0.extended_secret_key())
        })
    }

    pub fn to_public(&self) -> Bip32PublicKey {
        Bip32PublicKey(self.0.public())
    }

    pub fn chain_code(&self) -> [u8; 32] {
        *self.0.chain_code()
    }

    pub fn to_bech32(&self) -> String {
        bech32::encode(
            Self::BECH32_HRP,
            self.as_bytes().to_base32(),
            bech32::Variant::Bech32,
        )
        .unwrap()
    }

    pub fn from_bech32(bech32: &str) -> Result<Self, Error> {
        let (hrp, data, _) = bech32::decode(bech32).map_err(Error::InvalidBech32)?;

        if hrp != Self::BECH32_HRP {
            return Err(Error::InvalidBech32Hrp);
        }

        let data = Vec::<u8>::from_base32(&data).map_err(Error::InvalidBech32)?;
        Self::from_bytes(data.try_into().map_err(|_| Error::UnexpectedBech32Length)?)
    }
}

/// Ed25519-BIP32 HD public key (64 bytes: point + chain code)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bip32PublicKey(ed25519_bip32::XPub);

impl Bip32PublicKey {
    const BECH32_HRP: &'static str = "xpub";

    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(XPub::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> Vec<u8> {
        self.0.as_ref().to_vec()
    }

    /// Soft derivation; hardened indexes fail
    pub fn derive(&self, index: u32) -> Result<Self, Error> {
        self.0
            .derive(ed25519_bip32::DerivationScheme::V2, index)
            .map(Self)
            .map_err(Error::DerivationError)
    }

    pub fn to_ed25519_pubkey(&self) -> key::PublicKey {
        self.0.public_key().into()
    }

    pub fn chain_code(&self) -> [u8; 32] {
        *self.0.chain_code()
    }

    pub fn to_bech32(&self) -> String {
        bech32::encode(
            Self::BECH32_HRP,
            self.as_bytes().to_base32(),
            bech32::Variant::Bech32,
        )
        .unwrap()
    }

    pub fn from_bech32(bech32: &str) -> Result<Self, Error> {
        let (hrp, data, _) = bech32::decode(bech32).map_err(Error::InvalidBech32)?;

        if hrp != Self::BECH32_HRP {
            return Err(Error::InvalidBech32Hrp);
        }

        let data = Vec::<u8>::from_base32(&data).map_err(Error::InvalidBech32)?;

        Ok(Self::from_bytes(
            data.try_into().map_err(|_| Error::UnexpectedBech32Length)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use bip39::rand_core::OsRng;

    use super::*;

    #[test]
    fn mnemonic_roundtrip() {
        let (xprv, mnemonic) = Bip32PrivateKey::generate_with_mnemonic(OsRng, "");

        let xprv_from_mnemonic =
            Bip32PrivateKey::from_bip39_mnemonic(&mnemonic.to_string(), "").unwrap();

        assert_eq!(xprv, xprv_from_mnemonic)
    }

    #[test]
    fn bech32_roundtrip() {
        let xprv = Bip32PrivateKey::generate(OsRng);

        let decoded = Bip32PrivateKey::from_bech32(&xprv.to_bech32()).unwrap();
        assert_eq!(xprv, decoded);

        let xpub = xprv.to_public();

        let decoded = Bip32PublicKey::from_bech32(&xpub.to_bech32()).unwrap();
        assert_eq!(xpub, decoded);
    }

    #[test]
    fn soft_derivation_commutes_with_to_public() {
        let xprv = Bip32PrivateKey::generate(OsRng);
        let account = xprv.derive_account(0);

        // deriving the soft levels on the private side and then taking the
        // public key must equal soft-deriving the account public key
        let from_private = account.derive(0).derive(5).to_public();
        let from_public = account.to_public().derive(0).unwrap().derive(5).unwrap();

        assert_eq!(from_private, from_public);
    }

    #[test]
    fn hard_derivation_fails_on_public_keys() {
        let xprv = Bip32PrivateKey::generate(OsRng);
        let xpub = xprv.to_public();

        assert!(xpub.derive(harden(0)).is_err());
    }

    #[test]
    fn path_derivation_matches_manual_chain() {
        let xprv = Bip32PrivateKey::generate(OsRng);

        let path = DerivationPath::payment(0, 7);

        let manual = xprv
            .derive(harden(1852))
            .derive(harden(1815))
            .derive(harden(0))
            .derive(0)
            .derive(7);

        assert_eq!(xprv.derive_for_path(path), manual);
    }
}
