//! Passphrase-gated key handlers
//!
//! A [KeyHandler] owns key material in sealed form only. Every signing or
//! derivation request routes through a [PassphraseSource], unseals the root
//! for the duration of the operation and scrubs the plaintext afterwards.

use rand::RngCore;

use vesta_crypto::key::{PublicKey, Signature};
use vesta_crypto::memsec::{Scrubbed as _, SecretBytes};

use crate::hd::{Bip32PrivateKey, Bip32PublicKey, DerivationPath};
use crate::wrapper::{self, KeyType};
use crate::Error;

/// Supplies the sealing passphrase on demand.
///
/// Implementations return the passphrase in a scrub-on-drop buffer. The
/// blanket impl lets plain closures act as sources; interactive fronts wrap
/// a no-echo terminal read in the same shape.
pub trait PassphraseSource {
    fn read_passphrase(&self) -> Result<SecretBytes, Error>;
}

impl<F> PassphraseSource for F
where
    F: Fn() -> Result<SecretBytes, Error>,
{
    fn read_passphrase(&self) -> Result<SecretBytes, Error> {
        self()
    }
}

/// Polymorphic handle over key custody backends.
///
/// The software handler below keeps the sealed root in memory; hardware or
/// remote custody implementations expose the same surface.
pub trait KeyHandler {
    /// The 64-byte BIP32 public key at `m/1852'/1815'/account'`
    fn account_public_key(&self, account: u32) -> Result<Bip32PublicKey, Error>;

    /// Sign `message` with the leaf key at every requested path
    fn sign(
        &self,
        message: &[u8],
        paths: &[DerivationPath],
    ) -> Result<Vec<(PublicKey, Signature)>, Error>;

    /// The sealed representation, suitable for persisting
    fn seal(&self) -> Result<Vec<u8>, Error>;
}

/// Software key handler holding a ChaCha20-Poly1305-sealed BIP32 root
pub struct SoftwareKeyHandler {
    sealed: Vec<u8>,
    passphrase: Box<dyn PassphraseSource>,
}

impl SoftwareKeyHandler {
    /// Seal a freshly derived root from a BIP39 mnemonic.
    ///
    /// `mnemonic_password` is the optional BIP39 passphrase folded into the
    /// root derivation; the sealing passphrase comes from `source`.
    pub fn from_mnemonic(
        mnemonic: &str,
        mnemonic_password: &str,
        source: Box<dyn PassphraseSource>,
    ) -> Result<Self, Error> {
        let root = Bip32PrivateKey::from_bip39_mnemonic(mnemonic, mnemonic_password)?;
        Self::from_root(&root, source)
    }

    /// Seal an existing root key.
    pub fn from_root(
        root: &Bip32PrivateKey,
        source: Box<dyn PassphraseSource>,
    ) -> Result<Self, Error> {
        let passphrase = source.read_passphrase()?;

        let mut salt = [0u8; 32];
        let mut nonce = [0u8; 12];
        rand::rngs::OsRng.fill_bytes(&mut salt);
        rand::rngs::OsRng.fill_bytes(&mut nonce);

        let mut plaintext = root.as_bytes();
        let sealed = wrapper::seal(KeyType::Bip32Root, &plaintext, &passphrase, salt, nonce);
        plaintext.scrub();

        Ok(Self {
            sealed,
            passphrase: source,
        })
    }

    /// Adopt a previously persisted sealed blob.
    ///
    /// The header is validated eagerly; decryption is deferred until the
    /// first operation that needs the root.
    pub fn open(blob: Vec<u8>, source: Box<dyn PassphraseSource>) -> Result<Self, Error> {
        let probe = source.read_passphrase()?;
        wrapper::unseal(&blob, &probe)?;

        Ok(Self {
            sealed: blob,
            passphrase: source,
        })
    }

    fn unseal_root(&self) -> Result<Bip32PrivateKey, Error> {
        let passphrase = self.passphrase.read_passphrase()?;

        let (key_type, plaintext) = wrapper::unseal(&self.sealed, &passphrase)?;

        if key_type != KeyType::Bip32Root {
            return Err(Error::WrapperDataInvalidSize);
        }

        let bytes: [u8; 96] = plaintext
            .as_ref()
            .try_into()
            .map_err(|_| Error::WrapperDataInvalidSize)?;

        Bip32PrivateKey::from_bytes(bytes)
    }
}

impl KeyHandler for SoftwareKeyHandler {
    fn account_public_key(&self, account: u32) -> Result<Bip32PublicKey, Error> {
        let root = self.unseal_root()?;

        Ok(root.derive_account(account).to_public())
    }

    fn sign(
        &self,
        message: &[u8],
        paths: &[DerivationPath],
    ) -> Result<Vec<(PublicKey, Signature)>, Error> {
        let root = self.unseal_root()?;

        let mut witnesses = Vec::with_capacity(paths.len());

        for path in paths {
            let leaf = root.derive_for_path(*path).to_ed25519_private_key();

            witnesses.push((leaf.public_key(), leaf.sign(message)));
        }

        Ok(witnesses)
    }

    fn seal(&self) -> Result<Vec<u8>, Error> {
        Ok(self.sealed.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hd::Role;

    const MNEMONIC: &str = "antenna whale clutch cushion narrow chronic matrix alarm raise much stove beach mimic daughter review build dinner twelve orbit soap decorate bachelor athlete close";

    fn passphrase() -> Box<dyn PassphraseSource> {
        Box::new(|| Ok(SecretBytes::from("correct horse battery staple")))
    }

    #[test]
    fn signatures_verify_against_derived_public_keys() {
        let handler = SoftwareKeyHandler::from_mnemonic(MNEMONIC, "", passphrase()).unwrap();

        let message = [0xab; 32];
        let paths = [
            DerivationPath::payment(0, 0),
            DerivationPath {
                account: 0,
                role: Role::Staking,
                index: 0,
            },
        ];

        let witnesses = handler.sign(&message, &paths).unwrap();
        assert_eq!(witnesses.len(), 2);

        for (pk, sig) in &witnesses {
            assert!(pk.verify(message, sig));
        }

        // distinct paths, distinct keys
        assert_ne!(witnesses[0].0, witnesses[1].0);
    }

    #[test]
    fn account_public_key_matches_direct_derivation() {
        let handler = SoftwareKeyHandler::from_mnemonic(MNEMONIC, "", passphrase()).unwrap();

        let direct = Bip32PrivateKey::from_bip39_mnemonic(MNEMONIC, "")
            .unwrap()
            .derive_account(0)
            .to_public();

        assert_eq!(handler.account_public_key(0).unwrap(), direct);
    }

    #[test]
    fn sealed_roundtrip_preserves_behavior() {
        let handler = SoftwareKeyHandler::from_mnemonic(MNEMONIC, "", passphrase()).unwrap();

        let blob = handler.seal().unwrap();
        let reopened = SoftwareKeyHandler::open(blob, passphrase()).unwrap();

        let message = b"same message";
        let paths = [DerivationPath::payment(0, 0)];

        assert_eq!(
            handler.sign(message, &paths).unwrap()[0].0,
            reopened.sign(message, &paths).unwrap()[0].0,
        );
    }

    #[test]
    fn wrong_passphrase_is_rejected_on_open() {
        let handler = SoftwareKeyHandler::from_mnemonic(MNEMONIC, "", passphrase()).unwrap();
        let blob = handler.seal().unwrap();

        let wrong: Box<dyn PassphraseSource> =
            Box::new(|| Ok(SecretBytes::from("not the passphrase")));

        assert!(matches!(
            SoftwareKeyHandler::open(blob, wrong),
            Err(Error::WrapperDataFailedToDecrypt)
        ));
    }
}
