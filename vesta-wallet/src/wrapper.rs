//! Passphrase-sealed storage for root key material
//!
//! Layout of a sealed blob:
//!
//! ```text
//! magic (4) | version (1) | key type (1) | payload len (4, BE)
//! | pbkdf2 salt (32) | nonce (12) | ciphertext (len) | poly1305 tag (16)
//! ```
//!
//! The cipher key is PBKDF2-HMAC-SHA512(passphrase, salt, 4096 rounds) and
//! the payload is encrypted with ChaCha20-Poly1305.

use cryptoxide::{
    chacha20poly1305::ChaCha20Poly1305, hmac::Hmac, pbkdf2::pbkdf2, sha2::Sha512,
};

use vesta_crypto::memsec::{Scrubbed as _, SecretBytes};

use crate::Error;

const MAGIC: [u8; 4] = *b"vsks";
const VERSION: u8 = 1;

const SALT_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;
const HEADER_SIZE: usize = 4 + 1 + 1 + 4;

const PBKDF2_ITERATIONS: u32 = 4096;

/// Kind of key material inside a sealed blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Bip32Root,
    Ed25519,
    Ed25519Extended,
}

impl KeyType {
    fn to_byte(self) -> u8 {
        match self {
            KeyType::Bip32Root => 0,
            KeyType::Ed25519 => 1,
            KeyType::Ed25519Extended => 2,
        }
    }

    fn from_byte(byte: u8) -> Result<Self, Error> {
        match byte {
            0 => Ok(KeyType::Bip32Root),
            1 => Ok(KeyType::Ed25519),
            2 => Ok(KeyType::Ed25519Extended),
            _ => Err(Error::WrapperDataInvalidSize),
        }
    }
}

fn stretch_key(passphrase: &[u8], salt: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];

    let mut mac = Hmac::new(Sha512::new(), passphrase);
    pbkdf2(&mut mac, salt, PBKDF2_ITERATIONS, &mut key);

    key
}

/// Seal key material under the given passphrase.
///
/// Salt and nonce are caller-provided so the operation stays deterministic
/// for a fixed input; callers draw them from a CSPRNG.
pub fn seal(
    key_type: KeyType,
    plaintext: &[u8],
    passphrase: &[u8],
    salt: [u8; SALT_SIZE],
    nonce: [u8; NONCE_SIZE],
) -> Vec<u8> {
    let mut cipher_key = stretch_key(passphrase, &salt);

    let mut ciphertext = vec![0u8; plaintext.len()];
    let mut tag = [0u8; TAG_SIZE];

    let mut cipher = ChaCha20Poly1305::new(&cipher_key, &nonce, &[]);
    cipher.encrypt(plaintext, &mut ciphertext, &mut tag);

    cipher_key.scrub();

    let mut out = Vec::with_capacity(
        HEADER_SIZE + SALT_SIZE + NONCE_SIZE + ciphertext.len() + TAG_SIZE,
    );

    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    out.push(key_type.to_byte());
    out.extend_from_slice(&(ciphertext.len() as u32).to_be_bytes());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    out.extend_from_slice(&tag);

    out
}

/// Open a sealed blob with the given passphrase.
pub fn unseal(blob: &[u8], passphrase: &[u8]) -> Result<(KeyType, SecretBytes), Error> {
    if blob.len() < HEADER_SIZE + SALT_SIZE + NONCE_SIZE + TAG_SIZE {
        return Err(Error::WrapperDataInvalidSize);
    }

    if blob[0..4] != MAGIC {
        return Err(Error::WrapperBadMagic);
    }

    if blob[4] != VERSION {
        return Err(Error::WrapperUnsupportedVersion(blob[4]));
    }

    let key_type = KeyType::from_byte(blob[5])?;

    let len = u32::from_be_bytes(blob[6..10].try_into().unwrap()) as usize;

    if blob.len() != HEADER_SIZE + SALT_SIZE + NONCE_SIZE + len + TAG_SIZE {
        return Err(Error::WrapperDataInvalidSize);
    }

    let salt = &blob[HEADER_SIZE..HEADER_SIZE + SALT_SIZE];
    let nonce = &blob[HEADER_SIZE + SALT_SIZE..HEADER_SIZE + SALT_SIZE + NONCE_SIZE];
    let ciphertext_start = HEADER_SIZE + SALT_SIZE + NONCE_SIZE;
    let ciphertext = &blob[ciphertext_start..ciphertext_start + len];
    let tag = &blob[ciphertext_start + len..];

    let mut cipher_key = stretch_key(passphrase, salt);

    let mut plaintext = vec![0u8; len];

    let mut cipher = ChaCha20Poly1305::new(&cipher_key, nonce, &[]);
    let ok = cipher.decrypt(ciphertext, &mut plaintext, tag);

    cipher_key.scrub();

    if !ok {
        plaintext.scrub();
        return Err(Error::WrapperDataFailedToDecrypt);
    }

    Ok((key_type, SecretBytes::new(plaintext)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_unseal_roundtrip() {
        let secret = b"ninety-six bytes of pretend root key material....".to_vec();

        let blob = seal(
            KeyType::Bip32Root,
            &secret,
            b"hunter2",
            [7u8; SALT_SIZE],
            [9u8; NONCE_SIZE],
        );

        let (key_type, plaintext) = unseal(&blob, b"hunter2").unwrap();

        assert_eq!(key_type, KeyType::Bip32Root);
        assert_eq!(plaintext.as_ref(), secret.as_slice());
    }

    #[test]
    fn wrong_passphrase_fails_authentication() {
        let blob = seal(
            KeyType::Bip32Root,
            b"secret",
            b"right",
            [1u8; SALT_SIZE],
            [2u8; NONCE_SIZE],
        );

        assert!(matches!(
            unseal(&blob, b"wrong"),
            Err(Error::WrapperDataFailedToDecrypt)
        ));
    }

    #[test]
    fn tampered_blob_is_rejected() {
        let mut blob = seal(
            KeyType::Bip32Root,
            b"secret",
            b"pass",
            [1u8; SALT_SIZE],
            [2u8; NONCE_SIZE],
        );

        let last = blob.len() - 1;
        blob[last] ^= 0x01;

        assert!(matches!(
            unseal(&blob, b"pass"),
            Err(Error::WrapperDataFailedToDecrypt)
        ));
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut blob = seal(
            KeyType::Bip32Root,
            b"secret",
            b"pass",
            [1u8; SALT_SIZE],
            [2u8; NONCE_SIZE],
        );

        blob[0] = b'x';

        assert!(matches!(unseal(&blob, b"pass"), Err(Error::WrapperBadMagic)));
    }

    #[test]
    fn truncated_blob_is_rejected() {
        assert!(matches!(
            unseal(&[0u8; 10], b"pass"),
            Err(Error::WrapperDataInvalidSize)
        ));
    }
}
