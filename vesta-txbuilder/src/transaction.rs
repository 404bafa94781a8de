//! The immutable product of a successful build
//!
//! A [BuiltTransaction] freezes the body bytes (and therefore the id).
//! Witnesses can still be merged in: the witness identity is the public
//! key, and signing twice with the same key replaces the stored signature
//! rather than duplicating the entry.

use std::collections::BTreeMap;

use vesta_codec::minicbor;
use vesta_codec::utils::{Bytes, NonEmptySet};
use vesta_crypto::hash::Hash;
use vesta_crypto::key::{PublicKey, Signature};
use vesta_primitives::{Tx, VKeyWitness};
use vesta_wallet::hd::DerivationPath;
use vesta_wallet::keystore::KeyHandler;
use vesta_wallet::PrivateKey;

use crate::TxBuilderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTransaction {
    pub tx_hash: Hash<32>,
    pub tx_bytes: Vec<u8>,
    pub signatures: BTreeMap<PublicKey, Signature>,
}

impl BuiltTransaction {
    pub(crate) fn new(tx_hash: Hash<32>, tx_bytes: Vec<u8>) -> Self {
        Self {
            tx_hash,
            tx_bytes,
            signatures: BTreeMap::new(),
        }
    }

    /// Decode the current transaction bytes
    pub fn tx(&self) -> Result<Tx, TxBuilderError> {
        minicbor::decode(&self.tx_bytes).map_err(|_| TxBuilderError::CorruptedTxBytes)
    }

    /// Sign the body hash with the given key and merge the witness
    pub fn sign(self, private_key: &PrivateKey) -> Result<Self, TxBuilderError> {
        let pubkey = private_key.public_key();
        let signature = private_key.sign(self.tx_hash);

        self.apply_vkey_witness(pubkey, signature)
    }

    /// Derive and sign with every requested path of a key handler
    pub fn sign_with(
        self,
        handler: &dyn KeyHandler,
        paths: &[DerivationPath],
    ) -> Result<Self, TxBuilderError> {
        let witnesses = handler
            .sign(self.tx_hash.as_ref(), paths)
            .map_err(|e| TxBuilderError::KeyHandler(e.to_string()))?;

        let mut out = self;

        for (pubkey, signature) in witnesses {
            out = out.apply_vkey_witness(pubkey, signature)?;
        }

        Ok(out)
    }

    /// Merge an externally produced witness.
    ///
    /// Last write wins per public key: a witness carrying an already-known
    /// key replaces the stored signature.
    pub fn apply_vkey_witness(
        mut self,
        pubkey: PublicKey,
        signature: Signature,
    ) -> Result<Self, TxBuilderError> {
        self.signatures.insert(pubkey, signature);

        let mut tx: Tx = minicbor::decode(&self.tx_bytes)
            .map_err(|_| TxBuilderError::CorruptedTxBytes)?;

        let witnesses = self
            .signatures
            .iter()
            .map(|(pk, sig)| VKeyWitness {
                vkey: Bytes::from(pk.as_ref().to_vec()),
                signature: Bytes::from(sig.as_ref().to_vec()),
            })
            .collect::<Vec<_>>();

        tx.transaction_witness_set.vkeywitness = NonEmptySet::from_vec(witnesses);

        self.tx_bytes =
            minicbor::to_vec(&tx).map_err(|_| TxBuilderError::CorruptedTxBytes)?;

        Ok(self)
    }

    /// Remove a witness by public key
    pub fn remove_vkey_witness(mut self, pubkey: &PublicKey) -> Result<Self, TxBuilderError> {
        self.signatures.remove(pubkey);

        let mut tx: Tx = minicbor::decode(&self.tx_bytes)
            .map_err(|_| TxBuilderError::CorruptedTxBytes)?;

        let witnesses = self
            .signatures
            .iter()
            .map(|(pk, sig)| VKeyWitness {
                vkey: Bytes::from(pk.as_ref().to_vec()),
                signature: Bytes::from(sig.as_ref().to_vec()),
            })
            .collect::<Vec<_>>();

        tx.transaction_witness_set.vkeywitness = NonEmptySet::from_vec(witnesses);

        self.tx_bytes =
            minicbor::to_vec(&tx).map_err(|_| TxBuilderError::CorruptedTxBytes)?;

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesta_primitives::{ComputeHash, Nullable, TransactionBody, WitnessSet};

    fn empty_tx() -> BuiltTransaction {
        let body = TransactionBody::default();

        let tx = Tx {
            transaction_body: body.clone(),
            transaction_witness_set: WitnessSet::default(),
            success: true,
            auxiliary_data: Nullable::Null,
        };

        BuiltTransaction::new(body.compute_hash(), minicbor::to_vec(&tx).unwrap())
    }

    fn witness(byte: u8, sig_byte: u8) -> (PublicKey, Signature) {
        (
            PublicKey::from([byte; 32]),
            Signature::from([sig_byte; 64]),
        )
    }

    #[test]
    fn same_pubkey_replaces_signature() {
        let (pk, sig_a) = witness(1, 0xaa);
        let (_, sig_b) = witness(1, 0xbb);

        let tx = empty_tx()
            .apply_vkey_witness(pk, sig_a)
            .unwrap()
            .apply_vkey_witness(pk, sig_b)
            .unwrap();

        assert_eq!(tx.signatures.len(), 1);
        assert_eq!(tx.signatures.get(&pk), Some(&sig_b));

        let decoded = tx.tx().unwrap();
        let vkeys = decoded.transaction_witness_set.vkeywitness.unwrap();
        assert_eq!(vkeys.len(), 1);
        assert_eq!(vkeys[0].signature.as_slice(), [0xbb; 64].as_slice());
    }

    #[test]
    fn replay_is_idempotent() {
        let (pk, sig) = witness(1, 0xaa);

        let once = empty_tx().apply_vkey_witness(pk, sig).unwrap();
        let twice = once.clone().apply_vkey_witness(pk, sig).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn distinct_pubkeys_accumulate() {
        let (pk1, sig1) = witness(1, 0xaa);
        let (pk2, sig2) = witness(2, 0xbb);

        let tx = empty_tx()
            .apply_vkey_witness(pk1, sig1)
            .unwrap()
            .apply_vkey_witness(pk2, sig2)
            .unwrap();

        assert_eq!(tx.signatures.len(), 2);
    }

    #[test]
    fn witness_merge_keeps_the_body_stable() {
        let (pk, sig) = witness(1, 0xaa);

        let before = empty_tx();
        let hash = before.tx_hash;

        let after = before.apply_vkey_witness(pk, sig).unwrap();

        assert_eq!(after.tx_hash, hash);
        assert_eq!(after.tx().unwrap().transaction_body.compute_hash(), hash);
    }

    #[test]
    fn remove_witness() {
        let (pk, sig) = witness(1, 0xaa);

        let tx = empty_tx()
            .apply_vkey_witness(pk, sig)
            .unwrap()
            .remove_vkey_witness(&pk)
            .unwrap();

        assert!(tx.signatures.is_empty());
        assert!(tx.tx().unwrap().transaction_witness_set.vkeywitness.is_none());
    }
}
