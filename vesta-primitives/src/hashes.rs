//! Content-addressable hashing for ledger artifacts

use vesta_codec::minicbor;
use vesta_crypto::hash::{Hash, Hasher};

use crate::{
    AuxiliaryData, NativeScript, PlutusData, PlutusScript, ScriptRef, TransactionBody,
};

/// Types with a well-known on-chain hash derived from their serialized form
pub trait ComputeHash<const BYTES: usize> {
    fn compute_hash(&self) -> Hash<BYTES>;
}

impl ComputeHash<32> for TransactionBody {
    fn compute_hash(&self) -> Hash<32> {
        Hasher::<256>::hash_cbor(self)
    }
}

impl ComputeHash<32> for PlutusData {
    fn compute_hash(&self) -> Hash<32> {
        Hasher::<256>::hash_cbor(self)
    }
}

impl ComputeHash<32> for AuxiliaryData {
    fn compute_hash(&self) -> Hash<32> {
        Hasher::<256>::hash_cbor(self)
    }
}

// script hashes prepend a language prefix byte to the serialized script:
// 0 native, 1/2/3 plutus v1/v2/v3

impl ComputeHash<28> for NativeScript {
    fn compute_hash(&self) -> Hash<28> {
        let cbor = minicbor::to_vec(self).expect("infallible");
        Hasher::<224>::hash_tagged(&cbor, 0)
    }
}

impl<const VERSION: usize> ComputeHash<28> for PlutusScript<VERSION> {
    fn compute_hash(&self) -> Hash<28> {
        Hasher::<224>::hash_tagged(self.as_ref(), VERSION as u8)
    }
}

impl ComputeHash<28> for ScriptRef {
    fn compute_hash(&self) -> Hash<28> {
        match self {
            ScriptRef::NativeScript(x) => x.compute_hash(),
            ScriptRef::PlutusV1Script(x) => x.compute_hash(),
            ScriptRef::PlutusV2Script(x) => x.compute_hash(),
            ScriptRef::PlutusV3Script(x) => x.compute_hash(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Bytes, Hash};

    #[test]
    fn native_script_hash_uses_prefix_zero() {
        let script = NativeScript::ScriptPubkey(Hash::new([1u8; 28]));

        let cbor = minicbor::to_vec(&script).unwrap();
        let manual = Hasher::<224>::hash_tagged(&cbor, 0);

        assert_eq!(script.compute_hash(), manual);
    }

    #[test]
    fn plutus_versions_hash_differently() {
        let bytes = Bytes::from(vec![0x4e, 0x4d, 0x01, 0x00, 0x00, 0x22, 0x01, 0x20]);

        let v1 = PlutusScript::<1>(bytes.clone()).compute_hash();
        let v2 = PlutusScript::<2>(bytes.clone()).compute_hash();
        let v3 = PlutusScript::<3>(bytes).compute_hash();

        assert_ne!(v1, v2);
        assert_ne!(v2, v3);
    }

    #[test]
    fn body_hash_is_stable() {
        let body = TransactionBody::default();
        assert_eq!(body.compute_hash(), body.compute_hash());
    }
}
