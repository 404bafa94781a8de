//! The script-data hash sealed into body key 11

use vesta_codec::minicbor::{self, encode::Write as _};
use vesta_crypto::hash::{Hash, Hasher};

use crate::{CostModel, PlutusData, Redeemers};

/// A single language entry of the script-integrity map: plutus version
/// (0-based) plus the cost model in force for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageView(pub u8, pub CostModel);

impl LanguageView {
    /// Serialized `(key, value)` entry.
    ///
    /// PlutusV1 predates the canonical encoding and keeps its historical
    /// double-bagged form: the key is the CBOR uint 0 wrapped in a byte
    /// string and the value is an indefinite array wrapped in a byte string.
    /// Later versions use a plain uint key and a definite array value.
    fn entry(&self) -> (Vec<u8>, Vec<u8>) {
        match self.0 {
            0 => {
                let mut inner = vec![];
                let mut sub = minicbor::Encoder::new(&mut inner);

                sub.begin_array().unwrap();
                for v in self.1.iter() {
                    sub.encode(v).unwrap();
                }
                sub.end().unwrap();

                let key = minicbor::to_vec(minicbor::bytes::ByteVec::from(
                    minicbor::to_vec(0u8).unwrap(),
                ))
                .unwrap();

                let value = minicbor::to_vec(minicbor::bytes::ByteVec::from(inner)).unwrap();

                (key, value)
            }
            v => {
                let key = minicbor::to_vec(v).unwrap();
                let value = minicbor::to_vec(&self.1).unwrap();

                (key, value)
            }
        }
    }
}

/// The preimage of the script-data hash: redeemers, datums and the language
/// views of every plutus version the transaction actually exercises
#[derive(Debug, Clone)]
pub struct ScriptData {
    pub redeemers: Redeemers,
    pub datums: Option<Vec<PlutusData>>,
    pub language_views: Vec<LanguageView>,
}

impl ScriptData {
    pub fn hash(&self) -> Hash<32> {
        let mut buf = vec![];

        if self.redeemers.is_empty() && self.datums.is_some() {
            // historical corner case: datums without redeemers hash as
            // empty-map ++ datums ++ empty-map
            buf.push(0xa0);

            if let Some(datums) = &self.datums {
                minicbor::encode(datums, &mut buf).unwrap(); // infallible
            }

            buf.push(0xa0);
        } else {
            minicbor::encode(&self.redeemers, &mut buf).unwrap(); // infallible

            if let Some(datums) = &self.datums {
                minicbor::encode(datums, &mut buf).unwrap(); // infallible
            }

            self.encode_language_views(&mut buf);
        }

        Hasher::<256>::hash(&buf)
    }

    fn encode_language_views(&self, buf: &mut Vec<u8>) {
        let mut entries: Vec<_> = self.language_views.iter().map(LanguageView::entry).collect();

        // canonical map ordering: lexicographic on the encoded key bytes
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut e = minicbor::Encoder::new(&mut *buf);
        e.map(entries.len() as u64).unwrap();

        for (key, value) in entries {
            e.writer_mut().write_all(&key).unwrap();
            e.writer_mut().write_all(&value).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BigInt, ExUnits, KeyValuePairs, RedeemerTag, RedeemersKey, RedeemersValue};

    fn sample_redeemers() -> Redeemers {
        Redeemers::Map(KeyValuePairs::from(vec![(
            RedeemersKey {
                tag: RedeemerTag::Spend,
                index: 0,
            },
            RedeemersValue {
                data: PlutusData::BigInt(BigInt::from(42)),
                ex_units: ExUnits {
                    mem: 1000,
                    steps: 2000,
                },
            },
        )]))
    }

    #[test]
    fn hash_is_deterministic() {
        let data = ScriptData {
            redeemers: sample_redeemers(),
            datums: None,
            language_views: vec![LanguageView(1, vec![1, 2, 3])],
        };

        assert_eq!(data.hash(), data.hash());
    }

    #[test]
    fn datums_change_the_hash() {
        let without = ScriptData {
            redeemers: sample_redeemers(),
            datums: None,
            language_views: vec![LanguageView(1, vec![1, 2, 3])],
        };

        let with = ScriptData {
            datums: Some(vec![PlutusData::BigInt(BigInt::from(7))]),
            ..without.clone()
        };

        assert_ne!(without.hash(), with.hash());
    }

    #[test]
    fn datums_without_redeemers_use_empty_maps() {
        let data = ScriptData {
            redeemers: Redeemers::List(vec![]),
            datums: Some(vec![PlutusData::BigInt(BigInt::from(7))]),
            language_views: vec![],
        };

        let mut expected = vec![0xa0];
        minicbor::encode(
            &vec![PlutusData::BigInt(BigInt::from(7))],
            &mut expected,
        )
        .unwrap();
        expected.push(0xa0);

        assert_eq!(data.hash(), Hasher::<256>::hash(&expected));
    }

    #[test]
    fn v1_view_is_double_bagged() {
        let (key, _) = LanguageView(0, vec![1]).entry();
        // byte string of length 1 holding the cbor uint 0
        assert_eq!(key, vec![0x41, 0x00]);

        let (key, _) = LanguageView(1, vec![1]).entry();
        assert_eq!(key, vec![0x01]);
    }
}
