//! Plutus data trees, encoded the way the canonical plutus implementation
//! does it

use crate::KeyValuePairs;
use serde::{Deserialize, Serialize};
use std::{fmt, ops::Deref};
use vesta_codec::minicbor::{self, data::Tag, Encode};
use vesta_codec::utils::Int;

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub enum PlutusData {
    Constr(Constr<PlutusData>),
    Map(KeyValuePairs<PlutusData, PlutusData>),
    BigInt(BigInt),
    BoundedBytes(BoundedBytes),
    Array(Vec<PlutusData>),
}

impl<'b, C> minicbor::decode::Decode<'b, C> for PlutusData {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        use minicbor::data::Type;

        match d.datatype()? {
            Type::Tag => {
                let mut probe = d.probe();
                let tag = probe.tag()?;

                if tag == Tag::PosBignum || tag == Tag::NegBignum {
                    return Ok(Self::BigInt(d.decode_with(ctx)?));
                }

                match tag {
                    Tag::Unassigned((121..=127) | (1280..=1400) | 102) => {
                        Ok(Self::Constr(d.decode_with(ctx)?))
                    }
                    _ => Err(minicbor::decode::Error::message(
                        "unknown tag for plutus data",
                    )),
                }
            }
            Type::U8
            | Type::U16
            | Type::U32
            | Type::U64
            | Type::I8
            | Type::I16
            | Type::I32
            | Type::I64
            | Type::Int => Ok(Self::BigInt(d.decode_with(ctx)?)),
            Type::Map | Type::MapIndef => Ok(Self::Map(d.decode_with(ctx)?)),
            Type::Bytes => Ok(Self::BoundedBytes(d.decode_with(ctx)?)),
            Type::BytesIndef => {
                let mut full = Vec::new();

                for slice in d.bytes_iter()? {
                    full.extend(slice?);
                }

                Ok(Self::BoundedBytes(BoundedBytes::from(full)))
            }
            Type::Array | Type::ArrayIndef => Ok(Self::Array(d.decode_with(ctx)?)),

            any => Err(minicbor::decode::Error::message(format!(
                "bad cbor data type ({any:?}) for plutus data"
            ))),
        }
    }
}

impl<C> minicbor::encode::Encode<C> for PlutusData {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            Self::Constr(a) => {
                e.encode_with(a, ctx)?;
            }
            Self::Map(a) => {
                // definite map, matching the haskell plutus implementation
                e.map(a.len() as u64)?;
                for (k, v) in a.iter() {
                    k.encode(e, ctx)?;
                    v.encode(e, ctx)?;
                }
            }
            Self::BigInt(a) => {
                e.encode_with(a, ctx)?;
            }
            Self::BoundedBytes(a) => {
                e.encode_with(a, ctx)?;
            }
            Self::Array(a) => {
                encode_list(a, e, ctx)?;
            }
        };

        Ok(())
    }
}

/*
big_int = int / big_uint / big_nint
big_uint = #6.2(bounded_bytes)
big_nint = #6.3(bounded_bytes)
*/

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub enum BigInt {
    Int(Int),
    BigUInt(BoundedBytes),
    BigNInt(BoundedBytes),
}

impl From<i64> for BigInt {
    fn from(x: i64) -> Self {
        BigInt::Int(Int::from(x))
    }
}

impl<'b, C> minicbor::decode::Decode<'b, C> for BigInt {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        use minicbor::data::Type;

        match d.datatype()? {
            Type::U8
            | Type::U16
            | Type::U32
            | Type::U64
            | Type::I8
            | Type::I16
            | Type::I32
            | Type::I64
            | Type::Int => Ok(Self::Int(d.decode_with(ctx)?)),
            Type::Tag => match d.tag()? {
                Tag::PosBignum => Ok(Self::BigUInt(d.decode_with(ctx)?)),
                Tag::NegBignum => Ok(Self::BigNInt(d.decode_with(ctx)?)),
                _ => Err(minicbor::decode::Error::message(
                    "invalid cbor tag for big int",
                )),
            },
            _ => Err(minicbor::decode::Error::message(
                "invalid cbor data type for big int",
            )),
        }
    }
}

impl<C> minicbor::encode::Encode<C> for BigInt {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            BigInt::Int(x) => {
                e.encode_with(x, ctx)?;
            }
            BigInt::BigUInt(x) => {
                e.tag(Tag::PosBignum)?;
                e.encode_with(x, ctx)?;
            }
            BigInt::BigNInt(x) => {
                e.tag(Tag::NegBignum)?;
                e.encode_with(x, ctx)?;
            }
        };

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct Constr<A> {
    pub tag: u64,
    pub any_constructor: Option<u64>,
    pub fields: Vec<A>,
}

impl<A> Constr<A> {
    /// Constructor index 0..=6 maps to tags 121..=127; anything else uses
    /// the general tag-102 form.
    pub fn from_index(index: u64, fields: Vec<A>) -> Self {
        if index < 7 {
            Constr {
                tag: 121 + index,
                any_constructor: None,
                fields,
            }
        } else {
            Constr {
                tag: 102,
                any_constructor: Some(index),
                fields,
            }
        }
    }

    pub fn index(&self) -> u64 {
        match self.tag {
            102 => self.any_constructor.unwrap_or_default(),
            x @ 121..=127 => x - 121,
            x @ 1280..=1400 => x - 1280 + 7,
            _ => unreachable!("constr tags are validated on construction"),
        }
    }
}

impl<'b, C, A> minicbor::decode::Decode<'b, C> for Constr<A>
where
    A: minicbor::decode::Decode<'b, C>,
{
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        match d.tag()? {
            Tag::Unassigned(x @ ((121..=127) | (1280..=1400))) => Ok(Constr {
                tag: x,
                fields: d.decode_with(ctx)?,
                any_constructor: None,
            }),
            Tag::Unassigned(102) => {
                d.array()?;

                Ok(Constr {
                    tag: 102,
                    any_constructor: Some(d.decode_with(ctx)?),
                    fields: d.decode_with(ctx)?,
                })
            }
            _ => Err(minicbor::decode::Error::message(
                "bad tag code for plutus data",
            )),
        }
    }
}

impl<C, A> minicbor::encode::Encode<C> for Constr<A>
where
    A: minicbor::encode::Encode<C>,
{
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        e.tag(Tag::Unassigned(self.tag))?;

        match self.tag {
            102 => {
                e.array(2)?;
                e.encode_with(self.any_constructor.unwrap_or_default(), ctx)?;
                encode_list(&self.fields, e, ctx)?;
                Ok(())
            }
            _ => {
                encode_list(&self.fields, e, ctx)?;
                Ok(())
            }
        }
    }
}

/// Plutus bytestring, chunked into 64-byte segments on the wire
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[serde(into = "String")]
#[serde(try_from = "String")]
pub struct BoundedBytes(Vec<u8>);

impl From<Vec<u8>> for BoundedBytes {
    fn from(xs: Vec<u8>) -> Self {
        BoundedBytes(xs)
    }
}

impl From<BoundedBytes> for Vec<u8> {
    fn from(b: BoundedBytes) -> Self {
        b.0
    }
}

impl Deref for BoundedBytes {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<String> for BoundedBytes {
    type Error = hex::FromHexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let v = hex::decode(value)?;
        Ok(BoundedBytes(v))
    }
}

impl From<BoundedBytes> for String {
    fn from(b: BoundedBytes) -> Self {
        hex::encode(b.deref())
    }
}

impl fmt::Display for BoundedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.deref()))
    }
}

impl<C> Encode<C> for BoundedBytes {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        // bytestrings longer than 64 bytes travel as an indefinite sequence
        // of 64-byte chunks, matching the haskell implementation
        const CHUNK_SIZE: usize = 64;
        let bs: &Vec<u8> = self.deref();

        if bs.len() <= CHUNK_SIZE {
            e.bytes(bs)?;
        } else {
            e.begin_bytes()?;
            for b in bs.chunks(CHUNK_SIZE) {
                e.bytes(b)?;
            }
            e.end()?;
        }

        Ok(())
    }
}

impl<'b, C> minicbor::decode::Decode<'b, C> for BoundedBytes {
    fn decode(d: &mut minicbor::Decoder<'b>, _: &mut C) -> Result<Self, minicbor::decode::Error> {
        let mut res = Vec::new();

        for chunk in d.bytes_iter()? {
            res.extend_from_slice(chunk?);
        }

        Ok(BoundedBytes::from(res))
    }
}

fn encode_list<C, W: minicbor::encode::Write, A: minicbor::encode::Encode<C>>(
    a: &Vec<A>,
    e: &mut minicbor::Encoder<W>,
    ctx: &mut C,
) -> Result<(), minicbor::encode::Error<W::Error>> {
    // Mimics the default haskell list encoding from cborg: indefinite array
    // when non-empty, definite 0-length array when empty
    if a.is_empty() {
        e.array(0)?;
    } else {
        e.begin_array()?;
        for v in a {
            e.encode_with(v, ctx)?;
        }
        e.end()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesta_codec::minicbor;

    fn roundtrip(value: &PlutusData) -> PlutusData {
        let bytes = minicbor::to_vec(value).unwrap();
        minicbor::decode(&bytes).unwrap()
    }

    #[test]
    fn constr_roundtrip() {
        for index in [0u64, 1, 6, 7, 100] {
            let value = PlutusData::Constr(Constr::from_index(
                index,
                vec![PlutusData::BigInt(BigInt::from(42))],
            ));

            let decoded = roundtrip(&value);
            assert_eq!(decoded, value);

            match decoded {
                PlutusData::Constr(c) => assert_eq!(c.index(), index),
                _ => panic!("expected constr"),
            }
        }
    }

    #[test]
    fn long_bytes_are_chunked() {
        let value = PlutusData::BoundedBytes(BoundedBytes::from(vec![7u8; 200]));

        let bytes = minicbor::to_vec(&value).unwrap();
        // indefinite byte string marker
        assert_eq!(bytes[0], 0x5f);

        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn short_bytes_stay_definite() {
        let value = PlutusData::BoundedBytes(BoundedBytes::from(vec![7u8; 30]));

        let bytes = minicbor::to_vec(&value).unwrap();
        assert_eq!(bytes[0], 0x58);
    }

    #[test]
    fn nested_structures_roundtrip() {
        let value = PlutusData::Map(KeyValuePairs::from(vec![(
            PlutusData::BigInt(BigInt::from(1)),
            PlutusData::Array(vec![
                PlutusData::BigInt(BigInt::from(-5)),
                PlutusData::BoundedBytes(BoundedBytes::from(b"datum".to_vec())),
            ]),
        )]));

        assert_eq!(roundtrip(&value), value);
    }

    #[test]
    fn empty_array_is_definite() {
        let value = PlutusData::Array(vec![]);
        let bytes = minicbor::to_vec(&value).unwrap();
        assert_eq!(bytes, vec![0x80]);
    }
}
