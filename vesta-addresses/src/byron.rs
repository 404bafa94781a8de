//! Legacy Byron-era addresses (base58, CBOR envelope + CRC-32)

use base58::{FromBase58, ToBase58};
use crc::{Crc, CRC_32_ISO_HDLC};

use vesta_codec::{
    minicbor::{self, bytes::ByteVec, Decode, Encode},
    utils::{OrderPreservingProperties, TagWrap},
};

use vesta_crypto::hash::Hash;

use crate::Error;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

pub type Blake2b224 = Hash<28>;

pub type AddressId = Blake2b224;
pub type StakeholderId = Blake2b224;

#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Hash)]
pub enum AddrDistr {
    Variant0(StakeholderId),
    Variant1,
}

impl<'b, C> minicbor::Decode<'b, C> for AddrDistr {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        d.array()?;
        let variant = d.u32()?;

        match variant {
            0 => Ok(AddrDistr::Variant0(d.decode_with(ctx)?)),
            1 => Ok(AddrDistr::Variant1),
            _ => Err(minicbor::decode::Error::message(
                "invalid variant for addrdistr",
            )),
        }
    }
}

impl<C> minicbor::Encode<C> for AddrDistr {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            AddrDistr::Variant0(x) => {
                e.array(2)?;
                e.u32(0)?;
                e.encode(x)?;
            }
            AddrDistr::Variant1 => {
                e.array(1)?;
                e.u32(1)?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Hash)]
pub enum AddrType {
    PubKey,
    Script,
    Redeem,
    Other(u64),
}

impl<'b, C> minicbor::Decode<'b, C> for AddrType {
    fn decode(
        d: &mut minicbor::Decoder<'b>,
        _ctx: &mut C,
    ) -> Result<Self, minicbor::decode::Error> {
        let variant = d.u64()?;

        match variant {
            0 => Ok(AddrType::PubKey),
            1 => Ok(AddrType::Script),
            2 => Ok(AddrType::Redeem),
            x => Ok(AddrType::Other(x)),
        }
    }
}

impl<C> minicbor::Encode<C> for AddrType {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            AddrType::PubKey => e.u64(0)?,
            AddrType::Script => e.u64(1)?,
            AddrType::Redeem => e.u64(2)?,
            AddrType::Other(x) => e.u64(*x)?,
        };

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Eq, Hash)]
pub enum AddrAttrProperty {
    AddrDistr(AddrDistr),
    Bytes(ByteVec),
    Unparsed(u8, ByteVec),
}

impl<'b, C> minicbor::Decode<'b, C> for AddrAttrProperty {
    fn decode(d: &mut minicbor::Decoder<'b>, ctx: &mut C) -> Result<Self, minicbor::decode::Error> {
        let key = d.u8()?;

        match key {
            0 => Ok(AddrAttrProperty::AddrDistr(d.decode_with(ctx)?)),
            1 => Ok(AddrAttrProperty::Bytes(d.decode_with(ctx)?)),
            x => Ok(AddrAttrProperty::Unparsed(x, d.decode_with(ctx)?)),
        }
    }
}

impl<C> minicbor::Encode<C> for AddrAttrProperty {
    fn encode<W: minicbor::encode::Write>(
        &self,
        e: &mut minicbor::Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), minicbor::encode::Error<W::Error>> {
        match self {
            AddrAttrProperty::AddrDistr(x) => {
                e.u32(0)?;
                e.encode(x)?;
            }
            AddrAttrProperty::Bytes(x) => {
                e.u32(1)?;
                e.encode(x)?;
            }
            AddrAttrProperty::Unparsed(a, b) => {
                e.encode(a)?;
                e.encode(b)?;
            }
        }

        Ok(())
    }
}

pub type AddrAttrs = OrderPreservingProperties<AddrAttrProperty>;

/// The decoded content of the tag-24 envelope
#[derive(Debug, Encode, Decode, Clone, PartialEq, PartialOrd)]
pub struct AddressPayload {
    #[n(0)]
    pub root: AddressId,

    #[n(1)]
    pub attributes: AddrAttrs,

    #[n(2)]
    pub addrtype: AddrType,
}

/// A Byron address: CBOR payload inside a tag-24 byte string plus a CRC-32
#[derive(Debug, Encode, Decode, Clone, PartialEq, Eq, PartialOrd, Hash)]
pub struct ByronAddress {
    #[n(0)]
    pub payload: TagWrap<ByteVec, 24>,

    #[n(1)]
    pub crc: u32,
}

impl ByronAddress {
    pub fn new(payload: &[u8]) -> Self {
        Self {
            payload: TagWrap(ByteVec::from(payload.to_vec())),
            crc: CRC32.checksum(payload),
        }
    }

    pub fn from_bytes(value: &[u8]) -> Result<Self, Error> {
        let out: Self = minicbor::decode(value).map_err(Error::InvalidByronCbor)?;

        if CRC32.checksum(&out.payload.0) != out.crc {
            return Err(Error::BadByronChecksum);
        }

        Ok(out)
    }

    // Tries to decode an address from its base58 form
    pub fn from_base58(value: &str) -> Result<Self, Error> {
        let bytes = value.from_base58().map_err(Error::BadBase58)?;
        Self::from_bytes(&bytes)
    }

    /// Gets a numeric id describing the type of the address
    pub fn typeid(&self) -> u8 {
        0b1000
    }

    pub fn to_vec(&self) -> Vec<u8> {
        minicbor::to_vec(self).unwrap()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_vec())
    }

    pub fn to_base58(&self) -> String {
        self.to_vec().to_base58()
    }

    pub fn decode_payload(&self) -> Result<AddressPayload, Error> {
        minicbor::decode(&self.payload.0).map_err(Error::InvalidByronCbor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_VECTOR: &str = "37btjrVyb4KDXBNC4haBVPCrro8AQPHwvCMp3RFhhSVWwfFmZ6wwzSK6JK1hY6wHNmtrpTf1kdbva8TCneM2YsiXT7mrzT21EacHnPpz5YyUdj64na";

    #[test]
    fn roundtrip_base58() {
        let addr = ByronAddress::from_base58(TEST_VECTOR).unwrap();
        assert_eq!(addr.to_base58(), TEST_VECTOR);
    }

    #[test]
    fn payload_decodes() {
        let addr = ByronAddress::from_base58(TEST_VECTOR).unwrap();
        let payload = addr.decode_payload().unwrap();
        assert_eq!(payload.addrtype, AddrType::PubKey);
    }

    #[test]
    fn checksum_is_verified() {
        let addr = ByronAddress::from_base58(TEST_VECTOR).unwrap();

        let mut tampered = addr.to_vec();
        let last = tampered.len() - 1;
        tampered[last] ^= 0xff;

        assert!(matches!(
            ByronAddress::from_bytes(&tampered),
            Err(Error::BadByronChecksum) | Err(Error::InvalidByronCbor(_))
        ));
    }
}
