//! Bech32 identifiers for pools, DReps, committee members and governance
//! actions

use vesta_crypto::hash::Hash;

use crate::{decode_bech32, encode_bech32, Error};

fn expect_hrp(found: &str, wanted: &[&str]) -> Result<(), Error> {
    if wanted.contains(&found) {
        Ok(())
    } else {
        Err(Error::UnexpectedHrp(found.to_string()))
    }
}

fn payload_to_hash(payload: &[u8]) -> Result<Hash<28>, Error> {
    if payload.len() != 28 {
        return Err(Error::InvalidHashSize(payload.len()));
    }

    let mut sized = [0u8; 28];
    sized.copy_from_slice(payload);
    Ok(sized.into())
}

/// A stake pool operator id (`pool1...`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolId(pub Hash<28>);

impl PoolId {
    pub fn from_bech32(s: &str) -> Result<Self, Error> {
        let (hrp, payload) = decode_bech32(s)?;
        expect_hrp(&hrp, &["pool"])?;
        payload_to_hash(&payload).map(Self)
    }

    pub fn to_bech32(&self) -> Result<String, Error> {
        encode_bech32(self.0.as_ref(), "pool")
    }
}

/// A delegated representative id (`drep1...` / `drep_script1...`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DRepId {
    Key(Hash<28>),
    Script(Hash<28>),
}

impl DRepId {
    pub fn from_bech32(s: &str) -> Result<Self, Error> {
        let (hrp, payload) = decode_bech32(s)?;
        expect_hrp(&hrp, &["drep", "drep_script"])?;

        let hash = payload_to_hash(&payload)?;

        match hrp.as_str() {
            "drep" => Ok(DRepId::Key(hash)),
            _ => Ok(DRepId::Script(hash)),
        }
    }

    pub fn to_bech32(&self) -> Result<String, Error> {
        match self {
            DRepId::Key(x) => encode_bech32(x.as_ref(), "drep"),
            DRepId::Script(x) => encode_bech32(x.as_ref(), "drep_script"),
        }
    }

    pub fn as_hash(&self) -> &Hash<28> {
        match self {
            DRepId::Key(x) => x,
            DRepId::Script(x) => x,
        }
    }

    pub fn is_script(&self) -> bool {
        matches!(self, DRepId::Script(_))
    }
}

/// A constitutional committee credential (`cc_cold1...` / `cc_hot1...`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommitteeId {
    Cold(Hash<28>),
    Hot(Hash<28>),
}

impl CommitteeId {
    pub fn from_bech32(s: &str) -> Result<Self, Error> {
        let (hrp, payload) = decode_bech32(s)?;
        expect_hrp(&hrp, &["cc_cold", "cc_hot"])?;

        let hash = payload_to_hash(&payload)?;

        match hrp.as_str() {
            "cc_cold" => Ok(CommitteeId::Cold(hash)),
            _ => Ok(CommitteeId::Hot(hash)),
        }
    }

    pub fn to_bech32(&self) -> Result<String, Error> {
        match self {
            CommitteeId::Cold(x) => encode_bech32(x.as_ref(), "cc_cold"),
            CommitteeId::Hot(x) => encode_bech32(x.as_ref(), "cc_hot"),
        }
    }

    pub fn as_hash(&self) -> &Hash<28> {
        match self {
            CommitteeId::Cold(x) => x,
            CommitteeId::Hot(x) => x,
        }
    }
}

/// A governance action reference (`gov_action1...`): tx id plus action index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GovActionRef {
    pub transaction_id: Hash<32>,
    pub action_index: u32,
}

impl GovActionRef {
    pub fn from_bech32(s: &str) -> Result<Self, Error> {
        let (hrp, payload) = decode_bech32(s)?;
        expect_hrp(&hrp, &["gov_action"])?;

        if payload.len() != 33 {
            return Err(Error::InvalidHashSize(payload.len()));
        }

        let mut tx = [0u8; 32];
        tx.copy_from_slice(&payload[..32]);

        Ok(Self {
            transaction_id: tx.into(),
            action_index: payload[32] as u32,
        })
    }

    pub fn to_bech32(&self) -> Result<String, Error> {
        let mut payload = self.transaction_id.to_vec();
        payload.push(self.action_index as u8);
        encode_bech32(&payload, "gov_action")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_roundtrip() {
        let id = PoolId(Hash::new([7u8; 28]));
        let s = id.to_bech32().unwrap();
        assert!(s.starts_with("pool1"));
        assert_eq!(PoolId::from_bech32(&s).unwrap(), id);
    }

    #[test]
    fn drep_roundtrip() {
        for id in [DRepId::Key(Hash::new([1u8; 28])), DRepId::Script(Hash::new([2u8; 28]))] {
            let s = id.to_bech32().unwrap();
            assert_eq!(DRepId::from_bech32(&s).unwrap(), id);
        }
    }

    #[test]
    fn committee_roundtrip() {
        for id in [
            CommitteeId::Cold(Hash::new([3u8; 28])),
            CommitteeId::Hot(Hash::new([4u8; 28])),
        ] {
            let s = id.to_bech32().unwrap();
            assert_eq!(CommitteeId::from_bech32(&s).unwrap(), id);
        }
    }

    #[test]
    fn gov_action_roundtrip() {
        let id = GovActionRef {
            transaction_id: Hash::new([9u8; 32]),
            action_index: 3,
        };

        let s = id.to_bech32().unwrap();
        assert!(s.starts_with("gov_action1"));
        assert_eq!(GovActionRef::from_bech32(&s).unwrap(), id);
    }

    #[test]
    fn wrong_hrp_is_rejected() {
        let id = PoolId(Hash::new([7u8; 28]));
        let s = id.to_bech32().unwrap();
        assert!(matches!(DRepId::from_bech32(&s), Err(Error::UnexpectedHrp(_))));
    }
}
