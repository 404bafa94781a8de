//! Builder-side multi-asset values with total, canonical ordering
//!
//! The wire representation ([vesta_primitives::Value]) stores assets as
//! ordered pairs to keep decode/encode isomorphic. For balancing we want
//! cheap arithmetic and a guaranteed canonical order, so the builder works
//! on BTreeMap-backed values and converts at the edges.

use std::collections::BTreeMap;
use std::fmt;

use vesta_codec::utils::{NonEmptyKeyValuePairs, NonZeroInt, PositiveCoin};
use vesta_primitives::{AssetName, Coin, Mint, PolicyId, Value as WireValue};

/// Lovelace plus positive asset quantities, sorted by policy then name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Value {
    pub coin: Coin,
    assets: BTreeMap<PolicyId, BTreeMap<AssetName, u64>>,
}

impl Value {
    pub fn lovelace(coin: Coin) -> Self {
        Value {
            coin,
            assets: BTreeMap::new(),
        }
    }

    pub fn add_asset(mut self, policy: PolicyId, name: AssetName, quantity: u64) -> Self {
        if quantity > 0 {
            *self
                .assets
                .entry(policy)
                .or_default()
                .entry(name)
                .or_insert(0) += quantity;
        }

        self
    }

    pub fn has_assets(&self) -> bool {
        !self.assets.is_empty()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.values().map(|names| names.len()).sum()
    }

    pub fn quantity_of(&self, policy: &PolicyId, name: &AssetName) -> u64 {
        self.assets
            .get(policy)
            .and_then(|names| names.get(name))
            .copied()
            .unwrap_or_default()
    }

    pub fn assets(&self) -> impl Iterator<Item = (&PolicyId, &AssetName, u64)> {
        self.assets
            .iter()
            .flat_map(|(p, names)| names.iter().map(move |(n, q)| (p, n, *q)))
    }

    /// Component-wise addition
    pub fn checked_add(&self, other: &Value) -> Option<Value> {
        let mut out = self.clone();

        out.coin = out.coin.checked_add(other.coin)?;

        for (policy, name, quantity) in other.assets() {
            let slot = out
                .assets
                .entry(*policy)
                .or_default()
                .entry(name.clone())
                .or_insert(0);

            *slot = slot.checked_add(quantity)?;
        }

        Some(out)
    }

    /// Component-wise subtraction; None when any component would go negative
    pub fn checked_sub(&self, other: &Value) -> Option<Value> {
        let mut out = self.clone();

        out.coin = out.coin.checked_sub(other.coin)?;

        for (policy, name, quantity) in other.assets() {
            let names = out.assets.get_mut(policy)?;
            let slot = names.get_mut(name)?;

            *slot = slot.checked_sub(quantity)?;

            if *slot == 0 {
                names.remove(name);
            }
        }

        out.assets.retain(|_, names| !names.is_empty());

        Some(out)
    }

    /// Multiply every component by a scalar
    pub fn checked_scale(&self, factor: u64) -> Option<Value> {
        let mut out = Value::lovelace(self.coin.checked_mul(factor)?);

        for (policy, name, quantity) in self.assets() {
            out = out.add_asset(*policy, name.clone(), quantity.checked_mul(factor)?);
        }

        Some(out)
    }

    /// Partial order: true iff every component of self is <= other
    pub fn le(&self, other: &Value) -> bool {
        if self.coin > other.coin {
            return false;
        }

        self.assets()
            .all(|(p, n, q)| q <= other.quantity_of(p, n))
    }

    pub fn is_zero(&self) -> bool {
        self.coin == 0 && self.assets.is_empty()
    }

    /// Keep only the components missing from `available`, i.e. the shortfall
    /// left after spending `available` against self.
    pub fn shortfall_against(&self, available: &Value) -> Value {
        let mut out = Value::lovelace(self.coin.saturating_sub(available.coin));

        for (policy, name, quantity) in self.assets() {
            let have = available.quantity_of(policy, name);

            if quantity > have {
                out = out.add_asset(*policy, name.clone(), quantity - have);
            }
        }

        out
    }

    pub fn from_wire(value: &WireValue) -> Value {
        match value {
            WireValue::Coin(coin) => Value::lovelace(*coin),
            WireValue::Multiasset(coin, assets) => {
                let mut out = Value::lovelace(*coin);

                for (policy, names) in assets.iter() {
                    for (name, quantity) in names.iter() {
                        out = out.add_asset(*policy, name.clone(), u64::from(quantity));
                    }
                }

                out
            }
        }
    }

    /// Wire form; BTreeMap iteration order makes the nested pairs canonical
    pub fn into_wire(self) -> WireValue {
        if self.assets.is_empty() {
            return WireValue::Coin(self.coin);
        }

        let assets = self
            .assets
            .into_iter()
            .map(|(policy, names)| {
                let names = names
                    .into_iter()
                    .filter_map(|(name, quantity)| {
                        PositiveCoin::try_from(quantity).ok().map(|q| (name, q))
                    })
                    .collect::<Vec<_>>();

                (policy, NonEmptyKeyValuePairs::Def(names))
            })
            .filter(|(_, names)| !names.is_empty())
            .collect::<Vec<_>>();

        if assets.is_empty() {
            WireValue::Coin(self.coin)
        } else {
            WireValue::Multiasset(self.coin, NonEmptyKeyValuePairs::Def(assets))
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} lovelace", self.coin)?;

        for (policy, name, quantity) in self.assets() {
            write!(f, " + {quantity} {policy}.{name}")?;
        }

        Ok(())
    }
}

/// Signed mint / burn quantities, aggregated per (policy, asset name)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MintAssets(BTreeMap<PolicyId, BTreeMap<AssetName, i64>>);

impl MintAssets {
    pub fn new() -> Self {
        Default::default()
    }

    /// Add a quantity; duplicate (policy, name) pairs aggregate by sum
    pub fn add(&mut self, policy: PolicyId, name: AssetName, quantity: i64) {
        let slot = self.0.entry(policy).or_default().entry(name).or_insert(0);
        *slot += quantity;
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn policies(&self) -> impl Iterator<Item = &PolicyId> {
        self.0.keys()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&PolicyId, &AssetName, i64)> {
        self.0
            .iter()
            .flat_map(|(p, names)| names.iter().map(move |(n, q)| (p, n, *q)))
    }

    /// The minted (positive) side as a value
    pub fn minted(&self) -> Value {
        let mut out = Value::lovelace(0);

        for (policy, name, quantity) in self.entries() {
            if quantity > 0 {
                out = out.add_asset(*policy, name.clone(), quantity as u64);
            }
        }

        out
    }

    /// The burned (negative) side as a value of positive quantities
    pub fn burned(&self) -> Value {
        let mut out = Value::lovelace(0);

        for (policy, name, quantity) in self.entries() {
            if quantity < 0 {
                out = out.add_asset(*policy, name.clone(), quantity.unsigned_abs());
            }
        }

        out
    }

    /// Wire form; zero-sum entries vanish, empty mints return None
    pub fn into_wire(self) -> Option<Mint> {
        let policies = self
            .0
            .into_iter()
            .filter_map(|(policy, names)| {
                let names = names
                    .into_iter()
                    .filter_map(|(name, quantity)| {
                        NonZeroInt::try_from(quantity).ok().map(|q| (name, q))
                    })
                    .collect::<Vec<_>>();

                NonEmptyKeyValuePairs::from_vec(names).map(|names| (policy, names))
            })
            .collect::<Vec<_>>();

        NonEmptyKeyValuePairs::from_vec(policies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesta_crypto::hash::Hash;

    fn policy(byte: u8) -> PolicyId {
        Hash::new([byte; 28])
    }

    fn name(s: &str) -> AssetName {
        AssetName::from(s.as_bytes().to_vec())
    }

    #[test]
    fn addition_is_commutative() {
        let a = Value::lovelace(5_000_000).add_asset(policy(1), name("N"), 1);
        let b = Value::lovelace(2_000_000);

        assert_eq!(a.checked_add(&b), b.checked_add(&a));
    }

    #[test]
    fn add_then_sub_restores() {
        let a = Value::lovelace(5_000_000).add_asset(policy(1), name("N"), 1);
        let b = Value::lovelace(2_000_000);

        let sum = a.checked_add(&b).unwrap();
        assert_eq!(sum.coin, 7_000_000);
        assert_eq!(sum.quantity_of(&policy(1), &name("N")), 1);

        assert_eq!(sum.checked_sub(&b).unwrap(), a);

        let diff = a.checked_sub(&b).unwrap();
        assert_eq!(diff.coin, 3_000_000);
        assert_eq!(diff.quantity_of(&policy(1), &name("N")), 1);
    }

    #[test]
    fn subtraction_underflow_is_detected() {
        let a = Value::lovelace(1);
        let b = Value::lovelace(2);

        assert_eq!(a.checked_sub(&b), None);

        let a = Value::lovelace(10).add_asset(policy(1), name("N"), 1);
        let b = Value::lovelace(1).add_asset(policy(1), name("N"), 2);

        assert_eq!(a.checked_sub(&b), None);
    }

    #[test]
    fn zero_quantities_normalize_away() {
        let a = Value::lovelace(10).add_asset(policy(1), name("N"), 5);
        let b = Value::lovelace(0).add_asset(policy(1), name("N"), 5);

        let diff = a.checked_sub(&b).unwrap();
        assert!(!diff.has_assets());
        assert_eq!(diff, Value::lovelace(10));
    }

    #[test]
    fn partial_order() {
        let small = Value::lovelace(10);
        let large = Value::lovelace(10).add_asset(policy(1), name("N"), 1);

        assert!(small.le(&large));
        assert!(!large.le(&small));
        assert!(small.le(&small));
    }

    #[test]
    fn wire_roundtrip_is_canonical() {
        let value = Value::lovelace(7)
            .add_asset(policy(9), name("b"), 2)
            .add_asset(policy(1), name("z"), 3)
            .add_asset(policy(1), name("a"), 4);

        let wire = value.clone().into_wire();
        assert_eq!(Value::from_wire(&wire), value);

        // policies and names come out sorted
        match wire {
            WireValue::Multiasset(_, assets) => {
                assert_eq!(assets[0].0, policy(1));
                assert_eq!(assets[1].0, policy(9));
                assert_eq!(assets[0].1[0].0, name("a"));
                assert_eq!(assets[0].1[1].0, name("z"));
            }
            _ => panic!("expected multiasset"),
        }
    }

    #[test]
    fn mint_aggregates_and_drops_zero_sums() {
        let mut mint = MintAssets::new();
        mint.add(policy(1), name("N"), 5);
        mint.add(policy(1), name("N"), -5);
        mint.add(policy(2), name("M"), -3);

        assert_eq!(mint.minted(), Value::lovelace(0));
        assert_eq!(
            mint.burned(),
            Value::lovelace(0).add_asset(policy(2), name("M"), 3)
        );

        let wire = mint.into_wire().unwrap();
        assert_eq!(wire.len(), 1);
    }
}
