//! Coin and collateral selection
//!
//! Largest-first selection in two passes: asset-bearing candidates are
//! consulted only for the assets the target actually needs, then pure-coin
//! candidates top up the lovelace. Ties always break on `(tx id, index)` so
//! a given pool and target selects deterministically on every platform.

use tracing::debug;

use vesta_codec::minicbor;
use vesta_primitives::TransactionInput;

use crate::provider::Utxo;
use crate::value::Value;
use crate::TxBuilderError;

/// Result of an input-selection run
#[derive(Debug, Clone)]
pub struct Selection {
    pub inputs: Vec<Utxo>,
    pub change: Value,
}

fn tie_break(a: &Utxo, b: &Utxo) -> std::cmp::Ordering {
    (a.input.transaction_id, a.input.index).cmp(&(b.input.transaction_id, b.input.index))
}

/// Choose inputs from `pool` covering `target`, excluding anything in
/// `in_use` (explicitly spent or reserved for collateral).
pub fn select_inputs(
    pool: &[Utxo],
    target: &Value,
    in_use: &[TransactionInput],
    max_inputs: usize,
) -> Result<Selection, TxBuilderError> {
    let mut candidates: Vec<&Utxo> = pool
        .iter()
        .filter(|x| !in_use.contains(&x.input))
        .collect();

    let mut picked: Vec<&Utxo> = vec![];
    let mut gathered = Value::lovelace(0);

    // first pass: cover every non-coin asset of the target
    let wanted: Vec<_> = target
        .assets()
        .map(|(p, n, q)| (*p, n.clone(), q))
        .collect();

    for (policy, name, quantity) in &wanted {
        while gathered.quantity_of(policy, name) < *quantity {
            let mut holders: Vec<usize> = candidates
                .iter()
                .enumerate()
                .filter(|(_, x)| x.value().quantity_of(policy, name) > 0)
                .map(|(i, _)| i)
                .collect();

            if holders.is_empty() {
                let shortfall = target.shortfall_against(&gathered);
                return Err(TxBuilderError::InsufficientBalance(shortfall));
            }

            holders.sort_by(|a, b| {
                let qa = candidates[*a].value().quantity_of(policy, name);
                let qb = candidates[*b].value().quantity_of(policy, name);

                qb.cmp(&qa)
                    .then_with(|| tie_break(candidates[*a], candidates[*b]))
            });

            let utxo = candidates.remove(holders[0]);
            gathered = gathered
                .checked_add(&utxo.value())
                .ok_or_else(|| TxBuilderError::InsufficientBalance(target.clone()))?;
            picked.push(utxo);
        }
    }

    // second pass: top up lovelace, pure-coin candidates first
    let mut by_coin: Vec<&Utxo> = candidates.to_vec();
    by_coin.sort_by(|a, b| {
        b.is_pure_coin()
            .cmp(&a.is_pure_coin())
            .then_with(|| b.value().coin.cmp(&a.value().coin))
            .then_with(|| tie_break(a, b))
    });

    let mut by_coin = by_coin.into_iter();

    while gathered.coin < target.coin {
        match by_coin.next() {
            Some(utxo) => {
                gathered = gathered
                    .checked_add(&utxo.value())
                    .ok_or_else(|| TxBuilderError::InsufficientBalance(target.clone()))?;
                picked.push(utxo);
            }
            None => {
                let shortfall = target.shortfall_against(&gathered);
                return Err(TxBuilderError::InsufficientBalance(shortfall));
            }
        }
    }

    if picked.len() > max_inputs {
        return Err(TxBuilderError::TooManyInputs {
            required: picked.len(),
            max: max_inputs,
        });
    }

    let change = gathered
        .checked_sub(target)
        .expect("selection covers the target");

    debug!(
        inputs = picked.len(),
        change = change.coin,
        "input selection settled"
    );

    Ok(Selection {
        inputs: picked.into_iter().cloned().collect(),
        change,
    })
}

/// Pick up to `max_inputs` pure-coin UTxOs whose coin sum covers
/// `required_coin`; returns the picks and the excess to return.
pub fn select_collateral(
    pool: &[Utxo],
    required_coin: u64,
    max_inputs: usize,
    in_use: &[TransactionInput],
) -> Result<(Vec<Utxo>, u64), TxBuilderError> {
    let mut candidates: Vec<&Utxo> = pool
        .iter()
        .filter(|x| x.is_pure_coin() && !in_use.contains(&x.input))
        .collect();

    if candidates.is_empty() {
        return Err(TxBuilderError::NoCollateralInputs);
    }

    candidates.sort_by(|a, b| {
        b.value()
            .coin
            .cmp(&a.value().coin)
            .then_with(|| tie_break(a, b))
    });

    let mut picked = vec![];
    let mut total = 0u64;

    for utxo in candidates.into_iter().take(max_inputs) {
        total += utxo.value().coin;
        picked.push(utxo.clone());

        if total >= required_coin {
            return Ok((picked, total - required_coin));
        }
    }

    Err(TxBuilderError::CollateralShortfall {
        required: required_coin,
        available: total,
    })
}

/// Break a change value into chunks whose serialized size stays under
/// `max_value_size`. Each non-primary chunk receives `chunk_coin` lovelace;
/// the primary chunk keeps the remainder.
pub fn split_change(change: Value, max_value_size: u64, chunk_coin: u64) -> Vec<Value> {
    let encoded_size =
        |v: &Value| minicbor::to_vec(v.clone().into_wire()).map(|x| x.len()).unwrap_or(0) as u64;

    if encoded_size(&change) <= max_value_size {
        return vec![change];
    }

    let total_coin = change.coin;
    let mut chunks: Vec<Value> = vec![];
    let mut current = Value::lovelace(0);

    for (policy, name, quantity) in change.assets() {
        let candidate = current.clone().add_asset(*policy, name.clone(), quantity);

        if encoded_size(&candidate) > max_value_size && current.has_assets() {
            chunks.push(current);
            current = Value::lovelace(0).add_asset(*policy, name.clone(), quantity);
        } else {
            current = candidate;
        }
    }

    chunks.push(current);

    // secondary chunks take a fixed coin allotment, the first keeps the rest
    let secondary = chunks.len() as u64 - 1;
    let reserved = secondary * chunk_coin;

    if total_coin < reserved {
        // not enough lovelace to fund the split; give everything to one
        // chunk and let output validation surface the problem
        let mut merged = Value::lovelace(total_coin);
        for (policy, name, quantity) in chunks.iter().flat_map(|c| c.assets()) {
            merged = merged.add_asset(*policy, name.clone(), quantity);
        }
        return vec![merged];
    }

    for (i, chunk) in chunks.iter_mut().enumerate() {
        chunk.coin = if i == 0 {
            total_coin - reserved
        } else {
            chunk_coin
        };
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesta_codec::utils::Bytes;
    use vesta_crypto::hash::Hash;
    use vesta_primitives::{PolicyId, PostAlonzoTransactionOutput, TransactionOutput};

    fn utxo(tx_byte: u8, index: u64, value: Value) -> Utxo {
        Utxo {
            input: TransactionInput {
                transaction_id: Hash::new([tx_byte; 32]),
                index,
            },
            output: TransactionOutput::PostAlonzo(PostAlonzoTransactionOutput {
                address: Bytes::from(vec![0x61; 29]),
                value: value.into_wire(),
                datum_option: None,
                script_ref: None,
            }),
        }
    }

    fn policy(byte: u8) -> PolicyId {
        Hash::new([byte; 28])
    }

    fn nft() -> (PolicyId, Bytes) {
        (policy(0xaa), Bytes::from(b"NFT_A".to_vec()))
    }

    #[test]
    fn covers_assets_then_coin() {
        let (p, n) = nft();

        let pool = vec![
            utxo(1, 0, Value::lovelace(2_000_000).add_asset(p, n.clone(), 1)),
            utxo(2, 0, Value::lovelace(5_000_000)),
            utxo(3, 0, Value::lovelace(3_000_000)),
        ];

        let target = Value::lovelace(2_170_000).add_asset(p, n, 1);

        let selection = select_inputs(&pool, &target, &[], 16).unwrap();

        let ids: Vec<u8> = selection
            .inputs
            .iter()
            .map(|x| x.input.transaction_id[0])
            .collect();

        assert_eq!(ids, vec![1, 2]);
        assert_eq!(selection.change.coin, 4_830_000);
        assert!(!selection.change.has_assets());
    }

    #[test]
    fn descending_coin_with_deterministic_ties() {
        let pool = vec![
            utxo(9, 1, Value::lovelace(5)),
            utxo(9, 0, Value::lovelace(5)),
            utxo(1, 0, Value::lovelace(5)),
        ];

        let selection = select_inputs(&pool, &Value::lovelace(10), &[], 16).unwrap();

        let picked: Vec<(u8, u64)> = selection
            .inputs
            .iter()
            .map(|x| (x.input.transaction_id[0], x.input.index))
            .collect();

        // equal coin: ordered by (txid, index)
        assert_eq!(picked, vec![(1, 0), (9, 0)]);
    }

    #[test]
    fn shortfall_is_reported() {
        let pool = vec![utxo(1, 0, Value::lovelace(1_000_000))];

        let err = select_inputs(&pool, &Value::lovelace(5_000_000), &[], 16).unwrap_err();

        match err {
            TxBuilderError::InsufficientBalance(shortfall) => {
                assert_eq!(shortfall.coin, 4_000_000);
            }
            _ => panic!("expected insufficient balance"),
        }
    }

    #[test]
    fn missing_asset_is_a_shortfall() {
        let pool = vec![utxo(1, 0, Value::lovelace(10_000_000))];
        let (p, n) = nft();

        let target = Value::lovelace(1).add_asset(p, n.clone(), 2);
        let err = select_inputs(&pool, &target, &[], 16).unwrap_err();

        match err {
            TxBuilderError::InsufficientBalance(shortfall) => {
                assert_eq!(shortfall.quantity_of(&p, &n), 2);
            }
            _ => panic!("expected insufficient balance"),
        }
    }

    #[test]
    fn input_limit_is_enforced() {
        let pool = vec![
            utxo(1, 0, Value::lovelace(5)),
            utxo(2, 0, Value::lovelace(5)),
            utxo(3, 0, Value::lovelace(5)),
        ];

        let err = select_inputs(&pool, &Value::lovelace(15), &[], 2).unwrap_err();
        assert!(matches!(err, TxBuilderError::TooManyInputs { required: 3, max: 2 }));
    }

    #[test]
    fn in_use_inputs_are_skipped() {
        let pool = vec![
            utxo(1, 0, Value::lovelace(10)),
            utxo(2, 0, Value::lovelace(10)),
        ];

        let reserved = [pool[0].input.clone()];
        let selection = select_inputs(&pool, &Value::lovelace(5), &reserved, 16).unwrap();

        assert_eq!(selection.inputs[0].input.transaction_id[0], 2);
    }

    #[test]
    fn collateral_prefers_pure_coin() {
        let (p, n) = nft();

        let pool = vec![
            utxo(1, 0, Value::lovelace(50_000_000).add_asset(p, n, 1)),
            utxo(2, 0, Value::lovelace(5_000_000)),
        ];

        let (picked, excess) = select_collateral(&pool, 300_000, 3, &[]).unwrap();

        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].input.transaction_id[0], 2);
        assert_eq!(excess, 4_700_000);
    }

    #[test]
    fn collateral_without_pure_coin_fails() {
        let (p, n) = nft();
        let pool = vec![utxo(1, 0, Value::lovelace(50_000_000).add_asset(p, n, 1))];

        assert!(matches!(
            select_collateral(&pool, 300_000, 3, &[]),
            Err(TxBuilderError::NoCollateralInputs)
        ));
    }

    #[test]
    fn collateral_respects_input_cap() {
        let pool = vec![
            utxo(1, 0, Value::lovelace(100)),
            utxo(2, 0, Value::lovelace(100)),
            utxo(3, 0, Value::lovelace(100)),
        ];

        assert!(matches!(
            select_collateral(&pool, 250, 2, &[]),
            Err(TxBuilderError::CollateralShortfall {
                required: 250,
                available: 200
            })
        ));
    }

    #[test]
    fn oversized_change_splits_preserving_total() {
        let mut change = Value::lovelace(50_000_000);

        for i in 0..120u8 {
            change = change.add_asset(policy(i), Bytes::from(vec![i; 24]), 1);
        }

        let chunks = split_change(change.clone(), 256, 1_200_000);

        assert!(chunks.len() > 1);

        let total: u64 = chunks.iter().map(|c| c.coin).sum();
        assert_eq!(total, 50_000_000);

        let assets: usize = chunks.iter().map(|c| c.asset_count()).sum();
        assert_eq!(assets, 120);
    }
}
