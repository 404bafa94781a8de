//! Fee arithmetic per the ledger rules

use vesta_codec::minicbor;
use vesta_primitives::{ExUnitPrices, ExUnits, TransactionOutput};

use crate::ProtocolParams;

/// `fee = a * size + b`
pub fn linear_fee(params: &ProtocolParams, tx_size: u64) -> u64 {
    params.min_fee_a * tx_size + params.min_fee_b
}

/// Script portion of the fee: `ceil(mem * mem_price + steps * step_price)`
///
/// Prices are rationals; the sum is computed over the common denominator in
/// u128 before taking a single ceiling, matching the ledger.
pub fn script_fee(prices: &ExUnitPrices, units: ExUnits) -> u64 {
    let mem_num = prices.mem_price.numerator as u128;
    let mem_den = prices.mem_price.denominator.max(1) as u128;
    let step_num = prices.step_price.numerator as u128;
    let step_den = prices.step_price.denominator.max(1) as u128;

    let den = mem_den * step_den;
    let num = units.mem as u128 * mem_num * step_den + units.steps as u128 * step_num * mem_den;

    ((num + den - 1) / den) as u64
}

/// Sum execution units across redeemers
pub fn sum_ex_units<I>(units: I) -> ExUnits
where
    I: IntoIterator<Item = ExUnits>,
{
    units.into_iter().fold(
        ExUnits { mem: 0, steps: 0 },
        |acc, x| ExUnits {
            mem: acc.mem + x.mem,
            steps: acc.steps + x.steps,
        },
    )
}

/// Minimum lovelace an output must hold, from its serialized size:
/// `(160 + |output|) * coins_per_utxo_byte`
pub fn min_utxo_for_output(params: &ProtocolParams, output: &TransactionOutput) -> u64 {
    let size = minicbor::to_vec(output).map(|x| x.len()).unwrap_or_default() as u64;

    (160 + size) * params.coins_per_utxo_byte
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesta_primitives::{Bytes, RationalNumber, Value};

    #[test]
    fn linear_fee_matches_mainnet_coefficients() {
        let params = ProtocolParams::default();

        assert_eq!(linear_fee(&params, 0), 155381);
        assert_eq!(linear_fee(&params, 200), 155381 + 44 * 200);
    }

    #[test]
    fn script_fee_takes_the_ceiling() {
        let prices = ExUnitPrices {
            mem_price: RationalNumber {
                numerator: 1,
                denominator: 3,
            },
            step_price: RationalNumber {
                numerator: 1,
                denominator: 3,
            },
        };

        // 2/3 rounds up to 1
        assert_eq!(
            script_fee(&prices, ExUnits { mem: 1, steps: 1 }),
            1
        );

        assert_eq!(
            script_fee(&prices, ExUnits { mem: 3, steps: 3 }),
            2
        );

        assert_eq!(script_fee(&prices, ExUnits { mem: 0, steps: 0 }), 0);
    }

    #[test]
    fn min_utxo_grows_with_output_size() {
        let params = ProtocolParams::default();

        let small = TransactionOutput::PostAlonzo(vesta_primitives::PostAlonzoTransactionOutput {
            address: Bytes::from(vec![0x61; 29]),
            value: Value::Coin(1_000_000),
            datum_option: None,
            script_ref: None,
        });

        let large = TransactionOutput::PostAlonzo(vesta_primitives::PostAlonzoTransactionOutput {
            address: Bytes::from(vec![0x61; 57]),
            value: Value::Coin(1_000_000),
            datum_option: None,
            script_ref: None,
        });

        assert!(min_utxo_for_output(&params, &small) < min_utxo_for_output(&params, &large));
        assert!(min_utxo_for_output(&params, &small) >= 160 * params.coins_per_utxo_byte);
    }
}
