//! Network constants and protocol parameters

use serde::{Deserialize, Serialize};

use vesta_primitives::{CostModels, ExUnitPrices, ExUnits, RationalNumber};

/// Well-known magic for mainnet
pub const MAINNET_MAGIC: u64 = 764824073;

/// Well-known magic for the pre-production testnet
pub const PRE_PRODUCTION_MAGIC: u64 = 1;

/// Well-known magic for the preview testnet
pub const PREVIEW_MAGIC: u64 = 2;

/// Well-known chain constants for a specific network
///
/// The Shelley anchor (a known slot with its wall-clock time) plus the slot
/// length is enough to convert between posix timestamps and slots for
/// anything after the era boundary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkParams {
    pub magic: u64,
    pub network_id: u8,
    pub shelley_known_slot: u64,
    pub shelley_known_time: u64,
    pub shelley_slot_length: u64,
    pub shelley_epoch_length: u64,
}

impl NetworkParams {
    pub fn mainnet() -> Self {
        NetworkParams {
            magic: MAINNET_MAGIC,
            network_id: 1,
            shelley_known_slot: 4492800,
            shelley_known_time: 1596059091,
            shelley_slot_length: 1,
            shelley_epoch_length: 432000,
        }
    }

    pub fn preprod() -> Self {
        NetworkParams {
            magic: PRE_PRODUCTION_MAGIC,
            network_id: 0,
            shelley_known_slot: 86400,
            shelley_known_time: 1655769600,
            shelley_slot_length: 1,
            shelley_epoch_length: 432000,
        }
    }

    pub fn preview() -> Self {
        NetworkParams {
            magic: PREVIEW_MAGIC,
            network_id: 0,
            shelley_known_slot: 0,
            shelley_known_time: 1666656000,
            shelley_slot_length: 1,
            shelley_epoch_length: 86400,
        }
    }

    pub fn from_magic(magic: u64) -> Option<Self> {
        match magic {
            MAINNET_MAGIC => Some(Self::mainnet()),
            PRE_PRODUCTION_MAGIC => Some(Self::preprod()),
            PREVIEW_MAGIC => Some(Self::preview()),
            _ => None,
        }
    }

    pub fn is_mainnet(&self) -> bool {
        self.magic == MAINNET_MAGIC
    }

    /// Convert a posix timestamp (seconds) into the enclosing slot.
    ///
    /// Returns None for timestamps before the Shelley anchor.
    pub fn timestamp_to_slot(&self, timestamp: u64) -> Option<u64> {
        if timestamp < self.shelley_known_time {
            return None;
        }

        let elapsed = timestamp - self.shelley_known_time;

        Some(self.shelley_known_slot + elapsed / self.shelley_slot_length)
    }

    /// Wall-clock time at the start of the given slot.
    pub fn slot_to_timestamp(&self, slot: u64) -> Option<u64> {
        if slot < self.shelley_known_slot {
            return None;
        }

        let elapsed = slot - self.shelley_known_slot;

        Some(self.shelley_known_time + elapsed * self.shelley_slot_length)
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// The protocol-parameter subset that drives balancing and fee estimation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProtocolParams {
    pub min_fee_a: u64,
    pub min_fee_b: u64,
    pub max_tx_size: u64,
    pub max_value_size: u64,
    pub coins_per_utxo_byte: u64,
    pub key_deposit: u64,
    pub pool_deposit: u64,
    pub drep_deposit: u64,
    pub gov_action_deposit: u64,
    pub collateral_percentage: u64,
    pub max_collateral_inputs: u64,
    pub execution_prices: ExUnitPrices,
    pub max_tx_ex_units: ExUnits,
    pub cost_models: CostModels,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        // mainnet values at the Conway boundary
        ProtocolParams {
            min_fee_a: 44,
            min_fee_b: 155381,
            max_tx_size: 16384,
            max_value_size: 5000,
            coins_per_utxo_byte: 4310,
            key_deposit: 2_000_000,
            pool_deposit: 500_000_000,
            drep_deposit: 500_000_000,
            gov_action_deposit: 100_000_000_000,
            collateral_percentage: 150,
            max_collateral_inputs: 3,
            execution_prices: ExUnitPrices {
                mem_price: RationalNumber {
                    numerator: 577,
                    denominator: 10_000,
                },
                step_price: RationalNumber {
                    numerator: 721,
                    denominator: 10_000_000,
                },
            },
            max_tx_ex_units: ExUnits {
                mem: 14_000_000,
                steps: 10_000_000_000,
            },
            cost_models: CostModels::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_slot_conversion_roundtrip() {
        let params = NetworkParams::mainnet();

        let slot = params.timestamp_to_slot(1700000000).unwrap();
        assert_eq!(params.slot_to_timestamp(slot), Some(1700000000));
    }

    #[test]
    fn pre_shelley_timestamps_are_rejected() {
        let params = NetworkParams::mainnet();
        assert_eq!(params.timestamp_to_slot(0), None);
    }

    #[test]
    fn known_anchor_maps_to_known_slot() {
        let params = NetworkParams::mainnet();

        assert_eq!(
            params.timestamp_to_slot(params.shelley_known_time),
            Some(params.shelley_known_slot)
        );
    }

    #[test]
    fn network_ids() {
        assert_eq!(NetworkParams::mainnet().network_id, 1);
        assert_eq!(NetworkParams::preprod().network_id, 0);
        assert_eq!(NetworkParams::preview().network_id, 0);
    }
}
