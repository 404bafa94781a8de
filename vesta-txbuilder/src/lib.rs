mod build;
mod fee;
mod params;
mod provider;
mod select;
mod staging;
mod transaction;
mod value;

pub use fee::{linear_fee, min_utxo_for_output, script_fee};
pub use params::{NetworkParams, ProtocolParams};
pub use provider::{Provider, ProviderError, Utxo, UtxoSet};
pub use select::{select_collateral, select_inputs, Selection};
pub use staging::{Output, Script, TxBuilder};
pub use transaction::BuiltTransaction;
pub use value::{MintAssets, Value};

use vesta_crypto::hash::Hash;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TxBuilderError {
    /// No change address was configured before build
    #[error("no change address configured")]
    NoChangeAddress,
    /// A string could not be parsed as an address or identifier
    #[error("malformed address or identifier: {0}")]
    MalformedAddress(String),
    /// Provided bytes could not be decoded into a script
    #[error("could not decode script bytes")]
    MalformedScript,
    /// Provided bytes could not be decoded into a datum
    #[error("could not decode datum bytes")]
    MalformedDatum,
    /// Metadata JSON could not be converted
    #[error("could not convert metadata: {0}")]
    MalformedMetadata(String),
    /// Asset name is longer than the 32-byte limit
    #[error("asset name must be 32 bytes or less")]
    AssetNameTooLong,
    /// Provided network id is not 0 or 1
    #[error("invalid network id")]
    InvalidNetworkId,
    /// A validity bound predates the network's known era start
    #[error("timestamp is outside the known slot range")]
    InvalidTimestamp,
    /// Input, policy, etc. pointed to by a redeemer was not found in the tx
    #[error("input/policy pointed to by redeemer not found in tx")]
    RedeemerTargetMissing,
    /// A script-locked intent is missing its redeemer
    #[error("script-guarded input or action is missing a redeemer")]
    MissingRedeemer,
    /// The resolver could not find a script for a required hash
    #[error("missing script for hash {0}")]
    MissingScript(Hash<28>),
    /// The resolver could not find a datum for a required hash
    #[error("missing datum for hash {0}")]
    MissingDatum(Hash<32>),
    /// Protocol parameters carry no cost model for a used plutus version
    #[error("no cost model available for {0:?}")]
    MissingCostModel(vesta_primitives::Language),
    /// The candidate pool cannot cover the target value
    #[error("insufficient balance, short {0}")]
    InsufficientBalance(Value),
    /// Selection would exceed the allowed number of inputs
    #[error("selection needs {required} inputs, limit is {max}")]
    TooManyInputs { required: usize, max: usize },
    /// No pure-coin UTxOs available to use as collateral
    #[error("no pure-coin UTxOs available for collateral")]
    NoCollateralInputs,
    /// Collateral inputs cannot cover the required amount
    #[error("collateral of {required} lovelace required, {available} available")]
    CollateralShortfall { required: u64, available: u64 },
    /// An output carries less coin than the ledger minimum for its size
    #[error("output holds {actual} lovelace, minimum is {required}")]
    OutputBelowMinUtxo { required: u64, actual: u64 },
    /// The balanced transaction exceeds the protocol size limit
    #[error("transaction of {size} bytes exceeds the {max} byte limit")]
    OversizeTransaction { size: u64, max: u64 },
    /// A certificate or proposal was added twice
    #[error("duplicate certificate or proposal")]
    DuplicateIntent,
    /// Change address cannot be used for balancing
    #[error("change address type cannot receive balanced change")]
    UnsupportedChangeAddress,
    /// Transaction bytes in a built transaction could not be decoded
    #[error("corrupted transaction bytes in built transaction")]
    CorruptedTxBytes,
    /// Public key material of unexpected shape
    #[error("public key for private key is malformed")]
    MalformedKey,
    /// Key handler failure while signing
    #[error("key handler failed: {0}")]
    KeyHandler(String),
    /// Upstream provider failure
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}
