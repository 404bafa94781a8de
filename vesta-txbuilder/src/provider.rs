//! Abstract surface over a chain indexer
//!
//! The builder consumes this trait for everything it needs from the
//! outside world: parameters, UTxO resolution, reward balances, datum
//! lookup, submission and redeemer evaluation. Concrete transports (HTTP
//! indexers, local nodes) live outside this crate.

use std::time::Duration;

use thiserror::Error;

use vesta_addresses::Address;
use vesta_crypto::hash::Hash;
use vesta_primitives::{ExUnits, PlutusData, RedeemersKey, TransactionInput, TransactionOutput};

use crate::transaction::BuiltTransaction;
use crate::value::Value;
use crate::ProtocolParams;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Transport-level failure, carrying the upstream message
    #[error("network error: {0}")]
    Network(String),
    /// The queried entity does not exist upstream
    #[error("not found: {0}")]
    NotFound(String),
    /// The provider rejected the request as malformed
    #[error("bad request: {0}")]
    BadRequest(String),
    /// The provider does not implement the requested operation
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

/// An unspent output: the pointer plus its resolved content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub input: TransactionInput,
    pub output: TransactionOutput,
}

impl Utxo {
    pub fn new(input: TransactionInput, output: TransactionOutput) -> Self {
        Self { input, output }
    }

    pub fn value(&self) -> Value {
        Value::from_wire(self.output.value())
    }

    pub fn address(&self) -> Option<Address> {
        Address::from_bytes(self.output.address()).ok()
    }

    /// True when the output holds nothing but lovelace
    pub fn is_pure_coin(&self) -> bool {
        !self.value().has_assets()
    }
}

/// A list of unspent outputs with the lookups balancing needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtxoSet(Vec<Utxo>);

impl UtxoSet {
    pub fn new(utxos: Vec<Utxo>) -> Self {
        Self(utxos)
    }

    pub fn resolve(&self, input: &TransactionInput) -> Option<&Utxo> {
        self.0.iter().find(|x| &x.input == input)
    }

    pub fn total_value(&self) -> Value {
        self.0
            .iter()
            .fold(Value::lovelace(0), |acc, utxo| {
                acc.checked_add(&utxo.value()).unwrap_or(acc)
            })
    }

    pub fn by_address(&self, address: &Address) -> UtxoSet {
        let bytes = address.to_vec();

        UtxoSet(
            self.0
                .iter()
                .filter(|x| x.output.address().as_slice() == bytes.as_slice())
                .cloned()
                .collect(),
        )
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Utxo> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Utxo>> for UtxoSet {
    fn from(value: Vec<Utxo>) -> Self {
        Self(value)
    }
}

impl IntoIterator for UtxoSet {
    type Item = Utxo;
    type IntoIter = std::vec::IntoIter<Utxo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a UtxoSet {
    type Item = &'a Utxo;
    type IntoIter = std::slice::Iter<'a, Utxo>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Chain access used by the builder.
///
/// Implementations may block inside these calls; `confirm` polls at a
/// provider-chosen cadence until inclusion or timeout. An instance may be
/// shared between builders as long as its transport is internally
/// synchronized.
pub trait Provider {
    fn parameters(&self) -> Result<ProtocolParams, ProviderError>;

    fn unspent_outputs(&self, address: &Address) -> Result<Vec<Utxo>, ProviderError>;

    fn resolve_inputs(&self, inputs: &[TransactionInput]) -> Result<Vec<Utxo>, ProviderError>;

    fn rewards_available(&self, reward_account: &[u8]) -> Result<u64, ProviderError>;

    fn datum(&self, hash: Hash<32>) -> Result<PlutusData, ProviderError>;

    /// Submit a witnessed transaction, returning its id
    fn submit(&self, tx: &BuiltTransaction) -> Result<Hash<32>, ProviderError>;

    /// Block until the transaction is observed on-chain or the timeout
    /// elapses; Ok(false) means timeout, Err means transport failure
    fn confirm(&self, tx_id: Hash<32>, timeout: Duration) -> Result<bool, ProviderError>;

    /// Evaluate the scripts of a balanced-but-unsigned transaction and
    /// report the execution units consumed per redeemer
    fn evaluate(
        &self,
        tx: &BuiltTransaction,
        additional_utxos: &[Utxo],
    ) -> Result<Vec<(RedeemersKey, ExUnits)>, ProviderError>;
}
