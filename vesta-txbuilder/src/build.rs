//! Balancing, fee convergence and final assembly

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use vesta_codec::minicbor;
use vesta_codec::utils::{Bytes, KeyValuePairs, NonEmptySet, PositiveCoin, Set};
use vesta_crypto::hash::Hash;
use vesta_primitives::{
    AuxiliaryData, Certificate, ComputeHash, ExUnits, GovActionId, Language, LanguageView,
    Metadatum, NativeScript, PlutusData, PlutusScript, PolicyId, PostAlonzoAuxiliaryData,
    PostAlonzoTransactionOutput, ProposalProcedure, RedeemerTag, Redeemers, RedeemersKey,
    RedeemersValue, ScriptData, StakeCredential, TransactionBody, TransactionInput,
    TransactionOutput, Tx, VKeyWitness, Voter, VotingProcedure, WitnessSet,
};

use crate::fee::{linear_fee, min_utxo_for_output, script_fee, sum_ex_units};
use crate::provider::{Provider, Utxo};
use crate::select::{select_collateral, select_inputs, split_change};
use crate::staging::{CertificateIntent, Script, TxBuilder};
use crate::transaction::BuiltTransaction;
use crate::value::Value;
use crate::{ProtocolParams, TxBuilderError};

/// Hard cap on selected inputs; a backstop well above anything the size
/// limit would allow anyway
const MAX_SELECTED_INPUTS: usize = 256;

/// Size guess used for the very first fee estimate
const PLACEHOLDER_TX_SIZE: u64 = 300;

const FEE_ITERATIONS: usize = 3;

impl CertificateIntent {
    fn materialize(&self, params: &ProtocolParams) -> Certificate {
        match self {
            CertificateIntent::Explicit(cert) => cert.clone(),
            CertificateIntent::RegisterStake(cred) => {
                Certificate::StakeRegistration(cred.clone())
            }
            CertificateIntent::DeregisterStake(cred) => {
                Certificate::StakeDeregistration(cred.clone())
            }
            CertificateIntent::DelegateStake(cred, pool) => {
                Certificate::StakeDelegation(cred.clone(), *pool)
            }
            CertificateIntent::RegisterDRep(cred, anchor) => {
                Certificate::RegDRepCert(cred.clone(), params.drep_deposit, anchor.clone())
            }
            CertificateIntent::DeregisterDRep(cred) => {
                Certificate::UnRegDRepCert(cred.clone(), params.drep_deposit)
            }
            CertificateIntent::UpdateDRep(cred, anchor) => {
                Certificate::UpdateDRepCert(cred.clone(), anchor.clone())
            }
            CertificateIntent::DelegateVote(cred, drep) => {
                Certificate::VoteDeleg(cred.clone(), drep.clone())
            }
        }
    }

    fn deposit(&self, params: &ProtocolParams) -> u64 {
        match self {
            CertificateIntent::RegisterStake(_) => params.key_deposit,
            CertificateIntent::RegisterDRep(..) => params.drep_deposit,
            CertificateIntent::Explicit(cert) => match cert {
                Certificate::StakeRegistration(_) => params.key_deposit,
                Certificate::Reg(_, coin) => *coin,
                Certificate::StakeRegDeleg(_, _, coin) => *coin,
                Certificate::VoteRegDeleg(_, _, coin) => *coin,
                Certificate::StakeVoteRegDeleg(_, _, _, coin) => *coin,
                Certificate::RegDRepCert(_, coin, _) => *coin,
                Certificate::PoolRegistration { .. } => params.pool_deposit,
                _ => 0,
            },
            _ => 0,
        }
    }

    fn refund(&self, params: &ProtocolParams) -> u64 {
        match self {
            CertificateIntent::DeregisterStake(_) => params.key_deposit,
            CertificateIntent::DeregisterDRep(_) => params.drep_deposit,
            CertificateIntent::Explicit(cert) => match cert {
                Certificate::StakeDeregistration(_) => params.key_deposit,
                Certificate::UnReg(_, coin) => *coin,
                Certificate::UnRegDRepCert(_, coin) => *coin,
                _ => 0,
            },
            _ => 0,
        }
    }

    fn credential(&self) -> Option<&StakeCredential> {
        match self {
            CertificateIntent::RegisterStake(c)
            | CertificateIntent::DeregisterStake(c)
            | CertificateIntent::DelegateStake(c, _)
            | CertificateIntent::RegisterDRep(c, _)
            | CertificateIntent::DeregisterDRep(c)
            | CertificateIntent::UpdateDRep(c, _)
            | CertificateIntent::DelegateVote(c, _) => Some(c),
            CertificateIntent::Explicit(cert) => match cert {
                Certificate::StakeRegistration(c)
                | Certificate::StakeDeregistration(c)
                | Certificate::StakeDelegation(c, _)
                | Certificate::Reg(c, _)
                | Certificate::UnReg(c, _)
                | Certificate::VoteDeleg(c, _)
                | Certificate::StakeVoteDeleg(c, _, _)
                | Certificate::StakeRegDeleg(c, _, _)
                | Certificate::VoteRegDeleg(c, _, _)
                | Certificate::StakeVoteRegDeleg(c, _, _, _)
                | Certificate::AuthCommitteeHot(c, _)
                | Certificate::ResignCommitteeCold(c, _)
                | Certificate::RegDRepCert(c, _, _)
                | Certificate::UnRegDRepCert(c, _)
                | Certificate::UpdateDRepCert(c, _) => Some(c),
                _ => None,
            },
        }
    }
}

/// A redeemer obligation discovered during script resolution, paired with
/// its user-supplied data; the wire index is assigned at assembly time
#[derive(Debug, Clone, PartialEq)]
enum Purpose {
    Spend(TransactionInput),
    Mint(PolicyId),
    Cert(usize),
    Reward(Bytes),
    Vote(Voter),
}

#[derive(Default)]
struct Resolution {
    native_scripts: Vec<NativeScript>,
    plutus_v1: Vec<Bytes>,
    plutus_v2: Vec<Bytes>,
    plutus_v3: Vec<Bytes>,
    languages: BTreeSet<Language>,
    witness_datums: Vec<PlutusData>,
    purposes: Vec<(Purpose, PlutusData)>,
}

impl Resolution {
    fn has_redeemers(&self) -> bool {
        !self.purposes.is_empty()
    }

    /// Register a script that must be witnessed in this transaction
    /// (scripts reachable via reference inputs skip this)
    fn witness_script(&mut self, script: &Script) {
        match script {
            Script::Native(x) => {
                if !self.native_scripts.contains(x) {
                    self.native_scripts.push(x.clone());
                }
            }
            Script::PlutusV1(x) => {
                if !self.plutus_v1.contains(x) {
                    self.plutus_v1.push(x.clone());
                }
            }
            Script::PlutusV2(x) => {
                if !self.plutus_v2.contains(x) {
                    self.plutus_v2.push(x.clone());
                }
            }
            Script::PlutusV3(x) => {
                if !self.plutus_v3.contains(x) {
                    self.plutus_v3.push(x.clone());
                }
            }
        }
    }

    fn track_language(&mut self, script: &Script) {
        match script {
            Script::Native(_) => {}
            Script::PlutusV1(_) => {
                self.languages.insert(Language::PlutusV1);
            }
            Script::PlutusV2(_) => {
                self.languages.insert(Language::PlutusV2);
            }
            Script::PlutusV3(_) => {
                self.languages.insert(Language::PlutusV3);
            }
        }
    }

    fn witness_datum(&mut self, datum: PlutusData) {
        let hash = datum.compute_hash();

        if !self
            .witness_datums
            .iter()
            .any(|x| x.compute_hash() == hash)
        {
            self.witness_datums.push(datum);
        }
    }
}

/// A script known to the builder: either supplied for the witness set or
/// reachable through a reference input
struct KnownScript {
    script: Script,
    referenced: bool,
}

impl TxBuilder {
    /// Resolve, balance, estimate and assemble. Returns a ready-to-sign
    /// transaction or the first recorded failure.
    pub fn build(mut self, provider: &dyn Provider) -> Result<BuiltTransaction, TxBuilderError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }

        let params = provider.parameters()?;

        let change_address = self
            .change_address
            .clone()
            .ok_or(TxBuilderError::NoChangeAddress)?;

        // certificates and proposals, deposits included
        let certificates: Vec<Certificate> = self
            .certificates
            .iter()
            .map(|(intent, _)| intent.materialize(&params))
            .collect();

        for (i, cert) in certificates.iter().enumerate() {
            if certificates[..i].contains(cert) {
                return Err(TxBuilderError::DuplicateIntent);
            }
        }

        let proposals: Vec<ProposalProcedure> = self
            .proposals
            .iter()
            .map(|intent| ProposalProcedure {
                deposit: params.gov_action_deposit,
                reward_account: Bytes::from(intent.reward_account.to_vec()),
                gov_action: intent.action.clone(),
                anchor: intent.anchor.clone(),
            })
            .collect();

        for (i, proposal) in proposals.iter().enumerate() {
            if proposals[..i].contains(proposal) {
                return Err(TxBuilderError::DuplicateIntent);
            }
        }

        let deposits: u64 = self
            .certificates
            .iter()
            .map(|(intent, _)| intent.deposit(&params))
            .sum::<u64>()
            + proposals.iter().map(|p| p.deposit).sum::<u64>();

        let refunds: u64 = self
            .certificates
            .iter()
            .map(|(intent, _)| intent.refund(&params))
            .sum();

        // withdrawals, canonically ordered by reward-account bytes with
        // duplicate accounts merged
        let mut withdrawal_entries: BTreeMap<Bytes, u64> = BTreeMap::new();

        for intent in &self.withdrawals {
            *withdrawal_entries
                .entry(Bytes::from(intent.account.to_vec()))
                .or_insert(0) += intent.amount;
        }

        let withdrawal_total: u64 = withdrawal_entries.values().sum();

        // caller outputs
        let fixed_outputs: Vec<TransactionOutput> =
            self.outputs.iter().map(|o| o.build()).collect();

        for output in &fixed_outputs {
            let required = min_utxo_for_output(&params, output);
            let actual = Value::from_wire(output.value()).coin;

            if actual < required {
                return Err(TxBuilderError::OutputBelowMinUtxo { required, actual });
            }
        }

        let outputs_value = fixed_outputs.iter().fold(Value::lovelace(0), |acc, o| {
            acc.checked_add(&Value::from_wire(o.value())).unwrap_or(acc)
        });

        let resolution = self.resolve_scripts(provider)?;
        let has_redeemers = resolution.has_redeemers();

        let minted = self.mint.minted();
        let burned = self.mint.burned();
        let mint_wire = self.mint.clone().into_wire();

        let explicit_inputs: Vec<TransactionInput> =
            self.inputs.iter().map(|b| b.utxo.input.clone()).collect();

        let explicit_value = self.inputs.iter().fold(Value::lovelace(0), |acc, b| {
            acc.checked_add(&b.utxo.value()).unwrap_or(acc)
        });

        // worst-case lovelace for a split-off change chunk
        let change_chunk_coin = (160 + params.max_value_size + 64) * params.coins_per_utxo_byte;

        // execution units per purpose, refined once by the evaluator
        let mut units: Vec<ExUnits> = vec![ExUnits { mem: 0, steps: 0 }; resolution.purposes.len()];
        let mut evaluated = !has_redeemers;

        let mut fee = linear_fee(&params, PLACEHOLDER_TX_SIZE);
        let mut iteration = 0;

        loop {
            // target: outputs + fee + deposits + burns, funded by explicit
            // inputs, mints, withdrawals and refunds; selection covers the
            // rest
            let mut required = outputs_value.clone();
            required.coin += fee + deposits;
            required = required
                .checked_add(&burned)
                .ok_or_else(|| TxBuilderError::InsufficientBalance(burned.clone()))?;

            let mut offered = explicit_value.clone();
            offered.coin += withdrawal_total + refunds;
            offered = offered
                .checked_add(&minted)
                .ok_or_else(|| TxBuilderError::InsufficientBalance(minted.clone()))?;

            let remainder = required.shortfall_against(&offered);

            let selection = select_inputs(
                &self.utxos,
                &remainder,
                &explicit_inputs,
                MAX_SELECTED_INPUTS,
            )?;

            let total_offered = selection
                .inputs
                .iter()
                .fold(offered.clone(), |acc, utxo| {
                    acc.checked_add(&utxo.value()).unwrap_or(acc)
                });

            let mut change = total_offered
                .checked_sub(&required)
                .expect("selection covers the target");

            // assetless dust below the output minimum folds into the fee
            let mut dust_fee = 0;
            let mut change_values = vec![];

            if !change.is_zero() {
                if !change.has_assets() {
                    let probe = TransactionOutput::PostAlonzo(PostAlonzoTransactionOutput {
                        address: Bytes::from(change_address.to_vec()),
                        value: change.clone().into_wire(),
                        datum_option: None,
                        script_ref: None,
                    });

                    if change.coin < min_utxo_for_output(&params, &probe) {
                        dust_fee = change.coin;
                        change = Value::lovelace(0);
                    }
                }

                if !change.is_zero() {
                    change_values =
                        split_change(change, params.max_value_size, change_chunk_coin);
                }
            }

            let change_outputs: Vec<TransactionOutput> = change_values
                .iter()
                .map(|value| {
                    TransactionOutput::PostAlonzo(PostAlonzoTransactionOutput {
                        address: Bytes::from(change_address.to_vec()),
                        value: value.clone().into_wire(),
                        datum_option: None,
                        script_ref: None,
                    })
                })
                .collect();

            for output in &change_outputs {
                let required = min_utxo_for_output(&params, output);
                let actual = Value::from_wire(output.value()).coin;

                if actual < required {
                    return Err(TxBuilderError::OutputBelowMinUtxo { required, actual });
                }
            }

            // final input order determines spend redeemer indexes
            let mut sorted_inputs: Vec<Utxo> = self
                .inputs
                .iter()
                .map(|b| b.utxo.clone())
                .chain(selection.inputs.iter().cloned())
                .collect();

            sorted_inputs
                .sort_by(|a, b| (&a.input.transaction_id, a.input.index)
                    .cmp(&(&b.input.transaction_id, b.input.index)));

            let redeemers = self.assemble_redeemers(
                &resolution,
                &units,
                &sorted_inputs,
                &withdrawal_entries,
            )?;

            let script_data_hash = if has_redeemers {
                Some(self.script_data_hash(&params, &resolution, &redeemers)?)
            } else {
                None
            };

            // collateral only matters when scripts execute
            let mut collateral_inputs: Vec<Utxo> = vec![];
            let mut collateral_return = None;
            let mut total_collateral = None;

            if has_redeemers {
                let required_collateral =
                    (fee * params.collateral_percentage).div_ceil(100);

                let pool = if self.collateral_utxos.is_empty() {
                    &self.utxos
                } else {
                    &self.collateral_utxos
                };

                let spent: Vec<TransactionInput> =
                    sorted_inputs.iter().map(|x| x.input.clone()).collect();

                let (picked, excess) = select_collateral(
                    pool,
                    required_collateral,
                    params.max_collateral_inputs as usize,
                    &spent,
                )?;

                if excess > 0 {
                    let return_address = self
                        .collateral_change_address
                        .as_ref()
                        .unwrap_or(&change_address);

                    collateral_return =
                        Some(TransactionOutput::PostAlonzo(PostAlonzoTransactionOutput {
                            address: Bytes::from(return_address.to_vec()),
                            value: Value::lovelace(excess).into_wire(),
                            datum_option: None,
                            script_ref: None,
                        }));
                }

                total_collateral = Some(required_collateral);
                collateral_inputs = picked;
            }

            let auxiliary_data = self.auxiliary_data();

            let body = self.assemble_body(
                fee + dust_fee,
                &sorted_inputs,
                &fixed_outputs,
                &change_outputs,
                &certificates,
                &proposals,
                &withdrawal_entries,
                mint_wire.clone(),
                script_data_hash,
                &collateral_inputs,
                collateral_return.clone(),
                total_collateral,
                auxiliary_data.as_ref(),
            );

            let witness_set = self.assemble_witness_set(
                &resolution,
                redeemers.clone(),
                self.placeholder_witnesses(&sorted_inputs, &collateral_inputs, &certificates),
            );

            let tx = Tx {
                transaction_body: body,
                transaction_witness_set: witness_set,
                success: true,
                auxiliary_data: auxiliary_data.clone().into(),
            };

            let bytes = minicbor::to_vec(&tx).expect("infallible");
            let size = bytes.len() as u64;

            if size > params.max_tx_size {
                return Err(TxBuilderError::OversizeTransaction {
                    size,
                    max: params.max_tx_size,
                });
            }

            // one evaluator pass fixes the execution units; fees computed
            // after it include the script cost
            if !evaluated {
                let partial =
                    BuiltTransaction::new(tx.transaction_body.compute_hash(), bytes.clone());

                let mut known: Vec<Utxo> = sorted_inputs.clone();
                known.extend(self.reference_inputs.iter().cloned());

                let results = provider.evaluate(&partial, &known)?;

                let keys = self.purpose_keys(&resolution, &sorted_inputs, &withdrawal_entries)?;

                for (key, ex_units) in results {
                    if let Some(pos) = keys.iter().position(|k| *k == key) {
                        units[pos] = ex_units;
                    }
                }

                evaluated = true;
                debug!(redeemers = units.len(), "execution units refined");
                continue;
            }

            let script_units = sum_ex_units(units.iter().copied());
            let computed =
                linear_fee(&params, size) + script_fee(&params.execution_prices, script_units);

            debug!(iteration, fee, computed, size, "fee convergence step");

            if computed <= fee || iteration + 1 >= FEE_ITERATIONS {
                // the body already carries `fee`; strip the placeholder
                // witnesses and freeze
                let witness_set =
                    self.assemble_witness_set(&resolution, redeemers.clone(), vec![]);

                let final_tx = Tx {
                    transaction_witness_set: witness_set,
                    ..tx
                };

                let tx_hash = final_tx.transaction_body.compute_hash();
                let tx_bytes = minicbor::to_vec(&final_tx).expect("infallible");

                return Ok(BuiltTransaction::new(tx_hash, tx_bytes));
            }

            fee = computed;
            iteration += 1;
        }
    }

    fn lookup_script(
        known: &[KnownScript],
        hash: &Hash<28>,
    ) -> Result<(Script, bool), TxBuilderError> {
        known
            .iter()
            .find(|k| k.script.hash() == *hash)
            .map(|k| (k.script.clone(), k.referenced))
            .ok_or(TxBuilderError::MissingScript(*hash))
    }

    fn resolve_scripts(&self, provider: &dyn Provider) -> Result<Resolution, TxBuilderError> {
        let mut known: Vec<KnownScript> = self
            .scripts
            .iter()
            .map(|script| KnownScript {
                script: script.clone(),
                referenced: false,
            })
            .collect();

        for utxo in &self.reference_inputs {
            if let Some(script_ref) = utxo.output.script_ref() {
                known.push(KnownScript {
                    script: Script::from_script_ref(script_ref),
                    referenced: true,
                });
            }
        }

        let mut resolution = Resolution::default();

        // spending obligations
        for binding in &self.inputs {
            if let Some(hash) = Self::payment_script_hash(&binding.utxo) {
                let (script, referenced) = Self::lookup_script(&known, &hash)?;

                resolution.track_language(&script);

                if !referenced {
                    resolution.witness_script(&script);
                }

                if script.is_plutus() {
                    let data = binding
                        .redeemer
                        .clone()
                        .ok_or(TxBuilderError::MissingRedeemer)?;

                    resolution
                        .purposes
                        .push((Purpose::Spend(binding.utxo.input.clone()), data));
                }
            }

            // hash-locked outputs need their datum witnessed
            if let Some(hash) = binding.utxo.output.datum_hash() {
                let local = binding
                    .datum
                    .clone()
                    .or_else(|| {
                        self.datums
                            .iter()
                            .find(|d| d.compute_hash() == hash)
                            .cloned()
                    });

                let datum = match local {
                    Some(x) => x,
                    None => provider
                        .datum(hash)
                        .map_err(|_| TxBuilderError::MissingDatum(hash))?,
                };

                if datum.compute_hash() != hash {
                    return Err(TxBuilderError::MissingDatum(hash));
                }

                resolution.witness_datum(datum);
            }
        }

        // extra datums supplied by the caller ride along
        for datum in &self.datums {
            resolution.witness_datum(datum.clone());
        }

        // minting policies
        for policy in self.mint.policies() {
            let (script, referenced) = Self::lookup_script(&known, policy)?;

            resolution.track_language(&script);

            if !referenced {
                resolution.witness_script(&script);
            }

            if script.is_plutus() {
                let data = self
                    .mint_redeemers
                    .iter()
                    .find(|(p, _)| p == policy)
                    .map(|(_, d)| d.clone())
                    .ok_or(TxBuilderError::MissingRedeemer)?;

                resolution.purposes.push((Purpose::Mint(*policy), data));
            }
        }

        // certificates with script credentials
        for (index, (intent, redeemer)) in self.certificates.iter().enumerate() {
            if let Some(StakeCredential::ScriptHash(hash)) = intent.credential() {
                let (script, referenced) = Self::lookup_script(&known, hash)?;

                resolution.track_language(&script);

                if !referenced {
                    resolution.witness_script(&script);
                }

                if script.is_plutus() {
                    let data = redeemer.clone().ok_or(TxBuilderError::MissingRedeemer)?;
                    resolution.purposes.push((Purpose::Cert(index), data));
                }
            }
        }

        // script-guarded withdrawals
        for intent in &self.withdrawals {
            if intent.account.is_script() {
                let hash = *intent.account.payload().as_hash();
                let (script, referenced) = Self::lookup_script(&known, &hash)?;

                resolution.track_language(&script);

                if !referenced {
                    resolution.witness_script(&script);
                }

                if script.is_plutus() {
                    let data = intent
                        .redeemer
                        .clone()
                        .ok_or(TxBuilderError::MissingRedeemer)?;

                    resolution.purposes.push((
                        Purpose::Reward(Bytes::from(intent.account.to_vec())),
                        data,
                    ));
                }
            }
        }

        // script voters
        for intent in &self.votes {
            let script_hash = match &intent.voter {
                Voter::ConstitutionalCommitteeScript(h) | Voter::DRepScript(h) => Some(*h),
                _ => None,
            };

            if let Some(hash) = script_hash {
                let (script, referenced) = Self::lookup_script(&known, &hash)?;

                resolution.track_language(&script);

                if !referenced {
                    resolution.witness_script(&script);
                }

                if script.is_plutus() {
                    let data = intent
                        .redeemer
                        .clone()
                        .ok_or(TxBuilderError::MissingRedeemer)?;

                    resolution
                        .purposes
                        .push((Purpose::Vote(intent.voter.clone()), data));
                }
            }
        }

        Ok(resolution)
    }

    /// The wire key (tag, index) of every purpose, in purpose order
    fn purpose_keys(
        &self,
        resolution: &Resolution,
        sorted_inputs: &[Utxo],
        withdrawals: &BTreeMap<Bytes, u64>,
    ) -> Result<Vec<RedeemersKey>, TxBuilderError> {
        let mint_policies: Vec<&PolicyId> = self.mint.policies().collect();
        let withdrawal_keys: Vec<&Bytes> = withdrawals.keys().collect();

        let mut voters: Vec<&Voter> = self.votes.iter().map(|v| &v.voter).collect();
        voters.sort();
        voters.dedup();

        resolution
            .purposes
            .iter()
            .map(|(purpose, _)| {
                let (tag, index) = match purpose {
                    Purpose::Spend(input) => {
                        let index = sorted_inputs
                            .iter()
                            .position(|x| &x.input == input)
                            .ok_or(TxBuilderError::RedeemerTargetMissing)?;

                        (RedeemerTag::Spend, index)
                    }
                    Purpose::Mint(policy) => {
                        let index = mint_policies
                            .iter()
                            .position(|p| *p == policy)
                            .ok_or(TxBuilderError::RedeemerTargetMissing)?;

                        (RedeemerTag::Mint, index)
                    }
                    Purpose::Cert(index) => (RedeemerTag::Cert, *index),
                    Purpose::Reward(account) => {
                        let index = withdrawal_keys
                            .iter()
                            .position(|k| *k == account)
                            .ok_or(TxBuilderError::RedeemerTargetMissing)?;

                        (RedeemerTag::Reward, index)
                    }
                    Purpose::Vote(voter) => {
                        let index = voters
                            .iter()
                            .position(|v| *v == voter)
                            .ok_or(TxBuilderError::RedeemerTargetMissing)?;

                        (RedeemerTag::Vote, index)
                    }
                };

                Ok(RedeemersKey {
                    tag,
                    index: index as u32,
                })
            })
            .collect()
    }

    fn assemble_redeemers(
        &self,
        resolution: &Resolution,
        units: &[ExUnits],
        sorted_inputs: &[Utxo],
        withdrawals: &BTreeMap<Bytes, u64>,
    ) -> Result<Option<Redeemers>, TxBuilderError> {
        if resolution.purposes.is_empty() {
            return Ok(None);
        }

        let keys = self.purpose_keys(resolution, sorted_inputs, withdrawals)?;

        let mut entries: Vec<(RedeemersKey, RedeemersValue)> = keys
            .into_iter()
            .zip(resolution.purposes.iter().zip(units))
            .map(|(key, ((_, data), ex_units))| {
                (
                    key,
                    RedeemersValue {
                        data: data.clone(),
                        ex_units: *ex_units,
                    },
                )
            })
            .collect();

        entries.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(Some(Redeemers::Map(KeyValuePairs::from(entries))))
    }

    fn script_data_hash(
        &self,
        params: &ProtocolParams,
        resolution: &Resolution,
        redeemers: &Option<Redeemers>,
    ) -> Result<Hash<32>, TxBuilderError> {
        let redeemers = redeemers
            .clone()
            .unwrap_or(Redeemers::Map(KeyValuePairs::from(vec![])));

        let mut language_views = vec![];

        for language in &resolution.languages {
            let model = params
                .cost_models
                .for_language(*language)
                .ok_or(TxBuilderError::MissingCostModel(*language))?;

            language_views.push(LanguageView(language.view_version(), model.clone()));
        }

        let data = ScriptData {
            redeemers,
            datums: if resolution.witness_datums.is_empty() {
                None
            } else {
                Some(resolution.witness_datums.clone())
            },
            language_views,
        };

        Ok(data.hash())
    }

    /// Key hashes expected to sign: payment keys of consumed inputs and
    /// collateral, key credentials behind certificates and withdrawals,
    /// key voters, and the explicit required-signer set
    fn implied_signers(
        &self,
        sorted_inputs: &[Utxo],
        collateral: &[Utxo],
        certificates: &[Certificate],
    ) -> BTreeSet<Hash<28>> {
        let mut signers = BTreeSet::new();

        for utxo in sorted_inputs.iter().chain(collateral) {
            if let Some(hash) = Self::payment_key_hash(utxo) {
                signers.insert(hash);
            }
        }

        for (intent, _) in &self.certificates {
            if let Some(StakeCredential::AddrKeyhash(hash)) = intent.credential() {
                signers.insert(*hash);
            }
        }

        for certificate in certificates {
            if let Certificate::PoolRegistration { operator, .. }
            | Certificate::PoolRetirement(operator, _) = certificate
            {
                signers.insert(*operator);
            }
        }

        for intent in &self.withdrawals {
            if !intent.account.is_script() {
                signers.insert(*intent.account.payload().as_hash());
            }
        }

        for intent in &self.votes {
            match &intent.voter {
                Voter::ConstitutionalCommitteeKey(h)
                | Voter::DRepKey(h)
                | Voter::StakePoolKey(h) => {
                    signers.insert(*h);
                }
                _ => {}
            }
        }

        for signer in &self.required_signers {
            signers.insert(*signer);
        }

        signers
    }

    /// Zero-byte witnesses standing in for the real signatures, so the
    /// measured size already pays for them; stripped before returning
    fn placeholder_witnesses(
        &self,
        sorted_inputs: &[Utxo],
        collateral: &[Utxo],
        certificates: &[Certificate],
    ) -> Vec<VKeyWitness> {
        self.implied_signers(sorted_inputs, collateral, certificates)
            .iter()
            .map(|_| VKeyWitness {
                vkey: Bytes::from(vec![0u8; 32]),
                signature: Bytes::from(vec![0u8; 64]),
            })
            .collect()
    }

    fn auxiliary_data(&self) -> Option<AuxiliaryData> {
        if self.metadata.is_empty() && self.aux_native_scripts.is_empty() {
            return None;
        }

        let mut entries: Vec<(u64, Metadatum)> = self.metadata.clone();
        entries.sort_by_key(|(label, _)| *label);

        Some(AuxiliaryData::PostAlonzo(PostAlonzoAuxiliaryData {
            metadata: if entries.is_empty() {
                None
            } else {
                Some(KeyValuePairs::from(entries))
            },
            native_scripts: if self.aux_native_scripts.is_empty() {
                None
            } else {
                Some(self.aux_native_scripts.clone())
            },
            plutus_v1_scripts: None,
            plutus_v2_scripts: None,
            plutus_v3_scripts: None,
        }))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble_body(
        &self,
        fee: u64,
        sorted_inputs: &[Utxo],
        fixed_outputs: &[TransactionOutput],
        change_outputs: &[TransactionOutput],
        certificates: &[Certificate],
        proposals: &[ProposalProcedure],
        withdrawals: &BTreeMap<Bytes, u64>,
        mint: Option<vesta_primitives::Mint>,
        script_data_hash: Option<Hash<32>>,
        collateral: &[Utxo],
        collateral_return: Option<TransactionOutput>,
        total_collateral: Option<u64>,
        auxiliary_data: Option<&AuxiliaryData>,
    ) -> TransactionBody {
        let inputs: Vec<TransactionInput> =
            sorted_inputs.iter().map(|x| x.input.clone()).collect();

        let outputs: Vec<TransactionOutput> = fixed_outputs
            .iter()
            .chain(change_outputs)
            .cloned()
            .collect();

        let mut reference_inputs: Vec<TransactionInput> = self
            .reference_inputs
            .iter()
            .map(|x| x.input.clone())
            .collect();

        reference_inputs.sort();
        reference_inputs.dedup();

        let mut required_signers: Vec<Hash<28>> = self.required_signers.clone();
        required_signers.sort();
        required_signers.dedup();

        // votes grouped per voter, both levels canonically ordered
        let mut votes: BTreeMap<Voter, BTreeMap<GovActionId, VotingProcedure>> = BTreeMap::new();

        for intent in &self.votes {
            votes
                .entry(intent.voter.clone())
                .or_default()
                .insert(intent.action.clone(), intent.procedure.clone());
        }

        let voting_procedures = if votes.is_empty() {
            None
        } else {
            Some(KeyValuePairs::from(
                votes
                    .into_iter()
                    .map(|(voter, actions)| {
                        (
                            voter,
                            KeyValuePairs::from(actions.into_iter().collect::<Vec<_>>()),
                        )
                    })
                    .collect::<Vec<_>>(),
            ))
        };

        let mut collateral_inputs: Vec<TransactionInput> =
            collateral.iter().map(|x| x.input.clone()).collect();

        collateral_inputs.sort();

        TransactionBody {
            inputs: Set::from(inputs),
            outputs,
            fee,
            ttl: self.invalid_after_slot,
            certificates: NonEmptySet::from_vec(certificates.to_vec()),
            withdrawals: if withdrawals.is_empty() {
                None
            } else {
                Some(KeyValuePairs::from(
                    withdrawals
                        .iter()
                        .map(|(k, v)| (k.clone(), *v))
                        .collect::<Vec<_>>(),
                ))
            },
            auxiliary_data_hash: auxiliary_data.map(|x| x.compute_hash()),
            validity_interval_start: self.valid_from_slot,
            mint,
            script_data_hash,
            collateral: NonEmptySet::from_vec(collateral_inputs),
            required_signers: NonEmptySet::from_vec(required_signers),
            network_id: self.network_id,
            collateral_return,
            total_collateral,
            reference_inputs: NonEmptySet::from_vec(reference_inputs),
            voting_procedures,
            proposal_procedures: NonEmptySet::from_vec(proposals.to_vec()),
            treasury_value: self.treasury_value,
            donation: self.donation.and_then(|x| PositiveCoin::try_from(x).ok()),
        }
    }

    fn assemble_witness_set(
        &self,
        resolution: &Resolution,
        redeemers: Option<Redeemers>,
        placeholder_vkeys: Vec<VKeyWitness>,
    ) -> WitnessSet {
        WitnessSet {
            vkeywitness: NonEmptySet::from_vec(placeholder_vkeys),
            native_script: NonEmptySet::from_vec(resolution.native_scripts.clone()),
            bootstrap_witness: None,
            plutus_v1_script: NonEmptySet::from_vec(
                resolution
                    .plutus_v1
                    .iter()
                    .map(|x| PlutusScript::<1>(x.clone()))
                    .collect(),
            ),
            plutus_data: NonEmptySet::from_vec(resolution.witness_datums.clone()),
            redeemer: redeemers,
            plutus_v2_script: NonEmptySet::from_vec(
                resolution
                    .plutus_v2
                    .iter()
                    .map(|x| PlutusScript::<2>(x.clone()))
                    .collect(),
            ),
            plutus_v3_script: NonEmptySet::from_vec(
                resolution
                    .plutus_v3
                    .iter()
                    .map(|x| PlutusScript::<3>(x.clone()))
                    .collect(),
            ),
        }
    }
}
