//! Declarative transaction assembly
//!
//! A [TxBuilder] records caller intents without performing any I/O. All
//! setters are infallible by design: an invalid argument stores the first
//! failure and every later call keeps accumulating for diagnostics; the
//! final [TxBuilder::build](crate::TxBuilder::build) call surfaces that
//! first error. This keeps long fluent chains usable without sprinkling
//! `?` after every configuration step.

use vesta_addresses::{idents, Address, ShelleyPaymentPart, StakeAddress};
use vesta_crypto::hash::Hash;
use vesta_primitives::{
    Anchor, AssetName, Bytes, CborWrap, ComputeHash, Constitution, DRep, DatumOption, GovAction,
    GovActionId, Metadatum, NativeScript, NetworkId, PlutusData, PlutusScript, PolicyId,
    PostAlonzoTransactionOutput, ProtocolParamUpdate, ScriptHash, ScriptRef, StakeCredential,
    TransactionOutput, Vote, Voter, VotingProcedure,
};

use crate::provider::Utxo;
use crate::value::{MintAssets, Value};
use crate::{NetworkParams, TxBuilderError};

/// A script in any of the supported languages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Script {
    Native(NativeScript),
    PlutusV1(Bytes),
    PlutusV2(Bytes),
    PlutusV3(Bytes),
}

impl Script {
    pub fn hash(&self) -> ScriptHash {
        match self {
            Script::Native(x) => x.compute_hash(),
            Script::PlutusV1(x) => PlutusScript::<1>(x.clone()).compute_hash(),
            Script::PlutusV2(x) => PlutusScript::<2>(x.clone()).compute_hash(),
            Script::PlutusV3(x) => PlutusScript::<3>(x.clone()).compute_hash(),
        }
    }

    pub fn is_plutus(&self) -> bool {
        !matches!(self, Script::Native(_))
    }

    pub fn to_script_ref(&self) -> ScriptRef {
        match self {
            Script::Native(x) => ScriptRef::NativeScript(x.clone()),
            Script::PlutusV1(x) => ScriptRef::PlutusV1Script(PlutusScript(x.clone())),
            Script::PlutusV2(x) => ScriptRef::PlutusV2Script(PlutusScript(x.clone())),
            Script::PlutusV3(x) => ScriptRef::PlutusV3Script(PlutusScript(x.clone())),
        }
    }

    pub fn from_script_ref(script_ref: &ScriptRef) -> Script {
        match script_ref {
            ScriptRef::NativeScript(x) => Script::Native(x.clone()),
            ScriptRef::PlutusV1Script(x) => Script::PlutusV1(x.0.clone()),
            ScriptRef::PlutusV2Script(x) => Script::PlutusV2(x.0.clone()),
            ScriptRef::PlutusV3Script(x) => Script::PlutusV3(x.0.clone()),
        }
    }
}

/// A transaction output under construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub address: Address,
    pub value: Value,
    pub datum: Option<DatumOption>,
    pub script: Option<Script>,
}

impl Output {
    pub fn new(address: Address, lovelace: u64) -> Self {
        Self {
            address,
            value: Value::lovelace(lovelace),
            datum: None,
            script: None,
        }
    }

    pub fn with_value(address: Address, value: Value) -> Self {
        Self {
            address,
            value,
            datum: None,
            script: None,
        }
    }

    pub fn add_asset(
        mut self,
        policy: PolicyId,
        name: Vec<u8>,
        amount: u64,
    ) -> Result<Self, TxBuilderError> {
        if name.len() > 32 {
            return Err(TxBuilderError::AssetNameTooLong);
        }

        self.value = self.value.add_asset(policy, AssetName::from(name), amount);

        Ok(self)
    }

    pub fn set_inline_datum(mut self, data: PlutusData) -> Self {
        self.datum = Some(DatumOption::Data(CborWrap(data)));
        self
    }

    pub fn set_datum_hash(mut self, hash: Hash<32>) -> Self {
        self.datum = Some(DatumOption::Hash(hash));
        self
    }

    pub fn set_inline_script(mut self, script: Script) -> Self {
        self.script = Some(script);
        self
    }

    pub(crate) fn build(&self) -> TransactionOutput {
        TransactionOutput::PostAlonzo(PostAlonzoTransactionOutput {
            address: Bytes::from(self.address.to_vec()),
            value: self.value.clone().into_wire(),
            datum_option: self.datum.clone(),
            script_ref: self.script.as_ref().map(|s| CborWrap(s.to_script_ref())),
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) enum CertificateIntent {
    Explicit(vesta_primitives::Certificate),
    RegisterStake(StakeCredential),
    DeregisterStake(StakeCredential),
    DelegateStake(StakeCredential, Hash<28>),
    RegisterDRep(StakeCredential, Option<Anchor>),
    DeregisterDRep(StakeCredential),
    UpdateDRep(StakeCredential, Option<Anchor>),
    DelegateVote(StakeCredential, DRep),
}

#[derive(Debug, Clone)]
pub(crate) struct InputBinding {
    pub utxo: Utxo,
    pub redeemer: Option<PlutusData>,
    pub datum: Option<PlutusData>,
}

#[derive(Debug, Clone)]
pub(crate) struct WithdrawalIntent {
    pub account: StakeAddress,
    pub amount: u64,
    pub redeemer: Option<PlutusData>,
}

#[derive(Debug, Clone)]
pub(crate) struct VoteIntent {
    pub voter: Voter,
    pub action: GovActionId,
    pub procedure: VotingProcedure,
    pub redeemer: Option<PlutusData>,
}

#[derive(Debug, Clone)]
pub(crate) struct ProposalIntent {
    pub action: GovAction,
    pub reward_account: StakeAddress,
    pub anchor: Anchor,
}

/// Declarative builder for a single Conway-era transaction
pub struct TxBuilder {
    pub(crate) network: NetworkParams,
    pub(crate) utxos: Vec<Utxo>,
    pub(crate) change_address: Option<Address>,
    pub(crate) collateral_utxos: Vec<Utxo>,
    pub(crate) collateral_change_address: Option<Address>,
    pub(crate) inputs: Vec<InputBinding>,
    pub(crate) reference_inputs: Vec<Utxo>,
    pub(crate) outputs: Vec<Output>,
    pub(crate) mint: MintAssets,
    pub(crate) mint_redeemers: Vec<(PolicyId, PlutusData)>,
    pub(crate) certificates: Vec<(CertificateIntent, Option<PlutusData>)>,
    pub(crate) withdrawals: Vec<WithdrawalIntent>,
    pub(crate) proposals: Vec<ProposalIntent>,
    pub(crate) votes: Vec<VoteIntent>,
    pub(crate) scripts: Vec<Script>,
    pub(crate) datums: Vec<PlutusData>,
    pub(crate) required_signers: Vec<Hash<28>>,
    pub(crate) metadata: Vec<(u64, Metadatum)>,
    pub(crate) aux_native_scripts: Vec<NativeScript>,
    pub(crate) valid_from_slot: Option<u64>,
    pub(crate) invalid_after_slot: Option<u64>,
    pub(crate) network_id: Option<NetworkId>,
    pub(crate) treasury_value: Option<u64>,
    pub(crate) donation: Option<u64>,
    pub(crate) error: Option<TxBuilderError>,
}

impl TxBuilder {
    pub fn new(network: NetworkParams) -> Self {
        Self {
            network,
            utxos: vec![],
            change_address: None,
            collateral_utxos: vec![],
            collateral_change_address: None,
            inputs: vec![],
            reference_inputs: vec![],
            outputs: vec![],
            mint: MintAssets::new(),
            mint_redeemers: vec![],
            certificates: vec![],
            withdrawals: vec![],
            proposals: vec![],
            votes: vec![],
            scripts: vec![],
            datums: vec![],
            required_signers: vec![],
            metadata: vec![],
            aux_native_scripts: vec![],
            valid_from_slot: None,
            invalid_after_slot: None,
            network_id: None,
            treasury_value: None,
            donation: None,
            error: None,
        }
    }

    /// The first deferred failure, if any setter rejected its arguments
    pub fn last_error(&self) -> Option<&TxBuilderError> {
        self.error.as_ref()
    }

    fn fail(mut self, error: TxBuilderError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }

        self
    }

    /// Replace the candidate pool used for balancing
    pub fn set_utxos(mut self, utxos: Vec<Utxo>) -> Self {
        self.utxos = utxos;
        self
    }

    /// Change outputs produced by balancing go to this address
    pub fn set_change_address(mut self, address: Address) -> Self {
        if matches!(address, Address::Byron(_)) {
            return self.fail(TxBuilderError::UnsupportedChangeAddress);
        }

        self.change_address = Some(address);
        self
    }

    pub fn set_change_address_ex(self, address: &str) -> Self {
        match Address::from_bech32(address) {
            Ok(x) => self.set_change_address(x),
            Err(_) => self.fail(TxBuilderError::MalformedAddress(address.into())),
        }
    }

    /// Candidate pool for collateral; only consulted when scripts are
    /// present
    pub fn set_collateral_utxos(mut self, utxos: Vec<Utxo>) -> Self {
        self.collateral_utxos = utxos;
        self
    }

    pub fn set_collateral_change_address(mut self, address: Address) -> Self {
        self.collateral_change_address = Some(address);
        self
    }

    /// Sets the last valid slot (body key 3)
    pub fn set_invalid_after(mut self, slot: u64) -> Self {
        self.invalid_after_slot = Some(slot);
        self
    }

    /// Sets the last valid moment as a posix timestamp in seconds
    pub fn set_invalid_after_ex(self, unix_seconds: u64) -> Self {
        match self.network.timestamp_to_slot(unix_seconds) {
            Some(slot) => self.set_invalid_after(slot),
            None => self.fail(TxBuilderError::InvalidTimestamp),
        }
    }

    /// Sets the first valid slot (body key 8)
    pub fn set_valid_from(mut self, slot: u64) -> Self {
        self.valid_from_slot = Some(slot);
        self
    }

    pub fn set_valid_from_ex(self, unix_seconds: u64) -> Self {
        match self.network.timestamp_to_slot(unix_seconds) {
            Some(slot) => self.set_valid_from(slot),
            None => self.fail(TxBuilderError::InvalidTimestamp),
        }
    }

    /// Spend a specific UTxO. Script-guarded inputs carry their redeemer
    /// and, when the output holds a datum hash, the matching datum.
    pub fn add_input(
        mut self,
        utxo: Utxo,
        redeemer: Option<PlutusData>,
        datum: Option<PlutusData>,
    ) -> Self {
        self.inputs.push(InputBinding {
            utxo,
            redeemer,
            datum,
        });

        self
    }

    /// Reference a UTxO without spending it; scripts reachable through a
    /// reference input need no witness entry
    pub fn add_reference_input(mut self, utxo: Utxo) -> Self {
        self.reference_inputs.push(utxo);
        self
    }

    pub fn add_output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Append a plain payment output
    pub fn send_lovelace(self, address: Address, coin: u64) -> Self {
        let output = Output::new(address, coin);
        self.add_output(output)
    }

    pub fn send_lovelace_ex(self, address: &str, coin: u64) -> Self {
        match address.parse::<Address>() {
            Ok(x) => self.send_lovelace(x, coin),
            Err(_) => self.fail(TxBuilderError::MalformedAddress(address.into())),
        }
    }

    /// Append an output carrying a full multi-asset value
    pub fn send_value(self, address: Address, value: Value) -> Self {
        let output = Output::with_value(address, value);
        self.add_output(output)
    }

    /// Lock funds at a script address, optionally binding a datum
    pub fn lock_lovelace(self, address: Address, coin: u64, datum: Option<PlutusData>) -> Self {
        let mut output = Output::new(address, coin);

        if let Some(data) = datum {
            output = output.set_inline_datum(data);
        }

        self.add_output(output)
    }

    /// Add to the mint field; duplicate (policy, name) pairs aggregate by
    /// sum and a policy's redeemer is stored at most once
    pub fn mint_token(
        mut self,
        policy: PolicyId,
        name: Vec<u8>,
        quantity: i64,
        redeemer: Option<PlutusData>,
    ) -> Self {
        if name.len() > 32 {
            return self.fail(TxBuilderError::AssetNameTooLong);
        }

        self.mint.add(policy, AssetName::from(name), quantity);

        if let Some(data) = redeemer {
            if !self.mint_redeemers.iter().any(|(p, _)| p == &policy) {
                self.mint_redeemers.push((policy, data));
            }
        }

        self
    }

    /// Register a script for witness resolution at build time
    pub fn add_script(mut self, script: Script) -> Self {
        self.scripts.push(script);
        self
    }

    /// Supply a datum by value so hash-locked inputs can be spent
    pub fn add_datum(mut self, datum: PlutusData) -> Self {
        self.datums.push(datum);
        self
    }

    /// Force an extra key hash into the required-signer set
    pub fn require_signer(mut self, signer: Hash<28>) -> Self {
        self.required_signers.push(signer);
        self
    }

    fn stake_credential(address: &str) -> Result<StakeCredential, TxBuilderError> {
        let parsed = address
            .parse::<Address>()
            .map_err(|_| TxBuilderError::MalformedAddress(address.into()))?;

        match parsed {
            Address::Stake(x) => {
                let hash = *x.payload().as_hash();

                if x.payload().is_script() {
                    Ok(StakeCredential::ScriptHash(hash))
                } else {
                    Ok(StakeCredential::AddrKeyhash(hash))
                }
            }
            _ => Err(TxBuilderError::MalformedAddress(address.into())),
        }
    }

    fn stake_address(address: &str) -> Result<StakeAddress, TxBuilderError> {
        match address.parse::<Address>() {
            Ok(Address::Stake(x)) => Ok(x),
            _ => Err(TxBuilderError::MalformedAddress(address.into())),
        }
    }

    fn push_certificate(
        mut self,
        intent: CertificateIntent,
        redeemer: Option<PlutusData>,
    ) -> Self {
        self.certificates.push((intent, redeemer));
        self
    }

    /// Append a fully formed certificate, e.g. a pool registration
    pub fn add_certificate(
        self,
        certificate: vesta_primitives::Certificate,
        redeemer: Option<PlutusData>,
    ) -> Self {
        self.push_certificate(CertificateIntent::Explicit(certificate), redeemer)
    }

    /// Register the stake credential behind a bech32 reward address
    pub fn register_reward_address_ex(self, address: &str) -> Self {
        match Self::stake_credential(address) {
            Ok(cred) => self.push_certificate(CertificateIntent::RegisterStake(cred), None),
            Err(e) => self.fail(e),
        }
    }

    pub fn deregister_reward_address_ex(self, address: &str, redeemer: Option<PlutusData>) -> Self {
        match Self::stake_credential(address) {
            Ok(cred) => self.push_certificate(CertificateIntent::DeregisterStake(cred), redeemer),
            Err(e) => self.fail(e),
        }
    }

    /// Delegate the stake behind a reward address to a bech32 pool id
    pub fn delegate_stake_ex(
        self,
        address: &str,
        pool: &str,
        redeemer: Option<PlutusData>,
    ) -> Self {
        let cred = match Self::stake_credential(address) {
            Ok(x) => x,
            Err(e) => return self.fail(e),
        };

        match idents::PoolId::from_bech32(pool) {
            Ok(pool) => {
                self.push_certificate(CertificateIntent::DelegateStake(cred, pool.0), redeemer)
            }
            Err(_) => self.fail(TxBuilderError::MalformedAddress(pool.into())),
        }
    }

    /// Register a DRep from its bech32 id
    pub fn register_drep_ex(self, drep: &str, anchor: Option<Anchor>) -> Self {
        match idents::DRepId::from_bech32(drep) {
            Ok(id) => {
                let cred = if id.is_script() {
                    StakeCredential::ScriptHash(*id.as_hash())
                } else {
                    StakeCredential::AddrKeyhash(*id.as_hash())
                };

                self.push_certificate(CertificateIntent::RegisterDRep(cred, anchor), None)
            }
            Err(_) => self.fail(TxBuilderError::MalformedAddress(drep.into())),
        }
    }

    pub fn deregister_drep_ex(self, drep: &str, redeemer: Option<PlutusData>) -> Self {
        match idents::DRepId::from_bech32(drep) {
            Ok(id) => {
                let cred = if id.is_script() {
                    StakeCredential::ScriptHash(*id.as_hash())
                } else {
                    StakeCredential::AddrKeyhash(*id.as_hash())
                };

                self.push_certificate(CertificateIntent::DeregisterDRep(cred), redeemer)
            }
            Err(_) => self.fail(TxBuilderError::MalformedAddress(drep.into())),
        }
    }

    pub fn update_drep_ex(self, drep: &str, anchor: Option<Anchor>) -> Self {
        match idents::DRepId::from_bech32(drep) {
            Ok(id) => {
                let cred = if id.is_script() {
                    StakeCredential::ScriptHash(*id.as_hash())
                } else {
                    StakeCredential::AddrKeyhash(*id.as_hash())
                };

                self.push_certificate(CertificateIntent::UpdateDRep(cred, anchor), None)
            }
            Err(_) => self.fail(TxBuilderError::MalformedAddress(drep.into())),
        }
    }

    /// Delegate voting power to a DRep (`drep1...`/`drep_script1...`), or
    /// to the always-abstain / no-confidence pseudo-DReps via
    /// [TxBuilder::delegate_voting_power]
    pub fn delegate_voting_power_ex(
        self,
        address: &str,
        drep: &str,
        redeemer: Option<PlutusData>,
    ) -> Self {
        let cred = match Self::stake_credential(address) {
            Ok(x) => x,
            Err(e) => return self.fail(e),
        };

        match idents::DRepId::from_bech32(drep) {
            Ok(id) => {
                // dispatch on the parsed credential kind, key and script
                // hashes are distinct DRep variants on the wire
                let target = if id.is_script() {
                    DRep::Script(*id.as_hash())
                } else {
                    DRep::Key(*id.as_hash())
                };

                self.push_certificate(CertificateIntent::DelegateVote(cred, target), redeemer)
            }
            Err(_) => self.fail(TxBuilderError::MalformedAddress(drep.into())),
        }
    }

    pub fn delegate_voting_power(
        self,
        address: &str,
        drep: DRep,
        redeemer: Option<PlutusData>,
    ) -> Self {
        match Self::stake_credential(address) {
            Ok(cred) => {
                self.push_certificate(CertificateIntent::DelegateVote(cred, drep), redeemer)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Withdraw rewards accumulated at a bech32 reward address
    pub fn withdraw_rewards_ex(
        mut self,
        address: &str,
        amount: u64,
        redeemer: Option<PlutusData>,
    ) -> Self {
        match Self::stake_address(address) {
            Ok(account) => {
                self.withdrawals.push(WithdrawalIntent {
                    account,
                    amount,
                    redeemer,
                });

                self
            }
            Err(e) => self.fail(e),
        }
    }

    fn push_proposal(mut self, action: GovAction, reward_address: &str, anchor: Anchor) -> Self {
        match Self::stake_address(reward_address) {
            Ok(account) => {
                self.proposals.push(ProposalIntent {
                    action,
                    reward_account: account,
                    anchor,
                });

                self
            }
            Err(e) => self.fail(e),
        }
    }

    /// Propose treasury withdrawals to the given reward addresses
    pub fn propose_treasury_withdrawals_ex(
        self,
        withdrawals: &[(&str, u64)],
        reward_address: &str,
        anchor: Anchor,
    ) -> Self {
        let mut entries = Vec::with_capacity(withdrawals.len());

        for (address, amount) in withdrawals {
            match Self::stake_address(address) {
                Ok(account) => entries.push((Bytes::from(account.to_vec()), *amount)),
                Err(e) => return self.fail(e),
            }
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let action = GovAction::TreasuryWithdrawals(entries.into(), None);
        self.push_proposal(action, reward_address, anchor)
    }

    pub fn propose_parameter_change(
        self,
        update: ProtocolParamUpdate,
        previous: Option<GovActionId>,
        guardrail_script: Option<ScriptHash>,
        reward_address: &str,
        anchor: Anchor,
    ) -> Self {
        let action = GovAction::ParameterChange(previous, Box::new(update), guardrail_script);
        self.push_proposal(action, reward_address, anchor)
    }

    pub fn propose_hardfork(
        self,
        version: (u64, u64),
        previous: Option<GovActionId>,
        reward_address: &str,
        anchor: Anchor,
    ) -> Self {
        let action = GovAction::HardForkInitiation(previous, version);
        self.push_proposal(action, reward_address, anchor)
    }

    pub fn propose_no_confidence(
        self,
        previous: Option<GovActionId>,
        reward_address: &str,
        anchor: Anchor,
    ) -> Self {
        self.push_proposal(GovAction::NoConfidence(previous), reward_address, anchor)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn propose_update_committee(
        self,
        removed: Vec<StakeCredential>,
        added: Vec<(StakeCredential, u64)>,
        threshold: vesta_primitives::UnitInterval,
        previous: Option<GovActionId>,
        reward_address: &str,
        anchor: Anchor,
    ) -> Self {
        let action = GovAction::UpdateCommittee(
            previous,
            removed.into(),
            added.into(),
            threshold,
        );

        self.push_proposal(action, reward_address, anchor)
    }

    pub fn propose_new_constitution(
        self,
        constitution: Constitution,
        previous: Option<GovActionId>,
        reward_address: &str,
        anchor: Anchor,
    ) -> Self {
        let action = GovAction::NewConstitution(previous, constitution);
        self.push_proposal(action, reward_address, anchor)
    }

    pub fn propose_info(self, reward_address: &str, anchor: Anchor) -> Self {
        self.push_proposal(GovAction::Information, reward_address, anchor)
    }

    /// Cast a vote on a governance action
    pub fn vote(
        mut self,
        voter: Voter,
        action: GovActionId,
        vote: Vote,
        anchor: Option<Anchor>,
        redeemer: Option<PlutusData>,
    ) -> Self {
        self.votes.push(VoteIntent {
            voter,
            action,
            procedure: VotingProcedure { vote, anchor },
            redeemer,
        });

        self
    }

    /// Cast a DRep vote using bech32 identifiers
    pub fn vote_ex(
        self,
        drep: &str,
        gov_action: &str,
        vote: Vote,
        anchor: Option<Anchor>,
        redeemer: Option<PlutusData>,
    ) -> Self {
        let voter = match idents::DRepId::from_bech32(drep) {
            Ok(id) if id.is_script() => Voter::DRepScript(*id.as_hash()),
            Ok(id) => Voter::DRepKey(*id.as_hash()),
            Err(_) => return self.fail(TxBuilderError::MalformedAddress(drep.into())),
        };

        match idents::GovActionRef::from_bech32(gov_action) {
            Ok(r) => {
                let action = GovActionId {
                    transaction_id: r.transaction_id,
                    action_index: r.action_index,
                };

                self.vote(voter, action, vote, anchor, redeemer)
            }
            Err(_) => self.fail(TxBuilderError::MalformedAddress(gov_action.into())),
        }
    }

    /// Attach a metadata entry from a JSON document; the auxiliary-data
    /// hash lands in body key 7 at build time
    pub fn set_metadata_ex(mut self, label: u64, json: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(json) {
            Ok(x) => x,
            Err(e) => return self.fail(TxBuilderError::MalformedMetadata(e.to_string())),
        };

        match vesta_primitives::metadatum_from_json(&value) {
            Ok(metadatum) => {
                self.metadata.retain(|(l, _)| *l != label);
                self.metadata.push((label, metadatum));
                self
            }
            Err(e) => self.fail(TxBuilderError::MalformedMetadata(e.to_string())),
        }
    }

    /// Attach an already-built metadata entry
    pub fn set_metadata(mut self, label: u64, metadatum: Metadatum) -> Self {
        self.metadata.retain(|(l, _)| *l != label);
        self.metadata.push((label, metadatum));
        self
    }

    /// Carry a native script inside auxiliary data
    pub fn add_auxiliary_script(mut self, script: NativeScript) -> Self {
        self.aux_native_scripts.push(script);
        self
    }

    pub fn set_network_id(mut self, id: u8) -> Self {
        match NetworkId::try_from(id) {
            Ok(x) => {
                self.network_id = Some(x);
                self
            }
            Err(()) => self.fail(TxBuilderError::InvalidNetworkId),
        }
    }

    /// Declare the current treasury value (body key 21)
    pub fn set_current_treasury_value(mut self, coin: u64) -> Self {
        self.treasury_value = Some(coin);
        self
    }

    /// Donate to the treasury (body key 22)
    pub fn donate(mut self, coin: u64) -> Self {
        self.donation = Some(coin);
        self
    }

    pub(crate) fn payment_script_hash(utxo: &Utxo) -> Option<ScriptHash> {
        match utxo.address()? {
            Address::Shelley(x) => match x.payment() {
                ShelleyPaymentPart::Script(hash) => Some(*hash),
                ShelleyPaymentPart::Key(_) => None,
            },
            _ => None,
        }
    }

    pub(crate) fn payment_key_hash(utxo: &Utxo) -> Option<Hash<28>> {
        match utxo.address()? {
            Address::Shelley(x) => match x.payment() {
                ShelleyPaymentPart::Key(hash) => Some(*hash),
                ShelleyPaymentPart::Script(_) => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHANGE: &str = "addr_test1qqnqfr70emn3kyywffxja44znvdw0y4aeyh0vdc3s3rky48vlp50u6nrq5s7k6h89uqrjnmr538y6e50crvz6jdv3vqqxah5fk";

    #[test]
    fn first_failure_sticks() {
        let builder = TxBuilder::new(NetworkParams::preprod())
            .set_change_address_ex("definitely-not-an-address")
            .send_lovelace_ex("also-not-an-address", 5);

        match builder.last_error() {
            Some(TxBuilderError::MalformedAddress(s)) => {
                assert_eq!(s, "definitely-not-an-address")
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn valid_setters_leave_no_error() {
        let builder = TxBuilder::new(NetworkParams::preprod())
            .set_change_address_ex(CHANGE)
            .send_lovelace_ex(CHANGE, 2_000_000)
            .set_invalid_after(1000);

        assert!(builder.last_error().is_none());
        assert_eq!(builder.outputs.len(), 1);
        assert_eq!(builder.invalid_after_slot, Some(1000));
    }

    #[test]
    fn byron_change_address_is_rejected() {
        let byron = "37btjrVyb4KDXBNC4haBVPCrro8AQPHwvCMp3RFhhSVWwfFmZ6wwzSK6JK1hY6wHNmtrpTf1kdbva8TCneM2YsiXT7mrzT21EacHnPpz5YyUdj64na";

        let builder = TxBuilder::new(NetworkParams::mainnet())
            .set_change_address(byron.parse().unwrap());

        assert!(matches!(
            builder.last_error(),
            Some(TxBuilderError::UnsupportedChangeAddress)
        ));
    }

    #[test]
    fn timestamp_conversion_respects_era_start() {
        let builder = TxBuilder::new(NetworkParams::mainnet()).set_invalid_after_ex(10);

        assert!(matches!(
            builder.last_error(),
            Some(TxBuilderError::InvalidTimestamp)
        ));

        let builder = TxBuilder::new(NetworkParams::mainnet()).set_invalid_after_ex(1700000000);
        assert!(builder.last_error().is_none());
        assert!(builder.invalid_after_slot.is_some());
    }

    #[test]
    fn mint_aggregates_duplicates_and_keeps_one_redeemer() {
        let policy = Hash::new([1u8; 28]);
        let rdmr = PlutusData::BigInt(vesta_primitives::BigInt::from(0));
        let rdmr2 = PlutusData::BigInt(vesta_primitives::BigInt::from(1));

        let builder = TxBuilder::new(NetworkParams::preprod())
            .mint_token(policy, b"tok".to_vec(), 5, Some(rdmr.clone()))
            .mint_token(policy, b"tok".to_vec(), 3, Some(rdmr2));

        let quantities: Vec<i64> = builder.mint.entries().map(|(_, _, q)| q).collect();
        assert_eq!(quantities, vec![8]);

        assert_eq!(builder.mint_redeemers.len(), 1);
        assert_eq!(builder.mint_redeemers[0].1, rdmr);
    }

    #[test]
    fn long_asset_names_are_deferred_errors() {
        let builder = TxBuilder::new(NetworkParams::preprod()).mint_token(
            Hash::new([1u8; 28]),
            vec![0u8; 33],
            1,
            None,
        );

        assert!(matches!(
            builder.last_error(),
            Some(TxBuilderError::AssetNameTooLong)
        ));
    }

    #[test]
    fn output_assets_and_datum() {
        let address: Address = CHANGE.parse().unwrap();

        let output = Output::new(address, 2_000_000)
            .add_asset(Hash::new([1u8; 28]), b"tok".to_vec(), 5)
            .unwrap()
            .set_datum_hash(Hash::new([9u8; 32]));

        let name = AssetName::from(b"tok".to_vec());
        assert_eq!(output.value.quantity_of(&Hash::new([1u8; 28]), &name), 5);
        assert!(matches!(output.datum, Some(DatumOption::Hash(_))));

        let wire = output.build();
        assert!(matches!(wire.datum_hash(), Some(_)));

        let err = Output::new(CHANGE.parse().unwrap(), 1)
            .add_asset(Hash::new([1u8; 28]), vec![0u8; 33], 1)
            .unwrap_err();

        assert!(matches!(err, TxBuilderError::AssetNameTooLong));
    }

    #[test]
    fn metadata_replaces_by_label() {
        let builder = TxBuilder::new(NetworkParams::preprod())
            .set_metadata_ex(674, r#"{"msg": "one"}"#)
            .set_metadata_ex(674, r#"{"msg": "two"}"#);

        assert!(builder.last_error().is_none());
        assert_eq!(builder.metadata.len(), 1);
    }

    #[test]
    fn bad_metadata_json_is_a_deferred_error() {
        let builder = TxBuilder::new(NetworkParams::preprod()).set_metadata_ex(674, "{nope");

        assert!(matches!(
            builder.last_error(),
            Some(TxBuilderError::MalformedMetadata(_))
        ));
    }
}
