use std::time::Duration;

use vesta_addresses::{Address, Network, ShelleyAddress, ShelleyDelegationPart, ShelleyPaymentPart};
use vesta_codec::minicbor;
use vesta_crypto::hash::{Hash, Hasher};
use vesta_primitives::{
    ComputeHash, ExUnits, PlutusData, PostAlonzoTransactionOutput, RedeemersKey, TransactionInput,
    TransactionOutput, Value as WireValue,
};
use vesta_txbuilder::{
    BuiltTransaction, NetworkParams, ProtocolParams, Provider, ProviderError, TxBuilder,
    TxBuilderError, Utxo, Value,
};
use vesta_wallet::hd::Bip32PrivateKey;

const MNEMONIC: &str = "antenna whale clutch cushion narrow chronic matrix alarm raise much stove beach mimic daughter review build dinner twelve orbit soap decorate bachelor athlete close";

struct StubProvider {
    utxos: Vec<Utxo>,
}

impl Provider for StubProvider {
    fn parameters(&self) -> Result<ProtocolParams, ProviderError> {
        Ok(ProtocolParams {
            min_fee_a: 44,
            min_fee_b: 155_381,
            coins_per_utxo_byte: 4310,
            ..Default::default()
        })
    }

    fn unspent_outputs(&self, address: &Address) -> Result<Vec<Utxo>, ProviderError> {
        let bytes = address.to_vec();

        Ok(self
            .utxos
            .iter()
            .filter(|x| x.output.address().as_slice() == bytes.as_slice())
            .cloned()
            .collect())
    }

    fn resolve_inputs(&self, inputs: &[TransactionInput]) -> Result<Vec<Utxo>, ProviderError> {
        Ok(self
            .utxos
            .iter()
            .filter(|x| inputs.contains(&x.input))
            .cloned()
            .collect())
    }

    fn rewards_available(&self, _reward_account: &[u8]) -> Result<u64, ProviderError> {
        Ok(0)
    }

    fn datum(&self, hash: Hash<32>) -> Result<PlutusData, ProviderError> {
        Err(ProviderError::NotFound(hash.to_string()))
    }

    fn submit(&self, tx: &BuiltTransaction) -> Result<Hash<32>, ProviderError> {
        Ok(tx.tx_hash)
    }

    fn confirm(&self, _tx_id: Hash<32>, _timeout: Duration) -> Result<bool, ProviderError> {
        Ok(true)
    }

    fn evaluate(
        &self,
        _tx: &BuiltTransaction,
        _additional_utxos: &[Utxo],
    ) -> Result<Vec<(RedeemersKey, ExUnits)>, ProviderError> {
        Ok(vec![])
    }
}

fn wallet_root() -> Bip32PrivateKey {
    Bip32PrivateKey::from_bip39_mnemonic(MNEMONIC, "").unwrap()
}

fn base_address(account: u32, index: u32) -> Address {
    let root = wallet_root().derive_account(account);

    let payment = root.derive(0).derive(index).to_public().to_ed25519_pubkey();
    let staking = root.derive(2).derive(0).to_public().to_ed25519_pubkey();

    ShelleyAddress::new(
        Network::Testnet,
        ShelleyPaymentPart::key_hash(Hasher::<224>::hash(payment.as_ref())),
        ShelleyDelegationPart::key_hash(Hasher::<224>::hash(staking.as_ref())),
    )
    .into()
}

fn wallet_utxo(coin: u64) -> Utxo {
    Utxo::new(
        TransactionInput {
            transaction_id: Hash::new([9u8; 32]),
            index: 0,
        },
        TransactionOutput::PostAlonzo(PostAlonzoTransactionOutput {
            address: base_address(0, 0).to_vec().into(),
            value: WireValue::Coin(coin),
            datum_option: None,
            script_ref: None,
        }),
    )
}

#[test]
fn send_lovelace_end_to_end() {
    let provider = StubProvider {
        utxos: vec![wallet_utxo(10_000_000)],
    };

    let sender = base_address(0, 0);
    let receiver = base_address(0, 1);

    let built = TxBuilder::new(NetworkParams::preprod())
        .set_utxos(provider.unspent_outputs(&sender).unwrap())
        .set_change_address(sender.clone())
        .send_lovelace(receiver.clone(), 2_000_000)
        .build(&provider)
        .unwrap();

    let tx = built.tx().unwrap();
    let body = &tx.transaction_body;

    // payment output plus change output
    assert_eq!(body.outputs.len(), 2);
    assert_eq!(
        body.outputs[0].address().as_slice(),
        receiver.to_vec().as_slice()
    );
    assert_eq!(
        Value::from_wire(body.outputs[0].value()),
        Value::lovelace(2_000_000)
    );

    // the fee covers the final size at mainnet coefficients
    let size = built.tx_bytes.len() as u64;
    assert!(body.fee >= 155_381);
    assert!(body.fee >= 155_381 + 44 * size);

    // full balance: input value = outputs + fee
    let change = Value::from_wire(body.outputs[1].value());
    assert_eq!(change.coin + 2_000_000 + body.fee, 10_000_000);

    // transaction id commits to the body bytes
    assert_eq!(built.tx_hash, body.compute_hash());

    // no witnesses yet; the placeholder used for sizing is stripped
    assert!(tx.transaction_witness_set.vkeywitness.is_none());
}

#[test]
fn signing_attaches_exactly_one_matching_witness() {
    let provider = StubProvider {
        utxos: vec![wallet_utxo(10_000_000)],
    };

    let sender = base_address(0, 0);
    let receiver = base_address(0, 1);

    let built = TxBuilder::new(NetworkParams::preprod())
        .set_utxos(provider.utxos.clone())
        .set_change_address(sender)
        .send_lovelace(receiver, 2_000_000)
        .build(&provider)
        .unwrap();

    let key = wallet_root()
        .derive_account(0)
        .derive(0)
        .derive(0)
        .to_ed25519_private_key();

    let expected_pubkey = key.public_key();

    let signed = built.sign(&key).unwrap();

    let tx = signed.tx().unwrap();
    let vkeys = tx.transaction_witness_set.vkeywitness.unwrap();

    assert_eq!(vkeys.len(), 1);
    assert_eq!(vkeys[0].vkey.as_slice(), expected_pubkey.as_ref());

    // the witness verifies against the transaction id
    let signature = vesta_crypto::key::Signature::try_from(vkeys[0].signature.as_slice()).unwrap();
    assert!(expected_pubkey.verify(signed.tx_hash, &signature));

    // re-signing with the same key is idempotent
    let again = signed.clone().sign(&key).unwrap();
    assert_eq!(signed, again);
}

#[test]
fn insufficient_balance_reports_shortfall() {
    let provider = StubProvider {
        utxos: vec![wallet_utxo(1_000_000)],
    };

    let sender = base_address(0, 0);
    let receiver = base_address(0, 1);

    let err = TxBuilder::new(NetworkParams::preprod())
        .set_utxos(provider.utxos.clone())
        .set_change_address(sender)
        .send_lovelace(receiver, 2_000_000)
        .build(&provider)
        .unwrap_err();

    assert!(matches!(err, TxBuilderError::InsufficientBalance(_)));
}

#[test]
fn deferred_error_skips_building() {
    let provider = StubProvider { utxos: vec![] };

    let err = TxBuilder::new(NetworkParams::preprod())
        .send_lovelace_ex("garbage", 1)
        .set_change_address(base_address(0, 0))
        .build(&provider)
        .unwrap_err();

    assert!(matches!(err, TxBuilderError::MalformedAddress(_)));
}

#[test]
fn missing_change_address_fails() {
    let provider = StubProvider {
        utxos: vec![wallet_utxo(10_000_000)],
    };

    let err = TxBuilder::new(NetworkParams::preprod())
        .set_utxos(provider.utxos.clone())
        .send_lovelace(base_address(0, 1), 2_000_000)
        .build(&provider)
        .unwrap_err();

    assert!(matches!(err, TxBuilderError::NoChangeAddress));
}

#[test]
fn metadata_lands_in_auxiliary_data() {
    let provider = StubProvider {
        utxos: vec![wallet_utxo(10_000_000)],
    };

    let sender = base_address(0, 0);

    let built = TxBuilder::new(NetworkParams::preprod())
        .set_utxos(provider.utxos.clone())
        .set_change_address(sender.clone())
        .send_lovelace(sender, 2_000_000)
        .set_metadata_ex(674, r#"{"msg": "hello"}"#)
        .build(&provider)
        .unwrap();

    let tx = built.tx().unwrap();

    let aux = tx.auxiliary_data.as_ref().expect("auxiliary data present");
    assert_eq!(
        tx.transaction_body.auxiliary_data_hash,
        Some(aux.compute_hash())
    );
}

#[test]
fn validity_window_is_encoded() {
    let provider = StubProvider {
        utxos: vec![wallet_utxo(10_000_000)],
    };

    let sender = base_address(0, 0);

    let built = TxBuilder::new(NetworkParams::preprod())
        .set_utxos(provider.utxos.clone())
        .set_change_address(sender.clone())
        .send_lovelace(sender, 2_000_000)
        .set_valid_from(100)
        .set_invalid_after(2000)
        .build(&provider)
        .unwrap();

    let body = built.tx().unwrap().transaction_body;
    assert_eq!(body.validity_interval_start, Some(100));
    assert_eq!(body.ttl, Some(2000));
}

#[test]
fn canonical_input_ordering() {
    let make = |byte: u8, index: u64| {
        Utxo::new(
            TransactionInput {
                transaction_id: Hash::new([byte; 32]),
                index,
            },
            TransactionOutput::PostAlonzo(PostAlonzoTransactionOutput {
                address: base_address(0, 0).to_vec().into(),
                value: WireValue::Coin(3_000_000),
                datum_option: None,
                script_ref: None,
            }),
        )
    };

    let provider = StubProvider {
        utxos: vec![make(7, 1), make(7, 0), make(3, 5)],
    };

    let sender = base_address(0, 0);

    let built = TxBuilder::new(NetworkParams::preprod())
        .set_utxos(provider.utxos.clone())
        .set_change_address(sender.clone())
        .send_lovelace(sender, 7_500_000)
        .build(&provider)
        .unwrap();

    let body = built.tx().unwrap().transaction_body;

    let keys: Vec<(u8, u64)> = body
        .inputs
        .iter()
        .map(|x| (x.transaction_id[0], x.index))
        .collect();

    let mut sorted = keys.clone();
    sorted.sort();

    assert_eq!(keys, sorted);
    assert_eq!(keys.len(), 3);
}

#[test]
fn fee_is_stable_across_rebuilds() {
    let provider = StubProvider {
        utxos: vec![wallet_utxo(10_000_000)],
    };

    let sender = base_address(0, 0);
    let receiver = base_address(0, 1);

    let build = || {
        TxBuilder::new(NetworkParams::preprod())
            .set_utxos(provider.utxos.clone())
            .set_change_address(sender.clone())
            .send_lovelace(receiver.clone(), 2_000_000)
            .build(&provider)
            .unwrap()
    };

    let a = build();
    let b = build();

    // byte-identical output for identical intents
    assert_eq!(a.tx_bytes, b.tx_bytes);
    assert_eq!(a.tx_hash, b.tx_hash);
}

#[test]
fn stake_registration_consumes_deposit() {
    let provider = StubProvider {
        utxos: vec![wallet_utxo(10_000_000)],
    };

    let sender = base_address(0, 0);

    let stake_address = {
        let root = wallet_root().derive_account(0);
        let staking = root.derive(2).derive(0).to_public().to_ed25519_pubkey();

        vesta_addresses::StakeAddress::new(
            Network::Testnet,
            vesta_addresses::StakePayload::Stake(Hasher::<224>::hash(staking.as_ref())),
        )
    };

    let built = TxBuilder::new(NetworkParams::preprod())
        .set_utxos(provider.utxos.clone())
        .set_change_address(sender)
        .register_reward_address_ex(&stake_address.to_bech32().unwrap())
        .build(&provider)
        .unwrap();

    let body = built.tx().unwrap().transaction_body;

    assert_eq!(body.certificates.as_ref().unwrap().len(), 1);

    // input = change + fee + 2 ada key deposit
    let change = Value::from_wire(body.outputs[0].value());
    assert_eq!(change.coin + body.fee + 2_000_000, 10_000_000);
}

#[test]
fn transaction_roundtrips_through_cbor() {
    let provider = StubProvider {
        utxos: vec![wallet_utxo(10_000_000)],
    };

    let sender = base_address(0, 0);

    let built = TxBuilder::new(NetworkParams::preprod())
        .set_utxos(provider.utxos.clone())
        .set_change_address(sender.clone())
        .send_lovelace(sender, 2_000_000)
        .build(&provider)
        .unwrap();

    let tx = built.tx().unwrap();
    let reencoded = minicbor::to_vec(&tx).unwrap();

    assert_eq!(reencoded, built.tx_bytes);
}
