//! Key-derivation and custody flows exercised end to end

use vesta_addresses::{Address, Network, ShelleyAddress, ShelleyDelegationPart, ShelleyPaymentPart};
use vesta_crypto::hash::Hasher;
use vesta_crypto::memsec::SecretBytes;
use vesta_wallet::hd::{Bip32PrivateKey, DerivationPath};
use vesta_wallet::keystore::{KeyHandler, PassphraseSource, SoftwareKeyHandler};

const MNEMONIC: &str = "antenna whale clutch cushion narrow chronic matrix alarm raise much stove beach mimic daughter review build dinner twelve orbit soap decorate bachelor athlete close";

const WALLET_ADDRESS: &str = "addr_test1qqnqfr70emn3kyywffxja44znvdw0y4aeyh0vdc3s3rky48vlp50u6nrq5s7k6h89uqrjnmr538y6e50crvz6jdv3vqqxah5fk";

fn passphrase() -> Box<dyn PassphraseSource> {
    Box::new(|| Ok(SecretBytes::from("opened with a passphrase")))
}

#[test]
fn derivation_matches_known_wallet_address() {
    let root = Bip32PrivateKey::from_bip39_mnemonic(MNEMONIC, "").unwrap();
    let account = root.derive_account(0);

    let payment = account.derive(0).derive(0).to_public().to_ed25519_pubkey();
    let staking = account.derive(2).derive(0).to_public().to_ed25519_pubkey();

    let derived: Address = ShelleyAddress::new(
        Network::Testnet,
        ShelleyPaymentPart::key_hash(Hasher::<224>::hash(payment.as_ref())),
        ShelleyDelegationPart::key_hash(Hasher::<224>::hash(staking.as_ref())),
    )
    .into();

    assert_eq!(derived.to_bech32().unwrap(), WALLET_ADDRESS);
}

#[test]
fn wallet_address_credentials_match_derived_keys() {
    let parsed = match WALLET_ADDRESS.parse::<Address>().unwrap() {
        Address::Shelley(x) => x,
        _ => panic!("expected a base address"),
    };

    assert_eq!(parsed.network(), Network::Testnet);

    let root = Bip32PrivateKey::from_bip39_mnemonic(MNEMONIC, "").unwrap();
    let payment = root
        .derive_account(0)
        .derive(0)
        .derive(0)
        .to_public()
        .to_ed25519_pubkey();

    match parsed.payment() {
        ShelleyPaymentPart::Key(hash) => {
            assert_eq!(hash, &Hasher::<224>::hash(payment.as_ref()));
        }
        _ => panic!("expected a key-hash payment part"),
    }
}

#[test]
fn handler_signs_the_same_as_the_raw_key() {
    let handler = SoftwareKeyHandler::from_mnemonic(MNEMONIC, "", passphrase()).unwrap();

    let message = [0x42u8; 32];
    let path = DerivationPath::payment(0, 0);

    let witnesses = handler.sign(&message, &[path]).unwrap();

    let raw_key = Bip32PrivateKey::from_bip39_mnemonic(MNEMONIC, "")
        .unwrap()
        .derive_for_path(path)
        .to_ed25519_private_key();

    assert_eq!(witnesses.len(), 1);
    assert_eq!(witnesses[0].0, raw_key.public_key());
    assert!(witnesses[0].0.verify(message, &witnesses[0].1));
}

#[test]
fn account_public_key_allows_watch_only_derivation() {
    let handler = SoftwareKeyHandler::from_mnemonic(MNEMONIC, "", passphrase()).unwrap();

    let account_xpub = handler.account_public_key(0).unwrap();

    // soft-deriving payment 0/0 from the account xpub must agree with the
    // full private derivation
    let watch_only = account_xpub
        .derive(0)
        .unwrap()
        .derive(0)
        .unwrap()
        .to_ed25519_pubkey();

    let signing = Bip32PrivateKey::from_bip39_mnemonic(MNEMONIC, "")
        .unwrap()
        .derive_for_path(DerivationPath::payment(0, 0))
        .to_ed25519_private_key()
        .public_key();

    assert_eq!(watch_only, signing);
}
