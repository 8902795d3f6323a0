#![allow(dead_code)]

use confidential_staking::{
    AssetClass, ConfidentialVault, DecryptionOracle, EncryptedAmount, EncryptedCompute,
    InMemoryConfidentialToken, MockCoprocessor, Pubkey, Result, VaultConfig,
};

pub type TestVault = ConfidentialVault<MockCoprocessor, InMemoryConfidentialToken>;

pub struct Fixture {
    pub vault: TestVault,
    pub authority: Pubkey,
    pub auditor: Pubkey,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn config() -> VaultConfig {
    VaultConfig {
        vault: Pubkey::new_unique(),
        authority: Pubkey::new_unique(),
        auditor: Some(Pubkey::new_unique()),
        primary_asset: Pubkey::new_unique(),
        secondary_asset: Pubkey::new_unique(),
    }
}

pub fn setup() -> Fixture {
    init_tracing();
    let config = config();
    let authority = config.authority;
    let auditor = config.auditor.expect("auditor configured");
    let primary = InMemoryConfidentialToken::new(config.primary_asset);
    let secondary = InMemoryConfidentialToken::new(config.secondary_asset);

    let vault = ConfidentialVault::initialize(
        config,
        MockCoprocessor::new([7u8; 32]),
        primary,
        secondary,
    )
    .expect("vault initializes");

    Fixture {
        vault,
        authority,
        auditor,
    }
}

/// Faucet mint, outside the vault.
pub fn fund(vault: &mut TestVault, class: AssetClass, account: &Pubkey, value: u64) {
    let (token, fhe) = vault.token_with_coprocessor(class);
    token.mint(fhe, account, value).expect("mint succeeds");
    fhe.end_transaction();
}

/// Approve the vault as operator for the default window.
pub fn approve(vault: &mut TestVault, class: AssetClass, account: &Pubkey) {
    let spender = vault.address();
    let (token, _) = vault.token_with_coprocessor(class);
    token.approve_operator(account, &spender);
}

pub fn stake(
    vault: &mut TestVault,
    class: AssetClass,
    account: &Pubkey,
    value: u64,
) -> Result<EncryptedAmount> {
    let contract = vault.address();
    let (input, proof) = vault
        .coprocessor_mut()
        .encrypt_input(&contract, account, value);
    vault.deposit(account, class, &input, &proof)
}

pub fn unstake(
    vault: &mut TestVault,
    class: AssetClass,
    account: &Pubkey,
    value: u64,
) -> Result<EncryptedAmount> {
    let contract = vault.address();
    let (input, proof) = vault
        .coprocessor_mut()
        .encrypt_input(&contract, account, value);
    vault.withdraw(account, class, &input, &proof)
}

pub fn decrypt(vault: &TestVault, value: EncryptedAmount, requester: &Pubkey) -> u64 {
    vault
        .coprocessor()
        .decrypt(value.handle(), requester)
        .expect("requester holds a grant")
}

pub fn stake_of(vault: &TestVault, class: AssetClass, account: &Pubkey) -> u64 {
    decrypt(vault, vault.get_stake(account, class), account)
}

pub fn total_of(fixture: &Fixture, class: AssetClass) -> u64 {
    decrypt(&fixture.vault, fixture.vault.get_total(class), &fixture.authority)
}

pub fn wallet_of(vault: &TestVault, class: AssetClass, account: &Pubkey) -> u64 {
    let balance = vault.token(class).confidential_balance_of(account);
    decrypt(vault, balance, account)
}
