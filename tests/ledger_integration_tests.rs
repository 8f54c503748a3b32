//! Ledger integration tests
//!
//! End-to-end runs over the sled account store and on-disk snapshots: queue
//! transfers, mine them, reload the chain and check balances and integrity.

use std::fs;
use tempfile::tempdir;
use workchain::{
    AccountLedger, AccountStore, Address, BlockchainError, MiningPass, Session, SnapshotStore,
    TransactionPool, TransactionStatus,
};

fn balance(accounts: &AccountStore, who: &str) -> i64 {
    accounts
        .lookup(&Address::derive(who))
        .unwrap()
        .unwrap()
        .get_balance()
}

fn setup(dir: &std::path::Path) -> (SnapshotStore, AccountStore) {
    let store = SnapshotStore::new(dir);
    let accounts = AccountStore::open(&dir.join("accounts")).unwrap();
    for name in ["alice", "bob", "miner"] {
        accounts.register(name).unwrap();
    }
    accounts.grant(&Address::derive("alice"), 2_000_000).unwrap();
    (store, accounts)
}

#[test]
fn test_send_mine_and_reload() {
    let dir = tempdir().unwrap();
    let (store, accounts) = setup(dir.path());

    let alice = Session::login("alice", &accounts).unwrap();
    {
        let mut pool = TransactionPool::open(&store).unwrap();
        pool.send(&alice, alice.get_address(), &Address::derive("bob"), 100, &accounts)
            .unwrap();
    }

    let miner = Session::login("miner", &accounts).unwrap();
    let outcome = MiningPass::new(&store, &accounts).run(&miner).unwrap();
    assert_eq!(outcome.get_index(), 1);
    assert_eq!(outcome.accepted(), 1);
    assert!(outcome.rejected.is_empty());

    assert_eq!(balance(&accounts, "alice"), 2_000_000 - 350);
    assert_eq!(balance(&accounts, "bob"), 100);
    assert_eq!(balance(&accounts, "miner"), 250);

    let chain = store.load_chain(1).unwrap();
    assert_eq!(chain.len(), 2);
    assert!(chain.validate().is_ok());
    assert!(chain.get_blocks()[1]
        .get_transactions()
        .iter()
        .all(|tx| tx.get_status() == TransactionStatus::Settled));

    // pool was drained by the pass
    let again = MiningPass::new(&store, &accounts).run(&miner);
    assert!(matches!(again, Err(BlockchainError::EmptyPool)));
}

#[test]
fn test_second_block_uses_retuned_difficulty() {
    let dir = tempdir().unwrap();
    let (store, accounts) = setup(dir.path());
    let miner = Session::login("miner", &accounts).unwrap();

    let mut first = None;
    for amount in [10, 20] {
        let mut pool = TransactionPool::open(&store).unwrap();
        pool.submit(Address::derive("alice"), Address::derive("bob"), amount)
            .unwrap();
        drop(pool);

        let outcome = MiningPass::new(&store, &accounts).run(&miner).unwrap();
        let zeros = outcome.difficulty as usize;
        assert!(outcome.get_hash().as_bytes()[..zeros].iter().all(|b| *b == 0));
        if let Some(previous) = first.replace(outcome.next_difficulty) {
            assert_eq!(outcome.difficulty, previous);
        }
    }

    let chain = store.load_chain(1).unwrap();
    assert_eq!(chain.len(), 3);
    assert!(chain.is_valid());
    assert_eq!(balance(&accounts, "bob"), 30);
    assert_eq!(balance(&accounts, "miner"), 500);
}

#[test]
fn test_unaffordable_transfers_are_dropped() {
    let dir = tempdir().unwrap();
    let (store, accounts) = setup(dir.path());
    {
        let mut pool = TransactionPool::open(&store).unwrap();
        pool.submit(Address::derive("bob"), Address::derive("alice"), 10)
            .unwrap();
        pool.submit(Address::derive("alice"), Address::derive("bob"), 10)
            .unwrap();
    }
    let miner = Session::login("miner", &accounts).unwrap();
    let outcome = MiningPass::new(&store, &accounts).run(&miner).unwrap();

    assert_eq!(outcome.accepted(), 1);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(
        outcome.rejected[0].transaction.get_status(),
        TransactionStatus::Failed
    );
    assert_eq!(balance(&accounts, "bob"), 10);
    assert!(TransactionPool::open(&store).unwrap().is_empty());
}

#[test]
fn test_tampered_snapshot_fails_validation() {
    let dir = tempdir().unwrap();
    let (store, accounts) = setup(dir.path());
    {
        let mut pool = TransactionPool::open(&store).unwrap();
        pool.submit(Address::derive("alice"), Address::derive("bob"), 100)
            .unwrap();
    }
    let miner = Session::login("miner", &accounts).unwrap();
    MiningPass::new(&store, &accounts).run(&miner).unwrap();

    // flip a byte inside the last transfer of the last block
    let mut bytes = fs::read(store.chain_path()).unwrap();
    let at = bytes.len() - 12;
    bytes[at] ^= 0xff;
    fs::write(store.chain_path(), &bytes).unwrap();

    let chain = store.load_chain(1).unwrap();
    match chain.validate() {
        Err(BlockchainError::InvalidChain { index, .. }) => assert_eq!(index, 1),
        other => panic!("expected invalid chain, got {other:?}"),
    }
    let verdicts = chain.audit();
    assert!(verdicts[0].valid);
    assert!(!verdicts[1].valid);
}

#[test]
fn test_unknown_receiver_aborts_pass() {
    let dir = tempdir().unwrap();
    let (store, accounts) = setup(dir.path());
    {
        let mut pool = TransactionPool::open(&store).unwrap();
        pool.submit(Address::derive("alice"), Address::derive("carol"), 100)
            .unwrap();
    }
    let miner = Session::login("miner", &accounts).unwrap();
    let result = MiningPass::new(&store, &accounts).run(&miner);

    assert!(matches!(result, Err(BlockchainError::AccountNotFound(_))));
    assert!(!store.chain_exists());
    assert_eq!(balance(&accounts, "alice"), 2_000_000);
    assert_eq!(balance(&accounts, "miner"), 0);
}

#[test]
fn test_bad_receiver_does_not_cost_valid_transfers() {
    let dir = tempdir().unwrap();
    let (store, accounts) = setup(dir.path());
    {
        let mut pool = TransactionPool::open(&store).unwrap();
        pool.submit(Address::derive("alice"), Address::derive("bob"), 100)
            .unwrap();
        pool.submit(Address::derive("alice"), Address::derive("carol"), 100)
            .unwrap();
    }
    let miner = Session::login("miner", &accounts).unwrap();
    let result = MiningPass::new(&store, &accounts).run(&miner);
    assert!(matches!(result, Err(BlockchainError::AccountNotFound(_))));

    let pool = TransactionPool::open(&store).unwrap();
    let queued: Vec<(Address, u64)> = pool
        .iter()
        .map(|tx| (*tx.get_receiver(), tx.get_amount()))
        .collect();
    assert_eq!(
        queued,
        vec![
            (Address::derive("bob"), 100),
            (Address::derive("carol"), 100)
        ]
    );
    assert!(pool
        .iter()
        .all(|tx| tx.get_status() == TransactionStatus::Pending));
    assert!(!store.chain_exists());
    assert_eq!(balance(&accounts, "alice"), 2_000_000);
}

#[test]
fn test_truncated_pool_snapshot_is_an_error() {
    let dir = tempdir().unwrap();
    let (store, _accounts) = setup(dir.path());
    {
        let mut pool = TransactionPool::open(&store).unwrap();
        pool.submit(Address::derive("alice"), Address::derive("bob"), 1)
            .unwrap();
    }
    let bytes = fs::read(store.pool_path()).unwrap();
    fs::write(store.pool_path(), &bytes[..bytes.len() / 2]).unwrap();
    assert!(TransactionPool::open(&store).is_err());
}

#[test]
fn test_send_requires_matching_session() {
    let dir = tempdir().unwrap();
    let (store, accounts) = setup(dir.path());
    let bob = Session::login("bob", &accounts).unwrap();
    let mut pool = TransactionPool::open(&store).unwrap();

    let result = pool.send(
        &bob,
        &Address::derive("alice"),
        &Address::derive("bob"),
        5,
        &accounts,
    );
    assert!(matches!(result, Err(BlockchainError::Unauthorized(_))));
    assert!(pool.is_empty());
    assert!(Session::login("mallory", &accounts).is_err());
}
