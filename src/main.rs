use clap::Parser;
use log::{error, LevelFilter};
use std::process;
use workchain::{
    AccountLedger, AccountStore, Address, BlockView, BlockchainError, Command, MiningPass, Opt,
    Session, Settings, SnapshotStore, TransactionPool, GLOBAL_CONFIG,
};

fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();
    if let Some(dir) = opt.data_dir {
        GLOBAL_CONFIG.set_data_dir(dir);
    }

    if let Err(e) = run_command(opt.command, opt.user.as_deref()) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn open_accounts(settings: &Settings) -> Result<AccountStore, BlockchainError> {
    AccountStore::open(&settings.accounts_path())
}

// Commands that act as a user need --user, and that user must be registered
fn login(user: Option<&str>, accounts: &AccountStore) -> Result<Session, BlockchainError> {
    let identity = user.ok_or_else(|| {
        BlockchainError::Unauthorized("this command needs --user".to_string())
    })?;
    Session::login(identity, accounts)
}

fn run_command(command: Command, user: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let settings = GLOBAL_CONFIG.get_settings();
    let store = SnapshotStore::from_settings(&settings);

    match command {
        Command::Init => {
            if store.chain_exists() {
                println!("Chain already exists at {}", store.chain_path().display());
                return Ok(());
            }
            let chain = store.load_chain(settings.initial_difficulty)?;
            store.save_chain(&chain)?;
            println!("Genesis block: {}", chain.tip_hash());
        }
        Command::Createaccount { identity } => {
            let accounts = open_accounts(&settings)?;
            let account = accounts.register(&identity)?;
            println!(
                "Account {} created with address {}",
                account.get_identity(),
                account.get_address()
            );
        }
        Command::Grant { identity, amount } => {
            let accounts = open_accounts(&settings)?;
            let amount = amount.unwrap_or(settings.grant_amount);
            let account = accounts.grant(&Address::derive(&identity), amount)?;
            println!(
                "Granted {amount} to {}, balance is now {}",
                account.get_identity(),
                account.get_balance()
            );
        }
        Command::Balance { identity } => {
            let accounts = open_accounts(&settings)?;
            let identity = identity.as_deref().or(user).ok_or_else(|| {
                BlockchainError::Unauthorized("give an identity or --user".to_string())
            })?;
            let address = Address::derive(identity);
            let account = accounts
                .lookup(&address)?
                .ok_or_else(|| BlockchainError::AccountNotFound(identity.to_string()))?;
            println!("Balance of '{identity}': {}", account.get_balance());
        }
        Command::Send { to, amount, from } => {
            let accounts = open_accounts(&settings)?;
            let session = login(user, &accounts)?;
            let sender = match from {
                Some(from) => Address::derive(&from),
                None => *session.get_address(),
            };
            let mut pool = TransactionPool::open(&store)?;
            let tx = pool.send(&session, &sender, &Address::derive(&to), amount, &accounts)?;
            println!("Queued: {tx}");
        }
        Command::Listpool => {
            let pool = TransactionPool::open(&store)?;
            if pool.is_empty() {
                println!("No pending transactions");
            }
            for tx in pool.iter() {
                println!("{tx}");
            }
        }
        Command::Mine => {
            let accounts = open_accounts(&settings)?;
            let session = login(user, &accounts)?;
            let outcome = MiningPass::from_settings(&settings, &store, &accounts).run(&session)?;
            for rejected in &outcome.rejected {
                println!(
                    "Dropped transaction {}: {}",
                    rejected.transaction, rejected.reason
                );
            }
            println!(
                "Mined block {} with {} transactions in {}s, nonce {}",
                outcome.get_index(),
                outcome.accepted(),
                outcome.elapsed_secs,
                outcome.get_nonce()
            );
            println!("Hash: {}", outcome.get_hash());
            println!(
                "Fees collected: {}, difficulty {} -> {}",
                outcome.fees_collected, outcome.difficulty, outcome.next_difficulty
            );
        }
        Command::Printchain { json } => {
            let chain = store.load_chain(settings.initial_difficulty)?;
            let views: Vec<BlockView> = chain.iter().map(BlockView::from).collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                println!("Difficulty: {}", chain.get_difficulty());
                for view in views {
                    println!("{view}");
                }
            }
        }
        Command::Validate => {
            let chain = store.load_chain(settings.initial_difficulty)?;
            for verdict in chain.audit() {
                match verdict.reason {
                    None => println!("Block {}: valid", verdict.index),
                    Some(reason) => println!("Block {}: INVALID ({reason})", verdict.index),
                }
            }
            chain.validate()?;
            println!("Chain of {} blocks is valid", chain.len());
        }
    }
    Ok(())
}
