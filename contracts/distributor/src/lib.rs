#![no_std]

mod math;

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, token, Address, Env, Vec,
};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Global configuration for the Cascade distributor.
#[contracttype]
#[derive(Clone, Debug)]
pub struct Config {
    pub admin: Address,
    /// Protocol fee on distributions, in whole percent.
    pub fee_percent: u32,
    pub fee_address: Address,
}

/// Protocol-wide distribution counters.
#[contracttype]
#[derive(Clone, Debug)]
pub struct GlobalStats {
    pub total_distributions: u64,
    pub total_distributed_amount: i128,
}

/// Per-token aggregates, keyed by token address.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenStats {
    pub total_amount: i128,
    pub distribution_count: u32,
    pub last_time: u64,
}

/// Per-sender aggregates, keyed by user address.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserStats {
    pub distributions_initiated: u32,
    pub total_amount: i128,
}

/// One append-only history record per distribution call.
///
/// `amount` is the net amount actually split between recipients, after the
/// protocol fee was deducted.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Distribution {
    pub sender: Address,
    pub token: Address,
    pub amount: i128,
    pub recipients_count: u32,
    pub timestamp: u64,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    FeeTooHigh = 12,
    InvalidRecipient = 13,
    ArithmeticOverflow = 15,
}

/// Namespace for all contract storage keys.
#[contracttype]
pub enum DataKey {
    Config,              // Instance storage for admin/fee settings.
    GlobalStats,         // Instance storage for protocol-wide counters.
    NextRecordId,        // Instance storage for the history ID counter.
    Record(u64),         // Persistent storage for history records.
    TokenStats(Address), // Persistent storage for per-token aggregates.
    UserStats(Address),  // Persistent storage for per-sender aggregates.
}

/// Maximum protocol fee on distributions: 100 percent.
const MAX_FEE_PERCENT: u32 = 100;
const PERCENT_DENOMINATOR: i128 = 100;

const LEDGER_THRESHOLD: u32 = 17280; // ~1 day at 5s/ledger
const LEDGER_BUMP: u32 = 120960; // ~1 week

// ---------------------------------------------------------------------------
// Storage helpers
// ---------------------------------------------------------------------------

fn get_config(env: &Env) -> Result<Config, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

fn put_config(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
    env.storage()
        .instance()
        .extend_ttl(LEDGER_THRESHOLD, LEDGER_BUMP);
}

fn load_global_stats(env: &Env) -> GlobalStats {
    env.storage()
        .instance()
        .get(&DataKey::GlobalStats)
        .unwrap_or(GlobalStats {
            total_distributions: 0,
            total_distributed_amount: 0,
        })
}

fn save_global_stats(env: &Env, stats: &GlobalStats) {
    env.storage().instance().set(&DataKey::GlobalStats, stats);
    env.storage()
        .instance()
        .extend_ttl(LEDGER_THRESHOLD, LEDGER_BUMP);
}

fn next_record_id(env: &Env) -> u64 {
    let id: u64 = env
        .storage()
        .instance()
        .get(&DataKey::NextRecordId)
        .unwrap_or(0);
    env.storage()
        .instance()
        .set(&DataKey::NextRecordId, &(id + 1));
    id
}

fn load_token_stats(env: &Env, token: &Address) -> TokenStats {
    env.storage()
        .persistent()
        .get(&DataKey::TokenStats(token.clone()))
        .unwrap_or(TokenStats {
            total_amount: 0,
            distribution_count: 0,
            last_time: 0,
        })
}

fn save_token_stats(env: &Env, token: &Address, stats: &TokenStats) {
    let key = DataKey::TokenStats(token.clone());
    env.storage().persistent().set(&key, stats);
    env.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD, LEDGER_BUMP);
}

fn load_user_stats(env: &Env, user: &Address) -> UserStats {
    env.storage()
        .persistent()
        .get(&DataKey::UserStats(user.clone()))
        .unwrap_or(UserStats {
            distributions_initiated: 0,
            total_amount: 0,
        })
}

fn save_user_stats(env: &Env, user: &Address, stats: &UserStats) {
    let key = DataKey::UserStats(user.clone());
    env.storage().persistent().set(&key, stats);
    env.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD, LEDGER_BUMP);
}

fn save_record(env: &Env, record_id: u64, record: &Distribution) {
    let key = DataKey::Record(record_id);
    env.storage().persistent().set(&key, record);
    env.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD, LEDGER_BUMP);
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

impl CascadeDistributor {
    fn fee_amount(env: &Env, config: &Config, gross: i128) -> Result<i128, Error> {
        if config.fee_percent == 0 {
            return Ok(0);
        }
        math::proportion(env, gross, config.fee_percent as i128, PERCENT_DENOMINATOR)
    }

    /// Shared bookkeeping tail of both distribution entry points: per-user
    /// and per-token aggregates, global counters and the history record,
    /// all for the net (post-fee) amount.
    fn record_distribution(
        env: &Env,
        sender: &Address,
        token: &Address,
        net: i128,
        recipients_count: u32,
    ) -> Result<(), Error> {
        let now = env.ledger().timestamp();

        let mut user = load_user_stats(env, sender);
        user.distributions_initiated += 1;
        user.total_amount = math::checked_add(user.total_amount, net)?;
        save_user_stats(env, sender, &user);

        let mut tok = load_token_stats(env, token);
        tok.distribution_count += 1;
        tok.total_amount = math::checked_add(tok.total_amount, net)?;
        tok.last_time = now;
        save_token_stats(env, token, &tok);

        let mut global = load_global_stats(env);
        global.total_distributions += 1;
        global.total_distributed_amount =
            math::checked_add(global.total_distributed_amount, net)?;
        save_global_stats(env, &global);

        let record = Distribution {
            sender: sender.clone(),
            token: token.clone(),
            amount: net,
            recipients_count,
            timestamp: now,
        };
        let record_id = next_record_id(env);
        save_record(env, record_id, &record);

        env.events()
            .publish((symbol_short!("dist"), token.clone()), record);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Contract implementation
// ---------------------------------------------------------------------------

#[contract]
pub struct CascadeDistributor;

#[contractimpl]
impl CascadeDistributor {
    /// Initialise the distributor with its admin, fee percent and fee sink.
    ///
    /// Must be called exactly once before any other operation.
    ///
    /// # Errors
    /// - `AlreadyInitialized` on a second call
    /// - `FeeTooHigh` if `protocol_fee_percent` exceeds 100
    pub fn initialize(
        env: Env,
        admin: Address,
        protocol_fee_percent: u32,
        fee_address: Address,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(Error::AlreadyInitialized);
        }
        if protocol_fee_percent > MAX_FEE_PERCENT {
            return Err(Error::FeeTooHigh);
        }
        admin.require_auth();

        put_config(
            &env,
            &Config {
                admin,
                fee_percent: protocol_fee_percent,
                fee_address,
            },
        );
        save_global_stats(
            &env,
            &GlobalStats {
                total_distributions: 0,
                total_distributed_amount: 0,
            },
        );
        env.storage().instance().set(&DataKey::NextRecordId, &0u64);
        Ok(())
    }

    /// Split `total_amount` equally between all recipients.
    ///
    /// The protocol fee is deducted from `total_amount` first and paid to
    /// the fee address; the remaining net pool is divided by the recipient
    /// count with integer floor. The floor remainder is not distributed;
    /// it simply never leaves the sender. Each recipient must end up with
    /// at least one unit, so the net pool has to cover the recipient count.
    ///
    /// # Parameters
    /// - `sender`: address funding the distribution (must authorize)
    /// - `token`: token contract the distribution pays in
    /// - `total_amount`: gross amount, fee included
    /// - `recipients`: non-empty list of payout addresses
    ///
    /// # Errors
    /// - `InvalidRecipient` if `recipients` is empty
    /// - `InvalidAmount` for a non-positive total, or when the net pool is
    ///   smaller than the recipient count
    ///
    /// # Events
    /// Publishes `fee(token, fee)` when a non-zero fee was collected, then
    /// `dist(token, record)` with the history record.
    pub fn distribute_equal(
        env: Env,
        sender: Address,
        token: Address,
        total_amount: i128,
        recipients: Vec<Address>,
    ) -> Result<(), Error> {
        sender.require_auth();
        let config = get_config(&env)?;

        if recipients.is_empty() {
            return Err(Error::InvalidRecipient);
        }
        if total_amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let fee = Self::fee_amount(&env, &config, total_amount)?;
        let net = math::checked_sub(total_amount, fee)?;

        let count = recipients.len() as i128;
        if net < count {
            return Err(Error::InvalidAmount);
        }
        let share = net / count;

        let token_client = token::Client::new(&env, &token);
        if fee > 0 {
            token_client.transfer(&sender, &config.fee_address, &fee);
            env.events()
                .publish((symbol_short!("fee"), token.clone()), fee);
        }
        for recipient in recipients.iter() {
            token_client.transfer(&sender, &recipient, &share);
        }

        Self::record_distribution(&env, &sender, &token, net, recipients.len())
    }

    /// Split a deposit between recipients proportionally to their weights.
    ///
    /// The gross amount is the sum of the declared weights. The protocol
    /// fee is deducted from that sum, and each recipient receives
    /// `weight * net / sum`, scaling shares down so they total the net
    /// pool rather than the gross sum.
    ///
    /// # Errors
    /// - `InvalidAmount` if the two lists differ in length or any weight is
    ///   non-positive
    /// - `InvalidRecipient` if `recipients` is empty
    ///
    /// # Events
    /// Publishes `fee(token, fee)` when a non-zero fee was collected, then
    /// `dist(token, record)` with the history record.
    pub fn distribute_weighted(
        env: Env,
        sender: Address,
        token: Address,
        recipients: Vec<Address>,
        amounts: Vec<i128>,
    ) -> Result<(), Error> {
        sender.require_auth();
        let config = get_config(&env)?;

        if recipients.len() != amounts.len() {
            return Err(Error::InvalidAmount);
        }
        if recipients.is_empty() {
            return Err(Error::InvalidRecipient);
        }

        let mut sum: i128 = 0;
        for amount in amounts.iter() {
            if amount <= 0 {
                return Err(Error::InvalidAmount);
            }
            sum = math::checked_add(sum, amount)?;
        }

        let fee = Self::fee_amount(&env, &config, sum)?;
        let net = math::checked_sub(sum, fee)?;

        let token_client = token::Client::new(&env, &token);
        if fee > 0 {
            token_client.transfer(&sender, &config.fee_address, &fee);
            env.events()
                .publish((symbol_short!("fee"), token.clone()), fee);
        }
        for (recipient, amount) in recipients.iter().zip(amounts.iter()) {
            let share = math::proportion(&env, amount, net, sum)?;
            token_client.transfer(&sender, &recipient, &share);
        }

        Self::record_distribution(&env, &sender, &token, net, recipients.len())
    }

    /// Update the protocol fee percent.
    ///
    /// The caller passes their own address, which must both authorize the
    /// call and match the stored admin.
    ///
    /// # Errors
    /// - `Unauthorized` if `admin` is not the stored admin
    /// - `FeeTooHigh` if `new_fee_percent` exceeds 100
    pub fn set_protocol_fee(env: Env, admin: Address, new_fee_percent: u32) -> Result<(), Error> {
        admin.require_auth();
        let mut config = get_config(&env)?;

        if admin != config.admin {
            return Err(Error::Unauthorized);
        }
        if new_fee_percent > MAX_FEE_PERCENT {
            return Err(Error::FeeTooHigh);
        }

        config.fee_percent = new_fee_percent;
        put_config(&env, &config);
        Ok(())
    }

    /// Aggregates for a sender, if they ever initiated a distribution.
    pub fn get_user_stats(env: Env, user: Address) -> Option<UserStats> {
        env.storage().persistent().get(&DataKey::UserStats(user))
    }

    /// Aggregates for a token, if it was ever distributed.
    pub fn get_token_stats(env: Env, token: Address) -> Option<TokenStats> {
        env.storage().persistent().get(&DataKey::TokenStats(token))
    }

    /// Page through the append-only history log.
    ///
    /// Returns up to `limit` records starting at `start_id`; ids past the
    /// end of the log are simply skipped.
    pub fn get_distribution_history(env: Env, start_id: u64, limit: u64) -> Vec<Distribution> {
        let mut history = Vec::new(&env);
        for id in start_id..start_id.saturating_add(limit) {
            if let Some(record) = env.storage().persistent().get(&DataKey::Record(id)) {
                history.push_back(record);
            }
        }
        history
    }

    /// Number of distributions ever executed.
    pub fn get_total_distributions(env: Env) -> u64 {
        load_global_stats(&env).total_distributions
    }

    /// Net amount ever distributed, across all tokens.
    pub fn get_total_distributed_amount(env: Env) -> i128 {
        load_global_stats(&env).total_distributed_amount
    }

    /// Stored admin, if the contract is initialised.
    pub fn get_admin(env: Env) -> Option<Address> {
        get_config(&env).map(|config| config.admin).ok()
    }

    /// Current protocol fee in whole percent.
    pub fn get_protocol_fee_percent(env: Env) -> Result<u32, Error> {
        Ok(get_config(&env)?.fee_percent)
    }

    /// Current fee sink address.
    pub fn get_fee_address(env: Env) -> Result<Address, Error> {
        Ok(get_config(&env)?.fee_address)
    }
}
