#![no_std]

mod vesting;

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, token, Address, Env,
};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Global configuration for the Cascade streaming protocol.
#[contracttype]
#[derive(Clone, Debug)]
pub struct Config {
    pub admin: Address,
    pub fee_collector: Address,
    /// Protocol fee on withdrawals, in basis points.
    pub fee_rate: u32,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StreamStatus {
    Active = 0,
    Paused = 1,
    Canceled = 2,
    Completed = 3,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stream {
    pub id: u64,
    pub sender: Address,
    pub recipient: Address,
    pub token: Address,
    /// Funding target, immutable after creation.
    pub total_amount: i128,
    /// Cumulative amount deposited so far.
    pub balance: i128,
    /// Cumulative amount paid out.
    pub withdrawn_amount: i128,
    pub start_time: u64,
    pub end_time: u64,
    pub status: StreamStatus,
    /// Set while the stream is paused, cleared on resume or cancel.
    pub paused_at: Option<u64>,
    /// Seconds spent paused, excluded from the vesting clock.
    pub total_paused_duration: u64,
}

/// Per-stream activity counters, maintained alongside the stream itself.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StreamMetrics {
    pub last_activity: u64,
    pub total_withdrawn: i128,
    pub withdrawal_count: u32,
    pub pause_count: u32,
    pub total_delegations: u32,
    pub current_delegate: Option<Address>,
    pub last_delegation_time: u64,
}

/// Protocol-wide counters.
#[contracttype]
#[derive(Clone, Debug)]
pub struct ProtocolMetrics {
    pub total_streams_created: u64,
    pub total_active_streams: u64,
    pub total_delegations: u64,
    pub total_tokens_streamed: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StreamPausedEvent {
    pub stream_id: u64,
    pub paused_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StreamResumedEvent {
    pub stream_id: u64,
    pub resumed_at: u64,
    pub paused_duration: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StreamCancelledEvent {
    pub stream_id: u64,
    pub recipient_amount: i128,
    pub sender_refund: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DelegationGrantedEvent {
    pub stream_id: u64,
    pub recipient: Address,
    pub delegate: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DelegationRevokedEvent {
    pub stream_id: u64,
    pub recipient: Address,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    InvalidTimeRange = 5,
    StreamNotFound = 6,
    StreamNotActive = 7,
    StreamNotPaused = 8,
    StreamCannotBeCanceled = 9,
    InsufficientWithdrawable = 10,
    TransferFailed = 11,
    FeeTooHigh = 12,
    InvalidRecipient = 13,
    DepositExceedsTotal = 14,
    ArithmeticOverflow = 15,
    InvalidDelegate = 16,
}

/// Namespace for all contract storage keys.
#[contracttype]
pub enum DataKey {
    Config,          // Instance storage for admin/collector/fee settings.
    NextStreamId,    // Instance storage for the auto-incrementing ID counter.
    ProtocolMetrics, // Instance storage for protocol-wide counters.
    Stream(u64),     // Persistent storage for individual stream data.
    Metrics(u64),    // Persistent storage for per-stream counters.
    Delegate(u64),   // Persistent storage for the withdrawal delegate.
}

/// Maximum protocol fee on withdrawals: 5% in basis points.
const MAX_FEE_RATE: u32 = 500;
const FEE_DENOMINATOR: i128 = 10_000;

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

fn next_stream_id(env: &Env) -> u64 {
    let id: u64 = env
        .storage()
        .instance()
        .get(&DataKey::NextStreamId)
        .unwrap_or(0);
    env.storage()
        .instance()
        .set(&DataKey::NextStreamId, &(id + 1));
    id
}

fn load_stream(env: &Env, stream_id: u64) -> Result<Stream, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Stream(stream_id))
        .ok_or(Error::StreamNotFound)
}

fn save_stream(env: &Env, stream: &Stream) {
    let key = DataKey::Stream(stream.id);
    env.storage().persistent().set(&key, stream);
    env.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD, LEDGER_BUMP);
}

fn load_metrics(env: &Env, stream_id: u64) -> StreamMetrics {
    env.storage()
        .persistent()
        .get(&DataKey::Metrics(stream_id))
        .unwrap_or(StreamMetrics {
            last_activity: 0,
            total_withdrawn: 0,
            withdrawal_count: 0,
            pause_count: 0,
            total_delegations: 0,
            current_delegate: None,
            last_delegation_time: 0,
        })
}

fn save_metrics(env: &Env, stream_id: u64, metrics: &StreamMetrics) {
    let key = DataKey::Metrics(stream_id);
    env.storage().persistent().set(&key, metrics);
    env.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD, LEDGER_BUMP);
}

fn load_protocol_metrics(env: &Env) -> ProtocolMetrics {
    env.storage()
        .instance()
        .get(&DataKey::ProtocolMetrics)
        .unwrap_or(ProtocolMetrics {
            total_streams_created: 0,
            total_active_streams: 0,
            total_delegations: 0,
            total_tokens_streamed: 0,
        })
}

fn save_protocol_metrics(env: &Env, metrics: &ProtocolMetrics) {
    env.storage()
        .instance()
        .set(&DataKey::ProtocolMetrics, metrics);
    env.storage()
        .instance()
        .extend_ttl(LEDGER_THRESHOLD, LEDGER_BUMP);
}

fn load_delegate(env: &Env, stream_id: u64) -> Option<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::Delegate(stream_id))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

impl CascadeStream {
    fn is_terminal(status: StreamStatus) -> bool {
        matches!(status, StreamStatus::Canceled | StreamStatus::Completed)
    }

    /// Vested-but-unwithdrawn amount, bounded by what was actually deposited.
    ///
    /// While paused the reference time is pinned to the pause instant, so the
    /// result stays constant for the whole pause interval.
    fn withdrawable(env: &Env, stream: &Stream) -> Result<i128, Error> {
        if stream.status == StreamStatus::Canceled {
            return Ok(0);
        }

        let reference_time = match stream.status {
            StreamStatus::Paused => stream.paused_at.ok_or(Error::StreamNotPaused)?,
            _ => env.ledger().timestamp(),
        };

        let vested = vesting::vested_amount(
            env,
            stream.total_amount,
            stream.start_time,
            stream.end_time,
            stream.total_paused_duration,
            reference_time,
        )?;

        let undrawn = vesting::checked_sub(stream.balance, stream.withdrawn_amount)?;
        let unlocked = vesting::checked_sub(vested.min(stream.balance), stream.withdrawn_amount)?;
        Ok(unlocked.clamp(0, undrawn))
    }

    fn protocol_fee(env: &Env, config: &Config, amount: i128) -> Result<i128, Error> {
        if config.fee_rate == 0 {
            return Ok(0);
        }
        vesting::proportion(env, amount, config.fee_rate as i128, FEE_DENOMINATOR)
    }

    fn touch_metrics(env: &Env, stream_id: u64) {
        let mut metrics = load_metrics(env, stream_id);
        metrics.last_activity = env.ledger().timestamp();
        save_metrics(env, stream_id, &metrics);
    }
}

// ---------------------------------------------------------------------------
// Contract implementation
// ---------------------------------------------------------------------------

#[contract]
pub struct CascadeStream;

#[contractimpl]
impl CascadeStream {
    /// Initialise the contract with its admin, fee collector and fee rate.
    ///
    /// Must be called exactly once before any other operation. The fee rate
    /// is expressed in basis points and applies to every withdrawal.
    ///
    /// # Errors
    /// - `AlreadyInitialized` on a second call
    /// - `FeeTooHigh` if `fee_rate` exceeds 500 basis points (5%)
    pub fn initialize(
        env: Env,
        admin: Address,
        fee_collector: Address,
        fee_rate: u32,
    ) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(Error::AlreadyInitialized);
        }
        if fee_rate > MAX_FEE_RATE {
            return Err(Error::FeeTooHigh);
        }
        admin.require_auth();

        put_config(
            &env,
            &Config {
                admin,
                fee_collector,
                fee_rate,
            },
        );
        env.storage().instance().set(&DataKey::NextStreamId, &0u64);
        save_protocol_metrics(
            &env,
            &ProtocolMetrics {
                total_streams_created: 0,
                total_active_streams: 0,
                total_delegations: 0,
                total_tokens_streamed: 0,
            },
        );
        Ok(())
    }

    /// Create a new payment stream and escrow the initial deposit.
    ///
    /// The stream vests `total_amount` linearly between `start_time` and
    /// `end_time`; only what has actually been deposited can ever be
    /// withdrawn, so a stream may be funded incrementally with `deposit`.
    ///
    /// # Parameters
    /// - `sender`: address funding the stream (must authorize the call)
    /// - `recipient`: address the stream vests to
    /// - `token`: token contract used for this stream
    /// - `total_amount`: funding target, must be positive
    /// - `initial_amount`: escrowed now, in `[0, total_amount]`
    /// - `start_time` / `end_time`: vesting window, `end_time > start_time`
    ///
    /// # Returns
    /// The id of the newly created stream.
    ///
    /// # Errors
    /// - `InvalidAmount` for a non-positive total or an initial deposit
    ///   outside `[0, total_amount]`
    /// - `InvalidTimeRange` if `end_time <= start_time`
    /// - `InvalidRecipient` if `recipient == sender`
    ///
    /// # Events
    /// Publishes `created(stream_id, total_amount)`.
    #[allow(clippy::too_many_arguments)]
    pub fn create_stream(
        env: Env,
        sender: Address,
        recipient: Address,
        token: Address,
        total_amount: i128,
        initial_amount: i128,
        start_time: u64,
        end_time: u64,
    ) -> Result<u64, Error> {
        sender.require_auth();
        get_config(&env)?;

        if total_amount <= 0 {
            return Err(Error::InvalidAmount);
        }
        if initial_amount < 0 || initial_amount > total_amount {
            return Err(Error::InvalidAmount);
        }
        if end_time <= start_time {
            return Err(Error::InvalidTimeRange);
        }
        if recipient == sender {
            return Err(Error::InvalidRecipient);
        }

        // Escrow the initial deposit before any state is persisted, so a
        // failed transfer leaves no trace of the stream.
        if initial_amount > 0 {
            let token_client = token::Client::new(&env, &token);
            token_client.transfer(&sender, &env.current_contract_address(), &initial_amount);
        }

        let stream_id = next_stream_id(&env);
        let now = env.ledger().timestamp();

        let stream = Stream {
            id: stream_id,
            sender,
            recipient,
            token,
            total_amount,
            balance: initial_amount,
            withdrawn_amount: 0,
            start_time,
            end_time,
            status: StreamStatus::Active,
            paused_at: None,
            total_paused_duration: 0,
        };
        save_stream(&env, &stream);

        save_metrics(
            &env,
            stream_id,
            &StreamMetrics {
                last_activity: now,
                total_withdrawn: 0,
                withdrawal_count: 0,
                pause_count: 0,
                total_delegations: 0,
                current_delegate: None,
                last_delegation_time: 0,
            },
        );

        let mut protocol = load_protocol_metrics(&env);
        protocol.total_streams_created += 1;
        protocol.total_active_streams += 1;
        save_protocol_metrics(&env, &protocol);

        env.events()
            .publish((symbol_short!("created"), stream_id), total_amount);

        Ok(stream_id)
    }

    /// Deposit tokens into an existing stream.
    ///
    /// The depositor is explicit and unrestricted: anyone may top up a
    /// stream, the tokens move from `from` into the contract escrow.
    ///
    /// # Errors
    /// - `StreamNotFound` for an unknown id
    /// - `StreamNotActive` if the stream is canceled or completed
    /// - `InvalidAmount` for a non-positive amount
    /// - `DepositExceedsTotal` if the balance would exceed the funding target
    ///
    /// # Events
    /// Publishes `deposit(stream_id, amount)`.
    pub fn deposit(env: Env, from: Address, stream_id: u64, amount: i128) -> Result<(), Error> {
        from.require_auth();
        let mut stream = load_stream(&env, stream_id)?;

        if Self::is_terminal(stream.status) {
            return Err(Error::StreamNotActive);
        }
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let new_balance = vesting::checked_add(stream.balance, amount)?;
        if new_balance > stream.total_amount {
            return Err(Error::DepositExceedsTotal);
        }

        let token_client = token::Client::new(&env, &stream.token);
        token_client.transfer(&from, &env.current_contract_address(), &amount);

        stream.balance = new_balance;
        save_stream(&env, &stream);
        Self::touch_metrics(&env, stream_id);

        env.events()
            .publish((symbol_short!("deposit"), stream_id), amount);
        Ok(())
    }

    /// Withdraw `amount` from a stream to the caller.
    ///
    /// The caller must be the stream's recipient or its current delegate;
    /// delegation adds a second authorized withdrawer, it never replaces
    /// the recipient's own access. Withdrawals are allowed while the stream
    /// is active or paused; while paused the withdrawable amount is frozen
    /// at the pause instant. The protocol fee is deducted from `amount` and
    /// paid to the fee collector, the remainder goes to the caller.
    ///
    /// If this withdrawal reaches the funding target at or after the
    /// stream's end time, the stream transitions to `Completed`.
    ///
    /// # Errors
    /// - `Unauthorized` if the caller is neither recipient nor delegate
    /// - `StreamNotActive` if the stream is canceled or completed
    /// - `InvalidAmount` for a non-positive amount
    /// - `InsufficientWithdrawable` if `amount` exceeds the vested,
    ///   deposited and not-yet-withdrawn balance
    ///
    /// # Events
    /// Publishes `withdrawn(stream_id, amount)`, plus `fee(stream_id, fee)`
    /// when a non-zero fee was collected.
    pub fn withdraw(env: Env, caller: Address, stream_id: u64, amount: i128) -> Result<(), Error> {
        caller.require_auth();
        let config = get_config(&env)?;
        let mut stream = load_stream(&env, stream_id)?;

        let is_delegate = load_delegate(&env, stream_id).is_some_and(|d| d == caller);
        if caller != stream.recipient && !is_delegate {
            return Err(Error::Unauthorized);
        }
        if Self::is_terminal(stream.status) {
            return Err(Error::StreamNotActive);
        }
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let available = Self::withdrawable(&env, &stream)?;
        if amount > available {
            return Err(Error::InsufficientWithdrawable);
        }

        let fee = Self::protocol_fee(&env, &config, amount)?;
        let net = vesting::checked_sub(amount, fee)?;

        let now = env.ledger().timestamp();
        stream.withdrawn_amount = vesting::checked_add(stream.withdrawn_amount, amount)?;
        let completed = stream.withdrawn_amount == stream.total_amount && now >= stream.end_time;
        if completed {
            stream.status = StreamStatus::Completed;
            stream.paused_at = None;
        }
        save_stream(&env, &stream);

        let mut metrics = load_metrics(&env, stream_id);
        metrics.total_withdrawn = vesting::checked_add(metrics.total_withdrawn, amount)?;
        metrics.withdrawal_count += 1;
        metrics.last_activity = now;
        save_metrics(&env, stream_id, &metrics);

        let mut protocol = load_protocol_metrics(&env);
        protocol.total_tokens_streamed =
            vesting::checked_add(protocol.total_tokens_streamed, amount)?;
        if completed {
            protocol.total_active_streams = protocol.total_active_streams.saturating_sub(1);
        }
        save_protocol_metrics(&env, &protocol);

        // CEI: all state is persisted before the external token transfers.
        let token_client = token::Client::new(&env, &stream.token);
        token_client.transfer(&env.current_contract_address(), &caller, &net);
        if fee > 0 {
            token_client.transfer(&env.current_contract_address(), &config.fee_collector, &fee);
            env.events().publish((symbol_short!("fee"), stream_id), fee);
        }

        env.events()
            .publish((symbol_short!("withdrawn"), stream_id), amount);
        Ok(())
    }

    /// Withdraw everything currently available from a stream.
    ///
    /// Convenience wrapper around `withdraw`; fails with
    /// `InsufficientWithdrawable` when nothing is available. Returns the
    /// gross amount withdrawn.
    pub fn withdraw_max(env: Env, caller: Address, stream_id: u64) -> Result<i128, Error> {
        let stream = load_stream(&env, stream_id)?;
        let available = Self::withdrawable(&env, &stream)?;
        if available <= 0 {
            return Err(Error::InsufficientWithdrawable);
        }
        Self::withdraw(env, caller, stream_id, available)?;
        Ok(available)
    }

    /// Pause an active stream, freezing its vesting clock.
    ///
    /// Sender-only. The pause instant is recorded so that the withdrawable
    /// amount stays constant until the stream is resumed.
    ///
    /// # Errors
    /// - `StreamNotActive` unless the stream is currently `Active`
    ///
    /// # Events
    /// Publishes `paused(stream_id, paused_at)`.
    pub fn pause_stream(env: Env, stream_id: u64) -> Result<(), Error> {
        let mut stream = load_stream(&env, stream_id)?;
        stream.sender.require_auth();

        if stream.status != StreamStatus::Active {
            return Err(Error::StreamNotActive);
        }

        let now = env.ledger().timestamp();
        stream.status = StreamStatus::Paused;
        stream.paused_at = Some(now);
        save_stream(&env, &stream);

        let mut metrics = load_metrics(&env, stream_id);
        metrics.pause_count += 1;
        metrics.last_activity = now;
        save_metrics(&env, stream_id, &metrics);

        env.events().publish(
            (symbol_short!("paused"), stream_id),
            StreamPausedEvent {
                stream_id,
                paused_at: now,
            },
        );
        Ok(())
    }

    /// Resume a paused stream.
    ///
    /// Sender-only. The length of the pause interval is added to the
    /// stream's total paused duration, so the vesting clock continues
    /// exactly where it stopped.
    ///
    /// # Errors
    /// - `StreamNotPaused` unless the stream is currently `Paused`
    ///
    /// # Events
    /// Publishes `resumed(stream_id, resumed_at, paused_duration)`.
    pub fn resume_stream(env: Env, stream_id: u64) -> Result<(), Error> {
        let mut stream = load_stream(&env, stream_id)?;
        stream.sender.require_auth();

        if stream.status != StreamStatus::Paused {
            return Err(Error::StreamNotPaused);
        }
        let paused_at = stream.paused_at.ok_or(Error::StreamNotPaused)?;

        let now = env.ledger().timestamp();
        let paused_duration = now.saturating_sub(paused_at);
        stream.total_paused_duration += paused_duration;
        stream.paused_at = None;
        stream.status = StreamStatus::Active;
        save_stream(&env, &stream);

        Self::touch_metrics(&env, stream_id);

        env.events().publish(
            (symbol_short!("resumed"), stream_id),
            StreamResumedEvent {
                stream_id,
                resumed_at: now,
                paused_duration,
            },
        );
        Ok(())
    }

    /// Cancel a stream, settling both parties.
    ///
    /// Sender-only. The vested-but-unwithdrawn amount (evaluated at the
    /// pause instant if the stream is paused, otherwise now) is paid to the
    /// recipient; whatever else remains of the escrowed balance is refunded
    /// to the sender. Cancellation is terminal.
    ///
    /// # Errors
    /// - `StreamCannotBeCanceled` unless the stream is `Active` or `Paused`
    ///
    /// # Events
    /// Publishes `cancelled(stream_id, recipient_amount, sender_refund)`.
    pub fn cancel_stream(env: Env, stream_id: u64) -> Result<(), Error> {
        let mut stream = load_stream(&env, stream_id)?;
        stream.sender.require_auth();

        if Self::is_terminal(stream.status) {
            return Err(Error::StreamCannotBeCanceled);
        }

        let vested_payout = Self::withdrawable(&env, &stream)?;
        let escrowed = vesting::checked_sub(stream.balance, stream.withdrawn_amount)?;
        let refund = vesting::checked_sub(escrowed, vested_payout)?;

        stream.status = StreamStatus::Canceled;
        stream.paused_at = None;
        save_stream(&env, &stream);

        Self::touch_metrics(&env, stream_id);

        let mut protocol = load_protocol_metrics(&env);
        protocol.total_active_streams = protocol.total_active_streams.saturating_sub(1);
        save_protocol_metrics(&env, &protocol);

        // CEI: state is terminal before the settlement transfers go out.
        let token_client = token::Client::new(&env, &stream.token);
        if vested_payout > 0 {
            token_client.transfer(
                &env.current_contract_address(),
                &stream.recipient,
                &vested_payout,
            );
        }
        if refund > 0 {
            token_client.transfer(&env.current_contract_address(), &stream.sender, &refund);
        }

        env.events().publish(
            (symbol_short!("cancelled"), stream_id),
            StreamCancelledEvent {
                stream_id,
                recipient_amount: vested_payout,
                sender_refund: refund,
            },
        );
        Ok(())
    }

    /// Grant withdrawal rights on a stream to a delegate.
    ///
    /// Recipient-only. Overwrites any existing delegate without error.
    /// Delegation is orthogonal to the stream lifecycle (it may be set in
    /// any non-terminal state) and it only ever adds a withdrawer, the
    /// recipient keeps full access.
    ///
    /// # Errors
    /// - `InvalidDelegate` on self-delegation
    /// - `StreamNotActive` if the stream is canceled or completed
    ///
    /// # Events
    /// Publishes `delegated(stream_id, recipient, delegate)`.
    pub fn set_delegate(env: Env, stream_id: u64, delegate: Address) -> Result<(), Error> {
        let stream = load_stream(&env, stream_id)?;
        stream.recipient.require_auth();

        if Self::is_terminal(stream.status) {
            return Err(Error::StreamNotActive);
        }
        if delegate == stream.recipient {
            return Err(Error::InvalidDelegate);
        }

        let key = DataKey::Delegate(stream_id);
        env.storage().persistent().set(&key, &delegate);
        env.storage()
            .persistent()
            .extend_ttl(&key, LEDGER_THRESHOLD, LEDGER_BUMP);

        let now = env.ledger().timestamp();
        let mut metrics = load_metrics(&env, stream_id);
        metrics.total_delegations += 1;
        metrics.current_delegate = Some(delegate.clone());
        metrics.last_delegation_time = now;
        metrics.last_activity = now;
        save_metrics(&env, stream_id, &metrics);

        let mut protocol = load_protocol_metrics(&env);
        protocol.total_delegations += 1;
        save_protocol_metrics(&env, &protocol);

        env.events().publish(
            (symbol_short!("delegated"), stream_id),
            DelegationGrantedEvent {
                stream_id,
                recipient: stream.recipient,
                delegate,
            },
        );
        Ok(())
    }

    /// Revoke the stream's delegate, if any.
    ///
    /// Recipient-only. Revoking when no delegate is set succeeds as a
    /// no-op; the revocation event is only published when a delegate was
    /// actually cleared.
    pub fn revoke_delegate(env: Env, stream_id: u64) -> Result<(), Error> {
        let stream = load_stream(&env, stream_id)?;
        stream.recipient.require_auth();

        let key = DataKey::Delegate(stream_id);
        if !env.storage().persistent().has(&key) {
            return Ok(());
        }
        env.storage().persistent().remove(&key);

        let mut metrics = load_metrics(&env, stream_id);
        metrics.current_delegate = None;
        metrics.last_activity = env.ledger().timestamp();
        save_metrics(&env, stream_id, &metrics);

        env.events().publish(
            (symbol_short!("revoked"), stream_id),
            DelegationRevokedEvent {
                stream_id,
                recipient: stream.recipient,
            },
        );
        Ok(())
    }

    /// Current delegate for a stream, if one is set.
    pub fn get_delegate(env: Env, stream_id: u64) -> Result<Option<Address>, Error> {
        load_stream(&env, stream_id)?;
        Ok(load_delegate(&env, stream_id))
    }

    /// Retrieve the full state of a stream.
    pub fn get_stream(env: Env, stream_id: u64) -> Result<Stream, Error> {
        load_stream(&env, stream_id)
    }

    /// Amount the recipient (or delegate) could withdraw right now.
    ///
    /// Zero for a canceled stream; frozen at the pause instant while the
    /// stream is paused.
    pub fn withdrawable_amount(env: Env, stream_id: u64) -> Result<i128, Error> {
        let stream = load_stream(&env, stream_id)?;
        Self::withdrawable(&env, &stream)
    }

    /// Per-stream activity counters.
    pub fn get_stream_metrics(env: Env, stream_id: u64) -> Result<StreamMetrics, Error> {
        load_stream(&env, stream_id)?;
        Ok(load_metrics(&env, stream_id))
    }

    /// Protocol-wide counters.
    pub fn get_protocol_metrics(env: Env) -> ProtocolMetrics {
        load_protocol_metrics(&env)
    }

    /// Current protocol fee rate in basis points.
    pub fn get_protocol_fee_rate(env: Env) -> Result<u32, Error> {
        Ok(get_config(&env)?.fee_rate)
    }

    /// Current fee collector address.
    pub fn get_fee_collector(env: Env) -> Result<Address, Error> {
        Ok(get_config(&env)?.fee_collector)
    }

    /// Update the protocol fee rate. Admin-only, bounded like `initialize`.
    pub fn set_protocol_fee_rate(env: Env, new_fee_rate: u32) -> Result<(), Error> {
        let mut config = get_config(&env)?;
        config.admin.require_auth();

        if new_fee_rate > MAX_FEE_RATE {
            return Err(Error::FeeTooHigh);
        }
        config.fee_rate = new_fee_rate;
        put_config(&env, &config);
        Ok(())
    }

    /// Update the fee collector address. Admin-only.
    pub fn set_fee_collector(env: Env, new_fee_collector: Address) -> Result<(), Error> {
        let mut config = get_config(&env)?;
        config.admin.require_auth();

        config.fee_collector = new_fee_collector;
        put_config(&env, &config);
        Ok(())
    }
}
