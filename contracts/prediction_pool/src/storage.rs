use soroban_sdk::{contracttype, Address, BytesN};

/// Storage keys for the contract.
/// Using enum with variants for type-safe storage access.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Engine-wide configuration (instance storage)
    Config,
    /// Next pool id to assign (instance storage)
    PoolCount,
    /// Pool state by id
    Pool(u64),
    /// Stake entry: Stake(pool_id, address, side)
    Stake(u64, Address, u32),
    /// Private-pool whitelist membership: Whitelisted(pool_id, address)
    Whitelisted(u64, Address),
    /// Per-address discounted fee rate in basis points
    FeeRate(Address),
}

/// Stake side constants
pub const SIDE_CREATOR: u32 = 0;
pub const SIDE_BETTOR: u32 = 1;

/// Odds basis: 100 = 1.00x payout multiplier.
pub const ODDS_BASIS: i128 = 100;

/// Minimum odds. The capacity formula divides by (odds - 100), so odds
/// at or below 100 are never admitted.
pub const MIN_ODDS: u32 = 101;

/// Maximum odds for guided pools (100.00x).
pub const MAX_GUIDED_ODDS: u32 = 10_000;

/// Basis points denominator (100% = 10000 bp).
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Default protocol fee on bettor profit: 500 bp = 5%.
pub const DEFAULT_FEE_BPS: i128 = 500;

/// Gap between the end of betting and the event start, in seconds.
pub const GRACE_PERIOD: u64 = 60;

/// Events may start at most this far in the future (365 days).
pub const MAX_FUTURE_WINDOW: u64 = 365 * 24 * 60 * 60;

/// Default stake limits, in the smallest token unit.
pub const DEFAULT_MIN_POOL_STAKE: i128 = 10;
pub const DEFAULT_MIN_BET: i128 = 1;
pub const DEFAULT_MAX_BET: i128 = 1_000_000_000_000;
pub const DEFAULT_MIN_LIQUIDITY: i128 = 1;
pub const DEFAULT_MAX_LIQUIDITY: i128 = 1_000_000_000_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[contracttype]
pub enum PoolStatus {
    Active = 0,
    Settled = 1,
}

/// Which oracle identity may submit the outcome for a pool.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[contracttype]
pub enum OracleType {
    /// Single trusted reporter
    Guided = 0,
    /// Optimistic oracle; disputes are finalized upstream before submission
    Open = 1,
}

/// One prediction market instance.
///
/// The creator side (creator plus liquidity providers) implicitly bets
/// that `predicted_outcome` will NOT occur; bettors bet that it will,
/// at fixed basis-100 odds. `creator_side_won`, `result` and
/// `result_timestamp` are meaningful only once `status == Settled`.
#[derive(Clone)]
#[contracttype]
pub struct Pool {
    pub creator: Address,
    /// Fingerprint of the outcome the bettor side must match to win
    pub predicted_outcome: BytesN<32>,
    /// Basis-100 odds (always > 100)
    pub odds: u32,
    pub creator_stake: i128,
    /// Creator stake plus all liquidity-provider contributions
    pub total_creator_side_stake: i128,
    pub total_bettor_stake: i128,
    /// Capacity bound, recomputed whenever creator-side stake changes
    pub max_bettor_stake: i128,
    pub event_start_time: u64,
    pub event_end_time: u64,
    /// event_start_time - GRACE_PERIOD; no new stakes at or after this
    pub betting_end_time: u64,
    pub status: PoolStatus,
    pub oracle_type: OracleType,
    pub is_private: bool,
    /// Per-address cumulative bet cap (0 = unbounded)
    pub max_bet_per_user: i128,
    pub use_alt_token: bool,
    /// Distinct staking addresses, bounded by the configured cap
    pub participants: u32,
    pub creator_side_won: bool,
    pub result: BytesN<32>,
    pub result_timestamp: u64,
}

/// Per-pool, per-address, per-side stake record.
#[derive(Clone)]
#[contracttype]
pub struct StakeEntry {
    pub amount: i128,
    pub claimed: bool,
}

/// Engine-wide configuration, written at initialization and adjusted
/// through the admin entry points.
#[derive(Clone)]
#[contracttype]
pub struct EngineConfig {
    pub admin: Address,
    /// Identity allowed to settle guided pools
    pub guided_oracle: Address,
    /// Identity allowed to settle open pools
    pub open_oracle: Address,
    /// Receives the protocol fee on bettor profit
    pub fee_collector: Address,
    /// Default settlement token
    pub token: Address,
    /// Alternate settlement token for pools created with use_alt_token
    pub alt_token: Address,
    /// Fee on bettor profit in basis points
    pub base_fee_bps: i128,
    pub min_pool_stake: i128,
    pub min_bet: i128,
    pub max_bet: i128,
    pub min_liquidity: i128,
    pub max_liquidity: i128,
    /// Cap on distinct staking addresses per pool (0 = unbounded)
    pub max_participants: u32,
}
