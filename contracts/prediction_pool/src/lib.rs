#![no_std]

mod error;
mod math;
mod storage;

use error::PoolError;
use soroban_sdk::{contract, contractimpl, token, Address, BytesN, Env};
use storage::{
    DataKey, EngineConfig, OracleType, Pool, PoolStatus, StakeEntry, BPS_DENOMINATOR,
    DEFAULT_FEE_BPS, DEFAULT_MAX_BET, DEFAULT_MAX_LIQUIDITY, DEFAULT_MIN_BET,
    DEFAULT_MIN_LIQUIDITY, DEFAULT_MIN_POOL_STAKE, GRACE_PERIOD, MAX_FUTURE_WINDOW,
    MAX_GUIDED_ODDS, MIN_ODDS, SIDE_BETTOR, SIDE_CREATOR,
};

/// Pari-Mutuel Prediction Pool Contract
///
/// Each pool is one prediction market: the creator (plus liquidity
/// providers) stakes against an outcome fingerprint, bettors stake on it
/// at fixed basis-100 odds. The bettor side is capacity-bounded so the
/// pool stays solvent for any admitted combination of stakes.
///
/// Key features:
/// - Creator-side stake bounds bettor capacity: stake * 100 / (odds - 100)
/// - Liquidity can be added mid-betting and only ever raises capacity
/// - Guided and open pools are settled by distinct oracle identities
/// - Claims are pull-based per address, O(1) per call, never iterated
/// - Protocol fee is charged on bettor profit only, never on principal
#[contract]
pub struct PredictionPool;

#[contractimpl]
impl PredictionPool {
    /// Constructor: delegates to initialize() for the actual setup logic.
    pub fn __constructor(
        env: Env,
        admin: Address,
        guided_oracle: Address,
        open_oracle: Address,
        fee_collector: Address,
        token: Address,
        alt_token: Address,
    ) {
        Self::initialize(env, admin, guided_oracle, open_oracle, fee_collector, token, alt_token)
            .expect("initialization failed");
    }

    /// Initialize the engine with its collaborator identities.
    ///
    /// # Arguments
    /// * `admin` - Address that can adjust fees and limits
    /// * `guided_oracle` - Identity allowed to settle guided pools
    /// * `open_oracle` - Identity allowed to settle open pools
    /// * `fee_collector` - Receives the protocol fee on bettor profit
    /// * `token` - Default settlement token contract
    /// * `alt_token` - Alternate settlement token contract
    pub fn initialize(
        env: Env,
        admin: Address,
        guided_oracle: Address,
        open_oracle: Address,
        fee_collector: Address,
        token: Address,
        alt_token: Address,
    ) -> Result<(), PoolError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(PoolError::AlreadyInitialized);
        }

        admin.require_auth();

        let config = EngineConfig {
            admin,
            guided_oracle,
            open_oracle,
            fee_collector,
            token,
            alt_token,
            base_fee_bps: DEFAULT_FEE_BPS,
            min_pool_stake: DEFAULT_MIN_POOL_STAKE,
            min_bet: DEFAULT_MIN_BET,
            max_bet: DEFAULT_MAX_BET,
            min_liquidity: DEFAULT_MIN_LIQUIDITY,
            max_liquidity: DEFAULT_MAX_LIQUIDITY,
            max_participants: 0,
        };
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage().instance().set(&DataKey::PoolCount, &0u64);

        Ok(())
    }

    /// Open a new prediction pool.
    ///
    /// The creator implicitly bets that `predicted_outcome` will NOT
    /// occur and funds the pool with `creator_stake`, which bounds the
    /// bettor-side capacity at stake * 100 / (odds - 100).
    ///
    /// # Arguments
    /// * `creator` - Pool creator (must authorize; pays the stake)
    /// * `predicted_outcome` - Fingerprint the bettor side must match to win
    /// * `odds` - Basis-100 odds; > 100, and <= 10000 for guided pools
    /// * `creator_stake` - Initial creator-side stake
    /// * `event_start_time` - Betting closes GRACE_PERIOD before this
    /// * `event_end_time` - Outcome may be submitted from this time on
    /// * `oracle_type` - Which oracle identity settles this pool
    /// * `is_private` - Restrict bettors to the pool whitelist
    /// * `max_bet_per_user` - Cumulative per-address bet cap (0 = unbounded)
    /// * `use_alt_token` - Settle in the alternate token
    ///
    /// # Returns
    /// Id of the created pool
    pub fn create_pool(
        env: Env,
        creator: Address,
        predicted_outcome: BytesN<32>,
        odds: u32,
        creator_stake: i128,
        event_start_time: u64,
        event_end_time: u64,
        oracle_type: OracleType,
        is_private: bool,
        max_bet_per_user: i128,
        use_alt_token: bool,
    ) -> Result<u64, PoolError> {
        let config = Self::config(&env)?;

        if odds < MIN_ODDS {
            return Err(PoolError::InvalidOdds);
        }
        if oracle_type == OracleType::Guided && odds > MAX_GUIDED_ODDS {
            return Err(PoolError::InvalidOdds);
        }
        if creator_stake < config.min_pool_stake {
            return Err(PoolError::InvalidAmount);
        }
        if max_bet_per_user < 0 {
            return Err(PoolError::InvalidAmount);
        }

        let now = env.ledger().timestamp();
        if event_start_time <= now + GRACE_PERIOD {
            return Err(PoolError::InvalidEventTime);
        }
        if event_end_time <= event_start_time {
            return Err(PoolError::InvalidEventTime);
        }
        if event_start_time > now + MAX_FUTURE_WINDOW {
            return Err(PoolError::InvalidEventTime);
        }

        creator.require_auth();

        let settlement_token = Self::token_for(&config, use_alt_token);
        let token_client = token::Client::new(&env, &settlement_token);
        token_client.transfer(&creator, &env.current_contract_address(), &creator_stake);

        let max_bettor_stake = math::max_bettor_stake(creator_stake, odds)?;

        let pool_id: u64 = env
            .storage()
            .instance()
            .get(&DataKey::PoolCount)
            .ok_or(PoolError::StorageCorrupted)?;
        env.storage()
            .instance()
            .set(&DataKey::PoolCount, &(pool_id + 1));

        let pool = Pool {
            creator: creator.clone(),
            predicted_outcome,
            odds,
            creator_stake,
            total_creator_side_stake: creator_stake,
            total_bettor_stake: 0,
            max_bettor_stake,
            event_start_time,
            event_end_time,
            betting_end_time: event_start_time - GRACE_PERIOD,
            status: PoolStatus::Active,
            oracle_type,
            is_private,
            max_bet_per_user,
            use_alt_token,
            participants: 1,
            creator_side_won: false,
            result: BytesN::from_array(&env, &[0u8; 32]),
            result_timestamp: 0,
        };
        env.storage().persistent().set(&DataKey::Pool(pool_id), &pool);

        let entry = StakeEntry {
            amount: creator_stake,
            claimed: false,
        };
        env.storage()
            .persistent()
            .set(&DataKey::Stake(pool_id, creator, SIDE_CREATOR), &entry);

        Ok(pool_id)
    }

    /// Place a fixed-odds bet on the pool's predicted outcome.
    ///
    /// # Arguments
    /// * `bettor` - Bettor (must authorize; pays the stake)
    /// * `pool_id` - Pool to bet on
    /// * `amount` - Stake in the pool's settlement token
    pub fn place_bet(env: Env, bettor: Address, pool_id: u64, amount: i128) -> Result<(), PoolError> {
        let config = Self::config(&env)?;
        let mut pool = Self::load_pool(&env, pool_id)?;

        if pool.status != PoolStatus::Active {
            return Err(PoolError::AlreadySettled);
        }
        if env.ledger().timestamp() >= pool.betting_end_time {
            return Err(PoolError::BettingClosed);
        }
        if amount < config.min_bet || amount > config.max_bet {
            return Err(PoolError::InvalidAmount);
        }

        let new_total = pool
            .total_bettor_stake
            .checked_add(amount)
            .ok_or(PoolError::Overflow)?;
        if new_total > pool.max_bettor_stake {
            return Err(PoolError::PoolFull);
        }

        if pool.is_private {
            let whitelisted: bool = env
                .storage()
                .persistent()
                .get(&DataKey::Whitelisted(pool_id, bettor.clone()))
                .unwrap_or(false);
            if !whitelisted {
                return Err(PoolError::NotWhitelisted);
            }
        }

        let mut entry = Self::load_stake(&env, pool_id, &bettor, SIDE_BETTOR);
        let cumulative = entry.amount.checked_add(amount).ok_or(PoolError::Overflow)?;
        if pool.max_bet_per_user > 0 && cumulative > pool.max_bet_per_user {
            return Err(PoolError::BetLimitExceeded);
        }
        if entry.amount == 0 {
            if config.max_participants > 0 && pool.participants >= config.max_participants {
                return Err(PoolError::TooManyParticipants);
            }
            pool.participants += 1;
        }

        bettor.require_auth();

        let settlement_token = Self::token_for(&config, pool.use_alt_token);
        let token_client = token::Client::new(&env, &settlement_token);
        token_client.transfer(&bettor, &env.current_contract_address(), &amount);

        entry.amount = cumulative;
        env.storage()
            .persistent()
            .set(&DataKey::Stake(pool_id, bettor, SIDE_BETTOR), &entry);

        pool.total_bettor_stake = new_total;
        env.storage().persistent().set(&DataKey::Pool(pool_id), &pool);

        Ok(())
    }

    /// Add creator-side liquidity to a pool.
    ///
    /// Raises the creator-side stake and eagerly recomputes the bettor
    /// capacity, which can grow mid-betting (never shrink).
    pub fn add_liquidity(
        env: Env,
        provider: Address,
        pool_id: u64,
        amount: i128,
    ) -> Result<(), PoolError> {
        let config = Self::config(&env)?;
        let mut pool = Self::load_pool(&env, pool_id)?;

        if pool.status != PoolStatus::Active {
            return Err(PoolError::AlreadySettled);
        }
        if env.ledger().timestamp() >= pool.betting_end_time {
            return Err(PoolError::BettingClosed);
        }
        if amount < config.min_liquidity || amount > config.max_liquidity {
            return Err(PoolError::InvalidAmount);
        }

        let mut entry = Self::load_stake(&env, pool_id, &provider, SIDE_CREATOR);
        if entry.amount == 0 {
            if config.max_participants > 0 && pool.participants >= config.max_participants {
                return Err(PoolError::TooManyParticipants);
            }
            pool.participants += 1;
        }

        provider.require_auth();

        let settlement_token = Self::token_for(&config, pool.use_alt_token);
        let token_client = token::Client::new(&env, &settlement_token);
        token_client.transfer(&provider, &env.current_contract_address(), &amount);

        entry.amount = entry.amount.checked_add(amount).ok_or(PoolError::Overflow)?;
        env.storage()
            .persistent()
            .set(&DataKey::Stake(pool_id, provider, SIDE_CREATOR), &entry);

        pool.total_creator_side_stake = pool
            .total_creator_side_stake
            .checked_add(amount)
            .ok_or(PoolError::Overflow)?;
        pool.max_bettor_stake = math::max_bettor_stake(pool.total_creator_side_stake, pool.odds)?;
        env.storage().persistent().set(&DataKey::Pool(pool_id), &pool);

        Ok(())
    }

    /// Submit the event outcome and settle the pool (oracle only).
    ///
    /// The creator side wins exactly when the submitted outcome differs
    /// from the pool's predicted outcome. Settlement is terminal: a
    /// second submission is rejected and never changes the result.
    ///
    /// # Returns
    /// Whether the creator side won
    pub fn settle_pool(
        env: Env,
        oracle: Address,
        pool_id: u64,
        outcome: BytesN<32>,
    ) -> Result<bool, PoolError> {
        let config = Self::config(&env)?;
        let mut pool = Self::load_pool(&env, pool_id)?;

        if pool.status != PoolStatus::Active {
            return Err(PoolError::AlreadySettled);
        }
        let now = env.ledger().timestamp();
        if now < pool.event_end_time {
            return Err(PoolError::EventNotEnded);
        }

        let expected = match pool.oracle_type {
            OracleType::Guided => config.guided_oracle,
            OracleType::Open => config.open_oracle,
        };
        if oracle != expected {
            return Err(PoolError::Unauthorized);
        }
        oracle.require_auth();

        let creator_side_won = outcome != pool.predicted_outcome;
        pool.status = PoolStatus::Settled;
        pool.creator_side_won = creator_side_won;
        pool.result = outcome;
        pool.result_timestamp = now;
        env.storage().persistent().set(&DataKey::Pool(pool_id), &pool);

        Ok(creator_side_won)
    }

    /// No-bets refund path: once betting has closed with zero bettor
    /// stake, the creator can settle the pool without an oracle and
    /// recover their own principal. Liquidity providers recover theirs
    /// through claim(); with no bettor stake the proportional bonus is
    /// zero, so every contributor gets back exactly what they put in.
    ///
    /// # Returns
    /// The creator's refunded principal
    pub fn withdraw_creator_stake(env: Env, creator: Address, pool_id: u64) -> Result<i128, PoolError> {
        let config = Self::config(&env)?;
        let mut pool = Self::load_pool(&env, pool_id)?;

        if pool.status != PoolStatus::Active {
            return Err(PoolError::AlreadySettled);
        }
        if creator != pool.creator {
            return Err(PoolError::Unauthorized);
        }
        let now = env.ledger().timestamp();
        if now < pool.betting_end_time {
            return Err(PoolError::BettingStillOpen);
        }
        if pool.total_bettor_stake != 0 {
            return Err(PoolError::PoolHasBets);
        }

        creator.require_auth();

        let mut entry = Self::load_stake(&env, pool_id, &creator, SIDE_CREATOR);
        if entry.amount <= 0 || entry.claimed {
            return Err(PoolError::NothingToClaim);
        }
        let refund = entry.amount;

        // Mark claimed and settle before any transfer.
        entry.claimed = true;
        env.storage()
            .persistent()
            .set(&DataKey::Stake(pool_id, creator.clone(), SIDE_CREATOR), &entry);

        pool.status = PoolStatus::Settled;
        pool.creator_side_won = true;
        pool.result_timestamp = now;
        env.storage().persistent().set(&DataKey::Pool(pool_id), &pool);

        let settlement_token = Self::token_for(&config, pool.use_alt_token);
        let token_client = token::Client::new(&env, &settlement_token);
        token_client.transfer(&env.current_contract_address(), &creator, &refund);

        Ok(refund)
    }

    /// Claim the caller's payout on a settled pool. Pull-based and
    /// per-address: each call does O(1) work and each stake entry can be
    /// claimed exactly once.
    ///
    /// - Bettor side won: stake * odds / 100 gross, minus the protocol
    ///   fee on profit; the fee goes to the fee collector.
    /// - Creator side won: own principal plus a proportional share of
    ///   the bettor stake; no fee.
    ///
    /// # Returns
    /// Net amount transferred to the claimant
    pub fn claim(env: Env, claimant: Address, pool_id: u64) -> Result<i128, PoolError> {
        let config = Self::config(&env)?;
        let pool = Self::load_pool(&env, pool_id)?;

        if pool.status != PoolStatus::Settled {
            return Err(PoolError::PoolNotSettled);
        }

        claimant.require_auth();

        let side = if pool.creator_side_won {
            SIDE_CREATOR
        } else {
            SIDE_BETTOR
        };
        let mut entry = Self::load_stake(&env, pool_id, &claimant, side);
        if entry.amount <= 0 || entry.claimed {
            return Err(PoolError::NothingToClaim);
        }

        // Mark claimed before transferring funds.
        entry.claimed = true;
        env.storage()
            .persistent()
            .set(&DataKey::Stake(pool_id, claimant.clone(), side), &entry);

        let settlement_token = Self::token_for(&config, pool.use_alt_token);
        let token_client = token::Client::new(&env, &settlement_token);

        if pool.creator_side_won {
            let payout = math::creator_side_payout(
                entry.amount,
                pool.total_creator_side_stake,
                pool.total_bettor_stake,
            )?;
            token_client.transfer(&env.current_contract_address(), &claimant, &payout);
            Ok(payout)
        } else {
            let gross = math::bettor_gross_payout(entry.amount, pool.odds)?;
            let profit = gross.checked_sub(entry.amount).ok_or(PoolError::Overflow)?;
            let fee_bps = Self::fee_bps_for(&env, &config, &claimant);
            let fee = math::fee_on_profit(profit, fee_bps)?;
            let net = gross.checked_sub(fee).ok_or(PoolError::Overflow)?;

            if fee > 0 {
                token_client.transfer(&env.current_contract_address(), &config.fee_collector, &fee);
            }
            token_client.transfer(&env.current_contract_address(), &claimant, &net);
            Ok(net)
        }
    }

    /// Whitelist an address for a private pool (creator only, while the
    /// pool is still active).
    pub fn add_to_whitelist(
        env: Env,
        creator: Address,
        pool_id: u64,
        address: Address,
    ) -> Result<(), PoolError> {
        Self::require_initialized(&env)?;
        let pool = Self::load_pool(&env, pool_id)?;

        if pool.status != PoolStatus::Active {
            return Err(PoolError::AlreadySettled);
        }
        if creator != pool.creator {
            return Err(PoolError::Unauthorized);
        }
        creator.require_auth();

        env.storage()
            .persistent()
            .set(&DataKey::Whitelisted(pool_id, address), &true);

        Ok(())
    }

    /// Remove an address from a private pool's whitelist (creator only,
    /// while the pool is still active).
    pub fn remove_from_whitelist(
        env: Env,
        creator: Address,
        pool_id: u64,
        address: Address,
    ) -> Result<(), PoolError> {
        Self::require_initialized(&env)?;
        let pool = Self::load_pool(&env, pool_id)?;

        if pool.status != PoolStatus::Active {
            return Err(PoolError::AlreadySettled);
        }
        if creator != pool.creator {
            return Err(PoolError::Unauthorized);
        }
        creator.require_auth();

        env.storage()
            .persistent()
            .remove(&DataKey::Whitelisted(pool_id, address));

        Ok(())
    }

    /// Whether an address may bet on the pool. Public pools admit
    /// everyone.
    pub fn is_whitelisted(env: Env, pool_id: u64, address: Address) -> Result<bool, PoolError> {
        let pool = Self::load_pool(&env, pool_id)?;
        if !pool.is_private {
            return Ok(true);
        }
        Ok(env
            .storage()
            .persistent()
            .get(&DataKey::Whitelisted(pool_id, address))
            .unwrap_or(false))
    }

    /// Update the base fee on bettor profit (admin only).
    pub fn set_base_fee(env: Env, admin: Address, fee_bps: i128) -> Result<(), PoolError> {
        let mut config = Self::config(&env)?;
        Self::require_admin(&config, &admin)?;
        admin.require_auth();

        if !(0..=BPS_DENOMINATOR).contains(&fee_bps) {
            return Err(PoolError::InvalidFeeRate);
        }
        config.base_fee_bps = fee_bps;
        env.storage().instance().set(&DataKey::Config, &config);

        Ok(())
    }

    /// Register a discounted fee rate for an address (admin only). The
    /// discount is fed by an external reputation/holdings signal and can
    /// never exceed the base rate.
    pub fn set_fee_discount(
        env: Env,
        admin: Address,
        address: Address,
        fee_bps: i128,
    ) -> Result<(), PoolError> {
        let config = Self::config(&env)?;
        Self::require_admin(&config, &admin)?;
        admin.require_auth();

        if fee_bps < 0 || fee_bps > config.base_fee_bps {
            return Err(PoolError::InvalidFeeRate);
        }
        env.storage()
            .persistent()
            .set(&DataKey::FeeRate(address), &fee_bps);

        Ok(())
    }

    /// Update the fee collector address (admin only).
    pub fn set_fee_collector(env: Env, admin: Address, new_collector: Address) -> Result<(), PoolError> {
        let mut config = Self::config(&env)?;
        Self::require_admin(&config, &admin)?;
        admin.require_auth();

        config.fee_collector = new_collector;
        env.storage().instance().set(&DataKey::Config, &config);

        Ok(())
    }

    /// Update stake limits and the participant cap (admin only).
    pub fn set_limits(
        env: Env,
        admin: Address,
        min_pool_stake: i128,
        min_bet: i128,
        max_bet: i128,
        min_liquidity: i128,
        max_liquidity: i128,
        max_participants: u32,
    ) -> Result<(), PoolError> {
        let mut config = Self::config(&env)?;
        Self::require_admin(&config, &admin)?;
        admin.require_auth();

        if min_pool_stake <= 0 || min_bet <= 0 || min_liquidity <= 0 {
            return Err(PoolError::InvalidAmount);
        }
        if max_bet < min_bet || max_liquidity < min_liquidity {
            return Err(PoolError::InvalidAmount);
        }

        config.min_pool_stake = min_pool_stake;
        config.min_bet = min_bet;
        config.max_bet = max_bet;
        config.min_liquidity = min_liquidity;
        config.max_liquidity = max_liquidity;
        config.max_participants = max_participants;
        env.storage().instance().set(&DataKey::Config, &config);

        Ok(())
    }

    /// Get a pool snapshot.
    pub fn get_pool(env: Env, pool_id: u64) -> Result<Pool, PoolError> {
        Self::load_pool(&env, pool_id)
    }

    /// Get an address's stake entry on one side of a pool. Returns a
    /// zeroed entry when the address never staked that side.
    pub fn get_stake(env: Env, pool_id: u64, address: Address, side: u32) -> StakeEntry {
        Self::load_stake(&env, pool_id, &address, side)
    }

    /// Net payout a bettor would receive for a hypothetical stake if the
    /// bettor side wins, after that address's fee on profit.
    pub fn potential_payout(
        env: Env,
        pool_id: u64,
        address: Address,
        amount: i128,
    ) -> Result<i128, PoolError> {
        let config = Self::config(&env)?;
        let pool = Self::load_pool(&env, pool_id)?;

        if amount <= 0 {
            return Err(PoolError::InvalidAmount);
        }

        let gross = math::bettor_gross_payout(amount, pool.odds)?;
        let profit = gross.checked_sub(amount).ok_or(PoolError::Overflow)?;
        let fee = math::fee_on_profit(profit, Self::fee_bps_for(&env, &config, &address))?;
        gross.checked_sub(fee).ok_or(PoolError::Overflow)
    }

    /// Fee rate in basis points that applies to an address's profit.
    pub fn effective_fee_bps(env: Env, address: Address) -> Result<i128, PoolError> {
        let config = Self::config(&env)?;
        Ok(Self::fee_bps_for(&env, &config, &address))
    }

    /// Get the engine configuration.
    pub fn get_config(env: Env) -> Result<EngineConfig, PoolError> {
        Self::config(&env)
    }

    /// Get the number of pools created so far.
    pub fn pool_count(env: Env) -> Result<u64, PoolError> {
        Self::require_initialized(&env)?;
        env.storage()
            .instance()
            .get(&DataKey::PoolCount)
            .ok_or(PoolError::StorageCorrupted)
    }

    // --- Internal helpers ---

    fn config(env: &Env) -> Result<EngineConfig, PoolError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(PoolError::NotInitialized)
    }

    fn require_initialized(env: &Env) -> Result<(), PoolError> {
        if !env.storage().instance().has(&DataKey::Config) {
            return Err(PoolError::NotInitialized);
        }
        Ok(())
    }

    fn require_admin(config: &EngineConfig, caller: &Address) -> Result<(), PoolError> {
        if *caller != config.admin {
            return Err(PoolError::Unauthorized);
        }
        Ok(())
    }

    fn load_pool(env: &Env, pool_id: u64) -> Result<Pool, PoolError> {
        env.storage()
            .persistent()
            .get(&DataKey::Pool(pool_id))
            .ok_or(PoolError::PoolNotFound)
    }

    fn load_stake(env: &Env, pool_id: u64, address: &Address, side: u32) -> StakeEntry {
        env.storage()
            .persistent()
            .get(&DataKey::Stake(pool_id, address.clone(), side))
            .unwrap_or(StakeEntry {
                amount: 0,
                claimed: false,
            })
    }

    fn token_for(config: &EngineConfig, use_alt_token: bool) -> Address {
        if use_alt_token {
            config.alt_token.clone()
        } else {
            config.token.clone()
        }
    }

    /// An address's fee never exceeds the current base rate, even if a
    /// stale discount is still registered above a lowered base.
    fn fee_bps_for(env: &Env, config: &EngineConfig, address: &Address) -> i128 {
        let rate: i128 = env
            .storage()
            .persistent()
            .get(&DataKey::FeeRate(address.clone()))
            .unwrap_or(config.base_fee_bps);
        rate.min(config.base_fee_bps)
    }
}
