use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum PoolError {
    /// Contract already initialized
    AlreadyInitialized = 1,
    /// Contract not initialized
    NotInitialized = 2,
    /// No pool exists under this id
    PoolNotFound = 3,
    /// Pool already settled (settlement is terminal)
    AlreadySettled = 4,
    /// Pool not settled yet
    PoolNotSettled = 5,
    /// Event has not ended, outcome cannot be submitted
    EventNotEnded = 6,
    /// Betting window has closed
    BettingClosed = 7,
    /// Betting window is still open
    BettingStillOpen = 8,
    /// Odds must exceed 100 (and stay within the guided range)
    InvalidOdds = 9,
    /// Amount outside the allowed range
    InvalidAmount = 10,
    /// Event timing is invalid
    InvalidEventTime = 11,
    /// Bet would push the pool past its bettor-side capacity
    PoolFull = 12,
    /// Bet would exceed the per-user cap for this pool
    BetLimitExceeded = 13,
    /// Address not whitelisted for this private pool
    NotWhitelisted = 14,
    /// Pool has reached its participant cap
    TooManyParticipants = 15,
    /// Caller is not allowed to perform this action
    Unauthorized = 16,
    /// Caller has nothing claimable on this pool
    NothingToClaim = 17,
    /// Pool has bettor stake, the no-bets refund path is unavailable
    PoolHasBets = 18,
    /// Fee rate outside the allowed range
    InvalidFeeRate = 19,
    /// Arithmetic overflow
    Overflow = 20,
    /// Critical storage data missing (contract state corrupted)
    StorageCorrupted = 21,
}
