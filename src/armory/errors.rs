use thiserror::Error;

/// Errors that can arise while operating the armory core.
///
/// Business-rule rejections (already owned, not enough essence) are not
/// errors; they come back as [`crate::armory::PurchaseOutcome`] variants.
#[derive(Debug, Error)]
pub enum ArmoryError {
    /// Currency grants and deductions must move at least one unit.
    #[error("invalid essence amount: {0}")]
    InvalidAmount(u64),

    /// A deduction ran out of essence stacks before the full amount was taken.
    #[error("insufficient funds: requested {requested}, short by {shortfall}")]
    InsufficientFunds { requested: u64, shortfall: u64 },

    /// Attempt to re-stamp an item whose provenance record differs.
    #[error("item {0} already carries a different provenance record")]
    ProvenanceConflict(uuid::Uuid),

    /// The requested tier is not present in the catalog.
    #[error("tier {0} is not configured")]
    UnknownTier(u32),

    /// Returned when a named player is not online.
    #[error("player not found: {0}")]
    PlayerNotFound(String),

    #[error("player already online: {0}")]
    PlayerAlreadyOnline(String),

    #[error("invalid player name: {0}")]
    InvalidPlayerName(#[from] crate::validation::PlayerNameError),

    /// Inventory index does not hold an item.
    #[error("inventory slot {0} is empty")]
    EmptyInventorySlot(usize),

    /// The item at the given inventory index cannot be worn.
    #[error("item in inventory slot {0} cannot be worn")]
    NotWearable(usize),

    /// A menu click arrived for a player with no menu open.
    #[error("no menu open for {0}")]
    NoMenuOpen(String),

    /// Internal error (poisoned locks, unexpected conditions)
    #[error("internal error: {0}")]
    Internal(String),
}
