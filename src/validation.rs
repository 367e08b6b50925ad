//! Input validation for player names and admin command arguments

/// Shortest accepted player name
pub const PLAYER_NAME_MIN: usize = 3;
/// Longest accepted player name
pub const PLAYER_NAME_MAX: usize = 16;

/// Player name validation errors with helpful messages
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlayerNameError {
    #[error("Player name is too short (minimum {min} characters)")]
    TooShort { min: usize },

    #[error("Player name is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("Player name contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },
}

/// Validate a player name: 3 to 16 characters of `[A-Za-z0-9_]`.
/// Returns the trimmed name.
pub fn validate_player_name(name: &str) -> Result<String, PlayerNameError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();

    if len < PLAYER_NAME_MIN {
        return Err(PlayerNameError::TooShort { min: PLAYER_NAME_MIN });
    }
    if len > PLAYER_NAME_MAX {
        return Err(PlayerNameError::TooLong { max: PLAYER_NAME_MAX });
    }

    let mut invalid: Vec<char> = trimmed
        .chars()
        .filter(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        .collect();
    if !invalid.is_empty() {
        invalid.sort_unstable();
        invalid.dedup();
        return Err(PlayerNameError::InvalidCharacters {
            chars: invalid.into_iter().collect(),
        });
    }

    Ok(trimmed.to_string())
}

/// Rejections of an admin command, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminInputError {
    #[error("no subcommand given")]
    Usage,

    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("no player given")]
    MissingPlayer,

    #[error("player not found: {0}")]
    PlayerNotFound(String),

    #[error("no armor type given")]
    MissingType,

    #[error("unknown armor type: {0}")]
    InvalidType(String),

    #[error("no tier given")]
    MissingTier,

    #[error("invalid tier number: {0}")]
    InvalidTierNumber(String),

    #[error("tier {tier} outside 1..={max}")]
    TierOutOfRange { tier: i32, max: u32 },

    #[error("no amount given")]
    MissingAmount,

    #[error("invalid amount number: {0}")]
    InvalidAmountNumber(String),

    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(i32),
}

impl AdminInputError {
    /// Configurable `[messages.admin]` template for this rejection, if any.
    /// The remaining rejections use fixed wording.
    pub fn message_key(&self) -> Option<&'static str> {
        match self {
            AdminInputError::MissingPlayer => Some("choose-player"),
            AdminInputError::MissingType | AdminInputError::InvalidType(_) => Some("choose-type"),
            AdminInputError::MissingTier => Some("choose-tier"),
            AdminInputError::MissingAmount => Some("choose-amount"),
            _ => None,
        }
    }
}

/// Parse a tier argument and check it against `1..=max_tier`.
pub fn parse_tier(arg: &str, max_tier: u32) -> Result<u32, AdminInputError> {
    let tier: i32 = arg
        .trim()
        .parse()
        .map_err(|_| AdminInputError::InvalidTierNumber(arg.to_string()))?;
    if tier < 1 || i64::from(tier) > i64::from(max_tier) {
        return Err(AdminInputError::TierOutOfRange { tier, max: max_tier });
    }
    Ok(tier as u32)
}

/// Parse a strictly positive essence amount.
pub fn parse_amount(arg: &str) -> Result<u32, AdminInputError> {
    let amount: i32 = arg
        .trim()
        .parse()
        .map_err(|_| AdminInputError::InvalidAmountNumber(arg.to_string()))?;
    if amount <= 0 {
        return Err(AdminInputError::NonPositiveAmount(amount));
    }
    Ok(amount as u32)
}
