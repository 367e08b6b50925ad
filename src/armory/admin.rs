//! Administrative command parsing: `givearmor`, `giveessence`, `reload`.
//!
//! Arguments are checked strictly left to right and the first problem wins,
//! so an operator always hears about the earliest bad argument.

use super::messages::{fill, Messages};
use super::types::PartSelector;
use crate::validation::{parse_amount, parse_tier, AdminInputError};

pub const SUBCOMMANDS: [&str; 3] = ["givearmor", "giveessence", "reload"];
pub const ARMOR_TYPES: [&str; 5] = ["fullset", "head", "chestplate", "leggings", "boots"];
const AMOUNT_HINTS: [&str; 4] = ["1", "10", "100", "1000"];

/// A fully validated admin command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    GiveArmor {
        player: String,
        part: PartSelector,
        tier: u32,
    },
    GiveEssence {
        player: String,
        amount: u32,
    },
    Reload,
}

/// Parse `args` (subcommand first). `resolve_player` maps a typed name to
/// the online player's canonical name.
pub fn parse_admin<F>(
    args: &[&str],
    resolve_player: F,
    max_tier: u32,
) -> Result<AdminCommand, AdminInputError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(sub) = args.first() else {
        return Err(AdminInputError::Usage);
    };
    match sub.to_ascii_lowercase().as_str() {
        "givearmor" => {
            let player = required_player(args, &resolve_player)?;
            let type_arg = args.get(2).ok_or(AdminInputError::MissingType)?;
            let part = PartSelector::parse(type_arg)
                .ok_or_else(|| AdminInputError::InvalidType(type_arg.to_string()))?;
            let tier_arg = args.get(3).ok_or(AdminInputError::MissingTier)?;
            let tier = parse_tier(tier_arg, max_tier)?;
            Ok(AdminCommand::GiveArmor { player, part, tier })
        }
        "giveessence" => {
            let player = required_player(args, &resolve_player)?;
            let amount_arg = args.get(2).ok_or(AdminInputError::MissingAmount)?;
            let amount = parse_amount(amount_arg)?;
            Ok(AdminCommand::GiveEssence { player, amount })
        }
        "reload" => Ok(AdminCommand::Reload),
        other => Err(AdminInputError::UnknownSubcommand(other.to_string())),
    }
}

fn required_player<F>(args: &[&str], resolve_player: &F) -> Result<String, AdminInputError>
where
    F: Fn(&str) -> Option<String>,
{
    let name = args.get(1).ok_or(AdminInputError::MissingPlayer)?;
    resolve_player(name).ok_or_else(|| AdminInputError::PlayerNotFound(name.to_string()))
}

/// Chat reply for a rejected admin command.
pub fn rejection_message(err: &AdminInputError, messages: &Messages) -> String {
    let body = match err.message_key() {
        Some(key) => messages.admin(key),
        None => match err {
            AdminInputError::Usage => {
                "&cUsage: /armoradmin <givearmor|giveessence|reload>".to_string()
            }
            AdminInputError::UnknownSubcommand(_) => "&cUnknown subcommand!".to_string(),
            AdminInputError::PlayerNotFound(_) => "&cPlayer not found!".to_string(),
            AdminInputError::InvalidTierNumber(_) => "&cInvalid tier number!".to_string(),
            AdminInputError::TierOutOfRange { max, .. } => {
                fill("&cTier must be between 1 and {max}!", &[("max", max.to_string())])
            }
            AdminInputError::InvalidAmountNumber(_) => "&cInvalid amount number!".to_string(),
            AdminInputError::NonPositiveAmount(_) => "&cAmount must be positive!".to_string(),
            other => format!("&c{}", other),
        },
    };
    messages.prefixed(&body)
}

/// Tab-completion candidates for the argument being typed (the last one).
pub fn complete(args: &[&str], online: &[String], max_tier: u32) -> Vec<String> {
    let Some(last) = args.last() else {
        return Vec::new();
    };
    let sub = args[0].to_ascii_lowercase();
    let candidates: Vec<String> = match args.len() {
        1 => SUBCOMMANDS.iter().map(|s| s.to_string()).collect(),
        2 if sub == "givearmor" || sub == "giveessence" => online.to_vec(),
        3 if sub == "givearmor" => ARMOR_TYPES.iter().map(|s| s.to_string()).collect(),
        3 if sub == "giveessence" => AMOUNT_HINTS.iter().map(|s| s.to_string()).collect(),
        4 if sub == "givearmor" => (1..=max_tier).map(|t| t.to_string()).collect(),
        _ => Vec::new(),
    };
    let prefix = last.to_ascii_lowercase();
    candidates
        .into_iter()
        .filter(|c| c.to_ascii_lowercase().starts_with(&prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armory::types::Slot;

    fn online(name: &str) -> Option<String> {
        (name.eq_ignore_ascii_case("steve")).then(|| "Steve".to_string())
    }

    fn parse(args: &[&str]) -> Result<AdminCommand, AdminInputError> {
        parse_admin(args, online, 10)
    }

    #[test]
    fn givearmor_parses_all_arguments() {
        assert_eq!(
            parse(&["givearmor", "steve", "head", "4"]),
            Ok(AdminCommand::GiveArmor {
                player: "Steve".into(),
                part: PartSelector::Single(Slot::Head),
                tier: 4
            })
        );
    }

    #[test]
    fn player_is_checked_before_type() {
        assert_eq!(
            parse(&["givearmor", "alex", "cape"]),
            Err(AdminInputError::PlayerNotFound("alex".into()))
        );
        assert_eq!(
            parse(&["givearmor", "steve", "cape"]),
            Err(AdminInputError::InvalidType("cape".into()))
        );
        assert_eq!(
            parse(&["givearmor", "steve", "boots"]),
            Err(AdminInputError::MissingTier)
        );
    }

    #[test]
    fn giveessence_validation_order() {
        assert_eq!(parse(&["giveessence"]), Err(AdminInputError::MissingPlayer));
        assert_eq!(
            parse(&["giveessence", "steve"]),
            Err(AdminInputError::MissingAmount)
        );
        assert_eq!(
            parse(&["giveessence", "steve", "lots"]),
            Err(AdminInputError::InvalidAmountNumber("lots".into()))
        );
        assert_eq!(
            parse(&["giveessence", "steve", "-3"]),
            Err(AdminInputError::NonPositiveAmount(-3))
        );
    }

    #[test]
    fn subcommand_errors() {
        assert_eq!(parse(&[]), Err(AdminInputError::Usage));
        assert_eq!(
            parse(&["explode"]),
            Err(AdminInputError::UnknownSubcommand("explode".into()))
        );
        assert_eq!(parse(&["RELOAD"]), Ok(AdminCommand::Reload));
    }

    #[test]
    fn completion_filters_by_prefix() {
        let players = vec!["Steve".to_string(), "Alex".to_string()];
        assert_eq!(complete(&["give"], &players, 10), vec!["givearmor", "giveessence"]);
        assert_eq!(complete(&["givearmor", "s"], &players, 10), vec!["Steve"]);
        assert_eq!(complete(&["givearmor", "Steve", "l"], &players, 10), vec!["leggings"]);
        assert_eq!(complete(&["giveessence", "Steve", "1"], &players, 10).len(), 4);
        assert!(complete(&["reload", "x"], &players, 10).is_empty());
        assert_eq!(
            complete(&["givearmor", "Steve", "head", ""], &players, 3),
            vec!["1", "2", "3"]
        );
    }
}
