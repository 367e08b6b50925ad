//! Equipment provenance: stamping issued armor and reading ownership back
//! from what a player is wearing.
//!
//! Identity is decided by the structured record only (slot + provenance),
//! never by display text.

use super::catalog::TierDefinition;
use super::errors::ArmoryError;
use super::types::{Holdings, ItemStack, Provenance, ProvenanceTag, Slot};
use crate::armory::messages::fill;

/// Stamp `item` as a catalog-issued piece. Re-stamping with identical values
/// is a no-op; a different record is refused.
pub fn tag(item: &mut ItemStack, tier: u32, multiplier: f64) -> Result<(), ArmoryError> {
    let record = ProvenanceTag::armor(tier, multiplier);
    match &item.provenance {
        None => {
            item.provenance = Some(record);
            Ok(())
        }
        Some(existing) if *existing == record => Ok(()),
        Some(_) => Err(ArmoryError::ProvenanceConflict(item.id)),
    }
}

fn armor_record(item: &ItemStack) -> Option<(u32, f64)> {
    match item.provenance.as_ref().map(|t| &t.provenance) {
        Some(Provenance::Armor { tier, multiplier }) => Some((*tier, *multiplier)),
        _ => None,
    }
}

/// True for armor pieces this crate issued.
pub fn is_recognized(item: &ItemStack) -> bool {
    item.slot().is_some() && armor_record(item).is_some()
}

/// Origin tier of a recognised piece; 0 for anything else.
pub fn tier_of(item: &ItemStack) -> u32 {
    if !is_recognized(item) {
        return 0;
    }
    armor_record(item).map(|(tier, _)| tier).unwrap_or(0)
}

/// Baked-in per-piece multiplier; 0.0 for unrecognised items.
pub fn multiplier_of(item: &ItemStack) -> f64 {
    if !is_recognized(item) {
        return 0.0;
    }
    armor_record(item).map(|(_, m)| m).unwrap_or(0.0)
}

/// Tier owned in `slot`, derived from the worn piece (0 = not owned).
pub fn equipped_tier(holdings: &Holdings, slot: Slot) -> u32 {
    holdings
        .equipped(slot)
        .filter(|item| item.slot() == Some(slot))
        .map(tier_of)
        .unwrap_or(0)
}

/// Sum of per-piece multipliers over worn, recognised pieces.
pub fn total_multiplier(holdings: &Holdings) -> f64 {
    holdings
        .equipment()
        .map(|(_, item)| multiplier_of(item))
        .sum()
}

/// Number of slots currently holding a recognised piece.
pub fn equipped_count(holdings: &Holdings) -> usize {
    holdings
        .equipment()
        .filter(|(_, item)| is_recognized(item))
        .count()
}

/// Build a named, dressed and tagged piece of `tier` for `slot`.
pub fn issue_piece(
    tier: &TierDefinition,
    slot: Slot,
    name_format: &str,
) -> Result<ItemStack, ArmoryError> {
    let name = fill(
        name_format,
        &[
            ("hex_color", tier.hex_color().to_string()),
            ("tier_name", tier.name().to_string()),
            ("piece_name", slot.piece_name().to_string()),
        ],
    );
    let mut piece = ItemStack::wearable(slot, &name).with_lore(tier.lore().to_vec());
    piece = match slot {
        Slot::Head => piece.with_texture(tier.head_texture()),
        _ => piece.with_dye(tier.rgb()),
    };
    tag(&mut piece, tier.tier(), tier.multiplier())?;
    Ok(piece)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armory::types::{Material, Rgb};

    fn gold() -> TierDefinition {
        TierDefinition::new(4, "Gold", Rgb::new(255, 215, 0), "<##FFD700>", 0.2, 85, "tex-gold")
    }

    #[test]
    fn tag_is_idempotent_for_identical_values() {
        let mut item = ItemStack::wearable(Slot::Chest, "Shirt");
        tag(&mut item, 3, 0.15).unwrap();
        let first = item.clone();
        tag(&mut item, 3, 0.15).unwrap();
        assert_eq!(item, first);
    }

    #[test]
    fn tag_refuses_to_rewrite_provenance() {
        let mut item = ItemStack::wearable(Slot::Chest, "Shirt");
        tag(&mut item, 3, 0.15).unwrap();
        assert!(matches!(
            tag(&mut item, 4, 0.15),
            Err(ArmoryError::ProvenanceConflict(_))
        ));
        assert_eq!(tier_of(&item), 3);
    }

    #[test]
    fn foreign_items_have_no_tier() {
        let item = ItemStack::wearable(Slot::Head, "Gold Helmet");
        assert!(!is_recognized(&item));
        assert_eq!(tier_of(&item), 0);
        assert_eq!(multiplier_of(&item), 0.0);

        let mut star = ItemStack::new(Material::NetherStar, "Star", 1);
        star.provenance = Some(ProvenanceTag::essence());
        assert!(!is_recognized(&star));
    }

    #[test]
    fn issued_piece_round_trips_tier_and_multiplier() {
        let piece = issue_piece(&gold(), Slot::Feet, "{hex_color}{tier_name} {piece_name}").unwrap();
        assert_eq!(piece.display_name, "<##FFD700>Gold Boots");
        assert_eq!(piece.dye, Some(Rgb::new(255, 215, 0)));
        assert_eq!(tier_of(&piece), 4);
        assert_eq!(multiplier_of(&piece), 0.2);
    }

    #[test]
    fn helmet_carries_texture_instead_of_dye() {
        let piece = issue_piece(&gold(), Slot::Head, "{tier_name} {piece_name}").unwrap();
        assert_eq!(piece.texture.as_deref(), Some("tex-gold"));
        assert!(piece.dye.is_none());
    }

    #[test]
    fn worn_totals_ignore_foreign_items() {
        let mut holdings = Holdings::with_capacity(4);
        let fmt = "{tier_name} {piece_name}";
        holdings.set_equipped(Slot::Head, Some(issue_piece(&gold(), Slot::Head, fmt).unwrap()));
        holdings.set_equipped(Slot::Legs, Some(issue_piece(&gold(), Slot::Legs, fmt).unwrap()));
        holdings.set_equipped(Slot::Feet, Some(ItemStack::wearable(Slot::Feet, "Gold Boots")));

        assert_eq!(equipped_count(&holdings), 2);
        assert!((total_multiplier(&holdings) - 0.4).abs() < 1e-9);
        assert_eq!(equipped_tier(&holdings, Slot::Head), 4);
        assert_eq!(equipped_tier(&holdings, Slot::Feet), 0);
        assert_eq!(equipped_tier(&holdings, Slot::Chest), 0);
    }
}
