//! Armory data model: equipment slots, item stacks with provenance records,
//! and the per-player holdings that carry both currency and armor.
//!
//! Nothing here knows about prices or tiers beyond what a provenance record
//! stores. Ownership is always derived from what [`Holdings`] contains.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::errors::ArmoryError;

/// Version stamped into every provenance record issued by this crate.
pub const PROVENANCE_SCHEMA_VERSION: u8 = 1;

/// Number of armor pieces in a complete set.
pub const ARMOR_PIECES_PER_SET: usize = 4;

/// Default general inventory size for a player.
pub const DEFAULT_INVENTORY_SLOTS: usize = 36;

/// The four wearable equipment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    Head,
    Chest,
    Legs,
    Feet,
}

impl Slot {
    /// Slots in the order a full set is processed.
    pub const ALL: [Slot; ARMOR_PIECES_PER_SET] = [Slot::Head, Slot::Chest, Slot::Legs, Slot::Feet];

    pub fn index(self) -> usize {
        match self {
            Slot::Head => 0,
            Slot::Chest => 1,
            Slot::Legs => 2,
            Slot::Feet => 3,
        }
    }

    /// Display noun used in piece names ("Helmet", "Chestplate", ...).
    pub fn piece_name(self) -> &'static str {
        match self {
            Slot::Head => "Helmet",
            Slot::Chest => "Chestplate",
            Slot::Legs => "Leggings",
            Slot::Feet => "Boots",
        }
    }

    /// Lower-case part token used in commands and message templates.
    pub fn part_name(self) -> &'static str {
        match self {
            Slot::Head => "head",
            Slot::Chest => "chestplate",
            Slot::Legs => "leggings",
            Slot::Feet => "boots",
        }
    }

    /// Parse a part token. Accepts the command tokens plus a few aliases.
    pub fn from_part(part: &str) -> Option<Slot> {
        match part.trim().to_ascii_lowercase().as_str() {
            "head" | "helmet" => Some(Slot::Head),
            "chestplate" | "chest" => Some(Slot::Chest),
            "leggings" | "legs" => Some(Slot::Legs),
            "boots" | "feet" => Some(Slot::Feet),
            _ => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.part_name())
    }
}

/// Which pieces a purchase or grant request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartSelector {
    Single(Slot),
    FullSet,
}

impl PartSelector {
    /// Parse `fullset` or a single part token (strict: no aliases).
    pub fn parse(token: &str) -> Option<PartSelector> {
        match token.trim().to_ascii_lowercase().as_str() {
            "fullset" => Some(PartSelector::FullSet),
            "head" => Some(PartSelector::Single(Slot::Head)),
            "chestplate" => Some(PartSelector::Single(Slot::Chest)),
            "leggings" => Some(PartSelector::Single(Slot::Legs)),
            "boots" => Some(PartSelector::Single(Slot::Feet)),
            _ => None,
        }
    }

    pub fn slots(self) -> Vec<Slot> {
        match self {
            PartSelector::Single(slot) => vec![slot],
            PartSelector::FullSet => Slot::ALL.to_vec(),
        }
    }
}

/// Dye colour for leather pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Fallback used whenever a configured colour cannot be parsed.
    pub const NEUTRAL_GRAY: Rgb = Rgb::new(150, 150, 150);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::NEUTRAL_GRAY
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

/// What the armory recorded about an item when it issued it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    /// A stack of armor essence.
    Essence,
    /// A catalog-issued armor piece. Values are copied at issue time.
    Armor { tier: u32, multiplier: f64 },
}

/// Versioned provenance record attached to an item. Never re-derived from
/// the live catalog once stamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceTag {
    pub schema_version: u8,
    pub provenance: Provenance,
}

impl ProvenanceTag {
    pub fn essence() -> Self {
        Self {
            schema_version: PROVENANCE_SCHEMA_VERSION,
            provenance: Provenance::Essence,
        }
    }

    pub fn armor(tier: u32, multiplier: f64) -> Self {
        Self {
            schema_version: PROVENANCE_SCHEMA_VERSION,
            provenance: Provenance::Armor { tier, multiplier },
        }
    }
}

/// Base item type as seen by the surrounding item system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Material {
    /// Visual type shared by essence and ordinary stars.
    NetherStar,
    /// Anything that can be worn in the given slot.
    Wearable(Slot),
    Other(String),
}

/// A stack of identical items. Armor pieces always have quantity 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub id: Uuid,
    pub material: Material,
    pub display_name: String,
    #[serde(default)]
    pub lore: Vec<String>,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dye: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<ProvenanceTag>,
    pub created_at: DateTime<Utc>,
}

impl ItemStack {
    pub fn new(material: Material, display_name: &str, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            material,
            display_name: display_name.to_string(),
            lore: Vec::new(),
            quantity,
            dye: None,
            texture: None,
            provenance: None,
            created_at: Utc::now(),
        }
    }

    /// An untagged wearable, e.g. an ordinary helmet found in the world.
    pub fn wearable(slot: Slot, display_name: &str) -> Self {
        Self::new(Material::Wearable(slot), display_name, 1)
    }

    pub fn with_lore(mut self, lore: Vec<String>) -> Self {
        self.lore = lore;
        self
    }

    pub fn with_dye(mut self, dye: Rgb) -> Self {
        self.dye = Some(dye);
        self
    }

    pub fn with_texture(mut self, texture: &str) -> Self {
        self.texture = Some(texture.to_string());
        self
    }

    /// The equipment slot this item fits in, if it is wearable.
    pub fn slot(&self) -> Option<Slot> {
        match self.material {
            Material::Wearable(slot) => Some(slot),
            _ => None,
        }
    }
}

/// Everything a player carries: a fixed-size general inventory plus the four
/// worn equipment slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holdings {
    inventory: Vec<Option<ItemStack>>,
    equipment: [Option<ItemStack>; ARMOR_PIECES_PER_SET],
}

impl Default for Holdings {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_INVENTORY_SLOTS)
    }
}

impl Holdings {
    pub fn with_capacity(slots: usize) -> Self {
        Self {
            inventory: vec![None; slots],
            equipment: Default::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inventory.len()
    }

    pub fn inventory(&self) -> &[Option<ItemStack>] {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut [Option<ItemStack>] {
        &mut self.inventory
    }

    pub fn free_slots(&self) -> usize {
        self.inventory.iter().filter(|s| s.is_none()).count()
    }

    /// Place an item into the first empty inventory slot. Hands the item back
    /// when the inventory is full.
    pub fn add_item(&mut self, item: ItemStack) -> Result<usize, ItemStack> {
        match self.inventory.iter().position(|s| s.is_none()) {
            Some(index) => {
                self.inventory[index] = Some(item);
                Ok(index)
            }
            None => Err(item),
        }
    }

    pub fn take_item(&mut self, index: usize) -> Option<ItemStack> {
        self.inventory.get_mut(index).and_then(Option::take)
    }

    pub fn equipped(&self, slot: Slot) -> Option<&ItemStack> {
        self.equipment[slot.index()].as_ref()
    }

    /// Worn items with the slot they occupy.
    pub fn equipment(&self) -> impl Iterator<Item = (Slot, &ItemStack)> {
        Slot::ALL
            .into_iter()
            .filter_map(move |slot| self.equipped(slot).map(|item| (slot, item)))
    }

    /// Replace whatever is worn in `slot`, returning the previous item.
    pub fn set_equipped(&mut self, slot: Slot, item: Option<ItemStack>) -> Option<ItemStack> {
        std::mem::replace(&mut self.equipment[slot.index()], item)
    }

    /// Wear the item at `index`; anything already worn in that slot goes back
    /// into the freed inventory slot.
    pub fn equip_from_inventory(&mut self, index: usize) -> Result<Slot, ArmoryError> {
        let slot = match self.inventory.get(index) {
            Some(Some(item)) => item.slot().ok_or(ArmoryError::NotWearable(index))?,
            _ => return Err(ArmoryError::EmptyInventorySlot(index)),
        };
        let item = self.inventory[index].take();
        self.inventory[index] = self.set_equipped(slot, item);
        Ok(slot)
    }
}

/// An online player as seen by the armory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub username: String,
    pub holdings: Holdings,
    /// Tier page of the menu the player currently has open.
    #[serde(default)]
    pub open_page: Option<u32>,
    pub joined_at: DateTime<Utc>,
}

impl PlayerRecord {
    pub fn new(username: &str, inventory_slots: usize) -> Self {
        Self {
            username: username.to_string(),
            holdings: Holdings::with_capacity(inventory_slots),
            open_page: None,
            joined_at: Utc::now(),
        }
    }
}
