//! # Configuration Management Module
//!
//! All tunables of the armory live in one TOML file: shop pricing, essence
//! cosmetics, menu layout, message templates, logging, and the tier table.
//!
//! ## Features
//!
//! - **Structured Configuration**: Type-safe configuration with serde serialization
//! - **Defaults**: Every section and field has a default, so partial files load
//! - **Reload**: The file can be re-read at runtime; see [`crate::armory::ArmoryService::reload`]
//!
//! ## Configuration Structure
//!
//! - [`ShopConfig`] - prefix, accent colour, upgrade discount and price floor
//! - [`EssenceConfig`] - currency stack name, lore and stack size
//! - [`HoldingsConfig`] - per-player inventory capacity
//! - [`MenuConfig`] - menu size, title and slot map
//! - [`MessagesConfig`] - message templates keyed by message key
//! - [`LoggingConfig`] - log level and optional log file
//!
//! The `[tiers]` table is kept as raw TOML values so that one malformed tier
//! can be skipped by the catalog without failing the whole load.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use essence_armory::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Discount per tier: {}", config.shop.discount_per_tier);
//!
//!     Config::create_default("config.toml").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [shop]
//! discount_per_tier = 15
//! minimum_price = 10
//!
//! [tiers.1]
//! name = "Leather"
//! rgb_color = "139,69,19"
//! hex_color = "<##8B4513>"
//! multiplier = 0.05
//! price = 25
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::fs;

use crate::armory::types::DEFAULT_INVENTORY_SLOTS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub shop: ShopConfig,
    #[serde(default)]
    pub essence: EssenceConfig,
    #[serde(default)]
    pub holdings: HoldingsConfig,
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Raw tier table keyed by tier number; parsed by the catalog.
    #[serde(default)]
    pub tiers: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Prepended to every chat message.
    pub prefix: String,
    /// Colour token substituted for `{accent}` in templates.
    pub accent_color: String,
    /// Essence knocked off an upgrade for each tier already owned in the slot.
    pub discount_per_tier: u32,
    /// Upgrades never cost less than this.
    pub minimum_price: u32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            prefix: "&8[<##FF9100>&lARMOR&8] &8»&7".to_string(),
            accent_color: "<##FFCE8D>".to_string(),
            discount_per_tier: 15,
            minimum_price: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EssenceConfig {
    pub name: String,
    pub lore: Vec<String>,
    /// Largest quantity a single essence stack may hold.
    pub max_stack_size: u32,
}

impl Default for EssenceConfig {
    fn default() -> Self {
        Self {
            name: "<gradient:#8B00FF:#FF1493>Armor Essence</gradient>".to_string(),
            lore: vec![
                "".to_string(),
                "{accent}A condensed shard of power".to_string(),
                "&7Spend it in the armor shop".to_string(),
            ],
            max_stack_size: 64,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldingsConfig {
    pub inventory_slots: usize,
}

impl Default for HoldingsConfig {
    fn default() -> Self {
        Self {
            inventory_slots: DEFAULT_INVENTORY_SLOTS,
        }
    }
}

/// Positions of the interactive entries in the menu grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuSlots {
    pub previous_button: usize,
    pub next_button: usize,
    pub tier_info: usize,
    pub helmet: usize,
    pub chestplate: usize,
    pub leggings: usize,
    pub boots: usize,
    pub player_stats: usize,
}

impl Default for MenuSlots {
    fn default() -> Self {
        Self {
            previous_button: 10,
            next_button: 16,
            tier_info: 13,
            helmet: 29,
            chestplate: 30,
            leggings: 32,
            boots: 33,
            player_stats: 49,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub size: usize,
    pub title: String,
    pub slots: MenuSlots,
    pub piece_name_format: String,
    pub tier_info_name: String,
    pub tier_info_lore: Vec<String>,
    pub piece_lore: Vec<String>,
    pub player_stats_name: String,
    pub player_stats_lore: Vec<String>,
    pub previous_name: String,
    pub next_name: String,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            size: 54,
            title: "&8Armor Browser &7(Tier {tier}/{max_tier})".to_string(),
            slots: MenuSlots::default(),
            piece_name_format: "{hex_color}{tier_name} {piece_name}".to_string(),
            tier_info_name: "{hex_color}⚔ {tier_name} &7(Tier {tier})".to_string(),
            tier_info_lore: vec![
                "&7Multiplier per piece: {hex_color}{multiplier}x".to_string(),
                "&7Full set bonus: {hex_color}{full_set_bonus}x".to_string(),
                "&7Price per piece: {accent}{price}".to_string(),
            ],
            piece_lore: vec![
                "&7Multiplier: {hex_color}{multiplier}x".to_string(),
                "{status}".to_string(),
            ],
            player_stats_name: "{accent}⚡ {player}'s Stats".to_string(),
            player_stats_lore: vec![
                "&7Essence: {accent}{essence}".to_string(),
                "&7Multiplier: {accent}{multiplier}x".to_string(),
                "&7Armor pieces: {accent}{armor_count}/4".to_string(),
            ],
            previous_name: "&c◀ Previous Tier".to_string(),
            next_name: "&a▶ Next Tier".to_string(),
        }
    }
}

/// Message templates, grouped the same way the lookups are.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    pub shop: BTreeMap<String, String>,
    pub admin: BTreeMap<String, String>,
    pub essence: BTreeMap<String, String>,
}

fn template_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            shop: template_map(&[
                ("already-owned", "&cYou already own this piece at this tier or higher!"),
                (
                    "purchased",
                    "&aPurchased {accent}{part} &aat tier {accent}{tier} &afor {accent}{price} &aessence!",
                ),
                (
                    "upgraded",
                    "&aUpgraded {accent}{part} &ato tier {accent}{tier} &afor {accent}{price} &aessence &7(-{discount})",
                ),
                ("need-essence", "&cYou need {accent}{price} &cessence to buy this!"),
                (
                    "need-essence-upgrade",
                    "&cYou need {accent}{price} &cessence to upgrade &7(-{discount})",
                ),
                ("inventory-full", "&cMake room in your inventory first!"),
            ]),
            admin: template_map(&[
                ("choose-player", "&cPlease choose a player!"),
                (
                    "choose-type",
                    "&cPlease choose a type: fullset, head, chestplate, leggings, boots",
                ),
                ("choose-tier", "&cPlease choose a tier!"),
                ("choose-amount", "&cPlease choose an amount!"),
                ("reload", "&aConfiguration and armor tiers reloaded!"),
            ]),
            essence: template_map(&[
                ("count", "&7You have {accent}{amount} &7armor essence."),
                ("none", "&cYou don't have any armor essence."),
            ]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Starter tier table written by `armory init`.
const DEFAULT_TIERS: [(&str, &str, &str, f64, u32); 10] = [
    ("Leather", "139,69,19", "<##8B4513>", 0.05, 25),
    ("Copper", "184,115,51", "<##B87333>", 0.10, 40),
    ("Iron", "192,192,192", "<##C0C0C0>", 0.15, 60),
    ("Gold", "255,215,0", "<##FFD700>", 0.20, 85),
    ("Emerald", "80,200,120", "<##50C878>", 0.30, 115),
    ("Sapphire", "15,82,186", "<##0F52BA>", 0.40, 150),
    ("Ruby", "224,17,95", "<##E0115F>", 0.55, 190),
    ("Amethyst", "153,102,204", "<##9966CC>", 0.70, 235),
    ("Obsidian", "40,20,60", "<##28143C>", 0.85, 285),
    ("Celestial", "255,255,255", "<##FFFFFF>", 1.00, 340),
];

fn default_tier_table() -> BTreeMap<String, toml::Value> {
    DEFAULT_TIERS
        .iter()
        .enumerate()
        .map(|(i, (name, rgb, hex, multiplier, price))| {
            let mut table = toml::map::Map::new();
            table.insert("name".into(), toml::Value::String(name.to_string()));
            table.insert("rgb_color".into(), toml::Value::String(rgb.to_string()));
            table.insert("hex_color".into(), toml::Value::String(hex.to_string()));
            table.insert("multiplier".into(), toml::Value::Float(*multiplier));
            table.insert("price".into(), toml::Value::Integer(i64::from(*price)));
            table.insert("head_texture".into(), toml::Value::String(String::new()));
            ((i + 1).to_string(), toml::Value::Table(table))
        })
        .collect()
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        Self::from_toml_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            shop: ShopConfig::default(),
            essence: EssenceConfig::default(),
            holdings: HoldingsConfig::default(),
            menu: MenuConfig::default(),
            messages: MessagesConfig::default(),
            logging: LoggingConfig::default(),
            tiers: default_tier_table(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_section_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.shop.discount_per_tier, 15);
        assert_eq!(config.shop.minimum_price, 10);
        assert_eq!(config.essence.max_stack_size, 64);
        assert_eq!(config.menu.size, 54);
        assert_eq!(config.menu.slots.helmet, 29);
        assert!(config.tiers.is_empty());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
            [shop]
            minimum_price = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.shop.minimum_price, 5);
        assert_eq!(config.shop.discount_per_tier, 15);
        assert_eq!(config.shop.accent_color, "<##FFCE8D>");
    }

    #[test]
    fn test_default_config_has_ten_tiers() {
        let config = Config::default();
        assert_eq!(config.tiers.len(), 10);
        assert!(config.tiers.contains_key("10"));
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed = Config::from_toml_str(&text).unwrap();
        assert_eq!(parsed.tiers.len(), 10);
        assert_eq!(
            parsed.messages.shop.get("already-owned"),
            Config::default().messages.shop.get("already-owned")
        );
    }

    #[tokio::test]
    async fn test_create_default_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        Config::create_default(path).await.unwrap();
        let config = Config::load(path).await.unwrap();
        assert_eq!(config.tiers.len(), 10);
    }

    #[tokio::test]
    async fn test_load_missing_file_names_the_path() {
        let err = Config::load("/definitely/not/here.toml").await.unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
