//! Tier catalog: the immutable tier definitions, indexed by tier number.
//!
//! Definitions are built from the raw `[tiers]` table of the configuration.
//! Loading is tolerant: a malformed tier is logged and skipped, and a
//! malformed colour falls back to neutral gray. Neither aborts the load.

use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use super::types::Rgb;

/// Reported by [`TierCatalog::max_tier`] when no tiers are registered.
pub const DEFAULT_MAX_TIER: u32 = 10;

/// One rung of the progression ladder. Fields are fixed at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct TierDefinition {
    tier: u32,
    name: String,
    rgb: Rgb,
    hex_color: String,
    multiplier: f64,
    price: u32,
    head_texture: String,
    lore: Vec<String>,
}

impl TierDefinition {
    pub fn new(
        tier: u32,
        name: &str,
        rgb: Rgb,
        hex_color: &str,
        multiplier: f64,
        price: u32,
        head_texture: &str,
    ) -> Self {
        let lore = describe(tier, hex_color, multiplier);
        Self {
            tier,
            name: name.to_string(),
            rgb,
            hex_color: hex_color.to_string(),
            multiplier,
            price,
            head_texture: head_texture.to_string(),
            lore,
        }
    }

    pub fn tier(&self) -> u32 {
        self.tier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rgb(&self) -> Rgb {
        self.rgb
    }

    /// Accent colour token, presentation only.
    pub fn hex_color(&self) -> &str {
        &self.hex_color
    }

    /// Stat bonus granted per worn piece of this tier.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Cost of one piece bought from scratch.
    pub fn price(&self) -> u32 {
        self.price
    }

    pub fn head_texture(&self) -> &str {
        &self.head_texture
    }

    /// Descriptive statistics lines.
    pub fn lore(&self) -> &[String] {
        &self.lore
    }
}

fn describe(tier: u32, hex: &str, multiplier: f64) -> Vec<String> {
    vec![
        String::new(),
        format!("{hex}Statistics"),
        format!("{hex}&l┃ &fMultiplier: {hex}{multiplier}x"),
        format!("{hex}&l┃ &fTier: {hex}{tier}"),
        String::new(),
        "&8This multiplier is per armor piece".to_string(),
    ]
}

/// Parse an `"R,G,B"` string. Returns `None` on anything malformed.
pub fn parse_rgb(value: &str) -> Option<Rgb> {
    let mut parts = value.split(',').map(|p| p.trim().parse::<u8>());
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) => Some(Rgb::new(r, g, b)),
        _ => None,
    }
}

/// Shape of one `[tiers.<n>]` table. Missing fields take these defaults.
#[derive(Debug, Deserialize)]
struct TierSeed {
    #[serde(default = "default_name")]
    name: String,
    #[serde(default = "default_rgb")]
    rgb_color: String,
    #[serde(default = "default_hex")]
    hex_color: String,
    #[serde(default = "default_multiplier")]
    multiplier: f64,
    #[serde(default = "default_price")]
    price: u32,
    #[serde(default)]
    head_texture: String,
}

fn default_name() -> String {
    "Unknown".to_string()
}

fn default_rgb() -> String {
    "150,150,150".to_string()
}

fn default_hex() -> String {
    "<##969696>".to_string()
}

fn default_multiplier() -> f64 {
    0.05
}

fn default_price() -> u32 {
    25
}

/// In-memory index of tier definitions.
#[derive(Debug, Clone, Default)]
pub struct TierCatalog {
    tiers: HashMap<u32, TierDefinition>,
}

impl TierCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a raw tier table.
    pub fn from_table(table: &BTreeMap<String, toml::Value>) -> Self {
        let mut catalog = Self::new();
        catalog.load(table);
        catalog
    }

    /// Register every well-formed tier in `table`. Returns how many were loaded.
    pub fn load(&mut self, table: &BTreeMap<String, toml::Value>) -> usize {
        let mut loaded = 0;
        for (key, value) in table {
            let tier = match key.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!("Skipping tier '{}': key is not a positive tier number", key);
                    continue;
                }
            };

            let seed: TierSeed = match value.clone().try_into() {
                Ok(seed) => seed,
                Err(e) => {
                    warn!("Skipping tier {}: {}", tier, e);
                    continue;
                }
            };

            if !seed.multiplier.is_finite() || seed.multiplier < 0.0 {
                warn!(
                    "Skipping tier {}: multiplier {} must be a non-negative number",
                    tier, seed.multiplier
                );
                continue;
            }

            let rgb = parse_rgb(&seed.rgb_color).unwrap_or_else(|| {
                warn!(
                    "Tier {} has malformed rgb_color '{}'; using {}",
                    tier,
                    seed.rgb_color,
                    Rgb::NEUTRAL_GRAY
                );
                Rgb::NEUTRAL_GRAY
            });

            let definition = TierDefinition::new(
                tier,
                &seed.name,
                rgb,
                &seed.hex_color,
                seed.multiplier,
                seed.price,
                &seed.head_texture,
            );
            debug!("Registered tier {} ({})", tier, definition.name());
            self.tiers.insert(tier, definition);
            loaded += 1;
        }
        loaded
    }

    /// Drop every tier, then load `table`. No tier from before survives.
    pub fn reload(&mut self, table: &BTreeMap<String, toml::Value>) -> usize {
        self.clear();
        let loaded = self.load(table);
        info!("Tier catalog reloaded: {} tiers, max tier {}", loaded, self.max_tier());
        loaded
    }

    pub fn clear(&mut self) {
        self.tiers.clear();
    }

    pub fn get(&self, tier: u32) -> Option<&TierDefinition> {
        self.tiers.get(&tier)
    }

    /// Highest registered tier number, or [`DEFAULT_MAX_TIER`] when empty.
    pub fn max_tier(&self) -> u32 {
        self.tiers.keys().copied().max().unwrap_or(DEFAULT_MAX_TIER)
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Definitions in ascending tier order.
    pub fn iter(&self) -> impl Iterator<Item = &TierDefinition> {
        let mut defs: Vec<&TierDefinition> = self.tiers.values().collect();
        defs.sort_by_key(|d| d.tier);
        defs.into_iter()
    }
}
