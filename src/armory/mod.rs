//! Tier-progression armor shop: catalog, essence ledger, provenance
//! tracking and the purchase/upgrade engine, plus the menu and admin
//! surfaces that drive them.

pub mod admin;
pub mod catalog;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod menu;
pub mod messages;
pub mod provenance;
pub mod service;
pub mod types;

pub use admin::{parse_admin, AdminCommand};
pub use catalog::{parse_rgb, TierCatalog, TierDefinition, DEFAULT_MAX_TIER};
pub use engine::{
    IssueReceipt, PriceQuote, PurchaseEngine, PurchaseOutcome, PurchaseReceipt, UpgradePricing,
};
pub use errors::ArmoryError;
pub use ledger::{CurrencyLedger, GrantReceipt, StackLedger};
pub use menu::{clamp_page, open_menu, route_click, MenuIntent, MenuPage, PieceStatus};
pub use messages::{fill, plain_text, MessageKey, Messages};
pub use provenance::{
    equipped_count, equipped_tier, is_recognized, issue_piece, multiplier_of, tag, tier_of,
    total_multiplier,
};
pub use service::{ArmoryService, ShopReply};
pub use types::{
    Holdings, ItemStack, Material, PartSelector, PlayerRecord, Provenance, ProvenanceTag, Rgb,
    Slot, ARMOR_PIECES_PER_SET, PROVENANCE_SCHEMA_VERSION,
};
