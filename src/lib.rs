//! # Essence Armory - Tier-Progression Armor Shop
//!
//! Essence Armory sells armor pieces in numbered tiers for an item-based
//! currency ("essence"). Ownership is never stored on the side: it is read
//! back from provenance records stamped on the pieces a player wears, and a
//! player's balance is the sum of the essence stacks they carry.
//!
//! ## Features
//!
//! - **Tier Catalog**: Reloadable tier table from TOML; a malformed tier is skipped, never fatal.
//! - **Currency Ledger**: Balance, grant and deduct over tagged essence stacks.
//! - **Provenance Tracking**: Versioned records identify issued pieces; display names carry no meaning.
//! - **Purchase/Upgrade Engine**: Forward-only tier progression with a per-tier upgrade discount and a price floor.
//! - **Menu & Admin Surfaces**: Paginated tier browser, `givearmor` / `giveessence` / `reload`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use essence_armory::config::Config;
//! use essence_armory::armory::{ArmoryService, Slot};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let service = ArmoryService::new(config).with_config_path("config.toml");
//!
//!     service.join("Steve")?;
//!     service.grant_essence("Steve", 100)?;
//!     let reply = service.purchase("Steve", 1, Slot::Head)?;
//!     for line in reply.lines {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`armory`] - Catalog, ledger, provenance, engine, menu, admin commands and the shared service
//! - [`config`] - Configuration management and defaults
//! - [`validation`] - Player-name and admin-argument validation
//! - [`logutil`] - Log-safe escaping of player-supplied text
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  ArmoryService  │ ← Locks, sessions, admin commands
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ PurchaseEngine  │ ← Pricing and the purchase sequence
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ Catalog/Ledger/ │ ← Tier table, essence stacks,
//! │ Provenance      │   provenance records
//! └─────────────────┘
//! ```

pub mod armory;
pub mod config;
pub mod logutil;
pub mod validation;
