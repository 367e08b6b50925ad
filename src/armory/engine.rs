//! Purchase / upgrade engine.
//!
//! A slot is either not owned or owned at some tier, and only moves forward:
//! a first purchase sets a tier, and an upgrade replaces it with a higher
//! one. Every request runs in a fixed order:
//!
//! 1. resolve the target tier (absent tier is a silent no-op)
//! 2. read the currently owned tier from the worn piece
//! 3. refuse targets at or below the owned tier
//! 4. price it (base price, or discounted upgrade price with a floor)
//! 5. refuse if the balance cannot cover it
//! 6. deduct, remove the old piece, equip the new one
//!
//! Rejections never touch holdings.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::catalog::TierCatalog;
use super::errors::ArmoryError;
use super::ledger::CurrencyLedger;
use super::messages::MessageKey;
use super::provenance::{equipped_tier, is_recognized, issue_piece};
use super::types::{Holdings, PartSelector, Slot};
use crate::config::ShopConfig;

/// Upgrade discount settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradePricing {
    pub discount_per_tier: u32,
    pub minimum_price: u32,
}

impl Default for UpgradePricing {
    fn default() -> Self {
        Self {
            discount_per_tier: 15,
            minimum_price: 10,
        }
    }
}

impl From<&ShopConfig> for UpgradePricing {
    fn from(shop: &ShopConfig) -> Self {
        Self {
            discount_per_tier: shop.discount_per_tier,
            minimum_price: shop.minimum_price,
        }
    }
}

/// Price of one piece for a given owned tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceQuote {
    pub price: u32,
    /// Discount earned from the owned tier (0 for first purchases).
    pub discount: u32,
    /// Tier being upgraded from; 0 for a first purchase.
    pub current_tier: u32,
}

impl PriceQuote {
    pub fn is_upgrade(&self) -> bool {
        self.current_tier > 0
    }
}

impl UpgradePricing {
    /// First purchase pays `base_price`. An upgrade pays
    /// `max(minimum_price, base_price - current_tier * discount_per_tier)`.
    pub fn quote(&self, base_price: u32, current_tier: u32) -> PriceQuote {
        if current_tier == 0 {
            return PriceQuote {
                price: base_price,
                discount: 0,
                current_tier,
            };
        }
        let discount = current_tier.saturating_mul(self.discount_per_tier);
        PriceQuote {
            price: base_price.saturating_sub(discount).max(self.minimum_price),
            discount,
            current_tier,
        }
    }
}

/// What a successful purchase or upgrade did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub slot: Slot,
    pub tier: u32,
    pub previous_tier: u32,
    pub price_paid: u32,
    pub discount_applied: u32,
}

/// Result of one purchase-or-upgrade request.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    /// Target tier is not in the catalog. Nothing happens and nothing is said.
    UnknownTier { tier: u32 },
    AlreadyOwned {
        slot: Slot,
        owned_tier: u32,
        requested_tier: u32,
    },
    InsufficientFunds {
        slot: Slot,
        tier: u32,
        quote: PriceQuote,
        balance: u64,
    },
    /// A foreign item is worn in the slot and there is nowhere to put it.
    InventoryFull { slot: Slot },
    Purchased(PurchaseReceipt),
    Upgraded(PurchaseReceipt),
}

impl PurchaseOutcome {
    pub fn message_key(&self) -> Option<MessageKey> {
        match self {
            PurchaseOutcome::UnknownTier { .. } => None,
            PurchaseOutcome::AlreadyOwned { .. } => Some(MessageKey::AlreadyOwned),
            PurchaseOutcome::InsufficientFunds { quote, .. } if quote.is_upgrade() => {
                Some(MessageKey::NeedEssenceUpgrade)
            }
            PurchaseOutcome::InsufficientFunds { .. } => Some(MessageKey::NeedEssence),
            PurchaseOutcome::InventoryFull { .. } => Some(MessageKey::InventoryFull),
            PurchaseOutcome::Purchased(_) => Some(MessageKey::Purchased),
            PurchaseOutcome::Upgraded(_) => Some(MessageKey::Upgraded),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            PurchaseOutcome::Purchased(_) | PurchaseOutcome::Upgraded(_)
        )
    }

    pub fn receipt(&self) -> Option<&PurchaseReceipt> {
        match self {
            PurchaseOutcome::Purchased(r) | PurchaseOutcome::Upgraded(r) => Some(r),
            _ => None,
        }
    }
}

/// Pieces handed out by an administrative grant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueReceipt {
    pub issued: Vec<Slot>,
    /// Pieces that did not fit in the recipient's inventory.
    pub undelivered: Vec<Slot>,
}

/// Swaps essence for armor. Holds no player state of its own.
#[derive(Debug, Clone)]
pub struct PurchaseEngine<L> {
    ledger: L,
    pricing: UpgradePricing,
    piece_name_format: String,
}

impl<L: CurrencyLedger> PurchaseEngine<L> {
    pub fn new(ledger: L, pricing: UpgradePricing, piece_name_format: &str) -> Self {
        Self {
            ledger,
            pricing,
            piece_name_format: piece_name_format.to_string(),
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn pricing(&self) -> UpgradePricing {
        self.pricing
    }

    /// What `slot` at `tier` would cost right now, without buying it.
    /// `None` if the tier is absent or already owned at that level.
    pub fn quote(
        &self,
        catalog: &TierCatalog,
        holdings: &Holdings,
        tier: u32,
        slot: Slot,
    ) -> Option<PriceQuote> {
        let def = catalog.get(tier)?;
        let current = equipped_tier(holdings, slot);
        if current > 0 && tier <= current {
            return None;
        }
        Some(self.pricing.quote(def.price(), current))
    }

    /// Buy `slot` at `tier`, or upgrade the piece already worn there.
    pub fn purchase_or_upgrade(
        &self,
        catalog: &TierCatalog,
        holdings: &mut Holdings,
        tier: u32,
        slot: Slot,
    ) -> Result<PurchaseOutcome, ArmoryError> {
        let Some(def) = catalog.get(tier) else {
            debug!("Ignoring purchase of absent tier {}", tier);
            return Ok(PurchaseOutcome::UnknownTier { tier });
        };

        let current = equipped_tier(holdings, slot);
        if current > 0 && tier <= current {
            return Ok(PurchaseOutcome::AlreadyOwned {
                slot,
                owned_tier: current,
                requested_tier: tier,
            });
        }

        let quote = self.pricing.quote(def.price(), current);
        let balance = self.ledger.balance(holdings);
        if balance < u64::from(quote.price) {
            return Ok(PurchaseOutcome::InsufficientFunds {
                slot,
                tier,
                quote,
                balance,
            });
        }

        // A first purchase over a foreign item must have somewhere to put it.
        let displaces_foreign = current == 0
            && holdings
                .equipped(slot)
                .is_some_and(|item| !is_recognized(item));
        if displaces_foreign && holdings.free_slots() == 0 {
            return Ok(PurchaseOutcome::InventoryFull { slot });
        }

        let piece = issue_piece(def, slot, &self.piece_name_format)?;
        self.ledger.deduct(holdings, u64::from(quote.price))?;

        let previous = holdings.set_equipped(slot, None);
        if let Some(item) = previous.filter(|item| !is_recognized(item)) {
            if holdings.add_item(item).is_err() {
                return Err(ArmoryError::Internal(format!(
                    "no room for item displaced from {}",
                    slot
                )));
            }
        }
        holdings.set_equipped(slot, Some(piece));

        let receipt = PurchaseReceipt {
            slot,
            tier,
            previous_tier: current,
            price_paid: quote.price,
            discount_applied: quote.discount,
        };
        if quote.is_upgrade() {
            info!(
                "Upgraded {} from tier {} to {} for {} (discount {})",
                slot, current, tier, quote.price, quote.discount
            );
            Ok(PurchaseOutcome::Upgraded(receipt))
        } else {
            info!("Purchased {} at tier {} for {}", slot, tier, quote.price);
            Ok(PurchaseOutcome::Purchased(receipt))
        }
    }

    /// Run [`purchase_or_upgrade`](Self::purchase_or_upgrade) for each slot
    /// in turn. Every piece is priced and checked on its own; pieces bought
    /// before funds run out are kept.
    pub fn purchase_fullset(
        &self,
        catalog: &TierCatalog,
        holdings: &mut Holdings,
        tier: u32,
    ) -> Result<Vec<PurchaseOutcome>, ArmoryError> {
        Slot::ALL
            .into_iter()
            .map(|slot| self.purchase_or_upgrade(catalog, holdings, tier, slot))
            .collect()
    }

    /// Put freshly issued pieces into general inventory, free of charge.
    pub fn issue(
        &self,
        catalog: &TierCatalog,
        holdings: &mut Holdings,
        tier: u32,
        part: PartSelector,
    ) -> Result<IssueReceipt, ArmoryError> {
        let def = catalog.get(tier).ok_or(ArmoryError::UnknownTier(tier))?;
        let mut receipt = IssueReceipt::default();
        for slot in part.slots() {
            let piece = issue_piece(def, slot, &self.piece_name_format)?;
            match holdings.add_item(piece) {
                Ok(_) => receipt.issued.push(slot),
                Err(_) => receipt.undelivered.push(slot),
            }
        }
        Ok(receipt)
    }
}
