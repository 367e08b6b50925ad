//! Essence accounting.
//!
//! There is no balance store: a player's balance is the sum of every essence
//! stack they carry. [`CurrencyLedger`] is the seam behind which a persisted
//! balance could replace [`StackLedger`] without touching the purchase engine.

use log::{debug, warn};

use super::errors::ArmoryError;
use super::messages::fill;
use super::types::{Holdings, ItemStack, Material, Provenance, ProvenanceTag};
use crate::config::{EssenceConfig, ShopConfig};

/// Result of a grant. `placed < requested` means holdings ran out of room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantReceipt {
    pub requested: u32,
    pub placed: u32,
}

impl GrantReceipt {
    pub fn is_partial(&self) -> bool {
        self.placed < self.requested
    }
}

/// Query, grant and deduct essence held by a player.
pub trait CurrencyLedger {
    /// Total essence carried.
    fn balance(&self, holdings: &Holdings) -> u64;

    /// Add `amount` essence. Fails only when `amount` is zero; running out of
    /// room is reported through the receipt, not as an error.
    fn grant(&self, holdings: &mut Holdings, amount: u32) -> Result<GrantReceipt, ArmoryError>;

    /// Remove `amount` essence. Callers must check [`balance`](Self::balance)
    /// first: if stacks run out part way, what was already taken stays taken.
    fn deduct(&self, holdings: &mut Holdings, amount: u64) -> Result<(), ArmoryError>;
}

/// Ledger that derives everything from provenance-tagged essence stacks.
#[derive(Debug, Clone)]
pub struct StackLedger {
    essence: EssenceConfig,
    accent: String,
}

impl Default for StackLedger {
    fn default() -> Self {
        Self::new(EssenceConfig::default())
    }
}

impl StackLedger {
    pub fn new(essence: EssenceConfig) -> Self {
        Self {
            essence,
            accent: ShopConfig::default().accent_color,
        }
    }

    /// Colour substituted for `{accent}` in the stack's name and lore.
    pub fn with_accent(mut self, accent: &str) -> Self {
        self.accent = accent.to_string();
        self
    }

    fn max_stack(&self) -> u32 {
        self.essence.max_stack_size.max(1)
    }

    /// A fresh, tagged essence stack of `quantity` units.
    pub fn essence_stack(&self, quantity: u32) -> ItemStack {
        let vars = [("accent", self.accent.clone())];
        let lore = self.essence.lore.iter().map(|l| fill(l, &vars)).collect();
        let mut stack =
            ItemStack::new(Material::NetherStar, &fill(&self.essence.name, &vars), quantity)
                .with_lore(lore);
        stack.provenance = Some(ProvenanceTag::essence());
        stack
    }

    /// True only for stacks this ledger recognises as currency. An untagged
    /// star of the same material is not essence.
    pub fn is_essence(item: &ItemStack) -> bool {
        item.material == Material::NetherStar
            && matches!(
                item.provenance.as_ref().map(|t| &t.provenance),
                Some(Provenance::Essence)
            )
    }
}

impl CurrencyLedger for StackLedger {
    fn balance(&self, holdings: &Holdings) -> u64 {
        holdings
            .inventory()
            .iter()
            .flatten()
            .filter(|item| Self::is_essence(item))
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    fn grant(&self, holdings: &mut Holdings, amount: u32) -> Result<GrantReceipt, ArmoryError> {
        if amount == 0 {
            return Err(ArmoryError::InvalidAmount(0));
        }
        let max = self.max_stack();
        let mut remaining = amount;

        // Top up partial stacks first, then open new ones.
        for item in holdings.inventory_mut().iter_mut().flatten() {
            if remaining == 0 {
                break;
            }
            if Self::is_essence(item) && item.quantity < max {
                let add = (max - item.quantity).min(remaining);
                item.quantity += add;
                remaining -= add;
            }
        }

        while remaining > 0 {
            let size = remaining.min(max);
            if holdings.add_item(self.essence_stack(size)).is_err() {
                break;
            }
            remaining -= size;
        }

        let receipt = GrantReceipt {
            requested: amount,
            placed: amount - remaining,
        };
        if receipt.is_partial() {
            warn!(
                "Essence grant placed {} of {} (holdings full)",
                receipt.placed, receipt.requested
            );
        } else {
            debug!("Granted {} essence", amount);
        }
        Ok(receipt)
    }

    fn deduct(&self, holdings: &mut Holdings, amount: u64) -> Result<(), ArmoryError> {
        let mut remaining = amount;

        for slot in holdings.inventory_mut().iter_mut() {
            if remaining == 0 {
                break;
            }
            let Some(item) = slot.as_mut() else { continue };
            if !Self::is_essence(item) {
                continue;
            }
            let qty = u64::from(item.quantity);
            if qty <= remaining {
                *slot = None;
                remaining -= qty;
            } else {
                // remaining < qty <= u32::MAX here
                item.quantity -= remaining as u32;
                remaining = 0;
            }
        }

        if remaining > 0 {
            return Err(ArmoryError::InsufficientFunds {
                requested: amount,
                shortfall: remaining,
            });
        }
        Ok(())
    }
}
