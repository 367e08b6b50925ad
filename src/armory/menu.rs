//! Paginated shop menu: one page per tier.
//!
//! The menu is a thin presentation layer. It builds a [`MenuPage`] snapshot
//! for a player and turns grid clicks into [`MenuIntent`]s; all decisions are
//! left to the purchase engine.

use super::catalog::{TierCatalog, TierDefinition};
use super::engine::PurchaseEngine;
use super::ledger::CurrencyLedger;
use super::messages::{fill, Messages};
use super::provenance::{equipped_count, equipped_tier, total_multiplier};
use super::types::{PlayerRecord, Slot, ARMOR_PIECES_PER_SET};
use crate::config::MenuConfig;

/// What a click on the menu grid asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuIntent {
    Navigate(i64),
    PurchaseOrUpgrade { tier: u32, slot: Slot },
}

/// Clamp a requested page into `1..=max_tier`.
pub fn clamp_page(page: i64, max_tier: u32) -> u32 {
    page.clamp(1, i64::from(max_tier.max(1))) as u32
}

/// Map a raw grid slot on `page` to an intent. Clicks outside the grid and
/// on decorative slots yield `None`.
pub fn route_click(menu: &MenuConfig, page: u32, raw_slot: i64) -> Option<MenuIntent> {
    if raw_slot < 0 || raw_slot >= menu.size as i64 {
        return None;
    }
    let clicked = raw_slot as usize;
    let slots = &menu.slots;
    let page = i64::from(page);

    if clicked == slots.previous_button {
        Some(MenuIntent::Navigate(page - 1))
    } else if clicked == slots.next_button {
        Some(MenuIntent::Navigate(page + 1))
    } else {
        piece_at(menu, clicked).map(|slot| MenuIntent::PurchaseOrUpgrade {
            tier: page as u32,
            slot,
        })
    }
}

fn piece_at(menu: &MenuConfig, clicked: usize) -> Option<Slot> {
    Slot::ALL
        .into_iter()
        .find(|slot| grid_position(menu, *slot) == clicked)
}

/// Grid index where `slot`'s entry is drawn.
pub fn grid_position(menu: &MenuConfig, slot: Slot) -> usize {
    match slot {
        Slot::Head => menu.slots.helmet,
        Slot::Chest => menu.slots.chestplate,
        Slot::Legs => menu.slots.leggings,
        Slot::Feet => menu.slots.boots,
    }
}

/// Purchase state of a piece as shown on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceStatus {
    Owned { tier: u32 },
    Buy { price: u32 },
    Upgrade { price: u32, discount: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieceEntry {
    pub slot: Slot,
    pub grid_slot: usize,
    pub name: String,
    pub lore: Vec<String>,
    pub status: PieceStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NavEntry {
    pub grid_slot: usize,
    pub label: String,
    pub target_page: u32,
}

/// Snapshot of one menu page for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuPage {
    pub page: u32,
    pub max_page: u32,
    pub title: String,
    pub tier_info: Vec<String>,
    pub pieces: Vec<PieceEntry>,
    pub previous: Option<NavEntry>,
    pub next: Option<NavEntry>,
    pub stats: Vec<String>,
}

impl MenuPage {
    /// Flatten the page into display lines, top to bottom.
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("=== {} ===", self.title)];
        lines.extend(self.tier_info.iter().cloned());
        for piece in &self.pieces {
            lines.push(format!("[{}] {}", piece.grid_slot, piece.name));
            lines.extend(piece.lore.iter().map(|l| format!("    {}", l)));
        }
        let nav: Vec<String> = [&self.previous, &self.next]
            .into_iter()
            .flatten()
            .map(|n| format!("[{}] {}", n.grid_slot, n.label))
            .collect();
        if !nav.is_empty() {
            lines.push(nav.join("   "));
        }
        lines.extend(self.stats.iter().cloned());
        lines
    }
}

/// Build the page for `page` (clamped). `None` when the clamped page has no
/// tier behind it, e.g. a hole in the numbering.
pub fn open_menu<L: CurrencyLedger>(
    catalog: &TierCatalog,
    engine: &PurchaseEngine<L>,
    menu: &MenuConfig,
    messages: &Messages,
    player: &PlayerRecord,
    page: i64,
) -> Option<MenuPage> {
    let max_page = catalog.max_tier();
    let page = clamp_page(page, max_page);
    let tier = catalog.get(page)?;
    let accent = messages.accent().to_string();

    let title = fill(
        &menu.title,
        &[("tier", page.to_string()), ("max_tier", max_page.to_string())],
    );

    let tier_vars = tier_vars(tier, &accent);
    let tier_info = std::iter::once(fill(&menu.tier_info_name, &tier_vars))
        .chain(menu.tier_info_lore.iter().map(|l| fill(l, &tier_vars)))
        .collect();

    let holdings = &player.holdings;
    let pieces = Slot::ALL
        .into_iter()
        .map(|slot| {
            let owned = equipped_tier(holdings, slot);
            let status = match engine.quote(catalog, holdings, page, slot) {
                None => PieceStatus::Owned { tier: owned },
                Some(q) if q.is_upgrade() => PieceStatus::Upgrade {
                    price: q.price,
                    discount: q.discount,
                },
                Some(q) => PieceStatus::Buy { price: q.price },
            };
            let mut vars = tier_vars.clone();
            vars.push(("piece_name", slot.piece_name().to_string()));
            vars.push(("status", status_line(status, &accent)));
            PieceEntry {
                slot,
                grid_slot: grid_position(menu, slot),
                name: fill(&menu.piece_name_format, &vars),
                lore: menu.piece_lore.iter().map(|l| fill(l, &vars)).collect(),
                status,
            }
        })
        .collect();

    let nav = |target: u32, grid_slot: usize, label: &str| NavEntry {
        grid_slot,
        label: label.to_string(),
        target_page: target,
    };
    let previous = (page > 1).then(|| nav(page - 1, menu.slots.previous_button, &menu.previous_name));
    let next = (page < max_page).then(|| nav(page + 1, menu.slots.next_button, &menu.next_name));

    let stats_vars = [
        ("accent", accent.clone()),
        ("player", player.username.clone()),
        ("essence", engine.ledger().balance(holdings).to_string()),
        ("multiplier", format!("{:.2}", total_multiplier(holdings))),
        ("armor_count", equipped_count(holdings).to_string()),
    ];
    let stats = std::iter::once(fill(&menu.player_stats_name, &stats_vars))
        .chain(menu.player_stats_lore.iter().map(|l| fill(l, &stats_vars)))
        .collect();

    Some(MenuPage {
        page,
        max_page,
        title,
        tier_info,
        pieces,
        previous,
        next,
        stats,
    })
}

fn tier_vars(tier: &TierDefinition, accent: &str) -> Vec<(&'static str, String)> {
    let full_set_bonus = tier.multiplier() * ARMOR_PIECES_PER_SET as f64;
    vec![
        ("accent", accent.to_string()),
        ("hex_color", tier.hex_color().to_string()),
        ("tier_name", tier.name().to_string()),
        ("tier", tier.tier().to_string()),
        ("multiplier", tier.multiplier().to_string()),
        ("price", tier.price().to_string()),
        ("full_set_bonus", format!("{:.2}", full_set_bonus)),
    ]
}

fn status_line(status: PieceStatus, accent: &str) -> String {
    match status {
        PieceStatus::Owned { tier } => format!("&aOwned &7(tier {})", tier),
        PieceStatus::Buy { price } => format!("&eClick to buy for {}{} &eessence", accent, price),
        PieceStatus::Upgrade { price, discount } => format!(
            "&eClick to upgrade for {}{} &eessence &7(-{})",
            accent, price, discount
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_page_bounds() {
        assert_eq!(clamp_page(0, 10), 1);
        assert_eq!(clamp_page(-4, 10), 1);
        assert_eq!(clamp_page(11, 10), 10);
        assert_eq!(clamp_page(5, 10), 5);
        assert_eq!(clamp_page(3, 0), 1);
    }

    #[test]
    fn clicks_route_by_configured_slot() {
        let menu = MenuConfig::default();
        assert_eq!(route_click(&menu, 3, 10), Some(MenuIntent::Navigate(2)));
        assert_eq!(route_click(&menu, 3, 16), Some(MenuIntent::Navigate(4)));
        assert_eq!(
            route_click(&menu, 3, 29),
            Some(MenuIntent::PurchaseOrUpgrade { tier: 3, slot: Slot::Head })
        );
        assert_eq!(
            route_click(&menu, 3, 33),
            Some(MenuIntent::PurchaseOrUpgrade { tier: 3, slot: Slot::Feet })
        );
    }

    #[test]
    fn clicks_outside_or_on_decoration_are_ignored() {
        let menu = MenuConfig::default();
        assert_eq!(route_click(&menu, 1, -1), None);
        assert_eq!(route_click(&menu, 1, 54), None);
        assert_eq!(route_click(&menu, 1, 0), None);
        assert_eq!(route_click(&menu, 1, 13), None);
    }

    mod pages {
        use super::super::*;
        use crate::armory::ledger::StackLedger;
        use crate::armory::engine::UpgradePricing;
        use crate::config::Config;

        fn fixture(config: &Config) -> (TierCatalog, PurchaseEngine<StackLedger>, Messages) {
            (
                TierCatalog::from_table(&config.tiers),
                PurchaseEngine::new(
                    StackLedger::default(),
                    UpgradePricing::default(),
                    &config.menu.piece_name_format,
                ),
                Messages::from_config(config),
            )
        }

        #[test]
        fn page_shows_full_set_bonus_and_both_neighbours() {
            let config = Config::default();
            let (catalog, engine, messages) = fixture(&config);
            let player = PlayerRecord::new("Steve", 36);

            let page = open_menu(&catalog, &engine, &config.menu, &messages, &player, 2).unwrap();
            assert_eq!(page.page, 2);
            assert!(page.tier_info.iter().any(|l| l.contains("0.40")));
            assert_eq!(page.previous.as_ref().map(|n| n.target_page), Some(1));
            assert_eq!(page.next.as_ref().map(|n| n.target_page), Some(3));
            assert!(page
                .pieces
                .iter()
                .all(|p| p.status == PieceStatus::Buy { price: 40 }));
        }

        #[test]
        fn edge_pages_hide_missing_neighbours() {
            let config = Config::default();
            let (catalog, engine, messages) = fixture(&config);
            let player = PlayerRecord::new("Steve", 36);

            let first = open_menu(&catalog, &engine, &config.menu, &messages, &player, -3).unwrap();
            assert_eq!(first.page, 1);
            assert!(first.previous.is_none());

            let last = open_menu(&catalog, &engine, &config.menu, &messages, &player, 99).unwrap();
            assert_eq!(last.page, 10);
            assert!(last.next.is_none());
        }

        #[test]
        fn hole_in_the_table_has_no_page() {
            let mut config = Config::default();
            config.tiers.remove("4");
            let (catalog, engine, messages) = fixture(&config);
            let player = PlayerRecord::new("Steve", 36);
            assert!(open_menu(&catalog, &engine, &config.menu, &messages, &player, 4).is_none());
        }

        #[test]
        fn owned_and_upgrade_statuses() {
            let config = Config::default();
            let (catalog, engine, messages) = fixture(&config);
            let mut player = PlayerRecord::new("Steve", 36);
            engine.ledger().grant(&mut player.holdings, 200).unwrap();
            engine
                .purchase_or_upgrade(&catalog, &mut player.holdings, 2, Slot::Chest)
                .unwrap();

            let page = open_menu(&catalog, &engine, &config.menu, &messages, &player, 2).unwrap();
            assert_eq!(page.pieces[1].status, PieceStatus::Owned { tier: 2 });
            let page = open_menu(&catalog, &engine, &config.menu, &messages, &player, 3).unwrap();
            assert_eq!(
                page.pieces[1].status,
                PieceStatus::Upgrade { price: 30, discount: 30 }
            );
            assert!(page.stats.iter().any(|l| l.contains("1/4")));
        }
    }
}
