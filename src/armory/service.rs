//! Shared armory state and the operations players and operators invoke.
//!
//! Lock order is always shop state first, then a single player's record.
//! Every purchase and grant holds the recipient's lock for the whole call,
//! so two requests for the same player never interleave. Reload takes the
//! shop state for writing and therefore waits for in-flight purchases.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{error, info, warn};

use super::admin::{complete, parse_admin, rejection_message, AdminCommand};
use super::catalog::{TierCatalog, TierDefinition, DEFAULT_MAX_TIER};
use super::engine::{IssueReceipt, PurchaseEngine, PurchaseOutcome, UpgradePricing};
use super::errors::ArmoryError;
use super::ledger::{CurrencyLedger, GrantReceipt, StackLedger};
use super::menu::{clamp_page, open_menu, route_click, MenuIntent, MenuPage};
use super::messages::Messages;
use super::types::{PartSelector, PlayerRecord, Slot};
use crate::config::Config;
use crate::logutil::{escape_args, escape_log};
use crate::validation::validate_player_name;

/// What the player should see after a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShopReply {
    pub lines: Vec<String>,
    /// Refreshed menu page, if the player has one open.
    pub menu: Option<MenuPage>,
    pub outcomes: Vec<PurchaseOutcome>,
}

struct ShopState {
    config: Config,
    catalog: TierCatalog,
    engine: PurchaseEngine<StackLedger>,
    messages: Messages,
}

impl ShopState {
    fn build(config: Config) -> Self {
        let catalog = TierCatalog::from_table(&config.tiers);
        let state = Self {
            engine: Self::engine_for(&config),
            messages: Messages::from_config(&config),
            catalog,
            config,
        };
        state.warn_on_layout();
        state
    }

    fn engine_for(config: &Config) -> PurchaseEngine<StackLedger> {
        PurchaseEngine::new(
            StackLedger::new(config.essence.clone())
                .with_accent(&config.shop.accent_color),
            UpgradePricing::from(&config.shop),
            &config.menu.piece_name_format,
        )
    }

    /// Swap in a new configuration. The catalog is cleared before the new
    /// table is loaded so renumbered tiers cannot survive.
    fn apply(&mut self, config: Config) -> usize {
        let loaded = self.catalog.reload(&config.tiers);
        self.engine = Self::engine_for(&config);
        self.messages = Messages::from_config(&config);
        self.config = config;
        self.warn_on_layout();
        loaded
    }

    fn warn_on_layout(&self) {
        if self.catalog.is_empty() {
            warn!("No armor tiers loaded; the shop has nothing to sell");
        }
        let size = self.config.menu.size;
        let slots = &self.config.menu.slots;
        for (name, slot) in [
            ("previous_button", slots.previous_button),
            ("next_button", slots.next_button),
            ("helmet", slots.helmet),
            ("chestplate", slots.chestplate),
            ("leggings", slots.leggings),
            ("boots", slots.boots),
        ] {
            if slot >= size {
                warn!("Menu slot {} = {} lies outside a menu of size {}", name, slot, size);
            }
        }
    }

    fn render(&self, player: &PlayerRecord, page: u32) -> Option<MenuPage> {
        open_menu(
            &self.catalog,
            &self.engine,
            &self.config.menu,
            &self.messages,
            player,
            i64::from(page),
        )
    }
}

fn poisoned<T>(_: PoisonError<T>) -> ArmoryError {
    ArmoryError::Internal("lock poisoned".to_string())
}

type PlayerHandle = Arc<Mutex<PlayerRecord>>;

/// Online players plus the shop they share.
pub struct ArmoryService {
    state: RwLock<ShopState>,
    players: RwLock<HashMap<String, PlayerHandle>>,
    config_path: Option<String>,
}

impl ArmoryService {
    pub fn new(config: Config) -> Self {
        Self {
            state: RwLock::new(ShopState::build(config)),
            players: RwLock::new(HashMap::new()),
            config_path: None,
        }
    }

    /// Remember the file `reload` re-reads.
    pub fn with_config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    fn state(&self) -> Result<RwLockReadGuard<'_, ShopState>, ArmoryError> {
        self.state.read().map_err(poisoned)
    }

    fn state_mut(&self) -> Result<RwLockWriteGuard<'_, ShopState>, ArmoryError> {
        self.state.write().map_err(poisoned)
    }

    fn handle(&self, name: &str) -> Result<PlayerHandle, ArmoryError> {
        let players = self.players.read().map_err(poisoned)?;
        players
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| ArmoryError::PlayerNotFound(name.to_string()))
    }

    fn lock(handle: &PlayerHandle) -> Result<MutexGuard<'_, PlayerRecord>, ArmoryError> {
        handle.lock().map_err(poisoned)
    }

    // ---- sessions ----

    /// Bring a player online with empty holdings.
    pub fn join(&self, name: &str) -> Result<(), ArmoryError> {
        let name = validate_player_name(name)?;
        let slots = self.state()?.config.holdings.inventory_slots;
        let mut players = self.players.write().map_err(poisoned)?;
        let key = name.to_ascii_lowercase();
        if players.contains_key(&key) {
            return Err(ArmoryError::PlayerAlreadyOnline(name));
        }
        players.insert(key, Arc::new(Mutex::new(PlayerRecord::new(&name, slots))));
        info!("{} joined", escape_log(&name));
        Ok(())
    }

    /// Take a player offline, returning their final record.
    pub fn leave(&self, name: &str) -> Result<PlayerRecord, ArmoryError> {
        let handle = {
            let mut players = self.players.write().map_err(poisoned)?;
            players
                .remove(&name.to_ascii_lowercase())
                .ok_or_else(|| ArmoryError::PlayerNotFound(name.to_string()))?
        };
        let mut record = Self::lock(&handle)?.clone();
        record.open_page = None;
        info!("{} left", escape_log(&record.username));
        Ok(record)
    }

    /// Canonical name of an online player, matched case-insensitively.
    pub fn resolve_player(&self, name: &str) -> Option<String> {
        let handle = self.handle(name).ok()?;
        let record = handle.lock().ok()?;
        Some(record.username.clone())
    }

    pub fn online_players(&self) -> Vec<String> {
        let Ok(players) = self.players.read() else {
            return Vec::new();
        };
        let mut names: Vec<String> = players
            .values()
            .filter_map(|h| h.lock().ok().map(|r| r.username.clone()))
            .collect();
        names.sort();
        names
    }

    /// Copy of a player's current record.
    pub fn snapshot(&self, name: &str) -> Result<PlayerRecord, ArmoryError> {
        let handle = self.handle(name)?;
        let record = Self::lock(&handle)?;
        Ok(record.clone())
    }

    // ---- player commands ----

    /// The `armor` command: open the menu on the first page.
    pub fn armor_command(&self, name: &str) -> Result<ShopReply, ArmoryError> {
        self.open_menu(name, 1)
    }

    /// Open (or move) the menu to `page`, clamped to the catalog range.
    pub fn open_menu(&self, name: &str, page: i64) -> Result<ShopReply, ArmoryError> {
        let state = self.state()?;
        let handle = self.handle(name)?;
        let mut record = Self::lock(&handle)?;
        let page = clamp_page(page, state.catalog.max_tier());
        let menu = match state.render(&record, page) {
            Some(menu) => {
                record.open_page = Some(menu.page);
                Some(menu)
            }
            // absent tier: the current page (if any) stays open
            None => record.open_page.and_then(|current| state.render(&record, current)),
        };
        Ok(ShopReply {
            menu,
            ..ShopReply::default()
        })
    }

    pub fn close_menu(&self, name: &str) -> Result<(), ArmoryError> {
        let handle = self.handle(name)?;
        Self::lock(&handle)?.open_page = None;
        Ok(())
    }

    /// Route a click on the open menu.
    pub fn click(&self, name: &str, raw_slot: i64) -> Result<ShopReply, ArmoryError> {
        let (intent, max_tier) = {
            let state = self.state()?;
            let handle = self.handle(name)?;
            let record = Self::lock(&handle)?;
            let page = record
                .open_page
                .ok_or_else(|| ArmoryError::NoMenuOpen(record.username.clone()))?;
            (
                route_click(&state.config.menu, page, raw_slot),
                state.catalog.max_tier(),
            )
        };
        match intent {
            None => Ok(ShopReply::default()),
            // no navigation entry is drawn for a page that does not exist
            Some(MenuIntent::Navigate(target)) if target < 1 || target > i64::from(max_tier) => {
                Ok(ShopReply::default())
            }
            Some(MenuIntent::Navigate(target)) => self.open_menu(name, target),
            Some(MenuIntent::PurchaseOrUpgrade { tier, slot }) => self.purchase(name, tier, slot),
        }
    }

    /// Buy or upgrade one piece.
    pub fn purchase(&self, name: &str, tier: u32, slot: Slot) -> Result<ShopReply, ArmoryError> {
        self.run_purchase(name, |state, record| {
            state
                .engine
                .purchase_or_upgrade(&state.catalog, &mut record.holdings, tier, slot)
                .map(|o| vec![o])
        })
    }

    /// Buy or upgrade all four pieces at `tier`, each on its own.
    pub fn purchase_fullset(&self, name: &str, tier: u32) -> Result<ShopReply, ArmoryError> {
        self.run_purchase(name, |state, record| {
            state
                .engine
                .purchase_fullset(&state.catalog, &mut record.holdings, tier)
        })
    }

    fn run_purchase<F>(&self, name: &str, buy: F) -> Result<ShopReply, ArmoryError>
    where
        F: FnOnce(&ShopState, &mut PlayerRecord) -> Result<Vec<PurchaseOutcome>, ArmoryError>,
    {
        let state = self.state()?;
        let handle = self.handle(name)?;
        let mut record = Self::lock(&handle)?;

        let outcomes = buy(&*state, &mut *record)?;
        let lines = outcomes
            .iter()
            .filter_map(|o| state.messages.outcome(o))
            .collect();
        let menu = match record.open_page {
            Some(page) => state.render(&record, page),
            None => None,
        };
        Ok(ShopReply {
            lines,
            menu,
            outcomes,
        })
    }

    /// The `essence` command.
    pub fn essence_command(&self, name: &str) -> Result<ShopReply, ArmoryError> {
        let state = self.state()?;
        let handle = self.handle(name)?;
        let record = Self::lock(&handle)?;
        let balance = state.engine.ledger().balance(&record.holdings);
        Ok(ShopReply {
            lines: vec![state.messages.essence_report(balance)],
            ..ShopReply::default()
        })
    }

    pub fn balance(&self, name: &str) -> Result<u64, ArmoryError> {
        let state = self.state()?;
        let handle = self.handle(name)?;
        let record = Self::lock(&handle)?;
        Ok(state.engine.ledger().balance(&record.holdings))
    }

    /// Wear the item at inventory `index`.
    pub fn equip(&self, name: &str, index: usize) -> Result<Slot, ArmoryError> {
        let handle = self.handle(name)?;
        let mut record = Self::lock(&handle)?;
        record.holdings.equip_from_inventory(index)
    }

    // ---- operator actions ----

    pub fn grant_essence(&self, name: &str, amount: u32) -> Result<GrantReceipt, ArmoryError> {
        let state = self.state()?;
        let handle = self.handle(name)?;
        let mut record = Self::lock(&handle)?;
        let receipt = state.engine.ledger().grant(&mut record.holdings, amount)?;
        info!(
            "Granted {} essence to {} ({} placed)",
            amount,
            escape_log(&record.username),
            receipt.placed
        );
        Ok(receipt)
    }

    pub fn grant_armor(
        &self,
        name: &str,
        tier: u32,
        part: PartSelector,
    ) -> Result<IssueReceipt, ArmoryError> {
        let state = self.state()?;
        let handle = self.handle(name)?;
        let mut record = Self::lock(&handle)?;
        let receipt = state
            .engine
            .issue(&state.catalog, &mut record.holdings, tier, part)?;
        info!(
            "Issued {} tier {} piece(s) to {}",
            receipt.issued.len(),
            tier,
            escape_log(&record.username)
        );
        if !receipt.undelivered.is_empty() {
            warn!(
                "{} piece(s) did not fit in {}'s inventory",
                receipt.undelivered.len(),
                escape_log(&record.username)
            );
        }
        Ok(receipt)
    }

    /// Re-read the config file (or re-apply the in-memory config when the
    /// service was built without a path). Returns the number of tiers loaded.
    pub async fn reload(&self) -> anyhow::Result<usize> {
        let config = match &self.config_path {
            Some(path) => Config::load(path).await?,
            None => self.current_config()?,
        };
        Ok(self.reload_from(config)?)
    }

    fn current_config(&self) -> Result<Config, ArmoryError> {
        Ok(self.state()?.config.clone())
    }

    pub fn reload_from(&self, config: Config) -> Result<usize, ArmoryError> {
        let mut state = self.state_mut()?;
        let loaded = state.apply(config);
        info!("Reloaded configuration: {} armor tier(s)", loaded);
        Ok(loaded)
    }

    /// Run an admin command line (subcommand first) and return the replies.
    pub async fn admin(&self, args: &[&str]) -> Result<Vec<String>, ArmoryError> {
        info!("Admin command: {}", escape_args(args));
        let (parsed, messages) = {
            let state = self.state()?;
            let parsed = parse_admin(args, |n| self.resolve_player(n), state.catalog.max_tier());
            (parsed, state.messages.clone())
        };
        let command = match parsed {
            Ok(command) => command,
            Err(err) => return Ok(vec![rejection_message(&err, &messages)]),
        };

        match command {
            AdminCommand::GiveArmor { player, part, tier } => {
                let receipt = match self.grant_armor(&player, tier, part) {
                    Err(ArmoryError::UnknownTier(tier)) => {
                        return Ok(vec![messages.prefixed(&format!(
                            "&cTier {} is not configured!",
                            tier
                        ))]);
                    }
                    other => other?,
                };
                let mut lines = vec![messages.prefixed(&format!("&aGave armor to {}!", player))];
                if !receipt.undelivered.is_empty() {
                    lines.push(messages.prefixed(&format!(
                        "&e{} piece(s) did not fit in {}'s inventory.",
                        receipt.undelivered.len(),
                        player
                    )));
                }
                Ok(lines)
            }
            AdminCommand::GiveEssence { player, amount } => {
                let receipt = self.grant_essence(&player, amount)?;
                let mut lines = vec![messages.prefixed(&format!(
                    "&aGave {}x Armor Essence to {}!",
                    amount, player
                ))];
                if receipt.is_partial() {
                    lines.push(messages.prefixed(&format!(
                        "&eOnly {} fit in {}'s inventory.",
                        receipt.placed, player
                    )));
                }
                Ok(lines)
            }
            AdminCommand::Reload => {
                let mut lines = vec![messages.prefixed("&aReloading plugin...")];
                match self.reload().await {
                    Ok(_) => {
                        let messages = self.state()?.messages.clone();
                        lines.push(messages.prefixed(&messages.admin("reload")));
                    }
                    Err(e) => {
                        error!("Reload failed: {}", e);
                        lines.push(messages.prefixed("&cReload failed, see the server log."));
                    }
                }
                Ok(lines)
            }
        }
    }

    /// Completion candidates for a partially typed admin command.
    pub fn admin_completions(&self, args: &[&str]) -> Vec<String> {
        let max_tier = self.max_tier().unwrap_or(DEFAULT_MAX_TIER);
        complete(args, &self.online_players(), max_tier)
    }

    // ---- catalog views ----

    pub fn tiers(&self) -> Result<Vec<TierDefinition>, ArmoryError> {
        Ok(self.state()?.catalog.iter().cloned().collect())
    }

    pub fn max_tier(&self) -> Result<u32, ArmoryError> {
        Ok(self.state()?.catalog.max_tier())
    }

    /// Current upgrade pricing.
    pub fn pricing(&self) -> Result<UpgradePricing, ArmoryError> {
        Ok(self.state()?.engine.pricing())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armory::messages::plain_text;

    fn service() -> ArmoryService {
        let service = ArmoryService::new(Config::default());
        service.join("Steve").unwrap();
        service
    }

    #[test]
    fn join_rejects_duplicates_case_insensitively() {
        let service = service();
        assert!(matches!(
            service.join("steve"),
            Err(ArmoryError::PlayerAlreadyOnline(_))
        ));
        assert!(matches!(
            service.join("x"),
            Err(ArmoryError::InvalidPlayerName(_))
        ));
    }

    #[test]
    fn leave_closes_the_session() {
        let service = service();
        service.armor_command("Steve").unwrap();
        let record = service.leave("STEVE").unwrap();
        assert_eq!(record.username, "Steve");
        assert_eq!(record.open_page, None);
        assert!(matches!(
            service.snapshot("Steve"),
            Err(ArmoryError::PlayerNotFound(_))
        ));
    }

    #[test]
    fn click_without_menu_is_an_error() {
        let service = service();
        assert!(matches!(
            service.click("Steve", 29),
            Err(ArmoryError::NoMenuOpen(_))
        ));
    }

    #[test]
    fn navigation_stays_within_catalog() {
        let service = service();
        let reply = service.armor_command("Steve").unwrap();
        assert_eq!(reply.menu.as_ref().map(|m| m.page), Some(1));

        // previous on page 1 does nothing
        let reply = service.click("Steve", 10).unwrap();
        assert_eq!(reply, ShopReply::default());

        let reply = service.click("Steve", 16).unwrap();
        assert_eq!(reply.menu.map(|m| m.page), Some(2));
        assert_eq!(service.snapshot("Steve").unwrap().open_page, Some(2));
    }

    #[test]
    fn purchase_click_refreshes_menu() {
        let service = service();
        service.grant_essence("Steve", 100).unwrap();
        service.armor_command("Steve").unwrap();

        let reply = service.click("Steve", 29).unwrap();
        assert_eq!(reply.outcomes.len(), 1);
        assert!(reply.outcomes[0].is_success());
        assert_eq!(reply.lines.len(), 1);
        let menu = reply.menu.unwrap();
        let stats = menu.stats.join("\n");
        assert!(stats.contains("75"), "stats were: {}", stats);
        assert_eq!(service.balance("Steve").unwrap(), 75);
    }

    #[test]
    fn navigating_into_a_tier_gap_keeps_the_current_page() {
        let mut config = Config::default();
        config.tiers.remove("4");
        let service = ArmoryService::new(config);
        service.join("Steve").unwrap();
        service.open_menu("Steve", 3).unwrap();

        let reply = service.click("Steve", 16).unwrap();
        assert_eq!(reply.menu.map(|m| m.page), Some(3));
        assert_eq!(service.snapshot("Steve").unwrap().open_page, Some(3));

        // the menu still takes clicks
        let reply = service.click("Steve", 29).unwrap();
        assert_eq!(reply.outcomes.len(), 1);
        assert_eq!(reply.menu.map(|m| m.page), Some(3));
    }

    #[test]
    fn owned_piece_click_rerenders_without_charging() {
        let service = service();
        service.grant_essence("Steve", 100).unwrap();
        service.armor_command("Steve").unwrap();
        service.click("Steve", 29).unwrap();
        let before = service.snapshot("Steve").unwrap().holdings;

        let reply = service.click("Steve", 29).unwrap();
        assert!(matches!(reply.outcomes[..], [PurchaseOutcome::AlreadyOwned { .. }]));
        assert!(plain_text(&reply.lines[0]).contains("already own"));
        assert_eq!(reply.menu.map(|m| m.page), Some(1));
        assert_eq!(service.balance("Steve").unwrap(), 75);
        assert_eq!(service.snapshot("Steve").unwrap().holdings, before);
    }

    #[test]
    fn short_of_funds_click_rerenders_without_charging() {
        let service = service();
        service.grant_essence("Steve", 10).unwrap();
        service.open_menu("Steve", 2).unwrap();
        let before = service.snapshot("Steve").unwrap().holdings;

        let reply = service.click("Steve", 29).unwrap();
        assert!(matches!(reply.outcomes[..], [PurchaseOutcome::InsufficientFunds { .. }]));
        assert!(plain_text(&reply.lines[0]).contains("essence to buy this"));
        assert_eq!(reply.menu.map(|m| m.page), Some(2));
        assert_eq!(service.balance("Steve").unwrap(), 10);
        let after = service.snapshot("Steve").unwrap().holdings;
        assert_eq!(after, before);
        assert_eq!(after.equipment().count(), 0);
    }
}
