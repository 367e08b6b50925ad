//! Message keys and template rendering.
//!
//! Templates use `{name}` placeholders. Colour tokens (`&a`, `<##RRGGBB>`)
//! are left in place for the presentation layer; [`plain_text`] strips them
//! for consoles that cannot show colour.

use std::collections::BTreeMap;
use std::fmt;

use super::engine::PurchaseOutcome;
use crate::config::{Config, MessagesConfig};

/// The fixed set of shop message templates a purchase outcome can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    AlreadyOwned,
    Purchased,
    Upgraded,
    NeedEssence,
    NeedEssenceUpgrade,
    InventoryFull,
}

impl MessageKey {
    pub const ALL: [MessageKey; 6] = [
        MessageKey::AlreadyOwned,
        MessageKey::Purchased,
        MessageKey::Upgraded,
        MessageKey::NeedEssence,
        MessageKey::NeedEssenceUpgrade,
        MessageKey::InventoryFull,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKey::AlreadyOwned => "already-owned",
            MessageKey::Purchased => "purchased",
            MessageKey::Upgraded => "upgraded",
            MessageKey::NeedEssence => "need-essence",
            MessageKey::NeedEssenceUpgrade => "need-essence-upgrade",
            MessageKey::InventoryFull => "inventory-full",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replace every `{name}` in `template` with its value.
pub fn fill(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

/// Strip `&x` legacy codes and `<##RRGGBB>` / `<gradient:..>` style tags.
pub fn plain_text(text: &str) -> String {
    const TAG_OPENERS: [&str; 5] = ["##", "gradient", "/gradient", "rainbow", "/rainbow"];
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '&' if chars
                .peek()
                .is_some_and(|(_, n)| n.is_ascii_hexdigit() || "klmnorKLMNOR".contains(*n)) =>
            {
                chars.next();
            }
            '<' if TAG_OPENERS.iter().any(|t| text[i + 1..].starts_with(t)) => {
                match text[i + 1..].find('>') {
                    Some(end) => {
                        let resume = i + end + 2;
                        while chars.next_if(|(j, _)| *j < resume).is_some() {}
                    }
                    // unclosed: nothing further can close either
                    None => {
                        out.push_str(&text[i..]);
                        break;
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Resolves message templates from configuration, falling back to the
/// built-in defaults for keys a partial config leaves out.
#[derive(Debug, Clone)]
pub struct Messages {
    prefix: String,
    accent: String,
    configured: MessagesConfig,
    defaults: MessagesConfig,
}

fn lookup(
    configured: &BTreeMap<String, String>,
    defaults: &BTreeMap<String, String>,
    group: &str,
    key: &str,
) -> String {
    configured
        .get(key)
        .or_else(|| defaults.get(key))
        .cloned()
        .unwrap_or_else(|| format!("&cMessage not found: {}.{}", group, key))
}

impl Messages {
    pub fn from_config(config: &Config) -> Self {
        Self {
            prefix: config.shop.prefix.clone(),
            accent: config.shop.accent_color.clone(),
            configured: config.messages.clone(),
            defaults: MessagesConfig::default(),
        }
    }

    pub fn accent(&self) -> &str {
        &self.accent
    }

    /// `body` with the chat prefix in front.
    pub fn prefixed(&self, body: &str) -> String {
        format!("{} {}", self.prefix, body)
    }

    pub fn shop(&self, key: MessageKey) -> String {
        lookup(&self.configured.shop, &self.defaults.shop, "shop", key.as_str())
    }

    pub fn admin(&self, key: &str) -> String {
        lookup(&self.configured.admin, &self.defaults.admin, "admin", key)
    }

    pub fn essence(&self, key: &str) -> String {
        lookup(&self.configured.essence, &self.defaults.essence, "essence", key)
    }

    /// Chat line for a purchase outcome; `None` for silent outcomes.
    pub fn outcome(&self, outcome: &PurchaseOutcome) -> Option<String> {
        let key = outcome.message_key()?;
        let accent = ("accent", self.accent.clone());
        let body = match outcome {
            PurchaseOutcome::Purchased(r) | PurchaseOutcome::Upgraded(r) => fill(
                &self.shop(key),
                &[
                    ("part", r.slot.part_name().to_string()),
                    ("tier", r.tier.to_string()),
                    ("price", r.price_paid.to_string()),
                    ("discount", r.discount_applied.to_string()),
                    accent,
                ],
            ),
            PurchaseOutcome::InsufficientFunds { quote, .. } => fill(
                &self.shop(key),
                &[
                    ("price", quote.price.to_string()),
                    ("discount", quote.discount.to_string()),
                    accent,
                ],
            ),
            _ => fill(&self.shop(key), &[accent]),
        };
        Some(self.prefixed(&body))
    }

    /// Reply to the `essence` command.
    pub fn essence_report(&self, balance: u64) -> String {
        let body = if balance > 0 {
            fill(
                &self.essence("count"),
                &[
                    ("accent", self.accent.clone()),
                    ("amount", balance.to_string()),
                ],
            )
        } else {
            self.essence("none")
        };
        self.prefixed(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_replaces_every_occurrence() {
        let out = fill("{a}-{b}-{a}", &[("a", "1".into()), ("b", "2".into())]);
        assert_eq!(out, "1-2-1");
    }

    #[test]
    fn plain_text_handles_long_input() {
        let text = format!("{}{}", "<".repeat(50_000), "&a<##FFCE8D>done".repeat(5_000));
        let plain = plain_text(&text);
        assert!(plain.starts_with("<<<"));
        assert_eq!(plain.len(), 50_000 + 4 * 5_000);
    }

    #[test]
    fn plain_text_strips_color_tokens() {
        assert_eq!(plain_text("&aHello <##FFCE8D>world&r!"), "Hello world!");
        assert_eq!(
            plain_text("<gradient:#8B00FF:#FF1493>Armor Essence</gradient>"),
            "Armor Essence"
        );
        assert_eq!(plain_text("a < b & c"), "a < b & c");
        assert_eq!(plain_text("x <##FFFFFF"), "x <##FFFFFF");
        assert_eq!(plain_text("é<##112233>ü"), "éü");
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let mut config = Config::default();
        config.messages.shop.clear();
        config
            .messages
            .shop
            .insert("purchased".into(), "bought {part}".into());
        let messages = Messages::from_config(&config);

        assert_eq!(messages.shop(MessageKey::Purchased), "bought {part}");
        assert_eq!(
            messages.shop(MessageKey::AlreadyOwned),
            MessagesConfig::default().shop["already-owned"]
        );
        assert_eq!(messages.admin("nope"), "&cMessage not found: admin.nope");
    }

    #[test]
    fn every_message_key_has_a_default_template() {
        let defaults = MessagesConfig::default();
        for key in MessageKey::ALL {
            assert!(defaults.shop.contains_key(key.as_str()), "missing {}", key);
        }
    }

    #[test]
    fn essence_report_switches_on_zero() {
        let messages = Messages::from_config(&Config::default());
        assert!(messages.essence_report(12).contains("12"));
        assert!(messages.essence_report(0).contains("don't have any"));
    }
}
