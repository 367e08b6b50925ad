use essence_armory::armory::{parse_rgb, Rgb, TierCatalog, DEFAULT_MAX_TIER};
use essence_armory::config::Config;

const MIXED_TABLE: &str = r#"
[tiers.1]
name = "Leather"
rgb_color = "139,69,19"
hex_color = "<##8B4513>"
multiplier = 0.05
price = 25

[tiers.2]
name = "Broken Colour"
rgb_color = "not,a,colour"
price = 40

[tiers.3]
name = "Bad Price"
price = "lots"

[tiers.4]
name = "Negative"
multiplier = -1.0

[tiers.zero]
name = "Not a number"

[tiers.6]
"#;

fn load(src: &str) -> TierCatalog {
    TierCatalog::from_table(&Config::from_toml_str(src).unwrap().tiers)
}

#[test]
fn malformed_tiers_are_skipped_not_fatal() {
    let catalog = load(MIXED_TABLE);
    let tiers: Vec<u32> = catalog.iter().map(|t| t.tier()).collect();
    assert_eq!(tiers, vec![1, 2, 6]);
    assert!(catalog.get(3).is_none());
    assert!(catalog.get(4).is_none());
}

#[test]
fn malformed_colour_falls_back_to_gray() {
    let catalog = load(MIXED_TABLE);
    assert_eq!(catalog.get(2).unwrap().rgb(), Rgb::new(150, 150, 150));
    assert_eq!(catalog.get(1).unwrap().rgb(), Rgb::new(139, 69, 19));
}

#[test]
fn missing_fields_take_defaults() {
    let catalog = load(MIXED_TABLE);
    let tier = catalog.get(6).unwrap();
    assert_eq!(tier.name(), "Unknown");
    assert_eq!(tier.price(), 25);
    assert_eq!(tier.multiplier(), 0.05);
    assert_eq!(tier.hex_color(), "<##969696>");
    assert_eq!(tier.rgb(), Rgb::NEUTRAL_GRAY);
}

#[test]
fn max_tier_tolerates_holes_and_defaults_when_empty() {
    let catalog = load(MIXED_TABLE);
    assert_eq!(catalog.max_tier(), 6);
    assert!(catalog.get(5).is_none());

    let empty = load("");
    assert!(empty.is_empty());
    assert_eq!(empty.max_tier(), DEFAULT_MAX_TIER);
}

#[test]
fn reload_discards_renumbered_tiers() {
    let mut catalog = load(MIXED_TABLE);
    let renumbered = Config::from_toml_str(
        r#"
        [tiers.1]
        name = "Only"
        "#,
    )
    .unwrap();
    assert_eq!(catalog.reload(&renumbered.tiers), 1);
    assert_eq!(catalog.len(), 1);
    assert!(catalog.get(6).is_none());
    assert_eq!(catalog.get(1).unwrap().name(), "Only");

    catalog.clear();
    assert!(catalog.is_empty());
}

#[test]
fn rgb_parsing_is_strict() {
    assert_eq!(parse_rgb("1, 2, 3"), Some(Rgb::new(1, 2, 3)));
    assert_eq!(parse_rgb("256,0,0"), None);
    assert_eq!(parse_rgb("1,2"), None);
    assert_eq!(parse_rgb("1,2,3,4"), None);
    assert_eq!(parse_rgb(""), None);
}

#[test]
fn descriptive_lines_mention_the_per_piece_multiplier() {
    let catalog = load(MIXED_TABLE);
    let lore = catalog.get(1).unwrap().lore().join("\n");
    assert!(lore.contains("0.05"));
    assert!(lore.contains("per armor piece"));
}

#[tokio::test]
async fn default_config_file_loads_ten_tiers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let path = path.to_str().unwrap();

    Config::create_default(path).await.unwrap();
    let config = Config::load(path).await.unwrap();
    let catalog = TierCatalog::from_table(&config.tiers);

    assert_eq!(catalog.len(), 10);
    assert_eq!(catalog.max_tier(), 10);
    let names: Vec<&str> = catalog.iter().map(|t| t.name()).collect();
    assert_eq!(names.first(), Some(&"Leather"));
    assert_eq!(names.last(), Some(&"Celestial"));
}

#[tokio::test]
async fn hand_written_partial_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("armory.toml");
    tokio::fs::write(
        &path,
        r#"
        [shop]
        discount_per_tier = 20

        [tiers.1]
        name = "Cloth"
        price = 5
        "#,
    )
    .await
    .unwrap();

    let config = Config::load(path.to_str().unwrap()).await.unwrap();
    assert_eq!(config.shop.discount_per_tier, 20);
    assert_eq!(config.shop.minimum_price, 10);
    let catalog = TierCatalog::from_table(&config.tiers);
    assert_eq!(catalog.get(1).unwrap().price(), 5);
}
