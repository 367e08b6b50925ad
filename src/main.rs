//! Binary entrypoint for the Essence Armory CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml` with the default ten-tier table
//! - `tiers` - print the tier catalog loaded from the config
//! - `console` - line-oriented play-testing session over stdin
//!
//! See the library crate docs for module‑level details: `essence_armory::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use essence_armory::armory::{
    plain_text, tier_of, ArmoryService, PartSelector, PlayerRecord, ShopReply, Slot,
};
use essence_armory::config::Config;

#[derive(Parser)]
#[command(name = "armory")]
#[command(about = "Tier-progression armor shop with essence currency")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// List the configured armor tiers
    Tiers,
    /// Run an interactive console session
    Console,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            init_logging(&None, cli.verbose);
            if !force && tokio::fs::metadata(&cli.config).await.is_ok() {
                warn!("{} already exists; use --force to overwrite", cli.config);
                return Ok(());
            }
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Tiers => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            let service = ArmoryService::new(config);
            let pricing = service.pricing()?;
            println!(
                "{:>4}  {:<12} {:>6} {:>11}  {:<11}",
                "tier", "name", "price", "multiplier", "rgb"
            );
            for tier in service.tiers()? {
                println!(
                    "{:>4}  {:<12} {:>6} {:>10.2}x  {:<11}",
                    tier.tier(),
                    plain_text(tier.name()),
                    tier.price(),
                    tier.multiplier(),
                    tier.rgb().to_string()
                );
            }
            println!(
                "upgrade discount: {} per owned tier, floor {}",
                pricing.discount_per_tier, pricing.minimum_price
            );
        }
        Commands::Console => {
            let config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            info!("Starting Essence Armory v{}", env!("CARGO_PKG_VERSION"));
            let service = ArmoryService::new(config).with_config_path(&cli.config);
            run_console(&service).await?;
        }
    }

    Ok(())
}

const CONSOLE_HELP: &str = "\
commands:
  join <name> | leave <name> | who
  as <name> armor | essence | show | page <n> | click <slot>
  as <name> buy <tier> <head|chestplate|leggings|boots|fullset>
  as <name> wear <inventory index> | close | dump
  admin <givearmor|giveessence|reload> ...
  complete <partial admin command>
  help | quit";

async fn run_console(service: &ArmoryService) -> Result<()> {
    println!("{}", CONSOLE_HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((first, rest)) = words.split_first() else {
            continue;
        };
        match *first {
            "quit" | "exit" => break,
            "help" => println!("{}", CONSOLE_HELP),
            "who" => println!("online: {}", service.online_players().join(", ")),
            "complete" => println!("{}", service.admin_completions(rest).join("  ")),
            "admin" => match service.admin(rest).await {
                Ok(replies) => replies.iter().for_each(|r| println!("{}", plain_text(r))),
                Err(e) => println!("error: {}", e),
            },
            _ => {
                if let Err(e) = player_command(service, first, rest) {
                    println!("error: {}", e);
                }
            }
        }
    }
    info!("Console session closed");
    Ok(())
}

fn player_command(service: &ArmoryService, first: &str, rest: &[&str]) -> Result<()> {
    match (first, rest) {
        ("join", [name]) => {
            service.join(name)?;
            println!("{} joined", name);
        }
        ("leave", [name]) => {
            let record = service.leave(name)?;
            println!("{} left", record.username);
        }
        ("as", [name, action @ ..]) => player_action(service, name, action)?,
        _ => println!("unknown command; type `help`"),
    }
    Ok(())
}

fn player_action(service: &ArmoryService, name: &str, action: &[&str]) -> Result<()> {
    let reply = match action {
        ["armor"] => service.armor_command(name)?,
        ["essence"] => service.essence_command(name)?,
        ["page", n] => service.open_menu(name, n.parse()?)?,
        ["click", slot] => service.click(name, slot.parse()?)?,
        ["close"] => {
            service.close_menu(name)?;
            ShopReply::default()
        }
        ["buy", tier, part] => {
            let tier: u32 = tier.parse()?;
            match PartSelector::parse(part) {
                Some(PartSelector::FullSet) => service.purchase_fullset(name, tier)?,
                Some(PartSelector::Single(slot)) => service.purchase(name, tier, slot)?,
                None => {
                    println!("unknown part: {}", part);
                    ShopReply::default()
                }
            }
        }
        ["wear", index] => {
            let slot = service.equip(name, index.parse()?)?;
            println!("{} now wears the item in their {} slot", name, slot);
            ShopReply::default()
        }
        ["dump"] => {
            println!("{}", serde_json::to_string_pretty(&service.snapshot(name)?)?);
            ShopReply::default()
        }
        ["show"] => {
            print_holdings(&service.snapshot(name)?, service.balance(name)?);
            ShopReply::default()
        }
        _ => {
            println!("unknown action; type `help`");
            ShopReply::default()
        }
    };
    print_reply(&reply);
    Ok(())
}

fn print_reply(reply: &ShopReply) {
    for line in &reply.lines {
        println!("{}", plain_text(line));
    }
    if let Some(menu) = &reply.menu {
        for line in menu.render_lines() {
            println!("{}", plain_text(&line));
        }
    }
}

fn print_holdings(record: &PlayerRecord, balance: u64) {
    println!("{} (essence: {})", record.username, balance);
    for slot in Slot::ALL {
        match record.holdings.equipped(slot) {
            Some(item) => println!(
                "  {:<10} {} (tier {})",
                slot.part_name(),
                plain_text(&item.display_name),
                tier_of(item)
            ),
            None => println!("  {:<10} -", slot.part_name()),
        }
    }
    for (index, item) in record.holdings.inventory().iter().enumerate() {
        if let Some(item) = item {
            println!(
                "  [{:>2}] {} x{}",
                index,
                plain_text(&item.display_name),
                item.quantity
            );
        }
    }
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let configured = config
        .as_ref()
        .and_then(|c| c.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // With a log file, echo to the console only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
