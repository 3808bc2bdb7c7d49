use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use haulrate_client::EstimateClient;
use haulrate_core::types::{Address, CartItem, Schedule};

#[derive(Debug, Parser)]
#[command(name = "haulrate-cli")]
#[command(about = "Haulrate pricing command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price a cart locally or against a running pricing service.
    Estimate(EstimateArgs),
    /// Validate and print a pricing configuration file.
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct EstimateArgs {
    /// Cart entry as `category:quantity` (e.g. `appliances:5`). Repeatable.
    #[arg(long = "item", value_parser = parse_item, required = true)]
    items: Vec<CartItem>,

    /// Requested pickup date (YYYY-MM-DD), for scheduling surcharges.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Geocoded pickup latitude, for surge-zone evaluation.
    #[arg(long, requires = "lng")]
    lat: Option<f64>,

    /// Geocoded pickup longitude.
    #[arg(long, requires = "lat")]
    lng: Option<f64>,

    /// Pickup ZIP code (informational; zones are evaluated by coordinates).
    #[arg(long)]
    zip: Option<String>,

    /// Pricing configuration for local estimation.
    #[arg(long, env = "HAULRATE_PRICING_PATH", default_value = "./config/pricing.yaml")]
    config: PathBuf,

    /// Base URL of a running pricing service. When set, the estimate is
    /// requested remotely, degrading to fallback pricing on failure.
    #[arg(long, env = "HAULRATE_ESTIMATOR_URL")]
    server: Option<String>,

    /// Remote request timeout in seconds.
    #[arg(long, env = "HAULRATE_CLIENT_TIMEOUT_SECS", default_value_t = 30)]
    timeout: u64,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Pricing configuration file to validate.
    #[arg(long, env = "HAULRATE_PRICING_PATH", default_value = "./config/pricing.yaml")]
    path: PathBuf,
}

fn parse_item(raw: &str) -> Result<CartItem, String> {
    let (category, quantity) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected category:quantity, got '{raw}'"))?;
    let category = category.parse()?;
    let quantity: u32 = quantity
        .parse()
        .map_err(|e| format!("invalid quantity '{quantity}': {e}"))?;
    Ok(CartItem::new(category, quantity))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Estimate(args) => run_estimate(args).await,
        Commands::Config(args) => run_config(&args),
    }
}

async fn run_estimate(args: EstimateArgs) -> anyhow::Result<()> {
    let address = (args.lat.is_some() || args.zip.is_some()).then(|| Address {
        zip: args.zip.clone(),
        lat: args.lat,
        lng: args.lng,
        ..Address::default()
    });
    let schedule = args.date.map(|date| Schedule {
        date,
        time_slot: None,
    });

    let result = if let Some(server) = &args.server {
        let client = EstimateClient::new(server, args.timeout)?;
        client
            .estimate_or_fallback(&args.items, address, schedule)
            .await?
    } else {
        let pricing = haulrate_core::load_pricing(&args.config)?;
        haulrate_engine::estimate(
            &args.items,
            address.as_ref(),
            schedule.as_ref(),
            &pricing,
            Utc::now(),
        )?
    };

    if result.fallback {
        tracing::warn!("remote estimator unreachable; this figure is approximate");
    }
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_config(args: &ConfigArgs) -> anyhow::Result<()> {
    let pricing = haulrate_core::load_pricing(&args.path)?;
    tracing::info!(
        path = %args.path.display(),
        surge_zones = pricing.surge_zones.len(),
        discount_tiers = pricing.volume_discount_tiers.len(),
        "pricing configuration is valid"
    );
    println!("{}", serde_json::to_string_pretty(&pricing)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use haulrate_core::types::ItemCategory;

    use super::*;

    #[test]
    fn parse_item_accepts_category_and_quantity() {
        let item = parse_item("appliances:5").expect("valid item argument");
        assert_eq!(item.category, ItemCategory::Appliances);
        assert_eq!(item.quantity, 5);
    }

    #[test]
    fn parse_item_rejects_missing_separator() {
        let err = parse_item("appliances").unwrap_err();
        assert!(err.contains("category:quantity"));
    }

    #[test]
    fn parse_item_rejects_unknown_category() {
        let err = parse_item("pianos:1").unwrap_err();
        assert!(err.contains("pianos"));
    }

    #[test]
    fn parse_item_rejects_non_numeric_quantity() {
        let err = parse_item("general:lots").unwrap_err();
        assert!(err.contains("invalid quantity"));
    }
}
