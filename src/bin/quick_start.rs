//! Quick-start demo for the store simulator.
//!
//! Builds two example stores, sells a few items from each and prints their
//! listings and summaries. The first store is exported to
//! `STORE_EXPORT_FILE` (default: tastytrade_referrals.json).

use std::path::{Path, PathBuf};

use agentic_service::store::{Store, StoreResult};
use dotenv::dotenv;
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

const RULE: &str = "============================================================";

fn print_listing(store: &Store) {
    println!("\n{} Inventory:", store.name());
    println!("{}", RULE);
    for listing in store.list_items() {
        println!("{}", listing);
    }
    println!("{}", RULE);
}

fn print_summary(store: &Store) {
    println!("\n{} Summary:", store.name());
    println!("{}", RULE);
    println!("{}", store.summary());
    println!("{}", RULE);
}

/// Sells each `(name, quantity)` pair, logging but tolerating rejected sales.
fn sell_all(store: &mut Store, orders: &[(&str, u32)]) {
    for (name, quantity) in orders {
        // Rejections are already reported by the store.
        let _ = store.sell(name, *quantity);
    }
}

fn demo_referrals(export_path: &Path) -> StoreResult<()> {
    let mut store = Store::new("TastyTrade Referral Store");

    store.add_item(
        "TastyTrade $500 referral for $5k funded Acct.",
        Decimal::new(500, 0),
        9_999_999,
        "Referral Code: HNFY4P46B2 | Link: https://open.tastytrade.com/signup?referralCode=HNFY4P46B2",
    )?;
    store.add_item(
        "Premium Referral Package",
        Decimal::new(1000, 0),
        100,
        "Premium tier with additional benefits",
    )?;
    store.add_item(
        "Starter Referral Package",
        Decimal::new(250, 0),
        500,
        "Entry-level referral package",
    )?;

    print_listing(&store);

    sell_all(
        &mut store,
        &[
            ("TastyTrade $500 referral for $5k funded Acct.", 1),
            ("Premium Referral Package", 2),
            ("Starter Referral Package", 5),
        ],
    );

    print_summary(&store);
    store.export_to_path(export_path)?;
    println!("\nData exported to {}", export_path.display());
    Ok(())
}

fn demo_custom() -> StoreResult<()> {
    let mut store = Store::new("AI Agent Store");

    store.add_item(
        "AI Consultation Hour",
        Decimal::new(150, 0),
        20,
        "1-hour AI consulting session",
    )?;
    store.add_item("API Access Key", Decimal::new(50, 0), 100, "Monthly API access")?;
    store.add_item(
        "Premium Support",
        Decimal::new(500, 0),
        10,
        "24/7 premium support package",
    )?;

    print_listing(&store);

    sell_all(
        &mut store,
        &[
            ("AI Consultation Hour", 3),
            ("API Access Key", 10),
            ("Premium Support", 1),
        ],
    );

    print_summary(&store);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    FmtSubscriber::builder()
        .with_target(false)
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let export_path: PathBuf = std::env::var("STORE_EXPORT_FILE")
        .unwrap_or_else(|_| "tastytrade_referrals.json".to_string())
        .into();

    info!("Running referral store demo");
    demo_referrals(&export_path)?;

    info!("Running custom store demo");
    demo_custom()?;

    Ok(())
}
