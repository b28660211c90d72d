//! # Seed Data Generator
//!
//! Populates the database with demo jewelry stock for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 items (default)
//! cargo run -p karat-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p karat-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p karat-db --bin seed -- --db ./data/karat.db
//! ```
//!
//! Each item gets a sequence-allocated SKU, a plausible category/metal/stone
//! combination, a price, a cost at 55-75% of the price, and warehouse stock.
//! Two demo shops are created alongside the default lookup lists and the
//! default admin operator.

use karat_core::{Item, Location};
use karat_db::repository::item::ItemRepository;
use karat_db::repository::stock::StockRepository;
use karat_db::{Database, DbConfig};
use chrono::Utc;
use std::env;
use uuid::Uuid;

const CATEGORIES: &[&str] = &["Ring", "Necklace", "Bracelet", "Earrings", "Pendant"];
const METALS: &[&str] = &["Gold 585", "Gold 750", "Silver 925", "Platinum"];
const STONES: &[Option<&str>] = &[
    Some("Diamond"),
    Some("Sapphire"),
    Some("Ruby"),
    Some("Emerald"),
    Some("Pearl"),
    None,
    None,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./karat_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Karat Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of items to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./karat_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Karat Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!("Items:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.items().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    db.lookups().seed_defaults().await?;
    db.operators().ensure_default_admin().await?;
    println!("✓ Lookup lists and default admin seeded");

    let old_town = db.shops().create("Old Town").await?;
    let airport = db.shops().create("Airport").await?;
    println!("✓ Created shops: {}, {}", old_town.name, airport.name);

    println!();
    println!("Generating items...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let sku_seq = ItemRepository::allocate_sku_in(db.pool()).await?;
        let item = generate_item(sku_seq, seed);

        if let Err(e) = ItemRepository::insert_in(db.pool(), &item).await {
            eprintln!("Failed to insert {}: {}", item.sku, e);
            continue;
        }

        // Most stock lands in the warehouse; a slice is placed in the shops
        // so transfer and sale screens have something to show.
        let warehouse_qty = 1 + (seed % 8) as i64;
        StockRepository::increment(db.pool(), &item.id, &Location::Warehouse, warehouse_qty)
            .await?;

        if seed % 3 == 0 {
            let shop = if seed % 6 == 0 { &old_town } else { &airport };
            StockRepository::increment(db.pool(), &item.id, &shop.location(), 1 + (seed % 3) as i64)
                .await?;
        }

        generated += 1;
        if generated % 50 == 0 {
            println!("  Generated {} items...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} items in {:?}", generated, elapsed);

    let warehouse_total = db.stock().total_at_location(&Location::Warehouse).await?;
    println!("  Warehouse units: {}", warehouse_total);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single item with plausible jewelry data.
fn generate_item(sku_seq: i64, seed: usize) -> Item {
    let now = Utc::now();

    let category = CATEGORIES[seed % CATEGORIES.len()];
    let metal = METALS[(seed / CATEGORIES.len()) % METALS.len()];
    let stone = STONES[seed % STONES.len()];

    let name = match stone {
        Some(s) => format!("{} {} with {}", metal, category.to_lowercase(), s),
        None => format!("{} {}", metal, category.to_lowercase()),
    };

    // Price 49.90 - 2,999.00 depending on seed; cost at 55-75% of price.
    let price_cents = 4_990 + ((seed * 7_919) % 295_000) as i64;
    let cost_pct = 55 + (seed % 20) as i64;
    let cost_cents = price_cents * cost_pct / 100;

    Item {
        id: Uuid::new_v4().to_string(),
        sku: karat_core::barcode::sku_from_sequence(sku_seq),
        name,
        description: None,
        category: category.to_string(),
        metal: Some(metal.to_string()),
        stone: stone.map(str::to_string),
        weight_grams: Some(0.8 + (seed % 120) as f64 / 10.0),
        price_cents,
        cost_cents,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
