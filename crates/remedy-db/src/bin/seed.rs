//! # Seed Data Generator
//!
//! Populates the database with a default admin account and a starter
//! pharmacy catalogue for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p remedy-db --bin seed
//!
//! # Specify database path
//! cargo run -p remedy-db --bin seed -- --db ./data/remedy.db
//! ```
//!
//! The seeded admin credential is `admin` / `admin` — development only;
//! rotate it through the user admin endpoints before exposing the server.

use std::env;

use remedy_core::Role;
use remedy_db::{Database, DbConfig};

/// Starter catalogue: (name, quantity, price)
const PRODUCTS: &[(&str, i64, f64)] = &[
    ("Paracetamol 500mg", 120, 2.50),
    ("Ibuprofen 200mg", 80, 3.75),
    ("Aspirin 300mg", 95, 2.00),
    ("Amoxicillin 250mg", 40, 7.80),
    ("Cetirizine 10mg", 60, 4.25),
    ("Loratadine 10mg", 55, 4.10),
    ("Omeprazole 20mg", 35, 6.50),
    ("Vitamin C 1000mg", 150, 8.00),
    ("Cough Syrup 100ml", 25, 5.60),
    ("Saline Nasal Spray", 18, 3.20),
    ("Digital Thermometer", 8, 12.99),
    ("Bandage Roll", 200, 1.50),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = parse_db_arg().unwrap_or_else(|| "./remedy.db".to_string());
    println!("Seeding database at {db_path}");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    // Default admin, skipped when one already exists so the seed is
    // safe to re-run.
    let accounts = db.accounts();
    if accounts.get_by_username("admin").await?.is_none() {
        accounts.insert("admin", "admin", Role::Admin).await?;
        println!("Created admin account (username: admin, password: admin)");
    } else {
        println!("Admin account already exists, skipping");
    }

    let products = db.products();
    let existing = products.count().await?;
    if existing > 0 {
        println!("Products already present ({existing}), skipping catalogue");
        return Ok(());
    }

    for (name, quantity, price) in PRODUCTS {
        products.insert(name, *quantity, *price).await?;
    }
    println!("Inserted {} products", PRODUCTS.len());

    Ok(())
}

/// Parses `--db <path>` from the command line.
fn parse_db_arg() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
}
