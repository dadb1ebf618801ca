//! Storefront Demo
//!
//! Runs a scripted shopping session over a seed data set and prints the
//! catalog, the cart and the totals.
//!
//! Use `-f` to point at a different seed YAML file
//! Use `-d` to persist snapshots to a directory instead of memory
//! Use `-a` to render prices in the admin style

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;

use till::fixtures;
use till::format::DisplayMode;
use till::prelude::{JsonFileStore, KvStore, MemoryStore, ProductId, Seed, Storefront};
use till::receipt;

/// Arguments for the storefront demo
#[derive(Debug, Parser)]
struct DemoArgs {
    /// Seed YAML file defining the catalog and coupons
    #[clap(short, long, default_value = "fixtures/seed.yml")]
    fixture: String,

    /// Directory for persisted snapshots; in-memory when omitted
    #[clap(short, long)]
    data_dir: Option<String>,

    /// Render prices in the admin style
    #[clap(short, long)]
    admin: bool,
}

fn main() -> Result<()> {
    let args = DemoArgs::parse();
    let seed = fixtures::load_seed(&args.fixture)?;
    let mode = if args.admin {
        DisplayMode::Admin
    } else {
        DisplayMode::Shopper
    };

    match args.data_dir.as_deref() {
        Some(dir) => run(JsonFileStore::open(dir)?, seed, mode),
        None => run(MemoryStore::new(), seed, mode),
    }
}

#[expect(clippy::print_stdout, reason = "Demo output")]
fn run(store: impl KvStore, seed: Seed, mode: DisplayMode) -> Result<()> {
    let mut shop = Storefront::open(store, seed)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    let ids: Vec<ProductId> = shop
        .catalog()
        .iter()
        .map(|product| product.id.clone())
        .collect();

    if let Some(first) = ids.first() {
        shop.add_to_cart(first)?;
        shop.add_to_cart(first)?;
    }
    if let Some(last) = ids.last() {
        shop.add_to_cart(last)?;
        shop.change_quantity(last, 10)?;
    }
    let first_coupon = shop.coupons().iter().next().cloned();
    if let Some(coupon) = first_coupon {
        shop.apply_coupon(&coupon.code)?;
    }

    writeln!(handle, "Catalog")?;
    receipt::write_catalog(&mut handle, shop.catalog(), shop.cart(), mode)?;

    writeln!(handle, "Cart")?;
    receipt::write_cart(&mut handle, shop.cart(), shop.active_coupon())?;

    let order_number = shop.checkout()?;
    writeln!(handle, "Placed {order_number}")?;
    drop(handle);

    for notice in shop.notices_mut().drain() {
        println!("[{}] {}", notice.severity(), notice.message());
    }

    Ok(())
}
