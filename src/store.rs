//! In-memory store: item catalog, stock levels and a sales ledger.
//!
//! Stock is kept in exactly one place, the `quantity` of each [`Item`]. The
//! name-to-stock inventory map is derived from the catalog on demand, so a
//! sale can never leave the catalog and the inventory disagreeing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::persist::write_json_atomic;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0} is already in the catalog")]
    DuplicateItem(String),
    #[error("{0} not found")]
    ItemNotFound(String),
    #[error("Insufficient inventory for {item}: requested {requested}, available {available}")]
    InsufficientStock {
        item: String,
        requested: u32,
        available: u32,
    },
    #[error("export failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("export failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Item {
    pub id: u32,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    #[serde(rename = "in stock")]
    InStock,
    #[serde(rename = "out of stock")]
    OutOfStock,
}

serde_plain::derive_display_from_serialize!(StockStatus);

impl StockStatus {
    pub fn for_quantity(quantity: u32) -> Self {
        if quantity > 0 {
            StockStatus::InStock
        } else {
            StockStatus::OutOfStock
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ItemListing {
    #[serde(flatten)]
    pub item: Item,
    pub stock: u32,
    pub status: StockStatus,
}

impl fmt::Display for ItemListing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}. {}", self.item.id, self.item.name)?;
        writeln!(f, "   Price: ${:.2}", self.item.price)?;
        write!(f, "   Stock: {} units - {}", self.stock, self.status)?;
        if !self.item.description.is_empty() {
            write!(f, "\n   Description: {}", self.item.description)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Sale {
    pub item: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StoreSummary {
    pub total_products: usize,
    pub total_sales: usize,
    pub items_sold: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
}

impl fmt::Display for StoreSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Total Products: {}", self.total_products)?;
        writeln!(f, "Total Sales: {}", self.total_sales)?;
        writeln!(f, "Items Sold: {}", self.items_sold)?;
        write!(f, "Total Revenue: ${:.2}", self.total_revenue)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub store_name: String,
    pub items: Vec<Item>,
    pub inventory: BTreeMap<String, u32>,
    pub sales: Vec<Sale>,
    pub exported_at: DateTime<Utc>,
}

/// Receives notifications about store activity.
pub trait StoreReporter {
    fn item_added(&self, store: &str, item: &Item);
    fn sale_completed(&self, store: &str, sale: &Sale);
    fn sale_rejected(&self, store: &str, item: &str, error: &StoreError);
    fn exported(&self, store: &str, path: &Path);
}

/// Reports store activity as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl StoreReporter for TracingReporter {
    fn item_added(&self, store: &str, item: &Item) {
        info!(store, id = item.id, name = %item.name, price = %item.price, quantity = item.quantity, "Added item");
    }

    fn sale_completed(&self, store: &str, sale: &Sale) {
        info!(store, item = %sale.item, quantity = sale.quantity, revenue = %sale.revenue, "Sale complete");
    }

    fn sale_rejected(&self, store: &str, item: &str, error: &StoreError) {
        warn!(store, item, error = %error, "Sale rejected");
    }

    fn exported(&self, store: &str, path: &Path) {
        info!(store, path = %path.display(), "Store data exported");
    }
}

pub struct Store {
    name: String,
    items: Vec<Item>,
    sales: Vec<Sale>,
    reporter: Box<dyn StoreReporter>,
}

impl Store {
    /// Creates an empty store that reports through `tracing`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_reporter(name, Box::new(TracingReporter))
    }

    pub fn with_reporter(name: impl Into<String>, reporter: Box<dyn StoreReporter>) -> Self {
        let name = name.into();
        info!(store = %name, "Store initialized");
        Self {
            name,
            items: Vec::new(),
            sales: Vec::new(),
            reporter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    /// Adds a new item to the catalog.
    ///
    /// # Arguments
    /// * `name` - Unique item name; surrounding whitespace is trimmed
    /// * `price` - Unit price, must not be negative
    /// * `quantity` - Initial stock
    /// * `description` - Free-form text, may be empty
    ///
    /// # Returns
    /// * `StoreResult<Item>` - The stored item, or `DuplicateItem` when the
    ///   name is already taken
    pub fn add_item(
        &mut self,
        name: &str,
        price: Decimal,
        quantity: u32,
        description: &str,
    ) -> StoreResult<Item> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("Item name is required".to_string()));
        }
        if price.is_sign_negative() && !price.is_zero() {
            return Err(StoreError::InvalidInput(format!(
                "Price for {} must not be negative",
                name
            )));
        }
        if self.find(name).is_some() {
            return Err(StoreError::DuplicateItem(name.to_string()));
        }

        let item = Item {
            id: self.next_id(),
            name: name.to_string(),
            price,
            quantity,
            description: description.to_string(),
            created_at: Utc::now(),
        };
        self.items.push(item.clone());
        self.reporter.item_added(&self.name, &item);
        Ok(item)
    }

    fn next_id(&self) -> u32 {
        self.items.last().map_or(1, |item| item.id + 1)
    }

    fn find(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.name == name)
    }

    pub fn list_items(&self) -> Vec<ItemListing> {
        self.items
            .iter()
            .map(|item| ItemListing {
                item: item.clone(),
                stock: item.quantity,
                status: StockStatus::for_quantity(item.quantity),
            })
            .collect()
    }

    pub fn stock(&self, name: &str) -> Option<u32> {
        self.find(name).map(|item| item.quantity)
    }

    /// Current stock per item name.
    pub fn inventory(&self) -> BTreeMap<String, u32> {
        self.items
            .iter()
            .map(|item| (item.name.clone(), item.quantity))
            .collect()
    }

    /// Sells `quantity` units of `item_name`.
    ///
    /// On failure neither the stock nor the ledger changes.
    ///
    /// # Returns
    /// * `StoreResult<Sale>` - The recorded sale, or `ItemNotFound` /
    ///   `InsufficientStock` / `InvalidInput` for a zero quantity
    pub fn sell(&mut self, item_name: &str, quantity: u32) -> StoreResult<Sale> {
        match self.try_sell(item_name, quantity) {
            Ok(sale) => {
                self.reporter.sale_completed(&self.name, &sale);
                Ok(sale)
            }
            Err(e) => {
                self.reporter.sale_rejected(&self.name, item_name, &e);
                Err(e)
            }
        }
    }

    fn try_sell(&mut self, item_name: &str, quantity: u32) -> StoreResult<Sale> {
        if quantity == 0 {
            return Err(StoreError::InvalidInput(
                "Sale quantity must be at least 1".to_string(),
            ));
        }
        let item = self
            .items
            .iter_mut()
            .find(|item| item.name == item_name)
            .ok_or_else(|| StoreError::ItemNotFound(item_name.to_string()))?;

        if item.quantity < quantity {
            return Err(StoreError::InsufficientStock {
                item: item_name.to_string(),
                requested: quantity,
                available: item.quantity,
            });
        }

        let revenue = item
            .price
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| StoreError::InvalidInput(format!("Revenue overflow selling {}", item_name)))?;

        item.quantity -= quantity;
        let sale = Sale {
            item: item.name.clone(),
            quantity,
            revenue,
            timestamp: Utc::now(),
        };
        self.sales.push(sale.clone());
        Ok(sale)
    }

    pub fn summary(&self) -> StoreSummary {
        StoreSummary {
            total_products: self.items.len(),
            total_sales: self.sales.len(),
            items_sold: self.sales.iter().map(|sale| u64::from(sale.quantity)).sum(),
            // Saturates at Decimal::MAX rather than panicking.
            total_revenue: self
                .sales
                .iter()
                .fold(Decimal::ZERO, |total, sale| total.saturating_add(sale.revenue)),
        }
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            store_name: self.name.clone(),
            items: self.items.clone(),
            inventory: self.inventory(),
            sales: self.sales.clone(),
            exported_at: Utc::now(),
        }
    }

    /// Writes the snapshot as pretty JSON to `writer`.
    pub fn export<W: Write>(&self, writer: W) -> StoreResult<()> {
        serde_json::to_writer_pretty(writer, &self.snapshot())?;
        Ok(())
    }

    /// Replaces the file at `path` with the current snapshot.
    pub fn export_to_path(&self, path: &Path) -> StoreResult<()> {
        write_json_atomic(path, &self.snapshot())?;
        self.reporter.exported(&self.name, path);
        Ok(())
    }
}
