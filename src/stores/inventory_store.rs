// src/stores/inventory_store.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stores::{Resource, Store};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    pub stock: i64,
    #[serde(default)]
    pub min_stock: i64,
    pub unit_cost_cents: i64,
    pub is_active: bool,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.is_active && self.stock <= self.min_stock
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryDraft {
    pub name: String,
    pub sku: Option<String>,
    pub stock: i64,
    pub min_stock: i64,
    pub unit_cost_cents: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InventoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl Resource for InventoryItem {
    const PATH: &'static str = "/inventory";
    const LABEL: &'static str = "inventory item";
    type Draft = InventoryDraft;
    type Patch = InventoryPatch;
    type Filter = InventoryFilter;

    fn id(&self) -> Uuid {
        self.id
    }
}

pub type InventoryStore = Store<InventoryItem>;

impl Store<InventoryItem> {
    /// Loaded items at or below their reorder level, lowest stock first.
    pub async fn low_stock(&self) -> Vec<InventoryItem> {
        let mut low: Vec<InventoryItem> = self
            .state
            .read()
            .await
            .items
            .iter()
            .filter(|i| i.is_low_stock())
            .cloned()
            .collect();
        low.sort_by_key(|i| i.stock);
        low
    }
}
