use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::node::Node;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LocationRow {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

impl LocationRow {
    pub fn new(address: impl Into<String>, node: Node) -> Self {
        Self {
            address: address.into(),
            lat: node.lat,
            lng: node.lng,
        }
    }

    pub fn node(&self) -> Node {
        Node::new(self.lat, self.lng)
    }
}

/// Resolved locations in input order. Built once, never modified; the
/// builder receives it by value and hands it back inside the instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct LocationTable {
    rows: Vec<LocationRow>,
}

impl LocationTable {
    /// Keeps rows with a non-empty address and finite coordinates, dropping
    /// exact duplicate rows after their first occurrence.
    pub fn new(rows: Vec<LocationRow>) -> Self {
        let mut kept: Vec<LocationRow> = Vec::with_capacity(rows.len());

        for row in rows {
            if row.address.trim().is_empty() || !row.node().is_finite() {
                continue;
            }
            if kept.contains(&row) {
                continue;
            }
            kept.push(row);
        }

        Self { rows: kept }
    }

    pub fn rows(&self) -> &[LocationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Nodes of the first `count` rows, 0-based in table order.
    pub fn first_nodes(&self, count: usize) -> Vec<Node> {
        self.rows.iter().take(count).map(LocationRow::node).collect()
    }
}

/// Trims addresses, drops blank ones and duplicates after their first
/// occurrence.
pub fn prepare_addresses<I, S>(addresses: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut prepared: Vec<String> = Vec::new();

    for address in addresses {
        let address = address.as_ref().trim();
        if address.is_empty() || prepared.iter().any(|a| a == address) {
            continue;
        }
        prepared.push(address.to_string());
    }

    prepared
}
