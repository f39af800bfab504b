use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Serializable view of the live layout, used by the CLI and golden tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub columns: usize,
    pub card_width: f64,
    pub virtual_offset: f64,
    pub column_heights: Vec<f64>,
    pub cards: Vec<CardSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub id: u64,
    pub column: usize,
    pub x: f64,
    pub y: f64,
    pub height: f64,
    pub label: String,
}

impl LayoutSnapshot {
    /// Hex SHA-256 of the JSON encoding. Stable for a fixed seed and input.
    pub fn digest(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(Sha256::digest(&json))
    }
}
