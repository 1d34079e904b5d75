//! Room model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A teaching room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Number of seats.
    pub capacity: u32,
    /// Equipment and properties offered (e.g. "lab", "projector").
    #[serde(default)]
    pub features: BTreeSet<String>,
}

impl Room {
    /// Creates a room with the given seat count.
    pub fn new(id: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity,
            features: BTreeSet::new(),
        }
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a feature.
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.insert(feature.into());
        self
    }

    /// Whether the room offers every listed feature.
    pub fn has_features(&self, required: &BTreeSet<String>) -> bool {
        required.is_subset(&self.features)
    }
}
