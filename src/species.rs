// 🌿 Species Catalogue Domain
// Kingdom enumeration, the persisted Species record, and the validated
// editable subset passed from the form validator to the update submission.

use serde::{Deserialize, Serialize};

// ============================================================================
// KINGDOM
// ============================================================================

/// Kingdom - closed six-value taxonomy enumeration
///
/// Kept as a sum type (not an open string set) so validation and display
/// sites get exhaustiveness checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kingdom {
    Animalia,
    Plantae,
    Fungi,
    Protista,
    Archaea,
    Bacteria,
}

impl Kingdom {
    /// All kingdoms, in display order
    pub const ALL: [Kingdom; 6] = [
        Kingdom::Animalia,
        Kingdom::Plantae,
        Kingdom::Fungi,
        Kingdom::Protista,
        Kingdom::Archaea,
        Kingdom::Bacteria,
    ];

    /// Canonical name, as stored and displayed
    pub fn as_str(&self) -> &'static str {
        match self {
            Kingdom::Animalia => "Animalia",
            Kingdom::Plantae => "Plantae",
            Kingdom::Fungi => "Fungi",
            Kingdom::Protista => "Protista",
            Kingdom::Archaea => "Archaea",
            Kingdom::Bacteria => "Bacteria",
        }
    }

    /// Parse a kingdom name. Exact match after trimming; membership in the
    /// six-value set is the validation rule, so no case folding here.
    pub fn parse(raw: &str) -> Option<Kingdom> {
        match raw.trim() {
            "Animalia" => Some(Kingdom::Animalia),
            "Plantae" => Some(Kingdom::Plantae),
            "Fungi" => Some(Kingdom::Fungi),
            "Protista" => Some(Kingdom::Protista),
            "Archaea" => Some(Kingdom::Archaea),
            "Bacteria" => Some(Kingdom::Bacteria),
            _ => None,
        }
    }
}

impl std::fmt::Display for Kingdom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SPECIES RECORD
// ============================================================================

/// Species - a catalogue record as held in the persisted store
///
/// Identity: `id` (UUID string) - never changes.
/// Invariant: optional text fields are `None` rather than empty strings;
/// the form validator normalizes input before anything reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    /// Stable identity (UUID)
    pub id: String,

    /// Binomial name, e.g. "Panthera leo"
    pub scientific_name: String,

    /// Vernacular name, e.g. "Lion"
    pub common_name: Option<String>,

    pub kingdom: Kingdom,

    /// Estimated global population; None when unknown
    pub total_population: Option<i64>,

    pub description: Option<String>,

    /// Identifier of the owning user; editing is gated on it
    pub author: String,
}

impl Species {
    /// Build a new record from validated edit values, minting a fresh UUID.
    pub fn from_values(values: SpeciesEditValues, author: String) -> Self {
        Species {
            id: uuid::Uuid::new_v4().to_string(),
            scientific_name: values.scientific_name,
            common_name: values.common_name,
            kingdom: values.kingdom,
            total_population: values.total_population,
            description: values.description,
            author,
        }
    }

    /// Display name for lists: common name when present, else scientific.
    pub fn display_name(&self) -> &str {
        self.common_name.as_deref().unwrap_or(&self.scientific_name)
    }
}

// ============================================================================
// VALIDATED EDIT VALUES
// ============================================================================

/// The five editable fields after validation and normalization.
///
/// Produced only by the form validator; passed by value to the update
/// submission. Absent optionals are genuinely `None`, never "".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesEditValues {
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub kingdom: Kingdom,
    pub total_population: Option<i64>,
    pub description: Option<String>,
}

// ============================================================================
// TESTS
// ============================================================================
