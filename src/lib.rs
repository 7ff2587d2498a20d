// Species Atlas - Core Library
// Exposes all modules for use in the CLI, the TUI, and tests

pub mod form;
pub mod ingest;
pub mod scale;
pub mod species;
pub mod store;

// UI modules need the drawing stack
#[cfg(feature = "tui")]
pub mod chart;
#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use form::{EditSpeciesForm, FieldError};
pub use ingest::{
    load_ranked_animals, load_speed_ranking, AnimalRecord, Diet, RejectReason, RowRejection,
    SpeedRanking, MAX_RANKED,
};
pub use scale::{BandScale, LinearScale};
pub use species::{Kingdom, Species, SpeciesEditValues};
pub use store::{
    count_species, get_species, import_species, insert_species, list_species, setup_database,
    update_species, ImportSummary, StoreError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
