//! `genverify-recon`: generation reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded grids, returns comparison tables
//! and per-plant reports. No CLI or spreadsheet IO dependencies.

pub mod engine;
pub mod error;
pub mod evidence;
pub mod grid;
pub mod merge;
pub mod model;
pub mod partition;

pub use engine::{compare, compare_with, Alignment, CompareOptions};
pub use error::{ErrorStage, ReconError};
pub use evidence::{compute_summary, ComparisonSummary};
pub use grid::normalize;
pub use merge::{merge_plants, MergeRule};
pub use model::{
    Cell, CellStatus, ComparisonTable, PlantOrder, PlantReport, RawSheet, Reading, ReportCell,
    RowKey, SeriesTable,
};
pub use partition::{check_stride, partition, partition_restrictions};
