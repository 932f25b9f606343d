// File I/O operations

pub mod csv;
pub mod error;
pub mod report;
pub mod template;
pub mod xlsx;

pub use error::IoError;
pub use report::{read_report, save_report, write_report, ReportSheet};
pub use template::write_template;
pub use xlsx::{read_series, read_series_bytes};
