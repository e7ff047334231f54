//! cleanline-clean: basic cleaning of tabular listing data
//!
//! Loads a CSV table keyed by a unique `id` column, drops rows whose `price`
//! falls outside an inclusive range, and parses `last_review` into dates.
//!
//! # Example
//!
//! ```no_run
//! use cleanline_clean::{clean, Dataset};
//!
//! let raw = Dataset::read_csv("sample.csv".as_ref(), "id")?;
//! let cleaned = clean(&raw, 10.0, 350.0)?;
//! cleaned.write_csv("clean_sample.csv".as_ref())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod clean;
pub mod dataset;
pub mod date;
pub mod error;

pub use clean::{clean, CleanStats, Cleaner};
pub use dataset::{Cell, ColumnType, Columns, Dataset};
pub use error::CleanError;
