//! Acquisition ledger.
//!
//! The ledger records, for one source directory, which expected files of a
//! sequence have arrived. It is seeded once from the sequence manifest and
//! afterwards only loaded, updated for the triggering file, and saved again.
//!
//! # File format
//!
//! UTF-8 text with one `identifier=status` pair per line, identifiers
//! lower-cased and status either `yes` (acquired) or `no` (pending). Lines are
//! written in insertion order.
//!
//! ```text
//! qc_std_01=yes
//! sample_02=no
//! ```

mod error;
mod types;

pub use error::LedgerError;
pub use types::{AcquisitionStatus, Ledger};
