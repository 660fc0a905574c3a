//! ra-eval - In-memory evaluator for Relalg
//!
//! This crate evaluates operator-node pipelines directly over columnar
//! [`ra_core::Table`]s, giving the same row sets as the compiled SQL, and
//! converts tables to and from Arrow record batches.

pub mod error;
pub mod evaluator;
pub mod functions;
pub mod interop;
mod join;
mod window;

pub use error::{EvalError, EvalResult};
pub use evaluator::evaluate;
pub use interop::{table_from_record_batch, table_to_record_batch};
