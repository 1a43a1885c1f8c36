//! Core definitions (errors and result plumbing), relied upon by all cindex-* crates.

pub mod error;
pub mod result;

pub use result::Result;
