//! Output formatting module.

pub mod summary;

pub use summary::print_run_summary;
