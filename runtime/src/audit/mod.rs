//! Post-mortem artifacts for failed runs.

pub mod diagnostics;

pub use diagnostics::Diagnostics;
