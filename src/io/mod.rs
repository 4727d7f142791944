// Import and export of ledger data and reports.

pub mod export;
pub mod import;

pub use export::*;
pub use import::*;
