mod account;
mod balance;
mod fiscal_year;
mod ledger;
mod money;

pub use account::*;
pub use balance::*;
pub use fiscal_year::*;
pub use ledger::*;
pub use money::*;
