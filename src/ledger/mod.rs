//! Ledger domain models: date-keyed transactions and the spending policy.

#[allow(clippy::module_inception)]
pub mod ledger;
pub mod policy;
pub mod transaction;

pub use ledger::Ledger;
pub use policy::Policy;
pub use transaction::{Transaction, TransactionKind, TransactionPatch};
