//! Stake custody: accounts, the ledger seam, the in-process vault, and
//! the coordinator that ties custody to match sessions.

pub mod account;
pub mod coordinator;
pub mod ledger;
pub mod vault;

#[cfg(test)]
mod tests_coordinator;
#[cfg(test)]
mod tests_vault;

pub use account::{EscrowAccount, EscrowPhase};
pub use coordinator::EscrowCoordinator;
pub use ledger::{EscrowLedger, LedgerError, LedgerOp, TxReceipt};
pub use vault::VaultLedger;
