//! Core data structures for ecash proofs, tokens and the transaction ledger

pub mod proof;
pub mod token;
pub mod transaction;

pub use proof::{proofs_total, Proof};
pub use token::Token;
pub use transaction::{TransactionKind, TransactionRecord, TransactionStatus};
