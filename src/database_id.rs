//! Database ID type definitions.

/// Database identifier for a family.
pub type FamilyId = i64;
/// Database identifier for a ledger transaction.
pub type TransactionId = i64;
