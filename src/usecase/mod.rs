//! Application use cases. Each one checks the caller against the access
//! policy, validates references through the repositories and hands the
//! mutation to a repository transaction.

pub mod ledger;
pub mod reviews;
pub mod roles;
pub mod trips;
