//! Rules of the carpool core: credits, seats, trip stages and who may do what.
//!
//! Everything here is pure. Persistence and transactions live behind the
//! traits in [`repository`]; their implementations apply these rules to rows
//! they have locked.

pub mod ledger;
pub mod lifecycle;
pub mod policy;
pub mod repository;
pub mod seats;
pub mod types;
