//! Database models shared across the loyalty repository.

pub mod claim;
pub mod config;
pub mod customer;
