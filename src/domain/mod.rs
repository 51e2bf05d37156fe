//! Domain types exposed by the loyalty service layer.

pub mod claim;
pub mod customer;
pub mod filter;
pub mod page;
pub mod types;
