//! Application layer containing the transaction engine.
//!
//! [`engine::VendingEngine`] is the single entry point for the six machine
//! operations. Each call returns a [`response::VendingResponse`].

pub mod engine;
pub mod response;
