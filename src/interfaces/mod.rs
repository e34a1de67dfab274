//! Outer surfaces that drive the engine: the HTTP API and CSV command scripts.

pub mod csv;
pub mod http;
