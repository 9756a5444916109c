//! Durable storage contracts.

pub mod records;
