//! Building blocks shared by services

/// Observable state
pub mod property;

pub use property::Property;
