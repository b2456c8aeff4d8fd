//! Match Logic Module
//!
//! This module implements the pairing logic shared by the pairing contracts.
//! Callers are matched first-come, first-served, two at a time.

pub mod matcher;

pub use matcher::Matcher;
