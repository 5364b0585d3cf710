//! Shared utilities for marketq
//!
//! This crate provides common functionality used across the marketq
//! workspace, currently logging setup.

pub mod logging;

pub use logging::init_tracing;
