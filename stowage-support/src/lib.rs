//! # Stowage Support
//!
//! Shared utilities for the Stowage DI crates.
//!
//! This crate provides:
//! - Text rendering for error messages (reference chains, type names)
//! - Identifier suggestions for "did you mean?" hints

pub mod rendering;
