//! Test infrastructure for search wiring.
//!
//! Shared configuration fixtures and helpers for loading them into a fresh
//! container.

#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::*;
