//! Crate for reading, writing and combining Minecraft mapping files.
//!
//! This crate supports reading and writing "Tiny v2" (`.tiny`) files, reading and
//! writing the older "Tiny v1" flavour, and reading the ProGuard (`.txt`) maps
//! published together with the game. See the documentation of the [`tiny_v2`],
//! [`tiny_v1`] and [`proguard`] modules for more.
//!
//! The in-memory representation is the [`tree::Mappings`] struct, which carries a
//! compile-time number of namespaces. The [`merge`] module fuses a ProGuard map
//! with an `official` ⇄ `intermediary` tree into an `intermediary` ⇄ `named` tree.

mod error;

pub mod tree;
pub mod descriptor;

pub mod tiny_v2;
pub mod tiny_v1;
pub mod proguard;

pub mod merge;

pub use error::{Error, Result};
