//! Workspace root package.
//!
//! This crate has no public API of its own; it exists so that workspace-wide
//! tooling (git hooks via `cargo-husky`) has a place to live. The actual
//! implementation lives in the `hamlink-*` crates under `crates/`.
