//! Purpose: Library crate for reflective JSON models and their HTTP fetcher.
//! Exports: `core` (descriptor tables, matcher, parser, errors) and `api` (public surface).
//! Role: Backs the `backbone` CLI; applications should import from `api`.
//! Invariants: Model hierarchies are explicit descriptor tables with parent links, not runtime reflection.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;
