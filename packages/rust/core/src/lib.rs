//! Core pipeline orchestration and domain logic for mddocset.
//!
//! This crate ties together bundle scaffolding, the search index, input
//! discovery, per-document rendering, and the `Info.plist` descriptor into
//! one end-to-end build ([`pipeline::build_docset`]).

pub mod bundle;
pub mod document;
pub mod pipeline;
pub mod walker;
