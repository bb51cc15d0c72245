//! Core pipeline orchestration and domain logic for docmirror.
//!
//! This crate ties together tree listing, filtering, blob fetching, the
//! transform stages and publishing into the end-to-end `ingest` workflow
//! (see [`pipeline::run_ingest`]).

pub mod fetch;
pub mod filter;
pub mod paths;
pub mod pipeline;
pub mod publish;
pub mod stages;
