//! Townhall: a read API over groups, discussions, and their event timelines,
//! with on-demand machine translation through pluggable vendors.

pub mod api;
pub mod authz;
pub mod config;
pub mod domain;
pub mod security;
pub mod store;
pub mod translation;
