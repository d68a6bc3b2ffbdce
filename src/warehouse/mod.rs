//! Warehouse model module
//!
//! Star-schema construction over extracted SECOP records.
//!
//! # Overview
//!
//! - `catalog` - the 13 dimension definitions and the fact definition
//! - `dimension` - projection, natural-key deduplication, surrogate keys,
//!   geography derivation
//! - `time` - signing-date parsing and calendar attributes
//! - `fact` - left-join foreign key resolution and fact projection
//!
//! Everything here is synchronous and works on in-memory records; the
//! engine feeds it extracted pages and hands the resulting tables to a sink.

mod catalog;
mod dimension;
mod fact;
mod table;
mod time;

pub use catalog::{
    dimension_spec, DimensionKind, DimensionSpec, FactSpec, ForeignKeyJoin, KeyNormalization,
    DIMENSIONS, FACT,
};
pub use dimension::{
    assign_surrogate_keys, build_dimension, dedup_by_natural_key, derive_geography, natural_key,
    project,
};
pub use fact::{build_fact, KeyIndex};
pub use table::Table;
pub use time::{normalize_timestamp, parse_timestamp, TimeAttributes};
