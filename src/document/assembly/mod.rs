//! The table assembly pipeline.
//!
//! Stages run strictly in order: prediction cleaning and the overlap gate,
//! divider construction (gap filling, large-table recovery or the word
//! histogram), grid filling, then header and spanning-cell resolution.

pub mod cleaning;
pub mod dividers;
pub mod grid_filler;
pub mod headers;
pub mod large_table;
pub mod pipeline;

pub use headers::RowRole;
pub use pipeline::TableAssembler;
