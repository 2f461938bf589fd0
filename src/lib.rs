//! Snake layout for pairwise genome alignments.
//!
//! A snake shows one query sequence projected onto the reference: each
//! ungapped alignment block is drawn on a level, and the query path moves
//! between levels at insertions, duplications and strand changes. This crate
//! computes the levels; drawing is left to the caller.
//!
//! Pipeline, per query sequence:
//!
//! 1. [`group::group_segments`] collects the blocks of every query.
//! 2. [`coverage::single_coverage`] keeps each query base at most once.
//! 3. [`assign::assign_levels`] places blocks greedily on levels.
//! 4. [`compact::compact_levels`] folds sparse levels onto lower ones.
//!
//! [`layout::layout_all`] runs the whole pipeline over many groups.

pub mod assign;
mod bits;
pub mod block;
pub mod compact;
pub mod coverage;
pub mod error;
pub mod group;
pub mod layout;
pub mod query_filter;
pub mod report;
pub mod segment_reader;
pub mod viewport;

pub use assign::LayoutMode;
pub use block::{AlignmentBlock, Segment, SortOrder, Strand};
pub use error::LayoutError;
pub use group::{group_segments, Group, GroupOptions};
pub use layout::{display_order, layout_all, layout_group, GroupLayout, LayoutConfig, LayoutResult};
pub use query_filter::QueryFilter;
pub use viewport::Viewport;
