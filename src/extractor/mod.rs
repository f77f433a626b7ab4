//! Article extraction.
//!
//! # Module Structure
//!
//! - `generic`: field extractors that work on any page
//! - `root`: per-field orchestration of site rules and generic fallback
//! - `comments`: comment trees built from site rules
//! - `pagination`: merging follow-on pages into the first page's article

pub mod comments;
pub mod generic;
pub mod pagination;
pub mod root;

pub use pagination::{collect_all_pages, PageSource, MAX_PAGES};
pub use root::extract;
