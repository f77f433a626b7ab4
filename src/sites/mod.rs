//! Built-in site rule sets, registered by
//! [`ExtractorRegistry::builtin`](crate::registry::ExtractorRegistry::builtin).

pub mod hacker_news;
pub mod reddit;
