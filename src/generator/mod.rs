//! Derived documents: sitemap and search index.

pub mod search;
pub mod sitemap;
