//! Crawler module for page fetching and title extraction
//!
//! This module contains the per-page building blocks of the pipeline:
//! - HTTP fetching with status classification
//! - HTML parsing and title extraction

mod fetcher;
mod parser;

pub use fetcher::{build_http_client, fetch_page, PageContent, PageError, StatusPolicy};
pub use parser::{
    extract_title, DocumentTitle, ExtractError, ExtractResult, MetaTitle, TitleExtractor,
    TitleStrategy,
};
