pub mod client;

pub use client::HttpCatalog;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog responded with status {0}")]
    Status(reqwest::StatusCode),
}

/// One page of catalog results, as returned for both search and id lookup
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogPage {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<CatalogBook>,
}

/// Raw catalog record. Any upstream `rating`/`reviews` fields are dropped here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogBook {
    pub id: i64,
    pub title: String,
    pub authors: Vec<CatalogAuthor>,
    pub languages: Vec<String>,
    pub download_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CatalogAuthor {
    pub name: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
}

/// Read access to the external book catalog
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn search(&self, title: &str, page: u32) -> Result<CatalogPage, CatalogError>;

    async fn lookup_by_ids(&self, ids: &[i64]) -> Result<Vec<CatalogBook>, CatalogError>;
}
