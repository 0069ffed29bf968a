use crate::catalog::{CatalogAuthor, CatalogBook};
use crate::storage::{ReviewStore, StoreError};
use serde::Serialize;

/// Book as returned to clients: catalog metadata plus local reviews
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub authors: Vec<Author>,
    pub languages: Vec<String>,
    pub download_count: u64,
    pub rating: f64,
    pub reviews: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
}

/// Catalog metadata attached to a ranked book
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookDetails {
    pub title: String,
    pub authors: Vec<Author>,
    pub languages: Vec<String>,
}

pub fn to_author_view(raw: &CatalogAuthor) -> Author {
    Author {
        name: raw.name.clone(),
        birth_year: raw.birth_year,
        death_year: raw.death_year,
    }
}

/// Map a catalog record and fill `rating`/`reviews` from the review store.
/// The local values always replace whatever the catalog reported.
pub fn to_book_view(raw: CatalogBook, store: &ReviewStore) -> Result<Book, StoreError> {
    let local = store.reviews_for_book(raw.id)?;

    Ok(Book {
        id: raw.id,
        authors: raw.authors.iter().map(to_author_view).collect(),
        title: raw.title,
        languages: raw.languages,
        download_count: raw.download_count,
        rating: local.average,
        reviews: local.texts,
    })
}

pub fn to_book_views(raw: Vec<CatalogBook>, store: &ReviewStore) -> Result<Vec<Book>, StoreError> {
    raw.into_iter().map(|book| to_book_view(book, store)).collect()
}

pub fn to_book_details(raw: CatalogBook) -> BookDetails {
    BookDetails {
        authors: raw.authors.iter().map(to_author_view).collect(),
        title: raw.title,
        languages: raw.languages,
    }
}
