use super::{Catalog, CatalogBook, CatalogError, CatalogPage};
use async_trait::async_trait;
use reqwest::{Client, Request};
use tracing::info;

/// HTTP client for a Gutendex-style catalog endpoint
#[derive(Clone)]
pub struct HttpCatalog {
    client: Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, CatalogError> {
        let client = Client::builder().user_agent(user_agent).build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    fn search_request(&self, title: &str, page: u32) -> Result<Request, CatalogError> {
        let page = page.to_string();
        Ok(self
            .client
            .get(&self.base_url)
            .query(&[("search", title), ("page", page.as_str())])
            .build()?)
    }

    fn lookup_request(&self, ids: &[i64]) -> Result<Request, CatalogError> {
        let ids = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        Ok(self
            .client
            .get(&self.base_url)
            .query(&[("ids", ids)])
            .build()?)
    }

    async fn fetch_page(&self, request: Request) -> Result<CatalogPage, CatalogError> {
        info!(url = %request.url(), "Querying catalog");

        let response = self.client.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }

        Ok(response.json::<CatalogPage>().await?)
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn search(&self, title: &str, page: u32) -> Result<CatalogPage, CatalogError> {
        let request = self.search_request(title, page)?;
        self.fetch_page(request).await
    }

    async fn lookup_by_ids(&self, ids: &[i64]) -> Result<Vec<CatalogBook>, CatalogError> {
        let request = self.lookup_request(ids)?;
        Ok(self.fetch_page(request).await?.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> HttpCatalog {
        HttpCatalog::new("https://gutendex.com/books/", "test-agent").unwrap()
    }

    #[test]
    fn search_encodes_title_and_page() {
        let request = catalog().search_request("war & peace", 3).unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://gutendex.com/books/?search=war+%26+peace&page=3"
        );
    }

    #[test]
    fn lookup_joins_ids() {
        let request = catalog().lookup_request(&[84, 1342]).unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://gutendex.com/books/?ids=84%2C1342"
        );
    }

    #[tokio::test]
    async fn unreachable_catalog_is_a_transport_error() {
        let catalog = HttpCatalog::new("http://127.0.0.1:1/books", "test-agent").unwrap();
        let result = catalog.search("anything", 1).await;

        assert!(matches!(result, Err(CatalogError::Transport(_))));
    }
}
