//! Product catalog: the products and recommendation services.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mockall::automock;
use solecart::{ids::ProductId, products::Product};

use crate::services::{HttpService, ServiceError};

/// Curated product listings served by the products service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Collection {
    HotPicks,
    NewArrivals,
    BestSellers,
    Men,
    Women,
    Boys,
    Girls,
    Sale,
}

impl Collection {
    fn path(self) -> &'static str {
        match self {
            Collection::HotPicks => "get_hot_picks",
            Collection::NewArrivals => "get_new_arrivals",
            Collection::BestSellers => "get_best_sellers",
            Collection::Men => "get_men_products",
            Collection::Women => "get_women_products",
            Collection::Boys => "get_boys_products",
            Collection::Girls => "get_girls_products",
            Collection::Sale => "get_sale_products",
        }
    }

    /// The field of the response envelope holding the products.
    fn field(self) -> &'static str {
        match self {
            Collection::HotPicks => "hot_picks",
            Collection::NewArrivals => "new_arrivals",
            Collection::BestSellers => "best_sellers",
            Collection::Men => "men_products",
            Collection::Women => "women_products",
            Collection::Boys => "boys_products",
            Collection::Girls => "girls_products",
            Collection::Sale => "sale_products",
        }
    }
}

/// Read-only product lookups.
#[automock]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Retrieve a single product.
    async fn get_product(&self, id: &ProductId) -> Result<Product, ServiceError>;

    /// Retrieve every product.
    async fn list_products(&self) -> Result<Vec<Product>, ServiceError>;

    /// Keyword search.
    async fn search(&self, query: &str) -> Result<Vec<Product>, ServiceError>;

    /// Products in a category.
    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, ServiceError>;

    /// A curated listing.
    async fn collection(&self, collection: Collection) -> Result<Vec<Product>, ServiceError>;

    /// Top in-stock products, grouped by main category.
    async fn recommendations(&self) -> Result<BTreeMap<String, Vec<Product>>, ServiceError>;

    /// Products whose names are semantically closest to `query`.
    async fn semantic_search(&self, query: &str, top_k: u32) -> Result<Vec<Product>, ServiceError>;
}

#[derive(Debug, Clone)]
pub struct HttpProductCatalog {
    products: HttpService,
    recommendations: HttpService,
}

impl HttpProductCatalog {
    #[must_use]
    pub fn new(products: HttpService, recommendations: HttpService) -> Self {
        Self {
            products,
            recommendations,
        }
    }
}

#[async_trait]
impl ProductCatalog for HttpProductCatalog {
    async fn get_product(&self, id: &ProductId) -> Result<Product, ServiceError> {
        self.products.get(&format!("get_product/{id}"), &[]).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        self.products.get("get_all_products/", &[]).await
    }

    async fn search(&self, query: &str) -> Result<Vec<Product>, ServiceError> {
        self.products.get("products/search", &[("q", query)]).await
    }

    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, ServiceError> {
        self.products
            .get(&format!("products/category/{category}"), &[])
            .await
    }

    async fn collection(&self, collection: Collection) -> Result<Vec<Product>, ServiceError> {
        let envelope: BTreeMap<String, Vec<Product>> =
            self.products.get(collection.path(), &[]).await?;

        unwrap_collection(envelope, collection).ok_or_else(|| {
            ServiceError::malformed(
                self.products.name(),
                format!("missing field {}", collection.field()),
            )
        })
    }

    async fn recommendations(&self) -> Result<BTreeMap<String, Vec<Product>>, ServiceError> {
        self.recommendations.get("recommendations", &[]).await
    }

    async fn semantic_search(&self, query: &str, top_k: u32) -> Result<Vec<Product>, ServiceError> {
        self.recommendations
            .get(
                "product_semantic_search",
                &[("query", query), ("top_k", &top_k.to_string())],
            )
            .await
    }
}

fn unwrap_collection(
    mut envelope: BTreeMap<String, Vec<Product>>,
    collection: Collection,
) -> Option<Vec<Product>> {
    envelope.remove(collection.field())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn collection_envelope_is_unwrapped() -> TestResult {
        let envelope: BTreeMap<String, Vec<Product>> = serde_json::from_str(
            r#"{"men_products": [{"product_id": 1, "name": "Loafer", "price": 80.0}]}"#,
        )?;

        let products = unwrap_collection(envelope, Collection::Men).ok_or("missing")?;

        assert_eq!(products.len(), 1);
        assert_eq!(products.first().map(|p| p.price), Some(Decimal::new(80, 0)));

        Ok(())
    }

    #[test]
    fn wrong_envelope_field_is_missing() -> TestResult {
        let envelope: BTreeMap<String, Vec<Product>> =
            serde_json::from_str(r#"{"hot_picks": []}"#)?;

        assert!(unwrap_collection(envelope, Collection::Sale).is_none());

        Ok(())
    }

    #[test]
    fn every_collection_has_its_own_endpoint() {
        let all = [
            Collection::HotPicks,
            Collection::NewArrivals,
            Collection::BestSellers,
            Collection::Men,
            Collection::Women,
            Collection::Boys,
            Collection::Girls,
            Collection::Sale,
        ];

        let paths: std::collections::BTreeSet<_> = all.iter().map(|c| c.path()).collect();

        assert_eq!(paths.len(), all.len());
    }
}
