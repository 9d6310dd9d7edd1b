//! The async seam between the form layer and the network.
//!
//! `SalesBackend` covers exactly the calls the sale form makes while
//! the user types: loading an existing sale, resolving a client by
//! document, pricing inputs for a product, and the final submit. The
//! form crate takes `impl SalesBackend` so its tests can substitute a
//! scripted double instead of a live server.

use async_trait::async_trait;

use venta_core::types::{Client, Product, Sale};

use crate::client::Gateway;
use crate::error::GatewayResult;

/// Backend operations the sale form depends on.
#[async_trait]
pub trait SalesBackend: Send + Sync {
    /// Fetches a persisted sale by identifier.
    async fn fetch_sale(&self, id: &str) -> GatewayResult<Sale>;

    /// Looks up a client by document value.
    async fn find_client_by_document(&self, document: &str) -> GatewayResult<Client>;

    /// Fetches a product's pricing inputs by code.
    async fn fetch_product(&self, code: &str) -> GatewayResult<Product>;

    /// Persists a new sale.
    async fn create_sale(&self, sale: &Sale) -> GatewayResult<()>;

    /// Replaces an existing sale.
    async fn update_sale(&self, id: &str, sale: &Sale) -> GatewayResult<()>;
}

#[async_trait]
impl SalesBackend for Gateway {
    async fn fetch_sale(&self, id: &str) -> GatewayResult<Sale> {
        self.get_sale(id).await
    }

    async fn find_client_by_document(&self, document: &str) -> GatewayResult<Client> {
        Gateway::find_client_by_document(self, document).await
    }

    async fn fetch_product(&self, code: &str) -> GatewayResult<Product> {
        self.get_product(code).await
    }

    async fn create_sale(&self, sale: &Sale) -> GatewayResult<()> {
        Gateway::create_sale(self, sale).await
    }

    async fn update_sale(&self, id: &str, sale: &Sale) -> GatewayResult<()> {
        Gateway::update_sale(self, id, sale).await
    }
}
