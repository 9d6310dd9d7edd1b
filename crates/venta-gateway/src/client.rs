//! # Gateway Client
//!
//! The concrete HTTP client for the sales backend.
//!
//! ## Request Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Gateway Round Trip                             │
//! │                                                                     │
//! │  Gateway::get_product("A-100")                                      │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  GET {base_url}/products/A-100          + session cookie            │
//! │       │                                                             │
//! │       ├── 200 { "data": {…} }  → unwrap data → Product              │
//! │       ├── 404                  → GatewayError::NotFound             │
//! │       ├── 401/403              → GatewayError::Unauthorized         │
//! │       └── other non-2xx        → GatewayError::Http                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cookie jar is enabled on the underlying client, so a successful
//! `login` call leaves every later request credentialed, matching the
//! browser's `withCredentials` behavior.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use venta_core::types::{Client, LoginCredentials, Product, Sale};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};

/// Response envelope: every backend payload arrives under `data`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// HTTP client for the sales backend.
///
/// Cheap to clone; clones share the same connection pool and cookie
/// jar.
#[derive(Debug, Clone)]
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
}

impl Gateway {
    /// Builds a gateway from validated configuration.
    pub fn new(config: &GatewayConfig) -> GatewayResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Gateway {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    // =========================================================================
    // Clients
    // =========================================================================

    /// GET /clients
    pub async fn list_clients(&self) -> GatewayResult<Vec<Client>> {
        self.get_data("/clients").await
    }

    /// GET /clients/{id}
    pub async fn get_client(&self, id: &str) -> GatewayResult<Client> {
        self.get_data(&format!("/clients/{}", id)).await
    }

    /// POST /clients
    pub async fn create_client(&self, client: &Client) -> GatewayResult<()> {
        self.send_json(reqwest::Method::POST, "/clients", client).await
    }

    /// PUT /clients/{id}
    pub async fn update_client(&self, id: &str, client: &Client) -> GatewayResult<()> {
        self.send_json(reqwest::Method::PUT, &format!("/clients/{}", id), client)
            .await
    }

    /// Creates or updates, keyed on whether the backend has issued an
    /// identity yet — the same switch the forms make.
    pub async fn submit_client(&self, client: &Client) -> GatewayResult<()> {
        match &client.id {
            Some(id) => self.update_client(id, client).await,
            None => self.create_client(client).await,
        }
    }

    /// GET /client/{document} — lookup by document value.
    pub async fn find_client_by_document(&self, document: &str) -> GatewayResult<Client> {
        self.get_data(&format!("/client/{}", document)).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// GET /products/{code}
    pub async fn get_product(&self, code: &str) -> GatewayResult<Product> {
        self.get_data(&format!("/products/{}", code)).await
    }

    // =========================================================================
    // Sales
    // =========================================================================

    /// GET /sales/{id}
    pub async fn get_sale(&self, id: &str) -> GatewayResult<Sale> {
        self.get_data(&format!("/sales/{}", id)).await
    }

    /// POST /sales
    pub async fn create_sale(&self, sale: &Sale) -> GatewayResult<()> {
        self.send_json(reqwest::Method::POST, "/sales", sale).await
    }

    /// PUT /sales/{id}
    pub async fn update_sale(&self, id: &str, sale: &Sale) -> GatewayResult<()> {
        self.send_json(reqwest::Method::PUT, &format!("/sales/{}", id), sale)
            .await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// POST /auth/login/{email} with body `{ "code": … }`.
    ///
    /// On success the backend sets the session cookie on this client's
    /// jar; subsequent requests are credentialed automatically.
    pub async fn login(&self, credentials: &LoginCredentials) -> GatewayResult<()> {
        let path = format!("/auth/login/{}", credentials.email);
        self.send_json(
            reqwest::Method::POST,
            &path,
            &json!({ "code": credentials.code }),
        )
        .await?;
        info!(email = %credentials.email, "login completed");
        Ok(())
    }

    /// POST /auth/login/{email}/code — requests a fresh one-time code.
    pub async fn request_code(&self, email: &str) -> GatewayResult<()> {
        let path = format!("/auth/login/{}/code", email);
        self.send_json(reqwest::Method::POST, &path, &json!({})).await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET request");

        let response = self.http.get(&url).send().await?;
        let response = Self::check_status(path, response).await?;

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(envelope.data)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> GatewayResult<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "request with body");

        let response = self.http.request(method, &url).json(body).send().await?;
        Self::check_status(path, response).await?;
        Ok(())
    }

    async fn check_status(path: &str, response: Response) -> GatewayResult<Response> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::NotFound(path.to_string()));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GatewayError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
