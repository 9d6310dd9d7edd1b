//! # Sale Builder
//!
//! One editing session for one sale document.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Sale Editing Session                         │
//! │                                                                     │
//! │  SaleBuilder::new(backend)          fresh sale                      │
//! │  SaleBuilder::load(backend, id)     edit a persisted sale           │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  set_operation_date / set_client_document / line & schedule edits   │
//! │       │                                                             │
//! │       ├── resolve_client_by_document ──► binds client id            │
//! │       ├── resolve_product_line ────────► prices the line            │
//! │       ▼                                                             │
//! │  submit()                                                           │
//! │       ├── validate ──► FieldErrors back to the form, state kept     │
//! │       ├── POST /sales (no id) or PUT /sales/{id}                    │
//! │       ├── failure  ──► error back to the form, state kept           │
//! │       └── success  ──► session resets to a fresh sale               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The builder is generic over [`SalesBackend`] so its tests run
//! against a scripted double; production hands it a
//! [`venta_gateway::Gateway`].

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use venta_core::pricing::price_product;
use venta_core::types::{PaymentMethodEntry, Sale, SaleProductLine};
use venta_core::validation::validate_sale;
use venta_core::Money;
use venta_gateway::SalesBackend;

use crate::error::{FormError, FormResult};
use crate::lines::{LineState, ProductLines};
use crate::schedule::{EntryKey, PaymentSchedule};

// =============================================================================
// Submit Outcome
// =============================================================================

/// What a successful submit did on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A new sale was created (POST).
    Created,
    /// The persisted sale with this id was replaced (PUT).
    Updated(String),
}

// =============================================================================
// Sale Builder
// =============================================================================

/// Form session for building and submitting one sale.
#[derive(Debug)]
pub struct SaleBuilder<B> {
    backend: B,
    sale_id: Option<String>,
    operation_date: Option<NaiveDate>,
    /// Backend identity of the client, bound by a document lookup.
    client: Option<String>,
    client_document: String,
    lines: ProductLines,
    schedule: PaymentSchedule,
    /// True while a submit future is in flight; re-entry is refused so
    /// a double-click cannot create the same sale twice. Cleared when
    /// the request resolves or the future is dropped mid-await, so an
    /// abandoned submit never wedges the session.
    submitting: bool,
}

/// Clears the in-flight flag on drop, including when the submit future
/// is cancelled at its await point.
struct SubmitGuard<'a> {
    flag: &'a mut bool,
}

impl<'a> SubmitGuard<'a> {
    fn arm(flag: &'a mut bool) -> Self {
        *flag = true;
        SubmitGuard { flag }
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

impl<B: SalesBackend> SaleBuilder<B> {
    /// Starts a session over a fresh sale: one empty product line, the
    /// default payment entry, nothing bound.
    pub fn new(backend: B) -> Self {
        SaleBuilder {
            backend,
            sale_id: None,
            operation_date: None,
            client: None,
            client_document: String::new(),
            lines: ProductLines::new(),
            schedule: PaymentSchedule::new(),
            submitting: false,
        }
    }

    /// Starts a session over a persisted sale fetched from the backend.
    ///
    /// A missing sale comes back as [`FormError::SaleNotFound`] so the
    /// caller can distinguish a dead link from a transport failure.
    pub async fn load(backend: B, id: &str) -> FormResult<Self> {
        let sale = match backend.fetch_sale(id).await {
            Ok(sale) => sale,
            Err(e) if e.is_not_found() => {
                return Err(FormError::SaleNotFound(id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        info!(id = %id, "loaded sale for editing");

        Ok(SaleBuilder {
            backend,
            sale_id: sale.id,
            operation_date: sale.operation_date,
            client: sale.client,
            client_document: sale.client_document,
            lines: ProductLines::from_lines(sale.products),
            schedule: PaymentSchedule::from_entries(sale.payment_methods),
            submitting: false,
        })
    }

    // =========================================================================
    // Header Fields
    // =========================================================================

    pub fn set_operation_date(&mut self, date: NaiveDate) {
        self.operation_date = Some(date);
    }

    /// Overwrites the document value and drops any bound client; the
    /// binding only ever comes from a lookup of the current value.
    pub fn set_client_document(&mut self, document: &str) {
        if document != self.client_document {
            self.client = None;
        }
        self.client_document = document.to_string();
    }

    /// The bound client id, if a document lookup has succeeded.
    pub fn client(&self) -> Option<&str> {
        self.client.as_deref()
    }

    pub fn client_document(&self) -> &str {
        &self.client_document
    }

    pub fn operation_date(&self) -> Option<NaiveDate> {
        self.operation_date
    }

    /// True once the backend has issued an identity for this sale.
    pub fn is_persisted(&self) -> bool {
        self.sale_id.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Looks up the current document value and binds the matching
    /// client. On no match the binding is cleared and
    /// [`FormError::ClientNotFound`] is returned; the document value
    /// stays for the user to correct.
    pub async fn resolve_client_by_document(&mut self) -> FormResult<()> {
        let document = self.client_document.clone();
        match self.backend.find_client_by_document(&document).await {
            Ok(found) => {
                debug!(document = %document, "client resolved");
                self.client = found.id;
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                self.client = None;
                Err(FormError::ClientNotFound(document))
            }
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Product Lines
    // =========================================================================

    pub fn lines(&self) -> &ProductLines {
        &self.lines
    }

    pub fn add_product_line(&mut self) -> EntryKey {
        self.lines.append()
    }

    pub fn remove_product_line(&mut self, key: EntryKey) -> FormResult<SaleProductLine> {
        self.lines.remove(key)
    }

    pub fn set_line_code(&mut self, key: EntryKey, code: &str) -> FormResult<()> {
        self.lines.set_code(key, code)
    }

    pub fn set_line_qty(&mut self, key: EntryKey, qty: i64) -> FormResult<()> {
        self.lines.set_qty(key, qty)
    }

    /// Looks up the line's code and prices it.
    ///
    /// - Match: the line takes the product's name and derived price; a
    ///   quantity the user left at zero defaults to 1.
    /// - No match: the line takes the sentinel placeholder; this is a
    ///   normal outcome, not an error.
    /// - Broken margin on the product record, or transport failure: the
    ///   line is left as typed and the error is returned.
    ///
    /// A response that arrives after the user retyped the code or
    /// removed the line is dropped.
    pub async fn resolve_product_line(&mut self, key: EntryKey) -> FormResult<()> {
        let code = self.lines.begin_resolve(key)?;
        let qty = self.lines.get(key).map(|l| l.qty).unwrap_or(0).max(1);

        let product = match self.backend.fetch_product(&code).await {
            Ok(product) => product,
            Err(e) if e.is_not_found() => {
                debug!(code = %code, "product lookup found nothing");
                self.lines.mark_not_found(key, &code);
                return Ok(());
            }
            Err(e) => {
                self.lines.abort_resolve(key);
                return Err(e.into());
            }
        };

        let priced = match price_product(&product, qty) {
            Ok(priced) => priced,
            Err(e) => {
                warn!(code = %code, error = %e, "product record cannot be priced");
                self.lines.abort_resolve(key);
                return Err(e.into());
            }
        };

        self.lines.complete_resolve(key, priced);
        Ok(())
    }

    // =========================================================================
    // Payment Schedule
    // =========================================================================

    pub fn schedule(&self) -> &PaymentSchedule {
        &self.schedule
    }

    pub fn add_payment_entry(&mut self) -> EntryKey {
        self.schedule.append()
    }

    pub fn remove_payment_entry(&mut self, key: EntryKey) -> FormResult<PaymentMethodEntry> {
        self.schedule.remove(key)
    }

    pub fn edit_payment_entry(
        &mut self,
        key: EntryKey,
        f: impl FnOnce(&mut PaymentMethodEntry),
    ) -> FormResult<()> {
        self.schedule.edit(key, f)
    }

    // =========================================================================
    // Assembly & Submit
    // =========================================================================

    /// The sale's running total: the sum of line totals. Recomputed
    /// from line state on every call, never cached.
    pub fn total(&self) -> Money {
        self.lines.total()
    }

    /// Assembles the current session state into a sale document.
    pub fn document(&self) -> Sale {
        Sale {
            id: self.sale_id.clone(),
            operation_date: self.operation_date,
            total_amount: self.lines.total(),
            client: self.client.clone(),
            client_document: self.client_document.clone(),
            products: self.lines.to_lines(),
            payment_methods: self.schedule.to_entries(),
        }
    }

    /// Validates and submits the sale.
    ///
    /// Create or update is chosen on the session's identity: no id
    /// means POST, an id means PUT to that id. On success the session
    /// resets to a fresh sale; on any failure it is left exactly as it
    /// was so the user can correct and retry.
    pub async fn submit(&mut self) -> FormResult<SubmitOutcome> {
        if self.submitting {
            return Err(FormError::SubmitInFlight);
        }

        let sale = self.document();
        validate_sale(&sale)?;

        let result = {
            let _guard = SubmitGuard::arm(&mut self.submitting);
            match &self.sale_id {
                Some(id) => self
                    .backend
                    .update_sale(id, &sale)
                    .await
                    .map(|()| SubmitOutcome::Updated(id.clone())),
                None => self
                    .backend
                    .create_sale(&sale)
                    .await
                    .map(|()| SubmitOutcome::Created),
            }
        };

        match result {
            Ok(outcome) => {
                info!(?outcome, "sale submitted");
                self.reset();
                Ok(outcome)
            }
            Err(e) => {
                warn!(error = %e, "sale submission failed, session preserved");
                Err(e.into())
            }
        }
    }

    /// Discards the session and starts over on a fresh sale.
    pub fn reset(&mut self) {
        self.sale_id = None;
        self.operation_date = None;
        self.client = None;
        self.client_document.clear();
        self.lines = ProductLines::new();
        self.schedule = PaymentSchedule::new();
        self.submitting = false;
    }

    /// Resolution state of a line, for rendering.
    pub fn line_state(&self, key: EntryKey) -> Option<&LineState> {
        self.lines.state(key)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use venta_core::money::Rate;
    use venta_core::types::*;
    use venta_gateway::{GatewayError, GatewayResult};

    use super::*;

    /// Scripted backend double. Lookups read from the maps; submits are
    /// recorded for assertions.
    #[derive(Debug, Default)]
    struct MockBackend {
        sales: Mutex<HashMap<String, Sale>>,
        clients: Mutex<HashMap<String, Client>>,
        products: Mutex<HashMap<String, Product>>,
        created: Mutex<Vec<Sale>>,
        updated: Mutex<Vec<(String, Sale)>>,
        fail_submit: bool,
        stall_submit: AtomicBool,
    }

    #[async_trait]
    impl SalesBackend for MockBackend {
        async fn fetch_sale(&self, id: &str) -> GatewayResult<Sale> {
            self.sales
                .lock()
                .unwrap()
                .get(id)
                .cloned()
                .ok_or_else(|| GatewayError::NotFound(format!("/sales/{}", id)))
        }

        async fn find_client_by_document(&self, document: &str) -> GatewayResult<Client> {
            self.clients
                .lock()
                .unwrap()
                .get(document)
                .cloned()
                .ok_or_else(|| GatewayError::NotFound(format!("/client/{}", document)))
        }

        async fn fetch_product(&self, code: &str) -> GatewayResult<Product> {
            self.products
                .lock()
                .unwrap()
                .get(code)
                .cloned()
                .ok_or_else(|| GatewayError::NotFound(format!("/products/{}", code)))
        }

        async fn create_sale(&self, sale: &Sale) -> GatewayResult<()> {
            if self.stall_submit.load(Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            if self.fail_submit {
                return Err(GatewayError::Http {
                    status: 500,
                    body: "boom".into(),
                });
            }
            self.created.lock().unwrap().push(sale.clone());
            Ok(())
        }

        async fn update_sale(&self, id: &str, sale: &Sale) -> GatewayResult<()> {
            if self.fail_submit {
                return Err(GatewayError::Http {
                    status: 500,
                    body: "boom".into(),
                });
            }
            self.updated
                .lock()
                .unwrap()
                .push((id.to_string(), sale.clone()));
            Ok(())
        }
    }

    fn widget() -> Product {
        Product {
            code: "A-100".to_string(),
            name: "Widget".to_string(),
            supplier_cost: Money::from_major(100),
            micro: Money::from_major(10),
            iva: Rate::from_fraction(0.12),
            salvament_margin: Rate::from_fraction(0.2),
            profit_margin: Rate::from_fraction(0.25),
        }
    }

    fn maria() -> Client {
        Client {
            id: Some("client-1".to_string()),
            firstname: "María".to_string(),
            lastname: "Ferreira".to_string(),
            email: "maria@example.com".to_string(),
            document_type: DocumentType::Cedula,
            document_value: "1712345678".to_string(),
        }
    }

    fn backend_with_widget_and_maria() -> MockBackend {
        let backend = MockBackend::default();
        backend
            .products
            .lock()
            .unwrap()
            .insert("A-100".to_string(), widget());
        backend
            .clients
            .lock()
            .unwrap()
            .insert("1712345678".to_string(), maria());
        backend
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[tokio::test]
    async fn test_fresh_session_starts_seeded() {
        let builder = SaleBuilder::new(MockBackend::default());
        assert_eq!(builder.lines().len(), 1);
        assert_eq!(builder.schedule().len(), 1);
        assert!(builder.total().is_zero());
        assert!(!builder.is_persisted());
    }

    #[tokio::test]
    async fn test_fresh_sessions_are_structurally_identical() {
        let a = SaleBuilder::new(MockBackend::default());
        let b = SaleBuilder::new(MockBackend::default());
        // Entry keys are per-session; the assembled documents are equal.
        assert_eq!(a.document(), b.document());
    }

    #[tokio::test]
    async fn test_resolve_client_binds_identity() {
        let mut builder = SaleBuilder::new(backend_with_widget_and_maria());
        builder.set_client_document("1712345678");
        builder.resolve_client_by_document().await.unwrap();
        assert_eq!(builder.client(), Some("client-1"));
    }

    #[tokio::test]
    async fn test_unknown_document_clears_binding() {
        let mut builder = SaleBuilder::new(backend_with_widget_and_maria());
        builder.set_client_document("1712345678");
        builder.resolve_client_by_document().await.unwrap();

        builder.set_client_document("99999999");
        let err = builder.resolve_client_by_document().await.unwrap_err();
        assert!(matches!(err, FormError::ClientNotFound(d) if d == "99999999"));
        assert_eq!(builder.client(), None);
        // Document value preserved for correction.
        assert_eq!(builder.client_document(), "99999999");
    }

    #[tokio::test]
    async fn test_editing_document_drops_stale_binding() {
        let mut builder = SaleBuilder::new(backend_with_widget_and_maria());
        builder.set_client_document("1712345678");
        builder.resolve_client_by_document().await.unwrap();

        builder.set_client_document("1712345679");
        assert_eq!(builder.client(), None);
    }

    #[tokio::test]
    async fn test_resolve_line_prices_and_defaults_qty_to_one() {
        let mut builder = SaleBuilder::new(backend_with_widget_and_maria());
        let key = builder.lines().iter().next().unwrap().0;
        builder.set_line_code(key, "A-100").unwrap();

        builder.resolve_product_line(key).await.unwrap();

        let line = builder.lines().get(key).unwrap();
        assert_eq!(line.name, "Widget");
        assert_eq!(line.qty, 1);
        assert_eq!(line.total, Money::from_mils(183_333));
        assert_eq!(builder.total(), Money::from_mils(183_333));
    }

    #[tokio::test]
    async fn test_resolve_line_keeps_user_quantity() {
        let mut builder = SaleBuilder::new(backend_with_widget_and_maria());
        let key = builder.lines().iter().next().unwrap().0;
        builder.set_line_code(key, "A-100").unwrap();
        builder.set_line_qty(key, 3).unwrap();

        builder.resolve_product_line(key).await.unwrap();
        assert_eq!(builder.lines().get(key).unwrap().total, Money::from_mils(549_999));
    }

    #[tokio::test]
    async fn test_resolve_unknown_code_writes_sentinel_without_error() {
        let mut builder = SaleBuilder::new(backend_with_widget_and_maria());
        let key = builder.lines().iter().next().unwrap().0;
        builder.set_line_code(key, "XYZ-404").unwrap();

        builder.resolve_product_line(key).await.unwrap();

        let line = builder.lines().get(key).unwrap();
        assert!(line.is_sentinel());
        assert_eq!(builder.line_state(key), Some(&LineState::NotFound));
        assert!(builder.total().is_zero());
    }

    #[tokio::test]
    async fn test_resolve_broken_margin_reports_and_preserves_line() {
        let backend = MockBackend::default();
        let mut bad = widget();
        bad.profit_margin = Rate::from_fraction(1.0);
        backend
            .products
            .lock()
            .unwrap()
            .insert("A-100".to_string(), bad);

        let mut builder = SaleBuilder::new(backend);
        let key = builder.lines().iter().next().unwrap().0;
        builder.set_line_code(key, "A-100").unwrap();

        let err = builder.resolve_product_line(key).await.unwrap_err();
        assert!(matches!(err, FormError::Core(_)));
        assert_eq!(builder.line_state(key), Some(&LineState::Unresolved));
        assert_eq!(builder.lines().get(key).unwrap().code, "A-100");
    }

    #[tokio::test]
    async fn test_submit_validates_before_any_network_call() {
        let mut builder = SaleBuilder::new(backend_with_widget_and_maria());
        // Nothing filled in: date and client both missing.
        let err = builder.submit().await.unwrap_err();
        match err {
            FormError::Validation(v) => {
                assert!(v.field("operation_date").is_some());
                assert!(v.field("client").is_some());
            }
            other => panic!("expected Validation, got {:?}", other),
        }
    }

    async fn filled_builder(backend: MockBackend) -> SaleBuilder<MockBackend> {
        let mut builder = SaleBuilder::new(backend);
        builder.set_operation_date(date());
        builder.set_client_document("1712345678");
        builder.resolve_client_by_document().await.unwrap();
        let key = builder.lines().iter().next().unwrap().0;
        builder.set_line_code(key, "A-100").unwrap();
        builder.set_line_qty(key, 2).unwrap();
        builder.resolve_product_line(key).await.unwrap();
        builder
    }

    #[tokio::test]
    async fn test_submit_new_sale_creates_and_resets() {
        let mut builder = filled_builder(backend_with_widget_and_maria()).await;

        let outcome = builder.submit().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Created);

        // Session reset to a fresh sale.
        assert_eq!(builder.client(), None);
        assert_eq!(builder.client_document(), "");
        assert!(builder.total().is_zero());

        let created = builder.backend.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        let sale = &created[0];
        assert_eq!(sale.id, None);
        assert_eq!(sale.client.as_deref(), Some("client-1"));
        // Total recomputed from line totals, not form state.
        assert_eq!(sale.total_amount, Money::from_mils(366_666));
    }

    #[tokio::test]
    async fn test_submit_failure_preserves_session() {
        let mut backend = backend_with_widget_and_maria();
        backend.fail_submit = true;
        let mut builder = filled_builder(backend).await;

        let err = builder.submit().await.unwrap_err();
        assert!(matches!(err, FormError::Gateway(GatewayError::Http { .. })));

        // Everything still in place for a retry.
        assert_eq!(builder.client(), Some("client-1"));
        assert_eq!(builder.total(), Money::from_mils(366_666));
        assert!(!builder.is_submitting());
    }

    #[tokio::test]
    async fn test_abandoned_submit_does_not_wedge_session() {
        let backend = backend_with_widget_and_maria();
        backend.stall_submit.store(true, Ordering::SeqCst);
        let mut builder = filled_builder(backend).await;

        // The user navigates away mid-submit: the future is dropped at
        // its await point.
        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), builder.submit()).await;
        assert!(abandoned.is_err());
        assert!(!builder.is_submitting());

        // Session still intact and a retry goes through.
        builder.backend.stall_submit.store(false, Ordering::SeqCst);
        assert_eq!(builder.total(), Money::from_mils(366_666));
        let outcome = builder.submit().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Created);
        assert_eq!(builder.backend.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_sale_is_sale_not_found() {
        let err = SaleBuilder::load(MockBackend::default(), "s-9")
            .await
            .unwrap_err();
        assert!(matches!(err, FormError::SaleNotFound(id) if id == "s-9"));
    }

    #[tokio::test]
    async fn test_load_then_submit_updates_in_place() {
        let backend = backend_with_widget_and_maria();
        let stored = Sale {
            id: Some("s-1".to_string()),
            operation_date: Some(date()),
            total_amount: Money::from_mils(183_333),
            client: Some("client-1".to_string()),
            client_document: "1712345678".to_string(),
            products: vec![SaleProductLine {
                code: "A-100".to_string(),
                name: "Widget".to_string(),
                qty: 1,
                unit_price: Some(Money::from_mils(183_333)),
                discount: None,
                total: Money::from_mils(183_333),
            }],
            payment_methods: vec![PaymentMethodEntry::default()],
        };
        backend
            .sales
            .lock()
            .unwrap()
            .insert("s-1".to_string(), stored);

        let mut builder = SaleBuilder::load(backend, "s-1").await.unwrap();
        assert!(builder.is_persisted());
        assert_eq!(builder.total(), Money::from_mils(183_333));

        let outcome = builder.submit().await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Updated("s-1".to_string()));

        let updated = builder.backend.updated.lock().unwrap();
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].0, "s-1");
        assert_eq!(updated[0].1.id.as_deref(), Some("s-1"));
    }

    #[tokio::test]
    async fn test_document_assembles_schedule_in_order() {
        let mut builder = SaleBuilder::new(backend_with_widget_and_maria());
        let extra = builder.add_payment_entry();
        builder
            .edit_payment_entry(extra, |e| {
                e.method = PaymentMethod::DineroElectronico;
                e.amount = Money::from_major(100);
            })
            .unwrap();

        let sale = builder.document();
        assert_eq!(sale.payment_methods.len(), 2);
        assert_eq!(sale.payment_methods[0], PaymentMethodEntry::default());
        assert_eq!(
            sale.payment_methods[1].method,
            PaymentMethod::DineroElectronico
        );
    }
}
