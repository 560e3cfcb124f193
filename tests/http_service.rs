// Invoice REST service against a mock server.
//
// The service uses reqwest's blocking client, so every call runs inside
// `spawn_blocking` while the mock server lives on the async runtime.

use invoice_desk::{
    ApiError, FormError, FormState, HttpInvoiceService, InvoiceApi, InvoiceForm, ItemField, PaymentMethod,
    StaticToken, TemplateType,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, query_param},
};

fn service(uri: &str, token: Option<&str>) -> HttpInvoiceService<StaticToken> {
    HttpInvoiceService::new(&format!("{uri}/api/v1"), 5, StaticToken(token.map(String::from))).unwrap()
}

async fn blocking<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    tokio::task::spawn_blocking(f).await.unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reserve_sequence_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/invoices/reserve-global-sequence"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sequence": 123 })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let reservation = blocking(move || service(&uri, Some("test-token")).reserve_sequence())
        .await
        .unwrap();
    assert_eq!(reservation.sequence, 123);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reserve_sequence_requires_sign_in() {
    let server = MockServer::start().await;

    let uri = server.uri();
    let err = blocking(move || service(&uri, None).reserve_sequence()).await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthenticated));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_invoices_with_status_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/invoices"))
        .and(query_param("status", "Paid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "INV-00002",
                "dateCreated": "2025-02-15",
                "companyName": "Tech Solutions",
                "invoiceValue": "2,200",
                "paymentMethod": "Bank Transfer",
                "paymentDeadline": "2025-02-28",
                "status": "Paid"
            }
        ])))
        .mount(&server)
        .await;

    let uri = server.uri();
    let rows = blocking(move || service(&uri, None).list_invoices(Some("Paid"))).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].company_name, "Tech Solutions");
    assert_eq!(rows[0].amount(), 2200.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_error_message_comes_from_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/invoices/INV-404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Invoice not found" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/invoices/INV-500"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "Internal Server Error" })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let (missing, broken) = blocking(move || {
        let svc = service(&uri, None);
        (svc.get_invoice("INV-404"), svc.get_invoice("INV-500"))
    })
    .await;

    let missing = missing.unwrap_err();
    assert_eq!(missing.to_string(), "Invoice not found");
    assert_eq!(missing.status(), Some(404));
    assert_eq!(broken.unwrap_err().to_string(), "Internal Server Error");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/invoices"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = blocking(move || service(&uri, Some("stale")).list_invoices(None)).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Token expired"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/invoices/INV-1"))
        .and(body_partial_json(json!({ "status": "Paid" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "INV-1", "status": "Paid" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/invoices/INV-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let (updated, deleted) = blocking(move || {
        let svc = service(&uri, Some("t"));
        (svc.update_invoice("INV-1", &json!({ "status": "Paid" })), svc.delete_invoice("INV-1"))
    })
    .await;

    assert_eq!(updated.unwrap()["status"], "Paid");
    assert!(deleted.is_ok());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dashboard_falls_back_to_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dashboard"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/invoices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "INV-1", "dateCreated": "2025-03-01", "companyName": "Acme", "invoiceValue": "1,500", "status": "Pending" },
            { "id": "INV-2", "dateCreated": "2025-03-05", "companyName": "Beta", "invoiceValue": "500", "status": "Paid" }
        ])))
        .mount(&server)
        .await;

    let uri = server.uri();
    let data = blocking(move || service(&uri, None).dashboard()).await.unwrap();
    assert_eq!(data.cards.total_invoices_issued, 2);
    assert_eq!(data.cards.total_invoices_payment, 1);
    assert_eq!(data.monthly_revenue[0].revenue, 2000.0);
    assert_eq!(data.pending_payments[0].id, "INV-1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_form_saves_through_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/invoices/reserve-global-sequence"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sequence": 7 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/invoices"))
        .and(body_partial_json(json!({
            "template_type": "PROFORMA",
            "items": [{ "description": "Widget", "quantity": 2.0, "unit_price": 10.0 }],
            "payment_methods": "paypal",
            "specific_data": { "valid_until": "2025-06-01", "additional_terms": "Net due" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "PRF-AU-03-2025-00000007", "status": "Draft" })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let (created, state) = blocking(move || {
        let api = service(&uri, Some("t"));
        let mut form = InvoiceForm::with_today(chrono::NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        form.select_template(&api, TemplateType::Proforma).unwrap();
        form.update(|d| {
            d.valid_until = chrono::NaiveDate::from_ymd_opt(2025, 6, 1);
            d.payment_terms = "50% upfront".into();
            d.payment_method = Some(PaymentMethod::Paypal);
            d.issuer.company_name = "Billchain LLC".into();
            d.client.company_name = "Acme Corp".into();
            d.client.city_state_zip = "Austin, TX".into();
            d.notes = "Net due".into();
        });
        form.set_item_field(0, ItemField::Description, "Widget");
        form.set_item_field(0, ItemField::Quantity, "2");
        form.set_item_field(0, ItemField::UnitPrice, "10.00");
        form.add_item();
        let created = form.submit(&api);
        (created, form.state().clone())
    })
    .await;

    let created = created.unwrap();
    assert_eq!(created.id, "PRF-AU-03-2025-00000007");
    assert_eq!(created.extra["status"], "Draft");
    assert_eq!(state, FormState::Saved { id: created.id.clone() });
}

#[tokio::test(flavor = "multi_thread")]
async fn test_form_keeps_draft_when_create_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/invoices/reserve-global-sequence"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sequence": 8 })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/invoices"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "message": "Duplicate invoice id" })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let (err, state, number) = blocking(move || {
        let api = service(&uri, Some("t"));
        let mut form = InvoiceForm::new();
        form.select_template(&api, TemplateType::Standard).unwrap();
        form.update(|d| {
            d.due_date = d.invoice_date;
            d.payment_terms = "Net 30".into();
            d.payment_method = Some(PaymentMethod::Cash);
            d.issuer.company_name = "Billchain LLC".into();
            d.client.company_name = "Acme Corp".into();
        });
        form.set_item_field(0, ItemField::Description, "Consulting");
        form.set_item_field(0, ItemField::Quantity, "1");
        form.set_item_field(0, ItemField::UnitPrice, "500");
        let err = form.submit(&api).unwrap_err();
        (err, form.state().clone(), form.draft().invoice_number.clone())
    })
    .await;

    assert!(matches!(err, FormError::Api(ApiError::Status { status: 422, .. })));
    assert_eq!(err.to_string(), "Duplicate invoice id");
    assert_eq!(state, FormState::Editing);
    assert!(number.unwrap().ends_with("-00000008"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invoice_id_is_path_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/invoices/INV%2F9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "INV/9" })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let invoice = blocking(move || service(&uri, None).get_invoice("INV/9")).await.unwrap();
    assert_eq!(invoice["id"], "INV/9");
}
