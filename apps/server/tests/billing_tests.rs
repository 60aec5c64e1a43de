#![allow(unused)]
//! Invoices, line items, payment status transitions and the revenue report.

#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use serde_json::{json, Value};
use support::*;

async fn create_invoice(app: &TestApp, total: f64) -> anyhow::Result<Value> {
    app.post_json(
        "/api/invoices",
        &minimal_invoice("PT2024-0001", total),
        StatusCode::CREATED,
    )
    .await
}

async fn patch_invoice(app: &TestApp, id: &Value, body: Value) -> anyhow::Result<Value> {
    let (status, _headers, body) = app
        .request(
            Method::PATCH,
            &format!("/api/invoices/{id}"),
            Some(to_json_body(&body)?),
        )
        .await?;
    assert_status(status, StatusCode::OK, &body_text(&body));
    parse_json(&body)
}

#[tokio::test]
async fn put_merges_fields_over_the_stored_invoice() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let invoice = create_invoice(&app, 900.0).await?;

            let (status, _headers, body) = app
                .request(
                    Method::PUT,
                    &format!("/api/invoices/{}", invoice["id"]),
                    Some(to_json_body(&json!({ "notes": "Split over two visits" }))?),
                )
                .await?;
            assert_status(status, StatusCode::OK, "put invoice");
            let updated = parse_json(&body)?;
            assert_eq!(updated["notes"], "Split over two visits");
            assert_eq!(updated["totalAmount"], 900.0);
            assert_eq!(updated["status"], "pending");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn marking_paid_stamps_date_and_method() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let invoice = create_invoice(&app, 400.0).await?;

            let paid = patch_invoice(
                &app,
                &invoice["id"],
                json!({ "status": "paid", "paymentMethod": "card" }),
            )
            .await?;
            assert_eq!(paid["status"], "paid");
            assert_eq!(paid["paymentMethod"], "card");
            assert_eq!(
                paid["paymentDate"],
                Utc::now().date_naive().format("%Y-%m-%d").to_string()
            );

            let reopened = patch_invoice(&app, &invoice["id"], json!({ "status": "pending" })).await?;
            assert!(reopened["paymentDate"].is_null());
            assert!(reopened["paymentMethod"].is_null());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn patch_without_status_leaves_payment_fields() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let invoice = create_invoice(&app, 400.0).await?;
            patch_invoice(
                &app,
                &invoice["id"],
                json!({ "status": "paid", "paymentMethod": "cash" }),
            )
            .await?;

            let noted = patch_invoice(&app, &invoice["id"], json!({ "notes": "Receipt sent" })).await?;
            assert_eq!(noted["status"], "paid");
            assert_eq!(noted["paymentMethod"], "cash");
            assert!(noted["paymentDate"].is_string());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn invoice_items_require_an_existing_invoice() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, body) = app
                .request(
                    Method::POST,
                    "/api/invoice-items",
                    Some(to_json_body(&json!({
                        "invoiceId": 999,
                        "item": "Filling",
                        "amount": 1500.0
                    }))?),
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "item for missing invoice");
            assert_eq!(parse_json(&body)?["message"], "Invoice not found");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn deleting_an_invoice_removes_items_and_unlinks_appointments() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let booked = app
                .post_json(
                    "/api/appointments",
                    &json!({ "patientId": "PT2024-0001", "date": "2024-06-01" }),
                    StatusCode::CREATED,
                )
                .await?;
            let invoice_id = booked["invoiceId"].clone();

            let (status, _headers, _body) = app
                .request(Method::DELETE, &format!("/api/invoices/{invoice_id}"), None)
                .await?;
            assert_status(status, StatusCode::NO_CONTENT, "delete invoice");

            let appointment = app
                .get_json(&format!("/api/appointments/{}", booked["id"]))
                .await?;
            assert!(appointment["invoiceId"].is_null());
            assert_eq!(appointment["visitId"], booked["visitId"]);

            let items = app
                .get_json(&format!("/api/invoices/{invoice_id}/items"))
                .await?;
            assert_eq!(items, json!([]));

            let (status, _headers, _body) = app
                .request(Method::DELETE, &format!("/api/invoices/{invoice_id}"), None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "second delete");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn revenue_report_sums_paid_invoices_by_method() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for (total, method) in [(1000.0, "cash"), (250.0, "card"), (500.0, "cash")] {
                let invoice = create_invoice(&app, total).await?;
                patch_invoice(
                    &app,
                    &invoice["id"],
                    json!({ "status": "paid", "paymentMethod": method }),
                )
                .await?;
            }
            create_invoice(&app, 9999.0).await?;

            let report = app.get_json("/api/reports/revenue").await?;
            assert_eq!(report["totalRevenue"], 1750.0);
            assert_eq!(report["totalBilled"], 11749.0);
            assert_eq!(report["invoiceCount"], 4);
            assert_eq!(report["paidCount"], 3);
            assert_eq!(report["pendingCount"], 1);
            assert_eq!(report["byPaymentMethod"][0]["method"], "cash");
            assert_eq!(report["byPaymentMethod"][0]["count"], 2);
            assert_eq!(report["byPaymentMethod"][0]["amount"], 1500.0);
            assert_eq!(report["byPaymentMethod"][1]["method"], "card");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn revenue_report_rejects_inverted_range() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, _body) = app
                .request(
                    Method::GET,
                    "/api/reports/revenue?from=2024-12-31&to=2024-01-01",
                    None,
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "inverted range");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn sequence_reset_is_refused_outside_development() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, _body) = app
                .request(Method::POST, "/api/admin/reset-invoice-sequence", None)
                .await?;
            assert_status(status, StatusCode::FORBIDDEN, "reset in test env");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn sequence_reset_leaves_lowest_free_numbering_in_place() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| config.environment = "development".to_string(),
        |app| {
            Box::pin(async move {
                let first = create_invoice(&app, 100.0).await?;
                let second = create_invoice(&app, 200.0).await?;
                assert_eq!(second["id"], 2);
                let (status, _headers, _body) = app
                    .request(Method::DELETE, &format!("/api/invoices/{}", first["id"]), None)
                    .await?;
                assert_status(status, StatusCode::NO_CONTENT, "delete invoice");

                let (status, _headers, body) = app
                    .request(Method::POST, "/api/admin/reset-invoice-sequence", None)
                    .await?;
                assert_status(status, StatusCode::OK, "reset in development");
                assert_eq!(
                    parse_json(&body)?["message"],
                    "Invoice sequence reset successfully"
                );

                // Invoice 2 survives the reset; the freed 1 is filled, then numbering resumes after 2.
                let refill = create_invoice(&app, 100.0).await?;
                assert_eq!(refill["id"], 1);
                let next = create_invoice(&app, 100.0).await?;
                assert_eq!(next["id"], 3);
                assert_eq!(app.get_json("/api/invoices/2").await?["totalAmount"], 200.0);
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn freed_invoice_numbers_are_reused() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let first = create_invoice(&app, 100.0).await?;
            let second = create_invoice(&app, 200.0).await?;
            create_invoice(&app, 300.0).await?;
            assert_eq!(second["id"], 2);

            let (status, _headers, _body) = app
                .request(Method::DELETE, &format!("/api/invoices/{}", second["id"]), None)
                .await?;
            assert_status(status, StatusCode::NO_CONTENT, "delete second invoice");

            let replacement = create_invoice(&app, 250.0).await?;
            assert_eq!(replacement["id"], 2);

            let next = create_invoice(&app, 400.0).await?;
            assert_eq!(next["id"], 4);
            assert_eq!(first["id"], 1);
            Ok(())
        })
    })
    .await
}
