#![allow(unused)]
//! Behaviour shared by every entity route: missing rows, bad ids, empty lists.

#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;
use support::*;

const ENTITY_ROUTES: &[(&str, &str)] = &[
    ("/api/patients", "Patient not found"),
    ("/api/visits", "Visit not found"),
    ("/api/appointments", "Appointment not found"),
    ("/api/invoices", "Invoice not found"),
    ("/api/invoice-items", "Invoice item not found"),
    ("/api/lab-works", "Lab work not found"),
    ("/api/lab-work-costs", "Lab work cost not found"),
    ("/api/lab-inventory", "Inventory item not found"),
    ("/api/staff", "Staff member not found"),
    ("/api/attendance", "Attendance record not found"),
    ("/api/salary", "Salary record not found"),
    ("/api/medications", "Medication not found"),
    ("/api/prescriptions", "Prescription not found"),
];

#[tokio::test]
async fn deleting_a_missing_row_is_not_found() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for (base, message) in ENTITY_ROUTES {
                let (status, _headers, body) = app
                    .request(Method::DELETE, &format!("{base}/4242"), None)
                    .await?;
                assert_status(status, StatusCode::NOT_FOUND, base);
                assert_eq!(parse_json(&body)?["message"], *message, "{base}");
            }
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn non_numeric_ids_are_rejected() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for (base, _message) in ENTITY_ROUTES {
                let (status, _headers, body) = app
                    .request(Method::DELETE, &format!("{base}/abc"), None)
                    .await?;
                assert_status(status, StatusCode::BAD_REQUEST, base);
                assert_eq!(parse_json(&body)?["message"], "Invalid ID", "{base}");
            }
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn updating_a_missing_row_is_not_found() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for path in [
                "/api/visits/77",
                "/api/appointments/77",
                "/api/invoices/77",
                "/api/lab-works/77",
                "/api/medications/77",
            ] {
                let (status, _headers, _body) = app
                    .request(
                        Method::PUT,
                        path,
                        Some(to_json_body(&json!({ "notes": "n/a" }))?),
                    )
                    .await?;
                assert_status(status, StatusCode::NOT_FOUND, path);
            }
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn fresh_store_lists_are_empty() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for path in [
                "/api/patients",
                "/api/appointments",
                "/api/invoices",
                "/api/lab-works",
                "/api/lab-inventory",
                "/api/staff",
                "/api/medications",
            ] {
                assert_eq!(app.get_json(path).await?, json!([]), "{path}");
            }
            Ok(())
        })
    })
    .await
}
