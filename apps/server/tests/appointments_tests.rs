#![allow(unused)]
//! Booking an appointment opens a visit and a consultation invoice.

#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use support::*;

fn appointment(patient_id: &str) -> Value {
    json!({
        "patientId": patient_id,
        "date": "2024-05-10",
        "doctorName": "Dr. Mehta",
        "treatmentDone": "Scaling"
    })
}

#[tokio::test]
async fn booking_creates_linked_visit_and_invoice() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let patient = app.create_patient("Jonas Berg").await?;
            let patient_id = patient["patientId"].as_str().unwrap_or_default().to_string();

            let booked = app
                .post_json("/api/appointments", &appointment(&patient_id), StatusCode::CREATED)
                .await?;
            let visit_id = booked["visitId"].as_i64().expect("visit linked");
            let invoice_id = booked["invoiceId"].as_i64().expect("invoice linked");

            let visit = app.get_json(&format!("/api/visits/{visit_id}")).await?;
            assert_eq!(visit["patientId"], patient_id.as_str());
            assert_eq!(visit["date"], "2024-05-10");
            assert_eq!(visit["chiefComplaint"], "Scaling");

            let invoice = app.get_json(&format!("/api/invoices/{invoice_id}")).await?;
            assert_eq!(invoice["status"], "pending");
            assert_eq!(invoice["visitId"], visit_id);
            assert_eq!(invoice["totalAmount"], 500.0);

            let items = app
                .get_json(&format!("/api/invoices/{invoice_id}/items"))
                .await?;
            let items = items.as_array().cloned().unwrap_or_default();
            assert_eq!(items.len(), 1);
            assert_eq!(items[0]["item"], "Consultation");
            assert_eq!(items[0]["amount"], 500.0);

            let stored = app.get_json(&format!("/api/appointments/{}", booked["id"])).await?;
            assert_eq!(stored, booked);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn consultation_fee_comes_from_config() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| config.billing.default_consultation_fee = 750.0,
        |app| {
            Box::pin(async move {
                let booked = app
                    .post_json("/api/appointments", &appointment("PT2024-0001"), StatusCode::CREATED)
                    .await?;
                let invoice = app
                    .get_json(&format!("/api/invoices/{}", booked["invoiceId"]))
                    .await?;
                assert_eq!(invoice["totalAmount"], 750.0);
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn disabled_cascade_stores_only_the_appointment() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| config.billing.appointment_cascade = false,
        |app| {
            Box::pin(async move {
                let booked = app
                    .post_json("/api/appointments", &appointment("PT2024-0001"), StatusCode::CREATED)
                    .await?;
                assert!(booked["visitId"].is_null());
                assert!(booked["invoiceId"].is_null());
                assert_eq!(app.get_json("/api/invoices").await?, json!([]));
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn update_without_invoice_creates_one() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| config.billing.appointment_cascade = false,
        |app| {
            Box::pin(async move {
                let booked = app
                    .post_json("/api/appointments", &appointment("PT2024-0001"), StatusCode::CREATED)
                    .await?;

                let (status, _headers, body) = app
                    .request(
                        Method::PUT,
                        &format!("/api/appointments/{}", booked["id"]),
                        Some(to_json_body(&json!({ "notes": "Bring x-rays" }))?),
                    )
                    .await?;
                assert_status(status, StatusCode::OK, &body_text(&body));
                let updated = parse_json(&body)?;
                assert_eq!(updated["notes"], "Bring x-rays");
                assert!(updated["invoiceId"].is_i64());

                let invoices = app.get_json("/api/invoices").await?;
                assert_eq!(invoices.as_array().map(Vec::len), Some(1));
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn update_keeps_an_existing_invoice() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let booked = app
                .post_json("/api/appointments", &appointment("PT2024-0001"), StatusCode::CREATED)
                .await?;

            let (status, _headers, body) = app
                .request(
                    Method::PUT,
                    &format!("/api/appointments/{}", booked["id"]),
                    Some(to_json_body(&json!({ "doctorName": "Dr. Iyer" }))?),
                )
                .await?;
            assert_status(status, StatusCode::OK, "update appointment");
            assert_eq!(parse_json(&body)?["invoiceId"], booked["invoiceId"]);

            let invoices = app.get_json("/api/invoices").await?;
            assert_eq!(invoices.as_array().map(Vec::len), Some(1));
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn appointment_requires_a_date() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, _body) = app
                .request(
                    Method::POST,
                    "/api/appointments",
                    Some(to_json_body(&json!({ "patientId": "PT2024-0001" }))?),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "missing date");
            Ok(())
        })
    })
    .await
}
