#![allow(unused)]
//! Visits: updates, follow-ups, attachment lists and file uploads.

#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use serde_json::{json, Value};
use support::*;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-an-image";

async fn visit_with_attachments(app: &TestApp) -> anyhow::Result<Value> {
    let mut visit = minimal_visit("PT2024-0001", "2024-03-01");
    visit["attachments"] = json!([
        { "name": "xray-1.png", "url": "/uploads/a.png" },
        { "name": "xray-2.png", "url": "/uploads/b.png" }
    ]);
    visit["consentForms"] = json!([{ "name": "extraction-consent.pdf" }]);
    app.post_json("/api/visits", &visit, StatusCode::CREATED).await
}

#[tokio::test]
async fn update_merges_and_clears_next_appointment() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let mut visit = minimal_visit("PT2024-0001", "2024-03-01");
            visit["nextAppointment"] = json!("2024-03-15");
            let visit = app.post_json("/api/visits", &visit, StatusCode::CREATED).await?;

            let (status, _headers, body) = app
                .request(
                    Method::PUT,
                    &format!("/api/visits/{}", visit["id"]),
                    Some(to_json_body(&json!({
                        "treatmentDone": "Root canal, stage 1",
                        "nextAppointment": ""
                    }))?),
                )
                .await?;
            assert_status(status, StatusCode::OK, &body_text(&body));
            let updated = parse_json(&body)?;
            assert_eq!(updated["treatmentDone"], "Root canal, stage 1");
            assert_eq!(updated["chiefComplaint"], "Toothache");
            assert!(updated["nextAppointment"].is_null());
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn emptying_the_visit_date_is_rejected() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let visit = app.create_visit("PT2024-0001").await?;

            let (status, _headers, _body) = app
                .request(
                    Method::PUT,
                    &format!("/api/visits/{}", visit["id"]),
                    Some(to_json_body(&json!({ "date": "" }))?),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "empty visit date");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn follow_up_points_back_at_the_original() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let original = app.create_visit("PT2024-0001").await?;

            let follow_up = app
                .post_json(
                    &format!("/api/visits/{}/follow-up", original["id"]),
                    &json!({}),
                    StatusCode::CREATED,
                )
                .await?;
            assert_eq!(follow_up["previousVisitId"], original["id"]);
            assert_eq!(follow_up["patientId"], "PT2024-0001");
            assert_eq!(follow_up["chiefComplaint"], "Follow-up: Toothache");
            assert_eq!(
                follow_up["date"],
                Utc::now().date_naive().format("%Y-%m-%d").to_string()
            );

            let listed = app
                .get_json(&format!("/api/visits/{}/follow-ups", original["id"]))
                .await?;
            assert_eq!(listed, json!([follow_up]));
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn follow_up_of_missing_visit_is_not_found() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, _body) = app
                .request(Method::POST, "/api/visits/404/follow-up", None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "follow-up of missing visit");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn attachment_and_consent_entries_are_removed_by_index() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let visit = visit_with_attachments(&app).await?;
            let id = &visit["id"];

            let (status, _headers, body) = app
                .request(Method::DELETE, &format!("/api/visits/{id}/attachments/0"), None)
                .await?;
            assert_status(status, StatusCode::OK, "delete attachment");
            assert_eq!(parse_json(&body)?["message"], "Attachment deleted successfully");

            let stored = app.get_json(&format!("/api/visits/{id}")).await?;
            assert_eq!(stored["attachments"].as_array().map(Vec::len), Some(1));
            assert_eq!(stored["attachments"][0]["name"], "xray-2.png");

            let (status, _headers, _body) = app
                .request(Method::DELETE, &format!("/api/visits/{id}/attachments/5"), None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "index out of range");

            let (status, _headers, _body) = app
                .request(Method::DELETE, &format!("/api/visits/{id}/consent-forms/0"), None)
                .await?;
            assert_status(status, StatusCode::OK, "delete consent form");

            let stored = app.get_json(&format!("/api/visits/{id}")).await?;
            assert_eq!(stored["consentForms"], json!([]));
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn visit_without_attachments_reports_missing_list() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let visit = app.create_visit("PT2024-0001").await?;

            let (status, _headers, body) = app
                .request(
                    Method::DELETE,
                    &format!("/api/visits/{}/attachments/0", visit["id"]),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "no attachments");
            assert_eq!(
                parse_json(&body)?["message"],
                "No attachments found for this visit"
            );

            let (status, _headers, _body) = app
                .request(
                    Method::DELETE,
                    &format!("/api/visits/{}/attachments/first", visit["id"]),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "non-numeric index");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn uploaded_attachment_is_served_and_deletable() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let visit = app.create_visit("PT2024-0001").await?;
            let visit_id = visit["id"].to_string();

            let (status, _headers, body) = app
                .upload(
                    "/api/upload/patient-attachment",
                    &[
                        MultipartPart::text("visitId", &visit_id),
                        MultipartPart::file("file", "bitewing.png", "image/png", PNG_BYTES),
                    ],
                )
                .await?;
            assert_status(status, StatusCode::OK, &body_text(&body));
            let uploaded = parse_json(&body)?;
            assert_eq!(uploaded["file"]["name"], "bitewing.png");
            let url = uploaded["file"]["url"].as_str().unwrap_or_default().to_string();
            assert!(url.starts_with("/uploads/") && url.ends_with(".png"));

            let (status, _headers, served) = app.request(Method::GET, &url, None).await?;
            assert_status(status, StatusCode::OK, "serve upload");
            assert_eq!(&served[..], PNG_BYTES);

            let stored = app.get_json(&format!("/api/visits/{visit_id}")).await?;
            let file_id = stored["attachments"][0]["id"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let filename = stored["attachments"][0]["filename"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            assert!(app.uploads_dir.join(&filename).exists());

            let (status, _headers, _body) = app
                .request(
                    Method::DELETE,
                    &format!("/api/visits/{visit_id}/media/{file_id}"),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "delete media");
            assert!(!app.uploads_dir.join(&filename).exists());

            let (status, _headers, _body) = app
                .request(
                    Method::DELETE,
                    &format!("/api/visits/{visit_id}/media/{file_id}"),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "media already deleted");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn media_upload_accepts_several_files() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let visit = app.create_visit("PT2024-0001").await?;
            let visit_id = visit["id"].to_string();

            let (status, _headers, body) = app
                .upload(
                    "/api/upload/media",
                    &[
                        MultipartPart::file("files", "front.jpg", "image/jpeg", b"front"),
                        MultipartPart::file("files", "side.jpg", "image/jpeg", b"side"),
                        MultipartPart::text("visitId", &visit_id),
                    ],
                )
                .await?;
            assert_status(status, StatusCode::OK, &body_text(&body));
            let uploaded = parse_json(&body)?;
            assert_eq!(uploaded["message"], "2 files uploaded successfully");
            assert_eq!(uploaded["files"][1]["type"], "image/jpeg");

            let stored = app.get_json(&format!("/api/visits/{visit_id}")).await?;
            assert_eq!(stored["attachments"].as_array().map(Vec::len), Some(2));
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn uploads_need_a_file_and_a_visit() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, body) = app
                .upload("/api/upload/media", &[MultipartPart::text("visitId", "1")])
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "no files");
            assert_eq!(parse_json(&body)?["message"], "No files uploaded");

            let (status, _headers, body) = app
                .upload(
                    "/api/upload/patient-attachment",
                    &[MultipartPart::file("file", "a.pdf", "application/pdf", b"%PDF")],
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "no visit id");
            assert_eq!(parse_json(&body)?["message"], "Visit ID is required");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn oversized_upload_is_rejected() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| config.uploads.max_file_size = 16,
        |app| {
            Box::pin(async move {
                let visit = app.create_visit("PT2024-0001").await?;
                let visit_id = visit["id"].to_string();
                let big = vec![b'x'; 64];

                let (status, _headers, _body) = app
                    .upload(
                        "/api/upload/patient-attachment",
                        &[
                            MultipartPart::text("visitId", &visit_id),
                            MultipartPart::file("file", "big.bin", "application/octet-stream", &big),
                        ],
                    )
                    .await?;
                assert!(status.is_client_error(), "expected rejection, got {status}");
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn logo_upload_stores_a_data_uri_in_clinic_info() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, body) = app
                .upload(
                    "/api/upload/logo",
                    &[MultipartPart::file("logo", "logo.png", "image/png", b"logo")],
                )
                .await?;
            assert_status(status, StatusCode::OK, &body_text(&body));
            let logo = parse_json(&body)?["logo"].as_str().unwrap_or_default().to_string();
            assert_eq!(logo, "data:image/png;base64,bG9nbw==");

            let clinic = app.get_json("/api/settings/key/clinic_info").await?;
            assert_eq!(clinic["settingValue"]["logo"], logo.as_str());
            Ok(())
        })
    })
    .await
}
