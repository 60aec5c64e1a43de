//! Multipart upload endpoints.

use axum::{
    extract::{multipart::Field, Multipart, State},
    response::Response,
};
use serde_json::json;

use super::ok;
use crate::{
    api::extract::parse_id,
    services::UploadedFile,
    state::AppState,
    Error, Result,
};

/// The file fields named `file_field` plus the `visitId` text field.
struct UploadForm {
    files: Vec<UploadedFile>,
    visit_id: Option<String>,
}

async fn read_form(
    mut multipart: Multipart,
    file_field: &str,
    max_file_size: usize,
) -> Result<UploadForm> {
    let mut form = UploadForm {
        files: Vec::new(),
        visit_id: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            n if n == file_field => form.files.push(read_file(field, max_file_size).await?),
            "visitId" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Error::BadRequest(e.body_text()))?;
                form.visit_id = Some(text.trim().to_string()).filter(|t| !t.is_empty());
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn read_file(field: Field<'_>, max_file_size: usize) -> Result<UploadedFile> {
    let name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| Error::BadRequest(e.body_text()))?;
    if bytes.len() > max_file_size {
        return Err(Error::BadRequest(format!(
            "File '{name}' exceeds the {max_file_size} byte upload limit"
        )));
    }
    Ok(UploadedFile {
        name,
        content_type,
        bytes: bytes.to_vec(),
    })
}

fn visit_id(form: &UploadForm) -> Result<i32> {
    let raw = form
        .visit_id
        .as_deref()
        .ok_or_else(|| Error::BadRequest("Visit ID is required".to_string()))?;
    parse_id(raw)
}

pub async fn upload_logo(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = read_form(multipart, "logo", state.config.uploads.max_file_size).await?;
    let file = form
        .files
        .into_iter()
        .next()
        .ok_or_else(|| Error::BadRequest("No file uploaded".to_string()))?;

    let logo = state.upload_service.set_logo(file).await?;
    ok(json!({ "message": "Logo uploaded successfully", "logo": logo }))
}

pub async fn upload_patient_attachment(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response> {
    let mut form = read_form(multipart, "file", state.config.uploads.max_file_size).await?;
    if form.files.is_empty() {
        return Err(Error::BadRequest("No file uploaded".to_string()));
    }
    let visit_id = visit_id(&form)?;
    form.files.truncate(1);

    let stored = state
        .upload_service
        .attach_to_visit(visit_id, form.files)
        .await?;
    let file = stored
        .first()
        .map(|a| json!({ "name": a.name, "url": a.url }))
        .unwrap_or_default();
    ok(json!({ "message": "File uploaded successfully", "file": file }))
}

pub async fn upload_media(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = read_form(multipart, "files", state.config.uploads.max_file_size).await?;
    if form.files.is_empty() {
        return Err(Error::BadRequest("No files uploaded".to_string()));
    }
    let visit_id = visit_id(&form)?;

    let stored = state
        .upload_service
        .attach_to_visit(visit_id, form.files)
        .await?;
    let files: Vec<_> = stored
        .iter()
        .map(|a| json!({ "name": a.name, "type": a.mime_type, "url": a.url }))
        .collect();
    ok(json!({
        "message": format!("{} files uploaded successfully", files.len()),
        "files": files,
    }))
}
