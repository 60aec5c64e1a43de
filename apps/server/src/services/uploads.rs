//! Uploaded files: visit attachments on disk and the inline clinic logo.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use dentaldesk_models::{Attachment, PatientVisit};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    services::{settings::SettingsService, visits::VisitService},
    Error, Result,
};

/// URL prefix the uploads directory is served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// A file taken from a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct UploadService {
    directory: PathBuf,
    visits: Arc<VisitService>,
    settings: Arc<SettingsService>,
}

impl UploadService {
    pub fn new(
        directory: impl Into<PathBuf>,
        visits: Arc<VisitService>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self {
            directory: directory.into(),
            visits,
            settings,
        }
    }

    /// Store the logo inline in `clinic_info` as a data URI and return the URI.
    pub async fn set_logo(&self, file: UploadedFile) -> Result<String> {
        let data_uri = format!(
            "data:{};base64,{}",
            file.content_type,
            STANDARD.encode(&file.bytes)
        );
        self.settings.set_clinic_logo(data_uri.clone()).await?;
        tracing::info!(bytes = file.bytes.len(), "Clinic logo updated");
        Ok(data_uri)
    }

    /// Write `files` to disk and append them to the visit's attachments.
    pub async fn attach_to_visit(
        &self,
        visit_id: i32,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<Attachment>> {
        let visit = self.visits.get(visit_id).await?;

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| Error::Internal(format!("Failed to create uploads directory: {e}")))?;

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            stored.push(self.write_file(file).await?);
        }

        let mut data = visit.data.clone();
        data.attachments
            .get_or_insert_with(Vec::new)
            .extend(stored.iter().map(Attachment::to_json));
        self.visits.save(visit_id, data).await?;

        tracing::info!(visit_id, count = stored.len(), "Attachments uploaded");
        Ok(stored)
    }

    async fn write_file(&self, file: UploadedFile) -> Result<Attachment> {
        let extension = Path::new(&file.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let filename = format!("{}{}", Uuid::new_v4(), extension);

        tokio::fs::write(self.directory.join(&filename), &file.bytes)
            .await
            .map_err(|e| Error::Internal(format!("Failed to store upload: {e}")))?;

        Ok(Attachment {
            id: Uuid::new_v4().to_string(),
            name: file.name,
            mime_type: file.content_type,
            url: format!("{UPLOADS_URL_PREFIX}/{filename}"),
            filename: Some(filename),
            date_added: Utc::now(),
        })
    }

    /// Remove the attachment with id `file_id`, deleting its file when it has one.
    pub async fn remove_media(&self, visit_id: i32, file_id: &str) -> Result<PatientVisit> {
        let visit = self.visits.get(visit_id).await?;
        let mut data = visit.data.clone();

        let attachments = data.attachments.get_or_insert_with(Vec::new);
        let position = attachments
            .iter()
            .position(|a| a.get("id").and_then(JsonValue::as_str) == Some(file_id))
            .ok_or_else(|| Error::NotFound("File not found".to_string()))?;
        let removed = attachments.remove(position);

        if let Some(filename) = removed.get("filename").and_then(JsonValue::as_str) {
            self.delete_file(filename).await;
        }

        self.visits.save(visit_id, data).await
    }

    async fn delete_file(&self, filename: &str) {
        // Only bare names inside the uploads directory.
        if Path::new(filename).file_name().and_then(|n| n.to_str()) != Some(filename) {
            tracing::warn!(filename, "Refusing to delete attachment outside uploads directory");
            return;
        }
        let path = self.directory.join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to delete upload"),
        }
    }
}
