//! Settings access with typed views and first-run seeding.

use dentaldesk_models::{
    apply_patch, ClinicInfo, NewSetting, PatientIdFormat, Setting, SettingKey, SettingValue,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use validator::Validate;

use crate::{
    db::{ClinicStore, SettingsStore},
    Error, Result,
};

pub struct SettingsService {
    store: Arc<dyn ClinicStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    /// Insert every default setting whose key is missing. Existing rows are left alone.
    ///
    /// Returns the keys that were created.
    pub async fn seed_defaults(&self) -> Result<Vec<String>> {
        let mut created = Vec::new();
        for setting in NewSetting::defaults() {
            if self
                .store
                .get_setting_by_key(&setting.setting_key)
                .await?
                .is_some()
            {
                continue;
            }
            let key = setting.setting_key.clone();
            self.store.create_setting(setting).await?;
            created.push(key);
        }
        if !created.is_empty() {
            tracing::info!(keys = ?created, "Seeded default settings");
        }
        Ok(created)
    }

    /// The stored format, or the built-in default when the row is missing or malformed.
    pub async fn patient_id_format(&self) -> Result<PatientIdFormat> {
        let Some(setting) = self
            .store
            .get_setting_by_key(SettingKey::PatientIdFormat.as_str())
            .await?
        else {
            return Ok(PatientIdFormat::default());
        };
        match setting.typed() {
            Ok(SettingValue::PatientIdFormat(format)) => Ok(format),
            Ok(_) | Err(_) => {
                tracing::warn!("Stored patient_id_format is malformed; using the default");
                Ok(PatientIdFormat::default())
            }
        }
    }

    pub async fn create(&self, setting: NewSetting) -> Result<Setting> {
        if self
            .store
            .get_setting_by_key(&setting.setting_key)
            .await?
            .is_some()
        {
            return Err(Error::BadRequest(format!(
                "Setting '{}' already exists",
                setting.setting_key
            )));
        }
        self.store.create_setting(setting).await
    }

    pub async fn update(&self, id: i32, patch: &JsonValue) -> Result<Setting> {
        let current = self
            .store
            .get_setting(id)
            .await?
            .ok_or_else(|| Error::not_found("Setting"))?;
        let merged: NewSetting = apply_patch(&current.data, patch)?;
        merged.validate()?;
        self.store
            .update_setting(id, merged)
            .await?
            .ok_or_else(|| Error::not_found("Setting"))
    }

    /// Replace the clinic logo with an inline data URI.
    pub async fn set_clinic_logo(&self, logo: String) -> Result<Setting> {
        let current = self
            .store
            .get_setting_by_key(SettingKey::ClinicInfo.as_str())
            .await?
            .ok_or_else(|| Error::NotFound("Clinic info settings not found".to_string()))?;

        // Keep unknown clinic_info fields intact.
        let mut value = current.setting_value.clone();
        match value.as_object_mut() {
            Some(map) => {
                map.insert("logo".to_string(), JsonValue::String(logo));
            }
            None => {
                let info = ClinicInfo {
                    logo,
                    ..ClinicInfo::default()
                };
                value = SettingValue::ClinicInfo(info).to_json();
            }
        }

        let updated = NewSetting {
            setting_value: value,
            ..current.data.clone()
        };
        self.store
            .update_setting(current.id, updated)
            .await?
            .ok_or_else(|| Error::NotFound("Clinic info settings not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let store: Arc<dyn ClinicStore> = Arc::new(MemoryStore::new());
        let service = SettingsService::new(store.clone());
        assert_eq!(service.seed_defaults().await.unwrap().len(), 3);
        assert!(service.seed_defaults().await.unwrap().is_empty());
        assert_eq!(store.list_settings().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn missing_format_falls_back_to_default() {
        let store: Arc<dyn ClinicStore> = Arc::new(MemoryStore::new());
        let service = SettingsService::new(store);
        assert_eq!(
            service.patient_id_format().await.unwrap(),
            PatientIdFormat::default()
        );
    }

    #[tokio::test]
    async fn stored_out_of_range_format_falls_back_to_default() {
        let store: Arc<dyn ClinicStore> = Arc::new(MemoryStore::new());
        store
            .create_setting(NewSetting {
                setting_key: "patient_id_format".to_string(),
                setting_value: serde_json::json!({
                    "prefix": "XX",
                    "yearInFormat": false,
                    "digitCount": 1_000_000_000u64,
                    "separator": "/"
                }),
                category: "patient_id_format".to_string(),
            })
            .await
            .unwrap();
        let service = SettingsService::new(store);
        assert_eq!(
            service.patient_id_format().await.unwrap(),
            PatientIdFormat::default()
        );
    }
}
