use async_trait::async_trait;
use dentaldesk_models::{NewSetting, Record, Setting};
use sqlx::{postgres::PgRow, Row};

use super::PostgresStore;
use crate::{db::traits::SettingsStore, Error, Result};

const COLUMNS: &str = "id, setting_key, setting_value, category";

fn setting_from_row(r: &PgRow) -> Setting {
    Record::new(
        r.get("id"),
        NewSetting {
            setting_key: r.get("setting_key"),
            setting_value: r.get("setting_value"),
            category: r.get("category"),
        },
    )
}

#[async_trait]
impl SettingsStore for PostgresStore {
    async fn list_settings(&self) -> Result<Vec<Setting>> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM settings ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.iter().map(setting_from_row).collect())
    }

    async fn list_settings_by_category(&self, category: &str) -> Result<Vec<Setting>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM settings WHERE category = $1 ORDER BY id"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(setting_from_row).collect())
    }

    async fn get_setting(&self, id: i32) -> Result<Option<Setting>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM settings WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(setting_from_row))
    }

    async fn get_setting_by_key(&self, key: &str) -> Result<Option<Setting>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM settings WHERE setting_key = $1"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(setting_from_row))
    }

    async fn create_setting(&self, setting: NewSetting) -> Result<Setting> {
        let row = sqlx::query(&format!(
            "INSERT INTO settings (setting_key, setting_value, category)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        ))
        .bind(&setting.setting_key)
        .bind(&setting.setting_value)
        .bind(&setting.category)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(setting_from_row(&row))
    }

    async fn update_setting(&self, id: i32, setting: NewSetting) -> Result<Option<Setting>> {
        let row = sqlx::query(&format!(
            "UPDATE settings SET setting_key = $2, setting_value = $3, category = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&setting.setting_key)
        .bind(&setting.setting_value)
        .bind(&setting.category)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(row.as_ref().map(setting_from_row))
    }
}
