use dentaldesk_models::{apply_patch, LabWork, LabWorkCost, NewLabWork};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use validator::Validate;

use crate::{
    db::{ClinicStore, LabStore},
    Error, Result,
};

pub struct LabService {
    store: Arc<dyn ClinicStore>,
}

impl LabService {
    pub fn new(store: Arc<dyn ClinicStore>) -> Self {
        Self { store }
    }

    /// Price-list lookup: the technician's own row first, then any row for the work type.
    pub async fn lookup_cost(
        &self,
        work_type: &str,
        technician: Option<&str>,
    ) -> Result<Option<LabWorkCost>> {
        if let Some(technician) = technician.filter(|t| !t.trim().is_empty()) {
            if let Some(cost) = self
                .store
                .find_lab_work_cost(work_type, Some(technician))
                .await?
            {
                return Ok(Some(cost));
            }
        }
        self.store.find_lab_work_cost(work_type, None).await
    }

    async fn price(&self, mut work: NewLabWork) -> Result<NewLabWork> {
        if work.lab_cost.is_none() {
            if let Some(cost) = self
                .lookup_cost(&work.work_type, work.technician.as_deref())
                .await?
            {
                tracing::debug!(
                    work_type = %work.work_type,
                    cost_id = cost.id,
                    "Lab cost taken from price list"
                );
                work.lab_cost = Some(cost.cost);
            }
        }
        work.recompute_totals();
        Ok(work)
    }

    pub async fn create(&self, work: NewLabWork) -> Result<LabWork> {
        let work = self.price(work).await?;
        self.store.create_lab_work(work).await
    }

    pub async fn update(&self, id: i32, patch: &JsonValue) -> Result<LabWork> {
        let current = self
            .store
            .get_lab_work(id)
            .await?
            .ok_or_else(|| Error::not_found("Lab work"))?;
        let merged: NewLabWork = apply_patch(&current.data, patch)?;
        merged.validate()?;
        let merged = self.price(merged).await?;
        self.store
            .update_lab_work(id, merged)
            .await?
            .ok_or_else(|| Error::not_found("Lab work"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use dentaldesk_models::NewLabWorkCost;
    use serde_json::json;

    async fn seeded() -> (Arc<dyn ClinicStore>, LabService) {
        let store: Arc<dyn ClinicStore> = Arc::new(MemoryStore::new());
        for (technician, cost) in [("Ravi", 1500.0), ("Anita", 1200.0)] {
            store
                .create_lab_work_cost(NewLabWorkCost {
                    work_type: "Crown".to_string(),
                    lab_technician: technician.to_string(),
                    cost,
                })
                .await
                .unwrap();
        }
        (store.clone(), LabService::new(store))
    }

    fn order(technician: Option<&str>) -> NewLabWork {
        serde_json::from_value(json!({
            "patientId": "PT2024-0001",
            "workType": "Crown",
            "status": "ordered",
            "startDate": "2024-02-01",
            "dueDate": "2024-02-10",
            "technician": technician,
            "units": 2
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn technician_price_wins() {
        let (_, service) = seeded().await;
        let work = service.create(order(Some("Anita"))).await.unwrap();
        assert_eq!(work.lab_cost, Some(1200.0));
        assert_eq!(work.total_lab_cost, Some(2400.0));
    }

    #[tokio::test]
    async fn falls_back_to_work_type() {
        let (_, service) = seeded().await;
        let work = service.create(order(Some("Unknown"))).await.unwrap();
        assert_eq!(work.lab_cost, Some(1500.0));
    }

    #[tokio::test]
    async fn explicit_cost_is_kept() {
        let (_, service) = seeded().await;
        let mut work = order(Some("Anita"));
        work.lab_cost = Some(999.0);
        let work = service.create(work).await.unwrap();
        assert_eq!(work.lab_cost, Some(999.0));
    }
}
