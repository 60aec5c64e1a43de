//! Clinic settings.
//!
//! Rows are stored as `(settingKey, settingValue, category)` with an opaque JSON value.
//! The keys the server understands get a typed view through [`SettingValue`]; writes to
//! those keys must fit the shape or they are rejected.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    DropdownOptions,
    ClinicInfo,
    PatientIdFormat,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::DropdownOptions => "dropdown_options",
            SettingKey::ClinicInfo => "clinic_info",
            SettingKey::PatientIdFormat => "patient_id_format",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "dropdown_options" => Some(SettingKey::DropdownOptions),
            "clinic_info" => Some(SettingKey::ClinicInfo),
            "patient_id_format" => Some(SettingKey::PatientIdFormat),
            _ => None,
        }
    }

    /// Each known key lives in the category of the same name.
    pub fn category(&self) -> &'static str {
        self.as_str()
    }

}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Option lists offered by the visit and lab forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropdownOptions {
    #[serde(default)]
    pub medical_history: Vec<String>,
    #[serde(default)]
    pub drug_allergy: Vec<String>,
    #[serde(default)]
    pub previous_dental_history: Vec<String>,
    #[serde(default)]
    pub chief_complaint: Vec<String>,
    #[serde(default)]
    pub oral_examination: Vec<String>,
    #[serde(default)]
    pub investigation: Vec<String>,
    #[serde(default)]
    pub treatment_plan: Vec<String>,
    #[serde(default)]
    pub prescription: Vec<String>,
    #[serde(default)]
    pub treatment_done: Vec<String>,
    #[serde(default)]
    pub advice: Vec<String>,
    #[serde(default)]
    pub lab_technicians: Vec<String>,
    #[serde(default)]
    pub work_types: Vec<String>,
    #[serde(default)]
    pub crown_shades: Vec<String>,
    /// Lists added by the client that the server does not know about.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl DropdownOptions {
    /// Lists a fresh install starts with.
    pub fn starter() -> Self {
        Self {
            medical_history: strings(&["Diabetes", "Hypertension", "Heart Disease", "Asthma", "None"]),
            drug_allergy: strings(&["Penicillin", "NSAIDs", "Sulfa Drugs", "Local Anesthetics", "None"]),
            previous_dental_history: strings(&[
                "Extraction",
                "Root Canal Treatment",
                "Filling",
                "Crown",
                "Implant",
                "None",
            ]),
            chief_complaint: strings(&[
                "Toothache",
                "Tooth Sensitivity",
                "Bleeding Gums",
                "Bad Breath",
                "Broken Tooth",
                "Jaw Pain",
            ]),
            oral_examination: strings(&[
                "Cavity",
                "Gingivitis",
                "Periodontitis",
                "Abscess",
                "Fractured Tooth",
            ]),
            investigation: strings(&["X-Ray", "CBCT", "Pulp Testing", "Blood Test", "None"]),
            treatment_plan: strings(&["Filling", "Extraction", "Root Canal", "Scaling", "Crown", "Implant"]),
            prescription: strings(&["Antibiotics", "Painkillers", "Anti-inflammatory", "Mouthwash", "None"]),
            treatment_done: strings(&[
                "Filling",
                "Extraction",
                "Root Canal",
                "Scaling",
                "Crown",
                "Consultation Only",
            ]),
            advice: strings(&[
                "Soft Diet",
                "Maintain Oral Hygiene",
                "Avoid Hot Food/Beverage",
                "Follow-up Required",
                "None",
            ]),
            lab_technicians: strings(&["Dr. Smith", "Dr. Johnson", "Dr. Patel"]),
            work_types: strings(&[
                "Crown",
                "Bridge",
                "Denture",
                "Implant",
                "Veneer",
                "Retainer",
                "Night Guard",
                "Other",
            ]),
            crown_shades: strings(&[
                "A1", "A2", "A3", "A3.5", "A4", "B1", "B2", "B3", "B4", "C1", "C2", "C3", "C4", "D2",
                "D3", "D4",
            ]),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicInfo {
    pub name: String,
    /// Either empty or a `data:` URI.
    pub logo: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

impl ClinicInfo {
    pub fn starter() -> Self {
        Self {
            name: "Dr. Shawn's Clinic".to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientIdFormat {
    pub prefix: String,
    pub year_in_format: bool,
    pub digit_count: usize,
    pub separator: String,
}

impl PatientIdFormat {
    /// Widest zero padding a stored format may ask for.
    pub const MAX_DIGIT_COUNT: usize = 20;

    fn check(&self) -> Result<(), SettingError> {
        if (1..=Self::MAX_DIGIT_COUNT).contains(&self.digit_count) {
            Ok(())
        } else {
            Err(SettingError::OutOfRange {
                key: SettingKey::PatientIdFormat,
                field: "digitCount",
                detail: format!("must be between 1 and {}", Self::MAX_DIGIT_COUNT),
            })
        }
    }
}

impl Default for PatientIdFormat {
    fn default() -> Self {
        Self {
            prefix: "PT".to_string(),
            year_in_format: true,
            digit_count: 4,
            separator: "-".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingError {
    #[error("value for '{key}' has the wrong shape: {source}")]
    Shape {
        key: SettingKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("value for '{key}' has an out-of-range '{field}': {detail}")]
    OutOfRange {
        key: SettingKey,
        field: &'static str,
        detail: String,
    },
}

/// Typed view of a setting value.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    DropdownOptions(DropdownOptions),
    ClinicInfo(ClinicInfo),
    PatientIdFormat(PatientIdFormat),
    Other(JsonValue),
}

impl SettingValue {
    pub fn parse(key: &str, value: &JsonValue) -> Result<Self, SettingError> {
        let Some(known) = SettingKey::from_str(key) else {
            return Ok(SettingValue::Other(value.clone()));
        };
        let shape = |source| SettingError::Shape { key: known, source };
        Ok(match known {
            SettingKey::DropdownOptions => {
                SettingValue::DropdownOptions(serde_json::from_value(value.clone()).map_err(shape)?)
            }
            SettingKey::ClinicInfo => {
                SettingValue::ClinicInfo(serde_json::from_value(value.clone()).map_err(shape)?)
            }
            SettingKey::PatientIdFormat => {
                let format: PatientIdFormat = serde_json::from_value(value.clone()).map_err(shape)?;
                format.check()?;
                SettingValue::PatientIdFormat(format)
            }
        })
    }

    pub fn key(&self) -> Option<SettingKey> {
        match self {
            SettingValue::DropdownOptions(_) => Some(SettingKey::DropdownOptions),
            SettingValue::ClinicInfo(_) => Some(SettingKey::ClinicInfo),
            SettingValue::PatientIdFormat(_) => Some(SettingKey::PatientIdFormat),
            SettingValue::Other(_) => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        let encoded = match self {
            SettingValue::DropdownOptions(v) => serde_json::to_value(v),
            SettingValue::ClinicInfo(v) => serde_json::to_value(v),
            SettingValue::PatientIdFormat(v) => serde_json::to_value(v),
            SettingValue::Other(v) => return v.clone(),
        };
        encoded.unwrap_or(JsonValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_setting_shape"))]
pub struct NewSetting {
    #[validate(length(min = 1))]
    pub setting_key: String,
    pub setting_value: JsonValue,
    #[validate(length(min = 1))]
    pub category: String,
}

fn validate_setting_shape(setting: &NewSetting) -> Result<(), ValidationError> {
    SettingValue::parse(&setting.setting_key, &setting.setting_value)
        .map(|_| ())
        .map_err(|err| {
            let mut error = ValidationError::new("setting_shape");
            error.message = Some(err.to_string().into());
            error
        })
}

impl NewSetting {
    pub fn from_typed(value: SettingValue) -> Option<Self> {
        let key = value.key()?;
        Some(Self {
            setting_key: key.as_str().to_string(),
            setting_value: value.to_json(),
            category: key.category().to_string(),
        })
    }

    pub fn typed(&self) -> Result<SettingValue, SettingError> {
        SettingValue::parse(&self.setting_key, &self.setting_value)
    }

    /// The rows a fresh install is seeded with.
    pub fn defaults() -> Vec<NewSetting> {
        [
            SettingValue::DropdownOptions(DropdownOptions::starter()),
            SettingValue::ClinicInfo(ClinicInfo::starter()),
            SettingValue::PatientIdFormat(PatientIdFormat::default()),
        ]
        .into_iter()
        .filter_map(NewSetting::from_typed)
        .collect()
    }
}

pub type Setting = Record<NewSetting>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_keys_are_opaque() {
        let value = json!({"anything": [1, 2, 3]});
        assert_eq!(
            SettingValue::parse("printer_setup", &value).unwrap(),
            SettingValue::Other(value)
        );
    }

    #[test]
    fn patient_id_format_must_fit() {
        let setting = NewSetting {
            setting_key: "patient_id_format".to_string(),
            setting_value: json!({"prefix": "PT"}),
            category: "patient_id_format".to_string(),
        };
        assert!(setting.validate().is_err());

        let setting = NewSetting {
            setting_value: json!({"prefix": "DC", "yearInFormat": false, "digitCount": 5, "separator": "/"}),
            ..setting
        };
        assert!(setting.validate().is_ok());
    }

    #[test]
    fn patient_id_digit_count_is_bounded() {
        let value = |digits: usize| {
            json!({"prefix": "PT", "yearInFormat": true, "digitCount": digits, "separator": "-"})
        };
        for digits in [0, PatientIdFormat::MAX_DIGIT_COUNT + 1, 70000] {
            assert!(matches!(
                SettingValue::parse("patient_id_format", &value(digits)),
                Err(SettingError::OutOfRange { field: "digitCount", .. })
            ));
        }
        assert!(SettingValue::parse("patient_id_format", &value(PatientIdFormat::MAX_DIGIT_COUNT)).is_ok());
    }

    #[test]
    fn dropdown_options_keep_unknown_lists() {
        let value = json!({"medicalHistory": ["Asthma"], "implantBrands": ["Nobel"]});
        let SettingValue::DropdownOptions(options) = SettingValue::parse("dropdown_options", &value).unwrap()
        else {
            panic!("expected dropdown options");
        };
        assert_eq!(options.medical_history, vec!["Asthma"]);
        assert!(options.drug_allergy.is_empty());
        assert_eq!(options.extra.get("implantBrands"), Some(&json!(["Nobel"])));
        assert_eq!(SettingValue::DropdownOptions(options).to_json()["implantBrands"], json!(["Nobel"]));
    }

    #[test]
    fn defaults_cover_every_known_key() {
        let defaults = NewSetting::defaults();
        let keys: Vec<_> = defaults.iter().map(|s| s.setting_key.as_str()).collect();
        assert_eq!(keys, vec!["dropdown_options", "clinic_info", "patient_id_format"]);
        assert!(defaults.iter().all(|s| s.validate().is_ok()));
        assert_eq!(defaults[1].setting_value["name"], json!("Dr. Shawn's Clinic"));
    }
}
