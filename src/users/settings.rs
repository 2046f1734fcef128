use crate::assist_db::db_interfaces::AssistDb;
use crate::error::AssistError;
use crate::forms::settings::SETTINGS_FIELDS;
use crate::forms::CleanedData;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A stored setting value, decoded as leniently as possible. Stored
/// strings that are neither booleans nor numbers are kept as they are.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl SettingValue {
    pub fn is_truthy(&self) -> bool {
        match self {
            SettingValue::Bool(value) => *value,
            SettingValue::Number(value) => *value != 0.0,
            SettingValue::String(value) => !value.is_empty(),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SettingValue::Bool(value) => write!(f, "{}", encode_bool(*value)),
            SettingValue::Number(value) => write!(f, "{value}"),
            SettingValue::String(value) => write!(f, "{value}"),
        }
    }
}

pub fn encode_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

pub fn decode_setting_value(raw: &str) -> SettingValue {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return SettingValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return SettingValue::Bool(false);
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => SettingValue::Number(number),
        _ => SettingValue::String(raw.to_string()),
    }
}

pub async fn save_for_user(
    assist_db: &dyn AssistDb,
    user_id: i32,
    cleaned: &CleanedData,
) -> Result<(), AssistError> {
    for (name, _label) in SETTINGS_FIELDS {
        let value = encode_bool(cleaned.bool(name));
        assist_db.upsert_setting(user_id, name, value).await?;
    }
    debug!("Saved settings for user {user_id}");
    Ok(())
}

pub async fn load_initial(
    assist_db: &dyn AssistDb,
    user_id: i32,
) -> Result<BTreeMap<String, SettingValue>, AssistError> {
    Ok(assist_db
        .list_settings(user_id)
        .await?
        .into_iter()
        .map(|setting| (setting.name, decode_setting_value(&setting.value)))
        .collect())
}

/// The checkbox state of every toggle: the stored value if there is one,
/// otherwise on.
pub fn initial_toggles(stored: &BTreeMap<String, SettingValue>) -> BTreeMap<String, bool> {
    SETTINGS_FIELDS
        .iter()
        .map(|(name, _label)| {
            let value = stored.get(*name).map(SettingValue::is_truthy).unwrap_or(true);
            (name.to_string(), value)
        })
        .collect()
}
