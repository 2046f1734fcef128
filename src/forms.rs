//! Declarative validation for the account forms.
//!
//! A form lists its fields as [`FieldSpec`]s. Validating a [`FormInput`]
//! runs the built-in checks of every field (required, length bounds, type
//! coercion), then the form's own rule for each field that passed them.
//! The result is either the [`CleanedData`] of every field or the
//! [`FormErrors`] of every field that failed; there is no partial result.

pub mod avatar;
pub mod profile;
pub mod settings;
pub mod username;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use url::Url;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const MIN_LENGTH_MESSAGE: &str =
    "Ensure this value has at least {limit_value} characters (it has {show_value}).";
pub const MAX_LENGTH_MESSAGE: &str =
    "Ensure this value has at most {limit_value} characters (it has {show_value}).";
pub const INVALID_URL_MESSAGE: &str = "Enter a valid URL.";
pub const INVALID_DATE_MESSAGE: &str = "Enter a valid date.";
pub const INVALID_IMAGE_MESSAGE: &str = "Upload a valid image. The file you uploaded was either \
     not an image or a corrupted image.";

#[derive(Clone, Debug, PartialEq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Submitted values and files, keyed by field name.
#[derive(Clone, Debug, Default)]
pub struct FormInput {
    pub values: HashMap<String, String>,
    pub files: HashMap<String, UploadedFile>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.files.insert(name.to_string(), file);
        self
    }
}

impl From<HashMap<String, String>> for FormInput {
    fn from(values: HashMap<String, String>) -> Self {
        FormInput {
            values,
            files: HashMap::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Url,
    Boolean,
    Date,
    Image,
}

/// Replacement messages; `{limit_value}` and `{show_value}` are filled in
/// for the length messages.
#[derive(Clone, Debug, Default)]
pub struct FieldMessages {
    pub required: Option<&'static str>,
    pub min_length: Option<&'static str>,
    pub max_length: Option<&'static str>,
}

#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub messages: FieldMessages,
}

impl FieldSpec {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldSpec {
            name,
            kind,
            required: false,
            min_length: None,
            max_length: None,
            messages: FieldMessages::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn messages(mut self, messages: FieldMessages) -> Self {
        self.messages = messages;
        self
    }

    fn required_message(&self) -> String {
        self.messages.required.unwrap_or(REQUIRED_MESSAGE).to_string()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CleanedValue {
    Text(String),
    Bool(bool),
    Date(Option<NaiveDate>),
    File(Option<UploadedFile>),
}

impl CleanedValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CleanedValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CleanedValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CleanedValue::Date(value) => *value,
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            CleanedValue::File(value) => value.as_ref(),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CleanedData(BTreeMap<String, CleanedValue>);

impl CleanedData {
    pub fn get(&self, name: &str) -> Option<&CleanedValue> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Text fields clean to `""` when left empty.
    pub fn text(&self, name: &str) -> String {
        self.get(name)
            .and_then(CleanedValue::as_text)
            .unwrap_or_default()
            .to_string()
    }

    pub fn bool(&self, name: &str) -> bool {
        self.get(name)
            .and_then(CleanedValue::as_bool)
            .unwrap_or(false)
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.get(name).and_then(CleanedValue::as_date)
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.get(name).and_then(CleanedValue::as_file)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: String) {
        self.0.entry(field.to_string()).or_default().push(message);
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

pub trait Form {
    fn fields(&self) -> Vec<FieldSpec>;

    /// Runs for a field only once its built-in checks passed.
    fn clean_field(&self, _name: &str, value: CleanedValue) -> Result<CleanedValue, String> {
        Ok(value)
    }

    fn validate(&self, input: &FormInput) -> Result<CleanedData, FormErrors> {
        let mut cleaned = BTreeMap::new();
        let mut errors = FormErrors::default();

        for spec in self.fields() {
            let value = match clean_builtin(&spec, input) {
                Ok(value) => value,
                Err(messages) => {
                    for message in messages {
                        errors.add(spec.name, message);
                    }
                    continue;
                }
            };
            match self.clean_field(spec.name, value) {
                Ok(value) => {
                    cleaned.insert(spec.name.to_string(), value);
                }
                Err(message) => errors.add(spec.name, message),
            }
        }

        if errors.is_empty() {
            Ok(CleanedData(cleaned))
        } else {
            Err(errors)
        }
    }
}

fn fill_limits(template: &str, limit: usize, show: usize) -> String {
    template
        .replace("{limit_value}", &limit.to_string())
        .replace("{show_value}", &show.to_string())
}

fn parse_bool(value: Option<&String>) -> bool {
    match value.map(|value| value.trim()) {
        None | Some("") => false,
        Some(value) => !matches!(value.to_lowercase().as_str(), "false" | "0" | "off"),
    }
}

/// Adds `http://` to scheme-less input before parsing, so `example.com`
/// is accepted as a website.
fn clean_url(value: &str) -> Option<String> {
    let value = if value.contains("://") {
        value.to_string()
    } else {
        format!("http://{value}")
    };
    match Url::parse(&value) {
        Ok(url) if (url.scheme() == "http" || url.scheme() == "https") && url.has_host() => {
            Some(value)
        }
        _ => None,
    }
}

/// Accepts full dates and `YYYY-MM`, which means the first of the month.
fn clean_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d"))
        .ok()
}

fn clean_builtin(spec: &FieldSpec, input: &FormInput) -> Result<CleanedValue, Vec<String>> {
    match spec.kind {
        FieldKind::Boolean => {
            let value = parse_bool(input.values.get(spec.name));
            if spec.required && !value {
                return Err(vec![spec.required_message()]);
            }
            Ok(CleanedValue::Bool(value))
        }
        FieldKind::Image => {
            let file = input
                .files
                .get(spec.name)
                .filter(|file| !file.data.is_empty());
            match file {
                None if spec.required => Err(vec![spec.required_message()]),
                None => Ok(CleanedValue::File(None)),
                // A recognized header is not enough; the pixels must decode.
                Some(file) => match image::load_from_memory(&file.data) {
                    Ok(_) => Ok(CleanedValue::File(Some(file.clone()))),
                    Err(_) => Err(vec![INVALID_IMAGE_MESSAGE.to_string()]),
                },
            }
        }
        FieldKind::Text | FieldKind::Url | FieldKind::Date => {
            let value = input
                .values
                .get(spec.name)
                .map(|value| value.trim())
                .unwrap_or_default();
            if value.is_empty() {
                if spec.required {
                    return Err(vec![spec.required_message()]);
                }
                return Ok(match spec.kind {
                    FieldKind::Date => CleanedValue::Date(None),
                    _ => CleanedValue::Text(String::new()),
                });
            }

            if spec.kind == FieldKind::Date {
                return clean_date(value)
                    .map(|date| CleanedValue::Date(Some(date)))
                    .ok_or_else(|| vec![INVALID_DATE_MESSAGE.to_string()]);
            }

            let mut messages = vec![];
            let length = value.chars().count();
            if let Some(min_length) = spec.min_length {
                if length < min_length {
                    let template = spec.messages.min_length.unwrap_or(MIN_LENGTH_MESSAGE);
                    messages.push(fill_limits(template, min_length, length));
                }
            }
            if let Some(max_length) = spec.max_length {
                if length > max_length {
                    let template = spec.messages.max_length.unwrap_or(MAX_LENGTH_MESSAGE);
                    messages.push(fill_limits(template, max_length, length));
                }
            }

            let value = if spec.kind == FieldKind::Url {
                match clean_url(value) {
                    Some(url) => url,
                    None => {
                        messages.push(INVALID_URL_MESSAGE.to_string());
                        value.to_string()
                    }
                }
            } else {
                value.to_string()
            };

            if messages.is_empty() {
                Ok(CleanedValue::Text(value))
            } else {
                Err(messages)
            }
        }
    }
}
