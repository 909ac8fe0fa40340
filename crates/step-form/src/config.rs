//! Step and field configuration.
//!
//! Configuration can be built programmatically or decoded from JSON with
//! camelCase keys. Validators are attached in code only.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use step_form_util::CasingType;

use crate::error::FormError;
use crate::validator::{SharedValidator, Validator};

/// Input type tag of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldType {
    #[default]
    #[serde(rename = "string")]
    String,
    #[serde(rename = "string.phone")]
    StringPhone,
    #[serde(rename = "string.email")]
    StringEmail,
    #[serde(rename = "string.time")]
    StringTime,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "number.counter")]
    NumberCounter,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "dateTime")]
    DateTime,
    #[serde(rename = "boolean.switch")]
    BooleanSwitch,
}

pub const FIELD_TYPES: [FieldType; 9] = [
    FieldType::String,
    FieldType::StringPhone,
    FieldType::StringEmail,
    FieldType::StringTime,
    FieldType::Number,
    FieldType::NumberCounter,
    FieldType::Date,
    FieldType::DateTime,
    FieldType::BooleanSwitch,
];

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::StringPhone => "string.phone",
            FieldType::StringEmail => "string.email",
            FieldType::StringTime => "string.time",
            FieldType::Number => "number",
            FieldType::NumberCounter => "number.counter",
            FieldType::Date => "date",
            FieldType::DateTime => "dateTime",
            FieldType::BooleanSwitch => "boolean.switch",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FIELD_TYPES
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| FormError::configuration(format!("unknown field type \"{s}\"")))
    }
}

/// An explicit label, or `false` to fall back to the derived one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldLabel {
    Text(String),
    Flag(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldConfig {
    pub default_value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<FieldLabel>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_transform_casing: Option<CasingType>,
}

impl FieldConfig {
    pub fn new(default_value: impl Into<Value>) -> Self {
        Self {
            default_value: default_value.into(),
            label: None,
            field_type: None,
            name_transform_casing: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(FieldLabel::Text(label.into()));
        self
    }

    /// Explicitly opt out of a custom label.
    pub fn no_label(mut self) -> Self {
        self.label = Some(FieldLabel::Flag(false));
        self
    }

    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn casing(mut self, casing: CasingType) -> Self {
        self.name_transform_casing = Some(casing);
        self
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StepConfig {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_transform_casing: Option<CasingType>,
    /// Runs over the map of field defaults before they are resolved.
    #[serde(skip)]
    pub validate_fields: Option<SharedValidator>,
}

impl StepConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            fields: IndexMap::new(),
            name_transform_casing: None,
            validate_fields: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, field: FieldConfig) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn casing(mut self, casing: CasingType) -> Self {
        self.name_transform_casing = Some(casing);
        self
    }

    pub fn validate_fields(mut self, validator: impl Validator + 'static) -> Self {
        self.validate_fields = Some(Rc::new(validator));
        self
    }
}

impl fmt::Debug for StepConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepConfig")
            .field("title", &self.title)
            .field("description", &self.description)
            .field("fields", &self.fields)
            .field("name_transform_casing", &self.name_transform_casing)
            .field("validate_fields", &self.validate_fields.is_some())
            .finish()
    }
}

/// Step key → step configuration, in declaration order.
pub type StepsConfig = IndexMap<String, StepConfig>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchemaConfig {
    pub steps: StepsConfig,
}

impl SchemaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, key: impl Into<String>, step: StepConfig) -> Self {
        self.steps.insert(key.into(), step);
        self
    }

    /// Decode a configuration document.
    ///
    /// # Example
    ///
    /// ```
    /// use step_form::config::{FieldType, SchemaConfig};
    ///
    /// let config = SchemaConfig::from_json_str(r#"{
    ///     "steps": {
    ///         "step1": {
    ///             "title": "Contact",
    ///             "fields": { "phone": { "defaultValue": "", "type": "string.phone" } }
    ///         }
    ///     }
    /// }"#).unwrap();
    /// assert_eq!(config.steps["step1"].fields["phone"].field_type, Some(FieldType::StringPhone));
    /// ```
    pub fn from_json_str(input: &str) -> Result<Self, FormError> {
        serde_json::from_str(input)
            .map_err(|err| FormError::configuration(format!("invalid schema configuration: {err}")))
    }

    pub fn from_value(value: Value) -> Result<Self, FormError> {
        serde_json::from_value(value)
            .map_err(|err| FormError::configuration(format!("invalid schema configuration: {err}")))
    }
}
