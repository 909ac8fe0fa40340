//! Turns step configuration into the resolved canonical value.

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use step_form_util::{change_casing, type_of, CasingType, DEFAULT_CASING};

use crate::config::{FieldConfig, FieldLabel, StepConfig, StepsConfig};
use crate::error::FormError;
use crate::validator::{run_standard_validation, Validator};
use crate::values::{ResolvedField, ResolvedStep, StepValues};

/// Pattern every step key must match.
pub const STEP_KEY_PATTERN: &str = r"(?i-u)^step[0-9]+$";

fn step_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(STEP_KEY_PATTERN).unwrap())
}

pub fn is_valid_step_key(key: &str) -> bool {
    step_key_regex().is_match(key)
}

/// The number of a step key: `step3` → 3.
pub fn extract_number(key: &str) -> Result<u64, FormError> {
    if !is_valid_step_key(key) {
        return Err(FormError::configuration(format!(
            "\"{key}\" is not a valid step key, expected \"step\" followed by a number"
        )));
    }
    key[4..]
        .parse()
        .map_err(|_| FormError::configuration(format!("the step number of \"{key}\" is out of range")))
}

/// The label of a field: the explicit one, or `field_name` in `casing`.
pub fn create_field_label(
    label: Option<&FieldLabel>,
    field_name: &str,
    casing: CasingType,
) -> Result<String, FormError> {
    match label {
        Some(FieldLabel::Text(text)) if text.is_empty() => Err(FormError::configuration(format!(
            "the label of field \"{field_name}\" must not be empty, use false to derive it from the field name"
        ))),
        Some(FieldLabel::Text(text)) => Ok(text.clone()),
        Some(FieldLabel::Flag(true)) => Err(FormError::configuration(format!(
            "the label of field \"{field_name}\" must be a string or false, was true"
        ))),
        Some(FieldLabel::Flag(false)) | None => {
            let derived = change_casing(field_name, casing);
            if derived.is_empty() {
                return Err(FormError::configuration(format!(
                    "no label can be derived from field name \"{field_name}\", set an explicit label"
                )));
            }
            Ok(derived)
        }
    }
}

fn resolve_field(
    name: &str,
    field: &FieldConfig,
    default_value: Value,
    step_casing: CasingType,
) -> Result<ResolvedField, FormError> {
    let casing = field.name_transform_casing.unwrap_or(step_casing);
    Ok(ResolvedField {
        default_value,
        label: create_field_label(field.label.as_ref(), name, casing)?,
        field_type: field.field_type.unwrap_or_default(),
        name_transform_casing: casing,
    })
}

fn check_field_name(step_key: &str, name: &str) -> Result<(), FormError> {
    if name.is_empty() {
        return Err(FormError::configuration(format!(
            "step \"{step_key}\" has a field with an empty name"
        )));
    }
    if name.contains(step_form_path::PATH_SEPARATOR) {
        return Err(FormError::configuration(format!(
            "field \"{name}\" of step \"{step_key}\" must not contain \"{}\"",
            step_form_path::PATH_SEPARATOR
        )));
    }
    Ok(())
}

fn validated_defaults(
    step_key: &str,
    fields: &IndexMap<String, FieldConfig>,
    validator: &dyn Validator,
) -> Result<Map<String, Value>, FormError> {
    let raw: Map<String, Value> = fields
        .iter()
        .map(|(name, field)| (name.clone(), field.default_value.clone()))
        .collect();
    let validated = run_standard_validation(validator, &Value::Object(raw))?;
    let Value::Object(validated) = validated else {
        return Err(FormError::configuration(format!(
            "the validated fields of step \"{step_key}\" must be an object, was {}",
            type_of(&validated)
        )));
    };
    if let Some(unknown) = validated.keys().find(|name| !fields.contains_key(*name)) {
        return Err(FormError::configuration(format!(
            "the validator of step \"{step_key}\" returned \"{unknown}\", which is not a configured field"
        )));
    }
    Ok(validated)
}

/// Resolve the fields of one step.
///
/// When a validator is present the map of defaults runs through it first and
/// each validated default replaces the configured one.
pub fn create_step_fields(
    step_key: &str,
    step: &StepConfig,
    step_casing: CasingType,
) -> Result<IndexMap<String, ResolvedField>, FormError> {
    if step.fields.is_empty() {
        return Err(FormError::configuration(format!(
            "step \"{step_key}\" must define at least one field"
        )));
    }
    for name in step.fields.keys() {
        check_field_name(step_key, name)?;
    }
    let mut validated = match &step.validate_fields {
        Some(validator) => Some(validated_defaults(step_key, &step.fields, validator.as_ref())?),
        None => None,
    };
    step.fields
        .iter()
        .map(|(name, field)| {
            let default_value = validated
                .as_mut()
                .and_then(|map| map.remove(name))
                .unwrap_or_else(|| field.default_value.clone());
            Ok((name.clone(), resolve_field(name, field, default_value, step_casing)?))
        })
        .collect()
}

/// Resolve every step, in configuration order.
pub fn create_step(steps: &StepsConfig) -> Result<IndexMap<String, ResolvedStep>, FormError> {
    if steps.is_empty() {
        return Err(FormError::configuration("at least one step must be configured"));
    }
    steps
        .iter()
        .map(|(key, step)| {
            if !is_valid_step_key(key) {
                return Err(FormError::configuration(format!(
                    "\"{key}\" is not a valid step key, expected \"step\" followed by a number (e.g. \"step1\")"
                )));
            }
            let casing = step.name_transform_casing.unwrap_or(DEFAULT_CASING);
            let resolved = ResolvedStep {
                title: step.title.clone(),
                description: step.description.clone(),
                name_transform_casing: casing,
                fields: create_step_fields(key, step, casing)?,
            };
            Ok((key.clone(), resolved))
        })
        .collect()
}

/// Resolve the configuration straight into a canonical value.
pub fn resolve_values(steps: &StepsConfig) -> Result<StepValues, FormError> {
    let resolved = create_step(steps)?;
    let mut values = StepValues::new();
    for (key, step) in &resolved {
        values.insert(key.clone(), step.to_value());
    }
    tracing::debug!(steps = values.len(), "resolved step configuration");
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldConfig, FieldType};
    use crate::validator::{ValidationIssue, ValidationResult};
    use serde_json::json;

    fn steps(step: StepConfig) -> StepsConfig {
        let mut steps = StepsConfig::new();
        steps.insert("step1".to_string(), step);
        steps
    }

    #[test]
    fn test_step_keys() {
        assert!(is_valid_step_key("step1"));
        assert!(is_valid_step_key("STEP12"));
        assert!(!is_valid_step_key("step"));
        assert!(!is_valid_step_key("step1a"));
        assert!(!is_valid_step_key("first"));
        assert_eq!(extract_number("step3").unwrap(), 3);
        assert_eq!(extract_number("Step10").unwrap(), 10);
        assert!(extract_number("intro").is_err());
    }

    #[test]
    fn test_step_keys_are_ascii_only() {
        assert!(!is_valid_step_key("step\u{0661}"));
        assert!(!is_valid_step_key("\u{017F}tep1"));
        assert!(!is_valid_step_key("step\u{FF11}"));
        let err = create_step(&{
            let mut steps = StepsConfig::new();
            steps.insert("step\u{0661}".to_string(), StepConfig::new("A").field("a", FieldConfig::new("")));
            steps
        })
        .unwrap_err();
        assert!(matches!(err, FormError::Configuration(_)));
    }

    #[test]
    fn test_default_label_is_title_case() {
        assert_eq!(create_field_label(None, "firstName", DEFAULT_CASING).unwrap(), "First Name");
        assert_eq!(
            create_field_label(Some(&FieldLabel::Flag(false)), "first_name", CasingType::Upper).unwrap(),
            "FIRST NAME"
        );
        assert_eq!(
            create_field_label(Some(&FieldLabel::Text("Given name".into())), "firstName", DEFAULT_CASING)
                .unwrap(),
            "Given name"
        );
    }

    #[test]
    fn test_invalid_labels() {
        assert!(create_field_label(Some(&FieldLabel::Flag(true)), "a", DEFAULT_CASING).is_err());
        assert!(create_field_label(Some(&FieldLabel::Text(String::new())), "a", DEFAULT_CASING).is_err());
    }

    #[test]
    fn test_field_casing_overrides_step_casing() {
        let step = StepConfig::new("Profile")
            .casing(CasingType::Snake)
            .field("firstName", FieldConfig::new(""))
            .field("lastName", FieldConfig::new("").casing(CasingType::Kebab));
        let resolved = create_step(&steps(step)).unwrap();
        let fields = &resolved["step1"].fields;
        assert_eq!(fields["firstName"].label, "first_name");
        assert_eq!(fields["firstName"].name_transform_casing, CasingType::Snake);
        assert_eq!(fields["lastName"].label, "last-name");
        assert_eq!(fields["lastName"].field_type, FieldType::String);
    }

    #[test]
    fn test_invalid_configurations() {
        assert!(create_step(&StepsConfig::new()).is_err());

        let mut bad_key = StepsConfig::new();
        bad_key.insert("intro".to_string(), StepConfig::new("A").field("a", FieldConfig::new("")));
        let err = create_step(&bad_key).unwrap_err();
        assert!(err.to_string().contains("\"intro\""));

        assert!(create_step(&steps(StepConfig::new("Empty"))).is_err());
        assert!(create_step(&steps(StepConfig::new("Dots").field("a.b", FieldConfig::new("")))).is_err());
    }

    #[test]
    fn test_validator_replaces_defaults() {
        let step = StepConfig::new("Profile")
            .field("age", FieldConfig::new("25").field_type(FieldType::Number))
            .field("name", FieldConfig::new("ann"))
            .validate_fields(|data: &Value| {
                let age = data["age"].as_str().and_then(|s| s.parse::<i64>().ok());
                match age {
                    Some(age) => ValidationResult::Valid(json!({ "age": age })),
                    None => ValidationResult::Invalid(vec![ValidationIssue::new("not a number").at(["age"])]),
                }
            });
        let resolved = create_step(&steps(step)).unwrap();
        assert_eq!(resolved["step1"].fields["age"].default_value, json!(25));
        assert_eq!(resolved["step1"].fields["name"].default_value, json!("ann"));
    }

    #[test]
    fn test_validator_failures() {
        let failing = StepConfig::new("A")
            .field("age", FieldConfig::new("x"))
            .validate_fields(|_: &Value| ValidationResult::Invalid(vec![ValidationIssue::new("bad")]));
        assert!(matches!(create_step(&steps(failing)), Err(FormError::Validation(_))));

        let not_object = StepConfig::new("A")
            .field("age", FieldConfig::new("x"))
            .validate_fields(|_: &Value| ValidationResult::Valid(json!([1])));
        let err = create_step(&steps(not_object)).unwrap_err();
        assert!(err.to_string().contains("was array"));

        let unknown = StepConfig::new("A")
            .field("age", FieldConfig::new("x"))
            .validate_fields(|_: &Value| ValidationResult::Valid(json!({"height": 1})));
        assert!(create_step(&steps(unknown)).unwrap_err().to_string().contains("\"height\""));
    }

    #[test]
    fn test_resolve_values_keeps_order() {
        let mut config = StepsConfig::new();
        config.insert("step2".to_string(), StepConfig::new("B").field("b", FieldConfig::new(1)));
        config.insert("step1".to_string(), StepConfig::new("A").field("a", FieldConfig::new(true)));
        let values = resolve_values(&config).unwrap();
        assert_eq!(values.key_list(), vec!["step2", "step1"]);
        assert_eq!(values.get("step1").unwrap()["fields"]["a"]["label"], json!("A"));
    }
}
