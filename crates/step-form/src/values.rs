use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::rc::Rc;
use step_form_path::{create_deep, parse_path, DeepPath};
use step_form_util::CasingType;

use crate::config::FieldType;
use crate::error::FormError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedField {
    pub default_value: Value,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub name_transform_casing: CasingType,
}

impl ResolvedField {
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("defaultValue".to_string(), self.default_value.clone());
        map.insert("label".to_string(), Value::String(self.label.clone()));
        map.insert("type".to_string(), Value::String(self.field_type.as_str().to_string()));
        map.insert(
            "nameTransformCasing".to_string(),
            Value::String(self.name_transform_casing.as_str().to_string()),
        );
        Value::Object(map)
    }
}

/// Typed view of one step's data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStep {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub name_transform_casing: CasingType,
    pub fields: IndexMap<String, ResolvedField>,
}

impl ResolvedStep {
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("title".to_string(), Value::String(self.title.clone()));
        if let Some(description) = &self.description {
            map.insert("description".to_string(), Value::String(description.clone()));
        }
        map.insert(
            "nameTransformCasing".to_string(),
            Value::String(self.name_transform_casing.as_str().to_string()),
        );
        let fields: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, field)| (name.clone(), field.to_value()))
            .collect();
        map.insert("fields".to_string(), Value::Object(fields));
        Value::Object(map)
    }

    /// Read step data back into the typed view.
    ///
    /// Fails when an updater has replaced metadata with values of another
    /// type (a numeric label, an unknown casing) or emptied a label.
    pub fn from_value(value: &Value) -> Result<Self, FormError> {
        let step: ResolvedStep = serde_json::from_value(value.clone()).map_err(|err| {
            FormError::shape(format!("step data does not match the resolved step shape: {err}"))
        })?;
        if let Some((name, _)) = step.fields.iter().find(|(_, field)| field.label.is_empty()) {
            return Err(FormError::shape(format!(
                "step data does not match the resolved step shape: the label of \"{name}\" is empty"
            )));
        }
        Ok(step)
    }
}

/// Leaf paths of step data, with every field's `defaultValue` counted as one
/// leaf whatever its JSON type.
///
/// Two versions of a step have the same shape when these sets are equal, so
/// a default value may change from `{}` to an object with keys.
pub fn step_shape_paths(step: &Value) -> Result<Vec<DeepPath>, FormError> {
    let mut paths: IndexSet<DeepPath> = IndexSet::new();
    for path in create_deep(step)? {
        let shape = match parse_path(&path).as_slice() {
            ["fields", name, "defaultValue", _, ..] => format!("fields.{name}.defaultValue"),
            _ => path.clone(),
        };
        paths.insert(shape);
    }
    Ok(paths.into_iter().collect())
}

/// The canonical value: step key → step data, in configuration order.
///
/// Each step is held behind its own `Rc`, so replacing one step shares the
/// others with the previous value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepValues {
    steps: IndexMap<String, Rc<Value>>,
}

impl StepValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.steps.insert(key.into(), Rc::new(value));
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.steps.get(key).map(Rc::as_ref)
    }

    pub fn get_shared(&self, key: &str) -> Option<Rc<Value>> {
        self.steps.get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.steps.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }

    pub fn key_list(&self) -> Vec<String> {
        self.steps.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.steps.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// A new value with the slot for `key` replaced. Key order is kept.
    pub fn with_step(&self, key: &str, value: Value) -> StepValues {
        let mut next = self.clone();
        if let Some(slot) = next.steps.get_mut(key) {
            *slot = Rc::new(value);
        }
        next
    }

    /// Whether both values hold the very same allocation for `key`.
    pub fn shares_step(&self, other: &StepValues, key: &str) -> bool {
        match (self.steps.get(key), other.steps.get(key)) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.steps
                .iter()
                .map(|(k, v)| (k.clone(), v.as_ref().clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolved() -> ResolvedStep {
        let mut fields = IndexMap::new();
        fields.insert(
            "firstName".to_string(),
            ResolvedField {
                default_value: json!(""),
                label: "First Name".to_string(),
                field_type: FieldType::String,
                name_transform_casing: CasingType::Title,
            },
        );
        ResolvedStep {
            title: "Profile".to_string(),
            description: None,
            name_transform_casing: CasingType::Title,
            fields,
        }
    }

    #[test]
    fn test_to_value_matches_serde() {
        let step = resolved();
        assert_eq!(step.to_value(), serde_json::to_value(&step).unwrap());
        assert_eq!(
            step.to_value(),
            json!({
                "title": "Profile",
                "nameTransformCasing": "title",
                "fields": {"firstName": {
                    "defaultValue": "",
                    "label": "First Name",
                    "type": "string",
                    "nameTransformCasing": "title"
                }}
            })
        );
    }

    #[test]
    fn test_from_value_roundtrip() {
        let step = resolved();
        assert_eq!(ResolvedStep::from_value(&step.to_value()).unwrap(), step);
        assert!(ResolvedStep::from_value(&json!({"title": 3})).is_err());

        let mut numeric_label = step.to_value();
        numeric_label["fields"]["firstName"]["label"] = json!(42);
        assert!(matches!(
            ResolvedStep::from_value(&numeric_label),
            Err(FormError::ShapeMismatch { .. })
        ));
        let mut empty_label = step.to_value();
        empty_label["fields"]["firstName"]["label"] = json!("");
        assert!(ResolvedStep::from_value(&empty_label).is_err());
    }

    #[test]
    fn test_step_shape_paths_stop_at_default_values() {
        let mut step = resolved().to_value();
        let flat = step_shape_paths(&step).unwrap();
        assert!(flat.contains(&"fields.firstName.defaultValue".to_string()));

        step["fields"]["firstName"]["defaultValue"] = json!({"given": "Ada", "other": {"x": 1}});
        assert_eq!(step_shape_paths(&step).unwrap(), flat);

        step["fields"]["firstName"]["hint"] = json!("x");
        assert!(step_shape_paths(&step)
            .unwrap()
            .contains(&"fields.firstName.hint".to_string()));
    }

    #[test]
    fn test_with_step_shares_untouched_slots() {
        let mut values = StepValues::new();
        values.insert("step1", json!({"title": "A"}));
        values.insert("step2", json!({"title": "B"}));
        let next = values.with_step("step1", json!({"title": "A2"}));
        assert!(next.shares_step(&values, "step2"));
        assert!(!next.shares_step(&values, "step1"));
        assert_eq!(next.get("step1"), Some(&json!({"title": "A2"})));
        assert_eq!(values.get("step1"), Some(&json!({"title": "A"})));
        assert_eq!(next.key_list(), vec!["step1", "step2"]);
    }
}
