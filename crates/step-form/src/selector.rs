//! Step and field selectors, decided once at the API boundary.

use indexmap::IndexMap;
use serde_json::Value;
use step_form_path::{truthy_leaf_paths, validate_path, DeepPath};
use step_form_util::{is_non_empty_object, type_of};

use crate::error::FormError;

/// Which steps a context or helper covers.
#[derive(Debug, Clone, PartialEq)]
pub enum StepSelector {
    All,
    /// Listed keys, in the order given.
    List(Vec<String>),
    /// Keys of an object; the values are ignored.
    Map(IndexMap<String, Value>),
}

impl StepSelector {
    pub fn list<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StepSelector::List(keys.into_iter().map(Into::into).collect())
    }

    /// Parse `"all"`, an array of step keys, or an object keyed by step.
    pub fn from_value(value: &Value) -> Result<Self, FormError> {
        match value {
            Value::String(s) if s == "all" => Ok(StepSelector::All),
            Value::String(s) => Err(FormError::selector(
                format!("[ctx]: the only string selector is \"all\", was \"{s}\""),
                vec![s.clone()],
            )),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        FormError::type_error("[ctx]: step selectors must only contain step keys", type_of(item))
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(StepSelector::List),
            Value::Object(map) => Ok(StepSelector::Map(
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            )),
            other => Err(FormError::type_error(
                "[ctx]: the step selector must be \"all\", an array of step keys or an object keyed by step",
                type_of(other),
            )),
        }
    }

    /// The keys the selector names, `None` for `All`.
    pub fn named_keys(&self) -> Option<Vec<&str>> {
        match self {
            StepSelector::All => None,
            StepSelector::List(keys) => Some(keys.iter().map(String::as_str).collect()),
            StepSelector::Map(map) => Some(map.keys().map(String::as_str).collect()),
        }
    }
}

/// Which parts of a step an update or reset touches.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldSelection {
    #[default]
    All,
    Paths(Vec<DeepPath>),
    /// Object mirroring the step with boolean leaves.
    Tree(Value),
}

impl FieldSelection {
    pub fn paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldSelection::Paths(paths.into_iter().map(Into::into).collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, FieldSelection::All)
    }

    /// Name of the selection kind, as it appears in logs.
    pub fn mode(&self) -> &'static str {
        match self {
            FieldSelection::All => "all",
            FieldSelection::Paths(_) => "paths",
            FieldSelection::Tree(_) => "tree",
        }
    }

    /// Parse `"all"`, an array of deep paths, or a boolean tree.
    pub fn from_value(value: Value) -> Result<Self, FormError> {
        const SHAPES: &str =
            "\"fields\" must be \"all\", an array of deep paths or an object with boolean leaves";
        if is_non_empty_object(&value) {
            return Ok(FieldSelection::Tree(value));
        }
        match value {
            Value::String(s) if s == "all" => Ok(FieldSelection::All),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(path) => Ok(path),
                    other => Err(FormError::type_error(
                        "every entry of \"fields\" must be a deep path string",
                        type_of(&other),
                    )),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(FieldSelection::Paths),
            other => Err(FormError::type_error(SHAPES, type_of(&other))),
        }
    }

    /// The selected paths, `None` when the whole step is selected.
    pub(crate) fn selected_paths(&self, op: &str) -> Result<Option<Vec<DeepPath>>, FormError> {
        let paths = match self {
            FieldSelection::All => return Ok(None),
            FieldSelection::Paths(paths) => paths.clone(),
            FieldSelection::Tree(tree) => {
                let paths = truthy_leaf_paths(tree)?;
                if paths.is_empty() {
                    return Err(FormError::selector(
                        format!("{op}: the \"fields\" object does not select any path"),
                        Vec::new(),
                    ));
                }
                paths
            }
        };
        for path in &paths {
            validate_path(path)?;
        }
        Ok(Some(paths))
    }
}

impl From<Vec<String>> for FieldSelection {
    fn from(paths: Vec<String>) -> Self {
        FieldSelection::Paths(paths)
    }
}

impl From<&[&str]> for FieldSelection {
    fn from(paths: &[&str]) -> Self {
        FieldSelection::paths(paths.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_selector_from_value() {
        assert_eq!(StepSelector::from_value(&json!("all")).unwrap(), StepSelector::All);
        assert_eq!(
            StepSelector::from_value(&json!(["step2", "step1"])).unwrap(),
            StepSelector::list(["step2", "step1"])
        );
        let map = StepSelector::from_value(&json!({"step1": true})).unwrap();
        assert_eq!(map.named_keys(), Some(vec!["step1"]));
        assert!(matches!(
            StepSelector::from_value(&json!(3)),
            Err(FormError::Type { received: "number", .. })
        ));
        assert!(matches!(
            StepSelector::from_value(&json!("some")),
            Err(FormError::Selector { .. })
        ));
    }

    #[test]
    fn test_field_selection_from_value() {
        assert!(FieldSelection::from_value(json!("all")).unwrap().is_all());
        assert_eq!(
            FieldSelection::from_value(json!(["title"])).unwrap(),
            FieldSelection::paths(["title"])
        );
        let err = FieldSelection::from_value(json!(42)).unwrap_err();
        assert!(matches!(err, FormError::Type { received: "number", .. }));
        assert!(FieldSelection::from_value(json!({})).is_err());
        assert!(FieldSelection::from_value(json!([1])).is_err());
    }

    #[test]
    fn test_tree_selection_paths() {
        let tree = FieldSelection::Tree(json!({
            "title": false,
            "fields": {"firstName": {"defaultValue": true, "label": false}}
        }));
        assert_eq!(
            tree.selected_paths("[update]").unwrap(),
            Some(vec!["fields.firstName.defaultValue".to_string()])
        );
        let none = FieldSelection::Tree(json!({"title": false}));
        assert!(matches!(none.selected_paths("[update]"), Err(FormError::Selector { .. })));
        let bad = FieldSelection::Tree(json!({"title": "yes"}));
        assert!(matches!(bad.selected_paths("[update]"), Err(FormError::Path(_))));
    }

    #[test]
    fn test_mode_names_the_selection_kind() {
        assert_eq!(FieldSelection::All.mode(), "all");
        assert_eq!(FieldSelection::paths(["title"]).mode(), "paths");
        assert_eq!(FieldSelection::Tree(json!({"title": true})).mode(), "tree");
    }

    #[test]
    fn test_malformed_paths_rejected() {
        let sel = FieldSelection::paths(["fields..label"]);
        assert!(matches!(sel.selected_paths("[reset]"), Err(FormError::Path(_))));
        assert_eq!(FieldSelection::All.selected_paths("[reset]").unwrap(), None);
    }
}
