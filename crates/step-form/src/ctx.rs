//! Cross-step context: read-only views of selected steps.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::rc::Rc;
use step_form_path::{compare_partial_array, print_errors};
use step_form_util::type_of;

use crate::error::FormError;
use crate::selector::StepSelector;
use crate::values::StepValues;

/// Step key → step data for the selected steps, plus any extra entries
/// contributed by a `ctx_data` callback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepCtx {
    entries: IndexMap<String, Value>,
}

impl StepCtx {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }
}

/// Callback contributing extra context entries. It receives the steps that
/// are not part of the selection.
pub type CtxData = Rc<dyn Fn(&StepCtx) -> Value>;

/// The step keys a selector resolves to, in selector order.
///
/// Every invalid or duplicated key is reported, not just the first.
pub fn selected_keys(values: &StepValues, selector: &StepSelector) -> Result<Vec<String>, FormError> {
    let Some(named) = selector.named_keys() else {
        return Ok(values.key_list());
    };
    let valid = values.key_list();
    let comparison = compare_partial_array(&named, &valid);
    if !comparison.is_success() {
        let message = format!(
            "[ctx]: the step selector must only name available steps. See errors:\n{}",
            print_errors(comparison.issues(), &valid)
        );
        return Err(FormError::selector(message, comparison.invalid_entries()));
    }
    Ok(named.into_iter().map(str::to_string).collect())
}

/// Build the context for `selector`.
///
/// # Example
///
/// ```
/// use step_form::config::{FieldConfig, StepConfig, StepsConfig};
/// use step_form::ctx::create_ctx;
/// use step_form::resolve::resolve_values;
/// use step_form::selector::StepSelector;
///
/// let mut steps = StepsConfig::new();
/// steps.insert("step1".into(), StepConfig::new("A").field("a", FieldConfig::new("")));
/// steps.insert("step2".into(), StepConfig::new("B").field("b", FieldConfig::new(0)));
/// let values = resolve_values(&steps).unwrap();
///
/// let ctx = create_ctx(&values, &StepSelector::list(["step2"])).unwrap();
/// assert_eq!(ctx.keys().collect::<Vec<_>>(), vec!["step2"]);
///
/// let err = create_ctx(&values, &StepSelector::list(["step1", "stepX", "stepY"])).unwrap_err();
/// assert_eq!(err.invalid_keys(), ["stepX", "stepY"]);
/// ```
pub fn create_ctx(values: &StepValues, selector: &StepSelector) -> Result<StepCtx, FormError> {
    let keys = selected_keys(values, selector)?;
    let mut ctx = StepCtx::default();
    for key in keys {
        if let Some(step) = values.get(&key) {
            ctx.insert(key, step.clone());
        }
    }
    Ok(ctx)
}

/// Context of every step not in `selected`, in canonical order.
pub(crate) fn remaining_ctx(values: &StepValues, selected: &[String]) -> StepCtx {
    let mut ctx = StepCtx::default();
    for (key, step) in values.iter() {
        if !selected.iter().any(|s| s == key) {
            ctx.insert(key, step.clone());
        }
    }
    ctx
}

/// Merge the entries returned by `ctx_data` after the base context.
pub(crate) fn merge_ctx_data(
    mut ctx: StepCtx,
    ctx_data: &CtxData,
    remaining: &StepCtx,
    values: &StepValues,
    op: &str,
) -> Result<StepCtx, FormError> {
    let extra = ctx_data(remaining);
    let extra: Map<String, Value> = match extra {
        Value::Object(map) if !map.is_empty() => map,
        other => {
            return Err(FormError::type_error(
                format!("{op}: \"ctxData\" must return a non-empty object"),
                type_of(&other),
            ))
        }
    };
    let conflicts: Vec<String> = extra
        .keys()
        .filter(|key| values.contains_key(key))
        .cloned()
        .collect();
    if !conflicts.is_empty() {
        let message = format!(
            "{op}: \"ctxData\" must not return step keys, found {}",
            conflicts.join(", ")
        );
        return Err(FormError::selector(message, conflicts));
    }
    for (key, value) in extra {
        ctx.insert(key, value);
    }
    Ok(ctx)
}
