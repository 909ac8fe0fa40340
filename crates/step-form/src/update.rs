//! Computes the next value of a step for an update or a reset.
//!
//! An update runs through a fixed sequence of phases (see [`UpdatePhase`]).
//! Any failure aborts before commit, so the canonical value only ever moves
//! from one fully checked state to the next.

use serde_json::Value;
use std::fmt;
use std::rc::Rc;
use step_form_path::{
    compare_partial_array, equals_at_paths, get, has, print_errors, print_mismatches, set_at,
    update_at, DeepPath, Mismatch, PathComparison,
};
use step_form_util::{format_list, quote, type_of, ListStyle};

use crate::ctx::{create_ctx, merge_ctx_data, remaining_ctx, CtxData, StepCtx};
use crate::dispatch::UpdateDispatcher;
use crate::error::FormError;
use crate::selector::{FieldSelection, StepSelector};
use crate::values::{step_shape_paths, ResolvedStep, StepValues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    Start,
    BuildCtx,
    CtxData,
    RunUpdater,
    DetermineMode,
    ValidateShape,
    ValidateNoCrossMutation,
    Commit,
}

impl UpdatePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdatePhase::Start => "start",
            UpdatePhase::BuildCtx => "build_ctx",
            UpdatePhase::CtxData => "ctx_data",
            UpdatePhase::RunUpdater => "run_updater",
            UpdatePhase::DetermineMode => "determine_mode",
            UpdatePhase::ValidateShape => "validate_shape",
            UpdatePhase::ValidateNoCrossMutation => "validate_no_cross_mutation",
            UpdatePhase::Commit => "commit",
        }
    }
}

impl fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn enter(step: &str, phase: UpdatePhase) {
    tracing::trace!(step, phase = phase.as_str(), "update phase");
}

/// What an updater function receives.
pub struct UpdaterInput<'a> {
    /// The target step, plus any `ctx_data` entries.
    pub ctx: &'a StepCtx,
    pub update: &'a UpdateDispatcher,
}

pub type UpdaterFn = Box<dyn FnOnce(UpdaterInput<'_>) -> Result<Value, FormError>>;

pub enum Updater {
    Value(Value),
    Fn(UpdaterFn),
}

impl Updater {
    pub fn value(value: impl Into<Value>) -> Self {
        Updater::Value(value.into())
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce(UpdaterInput<'_>) -> Result<Value, FormError> + 'static,
    {
        Updater::Fn(Box::new(f))
    }
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Updater::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Updater::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}

/// Options of one update call.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use step_form::selector::FieldSelection;
/// use step_form::update::UpdateOptions;
///
/// let options = UpdateOptions::value("Ada").fields(FieldSelection::paths(["fields.firstName.defaultValue"]));
/// assert!(!options.field_selection().is_all());
/// ```
pub struct UpdateOptions {
    updater: Updater,
    ctx_data: Option<CtxData>,
    fields: FieldSelection,
}

impl UpdateOptions {
    pub fn new(updater: Updater) -> Self {
        Self {
            updater,
            ctx_data: None,
            fields: FieldSelection::All,
        }
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Self::new(Updater::value(value))
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce(UpdaterInput<'_>) -> Result<Value, FormError> + 'static,
    {
        Self::new(Updater::from_fn(f))
    }

    pub fn fields(mut self, fields: impl Into<FieldSelection>) -> Self {
        self.fields = fields.into();
        self
    }

    pub fn ctx_data<F>(mut self, f: F) -> Self
    where
        F: Fn(&StepCtx) -> Value + 'static,
    {
        self.ctx_data = Some(Rc::new(f));
        self
    }

    pub fn field_selection(&self) -> &FieldSelection {
        &self.fields
    }
}

impl fmt::Debug for UpdateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateOptions")
            .field("updater", &self.updater)
            .field("ctx_data", &self.ctx_data.is_some())
            .field("fields", &self.fields)
            .finish()
    }
}

/// Run an update against `values` and return the next data of `target`.
pub(crate) fn compute_update(
    values: &StepValues,
    target: &str,
    options: UpdateOptions,
    update: &UpdateDispatcher,
) -> Result<Value, FormError> {
    enter(target, UpdatePhase::Start);
    let UpdateOptions {
        updater,
        ctx_data,
        fields,
    } = options;
    let selected = vec![target.to_string()];

    enter(target, UpdatePhase::BuildCtx);
    let mut ctx = create_ctx(values, &StepSelector::List(selected.clone())).map_err(|err| match err {
        FormError::Selector { invalid, .. } => FormError::selector(
            format!(
                "[update]: no step \"{target}\", available steps are {}",
                format_list(&quoted(values.keys()), ListStyle::Conjunction)
            ),
            invalid,
        ),
        other => other,
    })?;
    let current = ctx.get(target).cloned().unwrap_or(Value::Null);

    if let Some(ctx_data) = &ctx_data {
        enter(target, UpdatePhase::CtxData);
        ctx = merge_ctx_data(ctx, ctx_data, &remaining_ctx(values, &selected), values, "[update]")?;
    }

    enter(target, UpdatePhase::RunUpdater);
    let updated = match updater {
        Updater::Value(value) => value,
        Updater::Fn(f) => f(UpdaterInput { ctx: &ctx, update })?,
    };

    enter(target, UpdatePhase::DetermineMode);
    let next = match fields.selected_paths("[update]")? {
        None => replace_step(target, &current, updated)?,
        Some(paths) => update_paths(target, &current, &paths, updated)?,
    };
    check_resolved(target, &next)?;
    enter(target, UpdatePhase::Commit);
    Ok(next)
}

/// The next step must still read back as a resolved step.
fn check_resolved(target: &str, next: &Value) -> Result<(), FormError> {
    match ResolvedStep::from_value(next) {
        Ok(_) => Ok(()),
        Err(FormError::ShapeMismatch { message, .. }) => Err(FormError::shape(format!(
            "[update]: the updated \"{target}\" is not a valid step: {message}"
        ))),
        Err(other) => Err(other),
    }
}

fn quoted<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    items.map(|item| quote(item, '"')).collect()
}

fn replace_step(target: &str, current: &Value, updated: Value) -> Result<Value, FormError> {
    enter(target, UpdatePhase::ValidateShape);
    let Value::Object(result) = &updated else {
        return Err(FormError::type_error(
            format!("[update]: the updater for \"{target}\" must produce an object when all fields are updated"),
            type_of(&updated),
        ));
    };
    let current_map = current.as_object().cloned().unwrap_or_default();
    let missing: Vec<String> = current_map
        .keys()
        .filter(|key| !result.contains_key(*key))
        .cloned()
        .collect();
    let unexpected: Vec<String> = result
        .keys()
        .filter(|key| !current_map.contains_key(*key))
        .cloned()
        .collect();
    if !missing.is_empty() || !unexpected.is_empty() {
        let list = |keys: &[String]| {
            format_list(&quoted(keys.iter().map(String::as_str)), ListStyle::Conjunction)
        };
        let mut problems = Vec::new();
        if !missing.is_empty() {
            problems.push(format!("is missing keys {}", list(&missing)));
        }
        if !unexpected.is_empty() {
            problems.push(format!("has unexpected keys {}", list(&unexpected)));
        }
        return Err(FormError::ShapeMismatch {
            message: format!("[update]: the updated \"{target}\" {}", problems.join(" and ")),
            missing,
            unexpected,
            mismatches: Vec::new(),
        });
    }

    let current_paths = step_shape_paths(current)?;
    let next_paths = step_shape_paths(&updated)?;
    let lost: Vec<DeepPath> = current_paths
        .iter()
        .filter(|path| !next_paths.contains(*path))
        .cloned()
        .collect();
    let added: Vec<DeepPath> = next_paths
        .iter()
        .filter(|path| !current_paths.contains(*path))
        .cloned()
        .collect();
    if !lost.is_empty() || !added.is_empty() {
        let mismatches: Vec<Mismatch> = lost
            .iter()
            .map(|path| Mismatch {
                path: path.clone(),
                expected: get(current, path).cloned(),
                actual: None,
            })
            .chain(added.iter().map(|path| Mismatch {
                path: path.clone(),
                expected: None,
                actual: get(&updated, path).cloned(),
            }))
            .collect();
        let comparison = PathComparison {
            ok: false,
            mismatches,
        };
        return Err(FormError::ShapeMismatch {
            message: format!(
                "[update]: the updated \"{target}\" no longer has the shape of the step:\n{}",
                print_mismatches(&comparison)
            ),
            missing: lost,
            unexpected: added,
            mismatches: comparison.mismatches,
        });
    }
    Ok(updated)
}

fn check_selection(op: &str, paths: &[DeepPath], valid: &[DeepPath]) -> Result<(), FormError> {
    let comparison = compare_partial_array(paths, valid);
    if comparison.is_success() {
        return Ok(());
    }
    Err(FormError::selector(
        format!(
            "{op}: \"fields\" must only select existing paths. See errors:\n{}",
            print_errors(comparison.issues(), valid)
        ),
        comparison.invalid_entries(),
    ))
}

fn update_paths(
    target: &str,
    current: &Value,
    paths: &[DeepPath],
    updated: Value,
) -> Result<Value, FormError> {
    let leaf_paths = step_shape_paths(current)?;
    check_selection("[update]", paths, &leaf_paths)?;

    enter(target, UpdatePhase::ValidateShape);
    let step_shaped = updated.is_object() && paths.iter().all(|path| has(&updated, path));
    let candidate = if step_shaped {
        enter(target, UpdatePhase::ValidateNoCrossMutation);
        let untouched: Vec<&str> = leaf_paths
            .iter()
            .filter(|path| !paths.contains(*path) && has(&updated, path))
            .map(String::as_str)
            .collect();
        let comparison = equals_at_paths(current, &untouched, &updated);
        if !comparison.ok {
            return Err(FormError::mismatches(
                format!(
                    "[update]: the updater for \"{target}\" changed fields that were not selected:\n{}",
                    print_mismatches(&comparison)
                ),
                comparison.mismatches,
            ));
        }
        updated
    } else if let [path] = paths {
        let mut candidate = current.clone();
        set_at(&mut candidate, path, updated)?;
        candidate
    } else {
        let missing: Vec<String> = paths
            .iter()
            .filter(|path| !has(&updated, path))
            .cloned()
            .collect();
        return Err(FormError::missing_keys(
            format!(
                "[update]: the updater for \"{target}\" must produce an object containing {} (was {})",
                format_list(&quoted(missing.iter().map(String::as_str)), ListStyle::Conjunction),
                type_of(&updated)
            ),
            missing,
        ));
    };
    Ok(update_at(current, paths, &candidate)?)
}

/// Compute the data of `target` after resetting `fields` to `original`.
pub(crate) fn compute_reset(
    target: &str,
    current: &Value,
    original: &Value,
    fields: &FieldSelection,
) -> Result<Value, FormError> {
    match fields.selected_paths("[reset]")? {
        None => Ok(original.clone()),
        Some(paths) => {
            let leaf_paths = step_shape_paths(original)?;
            check_selection("[reset]", &paths, &leaf_paths)?;
            tracing::trace!(step = target, paths = paths.len(), "resetting selected paths");
            Ok(update_at(current, &paths, original)?)
        }
    }
}
