//! The schema facade: owns the canonical value and ties the engine together.

use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use step_form_util::{format_list, quote, type_of, ListStyle};

use crate::config::{SchemaConfig, StepsConfig};
use crate::ctx::{create_ctx, selected_keys, StepCtx};
use crate::dispatch::UpdateDispatcher;
use crate::error::FormError;
use crate::helper::HelperFnFactory;
use crate::observable::{Listener, Subscribable, Unsubscribe};
use crate::resolve::{extract_number, resolve_values};
use crate::selector::{FieldSelection, StepSelector};
use crate::storage::Storage;
use crate::update::{compute_reset, compute_update, UpdateOptions};
use crate::values::{step_shape_paths, ResolvedStep, StepValues};

pub struct SchemaOptions {
    pub steps: StepsConfig,
    pub storage: Option<Rc<dyn Storage>>,
}

impl SchemaOptions {
    pub fn new(steps: StepsConfig) -> Self {
        Self {
            steps,
            storage: None,
        }
    }

    pub fn storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Some(Rc::new(storage));
        self
    }
}

impl From<SchemaConfig> for SchemaOptions {
    fn from(config: SchemaConfig) -> Self {
        Self::new(config.steps)
    }
}

struct SchemaInner {
    value: RefCell<StepValues>,
    original: StepValues,
    storage: Option<Rc<dyn Storage>>,
    subscribers: Subscribable<MultiStepFormSchema>,
}

/// A multi-step form: resolved step data plus the operations that change it.
///
/// Clones share the same state. The schema is single-threaded; no internal
/// borrow is held while updaters, validators, storage or listeners run, so
/// any of them may call back into the schema.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use step_form::{FieldConfig, FieldSelection, MultiStepFormSchema, SchemaOptions, StepConfig, StepsConfig, UpdateOptions};
///
/// let mut steps = StepsConfig::new();
/// steps.insert("step1".into(), StepConfig::new("Profile").field("firstName", FieldConfig::new("")));
/// let schema = MultiStepFormSchema::new(SchemaOptions::new(steps)).unwrap();
///
/// schema
///     .update("step1", UpdateOptions::value("Ada").fields(FieldSelection::paths(["fields.firstName.defaultValue"])))
///     .unwrap();
/// assert_eq!(schema.step("step1").unwrap().default_value("firstName"), Some(&json!("Ada")));
///
/// schema.reset("step1", FieldSelection::All).unwrap();
/// assert_eq!(schema.step("step1").unwrap().default_value("firstName"), Some(&json!("")));
/// ```
#[derive(Clone)]
pub struct MultiStepFormSchema {
    inner: Rc<SchemaInner>,
}

impl MultiStepFormSchema {
    /// Resolve the configuration and seed from storage when one is given.
    ///
    /// A persisted step replaces the resolved one only when the step is
    /// configured and both have the same leaf paths.
    pub fn new(options: SchemaOptions) -> Result<Self, FormError> {
        let SchemaOptions { steps, storage } = options;
        let original = resolve_values(&steps)?;
        let mut value = original.clone();
        if let Some(storage) = &storage {
            if let Some(persisted) = storage.get()? {
                value = seed_from_persisted(&original, &persisted);
            }
        }
        tracing::debug!(
            steps = original.len(),
            storage = storage.is_some(),
            "constructed multi-step form schema"
        );
        Ok(Self {
            inner: Rc::new(SchemaInner {
                value: RefCell::new(value),
                original,
                storage,
                subscribers: Subscribable::new(),
            }),
        })
    }

    pub fn from_config(config: SchemaConfig) -> Result<Self, FormError> {
        Self::new(config.into())
    }

    /// The current canonical value.
    pub fn value(&self) -> StepValues {
        self.inner.value.borrow().clone()
    }

    /// The resolved value captured at construction. Resets read from here.
    pub fn original_value(&self) -> &StepValues {
        &self.inner.original
    }

    pub fn step_keys(&self) -> Vec<String> {
        self.inner.original.key_list()
    }

    pub fn step(&self, key: &str) -> Result<StepHandle, FormError> {
        let data = self
            .inner
            .value
            .borrow()
            .get_shared(key)
            .ok_or_else(|| self.unknown_step("[step]", key))?;
        Ok(StepHandle {
            schema: self.clone(),
            key: key.to_string(),
            data,
        })
    }

    pub fn steps(&self) -> Vec<StepHandle> {
        let value = self.value();
        value
            .keys()
            .filter_map(|key| {
                value.get_shared(key).map(|data| StepHandle {
                    schema: self.clone(),
                    key: key.to_string(),
                    data,
                })
            })
            .collect()
    }

    /// Update `target` and notify subscribers.
    ///
    /// On error the canonical value is unchanged, storage is not written and
    /// nobody is notified.
    pub fn update(&self, target: &str, options: UpdateOptions) -> Result<(), FormError> {
        let mode = options.field_selection().mode();
        let values = self.value();
        let dispatcher = UpdateDispatcher::new(self.clone(), vec![target.to_string()]);
        let next_step = compute_update(&values, target, options, &dispatcher)?;
        self.commit(target, next_step)?;
        tracing::debug!(step = target, mode, "committed update");
        Ok(())
    }

    /// Restore `fields` of `target` to their construction-time values.
    pub fn reset(&self, target: &str, fields: impl Into<FieldSelection>) -> Result<(), FormError> {
        let fields = fields.into();
        let original = self
            .inner
            .original
            .get(target)
            .ok_or_else(|| self.unknown_step("[reset]", target))?;
        let current = self
            .inner
            .value
            .borrow()
            .get_shared(target)
            .ok_or_else(|| self.unknown_step("[reset]", target))?;
        let next_step = compute_reset(target, &current, original, &fields)?;
        self.commit(target, next_step)?;
        tracing::debug!(step = target, all = fields.is_all(), "committed reset");
        Ok(())
    }

    pub fn create_ctx(&self, selector: &StepSelector) -> Result<StepCtx, FormError> {
        create_ctx(&self.value(), selector)
    }

    /// Validate `selector` now and return a factory for helper functions over
    /// the selected steps.
    pub fn create_helper_fn(&self, selector: StepSelector) -> Result<HelperFnFactory, FormError> {
        let steps = selected_keys(&self.value(), &selector)?;
        Ok(HelperFnFactory::new(self.clone(), selector, steps))
    }

    pub(crate) fn dispatcher(&self, steps: Vec<String>) -> UpdateDispatcher {
        UpdateDispatcher::new(self.clone(), steps)
    }

    pub fn subscribe(&self, listener: Listener<MultiStepFormSchema>) -> Unsubscribe {
        self.inner.subscribers.subscribe(listener)
    }

    pub fn subscribe_fn(&self, listener: impl Fn(&MultiStepFormSchema) + 'static) -> Unsubscribe {
        self.subscribe(Rc::new(listener))
    }

    pub fn has_listeners(&self) -> bool {
        self.inner.subscribers.has_listeners()
    }

    pub fn get_snapshot(&self) -> MultiStepFormSchema {
        self.clone()
    }

    pub fn get_result(&self) -> StepValues {
        self.value()
    }

    /// Whether both handles share the same state.
    pub fn ptr_eq(&self, other: &MultiStepFormSchema) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn commit(&self, target: &str, next_step: Value) -> Result<(), FormError> {
        let next = self.inner.value.borrow().with_step(target, next_step);
        if let Some(storage) = &self.inner.storage {
            storage.set(&next.to_value())?;
        }
        *self.inner.value.borrow_mut() = next;
        self.inner.subscribers.notify(self);
        Ok(())
    }

    fn unknown_step(&self, op: &str, key: &str) -> FormError {
        let available: Vec<String> = self.inner.original.keys().map(|k| quote(k, '"')).collect();
        FormError::selector(
            format!(
                "{op}: no step \"{key}\", available steps are {}",
                format_list(&available, ListStyle::Conjunction)
            ),
            vec![key.to_string()],
        )
    }
}

impl fmt::Debug for MultiStepFormSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiStepFormSchema")
            .field("value", &self.inner.value.borrow())
            .field("subscribers", &self.inner.subscribers)
            .finish()
    }
}

/// Whether `saved` can stand in for `step`: the same shape, with field
/// values free to differ in type, and metadata that still reads back.
fn same_shape(step: &Value, saved: &Value) -> bool {
    match (step_shape_paths(step), step_shape_paths(saved)) {
        (Ok(a), Ok(b)) => {
            let a: HashSet<String> = a.into_iter().collect();
            let b: HashSet<String> = b.into_iter().collect();
            a == b && ResolvedStep::from_value(saved).is_ok()
        }
        _ => false,
    }
}

fn seed_from_persisted(original: &StepValues, persisted: &Value) -> StepValues {
    let Some(persisted) = persisted.as_object() else {
        tracing::warn!(received = type_of(persisted), "ignoring persisted state that is not an object");
        return original.clone();
    };
    for key in persisted.keys().filter(|key| !original.contains_key(key)) {
        tracing::warn!(step = key.as_str(), "ignoring persisted state of an unknown step");
    }
    let mut seeded = original.clone();
    for (key, step) in original.iter() {
        let Some(saved) = persisted.get(key) else {
            continue;
        };
        if same_shape(step, saved) {
            seeded.insert(key, saved.clone());
        } else {
            tracing::warn!(step = key, "ignoring persisted state whose shape differs from the configuration");
        }
    }
    seeded
}

/// One step of a schema: its key, the data at the time the handle was taken,
/// and the operations bound to it.
#[derive(Clone)]
pub struct StepHandle {
    schema: MultiStepFormSchema,
    key: String,
    data: Rc<Value>,
}

impl StepHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Step data as of when this handle was taken. Take a new handle after an
    /// update to see the new data.
    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn step_number(&self) -> Result<u64, FormError> {
        extract_number(&self.key)
    }

    pub fn resolved(&self) -> Result<ResolvedStep, FormError> {
        ResolvedStep::from_value(&self.data)
    }

    pub fn default_value(&self, field: &str) -> Option<&Value> {
        self.data.get("fields")?.get(field)?.get("defaultValue")
    }

    pub fn update(&self, options: UpdateOptions) -> Result<(), FormError> {
        self.schema.update(&self.key, options)
    }

    pub fn reset(&self, fields: impl Into<FieldSelection>) -> Result<(), FormError> {
        self.schema.reset(&self.key, fields)
    }

    pub fn create_helper_fn(&self) -> Result<HelperFnFactory, FormError> {
        self.schema
            .create_helper_fn(StepSelector::List(vec![self.key.clone()]))
    }
}

impl fmt::Debug for StepHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepHandle")
            .field("key", &self.key)
            .field("data", &self.data)
            .finish()
    }
}
