//! The update dispatcher handed to updaters and helper functions.

use std::fmt;
use step_form_util::{format_list, quote, ListStyle};

use crate::error::FormError;
use crate::schema::MultiStepFormSchema;
use crate::selector::FieldSelection;
use crate::update::UpdateOptions;

/// Updates the schema from inside an updater or helper. Step-bound updaters
/// are limited to the steps the caller selected.
#[derive(Clone)]
pub struct UpdateDispatcher {
    schema: MultiStepFormSchema,
    steps: Vec<String>,
}

impl UpdateDispatcher {
    pub(crate) fn new(schema: MultiStepFormSchema, steps: Vec<String>) -> Self {
        Self { schema, steps }
    }

    /// Same as [`MultiStepFormSchema::update`].
    pub fn update(&self, target: &str, options: UpdateOptions) -> Result<(), FormError> {
        self.schema.update(target, options)
    }

    pub fn step(&self, key: &str) -> Result<StepUpdater, FormError> {
        if !self.steps.iter().any(|step| step == key) {
            let available: Vec<String> = self.steps.iter().map(|s| quote(s, '"')).collect();
            return Err(FormError::selector(
                format!(
                    "[update]: step \"{key}\" was not selected, available steps are {}",
                    format_list(&available, ListStyle::Conjunction)
                ),
                vec![key.to_string()],
            ));
        }
        Ok(StepUpdater {
            schema: self.schema.clone(),
            key: key.to_string(),
        })
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }
}

impl fmt::Debug for UpdateDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateDispatcher").field("steps", &self.steps).finish()
    }
}

/// Updates bound to a single step.
#[derive(Clone)]
pub struct StepUpdater {
    schema: MultiStepFormSchema,
    key: String,
}

impl StepUpdater {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn update(&self, options: UpdateOptions) -> Result<(), FormError> {
        self.schema.update(&self.key, options)
    }

    pub fn reset(&self, fields: impl Into<FieldSelection>) -> Result<(), FormError> {
        self.schema.reset(&self.key, fields)
    }
}

impl fmt::Debug for StepUpdater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepUpdater").field("key", &self.key).finish()
    }
}
