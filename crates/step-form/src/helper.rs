//! Reusable functions over a fixed selection of steps.
//!
//! A helper gets a freshly built context on every call, an update dispatcher
//! limited to its steps, and optionally caller data checked by a validator.

use serde_json::Value;
use std::fmt;
use std::rc::Rc;

use crate::ctx::{create_ctx, merge_ctx_data, remaining_ctx, CtxData, StepCtx};
use crate::dispatch::UpdateDispatcher;
use crate::error::FormError;
use crate::schema::MultiStepFormSchema;
use crate::selector::StepSelector;
use crate::validator::{run_standard_validation, SharedValidator, Validator};

/// What a helper function receives.
pub struct HelperFnInput {
    pub ctx: StepCtx,
    pub update: UpdateDispatcher,
    /// Caller data; validated when the helper has a validator.
    pub data: Option<Value>,
}

#[derive(Clone, Default)]
pub struct HelperOptions {
    validator: Option<SharedValidator>,
    ctx_data: Option<CtxData>,
}

impl HelperOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Rc::new(validator));
        self
    }

    pub fn ctx_data<F>(mut self, f: F) -> Self
    where
        F: Fn(&StepCtx) -> Value + 'static,
    {
        self.ctx_data = Some(Rc::new(f));
        self
    }
}

impl fmt::Debug for HelperOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperOptions")
            .field("validator", &self.validator.is_some())
            .field("ctx_data", &self.ctx_data.is_some())
            .finish()
    }
}

/// Returned by `create_helper_fn`. The selector was validated when the
/// factory was created.
#[derive(Clone)]
pub struct HelperFnFactory {
    schema: MultiStepFormSchema,
    selector: StepSelector,
    steps: Vec<String>,
}

impl HelperFnFactory {
    pub(crate) fn new(schema: MultiStepFormSchema, selector: StepSelector, steps: Vec<String>) -> Self {
        Self {
            schema,
            selector,
            steps,
        }
    }

    pub fn selector(&self) -> &StepSelector {
        &self.selector
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn build<R, F>(&self, f: F) -> HelperFn<R>
    where
        F: Fn(HelperFnInput) -> R + 'static,
    {
        self.build_with(HelperOptions::default(), f)
    }

    pub fn build_with<R, F>(&self, options: HelperOptions, f: F) -> HelperFn<R>
    where
        F: Fn(HelperFnInput) -> R + 'static,
    {
        HelperFn {
            factory: self.clone(),
            options,
            body: Rc::new(f),
        }
    }
}

impl fmt::Debug for HelperFnFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperFnFactory")
            .field("selector", &self.selector)
            .finish()
    }
}

pub struct HelperFn<R> {
    factory: HelperFnFactory,
    options: HelperOptions,
    body: Rc<dyn Fn(HelperFnInput) -> R>,
}

impl<R> Clone for HelperFn<R> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            options: self.options.clone(),
            body: Rc::clone(&self.body),
        }
    }
}

impl<R> HelperFn<R> {
    /// Whether calls must pass data.
    pub fn requires_input(&self) -> bool {
        self.options.validator.is_some()
    }

    pub fn call(&self) -> Result<R, FormError> {
        self.invoke(None)
    }

    pub fn call_with(&self, data: impl Into<Value>) -> Result<R, FormError> {
        self.invoke(Some(data.into()))
    }

    fn invoke(&self, data: Option<Value>) -> Result<R, FormError> {
        let data = match (&self.options.validator, data) {
            (Some(_), None) => {
                return Err(FormError::type_error(
                    "[helper]: this helper has a validator and must be called with data",
                    "nothing",
                ))
            }
            (Some(validator), Some(data)) => Some(run_standard_validation(validator.as_ref(), &data)?),
            (None, data) => data,
        };
        let values = self.factory.schema.value();
        let mut ctx = create_ctx(&values, &self.factory.selector)?;
        if let Some(ctx_data) = &self.options.ctx_data {
            let remaining = remaining_ctx(&values, &self.factory.steps);
            ctx = merge_ctx_data(ctx, ctx_data, &remaining, &values, "[helper]")?;
        }
        let update = self.factory.schema.dispatcher(self.factory.steps.clone());
        tracing::trace!(steps = self.factory.steps.len(), "calling helper function");
        Ok((self.body)(HelperFnInput { ctx, update, data }))
    }
}

impl<R> fmt::Debug for HelperFn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperFn")
            .field("steps", &self.factory.steps)
            .field("options", &self.options)
            .finish()
    }
}
