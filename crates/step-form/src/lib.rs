//! Multi-step form schema engine.
//!
//! A form is configured as ordered steps (`step1`, `step2`, ...), each with
//! a title and fields. [`MultiStepFormSchema`] resolves that configuration
//! into canonical JSON data (labels derived from field names, defaults run
//! through an optional validator), then lets callers:
//!
//! - update a whole step or selected deep paths, with checks that an update
//!   keeps the step's shape and changes nothing it did not select,
//! - reset fields to their construction-time values,
//! - build read-only contexts over selected steps and helper functions bound
//!   to them,
//! - subscribe to committed changes, directly or through a
//!   [`MultiStepFormObserver`].
//!
//! Persistence goes through the [`Storage`] trait; validation goes through
//! the [`Validator`] trait.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use step_form::{FieldConfig, MultiStepFormSchema, SchemaOptions, StepConfig, StepSelector, StepsConfig};
//!
//! let mut steps = StepsConfig::new();
//! steps.insert("step1".into(), StepConfig::new("About you").field("firstName", FieldConfig::new("")));
//! steps.insert("step2".into(), StepConfig::new("Contact").field("email", FieldConfig::new("")));
//! let schema = MultiStepFormSchema::new(SchemaOptions::new(steps)).unwrap();
//!
//! let step1 = schema.step("step1").unwrap();
//! assert_eq!(step1.data()["fields"]["firstName"]["label"], json!("First Name"));
//!
//! let ctx = schema.create_ctx(&StepSelector::All).unwrap();
//! assert_eq!(ctx.keys().collect::<Vec<_>>(), vec!["step1", "step2"]);
//! ```

pub mod config;
pub mod ctx;
pub mod dispatch;
pub mod error;
pub mod helper;
pub mod observable;
pub mod observer;
pub mod resolve;
pub mod schema;
pub mod selector;
pub mod storage;
pub mod update;
pub mod validator;
pub mod values;

pub use config::{FieldConfig, FieldLabel, FieldType, SchemaConfig, StepConfig, StepsConfig};
pub use ctx::{create_ctx, CtxData, StepCtx};
pub use dispatch::{StepUpdater, UpdateDispatcher};
pub use error::FormError;
pub use helper::{HelperFn, HelperFnFactory, HelperFnInput, HelperOptions};
pub use observable::{Listener, NoHooks, Subscribable, SubscriptionHooks, Unsubscribe};
pub use observer::MultiStepFormObserver;
pub use resolve::{create_step, extract_number, is_valid_step_key};
pub use schema::{MultiStepFormSchema, SchemaOptions, StepHandle};
pub use selector::{FieldSelection, StepSelector};
pub use storage::{MemoryStorage, Storage, StorageError};
pub use update::{UpdateOptions, Updater, UpdaterInput, UpdatePhase};
pub use validator::{ValidationError, ValidationIssue, ValidationResult, Validator};
pub use values::{ResolvedField, ResolvedStep, StepValues};

pub use step_form_path as path;
pub use step_form_util::{change_casing, CasingType};
