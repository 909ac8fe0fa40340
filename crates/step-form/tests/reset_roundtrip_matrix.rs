use proptest::prelude::*;
use serde_json::{json, Value};
use step_form::{
    FieldConfig, FieldSelection, MultiStepFormSchema, SchemaOptions, StepConfig, StepsConfig, UpdateOptions,
};

const FIELDS: [&str; 3] = ["firstName", "lastName", "nickname"];

fn schema() -> MultiStepFormSchema {
    let mut step = StepConfig::new("Profile");
    for name in FIELDS {
        step = step.field(name, FieldConfig::new(""));
    }
    let mut steps = StepsConfig::new();
    steps.insert("step1".to_string(), step);
    steps.insert(
        "step2".to_string(),
        StepConfig::new("Extra").field("age", FieldConfig::new(30)),
    );
    MultiStepFormSchema::new(SchemaOptions::new(steps)).unwrap()
}

#[derive(Debug, Clone)]
enum Edit {
    Field(usize, String),
    Title(String),
    Age(i64),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0..FIELDS.len(), "[a-zA-Z ]{0,12}").prop_map(|(i, v)| Edit::Field(i, v)),
        "[a-zA-Z ]{1,12}".prop_map(Edit::Title),
        any::<i64>().prop_map(Edit::Age),
    ]
}

fn apply(schema: &MultiStepFormSchema, edit: Edit) {
    let (step, path, value): (&str, String, Value) = match edit {
        Edit::Field(i, v) => ("step1", format!("fields.{}.defaultValue", FIELDS[i]), json!(v)),
        Edit::Title(v) => ("step1", "title".to_string(), json!(v)),
        Edit::Age(v) => ("step2", "fields.age.defaultValue".to_string(), json!(v)),
    };
    schema
        .update(step, UpdateOptions::value(value).fields(FieldSelection::paths([path])))
        .unwrap();
}

proptest! {
    #[test]
    fn reset_all_restores_construction_values(edits in prop::collection::vec(edit_strategy(), 0..20)) {
        let schema = schema();
        let original = schema.value();
        for edit in edits {
            apply(&schema, edit);
        }
        schema.reset("step1", FieldSelection::All).unwrap();
        schema.reset("step2", FieldSelection::All).unwrap();
        prop_assert_eq!(schema.value(), original);
    }

    #[test]
    fn path_reset_only_touches_selected_paths(
        edits in prop::collection::vec(edit_strategy(), 1..20),
        field in 0..FIELDS.len(),
    ) {
        let schema = schema();
        for edit in edits {
            apply(&schema, edit);
        }
        let before = schema.value();
        let path = format!("fields.{}.defaultValue", FIELDS[field]);
        schema.reset("step1", FieldSelection::paths([path.clone()])).unwrap();

        let after = schema.value();
        let step = after.get("step1").unwrap();
        prop_assert_eq!(&step["fields"][FIELDS[field]]["defaultValue"], &json!(""));
        let mut expected = before.get("step1").unwrap().clone();
        expected["fields"][FIELDS[field]]["defaultValue"] = json!("");
        prop_assert_eq!(step, &expected);
        prop_assert!(after.shares_step(&before, "step2"));
    }
}

#[test]
fn reset_of_unknown_path_is_rejected() {
    let schema = schema();
    let err = schema
        .reset("step1", FieldSelection::paths(["fields.middleName.defaultValue"]))
        .unwrap_err();
    assert_eq!(err.invalid_keys(), ["fields.middleName.defaultValue"]);
}

#[test]
fn reset_reads_construction_values_not_persisted_ones() {
    let base = schema();
    let mut saved = base.value().get("step1").unwrap().clone();
    saved["fields"]["firstName"]["defaultValue"] = json!("Persisted");
    let storage = step_form::MemoryStorage::with_value(json!({ "step1": saved }));

    let mut step = StepConfig::new("Profile");
    for name in FIELDS {
        step = step.field(name, FieldConfig::new(""));
    }
    let mut steps = StepsConfig::new();
    steps.insert("step1".to_string(), step);
    steps.insert(
        "step2".to_string(),
        StepConfig::new("Extra").field("age", FieldConfig::new(30)),
    );
    let schema = MultiStepFormSchema::new(SchemaOptions::new(steps).storage(storage)).unwrap();
    assert_eq!(
        schema.step("step1").unwrap().default_value("firstName"),
        Some(&json!("Persisted"))
    );
    schema.reset("step1", FieldSelection::All).unwrap();
    assert_eq!(schema.step("step1").unwrap().default_value("firstName"), Some(&json!("")));
}
