//! Request body validation for palette and garden records.
//!
//! Each record kind has a fixed field table. Fields outside the table are
//! dropped before a record reaches storage, including unknown keys inside
//! `vegetation`.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::error::{FieldErrors, RequestError, ValidationDetails};
use super::types::{Record, RecordId, ID_FIELD};

const MISSING: &str = "Missing data for required field.";
const NULL: &str = "Field may not be null.";
const NOT_OBJECT: &str = "Invalid input type.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Str,
    NonEmptyStr,
    Int,
    Number,
    StrList,
    Vegetation,
    /// Any JSON string or number.
    Scalar,
}

#[derive(Debug, Clone, Copy)]
struct Rule {
    field: &'static str,
    kind: FieldKind,
    required: bool,
    nullable: bool,
}

const fn required(field: &'static str, kind: FieldKind) -> Rule {
    Rule {
        field,
        kind,
        required: true,
        nullable: false,
    }
}

const fn optional(field: &'static str, kind: FieldKind) -> Rule {
    Rule {
        field,
        kind,
        required: false,
        nullable: true,
    }
}

/// Fields of a palette entry.
const PLANT_RULES: &[Rule] = &[
    required(ID_FIELD, FieldKind::Str),
    optional("name", FieldKind::Str),
    optional("trivname", FieldKind::Str),
    optional("type", FieldKind::Str),
    optional("bloom_start", FieldKind::Int),
    optional("bloom_end", FieldKind::Int),
    optional("cutting", FieldKind::Str),
    optional("cutting_time", FieldKind::Int),
    optional("max_lifetime", FieldKind::Int),
    optional("max_width", FieldKind::Int),
    optional("min_temperature", FieldKind::Int),
    optional("location", FieldKind::StrList),
    optional("location_ideal", FieldKind::StrList),
    optional("nutrition", FieldKind::Str),
    optional("nutrition_ideal", FieldKind::Str),
    optional("soil", FieldKind::StrList),
    optional("soil_ideal", FieldKind::StrList),
    optional("watering", FieldKind::Str),
    optional("watering_ideal", FieldKind::Str),
    optional("snails", FieldKind::Str),
    optional("propagation", FieldKind::StrList),
    optional("scale", FieldKind::Number),
    optional("vegetation", FieldKind::Vegetation),
    optional("notes", FieldKind::Str),
];

/// A placed garden item. Creation and update carry the same fields.
const GARDEN_ITEM_RULES: &[Rule] = &[
    required(ID_FIELD, FieldKind::Scalar),
    required("plant_id", FieldKind::NonEmptyStr),
    required("x", FieldKind::Number),
    required("y", FieldKind::Number),
];

/// Keys kept inside a `vegetation` mapping.
const VEGETATION_FIELDS: &[&str] = &["height", "icon"];

/// Parses a palette body: one plant object or an array of them.
pub fn parse_plants(body: Value) -> Result<Vec<Record>, RequestError> {
    parse_one_or_many(body, PLANT_RULES)
}

/// Parses a palette update body, which must be a single plant object.
pub fn parse_plant(body: Value) -> Result<Record, RequestError> {
    check(body, PLANT_RULES)
        .map_err(|errors| RequestError::Validation(ValidationDetails::Single(errors)))
}

/// Parses garden items being created: one object or an array of them.
pub fn parse_new_garden_items(body: Value) -> Result<Vec<Record>, RequestError> {
    parse_one_or_many(body, GARDEN_ITEM_RULES)
}

/// Parses garden updates: one object or an array of complete items.
pub fn parse_garden_updates(body: Value) -> Result<Vec<Record>, RequestError> {
    parse_one_or_many(body, GARDEN_ITEM_RULES)
}

/// Extracts the ids named by a delete body.
///
/// Accepted shapes: an array of scalar ids, an array of objects carrying an
/// `id`, a single object carrying an `id`, or a single scalar id.
pub fn parse_delete_ids(body: Value) -> Result<Vec<RecordId>, RequestError> {
    const ID_ONLY: &[Rule] = &[required(ID_FIELD, FieldKind::Scalar)];

    match body {
        Value::Array(items) if items.iter().all(|item| !item.is_object()) => items
            .into_iter()
            .map(|item| match item {
                Value::String(_) | Value::Number(_) => Ok(RecordId::new(item)),
                _ => Err(RequestError::InvalidDeletePayload),
            })
            .collect(),
        body @ (Value::Array(_) | Value::Object(_)) => {
            let records = parse_one_or_many(body, ID_ONLY)?;
            Ok(records.iter().filter_map(Record::id).collect())
        }
        Value::String(_) | Value::Number(_) => Ok(vec![RecordId::new(body)]),
        _ => Err(RequestError::InvalidDeletePayload),
    }
}

fn parse_one_or_many(body: Value, rules: &[Rule]) -> Result<Vec<Record>, RequestError> {
    match body {
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            let mut failures = BTreeMap::new();

            for (index, item) in items.into_iter().enumerate() {
                match check(item, rules) {
                    Ok(record) => records.push(record),
                    Err(errors) => {
                        failures.insert(index, errors);
                    }
                }
            }

            if failures.is_empty() {
                Ok(records)
            } else {
                Err(RequestError::Validation(ValidationDetails::Many(failures)))
            }
        }
        Value::Object(_) => check(body, rules)
            .map(|record| vec![record])
            .map_err(|errors| RequestError::Validation(ValidationDetails::Single(errors))),
        _ => Err(RequestError::InvalidBody),
    }
}

fn check(value: Value, rules: &[Rule]) -> Result<Record, FieldErrors> {
    let record = Record::try_from(value).map_err(|_| {
        let mut errors = FieldErrors::default();
        errors.add("_schema", NOT_OBJECT);
        errors
    })?;

    let mut errors = FieldErrors::default();
    for rule in rules {
        match record.get(rule.field) {
            None if rule.required => errors.add(rule.field, MISSING),
            None => {}
            Some(Value::Null) if rule.nullable => {}
            Some(Value::Null) => errors.add(rule.field, NULL),
            Some(value) => {
                if let Some(message) = kind_error(rule.kind, value) {
                    errors.add(rule.field, message);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(retain_known(record, rules))
    } else {
        Err(errors)
    }
}

/// Keeps only the fields named by `rules`, in their incoming order.
fn retain_known(record: Record, rules: &[Rule]) -> Record {
    let mut kept = Record::new();
    for (field, value) in record.into_map() {
        let Some(rule) = rules.iter().find(|rule| rule.field == field) else {
            continue;
        };
        let value = match (rule.kind, value) {
            (FieldKind::Vegetation, Value::Object(vegetation)) => {
                Value::Object(retain_vegetation(vegetation))
            }
            (_, value) => value,
        };
        kept.insert(field, value);
    }
    kept
}

fn retain_vegetation(vegetation: Map<String, Value>) -> Map<String, Value> {
    vegetation
        .into_iter()
        .filter(|(key, _)| VEGETATION_FIELDS.contains(&key.as_str()))
        .collect()
}

fn is_integral(value: &Value) -> bool {
    value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|f| f.fract() == 0.0)
}

fn kind_error(kind: FieldKind, value: &Value) -> Option<&'static str> {
    match kind {
        FieldKind::Str => (!value.is_string()).then_some("Not a valid string."),
        FieldKind::NonEmptyStr => match value.as_str() {
            Some("") => Some("Shorter than minimum length 1."),
            Some(_) => None,
            None => Some("Not a valid string."),
        },
        FieldKind::Int => (!is_integral(value)).then_some("Not a valid integer."),
        FieldKind::Number => (!value.is_number()).then_some("Not a valid number."),
        FieldKind::StrList => match value.as_array() {
            Some(items) if items.iter().all(Value::is_string) => None,
            Some(_) => Some("Not a valid list of strings."),
            None => Some("Not a valid list."),
        },
        FieldKind::Vegetation => vegetation_error(value),
        FieldKind::Scalar => {
            (!(value.is_string() || value.is_number())).then_some("Not a valid identifier.")
        }
    }
}

/// `vegetation` holds per-month `height` numbers and `icon` paths.
fn vegetation_error(value: &Value) -> Option<&'static str> {
    let Some(vegetation) = value.as_object() else {
        return Some("Not a valid mapping type.");
    };

    let per_month = |field: &str, valid: fn(&Value) -> bool| match vegetation.get(field) {
        None | Some(Value::Null) => true,
        Some(Value::Object(months)) => months.values().all(valid),
        Some(_) => false,
    };

    if !per_month("height", Value::is_number) {
        return Some("Invalid vegetation height.");
    }
    if !per_month("icon", Value::is_string) {
        return Some("Invalid vegetation icon.");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_errors(err: RequestError) -> FieldErrors {
        match err {
            RequestError::Validation(ValidationDetails::Single(errors)) => errors,
            other => panic!("expected single validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_plants_accepts_object_and_array() {
        let one = parse_plants(json!({"id": "rose", "type": "shrub"})).unwrap();
        assert_eq!(one.len(), 1);

        let many = parse_plants(json!([{"id": "rose"}, {"id": "tulip"}])).unwrap();
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn test_parse_plants_drops_unknown_fields() {
        let plants = parse_plants(json!({
            "color": "red",
            "id": "rose",
            "name": "Rosa",
            "vegetation": {"height": {"6": 120}, "icon": null, "shade": {"6": 0.5}}
        }))
        .unwrap();

        assert_eq!(
            Value::from(plants[0].clone()),
            json!({
                "id": "rose",
                "name": "Rosa",
                "vegetation": {"height": {"6": 120}, "icon": null}
            })
        );
    }

    #[test]
    fn test_null_vegetation_is_kept() {
        let plant = parse_plant(json!({"id": "rose", "vegetation": null})).unwrap();
        assert_eq!(plant.get("vegetation"), Some(&Value::Null));
    }

    #[test]
    fn test_garden_items_drop_unknown_fields() {
        let items = parse_new_garden_items(json!(
            {"id": 1, "plant_id": "rose", "x": 1, "y": 2, "selected": true}
        ))
        .unwrap();

        assert_eq!(
            Value::from(items[0].clone()),
            json!({"id": 1, "plant_id": "rose", "x": 1, "y": 2})
        );
    }

    #[test]
    fn test_parse_plant_requires_string_id() {
        let errors = field_errors(parse_plant(json!({"name": "Rosa"})).unwrap_err());
        assert_eq!(errors.get("id"), Some(&[MISSING.to_string()][..]));

        let errors = field_errors(parse_plant(json!({"id": 3})).unwrap_err());
        assert_eq!(errors.get("id"), Some(&["Not a valid string.".to_string()][..]));
    }

    #[test]
    fn test_parse_plant_checks_typed_fields() {
        let errors = field_errors(
            parse_plant(json!({
                "id": "rose",
                "bloom_start": "june",
                "soil": ["loam", 3],
                "scale": null,
                "vegetation": {"height": {"1": "tall"}}
            }))
            .unwrap_err(),
        );

        assert!(errors.get("bloom_start").is_some());
        assert!(errors.get("soil").is_some());
        assert!(errors.get("scale").is_none());
        assert!(errors.get("vegetation").is_some());
    }

    #[test]
    fn test_integral_floats_are_integers() {
        assert!(parse_plant(json!({"id": "rose", "bloom_start": 6.0})).is_ok());
        assert!(parse_plant(json!({"id": "rose", "bloom_start": 6.5})).is_err());
    }

    #[test]
    fn test_new_garden_items_require_placement() {
        let err = parse_new_garden_items(json!([
            {"id": 1, "plant_id": "rose", "x": 1, "y": 2},
            {"id": 2, "plant_id": "", "x": 1}
        ]))
        .unwrap_err();

        let RequestError::Validation(ValidationDetails::Many(failures)) = err else {
            panic!("expected per-item failures");
        };
        assert_eq!(failures.len(), 1);
        let errors = &failures[&1];
        assert!(errors.get("plant_id").is_some());
        assert!(errors.get("y").is_some());
    }

    #[test]
    fn test_garden_updates_require_placement() {
        let errors = field_errors(parse_garden_updates(json!({"id": "a1", "x": 4.5})).unwrap_err());
        assert_eq!(errors.get("plant_id"), Some(&[MISSING.to_string()][..]));
        assert_eq!(errors.get("y"), Some(&[MISSING.to_string()][..]));
        assert!(errors.get("x").is_none());

        let updates = parse_garden_updates(json!([
            {"id": "a1", "plant_id": "rose", "x": 4.5, "y": 0}
        ]))
        .unwrap();
        assert_eq!(updates.len(), 1);
    }

    #[test]
    fn test_non_json_container_body_is_invalid() {
        assert_eq!(parse_plants(json!("rose")), Err(RequestError::InvalidBody));
        assert_eq!(parse_new_garden_items(json!(null)), Err(RequestError::InvalidBody));
    }

    #[test]
    fn test_non_object_array_item_is_reported() {
        let err = parse_plants(json!([{"id": "rose"}, 5])).unwrap_err();
        let RequestError::Validation(ValidationDetails::Many(failures)) = err else {
            panic!("expected per-item failures");
        };
        assert!(failures[&1].get("_schema").is_some());
    }

    #[test]
    fn test_delete_ids_from_scalar_list() {
        let ids = parse_delete_ids(json!(["a", 2])).unwrap();
        assert_eq!(ids, vec![RecordId::from("a"), RecordId::from(2)]);
    }

    #[test]
    fn test_delete_ids_from_objects() {
        let ids = parse_delete_ids(json!([{"id": "a", "x": 1}, {"id": 7}])).unwrap();
        assert_eq!(ids, vec![RecordId::from("a"), RecordId::from(7)]);

        let ids = parse_delete_ids(json!({"id": "b"})).unwrap();
        assert_eq!(ids, vec![RecordId::from("b")]);
    }

    #[test]
    fn test_delete_ids_from_single_scalar() {
        assert_eq!(parse_delete_ids(json!("a")).unwrap(), vec![RecordId::from("a")]);
        assert_eq!(parse_delete_ids(json!(3)).unwrap(), vec![RecordId::from(3)]);
    }

    #[test]
    fn test_delete_ids_empty_list() {
        assert!(parse_delete_ids(json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_delete_ids_rejects_other_shapes() {
        assert_eq!(parse_delete_ids(json!(true)), Err(RequestError::InvalidDeletePayload));
        assert_eq!(parse_delete_ids(json!(null)), Err(RequestError::InvalidDeletePayload));
        assert_eq!(
            parse_delete_ids(json!([["a"]])),
            Err(RequestError::InvalidDeletePayload)
        );
    }

    #[test]
    fn test_delete_object_without_id_fails_validation() {
        let err = parse_delete_ids(json!({"x": 1})).unwrap_err();
        assert_eq!(err.status_code(), 422);
    }
}
