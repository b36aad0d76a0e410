//! Record access helpers.
//!
//! Records are JSON values. Unscoped searches look at a record's immediate field values;
//! scoped searches follow a dotted path to any depth.

use std::borrow::Cow;

use serde_json::Value;

/// A searchable record.
pub type Record = Value;

/// Resolves a dotted path such as `rocket.first_stage.cores`.
///
/// Empty segments are ignored, so `a..b` is the same path as `a.b`. Returns None when any
/// segment is missing or a non-object is traversed.
pub fn lookup<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(record, |value, segment| value.as_object()?.get(segment))
}

/// Iterates over the immediate field values of a record.
///
/// Records that are not objects have no fields.
pub fn fields(record: &Record) -> impl Iterator<Item = &Value> {
    record.as_object().into_iter().flat_map(|map| map.values())
}

/// Returns the text of an atomic value (string, number or boolean).
///
/// Null, arrays and objects are not atomic and never match.
pub fn atomic_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s)),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn lookup_follows_nested_paths() {
        let record = json!({"rocket": {"stage": {"cores": 3}}, "name": "Falcon"});
        assert_eq!(lookup(&record, "rocket.stage.cores"), Some(&json!(3)));
        assert_eq!(lookup(&record, "name"), Some(&json!("Falcon")));
        assert_eq!(lookup(&record, "rocket..stage.cores"), Some(&json!(3)));
    }

    #[test]
    fn lookup_missing_is_none() {
        let record = json!({"name": "Falcon"});
        assert_eq!(lookup(&record, "missing"), None);
        assert_eq!(lookup(&record, "name.first"), None);
    }

    #[test]
    fn fields_are_one_level() {
        let record = json!({"a": 1, "b": {"c": 2}});
        assert_eq!(fields(&record).count(), 2);
        assert_eq!(fields(&json!("scalar")).count(), 0);
    }

    #[test]
    fn atomic_values() {
        assert_eq!(atomic_text(&json!("x")).as_deref(), Some("x"));
        assert_eq!(atomic_text(&json!(2010)).as_deref(), Some("2010"));
        assert_eq!(atomic_text(&json!(1.5)).as_deref(), Some("1.5"));
        assert_eq!(atomic_text(&json!(true)).as_deref(), Some("true"));
        assert_eq!(atomic_text(&json!(null)), None);
        assert_eq!(atomic_text(&json!([1])), None);
    }
}
