//! Evaluation context construction.
//!
//! The context every predicate sees is
//!
//! ```json
//! {
//!   "payload":  <credential payload>,
//!   "external": {
//!     "validationClock": "2026-01-17T12:00:00Z",
//!     "<value set name>": [<coerced item>, ...]
//!   }
//! }
//! ```
//!
//! Value set items are coerced one by one: integer if the text parses as
//! one, else a finite float, else the original string.

use serde_json::{Map, Value};

use hcv_core::Timestamp;

use crate::logic::value::number_value;
use crate::model::ValueSet;

/// Key of the validation clock inside `external`.
pub const VALIDATION_CLOCK: &str = "validationClock";

/// Builder for the `{payload, external}` context.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    payload: Value,
    external: Map<String, Value>,
}

impl EvaluationContext {
    /// Start a context for `payload`, stamped with `validation_clock`.
    pub fn new(payload: Value, validation_clock: Timestamp) -> Self {
        let mut external = Map::new();
        external.insert(
            VALIDATION_CLOCK.to_string(),
            Value::String(validation_clock.to_iso8601()),
        );
        Self { payload, external }
    }

    /// Inject value sets under their names. A later set with the same name
    /// replaces an earlier one.
    pub fn with_value_sets(mut self, value_sets: &[ValueSet]) -> Self {
        for set in value_sets {
            let items = set.items.iter().map(|item| coerce_item(&item.value)).collect();
            self.external.insert(set.name.clone(), Value::Array(items));
        }
        self
    }

    /// Finish into the JSON value predicates are applied to.
    pub fn into_value(self) -> Value {
        let mut root = Map::new();
        root.insert("payload".to_string(), self.payload);
        root.insert("external".to_string(), Value::Object(self.external));
        Value::Object(root)
    }
}

/// Coerce one value set item.
pub fn coerce_item(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        return Value::from(i);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() => number_value(f),
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clock() -> Timestamp {
        Timestamp::parse("2026-01-17T12:00:00Z").unwrap()
    }

    #[test]
    fn item_coercion() {
        assert_eq!(coerce_item("5"), json!(5));
        assert_eq!(coerce_item("-12"), json!(-12));
        assert_eq!(coerce_item("5.5"), json!(5.5));
        assert_eq!(coerce_item("abc"), json!("abc"));
        assert_eq!(coerce_item("260415000"), json!(260_415_000));
        assert_eq!(coerce_item("inf"), json!("inf"));
        assert_eq!(coerce_item("NaN"), json!("NaN"));
        assert_eq!(coerce_item(""), json!(""));
    }

    #[test]
    fn context_shape() {
        let ctx = EvaluationContext::new(json!({"status": "valid"}), clock())
            .with_value_sets(&[ValueSet::from_values("codes", ["1", "x"])])
            .into_value();
        assert_eq!(
            ctx,
            json!({
                "payload": {"status": "valid"},
                "external": {
                    "validationClock": "2026-01-17T12:00:00Z",
                    "codes": [1, "x"]
                }
            })
        );
    }

    #[test]
    fn later_value_set_replaces_same_name() {
        let ctx = EvaluationContext::new(json!({}), clock())
            .with_value_sets(&[
                ValueSet::from_values("codes", ["1"]),
                ValueSet::from_values("codes", ["2"]),
            ])
            .into_value();
        assert_eq!(ctx["external"]["codes"], json!([2]));
    }

    proptest::proptest! {
        #[test]
        fn integer_items_inject_as_integers(i in proptest::num::i64::ANY) {
            proptest::prop_assert_eq!(coerce_item(&i.to_string()), json!(i));
        }
    }
}
