//! Wire value objects and semantic classification.
//!
//! Each field in a gateway frame carries a value object with exactly one of
//! three payload variants. The classifier maps that shape to the Home
//! Assistant component the entity renders as.

use std::fmt;

use serde::Deserialize;
use serde_json::Number;

/// `informationType` tag that forces a field to render as a binary sensor.
pub const ERROR_INFORMATION: &str = "ERROR_INFORMATION";

/// One field's value object as carried in a gateway frame.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldValue {
    /// Boolean payload.
    #[serde(rename = "valueBoolean")]
    pub value_boolean: Option<bool>,

    /// Numeric payload.
    #[serde(rename = "valueNumber")]
    pub value_number: Option<Number>,

    /// Free-text payload.
    #[serde(rename = "valueString")]
    pub value_string: Option<String>,

    /// Unit of measurement, if the gateway reports one.
    pub unit: Option<String>,

    /// Semantic tag attached by the gateway (e.g. `ERROR_INFORMATION`).
    #[serde(rename = "informationType")]
    pub information_type: Option<String>,
}

/// Home Assistant component a field maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// Numeric or free-text measurement.
    Sensor,
    /// Boolean flag.
    BinarySensor,
}

impl Component {
    /// Topic segment for this component.
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Sensor => "sensor",
            Component::BinarySensor => "binary_sensor",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State carried by an entity, rendered as text on publish.
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Bool(bool),
    Number(Number),
    Text(String),
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Bool(b) => write!(f, "{}", b),
            StateValue::Number(n) => write!(f, "{}", n),
            StateValue::Text(s) => f.write_str(s),
        }
    }
}

/// A classified field: the component it renders as, its state, and its unit.
#[derive(Debug, Clone)]
pub struct Classified {
    /// Component the field maps to.
    pub component: Component,

    /// Current state value.
    pub state: StateValue,

    /// Unit of measurement, empty units treated as absent.
    pub unit: Option<String>,
}

/// Determine the semantic shape of a value object.
///
/// Payload variants are checked in order: boolean, then number, then string.
/// Returns `None` when none is present; such fields are skipped entirely (no
/// config, no state publish).
pub fn classify(value: &FieldValue) -> Option<Classified> {
    let (component, state) = if let Some(b) = value.value_boolean {
        (Component::BinarySensor, StateValue::Bool(b))
    } else if let Some(n) = value.value_number.clone() {
        (Component::Sensor, StateValue::Number(n))
    } else if let Some(s) = value.value_string.clone() {
        (Component::Sensor, StateValue::Text(s))
    } else {
        return None;
    };

    // Error flags render as binary sensors regardless of payload shape.
    let component = match value.information_type.as_deref() {
        Some(ERROR_INFORMATION) => Component::BinarySensor,
        _ => component,
    };

    let unit = value
        .unit
        .as_deref()
        .filter(|u| !u.is_empty())
        .map(str::to_string);

    Some(Classified {
        component,
        state,
        unit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(json: &str) -> FieldValue {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_classify_boolean() {
        let classified = classify(&field(r#"{"valueBoolean": true}"#)).unwrap();
        assert_eq!(classified.component, Component::BinarySensor);
        assert_eq!(classified.state, StateValue::Bool(true));
        assert_eq!(classified.state.to_string(), "true");
        assert!(classified.unit.is_none());
    }

    #[test]
    fn test_classify_number() {
        let classified = classify(&field(r#"{"valueNumber": 21.5, "unit": "°C"}"#)).unwrap();
        assert_eq!(classified.component, Component::Sensor);
        assert_eq!(classified.state.to_string(), "21.5");
        assert_eq!(classified.unit.as_deref(), Some("°C"));
    }

    #[test]
    fn test_integer_renders_without_fraction() {
        let classified = classify(&field(r#"{"valueNumber": 21}"#)).unwrap();
        assert_eq!(classified.state.to_string(), "21");
    }

    #[test]
    fn test_classify_string() {
        let classified = classify(&field(r#"{"valueString": "ok"}"#)).unwrap();
        assert_eq!(classified.component, Component::Sensor);
        assert_eq!(classified.state, StateValue::Text("ok".to_string()));
    }

    #[test]
    fn test_empty_object_is_unclassifiable() {
        assert!(classify(&field("{}")).is_none());
    }

    #[test]
    fn test_boolean_takes_precedence() {
        let classified =
            classify(&field(r#"{"valueBoolean": false, "valueNumber": 3}"#)).unwrap();
        assert_eq!(classified.component, Component::BinarySensor);
        assert_eq!(classified.state, StateValue::Bool(false));
    }

    #[test]
    fn test_error_information_forces_binary_sensor() {
        let classified = classify(&field(
            r#"{"valueNumber": 1, "informationType": "ERROR_INFORMATION"}"#,
        ))
        .unwrap();
        assert_eq!(classified.component, Component::BinarySensor);
        assert_eq!(classified.state.to_string(), "1");

        // Other tags leave the classification alone.
        let classified = classify(&field(
            r#"{"valueNumber": 1, "informationType": "MEASUREMENT"}"#,
        ))
        .unwrap();
        assert_eq!(classified.component, Component::Sensor);
    }

    #[test]
    fn test_empty_unit_is_absent() {
        let classified = classify(&field(r#"{"valueNumber": 7, "unit": ""}"#)).unwrap();
        assert!(classified.unit.is_none());
    }
}
