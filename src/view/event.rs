use super::error::ViewError;
use serde_json::{Map, Value};

/// An event carried in a request body:
///
/// ```json
/// { "event": { "name": "save", "component": "form", "args": ["x"] },
///   "components": { "form": { ... } } }
/// ```
///
/// `components` holds the client-side view state the event is applied to.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRequest {
    pub name: String,
    pub component: Option<String>,
    pub args: Vec<String>,
    pub components: Map<String, Value>,
}

impl EventRequest {
    pub fn from_body(body: &Value) -> Result<Self, ViewError> {
        let malformed = |msg: &str| ViewError::MalformedBody(msg.to_string());

        let root = body.as_object().ok_or_else(|| malformed("body is not an object"))?;
        let event = root
            .get("event")
            .and_then(Value::as_object)
            .ok_or_else(|| malformed("missing event object"))?;

        let name = event
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| malformed("missing event name"))?
            .to_string();

        let component = match event.get("component") {
            None | Some(Value::Null) => None,
            Some(Value::String(c)) => Some(c.clone()),
            Some(_) => return Err(malformed("event component must be a string")),
        };

        let args: Vec<String> = match event.get("args") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => Ok(n.to_string()),
                    Value::Bool(b) => Ok(b.to_string()),
                    _ => Err(malformed("event args must be scalars")),
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(malformed("event args must be an array")),
        };

        let components = match root.get("components") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(c)) => c.clone(),
            Some(_) => return Err(malformed("components must be an object")),
        };

        Ok(EventRequest {
            name,
            component,
            args,
            components,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_body() {
        let body = json!({
            "event": { "name": "save", "component": "form", "args": ["a", 2, true] },
            "components": { "form": { "value": 1 } }
        });
        let event = EventRequest::from_body(&body).unwrap();
        assert_eq!(event.name, "save");
        assert_eq!(event.component.as_deref(), Some("form"));
        assert_eq!(event.args, vec!["a", "2", "true"]);
        assert_eq!(event.components["form"]["value"], 1);
    }

    #[test]
    fn test_minimal_body() {
        let event = EventRequest::from_body(&json!({ "event": { "name": "initialize" } })).unwrap();
        assert!(event.component.is_none());
        assert!(event.args.is_empty());
        assert!(event.components.is_empty());
    }

    #[test]
    fn test_malformed_bodies() {
        let bodies = [
            json!([]),
            json!({}),
            json!({ "event": "save" }),
            json!({ "event": { "name": "" } }),
            json!({ "event": { "name": "save", "component": 3 } }),
            json!({ "event": { "name": "save", "args": "x" } }),
            json!({ "event": { "name": "save", "args": [{}] } }),
            json!({ "event": { "name": "save" }, "components": [] }),
        ];
        for body in bodies {
            assert!(
                matches!(EventRequest::from_body(&body), Err(ViewError::MalformedBody(_))),
                "{body}"
            );
        }
    }
}
