use super::error::ViewError;
use super::event::EventRequest;
use super::locale::Locale;
use super::model::{Arguments, ResponseModel};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// The rendering engine behind the facade.
///
/// `State` is the engine's mutable view definition state: opened from the
/// client's component state, mutated by events and finally rendered.
pub trait ViewEngine: Send + Sync {
    type State: Send;

    fn prepare(
        &self,
        plugin: &str,
        view: &str,
        arguments: &Arguments,
        locale: &Locale,
    ) -> Result<ResponseModel, ViewError>;

    fn open(
        &self,
        plugin: &str,
        view: &str,
        components: &Map<String, Value>,
        locale: &Locale,
    ) -> Result<Self::State, ViewError>;

    fn apply_event(&self, state: &mut Self::State, event: &EventRequest) -> Result<(), ViewError>;

    fn render(&self, state: &Self::State) -> Result<Value, ViewError>;
}

impl<E: ViewEngine> ViewEngine for Arc<E> {
    type State = E::State;

    fn prepare(
        &self,
        plugin: &str,
        view: &str,
        arguments: &Arguments,
        locale: &Locale,
    ) -> Result<ResponseModel, ViewError> {
        (**self).prepare(plugin, view, arguments, locale)
    }

    fn open(
        &self,
        plugin: &str,
        view: &str,
        components: &Map<String, Value>,
        locale: &Locale,
    ) -> Result<Self::State, ViewError> {
        (**self).open(plugin, view, components, locale)
    }

    fn apply_event(&self, state: &mut Self::State, event: &EventRequest) -> Result<(), ViewError> {
        (**self).apply_event(state, event)
    }

    fn render(&self, state: &Self::State) -> Result<Value, ViewError> {
        (**self).render(state)
    }
}

/// High-level entry points for web request handlers.
///
/// Every view is addressed by plugin identifier, view name and locale.
/// A handler typically prepares the initial page:
///
/// ```ignore
/// let mut mav = crud.prepare_view("examplePlugin", "exampleView", &arguments, &locale)?;
/// mav.add_object("headerClass", "successHeader");
/// ```
pub trait CrudService: Send + Sync {
    type State;

    /// Response model for the initial display of a view
    fn prepare_view(
        &self,
        plugin: &str,
        view: &str,
        arguments: &Arguments,
        locale: &Locale,
    ) -> Result<ResponseModel, ViewError>;

    #[deprecated(note = "use `invoke_event_and_render_view`")]
    fn perform_event(
        &self,
        plugin: &str,
        view: &str,
        body: &Value,
        locale: &Locale,
    ) -> Result<Value, ViewError> {
        self.invoke_event_and_render_view(plugin, view, body, locale)
    }

    /// Apply the event in `body` and render the resulting state
    fn invoke_event_and_render_view(
        &self,
        plugin: &str,
        view: &str,
        body: &Value,
        locale: &Locale,
    ) -> Result<Value, ViewError> {
        let state = self.invoke_event(plugin, view, body, locale)?;
        self.render_view(&state)
    }

    /// Apply the event in `body` and hand back the state unrendered
    fn invoke_event(
        &self,
        plugin: &str,
        view: &str,
        body: &Value,
        locale: &Locale,
    ) -> Result<Self::State, ViewError>;

    fn render_view(&self, state: &Self::State) -> Result<Value, ViewError>;
}

/// [`CrudService`] forwarding to a [`ViewEngine`]
pub struct EngineCrudService<E> {
    engine: E,
}

impl<E: ViewEngine> EngineCrudService<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

fn check_address(plugin: &str, view: &str) -> Result<(), ViewError> {
    if plugin.trim().is_empty() || view.trim().is_empty() {
        return Err(ViewError::not_found(plugin, view));
    }
    Ok(())
}

impl<E: ViewEngine> CrudService for EngineCrudService<E> {
    type State = E::State;

    fn prepare_view(
        &self,
        plugin: &str,
        view: &str,
        arguments: &Arguments,
        locale: &Locale,
    ) -> Result<ResponseModel, ViewError> {
        check_address(plugin, view)?;
        debug!(plugin, view, %locale, arguments = arguments.len(), "preparing view");
        self.engine.prepare(plugin, view, arguments, locale)
    }

    fn invoke_event(
        &self,
        plugin: &str,
        view: &str,
        body: &Value,
        locale: &Locale,
    ) -> Result<Self::State, ViewError> {
        check_address(plugin, view)?;
        let event = EventRequest::from_body(body)?;
        debug!(plugin, view, %locale, event = %event.name, "invoking event");

        let mut state = self.engine.open(plugin, view, &event.components, locale)?;
        self.engine.apply_event(&mut state, &event)?;
        Ok(state)
    }

    fn render_view(&self, state: &Self::State) -> Result<Value, ViewError> {
        self.engine.render(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A counter view: `increment` adds the first arg (or 1), `reset` zeroes it
    #[derive(Default)]
    struct CounterEngine {
        opened: AtomicUsize,
    }

    struct CounterState {
        value: i64,
        locale: Locale,
    }

    impl ViewEngine for CounterEngine {
        type State = CounterState;

        fn prepare(
            &self,
            plugin: &str,
            view: &str,
            arguments: &Arguments,
            locale: &Locale,
        ) -> Result<ResponseModel, ViewError> {
            if (plugin, view) != ("demo", "counter") {
                return Err(ViewError::not_found(plugin, view));
            }
            let mut mav = ResponseModel::new("crud/crudView");
            mav.add_object("viewName", view)
                .add_object("pluginIdentifier", plugin)
                .add_object("locale", locale.to_string())
                .add_object("popup", arguments.get("popup").is_some_and(|p| p == "true"));
            Ok(mav)
        }

        fn open(
            &self,
            plugin: &str,
            view: &str,
            components: &Map<String, Value>,
            locale: &Locale,
        ) -> Result<CounterState, ViewError> {
            if (plugin, view) != ("demo", "counter") {
                return Err(ViewError::not_found(plugin, view));
            }
            self.opened.fetch_add(1, Ordering::SeqCst);
            let value = components
                .get("counter")
                .and_then(|c| c.get("value"))
                .and_then(Value::as_i64)
                .unwrap_or(0);
            Ok(CounterState {
                value,
                locale: locale.clone(),
            })
        }

        fn apply_event(&self, state: &mut CounterState, event: &EventRequest) -> Result<(), ViewError> {
            match event.name.as_str() {
                "increment" => {
                    let step = event
                        .args
                        .first()
                        .map(|a| a.parse::<i64>())
                        .transpose()
                        .map_err(|_| ViewError::MalformedBody("step is not a number".to_string()))?
                        .unwrap_or(1);
                    state.value += step;
                    Ok(())
                }
                "reset" => {
                    state.value = 0;
                    Ok(())
                }
                other => Err(ViewError::UnknownEvent {
                    view: "counter".to_string(),
                    event: other.to_string(),
                }),
            }
        }

        fn render(&self, state: &CounterState) -> Result<Value, ViewError> {
            Ok(json!({
                "components": { "counter": { "value": state.value } },
                "locale": state.locale.to_string(),
            }))
        }
    }

    fn service() -> EngineCrudService<CounterEngine> {
        EngineCrudService::new(CounterEngine::default())
    }

    fn increment(by: &str, from: i64) -> Value {
        json!({
            "event": { "name": "increment", "args": [by] },
            "components": { "counter": { "value": from } }
        })
    }

    #[test]
    fn test_prepare_view() {
        let mut args = Arguments::new();
        args.insert("popup".to_string(), "true".to_string());
        let locale: Locale = "pl_PL".parse().unwrap();

        let mav = service().prepare_view("demo", "counter", &args, &locale).unwrap();
        assert_eq!(mav.view_name(), "crud/crudView");
        assert_eq!(mav.get("popup"), Some(&Value::Bool(true)));
        assert_eq!(mav.get("locale").unwrap(), "pl-PL");
    }

    #[test]
    fn test_invoke_event_then_render() {
        let crud = service();
        let locale = Locale::default();

        let mut state = crud.invoke_event("demo", "counter", &increment("5", 10), &locale).unwrap();
        assert_eq!(state.value, 15);

        state.value *= 2;
        let rendered = crud.render_view(&state).unwrap();
        assert_eq!(rendered["components"]["counter"]["value"], 30);
    }

    #[test]
    fn test_rendering_is_repeatable() {
        let crud = service();
        let locale = Locale::default();
        let body = increment("3", 1);

        let first = crud.invoke_event_and_render_view("demo", "counter", &body, &locale).unwrap();
        let second = crud.invoke_event_and_render_view("demo", "counter", &body, &locale).unwrap();
        assert_eq!(first, second);
        assert_eq!(first["components"]["counter"]["value"], 4);
        assert_eq!(crud.engine().opened.load(Ordering::SeqCst), 2);
    }

    #[test]
    #[allow(deprecated)]
    fn test_perform_event_matches_successor() {
        let crud = service();
        let locale = Locale::default();
        let body = json!({ "event": { "name": "reset" }, "components": { "counter": { "value": 9 } } });

        assert_eq!(
            crud.perform_event("demo", "counter", &body, &locale).unwrap(),
            crud.invoke_event_and_render_view("demo", "counter", &body, &locale).unwrap()
        );
    }

    #[test]
    fn test_errors() {
        let crud = service();
        let locale = Locale::default();

        let err = crud
            .invoke_event("demo", "missing", &increment("1", 0), &locale)
            .err()
            .unwrap();
        assert!(matches!(err, ViewError::ViewNotFound { .. }));

        let err = crud
            .invoke_event("", "counter", &increment("1", 0), &locale)
            .err()
            .unwrap();
        assert!(matches!(err, ViewError::ViewNotFound { .. }));

        let err = crud
            .invoke_event("demo", "counter", &json!({ "event": {} }), &locale)
            .err()
            .unwrap();
        assert!(matches!(err, ViewError::MalformedBody(_)));
        assert_eq!(crud.engine().opened.load(Ordering::SeqCst), 0);

        let body = json!({ "event": { "name": "explode" } });
        let err = crud.invoke_event("demo", "counter", &body, &locale).err().unwrap();
        assert!(matches!(err, ViewError::UnknownEvent { .. }));
        assert!(err.is_user_facing());
    }

    #[test]
    fn test_shared_engine_across_threads() {
        let engine = Arc::new(CounterEngine::default());
        let crud = Arc::new(EngineCrudService::new(Arc::clone(&engine)));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let crud = Arc::clone(&crud);
                std::thread::spawn(move || {
                    crud.invoke_event_and_render_view(
                        "demo",
                        "counter",
                        &increment(&i.to_string(), 0),
                        &Locale::default(),
                    )
                    .unwrap()
                })
            })
            .collect();

        let mut values: Vec<i64> = handles
            .into_iter()
            .map(|h| h.join().unwrap()["components"]["counter"]["value"].as_i64().unwrap())
            .collect();
        values.sort();
        assert_eq!(values, vec![0, 1, 2, 3]);
        assert_eq!(engine.opened.load(Ordering::SeqCst), 4);
    }
}
