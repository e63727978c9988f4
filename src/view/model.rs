use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Named string arguments a view is prepared with (query parameters)
pub type Arguments = BTreeMap<String, String>;

/// Template identifier plus the named values it renders.
///
/// Handlers may keep adding objects before handing it to the web layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseModel {
    view_name: String,
    model: BTreeMap<String, Value>,
}

impl ResponseModel {
    pub fn new<T: Into<String>>(view_name: T) -> Self {
        Self {
            view_name: view_name.into(),
            model: BTreeMap::new(),
        }
    }

    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    pub fn set_view_name<T: Into<String>>(&mut self, view_name: T) {
        self.view_name = view_name.into();
    }

    pub fn add_object<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> &mut Self {
        self.model.insert(key.into(), value.into());
        self
    }

    pub fn with_object<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.add_object(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.model.get(key)
    }

    pub fn model(&self) -> &BTreeMap<String, Value> {
        &self.model
    }
}
