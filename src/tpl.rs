use std::collections::BTreeMap;
use std::path::PathBuf;

/// Resolves `$VARIABLE` references in manifest values
pub struct Tpl {
    variables: BTreeMap<String, String>,
}

impl Tpl {
    pub fn new() -> Self {
        Self {
            variables: BTreeMap::new(),
        }
    }

    pub fn register<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.variables.insert(key.into(), value.into());
    }

    /// Substitute every registered variable, longest names first so that
    /// `$NAME` never clobbers a longer `$NAME_SUFFIX`.
    pub fn parse(&self, input: &str) -> String {
        let mut keys: Vec<&String> = self.variables.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let mut result = input.to_string();
        for key in keys {
            let pattern = format!("${}", key);
            result = result.replace(&pattern, &self.variables[key]);
        }
        result
    }

    pub fn parse_vec(&self, input: &[String]) -> Vec<String> {
        input.iter().map(|s| self.parse(s)).collect()
    }

    pub fn parse_path(&self, input: &str) -> PathBuf {
        PathBuf::from(self.parse(input))
    }
}

impl Default for Tpl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parsing() {
        let mut tpl = Tpl::new();
        tpl.register("NAME", "qcadoo-schema");
        tpl.register("SHORT_VERSION", "1.3");

        let result = tpl.parse("target/$NAME-$SHORT_VERSION.zip");
        assert_eq!(result, "target/qcadoo-schema-1.3.zip");
    }

    #[test]
    fn test_longest_variable_wins() {
        let mut tpl = Tpl::new();
        tpl.register("NAME", "a");
        tpl.register("NAME_DIR", "b");

        assert_eq!(tpl.parse("$NAME_DIR/$NAME"), "b/a");
    }

    #[test]
    fn test_unknown_variables_are_left_alone() {
        let tpl = Tpl::new();
        assert_eq!(tpl.parse("$HOME/schema"), "$HOME/schema");
    }
}
