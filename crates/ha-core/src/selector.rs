//! Selectors used in config flow form schemas

use serde::Serialize;

/// One choice in a select selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    /// Value submitted and stored
    pub value: &'static str,
    /// Label shown to the user
    pub label: &'static str,
}

impl SelectOption {
    pub const fn new(value: &'static str, label: &'static str) -> Self {
        Self { value, label }
    }
}

/// Configuration of a select selector
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SelectSelectorConfig {
    pub options: &'static [SelectOption],
    /// Allow selecting more than one value
    pub multiple: bool,
}

impl SelectSelectorConfig {
    pub const fn new(options: &'static [SelectOption]) -> Self {
        Self {
            options,
            multiple: false,
        }
    }

    /// Check whether a submitted value is one of the options
    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static OPTIONS: &[SelectOption] = &[SelectOption::new("a", "A"), SelectOption::new("b", "B")];

    #[test]
    fn test_contains() {
        let config = SelectSelectorConfig::new(OPTIONS);
        assert!(config.contains("a"));
        assert!(!config.contains("A"));
        assert!(!config.multiple);
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_value(SelectSelectorConfig::new(OPTIONS)).unwrap();
        assert_eq!(json["options"][1]["value"], "b");
        assert_eq!(json["options"][1]["label"], "B");
    }
}
