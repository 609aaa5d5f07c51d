//! Argument interpreter: turns raw command-line tokens into an [`OptionMap`].
//!
//! The interpreter does not know which flags exist. Unknown flags are kept in
//! the map and left for the dispatcher's fallback path.

use std::collections::HashMap;

/// Reserved key under which positional (non-flag) tokens are exposed.
pub const POSITIONAL_KEY: &str = "_positional";

/// Value attached to a flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Flag present without a value.
    Flag,
    /// Flag followed by a non-flag token.
    Text(String),
}

impl OptionValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag => None,
        }
    }
}

/// Parsed representation of one command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    options: HashMap<String, OptionValue>,
    positional: Vec<String>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a bare flag.
    pub fn with_flag(mut self, key: &str) -> Self {
        self.options.insert(key.to_string(), OptionValue::Flag);
        self
    }

    /// Builder-style insert of a flag carrying a value.
    pub fn with_text(mut self, key: &str, value: impl Into<String>) -> Self {
        self.options
            .insert(key.to_string(), OptionValue::Text(value.into()));
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) {
        self.options.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        if key == POSITIONAL_KEY {
            return !self.positional.is_empty();
        }
        self.options.contains_key(key)
    }

    /// True when `key` is present and not an empty string.
    ///
    /// A bare flag counts; `--summarize ""` does not.
    pub fn is_truthy(&self, key: &str) -> bool {
        if key == POSITIONAL_KEY {
            return !self.positional.is_empty();
        }
        match self.options.get(key) {
            Some(OptionValue::Flag) => true,
            Some(OptionValue::Text(text)) => !text.is_empty(),
            None => false,
        }
    }

    /// Text value of `key`, if the flag was given a value.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(OptionValue::as_text)
    }

    /// Text value of `key`, or `default` when absent or valueless.
    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.text(key).unwrap_or(default)
    }

    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// True when no flags and no positional tokens were given.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty() && self.positional.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }
}

fn is_flag(token: &str) -> bool {
    token.starts_with('-')
}

/// Parses `tokens` left to right with a single cursor.
///
/// `--name value` stores a text value unless `value` itself starts with a
/// dash, `-x` is always a bare flag, everything else is positional.
pub fn parse<S: AsRef<str>>(tokens: &[S]) -> OptionMap {
    let mut map = OptionMap::new();
    let mut cursor = 0;

    while cursor < tokens.len() {
        let token = tokens[cursor].as_ref();

        if let Some(key) = token.strip_prefix("--") {
            match tokens.get(cursor + 1).map(AsRef::as_ref) {
                Some(next) if !is_flag(next) => {
                    map.insert(key, OptionValue::Text(next.to_string()));
                    cursor += 1;
                }
                _ => map.insert(key, OptionValue::Flag),
            }
        } else if let Some(key) = token.strip_prefix('-') {
            map.insert(key, OptionValue::Flag);
        } else {
            map.positional.push(token.to_string());
        }

        cursor += 1;
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tokens_yield_empty_map() {
        let map = parse::<&str>(&[]);
        assert!(map.is_empty());
        assert!(!map.contains(POSITIONAL_KEY));
    }

    #[test]
    fn test_long_flag_consumes_following_value() {
        let map = parse(&["--find", "foo"]);
        assert_eq!(map.get("find"), Some(&OptionValue::Text("foo".to_string())));
        assert!(map.positional().is_empty());
    }

    #[test]
    fn test_long_flag_never_consumes_another_flag() {
        let map = parse(&["--a", "--b"]);
        assert_eq!(map.get("a"), Some(&OptionValue::Flag));
        assert_eq!(map.get("b"), Some(&OptionValue::Flag));
    }

    #[test]
    fn test_long_flag_never_consumes_short_flag() {
        let map = parse(&["--idea", "-v"]);
        assert_eq!(map.get("idea"), Some(&OptionValue::Flag));
        assert_eq!(map.get("v"), Some(&OptionValue::Flag));
    }

    #[test]
    fn test_trailing_long_flag_is_boolean() {
        let map = parse(&["--translate", "Hello", "--lang"]);
        assert_eq!(map.text("translate"), Some("Hello"));
        assert_eq!(map.get("lang"), Some(&OptionValue::Flag));
    }

    #[test]
    fn test_short_flag_never_consumes_value() {
        let map = parse(&["-h", "topic"]);
        assert_eq!(map.get("h"), Some(&OptionValue::Flag));
        assert_eq!(map.positional(), ["topic".to_string()]);
    }

    #[test]
    fn test_positionals_keep_input_order() {
        let map = parse(&["one", "--ls", "two", "-v", "three"]);
        // "two" is consumed as the value of --ls
        assert_eq!(map.text("ls"), Some("two"));
        assert_eq!(map.positional(), ["one".to_string(), "three".to_string()]);
        assert!(map.contains(POSITIONAL_KEY));
    }

    #[test]
    fn test_translate_with_lang() {
        let map = parse(&["--translate", "Hello world", "--lang", "fr"]);
        assert_eq!(map.text("translate"), Some("Hello world"));
        assert_eq!(map.text_or("lang", "es"), "fr");
    }

    #[test]
    fn test_text_or_falls_back_for_bare_flag() {
        let map = parse(&["--idea", "--type"]);
        assert_eq!(map.text_or("type", "general"), "general");
    }

    #[test]
    fn test_empty_value_is_present_but_not_truthy() {
        let map = parse(&["--summarize", "", "--ls"]);
        assert!(map.contains("summarize"));
        assert!(!map.is_truthy("summarize"));
        assert!(map.is_truthy("ls"));
        assert!(!map.is_truthy("missing"));
        assert!(parse(&["--find", " "]).is_truthy("find"));
    }

    #[test]
    fn test_repeated_key_keeps_last_value() {
        let map = parse(&["--lang", "fr", "--lang", "de"]);
        assert_eq!(map.text("lang"), Some("de"));
    }

    #[test]
    fn test_builder_matches_parsed_shape() {
        let built = OptionMap::new().with_text("translate", "Hi").with_text("lang", "es");
        let parsed = parse(&["--translate", "Hi", "--lang", "es"]);
        assert_eq!(built, parsed);
    }
}
