use std::collections::HashMap;
use std::str::FromStr;

/// Flag/value pairs read from a sidecar command line.
///
/// Tokens are consumed two at a time as `flag value`. A trailing token without a value is
/// dropped and a repeated flag keeps its last value. Nothing here validates flag names, so
/// unknown flags simply sit in the map unread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidecarArgs {
    values: HashMap<String, String>,
}

impl SidecarArgs {
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Self {
        let values = tokens
            .chunks_exact(2)
            .map(|pair| (pair[0].as_ref().to_string(), pair[1].as_ref().to_string()))
            .collect();
        Self { values }
    }

    pub fn get(&self, flag: &str) -> Option<&str> {
        self.values.get(flag).map(String::as_str)
    }

    /// Value of `flag`, or `""` when absent.
    pub fn get_or_empty(&self, flag: &str) -> &str {
        self.get(flag).unwrap_or_default()
    }

    /// `flag` parsed as `T`, falling back to `default` when absent or unparsable.
    pub fn parsed_or<T: FromStr>(&self, flag: &str, default: T) -> T {
        self.get(flag)
            .and_then(|value| value.parse().ok())
            .unwrap_or(default)
    }

    pub fn port_or(&self, flag: &str, default: u16) -> u16 {
        self.parsed_or(flag, default)
    }

    pub fn bool_or(&self, flag: &str, default: bool) -> bool {
        self.get(flag).and_then(parse_bool).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Boolean spellings the sidecar itself accepts on its command line.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
