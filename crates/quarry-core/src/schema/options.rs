use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `key=value` options parsed from a table or column comment.
///
/// Pairs are separated by `;` or `,` and may be wrapped in `{...}`; text
/// outside the braces is ignored. Values may be double-quoted. A key with no
/// `=` is stored with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(IndexMap<String, String>);

impl Options {
    pub fn parse(comment: &str) -> Options {
        let body = match (comment.find('{'), comment.rfind('}')) {
            (Some(start), Some(end)) if start < end => &comment[start + 1..end],
            _ if comment.contains('=') => comment,
            _ => return Options::default(),
        };

        let mut options = IndexMap::new();
        for pair in body.split([';', ',']) {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }

            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => (pair, ""),
            };

            if key.is_empty() {
                continue;
            }

            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);

            options.insert(key.to_string(), value.to_string());
        }

        Options(options)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
