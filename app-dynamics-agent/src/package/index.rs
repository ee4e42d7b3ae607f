//! Repository index: the YAML document mapping every available version to its download uri.
use serde_yaml::{Mapping, Value};
use std::cmp::Ordering;
use thiserror::Error;

const WILDCARD: &str = "+";

#[derive(Error, Debug)]
#[error("invalid repository index: {0}")]
pub struct IndexError(String);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RepositoryIndex(Vec<(String, String)>);

impl RepositoryIndex {
    pub fn from_yaml(content: &str) -> Result<Self, IndexError> {
        let mapping: Mapping =
            serde_yaml::from_str(content).map_err(|err| IndexError(err.to_string()))?;
        mapping
            .into_iter()
            .map(|(version, uri)| {
                let version = yaml_scalar(&version)
                    .ok_or_else(|| IndexError(format!("invalid version key: {version:?}")))?;
                let uri = yaml_scalar(&uri)
                    .ok_or_else(|| IndexError(format!("invalid uri for version {version}")))?;
                Ok((version, uri))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Returns the highest `(version, uri)` entry matching `pattern`.
    ///
    /// Versions are split in components on `.`, `_` and `-`. A `+` component in the pattern matches
    /// any value of that component and of every following one.
    pub fn resolve(&self, pattern: &str) -> Option<(&str, &str)> {
        let pattern = components(pattern);
        self.0
            .iter()
            .filter(|(version, _)| matches(&pattern, &components(version)))
            .max_by(|(a, _), (b, _)| compare_versions(a, b))
            .map(|(version, uri)| (version.as_str(), uri.as_str()))
    }
}

fn yaml_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn components(version: &str) -> Vec<&str> {
    version.split(['.', '_', '-']).collect()
}

fn matches(pattern: &[&str], version: &[&str]) -> bool {
    for (i, expected) in pattern.iter().enumerate() {
        if *expected == WILDCARD {
            return true;
        }
        if version.get(i) != Some(expected) {
            return false;
        }
    }
    pattern.len() == version.len()
}

fn compare_versions(a: &str, b: &str) -> Ordering {
    let (a, b) = (components(a), components(b));
    for (x, y) in a.iter().zip(b.iter()) {
        let ordering = match (x.parse::<u64>(), y.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => x.cmp(y),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.len().cmp(&b.len())
}
