//! Services bound to the application and the credentials they expose.
//!
//! Bindings are selected by a [ServiceFilter] matched against the binding name, label and tags.
//! Lookups follow an "exactly one must match" contract: when several bindings match the same
//! filter none of them is returned, see [select_binding].
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServicesError {
    #[error("invalid services definition: {0}")]
    InvalidDefinition(String),
    #[error("invalid service filter `{0}`: {1}")]
    InvalidFilter(String, String),
}

/// Returns the textual form of a scalar JSON value. Nulls are absent, composite values are kept as
/// their JSON representation.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        _ => Some(value.to_string()),
    }
}

/// Credentials of a service binding, as strings.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Credentials(HashMap<String, String>);

impl Credentials {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Same as [Credentials::get] but treats empty values as absent.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

impl<'de> Deserialize<'de> for Credentials {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = HashMap::<String, Value>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .filter_map(|(k, v)| scalar_to_string(&v).map(|v| (k, v)))
                .collect(),
        ))
    }
}

impl<K, V> FromIterator<(K, V)> for Credentials
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct ServiceBinding {
    #[serde(default)]
    name: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    credentials: Credentials,
}

impl ServiceBinding {
    pub fn new(name: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            name: name.into(),
            credentials,
            ..Default::default()
        }
    }

    pub fn with_label(self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..self
        }
    }

    pub fn with_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

/// Case-sensitivity and anchoring are part of the pattern itself.
#[derive(Debug, Clone)]
pub struct ServiceFilter(Regex);

impl ServiceFilter {
    pub fn is_match(&self, binding: &ServiceBinding) -> bool {
        self.0.is_match(&binding.name)
            || self.0.is_match(&binding.label)
            || binding.tags.iter().any(|tag| self.0.is_match(tag))
    }
}

impl fmt::Display for ServiceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl TryFrom<&str> for ServiceFilter {
    type Error = ServicesError;

    fn try_from(pattern: &str) -> Result<Self, Self::Error> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|err| ServicesError::InvalidFilter(pattern.to_string(), err.to_string()))
    }
}

/// Returns the only binding satisfying `predicate`. Nothing is returned when no binding or more
/// than one binding matches.
pub fn select_binding<P>(bindings: &[ServiceBinding], predicate: P) -> Option<&ServiceBinding>
where
    P: Fn(&ServiceBinding) -> bool,
{
    let mut matching = bindings.iter().filter(|b| predicate(b));
    let first = matching.next()?;
    matching.next().is_none().then_some(first)
}

pub trait ServiceRegistry {
    /// The unique binding matching `filter`, if any.
    fn find_service(&self, filter: &ServiceFilter) -> Option<&ServiceBinding>;

    /// Whether exactly one binding matches `filter` and it carries every credential in `required`.
    fn one_service(&self, filter: &ServiceFilter, required: &[&str]) -> bool {
        self.find_service(filter).is_some_and(|binding| {
            required
                .iter()
                .all(|key| binding.credentials().non_empty(key).is_some())
        })
    }
}

/// Every service bound to the application.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Services(Vec<ServiceBinding>);

impl Services {
    /// Parses the `VCAP_SERVICES` document: a map from service label to the bindings of that
    /// service. Bindings without an explicit label take the one of their group.
    pub fn from_vcap_services(content: &str) -> Result<Self, ServicesError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let grouped: BTreeMap<String, Vec<ServiceBinding>> = serde_json::from_str(content)
            .map_err(|err| ServicesError::InvalidDefinition(err.to_string()))?;
        let bindings = grouped
            .into_iter()
            .flat_map(|(label, bindings)| {
                bindings.into_iter().map(move |binding| {
                    if binding.label.is_empty() {
                        binding.with_label(label.clone())
                    } else {
                        binding
                    }
                })
            })
            .collect();
        Ok(Self(bindings))
    }

    pub fn bindings(&self) -> &[ServiceBinding] {
        &self.0
    }
}

impl From<Vec<ServiceBinding>> for Services {
    fn from(bindings: Vec<ServiceBinding>) -> Self {
        Self(bindings)
    }
}

impl ServiceRegistry for Services {
    fn find_service(&self, filter: &ServiceFilter) -> Option<&ServiceBinding> {
        select_binding(&self.0, |binding| filter.is_match(binding))
    }
}
