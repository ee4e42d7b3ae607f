//! Application being staged: its declared metadata and the droplet directory it is staged into.
use crate::defaults::{APPLICATION_NAME_KEY, BUILDPACK_DIR, COMPONENT_ID};
use crate::services::scalar_to_string;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("invalid application metadata: {0}")]
pub struct ApplicationMetadataError(String);

/// Read-only view over the application metadata provided by the platform (`VCAP_APPLICATION`).
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ApplicationMetadata(HashMap<String, Value>);

impl ApplicationMetadata {
    pub fn from_json(content: &str) -> Result<Self, ApplicationMetadataError> {
        serde_json::from_str(content).map_err(|err| ApplicationMetadataError(err.to_string()))
    }

    /// Returns the value for `key` in its textual form. Null values are treated as absent.
    pub fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(scalar_to_string)
    }

    pub fn application_name(&self) -> Option<String> {
        self.get(APPLICATION_NAME_KEY)
    }
}

impl<K, V> FromIterator<(K, V)> for ApplicationMetadata
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        )
    }
}

/// Directory layout of the application being staged.
///
/// The sandbox is the private directory of this component inside the droplet. Paths handed to the
/// launched process are qualified against `$PWD` because the droplet is relocated between staging
/// and runtime. The root is made absolute and free of `.` and `..` components, so every path
/// derived from it is accepted by the `fs` helpers.
#[derive(Debug, Clone, PartialEq)]
pub struct Droplet {
    root: PathBuf,
    sandbox: PathBuf,
}

impl Droplet {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = normalize(root.into());
        let sandbox = root.join(BUILDPACK_DIR).join(COMPONENT_ID);
        Self { root, sandbox }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sandbox(&self) -> &Path {
        &self.sandbox
    }

    /// Renders `path` relative to the runtime working directory when it lives inside the droplet.
    pub fn qualify(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(relative) => format!("$PWD/{}", relative.display()),
            Err(_) => path.display().to_string(),
        }
    }
}

fn normalize(path: PathBuf) -> PathBuf {
    let path = std::path::absolute(&path).unwrap_or(path);
    path.components()
        .fold(PathBuf::new(), |mut normalized, component| {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    normalized.pop();
                }
                other => normalized.push(other),
            }
            normalized
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_from_json() {
        let metadata = ApplicationMetadata::from_json(
            r#"{"application_name": "myapp", "instance_index": 0, "space_id": null}"#,
        )
        .unwrap();

        assert_eq!(metadata.application_name(), Some("myapp".to_string()));
        assert_eq!(metadata.get("instance_index"), Some("0".to_string()));
        assert_eq!(metadata.get("space_id"), None);
        assert_eq!(metadata.get("missing"), None);
    }

    #[test]
    fn test_metadata_invalid_json() {
        assert!(ApplicationMetadata::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_droplet_layout() {
        let droplet = Droplet::new("/tmp/app");
        assert_eq!(
            droplet.sandbox(),
            Path::new("/tmp/app/.java-buildpack/app_dynamics_agent")
        );
        assert_eq!(
            droplet.qualify(&droplet.sandbox().join("javaagent.jar")),
            "$PWD/.java-buildpack/app_dynamics_agent/javaagent.jar"
        );
        assert_eq!(droplet.qualify(Path::new("/opt/other")), "/opt/other");
    }

    #[test]
    fn test_droplet_root_is_normalized() {
        let droplet = Droplet::new("/tmp/build/./../app/");
        assert_eq!(droplet.root(), Path::new("/tmp/app"));
        assert_eq!(
            droplet.sandbox(),
            Path::new("/tmp/app/.java-buildpack/app_dynamics_agent")
        );
    }

    #[test]
    fn test_droplet_relative_root() {
        let droplet = Droplet::new("app");
        assert!(droplet.root().is_absolute());
        assert_eq!(
            droplet.root(),
            std::env::current_dir().unwrap().join("app")
        );
        assert_eq!(
            droplet.qualify(&droplet.sandbox().join("logs")),
            "$PWD/.java-buildpack/app_dynamics_agent/logs"
        );
    }
}
