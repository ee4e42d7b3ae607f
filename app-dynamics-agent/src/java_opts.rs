//! Ordered collection of the options handed to the JVM of the launched application.
use crate::application::Droplet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum JavaOptsError {
    #[error("system property `{0}` is already set")]
    DuplicatedProperty(String),
    #[error("a java agent is already set")]
    DuplicatedJavaAgent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OptValue {
    Text(String),
    /// Filesystem path, rendered relative to the runtime working directory when inside the droplet.
    Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JavaOpt {
    JavaAgent(PathBuf),
    SystemProperty { key: String, value: OptValue },
}

/// Options keep their insertion order. A property key can only be set once and there is at most
/// one java agent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct JavaOpts(Vec<JavaOpt>);

impl JavaOpts {
    pub fn add_java_agent(&mut self, path: impl Into<PathBuf>) -> Result<&mut Self, JavaOptsError> {
        if self.java_agent().is_some() {
            return Err(JavaOptsError::DuplicatedJavaAgent);
        }
        self.0.push(JavaOpt::JavaAgent(path.into()));
        Ok(self)
    }

    pub fn add_system_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, JavaOptsError> {
        self.push_property(key.into(), OptValue::Text(value.into()))
    }

    pub fn add_path_property(
        &mut self,
        key: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Result<&mut Self, JavaOptsError> {
        self.push_property(key.into(), OptValue::Path(path.into()))
    }

    fn push_property(&mut self, key: String, value: OptValue) -> Result<&mut Self, JavaOptsError> {
        if self.system_property(&key).is_some() {
            return Err(JavaOptsError::DuplicatedProperty(key));
        }
        self.0.push(JavaOpt::SystemProperty { key, value });
        Ok(self)
    }

    /// Appends every option of `other`, keeping its order. Nothing is appended if any of them
    /// clashes with an option already present.
    pub fn append(&mut self, other: JavaOpts) -> Result<&mut Self, JavaOptsError> {
        let mut merged = self.clone();
        for opt in other.0 {
            match opt {
                JavaOpt::JavaAgent(path) => merged.add_java_agent(path)?,
                JavaOpt::SystemProperty { key, value } => merged.push_property(key, value)?,
            };
        }
        *self = merged;
        Ok(self)
    }

    pub fn system_property(&self, key: &str) -> Option<&OptValue> {
        self.0.iter().find_map(|opt| match opt {
            JavaOpt::SystemProperty { key: k, value } if k == key => Some(value),
            _ => None,
        })
    }

    pub fn java_agent(&self) -> Option<&Path> {
        self.0.iter().find_map(|opt| match opt {
            JavaOpt::JavaAgent(path) => Some(path.as_path()),
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &JavaOpt> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the options as command line arguments, shell-escaped.
    pub fn render(&self, droplet: &Droplet) -> Vec<String> {
        self.0
            .iter()
            .map(|opt| match opt {
                JavaOpt::JavaAgent(path) => {
                    format!("-javaagent:{}", render_path(droplet, path))
                }
                JavaOpt::SystemProperty { key, value } => {
                    let value = match value {
                        OptValue::Text(text) => escape(text),
                        OptValue::Path(path) => render_path(droplet, path),
                    };
                    format!("-D{}={}", escape(key), value)
                }
            })
            .collect()
    }
}

fn render_path(droplet: &Droplet, path: &Path) -> String {
    let qualified = droplet.qualify(path);
    match qualified.strip_prefix("$PWD/") {
        Some(relative) => format!("$PWD/{}", escape(relative)),
        None => escape(&qualified),
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            // a backslash-newline is a line continuation, the newline has to be quoted
            '\n' => escaped.push_str("'\n'"),
            c if c.is_ascii_alphanumeric() || ",._+:@%/=-".contains(c) => escaped.push(c),
            c => {
                escaped.push('\\');
                escaped.push(c);
            }
        }
    }
    escaped
}
