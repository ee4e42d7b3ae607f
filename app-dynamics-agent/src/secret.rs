//! Hand-off of secret values to the agent.
//!
//! The agent reads some secrets (the proxy password) from a file instead of a system property, so
//! the value never shows up in the process command line. Files are written with owner-only
//! permissions and are not removed afterwards: the agent reads them for the whole application
//! lifetime.
use fs::file::writer::{FileWriter, WriteError};
use fs::LocalFile;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
#[error("could not store secret `{name}`: {err}")]
pub struct SecretError {
    name: String,
    err: WriteError,
}

pub trait SecretMaterializer {
    /// Stores `secret` under `name` and returns the path the agent reads it from.
    fn materialize(&self, name: &str, secret: &str) -> Result<PathBuf, SecretError>;
}

/// Writes each secret verbatim to a file named after it inside `directory`.
pub struct FileSecretMaterializer<W: FileWriter = LocalFile> {
    directory: PathBuf,
    writer: W,
}

impl FileSecretMaterializer<LocalFile> {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::with_writer(directory, LocalFile)
    }
}

impl<W: FileWriter> FileSecretMaterializer<W> {
    pub fn with_writer(directory: impl Into<PathBuf>, writer: W) -> Self {
        Self {
            directory: directory.into(),
            writer,
        }
    }
}

impl<W: FileWriter> SecretMaterializer for FileSecretMaterializer<W> {
    fn materialize(&self, name: &str, secret: &str) -> Result<PathBuf, SecretError> {
        let path = self.directory.join(name);
        self.writer
            .write(&path, secret.as_bytes())
            .map_err(|err| SecretError {
                name: name.to_string(),
                err,
            })?;
        debug!("secret `{name}` written to {}", path.display());
        Ok(path)
    }
}
