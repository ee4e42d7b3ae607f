use super::extract::ArchiveType;
use super::index::RepositoryIndex;
use super::{Bundle, DependencyInstaller, InstallError};
use crate::defaults::REPOSITORY_INDEX;
use crate::http::client::{HttpClient, ReqwestHttpClient};
use crate::http::config::HttpConfig;
use fs::directory_manager::{DirectoryManager, DirectoryManagerFs};
use http::{Method, Request};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);
const DOWNLOAD_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Installs bundles published in a repository: an `index.yml` at the repository root lists the
/// download uri of every available version.
pub struct RepositoryInstaller<C: HttpClient = ReqwestHttpClient> {
    client: C,
    repository_root: Url,
}

impl RepositoryInstaller<ReqwestHttpClient> {
    pub fn try_new(repository_root: Url) -> Result<Self, InstallError> {
        let client = ReqwestHttpClient::try_new(HttpConfig::new(
            DOWNLOAD_TIMEOUT,
            DOWNLOAD_CONNECT_TIMEOUT,
        ))?;
        Ok(Self::with_client(client, repository_root))
    }
}

impl<C: HttpClient> RepositoryInstaller<C> {
    pub fn with_client(client: C, repository_root: Url) -> Self {
        Self {
            client,
            repository_root,
        }
    }

    fn index_url(&self) -> String {
        format!(
            "{}/{REPOSITORY_INDEX}",
            self.repository_root.as_str().trim_end_matches('/')
        )
    }

    fn get(&self, uri: &str) -> Result<Vec<u8>, String> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Vec::new())
            .map_err(|err| err.to_string())?;
        let response = self.client.send(request).map_err(|err| err.to_string())?;
        if !response.status().is_success() {
            return Err(format!("unexpected status {}", response.status()));
        }
        Ok(response.into_body())
    }

    fn fetch_index(&self) -> Result<RepositoryIndex, InstallError> {
        let index_url = self.index_url();
        debug!(%index_url, "fetching repository index");
        let content = self
            .get(&index_url)
            .map_err(|err| InstallError::Index(index_url.clone(), err))?;
        RepositoryIndex::from_yaml(&String::from_utf8_lossy(&content))
            .map_err(|err| InstallError::Index(index_url, err.to_string()))
    }
}

impl<C: HttpClient> DependencyInstaller for RepositoryInstaller<C> {
    #[instrument(skip_all, fields(bundle = %bundle.name, destination = %destination.display()))]
    fn download_and_unpack(&self, bundle: &Bundle, destination: &Path) -> Result<(), InstallError> {
        let index = self.fetch_index()?;
        let (version, uri) = index.resolve(&bundle.version).ok_or_else(|| {
            InstallError::VersionNotFound(bundle.name.clone(), bundle.version.clone())
        })?;
        let archive_type = ArchiveType::from_uri(uri)?;

        info!("Downloading {} {version} from {uri}", bundle.name);
        let content = self
            .get(uri)
            .map_err(|err| InstallError::Download(uri.to_string(), err))?;

        let mut archive = tempfile::NamedTempFile::new()
            .map_err(|err| InstallError::Download(uri.to_string(), err.to_string()))?;
        archive
            .write_all(&content)
            .map_err(|err| InstallError::Download(uri.to_string(), err.to_string()))?;

        DirectoryManagerFs.create(destination)?;
        archive_type.extract(archive.path(), destination)?;
        info!("Installed {} {version}", bundle.name);
        Ok(())
    }
}
