//! Document sources for the reader.
//!
//! A section id such as `2141` maps to a file named `<prefix>_<id>.<ext>`
//! (e.g. `mpep_2141.md`), read either from a local folder or from a static
//! file server.

use anyhow::{anyhow, Result};
use reqwest::Client;
use shared::settings::{DocumentLocation, DocumentSettings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Document loading failures
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Could not find file: {file_name}")]
    NotFound { file_name: String },

    #[error("Failed to read {file_name}: {source}")]
    Io {
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch {file_name}: {message}")]
    Http { file_name: String, message: String },
}

impl DocumentError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentError::NotFound { .. })
    }
}

/// Something that can return the raw markup of a section
#[async_trait::async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch(&self, section_id: &str) -> Result<String, DocumentError>;
}

/// Ids end up in file names and URLs; only allow plain identifiers.
fn is_valid_section_id(section_id: &str) -> bool {
    !section_id.is_empty()
        && section_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !section_id.contains("..")
}

/// Reads `<prefix>_<id>.<ext>` files from a folder
pub struct DirectorySource {
    root: PathBuf,
    settings: DocumentSettings,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, settings: DocumentSettings) -> Self {
        Self {
            root: root.into(),
            settings,
        }
    }
}

#[async_trait::async_trait]
impl DocumentSource for DirectorySource {
    async fn fetch(&self, section_id: &str) -> Result<String, DocumentError> {
        let file_name = self.settings.file_name(section_id);
        if !is_valid_section_id(section_id) {
            return Err(DocumentError::NotFound { file_name });
        }

        let path = self.root.join(&file_name);
        tracing::info!("loading document {}", path.display());
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DocumentError::NotFound { file_name })
            }
            Err(source) => Err(DocumentError::Io { file_name, source }),
        }
    }
}

/// Fetches `<base>/<prefix>_<id>.<ext>` with a GET
pub struct HttpSource {
    http: Client,
    base: String,
    settings: DocumentSettings,
}

impl HttpSource {
    pub fn new(base: impl Into<String>, settings: DocumentSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| anyhow!("failed to build HTTP client: {}", e))?;
        Ok(Self {
            http,
            base: base.into(),
            settings,
        })
    }
}

#[async_trait::async_trait]
impl DocumentSource for HttpSource {
    async fn fetch(&self, section_id: &str) -> Result<String, DocumentError> {
        let file_name = self.settings.file_name(section_id);
        if !is_valid_section_id(section_id) {
            return Err(DocumentError::NotFound { file_name });
        }

        let url = format!("{}/{}", self.base.trim_end_matches('/'), file_name);
        tracing::info!("GET {}", url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| DocumentError::Http {
                file_name: file_name.clone(),
                message: e.to_string(),
            })?;

        // Any non-success status counts as a missing document
        if !resp.status().is_success() {
            tracing::warn!("document {} returned {}", url, resp.status());
            return Err(DocumentError::NotFound { file_name });
        }

        resp.text().await.map_err(|e| DocumentError::Http {
            file_name,
            message: e.to_string(),
        })
    }
}

/// Build the configured document source
pub fn source_from_settings(settings: &DocumentSettings) -> Result<Arc<dyn DocumentSource>> {
    let source: Arc<dyn DocumentSource> = match &settings.location {
        DocumentLocation::Directory(dir) => Arc::new(DirectorySource::new(dir, settings.clone())),
        DocumentLocation::Http(base) => Arc::new(HttpSource::new(base, settings.clone())?),
    };
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_directory_source_reads_section() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("mpep_2141.md"), "# 2141 Examination Guidelines").unwrap();

        let source = DirectorySource::new(dir.path(), DocumentSettings::default());
        let text = source.fetch("2141").await.unwrap();
        assert_eq!(text, "# 2141 Examination Guidelines");
    }

    #[tokio::test]
    async fn test_directory_source_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let source = DirectorySource::new(dir.path(), DocumentSettings::default());

        let err = source.fetch("9999").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Could not find file: mpep_9999.md");
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let source = DirectorySource::new(dir.path(), DocumentSettings::default());

        assert!(source.fetch("../secret").await.unwrap_err().is_not_found());
        assert!(source.fetch("").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_custom_prefix_and_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("guide_intro.txt"), "intro").unwrap();

        let settings = DocumentSettings {
            prefix: "guide".into(),
            extension: "txt".into(),
            ..DocumentSettings::default()
        };
        let source = DirectorySource::new(dir.path(), settings);
        assert_eq!(source.fetch("intro").await.unwrap(), "intro");
    }

    fn serve(status: u16, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let handle = thread::spawn(move || {
            let request = server.recv().unwrap();
            let url = request.url().to_string();
            let response = tiny_http::Response::from_string(body)
                .with_status_code(tiny_http::StatusCode(status));
            let _ = request.respond(response);
            url
        });
        (format!("http://127.0.0.1:{}/", port), handle)
    }

    #[tokio::test]
    async fn test_http_source_fetches_file_name() {
        let (base, server) = serve(200, "# 2143 Examples of Basic Requirements");
        let source = HttpSource::new(base, DocumentSettings::default()).unwrap();

        let text = source.fetch("2143").await.unwrap();
        assert_eq!(text, "# 2143 Examples of Basic Requirements");
        assert_eq!(server.join().unwrap(), "/mpep_2143.md");
    }

    #[tokio::test]
    async fn test_http_source_non_success_is_not_found() {
        let (base, server) = serve(404, "nope");
        let source = HttpSource::new(base, DocumentSettings::default()).unwrap();

        assert!(source.fetch("2150").await.unwrap_err().is_not_found());
        server.join().unwrap();
    }
}
