//! State management for the PEP-talk reader
//!
//! Owns the tokio runtime, the companion panel controller and the currently
//! loaded document. Background work reports back over channels that are
//! polled once per frame.

use companion::{PanelController, PanelEvent, StreamConsumer};
use providers::StreamClient;
use services::routes::{self, Route};
use services::{DocumentError, DocumentSource};
use shared::settings::ReaderSettings;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

/// What the reading area shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentView {
    Loading,
    Loaded(String),
    /// Inline error in place of content
    Failed(String),
}

/// Result from a background document fetch
#[derive(Debug)]
pub struct DocumentResult {
    pub section_id: String,
    pub result: Result<String, DocumentError>,
}

pub struct ReaderState {
    pub settings: ReaderSettings,
    pub panel: PanelController,
    pub document: DocumentView,
    /// Section id of the active document, if the route selected one
    pub section_id: Option<String>,
    /// Current location path, e.g. `/mpep/2141`
    pub location: String,
    /// Location bar contents
    pub location_input: String,
    documents: Arc<dyn DocumentSource>,
    /// Receiver for the latest fetch only; replacing it drops late results
    document_rx: Option<Receiver<DocumentResult>>,
    runtime: tokio::runtime::Runtime,
}

impl ReaderState {
    pub fn new(settings: ReaderSettings) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let backend = Arc::new(StreamClient::from_settings(&settings)?);
        let documents = services::source_from_settings(&settings.documents)?;
        let consumer = StreamConsumer::new(backend, runtime.handle().clone());

        let mut state = Self {
            settings,
            panel: PanelController::new(consumer),
            document: DocumentView::Loading,
            section_id: None,
            location: String::new(),
            location_input: String::new(),
            documents,
            document_rx: None,
            runtime,
        };
        state.navigate("/");
        Ok(state)
    }

    /// Go to a location path, following the root redirect.
    pub fn navigate(&mut self, path: &str) {
        let default_section = self.settings.documents.default_section.clone();
        let route = routes::navigate(path, &default_section);
        tracing::info!("navigate {} -> {:?}", path, route);

        let section_id = match &route {
            Route::Section(id) => Some(id.clone()),
            _ => None,
        };
        if section_id.is_some() && section_id == self.section_id {
            return;
        }

        self.panel.handle(PanelEvent::DocumentChanged);

        match route {
            Route::Section(id) => {
                self.location = routes::section_path(&id);
                self.section_id = Some(id.clone());
                self.load_document(id);
            }
            Route::Unknown(path) | Route::Redirect(path) => {
                self.location = path.clone();
                self.section_id = None;
                self.document_rx = None;
                self.document = DocumentView::Failed(format!("Page not found: {}", path));
            }
        }
        self.location_input = self.location.clone();
    }

    fn load_document(&mut self, section_id: String) {
        self.document = DocumentView::Loading;

        let (tx, rx) = channel();
        self.document_rx = Some(rx);
        let source = Arc::clone(&self.documents);

        self.runtime.spawn(async move {
            let result = source.fetch(&section_id).await;
            let _ = tx.send(DocumentResult {
                section_id,
                result,
            });
        });
    }

    /// Pick up a finished document fetch, if any (non-blocking)
    pub fn poll_document(&mut self) {
        let Some(rx) = &self.document_rx else {
            return;
        };
        let Ok(loaded) = rx.try_recv() else {
            return;
        };
        self.document_rx = None;

        self.document = match loaded.result {
            Ok(text) => DocumentView::Loaded(text),
            Err(e) => {
                tracing::warn!("failed to fetch MPEP content: {}", e);
                DocumentView::Failed(format!(
                    "Failed to load content for MPEP {}.",
                    loaded.section_id
                ))
            }
        };
    }

    /// True while something in the background still needs frames
    pub fn is_busy(&self) -> bool {
        self.document_rx.is_some() || self.panel.is_streaming()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::settings::DocumentLocation;
    use std::fs;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn reader_with_docs() -> (ReaderState, TempDir) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("mpep_2141.md"), "# 2141 Examination Guidelines").unwrap();
        fs::write(dir.path().join("mpep_2143.md"), "# 2143 Examples").unwrap();

        let mut settings = ReaderSettings::default();
        settings.documents.location = DocumentLocation::Directory(dir.path().to_path_buf());
        (ReaderState::new(settings).unwrap(), dir)
    }

    fn wait_for_document(s: &mut ReaderState) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while s.document == DocumentView::Loading && Instant::now() < deadline {
            s.poll_document();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_root_redirects_to_default_section() {
        let (mut s, _dir) = reader_with_docs();
        assert_eq!(s.location, "/mpep/2141");
        assert_eq!(s.section_id.as_deref(), Some("2141"));

        wait_for_document(&mut s);
        assert_eq!(
            s.document,
            DocumentView::Loaded("# 2141 Examination Guidelines".into())
        );
        assert!(!s.is_busy());
    }

    #[test]
    fn test_navigate_to_other_section() {
        let (mut s, _dir) = reader_with_docs();
        s.navigate("/mpep/2143");
        assert_eq!(s.location_input, "/mpep/2143");

        wait_for_document(&mut s);
        assert_eq!(s.document, DocumentView::Loaded("# 2143 Examples".into()));
    }

    #[test]
    fn test_missing_section_renders_inline_error() {
        let (mut s, _dir) = reader_with_docs();
        s.navigate("/mpep/9999");

        wait_for_document(&mut s);
        assert_eq!(
            s.document,
            DocumentView::Failed("Failed to load content for MPEP 9999.".into())
        );
    }

    #[test]
    fn test_unknown_route() {
        let (mut s, _dir) = reader_with_docs();
        s.navigate("/settings");
        assert_eq!(s.section_id, None);
        assert_eq!(s.document, DocumentView::Failed("Page not found: /settings".into()));
    }

    #[test]
    fn test_stale_fetch_is_ignored() {
        let (mut s, _dir) = reader_with_docs();
        // Let the fetch for 2141 finish without polling it, then navigate away
        std::thread::sleep(Duration::from_millis(200));
        s.navigate("/mpep/2143");
        wait_for_document(&mut s);
        assert_eq!(s.document, DocumentView::Loaded("# 2143 Examples".into()));

        // The finished 2141 result never surfaces
        s.poll_document();
        assert_eq!(s.document, DocumentView::Loaded("# 2143 Examples".into()));
        assert_eq!(s.section_id.as_deref(), Some("2143"));
    }
}
