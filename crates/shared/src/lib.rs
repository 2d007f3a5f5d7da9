pub mod settings {
    use serde::{Deserialize, Serialize};
    use std::path::PathBuf;

    pub const BACKEND_URL_ENV: &str = "PEPTALK_BACKEND_URL";
    pub const DOCS_DIR_ENV: &str = "PEPTALK_DOCS_DIR";

    fn default_backend_url() -> String {
        "http://127.0.0.1:8000".to_string()
    }

    fn default_chat_path() -> String {
        "/api/chat/stream".to_string()
    }

    fn default_timeout() -> u64 {
        120
    }

    /// Where section documents are read from
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DocumentLocation {
        /// Local folder holding `<prefix>_<id>.<ext>` files
        Directory(PathBuf),
        /// Static file server base URL
        Http(String),
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DocumentSettings {
        pub location: DocumentLocation,
        pub prefix: String,    // e.g., "mpep"
        pub extension: String, // e.g., "md"
        pub default_section: String,
        /// Sections listed in the sidebar, in display order
        pub sections: Vec<String>,
    }

    impl DocumentSettings {
        /// File name for a section id, e.g. `mpep_2141.md`
        pub fn file_name(&self, section_id: &str) -> String {
            format!("{}_{}.{}", self.prefix, section_id, self.extension)
        }
    }

    impl Default for DocumentSettings {
        fn default() -> Self {
            Self {
                location: DocumentLocation::Directory(PathBuf::from("docs")),
                prefix: "mpep".into(),
                extension: "md".into(),
                default_section: "2141".into(),
                sections: vec![
                    "2141".into(),
                    "2142".into(),
                    "2143".into(),
                    "2144".into(),
                    "2145".into(),
                ],
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ReaderSettings {
        #[serde(default = "default_backend_url")]
        pub backend_url: String,
        #[serde(default = "default_chat_path")]
        pub chat_path: String,
        #[serde(default = "default_timeout")]
        pub request_timeout_secs: u64,
        #[serde(default)]
        pub documents: DocumentSettings,
    }

    impl ReaderSettings {
        /// Full URL of the streaming chat endpoint
        pub fn chat_endpoint(&self) -> String {
            format!(
                "{}/{}",
                self.backend_url.trim_end_matches('/'),
                self.chat_path.trim_start_matches('/')
            )
        }

        /// Apply `PEPTALK_*` environment overrides on top of loaded settings.
        pub fn apply_env_overrides(&mut self) {
            self.apply_overrides(|key| std::env::var(key).ok());
        }

        fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
            if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
                tracing::info!("backend url overridden from environment: {}", url);
                self.backend_url = url.trim().to_string();
            }
            if let Some(dir) = lookup(DOCS_DIR_ENV).filter(|v| !v.trim().is_empty()) {
                tracing::info!("document directory overridden from environment: {}", dir);
                self.documents.location = DocumentLocation::Directory(PathBuf::from(dir.trim()));
            }
        }
    }

    impl Default for ReaderSettings {
        fn default() -> Self {
            Self {
                backend_url: default_backend_url(),
                chat_path: default_chat_path(),
                request_timeout_secs: default_timeout(),
                documents: DocumentSettings::default(),
            }
        }
    }

}

pub mod agent_api {
    use serde::{Deserialize, Serialize};

    /// Body of the streaming chat request
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct ChatRequest {
        pub question: String,
    }

    /// One event delivered by a streaming backend
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum StreamChunk {
        /// Decoded text fragment, in arrival order
        Text(String),
        /// Stream ended normally
        Done,
        /// Transport, status or decode failure
        Error(String),
    }

}
