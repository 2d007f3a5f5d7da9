//! Route resolution: `/mpep/:section_id` selects a document, `/` redirects to the default.

const SECTION_PREFIX: &str = "/mpep/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Show this section
    Section(String),
    /// Replace the current location with this path
    Redirect(String),
    Unknown(String),
}

/// Path for a section id, e.g. `/mpep/2141`
pub fn section_path(section_id: &str) -> String {
    format!("{}{}", SECTION_PREFIX, section_id)
}

/// Resolve a location path against the route table.
pub fn resolve(path: &str, default_section: &str) -> Route {
    let path = path.trim();
    if path.is_empty() || path == "/" {
        return Route::Redirect(section_path(default_section));
    }

    match path.strip_prefix(SECTION_PREFIX) {
        Some(rest) => {
            let id = rest.trim_end_matches('/');
            if id.is_empty() || id.contains('/') {
                Route::Unknown(path.to_string())
            } else {
                Route::Section(id.to_string())
            }
        }
        None => Route::Unknown(path.to_string()),
    }
}

/// Follow redirects until a terminal route is reached.
pub fn navigate(path: &str, default_section: &str) -> Route {
    match resolve(path, default_section) {
        Route::Redirect(target) => {
            tracing::debug!("redirect {} -> {}", path, target);
            resolve(&target, default_section)
        }
        other => other,
    }
}
