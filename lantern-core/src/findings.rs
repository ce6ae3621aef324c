//! Findings: the crawl's output records
//!
//! Each finding is immutable once constructed; the ordered sequence of
//! findings is the scan's final artifact. The enum is closed so the
//! rendering layer can match exhaustively.

use serde::{Deserialize, Serialize};

/// Marker rendered when a title or server header is absent
pub const NOT_AVAILABLE: &str = "N/A";

/// One structured discovery record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// Base site details from the initial connectivity check
    SiteInfo {
        url: String,
        status: u16,
        title: Option<String>,
        server: Option<String>,
        description: String,
    },
    /// Details of a crawled page other than the base URL
    PageInfo {
        url: String,
        status: u16,
        title: Option<String>,
        server: Option<String>,
        depth: usize,
        description: String,
    },
    /// Paths the site's robots.txt asks crawlers to avoid
    RobotsDisallowed {
        url: String,
        status: u16,
        disallowed: Vec<String>,
        description: String,
    },
    /// A commonly sensitive path that answered 200
    ExposedPath {
        url: String,
        status: u16,
        title: Option<String>,
        server: Option<String>,
        directory_listing: bool,
        description: String,
    },
}

impl Finding {
    pub fn site_info(
        url: &str,
        status: u16,
        title: Option<String>,
        server: Option<String>,
    ) -> Self {
        Finding::SiteInfo {
            url: url.to_string(),
            status,
            title,
            server,
            description: "Initial site information.".to_string(),
        }
    }

    pub fn page_info(
        url: &str,
        status: u16,
        title: Option<String>,
        server: Option<String>,
        depth: usize,
    ) -> Self {
        Finding::PageInfo {
            url: url.to_string(),
            status,
            title,
            server,
            description: format!("Page details at depth {}.", depth),
            depth,
        }
    }

    pub fn robots_disallowed(url: &str, disallowed: Vec<String>) -> Self {
        let description = format!(
            "Robots.txt lists disallowed paths: {}. Review these areas.",
            disallowed.join(", ")
        );
        Finding::RobotsDisallowed {
            url: url.to_string(),
            status: 200,
            disallowed,
            description,
        }
    }

    pub fn exposed_path(
        url: &str,
        path: &str,
        status: u16,
        title: Option<String>,
        server: Option<String>,
        directory_listing: bool,
    ) -> Self {
        let description = if directory_listing {
            format!("Directory listing enabled at '{}'.", path)
        } else {
            format!("Common path '{}' found.", path)
        };
        Finding::ExposedPath {
            url: url.to_string(),
            status,
            title,
            server,
            directory_listing,
            description,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            Finding::SiteInfo { .. } => "Site Info",
            Finding::PageInfo { .. } => "Page Info",
            Finding::RobotsDisallowed { .. } => "Robots.txt Disallowed",
            Finding::ExposedPath { .. } => "Exposed Path",
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Finding::SiteInfo { url, .. }
            | Finding::PageInfo { url, .. }
            | Finding::RobotsDisallowed { url, .. }
            | Finding::ExposedPath { url, .. } => url,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Finding::SiteInfo { status, .. }
            | Finding::PageInfo { status, .. }
            | Finding::RobotsDisallowed { status, .. }
            | Finding::ExposedPath { status, .. } => *status,
        }
    }

    /// Page title when present, else the server header, else `N/A`
    pub fn detail(&self) -> &str {
        match self {
            Finding::SiteInfo { title, server, .. }
            | Finding::PageInfo { title, server, .. }
            | Finding::ExposedPath { title, server, .. } => title
                .as_deref()
                .or(server.as_deref())
                .unwrap_or(NOT_AVAILABLE),
            Finding::RobotsDisallowed { .. } => NOT_AVAILABLE,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Finding::SiteInfo { description, .. }
            | Finding::PageInfo { description, .. }
            | Finding::RobotsDisallowed { description, .. }
            | Finding::ExposedPath { description, .. } => description,
        }
    }
}
