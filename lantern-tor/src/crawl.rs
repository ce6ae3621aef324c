//! Bounded-depth breadth-first crawl engine
//!
//! Owns the frontier and visited set for one crawl invocation, orchestrates
//! fetch → extract → enqueue, and runs the one-shot robots and common-path
//! probes anchored to the base URL. Only the initial connectivity check is
//! fatal; every later fetch failure is isolated and skipped.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, LazyLock};

use futures::stream::{self, StreamExt};
use lantern_core::{Finding, ScanTarget, Settings};
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::{extract_internal_links, extract_title, FetchOutcome, PageResponse, SharedFetcher};

/// Common-path probes in flight at once
const PROBE_CONCURRENCY: usize = 4;

/// Body marker for an open directory index
const DIRECTORY_LISTING_MARKER: &str = "Index of /";

static DISALLOW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*disallow:\s*(.*)$").unwrap());

/// Errors that abort a crawl outright
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Initial connection to the onion site failed: {0}")]
    Unreachable(String),
}

/// One crawl invocation; fresh frontier and visited set each time
pub struct Scanner {
    fetcher: SharedFetcher,
    settings: Settings,
    target: ScanTarget,
    max_depth: usize,
}

impl Scanner {
    pub fn new(
        fetcher: SharedFetcher,
        settings: Settings,
        target: ScanTarget,
        max_depth: usize,
    ) -> Self {
        Self {
            fetcher,
            settings,
            target,
            max_depth,
        }
    }

    /// Run the crawl to completion, returning findings in emission order
    pub async fn run(&self) -> Result<Vec<Finding>, ScanError> {
        let base = self.target.canonical();
        let mut findings = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut frontier: VecDeque<(String, usize)> = VecDeque::new();

        // Marked visited at enqueue time, so a canonical URL enters the
        // frontier at most once over the crawl's lifetime.
        visited.insert(base.clone());
        frontier.push_back((base.clone(), 0));

        info!("Starting scan on {} (max depth {})", base, self.max_depth);

        // The whole crawl is pointless if the base is unreachable.
        let probe = match self.fetcher.fetch(&base).await {
            FetchOutcome::Success(page) => page,
            FetchOutcome::ConnectionFailed(msg) => return Err(ScanError::Unreachable(msg)),
            FetchOutcome::TimedOut => {
                return Err(ScanError::Unreachable(format!(
                    "no response within {} seconds",
                    self.settings.timeout_secs
                )))
            }
            FetchOutcome::Failed(msg) => return Err(ScanError::Unreachable(msg)),
        };
        info!("Initial connection successful, status {}", probe.status);
        findings.push(Finding::site_info(
            &base,
            probe.status,
            extract_title(&probe.body),
            probe.server.clone(),
        ));

        while let Some((url, depth)) = frontier.pop_front() {
            if depth > self.max_depth {
                continue; // enqueue already bounds depth; kept as a guard
            }

            debug!("Crawling {} (depth {})", url, depth);
            let page = match self.fetcher.fetch(&url).await {
                FetchOutcome::Success(page) => page,
                FetchOutcome::ConnectionFailed(msg) => {
                    warn!("Connection error fetching {}: {}", url, msg);
                    continue;
                }
                FetchOutcome::TimedOut => {
                    warn!("Timeout fetching {}", url);
                    continue;
                }
                FetchOutcome::Failed(msg) => {
                    warn!("Request error fetching {}: {}", url, msg);
                    continue;
                }
            };

            if url == base {
                // One-shot probes, anchored to the base URL.
                self.probe_robots(&base, &mut findings).await;
                self.probe_common_paths(&base, &mut findings).await;
            } else {
                findings.push(Finding::page_info(
                    &url,
                    page.status,
                    extract_title(&page.body),
                    page.server.clone(),
                    depth,
                ));
            }

            if depth < self.max_depth {
                self.enqueue_links(&url, &page, depth, &mut visited, &mut frontier);
            }
        }

        info!("Scan of {} completed with {} findings", base, findings.len());
        Ok(findings)
    }

    fn enqueue_links(
        &self,
        url: &str,
        page: &PageResponse,
        depth: usize,
        visited: &mut HashSet<String>,
        frontier: &mut VecDeque<(String, usize)>,
    ) {
        let page_url = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                warn!("Unparsable page URL {}: {}", url, e);
                return;
            }
        };

        for link in extract_internal_links(&page.body, &page_url) {
            if visited.insert(link.clone()) {
                debug!("Queued new link: {} (depth {})", link, depth + 1);
                frontier.push_back((link, depth + 1));
            }
        }
    }

    /// Surface robots.txt Disallow entries as a finding; robots rules are
    /// reported, never obeyed.
    async fn probe_robots(&self, base: &str, findings: &mut Vec<Finding>) {
        let robots_url = match Url::parse(base).ok().and_then(|u| u.join("/robots.txt").ok()) {
            Some(u) => u.to_string(),
            None => return,
        };

        debug!("Checking robots.txt at {}", robots_url);
        let page = match self.fetcher.fetch(&robots_url).await {
            FetchOutcome::Success(page) if page.status == 200 => page,
            FetchOutcome::Success(page) => {
                debug!(
                    "Robots.txt not found or inaccessible (status {})",
                    page.status
                );
                return;
            }
            _ => {
                debug!("Could not fetch robots.txt");
                return;
            }
        };

        let disallowed: Vec<String> = DISALLOW_RE
            .captures_iter(&page.body)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|path| !path.is_empty())
            .collect();

        if disallowed.is_empty() {
            debug!("No disallowed paths found in robots.txt");
        } else {
            findings.push(Finding::robots_disallowed(&robots_url, disallowed));
        }
    }

    /// Probe the configured common paths against the base URL. Fetches run
    /// concurrently but findings come out in configured path order.
    async fn probe_common_paths(&self, base: &str, findings: &mut Vec<Finding>) {
        let base_url = match Url::parse(base) {
            Ok(u) => u,
            Err(_) => return,
        };

        let targets: Vec<(usize, String, String)> = self
            .settings
            .common_paths
            .iter()
            .enumerate()
            .filter_map(|(order, path)| {
                base_url
                    .join(path)
                    .ok()
                    .map(|u| (order, path.clone(), u.to_string()))
            })
            .collect();

        let fetcher = Arc::clone(&self.fetcher);
        let mut exposed: Vec<(usize, String, String, PageResponse)> = stream::iter(targets)
            .map(|(order, path, url)| {
                let fetcher = Arc::clone(&fetcher);
                async move {
                    match fetcher.fetch(&url).await {
                        FetchOutcome::Success(page) if page.status == 200 => {
                            Some((order, path, url, page))
                        }
                        FetchOutcome::Success(page) => {
                            debug!("Path {} not found (status {})", path, page.status);
                            None
                        }
                        _ => {
                            debug!("Could not fetch path {}", path);
                            None
                        }
                    }
                }
            })
            .buffer_unordered(PROBE_CONCURRENCY)
            .filter_map(|probe| async { probe })
            .collect()
            .await;

        exposed.sort_by_key(|(order, ..)| *order);
        for (_, path, url, page) in exposed {
            let listing = page.body.contains(DIRECTORY_LISTING_MARKER);
            findings.push(Finding::exposed_path(
                &url,
                &path,
                page.status,
                extract_title(&page.body),
                page.server,
                listing,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PageFetcher;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Fake fetcher scripted with canned outcomes per URL
    struct ScriptedFetcher {
        pages: HashMap<String, FetchOutcome>,
        log: Mutex<Vec<String>>,
    }

    impl ScriptedFetcher {
        fn new(pages: Vec<(&str, FetchOutcome)>) -> Arc<Self> {
            Arc::new(Self {
                pages: pages
                    .into_iter()
                    .map(|(url, outcome)| (url.to_string(), outcome))
                    .collect(),
                log: Mutex::new(Vec::new()),
            })
        }

        fn fetch_count(&self, url: &str) -> usize {
            self.log.lock().unwrap().iter().filter(|u| *u == url).count()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> FetchOutcome {
            self.log.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .unwrap_or(FetchOutcome::ConnectionFailed("unscripted URL".to_string()))
        }
    }

    fn ok(status: u16, body: &str) -> FetchOutcome {
        FetchOutcome::Success(PageResponse {
            status,
            server: Some("nginx".to_string()),
            body: body.to_string(),
        })
    }

    fn settings_with_paths(paths: &[&str]) -> Settings {
        Settings {
            common_paths: paths.iter().map(|p| p.to_string()).collect(),
            ..Settings::default()
        }
    }

    fn scanner(fetcher: Arc<ScriptedFetcher>, settings: Settings, max_depth: usize) -> Scanner {
        let target = ScanTarget::parse("http://test.onion").unwrap();
        Scanner::new(fetcher, settings, target, max_depth)
    }

    #[tokio::test]
    async fn test_base_unreachable_is_fatal() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let scanner = scanner(Arc::clone(&fetcher), settings_with_paths(&[]), 1);

        let result = scanner.run().await;
        assert!(matches!(result, Err(ScanError::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_depth_zero_fetches_only_base() {
        let fetcher = ScriptedFetcher::new(vec![(
            "http://test.onion",
            ok(200, r#"<title>Home</title><a href="/a">a</a>"#),
        )]);
        let scanner = scanner(Arc::clone(&fetcher), settings_with_paths(&[]), 0);

        let findings = scanner.run().await.unwrap();
        assert_eq!(findings.len(), 1);
        assert!(matches!(&findings[0], Finding::SiteInfo { title: Some(t), .. } if t == "Home"));
        // Connectivity probe plus the main-loop pass
        assert_eq!(fetcher.fetch_count("http://test.onion"), 2);
        assert_eq!(fetcher.fetch_count("http://test.onion/a"), 0);
    }

    #[tokio::test]
    async fn test_transient_failures_are_isolated() {
        let fetcher = ScriptedFetcher::new(vec![
            (
                "http://test.onion",
                ok(200, r#"<a href="/a">a</a><a href="/b">b</a>"#),
            ),
            ("http://test.onion/b", ok(200, "<title>B</title>")),
            // /a stays unscripted and fails with a connection error
        ]);
        let scanner = scanner(Arc::clone(&fetcher), settings_with_paths(&[]), 1);

        let findings = scanner.run().await.unwrap();
        let urls: Vec<&str> = findings.iter().map(|f| f.url()).collect();
        assert_eq!(urls, vec!["http://test.onion", "http://test.onion/b"]);
    }

    #[tokio::test]
    async fn test_shared_deep_link_fetched_once() {
        let fetcher = ScriptedFetcher::new(vec![
            (
                "http://test.onion",
                ok(200, r#"<a href="/a">a</a><a href="/b">b</a>"#),
            ),
            ("http://test.onion/a", ok(200, r#"<a href="/shared">s</a>"#)),
            ("http://test.onion/b", ok(200, r#"<a href="/shared">s</a>"#)),
            ("http://test.onion/shared", ok(200, "")),
        ]);
        let scanner = scanner(Arc::clone(&fetcher), settings_with_paths(&[]), 2);

        scanner.run().await.unwrap();
        assert_eq!(fetcher.fetch_count("http://test.onion/shared"), 1);
    }

    #[tokio::test]
    async fn test_depth_bound_stops_enqueueing() {
        let fetcher = ScriptedFetcher::new(vec![
            ("http://test.onion", ok(200, r#"<a href="/a">a</a>"#)),
            ("http://test.onion/a", ok(200, r#"<a href="/b">b</a>"#)),
            ("http://test.onion/b", ok(200, r#"<a href="/c">c</a>"#)),
            ("http://test.onion/c", ok(200, "")),
        ]);
        let scanner = scanner(Arc::clone(&fetcher), settings_with_paths(&[]), 2);

        let findings = scanner.run().await.unwrap();
        // /b sits at the depth limit: fetched and reported, but its links
        // are never enqueued.
        assert!(findings
            .iter()
            .any(|f| matches!(f, Finding::PageInfo { depth: 2, url, .. } if url == "http://test.onion/b")));
        assert_eq!(fetcher.fetch_count("http://test.onion/c"), 0);
    }

    #[tokio::test]
    async fn test_duplicate_and_foreign_links_from_base() {
        let fetcher = ScriptedFetcher::new(vec![
            (
                "http://test.onion",
                ok(
                    200,
                    r#"<a href="/a">1</a><a href="/a#frag">2</a><a href="http://other.onion/b">3</a>"#,
                ),
            ),
            ("http://test.onion/a", ok(200, "")),
        ]);
        let scanner = scanner(Arc::clone(&fetcher), settings_with_paths(&[]), 1);

        scanner.run().await.unwrap();
        assert_eq!(fetcher.fetch_count("http://test.onion/a"), 1);
        assert_eq!(fetcher.fetch_count("http://other.onion/b"), 0);
    }

    #[tokio::test]
    async fn test_robots_disallow_collected_into_one_finding() {
        let fetcher = ScriptedFetcher::new(vec![
            ("http://test.onion", ok(200, "")),
            (
                "http://test.onion/robots.txt",
                ok(200, "User-agent: *\nDisallow: /admin\ndisallow: /secret\nDisallow:\n"),
            ),
        ]);
        let scanner = scanner(Arc::clone(&fetcher), settings_with_paths(&[]), 0);

        let findings = scanner.run().await.unwrap();
        let robots: Vec<_> = findings
            .iter()
            .filter_map(|f| match f {
                Finding::RobotsDisallowed { disallowed, .. } => Some(disallowed),
                _ => None,
            })
            .collect();
        assert_eq!(robots.len(), 1);
        assert_eq!(robots[0], &vec!["/admin".to_string(), "/secret".to_string()]);
    }

    #[tokio::test]
    async fn test_robots_without_disallow_or_missing_yields_nothing() {
        for robots_outcome in [ok(200, "User-agent: *\nAllow: /\n"), ok(404, "")] {
            let fetcher = ScriptedFetcher::new(vec![
                ("http://test.onion", ok(200, "")),
                ("http://test.onion/robots.txt", robots_outcome),
            ]);
            let scanner = scanner(Arc::clone(&fetcher), settings_with_paths(&[]), 0);

            let findings = scanner.run().await.unwrap();
            assert!(!findings
                .iter()
                .any(|f| matches!(f, Finding::RobotsDisallowed { .. })));
        }
    }

    #[tokio::test]
    async fn test_common_path_probe_isolation() {
        let fetcher = ScriptedFetcher::new(vec![
            ("http://test.onion", ok(200, "")),
            ("http://test.onion/admin/", ok(404, "")),
            ("http://test.onion/.git/config", ok(200, "[core]")),
            // /.env stays unscripted and fails
        ]);
        let scanner = scanner(
            Arc::clone(&fetcher),
            settings_with_paths(&["/admin/", "/.git/config", "/.env"]),
            0,
        );

        let findings = scanner.run().await.unwrap();
        let exposed: Vec<&str> = findings
            .iter()
            .filter(|f| matches!(f, Finding::ExposedPath { .. }))
            .map(|f| f.url())
            .collect();
        assert_eq!(exposed, vec!["http://test.onion/.git/config"]);
    }

    #[tokio::test]
    async fn test_directory_listing_marker_changes_description() {
        let fetcher = ScriptedFetcher::new(vec![
            ("http://test.onion", ok(200, "")),
            (
                "http://test.onion/backup/",
                ok(200, "<h1>Index of /backup</h1>"),
            ),
        ]);
        let scanner = scanner(Arc::clone(&fetcher), settings_with_paths(&["/backup/"]), 0);

        let findings = scanner.run().await.unwrap();
        let finding = findings
            .iter()
            .find(|f| matches!(f, Finding::ExposedPath { .. }))
            .unwrap();
        assert!(finding.description().contains("Directory listing enabled"));
        assert!(matches!(
            finding,
            Finding::ExposedPath {
                directory_listing: true,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_exposed_paths_emitted_in_configured_order() {
        let fetcher = ScriptedFetcher::new(vec![
            ("http://test.onion", ok(200, "")),
            ("http://test.onion/panel/", ok(200, "")),
            ("http://test.onion/.env", ok(200, "SECRET=1")),
            ("http://test.onion/wp-admin/", ok(200, "")),
        ]);
        let scanner = scanner(
            Arc::clone(&fetcher),
            settings_with_paths(&["/panel/", "/.env", "/wp-admin/"]),
            0,
        );

        let findings = scanner.run().await.unwrap();
        let exposed: Vec<&str> = findings
            .iter()
            .filter(|f| matches!(f, Finding::ExposedPath { .. }))
            .map(|f| f.url())
            .collect();
        assert_eq!(
            exposed,
            vec![
                "http://test.onion/panel/",
                "http://test.onion/.env",
                "http://test.onion/wp-admin/",
            ]
        );
    }
}
