//! Per-run crawl frontier
//!
//! `CrawlState` owns the visited set and the pending FIFO for exactly one
//! run. A URL is marked visited when it is dequeued, so the page budget
//! counts every attempted fetch, failed ones included.

use log::{debug, trace};
use std::collections::{HashSet, VecDeque};
use url::Url;

use super::crawl_types::ScrapeError;
use crate::utils::url_key;

#[derive(Debug)]
pub struct CrawlState {
    seed: Url,
    /// Seed path without trailing slash; empty for the site root
    seed_prefix: String,
    visited: HashSet<String>,
    pending: VecDeque<Url>,
    pending_keys: HashSet<String>,
    max_pages: usize,
}

impl CrawlState {
    /// Create the frontier with the seed URL already queued
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::InvalidUrl` when the seed does not parse as an
    /// http(s) URL with a host.
    pub fn initialize(seed_url: &str, max_pages: usize) -> Result<Self, ScrapeError> {
        let invalid = |reason: String| ScrapeError::InvalidUrl {
            url: seed_url.to_string(),
            reason,
        };

        let mut seed = Url::parse(seed_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(seed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", seed.scheme())));
        }
        if seed.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".to_string()));
        }
        seed.set_fragment(None);

        let seed_prefix = seed.path().trim_end_matches('/').to_string();
        let seed_key = url_key(&seed);

        let mut pending = VecDeque::new();
        pending.push_back(seed.clone());
        let mut pending_keys = HashSet::new();
        pending_keys.insert(seed_key);

        Ok(Self {
            seed,
            seed_prefix,
            visited: HashSet::new(),
            pending,
            pending_keys,
            max_pages,
        })
    }

    /// Dequeue the next unvisited URL and mark it visited
    ///
    /// Returns `None` when the queue is empty or the page budget is spent.
    pub fn next(&mut self) -> Option<Url> {
        while self.visited.len() < self.max_pages {
            let url = self.pending.pop_front()?;
            let key = url_key(&url);
            self.pending_keys.remove(&key);
            if self.visited.insert(key) {
                debug!(target: "sitebot::crawl", "Dequeued {url} ({} visited)", self.visited.len());
                return Some(url);
            }
        }
        None
    }

    /// Enqueue a candidate if it is in scope and not already known
    ///
    /// Returns whether the candidate was queued.
    pub fn offer(&mut self, candidate: &Url) -> bool {
        if self.visited.len() >= self.max_pages {
            return false;
        }
        if !self.in_scope(candidate) {
            trace!(target: "sitebot::links", "Out of scope: {candidate}");
            return false;
        }

        let key = url_key(candidate);
        if self.visited.contains(&key) || self.pending_keys.contains(&key) {
            return false;
        }

        let mut url = candidate.clone();
        url.set_fragment(None);
        self.pending_keys.insert(key);
        self.pending.push_back(url);
        true
    }

    /// Same scheme, host and port as the seed, under the seed path
    #[must_use]
    pub fn in_scope(&self, candidate: &Url) -> bool {
        if candidate.scheme() != self.seed.scheme()
            || candidate.host_str() != self.seed.host_str()
            || candidate.port_or_known_default() != self.seed.port_or_known_default()
        {
            return false;
        }

        if self.seed_prefix.is_empty() {
            return true;
        }
        let path = candidate.path().trim_end_matches('/');
        path == self.seed_prefix
            || path
                .strip_prefix(self.seed_prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    #[must_use]
    pub fn seed(&self) -> &Url {
        &self.seed
    }

    #[must_use]
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether `next()` can never yield again
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty() || self.visited.len() >= self.max_pages
    }
}
