//! The shared frontier of URLs awaiting a visit
//!
//! The scheduler removes URLs from it at random while any number of
//! fetch-completion tasks append newly discovered links. Every operation
//! runs inside one mutex-guarded critical section, so concurrent offers of
//! the same URL admit it exactly once and no pick can observe a half-applied
//! offer.
//!
//! Membership is "currently pending": once a URL has been picked it is no
//! longer in the frontier and may be admitted again if it is rediscovered.

use crate::url::Blacklist;
use rand::Rng;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Pending URLs plus a membership index over them
///
/// `order` and `index` always hold the same URLs.
#[derive(Debug, Default)]
struct Pending {
    order: Vec<String>,
    index: HashSet<String>,
}

impl Pending {
    /// Appends `url` unless it is already pending
    fn insert(&mut self, url: String) -> bool {
        if self.index.contains(&url) {
            return false;
        }
        self.index.insert(url.clone());
        self.order.push(url);
        true
    }

    fn remove_at(&mut self, position: usize) -> String {
        let url = self.order.swap_remove(position);
        self.index.remove(&url);
        url
    }
}

/// Cheaply clonable handle to a shared set of pending URLs
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    urls: Arc<Mutex<Pending>>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the critical section
    ///
    /// `Pending::insert` and `Pending::remove_at` leave both collections
    /// consistent before any call that could panic, so a poisoned lock is
    /// recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bulk-initializes the frontier from seed URLs
    ///
    /// Insertion order is preserved. Duplicate seeds are collapsed so the
    /// frontier keeps at most one pending entry per URL.
    ///
    /// # Returns
    ///
    /// The number of seeds added
    pub fn seed<I, S>(&self, urls: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pending = self.lock();
        let mut added = 0;
        for url in urls {
            if pending.insert(url.into()) {
                added += 1;
            }
        }
        added
    }

    /// Removes and returns a uniformly chosen URL
    ///
    /// # Returns
    ///
    /// * `Some(String)` - The picked URL, no longer in the frontier
    /// * `None` - The frontier is empty
    pub fn pick_random(&self) -> Option<String> {
        self.pick_random_with(&mut rand::thread_rng())
    }

    /// Like [`Frontier::pick_random`] but with a caller-supplied RNG
    pub fn pick_random_with<R: Rng>(&self, rng: &mut R) -> Option<String> {
        let mut pending = self.lock();
        if pending.order.is_empty() {
            return None;
        }
        let position = rng.gen_range(0..pending.order.len());
        Some(pending.remove_at(position))
    }

    /// Offers candidate URLs for admission
    ///
    /// A candidate is admitted only if it is not already pending and not
    /// blacklisted. The whole batch is applied under one lock, so duplicates
    /// within the batch are also admitted only once.
    ///
    /// # Returns
    ///
    /// The number of URLs admitted
    pub fn offer<I, S>(&self, urls: I, blacklist: &Blacklist) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pending = self.lock();
        let mut admitted = 0;
        for url in urls {
            let url = url.into();
            if blacklist.contains_match(&url) {
                tracing::trace!("Rejected blacklisted URL: {}", url);
                continue;
            }
            if pending.insert(url) {
                admitted += 1;
            }
        }
        admitted
    }

    pub fn is_empty(&self) -> bool {
        self.lock().order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().index.contains(url)
    }

    /// Copies the pending URLs out of the frontier
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().order.clone()
    }
}
