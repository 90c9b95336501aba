//! Progress reporting for long-running operations.
//!
//! The crawler and the member enumerator push a [`Progress`] snapshot to a
//! [`ProgressCallback`] after every item, so a caller can drive a spinner,
//! a status line, or nothing at all.
//!
//! # Example
//!
//! ```rust
//! use tgspyder::progress::{Progress, ProgressCallback};
//! use std::sync::Arc;
//!
//! let callback: ProgressCallback = Arc::new(|progress| {
//!     println!("msgs={} invites={}", progress.messages_seen, progress.invites_found);
//! });
//!
//! callback(Progress::crawl(10, 2));
//! ```

use std::io::Write;
use std::sync::Arc;

/// Running counters of an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    /// Messages pulled from the history so far.
    pub messages_seen: usize,

    /// Distinct invite links discovered so far.
    pub invites_found: usize,

    /// Items written so far (member rows).
    pub items_processed: usize,

    /// Total items, if known up front.
    pub total_items: Option<usize>,
}

impl Progress {
    /// Creates a crawl progress snapshot.
    pub fn crawl(messages_seen: usize, invites_found: usize) -> Self {
        Self {
            messages_seen,
            invites_found,
            ..Self::default()
        }
    }

    /// Creates an item progress snapshot with a known total.
    pub fn items(items_processed: usize, total_items: usize) -> Self {
        Self {
            items_processed,
            total_items: Some(total_items),
            ..Self::default()
        }
    }

    /// Returns the items percentage (0.0 - 100.0).
    ///
    /// Returns `None` if total items is not known.
    ///
    /// ```rust
    /// use tgspyder::progress::Progress;
    ///
    /// assert_eq!(Progress::items(5, 10).percentage(), Some(50.0));
    /// assert_eq!(Progress::crawl(5, 0).percentage(), None);
    /// ```
    pub fn percentage(&self) -> Option<f64> {
        self.total_items.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.items_processed as f64 / total as f64) * 100.0
            }
        })
    }

    /// Returns whether all known items are processed.
    pub fn is_complete(&self) -> bool {
        self.total_items
            .map(|total| self.items_processed >= total)
            .unwrap_or(false)
    }
}

/// Callback type for receiving progress updates.
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Creates a no-op progress callback.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Creates a callback that rewrites a single status line on stderr.
///
/// Crawl updates print `msgs=N • invites=M`; item updates print `done/total`.
pub fn stderr_progress(label: impl Into<String>) -> ProgressCallback {
    let label = label.into();
    Arc::new(move |progress| {
        let line = match progress.total_items {
            Some(total) => format!("{label} {}/{total}", progress.items_processed),
            None => format!(
                "{label} • msgs={} • invites={}",
                progress.messages_seen, progress.invites_found
            ),
        };
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r{line}");
        let _ = stderr.flush();
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_crawl_progress_has_no_percentage() {
        let progress = Progress::crawl(100, 3);
        assert_eq!(progress.percentage(), None);
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_items_percentage_zero_total() {
        assert_eq!(Progress::items(0, 0).percentage(), Some(100.0));
        assert!(Progress::items(0, 0).is_complete());
    }

    #[test]
    fn test_items_complete() {
        assert!(Progress::items(3, 3).is_complete());
        assert!(!Progress::items(2, 3).is_complete());
    }

    #[test]
    fn test_no_progress_callback() {
        let callback = no_progress();
        callback(Progress::default());
    }

    #[test]
    fn test_progress_callback_type() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let callback: ProgressCallback = Arc::new(move |progress| {
            counter_clone.store(progress.messages_seen, Ordering::SeqCst);
        });

        callback(Progress::crawl(42, 0));
        assert_eq!(counter.load(Ordering::SeqCst), 42);
    }
}
