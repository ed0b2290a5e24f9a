//! Report errors.

use chrono::NaiveDate;
use thiserror::Error;

/// Error returned by an external feed (directory, shift catalog, punch source).
pub type FeedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while building reports.
///
/// A missing employee or shift is not an error; those come back as `None`.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The requested range ends before it starts.
    #[error("end date {end} is before start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Page numbers and sizes are 1-based.
    #[error("page and page size must be at least 1 (page {page}, page size {page_size})")]
    InvalidPage { page: u32, page_size: u32 },

    /// An external feed failed. The batch is aborted.
    #[error("{operation} failed for {subject}")]
    Upstream {
        operation: &'static str,
        subject: String,
        #[source]
        source: FeedError,
    },
}

impl ReportError {
    /// Fails fast on an inverted range.
    pub fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), Self> {
        if end < start {
            return Err(Self::InvalidRange { start, end });
        }
        Ok(())
    }
}
