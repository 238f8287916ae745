//! Unit splitter: staged changes in, ordered review units out.

use crate::error::SourceError;
use crate::types::{ReviewMode, ReviewUnit};

/// Read-only view of the index, implemented over git by the binary.
///
/// Implementations are called from a blocking worker thread, never from the
/// thread driving the consumer loop.
pub trait StagedSource: Send + Sync {
    /// Repository-relative paths of staged files, in git's listing order.
    fn list_staged_filenames(&self) -> Result<Vec<String>, SourceError>;

    /// Unified diff of the index against `HEAD`.
    fn staged_diff(&self) -> Result<String, SourceError>;

    /// Content of `filename` as staged. Files absent from the index
    /// (staged deletions) yield an empty string.
    fn staged_file_content(&self, filename: &str) -> Result<String, SourceError>;
}

/// Splits the staged snapshot into review units.
///
/// Returns an empty vector when nothing is staged. Diff mode always yields
/// exactly one unit otherwise, even if its content is empty; full-file mode
/// yields one unit per staged filename in listing order.
pub fn split_units(
    source: &dyn StagedSource,
    mode: ReviewMode,
) -> Result<Vec<ReviewUnit>, SourceError> {
    let filenames = source.list_staged_filenames()?;
    if filenames.is_empty() {
        return Ok(Vec::new());
    }

    match mode {
        ReviewMode::Diff => Ok(vec![ReviewUnit::diff(source.staged_diff()?)]),
        ReviewMode::FullFile => filenames
            .into_iter()
            .map(|name| {
                let content = source.staged_file_content(&name)?;
                Ok(ReviewUnit::full_file(name, content))
            })
            .collect(),
    }
}
