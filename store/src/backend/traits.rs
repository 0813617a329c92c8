use async_trait::async_trait;

use super::CellValue;
use crate::BackendError;

/// A table-shaped durable store addressed by 1-based (row, column).
///
/// Row 1 is the header; player data starts at row 2. Implementations must
/// serialise each call internally, but nothing is promised across calls.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Returns a `row_count` x `col_count` grid. Cells that were never
    /// written come back as [`CellValue::Empty`].
    async fn get_rows(
        &self,
        start_row: usize,
        start_col: usize,
        row_count: usize,
        col_count: usize,
    ) -> Result<Vec<Vec<CellValue>>, BackendError>;

    async fn get_cell(&self, row: usize, col: usize) -> Result<CellValue, BackendError>;

    /// Writes the whole range or nothing.
    async fn set_rows(
        &self,
        start_row: usize,
        start_col: usize,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<(), BackendError>;

    /// Index of the last used row, header included.
    async fn row_count(&self) -> Result<usize, BackendError>;
}
