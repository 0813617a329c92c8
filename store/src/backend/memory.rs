use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{check_origin, CellValue, PersistenceBackend};
use crate::schema::header_row;
use crate::BackendError;

/// In-process table, used as a stand-in for a durable backend in tests and
/// local tooling.
#[derive(Debug)]
pub struct MemoryTable {
    rows: Option<RwLock<Vec<Vec<CellValue>>>>,
}

impl MemoryTable {
    /// A table holding only the standard header row.
    pub fn new() -> Self {
        Self::from_rows(vec![header_row()])
    }

    /// Row 0 of `rows` is stored at row 1, so callers normally pass the header
    /// first.
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            rows: Some(RwLock::new(rows)),
        }
    }

    /// A table that cannot be opened; every call fails with
    /// [`BackendError::Unavailable`].
    pub fn detached() -> Self {
        Self { rows: None }
    }

    /// Copy of every stored row, header included.
    pub async fn snapshot(&self) -> Vec<Vec<CellValue>> {
        match &self.rows {
            Some(rows) => rows.read().await.clone(),
            None => Vec::new(),
        }
    }

    fn table(&self) -> Result<&RwLock<Vec<Vec<CellValue>>>, BackendError> {
        self.rows
            .as_ref()
            .ok_or_else(|| BackendError::Unavailable("memory table is detached".to_string()))
    }
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersistenceBackend for MemoryTable {
    async fn get_rows(
        &self,
        start_row: usize,
        start_col: usize,
        row_count: usize,
        col_count: usize,
    ) -> Result<Vec<Vec<CellValue>>, BackendError> {
        check_origin(start_row, start_col)?;
        let rows = self.table()?.read().await;

        let grid = (start_row - 1..start_row - 1 + row_count)
            .map(|r| {
                (start_col - 1..start_col - 1 + col_count)
                    .map(|c| {
                        rows.get(r)
                            .and_then(|row| row.get(c))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();
        Ok(grid)
    }

    async fn get_cell(&self, row: usize, col: usize) -> Result<CellValue, BackendError> {
        check_origin(row, col)?;
        let rows = self.table()?.read().await;
        Ok(rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .cloned()
            .unwrap_or_default())
    }

    async fn set_rows(
        &self,
        start_row: usize,
        start_col: usize,
        values: Vec<Vec<CellValue>>,
    ) -> Result<(), BackendError> {
        check_origin(start_row, start_col)?;
        let mut rows = self.table()?.write().await;

        for (offset, new_row) in values.into_iter().enumerate() {
            let r = start_row - 1 + offset;
            if rows.len() <= r {
                rows.resize_with(r + 1, Vec::new);
            }
            let row = &mut rows[r];
            let end = start_col - 1 + new_row.len();
            if row.len() < end {
                row.resize_with(end, CellValue::default);
            }
            for (c, cell) in new_row.into_iter().enumerate() {
                row[start_col - 1 + c] = cell;
            }
        }
        Ok(())
    }

    async fn row_count(&self) -> Result<usize, BackendError> {
        let rows = self.table()?.read().await;
        let last_used = rows
            .iter()
            .rposition(|row| row.iter().any(|cell| !cell.is_empty()))
            .map_or(0, |index| index + 1);
        Ok(last_used)
    }
}
