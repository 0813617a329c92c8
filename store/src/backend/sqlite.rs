use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use super::{check_origin, CellValue, PersistenceBackend};
use crate::schema::{header_row, HEADER_ROW, USER_ID_COL};
use crate::BackendError;

/// Durable table stored cell-by-cell in SQLite.
///
/// Several named sheets can share one database; a sheet that was never
/// created is reported as unavailable rather than empty.
pub struct SqliteTable {
    pool: SqlitePool,
    sheet: String,
}

impl SqliteTable {
    pub fn new(pool: SqlitePool, sheet: impl Into<String>) -> Self {
        Self {
            pool,
            sheet: sheet.into(),
        }
    }

    pub async fn run_migrations(&self) -> Result<(), BackendError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        Ok(())
    }

    /// Registers the sheet and writes the header row. Safe to call on a sheet
    /// that already exists.
    pub async fn create_sheet(&self) -> Result<(), BackendError> {
        sqlx::query("INSERT OR IGNORE INTO sheets (name) VALUES (?)")
            .bind(&self.sheet)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        if self.get_cell(HEADER_ROW, USER_ID_COL).await?.is_empty() {
            self.set_rows(HEADER_ROW, USER_ID_COL, vec![header_row()])
                .await?;
        }
        tracing::info!(sheet = %self.sheet, "Sheet ready");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    async fn ensure_sheet(&self) -> Result<(), BackendError> {
        let found: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sheets WHERE name = ?")
            .bind(&self.sheet)
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable)?;

        if found == 0 {
            return Err(BackendError::Unavailable(format!(
                "sheet '{}' does not exist",
                self.sheet
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceBackend for SqliteTable {
    async fn get_rows(
        &self,
        start_row: usize,
        start_col: usize,
        row_count: usize,
        col_count: usize,
    ) -> Result<Vec<Vec<CellValue>>, BackendError> {
        check_origin(start_row, start_col)?;
        self.ensure_sheet().await?;

        let mut grid = vec![vec![CellValue::Empty; col_count]; row_count];
        if row_count == 0 || col_count == 0 {
            return Ok(grid);
        }

        let rows = sqlx::query(
            "SELECT row_index, col_index, kind, value FROM cells
             WHERE sheet = ? AND row_index BETWEEN ? AND ? AND col_index BETWEEN ? AND ?",
        )
        .bind(&self.sheet)
        .bind(start_row as i64)
        .bind((start_row + row_count - 1) as i64)
        .bind(start_col as i64)
        .bind((start_col + col_count - 1) as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        for row in rows {
            let row_index: i64 = row.try_get("row_index").map_err(query_error)?;
            let col_index: i64 = row.try_get("col_index").map_err(query_error)?;
            let kind: String = row.try_get("kind").map_err(query_error)?;
            let value: String = row.try_get("value").map_err(query_error)?;

            let (r, c) = (row_index as usize, col_index as usize);
            let cell = CellValue::from_parts(&kind, &value).ok_or_else(|| BackendError::Corrupt {
                row: r,
                col: c,
                reason: format!("cannot decode {kind} value '{value}'"),
            })?;
            grid[r - start_row][c - start_col] = cell;
        }
        Ok(grid)
    }

    async fn get_cell(&self, row: usize, col: usize) -> Result<CellValue, BackendError> {
        let mut grid = self.get_rows(row, col, 1, 1).await?;
        Ok(grid
            .pop()
            .and_then(|mut cells| cells.pop())
            .unwrap_or_default())
    }

    async fn set_rows(
        &self,
        start_row: usize,
        start_col: usize,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<(), BackendError> {
        check_origin(start_row, start_col)?;
        self.ensure_sheet().await?;

        let mut tx = self.pool.begin().await.map_err(unavailable)?;

        for (r, cells) in rows.iter().enumerate() {
            for (c, cell) in cells.iter().enumerate() {
                let row_index = (start_row + r) as i64;
                let col_index = (start_col + c) as i64;

                if cell.is_empty() {
                    sqlx::query(
                        "DELETE FROM cells WHERE sheet = ? AND row_index = ? AND col_index = ?",
                    )
                    .bind(&self.sheet)
                    .bind(row_index)
                    .bind(col_index)
                    .execute(&mut *tx)
                    .await
                    .map_err(query_error)?;
                } else {
                    sqlx::query(
                        "INSERT INTO cells (sheet, row_index, col_index, kind, value) VALUES (?, ?, ?, ?, ?)
                         ON CONFLICT (sheet, row_index, col_index)
                         DO UPDATE SET kind = excluded.kind, value = excluded.value",
                    )
                    .bind(&self.sheet)
                    .bind(row_index)
                    .bind(col_index)
                    .bind(cell.kind())
                    .bind(cell.to_string())
                    .execute(&mut *tx)
                    .await
                    .map_err(query_error)?;
                }
            }
        }

        tx.commit().await.map_err(query_error)?;
        Ok(())
    }

    async fn row_count(&self) -> Result<usize, BackendError> {
        self.ensure_sheet().await?;
        let last: Option<i64> = sqlx::query_scalar("SELECT MAX(row_index) FROM cells WHERE sheet = ?")
            .bind(&self.sheet)
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(last.map_or(0, |row| row as usize))
    }
}

fn query_error(e: sqlx::Error) -> BackendError {
    BackendError::Query(e.to_string())
}

fn unavailable(e: sqlx::Error) -> BackendError {
    BackendError::Unavailable(e.to_string())
}
