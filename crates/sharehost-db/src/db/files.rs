use async_trait::async_trait;
use rust_decimal::Decimal;
use sharehost_core::{AppError, HexColor, RecordStore, Resolution, UploadRecord};
use sqlx::{PgPool, Postgres};

#[derive(Debug, sqlx::FromRow)]
struct FileRow {
    username: String,
    filename: String,
    creation_date: String,
    size_mb: Decimal,
    size_bytes: i64,
    dominant_color: String,
    resolution_width: i32,
    resolution_height: i32,
}

impl From<FileRow> for UploadRecord {
    fn from(row: FileRow) -> Self {
        UploadRecord {
            dominant_color: HexColor::parse(&row.dominant_color).unwrap_or_else(HexColor::white),
            owner: row.username,
            stored_name: row.filename,
            created_at: row.creation_date,
            size_bytes: row.size_bytes.max(0) as u64,
            size_mb: row.size_mb,
            resolution: Resolution::new(
                row.resolution_width.max(0) as u32,
                row.resolution_height.max(0) as u32,
            ),
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT username, filename, creation_date, size_mb, size_bytes, \
     dominant_color, resolution_width, resolution_height FROM file_data";

/// Repository for upload records
#[derive(Clone)]
pub struct FileRecordRepository {
    pool: PgPool,
}

impl FileRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for FileRecordRepository {
    #[tracing::instrument(skip(self, record), fields(db.table = "file_data", db.operation = "insert", owner = %record.owner, file = %record.stored_name))]
    async fn insert(&self, record: &UploadRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO file_data (username, filename, creation_date, size_mb, size_bytes,
                                   dominant_color, resolution_width, resolution_height)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&record.owner)
        .bind(&record.stored_name)
        .bind(&record.created_at)
        .bind(record.size_mb)
        .bind(i64::try_from(record.size_bytes).unwrap_or(i64::MAX))
        .bind(record.dominant_color.as_str())
        .bind(i32::try_from(record.resolution.width).unwrap_or(i32::MAX))
        .bind(i32::try_from(record.resolution.height).unwrap_or(i32::MAX))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_data", db.operation = "select"))]
    async fn find(
        &self,
        owner: &str,
        stored_name: &str,
    ) -> Result<Option<UploadRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, FileRow>(&format!(
            "{} WHERE username = $1 AND filename = $2",
            SELECT_COLUMNS
        ))
        .bind(owner)
        .bind(stored_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UploadRecord::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_data", db.operation = "select"))]
    async fn find_by_name(&self, stored_name: &str) -> Result<Option<UploadRecord>, AppError> {
        let row = sqlx::query_as::<Postgres, FileRow>(&format!(
            "{} WHERE filename = $1 LIMIT 1",
            SELECT_COLUMNS
        ))
        .bind(stored_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UploadRecord::from))
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_data", db.operation = "delete"))]
    async fn delete(&self, owner: &str, stored_name: Option<&str>) -> Result<u64, AppError> {
        let result = match stored_name {
            Some(name) => {
                sqlx::query("DELETE FROM file_data WHERE username = $1 AND filename = $2")
                    .bind(owner)
                    .bind(name)
                    .execute(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("DELETE FROM file_data WHERE username = $1")
                    .bind(owner)
                    .execute(&self.pool)
                    .await?
            }
        };

        Ok(result.rows_affected())
    }
}
