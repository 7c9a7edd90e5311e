use async_trait::async_trait;
use sharehost_core::{AppError, User, UserRole, UserStore};
use sqlx::{PgPool, Postgres};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    password: String,
    token: Option<String>,
    role: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password,
            token: row.token,
            role: UserRole::parse(&row.role),
        }
    }
}

/// Repository for accounts
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<Postgres, UserRow>(
            "SELECT id, username, password, token, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    #[tracing::instrument(skip(self, token), fields(db.table = "users", db.operation = "update"))]
    async fn set_token(&self, username: &str, token: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET token = $1 WHERE username = $2")
            .bind(token)
            .bind(username)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "select"))]
    async fn list_usernames(&self) -> Result<Vec<String>, AppError> {
        let names =
            sqlx::query_scalar::<Postgres, String>("SELECT username FROM users ORDER BY username")
                .fetch_all(&self.pool)
                .await?;

        Ok(names)
    }

    #[tracing::instrument(skip(self), fields(db.table = "users", db.operation = "delete"))]
    async fn delete(&self, username: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
