//! In-memory stores with the same semantics as the Postgres repositories.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use sharehost_core::{AppError, RecordStore, UploadRecord, User, UserStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub struct InMemoryRecordStore {
    records: Mutex<Vec<UploadRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<UploadRecord> {
        lock(&self.records).clone()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: &UploadRecord) -> Result<(), AppError> {
        let mut records = lock(&self.records);
        if records
            .iter()
            .any(|r| r.owner == record.owner && r.stored_name == record.stored_name)
        {
            return Err(AppError::InvalidInput(format!(
                "duplicate record {}/{}",
                record.owner, record.stored_name
            )));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn find(
        &self,
        owner: &str,
        stored_name: &str,
    ) -> Result<Option<UploadRecord>, AppError> {
        Ok(lock(&self.records)
            .iter()
            .find(|r| r.owner == owner && r.stored_name == stored_name)
            .cloned())
    }

    async fn find_by_name(&self, stored_name: &str) -> Result<Option<UploadRecord>, AppError> {
        Ok(lock(&self.records)
            .iter()
            .find(|r| r.stored_name == stored_name)
            .cloned())
    }

    async fn delete(&self, owner: &str, stored_name: Option<&str>) -> Result<u64, AppError> {
        let mut records = lock(&self.records);
        let before = records.len();
        records.retain(|r| {
            r.owner != owner || stored_name.is_some_and(|name| r.stored_name != name)
        });
        Ok((before - records.len()) as u64)
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }

    pub fn add(&self, user: User) {
        lock(&self.users).push(user);
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(lock(&self.users)
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn set_token(&self, username: &str, token: &str) -> Result<(), AppError> {
        if let Some(user) = lock(&self.users)
            .iter_mut()
            .find(|u| u.username == username)
        {
            user.token = Some(token.to_string());
        }
        Ok(())
    }

    async fn list_usernames(&self) -> Result<Vec<String>, AppError> {
        let mut names: Vec<String> = lock(&self.users)
            .iter()
            .map(|u| u.username.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, username: &str) -> Result<bool, AppError> {
        let mut users = lock(&self.users);
        let before = users.len();
        users.retain(|u| u.username != username);
        Ok(users.len() < before)
    }
}
