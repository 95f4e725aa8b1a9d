//! In-memory doubles for the durable and volatile stores.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cerahati::application::repos::{
    DonorStatsRepo, HealthRepo, RecordRepo, RepoError, ResourceRepo,
};
use cerahati::cache::{CacheError, CacheStore};
use cerahati::domain::leaderboard::DonorTotals;
use cerahati::domain::records::RecordFields;
use cerahati::domain::resources::Resource;
use serde_json::{Value, json};

/// Durable store double that counts every query it answers.
#[derive(Default)]
pub struct FakeRepo {
    rows: Mutex<HashMap<Resource, Vec<Value>>>,
    donors: Mutex<Vec<DonorTotals>>,
    failing: AtomicBool,
    pub list_calls: AtomicUsize,
    pub find_calls: AtomicUsize,
    pub by_user_calls: AtomicUsize,
    pub donor_calls: AtomicUsize,
    pub write_calls: AtomicUsize,
}

impl FakeRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, resource: Resource, row: Value) {
        self.rows
            .lock()
            .expect("rows lock")
            .entry(resource)
            .or_default()
            .push(row);
    }

    pub fn set_donors(&self, donors: Vec<DonorTotals>) {
        *self.donors.lock().expect("donors lock") = donors;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn queries(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
            + self.find_calls.load(Ordering::SeqCst)
            + self.by_user_calls.load(Ordering::SeqCst)
            + self.donor_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RepoError::Persistence("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn rows_of(&self, resource: Resource) -> Vec<Value> {
        let mut rows = self
            .rows
            .lock()
            .expect("rows lock")
            .get(&resource)
            .cloned()
            .unwrap_or_default();
        let pk = resource.primary_key();
        rows.sort_by_key(|row| row.get(pk).and_then(Value::as_i64));
        rows
    }
}

#[async_trait]
impl ResourceRepo for FakeRepo {
    async fn list(&self, resource: Resource) -> Result<Value, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(Value::Array(self.rows_of(resource)))
    }

    async fn find(&self, resource: Resource, id: i64) -> Result<Option<Value>, RepoError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let pk = resource.primary_key();
        Ok(self
            .rows_of(resource)
            .into_iter()
            .find(|row| row.get(pk).and_then(Value::as_i64) == Some(id)))
    }

    async fn find_donation_by_user(&self, user_id: i64) -> Result<Option<Value>, RepoError> {
        self.by_user_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .rows_of(Resource::Donations)
            .into_iter()
            .find(|row| row.get("user_id").and_then(Value::as_i64) == Some(user_id)))
    }
}

#[async_trait]
impl RecordRepo for FakeRepo {
    async fn create(&self, fields: &RecordFields) -> Result<Value, RepoError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let resource = fields.resource();
        let pk = resource.primary_key();
        let mut row = fields.values().clone();
        if !row.contains_key(pk) {
            let next = self
                .rows_of(resource)
                .iter()
                .filter_map(|row| row.get(pk).and_then(Value::as_i64))
                .max()
                .unwrap_or(0)
                + 1;
            row.insert(pk.to_string(), json!(next));
        }
        let row = Value::Object(row);
        self.insert(resource, row.clone());
        Ok(row)
    }

    async fn update(&self, id: i64, fields: &RecordFields) -> Result<Option<Value>, RepoError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let resource = fields.resource();
        let pk = resource.primary_key();
        let mut rows = self.rows.lock().expect("rows lock");
        let Some(row) = rows
            .get_mut(&resource)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|row| row.get(pk).and_then(Value::as_i64) == Some(id))
            })
        else {
            return Ok(None);
        };
        if let Value::Object(columns) = row {
            for (column, value) in fields.values() {
                columns.insert(column.clone(), value.clone());
            }
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, resource: Resource, id: i64) -> Result<bool, RepoError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let pk = resource.primary_key();
        let mut rows = self.rows.lock().expect("rows lock");
        let Some(rows) = rows.get_mut(&resource) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|row| row.get(pk).and_then(Value::as_i64) != Some(id));
        Ok(rows.len() < before)
    }
}

#[async_trait]
impl DonorStatsRepo for FakeRepo {
    async fn donor_totals(&self) -> Result<Vec<DonorTotals>, RepoError> {
        self.donor_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.donors.lock().expect("donors lock").clone())
    }
}

#[async_trait]
impl HealthRepo for FakeRepo {
    async fn ping(&self) -> Result<(), RepoError> {
        self.check()
    }
}

/// Volatile store that is permanently unreachable.
#[derive(Default)]
pub struct UnreachableStore {
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
}

#[async_trait]
impl CacheStore for UnreachableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set_ex(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

pub fn donor(user_id: i64, name: &str, total_donation: i64, total_transactions: i64) -> DonorTotals {
    DonorTotals {
        user_id,
        name: Some(name.to_string()),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        total_donation,
        total_transactions,
    }
}

/// A repository seeded with one or two rows of every resource.
pub fn seeded_repo() -> FakeRepo {
    let repo = FakeRepo::new();
    repo.insert(
        Resource::Users,
        json!({"id": 1, "username": "andi", "name": "Andi", "email": "andi@example.com"}),
    );
    repo.insert(
        Resource::Users,
        json!({"id": 2, "username": "budi", "name": "Budi", "email": "budi@example.com"}),
    );
    repo.insert(
        Resource::Orphanages,
        json!({"id": 10, "nama_panti": "Panti Asuhan Kasih", "nama_kota": "Bandung"}),
    );
    repo.insert(
        Resource::Bookmarks,
        json!({"id": 5, "user_id": 1, "rumah_yatim_id": 10}),
    );
    repo.insert(
        Resource::Prayers,
        json!({"id_doa": 3, "nama_doa": "Doa sebelum makan"}),
    );
    repo.insert(
        Resource::Donations,
        json!({"id": 21, "user_id": 1, "rumah_yatim_id": 10, "amount": 50000}),
    );
    repo.insert(
        Resource::Donations,
        json!({"id": 20, "user_id": 1, "rumah_yatim_id": 10, "amount": 25000}),
    );
    repo
}
