//! Generic list/detail/create/update/delete view over one resource kind.
//!
//! Every screen of the back-office has the same shape, so a single view type
//! parameterized by `ResourceKind` replaces per-screen state handling.

use crate::api::ResourceClient;
use crate::error::ApiError;
use crate::models::ResourceKind;
use serde_json::Value;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

/// Result of a load that may have been overtaken by a newer one.
#[derive(Debug, Clone, PartialEq)]
pub enum Applied<T> {
    Current(T),
    /// A newer load started (or the view was left) while this one was in
    /// flight; its result was dropped.
    Superseded,
}

/// Keeps the loading flag raised while alive.
struct Pending<'a>(&'a AtomicUsize);

impl<'a> Pending<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct ResourceView {
    kind: ResourceKind,
    resources: ResourceClient,
    generation: AtomicU64,
    pending: AtomicUsize,
    records: Mutex<Vec<Value>>,
    selected: Mutex<Option<Value>>,
    banner: Mutex<Option<Banner>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn capitalized(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ResourceView {
    pub fn new(kind: ResourceKind, resources: ResourceClient) -> Self {
        Self {
            kind,
            resources,
            generation: AtomicU64::new(0),
            pending: AtomicUsize::new(0),
            records: Mutex::new(Vec::new()),
            selected: Mutex::new(None),
            banner: Mutex::new(None),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn is_loading(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    pub fn records(&self) -> Vec<Value> {
        lock(&self.records).clone()
    }

    pub fn selected(&self) -> Option<Value> {
        lock(&self.selected).clone()
    }

    pub fn banner(&self) -> Option<Banner> {
        lock(&self.banner).clone()
    }

    pub fn dismiss_banner(&self) {
        *lock(&self.banner) = None;
    }

    /// Navigating away: responses still in flight will be ignored.
    pub fn leave(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    fn fail(&self, err: &ApiError) {
        *lock(&self.banner) = Some(Banner::Error(self.kind.describe_error(err)));
    }

    /// Reload the list.
    pub async fn refresh(&self) -> Result<Applied<usize>, ApiError> {
        let ticket = self.begin();
        let result = {
            let _pending = Pending::start(&self.pending);
            self.resources.list(self.kind).await
        };

        if !self.is_current(ticket) {
            debug!(kind = %self.kind, "ignoring superseded list response");
            return Ok(Applied::Superseded);
        }

        match result {
            Ok(records) => {
                let count = records.len();
                *lock(&self.records) = records;
                Ok(Applied::Current(count))
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Load one record for the detail or edit screen.
    pub async fn open(&self, id: &str) -> Result<Applied<Value>, ApiError> {
        let ticket = self.begin();
        let result = {
            let _pending = Pending::start(&self.pending);
            self.resources.get(self.kind, id).await
        };

        if !self.is_current(ticket) {
            debug!(kind = %self.kind, id, "ignoring superseded detail response");
            return Ok(Applied::Superseded);
        }

        match result {
            Ok(record) => {
                *lock(&self.selected) = Some(record.clone());
                Ok(Applied::Current(record))
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    pub async fn create(&self, body: &Value) -> Result<Value, ApiError> {
        let message = format!("{} created", capitalized(self.kind.singular()));
        self.submit(self.resources.create(self.kind, body), message)
            .await
    }

    pub async fn update(&self, id: &str, body: &Value) -> Result<Value, ApiError> {
        let message = format!("{} updated", capitalized(self.kind.singular()));
        self.submit(self.resources.update(self.kind, id, body), message)
            .await
    }

    pub async fn remove(&self, id: &str) -> Result<Value, ApiError> {
        let message = format!("{} deleted", capitalized(self.kind.singular()));
        let response = self
            .submit(self.resources.delete(self.kind, id), message)
            .await?;

        let id_field = self.kind.id_field();
        lock(&self.records).retain(|record| match record.get(id_field) {
            Some(Value::String(s)) => s != id,
            Some(other) => other.to_string() != id,
            None => true,
        });
        Ok(response)
    }

    async fn submit<F>(&self, action: F, success: String) -> Result<Value, ApiError>
    where
        F: Future<Output = Result<Value, ApiError>>,
    {
        let result = {
            let _pending = Pending::start(&self.pending);
            action.await
        };

        match result {
            Ok(response) => {
                let message = response
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(|m| m.to_string())
                    .unwrap_or(success);
                *lock(&self.banner) = Some(Banner::Success(message));
                Ok(response)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }
}
