//! In-memory object store for tests
//!
//! Keeps objects in key order and pages listings like S3 does. Every call is counted,
//! and chosen writes, listings or deletes can be slowed down or made to fail.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::{BucketError, BucketResult, ObjectPage, ObjectStore, PutObject, StoredObject};

/// An object held by [`InMemoryObjectStore`]
#[derive(Debug, Clone)]
pub struct MemoryObject {
    pub body: Bytes,
    pub content_type: String,
    pub original_name: String,
    pub uploaded_at: DateTime<Utc>,
}

pub struct InMemoryObjectStore {
    objects: Mutex<BTreeMap<String, MemoryObject>>,
    page_size: usize,
    failing_names: HashSet<String>,
    write_delays: HashMap<String, Duration>,
    list_delay: Option<Duration>,
    fail_list: AtomicBool,
    fail_list_from_call: Option<usize>,
    fail_delete: AtomicBool,
    put_calls: AtomicUsize,
    list_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    completed_writes: Mutex<Vec<String>>,
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryObjectStore {
    /// S3 returns at most 1000 keys per page
    pub const DEFAULT_PAGE_SIZE: usize = 1000;

    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_size: Self::DEFAULT_PAGE_SIZE,
            failing_names: HashSet::new(),
            write_delays: HashMap::new(),
            list_delay: None,
            fail_list: AtomicBool::new(false),
            fail_list_from_call: None,
            fail_delete: AtomicBool::new(false),
            put_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            completed_writes: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Makes writes of files named `original_name` fail
    #[must_use]
    pub fn failing_on(mut self, original_name: impl Into<String>) -> Self {
        self.failing_names.insert(original_name.into());
        self
    }

    /// Holds writes of files named `original_name` for `delay` before storing them
    #[must_use]
    pub fn delaying_on(mut self, original_name: impl Into<String>, delay: Duration) -> Self {
        self.write_delays.insert(original_name.into(), delay);
        self
    }

    /// Holds every listing call for `delay`
    #[must_use]
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    /// Lets the first `pages` listing calls succeed and fails every later one
    #[must_use]
    pub fn failing_list_after(mut self, pages: usize) -> Self {
        self.fail_list_from_call = Some(pages);
        self
    }

    pub fn set_list_failure(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn set_delete_failure(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Seeds an object without counting a write
    pub fn insert(&self, key: impl Into<String>, body: impl Into<Bytes>) {
        let key = key.into();
        self.lock().insert(
            key.clone(),
            MemoryObject {
                body: body.into(),
                content_type: "application/octet-stream".to_string(),
                original_name: key,
                uploaded_at: Utc::now(),
            },
        );
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<MemoryObject> {
        self.lock().get(key).cloned()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    #[must_use]
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Original names of finished writes, failed ones included, in completion order
    #[must_use]
    pub fn completed_writes(&self) -> Vec<String> {
        self.completed_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Total number of backend calls
    #[must_use]
    pub fn calls(&self) -> usize {
        self.put_calls() + self.list_calls() + self.delete_calls()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, MemoryObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(&self, object: PutObject) -> BucketResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.write_delays.get(&object.original_name) {
            tokio::time::sleep(*delay).await;
        }

        self.completed_writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(object.original_name.clone());

        if self.failing_names.contains(&object.original_name) {
            return Err(BucketError::UpstreamError(format!(
                "injected write failure for {}",
                object.original_name
            )));
        }

        self.lock().insert(
            object.key,
            MemoryObject {
                body: object.body,
                content_type: object.content_type,
                original_name: object.original_name,
                uploaded_at: object.uploaded_at,
            },
        );

        Ok(())
    }

    async fn list_objects_page(
        &self,
        continuation_token: Option<String>,
    ) -> BucketResult<ObjectPage> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }

        let past_failure_point = self.fail_list_from_call.is_some_and(|from| call >= from);
        if past_failure_point || self.fail_list.load(Ordering::SeqCst) {
            return Err(BucketError::S3Error("injected list failure".to_string()));
        }

        let objects = self.lock();
        let lower = continuation_token.map_or(Bound::Unbounded, Bound::Excluded);
        let mut remaining = objects.range((lower, Bound::Unbounded));

        let page: Vec<StoredObject> = remaining
            .by_ref()
            .take(self.page_size)
            .map(|(key, object)| StoredObject {
                key: key.clone(),
                size: object.body.len() as u64,
                last_modified: Some(object.uploaded_at),
            })
            .collect();

        let next_continuation_token = match (remaining.next(), page.last()) {
            (Some(_), Some(last)) => Some(last.key.clone()),
            _ => None,
        };

        Ok(ObjectPage {
            objects: page,
            next_continuation_token,
        })
    }

    async fn delete_object(&self, key: &str) -> BucketResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(BucketError::S3Error("injected delete failure".to_string()));
        }

        self.lock().remove(key);
        Ok(())
    }
}
