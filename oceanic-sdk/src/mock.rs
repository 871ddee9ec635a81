//! Scripted in-memory control plane for lifecycle tests.
//!
//! The mock records every call in order and serves scripted outcomes first;
//! when no outcome is queued for an operation it falls back to a small
//! in-memory cluster store: create assigns an id and remembers the cluster,
//! read answers from the store, update replaces the stored cluster, delete
//! clears it, roll succeeds.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{ApiResult, OceanApi};
use crate::error::ApiError;
use crate::model::{Cluster, RollSpec};

/// One recorded control plane call, with its input.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    CreateCluster(Cluster),
    ReadCluster(String),
    UpdateCluster(Cluster),
    DeleteCluster(String),
    CreateRoll(RollSpec),
}

impl ApiCall {
    /// Operation name, for compact call-sequence assertions.
    pub fn name(&self) -> &'static str {
        match self {
            ApiCall::CreateCluster(_) => "create_cluster",
            ApiCall::ReadCluster(_) => "read_cluster",
            ApiCall::UpdateCluster(_) => "update_cluster",
            ApiCall::DeleteCluster(_) => "delete_cluster",
            ApiCall::CreateRoll(_) => "create_roll",
        }
    }
}

#[derive(Default)]
struct MockState {
    calls: Vec<ApiCall>,
    create_results: VecDeque<ApiResult<Cluster>>,
    read_results: VecDeque<ApiResult<Option<Cluster>>>,
    update_results: VecDeque<ApiResult<()>>,
    delete_results: VecDeque<ApiResult<()>>,
    roll_results: VecDeque<ApiResult<()>>,
    stored: Option<Cluster>,
    next_id: u64,
}

/// In-memory [`OceanApi`] double with scripted outcomes.
#[derive(Default)]
pub struct MockOceanApi {
    state: Mutex<MockState>,
}

impl MockOceanApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for the next `create_cluster` call.
    pub fn push_create_result(&self, result: ApiResult<Cluster>) {
        self.lock().create_results.push_back(result);
    }

    /// Queue an outcome for the next `read_cluster` call.
    pub fn push_read_result(&self, result: ApiResult<Option<Cluster>>) {
        self.lock().read_results.push_back(result);
    }

    /// Queue an outcome for the next `update_cluster` call.
    pub fn push_update_result(&self, result: ApiResult<()>) {
        self.lock().update_results.push_back(result);
    }

    /// Queue an outcome for the next `delete_cluster` call.
    pub fn push_delete_result(&self, result: ApiResult<()>) {
        self.lock().delete_results.push_back(result);
    }

    /// Queue an outcome for the next `create_roll` call.
    pub fn push_roll_result(&self, result: ApiResult<()>) {
        self.lock().roll_results.push_back(result);
    }

    /// Seed the in-memory store with an existing cluster.
    pub fn seed_cluster(&self, cluster: Cluster) {
        self.lock().stored = Some(cluster);
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Operation names of all recorded calls, in order.
    pub fn call_names(&self) -> Vec<&'static str> {
        self.lock().calls.iter().map(ApiCall::name).collect()
    }

    /// How many times the given operation was called.
    pub fn call_count(&self, name: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.name() == name)
            .count()
    }

    /// The cluster currently held by the in-memory store.
    pub fn stored_cluster(&self) -> Option<Cluster> {
        self.lock().stored.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state lock poisoned")
    }
}

#[async_trait]
impl OceanApi for MockOceanApi {
    async fn create_cluster(&self, cluster: &Cluster) -> ApiResult<Cluster> {
        let mut state = self.lock();
        state.calls.push(ApiCall::CreateCluster(cluster.clone()));
        if let Some(result) = state.create_results.pop_front() {
            if let Ok(created) = &result {
                state.stored = Some(created.clone());
            }
            return result;
        }
        state.next_id += 1;
        let mut created = cluster.clone();
        created.id = Some(format!("o-{:06}", state.next_id));
        state.stored = Some(created.clone());
        Ok(created)
    }

    async fn read_cluster(&self, cluster_id: &str) -> ApiResult<Option<Cluster>> {
        let mut state = self.lock();
        state.calls.push(ApiCall::ReadCluster(cluster_id.to_string()));
        if let Some(result) = state.read_results.pop_front() {
            return result;
        }
        match &state.stored {
            Some(cluster) if cluster.id.as_deref() == Some(cluster_id) => {
                Ok(Some(cluster.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn update_cluster(&self, cluster: &Cluster) -> ApiResult<()> {
        let mut state = self.lock();
        state.calls.push(ApiCall::UpdateCluster(cluster.clone()));
        if let Some(result) = state.update_results.pop_front() {
            return result;
        }
        match &state.stored {
            Some(stored) if stored.id == cluster.id => {
                state.stored = Some(cluster.clone());
                Ok(())
            }
            _ => Err(ApiError::cluster_not_found(
                cluster.id.as_deref().unwrap_or(""),
            )),
        }
    }

    async fn delete_cluster(&self, cluster_id: &str) -> ApiResult<()> {
        let mut state = self.lock();
        state.calls.push(ApiCall::DeleteCluster(cluster_id.to_string()));
        if let Some(result) = state.delete_results.pop_front() {
            return result;
        }
        match &state.stored {
            Some(stored) if stored.id.as_deref() == Some(cluster_id) => {
                state.stored = None;
                Ok(())
            }
            _ => Err(ApiError::cluster_not_found(cluster_id)),
        }
    }

    async fn create_roll(&self, roll: &RollSpec) -> ApiResult<()> {
        let mut state = self.lock();
        state.calls.push(ApiCall::CreateRoll(roll.clone()));
        if let Some(result) = state.roll_results.pop_front() {
            return result;
        }
        Ok(())
    }
}
