//! Memory is an external collaborator: the core consumes it only through
//! this small trait, never by owning a storage engine itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryItem {
    pub id: Uuid,
    pub memory_type: String,
    pub content: String,
    pub importance: f32,
    pub connections: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct StoreMemoryRequest {
    pub memory_type: String,
    pub content: String,
    pub importance: Option<f32>,
    pub connections: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct RetrieveMemoryRequest {
    pub query: String,
    pub limit: Option<usize>,
}

/// Adapter boundary for whatever durable memory store is wired in; the
/// core only ever calls through this surface.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    async fn store(&self, req: StoreMemoryRequest) -> crate::error::Result<Uuid>;

    async fn retrieve(&self, req: RetrieveMemoryRequest) -> crate::error::Result<Vec<MemoryItem>>;

    /// Removes entries past their retention policy; returns the count removed.
    async fn maintain(&self) -> crate::error::Result<usize>;
}
