//! Repository abstraction over the shared incident/task/NGO collections.
//!
//! Controllers only talk to [`Repository`]; the in-memory store is the only
//! backing implementation today.

use async_trait::async_trait;

use crate::models::{Incident, NgoProfile, Task};
use crate::DrcsResult;

pub mod fixtures;
pub mod memory;

pub use memory::MemoryStore;

/// Conditional in-place update. The store commits the change only when the
/// closure returns `Ok`, so a failed mutation leaves the entity untouched.
pub type Mutation<T> = Box<dyn FnOnce(&mut T) -> DrcsResult<()> + Send>;

#[async_trait]
pub trait Repository: Send + Sync {
    /// Append a new incident, preserving insertion order
    async fn insert_incident(&self, incident: Incident) -> DrcsResult<Incident>;
    async fn get_incident(&self, id: &str) -> DrcsResult<Incident>;
    async fn list_incidents(&self) -> DrcsResult<Vec<Incident>>;
    async fn update_incident(&self, id: &str, mutation: Mutation<Incident>) -> DrcsResult<Incident>;

    async fn insert_task(&self, task: Task) -> DrcsResult<Task>;
    async fn get_task(&self, id: &str) -> DrcsResult<Task>;
    /// All tasks in creation order
    async fn list_tasks(&self) -> DrcsResult<Vec<Task>>;
    async fn update_task(&self, id: &str, mutation: Mutation<Task>) -> DrcsResult<Task>;

    async fn insert_ngo(&self, profile: NgoProfile) -> DrcsResult<NgoProfile>;
    async fn get_ngo(&self, id: &str) -> DrcsResult<NgoProfile>;
    async fn update_ngo(&self, id: &str, mutation: Mutation<NgoProfile>) -> DrcsResult<NgoProfile>;
}
