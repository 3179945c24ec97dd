use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Decision, DecisionType, Feedback, PreferenceTable, User},
};

pub mod memory;
pub mod postgres;
pub mod redis;

pub use memory::InMemoryStore;
pub use postgres::{create_pool, PostgresStore};
pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;

/// Aggregate over a user's feedback records
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackSummary {
    pub count: i64,
    pub average_rating: Option<f64>,
}

/// Persistence for users, decisions and feedback
///
/// Listing methods return records newest first.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> AppResult<Option<User>>;

    /// Inserts the user or replaces every stored field
    async fn save_user(&self, user: &User) -> AppResult<()>;

    async fn insert_decision(&self, decision: &Decision) -> AppResult<()>;

    /// Looks a decision up by id, scoped to its owner
    async fn find_decision(&self, user_id: Uuid, decision_id: Uuid)
        -> AppResult<Option<Decision>>;

    /// Most recent decisions, optionally restricted to one type
    async fn recent_decisions(
        &self,
        user_id: Uuid,
        decision_type: Option<DecisionType>,
        limit: i64,
    ) -> AppResult<Vec<Decision>>;

    /// Appends the feedback, stamps the decision with its choice and rating,
    /// and folds the rating into the owner's weights as one unit
    ///
    /// Fails with `NotFound` when the user or the owned decision is missing,
    /// leaving nothing written. Returns the updated preference table.
    async fn record_feedback(&self, feedback: &Feedback) -> AppResult<PreferenceTable>;

    /// All feedback the user left on the given decisions
    async fn feedback_for_decisions(
        &self,
        user_id: Uuid,
        decision_ids: &[Uuid],
    ) -> AppResult<Vec<Feedback>>;

    async fn count_decisions(&self, user_id: Uuid) -> AppResult<i64>;

    async fn feedback_summary(&self, user_id: Uuid) -> AppResult<FeedbackSummary>;
}
