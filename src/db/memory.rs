use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{FeedbackSummary, Store};
use crate::{
    error::{AppError, AppResult},
    models::{Decision, DecisionType, Feedback, PreferenceTable, User},
};

/// Process-local [`Store`] for tests and database-less local runs
///
/// Decisions and feedback are kept in insertion order, which is also
/// chronological, so "newest first" is a reverse walk.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<InMemoryStoreInner>>,
}

#[derive(Default)]
struct InMemoryStoreInner {
    users: HashMap<Uuid, User>,
    decisions: Vec<Decision>,
    feedback: Vec<Feedback>,
}

impl InMemoryStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Store for InMemoryStore {
    async fn find_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&user_id).cloned())
    }

    async fn save_user(&self, user: &User) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn insert_decision(&self, decision: &Decision) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.decisions.push(decision.clone());
        Ok(())
    }

    async fn find_decision(
        &self,
        user_id: Uuid,
        decision_id: Uuid,
    ) -> AppResult<Option<Decision>> {
        let inner = self.inner.read().await;
        Ok(inner
            .decisions
            .iter()
            .find(|d| d.id == decision_id && d.user_id == user_id)
            .cloned())
    }

    async fn recent_decisions(
        &self,
        user_id: Uuid,
        decision_type: Option<DecisionType>,
        limit: i64,
    ) -> AppResult<Vec<Decision>> {
        let inner = self.inner.read().await;
        Ok(inner
            .decisions
            .iter()
            .rev()
            .filter(|d| d.user_id == user_id)
            .filter(|d| decision_type.map_or(true, |t| d.decision_type == t))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn record_feedback(&self, feedback: &Feedback) -> AppResult<PreferenceTable> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let user = inner
            .users
            .get_mut(&feedback.user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let decision = inner
            .decisions
            .iter_mut()
            .find(|d| d.id == feedback.decision_id && d.user_id == feedback.user_id)
            .ok_or_else(|| AppError::NotFound("Decision not found".to_string()))?;

        decision.chosen_option = Some(feedback.chosen_option.clone());
        decision.rating = Some(feedback.rating);
        user.preferences
            .update(feedback.decision_type, &feedback.chosen_option, feedback.rating);
        user.updated_at = chrono::Utc::now();
        inner.feedback.push(feedback.clone());

        Ok(user.preferences.clone())
    }

    async fn feedback_for_decisions(
        &self,
        user_id: Uuid,
        decision_ids: &[Uuid],
    ) -> AppResult<Vec<Feedback>> {
        let inner = self.inner.read().await;
        Ok(inner
            .feedback
            .iter()
            .rev()
            .filter(|f| f.user_id == user_id && decision_ids.contains(&f.decision_id))
            .cloned()
            .collect())
    }

    async fn count_decisions(&self, user_id: Uuid) -> AppResult<i64> {
        let inner = self.inner.read().await;
        let count = inner.decisions.iter().filter(|d| d.user_id == user_id).count();
        Ok(count as i64)
    }

    async fn feedback_summary(&self, user_id: Uuid) -> AppResult<FeedbackSummary> {
        let inner = self.inner.read().await;
        let ratings: Vec<f64> = inner
            .feedback
            .iter()
            .filter(|f| f.user_id == user_id)
            .map(|f| f64::from(f.rating))
            .collect();

        let average_rating = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        };

        Ok(FeedbackSummary {
            count: ratings.len() as i64,
            average_rating,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn decision(user_id: Uuid, decision_type: DecisionType, label: &str) -> Decision {
        Decision {
            id: Uuid::new_v4(),
            user_id,
            decision_type,
            context: None,
            options: vec![label.to_string()],
            ai_suggestion: None,
            confidence: 0.5,
            question: decision_type.default_question().to_string(),
            provider_used: "fallback".to_string(),
            chosen_option: None,
            rating: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_recent_decisions_newest_first_and_filtered() {
        let store = InMemoryStore::new();
        let user_id = Uuid::new_v4();

        for label in ["first", "second", "third"] {
            store
                .insert_decision(&decision(user_id, DecisionType::Meal, label))
                .await
                .unwrap();
        }
        store
            .insert_decision(&decision(user_id, DecisionType::Task, "task"))
            .await
            .unwrap();
        store
            .insert_decision(&decision(Uuid::new_v4(), DecisionType::Meal, "other user"))
            .await
            .unwrap();

        let recent = store
            .recent_decisions(user_id, Some(DecisionType::Meal), 2)
            .await
            .unwrap();
        let labels: Vec<&str> = recent.iter().map(|d| d.options[0].as_str()).collect();
        assert_eq!(labels, vec!["third", "second"]);

        let all = store.recent_decisions(user_id, None, 10).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].options[0], "task");
    }

    #[tokio::test]
    async fn test_find_decision_scoped_to_owner() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let d = decision(owner, DecisionType::Clothing, "Linen shirt");
        store.insert_decision(&d).await.unwrap();

        assert!(store.find_decision(owner, d.id).await.unwrap().is_some());
        assert!(store
            .find_decision(Uuid::new_v4(), d.id)
            .await
            .unwrap()
            .is_none());
    }

    fn feedback(decision: &Decision, chosen_option: &str, rating: i16) -> Feedback {
        Feedback {
            id: Uuid::new_v4(),
            decision_id: decision.id,
            user_id: decision.user_id,
            decision_type: decision.decision_type,
            chosen_option: chosen_option.to_string(),
            rating,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_feedback_requires_user() {
        let store = InMemoryStore::new();
        let d = decision(Uuid::new_v4(), DecisionType::Meal, "Dosa");
        store.insert_decision(&d).await.unwrap();

        let err = store
            .record_feedback(&feedback(&d, "Dosa", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let stored = store.find_decision(d.user_id, d.id).await.unwrap().unwrap();
        assert_eq!(stored.rating, None);
        assert_eq!(store.feedback_summary(d.user_id).await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_record_feedback_rejects_foreign_decision() {
        let store = InMemoryStore::new();
        let user = User::new(Uuid::new_v4());
        store.save_user(&user).await.unwrap();
        let foreign = decision(Uuid::new_v4(), DecisionType::Task, "Inbox zero");
        store.insert_decision(&foreign).await.unwrap();

        let mut fb = feedback(&foreign, "Inbox zero", 4);
        fb.user_id = user.id;
        let err = store.record_feedback(&fb).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let stored = store.find_user(user.id).await.unwrap().unwrap();
        assert!(stored.preferences.task.is_empty());
    }

    #[tokio::test]
    async fn test_feedback_summary() {
        let store = InMemoryStore::new();
        let user = User::new(Uuid::new_v4());
        store.save_user(&user).await.unwrap();

        let empty = store.feedback_summary(user.id).await.unwrap();
        assert_eq!(empty.count, 0);
        assert_eq!(empty.average_rating, None);

        let d = decision(user.id, DecisionType::Meal, "Dosa");
        store.insert_decision(&d).await.unwrap();
        for rating in [4, 5] {
            store.record_feedback(&feedback(&d, "Dosa", rating)).await.unwrap();
        }

        let summary = store.feedback_summary(user.id).await.unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.average_rating, Some(4.5));
    }

    #[test]
    fn test_repeated_feedback_keeps_latest_outcome() {
        tokio_test::block_on(async {
            let store = InMemoryStore::new();
            let user = User::new(Uuid::new_v4());
            store.save_user(&user).await.unwrap();
            let mut d = decision(user.id, DecisionType::Task, "Inbox zero");
            d.options.push("Gym".to_string());
            store.insert_decision(&d).await.unwrap();

            tokio_test::assert_ok!(store.record_feedback(&feedback(&d, "Inbox zero", 2)).await);
            let preferences =
                tokio_test::assert_ok!(store.record_feedback(&feedback(&d, "Gym", 5)).await);

            assert_eq!(preferences.task["Inbox zero"], -1.0);
            assert_eq!(preferences.task["Gym"], 2.0);

            let stored = store.find_decision(user.id, d.id).await.unwrap().unwrap();
            assert_eq!(stored.chosen_option.as_deref(), Some("Gym"));
            assert_eq!(stored.rating, Some(5));

            let all = store.feedback_for_decisions(user.id, &[d.id]).await.unwrap();
            assert_eq!(all.len(), 2);
            assert_eq!(all[0].chosen_option, "Gym");
        });
    }
}
