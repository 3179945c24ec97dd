use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{
        Decision, DecisionType, Feedback, FeedbackRequest, FeedbackResponse, HistoryEntry,
        PreferenceTable, RecommendationRequest, RecommendationResponse, TopPreferences, User,
        UserStats,
    },
    services::{
        ai::{Suggester, SuggestionRequest},
        fallback::fallback_options,
    },
};

/// Number of options offered per recommendation
pub const OPTION_COUNT: usize = 4;

const RECENT_DECISIONS: i64 = 7;
const MAX_RECENT_SUGGESTIONS: usize = 12;
const TOP_PREFERENCES: usize = 3;
const REPEAT_RATING: i16 = 4;
const MIN_RATING: i16 = 1;
const MAX_RATING: i16 = 5;

pub const DEFAULT_HISTORY_LIMIT: i64 = 10;
pub const MAX_HISTORY_LIMIT: i64 = 50;

const FALLBACK_PROVIDER: &str = "fallback";

/// Produces recommendations and learns from feedback
///
/// Owns no state of its own: users, decisions and feedback live in the
/// [`Store`], suggestions come from the [`Suggester`].
#[derive(Clone)]
pub struct DecisionEngine {
    store: Arc<dyn Store>,
    suggester: Arc<dyn Suggester>,
}

impl DecisionEngine {
    pub fn new(store: Arc<dyn Store>, suggester: Arc<dyn Suggester>) -> Self {
        Self { store, suggester }
    }

    async fn load_user(&self, user_id: Uuid) -> AppResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Learned weights, empty for a user who has not onboarded yet
    async fn load_preferences(&self, user_id: Uuid) -> AppResult<PreferenceTable> {
        Ok(self
            .store
            .find_user(user_id)
            .await?
            .map(|user| user.preferences)
            .unwrap_or_default())
    }

    /// Builds, persists and returns a fresh recommendation
    #[instrument(skip(self, request), fields(decision_type = %request.decision_type))]
    pub async fn get_recommendation(
        &self,
        user_id: Uuid,
        request: RecommendationRequest,
    ) -> AppResult<RecommendationResponse> {
        let decision_type = request.decision_type;
        let user = self.load_user(user_id).await?;

        let recent = self
            .store
            .recent_decisions(user_id, Some(decision_type), RECENT_DECISIONS)
            .await?;

        let recent_options: Vec<String> = recent
            .iter()
            .flat_map(|d| d.options.iter().cloned())
            .collect();
        let recent_chosen: Vec<String> = recent
            .iter()
            .filter_map(|d| d.chosen_option.clone())
            .filter(|o| !o.trim().is_empty())
            .collect();
        let recent_suggestions = recent_suggestions(&recent_chosen, &recent_options);

        let suggestion = self
            .suggester
            .suggest(&SuggestionRequest {
                decision_type,
                context: request.context.clone(),
                weights: user.preferences.weights(decision_type).clone(),
                user_data: user.onboarding.clone(),
                recent_suggestions,
                preferred_provider: user.preferred_provider,
                user_api_key: user.api_key.clone(),
            })
            .await?;

        let allow_repeat = recent
            .iter()
            .find(|d| d.rating.is_some_and(|r| r >= REPEAT_RATING) && d.chosen_option.is_some())
            .and_then(|d| d.chosen_option.as_deref());

        let learned = user.preferences.top_options(decision_type, OPTION_COUNT);
        let options = merge_options(
            suggestion.as_ref().map(|s| s.suggestion.as_str()),
            &learned,
            fallback_options(decision_type),
            &recent_options,
            allow_repeat,
        );

        let confidence = user
            .preferences
            .confidence(decision_type, options.first().map(String::as_str));

        let question = request
            .question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| decision_type.default_question())
            .to_string();

        let provider_used = suggestion
            .as_ref()
            .map(|s| s.provider.clone())
            .unwrap_or_else(|| FALLBACK_PROVIDER.to_string());

        let decision = Decision {
            id: Uuid::new_v4(),
            user_id,
            decision_type,
            context: request.context,
            options,
            ai_suggestion: suggestion.map(|s| s.suggestion),
            confidence,
            question,
            provider_used,
            chosen_option: None,
            rating: None,
            created_at: Utc::now(),
        };

        self.store.insert_decision(&decision).await?;

        tracing::info!(
            decision_id = %decision.id,
            provider = %decision.provider_used,
            options = decision.options.len(),
            "Recommendation created"
        );

        Ok(RecommendationResponse {
            decision_id: decision.id,
            options: decision.options,
            ai_suggestion: decision.ai_suggestion,
            confidence: decision.confidence,
            decision_type,
            question: decision.question,
            provider_used: decision.provider_used,
        })
    }

    /// Records the user's pick for a decision and folds it into their weights
    #[instrument(skip(self, request), fields(decision_id = %request.decision_id))]
    pub async fn record_feedback(
        &self,
        user_id: Uuid,
        request: FeedbackRequest,
    ) -> AppResult<FeedbackResponse> {
        if !(MIN_RATING..=MAX_RATING).contains(&request.rating) {
            return Err(AppError::InvalidInput(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        let decision = self
            .store
            .find_decision(user_id, request.decision_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Decision not found".to_string()))?;

        if !decision.options.contains(&request.chosen_option) {
            return Err(AppError::InvalidInput("Invalid option selected".to_string()));
        }

        let feedback = Feedback {
            id: Uuid::new_v4(),
            decision_id: decision.id,
            user_id,
            decision_type: decision.decision_type,
            chosen_option: request.chosen_option,
            rating: request.rating,
            created_at: Utc::now(),
        };

        let preferences = self.store.record_feedback(&feedback).await?;

        tracing::info!(
            rating = feedback.rating,
            decision_type = %decision.decision_type,
            "Feedback recorded"
        );

        Ok(FeedbackResponse {
            success: true,
            updated_preferences: preferences.weights(decision.decision_type).clone(),
        })
    }

    /// Totals, average rating and the top learned options per type
    pub async fn get_user_stats(&self, user_id: Uuid) -> AppResult<UserStats> {
        let prefs = self.load_preferences(user_id).await?;
        let total_decisions = self.store.count_decisions(user_id).await?;
        let summary = self.store.feedback_summary(user_id).await?;

        Ok(UserStats {
            total_decisions,
            total_feedback: summary.count,
            average_rating: summary.average_rating.unwrap_or(0.0),
            top_preferences: TopPreferences {
                meal: prefs.top_options(DecisionType::Meal, TOP_PREFERENCES),
                task: prefs.top_options(DecisionType::Task, TOP_PREFERENCES),
                clothing: prefs.top_options(DecisionType::Clothing, TOP_PREFERENCES),
            },
        })
    }

    /// Newest decisions with their outcome, `limit` clamped to `1..=50`
    pub async fn get_user_history(
        &self,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> AppResult<Vec<HistoryEntry>> {
        let limit = clamp_history_limit(limit);
        let preferences = self.load_preferences(user_id).await?;

        let decisions = self.store.recent_decisions(user_id, None, limit).await?;
        let ids: Vec<Uuid> = decisions.iter().map(|d| d.id).collect();
        let feedback = self.store.feedback_for_decisions(user_id, &ids).await?;

        // Feedback arrives newest first, so the first one seen per decision wins
        let mut latest: HashMap<Uuid, &Feedback> = HashMap::new();
        for fb in &feedback {
            latest.entry(fb.decision_id).or_insert(fb);
        }

        let entries = decisions
            .into_iter()
            .map(|decision| {
                let newest = latest.get(&decision.id);
                let chosen_option = decision
                    .chosen_option
                    .clone()
                    .or_else(|| newest.map(|fb| fb.chosen_option.clone()));
                let rating = decision.rating.or_else(|| newest.map(|fb| fb.rating));

                let target = chosen_option
                    .as_deref()
                    .or_else(|| decision.options.first().map(String::as_str))
                    .or(decision.ai_suggestion.as_deref());
                let confidence = preferences.confidence(decision.decision_type, target);

                HistoryEntry {
                    decision_id: decision.id,
                    decision_type: decision.decision_type,
                    question: decision.question,
                    ai_suggestion: decision.ai_suggestion,
                    options: decision.options,
                    confidence,
                    provider_used: decision.provider_used,
                    chosen_option,
                    rating,
                    created_at: decision.created_at,
                }
            })
            .collect();

        Ok(entries)
    }
}

pub fn clamp_history_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT)
}

/// Order-preserving unique of `chosen ++ options`, at most 12 labels
fn recent_suggestions(chosen: &[String], options: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in chosen.iter().chain(options) {
        if out.len() == MAX_RECENT_SUGGESTIONS {
            break;
        }
        if !out.contains(label) {
            out.push(label.clone());
        }
    }
    out
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

/// Combines AI, learned and fallback candidates into at most four options
///
/// Candidates matching a recently offered option are skipped unless they are
/// `allow_repeat`. If that leaves fewer than four, fallbacks are added again
/// without the recency filter.
pub fn merge_options(
    ai_suggestion: Option<&str>,
    learned: &[String],
    fallback: &[&str],
    recent_options: &[String],
    allow_repeat: Option<&str>,
) -> Vec<String> {
    let recent: Vec<String> = recent_options.iter().map(|o| normalize(o)).collect();
    let allow_repeat = allow_repeat.map(str::trim);

    let mut options: Vec<String> = Vec::with_capacity(OPTION_COUNT);

    let push = |options: &mut Vec<String>, candidate: &str, check_recent: bool| {
        let candidate = candidate.trim();
        if candidate.is_empty() || options.iter().any(|o| o == candidate) {
            return;
        }
        if check_recent
            && recent.contains(&normalize(candidate))
            && allow_repeat != Some(candidate)
        {
            return;
        }
        options.push(candidate.to_string());
    };

    if let Some(ai) = ai_suggestion {
        push(&mut options, ai, true);
    }
    for label in learned {
        push(&mut options, label, true);
    }
    for label in fallback {
        if options.len() >= OPTION_COUNT {
            break;
        }
        push(&mut options, label, true);
    }
    for label in fallback {
        if options.len() >= OPTION_COUNT {
            break;
        }
        push(&mut options, label, false);
    }

    options.truncate(OPTION_COUNT);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::services::ai::{AiSuggestion, MockSuggester};
    use mockall::predicate::function;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    const FALLBACK: &[&str] = &["F1", "F2", "F3", "F4", "F5"];

    #[test]
    fn test_merge_ai_then_learned_then_fallback() {
        let options = merge_options(Some("AI pick"), &s(&["L1"]), FALLBACK, &[], None);
        assert_eq!(options, s(&["AI pick", "L1", "F1", "F2"]));
    }

    #[test]
    fn test_merge_skips_blank_and_duplicates() {
        let options = merge_options(Some("  "), &s(&["F1", "L2"]), FALLBACK, &[], None);
        assert_eq!(options, s(&["F1", "L2", "F2", "F3"]));
    }

    #[test]
    fn test_merge_avoids_recent_case_insensitively() {
        let recent = s(&[" ai pick ", "f1", "L1"]);
        let options = merge_options(Some("AI Pick"), &s(&["L1", "L2"]), FALLBACK, &recent, None);
        assert_eq!(options, s(&["L2", "F2", "F3", "F4"]));
    }

    #[test]
    fn test_merge_allows_exact_repeat_of_liked_choice() {
        let recent = s(&["L1", "F1"]);
        let options = merge_options(None, &s(&["L1"]), FALLBACK, &recent, Some("L1"));
        assert_eq!(options, s(&["L1", "F2", "F3", "F4"]));

        // Only an exact match is allowed back in
        let options = merge_options(None, &s(&["l1"]), FALLBACK, &recent, Some("L1"));
        assert_eq!(options, s(&["F2", "F3", "F4", "F5"]));
    }

    #[test]
    fn test_merge_refills_from_fallback_ignoring_recency() {
        let recent = s(&["F1", "F2", "F3", "F4"]);
        let options = merge_options(None, &[], &["F1", "F2", "F3", "F4"], &recent, None);
        assert_eq!(options, s(&["F1", "F2", "F3", "F4"]));
    }

    #[test]
    fn test_merge_truncates_to_four() {
        let options = merge_options(Some("A"), &s(&["B", "C", "D", "E"]), FALLBACK, &[], None);
        assert_eq!(options.len(), OPTION_COUNT);
        assert_eq!(options, s(&["A", "B", "C", "D"]));
    }

    #[test]
    fn test_recent_suggestions_unique_and_capped() {
        let chosen = s(&["a", "b"]);
        let options: Vec<String> = (0..20).map(|i| format!("o{}", i)).chain(s(&["a"])).collect();
        let out = recent_suggestions(&chosen, &options);
        assert_eq!(out.len(), MAX_RECENT_SUGGESTIONS);
        assert_eq!(&out[..3], &s(&["a", "b", "o0"])[..]);
    }

    #[test]
    fn test_history_limit_clamp() {
        assert_eq!(clamp_history_limit(None), 10);
        assert_eq!(clamp_history_limit(Some(0)), 1);
        assert_eq!(clamp_history_limit(Some(500)), 50);
        assert_eq!(clamp_history_limit(Some(25)), 25);
    }

    async fn seeded_store() -> (Arc<InMemoryStore>, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let user = User::new(Uuid::new_v4());
        store.save_user(&user).await.unwrap();
        (store, user.id)
    }

    fn request(decision_type: DecisionType) -> RecommendationRequest {
        RecommendationRequest {
            decision_type,
            context: None,
            question: None,
        }
    }

    fn no_ai() -> MockSuggester {
        let mut mock = MockSuggester::new();
        mock.expect_suggest().returning(|_| Ok(None));
        mock
    }

    #[tokio::test]
    async fn test_recommendation_with_ai_suggestion() {
        let (store, user_id) = seeded_store().await;
        let mut mock = MockSuggester::new();
        mock.expect_suggest()
            .withf(|req| req.decision_type == DecisionType::Meal && req.recent_suggestions.is_empty())
            .times(1)
            .returning(|_| {
                Ok(Some(AiSuggestion {
                    suggestion: "Lemon rice".to_string(),
                    provider: "groq".to_string(),
                }))
            });

        let engine = DecisionEngine::new(store.clone(), Arc::new(mock));
        let response = engine
            .get_recommendation(user_id, request(DecisionType::Meal))
            .await
            .unwrap();

        assert_eq!(response.options.len(), 4);
        assert_eq!(response.options[0], "Lemon rice");
        assert_eq!(response.ai_suggestion.as_deref(), Some("Lemon rice"));
        assert_eq!(response.provider_used, "groq");
        assert_eq!(response.question, "What should I eat today?");
        assert_eq!(response.confidence, 0.5);

        let saved = store
            .find_decision(user_id, response.decision_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(saved.options, response.options);
    }

    #[tokio::test]
    async fn test_recommendation_without_ai_uses_fallback() {
        let (store, user_id) = seeded_store().await;
        let engine = DecisionEngine::new(store, Arc::new(no_ai()));

        let mut req = request(DecisionType::Task);
        req.question = Some("  What first?  ".to_string());
        let response = engine.get_recommendation(user_id, req).await.unwrap();

        assert_eq!(response.provider_used, "fallback");
        assert!(response.ai_suggestion.is_none());
        assert_eq!(response.question, "What first?");
        let expected: Vec<String> = fallback_options(DecisionType::Task)[..4]
            .iter()
            .map(|o| o.to_string())
            .collect();
        assert_eq!(response.options, expected);
    }

    #[tokio::test]
    async fn test_recommendation_avoids_recent_options() {
        let (store, user_id) = seeded_store().await;
        let engine = DecisionEngine::new(store, Arc::new(no_ai()));

        let first = engine
            .get_recommendation(user_id, request(DecisionType::Meal))
            .await
            .unwrap();
        let second = engine
            .get_recommendation(user_id, request(DecisionType::Meal))
            .await
            .unwrap();

        let fallbacks = fallback_options(DecisionType::Meal);
        assert_eq!(first.options, s(&fallbacks[..4]));
        assert_eq!(&second.options[..2], &s(&fallbacks[4..6])[..]);
        assert_eq!(second.options.len(), 4);
    }

    #[tokio::test]
    async fn test_recommendation_unknown_user() {
        let store = Arc::new(InMemoryStore::new());
        let engine = DecisionEngine::new(store, Arc::new(MockSuggester::new()));
        let err = engine
            .get_recommendation(Uuid::new_v4(), request(DecisionType::Meal))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(msg) if msg == "User not found"));
    }

    #[tokio::test]
    async fn test_ai_error_propagates() {
        let (store, user_id) = seeded_store().await;
        let mut mock = MockSuggester::new();
        mock.expect_suggest()
            .returning(|_| Err(AppError::ExternalApi("groq returned status 500".to_string())));
        let engine = DecisionEngine::new(store, Arc::new(mock));

        let err = engine
            .get_recommendation(user_id, request(DecisionType::Clothing))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }

    #[tokio::test]
    async fn test_feedback_updates_preferences_and_history() {
        let (store, user_id) = seeded_store().await;
        let engine = DecisionEngine::new(store.clone(), Arc::new(no_ai()));

        let rec = engine
            .get_recommendation(user_id, request(DecisionType::Meal))
            .await
            .unwrap();
        let pick = rec.options[1].clone();

        let response = engine
            .record_feedback(
                user_id,
                FeedbackRequest {
                    decision_id: rec.decision_id,
                    chosen_option: pick.clone(),
                    rating: 5,
                },
            )
            .await
            .unwrap();
        assert!(response.success);
        assert_eq!(response.updated_preferences.get(&pick), Some(&2.0));

        let history = engine.get_user_history(user_id, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].chosen_option.as_deref(), Some(pick.as_str()));
        assert_eq!(history[0].rating, Some(5));
        assert_eq!(history[0].confidence, 0.6);

        let stats = engine.get_user_stats(user_id).await.unwrap();
        assert_eq!(stats.total_decisions, 1);
        assert_eq!(stats.total_feedback, 1);
        assert_eq!(stats.average_rating, 5.0);
        assert_eq!(stats.top_preferences.meal, vec![pick]);
        assert!(stats.top_preferences.task.is_empty());
    }

    #[tokio::test]
    async fn test_feedback_validation() {
        let (store, user_id) = seeded_store().await;
        let engine = DecisionEngine::new(store, Arc::new(no_ai()));
        let rec = engine
            .get_recommendation(user_id, request(DecisionType::Clothing))
            .await
            .unwrap();

        let bad_rating = engine
            .record_feedback(
                user_id,
                FeedbackRequest {
                    decision_id: rec.decision_id,
                    chosen_option: rec.options[0].clone(),
                    rating: 6,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(bad_rating, AppError::InvalidInput(_)));

        let bad_option = engine
            .record_feedback(
                user_id,
                FeedbackRequest {
                    decision_id: rec.decision_id,
                    chosen_option: "Tuxedo".to_string(),
                    rating: 4,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(bad_option, AppError::InvalidInput(msg) if msg == "Invalid option selected"));

        let other_user = engine
            .record_feedback(
                Uuid::new_v4(),
                FeedbackRequest {
                    decision_id: rec.decision_id,
                    chosen_option: rec.options[0].clone(),
                    rating: 4,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(other_user, AppError::NotFound(msg) if msg == "Decision not found"));
    }

    #[tokio::test]
    async fn test_liked_choice_may_repeat() {
        let (store, user_id) = seeded_store().await;
        let engine = DecisionEngine::new(store, Arc::new(no_ai()));

        let rec = engine
            .get_recommendation(user_id, request(DecisionType::Task))
            .await
            .unwrap();
        let pick = rec.options[2].clone();
        engine
            .record_feedback(
                user_id,
                FeedbackRequest {
                    decision_id: rec.decision_id,
                    chosen_option: pick.clone(),
                    rating: 5,
                },
            )
            .await
            .unwrap();

        let next = engine
            .get_recommendation(user_id, request(DecisionType::Task))
            .await
            .unwrap();
        let fallbacks = fallback_options(DecisionType::Task);
        // Only the liked pick skips the recency filter; the rest come back as refill
        let expected = vec![
            pick,
            fallbacks[4].to_string(),
            fallbacks[5].to_string(),
            rec.options[0].clone(),
        ];
        assert_eq!(next.options, expected);
        assert_eq!(next.confidence, 0.6);
    }

    #[tokio::test]
    async fn test_stats_for_new_user() {
        let (store, user_id) = seeded_store().await;
        let mut mock = MockSuggester::new();
        mock.expect_suggest().never();
        let engine = DecisionEngine::new(store, Arc::new(mock));

        let stats = engine.get_user_stats(user_id).await.unwrap();
        assert_eq!(stats.total_decisions, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert!(stats.top_preferences.meal.is_empty());
        assert!(engine.get_user_history(user_id, Some(5)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats_and_history_without_user_row() {
        let engine = DecisionEngine::new(Arc::new(InMemoryStore::new()), Arc::new(no_ai()));
        let user_id = Uuid::new_v4();

        let stats = engine.get_user_stats(user_id).await.unwrap();
        assert_eq!(stats.total_decisions, 0);
        assert_eq!(stats.total_feedback, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert!(stats.top_preferences.clothing.is_empty());
        assert!(engine.get_user_history(user_id, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_feedback_on_one_decision() {
        let (store, user_id) = seeded_store().await;
        let engine = DecisionEngine::new(store, Arc::new(no_ai()));
        let rec = engine
            .get_recommendation(user_id, request(DecisionType::Meal))
            .await
            .unwrap();

        for (idx, rating) in [(0, 2), (1, 5)] {
            engine
                .record_feedback(
                    user_id,
                    FeedbackRequest {
                        decision_id: rec.decision_id,
                        chosen_option: rec.options[idx].clone(),
                        rating,
                    },
                )
                .await
                .unwrap();
        }

        let stats = engine.get_user_stats(user_id).await.unwrap();
        assert_eq!(stats.total_decisions, 1);
        assert_eq!(stats.total_feedback, 2);
        assert_eq!(stats.average_rating, 3.5);
        assert_eq!(stats.top_preferences.meal, vec![rec.options[1].clone()]);

        let history = engine.get_user_history(user_id, None).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].chosen_option.as_deref(), Some(rec.options[1].as_str()));
        assert_eq!(history[0].rating, Some(5));
        assert_eq!(history[0].confidence, 0.6);
    }

    #[tokio::test]
    async fn test_suggestion_request_carries_user_data() {
        let (store, user_id) = seeded_store().await;
        let mut user = store.find_user(user_id).await.unwrap().unwrap();
        user.preferences.update(DecisionType::Meal, "Dosa", 5);
        store.save_user(&user).await.unwrap();

        let mut mock = MockSuggester::new();
        mock.expect_suggest()
            .with(function(|req: &SuggestionRequest| req.weights.get("Dosa") == Some(&2.0)))
            .times(1)
            .returning(|_| Ok(None));
        let engine = DecisionEngine::new(store, Arc::new(mock));

        let response = engine
            .get_recommendation(user_id, request(DecisionType::Meal))
            .await
            .unwrap();
        assert_eq!(response.options[0], "Dosa");
        assert_eq!(response.confidence, 0.6);
    }
}
