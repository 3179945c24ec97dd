use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::{FeedbackSummary, Store};
use crate::{
    error::{AppError, AppResult},
    models::{
        AiProvider, Decision, DecisionType, Feedback, OnboardingAnswers, PreferenceTable, User,
    },
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// PostgreSQL-backed [`Store`]
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    preferred_provider: Option<String>,
    api_key: Option<String>,
    profile_photo: Option<String>,
    onboarding: Option<Json<OnboardingAnswers>>,
    onboarding_completed: bool,
    preferences: Json<PreferenceTable>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let preferred_provider = row
            .preferred_provider
            .map(|p| p.parse::<AiProvider>())
            .transpose()
            .map_err(AppError::Internal)?;

        Ok(User {
            id: row.id,
            preferred_provider,
            api_key: row.api_key.map(Secret::new),
            profile_photo: row.profile_photo,
            onboarding: row.onboarding.map(|j| j.0),
            onboarding_completed: row.onboarding_completed,
            preferences: row.preferences.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct DecisionRow {
    id: Uuid,
    user_id: Uuid,
    decision_type: String,
    context: Option<Json<Value>>,
    options: Vec<String>,
    ai_suggestion: Option<String>,
    confidence: f64,
    question: String,
    provider_used: String,
    chosen_option: Option<String>,
    rating: Option<i16>,
    created_at: DateTime<Utc>,
}

impl TryFrom<DecisionRow> for Decision {
    type Error = AppError;

    fn try_from(row: DecisionRow) -> Result<Self, Self::Error> {
        Ok(Decision {
            id: row.id,
            user_id: row.user_id,
            decision_type: row.decision_type.parse().map_err(AppError::Internal)?,
            context: row.context.map(|j| j.0),
            options: row.options,
            ai_suggestion: row.ai_suggestion,
            confidence: row.confidence,
            question: row.question,
            provider_used: row.provider_used,
            chosen_option: row.chosen_option,
            rating: row.rating,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct FeedbackRow {
    id: Uuid,
    decision_id: Uuid,
    user_id: Uuid,
    decision_type: String,
    chosen_option: String,
    rating: i16,
    created_at: DateTime<Utc>,
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = AppError;

    fn try_from(row: FeedbackRow) -> Result<Self, Self::Error> {
        Ok(Feedback {
            id: row.id,
            decision_id: row.decision_id,
            user_id: row.user_id,
            decision_type: row.decision_type.parse().map_err(AppError::Internal)?,
            chosen_option: row.chosen_option,
            rating: row.rating,
            created_at: row.created_at,
        })
    }
}

const DECISION_COLUMNS: &str = "id, user_id, decision_type, context, options, ai_suggestion, \
     confidence, question, provider_used, chosen_option, rating, created_at";

#[async_trait::async_trait]
impl Store for PostgresStore {
    async fn find_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, preferred_provider, api_key, profile_photo, onboarding,
                   onboarding_completed, preferences, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn save_user(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, preferred_provider, api_key, profile_photo, onboarding,
                onboarding_completed, preferences, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                preferred_provider = EXCLUDED.preferred_provider,
                api_key = EXCLUDED.api_key,
                profile_photo = EXCLUDED.profile_photo,
                onboarding = EXCLUDED.onboarding,
                onboarding_completed = EXCLUDED.onboarding_completed,
                preferences = EXCLUDED.preferences,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user.id)
        .bind(user.preferred_provider.map(|p| p.as_str()))
        .bind(user.api_key.as_ref().map(|k| k.expose_secret().as_str()))
        .bind(user.profile_photo.as_deref())
        .bind(user.onboarding.as_ref().map(Json))
        .bind(user.onboarding_completed)
        .bind(Json(&user.preferences))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_decision(&self, decision: &Decision) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO decisions (
                id, user_id, decision_type, context, options, ai_suggestion,
                confidence, question, provider_used, chosen_option, rating, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(decision.id)
        .bind(decision.user_id)
        .bind(decision.decision_type.as_str())
        .bind(decision.context.as_ref().map(Json))
        .bind(&decision.options)
        .bind(decision.ai_suggestion.as_deref())
        .bind(decision.confidence)
        .bind(&decision.question)
        .bind(&decision.provider_used)
        .bind(decision.chosen_option.as_deref())
        .bind(decision.rating)
        .bind(decision.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_decision(
        &self,
        user_id: Uuid,
        decision_id: Uuid,
    ) -> AppResult<Option<Decision>> {
        let query = format!(
            "SELECT {} FROM decisions WHERE id = $1 AND user_id = $2",
            DECISION_COLUMNS
        );
        let row: Option<DecisionRow> = sqlx::query_as(&query)
            .bind(decision_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Decision::try_from).transpose()
    }

    async fn recent_decisions(
        &self,
        user_id: Uuid,
        decision_type: Option<DecisionType>,
        limit: i64,
    ) -> AppResult<Vec<Decision>> {
        let query = format!(
            r#"
            SELECT {}
            FROM decisions
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR decision_type = $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
            DECISION_COLUMNS
        );
        let rows: Vec<DecisionRow> = sqlx::query_as(&query)
            .bind(user_id)
            .bind(decision_type.map(|t| t.as_str()))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Decision::try_from).collect()
    }

    async fn record_feedback(&self, feedback: &Feedback) -> AppResult<PreferenceTable> {
        let mut tx = self.pool.begin().await?;

        // Row lock serialises concurrent feedback for the same user
        let preferences: Option<Json<PreferenceTable>> =
            sqlx::query_scalar("SELECT preferences FROM users WHERE id = $1 FOR UPDATE")
                .bind(feedback.user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let mut preferences = preferences
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?
            .0;

        let result = sqlx::query(
            "UPDATE decisions SET chosen_option = $3, rating = $4 WHERE id = $1 AND user_id = $2",
        )
        .bind(feedback.decision_id)
        .bind(feedback.user_id)
        .bind(&feedback.chosen_option)
        .bind(feedback.rating)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Decision not found".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO feedback (
                id, decision_id, user_id, decision_type, chosen_option, rating, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(feedback.id)
        .bind(feedback.decision_id)
        .bind(feedback.user_id)
        .bind(feedback.decision_type.as_str())
        .bind(&feedback.chosen_option)
        .bind(feedback.rating)
        .bind(feedback.created_at)
        .execute(&mut *tx)
        .await?;

        preferences.update(feedback.decision_type, &feedback.chosen_option, feedback.rating);

        sqlx::query("UPDATE users SET preferences = $2, updated_at = NOW() WHERE id = $1")
            .bind(feedback.user_id)
            .bind(Json(&preferences))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(preferences)
    }

    async fn feedback_for_decisions(
        &self,
        user_id: Uuid,
        decision_ids: &[Uuid],
    ) -> AppResult<Vec<Feedback>> {
        if decision_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<FeedbackRow> = sqlx::query_as(
            r#"
            SELECT id, decision_id, user_id, decision_type, chosen_option, rating, created_at
            FROM feedback
            WHERE user_id = $1 AND decision_id = ANY($2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(decision_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Feedback::try_from).collect()
    }

    async fn count_decisions(&self, user_id: Uuid) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM decisions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn feedback_summary(&self, user_id: Uuid) -> AppResult<FeedbackSummary> {
        let (count, average_rating): (i64, Option<f64>) = sqlx::query_as(
            "SELECT COUNT(*), AVG(rating)::FLOAT8 FROM feedback WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(FeedbackSummary {
            count,
            average_rating,
        })
    }
}
