use chrono::{DateTime, Utc};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeMap, fmt::Display, str::FromStr};
use uuid::Uuid;

pub mod onboarding;
pub mod user_preferences;

pub use onboarding::{OnboardingAnswers, OnboardingRequest};
pub use user_preferences::PreferenceTable;

/// Which recurring question a decision answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionType {
    Meal,
    Task,
    Clothing,
}

impl DecisionType {
    pub const ALL: [DecisionType; 3] = [DecisionType::Meal, DecisionType::Task, DecisionType::Clothing];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionType::Meal => "meal",
            DecisionType::Task => "task",
            DecisionType::Clothing => "clothing",
        }
    }

    /// Question used when the caller does not supply one
    pub fn default_question(&self) -> &'static str {
        match self {
            DecisionType::Meal => "What should I eat today?",
            DecisionType::Clothing => "What should I wear today?",
            DecisionType::Task => "What should I do today?",
        }
    }
}

impl Display for DecisionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DecisionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meal" => Ok(DecisionType::Meal),
            "task" => Ok(DecisionType::Task),
            "clothing" => Ok(DecisionType::Clothing),
            other => Err(format!("unknown decision type: {}", other)),
        }
    }
}

/// Upstream AI backends a user can pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenRouter,
    Groq,
    Anthropic,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::OpenRouter => "openrouter",
            AiProvider::Groq => "groq",
            AiProvider::Anthropic => "anthropic",
        }
    }
}

impl Display for AiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openrouter" => Ok(AiProvider::OpenRouter),
            "groq" => Ok(AiProvider::Groq),
            "anthropic" => Ok(AiProvider::Anthropic),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Account-level profile and learned preferences
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub preferred_provider: Option<AiProvider>,
    pub api_key: Option<Secret<String>>,
    pub profile_photo: Option<String>,
    pub onboarding: Option<OnboardingAnswers>,
    pub onboarding_completed: bool,
    pub preferences: PreferenceTable,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a user with no onboarding answers and an empty preference table
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            preferred_provider: None,
            api_key: None,
            profile_photo: None,
            onboarding: None,
            onboarding_completed: false,
            preferences: PreferenceTable::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single recommendation instance
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub id: Uuid,
    pub user_id: Uuid,
    pub decision_type: DecisionType,
    pub context: Option<Value>,
    pub options: Vec<String>,
    pub ai_suggestion: Option<String>,
    pub confidence: f64,
    pub question: String,
    pub provider_used: String,
    pub chosen_option: Option<String>,
    pub rating: Option<i16>,
    pub created_at: DateTime<Utc>,
}

/// Append-only record of a user's reaction to a decision
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub id: Uuid,
    pub decision_id: Uuid,
    pub user_id: Uuid,
    pub decision_type: DecisionType,
    pub chosen_option: String,
    pub rating: i16,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// API request/response types
// ============================================================================

/// Success envelope shared by every JSON endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(rename = "type")]
    pub decision_type: DecisionType,
    #[serde(default)]
    pub context: Option<Value>,
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub decision_id: Uuid,
    pub options: Vec<String>,
    pub ai_suggestion: Option<String>,
    pub confidence: f64,
    #[serde(rename = "type")]
    pub decision_type: DecisionType,
    pub question: String,
    pub provider_used: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub decision_id: Uuid,
    pub chosen_option: String,
    pub rating: i16,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub success: bool,
    pub updated_preferences: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopPreferences {
    pub meal: Vec<String>,
    pub task: Vec<String>,
    pub clothing: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_decisions: i64,
    pub total_feedback: i64,
    pub average_rating: f64,
    pub top_preferences: TopPreferences,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub decision_id: Uuid,
    #[serde(rename = "type")]
    pub decision_type: DecisionType,
    pub question: String,
    pub ai_suggestion: Option<String>,
    pub options: Vec<String>,
    pub confidence: f64,
    pub provider_used: String,
    pub chosen_option: Option<String>,
    pub rating: Option<i16>,
    pub created_at: DateTime<Utc>,
}

/// User profile as returned to the client. Never carries the API key itself.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    pub id: Uuid,
    pub onboarding_completed: bool,
    pub preferred_provider: Option<AiProvider>,
    pub has_api_key: bool,
    pub profile_photo: Option<String>,
    pub onboarding: Option<OnboardingAnswers>,
    pub preferences: PreferenceTable,
}

impl From<&User> for UserProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            onboarding_completed: user.onboarding_completed,
            preferred_provider: user.preferred_provider,
            has_api_key: user.api_key.is_some(),
            profile_photo: user.profile_photo.clone(),
            onboarding: user.onboarding.clone(),
            preferences: user.preferences.clone(),
        }
    }
}
