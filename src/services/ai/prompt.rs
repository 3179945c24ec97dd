use serde::Deserialize;
use serde_json::json;

use super::SuggestionRequest;
use crate::models::DecisionType;

/// Longest suggestion label kept from a model reply
pub const MAX_SUGGESTION_CHARS: usize = 120;

/// Chat prompt sent to every provider
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

fn subject(decision_type: DecisionType) -> &'static str {
    match decision_type {
        DecisionType::Meal => "one specific meal or dish to eat next",
        DecisionType::Clothing => "one specific outfit to wear today",
        DecisionType::Task => "one specific, actionable task to do next",
    }
}

/// Builds the prompt for one suggestion
pub fn build_prompt(request: &SuggestionRequest) -> Prompt {
    let system = format!(
        "You are a personal assistant that reduces decision fatigue. \
         Suggest {}. Respect dietary restrictions, allergies, budget and dress code \
         from the user profile. Reply with a single JSON object: \
         {{\"suggestion\": \"<short label, max 8 words>\", \"reason\": \"<one sentence>\"}}.",
        subject(request.decision_type)
    );

    let liked: Vec<&String> = request
        .weights
        .iter()
        .filter(|(_, w)| **w > 0.0)
        .map(|(label, _)| label)
        .collect();
    let disliked: Vec<&String> = request
        .weights
        .iter()
        .filter(|(_, w)| **w < 0.0)
        .map(|(label, _)| label)
        .collect();

    let details = json!({
        "decisionType": request.decision_type,
        "context": request.context,
        "profile": request.user_data,
        "liked": liked,
        "disliked": disliked,
        "avoidRecent": request.recent_suggestions,
    });

    let user = format!(
        "{}\n\nUser details:\n{}\n\nDo not repeat anything listed in avoidRecent.",
        request.decision_type.default_question(),
        serde_json::to_string_pretty(&details).unwrap_or_else(|_| details.to_string())
    );

    Prompt { system, user }
}

#[derive(Deserialize)]
struct SuggestionReply {
    suggestion: String,
}

/// Extracts the suggestion label from raw model output
///
/// Prefers the first embedded `{"suggestion": ...}` object and otherwise
/// takes the first non-empty line. Returns `None` when nothing usable remains.
pub fn parse_suggestion(raw: &str) -> Option<String> {
    let candidate = match first_reply_object(raw) {
        Some(s) => s,
        None => raw
            .lines()
            .map(clean_line)
            .find(|line| !line.is_empty() && !line.starts_with('{') && !line.starts_with("```"))?
            .to_string(),
    };

    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return None;
    }

    Some(trimmed.chars().take(MAX_SUGGESTION_CHARS).collect::<String>().trim_end().to_string())
}

/// Reads one JSON value from each `{` in turn, ignoring whatever trails it
fn first_reply_object(raw: &str) -> Option<String> {
    raw.match_indices('{').find_map(|(start, _)| {
        serde_json::Deserializer::from_str(&raw[start..])
            .into_iter::<SuggestionReply>()
            .next()
            .and_then(Result::ok)
            .map(|reply| reply.suggestion)
    })
}

fn clean_line(line: &str) -> &str {
    line.trim()
        .trim_start_matches(['-', '*', '•'])
        .trim()
        .trim_matches(['"', '\''])
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn request() -> SuggestionRequest {
        let mut weights = BTreeMap::new();
        weights.insert("Masala dosa".to_string(), 3.0);
        weights.insert("Cold pizza".to_string(), -2.0);
        SuggestionRequest {
            decision_type: DecisionType::Meal,
            context: Some(json!({ "mood": "tired" })),
            weights,
            user_data: None,
            recent_suggestions: vec!["Rajma chawal".to_string()],
            preferred_provider: None,
            user_api_key: None,
        }
    }

    #[test]
    fn test_build_prompt_includes_history_and_weights() {
        let prompt = build_prompt(&request());
        assert!(prompt.system.contains("meal or dish"));
        assert!(prompt.user.starts_with("What should I eat today?"));
        assert!(prompt.user.contains("Rajma chawal"));
        assert!(prompt.user.contains("Masala dosa"));
        assert!(prompt.user.contains("Cold pizza"));
        assert!(prompt.user.contains("tired"));
    }

    #[test]
    fn test_parse_suggestion_from_json() {
        let raw = r#"{"suggestion": "Lemon rice", "reason": "Light and quick"}"#;
        assert_eq!(parse_suggestion(raw), Some("Lemon rice".to_string()));
    }

    #[test]
    fn test_parse_suggestion_from_fenced_json() {
        let raw = "Sure!\n```json\n{\"suggestion\": \"  Navy chinos with white tee \"}\n```";
        assert_eq!(
            parse_suggestion(raw),
            Some("Navy chinos with white tee".to_string())
        );
    }

    #[test]
    fn test_parse_suggestion_takes_first_object() {
        let raw = "{\"suggestion\": \"Poha\", \"reason\": \"light\"}\nOr maybe {\"suggestion\": \"Upma\"}";
        assert_eq!(parse_suggestion(raw), Some("Poha".to_string()));
    }

    #[test]
    fn test_parse_suggestion_ignores_trailing_braces() {
        let raw = "{\"suggestion\": \"Poha\", \"reason\": \"light\"} Enjoy :}";
        assert_eq!(parse_suggestion(raw), Some("Poha".to_string()));
    }

    #[test]
    fn test_parse_suggestion_skips_unrelated_objects() {
        let raw = "Profile seen: {\"budget\": \"low\"}. Answer: {\"suggestion\": \"Khichdi\"}";
        assert_eq!(parse_suggestion(raw), Some("Khichdi".to_string()));
    }

    #[test]
    fn test_parse_suggestion_from_plain_text() {
        let raw = "\n- \"Finish the quarterly report\"\nIt is due soon.";
        assert_eq!(
            parse_suggestion(raw),
            Some("Finish the quarterly report".to_string())
        );
    }

    #[test]
    fn test_parse_suggestion_truncates() {
        let raw = "x".repeat(300);
        assert_eq!(parse_suggestion(&raw).unwrap().chars().count(), MAX_SUGGESTION_CHARS);
    }

    #[test]
    fn test_parse_suggestion_empty() {
        assert_eq!(parse_suggestion("   \n  "), None);
        assert_eq!(parse_suggestion(r#"{"suggestion": "  "}"#), None);
    }
}
