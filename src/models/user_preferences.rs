use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::DecisionType;

const MIN_WEIGHT: f64 = -10.0;
const MAX_WEIGHT: f64 = 10.0;
const NEUTRAL_RATING: i16 = 3;

const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_PER_WEIGHT: f64 = 0.05;
const MIN_CONFIDENCE: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 0.99;

/// Learned option weights, one map per decision type
///
/// Serialized as `{"meal": {...}, "task": {...}, "clothing": {...}}`. Missing
/// sections deserialize as empty maps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PreferenceTable {
    #[serde(default)]
    pub meal: BTreeMap<String, f64>,
    #[serde(default)]
    pub task: BTreeMap<String, f64>,
    #[serde(default)]
    pub clothing: BTreeMap<String, f64>,
}

impl PreferenceTable {
    /// Weight map for one decision type
    pub fn weights(&self, decision_type: DecisionType) -> &BTreeMap<String, f64> {
        match decision_type {
            DecisionType::Meal => &self.meal,
            DecisionType::Task => &self.task,
            DecisionType::Clothing => &self.clothing,
        }
    }

    fn weights_mut(&mut self, decision_type: DecisionType) -> &mut BTreeMap<String, f64> {
        match decision_type {
            DecisionType::Meal => &mut self.meal,
            DecisionType::Task => &mut self.task,
            DecisionType::Clothing => &mut self.clothing,
        }
    }

    /// Folds a rating for `option` into the table
    ///
    /// Ratings above 3 reinforce, below 3 penalise, 3 only records the label.
    pub fn update(&mut self, decision_type: DecisionType, option: &str, rating: i16) {
        let weight = self
            .weights_mut(decision_type)
            .entry(option.to_string())
            .or_insert(0.0);
        let delta = f64::from(rating - NEUTRAL_RATING);
        *weight = (*weight + delta).clamp(MIN_WEIGHT, MAX_WEIGHT);
    }

    /// Positively weighted labels, best first, at most `n`
    pub fn top_options(&self, decision_type: DecisionType, n: usize) -> Vec<String> {
        let mut ranked: Vec<(&String, f64)> = self
            .weights(decision_type)
            .iter()
            .filter(|(_, w)| **w > 0.0)
            .map(|(label, w)| (label, *w))
            .collect();

        // BTreeMap iteration is label-ascending and sort_by is stable
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        ranked
            .into_iter()
            .take(n)
            .map(|(label, _)| label.clone())
            .collect()
    }

    /// Confidence in recommending `option`, in `0.1..=0.99`, or 0.5 when unknown
    pub fn confidence(&self, decision_type: DecisionType, option: Option<&str>) -> f64 {
        let weight = option.and_then(|o| self.weights(decision_type).get(o));

        match weight {
            Some(w) => {
                let raw = (BASE_CONFIDENCE + CONFIDENCE_PER_WEIGHT * w)
                    .clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);
                (raw * 100.0).round() / 100.0
            }
            None => BASE_CONFIDENCE,
        }
    }
}
