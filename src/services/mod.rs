pub mod ai;
pub mod decision_engine;
pub mod fallback;
pub mod onboarding;

pub use ai::{AiProxy, Suggester};
pub use decision_engine::DecisionEngine;
