use crate::models::DecisionType;

const MEAL_FALLBACKS: &[&str] = &[
    "Vegetable khichdi with curd",
    "Paneer tikka wrap",
    "Masala oats with fruit",
    "Grilled chicken salad",
    "Idli sambar",
    "Rajma chawal",
];

const CLOTHING_FALLBACKS: &[&str] = &[
    "Jeans with a plain t-shirt",
    "Chinos with a casual shirt",
    "Kurta with comfortable trousers",
    "Athleisure joggers and hoodie",
    "Smart polo with trousers",
    "Linen shirt with shorts",
];

const TASK_FALLBACKS: &[&str] = &[
    "Clear your top priority task first",
    "Take a 20-minute walk",
    "Spend 25 minutes on deep work",
    "Tidy your workspace",
    "Reply to pending messages",
    "Plan tomorrow's schedule",
];

/// Static candidates used when AI and learned options run short
///
/// Each list holds at least four distinct labels so a recommendation can
/// always be filled.
pub fn fallback_options(decision_type: DecisionType) -> &'static [&'static str] {
    match decision_type {
        DecisionType::Meal => MEAL_FALLBACKS,
        DecisionType::Clothing => CLOTHING_FALLBACKS,
        DecisionType::Task => TASK_FALLBACKS,
    }
}
