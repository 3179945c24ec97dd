//! Onboarding questionnaire payload.
//!
//! Closed answer sets are modelled as enums so that serde rejects unknown
//! values. Numeric ranges, string lengths and list sizes are checked by
//! [`OnboardingRequest::validate`].

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::AiProvider;
use crate::error::AppError;

pub const INVALID_PAYLOAD: &str = "Invalid onboarding payload";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    #[serde(default)]
    pub provider: Option<AiProvider>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub skip: Option<bool>,
    #[serde(default)]
    pub onboarding: Option<OnboardingAnswers>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingAnswers {
    pub profile: Profile,
    pub health: Health,
    pub work: Work,
    pub food_preferences: FoodPreferences,
    pub clothing_preferences: ClothingPreferences,
    pub task_style: TaskStyle,
    pub decision_style: DecisionStyle,
}

// ============================================================================
// Profile
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub age: i32,
    pub gender: Gender,
    pub occupation: Occupation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation_other: Option<String>,
    pub location: String,
    pub living_situation: LivingSituation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
    #[serde(rename = "Prefer not to say")]
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Occupation {
    Student,
    #[serde(rename = "Software Engineer")]
    SoftwareEngineer,
    #[serde(rename = "Business Professional")]
    BusinessProfessional,
    #[serde(rename = "Designer/Creative")]
    DesignerCreative,
    #[serde(rename = "Healthcare Worker")]
    HealthcareWorker,
    #[serde(rename = "Teacher/Professor")]
    TeacherProfessor,
    Entrepreneur,
    Homemaker,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LivingSituation {
    #[serde(rename = "Live alone")]
    Alone,
    #[serde(rename = "With roommates")]
    Roommates,
    #[serde(rename = "With family")]
    Family,
    #[serde(rename = "With partner")]
    Partner,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub dietary_type: DietaryType,
    pub allergies: Vec<Allergy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergy_other: Option<String>,
    pub health_goal: HealthGoal,
    pub activity_level: ActivityLevel,
    pub eating_pattern: EatingPattern,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DietaryType {
    #[serde(rename = "Non-vegetarian")]
    NonVegetarian,
    Vegetarian,
    Vegan,
    Pescatarian,
    Flexitarian,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Allergy {
    None,
    #[serde(rename = "Lactose intolerant")]
    LactoseIntolerant,
    #[serde(rename = "Gluten-free")]
    GlutenFree,
    #[serde(rename = "Nut allergy")]
    Nut,
    #[serde(rename = "Shellfish allergy")]
    Shellfish,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HealthGoal {
    #[serde(rename = "Weight loss")]
    WeightLoss,
    #[serde(rename = "Muscle gain/fitness")]
    MuscleGain,
    #[serde(rename = "Maintain current weight")]
    Maintain,
    #[serde(rename = "Heart health")]
    HeartHealth,
    #[serde(rename = "Diabetes management")]
    Diabetes,
    #[serde(rename = "No specific goal")]
    NoGoal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityLevel {
    #[serde(rename = "Sedentary (desk job, minimal exercise)")]
    Sedentary,
    #[serde(rename = "Lightly active (light exercise 1-3 days/week)")]
    Light,
    #[serde(rename = "Moderately active (exercise 3-5 days/week)")]
    Moderate,
    #[serde(rename = "Very active (intense exercise 6-7 days/week)")]
    Very,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EatingPattern {
    #[serde(rename = "3 regular meals")]
    ThreeMeals,
    #[serde(rename = "5-6 small meals (frequent snacker)")]
    SmallMeals,
    #[serde(rename = "2 meals + snacks")]
    TwoMealsSnacks,
    #[serde(rename = "Intermittent fasting")]
    IntermittentFasting,
    #[serde(rename = "Irregular/varies")]
    Irregular,
}

// ============================================================================
// Work
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub schedule: WorkSchedule,
    pub location: WorkLocation,
    pub commute_time: CommuteTime,
    pub lunch_break: LunchBreak,
    pub stress_level: i32,
    pub daily_schedule_type: DailyScheduleType,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WorkSchedule {
    #[serde(rename = "9 AM - 5 PM (standard)")]
    Standard,
    #[serde(rename = "10 AM - 6 PM")]
    TenToSix,
    #[serde(rename = "Flexible hours")]
    Flexible,
    #[serde(rename = "Night shift")]
    NightShift,
    #[serde(rename = "Freelance/variable")]
    Freelance,
    #[serde(rename = "Student schedule")]
    Student,
    #[serde(rename = "Unemployed/Retired")]
    NotWorking,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WorkLocation {
    #[serde(rename = "Home (WFH/online classes)")]
    Home,
    #[serde(rename = "Office/Campus")]
    Office,
    #[serde(rename = "Hybrid (3-4 days office)")]
    HybridMostlyOffice,
    #[serde(rename = "Hybrid (1-2 days office)")]
    HybridMostlyHome,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommuteTime {
    #[serde(rename = "No commute (WFH)")]
    None,
    #[serde(rename = "0-15 minutes")]
    UpTo15,
    #[serde(rename = "15-30 minutes")]
    UpTo30,
    #[serde(rename = "30-60 minutes")]
    UpTo60,
    #[serde(rename = "60+ minutes")]
    Over60,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LunchBreak {
    #[serde(rename = "30 minutes")]
    Thirty,
    #[serde(rename = "45 minutes")]
    FortyFive,
    #[serde(rename = "1 hour")]
    Hour,
    #[serde(rename = "More than 1 hour")]
    Long,
    #[serde(rename = "Flexible/no fixed time")]
    Flexible,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DailyScheduleType {
    #[serde(rename = "Meetings/classes heavy")]
    MeetingsHeavy,
    #[serde(rename = "Deep focus work")]
    DeepFocus,
    #[serde(rename = "Mix of both")]
    Mixed,
    #[serde(rename = "Mostly customer-facing")]
    CustomerFacing,
    #[serde(rename = "Physical/hands-on work")]
    Physical,
}

// ============================================================================
// Food
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodPreferences {
    pub cuisines: Vec<Cuisine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine_other: Option<String>,
    pub spice_tolerance: i32,
    pub budget: FoodBudget,
    pub meal_timings: MealTimings,
    pub cooking_habits: CookingHabits,
    pub eating_styles: Vec<EatingStyle>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Cuisine {
    #[serde(rename = "Indian (North)")]
    NorthIndian,
    #[serde(rename = "Indian (South)")]
    SouthIndian,
    Chinese,
    Italian,
    Mexican,
    Thai,
    Japanese,
    Mediterranean,
    #[serde(rename = "American/Fast food")]
    American,
    #[serde(rename = "Middle Eastern")]
    MiddleEastern,
    Korean,
    Continental,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FoodBudget {
    #[serde(rename = "₹50-100 (very budget)")]
    VeryBudget,
    #[serde(rename = "₹100-200 (budget-conscious)")]
    Budget,
    #[serde(rename = "₹200-300 (moderate)")]
    Moderate,
    #[serde(rename = "₹300-500 (comfortable)")]
    Comfortable,
    #[serde(rename = "₹500+ (flexible)")]
    Flexible,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealTimings {
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CookingHabits {
    #[serde(rename = "Never cook (always eat out/order)")]
    Never,
    #[serde(rename = "Rarely cook (1-2 times/week)")]
    Rarely,
    #[serde(rename = "Sometimes cook (3-4 times/week)")]
    Sometimes,
    #[serde(rename = "Often cook (5-6 times/week)")]
    Often,
    #[serde(rename = "Always cook at home")]
    Always,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EatingStyle {
    #[serde(rename = "Quick meals (under 15 min)")]
    Quick,
    #[serde(rename = "Sit-down dining")]
    SitDown,
    #[serde(rename = "Street food")]
    StreetFood,
    #[serde(rename = "Fine dining (occasional)")]
    FineDining,
    #[serde(rename = "Meal prep/batch cooking")]
    MealPrep,
    #[serde(rename = "Home-cooked food")]
    HomeCooked,
}

// ============================================================================
// Clothing
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClothingPreferences {
    pub fashion_styles: Vec<FashionStyle>,
    pub weather_sensitivity: WeatherSensitivity,
    pub color_preferences: Vec<ColorPreference>,
    pub comfort_priority: i32,
    pub dress_code: DressCode,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FashionStyle {
    #[serde(rename = "Casual (jeans, t-shirts)")]
    Casual,
    #[serde(rename = "Smart casual")]
    SmartCasual,
    #[serde(rename = "Formal/business")]
    Formal,
    #[serde(rename = "Sporty/athleisure")]
    Sporty,
    #[serde(rename = "Trendy/fashionable")]
    Trendy,
    Minimalist,
    #[serde(rename = "Traditional/ethnic")]
    Traditional,
    #[serde(rename = "Comfortable above all")]
    Comfortable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WeatherSensitivity {
    #[serde(rename = "Very sensitive (layer up/down frequently)")]
    Very,
    #[serde(rename = "Moderately sensitive")]
    Moderate,
    #[serde(rename = "Not very sensitive (same clothes most temps)")]
    Low,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ColorPreference {
    #[serde(rename = "Neutrals (black, white, grey, beige)")]
    Neutrals,
    Blues,
    #[serde(rename = "Earth tones (brown, green, olive)")]
    EarthTones,
    #[serde(rename = "Bold colors (red, yellow, orange)")]
    Bold,
    Pastels,
    #[serde(rename = "All-black everything")]
    AllBlack,
    #[serde(rename = "No preference")]
    NoPreference,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DressCode {
    #[serde(rename = "Very formal (suit/tie, formal attire)")]
    VeryFormal,
    #[serde(rename = "Business casual")]
    BusinessCasual,
    #[serde(rename = "Smart casual")]
    SmartCasual,
    #[serde(rename = "Casual (anything goes)")]
    Casual,
    #[serde(rename = "Uniform required")]
    Uniform,
    #[serde(rename = "Not applicable")]
    NotApplicable,
}

// ============================================================================
// Task & decision style
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskStyle {
    pub energy_peak: EnergyPeak,
    pub priority_method: PriorityMethod,
    pub work_block_duration: WorkBlockDuration,
    pub procrastination: i32,
    pub multitasking: Multitasking,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EnergyPeak {
    #[serde(rename = "Morning person (5 AM - 11 AM)")]
    Morning,
    #[serde(rename = "Midday peak (11 AM - 3 PM)")]
    Midday,
    #[serde(rename = "Afternoon (3 PM - 7 PM)")]
    Afternoon,
    #[serde(rename = "Night owl (7 PM - midnight)")]
    Night,
    #[serde(rename = "Late night (after midnight)")]
    LateNight,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PriorityMethod {
    #[serde(rename = "Urgency first (closest deadline)")]
    Urgency,
    #[serde(rename = "Importance first (highest impact)")]
    Importance,
    #[serde(rename = "Easiest first (quick wins)")]
    Easiest,
    #[serde(rename = "Hardest first (eat the frog)")]
    Hardest,
    #[serde(rename = "Mix it up based on mood")]
    Mood,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WorkBlockDuration {
    #[serde(rename = "Short bursts (15-25 min, Pomodoro style)")]
    Short,
    #[serde(rename = "Medium blocks (45-60 min)")]
    Medium,
    #[serde(rename = "Long blocks (2+ hours deep work)")]
    Long,
    #[serde(rename = "Varies by task")]
    Varies,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Multitasking {
    #[serde(rename = "Prefer multitasking")]
    Multi,
    #[serde(rename = "Prefer single-tasking (one thing at a time)")]
    Single,
    #[serde(rename = "Depends on task type")]
    Depends,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DecisionStyle {
    pub novelty: i32,
    pub budget_consciousness: BudgetConsciousness,
    pub time_availability: TimeAvailability,
    pub decision_confidence: DecisionConfidence,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BudgetConsciousness {
    #[serde(rename = "Very strict (track every rupee)")]
    VeryStrict,
    #[serde(rename = "Moderately careful")]
    Careful,
    #[serde(rename = "Flexible (don't stress about small amounts)")]
    Flexible,
    #[serde(rename = "Not concerned about budget")]
    Unconcerned,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeAvailability {
    #[serde(rename = "Always rushed")]
    Rushed,
    #[serde(rename = "Usually have some time")]
    SomeTime,
    #[serde(rename = "Generally relaxed schedule")]
    Relaxed,
    #[serde(rename = "Varies day to day")]
    Varies,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DecisionConfidence {
    #[serde(rename = "Very decisive (make decisions quickly)")]
    VeryDecisive,
    #[serde(rename = "Moderately decisive")]
    Decisive,
    #[serde(rename = "Often second-guess myself")]
    SecondGuess,
    #[serde(rename = "Very indecisive (struggle with choices)")]
    Indecisive,
}

// ============================================================================
// Validation
// ============================================================================

/// Collects field-level problems so the client sees all of them at once
#[derive(Default)]
struct Issues(Vec<Value>);

impl Issues {
    fn push(&mut self, path: &str, message: impl Into<String>) {
        self.0.push(json!({ "path": path, "message": message.into() }));
    }

    fn int_range(&mut self, path: &str, value: i32, min: i32, max: i32) {
        if value < min || value > max {
            self.push(path, format!("must be between {} and {}", min, max));
        }
    }

    fn len_range(&mut self, path: &str, len: usize, min: usize, max: usize) {
        if len < min || len > max {
            self.push(path, format!("must contain between {} and {} items", min, max));
        }
    }

    fn min_len(&mut self, path: &str, len: usize, min: usize) {
        if len < min {
            self.push(path, format!("must contain at least {} items", min));
        }
    }

    fn text(&mut self, path: &str, value: &str, min: usize, max: usize) {
        let chars = value.chars().count();
        if chars < min || chars > max {
            self.push(path, format!("length must be between {} and {}", min, max));
        }
    }

    fn optional_text(&mut self, path: &str, value: Option<&String>, max: usize) {
        if let Some(v) = value {
            self.text(path, v, 0, max);
        }
    }

    fn time(&mut self, path: &str, value: &str) {
        if !is_24_hour_time(value) {
            self.push(path, "Invalid time format");
        }
    }
}

/// Accepts `HH:MM` with hours 00-23 and minutes 00-59
pub fn is_24_hour_time(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let hours = (digits[0] - b'0') * 10 + (digits[1] - b'0');
    let minutes = (digits[2] - b'0') * 10 + (digits[3] - b'0');
    hours <= 23 && minutes <= 59
}

impl OnboardingRequest {
    /// Parses and validates a raw JSON body
    pub fn from_json(body: Value) -> Result<Self, AppError> {
        let request: OnboardingRequest =
            serde_json::from_value(body).map_err(|e| AppError::Validation {
                message: INVALID_PAYLOAD.to_string(),
                details: json!([{ "path": "", "message": e.to_string() }]),
            })?;
        request.validate()?;
        Ok(request)
    }

    /// Checks ranges and sizes that the type system does not express
    pub fn validate(&self) -> Result<(), AppError> {
        let mut issues = Issues::default();

        if let Some(key) = &self.api_key {
            let len = key.chars().count();
            if len < 3 {
                issues.push("apiKey", "API key is too short");
            } else if len > 2048 {
                issues.push("apiKey", "API key is too long");
            }
        }

        if let Some(answers) = &self.onboarding {
            answers.collect_issues(&mut issues);
        }

        if !issues.0.is_empty() {
            return Err(AppError::Validation {
                message: INVALID_PAYLOAD.to_string(),
                details: Value::Array(issues.0),
            });
        }

        if self.onboarding.is_none() && self.skip != Some(true) {
            return Err(AppError::InvalidInput(
                "Onboarding answers are required unless skip is set".to_string(),
            ));
        }

        Ok(())
    }
}

impl OnboardingAnswers {
    fn collect_issues(&self, issues: &mut Issues) {
        let p = &self.profile;
        issues.int_range("onboarding.profile.age", p.age, 3, 120);
        issues.optional_text(
            "onboarding.profile.occupationOther",
            p.occupation_other.as_ref(),
            100,
        );
        issues.text("onboarding.profile.location", &p.location, 2, 100);

        let h = &self.health;
        issues.len_range("onboarding.health.allergies", h.allergies.len(), 0, 6);
        issues.optional_text("onboarding.health.allergyOther", h.allergy_other.as_ref(), 100);

        issues.int_range("onboarding.work.stressLevel", self.work.stress_level, 1, 5);

        let f = &self.food_preferences;
        issues.len_range("onboarding.foodPreferences.cuisines", f.cuisines.len(), 1, 5);
        issues.optional_text(
            "onboarding.foodPreferences.cuisineOther",
            f.cuisine_other.as_ref(),
            100,
        );
        issues.int_range(
            "onboarding.foodPreferences.spiceTolerance",
            f.spice_tolerance,
            1,
            5,
        );
        issues.time(
            "onboarding.foodPreferences.mealTimings.breakfast",
            &f.meal_timings.breakfast,
        );
        issues.time("onboarding.foodPreferences.mealTimings.lunch", &f.meal_timings.lunch);
        issues.time("onboarding.foodPreferences.mealTimings.dinner", &f.meal_timings.dinner);
        issues.len_range(
            "onboarding.foodPreferences.eatingStyles",
            f.eating_styles.len(),
            1,
            6,
        );

        let c = &self.clothing_preferences;
        issues.len_range(
            "onboarding.clothingPreferences.fashionStyles",
            c.fashion_styles.len(),
            1,
            3,
        );
        issues.min_len(
            "onboarding.clothingPreferences.colorPreferences",
            c.color_preferences.len(),
            1,
        );
        issues.int_range(
            "onboarding.clothingPreferences.comfortPriority",
            c.comfort_priority,
            1,
            5,
        );

        issues.int_range(
            "onboarding.taskStyle.procrastination",
            self.task_style.procrastination,
            1,
            5,
        );
        issues.int_range("onboarding.decisionStyle.novelty", self.decision_style.novelty, 1, 5);
    }
}
