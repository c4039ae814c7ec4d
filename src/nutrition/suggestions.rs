use serde::Serialize;

use super::aggregator::Totals;
use super::amount::format_amount;

/// Fixed daily budget used to compute remaining calories.
pub const DAILY_CALORIE_TARGET: f64 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SuggestionItem {
    pub label: &'static str,
    pub calories: f64,
}

impl SuggestionItem {
    pub const fn new(label: &'static str, calories: f64) -> Self {
        Self { label, calories }
    }
}

/// Suggestion candidates in priority order. The order drives selection.
pub const DEFAULT_SUGGESTIONS: &[SuggestionItem] = &[
    SuggestionItem::new("Salad", 150.0),
    SuggestionItem::new("Apple", 95.0),
    SuggestionItem::new("Banana", 105.0),
    SuggestionItem::new("Boiled Eggs", 78.0),
    SuggestionItem::new("Almonds (10 pieces)", 70.0),
    SuggestionItem::new("Yogurt (1 cup)", 150.0),
    SuggestionItem::new("Chicken Breast (100g)", 165.0),
    SuggestionItem::new("Rice (1 cup)", 200.0),
    SuggestionItem::new("Oatmeal (1 bowl)", 150.0),
    SuggestionItem::new("Avocado", 160.0),
    SuggestionItem::new("Cottage Cheese (100g)", 98.0),
];

/// Daily target minus the meal's calories. Negative when the meal overshoots.
pub fn remaining_calories(daily_target: f64, totals: &Totals) -> f64 {
    daily_target - totals.total_calories
}

/// Greedy walk over `items` in their declared order.
///
/// An item is taken while the running total of taken items is still below
/// `calories_needed`; the check happens before each add, so the result is the
/// shortest prefix whose sum reaches the target (or the whole list if it never
/// does). A non-positive target yields nothing.
pub fn suggest_foods(calories_needed: f64, items: &[SuggestionItem]) -> Vec<String> {
    let mut suggestions = Vec::new();
    let mut total_calories = 0.0;

    for item in items {
        if total_calories < calories_needed {
            suggestions.push(format!("{}: {} calories", item.label, format_amount(item.calories)));
            total_calories += item.calories;
        }
    }

    suggestions
}
