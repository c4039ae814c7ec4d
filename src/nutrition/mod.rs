pub mod aggregator;
pub mod amount;
pub mod data_loader;
pub mod suggestions;
pub mod table;

pub use aggregator::{aggregate, Detection, DetectionSummary, MealBreakdown, Totals};
pub use amount::format_amount;
pub use data_loader::{load_nutrition_records, load_nutrition_table};
pub use suggestions::{
    remaining_calories, suggest_foods, SuggestionItem, DAILY_CALORIE_TARGET, DEFAULT_SUGGESTIONS,
};
pub use table::{NutritionRecord, NutritionTable};
