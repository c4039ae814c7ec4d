use serde::{Deserialize, Serialize};

use super::table::NutritionTable;

/// One food item found in a meal photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    /// Model confidence as a percentage (0-100).
    pub confidence: f64,
    pub tag_count: i64,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f64, tag_count: i64) -> Self {
        Self {
            label: label.into(),
            confidence,
            tag_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSummary {
    pub label: String,
    pub confidence_percent: f64,
    pub tag_count: i64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl DetectionSummary {
    /// Confidence with two decimals, e.g. `"90.00"`.
    pub fn confidence_display(&self) -> String {
        format!("{:.2}", self.confidence_percent)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
}

impl Totals {
    fn add(&mut self, summary: &DetectionSummary) {
        self.total_calories += summary.calories;
        self.total_protein += summary.protein;
        self.total_carbs += summary.carbs;
        self.total_fat += summary.fat;
    }
}

/// Per-item breakdown of one upload plus its totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealBreakdown {
    pub summaries: Vec<DetectionSummary>,
    pub totals: Totals,
}

/// Multiplies each detection's tag count into its nutrition record and sums
/// the results. Input order is preserved and every detection yields exactly
/// one summary; labels missing from `table` contribute zero.
pub fn aggregate(detections: &[Detection], table: &NutritionTable) -> MealBreakdown {
    let mut breakdown = MealBreakdown {
        summaries: Vec::with_capacity(detections.len()),
        totals: Totals::default(),
    };

    for detection in detections {
        if !table.contains(&detection.label) {
            tracing::warn!(
                label = %detection.label,
                "no nutrition data for label, counting as zero"
            );
        }
        let scaled = table.lookup(&detection.label).scaled(detection.tag_count);

        let summary = DetectionSummary {
            label: detection.label.clone(),
            confidence_percent: detection.confidence,
            tag_count: detection.tag_count,
            calories: scaled.calories,
            protein: scaled.protein,
            carbs: scaled.carbs,
            fat: scaled.fat,
        };
        breakdown.totals.add(&summary);
        breakdown.summaries.push(summary);
    }

    breakdown
}
