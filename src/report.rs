use serde::Serialize;
use std::fmt::Write as _;

use crate::nutrition::{format_amount, DetectionSummary, MealBreakdown};
use crate::session::Registration;

const COLUMNS: [&str; 7] = [
    "Food Item",
    "Confidence (%)",
    "Tags",
    "Calories",
    "Protein (g)",
    "Carbohydrates (g)",
    "Fat (g)",
];

/// Everything shown to the user for one upload.
#[derive(Debug, Clone, Serialize)]
pub struct MealReport {
    pub image: String,
    /// Registered user, absent after a plain login.
    pub user: Option<Registration>,
    pub breakdown: MealBreakdown,
    pub daily_target: f64,
    pub remaining_calories: f64,
    pub suggestions: Vec<String>,
}

impl MealReport {
    fn row(summary: &DetectionSummary) -> [String; 7] {
        [
            summary.label.clone(),
            summary.confidence_display(),
            summary.tag_count.to_string(),
            format_amount(summary.calories),
            format_amount(summary.protein),
            format_amount(summary.carbs),
            format_amount(summary.fat),
        ]
    }

    fn render_table(&self, out: &mut String) {
        if self.breakdown.summaries.is_empty() {
            out.push_str("No food items detected.\n");
            return;
        }

        let rows: Vec<[String; 7]> = self.breakdown.summaries.iter().map(Self::row).collect();
        let mut widths = COLUMNS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header: Vec<String> = COLUMNS
            .iter()
            .zip(widths.iter())
            .map(|(name, w)| format!("{:<w$}", name, w = *w))
            .collect();
        let _ = writeln!(out, "{}", header.join("  ").trim_end());
        for row in &rows {
            let cells: Vec<String> = row
                .iter()
                .zip(widths.iter())
                .enumerate()
                .map(|(i, (cell, w))| {
                    if i == 0 {
                        format!("{:<w$}", cell, w = *w)
                    } else {
                        format!("{:>w$}", cell, w = *w)
                    }
                })
                .collect();
            let _ = writeln!(out, "{}", cells.join("  ").trim_end());
        }
    }

    fn render_user(user: &Registration, out: &mut String) {
        let _ = writeln!(
            out,
            "User: {} (age {}, {}, {} cm, {} kg)",
            user.name,
            user.age,
            user.gender,
            format_amount(user.height_cm),
            format_amount(user.weight_kg)
        );
        if !user.health_conditions.trim().is_empty() {
            let _ = writeln!(out, "Health Conditions: {}", user.health_conditions.trim());
        }
    }

    /// Plain-text rendering for the terminal.
    pub fn render_text(&self) -> String {
        let totals = &self.breakdown.totals;
        let mut out = String::new();

        if let Some(user) = &self.user {
            Self::render_user(user, &mut out);
        }
        let _ = writeln!(out, "=== Detected Food Items ({}) ===", self.image);
        self.render_table(&mut out);
        out.push('\n');
        let _ = writeln!(out, "Total Calories: {}", format_amount(totals.total_calories));
        let _ = writeln!(out, "Total Protein: {}g", format_amount(totals.total_protein));
        let _ = writeln!(out, "Total Carbohydrates: {}g", format_amount(totals.total_carbs));
        let _ = writeln!(out, "Total Fat: {}g", format_amount(totals.total_fat));
        let _ = writeln!(
            out,
            "Remaining Calories to Reach {}: {} calories",
            format_amount(self.daily_target),
            format_amount(self.remaining_calories)
        );
        out.push('\n');
        out.push_str("Food Suggestions to Meet Your Calorie Goal:\n");
        for suggestion in &self.suggestions {
            let _ = writeln!(out, "  - {}", suggestion);
        }
        out
    }
}
