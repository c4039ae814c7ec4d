use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::path::Path;

use super::table::{NutritionRecord, NutritionTable};

// Expected column headers
pub const NAME_COL: &str = "Name";
pub const CALORIES_COL: &str = "Calories";
pub const PROTEIN_COL: &str = "Protein (g)";
pub const CARBS_COL: &str = "Carbohydrates (g)";
pub const FAT_COL: &str = "Fat (g)";

fn parse_amount(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

// Blank cells count as zero. Unparseable ones also count as zero, but are reported.
fn read_amount(record: &csv::StringRecord, idx: usize, column: &str, row_index: usize) -> f64 {
    let cell = record.get(idx).unwrap_or_default();
    if cell.trim().is_empty() {
        return 0.0;
    }
    parse_amount(cell).unwrap_or_else(|| {
        tracing::warn!(
            row_index,
            column,
            value = cell,
            "invalid nutrition value, counting as zero"
        );
        0.0
    })
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", name))
}

/// Reads `(label, record)` pairs from a nutrition CSV, in file order.
pub fn load_nutrition_records(csv_path: &Path) -> Result<Vec<(String, NutritionRecord)>> {
    if !csv_path.exists() {
        return Err(anyhow::anyhow!("Nutrition CSV file not found at: {:?}", csv_path));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open nutrition CSV file at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = rdr.headers()?.clone();
    let name_idx = column_index(&headers, NAME_COL)?;
    let calories_idx = column_index(&headers, CALORIES_COL)?;
    let protein_idx = column_index(&headers, PROTEIN_COL)?;
    let carbs_idx = column_index(&headers, CARBS_COL)?;
    let fat_idx = column_index(&headers, FAT_COL)?;

    let mut records = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result
            .with_context(|| format!("Failed to read record at row index {}", row_index))?;

        let name = record.get(name_idx).unwrap_or_default().trim().to_string();
        if name.is_empty() {
            tracing::debug!(row_index, "skipping nutrition row with empty name");
            continue;
        }

        let nutrition = NutritionRecord {
            calories: read_amount(&record, calories_idx, CALORIES_COL, row_index),
            protein: read_amount(&record, protein_idx, PROTEIN_COL, row_index),
            carbs: read_amount(&record, carbs_idx, CARBS_COL, row_index),
            fat: read_amount(&record, fat_idx, FAT_COL, row_index),
        };
        records.push((name, nutrition));
    }

    if records.is_empty() {
        return Err(anyhow::anyhow!("No valid nutrition data loaded from {:?}", csv_path));
    }

    Ok(records)
}

/// Built-in table with the rows of `csv_path` layered on top.
pub fn load_nutrition_table(csv_path: &Path) -> Result<NutritionTable> {
    let records = load_nutrition_records(csv_path)?;
    let mut table = NutritionTable::builtin();
    let count = records.len();
    table.extend(records);
    tracing::info!(
        path = ?csv_path,
        rows = count,
        labels = table.label_count(),
        "loaded custom nutrition table"
    );
    Ok(table)
}
