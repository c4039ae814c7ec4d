use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-tag nutrition values for a single food label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl NutritionRecord {
    pub const ZERO: NutritionRecord = NutritionRecord {
        calories: 0.0,
        protein: 0.0,
        carbs: 0.0,
        fat: 0.0,
    };

    pub const fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fat,
        }
    }

    /// Every field multiplied by `count`.
    pub fn scaled(&self, count: i64) -> Self {
        let factor = count as f64;
        Self {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
        }
    }
}

// Labels match the class names emitted by the calorie-detector-2 model.
const BUILTIN_RECORDS: &[(&str, NutritionRecord)] = &[
    ("Bhatura", NutritionRecord::new(321.0, 7.0, 49.0, 11.0)),
    ("BhindiMasala", NutritionRecord::new(314.0, 5.0, 19.0, 25.0)),
    ("Biryani", NutritionRecord::new(490.0, 16.0, 72.0, 12.0)),
    ("Chole", NutritionRecord::new(323.0, 10.0, 44.0, 12.0)),
    ("ShahiPaneer", NutritionRecord::new(967.0, 25.0, 40.0, 80.0)),
    ("chicken", NutritionRecord::new(278.0, 25.0, 0.0, 20.0)),
    ("dal", NutritionRecord::new(593.0, 25.0, 50.0, 18.0)),
    ("dhokla", NutritionRecord::new(359.0, 10.0, 50.0, 12.0)),
    ("gulab_jamun", NutritionRecord::new(150.0, 5.0, 80.0, 20.0)),
    ("idli", NutritionRecord::new(81.0, 2.0, 15.0, 1.0)),
    ("jalebi", NutritionRecord::new(542.0, 2.0, 90.0, 20.0)),
    ("modak", NutritionRecord::new(280.0, 4.0, 50.0, 8.0)),
    ("palak_paneer", NutritionRecord::new(327.0, 12.0, 18.0, 22.0)),
    ("poha", NutritionRecord::new(721.0, 12.0, 88.0, 30.0)),
    ("rice", NutritionRecord::new(270.0, 4.0, 60.0, 1.0)),
    ("roti", NutritionRecord::new(327.0, 10.0, 58.0, 6.0)),
    ("samosa", NutritionRecord::new(350.0, 5.0, 40.0, 20.0)),
];

/// Read-only lookup from food label to [`NutritionRecord`].
///
/// Built once at start-up and handed to the aggregator by reference.
/// Lookups are exact and case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct NutritionTable {
    records: HashMap<String, NutritionRecord>,
}

impl NutritionTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The table shipped with the detector model.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        table.extend(
            BUILTIN_RECORDS
                .iter()
                .map(|(label, record)| (label.to_string(), *record)),
        );
        table
    }

    /// Adds records, replacing any with the same label.
    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, NutritionRecord)>,
    {
        self.records.extend(entries);
    }

    /// Never fails: unknown labels resolve to [`NutritionRecord::ZERO`].
    pub fn lookup(&self, label: &str) -> NutritionRecord {
        self.records.get(label).copied().unwrap_or(NutritionRecord::ZERO)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.records.contains_key(label)
    }

    pub fn label_count(&self) -> usize {
        self.records.len()
    }
}
