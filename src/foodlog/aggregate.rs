//! Pure aggregation over a daily log: total recomputation and adherence
//! scoring against a planned baseline.

use serde::Serialize;

use crate::foodlog::model::DailyFoodLog;
use crate::nutrition::NutritionFacts;

/// Sets the daily total to the element-wise sum of entry nutrition scaled by
/// portion. Entry order does not affect the result.
pub fn recompute(day: &mut DailyFoodLog) {
    let mut total = NutritionFacts::ZERO;
    for entry in &day.entries {
        total.add_scaled(entry.source.nutrition(), entry.portion);
    }
    day.total = total;
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MacroScore {
    pub planned: f64,
    pub actual: f64,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AdherenceResult {
    pub calories: MacroScore,
    pub protein: MacroScore,
    /// Unweighted mean of the tracked macro scores, rounded to the nearest
    /// integer.
    pub overall: u8,
}

/// Zero planned is well-defined here rather than an error: full credit when
/// nothing was eaten either, zero credit otherwise.
fn macro_score(actual: f64, planned: f64) -> f64 {
    if planned == 0.0 {
        return if actual == 0.0 { 100.0 } else { 0.0 };
    }
    (100.0 - (actual - planned).abs() / planned * 100.0).max(0.0)
}

pub fn adherence(day: &DailyFoodLog, planned: &NutritionFacts) -> AdherenceResult {
    let calories = MacroScore {
        planned: planned.calories_kcal,
        actual: day.total.calories_kcal,
        score: macro_score(day.total.calories_kcal, planned.calories_kcal),
    };
    let protein = MacroScore {
        planned: planned.protein_g,
        actual: day.total.protein_g,
        score: macro_score(day.total.protein_g, planned.protein_g),
    };
    let overall = ((calories.score + protein.score) / 2.0).round() as u8;
    AdherenceResult {
        calories,
        protein,
        overall,
    }
}
