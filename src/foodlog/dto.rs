use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use crate::foodlog::model::{MealSlot, Provenance};
use crate::nutrition::NutritionFacts;

/// Nutrition source as the client submits it: a recipe reference the server
/// resolves, or a custom food with inline values (or a name to look up).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEntrySource {
    Recipe {
        recipe_id: Uuid,
    },
    Custom {
        description: String,
        #[serde(default)]
        nutrition: Option<NutritionFacts>,
    },
}

#[derive(Debug, Deserialize)]
pub struct LogEntryRequest {
    pub user_id: Uuid,
    pub date: Date,
    pub meal_slot: MealSlot,
    #[serde(default = "default_portion")]
    pub portion: f64,
    pub source: LogEntrySource,
    pub note: Option<String>,
    pub provenance: Option<Provenance>,
}

fn default_portion() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub meal_slot: Option<MealSlot>,
    pub portion: Option<f64>,
    pub note: Option<String>,
    pub nutrition: Option<NutritionFacts>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Date,
    pub end: Date,
}

/// Optional per-request targets; config defaults fill the gaps.
#[derive(Debug, Deserialize)]
pub struct AdherenceQuery {
    pub calories_kcal: Option<f64>,
    pub protein_g: Option<f64>,
}
