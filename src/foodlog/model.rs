use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::NutritionFacts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// Where the entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    MealPlan,
    Manual,
    Photo,
}

/// Recipe reference or free-form food, each carrying its snapshot. The
/// tagged variant makes "exactly one source" structural instead of two
/// optional fields that could both be set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NutritionSource {
    Recipe {
        recipe_id: Uuid,
        nutrition: NutritionFacts,
    },
    Custom {
        description: String,
        nutrition: NutritionFacts,
    },
}

impl NutritionSource {
    pub fn nutrition(&self) -> &NutritionFacts {
        match self {
            NutritionSource::Recipe { nutrition, .. } => nutrition,
            NutritionSource::Custom { nutrition, .. } => nutrition,
        }
    }

    pub fn nutrition_mut(&mut self) -> &mut NutritionFacts {
        match self {
            NutritionSource::Recipe { nutrition, .. } => nutrition,
            NutritionSource::Custom { nutrition, .. } => nutrition,
        }
    }
}

/// One recorded food-consumption event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodLogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub meal_slot: MealSlot,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
    pub portion: f64,
    pub source: NutritionSource,
    pub note: Option<String>,
    pub provenance: Provenance,
}

/// Per-(user, date) aggregate: the entries in insertion order plus their
/// computed total. The total is recomputed on every mutation and must never
/// be read stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFoodLog {
    pub date: Date,
    pub entries: Vec<FoodLogEntry>,
    pub total: NutritionFacts,
}

impl DailyFoodLog {
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            entries: Vec::new(),
            total: NutritionFacts::ZERO,
        }
    }
}
