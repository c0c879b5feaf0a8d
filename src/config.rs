use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct NutritionApiConfig {
    pub food_api_base: String,
    pub food_api_key: String,
    pub recipe_api_base: String,
}

/// Fallback daily targets used when an adherence request does not supply its
/// own baseline.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannedTargets {
    pub calories_kcal: f64,
    pub protein_g: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nutrition_api: NutritionApiConfig,
    pub planned: PlannedTargets,
    pub snapshot_path: Option<PathBuf>,
    pub snapshot_flush_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let nutrition_api = NutritionApiConfig {
            food_api_base: std::env::var("FOOD_API_BASE")
                .unwrap_or_else(|_| "https://api.nal.usda.gov/fdc/v1".into()),
            food_api_key: std::env::var("FOOD_API_KEY").unwrap_or_else(|_| "DEMO_KEY".into()),
            recipe_api_base: std::env::var("RECIPE_API_BASE")
                .unwrap_or_else(|_| "http://localhost:8081".into()),
        };
        let planned = PlannedTargets {
            calories_kcal: std::env::var("PLANNED_CALORIES_KCAL")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(2000.0),
            protein_g: std::env::var("PLANNED_PROTEIN_G")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(120.0),
        };
        let snapshot_path = std::env::var("SNAPSHOT_PATH").ok().map(PathBuf::from);
        let snapshot_flush_secs = std::env::var("SNAPSHOT_FLUSH_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        Ok(Self {
            nutrition_api,
            planned,
            snapshot_path,
            snapshot_flush_secs,
        })
    }
}
