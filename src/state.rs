use std::sync::Arc;

use crate::config::AppConfig;
use crate::foodlog::{persist, store::FoodLogStore};
use crate::nutrition::{HttpNutritionLookup, NutritionLookup};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FoodLogStore>,
    pub config: Arc<AppConfig>,
    pub lookup: Arc<dyn NutritionLookup>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = Arc::new(FoodLogStore::new());
        if let Some(path) = &config.snapshot_path {
            persist::load(&store, path).await?;
        }

        let lookup = Arc::new(HttpNutritionLookup::new(
            &config.nutrition_api.food_api_base,
            &config.nutrition_api.food_api_key,
            &config.nutrition_api.recipe_api_base,
        )) as Arc<dyn NutritionLookup>;

        Ok(Self {
            store,
            config,
            lookup,
        })
    }

    /// In-memory state with a canned lookup, for tests.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{NutritionApiConfig, PlannedTargets};
        use crate::nutrition::NutritionFacts;
        use async_trait::async_trait;
        use uuid::Uuid;

        struct FakeLookup;

        #[async_trait]
        impl NutritionLookup for FakeLookup {
            async fn recipe_nutrition(&self, _recipe_id: Uuid) -> anyhow::Result<NutritionFacts> {
                Ok(NutritionFacts {
                    calories_kcal: 400.0,
                    protein_g: 30.0,
                    ..NutritionFacts::ZERO
                })
            }
            async fn food_nutrition(&self, _query: &str) -> anyhow::Result<NutritionFacts> {
                Ok(NutritionFacts {
                    calories_kcal: 52.0,
                    carbs_g: 13.8,
                    ..NutritionFacts::ZERO
                })
            }
        }

        let config = Arc::new(AppConfig {
            nutrition_api: NutritionApiConfig {
                food_api_base: "http://fake.local".into(),
                food_api_key: "test".into(),
                recipe_api_base: "http://fake.local".into(),
            },
            planned: PlannedTargets {
                calories_kcal: 2000.0,
                protein_g: 120.0,
            },
            snapshot_path: None,
            snapshot_flush_secs: 30,
        });

        Self {
            store: Arc::new(FoodLogStore::new()),
            config,
            lookup: Arc::new(FakeLookup) as Arc<dyn NutritionLookup>,
        }
    }
}
