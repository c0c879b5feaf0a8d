use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro snapshot per reference portion. All fields default to zero so
/// partial payloads from the food database still deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NutritionFacts {
    pub calories_kcal: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbs_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
    pub sodium_mg: f64,
}

impl NutritionFacts {
    pub const ZERO: Self = Self {
        calories_kcal: 0.0,
        protein_g: 0.0,
        fat_g: 0.0,
        carbs_g: 0.0,
        fiber_g: 0.0,
        sugar_g: 0.0,
        sodium_mg: 0.0,
    };

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            calories_kcal: self.calories_kcal * factor,
            protein_g: self.protein_g * factor,
            fat_g: self.fat_g * factor,
            carbs_g: self.carbs_g * factor,
            fiber_g: self.fiber_g * factor,
            sugar_g: self.sugar_g * factor,
            sodium_mg: self.sodium_mg * factor,
        }
    }

    pub fn add_scaled(&mut self, other: &Self, factor: f64) {
        self.calories_kcal += other.calories_kcal * factor;
        self.protein_g += other.protein_g * factor;
        self.fat_g += other.fat_g * factor;
        self.carbs_g += other.carbs_g * factor;
        self.fiber_g += other.fiber_g * factor;
        self.sugar_g += other.sugar_g * factor;
        self.sodium_mg += other.sodium_mg * factor;
    }
}

/// Opaque resolver from a recipe reference or free-text food name to a
/// nutrition snapshot. Callers treat every error as "degrade to a zeroed
/// placeholder", so implementations only need to be honest, not available.
#[async_trait]
pub trait NutritionLookup: Send + Sync {
    async fn recipe_nutrition(&self, recipe_id: Uuid) -> anyhow::Result<NutritionFacts>;
    async fn food_nutrition(&self, query: &str) -> anyhow::Result<NutritionFacts>;
}

/// HTTP-backed lookup: recipes come from our recipe service, free-text food
/// names from a FoodData-Central-style search API.
pub struct HttpNutritionLookup {
    client: reqwest::Client,
    food_api_base: String,
    food_api_key: String,
    recipe_api_base: String,
}

impl HttpNutritionLookup {
    pub fn new(food_api_base: &str, food_api_key: &str, recipe_api_base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            food_api_base: food_api_base.trim_end_matches('/').to_string(),
            food_api_key: food_api_key.to_string(),
            recipe_api_base: recipe_api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FoodSearchResponse {
    #[serde(default)]
    foods: Vec<FoodSearchHit>,
}

#[derive(Debug, Deserialize)]
struct FoodSearchHit {
    #[serde(rename = "foodNutrients", default)]
    food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Deserialize)]
struct FoodNutrient {
    #[serde(rename = "nutrientId")]
    nutrient_id: u32,
    #[serde(default)]
    value: f64,
}

impl FoodSearchHit {
    fn into_facts(self) -> NutritionFacts {
        let mut facts = NutritionFacts::ZERO;
        for n in self.food_nutrients {
            match n.nutrient_id {
                1008 => facts.calories_kcal = n.value,
                1003 => facts.protein_g = n.value,
                1004 => facts.fat_g = n.value,
                1005 => facts.carbs_g = n.value,
                1079 => facts.fiber_g = n.value,
                2000 => facts.sugar_g = n.value,
                1093 => facts.sodium_mg = n.value,
                _ => {}
            }
        }
        facts
    }
}

#[async_trait]
impl NutritionLookup for HttpNutritionLookup {
    async fn recipe_nutrition(&self, recipe_id: Uuid) -> anyhow::Result<NutritionFacts> {
        let url = format!("{}/recipes/{}/nutrition", self.recipe_api_base, recipe_id);
        let facts = self
            .client
            .get(&url)
            .send()
            .await
            .context("recipe service request")?
            .error_for_status()
            .context("recipe service status")?
            .json::<NutritionFacts>()
            .await
            .context("recipe service payload")?;
        Ok(facts)
    }

    async fn food_nutrition(&self, query: &str) -> anyhow::Result<NutritionFacts> {
        let url = format!("{}/foods/search", self.food_api_base);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("pageSize", "1"),
                ("api_key", self.food_api_key.as_str()),
            ])
            .send()
            .await
            .context("food database request")?
            .error_for_status()
            .context("food database status")?
            .json::<FoodSearchResponse>()
            .await
            .context("food database payload")?;

        let hit = resp
            .foods
            .into_iter()
            .next()
            .with_context(|| format!("no food database match for '{query}'"))?;
        Ok(hit.into_facts())
    }
}
