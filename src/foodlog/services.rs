use tracing::warn;

use crate::foodlog::dto::LogEntrySource;
use crate::foodlog::model::NutritionSource;
use crate::nutrition::{NutritionFacts, NutritionLookup};

/// Turns a submitted source into a resolved snapshot. Lookup failures never
/// fail the log request; the entry degrades to a zeroed placeholder and the
/// client can patch real values in later.
pub async fn resolve_source(
    lookup: &dyn NutritionLookup,
    source: LogEntrySource,
) -> NutritionSource {
    match source {
        LogEntrySource::Recipe { recipe_id } => {
            let nutrition = match lookup.recipe_nutrition(recipe_id).await {
                Ok(facts) => facts,
                Err(e) => {
                    warn!(error = %e, %recipe_id, "recipe lookup failed, using placeholder");
                    NutritionFacts::ZERO
                }
            };
            NutritionSource::Recipe {
                recipe_id,
                nutrition,
            }
        }
        LogEntrySource::Custom {
            description,
            nutrition: Some(nutrition),
        } => NutritionSource::Custom {
            description,
            nutrition,
        },
        LogEntrySource::Custom {
            description,
            nutrition: None,
        } => {
            let nutrition = match lookup.food_nutrition(&description).await {
                Ok(facts) => facts,
                Err(e) => {
                    warn!(error = %e, %description, "food lookup failed, using placeholder");
                    NutritionFacts::ZERO
                }
            };
            NutritionSource::Custom {
                description,
                nutrition,
            }
        }
    }
}
