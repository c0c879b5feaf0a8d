use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use time::Date;
use tracing::instrument;
use uuid::Uuid;

use crate::error::FoodLogError;
use crate::foodlog::aggregate::{self, AdherenceResult};
use crate::foodlog::dto::{AdherenceQuery, LogEntryRequest, RangeQuery, UpdateEntryRequest};
use crate::foodlog::model::{DailyFoodLog, FoodLogEntry, Provenance};
use crate::foodlog::services::resolve_source;
use crate::foodlog::store::{EntryPatch, NewEntry};
use crate::nutrition::NutritionFacts;
use crate::state::AppState;

pub fn read_router() -> Router<AppState> {
    Router::new()
        .route("/log/:user_id/range", get(get_range))
        .route("/log/:user_id/:date", get(get_daily_log))
        .route("/log/:user_id/:date/adherence", get(get_adherence))
}

pub fn write_router() -> Router<AppState> {
    Router::new()
        .route("/log", post(log_entry))
        .route("/log/entries/:id", patch(update_entry).delete(delete_entry))
}

#[instrument(skip(state, body))]
pub async fn log_entry(
    State(state): State<AppState>,
    Json(body): Json<LogEntryRequest>,
) -> Result<(StatusCode, Json<FoodLogEntry>), FoodLogError> {
    if body.user_id.is_nil() {
        return Err(FoodLogError::InvalidInput("user_id is required".into()));
    }

    let source = resolve_source(state.lookup.as_ref(), body.source).await;
    let entry = state
        .store
        .log_entry(NewEntry {
            user_id: body.user_id,
            date: body.date,
            meal_slot: body.meal_slot,
            portion: body.portion,
            source,
            note: body.note,
            provenance: body.provenance.unwrap_or(Provenance::Manual),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn get_daily_log(
    State(state): State<AppState>,
    Path((user_id, date)): Path<(Uuid, Date)>,
) -> Json<DailyFoodLog> {
    Json(state.store.daily_log(user_id, date).await)
}

#[instrument(skip(state))]
pub async fn get_range(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(q): Query<RangeQuery>,
) -> Result<Json<Vec<DailyFoodLog>>, FoodLogError> {
    let days = state.store.range(user_id, q.start, q.end).await?;
    Ok(Json(days))
}

#[instrument(skip(state))]
pub async fn get_adherence(
    State(state): State<AppState>,
    Path((user_id, date)): Path<(Uuid, Date)>,
    Query(q): Query<AdherenceQuery>,
) -> Json<AdherenceResult> {
    let planned = NutritionFacts {
        calories_kcal: q.calories_kcal.unwrap_or(state.config.planned.calories_kcal),
        protein_g: q.protein_g.unwrap_or(state.config.planned.protein_g),
        ..NutritionFacts::ZERO
    };
    let day = state.store.daily_log(user_id, date).await;
    Json(aggregate::adherence(&day, &planned))
}

#[instrument(skip(state, body))]
pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateEntryRequest>,
) -> Result<Json<FoodLogEntry>, FoodLogError> {
    let entry = state
        .store
        .update_entry(
            id,
            EntryPatch {
                meal_slot: body.meal_slot,
                portion: body.portion,
                note: body.note,
                nutrition: body.nutrition,
            },
        )
        .await?;
    Ok(Json(entry))
}

#[instrument(skip(state))]
pub async fn delete_entry(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    state.store.delete_entry(id).await;
    StatusCode::NO_CONTENT
}
