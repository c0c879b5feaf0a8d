use std::collections::HashMap;

use time::{Date, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::FoodLogError;
use crate::foodlog::aggregate::recompute;
use crate::foodlog::model::{DailyFoodLog, FoodLogEntry, MealSlot, NutritionSource, Provenance};
use crate::nutrition::NutritionFacts;

/// Everything needed to construct an entry, minus the generated id and
/// timestamp. The nutrition source arrives already resolved.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: Uuid,
    pub date: Date,
    pub meal_slot: MealSlot,
    pub portion: f64,
    pub source: NutritionSource,
    pub note: Option<String>,
    pub provenance: Provenance,
}

/// Fields that may be merged into an existing entry.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub meal_slot: Option<MealSlot>,
    pub portion: Option<f64>,
    pub note: Option<String>,
    pub nutrition: Option<NutritionFacts>,
}

type DayKey = (Uuid, Date);

#[derive(Default)]
struct StoreInner {
    days: HashMap<DayKey, DailyFoodLog>,
    /// Entry id -> owning day, kept under the same lock as `days` so the two
    /// can never disagree.
    index: HashMap<Uuid, DayKey>,
    dirty: bool,
}

/// In-memory food log keyed by (user, date). One RwLock guards the interior;
/// the exclusive write lock is the per-key concurrency guard the shared map
/// needs under concurrent writers.
pub struct FoodLogStore {
    inner: RwLock<StoreInner>,
}

impl Default for FoodLogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FoodLogStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
        }
    }

    /// Inserts the entry into its day, appending if the id is new and
    /// replacing in place if it already exists, then recomputes the total.
    pub async fn log_entry(&self, new: NewEntry) -> Result<FoodLogEntry, FoodLogError> {
        validate_portion(new.portion)?;
        let entry = FoodLogEntry {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            date: new.date,
            meal_slot: new.meal_slot,
            logged_at: OffsetDateTime::now_utc(),
            portion: new.portion,
            source: new.source,
            note: new.note,
            provenance: new.provenance,
        };

        let mut inner = self.inner.write().await;
        inner.insert(entry.clone());
        inner.dirty = true;
        Ok(entry)
    }

    /// Returns the aggregate for (user, date), lazily creating a zeroed one.
    pub async fn daily_log(&self, user_id: Uuid, date: Date) -> DailyFoodLog {
        let key = (user_id, date);
        {
            let inner = self.inner.read().await;
            if let Some(day) = inner.days.get(&key) {
                return day.clone();
            }
        }
        let mut inner = self.inner.write().await;
        inner
            .days
            .entry(key)
            .or_insert_with(|| DailyFoodLog::empty(date))
            .clone()
    }

    /// One record per calendar day in [start, end] inclusive, in date order.
    /// Days with no activity come back zeroed without being materialized in
    /// the map.
    pub async fn range(
        &self,
        user_id: Uuid,
        start: Date,
        end: Date,
    ) -> Result<Vec<DailyFoodLog>, FoodLogError> {
        if start > end {
            return Err(FoodLogError::InvalidRange { start, end });
        }

        let inner = self.inner.read().await;
        let mut out = Vec::new();
        let mut date = start;
        loop {
            match inner.days.get(&(user_id, date)) {
                Some(day) => out.push(day.clone()),
                None => out.push(DailyFoodLog::empty(date)),
            }
            if date == end {
                break;
            }
            date = date
                .next_day()
                .ok_or_else(|| FoodLogError::InvalidInput("date out of calendar range".into()))?;
        }
        Ok(out)
    }

    /// Merges the patch into an existing entry and recomputes its day.
    pub async fn update_entry(
        &self,
        entry_id: Uuid,
        patch: EntryPatch,
    ) -> Result<FoodLogEntry, FoodLogError> {
        if let Some(portion) = patch.portion {
            validate_portion(portion)?;
        }

        let mut inner = self.inner.write().await;
        let key = *inner
            .index
            .get(&entry_id)
            .ok_or(FoodLogError::NotFound(entry_id))?;
        let day = inner
            .days
            .get_mut(&key)
            .ok_or(FoodLogError::NotFound(entry_id))?;
        let entry = day
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .ok_or(FoodLogError::NotFound(entry_id))?;

        if let Some(meal_slot) = patch.meal_slot {
            entry.meal_slot = meal_slot;
        }
        if let Some(portion) = patch.portion {
            entry.portion = portion;
        }
        if let Some(note) = patch.note {
            entry.note = Some(note);
        }
        if let Some(nutrition) = patch.nutrition {
            *entry.source.nutrition_mut() = nutrition;
        }
        let updated = entry.clone();

        recompute(day);
        inner.dirty = true;
        Ok(updated)
    }

    /// Removes the entry and recomputes its day. Unknown ids are a no-op.
    pub async fn delete_entry(&self, entry_id: Uuid) {
        let mut inner = self.inner.write().await;
        let Some(key) = inner.index.remove(&entry_id) else {
            return;
        };
        if let Some(day) = inner.days.get_mut(&key) {
            day.entries.retain(|e| e.id != entry_id);
            recompute(day);
        }
        inner.dirty = true;
    }

    /// Flat dump of every entry, for the snapshot file.
    pub async fn export_entries(&self) -> Vec<FoodLogEntry> {
        let inner = self.inner.read().await;
        let mut out: Vec<FoodLogEntry> = inner
            .days
            .values()
            .flat_map(|day| day.entries.iter().cloned())
            .collect();
        out.sort_by_key(|e| (e.user_id, e.date, e.logged_at));
        out
    }

    /// Replaces the store contents with the given entries. Totals are
    /// recomputed here rather than trusted from disk.
    pub async fn import_entries(&self, entries: Vec<FoodLogEntry>) {
        let mut inner = self.inner.write().await;
        inner.days.clear();
        inner.index.clear();
        for entry in entries {
            inner.insert(entry);
        }
        inner.dirty = false;
    }

    /// Returns whether anything changed since the last call, clearing the
    /// flag.
    pub async fn take_dirty(&self) -> bool {
        let mut inner = self.inner.write().await;
        std::mem::take(&mut inner.dirty)
    }

    pub async fn mark_dirty(&self) {
        self.inner.write().await.dirty = true;
    }
}

impl StoreInner {
    fn insert(&mut self, entry: FoodLogEntry) {
        let key = (entry.user_id, entry.date);
        if let Some(old_key) = self.index.insert(entry.id, key) {
            if old_key != key {
                if let Some(old_day) = self.days.get_mut(&old_key) {
                    old_day.entries.retain(|e| e.id != entry.id);
                    recompute(old_day);
                }
            }
        }
        let day = self
            .days
            .entry(key)
            .or_insert_with(|| DailyFoodLog::empty(entry.date));
        match day.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => day.entries.push(entry),
        }
        recompute(day);
    }
}

fn validate_portion(portion: f64) -> Result<(), FoodLogError> {
    if !portion.is_finite() || portion <= 0.0 {
        return Err(FoodLogError::InvalidInput(format!(
            "portion must be a positive number, got {portion}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn custom_source(calories: f64, protein: f64) -> NutritionSource {
        NutritionSource::Custom {
            description: "test food".into(),
            nutrition: NutritionFacts {
                calories_kcal: calories,
                protein_g: protein,
                ..NutritionFacts::ZERO
            },
        }
    }

    fn new_entry(user_id: Uuid, date: Date, calories: f64, portion: f64) -> NewEntry {
        NewEntry {
            user_id,
            date,
            meal_slot: MealSlot::Lunch,
            portion,
            source: custom_source(calories, 0.0),
            note: None,
            provenance: Provenance::Manual,
        }
    }

    #[tokio::test]
    async fn logging_two_entries_sums_scaled_calories() {
        let store = FoodLogStore::new();
        let user = Uuid::new_v4();
        let date = date!(2024 - 01 - 01);

        store.log_entry(new_entry(user, date, 100.0, 2.0)).await.unwrap();
        store.log_entry(new_entry(user, date, 50.0, 1.0)).await.unwrap();

        let day = store.daily_log(user, date).await;
        assert_eq!(day.entries.len(), 2);
        assert_eq!(day.total.calories_kcal, 250.0);
    }

    #[tokio::test]
    async fn daily_log_for_fresh_pair_is_empty_and_zeroed() {
        let store = FoodLogStore::new();
        let day = store.daily_log(Uuid::new_v4(), date!(2024 - 03 - 15)).await;
        assert!(day.entries.is_empty());
        assert_eq!(day.total, NutritionFacts::ZERO);
    }

    #[tokio::test]
    async fn users_do_not_share_days() {
        let store = FoodLogStore::new();
        let date = date!(2024 - 01 - 01);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.log_entry(new_entry(alice, date, 100.0, 1.0)).await.unwrap();

        assert_eq!(store.daily_log(alice, date).await.total.calories_kcal, 100.0);
        assert_eq!(store.daily_log(bob, date).await.total.calories_kcal, 0.0);
    }

    #[tokio::test]
    async fn non_positive_portion_is_rejected() {
        let store = FoodLogStore::new();
        let user = Uuid::new_v4();
        let date = date!(2024 - 01 - 01);

        for portion in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = store
                .log_entry(new_entry(user, date, 100.0, portion))
                .await
                .unwrap_err();
            assert!(matches!(err, FoodLogError::InvalidInput(_)));
        }
        assert!(store.daily_log(user, date).await.entries.is_empty());
    }

    #[tokio::test]
    async fn update_recomputes_total() {
        let store = FoodLogStore::new();
        let user = Uuid::new_v4();
        let date = date!(2024 - 01 - 01);
        let entry = store.log_entry(new_entry(user, date, 100.0, 1.0)).await.unwrap();

        let patch = EntryPatch {
            portion: Some(3.0),
            ..EntryPatch::default()
        };
        let updated = store.update_entry(entry.id, patch).await.unwrap();
        assert_eq!(updated.portion, 3.0);
        assert_eq!(store.daily_log(user, date).await.total.calories_kcal, 300.0);
    }

    #[tokio::test]
    async fn update_replaces_nutrition_snapshot() {
        let store = FoodLogStore::new();
        let user = Uuid::new_v4();
        let date = date!(2024 - 01 - 01);
        let entry = store.log_entry(new_entry(user, date, 100.0, 2.0)).await.unwrap();

        let patch = EntryPatch {
            nutrition: Some(NutritionFacts {
                calories_kcal: 80.0,
                ..NutritionFacts::ZERO
            }),
            ..EntryPatch::default()
        };
        store.update_entry(entry.id, patch).await.unwrap();
        assert_eq!(store.daily_log(user, date).await.total.calories_kcal, 160.0);
    }

    #[tokio::test]
    async fn update_unknown_entry_is_not_found() {
        let store = FoodLogStore::new();
        let err = store
            .update_entry(Uuid::new_v4(), EntryPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FoodLogError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_rejects_non_positive_portion_without_touching_entry() {
        let store = FoodLogStore::new();
        let user = Uuid::new_v4();
        let date = date!(2024 - 01 - 01);
        let entry = store.log_entry(new_entry(user, date, 100.0, 1.0)).await.unwrap();

        let patch = EntryPatch {
            portion: Some(-2.0),
            ..EntryPatch::default()
        };
        let err = store.update_entry(entry.id, patch).await.unwrap_err();
        assert!(matches!(err, FoodLogError::InvalidInput(_)));
        assert_eq!(store.daily_log(user, date).await.total.calories_kcal, 100.0);
    }

    #[tokio::test]
    async fn delete_removes_entry_and_recomputes() {
        let store = FoodLogStore::new();
        let user = Uuid::new_v4();
        let date = date!(2024 - 01 - 01);
        let keep = store.log_entry(new_entry(user, date, 100.0, 1.0)).await.unwrap();
        let gone = store.log_entry(new_entry(user, date, 50.0, 2.0)).await.unwrap();

        store.delete_entry(gone.id).await;

        let day = store.daily_log(user, date).await;
        assert_eq!(day.entries.len(), 1);
        assert_eq!(day.entries[0].id, keep.id);
        assert_eq!(day.total.calories_kcal, 100.0);
    }

    #[tokio::test]
    async fn delete_unknown_entry_is_a_noop() {
        let store = FoodLogStore::new();
        let user = Uuid::new_v4();
        let date = date!(2024 - 01 - 01);
        store.log_entry(new_entry(user, date, 100.0, 1.0)).await.unwrap();

        store.delete_entry(Uuid::new_v4()).await;

        assert_eq!(store.daily_log(user, date).await.total.calories_kcal, 100.0);
    }

    #[tokio::test]
    async fn range_returns_one_record_per_day_in_order() {
        let store = FoodLogStore::new();
        let user = Uuid::new_v4();
        store
            .log_entry(new_entry(user, date!(2024 - 01 - 01), 100.0, 1.0))
            .await
            .unwrap();
        store
            .log_entry(new_entry(user, date!(2024 - 01 - 03), 300.0, 1.0))
            .await
            .unwrap();

        let days = store
            .range(user, date!(2024 - 01 - 01), date!(2024 - 01 - 03))
            .await
            .unwrap();

        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, date!(2024 - 01 - 01));
        assert_eq!(days[1].date, date!(2024 - 01 - 02));
        assert_eq!(days[2].date, date!(2024 - 01 - 03));
        assert_eq!(days[0].total.calories_kcal, 100.0);
        assert_eq!(days[1].total.calories_kcal, 0.0);
        assert_eq!(days[2].total.calories_kcal, 300.0);
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let store = FoodLogStore::new();
        let err = store
            .range(Uuid::new_v4(), date!(2024 - 01 - 03), date!(2024 - 01 - 01))
            .await
            .unwrap_err();
        assert!(matches!(err, FoodLogError::InvalidRange { .. }));
    }

    #[tokio::test]
    async fn total_tracks_arbitrary_mutation_sequences() {
        let store = FoodLogStore::new();
        let user = Uuid::new_v4();
        let date = date!(2024 - 01 - 01);

        let a = store.log_entry(new_entry(user, date, 100.0, 2.0)).await.unwrap();
        let b = store.log_entry(new_entry(user, date, 50.0, 1.0)).await.unwrap();
        let _c = store.log_entry(new_entry(user, date, 30.0, 1.0)).await.unwrap();

        store.delete_entry(b.id).await;
        store
            .update_entry(
                a.id,
                EntryPatch {
                    portion: Some(1.0),
                    ..EntryPatch::default()
                },
            )
            .await
            .unwrap();

        let day = store.daily_log(user, date).await;
        let expected: f64 = day
            .entries
            .iter()
            .map(|e| e.source.nutrition().calories_kcal * e.portion)
            .sum();
        assert_eq!(day.total.calories_kcal, expected);
        assert_eq!(day.total.calories_kcal, 130.0);
    }

    #[tokio::test]
    async fn export_import_round_trips_and_recomputes() {
        let store = FoodLogStore::new();
        let user = Uuid::new_v4();
        let date = date!(2024 - 01 - 01);
        store.log_entry(new_entry(user, date, 100.0, 2.0)).await.unwrap();
        store.log_entry(new_entry(user, date, 50.0, 1.0)).await.unwrap();

        let entries = store.export_entries().await;
        assert_eq!(entries.len(), 2);

        let fresh = FoodLogStore::new();
        fresh.import_entries(entries).await;
        let day = fresh.daily_log(user, date).await;
        assert_eq!(day.entries.len(), 2);
        assert_eq!(day.total.calories_kcal, 250.0);
    }

    #[tokio::test]
    async fn mutations_mark_the_store_dirty() {
        let store = FoodLogStore::new();
        assert!(!store.take_dirty().await);

        let entry = store
            .log_entry(new_entry(Uuid::new_v4(), date!(2024 - 01 - 01), 100.0, 1.0))
            .await
            .unwrap();
        assert!(store.take_dirty().await);
        assert!(!store.take_dirty().await);

        store.delete_entry(entry.id).await;
        assert!(store.take_dirty().await);
    }
}
