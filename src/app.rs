//! Application context tying the store to storage and the list/map views.

use crate::error::{Error, Result};
use crate::geo::Locator;
use crate::storage::{KeyValueStore, clear_workouts, load_workouts, save_workouts};
use crate::store::{SortField, WorkoutStore};
use crate::types::{Coordinates, Kind, Workout, WorkoutId};
use crate::views::{Bounds, DEFAULT_ZOOM, ListView, MapView, RenderMode, popup_text};

/// Record id the form carries when it creates rather than edits.
pub const NEW_RECORD_ID: &str = "0";

/// What the workout form submits.
#[derive(Debug, Clone, PartialEq)]
pub struct FormRequest {
    pub record_id: WorkoutId,
    pub kind: Kind,
    pub distance: f64,
    pub duration: f64,
    pub cadence_or_elevation: f64,
}

impl FormRequest {
    pub fn create(kind: Kind, distance: f64, duration: f64, cadence_or_elevation: f64) -> Self {
        Self {
            record_id: WorkoutId::from(NEW_RECORD_ID),
            kind,
            distance,
            duration,
            cadence_or_elevation,
        }
    }

    pub fn is_create(&self) -> bool {
        self.record_id.as_str() == NEW_RECORD_ID
    }
}

impl From<&Workout> for FormRequest {
    fn from(w: &Workout) -> Self {
        Self {
            record_id: w.id().clone(),
            kind: w.kind(),
            distance: w.distance(),
            duration: w.duration(),
            cadence_or_elevation: w.activity().extra(),
        }
    }
}

pub struct App<S, L, M> {
    store: WorkoutStore,
    storage: S,
    list: L,
    map: M,
}

impl<S: KeyValueStore, L: ListView, M: MapView> App<S, L, M> {
    pub fn new(storage: S, list: L, map: M) -> Self {
        Self {
            store: WorkoutStore::new(),
            storage,
            list,
            map,
        }
    }

    pub const fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub const fn list(&self) -> &L {
        &self.list
    }

    pub const fn map(&self) -> &M {
        &self.map
    }

    /// Loads persisted workouts into the list, then tries to open the map at
    /// the current position. A geolocation failure leaves the app running
    /// without a map and comes back as `Error::Geolocation` for display.
    pub fn start(&mut self, locator: &dyn Locator) -> Result<()> {
        self.store = load_workouts(&self.storage);
        self.list.rebuild(self.store.records());
        tracing::debug!(workouts = self.store.len(), "app started");

        let here = locator.current_position()?;
        self.map.load(here, DEFAULT_ZOOM);
        for w in self.store.records() {
            self.map.place_marker(w.id(), w.coordinates(), &popup_text(w));
        }
        Ok(())
    }

    /// Creates a workout at `click`, or edits the one named by the form.
    pub fn submit(&mut self, form: &FormRequest, click: Option<Coordinates>) -> Result<WorkoutId> {
        let w = if form.is_create() {
            let at =
                click.ok_or_else(|| Error::Validation("no map location selected".to_string()))?;
            let w = self
                .store
                .create(
                    form.kind,
                    at,
                    form.distance,
                    form.duration,
                    form.cadence_or_elevation,
                )?
                .clone();
            self.list.render(&w, &RenderMode::Append);
            w
        } else {
            let id = &form.record_id;
            let existing = self
                .store
                .get(id)
                .ok_or_else(|| Error::NotFound(id.clone()))?;
            if existing.kind() != form.kind {
                return Err(Error::Validation(format!(
                    "workout {id} is {}, not {}",
                    existing.kind(),
                    form.kind
                )));
            }
            let w = self
                .store
                .update(id, form.distance, form.duration, form.cadence_or_elevation)?
                .clone();
            self.list.render(&w, &RenderMode::ReplaceAt(id.clone()));
            w
        };

        if self.map.is_loaded() {
            self.map.place_marker(w.id(), w.coordinates(), &popup_text(&w));
        }
        self.save()?;
        Ok(w.id().clone())
    }

    /// The form prefilled for editing `id`.
    pub fn edit_form(&self, id: &WorkoutId) -> Result<FormRequest> {
        self.store
            .get(id)
            .map(FormRequest::from)
            .ok_or_else(|| Error::NotFound(id.clone()))
    }

    /// Deletes without asking; confirmation belongs to the caller.
    pub fn delete(&mut self, id: &WorkoutId) -> Result<Workout> {
        let removed = self.store.delete(id)?;
        self.list.remove(id);
        self.map.remove_marker(id);
        self.save()?;
        Ok(removed)
    }

    /// Reorders the list for this session. Nothing is saved.
    pub fn sort(&mut self, field: SortField) {
        self.store.sort_by(field);
        self.list.rebuild(self.store.records());
    }

    /// Centers the map on a workout.
    pub fn focus(&mut self, id: &WorkoutId) -> Result<Coordinates> {
        let at = self
            .store
            .get(id)
            .map(Workout::coordinates)
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        self.map.set_view(at);
        Ok(at)
    }

    pub fn show_all(&mut self) -> Option<Bounds> {
        self.map.fit_all()
    }

    /// Drops all persisted workouts and empties the views.
    pub fn reset(&mut self) -> Result<()> {
        clear_workouts(&mut self.storage)?;
        for w in self.store.records() {
            self.map.remove_marker(w.id());
        }
        self.store = WorkoutStore::new();
        self.list.clear();
        tracing::info!("all workouts removed");
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        save_workouts(&mut self.storage, &self.store)
    }
}
