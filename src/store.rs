use crate::dlog;
use crate::error::{Error, Result};
use crate::types::{Activity, Coordinates, Kind, Workout, WorkoutId, validate_measurements};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;

/// Fields the list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortField {
    Date,
    Distance,
    Duration,
    Pace,
    Cadence,
    Elevation,
}

/// The ordered collection of workouts. Order is display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutStore {
    records: Vec<Workout>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Workout] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &WorkoutId) -> Option<&Workout> {
        self.records.iter().find(|w| &w.id == id)
    }

    fn position(&self, id: &WorkoutId) -> Result<usize> {
        self.records
            .iter()
            .position(|w| &w.id == id)
            .ok_or_else(|| Error::NotFound(id.clone()))
    }

    pub fn create(
        &mut self,
        kind: Kind,
        coordinates: Coordinates,
        distance: f64,
        duration: f64,
        extra: f64,
    ) -> Result<&Workout> {
        self.create_at(kind, coordinates, distance, duration, extra, Utc::now())
    }

    pub(crate) fn create_at(
        &mut self,
        kind: Kind,
        coordinates: Coordinates,
        distance: f64,
        duration: f64,
        extra: f64,
        now: DateTime<Utc>,
    ) -> Result<&Workout> {
        let activity = Activity::new(kind, extra);
        coordinates.validate()?;
        validate_measurements(distance, duration, activity)?;

        let id = self.allocate_id(now);
        tracing::info!(id = %id, kind = %kind, distance, duration, "workout created");

        self.records.push(Workout {
            id,
            coordinates,
            distance,
            duration,
            created_at: now,
            activity,
        });
        Ok(&self.records[self.records.len() - 1])
    }

    /// Mutates the record in place. Kind, id, coordinates and creation time are kept.
    pub fn update(
        &mut self,
        id: &WorkoutId,
        distance: f64,
        duration: f64,
        extra: f64,
    ) -> Result<&Workout> {
        let idx = self.position(id)?;
        let activity = Activity::new(self.records[idx].kind(), extra);
        validate_measurements(distance, duration, activity)?;

        let w = &mut self.records[idx];
        w.distance = distance;
        w.duration = duration;
        w.activity = activity;
        tracing::info!(id = %id, distance, duration, "workout updated");

        Ok(&self.records[idx])
    }

    pub fn delete(&mut self, id: &WorkoutId) -> Result<Workout> {
        let idx = self.position(id)?;
        let removed = self.records.remove(idx);
        tracing::info!(id = %id, "workout deleted");
        Ok(removed)
    }

    /// Stable ascending sort. Records without the field go last.
    pub fn sort_by(&mut self, field: SortField) {
        self.records.sort_by(|a, b| compare(a, b, field));
        dlog!("sorted field={field:?} records={}", self.records.len());
    }

    /// JSON array of flat records, in display order.
    pub fn serialize(&self) -> Result<String> {
        let flat: Vec<PersistedWorkout> =
            self.records.iter().map(PersistedWorkout::from).collect();
        Ok(serde_json::to_string(&flat)?)
    }

    /// Missing or malformed blobs give an empty store. Invalid or duplicate
    /// records are skipped.
    pub fn deserialize(blob: Option<&str>) -> Self {
        let Some(blob) = blob else {
            dlog!("no persisted workouts");
            return Self::new();
        };

        let items = match serde_json::from_str::<Vec<JsonValue>>(blob) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(err = %e, "persisted workouts are unreadable; starting empty");
                return Self::new();
            }
        };

        let mut store = Self::new();
        for (idx, item) in items.into_iter().enumerate() {
            let record = serde_json::from_value::<PersistedWorkout>(item)
                .map_err(Error::from)
                .and_then(PersistedWorkout::into_workout);
            match record {
                Ok(w) if store.get(&w.id).is_some() => {
                    tracing::warn!(idx, id = %w.id, "skipping duplicate workout id");
                }
                Ok(w) => store.records.push(w),
                Err(e) => tracing::warn!(idx, err = %e, "skipping invalid persisted workout"),
            }
        }

        dlog!("loaded workouts count={}", store.len());
        store
    }

    fn allocate_id(&self, now: DateTime<Utc>) -> WorkoutId {
        let mut id = WorkoutId::from_millis(now.timestamp_millis());
        while self.get(&id).is_some() {
            id = id.successor();
        }
        id
    }
}

fn sort_key(w: &Workout, field: SortField) -> Option<f64> {
    match field {
        SortField::Date => None,
        SortField::Distance => Some(w.distance),
        SortField::Duration => Some(w.duration),
        SortField::Pace => w.pace(),
        SortField::Cadence => w.cadence(),
        SortField::Elevation => w.elevation_gain(),
    }
}

fn compare(a: &Workout, b: &Workout, field: SortField) -> Ordering {
    if field == SortField::Date {
        return a.created_at.cmp(&b.created_at);
    }
    match (sort_key(a, field), sort_key(b, field)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// On-disk shape of one workout. Aliases accept blobs written by the old browser app.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedWorkout {
    id: WorkoutId,
    #[serde(alias = "type")]
    kind: Kind,
    #[serde(alias = "coords")]
    coordinates: Coordinates,
    distance: f64,
    duration: f64,
    #[serde(rename = "createdAtISO", alias = "date")]
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cadence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "elevation")]
    elevation_gain: Option<f64>,
}

impl From<&Workout> for PersistedWorkout {
    fn from(w: &Workout) -> Self {
        Self {
            id: w.id.clone(),
            kind: w.kind(),
            coordinates: w.coordinates,
            distance: w.distance,
            duration: w.duration,
            created_at: w.created_at,
            cadence: w.cadence(),
            elevation_gain: w.elevation_gain(),
        }
    }
}

impl PersistedWorkout {
    fn into_workout(self) -> Result<Workout> {
        let extra = match self.kind {
            Kind::Running => self.cadence,
            Kind::Cycling => self.elevation_gain,
        }
        .ok_or_else(|| {
            Error::Validation(format!("{} record {} lacks its extra field", self.kind, self.id))
        })?;

        if self.id.as_str().is_empty() {
            return Err(Error::Validation("empty id".to_string()));
        }

        let activity = Activity::new(self.kind, extra);
        self.coordinates.validate()?;
        validate_measurements(self.distance, self.duration, activity)?;

        Ok(Workout {
            id: self.id,
            coordinates: self.coordinates,
            distance: self.distance,
            duration: self.duration,
            created_at: self.created_at,
            activity,
        })
    }
}
