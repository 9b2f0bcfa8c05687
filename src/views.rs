use crate::dlog;
use crate::types::{Coordinates, Kind, Workout, WorkoutId};
use std::fmt;

/// Zoom level the map opens at.
pub const DEFAULT_ZOOM: u8 = 13;

/// How a single render call affects the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderMode {
    /// A newly created workout.
    Append,
    /// An edited workout replacing the row with this id.
    ReplaceAt(WorkoutId),
    /// Part of a rebuild of the whole list, in store order.
    FullRebuild,
}

pub trait ListView {
    fn render(&mut self, workout: &Workout, mode: &RenderMode);
    fn remove(&mut self, id: &WorkoutId);
    fn clear(&mut self);

    fn rebuild(&mut self, workouts: &[Workout]) {
        self.clear();
        for w in workouts {
            self.render(w, &RenderMode::FullRebuild);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: WorkoutId,
    pub kind: Kind,
    pub text: String,
}

/// In-memory list. Rows mirror the store order; every call is idempotent.
#[derive(Debug, Default)]
pub struct ListModel {
    rows: Vec<Row>,
}

impl ListModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn index_of(&self, id: &WorkoutId) -> Option<usize> {
        self.rows.iter().position(|r| &r.id == id)
    }
}

impl ListView for ListModel {
    fn render(&mut self, workout: &Workout, mode: &RenderMode) {
        let row = Row {
            id: workout.id().clone(),
            kind: workout.kind(),
            text: format_row(workout),
        };

        match mode {
            RenderMode::Append | RenderMode::FullRebuild => match self.index_of(&row.id) {
                Some(i) => self.rows[i] = row,
                None => self.rows.push(row),
            },
            RenderMode::ReplaceAt(id) => match self.index_of(id) {
                Some(i) => self.rows[i] = row,
                None => tracing::warn!(id = %id, "no list row to replace"),
            },
        }
    }

    fn remove(&mut self, id: &WorkoutId) {
        self.rows.retain(|r| &r.id != id);
    }

    fn clear(&mut self) {
        self.rows.clear();
    }
}

/// One line per workout: id, description and the variant's metrics.
pub fn format_row(w: &Workout) -> String {
    let mut line = format!(
        "{}  {:<22} {} {} km  ⏱ {} min",
        w.id(),
        w.description(),
        w.kind().icon(),
        w.distance(),
        w.duration()
    );

    if let (Some(pace), Some(cadence)) = (w.pace(), w.cadence()) {
        line.push_str(&format!("  ⚡️ {pace:.1} min/km  🦶🏼 {cadence:.1} spm"));
    }
    if let (Some(speed), Some(elevation)) = (w.speed(), w.elevation_gain()) {
        line.push_str(&format!("  ⚡️ {speed:.1} km/h  ⛰ {elevation} m"));
    }
    line
}

pub fn popup_text(w: &Workout) -> String {
    format!("{} {}", w.kind().icon(), w.description())
}

/// Axis-aligned lat/lng box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn around(points: impl IntoIterator<Item = Coordinates>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let init = Self {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        Some(it.fold(init, |b, c| Self {
            south: b.south.min(c.lat),
            west: b.west.min(c.lng),
            north: b.north.max(c.lat),
            east: b.east.max(c.lng),
        }))
    }

    /// Grows each side by `ratio` of the box size, clamped to valid coordinates.
    pub fn pad(self, ratio: f64) -> Self {
        let dlat = (self.north - self.south).abs() * ratio;
        let dlng = (self.east - self.west).abs() * ratio;
        Self {
            south: (self.south - dlat).max(-90.0),
            west: (self.west - dlng).max(-180.0),
            north: (self.north + dlat).min(90.0),
            east: (self.east + dlng).min(180.0),
        }
    }

    pub fn center(&self) -> Coordinates {
        Coordinates::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] - [{}, {}]",
            self.south, self.west, self.north, self.east
        )
    }
}

pub trait MapView {
    fn load(&mut self, center: Coordinates, zoom: u8);
    fn is_loaded(&self) -> bool;
    /// Placing an id that already has a marker replaces it.
    fn place_marker(&mut self, id: &WorkoutId, coordinates: Coordinates, popup: &str);
    fn remove_marker(&mut self, id: &WorkoutId);
    /// Recenters at the current zoom.
    fn set_view(&mut self, center: Coordinates);
    /// Fits the view to every marker.
    fn fit_all(&mut self) -> Option<Bounds>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinates,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: WorkoutId,
    pub coordinates: Coordinates,
    pub popup: String,
}

/// In-memory map: a viewport and a set of markers tagged by workout id.
#[derive(Debug, Default)]
pub struct MarkerSet {
    viewport: Option<Viewport>,
    markers: Vec<Marker>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub const fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }
}

impl MapView for MarkerSet {
    fn load(&mut self, center: Coordinates, zoom: u8) {
        self.viewport = Some(Viewport { center, zoom });
        dlog!("map loaded center={center} zoom={zoom}");
    }

    fn is_loaded(&self) -> bool {
        self.viewport.is_some()
    }

    fn place_marker(&mut self, id: &WorkoutId, coordinates: Coordinates, popup: &str) {
        let marker = Marker {
            id: id.clone(),
            coordinates,
            popup: popup.to_string(),
        };
        match self.markers.iter_mut().find(|m| &m.id == id) {
            Some(existing) => *existing = marker,
            None => self.markers.push(marker),
        }
    }

    fn remove_marker(&mut self, id: &WorkoutId) {
        self.markers.retain(|m| &m.id != id);
    }

    fn set_view(&mut self, center: Coordinates) {
        if let Some(v) = self.viewport.as_mut() {
            v.center = center;
        }
    }

    fn fit_all(&mut self) -> Option<Bounds> {
        self.viewport?;
        let bounds = Bounds::around(self.markers.iter().map(|m| m.coordinates))?.pad(0.5);
        self.set_view(bounds.center());
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::WorkoutStore;

    fn two() -> WorkoutStore {
        let mut s = WorkoutStore::new();
        s.create(Kind::Running, Coordinates::new(10.0, 20.0), 5.0, 25.0, 180.0)
            .unwrap();
        s.create(Kind::Cycling, Coordinates::new(0.0, 0.0), 20.0, 60.0, 150.0)
            .unwrap();
        s
    }

    #[test]
    fn running_row_shows_pace_and_cadence() {
        let s = two();
        let row = format_row(&s.records()[0]);
        assert!(row.contains("Running on"));
        assert!(row.contains("5 km"));
        assert!(row.contains("25 min"));
        assert!(row.contains("5.0 min/km"));
        assert!(row.contains("180.0 spm"));
        assert!(!row.contains("km/h"));
    }

    #[test]
    fn cycling_row_shows_speed_and_elevation() {
        let s = two();
        let row = format_row(&s.records()[1]);
        assert!(row.contains("20.0 km/h"));
        assert!(row.contains("150 m"));
        assert!(!row.contains("spm"));
    }

    #[test]
    fn append_is_idempotent() {
        let s = two();
        let mut list = ListModel::new();
        list.render(&s.records()[0], &RenderMode::Append);
        list.render(&s.records()[0], &RenderMode::Append);
        assert_eq!(list.rows().len(), 1);
    }

    #[test]
    fn replace_at_updates_in_place_and_ignores_unknown() {
        let mut s = two();
        let mut list = ListModel::new();
        list.rebuild(s.records());
        let id = s.records()[0].id().clone();
        let w = s.update(&id, 10.0, 50.0, 170.0).unwrap().clone();

        list.render(&w, &RenderMode::ReplaceAt(id.clone()));
        assert_eq!(list.rows().len(), 2);
        assert_eq!(list.rows()[0].id, id);
        assert!(list.rows()[0].text.contains("170.0 spm"));

        list.render(&w, &RenderMode::ReplaceAt(WorkoutId::from("missing")));
        assert_eq!(list.rows().len(), 2);
    }

    #[test]
    fn rebuild_follows_store_order() {
        let mut s = two();
        let mut list = ListModel::new();
        list.rebuild(s.records());
        s.sort_by(crate::store::SortField::Distance);
        s.sort_by(crate::store::SortField::Elevation);
        list.rebuild(s.records());
        let order: Vec<&WorkoutId> = list.rows().iter().map(|r| &r.id).collect();
        let expected: Vec<&WorkoutId> = s.records().iter().map(Workout::id).collect();
        assert_eq!(order, expected);
        assert_eq!(list.rows()[0].kind, Kind::Cycling);
    }

    #[test]
    fn remove_row() {
        let s = two();
        let mut list = ListModel::new();
        list.rebuild(s.records());
        list.remove(s.records()[0].id());
        assert_eq!(list.rows().len(), 1);
        list.remove(s.records()[0].id());
        assert_eq!(list.rows().len(), 1);
    }

    #[test]
    fn bounds_are_padded_by_half() {
        let b = Bounds::around([Coordinates::new(0.0, 0.0), Coordinates::new(10.0, 20.0)])
            .unwrap()
            .pad(0.5);
        assert_eq!(
            b,
            Bounds {
                south: -5.0,
                west: -10.0,
                north: 15.0,
                east: 30.0
            }
        );
        assert_eq!(b.center(), Coordinates::new(5.0, 10.0));
        assert!(Bounds::around(Vec::new()).is_none());
    }

    #[test]
    fn padding_is_clamped() {
        let b = Bounds::around([Coordinates::new(-80.0, -170.0), Coordinates::new(80.0, 170.0)])
            .unwrap()
            .pad(0.5);
        assert_eq!(b.south, -90.0);
        assert_eq!(b.east, 180.0);
    }

    #[test]
    fn marker_set_fits_only_when_loaded() {
        let mut map = MarkerSet::new();
        let id = WorkoutId::from("1");
        map.place_marker(&id, Coordinates::new(1.0, 1.0), "a");
        assert_eq!(map.fit_all(), None);

        map.load(Coordinates::new(50.0, 50.0), DEFAULT_ZOOM);
        map.place_marker(&id, Coordinates::new(2.0, 4.0), "b");
        assert_eq!(map.markers().len(), 1);
        assert_eq!(map.markers()[0].popup, "b");

        let b = map.fit_all().unwrap();
        assert_eq!(b.center(), Coordinates::new(2.0, 4.0));
        assert_eq!(map.viewport().unwrap().center, Coordinates::new(2.0, 4.0));
        assert_eq!(map.viewport().unwrap().zoom, DEFAULT_ZOOM);

        map.remove_marker(&id);
        assert_eq!(map.fit_all(), None);
    }
}
