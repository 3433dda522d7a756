use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::{CellBounds, Point, point_in_rect};
use crate::teams::TeamId;

/// One team's claim on a grid cell, stored as the cell center at claim time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedPoint {
    pub x: f64,
    pub y: f64,
    pub team_id: TeamId,
    pub time: DateTime<Utc>,
}

impl SelectedPoint {
    pub fn new(at: Point, team_id: TeamId, time: DateTime<Utc>) -> Self {
        Self {
            x: at.x,
            y: at.y,
            team_id,
            time,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    fn is_in(&self, bounds: &CellBounds) -> bool {
        point_in_rect(self.position(), bounds)
    }
}

/// Insertion-ordered list of claims.
///
/// Nothing deduplicates on insert: a cell's displayed owner is the last point
/// added inside it. Edits clear a cell before claiming it, so one grid density
/// converges to a single point per cell, but points placed under another
/// density may straddle the current cell edges and resurface after a zoom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionStore {
    points: Vec<SelectedPoint>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in insertion order, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &SelectedPoint> {
        self.points.iter()
    }

    pub fn add(&mut self, point: SelectedPoint) {
        self.points.push(point);
    }

    /// Most recently added point inside `bounds`.
    pub fn find_last_in_rect(&self, bounds: &CellBounds) -> Option<&SelectedPoint> {
        self.points.iter().rev().find(|point| point.is_in(bounds))
    }

    /// Removes every point inside `bounds`; returns how many were dropped.
    pub fn remove_all_in_rect(&mut self, bounds: &CellBounds) -> usize {
        let before = self.points.len();
        self.points.retain(|point| !point.is_in(bounds));
        before - self.points.len()
    }

    pub fn remove_by_team(&mut self, team_id: &TeamId) -> usize {
        let before = self.points.len();
        self.points.retain(|point| &point.team_id != team_id);
        before - self.points.len()
    }

    pub fn count_for_team(&self, team_id: &TeamId) -> usize {
        self.points
            .iter()
            .filter(|point| &point.team_id == team_id)
            .count()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
