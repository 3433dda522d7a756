//! Grid render pass and the cell-click state machine.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::colors::TeamColor;
use crate::geometry::{CellBounds, CellIndex, GridLayout, Point};
use crate::selection::{SelectedPoint, SelectionStore};
use crate::teams::{TeamId, TeamRoster};

#[derive(Debug, Clone, PartialEq)]
pub struct CellFill {
    pub team_id: TeamId,
    pub color: TeamColor,
    /// `rgba(r,g,b,alpha)` ready for a canvas fill style.
    pub css: String,
    pub opacity: f64,
}

/// One cell of a rendered frame. `fill` is `None` for a transparent,
/// outline-only cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub index: CellIndex,
    pub bounds: CellBounds,
    pub fill: Option<CellFill>,
}

/// Every cell of the grid at one density, styled from the current selections.
/// Rebuilt wholesale on any change.
#[derive(Debug, Clone, PartialEq)]
pub struct GridFrame {
    layout: GridLayout,
    alpha: f64,
    cells: Vec<CellView>,
}

impl GridFrame {
    pub fn render(
        layout: GridLayout,
        selections: &SelectionStore,
        teams: &TeamRoster,
        alpha: f64,
    ) -> Self {
        let owners = cell_owners(&layout, selections);

        let mut fill_css: HashMap<&TeamId, String> = HashMap::new();
        let cells = layout
            .cells()
            .zip(owners)
            .map(|(index, owner)| {
                let fill = owner.and_then(|point| {
                    let color = teams.color_of(&point.team_id)?;
                    let css = fill_css
                        .entry(&point.team_id)
                        .or_insert_with(|| color.rgba_css(alpha))
                        .clone();
                    Some(CellFill {
                        team_id: point.team_id.clone(),
                        color,
                        css,
                        opacity: alpha,
                    })
                });
                CellView {
                    index,
                    bounds: layout.bounds(index),
                    fill,
                }
            })
            .collect();

        Self {
            layout,
            alpha,
            cells,
        }
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn rows(&self) -> u32 {
        self.layout.rows
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn cells(&self) -> &[CellView] {
        &self.cells
    }

    pub fn cell(&self, index: CellIndex) -> Option<&CellView> {
        if index.row >= self.layout.rows || index.col >= self.layout.rows {
            return None;
        }
        self.cells
            .get(index.row as usize * self.layout.rows as usize + index.col as usize)
    }

    pub fn cell_at(&self, point: Point) -> Option<&CellView> {
        self.layout.cell_at(point).and_then(|index| self.cell(index))
    }

    pub fn claimed(&self) -> impl Iterator<Item = &CellView> {
        self.cells.iter().filter(|cell| cell.fill.is_some())
    }
}

/// Owner of each cell in row-major order: the newest point inside it.
///
/// Equivalent to `find_last_in_rect` per cell, since the cells partition the
/// image, but one pass over the store instead of one per cell.
fn cell_owners<'a>(
    layout: &GridLayout,
    selections: &'a SelectionStore,
) -> Vec<Option<&'a SelectedPoint>> {
    let rows = layout.rows as usize;
    let mut owners = vec![None; layout.cell_count()];
    for point in selections.iter().rev() {
        let Some(cell) = layout.cell_at(point.position()) else {
            continue;
        };
        let slot = &mut owners[cell.row as usize * rows + cell.col as usize];
        if slot.is_none() {
            *slot = Some(point);
        }
    }
    owners
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellClick {
    /// The cell now belongs to `team_id`; `replaced` older points were dropped.
    Claimed {
        cell: CellIndex,
        team_id: TeamId,
        replaced: usize,
    },
    /// The active team's claim was toggled off.
    Deselected { cell: CellIndex, removed: usize },
}

/// Apply a select-mode click on `cell` for the active team.
///
/// Toggles the cell off when its newest point already belongs to `team_id`;
/// otherwise clears the cell and claims its center.
pub fn click_cell(
    selections: &mut SelectionStore,
    layout: &GridLayout,
    cell: CellIndex,
    team_id: &TeamId,
    now: DateTime<Utc>,
) -> CellClick {
    let bounds = layout.bounds(cell);
    let owned_by_active = selections
        .find_last_in_rect(&bounds)
        .is_some_and(|last| &last.team_id == team_id);

    let removed = selections.remove_all_in_rect(&bounds);
    if owned_by_active {
        return CellClick::Deselected { cell, removed };
    }

    selections.add(SelectedPoint::new(bounds.center(), team_id.clone(), now));
    CellClick::Claimed {
        cell,
        team_id: team_id.clone(),
        replaced: removed,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::{CellClick, GridFrame, cell_owners, click_cell};
    use crate::colors::TeamColor;
    use crate::geometry::{CellIndex, GridLayout, ImageBounds, Point};
    use crate::selection::{SelectedPoint, SelectionStore};
    use crate::teams::{TeamId, TeamRoster};

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0)
            .single()
            .expect("valid timestamp")
    }

    fn layout(rows: u32, w: u32, h: u32) -> GridLayout {
        GridLayout::new(rows, ImageBounds::new(w, h).expect("non-zero bounds"))
    }

    fn red() -> TeamId {
        TeamId::new("team-red")
    }

    fn blue() -> TeamId {
        TeamId::new("team-blue")
    }

    #[test]
    fn empty_store_renders_transparent_grid() {
        let frame = GridFrame::render(
            layout(26, 6000, 6000),
            &SelectionStore::new(),
            &TeamRoster::default(),
            0.5,
        );
        assert_eq!(frame.cells().len(), 26 * 26);
        assert_eq!(frame.claimed().count(), 0);
    }

    #[test]
    fn claimed_cell_uses_team_color_and_alpha() {
        let grid = layout(26, 6000, 6000);
        let mut store = SelectionStore::new();
        click_cell(&mut store, &grid, CellIndex::new(3, 4), &red(), now());

        let frame = GridFrame::render(grid, &store, &TeamRoster::default(), 0.35);
        let claimed: Vec<_> = frame.claimed().collect();
        assert_eq!(claimed.len(), 1);
        assert_eq!(claimed[0].index, CellIndex::new(3, 4));
        let fill = claimed[0].fill.as_ref().expect("claimed cell has fill");
        assert_eq!(fill.color, TeamColor::new(0xe5, 0x39, 0x35));
        assert_eq!(fill.css, "rgba(229,57,53,0.35)");
        assert_eq!(fill.opacity, 0.35);
    }

    #[test]
    fn unknown_team_renders_as_empty() {
        let grid = layout(26, 6000, 6000);
        let mut store = SelectionStore::new();
        store.add(SelectedPoint::new(
            Point::new(10.0, 10.0),
            TeamId::new("gone"),
            now(),
        ));
        let frame = GridFrame::render(grid, &store, &TeamRoster::default(), 0.5);
        assert_eq!(frame.claimed().count(), 0);
    }

    #[test]
    fn scenario_claim_then_toggle_off_in_same_cell() {
        let grid = layout(26, 6000, 6000);
        let mut store = SelectionStore::new();

        let first = grid.cell_at(Point::new(100.0, 100.0)).expect("inside image");
        assert_eq!(first, CellIndex::new(0, 0));
        let outcome = click_cell(&mut store, &grid, first, &red(), now());
        assert_eq!(
            outcome,
            CellClick::Claimed {
                cell: first,
                team_id: red(),
                replaced: 0,
            }
        );
        let center = store.iter().next().map(|p| p.position());
        let expected = 6000.0 / 26.0 / 2.0;
        assert_eq!(center, Some(Point::new(expected, expected)));

        let second = grid.cell_at(Point::new(200.0, 50.0)).expect("inside image");
        assert_eq!(second, first);
        let outcome = click_cell(&mut store, &grid, second, &red(), now());
        assert_eq!(
            outcome,
            CellClick::Deselected {
                cell: first,
                removed: 1
            }
        );
        assert!(store.is_empty());
    }

    #[test]
    fn other_team_click_reassigns_cell() {
        let grid = layout(52, 1040, 1040);
        let cell = CellIndex::new(7, 9);
        let mut store = SelectionStore::new();
        click_cell(&mut store, &grid, cell, &red(), now());
        let outcome = click_cell(&mut store, &grid, cell, &blue(), now());

        assert_eq!(
            outcome,
            CellClick::Claimed {
                cell,
                team_id: blue(),
                replaced: 1,
            }
        );
        assert_eq!(store.len(), 1);
        assert_eq!(store.count_for_team(&red()), 0);
        let last = store.find_last_in_rect(&grid.bounds(cell));
        assert_eq!(last.map(|p| &p.team_id), Some(&blue()));
    }

    #[test]
    fn click_collapses_stacked_points_to_one() {
        let grid = layout(26, 2600, 2600);
        let cell = CellIndex::new(1, 1);
        let mut store = SelectionStore::new();
        for (x, team) in [(101.0, red()), (150.0, blue()), (199.0, red())] {
            store.add(SelectedPoint::new(Point::new(x, 150.0), team, now()));
        }

        // Newest point is red, so a blue click claims and clears the rest.
        let outcome = click_cell(&mut store, &grid, cell, &blue(), now());
        assert!(matches!(outcome, CellClick::Claimed { replaced: 3, .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn repeated_clicks_leave_at_most_one_point_per_cell() {
        let grid = layout(26, 6000, 6000);
        let mut store = SelectionStore::new();
        let teams = [red(), blue()];
        for step in 0..200u32 {
            let cell = CellIndex::new(step * 7 % 5, step * 3 % 4);
            let team = &teams[(step % 3 % 2) as usize];
            click_cell(&mut store, &grid, cell, team, now());
        }

        for cell in grid.cells() {
            let bounds = grid.bounds(cell);
            let inside = store.iter().filter(|p| bounds.contains(p.position())).count();
            assert!(inside <= 1, "cell {cell:?} holds {inside} points");
        }
    }

    #[test]
    fn stale_points_from_finer_grid_resurface_when_coarser() {
        let fine = layout(52, 5200, 5200);
        let coarse = layout(26, 5200, 5200);
        let mut store = SelectionStore::new();
        // Two fine cells that share one coarse cell.
        click_cell(&mut store, &fine, CellIndex::new(0, 0), &red(), now());
        click_cell(&mut store, &fine, CellIndex::new(0, 1), &blue(), now());

        let frame = GridFrame::render(coarse, &store, &TeamRoster::default(), 0.5);
        let owner = frame
            .cell(CellIndex::new(0, 0))
            .and_then(|cell| cell.fill.as_ref())
            .map(|fill| fill.team_id.clone());
        assert_eq!(owner, Some(blue()));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn bucketed_owners_match_per_cell_scan() {
        let grid = layout(26, 997, 1331);
        let mut store = SelectionStore::new();
        for i in 0..300u32 {
            let x = (i * 37 % 997) as f64 + 0.25;
            let y = (i * 91 % 1331) as f64;
            let team = if i % 2 == 0 { red() } else { blue() };
            store.add(SelectedPoint::new(Point::new(x, y), team, now()));
        }

        let owners = cell_owners(&grid, &store);
        for (cell, owner) in grid.cells().zip(owners) {
            let scanned = store.find_last_in_rect(&grid.bounds(cell));
            assert_eq!(
                owner.map(|p| p as *const SelectedPoint),
                scanned.map(|p| p as *const SelectedPoint),
                "cell {cell:?}"
            );
        }
    }

    #[test]
    fn frame_lookup_by_point_and_index() {
        let frame = GridFrame::render(
            layout(4, 400, 400),
            &SelectionStore::new(),
            &TeamRoster::default(),
            0.5,
        );
        let cell = frame.cell_at(Point::new(399.0, 0.0)).map(|c| c.index);
        assert_eq!(cell, Some(CellIndex::new(0, 3)));
        assert!(frame.cell(CellIndex::new(4, 0)).is_none());
    }
}
