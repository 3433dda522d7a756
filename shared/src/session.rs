//! Application state for one page session and the typed events that edit it.
//!
//! The client owns exactly one `Session` and routes every user action through
//! [`Session::apply`] or [`Session::click`], so no handler mutates state on
//! its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::colors::TeamColor;
use crate::config::{AppConfig, DEFAULT_ALPHA, clamp_alpha};
use crate::error::GridClaimError;
use crate::geometry::{DensityLadder, GridLayout, ImageBounds, Point};
use crate::grid::{CellClick, GridFrame, click_cell};
use crate::probe::{ProbeHistory, parse_lookup};
use crate::selection::SelectionStore;
use crate::teams::{Team, TeamRoster};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Clicks claim and release grid cells.
    #[default]
    Select,
    /// Clicks record pixel coordinates.
    Coords,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Select => Self::Coords,
            Self::Coords => Self::Select,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Coords => "COORDS",
        }
    }
}

/// Everything the control surface can ask of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    ToggleMode,
    SetMode(Mode),
    SelectTeam(usize),
    /// New color for the current team, as `#rrggbb`.
    SetTeamColor(String),
    SetAlpha(f64),
    AddTeam { name: String },
    RenameTeam { name: String },
    ClearTeam,
    ClearAll,
    ToggleGrid,
    ToggleCoordsPanel,
    Lookup(String),
}

/// What the surface must do after an event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventOutcome {
    /// Grid styling or contents changed; rebuild the frame.
    pub grid_changed: bool,
    /// Center the view here, keeping the zoom.
    pub recenter: Option<Point>,
    /// Show this to the user; state is unchanged.
    pub rejection: Option<GridClaimError>,
}

impl EventOutcome {
    fn redraw(changed: bool) -> Self {
        Self {
            grid_changed: changed,
            ..Self::default()
        }
    }

    fn rejected(err: GridClaimError) -> Self {
        Self {
            rejection: Some(err),
            ..Self::default()
        }
    }
}

/// Result of routing one click on the map surface.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceClick {
    Cell(CellClick),
    Probe(Point),
    /// Select mode with the grid hidden, or outside the image.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    image: ImageBounds,
    ladder: DensityLadder,
    selections: SelectionStore,
    teams: TeamRoster,
    mode: Mode,
    alpha: f64,
    grid_visible: bool,
    coords_panel_visible: bool,
    probes: ProbeHistory,
    lookup_marker: Option<Point>,
}

impl Session {
    pub fn new(image: ImageBounds, ladder: DensityLadder, alpha: f64) -> Self {
        Self {
            image,
            ladder,
            selections: SelectionStore::new(),
            teams: TeamRoster::default(),
            mode: Mode::default(),
            alpha: clamp_alpha(alpha).unwrap_or(DEFAULT_ALPHA),
            grid_visible: true,
            coords_panel_visible: false,
            probes: ProbeHistory::default(),
            lookup_marker: None,
        }
    }

    pub fn from_config(image: ImageBounds, config: &AppConfig) -> Self {
        Self::new(image, config.ladder.ladder(), config.default_alpha)
    }

    pub fn image(&self) -> ImageBounds {
        self.image
    }

    pub fn ladder(&self) -> &DensityLadder {
        &self.ladder
    }

    pub fn selections(&self) -> &SelectionStore {
        &self.selections
    }

    pub fn teams(&self) -> &[Team] {
        self.teams.teams()
    }

    pub fn current_team(&self) -> &Team {
        self.teams.current()
    }

    pub fn current_team_index(&self) -> usize {
        self.teams.current_index()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }

    pub fn coords_panel_visible(&self) -> bool {
        self.coords_panel_visible
    }

    pub fn probes(&self) -> &ProbeHistory {
        &self.probes
    }

    pub fn lookup_marker(&self) -> Option<Point> {
        self.lookup_marker
    }

    pub fn layout(&self, zoom: f64) -> GridLayout {
        GridLayout::for_zoom(&self.ladder, zoom, self.image)
    }

    pub fn rows_for_zoom(&self, zoom: f64) -> u32 {
        self.ladder.rows_for_zoom(zoom)
    }

    /// Full render pass for the density `rows`.
    pub fn render(&self, rows: u32) -> GridFrame {
        GridFrame::render(
            GridLayout::new(rows, self.image),
            &self.selections,
            &self.teams,
            self.alpha,
        )
    }

    /// Route a click at image pixel `at` by mode: grid edit or coordinate probe.
    pub fn click(&mut self, at: Point, zoom: f64, now: DateTime<Utc>) -> SurfaceClick {
        match self.mode {
            Mode::Coords => {
                self.probes.record(at);
                SurfaceClick::Probe(at)
            }
            Mode::Select if !self.grid_visible => SurfaceClick::Ignored,
            Mode::Select => {
                let layout = self.layout(zoom);
                let Some(cell) = layout.cell_at(at) else {
                    return SurfaceClick::Ignored;
                };
                let team_id = self.teams.current().id().clone();
                SurfaceClick::Cell(click_cell(
                    &mut self.selections,
                    &layout,
                    cell,
                    &team_id,
                    now,
                ))
            }
        }
    }

    pub fn apply(&mut self, event: ControlEvent) -> EventOutcome {
        match event {
            ControlEvent::ToggleMode => {
                self.set_mode(self.mode.toggled());
                EventOutcome::default()
            }
            ControlEvent::SetMode(mode) => {
                self.set_mode(mode);
                EventOutcome::default()
            }
            ControlEvent::SelectTeam(index) => {
                self.teams.select(index);
                EventOutcome::default()
            }
            ControlEvent::SetTeamColor(hex) => match TeamColor::from_hex(&hex) {
                Ok(color) => EventOutcome::redraw(self.teams.set_current_color(color)),
                Err(err) => EventOutcome::rejected(err),
            },
            ControlEvent::SetAlpha(alpha) => {
                let Some(alpha) = clamp_alpha(alpha) else {
                    return EventOutcome::default();
                };
                let changed = alpha != self.alpha;
                self.alpha = alpha;
                EventOutcome::redraw(changed)
            }
            // Empty or cancelled prompts are silent no-ops.
            ControlEvent::AddTeam { name } => {
                EventOutcome::redraw(self.teams.add(&name).is_ok())
            }
            ControlEvent::RenameTeam { name } => {
                let _ = self.teams.rename_current(&name);
                EventOutcome::default()
            }
            ControlEvent::ClearTeam => {
                let team_id = self.teams.current().id().clone();
                EventOutcome::redraw(self.selections.remove_by_team(&team_id) > 0)
            }
            ControlEvent::ClearAll => {
                let changed = !self.selections.is_empty();
                self.selections.clear();
                EventOutcome::redraw(changed)
            }
            ControlEvent::ToggleGrid => {
                self.grid_visible = !self.grid_visible;
                EventOutcome::redraw(true)
            }
            ControlEvent::ToggleCoordsPanel => {
                self.coords_panel_visible = !self.coords_panel_visible;
                EventOutcome::default()
            }
            ControlEvent::Lookup(text) => match parse_lookup(&text) {
                Ok(point) => {
                    self.lookup_marker = Some(point);
                    EventOutcome {
                        recenter: Some(point),
                        ..EventOutcome::default()
                    }
                }
                Err(err) => EventOutcome::rejected(err),
            },
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        if mode == Mode::Select {
            self.coords_panel_visible = false;
        }
    }
}
