pub mod colors;
pub mod config;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod probe;
pub mod selection;
pub mod session;
pub mod teams;

pub use colors::{TeamColor, team_color};
pub use config::AppConfig;
pub use error::GridClaimError;
pub use geometry::*;
pub use grid::{CellClick, CellFill, CellView, GridFrame};
pub use probe::ProbeHistory;
pub use selection::{SelectedPoint, SelectionStore};
pub use session::*;
pub use teams::{Team, TeamId, TeamRoster};
