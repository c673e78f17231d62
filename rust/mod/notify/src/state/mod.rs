//! Client state slices held in the flux [`StateStore`](shopdesk_flux::StateStore).
//!
//! Each slice is a plain struct stored under its `PATH` and mutated only
//! through `StateStore::update`, which serializes writers per path.

pub mod board;
pub mod connection;
pub mod dashboard;
pub mod feed;

pub use board::{OrderBoard, OrderScope, StatusSource};
pub use connection::{ConnectionPhase, ConnectionState};
pub use dashboard::DashboardState;
pub use feed::{NotificationFeed, Pagination, DEFAULT_RETENTION};
