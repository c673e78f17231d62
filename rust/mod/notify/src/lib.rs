//! Client-side notification and order reconciliation.
//!
//! Keeps a notification feed and a role-scoped order board consistent
//! across three sources: paginated REST history, a live event channel and
//! the user's own optimistic edits.
//!
//! # Architecture
//!
//! ```text
//!   RestClient ──► NotificationFetcher ──┐
//!                                        ├──► StateStore ◄── LiveBridge ◄── Channel
//!   OrderApi ──► OrderStatusController ──┘    (feed, board,
//!                                              connection, dashboard)
//! ```
//!
//! [`Session`] wires everything for one signed-in user. Presentation code
//! talks to [`NotificationCenter`] and [`OrderStatusController`] and reads
//! state from the store.

pub mod api;
pub mod bridge;
pub mod controller;
pub mod error;
pub mod facade;
pub mod fetcher;
pub mod model;
pub mod session;
pub mod state;
pub mod toast;

pub use api::{HttpApi, NotificationApi, OrderApi, StatusAck};
pub use bridge::{Channel, LiveBridge, LocalChannel};
pub use controller::OrderStatusController;
pub use error::NotifyError;
pub use facade::{Notice, NotificationCenter, ReadSync};
pub use fetcher::{FetchedPage, NotificationFetcher};
pub use session::{Session, SessionDeps, SessionProfile};
pub use toast::{MetricsFn, RecordingToasts, ToastLevel, ToastSink, TracingToasts};
