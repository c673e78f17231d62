//! Flux: path-addressed client state.
//!
//! Each signed-in session owns one [`StateStore`]. Domain modules keep their
//! canonical state as typed snapshots at fixed paths and mutate them only
//! through [`StateStore::update`], which serializes writers per store.
//! Presentation code reads snapshots and subscribes to changes.
//!
//! # Paths
//!
//! - `notifications/feed`
//! - `socket/connection`
//! - `orders/board`
//! - `staff/dashboard`
//!
//! # Example
//!
//! ```ignore
//! use shopdesk_flux::StateStore;
//!
//! let store = StateStore::new();
//! store.subscribe("notifications/#", |path, _| println!("{path} changed"));
//! store.update("notifications/feed", |feed: &mut NotificationFeed| feed.clear());
//! ```

pub mod store;
pub mod topic;
pub mod value;

pub use store::{ChangeHandler, StateStore};
pub use value::{StateValue, SubscriptionId};
