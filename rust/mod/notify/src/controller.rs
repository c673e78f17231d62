//! Order status surface consumed by presentation code.

use std::sync::Arc;

use tracing::{error, info, warn};

use shopdesk_flux::StateStore;

use crate::api::OrderApi;
use crate::error::NotifyError;
use crate::model::{Order, OrderStatus};
use crate::state::{DashboardState, OrderBoard, OrderScope, StatusSource};
use crate::toast::{ToastLevel, ToastSink};

pub struct OrderStatusController {
    store: Arc<StateStore>,
    api: Arc<dyn OrderApi>,
    toasts: Arc<dyn ToastSink>,
    workspace_id: Option<i64>,
}

impl OrderStatusController {
    pub fn new(store: Arc<StateStore>, api: Arc<dyn OrderApi>, toasts: Arc<dyn ToastSink>, workspace_id: Option<i64>) -> Self {
        Self {
            store,
            api,
            toasts,
            workspace_id,
        }
    }

    fn workspace(&self) -> Result<i64, NotifyError> {
        self.workspace_id.ok_or(NotifyError::MissingWorkspace)
    }

    fn fail(&self, e: NotifyError) -> NotifyError {
        self.toasts.show(ToastLevel::Error, &e.to_string());
        e
    }

    /// Optimistically move an order to `status`, then confirm with the server.
    ///
    /// On success the optimistic state stays and, for assigned-order boards,
    /// the staff dashboard is refetched. On failure the prior status is
    /// restored and the error returned; nothing is refetched or retried.
    /// Returns the server's message.
    pub async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> Result<String, NotifyError> {
        let workspace_id = self.workspace().map_err(|e| self.fail(e))?;

        let original = self
            .store
            .update(OrderBoard::PATH, |b: &mut OrderBoard| {
                let original = b.get(order_id).map(|o| o.status)?;
                b.apply_status(order_id, status, StatusSource::Optimistic);
                b.updating = true;
                b.error = None;
                Some(original)
            })
            .ok_or_else(|| self.fail(NotifyError::OrderNotFound(order_id.to_string())))?;

        match self.api.update_status(workspace_id, order_id, status).await {
            Ok(ack) => {
                self.store.update(OrderBoard::PATH, |b: &mut OrderBoard| {
                    b.apply_status(order_id, status, StatusSource::Confirmed);
                    b.settle(order_id);
                    b.updating = false;
                });
                let message = ack
                    .message
                    .unwrap_or_else(|| format!("Order status updated to {}", status));
                info!(order_id, %status, "order status updated");
                self.toasts.show(ToastLevel::Success, &message);

                if self.scope() == OrderScope::Assigned {
                    if let Err(e) = self.load_dashboard().await {
                        warn!(error = %e, "dashboard refetch after status update failed");
                    }
                }
                Ok(message)
            }
            Err(e) => {
                let err = NotifyError::api("Failed to update order status", e);
                error!(order_id, %status, error = %err, "order status update failed, reverting");
                let message = err.to_string();
                self.store.update(OrderBoard::PATH, |b: &mut OrderBoard| {
                    b.revert_status(order_id, original);
                    b.updating = false;
                    b.error = Some(message);
                });
                Err(self.fail(err))
            }
        }
    }

    /// Refetch the staff dashboard: stats are stored and the assigned orders
    /// replace the board. On failure the board is left as is.
    pub async fn load_dashboard(&self) -> Result<(), NotifyError> {
        let workspace_id = self.workspace()?;
        self.store
            .update(DashboardState::PATH, |d: &mut DashboardState| d.loading = true);

        match self.api.staff_dashboard(workspace_id).await {
            Ok(mut dashboard) => {
                let orders = std::mem::take(&mut dashboard.assigned_orders);
                self.store
                    .update(OrderBoard::PATH, |b: &mut OrderBoard| b.replace_all(orders));
                self.store.update(DashboardState::PATH, |d: &mut DashboardState| {
                    d.dashboard = Some(dashboard);
                    d.loading = false;
                    d.error = None;
                });
                Ok(())
            }
            Err(e) => {
                let err = NotifyError::api("Failed to fetch dashboard data", e);
                let message = err.to_string();
                self.store.update(DashboardState::PATH, |d: &mut DashboardState| {
                    d.loading = false;
                    d.error = Some(message);
                });
                Err(err)
            }
        }
    }

    /// Load the board for its scope: the staff dashboard for assigned
    /// orders, the workspace order list otherwise.
    pub async fn load_orders(&self) -> Result<(), NotifyError> {
        if self.scope() == OrderScope::Assigned {
            return self.load_dashboard().await;
        }
        let workspace_id = self.workspace()?;
        match self.api.workspace_orders(workspace_id).await {
            Ok(orders) => {
                self.store.update(OrderBoard::PATH, |b: &mut OrderBoard| {
                    b.replace_all(orders);
                    b.error = None;
                });
                Ok(())
            }
            Err(e) => {
                let err = NotifyError::api("Failed to fetch orders", e);
                let message = err.to_string();
                self.store
                    .update(OrderBoard::PATH, |b: &mut OrderBoard| b.error = Some(message));
                Err(err)
            }
        }
    }

    // -- Selection --------------------------------------------------------

    pub fn select_order(&self, order_id: &str) -> bool {
        self.store
            .update(OrderBoard::PATH, |b: &mut OrderBoard| b.select(order_id))
    }

    pub fn clear_selection(&self) {
        self.store
            .update(OrderBoard::PATH, |b: &mut OrderBoard| b.clear_selection());
    }

    // -- Views ------------------------------------------------------------

    pub fn board(&self) -> OrderBoard {
        self.store
            .get_as::<OrderBoard>(OrderBoard::PATH)
            .unwrap_or_default()
    }

    pub fn scope(&self) -> OrderScope {
        self.store
            .read(OrderBoard::PATH, OrderBoard::scope)
            .unwrap_or_default()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.store
            .read(OrderBoard::PATH, |b: &OrderBoard| b.orders().to_vec())
            .unwrap_or_default()
    }

    pub fn selected(&self) -> Option<Order> {
        self.store
            .read(OrderBoard::PATH, |b: &OrderBoard| b.selected().cloned())
            .flatten()
    }

    /// Statuses offered for an order; empty for terminal or unknown orders.
    pub fn selectable_statuses(&self, order_id: &str) -> Vec<OrderStatus> {
        self.store
            .read(OrderBoard::PATH, |b: &OrderBoard| {
                b.get(order_id)
                    .map(|o| o.status.selectable_next().to_vec())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    pub fn dashboard(&self) -> DashboardState {
        self.store
            .get_as::<DashboardState>(DashboardState::PATH)
            .unwrap_or_default()
    }
}
