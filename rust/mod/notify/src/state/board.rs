use std::collections::{HashMap, HashSet};

use shopdesk_core::Role;

use crate::model::{Order, OrderStatus, PaymentStatus, StatusChange};

/// Which order collection a session reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderScope {
    /// Orders assigned to a staff member.
    Assigned,
    /// All orders of a workspace (managers, admins).
    #[default]
    Workspace,
    /// A customer's own orders.
    Own,
}

impl OrderScope {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Staff => OrderScope::Assigned,
            Role::Manager | Role::Admin => OrderScope::Workspace,
            Role::Customer => OrderScope::Own,
        }
    }
}

/// Origin of a status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSource {
    /// Local write ahead of server confirmation; may be reverted.
    Optimistic,
    /// Server-confirmed or pushed by the live channel.
    Confirmed,
}

/// Order collection plus the current selection.
///
/// The selection is held as an id, so the selected view is always the
/// collection entry itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderBoard {
    scope: OrderScope,
    orders: Vec<Order>,
    selected_id: Option<String>,
    /// Payment status captured before an unconfirmed optimistic write.
    pending: HashMap<String, Option<PaymentStatus>>,
    pub updating: bool,
    pub error: Option<String>,
}

impl OrderBoard {
    pub const PATH: &'static str = "orders/board";

    pub fn new(scope: OrderScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    // -- Collection -------------------------------------------------------

    /// Insert a new order at the front, or replace the record with the same id
    /// in place. Returns `true` when inserted.
    pub fn upsert(&mut self, order: Order) -> bool {
        match self.orders.iter_mut().find(|o| o.id == order.id) {
            Some(existing) => {
                *existing = order;
                false
            }
            None => {
                self.orders.insert(0, order);
                true
            }
        }
    }

    /// Replace the collection wholesale. A selection that no longer exists
    /// is dropped, as are optimistic captures for orders no longer held.
    pub fn replace_all(&mut self, orders: Vec<Order>) {
        let mut seen = HashSet::new();
        self.orders = orders.into_iter().filter(|o| seen.insert(o.id.clone())).collect();
        if let Some(id) = &self.selected_id {
            if !seen.contains(id) {
                self.selected_id = None;
            }
        }
        self.pending.retain(|id, _| seen.contains(id));
    }

    pub fn clear(&mut self) {
        self.orders.clear();
        self.selected_id = None;
        self.pending.clear();
        self.updating = false;
        self.error = None;
    }

    // -- Status -----------------------------------------------------------

    /// Set an order's status. `DELIVERED` also marks payment completed.
    /// Returns `false` if the order is not held.
    ///
    /// An optimistic write captures the payment status it may overwrite. The
    /// capture outlives confirmed writes arriving in the meantime and is
    /// released only by [`settle`](Self::settle) or
    /// [`revert_status`](Self::revert_status).
    pub fn apply_status(&mut self, id: &str, status: OrderStatus, source: StatusSource) -> bool {
        let Some(order) = self.orders.iter_mut().find(|o| o.id == id) else {
            return false;
        };
        if source == StatusSource::Optimistic {
            self.pending
                .entry(id.to_string())
                .or_insert(order.payment_status);
        }
        order.status = status;
        if status == OrderStatus::Delivered {
            order.payment_status = Some(PaymentStatus::Completed);
        }
        true
    }

    /// Undo an optimistic write: restore `original` and the payment status
    /// captured when the optimistic write was applied.
    pub fn revert_status(&mut self, id: &str, original: OrderStatus) -> bool {
        let Some(order) = self.orders.iter_mut().find(|o| o.id == id) else {
            return false;
        };
        order.status = original;
        if let Some(prior) = self.pending.remove(id) {
            order.payment_status = prior;
        }
        true
    }

    /// Apply a status change pushed by the live channel. Unknown ids are ignored.
    pub fn reconcile(&mut self, change: &StatusChange) -> bool {
        if !self.apply_status(&change.order_id, change.status, StatusSource::Confirmed) {
            return false;
        }
        if let Some(ts) = &change.timestamp {
            if let Some(order) = self.orders.iter_mut().find(|o| o.id == change.order_id) {
                order.updated_at = Some(ts.clone());
            }
        }
        true
    }

    /// The server accepted the optimistic write; forget its capture.
    pub fn settle(&mut self, id: &str) {
        self.pending.remove(id);
    }

    pub fn has_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    // -- Selection --------------------------------------------------------

    /// Select an order by id. Returns `false` (selection unchanged) if absent.
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selected_id = Some(id.to_string());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    // -- Views ------------------------------------------------------------

    pub fn scope(&self) -> OrderScope {
        self.scope
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn selected(&self) -> Option<&Order> {
        self.selected_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(orders: &[(&str, OrderStatus)]) -> OrderBoard {
        let mut board = OrderBoard::new(OrderScope::Assigned);
        board.replace_all(orders.iter().map(|(id, s)| Order::new(*id, *s)).collect());
        board
    }

    // ========================================================================
    // Scope
    // ========================================================================

    #[test]
    fn scope_follows_role() {
        assert_eq!(OrderScope::for_role(Role::Staff), OrderScope::Assigned);
        assert_eq!(OrderScope::for_role(Role::Manager), OrderScope::Workspace);
        assert_eq!(OrderScope::for_role(Role::Admin), OrderScope::Workspace);
        assert_eq!(OrderScope::for_role(Role::Customer), OrderScope::Own);
    }

    // ========================================================================
    // Collection
    // ========================================================================

    #[test]
    fn upsert_inserts_front_then_replaces_in_place() {
        let mut board = board_with(&[("a", OrderStatus::Pending)]);
        assert!(board.upsert(Order::new("b", OrderStatus::Pending)));
        assert_eq!(board.orders()[0].id, "b");

        let mut updated = Order::new("a", OrderStatus::Processing);
        updated.total_amount = 5.0;
        assert!(!board.upsert(updated));
        assert_eq!(board.len(), 2);
        assert_eq!(board.orders()[1].status, OrderStatus::Processing);
        assert_eq!(board.orders()[1].total_amount, 5.0);
    }

    #[test]
    fn replace_all_dedups_and_drops_stale_selection() {
        let mut board = board_with(&[("a", OrderStatus::Pending), ("b", OrderStatus::Pending)]);
        assert!(board.select("a"));

        board.replace_all(vec![
            Order::new("b", OrderStatus::Pending),
            Order::new("b", OrderStatus::Delivered),
        ]);

        assert_eq!(board.len(), 1);
        assert_eq!(board.orders()[0].status, OrderStatus::Pending);
        assert!(board.selected().is_none());
    }

    // ========================================================================
    // Status
    // ========================================================================

    #[test]
    fn delivered_completes_payment() {
        let mut board = board_with(&[("a", OrderStatus::Delivery)]);
        board.apply_status("a", OrderStatus::Delivered, StatusSource::Confirmed);

        let order = board.get("a").unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.payment_status, Some(PaymentStatus::Completed));
    }

    #[test]
    fn revert_restores_status_and_payment() {
        let mut board = board_with(&[("a", OrderStatus::Delivery)]);
        let before = board.get("a").cloned().unwrap();

        board.apply_status("a", OrderStatus::Delivered, StatusSource::Optimistic);
        assert!(board.has_pending("a"));
        board.revert_status("a", OrderStatus::Delivery);

        assert_eq!(board.get("a").unwrap(), &before);
        assert!(!board.has_pending("a"));
    }

    #[test]
    fn settle_releases_capture() {
        let mut board = board_with(&[("a", OrderStatus::Pending)]);
        board.apply_status("a", OrderStatus::Delivery, StatusSource::Optimistic);
        board.apply_status("a", OrderStatus::Delivery, StatusSource::Confirmed);
        assert!(board.has_pending("a"));

        board.settle("a");
        assert!(!board.has_pending("a"));
    }

    #[test]
    fn revert_after_interleaved_push_restores_payment() {
        let mut order = Order::new("a", OrderStatus::Processing);
        order.payment_status = Some(PaymentStatus::Pending);
        let mut board = OrderBoard::new(OrderScope::Assigned);
        board.upsert(order);

        board.apply_status("a", OrderStatus::Delivered, StatusSource::Optimistic);
        board.reconcile(&StatusChange {
            order_id: "a".into(),
            status: OrderStatus::Delivered,
            timestamp: None,
        });
        board.revert_status("a", OrderStatus::Processing);

        let o = board.get("a").unwrap();
        assert_eq!(o.status, OrderStatus::Processing);
        assert_eq!(o.payment_status, Some(PaymentStatus::Pending));
    }

    #[test]
    fn replace_all_keeps_capture_for_held_orders() {
        let mut order = Order::new("a", OrderStatus::Processing);
        order.payment_status = Some(PaymentStatus::Pending);
        let mut board = OrderBoard::new(OrderScope::Assigned);
        board.upsert(order);
        board.apply_status("a", OrderStatus::Delivered, StatusSource::Optimistic);

        let mut refetched = Order::new("a", OrderStatus::Delivered);
        refetched.payment_status = Some(PaymentStatus::Completed);
        board.replace_all(vec![refetched, Order::new("b", OrderStatus::Pending)]);
        assert!(board.has_pending("a"));

        board.revert_status("a", OrderStatus::Processing);
        assert_eq!(board.get("a").unwrap().payment_status, Some(PaymentStatus::Pending));

        board.apply_status("b", OrderStatus::Delivery, StatusSource::Optimistic);
        board.replace_all(Vec::new());
        assert!(!board.has_pending("b"));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut board = board_with(&[("a", OrderStatus::Pending)]);
        let before = board.clone();

        assert!(!board.apply_status("zzz", OrderStatus::Delivered, StatusSource::Optimistic));
        assert!(!board.revert_status("zzz", OrderStatus::Pending));
        assert!(!board.reconcile(&StatusChange {
            order_id: "zzz".into(),
            status: OrderStatus::Cancelled,
            timestamp: None,
        }));
        assert_eq!(board, before);
    }

    #[test]
    fn reconcile_sets_status_and_timestamp() {
        let mut board = board_with(&[("a", OrderStatus::Pending)]);
        let change = StatusChange {
            order_id: "a".into(),
            status: OrderStatus::Delivery,
            timestamp: Some("2026-02-02T00:00:00Z".into()),
        };
        assert!(board.reconcile(&change));
        assert!(board.reconcile(&change));

        let order = board.get("a").unwrap();
        assert_eq!(order.status, OrderStatus::Delivery);
        assert_eq!(order.updated_at.as_deref(), Some("2026-02-02T00:00:00Z"));
    }

    // ========================================================================
    // Selection
    // ========================================================================

    #[test]
    fn selection_tracks_collection_entry() {
        let mut board = board_with(&[("a", OrderStatus::Pending)]);
        assert!(!board.select("missing"));
        assert!(board.select("a"));

        board.apply_status("a", OrderStatus::Cancelled, StatusSource::Confirmed);
        assert_eq!(board.selected().unwrap().status, OrderStatus::Cancelled);

        board.clear_selection();
        assert!(board.selected_id().is_none());
    }
}
