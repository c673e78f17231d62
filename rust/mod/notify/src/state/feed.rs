use std::collections::HashSet;

use crate::model::{Notification, NotificationType, PageInfo};

/// Feed size cap applied to live inserts.
pub const DEFAULT_RETENTION: usize = 50;

/// Pagination cursor derived from the last fetched page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            total: 0,
            limit: 10,
            offset: 0,
            has_more: false,
        }
    }
}

/// Notification feed, newest first.
///
/// Ids are unique. `unread_count` is maintained incrementally by every
/// mutation and always equals the number of unread entries.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationFeed {
    items: Vec<Notification>,
    unread_count: usize,
    retention: usize,
    pub pagination: Pagination,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }
}

impl NotificationFeed {
    pub const PATH: &'static str = "notifications/feed";

    pub fn with_retention(retention: usize) -> Self {
        Self {
            items: Vec::new(),
            unread_count: 0,
            retention: retention.max(1),
            pagination: Pagination::default(),
            loading: false,
            last_error: None,
        }
    }

    // -- Mutations --------------------------------------------------------

    /// Prepend a live notification. Returns `false` if the id is already
    /// present (no change). Entries beyond the retention cap are dropped
    /// from the tail.
    pub fn add(&mut self, notification: Notification) -> bool {
        if self.contains(&notification.id) {
            return false;
        }
        if !notification.read {
            self.unread_count += 1;
        }
        self.items.insert(0, notification);
        if self.items.len() > self.retention {
            let dropped = self.items.split_off(self.retention);
            self.discount(dropped.iter().filter(|n| !n.read).count());
        }
        true
    }

    /// Install a fetched page: offset 0 replaces the feed, any other offset
    /// appends entries whose ids are not yet present.
    pub fn replace_page(&mut self, notifications: Vec<Notification>, total: usize, page: PageInfo) {
        if page.offset == 0 {
            self.items.clear();
            self.unread_count = 0;
        }
        let mut seen: HashSet<String> = self.items.iter().map(|n| n.id.clone()).collect();
        for n in notifications {
            if seen.insert(n.id.clone()) {
                if !n.read {
                    self.unread_count += 1;
                }
                self.items.push(n);
            }
        }
        self.pagination = Pagination {
            total,
            limit: page.limit,
            offset: page.offset,
            has_more: self.items.len() < total,
        };
    }

    /// Mark one entry read. Returns `false` if absent or already read.
    pub fn mark_read(&mut self, id: &str) -> bool {
        let flipped = match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.read => {
                n.read = true;
                true
            }
            _ => false,
        };
        if flipped {
            self.discount(1);
        }
        flipped
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.items {
            n.read = true;
        }
        self.unread_count = 0;
    }

    /// Remove one entry locally. Returns `false` if absent.
    pub fn dismiss(&mut self, id: &str) -> bool {
        let Some(pos) = self.items.iter().position(|n| n.id == id) else {
            return false;
        };
        if !self.items.remove(pos).read {
            self.discount(1);
        }
        true
    }

    /// Empty the feed and reset pagination.
    pub fn clear(&mut self) {
        self.items.clear();
        self.unread_count = 0;
        self.pagination = Pagination::default();
        self.last_error = None;
    }

    fn discount(&mut self, n: usize) {
        self.unread_count = self.unread_count.saturating_sub(n);
    }

    // -- Views ------------------------------------------------------------

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    pub fn has_more(&self) -> bool {
        self.pagination.has_more
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|n| n.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    pub fn unread(&self) -> Vec<Notification> {
        self.items.iter().filter(|n| !n.read).cloned().collect()
    }

    pub fn read_items(&self) -> Vec<Notification> {
        self.items.iter().filter(|n| n.read).cloned().collect()
    }

    pub fn by_type(&self, kind: NotificationType) -> Vec<Notification> {
        self.items.iter().filter(|n| n.kind == kind).cloned().collect()
    }
}
