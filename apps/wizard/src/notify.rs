//! Toast/Notification Queue: transient UI feedback, FIFO with remove-by-id.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ToastId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub id: ToastId,
    #[serde(rename = "type")]
    pub kind: ToastKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a toast and returns its freshly generated id.
    pub fn add(&mut self, kind: ToastKind, message: impl Into<String>) -> ToastId {
        let id = Uuid::new_v4();
        self.toasts.push_back(Toast {
            id,
            kind,
            message: message.into(),
            created_at: Utc::now(),
        });
        id
    }

    /// Removes a toast. Returns `false` if it was already gone.
    pub fn remove(&mut self, id: ToastId) -> bool {
        match self.toasts.iter().position(|t| t.id == id) {
            Some(index) => {
                self.toasts.remove(index);
                true
            }
            None => false,
        }
    }

    /// Toasts in the order they were added.
    pub fn list(&self) -> Vec<Toast> {
        self.toasts.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_then_remove_leaves_queue_empty() {
        let mut queue = ToastQueue::new();
        let id = queue.add(ToastKind::Success, "Saved");
        assert_eq!(queue.list().len(), 1);
        assert!(queue.remove(id));
        assert!(queue.list().is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut queue = ToastQueue::new();
        let a = queue.add(ToastKind::Info, "same");
        let b = queue.add(ToastKind::Info, "same");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = ToastQueue::new();
        queue.add(ToastKind::Info, "first");
        let middle = queue.add(ToastKind::Warning, "second");
        queue.add(ToastKind::Error, "third");
        queue.remove(middle);
        let messages: Vec<_> = queue.list().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec!["first", "third"]);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut queue = ToastQueue::new();
        queue.add(ToastKind::Info, "hello");
        assert!(!queue.remove(Uuid::new_v4()));
        assert_eq!(queue.list().len(), 1);
    }

    #[test]
    fn test_kind_serializes_as_type() {
        let mut queue = ToastQueue::new();
        queue.add(ToastKind::Success, "Saved");
        let value = serde_json::to_value(&queue.list()[0]).unwrap();
        assert_eq!(value["type"], "success");
        assert_eq!(value["message"], "Saved");
    }
}
