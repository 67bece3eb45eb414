//! Transient toast notifications
//!
//! Each notification carries its own deadline; there is no queueing beyond
//! independent timers. The queue lives behind `Arc<Mutex<..>>` so API tasks on
//! the tokio runtime can push errors before returning them.

use crate::constants::{NOTIFICATION_FADE_SECS, NOTIFICATION_VISIBLE_SECS};
use eframe::egui;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub created: Instant,
}

impl Notification {
    pub fn lifetime() -> Duration {
        Duration::from_secs_f32(NOTIFICATION_VISIBLE_SECS + NOTIFICATION_FADE_SECS)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created) >= Self::lifetime()
    }

    /// Opacity in 0..=1, fading out over the last part of the lifetime
    pub fn alpha(&self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.created).as_secs_f32();
        if elapsed <= NOTIFICATION_VISIBLE_SECS {
            1.0
        } else {
            let total = NOTIFICATION_VISIBLE_SECS + NOTIFICATION_FADE_SECS;
            ((total - elapsed) / NOTIFICATION_FADE_SECS).clamp(0.0, 1.0)
        }
    }
}

#[derive(Default)]
struct Queue {
    next_id: u64,
    items: Vec<Notification>,
}

/// Cloneable handle for pushing notifications from any thread
#[derive(Clone, Default)]
pub struct Notifier {
    queue: Arc<Mutex<Queue>>,
    ctx: Option<egui::Context>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the egui context so pushes from background tasks wake the UI
    pub fn with_context(mut self, ctx: egui::Context) -> Self {
        self.ctx = Some(ctx);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, kind: NotificationKind, message: impl Into<String>) {
        {
            let mut q = self.lock();
            q.next_id += 1;
            let id = q.next_id;
            q.items.push(Notification {
                id,
                kind,
                message: message.into(),
                created: Instant::now(),
            });
        }
        if let Some(ctx) = &self.ctx {
            ctx.request_repaint();
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NotificationKind::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NotificationKind::Error, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(NotificationKind::Info, message);
    }

    /// Drop expired notifications and return the live ones, oldest first
    pub fn active(&self, now: Instant) -> Vec<Notification> {
        let mut q = self.lock();
        q.items.retain(|n| !n.is_expired(now));
        q.items.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_expire_independently() {
        let notifier = Notifier::new();
        notifier.success("saved");
        notifier.error("not found");

        let now = Instant::now();
        let live = notifier.active(now);
        assert_eq!(live.len(), 2);
        assert_eq!(live[1].kind, NotificationKind::Error);
        assert_eq!(live[1].message, "not found");

        let later = now + Notification::lifetime() + Duration::from_millis(10);
        assert!(notifier.active(later).is_empty());
    }

    #[test]
    fn test_alpha_fades_at_end() {
        let n = Notification {
            id: 1,
            kind: NotificationKind::Info,
            message: "hi".into(),
            created: Instant::now(),
        };
        assert_eq!(n.alpha(n.created), 1.0);
        let mid_fade = n.created
            + Duration::from_secs_f32(NOTIFICATION_VISIBLE_SECS + NOTIFICATION_FADE_SECS / 2.0);
        let a = n.alpha(mid_fade);
        assert!(a > 0.4 && a < 0.6, "alpha was {a}");
    }

    #[test]
    fn test_clones_share_queue() {
        let a = Notifier::new();
        let b = a.clone();
        b.info("from task");
        assert_eq!(a.active(Instant::now()).len(), 1);
    }
}
