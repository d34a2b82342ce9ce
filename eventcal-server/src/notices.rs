//! Per-user flash messages shown after an action redirects.

use std::collections::{HashMap, VecDeque};

use eventcal_core::UserId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Notices kept per user; older ones are dropped once a user has this many
/// waiting.
pub const MAX_QUEUED_PER_USER: usize = 20;

#[derive(Default)]
pub struct Notices {
    queued: HashMap<UserId, VecDeque<Notice>>,
}

impl Notices {
    pub fn push(&mut self, user: UserId, kind: NoticeKind, message: String) {
        let queue = self.queued.entry(user).or_default();
        if queue.len() == MAX_QUEUED_PER_USER {
            queue.pop_front();
        }
        queue.push_back(Notice { kind, message });
    }

    /// Take every queued notice for `user`, oldest first.
    pub fn drain(&mut self, user: UserId) -> Vec<Notice> {
        self.queued
            .remove(&user)
            .map(Vec::from)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_queue() {
        let mut notices = Notices::default();
        notices.push(UserId(1), NoticeKind::Success, "first".into());
        notices.push(UserId(1), NoticeKind::Error, "second".into());
        notices.push(UserId(2), NoticeKind::Success, "other".into());

        let drained = notices.drain(UserId(1));
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message, "first");
        assert_eq!(drained[1].kind, NoticeKind::Error);

        assert!(notices.drain(UserId(1)).is_empty());
        assert_eq!(notices.drain(UserId(2)).len(), 1);
    }

    #[test]
    fn queue_keeps_only_the_newest_notices() {
        let mut notices = Notices::default();
        for n in 0..MAX_QUEUED_PER_USER + 5 {
            notices.push(UserId(1), NoticeKind::Success, format!("notice {n}"));
        }

        let drained = notices.drain(UserId(1));
        assert_eq!(drained.len(), MAX_QUEUED_PER_USER);
        assert_eq!(drained[0].message, "notice 5");
        assert_eq!(
            drained.last().unwrap().message,
            format!("notice {}", MAX_QUEUED_PER_USER + 4)
        );
    }
}
