//! Notices
//!
//! Buffer of user-facing outcome messages waiting to be shown. Business
//! rejections and successes both land here; the caller renders them in
//! insertion order and dismisses them by id.

use std::fmt;

/// How a notice should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A rejected operation.
    Error,
    /// A completed operation.
    Success,
    /// Advisory information.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Error => "error",
            Self::Success => "success",
            Self::Warning => "warning",
        };
        write!(f, "{label}")
    }
}

/// Handle returned by [`NoticeHub::push`] for later dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoticeId(u64);

/// A user-facing message with its severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    id: NoticeId,
    message: String,
    severity: Severity,
}

impl Notice {
    /// The notice's dismissal handle.
    #[must_use]
    pub fn id(&self) -> NoticeId {
        self.id
    }

    /// The message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The presentation severity.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }
}

/// Ordered buffer of pending notices.
#[derive(Debug, Default)]
pub struct NoticeHub {
    notices: Vec<Notice>,
    next_id: u64,
}

impl NoticeHub {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notice and return its dismissal handle.
    pub fn push(&mut self, message: impl Into<String>, severity: Severity) -> NoticeId {
        let id = NoticeId(self.next_id);
        self.next_id += 1;
        self.notices.push(Notice {
            id,
            message: message.into(),
            severity,
        });
        id
    }

    /// Remove the notice with `id`. Unknown ids are a no-op.
    pub fn dismiss(&mut self, id: NoticeId) {
        self.notices.retain(|notice| notice.id != id);
    }

    /// Remove every pending notice.
    pub fn clear(&mut self) {
        self.notices.clear();
    }

    /// Take every pending notice, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Iterate over pending notices in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Number of pending notices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notices.len()
    }

    /// Whether no notices are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
