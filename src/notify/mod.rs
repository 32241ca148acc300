use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Toast {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, title, message)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Success, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, message)
    }
}

const DEFAULT_CAPACITY: usize = 4;

/// Non-blocking notification stack. New toasts append; when full, the
/// oldest is dropped. Nothing here ever interrupts input handling.
#[derive(Debug)]
pub struct Toaster {
    toasts: VecDeque<Toast>,
    capacity: usize,
}

impl Toaster {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            toasts: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, toast: Toast) {
        log::debug!(
            "toast [{}] {}: {}",
            toast.severity.as_str(),
            toast.title,
            toast.message
        );
        while self.toasts.len() >= self.capacity {
            self.toasts.pop_front();
        }
        self.toasts.push_back(toast);
    }

    pub fn dismiss_oldest(&mut self) -> Option<Toast> {
        self.toasts.pop_front()
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.back()
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}
