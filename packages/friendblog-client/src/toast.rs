use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const DEFAULT_TTL_MS: i64 = 3200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Info,
}

/// 短暂展示的提示消息
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub level: ToastLevel,
    pub expires_at: DateTime<Utc>,
}

/// 进程级的提示队列，到期自动清掉
#[derive(Clone)]
pub struct ToastQueue {
    inner: Arc<Mutex<Vec<Toast>>>,
    ttl: Duration,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::with_ttl(Duration::milliseconds(DEFAULT_TTL_MS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
            ttl,
        }
    }

    pub fn push(&self, message: impl Into<String>, level: ToastLevel) -> Uuid {
        let toast = Toast {
            id: Uuid::new_v4(),
            message: message.into(),
            level,
            expires_at: Utc::now() + self.ttl,
        };
        let id = toast.id;
        self.inner.lock().unwrap().push(toast);
        id
    }

    pub fn dismiss(&self, id: Uuid) {
        self.inner.lock().unwrap().retain(|toast| toast.id != id);
    }

    pub fn active(&self) -> Vec<Toast> {
        self.active_at(Utc::now())
    }

    fn active_at(&self, now: DateTime<Utc>) -> Vec<Toast> {
        let mut guard = self.inner.lock().unwrap();
        guard.retain(|toast| toast.expires_at > now);
        guard.clone()
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}
