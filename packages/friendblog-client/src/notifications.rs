use crate::bus::{Signal, SignalBus};
use crate::gateway::Gateway;
use crate::session::SessionStore;
use anyhow::Result;
use friendblog_core::{ClientConfig, Notification, NotificationKind};
use friendblog_sdk::{SocketConfig, SocketMessage, spawn_socket};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// 批量拉取时尝试的嵌套字段，按固定顺序
const LIST_KEYS: [&str; 3] = ["notifications", "items", "data"];

#[derive(Default)]
struct ChannelState {
    notifications: Vec<Notification>,
    unread: usize,
}

/// 实时通知通道。
/// 每个应用显式构造一个并用 Arc 共享，观察者只拿接收端，
/// 连接本身跟随进程生命周期（原实现也从不主动关闭）。
pub struct NotificationChannel {
    gateway: Gateway,
    session: SessionStore,
    bus: SignalBus,
    config: ClientConfig,
    state: Mutex<ChannelState>,
    started: AtomicBool,
    updates: broadcast::Sender<Notification>,
}

impl NotificationChannel {
    pub fn new(
        gateway: Gateway,
        session: SessionStore,
        bus: SignalBus,
        config: ClientConfig,
    ) -> Arc<Self> {
        let (updates, _) = broadcast::channel(64);
        Arc::new(Self {
            gateway,
            session,
            bus,
            config,
            state: Mutex::new(ChannelState::default()),
            started: AtomicBool::new(false),
            updates,
        })
    }

    /// 激活通道：没有 token 就什么都不做；
    /// 重复激活复用已有连接。
    pub async fn activate(self: &Arc<Self>) -> Result<()> {
        let Some(token) = self.session.token() else {
            return Ok(());
        };
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let socket_config = SocketConfig {
            url: self.gateway.ws_url(),
            token,
            user_id: self.session.user_id(),
            reconnect_attempts: self.config.reconnect_attempts,
            base_delay: self.config.reconnect_base_delay(),
            max_delay: self.config.reconnect_max_delay(),
        };
        let mut socket = spawn_socket(socket_config);

        let channel = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(message) = socket.recv().await {
                match message {
                    SocketMessage::Up => channel.bus.publish(Signal::SocketConnected),
                    SocketMessage::Down => channel.bus.publish(Signal::SocketDisconnected),
                    SocketMessage::Event(event) => channel.apply_event(event.data),
                    SocketMessage::Closed => break,
                }
            }
        });

        if let Err(e) = self.reload().await {
            tracing::warn!("initial notification load failed: {}", e);
        }
        Ok(())
    }

    /// 观察归并后的通知流；丢弃接收端即取消订阅
    pub fn observe(&self) -> broadcast::Receiver<Notification> {
        self.updates.subscribe()
    }

    /// 事件归并：规范化类型、前插、未读计数、关注请求旁路信号。
    /// 通知永远不丢。
    pub fn apply_event(&self, raw: Value) {
        let mut notification: Notification =
            serde_json::from_value(raw.clone()).unwrap_or_else(|_| Notification {
                id: String::new(),
                user_id: String::new(),
                actor_id: String::new(),
                kind: NotificationKind::Other(String::new()),
                data: raw,
                read: false,
                created_at: chrono::Utc::now(),
            });
        notification.kind = NotificationKind::normalize(&notification.kind, &notification.data);

        let is_follow_request = notification.kind == NotificationKind::FollowRequest;
        {
            let mut guard = self.state.lock().unwrap();
            if !notification.read {
                guard.unread += 1;
            }
            guard.notifications.insert(0, notification.clone());
        }

        if is_follow_request {
            self.bus.publish(Signal::FollowRequestIncrement);
        }
        let _ = self.updates.send(notification);
    }

    /// 批量加载：整体覆盖本地列表并精确重算未读数，
    /// 避免推拉两条路径叠出重复条目。
    pub async fn reload(&self) -> Result<()> {
        let raw = self.gateway.notifications_raw().await?;
        let notifications = extract_notification_list(&raw);
        let unread = notifications.iter().filter(|n| !n.read).count();

        let mut guard = self.state.lock().unwrap();
        guard.notifications = notifications;
        guard.unread = unread;
        Ok(())
    }

    /// 标记已读：请求成功才翻本地状态，不做乐观更新
    pub async fn mark_read(&self, id: &str) {
        match self.gateway.mark_notification_read(id).await {
            Ok(()) => self.complete_mark_read(id),
            Err(e) => tracing::warn!("mark-as-read failed for {}: {}", id, e),
        }
    }

    fn complete_mark_read(&self, id: &str) {
        let mut guard = self.state.lock().unwrap();
        let ChannelState {
            notifications,
            unread,
        } = &mut *guard;
        if let Some(notification) = notifications.iter_mut().find(|n| n.id == id) {
            if !notification.read {
                notification.read = true;
                *unread = unread.saturating_sub(1);
            }
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.lock().unwrap().notifications.clone()
    }

    pub fn unread_count(&self) -> usize {
        self.state.lock().unwrap().unread
    }
}

/// 容忍多种响应形状：裸数组，或挂在几个已知字段下的数组；
/// 都不匹配时回空列表。
pub fn extract_notification_list(value: &Value) -> Vec<Notification> {
    let items = match value.as_array() {
        Some(list) => list,
        None => {
            let Some(list) = LIST_KEYS
                .iter()
                .find_map(|key| value.get(key).and_then(Value::as_array))
            else {
                return Vec::new();
            };
            list
        }
    };
    items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}
