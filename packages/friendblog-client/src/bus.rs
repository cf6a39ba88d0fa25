use tokio::sync::broadcast;

/// 进程内信号集合（固定枚举，替代散落的字符串事件名）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    SocketConnected,
    SocketDisconnected,
    FollowRequestIncrement,
    FollowRequestRefresh,
    Unauthenticated,
    Forbidden { message: Option<String> },
}

/// 类型化的进程内发布/订阅总线。
/// 由应用构造后注入各组件，不做全局单例。
#[derive(Clone)]
pub struct SignalBus {
    tx: broadcast::Sender<Signal>,
}

impl SignalBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Signal> {
        self.tx.subscribe()
    }

    /// 没有订阅者时发布直接丢弃，不算错误
    pub fn publish(&self, signal: Signal) {
        let _ = self.tx.send(signal);
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let bus = SignalBus::new();
        bus.publish(Signal::SocketConnected);
    }

    #[tokio::test]
    async fn test_every_subscriber_sees_the_signal() {
        let bus = SignalBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(Signal::Forbidden {
            message: Some("nope".to_string()),
        });

        let expected = Signal::Forbidden {
            message: Some("nope".to_string()),
        };
        assert_eq!(a.recv().await.unwrap(), expected);
        assert_eq!(b.recv().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_dropped_subscriber_detaches_only_itself() {
        let bus = SignalBus::new();
        let a = bus.subscribe();
        let mut b = bus.subscribe();
        drop(a);

        bus.publish(Signal::FollowRequestIncrement);
        assert_eq!(b.recv().await.unwrap(), Signal::FollowRequestIncrement);
    }
}
