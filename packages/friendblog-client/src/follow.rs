use crate::bus::{Signal, SignalBus};
use crate::gateway::Gateway;
use anyhow::Result;
use async_trait::async_trait;
use friendblog_core::ClientConfig;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

/// 徽标计数的数据源，便于在测试里替换网关
#[async_trait]
pub trait RequestCountSource: Send + Sync {
    async fn fetch_count(&self) -> Result<usize>;
}

#[async_trait]
impl RequestCountSource for Gateway {
    async fn fetch_count(&self) -> Result<usize> {
        let value = self.follow_requests_raw().await?;
        value
            .as_array()
            .map(Vec::len)
            .ok_or_else(|| anyhow::anyhow!("follow request response is not a list"))
    }
}

/// 退避间隔翻倍，封顶
pub fn next_delay(current: Duration, max: Duration) -> Duration {
    (current * 2).min(max)
}

/// 关注请求徽标计数：实时信号增量维护，
/// 连接断开时转入退避轮询保证最终一致。
pub struct FollowRequestCounter {
    source: Arc<dyn RequestCountSource>,
    bus: SignalBus,
    count: AtomicUsize,
    refreshing: AtomicBool,
    poll_base: Duration,
    poll_max: Duration,
}

impl FollowRequestCounter {
    pub fn new(gateway: Gateway, bus: SignalBus, config: &ClientConfig) -> Arc<Self> {
        Self::with_source(
            Arc::new(gateway),
            bus,
            config.poll_base_delay(),
            config.poll_max_delay(),
        )
    }

    pub fn with_source(
        source: Arc<dyn RequestCountSource>,
        bus: SignalBus,
        poll_base: Duration,
        poll_max: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            source,
            bus,
            count: AtomicUsize::new(0),
            refreshing: AtomicBool::new(false),
            poll_base,
            poll_max,
        })
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// 一次 REST 刷新；已有请求在途就跳过。
    /// 失败不动现有计数，轮询日程照常继续。
    pub async fn refresh(&self) {
        if self.refreshing.swap(true, Ordering::SeqCst) {
            return;
        }
        match self.source.fetch_count().await {
            Ok(count) => self.count.store(count, Ordering::SeqCst),
            Err(e) => tracing::debug!("follow request refresh failed: {}", e),
        }
        self.refreshing.store(false, Ordering::SeqCst);
    }

    /// 订阅总线并启动驱动任务。
    /// 订阅发生在任务启动之前，信号不会漏在启动窗口里。
    pub fn spawn(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let rx = self.bus.subscribe();
        let counter = Arc::clone(self);
        tokio::spawn(counter.run(rx))
    }

    async fn run(self: Arc<Self>, mut rx: broadcast::Receiver<Signal>) {
        // 挂载时先拉一次
        self.refresh().await;

        let mut polling = false;
        let mut delay = self.poll_base;
        let mut deadline = Instant::now();

        loop {
            if polling {
                tokio::select! {
                    signal = rx.recv() => match signal {
                        Ok(signal) => {
                            self.handle(signal, &mut polling, &mut delay, &mut deadline)
                                .await;
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    _ = tokio::time::sleep_until(deadline) => {
                        self.refresh().await;
                        delay = next_delay(delay, self.poll_max);
                        deadline = Instant::now() + delay;
                    }
                }
            } else {
                match rx.recv().await {
                    Ok(signal) => {
                        self.handle(signal, &mut polling, &mut delay, &mut deadline)
                            .await;
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    async fn handle(
        &self,
        signal: Signal,
        polling: &mut bool,
        delay: &mut Duration,
        deadline: &mut Instant,
    ) {
        match signal {
            Signal::SocketDisconnected => {
                *polling = true;
                *delay = self.poll_base;
                *deadline = Instant::now() + *delay;
            }
            Signal::SocketConnected => {
                // 定时器作废，间隔归位
                *polling = false;
                *delay = self.poll_base;
            }
            Signal::FollowRequestIncrement => {
                self.count.fetch_add(1, Ordering::SeqCst);
            }
            Signal::FollowRequestRefresh => self.refresh().await,
            _ => {}
        }
    }
}

/// 关注请求的处理操作
#[derive(Clone)]
pub struct FollowRequests {
    gateway: Gateway,
    bus: SignalBus,
}

impl FollowRequests {
    pub fn new(gateway: Gateway, bus: SignalBus) -> Self {
        Self { gateway, bus }
    }

    pub async fn pending(&self) -> Result<Vec<friendblog_core::FollowRequest>> {
        Ok(self.gateway.pending_requests().await?)
    }

    /// 接受请求后给对方补推一条 follow_accepted 通知；
    /// 补推失败不影响主流程。
    pub async fn accept(
        &self,
        request: &friendblog_core::FollowRequest,
        actor_name: Option<&str>,
    ) -> Result<()> {
        self.gateway.accept_request(&request.id).await?;

        if let Some(target) = request.from_user.as_ref().and_then(|user| user.id.clone()) {
            let body = serde_json::json!({
                "type": "follow_accepted",
                "targetUserId": target,
                "data": {
                    "message": format!(
                        "{} was accepted",
                        actor_name.unwrap_or("Your follow request")
                    ),
                    "actorName": actor_name,
                    "requestId": request.id,
                }
            });
            if let Err(e) = self.gateway.push_notification(&body).await {
                tracing::debug!("follow_accepted push failed: {}", e);
            }
        }

        self.bus.publish(Signal::FollowRequestRefresh);
        Ok(())
    }

    pub async fn reject(&self, id: &str) -> Result<()> {
        self.gateway.reject_request(id).await?;
        self.bus.publish(Signal::FollowRequestRefresh);
        Ok(())
    }
}
