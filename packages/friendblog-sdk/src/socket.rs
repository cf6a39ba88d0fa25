use friendblog_core::RawEvent;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// 连接任务向所有者上报的消息
#[derive(Debug, Clone)]
pub enum SocketMessage {
    /// 连接建立
    Up,
    /// 连接断开（可能还会重连）
    Down,
    /// 订阅流上的事件帧
    Event(RawEvent),
    /// 重连次数耗尽，任务退出
    Closed,
}

#[derive(Debug, Clone)]
pub struct SocketConfig {
    pub url: String,
    pub token: String,
    pub user_id: Option<String>,
    pub reconnect_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

/// 启动常驻连接任务；进程内只应存在一个。
/// 握手后订阅广播流和按用户区分的私有流，两者汇入同一个接收器。
pub fn spawn_socket(config: SocketConfig) -> mpsc::UnboundedReceiver<SocketMessage> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run_socket(config, tx));
    rx
}

async fn run_socket(config: SocketConfig, tx: mpsc::UnboundedSender<SocketMessage>) {
    let user_channel = config.user_id.as_ref().map(|id| format!("user:{}", id));
    let mut attempts = 0u32;
    let mut delay = config.base_delay;

    loop {
        match connect_async(config.url.as_str()).await {
            Ok((stream, _)) => {
                let (mut write, mut read) = stream.split();
                let hello = json!({ "auth": { "token": config.token } });

                if write
                    .send(Message::Text(hello.to_string().into()))
                    .await
                    .is_ok()
                {
                    // 连接成功，重连计数和退避间隔归位
                    attempts = 0;
                    delay = config.base_delay;
                    if tx.send(SocketMessage::Up).is_err() {
                        return;
                    }

                    while let Some(frame) = read.next().await {
                        match frame {
                            Ok(Message::Text(text)) => {
                                forward_frame(&tx, user_channel.as_deref(), &text);
                            }
                            Ok(Message::Binary(data)) => {
                                if let Ok(text) = String::from_utf8(data.to_vec()) {
                                    forward_frame(&tx, user_channel.as_deref(), &text);
                                }
                            }
                            Ok(Message::Ping(_)) => {
                                if write.send(Message::Pong(vec![].into())).await.is_err() {
                                    break;
                                }
                            }
                            Ok(Message::Close(_)) => break,
                            Err(e) => {
                                tracing::debug!("socket read error: {}", e);
                                break;
                            }
                            _ => {}
                        }
                    }

                    if tx.send(SocketMessage::Down).is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                tracing::debug!("socket connect failed: {}", e);
            }
        }

        attempts += 1;
        if attempts > config.reconnect_attempts {
            let _ = tx.send(SocketMessage::Closed);
            return;
        }
        tokio::time::sleep(delay).await;
        delay = (delay * 2).min(config.max_delay);
    }
}

/// 只透传订阅的事件名，其余帧忽略
fn forward_frame(
    tx: &mpsc::UnboundedSender<SocketMessage>,
    user_channel: Option<&str>,
    text: &str,
) {
    let Ok(event) = serde_json::from_str::<RawEvent>(text) else {
        tracing::debug!("ignoring unparseable socket frame");
        return;
    };

    let subscribed =
        event.event == "notification" || user_channel.is_some_and(|name| name == event.event);
    if subscribed {
        let _ = tx.send(SocketMessage::Event(event));
    }
}
