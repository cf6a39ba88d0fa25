use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout_seconds: u64,
    /// 断线后的自动重连上限
    pub reconnect_attempts: u32,
    pub reconnect_base_delay_ms: u64,
    pub reconnect_max_delay_ms: u64,
    /// 降级轮询的退避区间
    pub poll_base_delay_secs: u64,
    pub poll_max_delay_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            timeout_seconds: 30,
            reconnect_attempts: 5,
            reconnect_base_delay_ms: 1000,
            reconnect_max_delay_ms: 5000,
            poll_base_delay_secs: 15,
            poll_max_delay_secs: 120,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("FRIENDBLOG_API_URL") {
            if !url.is_empty() {
                config.api_url = url;
            }
        }
        if let Some(timeout) = env_u64("FRIENDBLOG_TIMEOUT_SECS") {
            config.timeout_seconds = timeout;
        }
        if let Some(attempts) = env_u64("FRIENDBLOG_RECONNECT_ATTEMPTS") {
            config.reconnect_attempts = attempts as u32;
        }
        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn reconnect_base_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_delay_ms)
    }

    pub fn reconnect_max_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_delay_ms)
    }

    pub fn poll_base_delay(&self) -> Duration {
        Duration::from_secs(self.poll_base_delay_secs)
    }

    pub fn poll_max_delay(&self) -> Duration {
        Duration::from_secs(self.poll_max_delay_secs)
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.parse().ok()
}
