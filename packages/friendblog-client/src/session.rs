use anyhow::Result;
use friendblog_core::{RegisterRequest, User};
use friendblog_sdk::{ApiClient, SdkError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

const RATE_LIMIT_MESSAGE: &str = "Too many attempts. Please try again in a few minutes.";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SessionData {
    token: Option<String>,
    user: Option<User>,
}

/// 会话存储：token 和用户资料的唯一入口。
/// 其余组件一律通过这里取会话状态，不各自翻环境或磁盘。
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<SessionData>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// 从默认配置目录加载持久化的会话
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    pub fn load_from(path: Option<PathBuf>) -> Self {
        let data = path
            .as_ref()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|text| match serde_json::from_str::<SessionData>(&text) {
                Ok(data) => Some(data),
                Err(e) => {
                    tracing::debug!("ignoring corrupt session file: {}", e);
                    None
                }
            })
            .unwrap_or_default();

        Self {
            inner: Arc::new(Mutex::new(data)),
            path,
        }
    }

    /// 不落盘的会话，测试用
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionData::default())),
            path: None,
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("friendblog").join("session.json"))
    }

    pub fn token(&self) -> Option<String> {
        self.inner.lock().unwrap().token.clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.lock().unwrap().user.clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.inner.lock().unwrap().user.as_ref()?.id.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.lock().unwrap().token.is_some()
    }

    pub fn store(&self, token: String, user: Option<User>) {
        {
            let mut guard = self.inner.lock().unwrap();
            guard.token = Some(token);
            if user.is_some() {
                guard.user = user;
            }
        }
        self.persist();
    }

    /// 清除会话并删除持久化文件
    pub fn clear(&self) {
        {
            let mut guard = self.inner.lock().unwrap();
            *guard = SessionData::default();
        }
        if let Some(path) = &self.path {
            let _ = std::fs::remove_file(path);
        }
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let data = self.inner.lock().unwrap().clone();
        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let text = serde_json::to_string_pretty(&data)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            std::fs::write(path, text)
        })();
        if let Err(e) = result {
            tracing::warn!("failed to persist session: {}", e);
        }
    }

    // ---- 登录态变更 ----

    pub async fn login(
        &self,
        client: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<Option<User>> {
        let auth = client
            .login(email, password)
            .await
            .map_err(friendly_auth_error)?;
        self.store(auth.token, auth.user.clone());
        Ok(auth.user)
    }

    pub async fn register(
        &self,
        client: &ApiClient,
        input: &RegisterRequest,
    ) -> Result<Option<User>> {
        let auth = client.register(input).await.map_err(friendly_auth_error)?;
        self.store(auth.token, auth.user.clone());
        Ok(auth.user)
    }

    /// 重新拉取用户资料；失败只清掉内存里的资料，不动 token
    pub async fn refresh(&self, client: &ApiClient) -> Result<Option<User>> {
        let Some(token) = self.token() else {
            return Ok(None);
        };
        match client.clone().with_token(&token).me().await {
            Ok(user) => {
                {
                    let mut guard = self.inner.lock().unwrap();
                    guard.user = Some(user.clone());
                }
                self.persist();
                Ok(Some(user))
            }
            Err(e) => {
                tracing::debug!("profile refresh failed: {}", e);
                self.inner.lock().unwrap().user = None;
                Ok(None)
            }
        }
    }

    pub fn logout(&self) {
        self.clear();
    }
}

fn friendly_auth_error(err: SdkError) -> anyhow::Error {
    match &err {
        SdkError::StatusError { status: 429, .. } => anyhow::anyhow!(RATE_LIMIT_MESSAGE),
        SdkError::StatusError {
            message: Some(message),
            ..
        } => anyhow::anyhow!(message.clone()),
        _ => anyhow::Error::new(err),
    }
}
