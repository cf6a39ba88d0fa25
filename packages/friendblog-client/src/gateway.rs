use crate::bus::{Signal, SignalBus};
use crate::session::SessionStore;
use friendblog_core::*;
use friendblog_sdk::{ApiClient, SdkError, SdkResult};
use serde_json::Value;

/// 带会话的 API 网关：出站请求统一挂 token，
/// 401/403 转成进程内信号（对应原来的 axios 拦截器）。
#[derive(Clone)]
pub struct Gateway {
    client: ApiClient,
    session: SessionStore,
    bus: SignalBus,
}

impl Gateway {
    pub fn new(config: &ClientConfig, session: SessionStore, bus: SignalBus) -> Self {
        let client = ApiClient::new(&config.api_url).with_timeout(config.timeout());
        Self {
            client,
            session,
            bus,
        }
    }

    /// 未认证的裸客户端，登录/注册用
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn ws_url(&self) -> String {
        self.client.ws_url()
    }

    fn authed(&self) -> ApiClient {
        match self.session.token() {
            Some(token) => self.client.clone().with_token(&token),
            None => self.client.clone(),
        }
    }

    /// 401 清会话并广播未认证；403 广播禁止访问。状态不再额外变动。
    fn intercept<T>(&self, result: SdkResult<T>) -> SdkResult<T> {
        if let Err(SdkError::StatusError { status, message }) = &result {
            match status {
                401 => {
                    self.session.clear();
                    self.bus.publish(Signal::Unauthenticated);
                }
                403 => {
                    self.bus.publish(Signal::Forbidden {
                        message: message.clone(),
                    });
                }
                _ => {}
            }
        }
        result
    }

    // ---- auth ----

    pub async fn me(&self) -> SdkResult<User> {
        self.intercept(self.authed().me().await)
    }

    pub async fn search_users(&self, query: &str) -> SdkResult<Vec<User>> {
        self.intercept(self.authed().search_users(query).await)
    }

    // ---- profile ----

    pub async fn profile(&self, username: &str) -> SdkResult<User> {
        self.intercept(self.authed().get_profile(username).await)
    }

    pub async fn update_profile(&self, input: &UpdateProfileInput) -> SdkResult<Value> {
        self.intercept(self.authed().update_profile(input).await)
    }

    // ---- posts ----

    pub async fn posts(&self) -> SdkResult<Vec<Post>> {
        self.intercept(self.authed().get_posts().await)
    }

    pub async fn create_post(&self, input: &CreatePostInput) -> SdkResult<Value> {
        self.intercept(self.authed().create_post(input).await)
    }

    pub async fn update_post(&self, id: &str, content: &str) -> SdkResult<Value> {
        self.intercept(self.authed().update_post(id, content).await)
    }

    pub async fn delete_post(&self, id: &str) -> SdkResult<()> {
        self.intercept(self.authed().delete_post(id).await)
    }

    pub async fn like_post(&self, id: &str) -> SdkResult<()> {
        self.intercept(self.authed().like_post(id).await)
    }

    pub async fn unlike_post(&self, id: &str) -> SdkResult<()> {
        self.intercept(self.authed().unlike_post(id).await)
    }

    pub async fn comments(&self, post_id: &str) -> SdkResult<Vec<Comment>> {
        self.intercept(self.authed().get_comments(post_id).await)
    }

    pub async fn add_comment(&self, post_id: &str, content: &str) -> SdkResult<Value> {
        self.intercept(self.authed().add_comment(post_id, content).await)
    }

    // ---- follow ----

    pub async fn follow_requests_raw(&self) -> SdkResult<Value> {
        self.intercept(self.authed().get_follow_requests().await)
    }

    pub async fn pending_requests(&self) -> SdkResult<Vec<FollowRequest>> {
        self.intercept(self.authed().get_pending_requests().await)
    }

    pub async fn accept_request(&self, id: &str) -> SdkResult<()> {
        self.intercept(self.authed().accept_request(id).await)
    }

    pub async fn reject_request(&self, id: &str) -> SdkResult<()> {
        self.intercept(self.authed().reject_request(id).await)
    }

    pub async fn follow_user(&self, user_id: &str) -> SdkResult<()> {
        self.intercept(self.authed().follow_user(user_id).await)
    }

    pub async fn unfollow_user(&self, user_id: &str) -> SdkResult<()> {
        self.intercept(self.authed().unfollow_user(user_id).await)
    }

    pub async fn followers(&self, user_id: &str) -> SdkResult<Vec<User>> {
        self.intercept(self.authed().get_followers(user_id).await)
    }

    pub async fn following(&self, user_id: &str) -> SdkResult<Vec<User>> {
        self.intercept(self.authed().get_following(user_id).await)
    }

    // ---- notifications ----

    pub async fn notifications_raw(&self) -> SdkResult<Value> {
        self.intercept(self.authed().get_notifications().await)
    }

    pub async fn mark_notification_read(&self, id: &str) -> SdkResult<()> {
        self.intercept(self.authed().mark_notification_read(id).await)
    }

    pub async fn push_notification(&self, body: &Value) -> SdkResult<()> {
        self.intercept(self.authed().push_notification(body).await)
    }
}
