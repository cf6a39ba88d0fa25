use crate::error::*;
use friendblog_core::*;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

/// HTTP 网关客户端：统一挂 Bearer token，统一错误形状
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    pub base_url: String,
    pub timeout: Duration,
    pub token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            token: None,
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn set_token(&mut self, token: &str) {
        self.token = Some(token.to_string());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 对应的 WebSocket 入口；只替换 scheme，不动主机名
    pub fn ws_url(&self) -> String {
        format!("{}/ws", self.base_url.replacen("http", "ws", 1))
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
    ) -> SdkResult<Value> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = self.http.request(method, url.as_str()).timeout(self.timeout);

        // 添加Authorization头如果有token
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let value: Value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        if !status.is_success() {
            let message = value
                .get("message")
                .or_else(|| value.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string);
            return Err(SdkError::StatusError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(value)
    }

    async fn get(&self, path: &str) -> SdkResult<Value> {
        self.request(Method::GET, path, None, None).await
    }

    async fn post(&self, path: &str, body: Option<&Value>) -> SdkResult<Value> {
        self.request(Method::POST, path, None, body).await
    }

    fn decode<T: DeserializeOwned>(value: Value) -> SdkResult<T> {
        Ok(serde_json::from_value(value)?)
    }

    // ---- auth ----

    pub async fn login(&self, email: &str, password: &str) -> SdkResult<AuthResponse> {
        let body = json!({ "email": email, "password": password });
        Self::decode(self.post("api/auth/login", Some(&body)).await?)
    }

    pub async fn register(&self, input: &RegisterRequest) -> SdkResult<AuthResponse> {
        let body = serde_json::to_value(input)?;
        Self::decode(self.post("api/auth/register", Some(&body)).await?)
    }

    pub async fn me(&self) -> SdkResult<User> {
        Self::decode(self.get("api/auth/me").await?)
    }

    pub async fn search_users(&self, query: &str) -> SdkResult<Vec<User>> {
        let value = self
            .request(Method::GET, "api/auth/users", Some(&[("q", query)]), None)
            .await?;
        Self::decode(value)
    }

    // ---- profile ----

    /// 公开主页按用户名取；资料端点挂在根路径下，没有 api 前缀
    pub async fn get_profile(&self, username: &str) -> SdkResult<User> {
        Self::decode(self.get(&format!("users/{}", username)).await?)
    }

    pub async fn update_profile(&self, input: &UpdateProfileInput) -> SdkResult<Value> {
        let body = serde_json::to_value(input)?;
        self.request(Method::PUT, "users/me", None, Some(&body))
            .await
    }

    // ---- posts ----

    pub async fn get_posts(&self) -> SdkResult<Vec<Post>> {
        Self::decode(self.get("api/posts").await?)
    }

    pub async fn create_post(&self, input: &CreatePostInput) -> SdkResult<Value> {
        let body = serde_json::to_value(input)?;
        self.post("api/posts", Some(&body)).await
    }

    pub async fn update_post(&self, id: &str, content: &str) -> SdkResult<Value> {
        let body = json!({ "content": content });
        self.request(
            Method::PUT,
            &format!("api/posts/{}", id),
            None,
            Some(&body),
        )
        .await
    }

    pub async fn delete_post(&self, id: &str) -> SdkResult<()> {
        self.request(Method::DELETE, &format!("api/posts/{}", id), None, None)
            .await?;
        Ok(())
    }

    pub async fn like_post(&self, id: &str) -> SdkResult<()> {
        self.post(&format!("api/posts/{}/like", id), None).await?;
        Ok(())
    }

    pub async fn unlike_post(&self, id: &str) -> SdkResult<()> {
        self.request(
            Method::DELETE,
            &format!("api/posts/{}/like", id),
            None,
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn get_comments(&self, post_id: &str) -> SdkResult<Vec<Comment>> {
        Self::decode(self.get(&format!("api/posts/{}/comments", post_id)).await?)
    }

    pub async fn add_comment(&self, post_id: &str, content: &str) -> SdkResult<Value> {
        let body = json!({ "content": content });
        self.post(&format!("api/posts/{}/comments", post_id), Some(&body))
            .await
    }

    // ---- follow ----

    /// 原始响应：徽标计数端点，形状由上层防御性解析
    pub async fn get_follow_requests(&self) -> SdkResult<Value> {
        self.get("api/follow/requests").await
    }

    pub async fn get_pending_requests(&self) -> SdkResult<Vec<FollowRequest>> {
        Self::decode(self.get("api/follow/requests/pending").await?)
    }

    pub async fn accept_request(&self, id: &str) -> SdkResult<()> {
        self.post(&format!("api/follow/requests/{}/accept", id), None)
            .await?;
        Ok(())
    }

    pub async fn reject_request(&self, id: &str) -> SdkResult<()> {
        self.post(&format!("api/follow/requests/{}/reject", id), None)
            .await?;
        Ok(())
    }

    pub async fn follow_user(&self, user_id: &str) -> SdkResult<()> {
        self.post(&format!("api/follow/{}", user_id), None).await?;
        Ok(())
    }

    pub async fn unfollow_user(&self, user_id: &str) -> SdkResult<()> {
        self.request(Method::DELETE, &format!("api/follow/{}", user_id), None, None)
            .await?;
        Ok(())
    }

    pub async fn get_followers(&self, user_id: &str) -> SdkResult<Vec<User>> {
        Self::decode(self.get(&format!("api/follow/{}/followers", user_id)).await?)
    }

    pub async fn get_following(&self, user_id: &str) -> SdkResult<Vec<User>> {
        Self::decode(self.get(&format!("api/follow/{}/following", user_id)).await?)
    }

    // ---- notifications ----

    /// 原始响应：列表可能裸露也可能嵌套，形状由上层防御性解析
    pub async fn get_notifications(&self) -> SdkResult<Value> {
        self.get("api/notifications").await
    }

    pub async fn mark_notification_read(&self, id: &str) -> SdkResult<()> {
        self.post(&format!("api/notifications/{}/read", id), None)
            .await?;
        Ok(())
    }

    pub async fn push_notification(&self, body: &Value) -> SdkResult<()> {
        self.post("api/notifications", Some(body)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_client_creation() {
        let client = ApiClient::new("http://localhost:5000");
        assert_eq!(client.base_url, "http://localhost:5000");
    }

    #[tokio::test]
    async fn test_client_url_trimming() {
        let client = ApiClient::new("http://localhost:5000/");
        assert_eq!(client.base_url, "http://localhost:5000");

        // trim_end_matches removes all trailing slashes
        let client = ApiClient::new("http://localhost:5000//");
        assert_eq!(client.base_url, "http://localhost:5000");
    }

    #[tokio::test]
    async fn test_client_with_timeout() {
        let client = ApiClient::new("http://localhost:5000")
            .with_timeout(Duration::from_secs(60));
        assert_eq!(client.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_ws_url_scheme_swap() {
        let client = ApiClient::new("http://localhost:5000");
        assert_eq!(client.ws_url(), "ws://localhost:5000/ws");

        let client = ApiClient::new("https://blog.example.com");
        assert_eq!(client.ws_url(), "wss://blog.example.com/ws");
    }

    #[test]
    fn test_ws_url_leaves_http_in_host_alone() {
        // 只有 scheme 前缀被替换，主机名里的 "http" 保持原样
        let client = ApiClient::new("https://httpblog.example.com");
        assert_eq!(client.ws_url(), "wss://httpblog.example.com/ws");
    }

    #[tokio::test]
    async fn test_bearer_token_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/posts"))
            .and(header("Authorization", "Bearer secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).with_token("secret-token");
        let posts = client.get_posts().await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_profile_endpoints_live_at_root_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/alice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "u1",
                "username": "alice",
                "bio": "hi"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).with_token("t");
        let profile = client.get_profile("alice").await.unwrap();
        assert_eq!(profile.bio.as_deref(), Some("hi"));

        let input = friendblog_core::UpdateProfileInput {
            bio: Some("new bio".to_string()),
            ..Default::default()
        };
        client.update_profile(&input).await.unwrap();
    }

    #[tokio::test]
    async fn test_status_error_carries_body_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(
                ResponseTemplate::new(403)
                    .set_body_json(serde_json::json!({ "message": "not allowed" })),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).with_token("t");
        let err = client.me().await.unwrap_err();
        match err {
            SdkError::StatusError { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message.as_deref(), Some("not allowed"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_status_error_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/notifications/n1/read"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri());
        let err = client.mark_notification_read("n1").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_login_decodes_token_and_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "jwt-token",
                "user": { "id": "u1", "username": "alice" }
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri());
        let auth = client.login("alice@example.com", "hunter2").await.unwrap();
        assert_eq!(auth.token, "jwt-token");
        assert_eq!(auth.user.unwrap().username.as_deref(), Some("alice"));
    }
}
