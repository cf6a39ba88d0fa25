use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod config;

pub use config::ClientConfig;

/// 通知类型标签（开放集合，未知标签保留原文）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NotificationKind {
    Like,
    Comment,
    FollowRequest,
    FollowAccepted,
    Other(String),
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
            NotificationKind::FollowRequest => "follow_request",
            NotificationKind::FollowAccepted => "follow_accepted",
            NotificationKind::Other(tag) => tag,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, NotificationKind::Other(_))
    }

    /// 规范化通知类型：
    /// 识别的标签原样保留；否则按固定顺序探测 payload 里的备用字段；
    /// 全部落空时标记为 "unspecified"，通知本身绝不丢弃。
    pub fn normalize(declared: &NotificationKind, data: &Value) -> NotificationKind {
        if declared.is_recognized() {
            return declared.clone();
        }
        for key in ["type", "kind", "event"] {
            if let Some(tag) = data.get(key).and_then(Value::as_str) {
                if !tag.is_empty() {
                    return NotificationKind::from(tag.to_string());
                }
            }
        }
        NotificationKind::Other("unspecified".to_string())
    }
}

impl From<String> for NotificationKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "like" => NotificationKind::Like,
            "comment" => NotificationKind::Comment,
            // 旧版后端用连字符拼写
            "follow_request" | "follow-request" => NotificationKind::FollowRequest,
            "follow_accepted" | "follow-accepted" => NotificationKind::FollowAccepted,
            _ => NotificationKind::Other(tag),
        }
    }
}

impl From<NotificationKind> for String {
    fn from(kind: NotificationKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// 通知数据结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub actor_id: String,
    #[serde(rename = "type", default = "unspecified_kind")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub read: bool,
    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
}

fn unspecified_kind() -> NotificationKind {
    NotificationKind::Other(String::new())
}

impl Notification {
    /// payload 里可能带的展示文案
    pub fn message(&self) -> Option<&str> {
        match &self.data {
            Value::String(text) => Some(text),
            Value::Object(map) => map.get("message").and_then(Value::as_str),
            _ => None,
        }
    }

    pub fn actor_name(&self) -> Option<&str> {
        self.data.get("actorName").and_then(Value::as_str)
    }
}

/// 用户资料
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(rename = "_count", default)]
    pub counts: Option<UserCounts>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserCounts {
    #[serde(default)]
    pub followers: Option<u64>,
    #[serde(default)]
    pub following: Option<u64>,
    #[serde(default)]
    pub posts: Option<u64>,
}

/// 帖子可见范围
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Friends,
    Public,
}

/// 帖子数据结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_public_id: Option<String>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub liked_by_me: bool,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// 评论数据结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub post_id: String,
    #[serde(default)]
    pub author: Option<User>,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// 待处理的关注请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub id: String,
    #[serde(default)]
    pub from_user: Option<User>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// 发帖输入参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    pub content: String,
    pub visibility: Visibility,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_public_id: Option<String>,
}

/// 个人资料更新参数，缺省字段不提交
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// 登录/注册响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<User>,
}

/// WebSocket 事件帧
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_wire_tags_round_trip() {
        for (tag, kind) in [
            ("like", NotificationKind::Like),
            ("comment", NotificationKind::Comment),
            ("follow_request", NotificationKind::FollowRequest),
            ("follow_accepted", NotificationKind::FollowAccepted),
        ] {
            assert_eq!(NotificationKind::from(tag.to_string()), kind);
            assert_eq!(kind.as_str(), tag);
        }
    }

    #[test]
    fn test_kind_legacy_hyphen_spelling() {
        assert_eq!(
            NotificationKind::from("follow-request".to_string()),
            NotificationKind::FollowRequest
        );
        assert_eq!(
            NotificationKind::from("follow-accepted".to_string()),
            NotificationKind::FollowAccepted
        );
    }

    #[test]
    fn test_kind_unknown_tag_preserved() {
        let kind = NotificationKind::from("mention".to_string());
        assert_eq!(kind, NotificationKind::Other("mention".to_string()));
        assert_eq!(kind.as_str(), "mention");
    }

    #[test]
    fn test_normalize_recognized_is_identity() {
        let data = json!({ "type": "comment" });
        let normalized = NotificationKind::normalize(&NotificationKind::Like, &data);
        assert_eq!(normalized, NotificationKind::Like);
    }

    #[test]
    fn test_normalize_fallback_priority_order() {
        let declared = NotificationKind::Other(String::new());
        let data = json!({ "kind": "comment", "event": "like" });
        assert_eq!(
            NotificationKind::normalize(&declared, &data),
            NotificationKind::Comment
        );

        let data = json!({ "type": "like", "kind": "comment" });
        assert_eq!(
            NotificationKind::normalize(&declared, &data),
            NotificationKind::Like
        );
    }

    #[test]
    fn test_normalize_unrecognized_declared_probes_payload() {
        let declared = NotificationKind::Other("bogus".to_string());
        let data = json!({ "type": "follow_request" });
        assert_eq!(
            NotificationKind::normalize(&declared, &data),
            NotificationKind::FollowRequest
        );
    }

    #[test]
    fn test_normalize_unspecified_floor() {
        let declared = NotificationKind::Other(String::new());
        let data = json!({ "message": "hello" });
        assert_eq!(
            NotificationKind::normalize(&declared, &data),
            NotificationKind::Other("unspecified".to_string())
        );
    }

    #[test]
    fn test_notification_deserialize_full_shape() {
        let notif: Notification = serde_json::from_value(json!({
            "id": "n1",
            "userId": "u1",
            "actorId": "u2",
            "type": "like",
            "data": { "actorName": "alice" },
            "read": false,
            "createdAt": "2024-05-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(notif.id, "n1");
        assert_eq!(notif.kind, NotificationKind::Like);
        assert_eq!(notif.actor_name(), Some("alice"));
        assert!(!notif.read);
    }

    #[test]
    fn test_notification_tolerates_missing_fields() {
        let notif: Notification = serde_json::from_value(json!({ "id": "n2" })).unwrap();
        assert_eq!(notif.kind, NotificationKind::Other(String::new()));
        assert!(!notif.read);
        assert!(notif.data.is_null());
    }

    #[test]
    fn test_notification_message_from_string_payload() {
        let notif: Notification =
            serde_json::from_value(json!({ "id": "n3", "data": "plain text" })).unwrap();
        assert_eq!(notif.message(), Some("plain text"));
    }

    #[test]
    fn test_user_profile_counts() {
        let user: User = serde_json::from_value(json!({
            "id": "u1",
            "username": "alice",
            "_count": { "followers": 3, "following": 5, "posts": 7 }
        }))
        .unwrap();

        let counts = user.counts.unwrap();
        assert_eq!(counts.followers, Some(3));
        assert_eq!(counts.posts, Some(7));
    }

    #[test]
    fn test_update_profile_skips_unset_fields() {
        let input = UpdateProfileInput {
            bio: Some("hello".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({ "bio": "hello" })
        );

        let input = UpdateProfileInput {
            name: Some("Alice".to_string()),
            profile_image: Some("https://img.example/a.png".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["profileImage"], json!("https://img.example/a.png"));
        assert!(value.get("username").is_none());
    }

    #[test]
    fn test_visibility_wire_format() {
        assert_eq!(
            serde_json::to_value(Visibility::Friends).unwrap(),
            json!("friends")
        );
        assert_eq!(
            serde_json::to_value(Visibility::Public).unwrap(),
            json!("public")
        );
    }
}
