use crate::gateway::Gateway;
use anyhow::Result;
use friendblog_core::{Comment, CreatePostInput, Post};
use std::sync::{Arc, Mutex};

/// 信息流状态：帖子 CRUD 加本地缓存
#[derive(Clone)]
pub struct PostFeed {
    gateway: Gateway,
    posts: Arc<Mutex<Vec<Post>>>,
}

impl PostFeed {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            posts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn cached(&self) -> Vec<Post> {
        self.posts.lock().unwrap().clone()
    }

    pub async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let posts = self.gateway.posts().await?;
        *self.posts.lock().unwrap() = posts.clone();
        Ok(posts)
    }

    pub async fn create_post(&self, input: &CreatePostInput) -> Result<()> {
        self.gateway.create_post(input).await?;
        self.fetch_posts().await?;
        Ok(())
    }

    pub async fn update_post(&self, id: &str, content: &str) -> Result<()> {
        self.gateway.update_post(id, content).await?;
        self.fetch_posts().await?;
        Ok(())
    }

    pub async fn delete_post(&self, id: &str) -> Result<()> {
        self.gateway.delete_post(id).await?;
        self.fetch_posts().await?;
        Ok(())
    }

    pub async fn like(&self, post_id: &str) -> Result<()> {
        self.set_liked(post_id, true).await
    }

    pub async fn unlike(&self, post_id: &str) -> Result<()> {
        self.set_liked(post_id, false).await
    }

    /// 点赞走乐观更新：先翻本地缓存，请求失败再回滚
    async fn set_liked(&self, post_id: &str, liked: bool) -> Result<()> {
        let flipped = apply_like(&mut self.posts.lock().unwrap(), post_id, liked);

        let result = if liked {
            self.gateway.like_post(post_id).await
        } else {
            self.gateway.unlike_post(post_id).await
        };

        if let Err(e) = result {
            if flipped {
                apply_like(&mut self.posts.lock().unwrap(), post_id, !liked);
            }
            return Err(e.into());
        }
        Ok(())
    }

    pub async fn comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        Ok(self.gateway.comments(post_id).await?)
    }

    pub async fn add_comment(&self, post_id: &str, content: &str) -> Result<()> {
        self.gateway.add_comment(post_id, content).await?;
        Ok(())
    }
}

/// 翻转点赞状态，返回是否真的发生了变化
fn apply_like(posts: &mut [Post], post_id: &str, liked: bool) -> bool {
    let Some(post) = posts.iter_mut().find(|p| p.id == post_id) else {
        return false;
    };
    if post.liked_by_me == liked {
        return false;
    }
    post.liked_by_me = liked;
    if liked {
        post.like_count += 1;
    } else {
        post.like_count = post.like_count.saturating_sub(1);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::SignalBus;
    use crate::session::SessionStore;
    use chrono::Utc;
    use friendblog_core::ClientConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn post(id: &str, liked: bool, likes: u64) -> Post {
        Post {
            id: id.to_string(),
            content: "hello".to_string(),
            author: None,
            visibility: Default::default(),
            image_url: None,
            image_public_id: None,
            like_count: likes,
            liked_by_me: liked,
            comment_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_like_flips_and_counts() {
        let mut posts = vec![post("p1", false, 2)];
        assert!(apply_like(&mut posts, "p1", true));
        assert!(posts[0].liked_by_me);
        assert_eq!(posts[0].like_count, 3);

        assert!(apply_like(&mut posts, "p1", false));
        assert_eq!(posts[0].like_count, 2);
    }

    #[test]
    fn test_apply_like_noop_when_already_in_state() {
        let mut posts = vec![post("p1", true, 5)];
        assert!(!apply_like(&mut posts, "p1", true));
        assert_eq!(posts[0].like_count, 5);
    }

    #[test]
    fn test_apply_like_unknown_post() {
        let mut posts = vec![post("p1", false, 0)];
        assert!(!apply_like(&mut posts, "missing", true));
    }

    #[test]
    fn test_apply_like_unlike_floors_at_zero() {
        let mut posts = vec![post("p1", true, 0)];
        assert!(apply_like(&mut posts, "p1", false));
        assert_eq!(posts[0].like_count, 0);
    }

    fn feed_for(api_url: &str) -> PostFeed {
        let config = ClientConfig {
            api_url: api_url.to_string(),
            ..Default::default()
        };
        let session = SessionStore::in_memory();
        session.store("jwt".to_string(), None);
        PostFeed::new(Gateway::new(&config, session, SignalBus::new()))
    }

    #[tokio::test]
    async fn test_like_reverts_on_request_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/posts/p1/like"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let feed = feed_for(&server.uri());
        *feed.posts.lock().unwrap() = vec![post("p1", false, 1)];

        assert!(feed.like("p1").await.is_err());
        let cached = feed.cached();
        assert!(!cached[0].liked_by_me);
        assert_eq!(cached[0].like_count, 1);
    }

    #[tokio::test]
    async fn test_like_sticks_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/posts/p1/like"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let feed = feed_for(&server.uri());
        *feed.posts.lock().unwrap() = vec![post("p1", false, 1)];

        feed.like("p1").await.unwrap();
        let cached = feed.cached();
        assert!(cached[0].liked_by_me);
        assert_eq!(cached[0].like_count, 2);
    }
}
