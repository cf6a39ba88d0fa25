use clap::Subcommand;
use friendblog_client::{Gateway, PostFeed};
use friendblog_core::{CreatePostInput, Post, Visibility};

#[derive(Subcommand)]
pub enum PostAction {
    /// List posts in your feed
    List,
    /// Create a post
    Create {
        /// Post content
        content: String,
        /// Make the post public instead of friends-only
        #[arg(long)]
        public: bool,
        /// Attached image URL
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Update a post
    Update {
        /// Post id
        id: String,
        /// New content
        content: String,
    },
    /// Delete a post
    Delete {
        /// Post id
        id: String,
    },
    /// Like a post
    Like {
        /// Post id
        id: String,
    },
    /// Remove your like from a post
    Unlike {
        /// Post id
        id: String,
    },
}

#[derive(Subcommand)]
pub enum CommentAction {
    /// List comments on a post
    List {
        /// Post id
        post_id: String,
    },
    /// Add a comment to a post
    Add {
        /// Post id
        post_id: String,
        /// Comment content
        content: String,
    },
}

fn print_post(post: &Post) {
    let author = post
        .author
        .as_ref()
        .and_then(|user| user.username.as_deref())
        .unwrap_or("unknown");
    let liked = if post.liked_by_me { "❤️" } else { "🤍" };
    println!("📝 {} — by {}", post.id, author);
    println!("   {}", post.content);
    println!(
        "   {} {} likes  💬 {} comments  {}",
        liked,
        post.like_count,
        post.comment_count,
        post.created_at.format("%Y-%m-%d %H:%M")
    );
}

pub async fn handle_posts(gateway: &Gateway, action: PostAction) -> anyhow::Result<()> {
    let feed = PostFeed::new(gateway.clone());

    match action {
        PostAction::List => {
            let posts = feed.fetch_posts().await?;
            println!("📬 Feed ({} posts):", posts.len());
            for post in &posts {
                print_post(post);
            }
        }
        PostAction::Create {
            content,
            public,
            image_url,
        } => {
            let input = CreatePostInput {
                content,
                visibility: if public {
                    Visibility::Public
                } else {
                    Visibility::Friends
                },
                image_url,
                image_public_id: None,
            };
            feed.create_post(&input).await?;
            println!("✅ Post created");
        }
        PostAction::Update { id, content } => {
            feed.update_post(&id, &content).await?;
            println!("✅ Post updated");
        }
        PostAction::Delete { id } => {
            feed.delete_post(&id).await?;
            println!("🗑️  Post deleted");
        }
        PostAction::Like { id } => {
            feed.fetch_posts().await?;
            feed.like(&id).await?;
            println!("❤️ Liked {}", id);
        }
        PostAction::Unlike { id } => {
            feed.fetch_posts().await?;
            feed.unlike(&id).await?;
            println!("🤍 Unliked {}", id);
        }
    }

    Ok(())
}

pub async fn handle_comments(gateway: &Gateway, action: CommentAction) -> anyhow::Result<()> {
    let feed = PostFeed::new(gateway.clone());

    match action {
        CommentAction::List { post_id } => {
            let comments = feed.comments(&post_id).await?;
            println!("💬 Comments ({} total):", comments.len());
            for comment in &comments {
                let author = comment
                    .author
                    .as_ref()
                    .and_then(|user| user.username.as_deref())
                    .unwrap_or("unknown");
                println!(
                    "   {} — {} ({})",
                    author,
                    comment.content,
                    comment.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        CommentAction::Add { post_id, content } => {
            feed.add_comment(&post_id, &content).await?;
            println!("✅ Comment added");
        }
    }

    Ok(())
}
