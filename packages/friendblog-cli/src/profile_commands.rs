use clap::Subcommand;
use friendblog_client::{Gateway, SessionStore};
use friendblog_core::UpdateProfileInput;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show a user's public profile
    Show {
        /// Username
        username: String,
    },
    /// Update your own profile
    Update {
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// New username
        #[arg(long)]
        username: Option<String>,
        /// Profile bio
        #[arg(long)]
        bio: Option<String>,
        /// Profile image URL
        #[arg(long)]
        image_url: Option<String>,
    },
}

pub async fn handle(
    gateway: &Gateway,
    session: &SessionStore,
    action: ProfileAction,
) -> anyhow::Result<()> {
    match action {
        ProfileAction::Show { username } => {
            let user = gateway.profile(&username).await?;
            println!("👤 {}", user.username.as_deref().unwrap_or(&username));
            if let Some(name) = &user.name {
                println!("   Name: {}", name);
            }
            if let Some(bio) = &user.bio {
                println!("   Bio: {}", bio);
            }
            if let Some(counts) = &user.counts {
                println!(
                    "   Followers: {}  Following: {}  Posts: {}",
                    counts.followers.unwrap_or(0),
                    counts.following.unwrap_or(0),
                    counts.posts.unwrap_or(0)
                );
            }
        }
        ProfileAction::Update {
            name,
            username,
            bio,
            image_url,
        } => {
            let input = UpdateProfileInput {
                name,
                username,
                bio,
                profile_image: image_url,
            };
            gateway.update_profile(&input).await?;
            // 和原来一样，更新之后重拉一遍本地缓存的资料
            session.refresh(gateway.client()).await?;
            println!("✅ Profile updated");
        }
    }

    Ok(())
}
