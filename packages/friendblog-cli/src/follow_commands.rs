use clap::Subcommand;
use friendblog_client::{FollowRequests, Gateway, SessionStore, SignalBus};
use friendblog_core::User;

#[derive(Subcommand)]
pub enum FollowAction {
    /// Search users by name
    Search {
        /// Query text
        query: String,
    },
    /// Send a follow request
    Follow {
        /// Target user id
        user_id: String,
    },
    /// Unfollow a user
    Unfollow {
        /// Target user id
        user_id: String,
    },
    /// List your followers
    Followers,
    /// List who you follow
    Following,
    /// List pending follow requests
    Requests,
    /// Accept a follow request
    Accept {
        /// Request id
        id: String,
    },
    /// Reject a follow request
    Reject {
        /// Request id
        id: String,
    },
}

fn print_user(user: &User) {
    println!(
        "👤 {} ({})",
        user.username.as_deref().unwrap_or("(no username)"),
        user.id.as_deref().unwrap_or("?")
    );
}

pub async fn handle(
    gateway: &Gateway,
    session: &SessionStore,
    bus: &SignalBus,
    action: FollowAction,
) -> anyhow::Result<()> {
    let requests = FollowRequests::new(gateway.clone(), bus.clone());

    match action {
        FollowAction::Search { query } => {
            let users = gateway.search_users(&query).await?;
            println!("🔍 {} users found:", users.len());
            for user in &users {
                print_user(user);
            }
        }
        FollowAction::Follow { user_id } => {
            gateway.follow_user(&user_id).await?;
            println!("✅ Follow request sent to {}", user_id);
        }
        FollowAction::Unfollow { user_id } => {
            gateway.unfollow_user(&user_id).await?;
            println!("✅ Unfollowed {}", user_id);
        }
        FollowAction::Followers => {
            let user_id = session
                .user_id()
                .ok_or_else(|| anyhow::anyhow!("login required"))?;
            let users = gateway.followers(&user_id).await?;
            println!("👥 Followers ({} total):", users.len());
            for user in &users {
                print_user(user);
            }
        }
        FollowAction::Following => {
            let user_id = session
                .user_id()
                .ok_or_else(|| anyhow::anyhow!("login required"))?;
            let users = gateway.following(&user_id).await?;
            println!("👥 Following ({} total):", users.len());
            for user in &users {
                print_user(user);
            }
        }
        FollowAction::Requests => {
            let pending = requests.pending().await?;
            println!("📨 Pending follow requests ({} total):", pending.len());
            for request in &pending {
                let from = request
                    .from_user
                    .as_ref()
                    .and_then(|user| user.username.as_deref())
                    .unwrap_or("unknown");
                println!("   {} — from {}", request.id, from);
            }
        }
        FollowAction::Accept { id } => {
            let pending = requests.pending().await?;
            let Some(request) = pending.iter().find(|r| r.id == id) else {
                anyhow::bail!("no pending request with id {}", id);
            };
            let actor = session.current_user().and_then(|user| user.username);
            requests.accept(request, actor.as_deref()).await?;
            println!("✅ Request {} accepted", id);
        }
        FollowAction::Reject { id } => {
            requests.reject(&id).await?;
            println!("🚫 Request {} rejected", id);
        }
    }

    Ok(())
}
