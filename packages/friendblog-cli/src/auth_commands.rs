use clap::Subcommand;
use friendblog_client::{Gateway, SessionStore};
use friendblog_core::RegisterRequest;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Register a new account
    Register {
        /// Username
        username: String,
        /// Email
        email: String,
        /// Password
        password: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
    },
    /// Login with email and password
    Login {
        /// Email
        email: String,
        /// Password
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the current profile
    Me,
}

pub async fn handle(
    gateway: &Gateway,
    session: &SessionStore,
    action: AuthAction,
) -> anyhow::Result<()> {
    match action {
        AuthAction::Register {
            username,
            email,
            password,
            name,
        } => {
            let input = RegisterRequest {
                username,
                email,
                password,
                name,
            };
            match session.register(gateway.client(), &input).await {
                Ok(user) => {
                    let who = user
                        .and_then(|u| u.username)
                        .unwrap_or_else(|| "you".to_string());
                    println!("✅ Registered and logged in as {}", who);
                }
                Err(e) => {
                    eprintln!("❌ Registration failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        AuthAction::Login { email, password } => {
            match session.login(gateway.client(), &email, &password).await {
                Ok(user) => {
                    let who = user
                        .and_then(|u| u.username)
                        .unwrap_or_else(|| email.clone());
                    println!("✅ Logged in as {}", who);
                }
                Err(e) => {
                    eprintln!("❌ Login failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        AuthAction::Logout => {
            session.logout();
            println!("👋 Session cleared");
        }
        AuthAction::Me => {
            if !session.is_authenticated() {
                eprintln!("❌ Not logged in");
                std::process::exit(1);
            }
            match session.refresh(gateway.client()).await? {
                Some(user) => {
                    println!("👤 {}", user.username.as_deref().unwrap_or("(no username)"));
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
                None => {
                    eprintln!("❌ Could not load profile");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
