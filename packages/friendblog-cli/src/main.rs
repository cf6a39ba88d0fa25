use clap::{Parser, Subcommand};
use friendblog_client::{
    Gateway, SessionStore, Signal, SignalBus, ToastLevel, ToastQueue,
};
use friendblog_core::ClientConfig;

mod auth_commands;
mod follow_commands;
mod notify_commands;
mod post_commands;
mod profile_commands;

#[derive(Parser)]
#[command(name = "friendblog-cli")]
#[command(about = "FriendBlog CLI client")]
struct Cli {
    /// Server base URL (defaults to FRIENDBLOG_API_URL)
    #[arg(short, long)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User authentication
    Auth {
        #[command(subcommand)]
        action: auth_commands::AuthAction,
    },
    /// Posts in your feed
    Posts {
        #[command(subcommand)]
        action: post_commands::PostAction,
    },
    /// Comments on a post
    Comments {
        #[command(subcommand)]
        action: post_commands::CommentAction,
    },
    /// User profiles
    Profile {
        #[command(subcommand)]
        action: profile_commands::ProfileAction,
    },
    /// Follow relations and requests
    Follow {
        #[command(subcommand)]
        action: follow_commands::FollowAction,
    },
    /// Notification inbox
    Notifications {
        #[command(subcommand)]
        action: notify_commands::NotifyAction,
    },
    /// Listen for real-time notifications
    Listen,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(server) = cli.server {
        config.api_url = server;
    }

    let session = SessionStore::load();
    let bus = SignalBus::new();
    let gateway = Gateway::new(&config, session.clone(), bus.clone());
    let toasts = ToastQueue::new();
    spawn_toast_feeder(&bus, toasts.clone());

    match cli.command {
        Commands::Auth { action } => {
            auth_commands::handle(&gateway, &session, action).await?;
        }
        Commands::Posts { action } => {
            post_commands::handle_posts(&gateway, action).await?;
        }
        Commands::Comments { action } => {
            post_commands::handle_comments(&gateway, action).await?;
        }
        Commands::Profile { action } => {
            profile_commands::handle(&gateway, &session, action).await?;
        }
        Commands::Follow { action } => {
            follow_commands::handle(&gateway, &session, &bus, action).await?;
        }
        Commands::Notifications { action } => {
            notify_commands::handle(&gateway, action).await?;
        }
        Commands::Listen => {
            notify_commands::listen(gateway, session, bus, config).await?;
        }
    }

    Ok(())
}

/// 把全局信号转成提示消息
fn spawn_toast_feeder(bus: &SignalBus, toasts: ToastQueue) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(Signal::Unauthenticated) => {
                    toasts.push("Session expired, please login again.", ToastLevel::Error);
                    eprintln!("🔒 Session expired, please login again.");
                }
                Ok(Signal::Forbidden { message }) => {
                    let text = message.unwrap_or_else(|| "Not authorized.".to_string());
                    toasts.push(text.clone(), ToastLevel::Error);
                    eprintln!("⛔ {}", text);
                }
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let args = vec![
            "friendblog-cli",
            "--server",
            "http://localhost:8080",
            "posts",
            "list",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.server.as_deref(), Some("http://localhost:8080"));
        match cli.command {
            Commands::Posts { .. } => {} // Expected
            _ => panic!("Expected Posts command"),
        }
    }

    #[test]
    fn test_cli_server_defaults_to_env() {
        let args = vec!["friendblog-cli", "listen"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert!(cli.server.is_none());
        match cli.command {
            Commands::Listen => {} // Expected
            _ => panic!("Expected Listen command"),
        }
    }

    #[test]
    fn test_login_command_parsing() {
        let args = vec![
            "friendblog-cli",
            "auth",
            "login",
            "alice@example.com",
            "hunter2",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Auth {
                action: auth_commands::AuthAction::Login { email, password },
            } => {
                assert_eq!(email, "alice@example.com");
                assert_eq!(password, "hunter2");
            }
            _ => panic!("Expected Auth Login command"),
        }
    }

    #[test]
    fn test_create_post_optional_fields() {
        let args = vec!["friendblog-cli", "posts", "create", "Hello world"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Posts {
                action:
                    post_commands::PostAction::Create {
                        content,
                        public,
                        image_url,
                    },
            } => {
                assert_eq!(content, "Hello world");
                assert!(!public);
                assert!(image_url.is_none());
            }
            _ => panic!("Expected Posts Create command"),
        }
    }

    #[test]
    fn test_profile_update_takes_only_changed_fields() {
        let args = vec!["friendblog-cli", "profile", "update", "--bio", "hello"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Profile {
                action:
                    profile_commands::ProfileAction::Update {
                        name,
                        username,
                        bio,
                        image_url,
                    },
            } => {
                assert_eq!(bio.as_deref(), Some("hello"));
                assert!(name.is_none());
                assert!(username.is_none());
                assert!(image_url.is_none());
            }
            _ => panic!("Expected Profile Update command"),
        }
    }

    #[test]
    fn test_all_commands_exist() {
        let commands = vec![
            vec!["friendblog-cli", "auth", "me"],
            vec!["friendblog-cli", "auth", "logout"],
            vec!["friendblog-cli", "posts", "list"],
            vec!["friendblog-cli", "posts", "like", "p1"],
            vec!["friendblog-cli", "comments", "list", "p1"],
            vec!["friendblog-cli", "comments", "add", "p1", "nice"],
            vec!["friendblog-cli", "profile", "show", "alice"],
            vec!["friendblog-cli", "profile", "update", "--bio", "hello"],
            vec!["friendblog-cli", "follow", "requests"],
            vec!["friendblog-cli", "follow", "accept", "r1"],
            vec!["friendblog-cli", "notifications", "list"],
            vec!["friendblog-cli", "notifications", "mark-read", "n1"],
            vec!["friendblog-cli", "listen"],
        ];

        for args in commands {
            let result = Cli::try_parse_from(args.clone());
            assert!(result.is_ok(), "Failed to parse: {:?}", args);
        }
    }
}
