use clap::Subcommand;
use friendblog_client::{
    FollowRequestCounter, Gateway, NotificationChannel, SessionStore, Signal, SignalBus,
    extract_notification_list,
};
use friendblog_core::{ClientConfig, Notification, NotificationKind};
use tokio::sync::broadcast::error::RecvError;

#[derive(Subcommand)]
pub enum NotifyAction {
    /// List your notifications
    List,
    /// Mark a notification as read
    MarkRead {
        /// Notification id
        id: String,
    },
}

fn render_title(notification: &Notification) -> String {
    let actor = notification.actor_name().unwrap_or("Someone");
    match &notification.kind {
        NotificationKind::Like => format!("❤️ {} liked your post", actor),
        NotificationKind::Comment => format!("💬 {} commented on your post", actor),
        NotificationKind::FollowRequest => format!("👤 {} sent you a follow request", actor),
        NotificationKind::FollowAccepted => format!("✅ {} accepted your follow request", actor),
        NotificationKind::Other(_) => "🔔 New notification".to_string(),
    }
}

fn print_notification(notification: &Notification) {
    let marker = if notification.read { " " } else { "●" };
    println!("{} {}", marker, render_title(notification));
    if let Some(message) = notification.message() {
        println!("    {}", message);
    }
    println!(
        "    id: {}  at: {}",
        notification.id,
        notification.created_at.format("%Y-%m-%d %H:%M:%S")
    );
}

pub async fn handle(gateway: &Gateway, action: NotifyAction) -> anyhow::Result<()> {
    match action {
        NotifyAction::List => {
            let raw = gateway.notifications_raw().await?;
            let notifications = extract_notification_list(&raw);
            let unread = notifications.iter().filter(|n| !n.read).count();
            println!(
                "🔔 Notifications ({} total, {} unread):",
                notifications.len(),
                unread
            );
            for notification in &notifications {
                print_notification(notification);
            }
        }
        NotifyAction::MarkRead { id } => {
            gateway.mark_notification_read(&id).await?;
            println!("✅ Marked {} as read", id);
        }
    }

    Ok(())
}

/// 挂起实时通道，把归并后的通知和连接状态打到终端
pub async fn listen(
    gateway: Gateway,
    session: SessionStore,
    bus: SignalBus,
    config: ClientConfig,
) -> anyhow::Result<()> {
    if !session.is_authenticated() {
        anyhow::bail!("login required before listening");
    }

    let counter = FollowRequestCounter::new(gateway.clone(), bus.clone(), &config);
    counter.spawn();

    let channel = NotificationChannel::new(gateway, session, bus.clone(), config);
    channel.activate().await?;

    println!("🎧 Listening for notifications... (Ctrl+C to stop)");
    println!(
        "   {} loaded, {} unread, {} follow requests pending",
        channel.notifications().len(),
        channel.unread_count(),
        counter.count()
    );

    let mut updates = channel.observe();
    let mut signals = bus.subscribe();

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(notification) => print_notification(&notification),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            signal = signals.recv() => match signal {
                Ok(Signal::SocketConnected) => {
                    println!("🔌 Connected to notification server");
                }
                Ok(Signal::SocketDisconnected) => {
                    println!("⚠️  Disconnected, badge falls back to polling");
                }
                Ok(Signal::FollowRequestIncrement) => {
                    println!("👤 New follow request ({} pending)", counter.count());
                }
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
        }
    }

    Ok(())
}
