//! Outbound update notifications.

use std::future::Future;
use tokio::sync::broadcast;

use crate::error::{ServiceError, ServiceResult};

/// Receives one message per applied settings update
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str) -> impl Future<Output = ServiceResult<()>> + Send;
}

/// Text announced after an update is applied
pub fn update_message(tag: &str, players: u32, level: u8) -> String {
    format!("{tag} updated! - {players} players (Level {level})")
}

/// Fans messages out to in-process subscribers (the host's broadcast relay,
/// the log relay started by `main`).
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<String>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    async fn notify(&self, message: &str) -> ServiceResult<()> {
        self.tx
            .send(message.to_string())
            .map(|_| ())
            .map_err(|_| ServiceError::NotificationFailed {
                message: "no subscribers for update notifications".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_message_format() {
        assert_eq!(
            update_message("KOTH", 23, 3),
            "KOTH updated! - 23 players (Level 3)"
        );
    }

    #[tokio::test]
    async fn test_broadcast_delivers_to_subscribers() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();
        notifier.notify("hello").await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers_fails() {
        let notifier = BroadcastNotifier::new(8);
        assert!(matches!(
            notifier.notify("hello").await,
            Err(ServiceError::NotificationFailed { .. })
        ));
    }
}
