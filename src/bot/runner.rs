//! Command loop
//!
//! Polls the transport, hands each command to its own task and drains
//! in-flight commands once shutdown is signalled.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::bot::command::ParsedCommand;
use crate::bot::handler::CommandHandler;
use crate::bot::transport::{ChatTransport, IncomingMessage};

pub async fn run_command_loop(
    transport: Arc<dyn ChatTransport>,
    handler: Arc<CommandHandler>,
    reconnect_delay: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let mut offset: Option<i64> = None;
    let mut in_flight = JoinSet::new();

    info!("🤖 Command loop started");

    while !*shutdown.borrow() {
        let polled = tokio::select! {
            _ = shutdown.changed() => break,
            polled = transport.poll(offset) => polled,
        };

        match polled {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);
                    if let Some(message) = update.message {
                        dispatch(&mut in_flight, &transport, &handler, message);
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Chat poll failed, retrying");
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = tokio::time::sleep(reconnect_delay) => {}
                }
            }
        }

        while let Some(joined) = in_flight.try_join_next() {
            log_join_result(joined);
        }
    }

    info!(pending = in_flight.len(), "Command loop stopping, draining commands");
    while let Some(joined) = in_flight.join_next().await {
        log_join_result(joined);
    }
    info!("Command loop stopped");

    Ok(())
}

fn dispatch(
    in_flight: &mut JoinSet<()>,
    transport: &Arc<dyn ChatTransport>,
    handler: &Arc<CommandHandler>,
    message: IncomingMessage,
) {
    let Some(parsed) = ParsedCommand::parse(&message.text) else {
        return;
    };

    info!(command = %parsed.name, chat_id = message.chat_id, "Command received");

    let transport = Arc::clone(transport);
    let handler = Arc::clone(handler);
    in_flight.spawn(async move {
        let reply = handler.handle(&parsed).await;
        if let Err(e) = transport.reply(message.chat_id, &reply).await {
            warn!(chat_id = message.chat_id, error = %e, "Failed to deliver reply");
        }
    });
}

fn log_join_result(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Command task panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::transport::Update;
    use crate::config::tests::sample_config;
    use crate::market::fetcher::MockListingSource;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    /// Serves scripted poll results, then idles until shutdown
    struct ScriptedTransport {
        polls: Mutex<VecDeque<anyhow::Result<Vec<Update>>>>,
        offsets: Mutex<Vec<Option<i64>>>,
        replies: Mutex<Vec<(i64, String)>>,
    }

    impl ScriptedTransport {
        fn new(polls: Vec<anyhow::Result<Vec<Update>>>) -> Self {
            Self {
                polls: Mutex::new(polls.into()),
                offsets: Mutex::new(Vec::new()),
                replies: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn poll(&self, offset: Option<i64>) -> anyhow::Result<Vec<Update>> {
            self.offsets.lock().await.push(offset);
            let next = self.polls.lock().await.pop_front();
            match next {
                Some(result) => result,
                None => {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(Vec::new())
                }
            }
        }

        async fn reply(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
            self.replies.lock().await.push((chat_id, text.to_string()));
            Ok(())
        }
    }

    fn message(update_id: i64, text: &str) -> Update {
        Update {
            update_id,
            message: Some(IncomingMessage {
                chat_id: 99,
                text: text.to_string(),
            }),
        }
    }

    #[tokio::test]
    async fn replies_to_commands_and_advances_offset() {
        let mut source = MockListingSource::new();
        source.expect_fetch_listings().never();
        let handler = Arc::new(CommandHandler::new(
            Arc::new(source),
            &sample_config().market,
        ));

        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(anyhow::anyhow!("network down")),
            Ok(vec![
                message(5, "/ayuda"),
                message(6, "just chatting"),
                Update {
                    update_id: 7,
                    message: None,
                },
            ]),
        ]));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_command_loop(
            transport.clone(),
            handler,
            Duration::from_millis(5),
            shutdown_rx,
        ));

        tokio::time::sleep(Duration::from_millis(150)).await;
        shutdown_tx.send(true).unwrap();
        task.await.unwrap().unwrap();

        let replies = transport.replies.lock().await;
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, 99);
        assert!(replies[0].1.contains("Comandos disponibles"));

        let offsets = transport.offsets.lock().await;
        assert_eq!(offsets[0], None);
        assert_eq!(offsets[1], None);
        assert_eq!(offsets[2], Some(8));
    }

    #[tokio::test]
    async fn market_failure_is_replied_and_loop_keeps_running() {
        let mut source = MockListingSource::new();
        source
            .expect_fetch_listings()
            .times(1)
            .returning(|_| Err(crate::error::MarketError::Schema("missing `data` field".into())));
        let handler = Arc::new(CommandHandler::new(
            Arc::new(source),
            &sample_config().market,
        ));

        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(vec![message(1, "/p2pbuy")]),
            Ok(vec![message(2, "/start")]),
        ]));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_command_loop(
            transport.clone(),
            handler,
            Duration::from_millis(5),
            shutdown_rx,
        ));

        tokio::time::sleep(Duration::from_millis(150)).await;
        shutdown_tx.send(true).unwrap();
        task.await.unwrap().unwrap();

        let replies = transport.replies.lock().await;
        assert_eq!(replies.len(), 2);
        assert!(replies
            .iter()
            .any(|(_, text)| text.contains("Respuesta inesperada")));
        assert!(replies.iter().any(|(_, text)| text.starts_with("👋")));
    }
}
