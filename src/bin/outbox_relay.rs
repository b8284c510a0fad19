//! Pushes pending outbox events to delivery workers over ZeroMQ.
//!
//! A PUSH socket holds messages until a worker has connected, and a send that
//! times out leaves the row pending, so an event is only marked `sent` once a
//! worker pipe accepted it.

use std::time::Duration;

use dotenvy::dotenv;

use ubigrowth::domain::outbox::OutboxEvent;
use ubigrowth::models::config::ServerConfig;
use ubigrowth::models::zmq::ZmqOutboxMessage;
use ubigrowth::repository::errors::RepositoryResult;
use ubigrowth::repository::{DieselRepository, OutboxDelivery, establish_connection_pool};

const BATCH_SIZE: usize = 100;
const IDLE_POLL: Duration = Duration::from_secs(2);
const SEND_TIMEOUT_MS: i32 = 5_000;

#[derive(Debug, PartialEq)]
enum Delivery {
    Sent,
    /// No worker took the message before the send timeout.
    NoWorker,
    Failed(String),
}

fn bind_push(
    context: &zmq::Context,
    endpoint: &str,
    send_timeout_ms: i32,
) -> zmq::Result<zmq::Socket> {
    let socket = context.socket(zmq::PUSH)?;
    socket.set_sndtimeo(send_timeout_ms)?;
    socket.bind(endpoint)?;
    Ok(socket)
}

fn push(socket: &zmq::Socket, event: &OutboxEvent) -> Delivery {
    let message = match serde_json::to_vec(&ZmqOutboxMessage::from(event)) {
        Ok(message) => message,
        Err(e) => return Delivery::Failed(e.to_string()),
    };
    match socket.send_multipart([event.topic.as_bytes(), message.as_slice()], 0) {
        Ok(()) => Delivery::Sent,
        Err(zmq::Error::EAGAIN) => Delivery::NoWorker,
        Err(e) => Delivery::Failed(e.to_string()),
    }
}

/// Pushes one batch and returns how many events were sent or marked failed.
///
/// The batch stops at the first event no worker accepts; it and everything
/// after it stay pending for the next round.
fn relay_batch<R>(repo: &R, socket: &zmq::Socket) -> RepositoryResult<usize>
where
    R: OutboxDelivery,
{
    let events = repo.list_pending_outbox(BATCH_SIZE)?;
    let mut handled = 0;

    for event in &events {
        match push(socket, event) {
            Delivery::Sent => {
                repo.mark_outbox_sent(event.id)?;
                log::info!("Pushed outbox event {} on {}", event.id, event.topic);
            }
            Delivery::NoWorker => {
                log::warn!(
                    "No outbox worker connected, {} events stay pending",
                    events.len() - handled
                );
                break;
            }
            Delivery::Failed(e) => {
                log::error!("Failed to push outbox event {}: {e}", event.id);
                repo.mark_outbox_failed(event.id, &e)?;
            }
        }
        handled += 1;
    }

    Ok(handled)
}

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let context = zmq::Context::new();
    let socket = match bind_push(&context, &server_config.zmq_outbox_push, SEND_TIMEOUT_MS) {
        Ok(socket) => socket,
        Err(e) => {
            log::error!(
                "Cannot bind zmq socket to {}: {e}",
                server_config.zmq_outbox_push
            );
            std::process::exit(1);
        }
    };

    log::info!("Starting outbox relay on {}", server_config.zmq_outbox_push);

    loop {
        match relay_batch(&repo, &socket) {
            Ok(0) => std::thread::sleep(IDLE_POLL),
            Ok(count) => log::debug!("Relayed {count} outbox events"),
            Err(e) => {
                log::error!("Outbox relay batch failed: {e}");
                std::thread::sleep(IDLE_POLL);
            }
        }
    }
}
