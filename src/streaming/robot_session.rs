use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use super::engine::SessionEvent;
use super::metrics::SessionMetrics;
use crate::api::{ChannelClient, JoinDetails, RobotFrame};
use crate::core::config::SessionConfig;

/// Websocket link to the interactive-control service.
///
/// Reports are forwarded to the engine as [`SessionEvent`]s and progress
/// frames from the engine are written back. Connection loss is retried with
/// exponential backoff.
pub struct RobotSession {
    config: SessionConfig,
    channels: ChannelClient,
    metrics: Arc<SessionMetrics>,
}

impl RobotSession {
    pub fn new(config: SessionConfig, metrics: Arc<SessionMetrics>) -> Self {
        let channels = ChannelClient::new(&config);
        Self {
            config,
            channels,
            metrics,
        }
    }

    pub async fn run(
        &self,
        events: mpsc::UnboundedSender<SessionEvent>,
        mut outbound: mpsc::UnboundedReceiver<RobotFrame>,
    ) -> Result<()> {
        let mut reconnect_count = 0;

        loop {
            match self.connect_once(&events, &mut outbound).await {
                Ok(()) => {
                    info!("Robot connection closed cleanly");
                    reconnect_count = 0;
                }
                Err(e) => {
                    error!("❌ Robot connection failed: {:#}", e);
                    reconnect_count += 1;
                }
            }

            if events.send(SessionEvent::Disconnected).is_err() {
                info!("Engine gone, stopping robot session");
                return Ok(());
            }

            if reconnect_count >= self.config.max_reconnect_attempts {
                error!("🛑 Max reconnect attempts reached");
                anyhow::bail!(
                    "gave up after {} failed connection attempts",
                    reconnect_count
                );
            }

            let delay = reconnect_delay(self.config.reconnect_delay_ms, reconnect_count);
            warn!(
                "⏳ Reconnecting in {}ms (attempt {}/{})",
                delay.as_millis(),
                reconnect_count,
                self.config.max_reconnect_attempts
            );
            self.metrics.increment_reconnects();
            time::sleep(delay).await;
        }
    }

    async fn endpoint(&self) -> Result<(u64, JoinDetails)> {
        let channel_id = self.channels.resolve_channel_id(&self.config.channel).await?;

        let details = match &self.config.robot_url {
            Some(url) => JoinDetails {
                address: url.clone(),
                key: self.config.password.clone(),
            },
            None => self.channels.join(channel_id).await?,
        };

        Ok((channel_id, details))
    }

    async fn connect_once(
        &self,
        events: &mpsc::UnboundedSender<SessionEvent>,
        outbound: &mut mpsc::UnboundedReceiver<RobotFrame>,
    ) -> Result<()> {
        let (channel_id, details) = self.endpoint().await?;
        let connect_start = Instant::now();

        let (ws_stream, _) = time::timeout(Duration::from_secs(10), connect_async(&details.address))
            .await
            .context("Connection timeout")?
            .context("Failed to connect")?;
        info!("🔗 Robot socket connected in {:?}", connect_start.elapsed());

        let (mut write, mut read) = ws_stream.split();

        let handshake = RobotFrame::Handshake {
            channel: channel_id,
            key: details.key,
        };
        write.send(Message::Text(serde_json::to_string(&handshake)?)).await?;
        debug!("📤 Handshake sent for channel {}", channel_id);

        // Anything queued while disconnected belongs to the old session.
        while outbound.try_recv().is_ok() {}

        let session_id = uuid::Uuid::new_v4().to_string();
        let mut connected = false;

        loop {
            tokio::select! {
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => match parse_frame(&text) {
                        Some(RobotFrame::HandshakeAck) if !connected => {
                            connected = true;
                            info!("🤝 Connected to channel {}", channel_id);
                            if events.send(SessionEvent::Connected { session_id: session_id.clone() }).is_err() {
                                return Ok(());
                            }
                        }
                        Some(RobotFrame::Error { message }) => {
                            anyhow::bail!("service reported an error: {}", message);
                        }
                        Some(frame) => {
                            if let Some(report) = frame.into_report() {
                                if !connected {
                                    debug!("Report before handshake ack, ignoring");
                                    continue;
                                }
                                if events.send(SessionEvent::Report(report)).is_err() {
                                    return Ok(());
                                }
                            }
                        }
                        None => self.metrics.increment_parse_errors(),
                    },
                    Some(Ok(Message::Ping(data))) => {
                        write.send(Message::Pong(data)).await?;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        warn!("🔌 Robot socket closed by server");
                        return Ok(());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e).context("websocket error"),
                },
                frame = outbound.recv() => match frame {
                    Some(frame) => {
                        write.send(Message::Text(serde_json::to_string(&frame)?)).await?;
                    }
                    None => {
                        info!("Engine stopped, closing robot socket");
                        write.send(Message::Close(None)).await.ok();
                        return Ok(());
                    }
                },
            }
        }
    }
}

fn parse_frame(text: &str) -> Option<RobotFrame> {
    match serde_json::from_str::<RobotFrame>(text) {
        Ok(frame) => Some(frame),
        Err(e) => {
            debug!("Unparseable frame ({}): {}", e, text);
            None
        }
    }
}

/// `base * 2^min(attempt, 5)`.
pub fn reconnect_delay(base_ms: u64, attempt: u32) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(2_u64.pow(attempt.min(5))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_caps_at_32x() {
        assert_eq!(reconnect_delay(1000, 0), Duration::from_millis(1000));
        assert_eq!(reconnect_delay(1000, 3), Duration::from_millis(8000));
        assert_eq!(reconnect_delay(1000, 5), Duration::from_millis(32000));
        assert_eq!(reconnect_delay(1000, 9), Duration::from_millis(32000));
    }

    #[test]
    fn test_parse_frame() {
        assert!(matches!(
            parse_frame(r#"{"type":"report","tactile":[],"quorum":0}"#),
            Some(RobotFrame::Report { .. })
        ));
        assert!(parse_frame("not json").is_none());
    }
}
