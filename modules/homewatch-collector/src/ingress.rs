//! MQTT ingress: owns the subscription and feeds raw messages into the
//! pipeline's bounded queue.
//!
//! States: Disconnected → Connected (ConnAck) → Subscribed (SubAck) →
//! Draining (shutdown). Messages are only expected in Subscribed; the
//! broker delivers at-least-once (QoS 1), so duplicates are possible and
//! tolerated downstream.

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};
use uuid::Uuid;

use homewatch_common::TransportError;

/// One raw message off the bus: topic plus undecoded payload.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngressState {
    Disconnected,
    Connected,
    Subscribed,
    Draining,
}

pub struct MqttIngress {
    client: AsyncClient,
    eventloop: EventLoop,
    filter: String,
    state: IngressState,
}

impl MqttIngress {
    /// Set up the MQTT client. No network traffic happens until `run`.
    pub fn new(host: &str, port: u16, filter: String) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        let client_id = format!("homewatch_collector_{}", &suffix[..8]);
        let mut options = MqttOptions::new(client_id, host, port);
        options.set_keep_alive(std::time::Duration::from_secs(60));

        let (client, eventloop) = AsyncClient::new(options, 64);
        Self {
            client,
            eventloop,
            filter,
            state: IngressState::Disconnected,
        }
    }

    pub fn state(&self) -> IngressState {
        self.state
    }

    /// Drive the connection until shutdown. Connect and subscribe failures
    /// are fatal; the caller logs and exits non-zero.
    ///
    /// On shutdown the ingress flips to Draining and returns without
    /// accepting further messages; queued messages finish downstream.
    pub async fn run(
        mut self,
        queue: mpsc::Sender<InboundMessage>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), TransportError> {
        loop {
            tokio::select! {
                event = self.eventloop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        self.state = IngressState::Connected;
                        info!(filter = %self.filter, "Connected to MQTT broker, subscribing");
                        self.client
                            .subscribe(self.filter.as_str(), QoS::AtLeastOnce)
                            .await
                            .map_err(|e| TransportError::Subscribe {
                                filter: self.filter.clone(),
                                reason: e.to_string(),
                            })?;
                    }
                    Ok(Event::Incoming(Packet::SubAck(_))) => {
                        self.state = IngressState::Subscribed;
                        info!(filter = %self.filter, "Subscription acknowledged");
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        debug!(topic = %publish.topic, bytes = publish.payload.len(), "Message received");
                        let msg = InboundMessage {
                            topic: publish.topic.clone(),
                            payload: publish.payload.to_vec(),
                        };
                        if queue.send(msg).await.is_err() {
                            // Workers are gone; nothing left to deliver to.
                            return Ok(());
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        return Err(TransportError::Connection(e.to_string()));
                    }
                },
                _ = shutdown.changed() => {
                    self.state = IngressState::Draining;
                    info!("Shutdown signal received, draining");
                    let _ = self.client.disconnect().await;
                    return Ok(());
                }
            }
        }
    }
}
