//! Scripted sensor-data generator: publishes a fixed damage scenario over
//! MQTT for exercising a running collector. Not part of the runtime
//! pipeline.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use rand::Rng;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use homewatch_common::Config;

struct Publisher {
    client: AsyncClient,
    topic_root: String,
}

impl Publisher {
    async fn publish(&self, sensor_id: &str, sensor_type: &str, value: Value, location: &str) {
        let topic = format!("{}/{}/{}/sensor", self.topic_root, location, sensor_id);
        let payload = json!({
            "sensor_id": sensor_id,
            "type": sensor_type,
            "value": value,
            "timestamp": Utc::now().timestamp_millis() as f64 / 1000.0,
        });
        info!(topic = %topic, payload = %payload, "Publishing");
        if let Err(e) = self
            .client
            .publish(topic.as_str(), QoS::AtLeastOnce, false, payload.to_string())
            .await
        {
            warn!(topic = %topic, error = %e, "Publish failed");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("simulate=info".parse()?))
        .init();

    let config = Config::simulator_from_env();
    info!(
        broker = %format!("{}:{}", config.mqtt_host, config.mqtt_port),
        "Starting sensor data simulation"
    );

    let mut options = MqttOptions::new("homewatch_simulator", &config.mqtt_host, config.mqtt_port);
    options.set_keep_alive(Duration::from_secs(30));
    let (client, mut eventloop) = AsyncClient::new(options, 16);

    // The event loop must be polled for publishes to go out.
    let driver = tokio::spawn(async move { while eventloop.poll().await.is_ok() {} });

    let publisher = Publisher {
        client: client.clone(),
        topic_root: config.topic_root.clone(),
    };

    // Quiet baseline.
    publisher
        .publish("temp_kitchen_001", "temperature", json!(22.5), "kitchen")
        .await;
    pause(1).await;
    publisher
        .publish("humidity_bathroom_001", "humidity", json!(65.2), "bathroom")
        .await;
    pause(1).await;
    publisher
        .publish("smoke_hall_001", "smoke_detector", json!(false), "hallway")
        .await;
    pause(1).await;
    publisher
        .publish("door_front_001", "door_contact", json!(false), "entryway")
        .await;
    pause(1).await;

    info!("Minor water leak in bathroom");
    publisher
        .publish("water_leak_001", "water_leak", json!(true), "bathroom")
        .await;
    pause(2).await;

    info!("Temperature rising in kitchen");
    for temp in [35.0, 45.0] {
        publisher
            .publish("temp_kitchen_001", "temperature", json!(temp), "kitchen")
            .await;
        pause(1).await;
    }
    pause(1).await;

    info!("Fire detected in hallway");
    publisher
        .publish("smoke_hall_001", "smoke_detector", json!(true), "hallway")
        .await;
    pause(1).await;
    publisher
        .publish("temp_hall_001", "temperature", json!(105.0), "hallway")
        .await;
    pause(2).await;

    info!("Medium structural stress in basement");
    publisher
        .publish(
            "struct_basement_001",
            "structural_stress",
            json!({"level": "medium", "vibration_hz": 5.2}),
            "basement",
        )
        .await;
    pause(2).await;

    info!("Re-triggering water leak");
    publisher
        .publish("water_leak_001", "water_leak", json!(true), "bathroom")
        .await;
    pause(2).await;

    info!("High structural stress in basement");
    publisher
        .publish(
            "struct_basement_001",
            "structural_stress",
            json!({"level": "high", "vibration_hz": 8.1}),
            "basement",
        )
        .await;
    pause(2).await;

    info!("Random temperature fluctuations in bedroom");
    for _ in 0..5 {
        let (temp, sensor, delay_ms) = {
            let mut rng = rand::rng();
            (
                (rng.random_range(18.0..26.0_f64) * 10.0).round() / 10.0,
                format!("temp_bedroom_00{}", rng.random_range(1..=2)),
                rng.random_range(500..1500u64),
            )
        };
        publisher
            .publish(&sensor, "temperature", json!(temp), "bedroom")
            .await;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    // Give the event loop a moment to flush, then hang up.
    pause(1).await;
    client.disconnect().await?;
    let _ = driver.await;

    info!("Sensor data simulation complete");
    Ok(())
}

async fn pause(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}
