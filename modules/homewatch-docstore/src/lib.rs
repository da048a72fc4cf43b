//! MongoDB persistence: the full reading as one document per message.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc, Document};
use mongodb::{Client, Collection};

use homewatch_common::{DocumentStore, SensorReading};

pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    pub async fn connect(url: &str, db: &str, collection: &str) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(url).await?;
        Ok(Self {
            collection: client.database(db).collection(collection),
        })
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_reading(&self, reading: &SensorReading) -> anyhow::Result<()> {
        self.collection
            .insert_one(reading_document(reading, Utc::now())?)
            .await?;
        Ok(())
    }
}

/// Build the stored document: the reading fields plus `_mqtt_topic` and
/// `_received_at`, with the numeric `timestamp` normalized to an absolute
/// datetime.
pub fn reading_document(
    reading: &SensorReading,
    received_at: DateTime<Utc>,
) -> anyhow::Result<Document> {
    let value = bson::to_bson(&reading.value)?;
    Ok(doc! {
        "sensor_id": &reading.sensor_id,
        "type": reading.sensor_type.as_str(),
        "value": value,
        "timestamp": bson::DateTime::from_millis(reading.event_time().timestamp_millis()),
        "_mqtt_topic": &reading.topic,
        "_received_at": bson::DateTime::from_millis(received_at.timestamp_millis()),
    })
}
