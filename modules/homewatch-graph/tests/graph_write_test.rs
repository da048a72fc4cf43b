//! Integration tests for the graph writer.
//!
//! These verify the merge-vs-append contract: topology nodes are idempotent
//! upserts, event nodes are always new.
//!
//! Requirements: Docker (for Neo4j via testcontainers)
//!
//! Run with: cargo test -p homewatch-graph --features test-utils --test graph_write_test

#![cfg(feature = "test-utils")]

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use homewatch_common::{Claim, DamageType, CLAIM_STATUS_PENDING};
use homewatch_graph::{migrate::migrate, query, GraphClient, GraphWriter};

async fn setup() -> (impl std::any::Any, GraphClient, GraphWriter) {
    let (container, client) = homewatch_graph::testutil::neo4j_container().await;
    migrate(&client).await.expect("migrations");
    let writer = GraphWriter::new(client.clone());
    (container, client, writer)
}

async fn count(client: &GraphClient, cypher: &str) -> i64 {
    let mut stream = client
        .inner()
        .execute(query(cypher))
        .await
        .expect("count query");
    let row = stream.next().await.expect("stream").expect("row");
    row.get::<i64>("c").expect("count column")
}

#[tokio::test]
async fn upserting_the_same_sensor_twice_leaves_one_node_of_each_kind() {
    let (_container, client, writer) = setup().await;

    for _ in 0..2 {
        writer
            .upsert_sensor_topology(
                "water_leak_001",
                "water_leak",
                "bathroom",
                "property_bathroom",
            )
            .await
            .expect("upsert");
    }

    assert_eq!(count(&client, "MATCH (n:Sensor) RETURN count(n) AS c").await, 1);
    assert_eq!(count(&client, "MATCH (n:Location) RETURN count(n) AS c").await, 1);
    assert_eq!(count(&client, "MATCH (n:Property) RETURN count(n) AS c").await, 1);
    assert_eq!(
        count(&client, "MATCH (:Sensor)-[r:LOCATED_IN]->(:Location) RETURN count(r) AS c").await,
        1
    );
    assert_eq!(
        count(&client, "MATCH (:Location)-[r:PART_OF]->(:Property) RETURN count(r) AS c").await,
        1
    );
}

#[tokio::test]
async fn appending_the_same_event_twice_yields_two_distinct_nodes() {
    let (_container, client, writer) = setup().await;

    writer
        .upsert_sensor_topology("smoke_hall_001", "smoke_detector", "hallway", "property_hallway")
        .await
        .expect("upsert");

    for _ in 0..2 {
        writer
            .record_sensor_event("smoke_hall_001", Utc::now(), "true")
            .await
            .expect("event");
    }

    assert_eq!(
        count(&client, "MATCH (n:SensorEvent) RETURN count(n) AS c").await,
        2
    );
    assert_eq!(
        count(&client, "MATCH (:Sensor)-[r:HAS_EVENT]->(:SensorEvent) RETURN count(r) AS c").await,
        2
    );
}

#[tokio::test]
async fn damage_events_link_from_the_triggering_sensor() {
    let (_container, client, writer) = setup().await;

    writer
        .upsert_sensor_topology("water_leak_001", "water_leak", "bathroom", "property_bathroom")
        .await
        .expect("upsert");

    let claim = Claim {
        claim_id: Uuid::new_v4(),
        sensor_id: "water_leak_001".to_string(),
        location: "bathroom".to_string(),
        damage_type: DamageType::WaterLeak,
        estimated_cost: Decimal::new(50_000, 2),
        description: "Small, contained leak, likely localized.".to_string(),
        status: CLAIM_STATUS_PENDING.to_string(),
        timestamp_event: Utc::now(),
        timestamp_filed: Utc::now(),
    };

    writer.record_damage_event(&claim).await.expect("damage event");
    writer.record_damage_event(&claim).await.expect("damage event again");

    // Append-only: a retriggered claim write creates a second node.
    assert_eq!(
        count(&client, "MATCH (n:DamageEvent) RETURN count(n) AS c").await,
        2
    );
    assert_eq!(
        count(&client, "MATCH (:Sensor)-[r:CAUSED]->(:DamageEvent) RETURN count(r) AS c").await,
        2
    );

    let mut stream = client
        .inner()
        .execute(
            query("MATCH (d:DamageEvent) RETURN d.type AS t, d.estimated_cost AS cost LIMIT 1"),
        )
        .await
        .expect("damage query");
    let row = stream.next().await.expect("stream").expect("row");
    assert_eq!(row.get::<String>("t").expect("type"), "water_leak");
    assert_eq!(row.get::<f64>("cost").expect("cost"), 500.0);
}

#[tokio::test]
async fn events_for_an_unknown_sensor_match_nothing() {
    let (_container, client, writer) = setup().await;

    writer
        .record_sensor_event("ghost_sensor", Utc::now(), "true")
        .await
        .expect("event write should not error");

    assert_eq!(
        count(&client, "MATCH (n:SensorEvent) RETURN count(n) AS c").await,
        0
    );
}
