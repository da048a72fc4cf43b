use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use homewatch_collector::{ClaimDispatcher, Fanout, MqttIngress, Pipeline, WritePolicy};
use homewatch_common::{subscription_filter, Config};
use homewatch_docstore::MongoStore;
use homewatch_graph::{migrate::migrate, GraphClient, GraphWriter};
use homewatch_relational::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("homewatch=info".parse()?))
        .init();

    info!("Homewatch collector starting...");

    let config = Config::from_env();
    config.log_redacted();

    // Connect the three stores up front; a store that is down at boot is a
    // startup failure, not an acceptable-loss runtime failure.
    let relational = PgStore::connect(
        &config.pg_url(),
        config.sensor_table.clone(),
        config.claims_table.clone(),
    )
    .await?;
    relational.ensure_schema().await?;

    let document = MongoStore::connect(
        &config.mongo_url(),
        &config.mongo_db,
        &config.mongo_collection,
    )
    .await?;

    let graph_client = GraphClient::connect(
        &config.neo4j_uri,
        &config.neo4j_user,
        &config.neo4j_password,
    )
    .await?;
    migrate(&graph_client).await?;
    let graph = GraphWriter::new(graph_client);

    info!("All stores connected");

    let fanout = Arc::new(Fanout::new(
        Arc::new(relational),
        Arc::new(document),
        Arc::new(graph),
        WritePolicy {
            timeout: config.store_write_timeout,
            retries: config.store_write_retries,
        },
    ));
    let dispatcher = Arc::new(ClaimDispatcher::new(fanout.clone(), config.claim_suppress));
    let pipeline = Arc::new(Pipeline::new(fanout, dispatcher));
    let pool = pipeline.spawn_workers(config.workers, config.queue_depth);

    // Transport → queue → router → per-sensor worker queues.
    let (queue_tx, mut queue_rx) = mpsc::channel(config.queue_depth.max(1));
    let router = tokio::spawn(async move {
        while let Some(msg) = queue_rx.recv().await {
            pool.submit(msg).await;
        }
        pool.drain().await;
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let ingress = MqttIngress::new(
        &config.mqtt_host,
        config.mqtt_port,
        subscription_filter(&config.topic_root),
    );
    let run_result = ingress.run(queue_tx, shutdown_rx).await;

    // Queue sender is dropped either way; let workers finish what they hold.
    router.await?;

    match run_result {
        Ok(()) => {
            info!("Homewatch collector shut down cleanly");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Transport failure, exiting");
            Err(e.into())
        }
    }
}
