use neo4rs::query;
use tracing::info;

use crate::GraphClient;

/// Run idempotent schema migrations: uniqueness constraints on the
/// merge keys of the upserted topology nodes.
pub async fn migrate(client: &GraphClient) -> Result<(), neo4rs::Error> {
    let g = &client.graph;

    info!("Running graph schema migrations...");

    let constraints = [
        "CREATE CONSTRAINT sensor_id_unique IF NOT EXISTS \
         FOR (s:Sensor) REQUIRE s.sensor_id IS UNIQUE",
        "CREATE CONSTRAINT location_name_unique IF NOT EXISTS \
         FOR (l:Location) REQUIRE l.name IS UNIQUE",
        "CREATE CONSTRAINT property_id_unique IF NOT EXISTS \
         FOR (p:Property) REQUIRE p.property_id IS UNIQUE",
    ];

    for c in constraints {
        g.run(query(c)).await?;
    }

    info!("Uniqueness constraints created");
    Ok(())
}
