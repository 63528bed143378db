use std::{env, fs};

use ledger_pivot::{
    run_pivot, telemetry, PivotCatalog, PivotConfig, PivotQueryBuilder, PivotRequest,
    PostgresConnection,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let request_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "examples/requests/payables_by_supplier.json".to_string());
    let request = PivotRequest::from_json(&fs::read_to_string(&request_path)?)?;

    let mut config = PivotConfig::load_default();
    if let Ok(url) = env::var("DATABASE_URL") {
        config.postgres.url = Some(url);
    }
    let connection = PostgresConnection::from_config(&config.postgres)?;
    let builder = PivotQueryBuilder::from_config(PivotCatalog::shared(), &config);

    let outcome = run_pivot(&builder, &connection, &request).await;
    if outcome.success {
        for row in &outcome.rows {
            let indent = "  ".repeat(row.level);
            let label = row.path().last().copied().unwrap_or("Total");
            println!("{indent}{label}: {:.2}", row.value);
        }
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
