use std::{env, fs, path::PathBuf};

use ledger_pivot::{telemetry, PivotCatalog, PivotConfig, PivotQueryBuilder, PivotRequest};

fn usage() {
    eprintln!("Usage: print_sql <request.json|request.yaml>");
    eprintln!(
        "Example: cargo run --example print_sql -- examples/requests/payables_by_supplier.json"
    );
}

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let Some(request_path) = env::args().nth(1).map(PathBuf::from) else {
        usage();
        std::process::exit(1);
    };

    let raw = fs::read_to_string(&request_path)?;
    let request: PivotRequest = match request_path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => PivotRequest::from_yaml(&raw)?,
        _ => PivotRequest::from_json(&raw)?,
    };

    let config = PivotConfig::load_default();
    let builder = PivotQueryBuilder::from_config(PivotCatalog::shared(), &config);
    let built = builder.build(&request)?;

    println!("{}", built.sql);
    for (idx, param) in built.params.iter().enumerate() {
        println!("${} = {}", idx + 1, param.to_json());
    }
    Ok(())
}
