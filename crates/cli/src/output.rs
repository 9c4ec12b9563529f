use crate::error::CliError;
use engine_runtime::execution::executor::ImportSummary;
use model::store::Store;

fn generate_report_json(summary: &ImportSummary) -> Result<String, CliError> {
    let json = serde_json::to_string_pretty(summary)?;
    Ok(json)
}

pub async fn write_report(summary: &ImportSummary, path: String) -> Result<(), CliError> {
    let report_json = generate_report_json(summary)?;
    tokio::fs::write(path, report_json).await?;
    Ok(())
}

pub fn print_report(summary: &ImportSummary) -> Result<(), CliError> {
    let report_json = generate_report_json(summary)?;
    println!("{report_json}");
    Ok(())
}

pub fn print_stores_table(stores: &[Store]) {
    println!("{:<32} {}", "Address", "State");
    println!("-----------------------------------------");
    for store in stores {
        println!("{:<32} {}", store.address, store.state);
    }
}
