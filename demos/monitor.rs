use poer_thermostat::{ThermostatClient, VendorKind};
use std::env;

#[tokio::main]
async fn main() -> poer_thermostat::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let Some(api_key) = args.get(1) else {
        eprintln!("usage: monitor <api-key> [--intent]");
        std::process::exit(2);
    };
    let vendor = if args.iter().any(|a| a == "--intent") {
        VendorKind::Intent
    } else {
        VendorKind::Rest
    };

    let client = ThermostatClient::builder(api_key)
        .vendor(vendor)
        .on_snapshot(|records| {
            for r in records {
                let temp = r
                    .current_temp
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "--".to_string());
                let target = r
                    .target_temp
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "--".to_string());
                println!(
                    "[{}] {} -> {} | mode: {} | action: {} | preset: {}{}",
                    r.name,
                    temp,
                    target,
                    r.mode.as_str(),
                    r.action.as_str(),
                    r.preset.as_str(),
                    if r.status_available { "" } else { " | NO STATUS" },
                );
            }
        })
        .build()?;

    println!("Polling every {:?}...", client.scan_interval());
    if let Err(e) = client.poll().await {
        eprintln!("Initial refresh failed: {e}");
        return Err(e);
    }
    client.run_polling().await;
    Ok(())
}
