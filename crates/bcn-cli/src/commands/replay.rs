//! `bcn replay`: feed a recorded session through the scan controller.

use anyhow::Result;
use bcn_testkit::{load_batches_json, replay_batches};

use super::load_config;

pub async fn replay(
    config_paths: Vec<String>,
    batches_path: &str,
    deny_permissions: bool,
    strict_config: bool,
) -> Result<()> {
    let (loaded, cfg) = load_config(&config_paths, strict_config)?;
    let batches = load_batches_json(batches_path)?;

    println!("config_hash={}", loaded.config_hash);

    let report = replay_batches(&cfg, &batches, !deny_permissions).await?;
    if let Some(err) = &report.start_error {
        println!("start_error={err}");
    }
    for step in &report.steps {
        println!("{}", serde_json::to_string(step)?);
    }
    println!(
        "final_state={} phase={} batches_applied={} batches_dropped={}",
        report.final_state.scan_state.as_str(),
        report.final_phase,
        report.batches_applied,
        report.batches_dropped
    );

    Ok(())
}
