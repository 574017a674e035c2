//! Service liveness check: `pipegen health`.

use anyhow::{Context, Result, bail};
use console::style;

use pipegen::client::PipelineServiceClient;
use pipegen::ui::icons::CHECK;

pub async fn cmd_health(base_url: &str) -> Result<()> {
    let client = PipelineServiceClient::new(base_url);
    let status = client
        .health()
        .await
        .with_context(|| format!("Service at {} is not reachable", client.base_url()))?;

    if !status.is_healthy() {
        bail!(
            "Service at {} reported status '{}'",
            client.base_url(),
            status.status
        );
    }

    println!(
        "{}Service at {} is {}",
        CHECK,
        client.base_url(),
        style("healthy").green()
    );
    Ok(())
}
