use std::convert::Infallible;

use clap::Args;

/// Check whether the relay is up and how many payloads it holds
#[derive(Args, Debug, Clone)]
pub struct Health;

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = Infallible;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let base = ctx.client.base_url();

        let status = match ctx.client.health().await {
            Ok(health) if health.ok => format!("ok, {} blob(s) waiting", health.blobs),
            Ok(_) => "unhealthy".to_string(),
            Err(e) => {
                tracing::debug!("health check failed: {}", e);
                "unavailable".to_string()
            }
        };

        Ok(format!("Relay ({}): {}", base, status))
    }
}
