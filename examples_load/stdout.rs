use std::sync::Arc;
use tracing::{error, info, info_span, warn};

use tracing_logstash_layout::init::{init_tracing_with_config, LayerConfig};
use tracing_logstash_layout::stdout_sink::StdoutSink;

#[derive(Debug, thiserror::Error)]
enum CheckoutError {
    #[error("payment declined")]
    Declined(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // LOGSTASH_LAYOUT_HOST / _LEVEL / _ESCAPING tweak the output.
    let config = LayerConfig::from_env()?;
    let handle = init_tracing_with_config(Arc::new(StdoutSink::new()), config)?;

    info!("service started");

    info_span!("checkout").in_scope(|| {
        warn!("retrying payment");

        let cause = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "gateway hung up");
        let err = CheckoutError::Declined(cause);
        error!(error = &err as &dyn std::error::Error, "checkout failed");
    });

    // The global subscriber lives for the whole process, so wait for one
    // flush interval instead of joining the shipping task.
    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
    handle.abort();
    Ok(())
}
