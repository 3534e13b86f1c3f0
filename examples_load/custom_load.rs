use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{error, Level};

use tracing_logstash_layout::init::{init_tracing_with_config, LayerConfig};
use tracing_logstash_layout::noop_sink::NoopSink;
use tracing_logstash_layout::StringEscaping;

#[derive(Debug, thiserror::Error)]
#[error("upstream timed out")]
struct Timeout;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let sink = Arc::new(NoopSink::default());

    let layer_config = LayerConfig {
        channel_buffer: 50_000,
        batch_size: 1_000,
        flush_interval: Duration::from_millis(200),
        max_level: Level::ERROR,
        escaping: StringEscaping::Verbatim,
        host: Some("load-host".to_string()),
        ..LayerConfig::default()
    };

    init_tracing_with_config(sink, layer_config)?;

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, error = &Timeout as &dyn std::error::Error, "custom load test error");
    }

    let elapsed = start.elapsed();
    println!("custom config: formatted {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    sleep(Duration::from_secs(2)).await;
    Ok(())
}
