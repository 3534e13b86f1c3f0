use crate::sink::LineSink;
use async_trait::async_trait;
use std::error::Error;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

/// Writes each line to the process's standard output.
///
/// Suits container setups where a log shipper tails stdout and forwards
/// JSON lines to Logstash.
pub struct StdoutSink {
    out: Mutex<Stdout>,
}

impl StdoutSink {
    pub fn new() -> Self {
        StdoutSink { out: Mutex::new(tokio::io::stdout()) }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineSink for StdoutSink {
    async fn send(&self, line: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.out.lock().await.flush().await?;
        Ok(())
    }
}
