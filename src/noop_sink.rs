use crate::sink::LineSink;
use async_trait::async_trait;
use std::error::Error;

/// A sink that simply drops all lines.
///
/// Useful for measuring the overhead of formatting and queueing without
/// any I/O.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl LineSink for NoopSink {
    async fn send(&self, _line: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
