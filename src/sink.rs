use async_trait::async_trait;
use std::error::Error;

/// Asynchronous destination for formatted JSON lines produced by the
/// logging layer.
///
/// Implementations transport lines to a concrete collector (stdout, a
/// Logstash TCP input, a file, etc). The layer calls `send` from a
/// background task and never awaits it on the application thread.
#[async_trait]
pub trait LineSink: Send + Sync {
    /// Send a single line to the underlying destination.
    ///
    /// **Parameters**
    /// - `line`: one JSON document terminated by `\n`.
    ///
    /// **Returns**
    /// - `Ok(())` if the line was accepted.
    /// - `Err(..)` if the destination failed. The layer reports the error
    ///   and drops the rest of the current batch; there is no retry.
    async fn send(&self, line: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered lines, if the sink implements buffering.
    ///
    /// Called after every batch. Default implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
