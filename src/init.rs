use crate::env::{
    env_opt, ConfigError, LOGSTASH_LAYOUT_ESCAPING_ENV, LOGSTASH_LAYOUT_HOST_ENV,
    LOGSTASH_LAYOUT_LEVEL_ENV,
};
use crate::host::HostContext;
use crate::json::StringEscaping;
use crate::layer::LogstashLayer;
use crate::sink::LineSink;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the logging layer.
///
/// **Fields**
/// - `channel_buffer`: maximum number of formatted lines queued before new
///   lines start being dropped.
/// - `batch_size`: number of lines handed to the sink per batch.
/// - `flush_interval`: maximum time a partial batch waits before being sent.
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is added
///   next to the [`LogstashLayer`] for human-readable console output.
/// - `max_level`: most verbose level forwarded to the sink.
/// - `escaping`: how ordinary string values are written.
/// - `host`: fixed `host` field value; `None` resolves the local host name.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub channel_buffer: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub enable_stdout: bool,
    pub max_level: Level,
    pub escaping: StringEscaping,
    pub host: Option<String>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            batch_size: 128,
            flush_interval: Duration::from_secs(1),
            enable_stdout: false,
            max_level: Level::INFO,
            escaping: StringEscaping::Json,
            host: None,
        }
    }
}

impl LayerConfig {
    /// Defaults overridden by `LOGSTASH_LAYOUT_*` environment variables.
    ///
    /// **Returns**
    /// - `Err(ConfigError::InvalidLevel)` / `Err(ConfigError::UnknownEscaping)`
    ///   if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = LayerConfig::default();

        if let Some(level) = env_opt(LOGSTASH_LAYOUT_LEVEL_ENV) {
            config.max_level = level
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidLevel(level.clone()))?;
        }
        if let Some(escaping) = env_opt(LOGSTASH_LAYOUT_ESCAPING_ENV) {
            config.escaping = escaping.parse()?;
        }
        config.host = env_opt(LOGSTASH_LAYOUT_HOST_ENV);

        Ok(config)
    }

    fn host_context(&self) -> Arc<HostContext> {
        match &self.host {
            Some(name) => Arc::new(HostContext::with_name(name.clone())),
            None => HostContext::shared(),
        }
    }

    /// Build the layer without installing it, for composing with other
    /// layers on a custom subscriber.
    pub fn build_layer(&self, sink: Arc<dyn LineSink>) -> (LogstashLayer, JoinHandle<()>) {
        LogstashLayer::new(
            sink,
            self.host_context(),
            self.escaping,
            self.max_level,
            self.channel_buffer,
            self.batch_size,
            self.flush_interval,
        )
    }
}

/// Initialize the global `tracing` subscriber using the provided sink and
/// [`LayerConfig`].
///
/// **Effects**
///
/// Installs a [`Registry`] combined with [`LogstashLayer`] (and optionally
/// a `fmt` layer) as the global default subscriber. Must be called within
/// a Tokio runtime.
///
/// **Returns**
/// - the handle of the background task shipping lines to `sink`.
/// - `Err(ConfigError::SetGlobalDefault)` if a global subscriber is
///   already installed.
pub fn init_tracing_with_config(
    sink: Arc<dyn LineSink>,
    config: LayerConfig,
) -> Result<JoinHandle<()>, ConfigError> {
    let (layer, handle) = config.build_layer(sink);

    // The two subscriber shapes have different types, hence two branches.
    let installed = if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    };

    if let Err(e) = installed {
        handle.abort();
        return Err(ConfigError::SetGlobalDefault(e.to_string()));
    }

    tracing::debug!(
        max_level = %config.max_level,
        escaping = ?config.escaping,
        "logstash layer installed"
    );
    Ok(handle)
}

/// Initialize tracing with [`LayerConfig::default`].
pub fn init_tracing(sink: Arc<dyn LineSink>) -> Result<JoinHandle<()>, ConfigError> {
    init_tracing_with_config(sink, LayerConfig::default())
}
