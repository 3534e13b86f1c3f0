use crate::extract::UNKNOWN_LOCATION;
use crate::host::HostContext;
use crate::json::StringEscaping;
use crate::layout::{format_event, LogstashLayout};
use crate::record::{LogEvent, Location, ThrowableInfo};
use crate::sink::LineSink;
use chrono::Utc;
use std::error::Error;
use std::sync::{Arc, Mutex, atomic::{AtomicU64, Ordering}};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that formats events as Logstash JSON lines
/// and forwards them to an asynchronous [`LineSink`] via a bounded channel
/// and background task.
///
/// Formatting happens on the emitting thread; I/O is fully decoupled from
/// it. A full channel drops the line rather than blocking the caller.
pub struct LogstashLayer {
    sender: mpsc::Sender<String>,
    layout: Mutex<LogstashLayout>,
    host: Arc<HostContext>,
    escaping: StringEscaping,
    max_level: Level,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Successfully enqueued into channel.
    pub enqueued_events: Arc<AtomicU64>,
    /// Dropped because the channel was full or closed.
    pub dropped_events: Arc<AtomicU64>,
}

impl LogstashLayer {
    /// Create a new layer and spawn a background task that pulls lines
    /// from a bounded channel and sends them to the provided [`LineSink`].
    ///
    /// Must be called within a Tokio runtime. The host name is resolved
    /// here so that the event path never performs the lookup. Minimal
    /// thresholds are enforced for `buffer`, `batch_size` and
    /// `flush_interval` to avoid degenerate configurations.
    pub fn new(
        sink: Arc<dyn LineSink>,
        host: Arc<HostContext>,
        escaping: StringEscaping,
        max_level: Level,
        buffer: usize,
        batch_size: usize,
        flush_interval: Duration,
    ) -> (Self, JoinHandle<()>) {
        let buffer = buffer.max(16);
        let batch_size = batch_size.max(1);
        let flush_interval = flush_interval.max(Duration::from_millis(10));

        let _ = host.name();
        let layout = LogstashLayout::with_host(Arc::clone(&host)).escaping(escaping);

        let (tx, mut rx) = mpsc::channel::<String>(buffer);

        let handle = tokio::spawn(async move {
            let mut batch = Vec::with_capacity(batch_size);
            let mut ticker = interval(flush_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some(line) => {
                            batch.push(line);
                            if batch.len() >= batch_size {
                                send_batch(&*sink, &mut batch).await;
                            }
                        }
                        None => {
                            send_batch(&*sink, &mut batch).await;
                            break;
                        }
                    },
                    _ = ticker.tick() => {
                        if !batch.is_empty() {
                            send_batch(&*sink, &mut batch).await;
                        }
                    }
                }
            }
        });

        (Self {
            sender: tx,
            layout: Mutex::new(layout),
            host,
            escaping,
            max_level,
            total_events: Arc::new(AtomicU64::new(0)),
            enqueued_events: Arc::new(AtomicU64::new(0)),
            dropped_events: Arc::new(AtomicU64::new(0)),
        }, handle)
    }

    // Reuses the shared buffer when uncontended; never waits for it.
    fn format(&self, event: &LogEvent) -> String {
        match self.layout.try_lock() {
            Ok(mut layout) => layout.format(event),
            Err(_) => format_event(event, &self.host, self.escaping),
        }
    }
}

async fn send_batch(sink: &dyn LineSink, batch: &mut Vec<String>) {
    if batch.is_empty() {
        return;
    }

    for (i, line) in batch.iter().enumerate() {
        if let Err(e) = sink.send(line).await {
            eprintln!("log sink send failed, dropping {} line(s): {}", batch.len() - i, e);
            break;
        }
    }
    if let Err(e) = sink.flush().await {
        eprintln!("log sink flush failed: {}", e);
    }
    batch.clear();
}

impl<S> Layer<S> for LogstashLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        let meta = event.metadata();
        if *meta.level() > self.max_level {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let method = ctx
            .event_span(event)
            .map(|span| span.name().to_string())
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

        let record = LogEvent {
            timestamp_millis: Utc::now().timestamp_millis(),
            level: meta.level().to_string(),
            message: visitor.message,
            logger: meta.target().to_string(),
            location: Some(Location {
                file: meta.file().map(|s| s.to_string()),
                class: meta.module_path().unwrap_or(UNKNOWN_LOCATION).to_string(),
                method,
                line: meta.line(),
            }),
            throwable: visitor.throwable,
        };

        let line = self.format(&record);
        match self.sender.try_send(line) {
            Ok(()) => {
                self.enqueued_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.dropped_events.fetch_add(1, Ordering::Relaxed);
                match e {
                    TrySendError::Full(_) => eprintln!("log channel full, dropping log line"),
                    TrySendError::Closed(_) => {
                        eprintln!("log shipping task has stopped, dropping log line")
                    }
                }
            }
        }
    }
}

/// Pulls the rendered message and the first error value out of an event.
#[derive(Default)]
pub struct EventVisitor {
    pub message: Option<String>,
    pub throwable: Option<ThrowableInfo>,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }

    fn record_error(&mut self, _field: &Field, value: &(dyn Error + 'static)) {
        if self.throwable.is_none() {
            self.throwable = Some(ThrowableInfo::from_error(value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        }
    }
}
