use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing_logstash_layout::{
    format_event, HostContext, LogEvent, Location, LogstashLayout, StringEscaping, ThrowableInfo,
};

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error("cannot read \"{0}\"")]
    Read(String, #[source] std::io::Error),
}

fn events(n: u64) -> Vec<LogEvent> {
    let cause = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err = LoadError::Read("C:\\data\\app.cfg".to_string(), cause);
    let mut deep = ThrowableInfo::from_error(&err);
    for i in 0..500 {
        deep.stack_trace.push(format!("\tat worker::step{i}(src/worker.rs:{i})"));
    }

    (0..n)
        .map(|i| {
            let event = LogEvent::new(1_700_000_000_000 + i as i64, "ERROR", "load::worker", format!("job {i} failed"))
                .with_location(Location {
                    file: Some("src/worker.rs".to_string()),
                    class: "load::worker".to_string(),
                    method: "run".to_string(),
                    line: Some(42),
                });
            // Every 100th event carries a trace far larger than the reused buffer.
            if i % 100 == 0 {
                event.with_throwable(deep.clone())
            } else {
                event.with_throwable(ThrowableInfo::from_error(&err))
            }
        })
        .collect()
}

fn report(label: &str, n: usize, bytes: usize, elapsed: Duration) {
    println!("{label}: formatted {} events ({} bytes) in {:?} (~{:.0} ev/s)",
        n,
        bytes,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}

fn main() {
    let events = events(100_000);
    let host = Arc::new(HostContext::with_name("load-host"));

    let mut layout = LogstashLayout::with_host(Arc::clone(&host));
    let start = Instant::now();
    let bytes: usize = events.iter().map(|e| layout.format(e).len()).sum();
    report("reused buffer", events.len(), bytes, start.elapsed());

    let start = Instant::now();
    let bytes: usize = events
        .iter()
        .map(|e| format_event(e, &host, StringEscaping::Json).len())
        .sum();
    report("fresh buffer", events.len(), bytes, start.elapsed());
}
