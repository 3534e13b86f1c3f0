use std::sync::{Arc, OnceLock};

/// Host name used when the local host name cannot be resolved.
pub const UNKNOWN_HOST: &str = "unknown";

static SHARED: OnceLock<Arc<HostContext>> = OnceLock::new();

/// Owner of the memoized `host` field value.
///
/// The name is resolved on first use and reused for every event. Racing
/// first calls may both resolve; only one result is kept.
#[derive(Debug, Default)]
pub struct HostContext {
    name: OnceLock<String>,
}

impl HostContext {
    /// A context that resolves the local host name lazily.
    pub fn new() -> Self {
        HostContext { name: OnceLock::new() }
    }

    /// A context with a fixed host name, skipping resolution.
    pub fn with_name(name: impl Into<String>) -> Self {
        let context = HostContext::new();
        let _ = context.name.set(name.into());
        context
    }

    /// Process-wide context shared by layouts built without an explicit one.
    pub fn shared() -> Arc<HostContext> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(HostContext::new())))
    }

    pub fn name(&self) -> &str {
        self.name.get_or_init(resolve_host_name)
    }
}

fn resolve_host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_HOST.to_string())
}
