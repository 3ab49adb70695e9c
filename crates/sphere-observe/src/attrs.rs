//! Span attribute names and span constructors for broker operations.
//!
//! Attribute names are dotted (`sphere.*`) so they survive the OpenTelemetry
//! bridge unchanged. Use the constructors below rather than spelling the
//! names inline; they keep the field set of each operation consistent.

use tracing::Span;

/// The name of the broker operation (e.g., "chat", "probe").
pub const SPHERE_OPERATION: &str = "sphere.operation";

/// Unique id of one inbound request or CLI invocation.
pub const SPHERE_REQUEST_ID: &str = "sphere.request.id";

/// Number of content-address references attached to the turn.
pub const SPHERE_CONTEXT_REFS: &str = "sphere.request.context_refs";

/// Whether the turn carried the web-search hint.
pub const SPHERE_WEB_SEARCH: &str = "sphere.request.web_search";

/// Service kind requested from the registry (e.g., "chatbot").
pub const SPHERE_SERVICE_TYPE: &str = "sphere.service_type";

// --- Operation name values ---

/// One chat turn through the broker pipeline.
pub const OP_CHAT: &str = "chat";

/// Registry listing.
pub const OP_LIST_PROVIDERS: &str = "list_providers";

/// End-to-end diagnostic run.
pub const OP_PROBE: &str = "probe";

/// Span for one chat turn.
pub fn chat_span(request_id: &str, context_refs: usize, web_search: bool) -> Span {
    tracing::info_span!(
        "chat",
        "sphere.operation" = OP_CHAT,
        "sphere.request.id" = request_id,
        "sphere.request.context_refs" = context_refs,
        "sphere.request.web_search" = web_search,
    )
}

/// Span for a registry listing.
pub fn list_providers_span(service_type: &str) -> Span {
    tracing::info_span!(
        "list_providers",
        "sphere.operation" = OP_LIST_PROVIDERS,
        "sphere.service_type" = service_type,
    )
}

/// Span for a diagnostic probe.
pub fn probe_span(service_type: &str) -> Span {
    tracing::info_span!(
        "probe",
        "sphere.operation" = OP_PROBE,
        "sphere.service_type" = service_type,
    )
}
