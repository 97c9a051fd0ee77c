//! Task-local trace id for the request being served.
//!
//! `RequestTrace` opens the scope; error rendering reads it so the
//! problem-details body and the `x-trace-id` header agree.

use tokio::task_local;

task_local! {
    static TRACE_ID: String;
}

const UNKNOWN: &str = "unknown";

/// Trace id of the current task, or `"unknown"` outside a request.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| UNKNOWN.to_string())
}

pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(trace_id, future).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trace_id_outside_scope() {
        assert_eq!(trace_id(), "unknown");
    }

    #[tokio::test]
    async fn test_trace_id_inside_scope_and_nested() {
        let seen = with_trace_id("outer".to_string(), async {
            let inner = with_trace_id("inner".to_string(), async { trace_id() }).await;
            (trace_id(), inner)
        })
        .await;

        assert_eq!(seen, ("outer".to_string(), "inner".to_string()));
        assert_eq!(trace_id(), "unknown");
    }
}
