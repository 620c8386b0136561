use std::future::Future;

use tracing::error;

/// Runs a best-effort side effect. A failure is logged under `operation` and
/// swallowed, so the caller's outcome never depends on it.
pub async fn advisory<F, T, E>(operation: &'static str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(err) => {
            error!(operation, error = %err, "advisory: best-effort step failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_success() {
        let value = advisory("noop", async { Ok::<_, String>(7) }).await;
        assert_eq!(value, Some(7));
    }

    #[tokio::test]
    async fn swallows_failure() {
        let value: Option<()> = advisory("boom", async { Err("exploded".to_string()) }).await;
        assert_eq!(value, None);
    }
}
