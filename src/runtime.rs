//! Synchronous entry points into the async pipeline.
//!
//! [`run_blocking`] drives a future to completion from synchronous code.  When
//! the caller is already inside a tokio runtime, blocking that runtime's
//! thread would panic, so the future is handed to a dedicated scoped thread
//! with its own runtime and the caller waits for its result.

use std::future::Future;

/// Run `future` to completion and return its output.
///
/// Errors only when a runtime cannot be built.  A panic inside the future is
/// propagated to the caller.
pub fn run_blocking<F, T>(future: F) -> std::io::Result<T>
where
    F: Future<Output = T> + Send,
    T: Send,
{
    if tokio::runtime::Handle::try_current().is_err() {
        return Ok(build_runtime()?.block_on(future));
    }

    log::debug!("runtime: already inside a scheduler, using a dedicated worker");
    std::thread::scope(|scope| {
        let worker = scope.spawn(|| build_runtime().map(|rt| rt.block_on(future)));
        match worker.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    })
}

fn build_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_outside_a_runtime() {
        let value = run_blocking(async { 40 + 2 }).unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn runs_inside_a_runtime_without_panicking() {
        let borrowed = String::from("borrowed");
        let len = run_blocking(async { borrowed.len() }).unwrap();
        assert_eq!(len, 8);
    }
}
