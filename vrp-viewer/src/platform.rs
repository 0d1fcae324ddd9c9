//! Running background work on the current platform.
//!
//! Natively the futures go to the ambient tokio runtime, so the caller must be inside one (the
//! `galileo-egui` init path enters a runtime before starting the UI). In the browser they are
//! queued on the JS event loop.

use std::future::Future;

/// Runs `future` in the background and drops its output.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn<T>(future: T)
where
    T: Future + Send + 'static,
    T::Output: Send + 'static,
{
    tokio::spawn(future);
}

/// Runs `future` in the background and drops its output.
#[cfg(target_arch = "wasm32")]
pub fn spawn<T>(future: T)
where
    T: Future + 'static,
    T::Output: 'static,
{
    wasm_bindgen_futures::spawn_local(async {
        future.await;
    });
}
