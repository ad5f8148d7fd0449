mod catalog;
// Consumed by the wasm app only; the native build compiles them for tests.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod fetch;
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod highlight;
mod media;
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod scroll_lock;
mod telemetry;
mod viewer;

#[cfg(not(target_arch = "wasm32"))]
mod backend;
#[cfg(target_arch = "wasm32")]
mod frontend;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() {
    if let Err(error) = backend::run().await {
        eprintln!("asset server failed: {error}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    frontend::run();
}
