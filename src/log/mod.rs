use serde::Serialize;
use serde_json::to_string_pretty;
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins; otherwise `--debug` turns
/// on request/response bodies for this crate.
pub fn init(debug: bool) {
    let fallback = if debug { "sustainability_council=debug,council=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn print_json_debug<T: Serialize>(stage: &str, value: &T) -> anyhow::Result<()> {
    let json = to_string_pretty(value)?;
    eprintln!("\n===== DEBUG [{stage}]: JSON =====\n{json}\n");
    std::io::stderr().flush().ok();
    Ok(())
}
