//! Console demo of the default-value round trip.
//!
//! Runs the mode selected by cargo features and environment variables, or
//! every mode when `DEMO_ALL_MODES` is set.

use anyhow::{bail, Context, Result};
use asymmetric_xml::{run_demo, DemoConfig, Mitigations};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let config = DemoConfig::from_env();

    init_tracing(&config.log_level)?;

    info!(
        mode = %config.mitigations,
        all_modes = config.all_modes,
        version = VERSION,
        "starting round trip demo",
    );

    if !config.all_modes {
        let trip = run_demo(config.mitigations)
            .with_context(|| format!("round trip failed in {} mode", config.mitigations))?;
        println!("{trip}");
        trip.verify()?;
        return Ok(());
    }

    // The unmitigated mode is expected to lose the text; the others must not.
    let mut unexpected = Vec::new();
    for mitigations in Mitigations::ALL {
        let trip = run_demo(mitigations)
            .with_context(|| format!("round trip failed in {mitigations} mode"))?;
        println!("[{mitigations}]");
        println!("{trip}");
        let outcome = if trip.holds() { "holds" } else { "fails" };
        println!("Round trip {outcome}");
        println!();
        debug!(mode = %mitigations, holds = trip.holds(), "mode finished");
        if trip.holds() != mitigations.is_mitigated() {
            unexpected.push(mitigations.to_string());
        }
    }

    if !unexpected.is_empty() {
        bail!("unexpected round trip outcome in: {}", unexpected.join(", "));
    }
    Ok(())
}
