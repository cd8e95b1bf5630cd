#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

use apns_oneshot::config::Config;
use apns_oneshot::telemetry;
use std::io::Write;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    let telemetry_guard = telemetry::init_telemetry(&config.telemetry)?;

    let outcome = apns_oneshot::run(&config, apns_oneshot::connect_apns).await;

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Push failed");
            telemetry_guard.shutdown();
            return Err(e.into());
        }
    };

    // A rejection is still a completed send; it is reported, not treated as a failure.
    writeln!(std::io::stdout().lock(), "{result}")?;

    telemetry_guard.shutdown();
    Ok(())
}
