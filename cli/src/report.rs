//! Outcome display and exit-code mapping.

use converge_engine::ImportOutcome;

/// Print the outcome of an import run: a short count report always, the
/// full outcome at debug level, or the error summary on failure.
pub fn print_import(outcome: &ImportOutcome) {
    tracing::info!("import finished, displaying outcome");
    tracing::info!("------------------");

    if outcome.is_success() {
        tracing::info!(seconds = outcome.duration, "import succeeded");
        if let Some(sync) = &outcome.sync {
            let short = serde_json::to_string_pretty(&sync.to_short_report()).unwrap_or_default();
            tracing::info!("sync report (short): {short}");
            let long = serde_json::to_string_pretty(sync).unwrap_or_default();
            tracing::debug!("sync report (long): {long}");
        }
    } else {
        if let Some(error) = &outcome.error {
            tracing::error!(stage = %error.stage, "import failed: {}", error.message);
        }
        tracing::error!(seconds = outcome.duration, code = outcome.code, "import failed");
    }
}

/// Exit code for the shell: 0 on success, 1 on an error outcome.
pub fn exit_code(outcome: &ImportOutcome) -> i32 {
    if outcome.is_success() {
        0
    } else {
        1
    }
}
