pub mod bindings;
pub mod canvas;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod logging;
pub mod notification;
pub mod overlay;
pub mod replay;
pub mod session;
pub use error::{AppError, AppResult};
pub use session::{Session, SessionEvent};

use std::path::Path;

use notification::SystemNotifier;
use replay::ReplayReport;

/// Replays the event script at `script` against a session wired to the
/// configured evaluation service. The final surface is written to `output`
/// when given.
pub fn run(script: &Path, output: Option<&Path>) -> AppResult<ReplayReport> {
    logging::init();
    tracing::info!(script = %script.display(), "starting mathpad replay");

    let config = config::load_app_config();
    let wait_timeout = config.request_timeout();
    let steps = replay::parse_script(&std::fs::read_to_string(script)?)?;
    let mut session = Session::with_http_service(config, Box::new(SystemNotifier))?;

    let report = replay::run_script(&mut session, &steps, wait_timeout);
    if let Some(output) = output {
        if replay::write_surface_png(&session, output)? {
            tracing::info!(path = %output.display(), "surface written");
        } else {
            tracing::warn!("script never mounted a surface; nothing written");
        }
    }

    tracing::info!(
        annotations = report.annotations.len(),
        history = report.history_len,
        "replay complete"
    );
    Ok(report)
}
