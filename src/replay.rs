//! Headless driver that feeds a scripted sequence of host events into a
//! [`Session`].

use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::geometry::{Color, Point, SurfaceSize};
use crate::session::{PointerHit, Session, SessionEvent};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayStep {
    Mount { width: u32, height: u32 },
    Down { x: i32, y: i32 },
    /// Press on the n-th annotation currently shown.
    DownOn { annotation: usize, x: i32, y: i32 },
    Move { x: i32, y: i32 },
    Up { x: i32, y: i32 },
    Leave,
    Color(String),
    Undo,
    Reset,
    Evaluate,
    TypesetReady,
    /// Lets in-flight evaluations finish, then advances the clock.
    WaitMs(u64),
    Unload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationReport {
    pub label: String,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub history_len: usize,
    pub can_undo: bool,
    pub annotations: Vec<AnnotationReport>,
    pub bindings: BTreeMap<String, String>,
}

pub fn parse_script(source: &str) -> AppResult<Vec<ReplayStep>> {
    Ok(serde_json::from_str(source)?)
}

/// Runs `steps` against `session` on a virtual clock and reports the final
/// state.
pub fn run_script(session: &mut Session, steps: &[ReplayStep], wait_timeout: Duration) -> ReplayReport {
    let mut now = Instant::now();
    for step in steps {
        tracing::debug!(?step, "replay step");
        let event = match step {
            ReplayStep::Mount { width, height } => {
                session.mount(SurfaceSize::new(*width, *height));
                continue;
            }
            ReplayStep::Down { x, y } => SessionEvent::PointerDown {
                position: Point::new(*x, *y),
                hit: PointerHit::Surface,
            },
            ReplayStep::DownOn { annotation, x, y } => {
                let Some(target) = session.state().overlays.iter().nth(*annotation) else {
                    tracing::warn!(annotation, "replay references a missing annotation");
                    continue;
                };
                SessionEvent::PointerDown {
                    position: Point::new(*x, *y),
                    hit: PointerHit::Annotation(target.id.clone()),
                }
            }
            ReplayStep::Move { x, y } => SessionEvent::PointerMove {
                position: Point::new(*x, *y),
            },
            ReplayStep::Up { x, y } => SessionEvent::PointerUp {
                position: Point::new(*x, *y),
            },
            ReplayStep::Leave => SessionEvent::PointerLeave,
            ReplayStep::Color(hex) => match Color::from_hex(hex) {
                Some(color) => SessionEvent::ColorSelected(color),
                None => {
                    tracing::warn!(%hex, "replay color is not #rrggbb");
                    continue;
                }
            },
            ReplayStep::Undo => SessionEvent::UndoRequested,
            ReplayStep::Reset => SessionEvent::ResetRequested,
            ReplayStep::Evaluate => SessionEvent::EvaluateRequested,
            ReplayStep::TypesetReady => SessionEvent::TypesetReady,
            ReplayStep::WaitMs(millis) => {
                session.wait_for_evaluations(wait_timeout, now);
                now += Duration::from_millis(*millis);
                session.tick(now);
                continue;
            }
            ReplayStep::Unload => SessionEvent::Unload,
        };
        session.dispatch_at(event, now);
        session.tick(now);
    }

    report(session)
}

pub fn report(session: &Session) -> ReplayReport {
    let state = session.state();
    ReplayReport {
        history_len: state.history.len(),
        can_undo: session.can_undo(),
        annotations: state
            .overlays
            .iter()
            .map(|annotation| AnnotationReport {
                label: annotation.label(),
                x: annotation.position.x,
                y: annotation.position.y,
            })
            .collect(),
        bindings: state.bindings.snapshot().into_iter().collect(),
    }
}

pub fn write_surface_png(session: &Session, path: &Path) -> AppResult<bool> {
    let Some(surface) = session.state().renderer.surface() else {
        return Ok(false);
    };
    surface.save_with_format(path, image::ImageFormat::Png)?;
    Ok(true)
}
