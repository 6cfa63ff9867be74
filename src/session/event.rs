use crate::evaluation::EvaluationCompletion;
use crate::geometry::{Color, Point, SurfaceSize};
use crate::overlay::AnnotationId;

/// What the host's hit test found under a pointer-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerHit {
    Surface,
    Annotation(AnnotationId),
}

/// Everything the host can post to the session, plus the follow-up event an
/// evaluation worker produces when its request finishes.
#[derive(Debug)]
pub enum SessionEvent {
    PointerDown { position: Point, hit: PointerHit },
    PointerMove { position: Point },
    PointerUp { position: Point },
    PointerLeave,
    ColorSelected(Color),
    UndoRequested,
    ResetRequested,
    EvaluateRequested,
    EvaluationCompleted(EvaluationCompletion),
    SurfaceResized(SurfaceSize),
    TypesetReady,
    Unload,
}
