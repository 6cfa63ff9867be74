use crate::geometry::Point;
use crate::overlay::AnnotationId;

/// What the pointer went down on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    Surface,
    Annotation { id: AnnotationId, origin: Point },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureEvent {
    PointerDown { position: Point, target: PointerTarget },
    PointerMove { position: Point },
    PointerUp { position: Point },
    /// The pointer left the drawing surface.
    PointerLeave,
}

impl GestureEvent {
    pub const fn kind(&self) -> GestureEventKind {
        match self {
            Self::PointerDown {
                target: PointerTarget::Surface,
                ..
            } => GestureEventKind::DownOnSurface,
            Self::PointerDown {
                target: PointerTarget::Annotation { .. },
                ..
            } => GestureEventKind::DownOnAnnotation,
            Self::PointerMove { .. } => GestureEventKind::Move,
            Self::PointerUp { .. } => GestureEventKind::Up,
            Self::PointerLeave => GestureEventKind::Leave,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEventKind {
    DownOnSurface,
    DownOnAnnotation,
    Move,
    Up,
    Leave,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub annotation: AnnotationId,
    pub pointer_offset: Point,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GestureMode {
    #[default]
    Idle,
    Drawing,
    Dragging(DragState),
}

impl GestureMode {
    pub const fn kind(&self) -> GestureModeKind {
        match self {
            Self::Idle => GestureModeKind::Idle,
            Self::Drawing => GestureModeKind::Drawing,
            Self::Dragging(_) => GestureModeKind::Dragging,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureModeKind {
    Idle,
    Drawing,
    Dragging,
}

/// Side effect the session applies after a gesture transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    BeginStroke(Point),
    ExtendStroke(Point),
    FinishStroke,
    DragStarted(AnnotationId),
    MoveAnnotation { id: AnnotationId, position: Point },
    DragEnded(AnnotationId),
    Ignored,
}
