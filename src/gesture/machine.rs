use super::model::{
    DragState, GestureEvent, GestureEventKind, GestureMode, GestureModeKind, GestureOutcome,
    PointerTarget,
};

/// Pointer state machine shared by freehand drawing and annotation dragging.
///
/// Only one gesture runs per pointer-down/up cycle: a pointer-down while a
/// gesture is active is ignored, so an annotation hit never starts a stroke
/// and a stroke never turns into a drag.
#[derive(Debug, Default)]
pub struct GestureRouter {
    mode: GestureMode,
}

impl GestureRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &GestureMode {
        &self.mode
    }

    pub fn is_drawing(&self) -> bool {
        self.mode == GestureMode::Drawing
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.mode, GestureMode::Dragging(_))
    }

    /// Whether pointer tracking must cover the whole window rather than the
    /// drawing surface. Only an active drag listens globally.
    pub fn tracks_globally(&self) -> bool {
        self.is_dragging()
    }

    pub fn can_handle(&self, kind: GestureEventKind) -> bool {
        self.next_state(kind).is_some()
    }

    pub fn next_state(&self, kind: GestureEventKind) -> Option<GestureModeKind> {
        use GestureEventKind::*;
        match (self.mode.kind(), kind) {
            (GestureModeKind::Idle, DownOnSurface) => Some(GestureModeKind::Drawing),
            (GestureModeKind::Idle, DownOnAnnotation) => Some(GestureModeKind::Dragging),
            (GestureModeKind::Drawing, Move) => Some(GestureModeKind::Drawing),
            (GestureModeKind::Drawing, Up | Leave) => Some(GestureModeKind::Idle),
            (GestureModeKind::Dragging, Move) => Some(GestureModeKind::Dragging),
            (GestureModeKind::Dragging, Up) => Some(GestureModeKind::Idle),
            _ => None,
        }
    }

    pub fn handle(&mut self, event: GestureEvent) -> GestureOutcome {
        let kind = event.kind();
        if !self.can_handle(kind) {
            tracing::trace!(mode = ?self.mode.kind(), event = ?kind, "pointer event ignored");
            return GestureOutcome::Ignored;
        }

        let outcome = match event {
            GestureEvent::PointerDown {
                position,
                target: PointerTarget::Surface,
            } => {
                self.mode = GestureMode::Drawing;
                GestureOutcome::BeginStroke(position)
            }
            GestureEvent::PointerDown {
                position,
                target: PointerTarget::Annotation { id, origin },
            } => {
                self.mode = GestureMode::Dragging(DragState {
                    annotation: id.clone(),
                    pointer_offset: position.offset_from(origin),
                });
                GestureOutcome::DragStarted(id)
            }
            GestureEvent::PointerMove { position } => match &self.mode {
                GestureMode::Drawing => GestureOutcome::ExtendStroke(position),
                GestureMode::Dragging(drag) => GestureOutcome::MoveAnnotation {
                    id: drag.annotation.clone(),
                    position: position.offset_from(drag.pointer_offset),
                },
                GestureMode::Idle => GestureOutcome::Ignored,
            },
            GestureEvent::PointerUp { .. } | GestureEvent::PointerLeave => {
                match std::mem::take(&mut self.mode) {
                    GestureMode::Drawing => GestureOutcome::FinishStroke,
                    GestureMode::Dragging(drag) => GestureOutcome::DragEnded(drag.annotation),
                    GestureMode::Idle => GestureOutcome::Ignored,
                }
            }
        };

        tracing::debug!(mode = ?self.mode.kind(), event = ?kind, "gesture transition");
        outcome
    }

    /// Drops any gesture in progress without emitting its completion.
    pub fn cancel(&mut self) {
        self.mode = GestureMode::Idle;
    }
}

impl std::fmt::Display for GestureRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GestureMode::{:?}", self.mode.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::overlay::AnnotationId;

    fn down_on_surface(x: i32, y: i32) -> GestureEvent {
        GestureEvent::PointerDown {
            position: Point::new(x, y),
            target: PointerTarget::Surface,
        }
    }

    fn down_on_annotation(id: &str, x: i32, y: i32, origin: Point) -> GestureEvent {
        GestureEvent::PointerDown {
            position: Point::new(x, y),
            target: PointerTarget::Annotation {
                id: AnnotationId::from(id),
                origin,
            },
        }
    }

    fn moved(x: i32, y: i32) -> GestureEvent {
        GestureEvent::PointerMove {
            position: Point::new(x, y),
        }
    }

    fn up(x: i32, y: i32) -> GestureEvent {
        GestureEvent::PointerUp {
            position: Point::new(x, y),
        }
    }

    #[test]
    fn can_handle_tracks_valid_and_invalid_events() {
        let mut router = GestureRouter::new();
        assert!(router.can_handle(GestureEventKind::DownOnSurface));
        assert!(router.can_handle(GestureEventKind::DownOnAnnotation));
        assert!(!router.can_handle(GestureEventKind::Move));
        assert!(!router.can_handle(GestureEventKind::Up));

        router.handle(down_on_surface(1, 1));
        assert!(router.can_handle(GestureEventKind::Move));
        assert!(router.can_handle(GestureEventKind::Leave));
        assert!(!router.can_handle(GestureEventKind::DownOnAnnotation));
    }

    #[test]
    fn stroke_cycle_begins_extends_and_finishes() {
        let mut router = GestureRouter::new();
        assert_eq!(router.handle(down_on_surface(3, 4)), GestureOutcome::BeginStroke(Point::new(3, 4)));
        assert!(router.is_drawing());
        assert_eq!(router.handle(moved(5, 6)), GestureOutcome::ExtendStroke(Point::new(5, 6)));
        assert_eq!(router.handle(up(5, 6)), GestureOutcome::FinishStroke);
        assert_eq!(router.mode(), &GestureMode::Idle);
    }

    #[test]
    fn leaving_surface_finishes_stroke() {
        let mut router = GestureRouter::new();
        router.handle(down_on_surface(0, 0));
        assert_eq!(router.handle(GestureEvent::PointerLeave), GestureOutcome::FinishStroke);
        assert_eq!(router.handle(GestureEvent::PointerLeave), GestureOutcome::Ignored);
    }

    #[test]
    fn moves_and_ups_while_idle_are_ignored() {
        let mut router = GestureRouter::new();
        assert_eq!(router.handle(moved(1, 1)), GestureOutcome::Ignored);
        assert_eq!(router.handle(up(1, 1)), GestureOutcome::Ignored);
        assert_eq!(router.mode(), &GestureMode::Idle);
    }

    #[test]
    fn drag_moves_annotation_by_pointer_delta_regardless_of_grab_point() {
        let origin = Point::new(100, 200);
        for (grab_x, grab_y) in [(100, 200), (137, 211), (180, 260)] {
            let mut router = GestureRouter::new();
            router.handle(down_on_annotation("a", grab_x, grab_y, origin));
            let outcome = router.handle(moved(grab_x + 15, grab_y - 40));
            assert_eq!(
                outcome,
                GestureOutcome::MoveAnnotation {
                    id: AnnotationId::from("a"),
                    position: Point::new(115, 160),
                }
            );
        }
    }

    #[test]
    fn annotation_down_while_drawing_does_not_start_drag_or_stroke() {
        let mut router = GestureRouter::new();
        router.handle(down_on_surface(10, 10));
        let outcome = router.handle(down_on_annotation("a", 12, 12, Point::new(0, 0)));
        assert_eq!(outcome, GestureOutcome::Ignored);
        assert!(router.is_drawing());
    }

    #[test]
    fn surface_down_while_dragging_does_not_start_stroke() {
        let mut router = GestureRouter::new();
        router.handle(down_on_annotation("a", 12, 12, Point::new(0, 0)));
        assert_eq!(router.handle(down_on_surface(20, 20)), GestureOutcome::Ignored);
        assert!(router.is_dragging());
    }

    #[test]
    fn global_tracking_only_while_dragging_and_leave_keeps_drag() {
        let mut router = GestureRouter::new();
        assert!(!router.tracks_globally());
        router.handle(down_on_annotation("a", 5, 5, Point::new(0, 0)));
        assert!(router.tracks_globally());

        assert_eq!(router.handle(GestureEvent::PointerLeave), GestureOutcome::Ignored);
        assert!(router.tracks_globally());

        assert_eq!(
            router.handle(up(900, 900)),
            GestureOutcome::DragEnded(AnnotationId::from("a"))
        );
        assert!(!router.tracks_globally());
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut router = GestureRouter::new();
        router.handle(down_on_surface(0, 0));
        router.cancel();
        assert_eq!(router.to_string(), "GestureMode::Idle");
    }
}
