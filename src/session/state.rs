use crate::bindings::VariableBindings;
use crate::canvas::{StrokeRenderer, StrokeStyle};
use crate::gesture::GestureRouter;
use crate::history::CanvasHistory;
use crate::overlay::{OverlayRegistry, TypesetGate};

/// All mutable state of one drawing session, owned by [`super::Session`].
#[derive(Debug, Default)]
pub struct SessionState {
    pub renderer: StrokeRenderer,
    pub history: CanvasHistory,
    pub bindings: VariableBindings,
    pub overlays: OverlayRegistry,
    pub gesture: GestureRouter,
    pub typeset: TypesetGate,
}

impl SessionState {
    pub fn new(style: StrokeStyle) -> Self {
        Self {
            renderer: StrokeRenderer::new(style),
            ..Self::default()
        }
    }

    /// Records the current surface as a new history entry.
    pub(super) fn snapshot_surface(&mut self) {
        if let Some(surface) = self.renderer.surface() {
            self.history.snapshot(surface);
        }
    }

    /// Wipes the surface and restarts history from the blank state.
    pub(super) fn clear_surface(&mut self) {
        self.renderer.clear();
        if let Some(surface) = self.renderer.surface() {
            self.history.reset_to(surface);
        }
    }
}
