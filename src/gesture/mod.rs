pub mod machine;
pub mod model;

pub use machine::GestureRouter;
pub use model::{
    DragState, GestureEvent, GestureEventKind, GestureMode, GestureModeKind, GestureOutcome,
    PointerTarget,
};
