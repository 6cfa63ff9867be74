/// One-shot readiness gate for the external typeset renderer.
///
/// Until the renderer reports readiness no typeset pass is requested and
/// annotations stay plain text. After that, a pass is requested whenever the
/// overlay revision differs from the one last handed out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypesetGate {
    ready: bool,
    typeset_revision: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypesetRequest {
    pub revision: u64,
}

impl TypesetGate {
    pub const fn new() -> Self {
        Self {
            ready: false,
            typeset_revision: None,
        }
    }

    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn mark_ready(&mut self) {
        if !self.ready {
            tracing::info!("typeset renderer ready");
        }
        self.ready = true;
    }

    pub fn take_request(&mut self, revision: u64, has_annotations: bool) -> Option<TypesetRequest> {
        if !self.ready || !has_annotations || self.typeset_revision == Some(revision) {
            return None;
        }
        self.typeset_revision = Some(revision);
        Some(TypesetRequest { revision })
    }
}
