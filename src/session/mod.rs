//! Session controller: routes host events to the drawing core and reconciles
//! evaluation results into bindings and overlays.

mod event;
mod state;

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::canvas::StrokeStyle;
use crate::config::{AppConfig, StaleResponsePolicy};
use crate::evaluation::{
    EvaluationCompletion, EvaluationError, EvaluationRequest, EvaluationService, EvaluationTicket,
    EvaluationWorker, HttpEvaluationService,
};
use crate::geometry::SurfaceSize;
use crate::gesture::{GestureEvent, GestureOutcome, PointerTarget};
use crate::notification::Notifier;
use crate::overlay::TypesetRequest;

pub use event::{PointerHit, SessionEvent};
pub use state::SessionState;

const MISSING_ENDPOINT_NOTICE: &str = "API URL is not configured";
const EVALUATION_FAILED_NOTICE: &str =
    "Failed to process calculation. Please check if the backend is running.";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("evaluation endpoint is not configured")]
    MissingEndpoint,
    #[error("drawing surface is not mounted")]
    NotMounted,
    #[error("an evaluation is already in flight")]
    EvaluationInFlight,
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

pub struct Session {
    config: AppConfig,
    state: SessionState,
    worker: Option<EvaluationWorker>,
    notifier: Box<dyn Notifier>,
    epoch: u64,
    scheduled_clears: Vec<Instant>,
}

impl Session {
    pub fn new(
        config: AppConfig,
        service: Option<Arc<dyn EvaluationService>>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let mut style = StrokeStyle::default();
        style.set_color(config.stroke_color());
        style.set_width(config.stroke_width);
        Self {
            state: SessionState::new(style),
            worker: service.map(EvaluationWorker::new),
            notifier,
            epoch: 0,
            scheduled_clears: Vec::new(),
            config,
        }
    }

    /// Builds a session talking to the configured HTTP endpoint. Without an
    /// endpoint the session still draws; evaluate then reports the missing
    /// configuration.
    pub fn with_http_service(config: AppConfig, notifier: Box<dyn Notifier>) -> SessionResult<Self> {
        let service = match config.endpoint() {
            Some(api_url) => {
                let service = HttpEvaluationService::new(api_url, config.request_timeout())?;
                tracing::info!(endpoint = service.endpoint(), "evaluation service configured");
                Some(Arc::new(service) as Arc<dyn EvaluationService>)
            }
            None => {
                tracing::warn!("no evaluation endpoint configured");
                None
            }
        };
        Ok(Self::new(config, service, notifier))
    }

    /// Attaches the drawing surface and seeds history with its blank state.
    /// The size stays fixed for the rest of the session.
    pub fn mount(&mut self, size: SurfaceSize) {
        if self.state.renderer.is_attached() {
            tracing::debug!(?size, "surface already mounted; keeping original size");
            return;
        }
        self.state.renderer.attach(size);
        self.state.snapshot_surface();
        tracing::info!(width = size.width, height = size.height, "drawing surface mounted");
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn can_undo(&self) -> bool {
        self.state.history.can_undo()
    }

    pub fn in_flight(&self) -> usize {
        self.worker.as_ref().map_or(0, EvaluationWorker::in_flight)
    }

    pub fn pending_clear_count(&self) -> usize {
        self.scheduled_clears.len()
    }

    pub fn take_typeset_request(&mut self) -> Option<TypesetRequest> {
        let revision = self.state.overlays.revision();
        let has_annotations = !self.state.overlays.is_empty();
        self.state.typeset.take_request(revision, has_annotations)
    }

    pub fn dispatch(&mut self, event: SessionEvent) {
        self.dispatch_at(event, Instant::now());
    }

    pub fn dispatch_at(&mut self, event: SessionEvent, now: Instant) {
        match event {
            SessionEvent::PointerDown { position, hit } => {
                let target = match hit {
                    PointerHit::Surface => PointerTarget::Surface,
                    PointerHit::Annotation(id) => {
                        let Some(annotation) = self.state.overlays.get(&id) else {
                            tracing::debug!(%id, "pointer down on unknown annotation ignored");
                            return;
                        };
                        PointerTarget::Annotation {
                            origin: annotation.position,
                            id,
                        }
                    }
                };
                self.route_gesture(GestureEvent::PointerDown { position, target });
            }
            SessionEvent::PointerMove { position } => {
                self.route_gesture(GestureEvent::PointerMove { position });
            }
            SessionEvent::PointerUp { position } => {
                self.route_gesture(GestureEvent::PointerUp { position });
            }
            SessionEvent::PointerLeave => self.route_gesture(GestureEvent::PointerLeave),
            SessionEvent::ColorSelected(color) => {
                tracing::debug!(%color, "stroke color selected");
                self.state.renderer.set_color(color);
            }
            SessionEvent::UndoRequested => {
                self.undo();
            }
            SessionEvent::ResetRequested => self.reset(),
            SessionEvent::EvaluateRequested => {
                if let Err(err) = self.evaluate() {
                    self.report_evaluate_error(&err);
                }
            }
            SessionEvent::EvaluationCompleted(completion) => {
                self.apply_completion(completion, now);
            }
            SessionEvent::SurfaceResized(size) => {
                tracing::debug!(?size, "surface resize ignored; size is fixed at mount");
            }
            SessionEvent::TypesetReady => self.state.typeset.mark_ready(),
            SessionEvent::Unload => self.unload(),
        }
    }

    /// Processes finished evaluations and fires surface clears that are due.
    pub fn tick(&mut self, now: Instant) {
        let completions = self
            .worker
            .as_mut()
            .map(EvaluationWorker::try_collect)
            .unwrap_or_default();
        for completion in completions {
            self.dispatch_at(SessionEvent::EvaluationCompleted(completion), now);
        }
        self.fire_due_clears(now);
    }

    /// Blocks until in-flight evaluations report (each wait bounded by
    /// `timeout`) and applies them as of `now`.
    pub fn wait_for_evaluations(&mut self, timeout: Duration, now: Instant) {
        let completions = self
            .worker
            .as_mut()
            .map(|worker| worker.collect_blocking(timeout))
            .unwrap_or_default();
        for completion in completions {
            self.dispatch_at(SessionEvent::EvaluationCompleted(completion), now);
        }
    }

    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.state.history.undo() else {
            tracing::debug!("undo requested with no earlier step");
            return false;
        };
        self.state.renderer.restore(&entry)
    }

    pub fn reset(&mut self) {
        self.state.gesture.cancel();
        self.state.renderer.clear();
        self.state.history.clear();
        self.state.bindings.clear();
        self.state.overlays.clear();
        self.state.snapshot_surface();
        self.scheduled_clears.clear();
        self.epoch = self.epoch.wrapping_add(1);
        tracing::info!(epoch = self.epoch, "session reset");
    }

    pub fn evaluate(&mut self) -> SessionResult<EvaluationTicket> {
        let Some(worker) = self.worker.as_mut() else {
            return Err(SessionError::MissingEndpoint);
        };
        if !self.config.allow_concurrent_evaluations && worker.in_flight() > 0 {
            return Err(SessionError::EvaluationInFlight);
        }
        let surface = self
            .state
            .renderer
            .surface()
            .ok_or(SessionError::NotMounted)?;
        let request = EvaluationRequest::from_surface(surface, self.state.bindings.snapshot())?;
        Ok(worker.spawn(request, self.epoch))
    }

    fn unload(&mut self) {
        if self.state.gesture.is_dragging() {
            self.state.gesture.cancel();
        } else if self.state.gesture.is_drawing() {
            self.route_gesture(GestureEvent::PointerLeave);
        }
        self.state.overlays.clear();
        tracing::info!("session unloaded; annotations cleared");
    }

    fn report_evaluate_error(&self, err: &SessionError) {
        match err {
            SessionError::MissingEndpoint => {
                tracing::error!("evaluation endpoint is not set");
                self.notifier.notify(MISSING_ENDPOINT_NOTICE);
            }
            SessionError::Evaluation(err) => {
                tracing::error!(%err, "evaluation request could not be prepared");
                self.notifier.notify(EVALUATION_FAILED_NOTICE);
            }
            SessionError::NotMounted | SessionError::EvaluationInFlight => {
                tracing::debug!(%err, "evaluate ignored");
            }
        }
    }

    fn route_gesture(&mut self, event: GestureEvent) {
        match self.state.gesture.handle(event) {
            GestureOutcome::BeginStroke(point) => self.state.renderer.begin_stroke(point),
            GestureOutcome::ExtendStroke(point) => self.state.renderer.extend_stroke(point),
            GestureOutcome::FinishStroke => {
                self.state.renderer.end_stroke();
                self.state.snapshot_surface();
            }
            GestureOutcome::DragStarted(id) => tracing::debug!(%id, "annotation drag started"),
            GestureOutcome::MoveAnnotation { id, position } => {
                self.state.overlays.reposition(&id, position);
            }
            GestureOutcome::DragEnded(id) => tracing::debug!(%id, "annotation drag ended"),
            GestureOutcome::Ignored => {}
        }
    }

    fn apply_completion(&mut self, completion: EvaluationCompletion, now: Instant) {
        let EvaluationCompletion { ticket, outcome } = completion;
        if ticket.epoch != self.epoch && self.config.stale_responses == StaleResponsePolicy::Discard
        {
            tracing::info!(
                id = ticket.id,
                request_epoch = ticket.epoch,
                epoch = self.epoch,
                "discarding evaluation response from before reset"
            );
            return;
        }

        let records = match outcome {
            Ok(records) => records,
            Err(err) => {
                tracing::error!(id = ticket.id, %err, "evaluation failed");
                self.notifier.notify(EVALUATION_FAILED_NOTICE);
                return;
            }
        };

        for record in records.iter().filter(|record| record.assign) {
            self.state.bindings.upsert(&record.expr, &record.result);
        }

        let center = self
            .state
            .renderer
            .size()
            .map(SurfaceSize::center)
            .unwrap_or_default();
        let added = self
            .state
            .overlays
            .add(&records, center, self.config.annotation_placement);

        self.scheduled_clears.push(now + self.config.clear_delay());
        tracing::info!(
            id = ticket.id,
            annotations = added.len(),
            bindings = self.state.bindings.len(),
            "evaluation applied; surface clear scheduled"
        );
    }

    fn fire_due_clears(&mut self, now: Instant) {
        let before = self.scheduled_clears.len();
        self.scheduled_clears.retain(|deadline| *deadline > now);
        let due = before - self.scheduled_clears.len();
        if due > 0 {
            self.state.clear_surface();
            tracing::debug!(due, "scheduled surface clear fired");
        }
    }
}
