//! Positioned result annotations layered over the drawing surface.

mod id;
mod typeset;

use serde::Deserialize;

use crate::evaluation::EvaluationRecord;
use crate::geometry::Point;

pub use id::AnnotationId;
pub use typeset::{TypesetGate, TypesetRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultAnnotation {
    pub id: AnnotationId,
    pub expression: String,
    pub answer: String,
    pub position: Point,
}

impl ResultAnnotation {
    /// Markup handed to the typeset renderer, or shown as-is without it.
    pub fn label(&self) -> String {
        format!("{} = {}", self.expression, self.answer)
    }
}

/// Where the annotations of one evaluation batch land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationPlacement {
    /// Every annotation of the batch sits exactly on the center.
    #[default]
    Stacked,
    /// The n-th annotation of the batch is shifted by `n * step` on both axes.
    Cascade { step: i32 },
}

impl AnnotationPlacement {
    fn position_for(self, center: Point, batch_index: usize) -> Point {
        match self {
            Self::Stacked => center,
            Self::Cascade { step } => {
                let index = i32::try_from(batch_index).unwrap_or(i32::MAX);
                let shift = index.saturating_mul(step);
                center.translated(shift, shift)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct OverlayRegistry {
    annotations: Vec<ResultAnnotation>,
    revision: u64,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn allocate_id(&self) -> AnnotationId {
        loop {
            let id = AnnotationId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Appends one annotation per record; existing annotations are kept.
    pub fn add(
        &mut self,
        records: &[EvaluationRecord],
        center: Point,
        placement: AnnotationPlacement,
    ) -> Vec<AnnotationId> {
        let mut added = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let id = self.allocate_id();
            self.annotations.push(ResultAnnotation {
                id: id.clone(),
                expression: record.expr.clone(),
                answer: record.result.clone(),
                position: placement.position_for(center, index),
            });
            added.push(id);
        }
        if !added.is_empty() {
            self.bump_revision();
        }
        tracing::debug!(added = added.len(), total = self.annotations.len(), "annotations added");
        added
    }

    /// Moves one annotation. Unknown ids are ignored and reported as `false`.
    pub fn reposition(&mut self, id: &AnnotationId, position: Point) -> bool {
        let Some(annotation) = self
            .annotations
            .iter_mut()
            .find(|annotation| &annotation.id == id)
        else {
            tracing::debug!(%id, "reposition requested for unknown annotation");
            return false;
        };
        if annotation.position != position {
            annotation.position = position;
            self.bump_revision();
        }
        true
    }

    pub fn clear(&mut self) {
        if self.annotations.is_empty() {
            return;
        }
        self.annotations.clear();
        self.bump_revision();
    }

    pub fn get(&self, id: &AnnotationId) -> Option<&ResultAnnotation> {
        self.annotations.iter().find(|annotation| &annotation.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultAnnotation> {
        self.annotations.iter()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
