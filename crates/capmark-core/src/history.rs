//! Command-based undo/redo over the annotation list.
//!
//! Every command carries a full snapshot of the list as it was when the
//! command was built; undo restores that snapshot verbatim.

use crate::annotation::{Annotation, AnnotationId, AnnotationKind};
use crate::geometry::rects_touch;
use crate::tools::hit_test_annotation;
use kurbo::{Point, Rect};
use std::collections::VecDeque;

/// Default maximum number of undoable commands.
pub const MAX_UNDO_HISTORY: usize = 100;

/// A reversible change to the annotation list.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add {
        annotation: Annotation,
        previous: Vec<Annotation>,
    },
    Remove {
        id: AnnotationId,
        previous: Vec<Annotation>,
    },
    Modify {
        id: AnnotationId,
        annotation: Annotation,
        previous: Vec<Annotation>,
    },
    ClearAll {
        previous: Vec<Annotation>,
    },
}

impl Command {
    /// List after this command runs on `annotations`.
    pub fn apply(&self, annotations: &[Annotation]) -> Vec<Annotation> {
        match self {
            Command::Add { annotation, .. } => {
                let mut next = annotations.to_vec();
                next.push(annotation.clone());
                next
            }
            Command::Remove { id, .. } => annotations
                .iter()
                .filter(|a| a.id() != *id)
                .cloned()
                .collect(),
            Command::Modify { id, annotation, .. } => annotations
                .iter()
                .map(|a| {
                    if a.id() == *id {
                        annotation.clone()
                    } else {
                        a.clone()
                    }
                })
                .collect(),
            Command::ClearAll { .. } => Vec::new(),
        }
    }

    /// List before this command ran.
    pub fn invert(&self) -> Vec<Annotation> {
        self.previous().to_vec()
    }

    pub fn previous(&self) -> &[Annotation] {
        match self {
            Command::Add { previous, .. }
            | Command::Remove { previous, .. }
            | Command::Modify { previous, .. }
            | Command::ClearAll { previous } => previous,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Add { .. } => "add",
            Command::Remove { .. } => "remove",
            Command::Modify { .. } => "modify",
            Command::ClearAll { .. } => "clear",
        }
    }
}

/// Current annotations plus the undo and redo stacks.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    annotations: Vec<Annotation>,
    undo_stack: VecDeque<Command>,
    redo_stack: Vec<Command>,
    max_undo: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(MAX_UNDO_HISTORY)
    }
}

impl HistoryManager {
    pub fn new(max_undo: usize) -> Self {
        Self {
            annotations: Vec::new(),
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo: max_undo.max(1),
        }
    }

    /// Annotations in insertion (display) order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Run a command and record it. Clears the redo stack.
    pub fn execute(&mut self, command: Command) {
        self.redo_stack.clear();
        self.annotations = command.apply(&self.annotations);
        log::debug!("Executed {} ({} annotations)", command.name(), self.annotations.len());
        self.undo_stack.push_back(command);
        if self.undo_stack.len() > self.max_undo {
            if let Some(evicted) = self.undo_stack.pop_front() {
                log::debug!("Undo history full, dropped oldest {}", evicted.name());
            }
        }
    }

    /// Undo the last command. Returns false if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(command) = self.undo_stack.pop_back() else {
            return false;
        };
        self.annotations = command.invert();
        self.redo_stack.push(command);
        true
    }

    /// Redo the last undone command. Returns false if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(command) = self.redo_stack.pop() else {
            return false;
        };
        self.annotations = command.apply(&self.annotations);
        self.undo_stack.push_back(command);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        let previous = self.annotations.clone();
        self.execute(Command::Add {
            annotation,
            previous,
        });
    }

    /// Returns false (recording nothing) for an unknown id.
    pub fn remove_annotation(&mut self, id: AnnotationId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let previous = self.annotations.clone();
        self.execute(Command::Remove { id, previous });
        true
    }

    /// Replace the annotation with `id`. The replacement keeps the original id.
    /// Returns false (recording nothing) for an unknown id.
    pub fn modify_annotation(&mut self, id: AnnotationId, annotation: Annotation) -> bool {
        let Some(current) = self.get(id) else {
            return false;
        };
        let annotation = current.with_shape(annotation.shape().clone());
        let previous = self.annotations.clone();
        self.execute(Command::Modify {
            id,
            annotation,
            previous,
        });
        true
    }

    /// Returns false (recording nothing) when the list is already empty.
    pub fn clear_all(&mut self) -> bool {
        if self.annotations.is_empty() {
            return false;
        }
        let previous = self.annotations.clone();
        self.execute(Command::ClearAll { previous });
        true
    }

    /// Replace the list wholesale, e.g. after loading. Not undoable: both
    /// stacks are cleared.
    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id() == id)
    }

    pub fn of_kind(&self, kind: AnnotationKind) -> Vec<&Annotation> {
        self.annotations.iter().filter(|a| a.kind() == kind).collect()
    }

    /// Annotations whose bounds touch `rect` (image space).
    pub fn intersecting(&self, rect: Rect) -> Vec<&Annotation> {
        self.annotations
            .iter()
            .filter(|a| rects_touch(a.bounds(), rect))
            .collect()
    }

    /// Annotations hit at `point` (image space), in display order.
    pub fn containing(&self, point: Point) -> Vec<&Annotation> {
        self.annotations
            .iter()
            .filter(|a| hit_test_annotation(point, a))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{ArrowGeometry, RectGeometry};
    use crate::properties::{ArrowProperties, HighlightProperties, RectangleProperties};

    fn rect(x: f64) -> Annotation {
        Annotation::rectangle(
            RectangleProperties::default(),
            RectGeometry::new(Point::new(x, 0.0), 20.0, 20.0),
        )
    }

    #[test]
    fn test_add_undo_redo() {
        let mut history = HistoryManager::default();
        let a = rect(0.0);
        let b = rect(50.0);
        history.add_annotation(a.clone());
        history.add_annotation(b.clone());
        assert_eq!(history.annotations(), &[a.clone(), b.clone()]);

        assert!(history.undo());
        assert_eq!(history.annotations(), &[a.clone()]);
        assert!(history.redo());
        assert_eq!(history.annotations(), &[a.clone(), b]);

        assert!(history.undo());
        assert!(history.undo());
        assert!(history.is_empty());
        assert!(!history.undo());
    }

    #[test]
    fn test_execute_clears_redo() {
        let mut history = HistoryManager::default();
        history.add_annotation(rect(0.0));
        history.undo();
        assert!(history.can_redo());
        history.add_annotation(rect(10.0));
        assert!(!history.can_redo());
        assert!(!history.redo());
    }

    #[test]
    fn test_undo_cap_evicts_oldest() {
        let mut history = HistoryManager::default();
        for i in 0..150 {
            history.add_annotation(rect(i as f64));
        }
        assert_eq!(history.undo_len(), MAX_UNDO_HISTORY);
        assert_eq!(history.len(), 150);

        while history.undo() {}
        // The oldest 50 additions can no longer be undone
        assert_eq!(history.len(), 50);
    }

    #[test]
    fn test_remove_and_modify() {
        let mut history = HistoryManager::default();
        let a = rect(0.0);
        history.add_annotation(a.clone());

        let moved = a.translated(kurbo::Vec2::new(5.0, 0.0));
        assert!(history.modify_annotation(a.id(), moved.clone()));
        assert_eq!(history.get(a.id()), Some(&moved));

        assert!(history.remove_annotation(a.id()));
        assert!(history.get(a.id()).is_none());

        assert!(history.undo());
        assert_eq!(history.get(a.id()), Some(&moved));
        assert!(history.undo());
        assert_eq!(history.get(a.id()), Some(&a));
    }

    #[test]
    fn test_modify_keeps_identity() {
        let mut history = HistoryManager::default();
        let a = rect(0.0);
        history.add_annotation(a.clone());
        let replacement = rect(300.0);
        assert!(history.modify_annotation(a.id(), replacement));
        let stored = history.get(a.id()).unwrap();
        assert_eq!(stored.timestamp(), a.timestamp());
        assert!((stored.bounds().x0 - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_id_and_empty_clear_record_nothing() {
        let mut history = HistoryManager::default();
        assert!(!history.clear_all());
        assert!(!history.remove_annotation(uuid::Uuid::new_v4()));
        assert!(!history.modify_annotation(uuid::Uuid::new_v4(), rect(0.0)));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_clear_all_is_undoable() {
        let mut history = HistoryManager::default();
        history.add_annotation(rect(0.0));
        history.add_annotation(rect(40.0));
        assert!(history.clear_all());
        assert!(history.is_empty());
        assert!(history.undo());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_set_annotations_is_not_undoable() {
        let mut history = HistoryManager::default();
        history.add_annotation(rect(0.0));
        history.undo();
        history.set_annotations(vec![rect(1.0), rect(2.0)]);
        assert_eq!(history.len(), 2);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_queries() {
        let mut history = HistoryManager::default();
        let r = rect(0.0);
        let arrow = Annotation::arrow(
            ArrowProperties::default(),
            ArrowGeometry::new(Point::new(100.0, 50.0), Point::new(200.0, 50.0)),
        );
        let hl = Annotation::highlight(
            HighlightProperties::default(),
            RectGeometry::new(Point::new(0.0, 0.0), 300.0, 300.0),
        );
        history.add_annotation(r.clone());
        history.add_annotation(arrow.clone());
        history.add_annotation(hl.clone());

        assert_eq!(history.of_kind(AnnotationKind::Arrow), vec![&arrow]);
        // A zero-height arrow envelope still intersects
        let hits = history.intersecting(Rect::new(150.0, 40.0, 160.0, 60.0));
        assert_eq!(hits, vec![&arrow, &hl]);
        let at = history.containing(Point::new(150.0, 50.0));
        assert_eq!(at, vec![&arrow, &hl]);
    }
}
