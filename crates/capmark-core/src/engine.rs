//! Annotation session orchestration.
//!
//! [`AnnotationEngine`] owns one session: the history, the live tool state and
//! the active tool. Pointer input arrives in canvas coordinates and is mapped
//! into image space before any tool sees it. The engine is single-threaded and
//! every mutating call takes `&mut self`.

use crate::annotation::{Annotation, AnnotationId, AnnotationKind};
use crate::color::SerializableColor;
use crate::config::EngineConfig;
use crate::history::HistoryManager;
use crate::persistence::{AnnotationStore, StoreResult, decode_records, encode_records};
use crate::properties::{ArrowheadStyle, FontWeight};
use crate::render::{ApproximateMeasurer, FadedContext, GraphicsContext, TextMeasurer};
use crate::tools::{Tool, ToolKind, ToolState, hit_test_annotation, render_annotation};
use crate::transform::CoordinateTransform;
use kurbo::{Point, Rect, Size, Vec2};

pub struct AnnotationEngine {
    history: HistoryManager,
    state: ToolState,
    tool: Tool,
    transform: CoordinateTransform,
    measurer: Box<dyn TextMeasurer>,
    config: EngineConfig,
}

impl AnnotationEngine {
    /// Engine for an image of `image_size`, shown on a canvas of the same size
    /// until [`set_canvas_size`](Self::set_canvas_size) is called.
    pub fn new(image_size: Size) -> Self {
        Self::with_config(image_size, EngineConfig::default())
    }

    pub fn with_config(image_size: Size, config: EngineConfig) -> Self {
        let state = config.tool_state();
        Self {
            history: HistoryManager::new(config.max_undo_history),
            tool: Tool::new(state.tool, &state),
            state,
            transform: CoordinateTransform::new(image_size, image_size),
            measurer: Box::new(ApproximateMeasurer),
            config,
        }
    }

    /// Use a real text layout for sizing text annotations.
    pub fn with_measurer(mut self, measurer: Box<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    /// End the session: drop all annotations, history and tool settings.
    pub fn reset(&mut self) {
        self.state = self.config.tool_state();
        self.tool = Tool::new(self.state.tool, &self.state);
        self.history = HistoryManager::new(self.config.max_undo_history);
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.history.annotations()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn tool_state(&self) -> &ToolState {
        &self.state
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn image_size(&self) -> Size {
        self.transform.image_size()
    }

    pub fn set_canvas_size(&mut self, canvas_size: Size) {
        if self.transform.canvas_size() != canvas_size {
            self.transform.set_canvas_size(canvas_size);
        }
    }

    // --- Tool state ---

    /// Switch tools, applying the new tool's defaults. An open text session is
    /// committed first.
    pub fn select_tool(&mut self, kind: ToolKind) {
        if self.is_editing_text() {
            self.commit_text();
        }
        self.tool.cancel();
        self.state.select_tool(kind);
        self.tool = Tool::new(kind, &self.state);
        log::debug!("Selected tool: {}", kind.as_str());
    }

    fn update_state(&mut self, change: impl FnOnce(&mut ToolState)) {
        change(&mut self.state);
        self.tool.configure(&self.state);
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.update_state(|s| s.set_color(color));
    }

    pub fn set_thickness(&mut self, thickness: f64) {
        self.update_state(|s| s.set_thickness(thickness));
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.update_state(|s| s.set_font_size(size));
    }

    pub fn set_font_weight(&mut self, weight: FontWeight) {
        self.update_state(|s| s.set_font_weight(weight));
    }

    pub fn set_text_background(&mut self, color: Option<SerializableColor>) {
        self.update_state(|s| s.set_text_background(color));
    }

    pub fn set_arrowhead_style(&mut self, style: ArrowheadStyle) {
        self.update_state(|s| s.set_arrowhead_style(style));
    }

    pub fn set_fill_color(&mut self, color: Option<SerializableColor>) {
        self.update_state(|s| s.set_fill_color(color));
    }

    pub fn set_fill_opacity(&mut self, opacity: f64) {
        self.update_state(|s| s.set_fill_opacity(opacity));
    }

    pub fn set_highlight_opacity(&mut self, opacity: f64) {
        self.update_state(|s| s.set_highlight_opacity(opacity));
    }

    pub fn set_blur_radius(&mut self, radius: f64) {
        self.update_state(|s| s.set_blur_radius(radius));
    }

    // --- Drawing ---

    /// Pointer down at a canvas point. With the text tool this opens an
    /// editing session, committing any session already open. Presses off the
    /// image are ignored.
    pub fn draw_start(&mut self, canvas_point: Point) {
        if !self.transform.contains_canvas_point(canvas_point) {
            log::debug!("Ignoring draw start off the image at {canvas_point:?}");
            return;
        }
        if self.is_editing_text() {
            self.commit_text();
        }
        let point = self.transform.to_image(canvas_point);
        self.tool.draw_start(point, &self.state);
    }

    /// Drags past the image edge are clamped onto it.
    pub fn draw_update(&mut self, canvas_point: Point) {
        let point = self.transform.to_image_clamped(canvas_point);
        self.tool.draw_update(point, &self.state);
    }

    /// Pointer up. Returns the id of the annotation created, if any.
    pub fn draw_end(&mut self, canvas_point: Point) -> Option<AnnotationId> {
        let point = self.transform.to_image_clamped(canvas_point);
        let annotation = self.tool.draw_end(point, &self.state)?;
        Some(self.commit(annotation))
    }

    /// A tap places a text cursor when the text tool is active. Returns
    /// whether a session is open afterwards.
    pub fn tap(&mut self, canvas_point: Point) -> bool {
        if self.tool.kind() != AnnotationKind::Text {
            return false;
        }
        self.draw_start(canvas_point);
        self.is_editing_text()
    }

    /// Abort any drag or text session. History is untouched.
    pub fn cancel_drawing(&mut self) {
        self.tool.cancel();
    }

    pub fn is_drawing(&self) -> bool {
        self.tool.is_active()
    }

    fn commit(&mut self, annotation: Annotation) -> AnnotationId {
        let id = annotation.id();
        log::debug!("Adding {} annotation {}", annotation.kind().as_str(), id);
        self.history.add_annotation(annotation);
        id
    }

    // --- Text ---

    pub fn is_editing_text(&self) -> bool {
        self.tool.as_text().is_some_and(|t| t.is_editing())
    }

    pub fn editing_text(&self) -> Option<&str> {
        self.tool.as_text().and_then(|t| t.text())
    }

    pub fn insert_text(&mut self, text: &str) -> bool {
        self.tool.as_text_mut().is_some_and(|t| t.insert_text(text))
    }

    pub fn set_text(&mut self, text: &str) -> bool {
        self.tool.as_text_mut().is_some_and(|t| t.set_text(text))
    }

    pub fn backspace(&mut self) -> bool {
        self.tool.as_text_mut().is_some_and(|t| t.backspace())
    }

    /// Close the text session. Returns the id of the new annotation, or
    /// `None` when the text was empty or no session was open.
    pub fn commit_text(&mut self) -> Option<AnnotationId> {
        let text = self.tool.as_text_mut()?;
        let annotation = text.finish(self.measurer.as_mut())?;
        Some(self.commit(annotation))
    }

    pub fn cancel_text(&mut self) {
        if let Some(text) = self.tool.as_text_mut() {
            text.cancel();
        }
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn remove_annotation(&mut self, id: AnnotationId) -> bool {
        self.history.remove_annotation(id)
    }

    pub fn modify_annotation(&mut self, id: AnnotationId, annotation: Annotation) -> bool {
        self.history.modify_annotation(id, annotation)
    }

    /// Move an annotation by `delta` in image units.
    pub fn translate_annotation(&mut self, id: AnnotationId, delta: Vec2) -> bool {
        let Some(moved) = self.history.get(id).map(|a| a.translated(delta)) else {
            return false;
        };
        self.history.modify_annotation(id, moved)
    }

    pub fn clear_all(&mut self) -> bool {
        self.history.clear_all()
    }

    // --- Queries ---

    /// Topmost annotation under a canvas point.
    pub fn annotation_at(&self, canvas_point: Point) -> Option<&Annotation> {
        let point = self.transform.to_image(canvas_point);
        self.annotations()
            .iter()
            .rev()
            .find(|a| hit_test_annotation(point, a))
    }

    /// Annotations whose bounds touch a canvas rectangle.
    pub fn annotations_in(&self, canvas_rect: Rect) -> Vec<&Annotation> {
        self.history.intersecting(self.transform.rect_to_image(canvas_rect))
    }

    // --- Rendering ---

    /// Shape the active gesture would produce right now.
    pub fn preview(&mut self) -> Option<Annotation> {
        self.tool.preview(self.measurer.as_mut())
    }

    /// Draw every committed annotation, then the in-progress preview faded.
    pub fn render(&mut self, gc: &mut dyn GraphicsContext, canvas_size: Size) {
        self.set_canvas_size(canvas_size);
        let transform = self.transform.affine();
        for annotation in self.history.annotations() {
            render_annotation(annotation, gc, transform);
        }
        if let Some(preview) = self.tool.preview(self.measurer.as_mut()) {
            let mut faded = FadedContext::new(gc, FadedContext::PREVIEW_ALPHA);
            render_annotation(&preview, &mut faded, transform);
        }
    }

    // --- Persistence ---

    /// Encode the committed annotations as normalized records.
    pub fn export_records(&self) -> Vec<serde_json::Value> {
        encode_records(self.annotations(), self.image_size())
    }

    /// Replace the annotations with decoded records. Malformed records are
    /// skipped; history is cleared. Returns how many were loaded.
    pub fn import_records(&mut self, records: &[serde_json::Value]) -> usize {
        self.tool.cancel();
        let annotations = decode_records(records, self.image_size());
        let loaded = annotations.len();
        if loaded < records.len() {
            log::warn!("Loaded {loaded} of {} annotation records", records.len());
        } else {
            log::info!("Loaded {loaded} annotation records");
        }
        self.history.set_annotations(annotations);
        loaded
    }

    pub async fn save_to(&self, store: &dyn AnnotationStore, capture_id: &str) -> StoreResult<usize> {
        let records = self.export_records();
        store.save(capture_id, &records).await?;
        Ok(records.len())
    }

    pub async fn load_from(&mut self, store: &dyn AnnotationStore, capture_id: &str) -> StoreResult<usize> {
        let records = store.load(capture_id).await?;
        Ok(self.import_records(&records))
    }
}
