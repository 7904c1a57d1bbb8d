//! In-memory surface that records what the engine emits.

use crate::surface::{Cursor, ImplementId, Oval, Polygon, Primitive, Rectangle, Segment, Surface};
use crate::window::WindowGeometry;
use kurbo::Size;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Something that happened on a [`RecordingSurface`].
#[derive(Debug, Clone)]
pub enum SurfaceEvent {
    Draw(Primitive),
    Clear,
    ClearLayer(ImplementId),
    Repaint,
    Flush,
    Resize(Size),
    Geometry(WindowGeometry),
    Iconified(bool),
    Beep,
    Released,
}

#[derive(Debug, Default)]
struct Recording {
    /// Every call in arrival order.
    events: Vec<SurfaceEvent>,
    /// Primitives currently on the canvas.
    display: Vec<Primitive>,
    cursors: HashMap<ImplementId, Cursor>,
}

/// Headless surface for tests and batch drawing.
///
/// Clones share the same recording, so keep one clone as a recorder and hand
/// the other to the window.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    inner: Arc<Mutex<Recording>>,
    layered: bool,
}

impl RecordingSurface {
    /// A single shared canvas with no per-implement layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// A canvas that can erase one implement's marks on its own.
    pub fn layered() -> Self {
        Self {
            inner: Arc::default(),
            layered: true,
        }
    }

    fn recording(&self) -> MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, event: SurfaceEvent) {
        self.recording().events.push(event);
    }

    fn push_primitive(&self, primitive: Primitive) {
        let mut recording = self.recording();
        recording.display.push(primitive.clone());
        recording.events.push(SurfaceEvent::Draw(primitive));
    }

    /// All events so far.
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.recording().events.clone()
    }

    /// Remove and return all events so far. The canvas contents are kept.
    pub fn drain(&self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.recording().events)
    }

    /// Primitives currently on the canvas, in drawing order.
    pub fn primitives(&self) -> Vec<Primitive> {
        self.recording().display.clone()
    }

    /// Primitives issued since the log was last drained, including erased ones.
    pub fn drawn(&self) -> Vec<Primitive> {
        self.recording()
            .events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Draw(primitive) => Some(primitive.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of repaint requests since the log was last drained.
    pub fn repaints(&self) -> usize {
        self.count(|event| matches!(event, SurfaceEvent::Repaint))
    }

    /// Number of flushes since the log was last drained.
    pub fn flushes(&self) -> usize {
        self.count(|event| matches!(event, SurfaceEvent::Flush))
    }

    /// The cursor currently shown for an implement.
    pub fn cursor(&self, owner: ImplementId) -> Option<Cursor> {
        self.recording().cursors.get(&owner).cloned()
    }

    fn count(&self, predicate: impl Fn(&SurfaceEvent) -> bool) -> usize {
        self.recording().events.iter().filter(|event| predicate(event)).count()
    }
}

impl Surface for RecordingSurface {
    fn draw_segment(&mut self, segment: &Segment) {
        self.push_primitive(Primitive::Segment(segment.clone()));
    }

    fn draw_oval(&mut self, oval: &Oval) {
        self.push_primitive(Primitive::Oval(oval.clone()));
    }

    fn draw_rectangle(&mut self, rectangle: &Rectangle) {
        self.push_primitive(Primitive::Rectangle(rectangle.clone()));
    }

    fn draw_polygon(&mut self, polygon: &Polygon) {
        self.push_primitive(Primitive::Polygon(polygon.clone()));
    }

    fn clear(&mut self) {
        let mut recording = self.recording();
        recording.display.clear();
        recording.events.push(SurfaceEvent::Clear);
    }

    fn repaint(&mut self) {
        self.record(SurfaceEvent::Repaint);
    }

    fn flush(&mut self) {
        self.record(SurfaceEvent::Flush);
    }

    fn clear_layer(&mut self, owner: ImplementId) -> bool {
        if !self.layered {
            return false;
        }
        let mut recording = self.recording();
        recording.display.retain(|primitive| primitive.owner() != owner);
        recording.events.push(SurfaceEvent::ClearLayer(owner));
        true
    }

    fn update_cursor(&mut self, owner: ImplementId, cursor: Option<&Cursor>) {
        let mut recording = self.recording();
        match cursor {
            Some(cursor) => {
                recording.cursors.insert(owner, cursor.clone());
            }
            None => {
                recording.cursors.remove(&owner);
            }
        }
    }

    fn resize(&mut self, size: Size) {
        self.record(SurfaceEvent::Resize(size));
    }

    fn apply_geometry(&mut self, geometry: &WindowGeometry) {
        self.record(SurfaceEvent::Geometry(geometry.clone()));
    }

    fn set_iconified(&mut self, iconified: bool) {
        self.record(SurfaceEvent::Iconified(iconified));
    }

    fn beep(&mut self) {
        self.record(SurfaceEvent::Beep);
    }

    fn release(&mut self) {
        let mut recording = self.recording();
        recording.cursors.clear();
        recording.events.push(SurfaceEvent::Released);
    }
}
