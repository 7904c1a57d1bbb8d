//! Vello-backed canvas surface.

use crate::display::DisplayList;
use crate::renderer::{
    RenderError, RenderResult, cursor_path, oval_ellipse, polygon_path, segment_line, stroke_for,
};
use kurbo::{Affine, Rect, Size, Stroke};
use peniko::{Color, Fill};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use turtleink_core::{
    Cursor, ImplementId, Oval, Polygon, Primitive, Rectangle, Segment, Surface, WindowGeometry,
};
use vello::Scene;

struct SceneState {
    display: DisplayList,
    /// Background plus every primitive painted so far, without cursors.
    canvas: Scene,
    /// How many display list primitives `canvas` already holds.
    painted: usize,
    /// Set when primitives were removed or the size changed, so `canvas`
    /// no longer matches a prefix of the display list.
    stale: bool,
    scene: Scene,
    background: Color,
    /// Scenes built so far.
    frames: u64,
    /// Times `canvas` was rebuilt from scratch.
    rebuilds: u64,
    /// Whether the display list changed since the last scene was built.
    dirty: bool,
    title: String,
    iconified: bool,
}

impl SceneState {
    fn push(&mut self, primitive: Primitive) {
        match self.display.push(primitive) {
            Ok(()) => self.dirty = true,
            Err(e) => log::warn!("Dropping primitive: {}", e),
        }
    }

    fn invalidate(&mut self) {
        self.stale = true;
        self.dirty = true;
    }

    /// Paint primitives added since the last frame onto the canvas, then
    /// compose the canvas and the cursors into a new scene.
    fn build_scene(&mut self) {
        let transform = Affine::IDENTITY;
        if self.stale || self.frames == 0 {
            self.canvas.reset();
            let size = self.display.size();
            self.canvas.fill(
                Fill::NonZero,
                transform,
                self.background,
                None,
                &Rect::from_origin_size((0.0, 0.0), size),
            );
            self.painted = 0;
            self.stale = false;
            self.rebuilds += 1;
        }
        for primitive in &self.display.primitives()[self.painted..] {
            render_primitive(&mut self.canvas, primitive, transform);
        }
        self.painted = self.display.len();

        self.scene.reset();
        self.scene.append(&self.canvas, None);
        for cursor in self.display.cursors() {
            render_cursor(&mut self.scene, cursor, transform);
        }
        self.frames += 1;
        self.dirty = false;
    }
}

fn render_primitive(scene: &mut Scene, primitive: &Primitive, transform: Affine) {
    match primitive {
        Primitive::Segment(segment) => render_segment(scene, segment, transform),
        Primitive::Oval(oval) => render_oval(scene, oval, transform),
        Primitive::Rectangle(rectangle) => render_rectangle(scene, rectangle, transform),
        Primitive::Polygon(polygon) => render_polygon(scene, polygon, transform),
    }
}

fn render_segment(scene: &mut Scene, segment: &Segment, transform: Affine) {
    let stroke = stroke_for(&segment.style, segment.dash_offset);
    scene.stroke(&stroke, transform, segment.style.color, None, &segment_line(segment));
}

fn render_oval(scene: &mut Scene, oval: &Oval, transform: Affine) {
    let ellipse = oval_ellipse(oval);
    if let Some(fill) = oval.fill {
        scene.fill(Fill::NonZero, transform, fill, None, &ellipse);
    }
    let stroke = stroke_for(&oval.style, 0.0);
    scene.stroke(&stroke, transform, oval.style.color, None, &ellipse);
}

fn render_rectangle(scene: &mut Scene, rectangle: &Rectangle, transform: Affine) {
    if let Some(fill) = rectangle.fill {
        scene.fill(Fill::NonZero, transform, fill, None, &rectangle.bounds);
    }
    let stroke = stroke_for(&rectangle.style, 0.0);
    scene.stroke(&stroke, transform, rectangle.style.color, None, &rectangle.bounds);
}

fn render_polygon(scene: &mut Scene, polygon: &Polygon, transform: Affine) {
    scene.fill(Fill::NonZero, transform, polygon.fill, None, &polygon_path(polygon));
}

fn render_cursor(scene: &mut Scene, cursor: &Cursor, transform: Affine) {
    let path = cursor_path(cursor);
    scene.fill(Fill::NonZero, transform, cursor.fill, None, &path);
    scene.stroke(&Stroke::new(1.0), transform, cursor.edge, None, &path);
}

/// A [`Surface`] that keeps a per-implement display list and builds a
/// vello [`Scene`] on every repaint.
///
/// Primitives are painted once onto a retained canvas scene; each repaint
/// only paints what was added since the last one. Clears and resizes
/// repaint the canvas from the display list.
///
/// Clones share the same canvas: hand one to the window and keep another
/// to pick up finished scenes for a GPU renderer or an export.
#[derive(Clone)]
pub struct SceneSurface {
    state: Arc<Mutex<SceneState>>,
}

impl std::fmt::Debug for SceneSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneSurface").finish_non_exhaustive()
    }
}

impl Default for SceneSurface {
    fn default() -> Self {
        Self::new(Color::from_rgba8(255, 255, 255, 255))
    }
}

impl SceneSurface {
    /// Create an empty canvas with the given background.
    pub fn new(background: Color) -> Self {
        Self {
            state: Arc::new(Mutex::new(SceneState {
                display: DisplayList::default(),
                canvas: Scene::new(),
                painted: 0,
                stale: false,
                scene: Scene::new(),
                background,
                frames: 0,
                rebuilds: 0,
                dirty: false,
                title: String::new(),
                iconified: false,
            })),
        }
    }

    fn lock(&self) -> RenderResult<MutexGuard<'_, SceneState>> {
        self.state.lock().map_err(|_| RenderError::Poisoned)
    }

    // Surface calls cannot report errors; keep painting with whatever the
    // poisoned lock holds.
    fn lock_for_paint(&self) -> MutexGuard<'_, SceneState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The most recently built scene.
    pub fn scene(&self) -> RenderResult<Scene> {
        Ok(self.lock()?.scene.clone())
    }

    /// Take the most recently built scene, leaving an empty one.
    pub fn take_scene(&self) -> RenderResult<Scene> {
        Ok(std::mem::take(&mut self.lock()?.scene))
    }

    /// Number of scenes built so far.
    pub fn frame_count(&self) -> RenderResult<u64> {
        Ok(self.lock()?.frames)
    }

    /// Number of times the canvas was repainted from scratch.
    pub fn rebuild_count(&self) -> RenderResult<u64> {
        Ok(self.lock()?.rebuilds)
    }

    /// Copy of the retained canvas contents.
    pub fn display_list(&self) -> RenderResult<DisplayList> {
        Ok(self.lock()?.display.clone())
    }

    /// Canvas size in pixels.
    pub fn size(&self) -> RenderResult<Size> {
        Ok(self.lock()?.display.size())
    }

    /// Title last pushed by the window.
    pub fn title(&self) -> RenderResult<String> {
        Ok(self.lock()?.title.clone())
    }

    pub fn is_iconified(&self) -> RenderResult<bool> {
        Ok(self.lock()?.iconified)
    }
}

impl Surface for SceneSurface {
    fn draw_segment(&mut self, segment: &Segment) {
        self.lock_for_paint().push(Primitive::Segment(segment.clone()));
    }

    fn draw_oval(&mut self, oval: &Oval) {
        self.lock_for_paint().push(Primitive::Oval(oval.clone()));
    }

    fn draw_rectangle(&mut self, rectangle: &Rectangle) {
        self.lock_for_paint().push(Primitive::Rectangle(rectangle.clone()));
    }

    fn draw_polygon(&mut self, polygon: &Polygon) {
        self.lock_for_paint().push(Primitive::Polygon(polygon.clone()));
    }

    fn clear(&mut self) {
        let mut state = self.lock_for_paint();
        state.display.clear();
        state.invalidate();
    }

    fn repaint(&mut self) {
        self.lock_for_paint().build_scene();
    }

    fn flush(&mut self) {
        let mut state = self.lock_for_paint();
        if state.dirty || state.frames == 0 {
            state.build_scene();
        }
    }

    fn clear_layer(&mut self, owner: ImplementId) -> bool {
        let mut state = self.lock_for_paint();
        let removed = state.display.clear_owner(owner);
        log::debug!("Erased {} primitive(s) of {}", removed, owner);
        if removed > 0 {
            state.invalidate();
        }
        true
    }

    fn update_cursor(&mut self, owner: ImplementId, cursor: Option<&Cursor>) {
        let mut state = self.lock_for_paint();
        state.display.set_cursor(owner, cursor);
        state.dirty = true;
    }

    fn resize(&mut self, size: Size) {
        let mut state = self.lock_for_paint();
        state.display.set_size(size);
        state.invalidate();
    }

    fn apply_geometry(&mut self, geometry: &WindowGeometry) {
        self.lock_for_paint().title = geometry.title.clone();
    }

    fn set_iconified(&mut self, iconified: bool) {
        self.lock_for_paint().iconified = iconified;
    }

    fn beep(&mut self) {
        log::info!("Beep");
    }

    fn release(&mut self) {
        let mut state = self.lock_for_paint();
        state.display.clear_cursors();
        state.build_scene();
    }
}
