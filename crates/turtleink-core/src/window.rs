//! Window: the canvas, its coordinate transform, and the lock every drawing
//! command passes through.
//!
//! A [`Window`] owns one [`Surface`] and one [`CanvasTransform`], both behind
//! a single mutex. Turtles and pens hold a handle to the same shared state;
//! each primitive they emit is issued while holding that mutex, so no two
//! primitives can interleave on the surface. Animated commands release the
//! mutex between steps, which lets other implements on the same window take
//! their turn at step granularity.

use crate::animation::{FrameClock, FrameTicker};
use crate::config::{WindowConfig, check_bounds, check_dimensions};
use crate::error::{TurtleError, TurtleResult};
use crate::recording::RecordingSurface;
use crate::surface::{Cursor, ImplementId, LineStyle, Primitive, Segment, Surface};
use crate::transform::CanvasTransform;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Position, size, bounds and decorations of a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowGeometry {
    pub position: (i32, i32),
    pub size: (u32, u32),
    pub min_size: Option<(u32, u32)>,
    pub max_size: Option<(u32, u32)>,
    pub title: String,
    pub resizable: bool,
}

impl From<&WindowConfig> for WindowGeometry {
    fn from(config: &WindowConfig) -> Self {
        Self {
            position: config.position,
            size: config.size,
            min_size: config.min_size,
            max_size: config.max_size,
            title: config.title.clone(),
            resizable: config.resizable,
        }
    }
}

impl WindowGeometry {
    /// Canvas size as a kurbo size.
    pub fn canvas_size(&self) -> Size {
        Size::new(f64::from(self.size.0), f64::from(self.size.1))
    }
}

/// Which kind of implement a registration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImplementKind {
    Turtle,
    Pen,
}

#[derive(Debug, Clone, Copy)]
struct Registration {
    id: ImplementId,
    kind: ImplementKind,
}

/// Everything guarded by the window lock.
pub(crate) struct WindowState {
    surface: Box<dyn Surface>,
    transform: CanvasTransform,
    geometry: WindowGeometry,
    iconified: bool,
    /// Attached implements in insertion order.
    registry: Vec<Registration>,
    /// Bumped by every full canvas clear; pens compare against it to learn
    /// that their open fill path was erased.
    clear_epoch: u64,
    /// Set by any change to the canvas or the registry; cleared by callers.
    mark: bool,
    /// Speed and visibility of the implement that last drew or moved.
    last_tool: Option<(u32, bool)>,
    disposed: bool,
}

impl WindowState {
    pub(crate) fn transform(&self) -> &CanvasTransform {
        &self.transform
    }

    pub(crate) fn clear_epoch(&self) -> u64 {
        self.clear_epoch
    }

    /// Record that an implement with these attributes just used the canvas.
    pub(crate) fn note_tool(&mut self, speed: u32, visible: bool) {
        self.last_tool = Some((speed, visible));
        self.mark = true;
    }

    /// Draw a world-space segment.
    pub(crate) fn draw_segment(
        &mut self,
        owner: ImplementId,
        from: Point,
        to: Point,
        style: &LineStyle,
        dash_offset: f64,
    ) {
        let segment = Segment {
            owner,
            start: self.transform.to_canvas(from),
            end: self.transform.to_canvas(to),
            style: style.clone(),
            dash_offset,
        };
        self.surface.draw_segment(&segment);
        self.mark = true;
    }

    /// Draw a primitive already in device coordinates.
    pub(crate) fn draw(&mut self, primitive: &Primitive) {
        self.surface.draw(primitive);
        self.mark = true;
    }

    pub(crate) fn repaint(&mut self) {
        self.surface.repaint();
    }

    pub(crate) fn flush(&mut self) {
        self.surface.flush();
    }

    pub(crate) fn update_cursor(&mut self, owner: ImplementId, cursor: Option<&Cursor>) {
        self.surface.update_cursor(owner, cursor);
    }

    /// Erase everything and invalidate every open fill path.
    pub(crate) fn clear_all(&mut self) {
        self.surface.clear();
        self.clear_epoch += 1;
        self.mark = true;
        self.surface.repaint();
    }

    /// Erase one implement's marks, falling back to a full clear when the
    /// surface has no layers. Returns whether only that layer was erased.
    pub(crate) fn clear_layer(&mut self, owner: ImplementId) -> bool {
        if self.surface.clear_layer(owner) {
            self.mark = true;
            self.surface.repaint();
            return true;
        }
        log::warn!(
            "Surface keeps no per-implement layers; clearing for {} erases every implement's marks",
            owner
        );
        self.clear_all();
        false
    }

    fn ids_of(&self, kind: ImplementKind) -> Vec<ImplementId> {
        self.registry
            .iter()
            .filter(|registration| registration.kind == kind)
            .map(|registration| registration.id)
            .collect()
    }
}

/// State shared between a window and its implements.
pub(crate) struct WindowShared {
    state: Mutex<WindowState>,
    ticker: Box<dyn FrameTicker>,
}

impl fmt::Debug for WindowShared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowShared").finish_non_exhaustive()
    }
}

impl WindowShared {
    fn lock(&self) -> TurtleResult<MutexGuard<'_, WindowState>> {
        self.state.lock().map_err(|_| TurtleError::Poisoned)
    }

    /// Run `f` under the window lock unless the window was disposed.
    pub(crate) fn with_live<R>(&self, f: impl FnOnce(&mut WindowState) -> R) -> TurtleResult<R> {
        let mut state = self.lock()?;
        if state.disposed {
            return Err(TurtleError::Disposed);
        }
        Ok(f(&mut state))
    }

    /// Add an implement to the registry.
    pub(crate) fn register(&self, kind: ImplementKind) -> TurtleResult<ImplementId> {
        let mut state = self.lock()?;
        if state.disposed {
            return Err(TurtleError::Attachment(format!(
                "cannot attach a {:?} to a disposed window",
                kind
            )));
        }
        let id = Uuid::new_v4();
        state.registry.push(Registration { id, kind });
        state.mark = true;
        log::debug!("Attached {:?} {} to window '{}'", kind, id, state.geometry.title);
        Ok(id)
    }

    /// Remove an implement from the registry. Never fails.
    pub(crate) fn unregister(&self, id: ImplementId) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.registry.retain(|registration| registration.id != id);
        if !state.disposed {
            state.mark = true;
            state.surface.update_cursor(id, None);
        }
    }

    /// Wait for the next animation frame. Must be called without the lock.
    pub(crate) fn tick(&self) {
        self.ticker.tick();
    }
}

/// A drawing window.
///
/// All methods take `&self`; a window can be shared by reference across
/// threads while turtles and pens attached to it are driven concurrently.
/// Dropping a window disposes it.
pub struct Window {
    shared: Arc<WindowShared>,
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl Window {
    /// Create a headless window backed by a fresh [`RecordingSurface`].
    pub fn new(config: WindowConfig) -> TurtleResult<Self> {
        Self::with_surface(config, RecordingSurface::new())
    }

    /// Create a window painting on the given surface.
    pub fn with_surface(config: WindowConfig, surface: impl Surface + 'static) -> TurtleResult<Self> {
        let clock = FrameClock::new(config.frame_interval());
        Self::with_ticker(config, surface, clock)
    }

    /// Create a window with an explicit frame ticker for animations.
    pub fn with_ticker(
        config: WindowConfig,
        surface: impl Surface + 'static,
        ticker: impl FrameTicker + 'static,
    ) -> TurtleResult<Self> {
        config.validate()?;
        let geometry = WindowGeometry::from(&config);
        let transform = CanvasTransform::new(geometry.canvas_size());

        let mut surface: Box<dyn Surface> = Box::new(surface);
        surface.resize(transform.size());
        surface.apply_geometry(&geometry);

        log::info!(
            "Created window '{}' ({}x{})",
            geometry.title,
            geometry.size.0,
            geometry.size.1
        );

        let state = WindowState {
            surface,
            transform,
            geometry,
            iconified: false,
            registry: Vec::new(),
            clear_epoch: 0,
            mark: false,
            last_tool: None,
            disposed: false,
        };
        Ok(Self {
            shared: Arc::new(WindowShared {
                state: Mutex::new(state),
                ticker: Box::new(ticker),
            }),
        })
    }

    pub(crate) fn shared(&self) -> &Arc<WindowShared> {
        &self.shared
    }

    /// Whether [`Window::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        self.shared.lock().map(|state| state.disposed).unwrap_or(true)
    }

    /// Current geometry.
    pub fn geometry(&self) -> TurtleResult<WindowGeometry> {
        self.shared.with_live(|state| state.geometry.clone())
    }

    /// Screen position of the window.
    pub fn position(&self) -> TurtleResult<(i32, i32)> {
        self.shared.with_live(|state| state.geometry.position)
    }

    /// Canvas size.
    pub fn size(&self) -> TurtleResult<(u32, u32)> {
        self.shared.with_live(|state| state.geometry.size)
    }

    pub fn min_size(&self) -> TurtleResult<Option<(u32, u32)>> {
        self.shared.with_live(|state| state.geometry.min_size)
    }

    pub fn max_size(&self) -> TurtleResult<Option<(u32, u32)>> {
        self.shared.with_live(|state| state.geometry.max_size)
    }

    pub fn title(&self) -> TurtleResult<String> {
        self.shared.with_live(|state| state.geometry.title.clone())
    }

    pub fn is_resizable(&self) -> TurtleResult<bool> {
        self.shared.with_live(|state| state.geometry.resizable)
    }

    pub fn is_iconified(&self) -> TurtleResult<bool> {
        self.shared.with_live(|state| state.iconified)
    }

    /// Ids of attached turtles, in attachment order.
    pub fn turtles(&self) -> TurtleResult<Vec<ImplementId>> {
        self.shared.with_live(|state| state.ids_of(ImplementKind::Turtle))
    }

    /// Ids of attached pens, in attachment order.
    pub fn pens(&self) -> TurtleResult<Vec<ImplementId>> {
        self.shared.with_live(|state| state.ids_of(ImplementKind::Pen))
    }

    /// Whether anything was drawn, erased, attached or detached since the
    /// mark was last cleared.
    pub fn mark(&self) -> TurtleResult<bool> {
        self.shared.with_live(|state| state.mark)
    }

    pub fn set_mark(&self, mark: bool) -> TurtleResult<()> {
        self.shared.with_live(|state| state.mark = mark)
    }

    /// Speed of the implement that last drew on or moved across this
    /// window, if any has.
    pub fn last_speed(&self) -> TurtleResult<Option<u32>> {
        self.shared.with_live(|state| state.last_tool.map(|(speed, _)| speed))
    }

    /// Visibility of the implement that last drew on or moved across this
    /// window, if any has.
    pub fn last_visibility(&self) -> TurtleResult<Option<bool>> {
        self.shared
            .with_live(|state| state.last_tool.map(|(_, visible)| visible))
    }

    /// Convert a world point to device coordinates with the current transform.
    pub fn to_canvas(&self, world_point: Point) -> TurtleResult<Point> {
        self.shared.with_live(|state| state.transform.to_canvas(world_point))
    }

    /// Convert a device point to world coordinates with the current transform.
    pub fn to_world(&self, device_point: Point) -> TurtleResult<Point> {
        self.shared.with_live(|state| state.transform.to_world(device_point))
    }

    /// Move the window on screen.
    pub fn set_position(&self, x: i32, y: i32) -> TurtleResult<()> {
        self.shared.with_live(|state| {
            state.geometry.position = (x, y);
            state.surface.apply_geometry(&state.geometry);
        })
    }

    /// Resize the canvas.
    ///
    /// Marks already painted keep their device pixels; implements keep their
    /// world coordinates, which resolve through the new transform on their
    /// next draw.
    pub fn set_size(&self, width: u32, height: u32) -> TurtleResult<()> {
        check_dimensions("size", (width, height))?;
        let mut state = self.shared.lock()?;
        if state.disposed {
            return Err(TurtleError::Disposed);
        }
        check_bounds((width, height), state.geometry.min_size, state.geometry.max_size)?;

        state.geometry.size = (width, height);
        let size = state.geometry.canvas_size();
        let shift = state.transform.on_resize(size);
        log::debug!(
            "Window '{}' resized to {}x{}, origin moved by ({}, {})",
            state.geometry.title,
            width,
            height,
            shift.x,
            shift.y
        );
        state.surface.resize(size);
        let geometry = state.geometry.clone();
        state.surface.apply_geometry(&geometry);
        state.surface.repaint();
        Ok(())
    }

    /// Set the smallest allowed size.
    pub fn set_min_size(&self, width: u32, height: u32) -> TurtleResult<()> {
        check_dimensions("min size", (width, height))?;
        let mut state = self.shared.lock()?;
        if state.disposed {
            return Err(TurtleError::Disposed);
        }
        check_bounds(state.geometry.size, Some((width, height)), state.geometry.max_size)?;
        state.geometry.min_size = Some((width, height));
        let geometry = state.geometry.clone();
        state.surface.apply_geometry(&geometry);
        Ok(())
    }

    /// Set the largest allowed size.
    pub fn set_max_size(&self, width: u32, height: u32) -> TurtleResult<()> {
        check_dimensions("max size", (width, height))?;
        let mut state = self.shared.lock()?;
        if state.disposed {
            return Err(TurtleError::Disposed);
        }
        check_bounds(state.geometry.size, state.geometry.min_size, Some((width, height)))?;
        state.geometry.max_size = Some((width, height));
        let geometry = state.geometry.clone();
        state.surface.apply_geometry(&geometry);
        Ok(())
    }

    pub fn set_title(&self, title: impl Into<String>) -> TurtleResult<()> {
        let title = title.into();
        self.shared.with_live(|state| {
            state.geometry.title = title;
            state.surface.apply_geometry(&state.geometry);
        })
    }

    pub fn set_resizable(&self, resizable: bool) -> TurtleResult<()> {
        self.shared.with_live(|state| {
            state.geometry.resizable = resizable;
            state.surface.apply_geometry(&state.geometry);
        })
    }

    /// Minimize the window. No-op if already minimized.
    pub fn iconify(&self) -> TurtleResult<()> {
        self.set_iconified(true)
    }

    /// Restore the window. No-op if not minimized.
    pub fn deiconify(&self) -> TurtleResult<()> {
        self.set_iconified(false)
    }

    fn set_iconified(&self, iconified: bool) -> TurtleResult<()> {
        self.shared.with_live(|state| {
            if state.iconified != iconified {
                state.iconified = iconified;
                state.surface.set_iconified(iconified);
            }
        })
    }

    /// Make every pending primitive visible now.
    pub fn flush(&self) -> TurtleResult<()> {
        self.shared.with_live(WindowState::flush)
    }

    /// Erase the canvas and discard every pen's open fill path.
    ///
    /// Positions, headings and attributes of implements are untouched.
    pub fn clear(&self) -> TurtleResult<()> {
        self.shared.with_live(WindowState::clear_all)
    }

    /// Emit an audible alert.
    pub fn beep(&self) -> TurtleResult<()> {
        self.shared.with_live(|state| state.surface.beep())
    }

    /// Detach every implement and release the canvas.
    ///
    /// Afterwards every operation on this window or its former implements
    /// fails with [`TurtleError::Disposed`], including a second `dispose`.
    /// Animations in flight stop at their next step.
    pub fn dispose(&self) -> TurtleResult<()> {
        let mut state = self.shared.lock()?;
        if state.disposed {
            return Err(TurtleError::Disposed);
        }
        Self::dispose_locked(&mut state);
        Ok(())
    }

    fn dispose_locked(state: &mut WindowState) {
        state.disposed = true;
        let detached = state.registry.len();
        state.registry.clear();
        state.surface.release();
        log::info!(
            "Disposed window '{}', detached {} implement(s)",
            state.geometry.title,
            detached
        );
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        let mut state = self.shared.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.disposed {
            Self::dispose_locked(&mut state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::SurfaceEvent;

    fn window(width: u32, height: u32) -> (Window, RecordingSurface) {
        let recorder = RecordingSurface::new();
        let window = Window::with_surface(
            WindowConfig::new().with_size(width, height),
            recorder.clone(),
        )
        .unwrap();
        (window, recorder)
    }

    #[test]
    fn test_center_maps_to_world_origin() {
        let (window, _) = window(400, 400);
        let device = window.to_canvas(Point::ZERO).unwrap();
        assert_eq!(device, Point::new(200.0, 200.0));
        let world = window.to_world(Point::new(200.0, 200.0)).unwrap();
        assert_eq!(world, Point::ZERO);
    }

    #[test]
    fn test_set_size_within_bounds() {
        let (window, recorder) = window(400, 400);
        window.set_min_size(100, 100).unwrap();
        window.set_max_size(800, 600).unwrap();
        for (w, h) in [(100, 100), (800, 600), (321, 457)] {
            recorder.drain();
            window.set_size(w, h).unwrap();
            assert_eq!(window.size().unwrap(), (w, h));
            let center = Point::new(f64::from(w) / 2.0, f64::from(h) / 2.0);
            assert_eq!(window.to_canvas(Point::ZERO).unwrap(), center);
            assert_eq!(window.to_world(center).unwrap(), Point::ZERO);
            assert_eq!(recorder.repaints(), 1);
        }
    }

    #[test]
    fn test_set_size_outside_bounds_fails() {
        let (window, _) = window(400, 400);
        window.set_min_size(200, 200).unwrap();
        window.set_max_size(500, 500).unwrap();
        assert!(matches!(window.set_size(199, 300), Err(TurtleError::Geometry(_))));
        assert!(matches!(window.set_size(300, 501), Err(TurtleError::Geometry(_))));
        assert!(matches!(window.set_size(0, 300), Err(TurtleError::Geometry(_))));
        assert_eq!(window.size().unwrap(), (400, 400));
    }

    #[test]
    fn test_bounds_must_not_contradict() {
        let (window, _) = window(400, 400);
        assert!(matches!(window.set_min_size(500, 100), Err(TurtleError::Geometry(_))));
        assert!(matches!(window.set_max_size(300, 500), Err(TurtleError::Geometry(_))));
        window.set_max_size(450, 450).unwrap();
        assert!(matches!(window.set_min_size(460, 100), Err(TurtleError::Geometry(_))));
        assert_eq!(window.min_size().unwrap(), None);
        assert_eq!(window.max_size().unwrap(), Some((450, 450)));
    }

    #[test]
    fn test_geometry_forwarded_to_surface() {
        let (window, recorder) = window(400, 400);
        recorder.drain();
        window.set_position(10, 20).unwrap();
        window.set_title("Shapes").unwrap();
        window.set_resizable(false).unwrap();
        let last = recorder.events().into_iter().rev().find_map(|event| match event {
            SurfaceEvent::Geometry(geometry) => Some(geometry),
            _ => None,
        });
        let last = last.unwrap();
        assert_eq!(last.position, (10, 20));
        assert_eq!(last.title, "Shapes");
        assert!(!last.resizable);
        assert_eq!(window.title().unwrap(), "Shapes");
        assert!(!window.is_resizable().unwrap());
    }

    #[test]
    fn test_iconify_is_idempotent() {
        let (window, recorder) = window(400, 400);
        recorder.drain();
        window.iconify().unwrap();
        window.iconify().unwrap();
        assert!(window.is_iconified().unwrap());
        window.deiconify().unwrap();
        window.deiconify().unwrap();
        assert!(!window.is_iconified().unwrap());
        let toggles = recorder
            .events()
            .iter()
            .filter(|event| matches!(event, SurfaceEvent::Iconified(_)))
            .count();
        assert_eq!(toggles, 2);
    }

    #[test]
    fn test_beep_and_flush_reach_surface() {
        let (window, recorder) = window(400, 400);
        recorder.drain();
        window.beep().unwrap();
        window.flush().unwrap();
        let events = recorder.events();
        assert!(matches!(events[0], SurfaceEvent::Beep));
        assert_eq!(recorder.flushes(), 1);
        assert!(recorder.primitives().is_empty());
    }

    #[test]
    fn test_dispose_is_final() {
        let (window, recorder) = window(400, 400);
        window.dispose().unwrap();
        assert!(window.is_disposed());
        assert_eq!(window.dispose(), Err(TurtleError::Disposed));
        assert_eq!(window.flush(), Err(TurtleError::Disposed));
        assert_eq!(window.clear(), Err(TurtleError::Disposed));
        assert_eq!(window.set_size(300, 300), Err(TurtleError::Disposed));
        assert_eq!(window.size(), Err(TurtleError::Disposed));
        assert_eq!(window.beep(), Err(TurtleError::Disposed));
        assert!(recorder.events().iter().any(|event| matches!(event, SurfaceEvent::Released)));
    }

    #[test]
    fn test_mark_tracks_canvas_changes() {
        let (window, _) = window(400, 400);
        assert!(!window.mark().unwrap());
        window.clear().unwrap();
        assert!(window.mark().unwrap());
        window.set_mark(false).unwrap();
        window.beep().unwrap();
        window.flush().unwrap();
        assert!(!window.mark().unwrap());
        assert_eq!(window.last_speed().unwrap(), None);
        assert_eq!(window.last_visibility().unwrap(), None);
        window.dispose().unwrap();
        assert_eq!(window.mark(), Err(TurtleError::Disposed));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = WindowConfig::new().with_size(50, 50).with_min_size(100, 100);
        assert!(matches!(Window::new(config), Err(TurtleError::Geometry(_))));
    }
}
