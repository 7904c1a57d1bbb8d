//! Several implements sharing one window, across threads and across dispose.

use crate::animation::FrameTicker;
use crate::config::WindowConfig;
use crate::error::TurtleError;
use crate::implements::{Implement, Pen, PenOptions, Turtle, TurtleOptions};
use crate::recording::RecordingSurface;
use crate::surface::{ImplementId, Segment};
use crate::window::Window;
use kurbo::Point;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, mpsc};
use std::thread;

/// Ticker that parks the animating thread on one chosen tick until the test
/// lets it continue.
struct GateTicker {
    ticks: AtomicUsize,
    pause_at: usize,
    reached: Mutex<mpsc::Sender<()>>,
    resume: Mutex<mpsc::Receiver<()>>,
}

impl FrameTicker for GateTicker {
    fn tick(&self) {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        if tick == self.pause_at {
            let _ = self.reached.lock().unwrap().send(());
            let _ = self.resume.lock().unwrap().recv();
        }
    }
}

/// A window whose animations stop at `pause_at` until the returned sender
/// fires. The receiver reports that the pause was reached.
fn gated_window(
    pause_at: usize,
) -> (Window, RecordingSurface, mpsc::Receiver<()>, mpsc::Sender<()>) {
    let (reached_tx, reached_rx) = mpsc::channel();
    let (resume_tx, resume_rx) = mpsc::channel();
    let ticker = GateTicker {
        ticks: AtomicUsize::new(0),
        pause_at,
        reached: Mutex::new(reached_tx),
        resume: Mutex::new(resume_rx),
    };
    let recorder = RecordingSurface::new();
    let window =
        Window::with_ticker(WindowConfig::new().with_size(400, 400), recorder.clone(), ticker).unwrap();
    (window, recorder, reached_rx, resume_tx)
}

fn turtle_at(window: &Window, position: Point, heading: f64, speed: u32) -> Turtle {
    let options = TurtleOptions {
        position,
        heading,
        speed,
        ..TurtleOptions::default()
    };
    Turtle::with_options(window, options).unwrap()
}

fn segments_of(recorder: &RecordingSurface, owner: ImplementId) -> Vec<Segment> {
    recorder
        .drawn()
        .iter()
        .filter_map(|primitive| primitive.as_segment())
        .filter(|segment| segment.owner == owner)
        .cloned()
        .collect()
}

#[test]
fn test_two_turtles_on_two_threads() {
    let recorder = RecordingSurface::new();
    let window = Window::with_surface(WindowConfig::new().with_size(400, 400), recorder.clone()).unwrap();
    let mut east = turtle_at(&window, Point::ZERO, 0.0, 5);
    let mut north = turtle_at(&window, Point::ZERO, 90.0, 5);
    recorder.drain();

    thread::scope(|scope| {
        let a = scope.spawn(|| east.forward(160.0));
        let b = scope.spawn(|| north.forward(160.0));
        assert_eq!(a.join().unwrap(), Ok(()));
        assert_eq!(b.join().unwrap(), Ok(()));
    });

    // 16 px per step at speed 5.
    for (turtle, end) in [
        (&east, Point::new(360.0, 200.0)),
        (&north, Point::new(200.0, 40.0)),
    ] {
        let segments = segments_of(&recorder, turtle.id());
        assert_eq!(segments.len(), 10);
        assert_eq!(segments[0].start, Point::new(200.0, 200.0));
        for pair in segments.windows(2) {
            assert!(pair[0].end.distance(pair[1].start) < 1e-9);
        }
        assert!(segments[9].end.distance(end) < 1e-9);
    }
    assert_eq!(recorder.repaints(), 20);
    assert!(east.position().distance(Point::new(160.0, 0.0)) < 1e-9);
    assert!(north.position().distance(Point::new(0.0, 160.0)) < 1e-9);
}

#[test]
fn test_dispose_during_animation_stops_at_next_step() {
    let (window, recorder, reached, resume) = gated_window(3);
    let mut turtle = turtle_at(&window, Point::ZERO, 0.0, 3);
    recorder.drain();

    thread::scope(|scope| {
        let walker = scope.spawn(|| turtle.forward(40.0));
        reached.recv().unwrap();
        window.dispose().unwrap();
        resume.send(()).unwrap();
        assert_eq!(walker.join().unwrap(), Err(TurtleError::Disposed));
    });

    // Three 4 px steps made it onto the canvas before the dispose.
    assert_eq!(recorder.drawn().len(), 3);
    assert!(turtle.position().distance(Point::new(12.0, 0.0)) < 1e-9);
    assert_eq!(turtle.forward(10.0), Err(TurtleError::Disposed));
    assert_eq!(recorder.drawn().len(), 3);
}

#[test]
fn test_resize_mid_animation_uses_new_transform() {
    let (window, recorder, reached, resume) = gated_window(2);
    let mut turtle = turtle_at(&window, Point::ZERO, 0.0, 3);
    recorder.drain();

    thread::scope(|scope| {
        let walker = scope.spawn(|| turtle.forward(40.0));
        reached.recv().unwrap();
        window.set_size(600, 600).unwrap();
        resume.send(()).unwrap();
        assert_eq!(walker.join().unwrap(), Ok(()));
    });

    let segments = segments_of(&recorder, turtle.id());
    assert_eq!(segments.len(), 10);
    assert!(segments[1].end.distance(Point::new(208.0, 200.0)) < 1e-9);
    assert!(segments[2].start.distance(Point::new(308.0, 300.0)) < 1e-9);
    assert!(segments[9].end.distance(Point::new(340.0, 300.0)) < 1e-9);
    assert_eq!(turtle.position(), Point::new(40.0, 0.0));
}

#[test]
fn test_attach_to_disposed_window_fails() {
    let window = Window::new(WindowConfig::new()).unwrap();
    window.dispose().unwrap();
    assert!(matches!(Turtle::new(&window), Err(TurtleError::Attachment(_))));
    assert!(matches!(Pen::new(&window), Err(TurtleError::Attachment(_))));
}

#[test]
fn test_every_command_fails_after_dispose() {
    let window = Window::new(WindowConfig::new()).unwrap();
    let mut turtle = Turtle::new(&window).unwrap();
    let mut pen = Pen::new(&window).unwrap();
    window.dispose().unwrap();

    let disposed = Err(TurtleError::Disposed);
    assert_eq!(turtle.forward(10.0), disposed);
    assert_eq!(turtle.backward(10.0), disposed);
    assert_eq!(turtle.left(90.0), disposed);
    assert_eq!(turtle.set_heading(45.0), disposed);
    assert_eq!(turtle.set_color(peniko::Color::from_rgba8(0, 0, 255, 255)), disposed);
    assert_eq!(turtle.reset(), disposed);
    assert_eq!(turtle.heading(), 0.0);

    assert_eq!(pen.draw_line(10.0, 0.0), disposed);
    assert_eq!(pen.draw_oval(5.0, 5.0), disposed);
    assert_eq!(pen.draw_rectangle(5.0, 5.0), disposed);
    assert_eq!(pen.set_solid(true), disposed);
    assert!(!pen.is_solid());

    for implement in [&mut turtle as &mut dyn Implement, &mut pen] {
        assert_eq!(implement.move_to(1.0, 1.0), disposed);
        assert_eq!(implement.set_speed(3), disposed);
        assert_eq!(implement.set_stroke_width(2.0), disposed);
        assert_eq!(implement.set_dash(&[2.0]), disposed);
        assert_eq!(implement.set_visible(false), disposed);
        assert_eq!(implement.clear(), Err(TurtleError::Disposed));
        assert_eq!(implement.flush(), disposed);
        assert_eq!(implement.position(), Point::ZERO);
        assert_eq!(implement.speed(), crate::DEFAULT_SPEED);
    }
}

#[test]
fn test_dropping_window_disposes_it() {
    let window = Window::new(WindowConfig::new()).unwrap();
    let mut turtle = Turtle::new(&window).unwrap();
    drop(window);
    assert_eq!(turtle.forward(10.0), Err(TurtleError::Disposed));
}

#[test]
fn test_registry_tracks_attach_order_and_drops() {
    let window = Window::new(WindowConfig::new()).unwrap();
    let first = Turtle::new(&window).unwrap();
    let pen = Pen::new(&window).unwrap();
    let second = Turtle::new(&window).unwrap();

    assert_eq!(window.turtles().unwrap(), vec![first.id(), second.id()]);
    assert_eq!(window.pens().unwrap(), vec![pen.id()]);

    let first_id = first.id();
    drop(first);
    assert_eq!(window.turtles().unwrap(), vec![second.id()]);
    assert!(!window.turtles().unwrap().contains(&first_id));

    drop(pen);
    assert!(window.pens().unwrap().is_empty());
}

#[test]
fn test_layered_clear_erases_only_own_marks() {
    let recorder = RecordingSurface::layered();
    let window = Window::with_surface(WindowConfig::new(), recorder.clone()).unwrap();
    let mut turtle = turtle_at(&window, Point::ZERO, 0.0, 0);
    let options = PenOptions {
        speed: 0,
        ..PenOptions::default()
    };
    let mut pen = Pen::with_options(&window, options).unwrap();

    turtle.forward(50.0).unwrap();
    pen.draw_line(0.0, 50.0).unwrap();
    assert_eq!(turtle.clear(), Ok(true));

    let remaining = recorder.primitives();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].owner(), pen.id());
    assert_eq!(turtle.position(), Point::new(50.0, 0.0));
}

#[test]
fn test_clear_without_layers_erases_everything() {
    let recorder = RecordingSurface::new();
    let window = Window::with_surface(WindowConfig::new(), recorder.clone()).unwrap();
    let mut turtle = turtle_at(&window, Point::ZERO, 0.0, 0);
    let mut other = turtle_at(&window, Point::ZERO, 90.0, 0);

    turtle.forward(50.0).unwrap();
    other.forward(50.0).unwrap();
    assert_eq!(turtle.clear(), Ok(false));
    assert!(recorder.primitives().is_empty());
}
