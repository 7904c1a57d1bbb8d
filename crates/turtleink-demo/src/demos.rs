//! Drawings the demo binary can run.

use kurbo::Point;
use peniko::Color;
use std::thread;
use turtleink_core::{
    DrawMode, Implement, Pen, PenOptions, Turtle, TurtleError, TurtleOptions, TurtleResult, Window,
};

/// Which demo to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demo {
    Spiral,
    Fill,
    Race,
    All,
}

impl Demo {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "spiral" | "turtle" => Some(Demo::Spiral),
            "fill" | "pen" => Some(Demo::Fill),
            "race" => Some(Demo::Race),
            "all" => Some(Demo::All),
            _ => None,
        }
    }

    pub fn run(self, window: &Window) -> TurtleResult<()> {
        match self {
            Demo::Spiral => spiral(window),
            Demo::Fill => fill(window),
            Demo::Race => race(window),
            Demo::All => {
                spiral(window)?;
                window.clear()?;
                fill(window)?;
                window.clear()?;
                race(window)
            }
        }
    }
}

/// A square spiral in shifting colors, with a dashed border around it.
pub fn spiral(window: &Window) -> TurtleResult<()> {
    let options = TurtleOptions {
        speed: 7,
        ..TurtleOptions::default()
    };
    let mut turtle = Turtle::with_options(window, options)?;
    for i in 0..60u8 {
        let shade = i.saturating_mul(4);
        turtle.set_color(Color::from_rgba8(255 - shade, shade, 128, 255))?;
        turtle.set_stroke_width(1.0 + f64::from(i) / 20.0)?;
        turtle.forward(4.0 * f64::from(i))?;
        turtle.left(89.0)?;
    }

    turtle.set_draw_mode(DrawMode::MoveOnly)?;
    turtle.move_to(-150.0, -150.0)?;
    turtle.set_heading(0.0)?;
    turtle.set_draw_mode(DrawMode::Draw)?;
    turtle.set_dash(&[8.0, 4.0])?;
    for _ in 0..4 {
        turtle.forward(300.0)?;
        turtle.left(90.0)?;
    }
    turtle.flush()
}

/// Filled shapes drawn with a pen, instantly, then shown with one flush.
pub fn fill(window: &Window) -> TurtleResult<()> {
    let options = PenOptions {
        position: Point::new(-200.0, -100.0),
        speed: 0,
        ..PenOptions::default()
    };
    let mut pen = Pen::with_options(window, options)?;

    pen.set_solid(true)?;
    for (dx, dy) in [(120.0, 0.0), (-60.0, 100.0), (-60.0, -100.0)] {
        pen.draw_line(dx, dy)?;
    }
    pen.set_solid(false)?;

    pen.move_to(50.0, 0.0)?;
    pen.set_fill_color(Color::from_rgba8(0, 120, 255, 255))?;
    pen.set_solid(true)?;
    pen.draw_oval(60.0, 40.0)?;
    pen.draw_rectangle(80.0, 50.0)?;
    pen.set_solid(false)?;

    pen.set_edge_color(Color::from_rgba8(0, 128, 0, 255))?;
    pen.set_stroke_width(3.0)?;
    pen.draw_to(200.0, 200.0)?;
    pen.flush()
}

/// Two turtles drawing on the same window from separate threads.
pub fn race(window: &Window) -> TurtleResult<()> {
    let racer = |y: f64, color: Color| {
        Turtle::with_options(
            window,
            TurtleOptions {
                position: Point::new(-250.0, y),
                color,
                speed: 4,
                ..TurtleOptions::default()
            },
        )
    };
    let mut blue = racer(50.0, Color::from_rgba8(0, 0, 255, 255))?;
    let mut green = racer(-50.0, Color::from_rgba8(0, 160, 0, 255))?;

    let results = thread::scope(|scope| {
        let lanes = [&mut blue, &mut green].map(|turtle| {
            scope.spawn(move || -> TurtleResult<()> {
                for _ in 0..10 {
                    turtle.forward(50.0)?;
                }
                Ok(())
            })
        });
        lanes.map(|lane| lane.join().unwrap_or(Err(TurtleError::Poisoned)))
    });
    for result in results {
        result?;
    }
    log::info!(
        "Race finished at ({}, {}) and ({}, {})",
        blue.x(),
        blue.y(),
        green.x(),
        green.y()
    );
    window.flush()
}
