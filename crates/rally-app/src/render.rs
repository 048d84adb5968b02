//! Court rendering contract.
//!
//! [`render`] projects an optional [`GameSnapshot`] onto any [`Surface`]. It
//! is a pure function of its input: the same snapshot always produces the
//! same sequence of draw calls, so rendering twice is indistinguishable from
//! rendering once. Coordinates are court units with the origin at the top-left
//! corner and y growing downwards; surfaces map them to their own space.

use rally_proto::GameSnapshot;

/// Court width in court units.
pub const COURT_WIDTH: f64 = 800.0;

/// Court height in court units.
pub const COURT_HEIGHT: f64 = 400.0;

/// Ball radius in court units.
pub const BALL_RADIUS: f64 = 10.0;

/// Left paddle distance from the left edge.
pub const LEFT_PADDLE_X: f64 = 20.0;

/// Right paddle distance from the right edge.
pub const RIGHT_PADDLE_INSET: f64 = 40.0;

/// Shown instead of the court while no snapshot exists.
pub const WAITING_TEXT: &str = "Waiting for game to start...";

/// A 2D drawing target.
pub trait Surface {
    /// Erase everything.
    fn clear(&mut self);

    /// Draw a filled circle centred at (`x`, `y`).
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64);

    /// Draw a filled rectangle with its top-left corner at (`x`, `y`).
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Show the waiting indicator.
    fn waiting(&mut self, text: &str);
}

/// Draw one frame.
///
/// Without a snapshot only the waiting indicator is shown. With one, the
/// surface is cleared and the ball and both paddles are drawn.
pub fn render<S: Surface + ?Sized>(surface: &mut S, snapshot: Option<&GameSnapshot>) {
    surface.clear();

    let Some(snapshot) = snapshot else {
        surface.waiting(WAITING_TEXT);
        return;
    };

    surface.fill_circle(snapshot.ball_x, snapshot.ball_y, BALL_RADIUS);
    surface.fill_rect(
        LEFT_PADDLE_X,
        snapshot.paddle1_y,
        snapshot.paddle_width,
        snapshot.paddle_height,
    );
    surface.fill_rect(
        COURT_WIDTH - RIGHT_PADDLE_INSET,
        snapshot.paddle2_y,
        snapshot.paddle_width,
        snapshot.paddle_height,
    );
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Filled circle.
    Circle {
        /// Centre x.
        x: f64,
        /// Centre y.
        y: f64,
        /// Radius.
        radius: f64,
    },
    /// Filled rectangle.
    Rect {
        /// Left edge.
        x: f64,
        /// Top edge.
        y: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
    },
    /// Waiting indicator.
    Waiting(String),
}

/// Surface that records what is currently drawn.
///
/// `clear` empties the record, so after a render it holds exactly the
/// visible frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSurface {
    shapes: Vec<Shape>,
    clears: usize,
}

impl RecordingSurface {
    /// Create an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shapes visible after the last clear.
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// How many times the surface was cleared.
    pub fn clears(&self) -> usize {
        self.clears
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.shapes.clear();
        self.clears += 1;
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        self.shapes.push(Shape::Circle { x, y, radius });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.shapes.push(Shape::Rect { x, y, width, height });
    }

    fn waiting(&mut self, text: &str) {
        self.shapes.push(Shape::Waiting(text.to_string()));
    }
}
