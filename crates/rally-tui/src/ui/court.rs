//! Court
//!
//! Draws the match through the shared render contract onto a ratatui
//! [`Canvas`]. The canvas y axis points up, court coordinates point down, so
//! every shape is flipped here.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Line,
    widgets::{
        Block, Borders,
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
    },
};
use rally_app::render::{COURT_HEIGHT, COURT_WIDTH, Surface};

use crate::App;

/// Spacing between strokes when filling a shape, in court units.
const FILL_STEP: f64 = 2.0;

/// Upper bound on strokes per filled shape.
const MAX_FILL_STROKES: f64 = 400.0;

const BALL_COLOR: Color = Color::Yellow;
const PADDLE_COLOR: Color = Color::White;
const TEXT_COLOR: Color = Color::DarkGray;

/// [`Surface`] over a canvas painting context.
pub struct CanvasSurface<'a, 'b> {
    ctx: &'a mut Context<'b>,
}

impl<'a, 'b> CanvasSurface<'a, 'b> {
    /// Wrap a painting context.
    pub fn new(ctx: &'a mut Context<'b>) -> Self {
        Self { ctx }
    }
}

/// Number of strokes needed to cover `extent`. Zero for nonsense sizes.
fn strokes(extent: f64) -> usize {
    (extent / FILL_STEP).clamp(0.0, MAX_FILL_STROKES) as usize
}

impl Surface for CanvasSurface<'_, '_> {
    // Each canvas frame starts empty.
    fn clear(&mut self) {}

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64) {
        let y = COURT_HEIGHT - y;
        for i in 0..=strokes(radius) {
            let radius = radius - i as f64 * FILL_STEP;
            if radius <= 0.0 {
                break;
            }
            self.ctx.draw(&Circle { x, y, radius, color: BALL_COLOR });
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let top = COURT_HEIGHT - y;
        let bottom = top - height;
        for i in 0..=strokes(width) {
            let column = x + (i as f64 * FILL_STEP).min(width);
            self.ctx.draw(&CanvasLine {
                x1: column,
                y1: bottom,
                x2: column,
                y2: top,
                color: PADDLE_COLOR,
            });
        }
    }

    fn waiting(&mut self, text: &str) {
        let x = (COURT_WIDTH - text.len() as f64 * COURT_WIDTH / 100.0) / 2.0;
        let label = Line::styled(text.to_string(), Style::default().fg(TEXT_COLOR));
        self.ctx.print(x.max(0.0), COURT_HEIGHT / 2.0, label);
    }
}

/// Render the court for the current match.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.view().snapshot;

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(" Match "))
        .marker(Marker::Braille)
        .background_color(Color::Reset)
        .x_bounds([0.0, COURT_WIDTH])
        .y_bounds([0.0, COURT_HEIGHT])
        .paint(move |ctx| {
            let mut surface = CanvasSurface::new(ctx);
            rally_app::render(&mut surface, snapshot.as_ref());
        });

    frame.render_widget(canvas, area);
}
