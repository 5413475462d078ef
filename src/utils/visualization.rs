//! Visualization for the car simulator
//!
//! Renders simulation frames and trajectory summaries with gnuplot and the
//! post-run state history with plotlib. All drawing consumes states pulled
//! from the simulation; nothing here feeds back into the controller.

use gnuplot::{AxesCommon, Coordinate, Figure, PlotOption};
use plotlib::page::Page;
use plotlib::repr::Plot;
use plotlib::style::LineStyle;
use plotlib::view::ContinuousView;

use crate::common::{CarState, SimError, SimResult};
use crate::simulation::Trajectory;

// Car dimensions [m]
const CAR_WIDTH: f64 = 0.8;
const CAR_HEIGHT: f64 = 0.4;
const WHEEL_RADIUS: f64 = 0.1;

// Half extent of the drawn world [m]
const WORLD_HALF_EXTENT: f64 = 8.0;

/// Color palette for consistent styling
pub mod colors {
    pub const CAR_BODY: &str = "#FF0000";
    pub const TARGET: &str = "#00FF00";
    pub const WHEEL: &str = "#282828";
    pub const WHEEL_HUB: &str = "#C8C8C8";
    pub const WINDSHIELD: &str = "#64C8FF";
    pub const GRID: &str = "#C8C8C8";
    pub const PATH: &str = "#0000FF";
    pub const ACTUAL: &str = "#35C788";
    pub const REFERENCE: &str = "#DD3355";
}

fn rotate(x: f64, y: f64, angle: f64) -> (f64, f64) {
    (
        x * angle.cos() - y * angle.sin(),
        x * angle.sin() + y * angle.cos(),
    )
}

/// Car body rectangle rotated to the velocity heading (closed polygon)
fn car_polygon(state: &CarState) -> (Vec<f64>, Vec<f64>) {
    let angle = state.heading();
    let half_w = CAR_WIDTH / 2.0;
    let half_h = CAR_HEIGHT / 2.0;
    let corners = [
        (-half_w, -half_h),
        (half_w, -half_h),
        (half_w, half_h),
        (-half_w, half_h),
        (-half_w, -half_h),
    ];

    let mut xs = Vec::with_capacity(corners.len());
    let mut ys = Vec::with_capacity(corners.len());
    for &(cx, cy) in &corners {
        let (rx, ry) = rotate(cx, cy, angle);
        xs.push(state.x + rx);
        ys.push(state.y + ry);
    }
    (xs, ys)
}

/// Circle points around a wheel center
fn wheel_points(cx: f64, cy: f64, radius: f64) -> (Vec<f64>, Vec<f64>) {
    let n = 20;
    let mut xs = Vec::with_capacity(n + 1);
    let mut ys = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let angle = 2.0 * std::f64::consts::PI * (i as f64) / (n as f64);
        xs.push(cx + radius * angle.cos());
        ys.push(cy + radius * angle.sin());
    }
    (xs, ys)
}

/// Wheel centers in world coordinates, two per side of the body
fn wheel_centers(state: &CarState) -> Vec<(f64, f64)> {
    let angle = state.heading();
    let offset_y = CAR_HEIGHT / 2.0 + WHEEL_RADIUS / 2.0;
    [
        (-CAR_WIDTH / 3.0, -offset_y),
        (CAR_WIDTH / 3.0, -offset_y),
        (-CAR_WIDTH / 3.0, offset_y),
        (CAR_WIDTH / 3.0, offset_y),
    ]
    .iter()
    .map(|&(wx, wy)| {
        let (rx, ry) = rotate(wx, wy, angle);
        (state.x + rx, state.y + ry)
    })
    .collect()
}

/// Windshield triangle toward the front of the car (closed polygon)
fn windshield_polygon(state: &CarState) -> (Vec<f64>, Vec<f64>) {
    let angle = state.heading();
    let points = [
        (CAR_WIDTH / 4.0, 0.0),
        (CAR_WIDTH / 2.0, -CAR_HEIGHT / 3.0),
        (CAR_WIDTH / 2.0, CAR_HEIGHT / 3.0),
        (CAR_WIDTH / 4.0, 0.0),
    ];

    let mut xs = Vec::with_capacity(points.len());
    let mut ys = Vec::with_capacity(points.len());
    for &(px, py) in &points {
        let (rx, ry) = rotate(px, py, angle);
        xs.push(state.x + rx);
        ys.push(state.y + ry);
    }
    (xs, ys)
}

/// Renderer writing frame and summary images under a fixed output directory
pub struct CarVisualizer {
    out_dir: String,
}

impl CarVisualizer {
    pub fn new(out_dir: &str) -> Self {
        Self { out_dir: out_dir.to_string() }
    }

    fn draw_grid(axes: &mut gnuplot::Axes2D) {
        let extent = WORLD_HALF_EXTENT as i64;
        for i in -extent..=extent {
            let i = i as f64;
            axes.lines(
                &[i, i],
                &[-WORLD_HALF_EXTENT, WORLD_HALF_EXTENT],
                &[PlotOption::Color(colors::GRID)],
            );
            axes.lines(
                &[-WORLD_HALF_EXTENT, WORLD_HALF_EXTENT],
                &[i, i],
                &[PlotOption::Color(colors::GRID)],
            );
        }
    }

    fn draw_target(axes: &mut gnuplot::Axes2D, target: &CarState) {
        let (xs, ys) = wheel_points(target.x, target.y, 0.2);
        axes.lines(
            &xs,
            &ys,
            &[PlotOption::Color(colors::TARGET), PlotOption::LineWidth(2.0)],
        );
    }

    fn draw_car(axes: &mut gnuplot::Axes2D, state: &CarState, body_color: &str) {
        let (body_x, body_y) = car_polygon(state);
        axes.lines(
            &body_x,
            &body_y,
            &[PlotOption::Color(body_color), PlotOption::LineWidth(2.0)],
        );

        for (wx, wy) in wheel_centers(state) {
            let (cx, cy) = wheel_points(wx, wy, WHEEL_RADIUS);
            axes.lines(
                &cx,
                &cy,
                &[PlotOption::Color(colors::WHEEL), PlotOption::LineWidth(1.5)],
            );
            let (hx, hy) = wheel_points(wx, wy, WHEEL_RADIUS / 2.0);
            axes.lines(
                &hx,
                &hy,
                &[PlotOption::Color(colors::WHEEL_HUB), PlotOption::LineWidth(1.0)],
            );
        }

        let (ws_x, ws_y) = windshield_polygon(state);
        axes.lines(
            &ws_x,
            &ws_y,
            &[PlotOption::Color(colors::WINDSHIELD), PlotOption::LineWidth(1.5)],
        );
    }

    fn save(&self, fg: &mut Figure, filename: &str, size: &str) -> SimResult<()> {
        std::fs::create_dir_all(&self.out_dir)?;
        let output_path = format!("{}/{}", self.out_dir, filename);
        fg.set_terminal(&format!("pngcairo size {}", size), &output_path);
        fg.show()
            .map(|_| ())
            .map_err(|e| SimError::VisualizationError(e.to_string()))
    }

    /// Render a single simulation frame: grid, target marker, car
    pub fn render_frame(
        &self,
        time: f64,
        state: &CarState,
        target: &CarState,
        filename: &str,
    ) -> SimResult<()> {
        let mut fg = Figure::new();
        {
            let axes = fg.axes2d()
                .set_title(&format!("Car LQR Control  t={:.2}s", time), &[])
                .set_x_label("x [m]", &[])
                .set_y_label("y [m]", &[])
                .set_aspect_ratio(gnuplot::AutoOption::Fix(1.0))
                .set_x_range(
                    gnuplot::AutoOption::Fix(-WORLD_HALF_EXTENT),
                    gnuplot::AutoOption::Fix(WORLD_HALF_EXTENT),
                )
                .set_y_range(
                    gnuplot::AutoOption::Fix(-WORLD_HALF_EXTENT),
                    gnuplot::AutoOption::Fix(WORLD_HALF_EXTENT),
                );

            Self::draw_grid(axes);
            Self::draw_target(axes, target);
            Self::draw_car(axes, state, colors::CAR_BODY);

            axes.label(
                &format!("x={:.2}m, y={:.2}m, v={:.2}m/s", state.x, state.y, state.speed()),
                Coordinate::Graph(0.02),
                Coordinate::Graph(0.95),
                &[],
            );
        }

        self.save(&mut fg, filename, "640,480")
    }

    /// Render a summary image: the traveled path plus a handful of car
    /// poses along it, older poses in lighter colors
    pub fn render_summary(
        &self,
        trajectory: &Trajectory,
        target: &CarState,
        filename: &str,
    ) -> SimResult<()> {
        if trajectory.is_empty() {
            return Err(SimError::VisualizationError(
                "cannot summarize an empty trajectory".to_string(),
            ));
        }

        let num_frames = 6;
        let total_steps = trajectory.len();
        let step_interval = (total_steps / num_frames).max(1);
        let body_colors = [
            "#FFCCCC", "#FFAAAA", "#FF8888", "#FF6666", "#FF4444", "#FF0000",
        ];

        let mut fg = Figure::new();
        {
            let axes = fg.axes2d()
                .set_title("Car LQR Control", &[])
                .set_x_label("x [m]", &[])
                .set_y_label("y [m]", &[])
                .set_aspect_ratio(gnuplot::AutoOption::Fix(1.0))
                .set_x_range(
                    gnuplot::AutoOption::Fix(-WORLD_HALF_EXTENT),
                    gnuplot::AutoOption::Fix(WORLD_HALF_EXTENT),
                )
                .set_y_range(
                    gnuplot::AutoOption::Fix(-WORLD_HALF_EXTENT),
                    gnuplot::AutoOption::Fix(WORLD_HALF_EXTENT),
                );

            Self::draw_grid(axes);
            Self::draw_target(axes, target);

            axes.lines(
                &trajectory.xs(),
                &trajectory.ys(),
                &[PlotOption::Color(colors::PATH), PlotOption::LineWidth(1.5)],
            );

            for frame_idx in 0..num_frames {
                let step = if frame_idx == num_frames - 1 {
                    total_steps - 1
                } else {
                    (frame_idx * step_interval).min(total_steps - 1)
                };
                let (time, state) = trajectory.samples[step];
                Self::draw_car(axes, &state, body_colors[frame_idx]);

                if frame_idx == num_frames - 1 {
                    axes.label(
                        &format!("t={:.1}s", time),
                        Coordinate::Graph(0.02),
                        Coordinate::Graph(0.95),
                        &[],
                    );
                }
            }
        }

        self.save(&mut fg, filename, "800,600")
    }

    /// Plot the x/y position histories against the target as an SVG page
    pub fn plot_state_history(
        &self,
        trajectory: &Trajectory,
        target: &CarState,
        filename: &str,
    ) -> SimResult<()> {
        let times = trajectory.times();
        let x_trace: Vec<(f64, f64)> =
            times.iter().cloned().zip(trajectory.xs()).collect();
        let y_trace: Vec<(f64, f64)> =
            times.iter().cloned().zip(trajectory.ys()).collect();
        let horizon = times.last().cloned().unwrap_or(0.0);

        let x_plot = Plot::new(x_trace)
            .line_style(LineStyle::new().colour(colors::ACTUAL))
            .legend("x".to_string());
        let y_plot = Plot::new(y_trace)
            .line_style(LineStyle::new().colour(colors::PATH))
            .legend("y".to_string());
        let x_ref = Plot::new(vec![(0.0, target.x), (horizon, target.x)])
            .line_style(LineStyle::new().colour(colors::REFERENCE))
            .legend("x target".to_string());
        let y_ref = Plot::new(vec![(0.0, target.y), (horizon, target.y)])
            .line_style(LineStyle::new().colour(colors::REFERENCE))
            .legend("y target".to_string());

        let v = ContinuousView::new()
            .add(x_plot)
            .add(y_plot)
            .add(x_ref)
            .add(y_ref)
            .x_label("t [s]")
            .y_label("position [m]");

        std::fs::create_dir_all(&self.out_dir)?;
        let output_path = format!("{}/{}", self.out_dir, filename);
        Page::single(&v)
            .save(&output_path)
            .map_err(|e| SimError::VisualizationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_car_polygon_is_closed_and_centered() {
        let state = CarState::new(1.0, 0.5, -2.0, 0.0);
        let (xs, ys) = car_polygon(&state);
        assert_eq!(xs.len(), 5);
        assert_eq!(xs.first(), xs.last());
        assert_eq!(ys.first(), ys.last());
        // Corner distances from the center match the body diagonal
        let half_diag = ((CAR_WIDTH / 2.0).powi(2) + (CAR_HEIGHT / 2.0).powi(2)).sqrt();
        for i in 0..4 {
            let d = ((xs[i] - state.x).powi(2) + (ys[i] - state.y).powi(2)).sqrt();
            assert!((d - half_diag).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rotation_follows_heading() {
        // Car moving straight up: the front corner should sit above the center
        let state = CarState::new(0.0, 0.0, 0.0, 1.0);
        let (xs, ys) = windshield_polygon(&state);
        assert!(ys[1] > state.y);
        assert!((xs[0] - state.x).abs() < CAR_HEIGHT);
    }

    #[test]
    fn test_wheel_centers_count() {
        let state = CarState::origin();
        assert_eq!(wheel_centers(&state).len(), 4);
    }

    #[test]
    fn test_wheel_points_circle() {
        let (xs, ys) = wheel_points(1.0, 2.0, WHEEL_RADIUS);
        assert_eq!(xs.len(), 21);
        for (x, y) in xs.iter().zip(ys.iter()) {
            let d = ((x - 1.0).powi(2) + (y - 2.0).powi(2)).sqrt();
            assert!((d - WHEEL_RADIUS).abs() < 1e-12);
        }
    }
}
