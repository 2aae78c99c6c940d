use macroquad::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use parkassist_core::{Cycle, IndicatorCommand, Rgb};

use crate::blackboard::{Blackboard, snapshot};
use crate::sim::DialHandle;

// Function to configure the macroquad window
pub fn window_conf() -> Conf {
    Conf {
        window_title: "Parking Assist Indicator".to_string(),
        window_width: 800,
        window_height: 600,
        high_dpi: true,
        ..Default::default()
    }
}

const GAUGE_X: f32 = 40.0;
const GAUGE_Y: f32 = 360.0;
const GAUGE_HEIGHT: f32 = 40.0;
const GAUGE_RANGE_CM: f32 = 450.0;
const LAMP_RADIUS: f32 = 80.0;
const HISTORY_LEN: usize = 8;
/// Dial steps from one end to the other.
const DIAL_STEPS: i32 = 50;

fn lamp_color(rgb: Rgb) -> Color {
    if rgb == Rgb::default() {
        // Dark lamp, still visible against the background.
        return DARKGRAY;
    }
    Color::from_rgba(rgb.r, rgb.g, rgb.b, 255)
}

fn gauge_x(cm: f32, width: f32) -> f32 {
    GAUGE_X + (cm.clamp(0.0, GAUGE_RANGE_CM) / GAUGE_RANGE_CM) * width
}

pub async fn run_visualization_loop(
    mut cycle_rx: broadcast::Receiver<Arc<Cycle>>,
    bb: Blackboard,
    dial: DialHandle,
) {
    let mut history: VecDeque<String> = VecDeque::with_capacity(HISTORY_LEN);
    let dial_step = (dial.full_scale() as i32 / DIAL_STEPS).max(1);

    info!("Visualization loop starting inside graphics module...");

    loop {
        loop {
            match cycle_rx.try_recv() {
                Ok(cycle) => {
                    if let Some(IndicatorCommand::SetColor(color)) = cycle.command {
                        if history.len() == HISTORY_LEN {
                            history.pop_front();
                        }
                        history.push_back(format!("{} {} @ {}", cycle.at, color, cycle.distance));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => break,
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Visualization cycle receiver lagged.");
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    error!("Sampler cycle channel closed. Exiting visualization loop.");
                    return;
                }
            }
        }

        if is_key_pressed(KeyCode::Up) {
            dial.nudge(dial_step);
        }
        if is_key_pressed(KeyCode::Down) {
            dial.nudge(-dial_step);
        }

        let state = snapshot(&bb);

        clear_background(LIGHTGRAY);
        let width = screen_width() - 2.0 * GAUGE_X;

        let rgb = state.lit.map(|c| c.rgb()).unwrap_or_default();
        draw_circle(screen_width() / 2.0, 160.0, LAMP_RADIUS, lamp_color(rgb));
        draw_circle_lines(screen_width() / 2.0, 160.0, LAMP_RADIUS, 3.0, BLACK);

        if let Some(t) = state.thresholds {
            let stop_x = gauge_x(t.stop_distance().as_cm(), width);
            let warn_x = gauge_x(t.warn_distance().as_cm(), width);
            let end_x = GAUGE_X + width;
            draw_rectangle(GAUGE_X, GAUGE_Y, stop_x - GAUGE_X, GAUGE_HEIGHT, PINK);
            draw_rectangle(stop_x, GAUGE_Y, warn_x - stop_x, GAUGE_HEIGHT, SKYBLUE);
            draw_rectangle(warn_x, GAUGE_Y, end_x - warn_x, GAUGE_HEIGHT, LIME);
        }
        draw_rectangle_lines(GAUGE_X, GAUGE_Y, width, GAUGE_HEIGHT, 2.0, BLACK);

        let car_x = gauge_x(state.distance.as_cm(), width);
        draw_line(car_x, GAUGE_Y - 10.0, car_x, GAUGE_Y + GAUGE_HEIGHT + 10.0, 4.0, BLACK);

        draw_text(&format!("Distance: {}  Zone: {}", state.distance, state.zone), 10.0, 20.0, 20.0, BLACK);
        draw_text(
            &format!("Offset: {} (dial {}/{}, Up/Down to turn)", state.offset, dial.raw(), dial.full_scale()),
            10.0,
            40.0,
            20.0,
            BLACK,
        );
        if let Some(t) = state.thresholds {
            draw_text(&format!("Thresholds: {}", t), 10.0, 60.0, 20.0, BLACK);
        }
        draw_text(
            &format!("Samples: {}  Indicator writes: {}", state.samples, state.indicator_writes),
            10.0,
            GAUGE_Y + GAUGE_HEIGHT + 35.0,
            20.0,
            BLACK,
        );

        for (i, line) in history.iter().enumerate() {
            draw_text(line, 10.0, GAUGE_Y + GAUGE_HEIGHT + 60.0 + i as f32 * 18.0, 18.0, DARKGRAY);
        }

        for (i, fault) in state.faults.iter().enumerate() {
            draw_text(&format!("FAULT: {}", fault), screen_width() - 300.0, 20.0 + i as f32 * 20.0, 20.0, RED);
        }

        next_frame().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_clamps() {
        assert_eq!(gauge_x(-10.0, 450.0), GAUGE_X);
        assert_eq!(gauge_x(1.0e6, 450.0), GAUGE_X + 450.0);
        assert_eq!(gauge_x(225.0, 450.0), GAUGE_X + 225.0);
    }
}
