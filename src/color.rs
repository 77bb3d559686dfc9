use crate::models::{ColorGrid, Histogram};

const BLUE_FULL: f64 = 128.0;
const BLUE_EMPTY: f64 = 242.0;
const RED_GREEN_EMPTY: f64 = 229.0;

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Heat color for a share of attempts: deep blue at 100, pale at 0.
pub fn color_of(percent: f64) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let missing = (100.0 - percent) / 100.0;
    let blue = channel(BLUE_FULL + (BLUE_EMPTY - BLUE_FULL) * missing);
    let red_green = channel(RED_GREEN_EMPTY * missing);
    format!("#{red_green:02x}{red_green:02x}{blue:02x}")
}

pub fn color_grid(histogram: &Histogram) -> ColorGrid {
    histogram
        .iter()
        .map(|band| band.iter().map(|percent| color_of(*percent)).collect())
        .collect()
}
