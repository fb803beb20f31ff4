pub mod config;
pub mod grades;
pub mod metric;
pub mod profile;
pub mod record;
pub mod results;

pub fn clip01(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 1.0)
}

pub fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round() / factor
}
