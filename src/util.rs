/// `part / whole * 100`, or 0 when there is nothing to divide by.
pub fn percentage(part: u64, whole: u64) -> f64 {
    fraction(part, whole) * 100.0
}

pub fn fraction(part: u64, whole: u64) -> f64 {
    if whole == 0 { return 0.0; }
    part as f64 / whole as f64
}

pub fn round_to_tenth(val: f64) -> f64 {
    (val * 10.0).round() / 10.0
}

// Ratings stay floats during replay; only what we show gets rounded
pub fn display_rating(rating: f64) -> i64 {
    rating.round() as i64
}
