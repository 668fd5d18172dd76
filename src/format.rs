//! Compact number formatting for display (e.g. 1234567 → "1.23M").

/// Suffixes for successive powers of 1000.
const UNITS: [&str; 11] = ["K", "M", "B", "T", "Qa", "Qi", "Sx", "Sp", "Oc", "No", "Dc"];

/// Format a magnitude with a suffix scaled by thousands.
///
/// Values below 1000 are rounded to an integer. Larger values keep
/// 2 decimals below 10, 1 below 100 and none otherwise. Past the last
/// suffix the mantissa just keeps growing.
pub fn format_compact(n: f64) -> String {
    if !n.is_finite() {
        return "∞".to_string();
    }
    let abs = n.abs();
    if abs < 1000.0 {
        return format!("{:.0}", n);
    }

    let mut unit = 0;
    let mut val = abs / 1000.0;
    while val >= 1000.0 && unit < UNITS.len() - 1 {
        val /= 1000.0;
        unit += 1;
    }

    let sign = if n < 0.0 { "-" } else { "" };
    let digits = if val >= 100.0 {
        0
    } else if val >= 10.0 {
        1
    } else {
        2
    };
    format!("{sign}{val:.digits$}{}", UNITS[unit])
}

/// Whole seconds, e.g. `3600s`.
pub fn format_duration(seconds: f64) -> String {
    format!("{}s", seconds.max(0.0).floor() as u64)
}
