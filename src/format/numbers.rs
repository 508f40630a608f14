// Display formatting for measures.
// Locale-free, half-up rounding, leading minus for negatives.
// Non-finite input renders as zero; the query layer never produces it,
// but a display string must never read "NaN".

/// (scale, suffix, decimals), largest first.
const TIERS: [(f64, &str, usize); 3] = [(1e9, "B", 1), (1e6, "M", 1), (1e3, "K", 0)];

/// `$1.2B`, `$340K`, `-$12`.
pub fn format_money(n: f64) -> String {
    format_compact(n, "$")
}

/// `6.3M`, `340K`, `42`.
pub fn format_count(n: f64) -> String {
    format_compact(n, "")
}

/// Whole dollars with thousands separators: `$15,700,000,000`.
pub fn format_money_full(n: f64) -> String {
    if !n.is_finite() {
        return "$0".to_string();
    }
    let whole = round_half_up(n.abs(), 0);
    if whole == 0.0 {
        return "$0".to_string();
    }
    let sign = if n < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(whole as u64))
}

/// `percent` is already scaled to 0..100: `format_percent(12.345, 1) == "12.3%"`.
pub fn format_percent(percent: f64, decimals: usize) -> String {
    if !percent.is_finite() {
        return "0%".to_string();
    }
    let rounded = round_half_up(percent.abs(), decimals);
    if rounded == 0.0 {
        return format!("{:.*}%", decimals, 0.0);
    }
    let sign = if percent < 0.0 { "-" } else { "" };
    format!("{sign}{:.*}%", decimals, rounded)
}

fn format_compact(n: f64, unit: &str) -> String {
    if !n.is_finite() {
        return format!("{unit}0");
    }
    let body = compact_magnitude(n.abs());
    if body == "0" {
        return format!("{unit}0");
    }
    let sign = if n < 0.0 { "-" } else { "" };
    format!("{sign}{unit}{body}")
}

fn compact_magnitude(m: f64) -> String {
    for (i, &(scale, suffix, decimals)) in TIERS.iter().enumerate() {
        if m < scale {
            continue;
        }
        let scaled = round_half_up(m / scale, decimals);
        // 999,950 rounds to "1000K"; promote it to "1.0M"
        if scaled >= 1000.0 && i > 0 {
            let (up_scale, up_suffix, up_decimals) = TIERS[i - 1];
            let promoted = round_half_up(m / up_scale, up_decimals);
            return format!("{:.*}{}", up_decimals, promoted, up_suffix);
        }
        return format!("{:.*}{}", decimals, scaled, suffix);
    }

    let units = round_half_up(m, 0);
    if units >= 1000.0 {
        return "1K".to_string();
    }
    format!("{:.0}", units)
}

/// Round a non-negative value half away from zero at `decimals` places.
fn round_half_up(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor + 0.5).floor() / factor
}

fn group_thousands(mut n: u64) -> String {
    let mut groups = Vec::new();
    loop {
        let group = n % 1000;
        n /= 1000;
        if n == 0 {
            groups.push(group.to_string());
            break;
        }
        groups.push(format!("{group:03}"));
    }
    groups.reverse();
    groups.join(",")
}
