//! Human-readable rendering for byte sizes and durations.

const SIZE_SYMBOLS: [&str; 7] = ["B", "KB", "MB", "GB", "TB", "PB", "EB"];

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;
const NANOS_PER_MIN: u64 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u64 = 60 * NANOS_PER_MIN;

/// Render a byte count with a base-1024 prefix.
///
/// One decimal place is kept below 10 units of the chosen prefix:
/// `1024` is `1.0KB`, `6815744` is `6.5MB`, `128849018880` is `120GB`.
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(bytes: i64) -> String {
    if bytes < 10 {
        return format!("{bytes}B");
    }

    let mut idx = 0;
    let mut unit: i64 = 1;
    while idx + 1 < SIZE_SYMBOLS.len() {
        match unit.checked_mul(1024) {
            Some(next) if bytes >= next => {
                unit = next;
                idx += 1;
            },
            _ => break,
        }
    }

    let size = bytes as f64 / unit as f64;
    if size < 10.0 {
        format!("{size:.1}{}", SIZE_SYMBOLS[idx])
    } else {
        format!("{size:.0}{}", SIZE_SYMBOLS[idx])
    }
}

/// Round a nanosecond count to the coarsest unit that keeps it non-zero.
///
/// Seconds from 1s up, then milliseconds, microseconds and nanoseconds.
/// Halves round away from zero.
pub fn round_duration(nanos: i64) -> i64 {
    let magnitude = nanos.unsigned_abs();
    let unit = if magnitude >= NANOS_PER_SEC {
        NANOS_PER_SEC
    } else if magnitude >= NANOS_PER_MILLI {
        NANOS_PER_MILLI
    } else if magnitude >= NANOS_PER_MICRO {
        NANOS_PER_MICRO
    } else {
        return nanos;
    };

    let rem = magnitude % unit;
    let rounded = if rem + rem < unit {
        magnitude - rem
    } else {
        magnitude.saturating_add(unit - rem)
    };

    let rounded = i64::try_from(rounded).unwrap_or(i64::MAX);
    if nanos < 0 {
        -rounded
    } else {
        rounded
    }
}

/// Render a nanosecond count as `1h2m3.5s`, `155ms`, `1µs`, `12ns`.
pub fn format_duration(nanos: i64) -> String {
    if nanos == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    if nanos < 0 {
        out.push('-');
    }
    let magnitude = nanos.unsigned_abs();

    if magnitude < NANOS_PER_SEC {
        let (scale, suffix) = if magnitude < NANOS_PER_MICRO {
            (1, "ns")
        } else if magnitude < NANOS_PER_MILLI {
            (NANOS_PER_MICRO, "µs")
        } else {
            (NANOS_PER_MILLI, "ms")
        };
        out.push_str(&fixed_point(magnitude, scale));
        out.push_str(suffix);
        return out;
    }

    let hours = magnitude / NANOS_PER_HOUR;
    let minutes = (magnitude % NANOS_PER_HOUR) / NANOS_PER_MIN;
    let secs = magnitude % NANOS_PER_MIN;

    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&fixed_point(secs, NANOS_PER_SEC));
    out.push('s');
    out
}

/// `value / scale` with the fractional part printed without trailing zeros.
fn fixed_point(value: u64, scale: u64) -> String {
    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return whole.to_string();
    }

    let width = (scale - 1).to_string().len();
    let digits = format!("{frac:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
