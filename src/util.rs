// Format an event rate for display
pub fn format_rate(events_per_sec: f64) -> String {
    const K: f64 = 1000.0;
    const M: f64 = 1000.0 * K;

    if events_per_sec >= M {
        format!("{:.2} M/s", events_per_sec / M)
    } else if events_per_sec >= K {
        format!("{:.2} k/s", events_per_sec / K)
    } else {
        format!("{:.1} /s", events_per_sec)
    }
}

pub fn format_total(events: u64) -> String {
    const K: u64 = 1000;
    const M: u64 = 1000 * K;
    const G: u64 = 1000 * M;
    if events >= G {
        format!("{:.2} G", events as f64 / G as f64)
    } else if events >= M {
        format!("{:.2} M", events as f64 / M as f64)
    } else if events >= K {
        format!("{:.2} k", events as f64 / K as f64)
    } else {
        format!("{}", events)
    }
}

// Events counted in one tick, scaled to a per-second rate
pub fn per_second(count: u64, tick_ms: u64) -> f64 {
    if tick_ms == 0 {
        0.0
    } else {
        count as f64 * (1000.0 / tick_ms as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_units() {
        assert_eq!(format_rate(0.0), "0.0 /s");
        assert_eq!(format_rate(12.0), "12.0 /s");
        assert_eq!(format_rate(2500.0), "2.50 k/s");
        assert_eq!(format_rate(3_200_000.0), "3.20 M/s");
    }

    #[test]
    fn total_units() {
        assert_eq!(format_total(999), "999");
        assert_eq!(format_total(1500), "1.50 k");
        assert_eq!(format_total(2_000_000_000), "2.00 G");
    }

    #[test]
    fn per_tick_to_per_second() {
        assert_eq!(per_second(5, 250), 20.0);
        assert_eq!(per_second(5, 0), 0.0);
    }
}
