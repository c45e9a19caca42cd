use std::time::Duration;

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// `HH:MM:SS` from whole seconds; hours keep growing past 99.
pub fn format_time(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

pub fn format_duration(elapsed: Duration) -> String {
    format_time(elapsed.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[5.0, 4.5, 3.0, 5.0]), Some(4.375));
        assert_eq!(mean(&[42.0]), Some(42.0));
    }

    #[test]
    fn test_mean_empty_slice() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00:00");
        assert_eq!(format_time(59), "00:00:59");
        assert_eq!(format_time(61), "00:01:01");
        assert_eq!(format_time(3600 + 23 * 60 + 5), "01:23:05");
        assert_eq!(format_time(100 * 3600), "100:00:00");
    }

    #[test]
    fn test_format_duration_truncates() {
        assert_eq!(format_duration(Duration::from_millis(2999)), "00:00:02");
    }
}
