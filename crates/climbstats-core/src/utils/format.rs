use chrono::Duration;

/// Format an age for log output: "just now", "42m", "5h", "10d".
/// Hours and days round half up.
pub fn format_age(age: Duration) -> String {
    let minutes = age.num_minutes();
    if minutes < 1 {
        // Includes negative ages from clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h", hours + 1)
        } else {
            format!("{}h", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d", days + 1)
        } else {
            format!("{}d", days)
        }
    }
}
