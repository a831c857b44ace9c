use chrono::DateTime;

/// Appends a UTC date to values that parse as Unix timestamps in seconds.
pub fn format_connected_since(raw: &str) -> String {
    let trimmed = raw.trim();
    let date = trimmed
        .parse::<i64>()
        .ok()
        .filter(|seconds| *seconds > 0)
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0));

    match date {
        Some(date) => format!("{trimmed} ({})", date.format("%Y-%m-%d %H:%M UTC")),
        None => raw.to_owned(),
    }
}

pub fn organization_label(name: &str) -> &str {
    if name.trim().is_empty() {
        "(unknown organization)"
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_timestamps_gain_a_utc_date() {
        assert_eq!(
            format_connected_since("1545000000"),
            "1545000000 (2018-12-16 22:40 UTC)"
        );
    }

    #[test]
    fn other_values_pass_through() {
        assert_eq!(format_connected_since("yesterday"), "yesterday");
        assert_eq!(format_connected_since(""), "");
        assert_eq!(format_connected_since("-5"), "-5");
    }

    #[test]
    fn blank_organizations_get_a_label() {
        assert_eq!(organization_label(""), "(unknown organization)");
        assert_eq!(organization_label("OVH SAS"), "OVH SAS");
    }
}
