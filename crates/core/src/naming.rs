//! Output file naming.
//!
//! Every conversion writes to a fresh file named after the moment it was
//! started, e.g. `videology-2024-03-07-02-05-09`. Names have second
//! granularity: two conversions started within the same second get the same
//! name.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};

/// Prefix shared by every generated output name.
pub const FILE_NAME_PREFIX: &str = "videology";

/// Builds the output name for a conversion started at `moment`.
///
/// The date and the time of day are taken in `moment`'s own time zone, so
/// passing a `DateTime<Local>` yields the 24-hour local time of the caller.
pub fn generate_file_name<Tz: TimeZone>(moment: &DateTime<Tz>) -> String {
    format!(
        "{}-{}-{}-{}-{}-{}-{}",
        FILE_NAME_PREFIX,
        moment.year(),
        pad_number(moment.month(), 2),
        pad_number(moment.day(), 2),
        pad_number(moment.hour(), 2),
        pad_number(moment.minute(), 2),
        pad_number(moment.second(), 2),
    )
}

/// Builds the output name for a conversion starting now.
pub fn generate_file_name_now() -> String {
    generate_file_name(&Local::now())
}

/// Left-pads the decimal representation of `number` with zeros.
///
/// Numbers wider than `width` are returned unchanged, never truncated.
///
/// ```
/// use videology_core::naming::pad_number;
///
/// assert_eq!(pad_number(2, 2), "02");
/// assert_eq!(pad_number(35, 3), "035");
/// assert_eq!(pad_number(100, 2), "100");
/// ```
pub fn pad_number(number: u32, width: usize) -> String {
    format!("{:0>width$}", number, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_pad_number_examples() {
        assert_eq!(pad_number(2, 2), "02");
        assert_eq!(pad_number(35, 3), "035");
        assert_eq!(pad_number(100, 2), "100");
        assert_eq!(pad_number(0, 1), "0");
        assert_eq!(pad_number(0, 4), "0000");
    }

    #[test]
    fn test_pad_number_covers_full_width_range() {
        for width in 1..=4usize {
            let max = 10u32.pow(width as u32);
            for number in 0..max {
                let padded = pad_number(number, width);
                assert_eq!(padded.len(), width, "{} at width {}", number, width);
                assert_eq!(padded.parse::<u32>().unwrap(), number);
            }
        }
    }

    #[test]
    fn test_generate_file_name_pads_time_components() {
        let moment = Utc.with_ymd_and_hms(2024, 3, 7, 2, 5, 9).unwrap();
        assert_eq!(generate_file_name(&moment), "videology-2024-03-07-02-05-09");
    }

    #[test]
    fn test_generate_file_name_uses_24_hour_clock() {
        let moment = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 58).unwrap();
        assert_eq!(generate_file_name(&moment), "videology-2023-12-31-23-59-58");
    }

    #[test]
    fn test_generate_file_name_follows_moment_time_zone() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let moment = offset.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).unwrap();
        // Same instant is still 2023-12-31 in UTC, the local reading wins.
        assert_eq!(generate_file_name(&moment), "videology-2024-01-01-00-30-00");
    }

    #[test]
    fn test_generate_file_name_now_shape() {
        let name = generate_file_name_now();
        let rest = name.strip_prefix("videology-").unwrap();
        let parts: Vec<&str> = rest.split('-').collect();
        assert_eq!(parts.len(), 6);
        assert_eq!(parts[0].len(), 4);
        assert!(parts[1..].iter().all(|p| p.len() == 2));
        assert!(parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())));
    }
}
