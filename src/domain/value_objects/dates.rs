use chrono::{DateTime, Utc};

/// Brazilian short date, dd/mm/yyyy.
pub fn format_date_br(at: DateTime<Utc>) -> String {
    at.format("%d/%m/%Y").to_string()
}

/// Brazilian short date and time, dd/mm/yyyy hh:mm.
pub fn format_datetime_br(at: DateTime<Utc>) -> String {
    at.format("%d/%m/%Y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_day_month_year() {
        let at = Utc.with_ymd_and_hms(2025, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(format_date_br(at), "09/03/2025");
        assert_eq!(format_datetime_br(at), "09/03/2025 14:05");
    }
}
