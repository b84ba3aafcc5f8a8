use chrono::NaiveDate;

/// Formats a `YYYY-MM` (or `YYYY-MM-DD`) date as `Mon YYYY`.
///
/// `present` becomes `Present`, a bare year is kept, anything unparsable is
/// returned untouched.
pub fn format_date(date: &str) -> String {
    let date = date.trim();
    if date.eq_ignore_ascii_case("present") {
        return "Present".to_string();
    }

    let mut parts = date.splitn(3, '-');
    let (Some(year), month) = (parts.next(), parts.next()) else {
        return date.to_string();
    };
    let Some(month) = month else {
        return date.to_string();
    };

    match NaiveDate::parse_from_str(&format!("{year}-{month}-01"), "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%b %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

pub fn format_date_range(start: &str, end: &str) -> String {
    format!("{} - {}", format_date(start), format_date(end))
}
