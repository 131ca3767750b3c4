use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Group an integer with thousands separators: 2500000 -> "2,500,000".
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// "AED 2,500,000". Listings without a public price show "Price on Request".
pub fn format_price(amount: i64, currency: &str) -> String {
    if amount <= 0 {
        return "Price on Request".to_string();
    }
    format!("{} {}", currency, group_thousands(amount))
}

pub fn format_area(sqft: u32) -> String {
    format!("{} sq.ft.", group_thousands(i64::from(sqft)))
}

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// "12 January 2026", the long-form date used on blog posts.
pub fn format_date(datetime: &DateTime<Utc>) -> String {
    let date = datetime.date_naive();
    format!(
        "{} {} {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// "January 2026", used for project completion dates.
pub fn format_month_year(date: &NaiveDate) -> String {
    format!("{} {}", MONTHS[date.month0() as usize], date.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(950), "950");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(2_500_000), "2,500,000");
        assert_eq!(group_thousands(12_345_678_901), "12,345,678,901");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(4_750_000, "AED"), "AED 4,750,000");
        assert_eq!(format_price(0, "AED"), "Price on Request");
    }

    #[test]
    fn test_format_area() {
        assert_eq!(format_area(1_850), "1,850 sq.ft.");
    }

    #[test]
    fn test_format_date() {
        let dt = Utc.with_ymd_and_hms(2026, 1, 12, 9, 30, 0).unwrap();
        assert_eq!(format_date(&dt), "12 January 2026");
    }

    #[test]
    fn test_format_month_year() {
        let date = NaiveDate::from_ymd_opt(2027, 12, 1).unwrap();
        assert_eq!(format_month_year(&date), "December 2027");
    }
}
