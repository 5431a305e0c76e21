//! Report flavor detection and period-label parsing.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::enums::ReportFlavor;

/// Wording that only appears in services reports.
static SERVICES_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:business\s+activity|inventory\s+sentiment|services\s+pmi|non-?manufacturing|services\s+sector)\b",
    )
    .unwrap()
});

/// Services when any index name or the narrative carries services-only
/// wording; manufacturing otherwise.
pub fn detect_report_flavor<'a>(
    index_names: impl IntoIterator<Item = &'a str>,
    narrative: Option<&'a str>,
) -> ReportFlavor {
    let services = index_names
        .into_iter()
        .chain(narrative)
        .any(|text| SERVICES_MARKERS.is_match(text));
    if services {
        ReportFlavor::Services
    } else {
        ReportFlavor::Manufacturing
    }
}

/// First day of the month named by labels such as "February 2024",
/// "Feb. 2024", "Sept 2024" or "2024-02".
pub fn parse_period_label(label: &str) -> Option<NaiveDate> {
    let cleaned = label.trim().replace([',', '.'], " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(&format!("{cleaned}-01"), "%Y-%m-%d") {
        return Some(date);
    }

    // chrono's %B takes full or three-letter names
    let month_first = cleaned
        .split_once(' ')
        .map(|(month, year)| {
            let month = if month.eq_ignore_ascii_case("sept") { "Sep" } else { month };
            format!("1 {month} {year}")
        })?;
    NaiveDate::parse_from_str(&month_first, "%d %B %Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn manufacturing_by_default() {
        let names = ["New Orders", "Production", "Customers' Inventories"];
        assert_eq!(
            detect_report_flavor(names, Some("Manufacturing PMI registered 47.8 percent.")),
            ReportFlavor::Manufacturing
        );
        assert_eq!(detect_report_flavor(Vec::<&str>::new(), None), ReportFlavor::Manufacturing);
    }

    #[test]
    fn services_detected_from_index_names_or_narrative() {
        assert_eq!(
            detect_report_flavor(["Business Activity", "New Orders"], None),
            ReportFlavor::Services
        );
        assert_eq!(
            detect_report_flavor(["New Orders"], Some("The Services PMI registered 52.6 percent.")),
            ReportFlavor::Services
        );
    }

    #[test]
    fn parses_common_period_labels() {
        assert_eq!(parse_period_label("February 2024"), Some(ymd(2024, 2)));
        assert_eq!(parse_period_label("Feb 2024"), Some(ymd(2024, 2)));
        assert_eq!(parse_period_label("Feb. 2024"), Some(ymd(2024, 2)));
        assert_eq!(parse_period_label("Sept 2023"), Some(ymd(2023, 9)));
        assert_eq!(parse_period_label("2024-02"), Some(ymd(2024, 2)));
        assert_eq!(parse_period_label(" december, 2022 "), Some(ymd(2022, 12)));
    }

    #[test]
    fn rejects_unparseable_labels() {
        assert_eq!(parse_period_label(""), None);
        assert_eq!(parse_period_label("Q1 2024"), None);
        assert_eq!(parse_period_label("2024-13"), None);
        assert_eq!(parse_period_label("last month"), None);
    }
}
