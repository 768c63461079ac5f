use chrono::NaiveDateTime;

/// Product name embedded in every export file name.
pub const PRODUCT_NAME: &str = "Profesto";

pub const FILE_EXTENSION: &str = "xlsx";

/// `{YYYY-MM-DD}T{HH:mm} - Profesto - {report}`, without extension.
pub fn export_file_name(generated_at: NaiveDateTime, report_name: &str) -> String {
    format!(
        "{}T{} - {PRODUCT_NAME} - {}",
        generated_at.format("%Y-%m-%d"),
        generated_at.format("%H:%M"),
        report_name.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn follows_naming_convention() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 5, 42)
            .unwrap();
        assert_eq!(
            export_file_name(at, " Employee List "),
            "2024-03-01T09:05 - Profesto - Employee List"
        );
    }
}
