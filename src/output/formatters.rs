//! Reusable formatting utilities for CLI output
//!
//! Sizes, commit ids and job lists as they appear in table cells.

/// Format a byte count with a binary unit.
///
/// # Example output
/// - `512 B`
/// - `1.5 KB`
/// - `2.25 GB`
pub fn format_size(bytes: i64) -> String {
    let bytes = bytes.max(0) as u64;
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// First 8 characters of a commit id
pub fn short_commit(commit: &str) -> &str {
    commit.get(..8).unwrap_or(commit)
}

/// Comma-separated job names, or a placeholder when there are none.
pub fn format_jobs(jobs: Option<&[String]>) -> String {
    match jobs {
        None => "-".to_string(),
        Some([]) => "(none)".to_string(),
        Some(jobs) => jobs.join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(9 * 1024 * 1024 * 1024 / 4), "2.25 GB");
    }

    #[test]
    fn test_format_size_negative_is_zero() {
        assert_eq!(format_size(-10), "0 B");
    }

    #[test]
    fn test_short_commit() {
        assert_eq!(short_commit("0123456789abcdef"), "01234567");
        assert_eq!(short_commit("abc"), "abc");
    }

    #[test]
    fn test_format_jobs() {
        assert_eq!(format_jobs(None), "-");
        assert_eq!(format_jobs(Some(&[])), "(none)");
        let jobs = vec!["build".to_string(), "test".to_string()];
        assert_eq!(format_jobs(Some(&jobs)), "build, test");
    }
}
