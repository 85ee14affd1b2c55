//! Date label to bucket directory name.

/// Sanitize a caller-supplied date label into a directory name.
///
/// Surrounding whitespace is trimmed; ASCII digits and `-` are kept and every
/// other character becomes `_`, one-for-one. The result therefore never
/// contains a path separator, and has exactly as many characters as the
/// trimmed label.
///
/// Distinct labels can collide (`"2024/03/15"` and `"2024.03.15"` both become
/// `"2024_03_15"`). Nothing here disambiguates them.
///
/// ```
/// use lifetracker_attachments::bucket_name;
///
/// assert_eq!(bucket_name("2024-03-15"), "2024-03-15");
/// assert_eq!(bucket_name(" 15/03/2024 "), "15_03_2024");
/// assert_eq!(bucket_name(""), "");
/// ```
pub fn bucket_name(date_label: &str) -> String {
    date_label
        .trim()
        .chars()
        .map(|ch| if ch.is_ascii_digit() || ch == '-' { ch } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024-03-15", "2024-03-15")]
    #[case("  2024-03-15\n", "2024-03-15")]
    #[case("2024/03/15", "2024_03_15")]
    #[case("2024.03.15", "2024_03_15")]
    #[case("15 March", "15______")]
    #[case("../..", "_____")]
    #[case("2024-03-15T10:00", "2024-03-15_10_00")]
    #[case("день 5", "_____5")]
    #[case("", "")]
    #[case("   ", "")]
    fn sanitizes(#[case] label: &str, #[case] expected: &str) {
        assert_eq!(bucket_name(label), expected);
    }

    #[rstest]
    #[case("2024-03-15")]
    #[case("a/b\\c")]
    #[case(" ünïcødé 日本語 ")]
    #[case("\t2024 03 15\t")]
    #[case("🚀-1")]
    fn only_safe_characters_with_trimmed_length(#[case] label: &str) {
        let name = bucket_name(label);
        assert!(name.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '_'));
        assert_eq!(name.chars().count(), label.trim().chars().count());
        assert!(!name.contains(std::path::MAIN_SEPARATOR));
    }

    #[test]
    fn distinct_labels_can_collide() {
        assert_eq!(bucket_name("2024/03/15"), bucket_name("2024.03.15"));
    }
}
