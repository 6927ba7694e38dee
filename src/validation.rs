//! Input checks shared by the services and handlers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Local Egyptian mobile form: `01` + operator digit (0, 1, 2 or 5) + 8 digits.
static EGYPTIAN_MOBILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^01[0125][0-9]{8}$").unwrap());

static NATIONAL_ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{14}$").unwrap());

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

static DRIVE_LINK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https://(drive|docs)\.google\.com/\S+$").unwrap());

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Canonical 11-digit local form of an Egyptian mobile number.
///
/// Spaces and dashes are ignored, and the international prefixes `+20` and
/// `0020` are folded back to the leading `0`.
pub fn normalize_egyptian_mobile(input: &str) -> Option<String> {
    let compact: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    let local = if let Some(rest) = compact.strip_prefix("+20") {
        format!("0{}", rest)
    } else if let Some(rest) = compact.strip_prefix("0020") {
        format!("0{}", rest)
    } else {
        compact
    };

    if EGYPTIAN_MOBILE_PATTERN.is_match(&local) {
        Some(local)
    } else {
        None
    }
}

pub fn is_valid_egyptian_mobile(input: &str) -> bool {
    normalize_egyptian_mobile(input).is_some()
}

pub fn is_valid_national_id(input: &str) -> bool {
    NATIONAL_ID_PATTERN.is_match(input)
}

pub fn is_valid_email(input: &str) -> bool {
    !input.is_empty() && input.len() <= MAX_EMAIL_LENGTH && EMAIL_PATTERN.is_match(input)
}

pub fn is_valid_drive_link(input: &str) -> bool {
    DRIVE_LINK_PATTERN.is_match(input)
}

pub fn is_strong_enough_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

/// Trimmed value, or `None` when nothing but whitespace remains.
pub fn non_blank(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_all_operator_prefixes() {
        for number in ["01012345678", "01112345678", "01212345678", "01512345678"] {
            assert!(is_valid_egyptian_mobile(number), "{} should be valid", number);
        }
    }

    #[test]
    fn rejects_unknown_prefix_and_bad_length() {
        for number in [
            "01312345678",
            "0101234567",
            "010123456789",
            "11012345678",
            "0101234567a",
            "",
        ] {
            assert!(!is_valid_egyptian_mobile(number), "{} should be invalid", number);
        }
    }

    #[test]
    fn folds_international_prefixes() {
        assert_eq!(
            normalize_egyptian_mobile("+201012345678").as_deref(),
            Some("01012345678")
        );
        assert_eq!(
            normalize_egyptian_mobile("00201112345678").as_deref(),
            Some("01112345678")
        );
        assert_eq!(
            normalize_egyptian_mobile("010 1234-5678").as_deref(),
            Some("01012345678")
        );
    }

    #[test]
    fn national_id_is_exactly_fourteen_digits() {
        assert!(is_valid_national_id("29801011234567"));
        assert!(!is_valid_national_id("2980101123456"));
        assert!(!is_valid_national_id("298010112345678"));
        assert!(!is_valid_national_id("2980101123456a"));
        assert!(!is_valid_national_id(" 29801011234567"));
        // Arabic-Indic digits are not accepted
        assert!(!is_valid_national_id("٢٩٨٠١٠١١٢٣٤٥٦٧"));
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("student@example.com"));
        assert!(is_valid_email("a+b@school.edu.eg"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("user@localhost"));
    }

    #[test]
    fn drive_links() {
        assert!(is_valid_drive_link(
            "https://drive.google.com/file/d/abc123/view?usp=sharing"
        ));
        assert!(is_valid_drive_link("https://docs.google.com/document/d/xyz/edit"));
        assert!(!is_valid_drive_link("http://drive.google.com/file/d/abc"));
        assert!(!is_valid_drive_link("https://drive.google.com.evil.io/x"));
        assert!(!is_valid_drive_link("https://example.com/drive"));
    }

    #[test]
    fn password_length_counts_characters() {
        assert!(is_strong_enough_password("password"));
        assert!(!is_strong_enough_password("short"));
        assert!(is_strong_enough_password("كلمةسرية"));
    }
}
