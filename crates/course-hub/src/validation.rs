//! Pure input checks shared by the services. Each returns the first rule the
//! input violates.

use std::sync::OnceLock;

use regex::Regex;

pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern compiles")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\+84|0)[35789][0-9]{8}$").expect("phone pattern compiles"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailRule {
    Empty,
    TooLong,
    Malformed,
}

impl EmailRule {
    pub fn message(self) -> &'static str {
        match self {
            EmailRule::Empty => "Email không được để trống",
            EmailRule::TooLong => "Email quá dài",
            EmailRule::Malformed => "Email không đúng định dạng",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    TooShort,
    TooLong,
    ContainsWhitespace,
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSpecial,
}

impl PasswordRule {
    pub fn message(self) -> &'static str {
        match self {
            PasswordRule::TooShort => "Mật khẩu phải có ít nhất 8 ký tự",
            PasswordRule::TooLong => "Mật khẩu không được vượt quá 128 ký tự",
            PasswordRule::ContainsWhitespace => "Mật khẩu không được chứa khoảng trắng",
            PasswordRule::MissingUppercase => "Mật khẩu phải chứa ít nhất một chữ hoa",
            PasswordRule::MissingLowercase => "Mật khẩu phải chứa ít nhất một chữ thường",
            PasswordRule::MissingDigit => "Mật khẩu phải chứa ít nhất một chữ số",
            PasswordRule::MissingSpecial => "Mật khẩu phải chứa ít nhất một ký tự đặc biệt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneRule {
    Malformed,
}

impl PhoneRule {
    pub fn message(self) -> &'static str {
        match self {
            PhoneRule::Malformed => "Số điện thoại không hợp lệ",
        }
    }
}

pub fn check_email(raw: &str) -> Result<(), EmailRule> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(EmailRule::Empty);
    }
    if value.len() > MAX_EMAIL_LENGTH {
        return Err(EmailRule::TooLong);
    }
    if value.contains("..") || !email_pattern().is_match(value) {
        return Err(EmailRule::Malformed);
    }
    Ok(())
}

pub fn check_password(raw: &str) -> Result<(), PasswordRule> {
    let length = raw.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(PasswordRule::TooShort);
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(PasswordRule::TooLong);
    }
    if raw.chars().any(char::is_whitespace) {
        return Err(PasswordRule::ContainsWhitespace);
    }
    if !raw.chars().any(char::is_uppercase) {
        return Err(PasswordRule::MissingUppercase);
    }
    if !raw.chars().any(char::is_lowercase) {
        return Err(PasswordRule::MissingLowercase);
    }
    if !raw.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordRule::MissingDigit);
    }
    if raw.chars().all(char::is_alphanumeric) {
        return Err(PasswordRule::MissingSpecial);
    }
    Ok(())
}

/// Vietnamese mobile numbers, either `0xxxxxxxxx` or `+84xxxxxxxxx`.
pub fn check_phone(raw: &str) -> Result<(), PhoneRule> {
    let compact: String = raw.chars().filter(|c| !matches!(c, ' ' | '.' | '-')).collect();
    if phone_pattern().is_match(&compact) {
        Ok(())
    } else {
        Err(PhoneRule::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert_eq!(check_email("thu.ky@truong.edu.vn"), Ok(()));
        assert_eq!(check_email("  sv2024+hk1@example.com "), Ok(()));
    }

    #[test]
    fn reports_first_email_violation() {
        assert_eq!(check_email("   "), Err(EmailRule::Empty));
        assert_eq!(check_email("no-at-sign.example.com"), Err(EmailRule::Malformed));
        assert_eq!(check_email("a..b@example.com"), Err(EmailRule::Malformed));
        assert_eq!(check_email("a@example"), Err(EmailRule::Malformed));
        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(check_email(&long), Err(EmailRule::TooLong));
    }

    #[test]
    fn password_rules_apply_in_order() {
        assert_eq!(check_password("Ab1!"), Err(PasswordRule::TooShort));
        assert_eq!(check_password("Abc 1234!"), Err(PasswordRule::ContainsWhitespace));
        assert_eq!(check_password("abcd1234!"), Err(PasswordRule::MissingUppercase));
        assert_eq!(check_password("ABCD1234!"), Err(PasswordRule::MissingLowercase));
        assert_eq!(check_password("Abcdefgh!"), Err(PasswordRule::MissingDigit));
        assert_eq!(check_password("Abcd1234"), Err(PasswordRule::MissingSpecial));
        assert_eq!(check_password("Abcd1234!"), Ok(()));
        assert_eq!(
            check_password(&format!("Aa1!{}", "x".repeat(130))),
            Err(PasswordRule::TooLong)
        );
    }

    #[test]
    fn phone_numbers_allow_separators() {
        assert_eq!(check_phone("0912 345 678"), Ok(()));
        assert_eq!(check_phone("+84912345678"), Ok(()));
        assert_eq!(check_phone("0112345678"), Err(PhoneRule::Malformed));
        assert_eq!(check_phone("09123"), Err(PhoneRule::Malformed));
    }
}
