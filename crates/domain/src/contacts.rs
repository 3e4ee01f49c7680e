//! Emergency contacts and input validation.
//!
//! Phone numbers follow the Kenyan numbering plan: a national `0` prefix or
//! the `254` country code, followed by a nine digit subscriber number.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

const COUNTRY_CODE: &str = "254";
const SUBSCRIBER_DIGITS: usize = 9;

/// Person notified when the owner raises an SOS alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    pub created_at: u64,
}

impl EmergencyContact {
    /// Check the name and phone number
    pub fn validate(&self) -> Result<()> {
        if !is_valid_name(&self.name) {
            return Err(DomainError::Validation(format!(
                "Contact name must be 2-50 characters, got {:?}",
                self.name
            )));
        }
        if !is_valid_phone(&self.phone) {
            return Err(DomainError::Validation(format!(
                "Invalid phone number: {}",
                self.phone
            )));
        }
        Ok(())
    }

    /// Phone number in `+254XXXXXXXXX` form
    pub fn normalized_phone(&self) -> String {
        normalize_phone(&self.phone)
    }
}

/// Basic shape check: `local@domain.tld` with no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Accepts `+254712345678`, `254712345678` and `0712345678`; whitespace is ignored
pub fn is_valid_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();

    let subscriber = compact
        .strip_prefix('+')
        .and_then(|rest| rest.strip_prefix(COUNTRY_CODE))
        .or_else(|| compact.strip_prefix(COUNTRY_CODE))
        .or_else(|| compact.strip_prefix('0'));

    match subscriber {
        Some(digits) => {
            digits.len() == SUBSCRIBER_DIGITS && digits.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Rewrite a phone number into international `+254` form.
///
/// Non-digit characters are dropped first. The result is not validated.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();

    if digits.starts_with(COUNTRY_CODE) {
        format!("+{}", digits)
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("+{}{}", COUNTRY_CODE, rest)
    } else {
        format!("+{}{}", COUNTRY_CODE, digits)
    }
}

/// Names must be 2 to 50 characters once trimmed
pub fn is_valid_name(name: &str) -> bool {
    let len = name.trim().chars().count();
    (2..=50).contains(&len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("amina@example.co.ke"));
        assert!(is_valid_email("a@b.c"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("amina.example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("amina@example"));
        assert!(!is_valid_email("amina@.com"));
        assert!(!is_valid_email("amina@example."));
        assert!(!is_valid_email("am ina@example.com"));
        assert!(!is_valid_email("a@b@c.com"));
    }

    #[test]
    fn test_valid_phones() {
        assert!(is_valid_phone("+254712345678"));
        assert!(is_valid_phone("254712345678"));
        assert!(is_valid_phone("0712345678"));
        assert!(is_valid_phone("0712 345 678"));
    }

    #[test]
    fn test_invalid_phones() {
        assert!(!is_valid_phone("712345678"));
        assert!(!is_valid_phone("07123456789"));
        assert!(!is_valid_phone("+25471234567a"));
        assert!(!is_valid_phone("+0712345678"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("0712 345 678"), "+254712345678");
        assert_eq!(normalize_phone("254712345678"), "+254712345678");
        assert_eq!(normalize_phone("+254-712-345-678"), "+254712345678");
        assert_eq!(normalize_phone("712345678"), "+254712345678");
    }

    #[test]
    fn test_name_bounds() {
        assert!(is_valid_name("Jo"));
        assert!(!is_valid_name(" J "));
        assert!(!is_valid_name(&"x".repeat(51)));
    }

    #[test]
    fn test_contact_validate() {
        let mut contact = EmergencyContact {
            id: "c-1".to_string(),
            user_id: "user-1".to_string(),
            name: "Mama".to_string(),
            phone: "0712345678".to_string(),
            relationship: Some("mother".to_string()),
            is_primary: true,
            created_at: 1,
        };
        assert!(contact.validate().is_ok());
        assert_eq!(contact.normalized_phone(), "+254712345678");

        contact.phone = "12345".to_string();
        assert!(matches!(
            contact.validate(),
            Err(DomainError::Validation(_))
        ));
    }
}
