//! Submitted form payloads and their structural validation.
//!
//! Every form field defaults to an empty string so that a missing field is
//! reported as "required" instead of failing deserialization.

use crate::models::{Price, ProductFields};
use serde::Deserialize;
use std::collections::BTreeMap;

pub const NAME_MAX_LENGTH: usize = 255;
pub const USERNAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;

const REQUIRED: &str = "This field is required.";

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890",
    "qwerty123", "qwertyuiop", "iloveyou", "sunshine", "princess", "football",
    "baseball", "welcome1", "abc12345", "admin123", "letmein1", "trustno1",
    "passw0rd", "superman", "starwars", "whatever", "dragon12", "monkey12",
];

/// Validation errors keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    /// Messages for one field, empty if the field is valid.
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.field(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

/// Product create/edit form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "csrfmiddlewaretoken")]
    pub csrf_token: String,
}

impl ProductForm {
    /// Pre-fill the form from stored values.
    pub fn from_fields(fields: &ProductFields) -> Self {
        Self {
            name: fields.name.clone(),
            price: fields.price.to_string(),
            description: fields.description.clone(),
            csrf_token: String::new(),
        }
    }

    pub fn validate(&self) -> Result<ProductFields, FormErrors> {
        let mut errors = FormErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", REQUIRED);
        } else if name.chars().count() > NAME_MAX_LENGTH {
            errors.add(
                "name",
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    NAME_MAX_LENGTH,
                    name.chars().count()
                ),
            );
        }

        let price = self.price.trim();
        let amount = if price.is_empty() {
            errors.add("price", REQUIRED);
            None
        } else {
            match price.parse::<i64>() {
                Ok(amount) => Some(amount),
                Err(_) => {
                    errors.add("price", "Enter a whole number.");
                    None
                }
            }
        };

        let description = self.description.trim();
        if description.is_empty() {
            errors.add("description", REQUIRED);
        }

        errors.into_result(|| ProductFields {
            name: name.to_string(),
            price: Price::Amount(amount.unwrap_or_default()),
            description: description.to_string(),
        })
    }
}

/// AJAX product payload. Never validated; fields are stored as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AjaxProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub description: String,
}

impl AjaxProductForm {
    pub fn into_fields(self) -> ProductFields {
        ProductFields {
            price: Price::from_submitted(&self.price),
            name: self.name,
            description: self.description,
        }
    }
}

/// Account registration form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
    #[serde(default, rename = "csrfmiddlewaretoken")]
    pub csrf_token: String,
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
}

impl RegistrationForm {
    /// Structural checks only. Username uniqueness is checked by the store.
    pub fn validate(&self) -> Result<NewAccount, FormErrors> {
        let mut errors = FormErrors::new();
        let username = self.username.trim();

        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if username.chars().count() > USERNAME_MAX_LENGTH {
            errors.add(
                "username",
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    USERNAME_MAX_LENGTH,
                    username.chars().count()
                ),
            );
        } else if !username.chars().all(is_username_char) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        }

        if !self.password1.is_empty() && !self.password2.is_empty() {
            if self.password1 != self.password2 {
                errors.add("password2", "The two password fields didn't match.");
            } else {
                for message in password_problems(&self.password1, username) {
                    errors.add("password2", message);
                }
            }
        }

        errors.into_result(|| NewAccount {
            username: username.to_string(),
            password: self.password1.clone(),
        })
    }
}

/// Login form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default, rename = "csrfmiddlewaretoken")]
    pub csrf_token: String,
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

/// Password strength rules applied at registration.
pub fn password_problems(password: &str, username: &str) -> Vec<String> {
    let mut problems = Vec::new();

    let lowered = password.to_lowercase();
    let user = username.to_lowercase();
    if !user.is_empty() && (lowered.contains(&user) || user.contains(&lowered)) {
        problems.push("The password is too similar to the username.".to_string());
    }
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {} characters.",
            PASSWORD_MIN_LENGTH
        ));
    }
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        problems.push("This password is too common.".to_string());
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }

    problems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_form(name: &str, price: &str, description: &str) -> ProductForm {
        ProductForm {
            name: name.to_string(),
            price: price.to_string(),
            description: description.to_string(),
            csrf_token: String::new(),
        }
    }

    #[test]
    fn valid_product_form() {
        let fields = product_form(" Pen ", "12", "Blue ink").validate().unwrap();
        assert_eq!(fields.name, "Pen");
        assert_eq!(fields.price, Price::Amount(12));
        assert_eq!(fields.description, "Blue ink");
    }

    #[test]
    fn product_text_fields_are_stored_trimmed() {
        let fields = product_form("Pen", "3", "  Blue ink\n").validate().unwrap();
        assert_eq!(fields.description, "Blue ink");
    }

    #[test]
    fn product_form_reports_each_field() {
        let errors = product_form("", "twelve", "").validate().unwrap_err();
        assert_eq!(errors.field("name"), [REQUIRED.to_string()]);
        assert_eq!(errors.field("price"), ["Enter a whole number.".to_string()]);
        assert!(errors.has("description"));
    }

    #[test]
    fn product_name_length_is_limited() {
        let long = "x".repeat(NAME_MAX_LENGTH + 1);
        let errors = product_form(&long, "1", "d").validate().unwrap_err();
        assert!(errors.field("name")[0].contains("at most 255"));
    }

    #[test]
    fn ajax_form_keeps_raw_price() {
        let fields = AjaxProductForm {
            name: String::new(),
            price: "cheap".to_string(),
            description: String::new(),
        }
        .into_fields();
        assert_eq!(fields.price, Price::Raw("cheap".to_string()));
        assert_eq!(fields.name, "");
    }

    fn registration(username: &str, p1: &str, p2: &str) -> RegistrationForm {
        RegistrationForm {
            username: username.to_string(),
            password1: p1.to_string(),
            password2: p2.to_string(),
            csrf_token: String::new(),
        }
    }

    #[test]
    fn valid_registration() {
        let account = registration("alice", "tr0ub4dor&3", "tr0ub4dor&3")
            .validate()
            .unwrap();
        assert_eq!(account.username, "alice");
    }

    #[test]
    fn mismatched_passwords() {
        let errors = registration("alice", "tr0ub4dor&3", "tr0ub4dor&4")
            .validate()
            .unwrap_err();
        assert_eq!(
            errors.field("password2"),
            ["The two password fields didn't match.".to_string()]
        );
    }

    #[test]
    fn weak_passwords_are_rejected() {
        let errors = registration("bob", "1234567", "1234567").validate().unwrap_err();
        let messages = errors.field("password2");
        assert!(messages.iter().any(|m| m.contains("too short")));
        assert!(messages.iter().any(|m| m.contains("entirely numeric")));

        let errors = registration("bob", "password", "password").validate().unwrap_err();
        assert!(errors.field("password2").iter().any(|m| m.contains("too common")));

        let errors = registration("margaret", "Margaret99", "Margaret99")
            .validate()
            .unwrap_err();
        assert!(errors.field("password2").iter().any(|m| m.contains("similar")));
    }

    #[test]
    fn invalid_username_characters() {
        let errors = registration("al ice", "tr0ub4dor&3", "tr0ub4dor&3")
            .validate()
            .unwrap_err();
        assert!(errors.field("username")[0].starts_with("Enter a valid username"));
    }
}
