//! Stateless field and form validation for the login surface.
//!
//! Rules run in order and the first failing check wins. The fixed rule
//! tables mirror what the login form enforces; `Debouncer` supports
//! validate-as-you-type callers.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use parking_lot::Mutex;
use regex::Regex;
use tokio::task::JoinHandle;

use crate::auth::UserRole;

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("valid pattern"));
static USERNAME_EXACT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,20}$").expect("valid pattern"));
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid pattern"));
// CJK ideographs, latin letters and spaces.
static DISPLAY_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\u{4e00}-\u{9fa5}a-zA-Z\s]+$").expect("valid pattern"));

/// Single validation rule; unset checks are skipped.
#[derive(Clone)]
pub struct ValidationRule {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub custom: Option<fn(&str) -> bool>,
    pub message: String,
}

impl Default for ValidationRule {
    fn default() -> Self {
        Self {
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
            custom: None,
            message: String::new(),
        }
    }
}

/// Result of validating a single field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: Option<String>,
}

impl ValidationResult {
    fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    fn invalid(message: &str) -> Self {
        Self {
            is_valid: false,
            message: Some(message.to_string()),
        }
    }
}

/// Evaluates rules in order; within a rule the checks run as
/// required, min_length, max_length, pattern, custom.
pub fn validate_field(value: &str, rules: &[ValidationRule]) -> ValidationResult {
    for rule in rules {
        let empty = value.trim().is_empty();

        if rule.required && empty {
            return ValidationResult::invalid(&rule.message);
        }

        // Optional fields skip the remaining checks while empty.
        if empty {
            continue;
        }

        let length = value.chars().count();
        if let Some(min) = rule.min_length {
            if length < min {
                return ValidationResult::invalid(&rule.message);
            }
        }
        if let Some(max) = rule.max_length {
            if length > max {
                return ValidationResult::invalid(&rule.message);
            }
        }
        if let Some(pattern) = &rule.pattern {
            if !pattern.is_match(value) {
                return ValidationResult::invalid(&rule.message);
            }
        }
        if let Some(custom) = rule.custom {
            if !custom(value) {
                return ValidationResult::invalid(&rule.message);
            }
        }
    }

    ValidationResult::valid()
}

/// Username: required, 3-20 chars, letters/digits/underscores.
pub fn username_rules() -> Vec<ValidationRule> {
    vec![
        ValidationRule {
            required: true,
            message: "Please enter a username".to_string(),
            ..Default::default()
        },
        ValidationRule {
            min_length: Some(3),
            message: "Username must be at least 3 characters".to_string(),
            ..Default::default()
        },
        ValidationRule {
            max_length: Some(20),
            message: "Username cannot exceed 20 characters".to_string(),
            ..Default::default()
        },
        ValidationRule {
            pattern: Some(USERNAME_PATTERN.clone()),
            message: "Username may only contain letters, digits and underscores".to_string(),
            ..Default::default()
        },
    ]
}

/// Email: required plus a simple shape check.
pub fn email_rules() -> Vec<ValidationRule> {
    vec![
        ValidationRule {
            required: true,
            message: "Please enter an email address".to_string(),
            ..Default::default()
        },
        ValidationRule {
            pattern: Some(EMAIL_PATTERN.clone()),
            message: "Please enter a valid email address".to_string(),
            ..Default::default()
        },
    ]
}

/// Password: required, 6-50 chars.
pub fn password_rules() -> Vec<ValidationRule> {
    vec![
        ValidationRule {
            required: true,
            message: "Please enter a password".to_string(),
            ..Default::default()
        },
        ValidationRule {
            min_length: Some(6),
            message: "Password must be at least 6 characters".to_string(),
            ..Default::default()
        },
        ValidationRule {
            max_length: Some(50),
            message: "Password cannot exceed 50 characters".to_string(),
            ..Default::default()
        },
    ]
}

fn has_mixed_case_and_digit(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
}

/// Strong password: required, 8-50 chars, lower + upper + digit.
pub fn strong_password_rules() -> Vec<ValidationRule> {
    vec![
        ValidationRule {
            required: true,
            message: "Please enter a password".to_string(),
            ..Default::default()
        },
        ValidationRule {
            min_length: Some(8),
            message: "Password must be at least 8 characters".to_string(),
            ..Default::default()
        },
        ValidationRule {
            max_length: Some(50),
            message: "Password cannot exceed 50 characters".to_string(),
            ..Default::default()
        },
        ValidationRule {
            custom: Some(has_mixed_case_and_digit),
            message: "Password must contain upper and lower case letters and a digit".to_string(),
            ..Default::default()
        },
    ]
}

/// Display name: required, 2-10 chars, CJK/latin/spaces.
pub fn display_name_rules() -> Vec<ValidationRule> {
    vec![
        ValidationRule {
            required: true,
            message: "Please enter a name".to_string(),
            ..Default::default()
        },
        ValidationRule {
            min_length: Some(2),
            message: "Name must be at least 2 characters".to_string(),
            ..Default::default()
        },
        ValidationRule {
            max_length: Some(10),
            message: "Name cannot exceed 10 characters".to_string(),
            ..Default::default()
        },
        ValidationRule {
            pattern: Some(DISPLAY_NAME_PATTERN.clone()),
            message: "Name may only contain letters and spaces".to_string(),
            ..Default::default()
        },
    ]
}

/// Login form snapshot validated before submission.
#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    pub role: Option<UserRole>,
    pub username: String,
    pub password: String,
}

/// Aggregated form validation outcome, keyed by field name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormValidation {
    pub is_valid: bool,
    pub errors: BTreeMap<String, String>,
}

/// Validates every login field independently; nothing short-circuits at
/// the form level.
pub fn validate_login_form(form: &LoginForm) -> FormValidation {
    let mut errors = BTreeMap::new();

    if form.role.is_none() {
        errors.insert("role".to_string(), "Please select a role".to_string());
    }

    let username = validate_field(&form.username, &username_rules());
    if let Some(message) = username.message {
        errors.insert("username".to_string(), message);
    }

    let password = validate_field(&form.password, &password_rules());
    if let Some(message) = password.message {
        errors.insert("password".to_string(), message);
    }

    FormValidation {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Standalone email shape check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Standalone username shape check.
pub fn is_valid_username(username: &str) -> bool {
    USERNAME_EXACT_PATTERN.is_match(username)
}

/// Password strength buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrengthLevel {
    Weak,
    Fair,
    Good,
    Strong,
}

/// Scored password strength report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordStrength {
    /// Count of satisfied criteria, 0-5.
    pub score: u8,
    pub level: StrengthLevel,
    pub message: String,
}

// One label per score, 0 through 5.
const STRENGTH_LEVELS: [(StrengthLevel, &str); 6] = [
    (StrengthLevel::Weak, "Password strength: weak"),
    (StrengthLevel::Weak, "Password strength: weak"),
    (StrengthLevel::Fair, "Password strength: fair"),
    (StrengthLevel::Good, "Password strength: good"),
    (StrengthLevel::Strong, "Password strength: strong"),
    (StrengthLevel::Strong, "Password strength: strong"),
];

/// Scores a password against five independent criteria: length of at
/// least 8, a lowercase letter, an uppercase letter, a digit and a
/// symbol.
pub fn password_strength(password: &str) -> PasswordStrength {
    let mut score = 0usize;

    if password.chars().count() >= 8 {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 1;
    }

    let (level, message) = STRENGTH_LEVELS[score];
    PasswordStrength {
        score: score as u8,
        level,
        message: message.to_string(),
    }
}

/// Coalesces rapid calls: only the last call in any `wait` window runs,
/// with the latest value.
pub struct Debouncer<T> {
    wait: Duration,
    callback: Arc<dyn Fn(T) + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(wait: Duration, callback: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            wait,
            callback: Arc::new(callback),
            pending: Mutex::new(None),
        }
    }

    /// Schedules `value` for delivery, superseding any pending call.
    pub fn call(&self, value: T) {
        let mut pending = self.pending.lock();
        if let Some(task) = pending.take() {
            task.abort();
        }

        let callback = Arc::clone(&self.callback);
        let wait = self.wait;
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            callback(value);
        }));
    }

    /// Drops any pending call without running it.
    pub fn cancel(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }
}
