#![forbid(unsafe_code)]

//! Contact form rules.
//!
//! Field validation is composed from small [`Validator`]s that report a
//! [`ValidationError`] with a stable code, so the page can map codes to
//! its own copy. Also here: the message character counter, phone
//! formatting, HTML escaping and the one-shot section entry animation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

pub const ERROR_CODE_REQUIRED: &str = "required";
pub const ERROR_CODE_MIN_LENGTH: &str = "too_short";
pub const ERROR_CODE_MAX_LENGTH: &str = "too_long";
pub const ERROR_CODE_EMAIL: &str = "email";
pub const ERROR_CODE_PHONE: &str = "phone";

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// A failed rule: stable `code`, message template and its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: &'static str,
    /// Template with `{key}` placeholders.
    pub message: String,
    pub params: BTreeMap<String, String>,
}

impl ValidationError {
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// The message with `{key}` placeholders filled in.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut out = self.message.clone();
        for (key, value) in &self.params {
            out = out.replace(&format!("{{{key}}}"), value);
        }
        out
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_message())
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationResult {
    #[default]
    Valid,
    Invalid(ValidationError),
}

impl ValidationResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Valid => None,
            Self::Invalid(e) => Some(e),
        }
    }

    /// First failure wins.
    #[must_use]
    pub fn and(self, other: impl FnOnce() -> Self) -> Self {
        match self {
            Self::Valid => other(),
            Self::Invalid(_) => self,
        }
    }
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

/// A single rule over values of type `T`.
pub trait Validator<T: ?Sized>: Send + Sync {
    fn validate(&self, value: &T) -> ValidationResult;
}

/// Non-blank after trimming.
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Validator<str> for Required {
    fn validate(&self, value: &str) -> ValidationResult {
        if value.trim().is_empty() {
            ValidationResult::Invalid(ValidationError::new(
                ERROR_CODE_REQUIRED,
                "This field is required",
            ))
        } else {
            ValidationResult::Valid
        }
    }
}

/// At least `min` characters after trimming.
#[derive(Debug, Clone, Copy)]
pub struct MinLength(pub usize);

impl Validator<str> for MinLength {
    fn validate(&self, value: &str) -> ValidationResult {
        let len = value.trim().chars().count();
        if len < self.0 {
            ValidationResult::Invalid(
                ValidationError::new(ERROR_CODE_MIN_LENGTH, "Must be at least {min} characters")
                    .with_param("min", self.0)
                    .with_param("actual", len),
            )
        } else {
            ValidationResult::Valid
        }
    }
}

/// At most `max` characters.
#[derive(Debug, Clone, Copy)]
pub struct MaxLength(pub usize);

impl Validator<str> for MaxLength {
    fn validate(&self, value: &str) -> ValidationResult {
        let len = value.chars().count();
        if len > self.0 {
            ValidationResult::Invalid(
                ValidationError::new(ERROR_CODE_MAX_LENGTH, "Must be at most {max} characters")
                    .with_param("max", self.0)
                    .with_param("actual", len),
            )
        } else {
            ValidationResult::Valid
        }
    }
}

/// `local@domain.tld`: no whitespace, exactly one `@`, a dot inside the
/// domain with text on both sides.
#[derive(Debug, Clone, Copy, Default)]
pub struct Email;

impl Email {
    fn matches(value: &str) -> bool {
        let Some((local, domain)) = value.split_once('@') else {
            return false;
        };
        let clean = |s: &str| !s.is_empty() && !s.contains('@') && !s.chars().any(char::is_whitespace);
        if !clean(local) || !clean(domain) {
            return false;
        }
        let last = domain.len() - 1;
        domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i < last)
    }
}

impl Validator<str> for Email {
    fn validate(&self, value: &str) -> ValidationResult {
        if Self::matches(value.trim()) {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(ValidationError::new(
                ERROR_CODE_EMAIL,
                "Please enter a valid email address",
            ))
        }
    }
}

/// Optional phone number: blank passes; otherwise an optional leading `+`
/// followed by 7–20 digits, spaces, `-`, `(` or `)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Phone;

impl Phone {
    fn matches(value: &str) -> bool {
        let body = value.strip_prefix('+').unwrap_or(value);
        let len = body.chars().count();
        (7..=20).contains(&len)
            && body
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '-' | '(' | ')'))
    }
}

impl Validator<str> for Phone {
    fn validate(&self, value: &str) -> ValidationResult {
        let value = value.trim();
        if value.is_empty() || Self::matches(value) {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid(ValidationError::new(
                ERROR_CODE_PHONE,
                "Please enter a valid phone number",
            ))
        }
    }
}

/// Rules applied in order; the first failure is reported.
#[derive(Default)]
pub struct Rules {
    rules: Vec<Box<dyn Validator<str>>>,
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rules").field("len", &self.rules.len()).finish()
    }
}

impl Rules {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, rule: impl Validator<str> + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }
}

impl Validator<str> for Rules {
    fn validate(&self, value: &str) -> ValidationResult {
        self.rules
            .iter()
            .fold(ValidationResult::Valid, |acc, rule| acc.and(|| rule.validate(value)))
    }
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// Form tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub min_name_length: usize,
    pub min_message_length: usize,
    pub max_message_length: usize,
    /// Counter turns to warning at this many characters.
    pub warning_threshold: usize,
    /// Counter turns to danger at this many characters.
    pub danger_threshold: usize,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            min_name_length: 2,
            min_message_length: 10,
            max_message_length: 1000,
            warning_threshold: 750,
            danger_threshold: 900,
        }
    }
}

impl ContactConfig {
    #[must_use]
    pub fn with_max_message_length(mut self, max: usize) -> Self {
        self.max_message_length = max;
        self
    }
}

/// Form fields in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Subject,
    Phone,
    Message,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Self::Name,
        Self::Email,
        Self::Subject,
        Self::Phone,
        Self::Message,
    ];

    /// DOM id of the input.
    #[must_use]
    pub const fn input_id(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Phone => "phone",
            Self::Message => "message",
        }
    }

    /// DOM id of the field's error element.
    #[must_use]
    pub const fn error_id(self) -> &'static str {
        match self {
            Self::Name => "nameError",
            Self::Email => "emailError",
            Self::Subject => "subjectError",
            Self::Phone => "phoneError",
            Self::Message => "messageError",
        }
    }
}

/// Values as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub phone: String,
    pub message: String,
}

impl ContactSubmission {
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Subject => &self.subject,
            Field::Phone => &self.phone,
            Field::Message => &self.message,
        }
    }
}

/// Severity of the message character counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CharLevel {
    Normal,
    Warning,
    Danger,
}

impl CharLevel {
    /// CSS class on the counter, if any.
    #[must_use]
    pub const fn class(self) -> Option<&'static str> {
        match self {
            Self::Normal => None,
            Self::Warning => Some("warning"),
            Self::Danger => Some("danger"),
        }
    }
}

/// Character counter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCount {
    pub count: usize,
    pub max: usize,
    pub level: CharLevel,
}

impl fmt::Display for CharCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.count, self.max)
    }
}

/// The form's rule set.
#[derive(Debug)]
pub struct ContactForm {
    config: ContactConfig,
    name: Rules,
    email: Rules,
    subject: Rules,
    phone: Rules,
    message: Rules,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::new(ContactConfig::default())
    }
}

impl ContactForm {
    #[must_use]
    pub fn new(config: ContactConfig) -> Self {
        Self {
            name: Rules::new()
                .with(Required)
                .with(MinLength(config.min_name_length)),
            email: Rules::new().with(Required).with(Email),
            subject: Rules::new().with(Required),
            phone: Rules::new().with(Phone),
            message: Rules::new()
                .with(Required)
                .with(MinLength(config.min_message_length))
                .with(MaxLength(config.max_message_length)),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ContactConfig {
        &self.config
    }

    fn rules(&self, field: Field) -> &Rules {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Subject => &self.subject,
            Field::Phone => &self.phone,
            Field::Message => &self.message,
        }
    }

    /// Validate one field (on blur / input).
    #[must_use]
    pub fn validate_field(&self, field: Field, value: &str) -> ValidationResult {
        self.rules(field).validate(value)
    }

    /// Validate every field; failures in display order.
    #[must_use]
    pub fn validate(&self, submission: &ContactSubmission) -> Vec<(Field, ValidationError)> {
        let errors: Vec<_> = Field::ALL
            .into_iter()
            .filter_map(|field| match self.validate_field(field, submission.value(field)) {
                ValidationResult::Valid => None,
                ValidationResult::Invalid(err) => Some((field, err)),
            })
            .collect();
        debug!(errors = errors.len(), "contact form validated");
        errors
    }

    /// Counter for the current message text.
    #[must_use]
    pub fn char_count(&self, message: &str) -> CharCount {
        let count = message.chars().count();
        let level = if count >= self.config.danger_threshold {
            CharLevel::Danger
        } else if count >= self.config.warning_threshold {
            CharLevel::Warning
        } else {
            CharLevel::Normal
        };
        CharCount {
            count,
            max: self.config.max_message_length,
            level,
        }
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Format a ten-digit number as `(xxx) xxx-xxxx`; anything else is returned
/// unchanged.
#[must_use]
pub fn format_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        phone.to_string()
    }
}

/// Escape text for insertion as HTML.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Entry animation
// ---------------------------------------------------------------------------

/// Minimum visible ratio that starts the entry animation.
pub const ENTRY_RATIO: f32 = 0.1;

/// How the contact section should be revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryReveal {
    /// Add `is-visible animate-in`.
    Animate,
    /// Reduced motion: add `is-visible animate-in no-animation`.
    Immediate,
}

/// Fires the contact section's entry animation at most once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionEntry {
    animated: bool,
}

impl SectionEntry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_animated(&self) -> bool {
        self.animated
    }

    /// Start-up: with reduced motion everything shows immediately.
    pub fn init(&mut self, reduced_motion: bool) -> Option<EntryReveal> {
        if reduced_motion {
            self.animated = true;
            Some(EntryReveal::Immediate)
        } else {
            None
        }
    }

    /// An intersection observation; returns the reveal the first time the
    /// section is sufficiently visible.
    pub fn observe(&mut self, intersecting: bool, ratio: f32) -> Option<EntryReveal> {
        if self.animated || !intersecting || ratio < ENTRY_RATIO {
            return None;
        }
        self.animated = true;
        debug!("contact section animations triggered");
        Some(EntryReveal::Animate)
    }

    /// Allow the animation to run again.
    pub fn reset(&mut self) {
        self.animated = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_template_substitutes_params() {
        let err = ValidationError::new(ERROR_CODE_MIN_LENGTH, "At least {min}, got {actual}")
            .with_param("min", 2)
            .with_param("actual", 1);
        assert_eq!(err.to_string(), "At least 2, got 1");
    }

    #[test]
    fn email_shapes() {
        for ok in ["a@b.co", "first.last@sub.example.org", "x+y@d.io"] {
            assert!(Email.validate(ok).is_valid(), "{ok}");
        }
        for bad in ["", "a@b", "a@.b", "a@b.", "@b.co", "a b@c.de", "a@b@c.de", "a@b .co"] {
            assert_eq!(
                Email.validate(bad).error().map(|e| e.code),
                Some(ERROR_CODE_EMAIL),
                "{bad}"
            );
        }
    }

    #[test]
    fn phone_is_optional_but_checked() {
        assert!(Phone.validate("").is_valid());
        assert!(Phone.validate("+63 (2) 555-0100").is_valid());
        assert!(Phone.validate("5550100").is_valid());
        assert!(!Phone.validate("555-01").is_valid());
        assert!(!Phone.validate("555-0100 ext 2").is_valid());
        assert!(!Phone.validate("++5550100").is_valid());
        assert!(!Phone.validate("123456789012345678901").is_valid());
    }

    #[test]
    fn phone_formatting() {
        assert_eq!(format_phone_number("555.123.4567"), "(555) 123-4567");
        assert_eq!(format_phone_number("+1 555 123 4567"), "+1 555 123 4567");
    }

    #[test]
    fn escaping() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn counter_levels() {
        let form = ContactForm::default();
        assert_eq!(form.char_count(&"a".repeat(749)).level, CharLevel::Normal);
        assert_eq!(form.char_count(&"a".repeat(750)).level, CharLevel::Warning);
        assert_eq!(form.char_count(&"a".repeat(900)).level, CharLevel::Danger);
        assert_eq!(form.char_count("hello").to_string(), "5 / 1000");
    }

    #[test]
    fn entry_fires_once() {
        let mut entry = SectionEntry::new();
        assert_eq!(entry.init(false), None);
        assert_eq!(entry.observe(true, 0.05), None);
        assert_eq!(entry.observe(true, 0.1), Some(EntryReveal::Animate));
        assert_eq!(entry.observe(true, 0.9), None);
        entry.reset();
        assert_eq!(entry.observe(true, 0.5), Some(EntryReveal::Animate));
    }
}
