//! Field validation rules.
//!
//! Every rule except `Required` accepts an empty value, so optional fields
//! only complain once the user has typed something.

use std::fmt;
use std::rc::Rc;

use regex::Regex;

#[derive(Clone)]
pub enum RuleKind {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    Email,
    Min(f64),
    Max(f64),
    OneOf(Vec<String>),
    Custom(Rc<dyn Fn(&str) -> bool>),
}

impl fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Required => f.write_str("Required"),
            RuleKind::MinLength(n) => write!(f, "MinLength({n})"),
            RuleKind::MaxLength(n) => write!(f, "MaxLength({n})"),
            RuleKind::Pattern(re) => write!(f, "Pattern({})", re.as_str()),
            RuleKind::Email => f.write_str("Email"),
            RuleKind::Min(n) => write!(f, "Min({n})"),
            RuleKind::Max(n) => write!(f, "Max({n})"),
            RuleKind::OneOf(options) => write!(f, "OneOf({options:?})"),
            RuleKind::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A rule plus an optional message override.
#[derive(Debug, Clone)]
pub struct Rule {
    kind: RuleKind,
    message: Option<String>,
}

impl Rule {
    pub fn new(kind: RuleKind) -> Self {
        Self { kind, message: None }
    }

    pub fn required() -> Self {
        Self::new(RuleKind::Required)
    }

    pub fn min_length(n: usize) -> Self {
        Self::new(RuleKind::MinLength(n))
    }

    pub fn max_length(n: usize) -> Self {
        Self::new(RuleKind::MaxLength(n))
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::new(RuleKind::Pattern(Regex::new(pattern)?)))
    }

    pub fn email() -> Self {
        Self::new(RuleKind::Email)
    }

    pub fn min(n: f64) -> Self {
        Self::new(RuleKind::Min(n))
    }

    pub fn max(n: f64) -> Self {
        Self::new(RuleKind::Max(n))
    }

    pub fn one_of<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(RuleKind::OneOf(options.into_iter().map(Into::into).collect()))
    }

    pub fn custom(check: impl Fn(&str) -> bool + 'static) -> Self {
        Self::new(RuleKind::Custom(Rc::new(check)))
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// `None` if `value` satisfies the rule, otherwise the message to show.
    pub fn check(&self, value: &str) -> Option<String> {
        if self.passes(value) {
            None
        } else {
            Some(self.message.clone().unwrap_or_else(|| self.default_message(value)))
        }
    }

    fn passes(&self, value: &str) -> bool {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return !matches!(self.kind, RuleKind::Required);
        }
        match &self.kind {
            RuleKind::Required => true,
            RuleKind::MinLength(n) => value.chars().count() >= *n,
            RuleKind::MaxLength(n) => value.chars().count() <= *n,
            RuleKind::Pattern(re) => re.is_match(value),
            RuleKind::Email => is_email(trimmed),
            RuleKind::Min(min) => trimmed.parse::<f64>().is_ok_and(|v| v >= *min),
            RuleKind::Max(max) => trimmed.parse::<f64>().is_ok_and(|v| v <= *max),
            RuleKind::OneOf(options) => options.iter().any(|o| o == value),
            RuleKind::Custom(check) => check(value),
        }
    }

    fn default_message(&self, value: &str) -> String {
        let not_a_number = value.trim().parse::<f64>().is_err();
        match &self.kind {
            RuleKind::Required => "This field is required".to_string(),
            RuleKind::MinLength(n) => format!("Must be at least {n} characters"),
            RuleKind::MaxLength(n) => format!("Must be at most {n} characters"),
            RuleKind::Pattern(_) => "Invalid format".to_string(),
            RuleKind::Email => "Invalid email address".to_string(),
            RuleKind::Min(_) | RuleKind::Max(_) if not_a_number => "Must be a number".to_string(),
            RuleKind::Min(min) => format!("Must be at least {min}"),
            RuleKind::Max(max) => format!("Must be at most {max}"),
            RuleKind::OneOf(_) => "Select one of the available options".to_string(),
            RuleKind::Custom(_) => "Invalid value".to_string(),
        }
    }
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Run every rule and collect all messages.
pub fn check_all(rules: &[Rule], value: &str) -> Vec<String> {
    rules.iter().filter_map(|rule| rule.check(value)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank() {
        assert_eq!(Rule::required().check("   ").as_deref(), Some("This field is required"));
        assert!(Rule::required().check("x").is_none());
    }

    #[test]
    fn optional_rules_accept_empty() {
        for rule in [Rule::min_length(3), Rule::email(), Rule::min(1.0), Rule::one_of(["a"])] {
            assert!(rule.check("").is_none(), "{rule:?}");
        }
    }

    #[test]
    fn length_counts_characters() {
        assert!(Rule::max_length(3).check("ñño").is_none());
        assert_eq!(
            Rule::min_length(4).check("abc").as_deref(),
            Some("Must be at least 4 characters")
        );
    }

    #[test]
    fn numeric_bounds() {
        assert!(Rule::min(18.0).check("18").is_none());
        assert_eq!(Rule::min(18.0).check("17").as_deref(), Some("Must be at least 18"));
        assert_eq!(Rule::max(10.0).check("ten").as_deref(), Some("Must be a number"));
    }

    #[test]
    fn email_shape() {
        assert!(Rule::email().check("coach@gym.io").is_none());
        for bad in ["coach", "coach@gym", "@gym.io", "a b@gym.io", "a@@gym.io", "a@gym."] {
            assert!(Rule::email().check(bad).is_some(), "{bad}");
        }
    }

    #[test]
    fn pattern_and_custom_with_message() {
        let phone = Rule::pattern(r"^\+?[0-9]{7,15}$").unwrap().with_message("Invalid phone");
        assert_eq!(phone.check("12ab").as_deref(), Some("Invalid phone"));
        assert!(phone.check("+34600111222").is_none());

        let even = Rule::custom(|v| v.parse::<u32>().is_ok_and(|n| n % 2 == 0));
        assert_eq!(even.check("3").as_deref(), Some("Invalid value"));
    }

    #[test]
    fn check_all_reports_every_failure() {
        let rules = [Rule::min_length(10), Rule::email()];
        assert_eq!(check_all(&rules, "short").len(), 2);
        assert!(check_all(&[], "anything").is_empty());
    }
}
