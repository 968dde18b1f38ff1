//! # Password Policy
//!
//! Pure evaluation of a password/confirmation pair against three
//! independent rules. Every rule is always evaluated and reported; there is
//! no short-circuiting.
//!
//! | Rule | Passes when |
//! |------|-------------|
//! | `length` | password has at least [`MIN_PASSWORD_LENGTH`] characters |
//! | `has_number_and_letter` | password contains an ASCII digit and an ASCII letter |
//! | `passwords_match` | password equals the confirmation (two empty strings match) |
//!
//! Results depend on the *pair*: callers re-evaluate whenever either side
//! changes instead of caching per field.

use crate::validation::passwords_match;
use serde::{Deserialize, Serialize};

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// POLICY RULE
// =============================================================================

/// The individual rules of the password policy, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyRule {
    Length,
    HasNumberAndLetter,
    PasswordsMatch,
}

impl PolicyRule {
    /// All rules in display order.
    pub const ALL: [PolicyRule; 3] = [
        PolicyRule::Length,
        PolicyRule::HasNumberAndLetter,
        PolicyRule::PasswordsMatch,
    ];

    /// Checklist wording for this rule given its outcome.
    #[must_use]
    pub fn label(&self, passed: bool) -> &'static str {
        match (self, passed) {
            (PolicyRule::Length, _) => "8 characters minimum",
            (PolicyRule::HasNumberAndLetter, _) => "At least one number & one letter",
            (PolicyRule::PasswordsMatch, true) => "Passwords match",
            (PolicyRule::PasswordsMatch, false) => "Passwords do not match",
        }
    }
}

impl std::fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label(true))
    }
}

// =============================================================================
// POLICY RESULT
// =============================================================================

/// Outcome of evaluating the password policy. Immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PasswordPolicyResult {
    pub length: bool,
    pub has_number_and_letter: bool,
    pub passwords_match: bool,
}

impl Default for PasswordPolicyResult {
    fn default() -> Self {
        Self::passing()
    }
}

impl PasswordPolicyResult {
    /// A result with every rule passing.
    ///
    /// Used as the displayed state before the user has typed anything, so
    /// an untouched form shows no checklist.
    #[must_use]
    pub const fn passing() -> Self {
        Self {
            length: true,
            has_number_and_letter: true,
            passwords_match: true,
        }
    }

    /// Outcome of a single rule.
    #[must_use]
    pub fn passed(&self, rule: PolicyRule) -> bool {
        match rule {
            PolicyRule::Length => self.length,
            PolicyRule::HasNumberAndLetter => self.has_number_and_letter,
            PolicyRule::PasswordsMatch => self.passwords_match,
        }
    }

    /// True iff every rule passes.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        PolicyRule::ALL.iter().all(|r| self.passed(*r))
    }

    /// Rules that failed, in display order.
    #[must_use]
    pub fn failing_rules(&self) -> Vec<PolicyRule> {
        PolicyRule::ALL
            .into_iter()
            .filter(|r| !self.passed(*r))
            .collect()
    }

    /// The checklist is only shown while at least one rule fails.
    #[must_use]
    pub fn should_display_checklist(&self) -> bool {
        !self.all_passed()
    }

    /// One line per rule, in display order.
    #[must_use]
    pub fn checklist(&self) -> Vec<ChecklistItem> {
        PolicyRule::ALL
            .into_iter()
            .map(|rule| {
                let passed = self.passed(rule);
                ChecklistItem {
                    rule,
                    passed,
                    label: rule.label(passed).to_string(),
                }
            })
            .collect()
    }
}

/// A rendered checklist line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub rule: PolicyRule,
    pub passed: bool,
    pub label: String,
}

impl std::fmt::Display for ChecklistItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mark = if self.passed { '✔' } else { '✖' };
        write!(f, "{} {}", mark, self.label)
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

/// Evaluate a password and its confirmation against the policy.
///
/// Length is counted in Unicode scalar values, not bytes.
#[must_use]
pub fn evaluate(password: &str, confirm: &str) -> PasswordPolicyResult {
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());

    PasswordPolicyResult {
        length: password.chars().count() >= MIN_PASSWORD_LENGTH,
        has_number_and_letter: has_digit && has_letter,
        passwords_match: passwords_match(password, confirm),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn result(length: bool, mixed: bool, matching: bool) -> PasswordPolicyResult {
        PasswordPolicyResult {
            length,
            has_number_and_letter: mixed,
            passwords_match: matching,
        }
    }

    #[test]
    fn empty_pair() {
        assert_eq!(evaluate("", ""), result(false, false, true));
    }

    #[test]
    fn letters_only() {
        assert_eq!(evaluate("abcdefgh", "abcdefgh"), result(true, false, true));
    }

    #[test]
    fn short_but_mixed() {
        assert_eq!(evaluate("abc123", "abc123"), result(false, true, true));
    }

    #[test]
    fn mismatch_is_reported_alongside_other_rules() {
        assert_eq!(evaluate("password1", "password2"), result(true, true, false));
    }

    #[test]
    fn digits_only_fail_the_mix_rule() {
        assert_eq!(evaluate("12345678", "12345678"), result(true, false, true));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 7 characters, 14 bytes
        let pw = "ééééé1a";
        assert_eq!(pw.chars().count(), 7);
        assert!(!evaluate(pw, pw).length);
        assert!(evaluate("éééééé1a", "").length);
    }

    #[test]
    fn passing_result_hides_checklist() {
        let pass = PasswordPolicyResult::passing();
        assert!(pass.all_passed());
        assert!(!pass.should_display_checklist());
        assert!(pass.failing_rules().is_empty());
    }

    #[test]
    fn failing_rules_in_display_order() {
        let r = evaluate("abc", "abd");
        assert_eq!(
            r.failing_rules(),
            vec![
                PolicyRule::Length,
                PolicyRule::HasNumberAndLetter,
                PolicyRule::PasswordsMatch
            ]
        );
        assert!(r.should_display_checklist());
    }

    #[test]
    fn checklist_lines() {
        let lines: Vec<String> = evaluate("password1", "password2")
            .checklist()
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            lines,
            vec![
                "✔ 8 characters minimum",
                "✔ At least one number & one letter",
                "✖ Passwords do not match",
            ]
        );
    }
}
