//! Failure classification and user-facing explanations
//!
//! Backend rejections arrive as free-form prose. They are matched against an
//! ordered list of fragments, first match wins, and anything unrecognized
//! falls through to [`ErrorCategory::Unclassified`].

use std::fmt;

use crate::domain::Endpoint;

/// Every way an expression submission can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Transport, timeout or non-2xx failures
    Connectivity,
    UnbalancedParens,
    ConsecutiveOperators,
    BoundaryOperator,
    InvalidCharacter,
    InvalidNumber,
    DivisionByZero,
    Unclassified,
}

/// Matched in order against the backend message; case-sensitive.
const PATTERNS: [(&str, ErrorCategory); 6] = [
    ("balanced parentheses", ErrorCategory::UnbalancedParens),
    ("Consecutive operators", ErrorCategory::ConsecutiveOperators),
    ("start or end with an operator", ErrorCategory::BoundaryOperator),
    ("Invalid characters", ErrorCategory::InvalidCharacter),
    ("Invalid number", ErrorCategory::InvalidNumber),
    ("Division by zero", ErrorCategory::DivisionByZero),
];

/// Classify a backend rejection message.
pub fn classify(message: &str) -> ErrorCategory {
    PATTERNS
        .iter()
        .find(|(fragment, _)| message.contains(fragment))
        .map(|(_, category)| *category)
        .unwrap_or(ErrorCategory::Unclassified)
}

/// Category-specific advice attached to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guidance {
    pub hint: &'static str,
    pub example: &'static str,
}

impl ErrorCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCategory::Connectivity => "connectivity",
            ErrorCategory::UnbalancedParens => "unbalanced parentheses",
            ErrorCategory::ConsecutiveOperators => "consecutive operators",
            ErrorCategory::BoundaryOperator => "leading or trailing operator",
            ErrorCategory::InvalidCharacter => "invalid character",
            ErrorCategory::InvalidNumber => "invalid number",
            ErrorCategory::DivisionByZero => "division by zero",
            ErrorCategory::Unclassified => "unclassified",
        }
    }

    /// Semantic rejections come from the backend; connectivity failures do not.
    pub fn is_semantic(&self) -> bool {
        !matches!(self, ErrorCategory::Connectivity)
    }

    pub fn guidance(&self) -> Option<Guidance> {
        let (hint, example) = match self {
            ErrorCategory::UnbalancedParens => (
                "Make sure all opening parentheses '(' have matching closing parentheses ')'.",
                r#"Use "(3+4)*5" instead of "(3+4*5" or "3+4)*5""#,
            ),
            ErrorCategory::ConsecutiveOperators => (
                "You cannot have two operators next to each other.",
                r#"Use "3+4" instead of "3++4" or "3+*4""#,
            ),
            ErrorCategory::BoundaryOperator => (
                "Expressions must begin and end with either a number or a parenthesis.",
                r#"Use "(3+4)" or "3+4" instead of "+3+4" or "3+4+""#,
            ),
            ErrorCategory::InvalidCharacter => (
                "Only numbers, decimal points, operators (+, -, *, /, ^), and parentheses are allowed.",
                r#"Use "3.5+4*2" instead of "3.5+4x2" or "3$5""#,
            ),
            ErrorCategory::InvalidNumber => (
                "Each number must be a valid decimal number.",
                r#"Use "3.5" instead of "3..5" or "3.5.2""#,
            ),
            ErrorCategory::DivisionByZero => (
                "Cannot divide a number by zero.",
                r#"Use "6/2" instead of "6/0""#,
            ),
            ErrorCategory::Connectivity | ErrorCategory::Unclassified => return None,
        };
        Some(Guidance { hint, example })
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classified failure with everything needed to explain it to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub category: ErrorCategory,
    /// Original message, verbatim
    pub message: String,
    pub guidance: Option<Guidance>,
    /// Steps for restoring connectivity (connectivity failures only)
    pub remediation: Vec<String>,
}

impl FailureReport {
    /// Explain a backend rejection. Pure and total.
    pub fn explain(message: &str) -> Self {
        let category = classify(message);
        Self {
            category,
            message: message.to_string(),
            guidance: category.guidance(),
            remediation: Vec::new(),
        }
    }

    /// A transport-level failure talking to `backend`.
    pub fn connectivity(message: impl Into<String>, backend: &Endpoint) -> Self {
        Self {
            category: ErrorCategory::Connectivity,
            message: message.into(),
            guidance: None,
            remediation: vec![format!("Make sure the API server is running at {backend}")],
        }
    }

    /// Connectivity failure carrying troubleshooting steps for an unreachable server.
    pub fn unreachable(message: impl Into<String>, backend: &Endpoint) -> Self {
        let mut report = Self::connectivity(message, backend);
        report.remediation.extend([
            "Start the API server (python run_api.py) and try again".to_string(),
            format!("Check that the API answers: curl {}", backend.url(&["ping"])),
        ]);
        report
    }

    /// Explanation as display lines: message, hint, example, remediation.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.message.clone()];
        if let Some(guidance) = self.guidance {
            lines.push(guidance.hint.to_string());
            lines.push(format!("Example: {}", guidance.example));
        }
        lines.extend(self.remediation.iter().cloned());
        lines
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Division by zero: 6/0", ErrorCategory::DivisionByZero)]
    #[case("Unbalanced parentheses found", ErrorCategory::UnbalancedParens)]
    #[case("Invalid expression. Consecutive operators are not allowed.", ErrorCategory::ConsecutiveOperators)]
    #[case("Invalid expression. Expression cannot start or end with an operator.", ErrorCategory::BoundaryOperator)]
    #[case("Invalid characters in expression. Only +, -, *, /, ^, decimal numbers and () are allowed.", ErrorCategory::InvalidCharacter)]
    #[case("Invalid number in expression: 3..5. Please use valid decimal numbers.", ErrorCategory::InvalidNumber)]
    #[case("wat", ErrorCategory::Unclassified)]
    #[case("", ErrorCategory::Unclassified)]
    #[case("division by zero", ErrorCategory::Unclassified)]
    fn given_message_when_classifying_then_returns_category(
        #[case] message: &str,
        #[case] expected: ErrorCategory,
    ) {
        assert_eq!(classify(message), expected);
    }

    #[test]
    fn given_message_matching_two_fragments_when_classifying_then_first_listed_wins() {
        let message = "Consecutive operators and Division by zero";
        assert_eq!(classify(message), ErrorCategory::ConsecutiveOperators);
        assert_eq!(classify(message), classify(message));
    }

    #[test]
    fn given_semantic_failure_when_explaining_then_includes_example() {
        let report = FailureReport::explain("Consecutive operators found");

        assert_eq!(report.category, ErrorCategory::ConsecutiveOperators);
        assert_eq!(report.message, "Consecutive operators found");
        let lines = report.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains(r#""3++4""#));
        assert!(report.remediation.is_empty());
    }

    #[test]
    fn given_unclassified_failure_when_explaining_then_only_raw_message() {
        let report = FailureReport::explain("something odd");

        assert_eq!(report.guidance, None);
        assert_eq!(report.lines(), vec!["something odd".to_string()]);
    }

    #[test]
    fn given_connectivity_failure_then_remediation_names_backend() {
        let backend = Endpoint::parse("http://10.0.0.5:9000").unwrap();

        let report = FailureReport::connectivity("HTTP error! Status: 502", &backend);

        assert_eq!(report.category, ErrorCategory::Connectivity);
        assert!(!report.category.is_semantic());
        assert_eq!(
            report.remediation,
            vec!["Make sure the API server is running at http://10.0.0.5:9000".to_string()]
        );
    }
}
