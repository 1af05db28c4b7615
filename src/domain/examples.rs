//! Built-in example expressions

/// Expression submitted when none is given.
pub const DEFAULT_EXPRESSION: &str = "3+4*5";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExampleExpression {
    pub expression: &'static str,
    pub description: &'static str,
    /// Whether the backend is expected to accept it
    pub valid: bool,
}

const fn valid(expression: &'static str, description: &'static str) -> ExampleExpression {
    ExampleExpression {
        expression,
        description,
        valid: true,
    }
}

const fn invalid(expression: &'static str, description: &'static str) -> ExampleExpression {
    ExampleExpression {
        expression,
        description,
        valid: false,
    }
}

pub const EXAMPLES: &[ExampleExpression] = &[
    valid("3+4", "Simple addition"),
    valid("3.5+4.2", "Decimal numbers"),
    valid("3+4*5", "Mixed operations with precedence"),
    valid("3*4+5", "Different order of operations"),
    valid("3^2", "Exponentiation"),
    valid("10-3-2", "Sequential subtraction"),
    valid("10/2*3", "Division and multiplication"),
    valid("10+20+30+40", "Multiple additions"),
    valid("5^2+3*4-6/2", "Complex expression with all operators"),
    valid("0.5*10+2.5", "Mixed decimals"),
    valid("(3+4)*5", "Parentheses changing precedence"),
    valid("3*(4+5)", "Grouping operations"),
    valid("(3+4)*(5-2)", "Multiple parentheses groups"),
    valid("(3+4*5)/(2-1)", "Nested operations"),
    valid("((3+4)*2)", "Nested parentheses"),
    invalid("3++4", "Consecutive operators"),
    invalid("3+4)", "Unbalanced parentheses"),
    invalid("(3+4", "Unbalanced parentheses"),
    invalid("3+", "Incomplete expression"),
    invalid("+3", "Leading operator"),
    invalid("3.4.5+6", "Invalid number format"),
    invalid("3a+4", "Invalid character"),
    invalid("()", "Empty parentheses"),
    invalid("(+)", "Invalid content in parentheses"),
    invalid("6/0", "Division by zero"),
];

/// Look up an example by its 1-based position in [`EXAMPLES`].
pub fn example(number: usize) -> Option<&'static ExampleExpression> {
    number.checked_sub(1).and_then(|i| EXAMPLES.get(i))
}
