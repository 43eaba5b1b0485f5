//! Operator definitions
//!
//! [`OperatorKind`] names every node type the loader can resolve;
//! [`Operator`] carries the typed operands of the domain operators.

use crate::expression::Expression;
use std::fmt;

/// Binary comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
    Equal,
    NotEqual,
}

impl ComparisonOp {
    /// All comparison operators
    pub const ALL: [ComparisonOp; 6] = [
        Self::Greater,
        Self::Less,
        Self::GreaterOrEqual,
        Self::LessOrEqual,
        Self::Equal,
        Self::NotEqual,
    ];

    /// Logic-JSON symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Greater => ">",
            Self::Less => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Accepted argument counts for an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` arguments
    Exact(usize),
    /// Between `min` and `max` arguments, inclusive
    Range(usize, usize),
    /// At least `n` arguments
    AtLeast(usize),
    /// `condition, value` pairs followed by a fallback: an odd count of 3 or more
    Conditional,
}

impl Arity {
    /// Check whether `count` arguments are acceptable
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Self::Exact(n) => count == n,
            Self::Range(min, max) => (min..=max).contains(&count),
            Self::AtLeast(n) => count >= n,
            Self::Conditional => count >= 3 && count % 2 == 1,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "exactly {}", n),
            Self::Range(min, max) => write!(f, "{} to {}", min, max),
            Self::AtLeast(n) => write!(f, "at least {}", n),
            Self::Conditional => write!(f, "an odd number (at least 3)"),
        }
    }
}

/// Every node type the loader can resolve by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Var,
    If,
    And,
    Or,
    Not,
    Compare(ComparisonOp),
    Between,
    AgeBetween,
    HasMedication,
    HasConditionIcd,
    ArrayContainsAny,
}

impl OperatorKind {
    /// Every kind, in registration order of the standard table
    pub fn all() -> impl Iterator<Item = OperatorKind> {
        [
            Self::Var,
            Self::If,
            Self::And,
            Self::Or,
            Self::Not,
            Self::Between,
            Self::AgeBetween,
            Self::HasMedication,
            Self::HasConditionIcd,
            Self::ArrayContainsAny,
        ]
        .into_iter()
        .chain(ComparisonOp::ALL.into_iter().map(Self::Compare))
    }

    /// Name used when serializing logic back to JSON
    pub fn canonical_name(&self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::If => "if",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "!",
            Self::Compare(op) => op.symbol(),
            Self::Between => "between",
            Self::AgeBetween => "age_between",
            Self::HasMedication => "has_medication",
            Self::HasConditionIcd => "has_condition_icd",
            Self::ArrayContainsAny => "array_contains_any",
        }
    }

    /// Accepted argument counts
    pub fn arity(&self) -> Arity {
        match self {
            Self::Var => Arity::Range(1, 2),
            Self::If => Arity::Conditional,
            Self::And | Self::Or => Arity::AtLeast(1),
            Self::Not => Arity::Exact(1),
            Self::Compare(_) => Arity::Exact(2),
            Self::Between | Self::AgeBetween => Arity::Exact(3),
            Self::HasMedication | Self::HasConditionIcd | Self::ArrayContainsAny => Arity::Exact(2),
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Domain operators of the protocol language.
///
/// Each variant has named operand slots; operands are arbitrary expressions
/// evaluated before the operator is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// Inclusive numeric range check
    Between {
        value: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
    },
    /// Inclusive range check on an age in years
    AgeBetween {
        age: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
    },
    /// Case-insensitive exact-or-substring medication membership
    HasMedication {
        list: Box<Expression>,
        target: Box<Expression>,
    },
    /// Case-insensitive ICD code prefix membership
    HasConditionIcd {
        list: Box<Expression>,
        prefix: Box<Expression>,
    },
    /// Case-insensitive fuzzy intersection of two lists
    ArrayContainsAny {
        haystack: Box<Expression>,
        needles: Box<Expression>,
    },
}

impl Operator {
    /// The kind this operator was resolved from
    pub fn kind(&self) -> OperatorKind {
        match self {
            Self::Between { .. } => OperatorKind::Between,
            Self::AgeBetween { .. } => OperatorKind::AgeBetween,
            Self::HasMedication { .. } => OperatorKind::HasMedication,
            Self::HasConditionIcd { .. } => OperatorKind::HasConditionIcd,
            Self::ArrayContainsAny { .. } => OperatorKind::ArrayContainsAny,
        }
    }

    /// Operands in argument order
    pub fn operands(&self) -> Vec<&Expression> {
        match self {
            Self::Between { value, low, high } => vec![&**value, &**low, &**high],
            Self::AgeBetween { age, low, high } => vec![&**age, &**low, &**high],
            Self::HasMedication { list, target } => vec![&**list, &**target],
            Self::HasConditionIcd { list, prefix } => vec![&**list, &**prefix],
            Self::ArrayContainsAny { haystack, needles } => vec![&**haystack, &**needles],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Arity::Exact(2), 2, true)]
    #[case(Arity::Exact(2), 3, false)]
    #[case(Arity::Range(1, 2), 0, false)]
    #[case(Arity::Range(1, 2), 2, true)]
    #[case(Arity::AtLeast(1), 7, true)]
    #[case(Arity::Conditional, 3, true)]
    #[case(Arity::Conditional, 4, false)]
    #[case(Arity::Conditional, 5, true)]
    #[case(Arity::Conditional, 1, false)]
    fn test_arity(#[case] arity: Arity, #[case] count: usize, #[case] expected: bool) {
        assert_eq!(arity.accepts(count), expected);
    }

    #[test]
    fn test_all_kinds_have_distinct_names() {
        let names: std::collections::HashSet<_> =
            OperatorKind::all().map(|k| k.canonical_name()).collect();
        assert_eq!(names.len(), OperatorKind::all().count());
    }
}
