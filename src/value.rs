use std::fmt;

/// Dynamically typed content of a memory cell, the accumulator or the input stream.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Value {
    Int(i64),
    Char(char),
}

/// Type tag of a [`Value`], used in diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ValueKind {
    Int,
    Char,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Char(_) => ValueKind::Char,
        }
    }

    /// Only integers can be negative.
    pub fn is_negative(&self) -> bool {
        matches!(self, Value::Int(val) if *val < 0)
    }

    /// Only integers can be zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Value::Int(0))
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Int(0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(val) => write!(f, "{}", val),
            Value::Char(ch) => write!(f, "{}", ch),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Int => f.write_str("integer"),
            ValueKind::Char => f.write_str("character"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(Value::Int(-12).to_string(), "-12");
        assert_eq!(Value::Char('a').to_string(), "a");
        assert_eq!(ValueKind::Char.to_string(), "character");
    }

    #[test]
    fn sign_checks() {
        assert!(Value::Int(-1).is_negative());
        assert!(!Value::Int(0).is_negative());
        assert!(Value::Int(0).is_zero());
        assert!(!Value::Char('0').is_zero());
        assert!(!Value::Char('-').is_negative());
    }
}
