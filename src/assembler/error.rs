use std::fmt;

/// The failures that stop a whole program from parsing.
///
/// Individual grammar productions never produce these; they
/// only report whether they matched. See `parser::program`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ParseError {
    /// No label could be parsed from the start of the source.
    NoProgram,
    /// A constant was given a second definition.
    ConstantAlreadyDefined(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::NoProgram => write!(f, "no program: expected at least one label"),
            ParseError::ConstantAlreadyDefined(name) => write!(f, "constant `{}` already defined", name),
        }
    }
}

impl std::error::Error for ParseError {}
