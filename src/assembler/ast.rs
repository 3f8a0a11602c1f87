//! This AST describes a parsed assembly program.
//!
//! A program is a set of top-level constants and a list of
//! labeled blocks. Every block holds at least one instruction,
//! and every instruction is a mnemonic followed by zero or
//! more comma-separated operand expressions.
//!
//! Comments start with a hash (#) and run to the end of the line.
//! Statements are delimited by newlines or semicolons.
//!
//! Example source file:
//!
//! ```nasm
//! WIDTH = 0x20             # constants may be hex,
//! HEIGHT = 0d16            # explicit decimal,
//! AREA = WIDTH * HEIGHT    # or expressions over other constants.
//!
//! [align(4)]
//! start:
//!     ld a, AREA
//!     ld b, "hello"; nop
//!     jmp start
//! ```
//!
//! Expressions have no operator precedence. Chains are nested
//! to the right, so `1 + 2 * 3` and `1 * 2 + 3` have the same
//! shape and only differ in the operators at each node.

use std::collections::HashMap;
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    Or,
    And,
}

impl Operator {
    /// Every operator, in the order they are tried.
    pub const ALL: [Operator; 9] = [
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Rem,
        Operator::Shl,
        Operator::Shr,
        Operator::Or,
        Operator::And,
    ];

    /// Returns the source text of the operator.
    pub fn symbol(&self) -> &'static str {
        use Operator::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Rem => "%",
            Shl => "<<",
            Shr => ">>",
            Or  => "|",
            And => "&",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Expression {
    /// A reference to a named constant (or any other symbol,
    /// such as a register or label, left for the code generator).
    Constant(String),
    String(String),
    Value(i64),
    Parens(Box<Expression>),
    Prefix(Operator, Box<Expression>),
    Suffix(Box<Expression>, Operator),
    Binary(Box<Expression>, Operator, Box<Expression>),
}

impl Expression {
    pub fn parens(inner: Expression) -> Self {
        Expression::Parens(Box::new(inner))
    }

    pub fn prefix(op: Operator, operand: Expression) -> Self {
        Expression::Prefix(op, Box::new(operand))
    }

    pub fn suffix(operand: Expression, op: Operator) -> Self {
        Expression::Suffix(Box::new(operand), op)
    }

    pub fn binary(left: Expression, op: Operator, right: Expression) -> Self {
        Expression::Binary(Box::new(left), op, Box::new(right))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Expression::*;
        match self {
            Constant(name)             => write!(f, "{}", name),
            String(value)              => write!(f, "\"{}\"", value),
            Value(value)               => write!(f, "{}", value),
            Parens(inner)              => write!(f, "({})", inner),
            Prefix(op, operand)        => write!(f, "{}{}", op, operand),
            Suffix(operand, op)        => write!(f, "{}{}", operand, op),
            Binary(left, op, right)    => write!(f, "{} {} {}", left, op, right),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Instruction {
    pub mnemonic: String,
    pub operands: Vec<Expression>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mnemonic)?;
        for (idx, operand) in self.operands.iter().enumerate() {
            let sep = if idx == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, operand)?;
        }
        Ok(())
    }
}

/// A named block of instructions.
///
/// Options come from a bracketed group such as `[align(4)]`
/// written in front of the label. A group holds at most one option.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Label {
    pub identifier: String,
    pub instructions: Vec<Instruction>,
    pub options: HashMap<String, Expression>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Program {
    pub constants: HashMap<String, Expression>,
    pub blocks: Vec<Label>,
}

impl Program {
    /// Total number of instructions across all blocks.
    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(|label| label.instructions.len()).sum()
    }
}
