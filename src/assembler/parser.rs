//! The Parser module walks the source with a Cursor and builds a Program.
//!
//! Every production is a method on Cursor returning the parsed value and
//! the advanced cursor, or None if it does not match here. Alternatives are
//! tried in order and the first match wins. A failed alternative costs
//! nothing to undo, the caller still holds its own cursor.
use std::collections::HashMap;
use super::ast::*;
use super::cursor::Cursor;
use super::error::ParseError;

impl<'a> Cursor<'a> {
    /// An expression: a primary, optionally followed by an operator and
    /// another whole expression.
    ///
    /// There is no precedence. The right operand is always a full
    /// expression, so chains nest to the right. An operator with no
    /// operand after it is a suffix operator.
    pub fn expression(&self) -> Option<(Expression, Cursor<'a>)> {
        let (primary, cursor) = self.skip_whitespace(false).primary()?;

        match cursor.operator() {
            Some((op, after_op)) => match after_op.expression() {
                Some((right, cursor)) => Some((Expression::binary(primary, op, right), cursor)),
                None => Some((Expression::suffix(primary, op), after_op)),
            },
            None => Some((primary, cursor)),
        }
    }

    fn primary(&self) -> Option<(Expression, Cursor<'a>)> {
        if let Some((name, cursor)) = self.identifier() {
            return Some((Expression::Constant(name), cursor));
        }

        if let Some((string, cursor)) = self.string_literal() {
            return Some((Expression::String(string), cursor));
        }

        if let Some((value, cursor)) = self.number() {
            return Some((Expression::Value(value), cursor));
        }

        // Once the parenthesis or prefix operator is read the alternative is
        // committed to: if the rest fails, the whole expression fails.
        if let Some(('(', cursor)) = self.skip_whitespace(false).next_char() {
            let (inner, cursor) = cursor.expression()?;
            return match cursor.skip_whitespace(false).next_char() {
                Some((')', cursor)) => Some((Expression::parens(inner), cursor)),
                _ => None,
            };
        }

        if let Some((op, cursor)) = self.operator() {
            let (operand, cursor) = cursor.expression()?;
            return Some((Expression::prefix(op, operand), cursor));
        }

        None
    }

    /// Reads one operator, preferring the longest symbol that matches.
    pub fn operator(&self) -> Option<(Operator, Cursor<'a>)> {
        let cursor = self.skip_whitespace(false);

        Operator::ALL.iter()
            .filter_map(|op| cursor.match_str(op.symbol()).map(|next| (*op, next)))
            .max_by_key(|(op, _)| op.symbol().len())
    }

    /// `[` followed by at most one option, then `]`.
    pub fn option_list(&self) -> Option<(HashMap<String, Expression>, Cursor<'a>)> {
        let mut options = HashMap::new();

        let mut cursor = match self.skip_whitespace(false).next_char() {
            Some(('[', next)) => next,
            _ => return None,
        };

        // TODO: accept a comma-separated list of options once the code
        // generator defines more than one.
        if let Some(((key, value), next)) = cursor.option() {
            options.insert(key, value);
            cursor = next;
        }

        match cursor.next_char() {
            Some((']', next)) => Some((options, next)),
            _ => None,
        }
    }

    /// `key(expression)`, with nothing between the key and its parentheses.
    pub fn option(&self) -> Option<((String, Expression), Cursor<'a>)> {
        let (key, cursor) = self.identifier()?;

        let cursor = match cursor.next_char() {
            Some(('(', next)) => next,
            _ => return None,
        };

        let (value, cursor) = cursor.expression()?;

        match cursor.next_char() {
            Some((')', next)) => Some(((key, value), next)),
            _ => None,
        }
    }

    /// A mnemonic, its comma-separated operands, and a separator.
    pub fn instruction(&self) -> Option<(Instruction, Cursor<'a>)> {
        let (mnemonic, mut cursor) = self.skip_whitespace(true).identifier()?;
        let mut operands = Vec::new();

        while let Some((operand, next)) = cursor.expression() {
            operands.push(operand);
            cursor = next;

            match cursor.skip_whitespace(false).next_char() {
                Some((',', next)) => cursor = next,
                _ => break,
            }
        }

        let cursor = cursor.separator()?;
        Some((Instruction { mnemonic, operands }, cursor))
    }

    /// One or more instructions.
    pub fn instruction_list(&self) -> Option<(Vec<Instruction>, Cursor<'a>)> {
        let mut cursor = self.skip_whitespace(false);
        let mut instructions = Vec::new();

        while let Some((instruction, next)) = cursor.instruction() {
            instructions.push(instruction);
            cursor = next;
        }

        if instructions.is_empty() {
            return None;
        }
        Some((instructions, cursor))
    }

    /// An optional option list, a name, a colon, and the instructions under it.
    pub fn label(&self) -> Option<(Label, Cursor<'a>)> {
        let mut cursor = self.skip_whitespace(true);

        let options = match cursor.option_list() {
            Some((options, next)) => {
                cursor = next;
                options
            }
            None => HashMap::new(),
        };

        let (identifier, cursor) = cursor.skip_whitespace(true).identifier()?;

        let cursor = match cursor.next_char() {
            Some((':', next)) => next,
            _ => return None,
        };

        let (instructions, cursor) = cursor.instruction_list()?;

        Some((Label { identifier, instructions, options }, cursor))
    }

    /// A top-level `NAME = expression` constant.
    pub fn define(&self) -> Option<((String, Expression), Cursor<'a>)> {
        let (name, cursor) = self.skip_whitespace(false).identifier()?;

        let cursor = match cursor.skip_whitespace(false).next_char() {
            Some(('=', next)) => next,
            _ => return None,
        };

        let (value, cursor) = cursor.expression()?;
        let cursor = cursor.separator()?;

        Some(((name, value), cursor))
    }

    /// Labels and defines, in any order, for as long as either matches.
    ///
    /// Returns Ok(None) if no label was found. Redefining a constant is
    /// the one hard error and aborts the parse.
    pub fn program(&self) -> Result<Option<(Program, Cursor<'a>)>, ParseError> {
        let mut cursor = self.skip_whitespace(false);
        let mut blocks = Vec::new();
        let mut constants = HashMap::new();

        loop {
            if let Some((label, next)) = cursor.label() {
                trace!("parsed label `{}` with {} instruction(s)", label.identifier, label.instructions.len());
                blocks.push(label);
                cursor = next;
            } else if let Some(((name, value), next)) = cursor.define() {
                if constants.contains_key(&name) {
                    return Err(ParseError::ConstantAlreadyDefined(name));
                }
                trace!("parsed constant `{}` = {}", name, value);
                constants.insert(name, value);
                cursor = next;
            } else {
                break;
            }
        }

        if blocks.is_empty() {
            return Ok(None);
        }
        Ok(Some((Program { constants, blocks }, cursor)))
    }
}

/// Parses a whole source text into a Program.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    match Cursor::new(source).program()? {
        Some((program, _)) => Ok(program),
        None => Err(ParseError::NoProgram),
    }
}

pub struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser { cursor: Cursor::new(source) }
    }

    pub fn from_cursor(cursor: Cursor<'a>) -> Self {
        Parser { cursor }
    }

    /// Run the parser, consuming itself and returning the program.
    ///
    /// The grammar stops quietly at the first statement it can not
    /// match, so any input left over afterwards is logged as a warning.
    pub fn run(self) -> Result<Program, ParseError> {
        let (program, rest) = match self.cursor.program()? {
            Some(parsed) => parsed,
            None => return Err(ParseError::NoProgram),
        };

        let leftover = rest.skip_whitespace(true);
        if !leftover.at_end() {
            warn!("stopped parsing at byte {}: unparsed input remains", leftover.offset());
            debug!("unparsed input: {:?}", leftover.remaining());
        }

        debug!("parsed {} constant(s), {} label(s), {} instruction(s)",
            program.constants.len(),
            program.blocks.len(),
            program.instruction_count()
        );

        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::cursor::SourceBuffer;

    fn constant(name: &str) -> Expression {
        Expression::Constant(name.to_owned())
    }

    fn expression(source: &str) -> Option<(Expression, &str)> {
        Cursor::new(source).expression().map(|(exp, cursor)| (exp, cursor.remaining()))
    }

    fn instruction(mnemonic: &str, operands: Vec<Expression>) -> Instruction {
        Instruction { mnemonic: mnemonic.to_owned(), operands }
    }

    #[test]
    fn test_primary() {
        assert_eq!(expression("abc"), Some((constant("abc"), "")));
        assert_eq!(expression("\"str\""), Some((Expression::String("str".to_owned()), "")));
        assert_eq!(expression("0x10"), Some((Expression::Value(16), "")));
        assert_eq!(expression(" ( 7 ) "), Some((Expression::parens(Expression::Value(7)), " ")));
        assert_eq!(expression("-a"), Some((Expression::prefix(Operator::Sub, constant("a")), "")));
        assert_eq!(
            expression("--1"),
            Some((Expression::prefix(Operator::Sub, Expression::prefix(Operator::Sub, Expression::Value(1))), ""))
        );
        assert_eq!(expression(""), None);
        assert_eq!(expression(","), None);
        assert_eq!(expression("0"), None);
    }

    #[test]
    fn test_committed_alternatives() {
        // An open parenthesis commits to a parenthesized expression.
        assert_eq!(expression("(1"), None);
        assert_eq!(expression("()"), None);
        // A prefix operator requires an operand.
        assert_eq!(expression("-"), None);
        assert_eq!(expression("- ,"), None);
    }

    #[test]
    fn test_operator() {
        for op in Operator::ALL.iter() {
            let source = format!(" {}x", op.symbol());
            let (parsed, cursor) = Cursor::new(&source).operator().unwrap();
            assert_eq!(parsed, *op);
            assert_eq!(cursor.remaining(), "x");
        }

        assert_eq!(Cursor::new("<").operator(), None);
        assert_eq!(Cursor::new("=").operator(), None);
        assert_eq!(Cursor::new("a").operator(), None);
    }

    #[test]
    fn test_right_association() {
        let plus = Expression::binary(
            Expression::Value(1),
            Operator::Add,
            Expression::binary(Expression::Value(2), Operator::Add, Expression::Value(3)),
        );
        assert_eq!(expression("1+2+3"), Some((plus, "")));

        // No precedence: the multiplication still nests on the right.
        let mixed = Expression::binary(
            Expression::Value(1),
            Operator::Add,
            Expression::binary(Expression::Value(2), Operator::Mul, Expression::Value(3)),
        );
        assert_eq!(expression("1+2*3"), Some((mixed, "")));

        let mixed = Expression::binary(
            Expression::Value(1),
            Operator::Mul,
            Expression::binary(Expression::Value(2), Operator::Add, Expression::Value(3)),
        );
        assert_eq!(expression("1 * 2 + 3"), Some((mixed, "")));
    }

    #[test]
    fn test_binary_operands() {
        let exp = Expression::binary(
            constant("base"),
            Operator::Shl,
            Expression::parens(Expression::binary(Expression::Value(8), Operator::Or, constant("x"))),
        );
        assert_eq!(expression("base << (8 | x)"), Some((exp, "")));

        let exp = Expression::binary(constant("a"), Operator::Add, Expression::prefix(Operator::Sub, constant("b")));
        assert_eq!(expression("a + -b"), Some((exp, "")));
    }

    #[test]
    fn test_suffix() {
        assert_eq!(expression("5+)"), Some((Expression::suffix(Expression::Value(5), Operator::Add), ")")));
        assert_eq!(expression("5+"), Some((Expression::suffix(Expression::Value(5), Operator::Add), "")));

        // The failed right operand consumes nothing.
        assert_eq!(expression("a & ,b"), Some((Expression::suffix(constant("a"), Operator::And), " ,b")));

        let exp = Expression::parens(Expression::suffix(Expression::Value(5), Operator::Add));
        assert_eq!(expression("(5+)"), Some((exp, "")));
    }

    #[test]
    fn test_option() {
        let (option, cursor) = Cursor::new("align(4)]").option().unwrap();
        assert_eq!(option, ("align".to_owned(), Expression::Value(4)));
        assert_eq!(cursor.remaining(), "]");

        assert_eq!(Cursor::new("align (4)").option(), None);
        assert_eq!(Cursor::new("align(4 )").option(), None);
        assert_eq!(Cursor::new("align()").option(), None);
        assert_eq!(Cursor::new("(4)").option(), None);
    }

    #[test]
    fn test_option_list() {
        let (options, cursor) = Cursor::new("[]x").option_list().unwrap();
        assert!(options.is_empty());
        assert_eq!(cursor.remaining(), "x");

        let (options, _) = Cursor::new(" [org(0x100)]").option_list().unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options.get("org"), Some(&Expression::Value(256)));

        // Only one option fits in a group.
        assert_eq!(Cursor::new("[a(1)b(2)]").option_list(), None);
        assert_eq!(Cursor::new("[a(1), b(2)]").option_list(), None);
        assert_eq!(Cursor::new("[a(1)").option_list(), None);
        assert_eq!(Cursor::new("a(1)]").option_list(), None);
    }

    #[test]
    fn test_instruction() {
        let (ins, cursor) = Cursor::new("mov a,b\nnop").instruction().unwrap();
        assert_eq!(ins, instruction("mov", vec![constant("a"), constant("b")]));
        assert_eq!(cursor.remaining(), "nop");

        let (ins, cursor) = Cursor::new("\n\n  nop; halt").instruction().unwrap();
        assert_eq!(ins, instruction("nop", vec![]));
        assert_eq!(cursor.remaining(), " halt");

        // A separator is not needed at the end of the input.
        let (ins, cursor) = Cursor::new("mov a,b").instruction().unwrap();
        assert_eq!(ins, instruction("mov", vec![constant("a"), constant("b")]));
        assert!(cursor.at_end());

        // A trailing comma ends the operands.
        let (ins, _) = Cursor::new("mov a,\n").instruction().unwrap();
        assert_eq!(ins, instruction("mov", vec![constant("a")]));

        let (ins, _) = Cursor::new("db \"hi\", 0x0A , 0d0\n").instruction().unwrap();
        assert_eq!(ins, instruction("db", vec![
            Expression::String("hi".to_owned()),
            Expression::Value(10),
            Expression::Value(0),
        ]));

        assert_eq!(Cursor::new("1 a\n").instruction(), None);
        assert_eq!(Cursor::new("mov a b\n").instruction(), None);
    }

    #[test]
    fn test_instruction_comment() {
        let with_comment = Cursor::new("mov a,b # note\n").instruction().map(|(ins, _)| ins);
        let without = Cursor::new("mov a,b\n").instruction().map(|(ins, _)| ins);
        assert!(with_comment.is_some());
        assert_eq!(with_comment, without);
    }

    #[test]
    fn test_instruction_list() {
        let (list, cursor) = Cursor::new("  nop\n\n mov a,b;jmp a\nnext:").instruction_list().unwrap();
        assert_eq!(list, vec![
            instruction("nop", vec![]),
            instruction("mov", vec![constant("a"), constant("b")]),
            instruction("jmp", vec![constant("a")]),
        ]);
        assert_eq!(cursor.remaining(), "next:");

        assert_eq!(Cursor::new("").instruction_list(), None);
        assert_eq!(Cursor::new("next:").instruction_list(), None);
    }

    #[test]
    fn test_one_line_needs_a_separator() {
        // Without a separator these are not two instructions.
        assert_eq!(Cursor::new("mov a,b mov c,d\n").instruction(), None);
        assert_eq!(Cursor::new("start: mov a,b mov c,d\n").label(), None);

        let (list, _) = Cursor::new("mov a,b; mov c,d\n").instruction_list().unwrap();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_label() {
        let (label, cursor) = Cursor::new("\n\nstart:\n  nop\n  halt\nX = 1\n").label().unwrap();
        assert_eq!(label.identifier, "start");
        assert_eq!(label.instructions, vec![instruction("nop", vec![]), instruction("halt", vec![])]);
        assert!(label.options.is_empty());
        assert_eq!(cursor.remaining(), "X = 1\n");

        let (label, _) = Cursor::new("[align(4)]\nmain: ret").label().unwrap();
        assert_eq!(label.identifier, "main");
        assert_eq!(label.options.get("align"), Some(&Expression::Value(4)));
        assert_eq!(label.instructions, vec![instruction("ret", vec![])]);

        let (label, _) = Cursor::new("[] main: ret").label().unwrap();
        assert!(label.options.is_empty());

        // Labels need at least one instruction, and the colon right after the name.
        assert_eq!(Cursor::new("empty:\n").label(), None);
        assert_eq!(Cursor::new("start :\nnop\n").label(), None);
        assert_eq!(Cursor::new("X = 1\n").label(), None);
    }

    #[test]
    fn test_define() {
        let (define, cursor) = Cursor::new("X = 0x10\nY = 2").define().unwrap();
        assert_eq!(define, ("X".to_owned(), Expression::Value(16)));
        assert_eq!(cursor.remaining(), "Y = 2");

        let (define, cursor) = Cursor::new("SIZE=W*H").define().unwrap();
        assert_eq!(define, ("SIZE".to_owned(), Expression::binary(constant("W"), Operator::Mul, constant("H"))));
        assert!(cursor.at_end());

        assert_eq!(Cursor::new("X = \n").define(), None);
        assert_eq!(Cursor::new("X = 1 2\n").define(), None);
        assert_eq!(Cursor::new("X 1\n").define(), None);
    }

    #[test]
    fn test_program() {
        let source = "\
WIDTH = 0x20  # columns
HEIGHT = 0d16

[align(4)]
start:
    ld a, WIDTH * HEIGHT
    ld b, \"hello\"; nop
    jmp start

loop: jmp loop
";
        let program = parse(source).unwrap();
        assert_eq!(program.constants.len(), 2);
        assert_eq!(program.constants.get("WIDTH"), Some(&Expression::Value(32)));
        assert_eq!(program.constants.get("HEIGHT"), Some(&Expression::Value(16)));

        let names: Vec<&str> = program.blocks.iter().map(|l| l.identifier.as_str()).collect();
        assert_eq!(names, vec!["start", "loop"]);
        assert_eq!(program.blocks[0].options.get("align"), Some(&Expression::Value(4)));
        assert_eq!(program.blocks[0].instructions, vec![
            instruction("ld", vec![constant("a"), Expression::binary(constant("WIDTH"), Operator::Mul, constant("HEIGHT"))]),
            instruction("ld", vec![constant("b"), Expression::String("hello".to_owned())]),
            instruction("nop", vec![]),
            instruction("jmp", vec![constant("start")]),
        ]);
        assert_eq!(program.blocks[1].instructions, vec![instruction("jmp", vec![constant("loop")])]);
        assert_eq!(program.instruction_count(), 5);
    }

    #[test]
    fn test_program_defines_between_labels() {
        let program = parse("a: nop\nX = 1\nb: nop\nY = 2\n").unwrap();
        assert_eq!(program.blocks.len(), 2);
        assert_eq!(program.constants.len(), 2);
    }

    #[test]
    fn test_duplicate_constant() {
        assert_eq!(
            parse("X = 1\nY = 2\nX = 3\nstart: nop\n"),
            Err(ParseError::ConstantAlreadyDefined("X".to_owned()))
        );
        assert_eq!(
            Parser::new("start: nop\nX = 1\nX = 1\n").run(),
            Err(ParseError::ConstantAlreadyDefined("X".to_owned()))
        );
    }

    #[test]
    fn test_program_needs_a_label() {
        assert_eq!(Cursor::new("X = 1\n").program(), Ok(None));
        assert_eq!(parse("X = 1\n"), Err(ParseError::NoProgram));
        assert_eq!(parse(""), Err(ParseError::NoProgram));
        assert_eq!(parse("nop\n"), Err(ParseError::NoProgram));
    }

    #[test]
    fn test_program_stops_at_unmatched_input() {
        let (program, cursor) = Cursor::new("start: nop\n!!!\n").program().unwrap().unwrap();
        assert_eq!(program.blocks.len(), 1);
        assert_eq!(cursor.remaining(), "!!!\n");

        let program = Parser::new("start: nop\n!!!\n").run().unwrap();
        assert_eq!(program.blocks.len(), 1);
    }

    #[test]
    fn test_unterminated_comment() {
        // A trailing comment with no newline hides the rest of the input.
        let (program, cursor) = Cursor::new("start: nop\nhalt # end").program().unwrap().unwrap();
        assert_eq!(program.blocks[0].instructions, vec![instruction("nop", vec![])]);
        assert_eq!(cursor.remaining(), "halt # end");

        let program = parse("start: nop\nhalt # end\n").unwrap();
        assert_eq!(program.blocks[0].instructions.len(), 2);
    }

    #[test]
    fn test_parser_from_lines() {
        let buffer = SourceBuffer::from_lines(&["N = 3", "main:", "  add a, N"]);
        let program = Parser::from_cursor(buffer.cursor()).run().unwrap();
        assert_eq!(program.constants.get("N"), Some(&Expression::Value(3)));
        assert_eq!(program.blocks[0].instructions, vec![instruction("add", vec![constant("a"), constant("N")])]);
    }
}
