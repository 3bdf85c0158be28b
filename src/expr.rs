/*!

  Boolean expression parsing and circuit synthesis.

  The grammar, tightest binding first: prefix `!` (not), `.` (and), `^`
  (xor), `+` (or). Parentheses group; identifiers are made of letters,
  digits and underscores and start with a letter or underscore.

*/

use crate::circuit::{GateId, GateKind, PinAddr, Position};
use crate::netlist::Circuit;
use log::debug;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// One lexical unit of an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A variable name
    Ident(String),
    /// `!`
    Not,
    /// `.`
    And,
    /// `^`
    Xor,
    /// `+`
    Or,
    /// `(`
    LParen,
    /// `)`
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "{name}"),
            Token::Not => write!(f, "!"),
            Token::And => write!(f, "."),
            Token::Xor => write!(f, "^"),
            Token::Or => write!(f, "+"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

/// A token together with its byte offset in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    /// Byte offset of the token's first character
    pub pos: usize,
    /// The token itself
    pub token: Token,
}

/// A character the tokenizer cannot place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unexpected character {ch:?} at offset {pos}")]
pub struct LexError {
    /// Byte offset of the offending character
    pub pos: usize,
    /// The character itself
    pub ch: char,
}

/// A malformed expression. The graph the caller holds is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The tokenizer rejected a character.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// An operator where an operand was expected, or vice versa.
    #[error("unexpected `{token}` at offset {pos}")]
    UnexpectedToken {
        /// Byte offset of the token
        pos: usize,
        /// The offending token
        token: Token,
    },
    /// A `(` without its `)`, or a `)` without its `(`.
    #[error("unbalanced parenthesis at offset {pos}")]
    UnbalancedParen {
        /// Byte offset of the lone parenthesis
        pos: usize,
    },
    /// The expression ended where an operand was expected.
    #[error("expression ended early")]
    UnexpectedEnd,
    /// An operator is short of operands.
    #[error("operator is missing an operand")]
    MissingOperand,
    /// Two operands with no operator between them.
    #[error("two operands with no operator between them")]
    MissingOperator,
}

/// A parsed boolean expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A free variable
    Var(String),
    /// Negation
    Not(Box<Expr>),
    /// Conjunction
    And(Box<Expr>, Box<Expr>),
    /// Exclusive or
    Xor(Box<Expr>, Box<Expr>),
    /// Disjunction
    Or(Box<Expr>, Box<Expr>),
}

/// Splits `text` into tokens, rejecting any character outside the grammar.
pub fn tokenize(text: &str) -> Result<Vec<Spanned>, LexError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((pos, ch)) = chars.next() {
        let token = match ch {
            c if c.is_whitespace() => continue,
            '!' => Token::Not,
            '.' => Token::And,
            '^' => Token::Xor,
            '+' => Token::Or,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::from(c);
                while let Some(&(_, next)) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                Token::Ident(name)
            }
            _ => return Err(LexError { pos, ch }),
        };
        tokens.push(Spanned { pos, token });
    }
    Ok(tokens)
}

fn precedence(token: &Token) -> u8 {
    match token {
        Token::Not => 4,
        Token::And => 3,
        Token::Xor => 2,
        Token::Or => 1,
        _ => 0,
    }
}

/// Shunting-yard: reorders the token stream into postfix, checking syntax
/// along the way. `!` is right-associative, so a run of prefix nots stacks
/// without popping; a binary operator first pops everything bound at least
/// as tightly.
fn to_postfix(tokens: Vec<Spanned>) -> Result<Vec<Spanned>, ParseError> {
    let mut output = Vec::new();
    let mut stack: Vec<Spanned> = Vec::new();
    let mut expect_operand = true;

    for spanned in tokens {
        match &spanned.token {
            Token::Ident(_) => {
                if !expect_operand {
                    return Err(ParseError::UnexpectedToken {
                        pos: spanned.pos,
                        token: spanned.token,
                    });
                }
                expect_operand = false;
                output.push(spanned);
            }
            Token::Not => {
                if !expect_operand {
                    return Err(ParseError::UnexpectedToken {
                        pos: spanned.pos,
                        token: spanned.token,
                    });
                }
                stack.push(spanned);
            }
            Token::And | Token::Xor | Token::Or => {
                if expect_operand {
                    return Err(ParseError::UnexpectedToken {
                        pos: spanned.pos,
                        token: spanned.token,
                    });
                }
                expect_operand = true;
                let prec = precedence(&spanned.token);
                while let Some(top) = stack.last() {
                    if matches!(top.token, Token::LParen) || precedence(&top.token) < prec {
                        break;
                    }
                    output.push(stack.pop().expect("stack top just checked"));
                }
                stack.push(spanned);
            }
            Token::LParen => {
                if !expect_operand {
                    return Err(ParseError::UnexpectedToken {
                        pos: spanned.pos,
                        token: spanned.token,
                    });
                }
                stack.push(spanned);
            }
            Token::RParen => {
                if expect_operand {
                    return Err(ParseError::UnexpectedToken {
                        pos: spanned.pos,
                        token: spanned.token,
                    });
                }
                loop {
                    let Some(top) = stack.pop() else {
                        return Err(ParseError::UnbalancedParen { pos: spanned.pos });
                    };
                    if matches!(top.token, Token::LParen) {
                        break;
                    }
                    output.push(top);
                }
            }
        }
    }

    if expect_operand {
        return Err(ParseError::UnexpectedEnd);
    }
    while let Some(top) = stack.pop() {
        if matches!(top.token, Token::LParen) {
            return Err(ParseError::UnbalancedParen { pos: top.pos });
        }
        output.push(top);
    }
    Ok(output)
}

/// Stack machine: folds a postfix stream into one expression tree. The
/// right operand of a binary operator is popped first.
fn from_postfix(postfix: Vec<Spanned>) -> Result<Expr, ParseError> {
    let mut stack: Vec<Expr> = Vec::new();
    for spanned in postfix {
        match spanned.token {
            Token::Ident(name) => stack.push(Expr::Var(name)),
            Token::Not => {
                let a = stack.pop().ok_or(ParseError::MissingOperand)?;
                stack.push(Expr::Not(Box::new(a)));
            }
            token @ (Token::And | Token::Xor | Token::Or) => {
                let b = stack.pop().ok_or(ParseError::MissingOperand)?;
                let a = stack.pop().ok_or(ParseError::MissingOperand)?;
                stack.push(match token {
                    Token::And => Expr::And(Box::new(a), Box::new(b)),
                    Token::Xor => Expr::Xor(Box::new(a), Box::new(b)),
                    _ => Expr::Or(Box::new(a), Box::new(b)),
                });
            }
            token @ (Token::LParen | Token::RParen) => {
                return Err(ParseError::UnexpectedToken {
                    pos: spanned.pos,
                    token,
                });
            }
        }
    }
    let expr = stack.pop().ok_or(ParseError::UnexpectedEnd)?;
    if stack.is_empty() {
        Ok(expr)
    } else {
        Err(ParseError::MissingOperator)
    }
}

/// Parses `text` into an expression tree.
pub fn parse(text: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(text)?;
    let postfix = to_postfix(tokens)?;
    from_postfix(postfix)
}

/// Horizontal span of one synthesized column, sized to the 90-wide gate
/// footprint the renderer draws.
const COL_STEP: f32 = 150.0;
/// Vertical span of one synthesized row (60-tall footprint).
const ROW_STEP: f32 = 100.0;

/// Compiles an expression into a fresh circuit ending in one sink.
///
/// Each distinct identifier becomes one source gate named after it, shared
/// across all its occurrences. The tree is synthesized depth-first and
/// left-to-right; the right operand lands one row below the left, a parent
/// sits at the vertical midpoint of its children, and columns advance
/// rightward toward the sink at x = 0. The circuit is simulated once
/// before it is returned.
pub fn compile(text: &str) -> Result<Circuit, ParseError> {
    let ast = parse(text)?;
    let mut circuit = Circuit::new();
    let mut sources: HashMap<String, GateId> = HashMap::new();
    let (root, y) = synthesize(&mut circuit, &mut sources, &ast, 1, 0);
    let sink = circuit.add_gate(GateKind::Sink, Position::new(0.0, y));
    circuit
        .add_wire(root, PinAddr::input(sink, 0))
        .expect("synthesized pins are valid");
    debug!(
        "compiled {text:?} into {} gates and {} wires",
        circuit.gate_count(),
        circuit.wire_count()
    );
    circuit.simulate();
    Ok(circuit)
}

/// Emits the gates for `expr`, returning the output pin feeding the parent
/// and the vertical coordinate the parent should center on.
fn synthesize(
    circuit: &mut Circuit,
    sources: &mut HashMap<String, GateId>,
    expr: &Expr,
    depth: usize,
    row: usize,
) -> (PinAddr, f32) {
    let x = -(depth as f32) * COL_STEP;
    let y = row as f32 * ROW_STEP;
    match expr {
        Expr::Var(name) => {
            if let Some(&gid) = sources.get(name) {
                let y = circuit
                    .gate(gid)
                    .expect("sources stay in the circuit during synthesis")
                    .position()
                    .y;
                (PinAddr::output(gid, 0), y)
            } else {
                let gid = circuit.add_source(name.clone(), Position::new(x, y));
                sources.insert(name.clone(), gid);
                (PinAddr::output(gid, 0), y)
            }
        }
        Expr::Not(a) => {
            let (pin, y) = synthesize(circuit, sources, a, depth + 1, row);
            let gid = circuit.add_gate(GateKind::Not, Position::new(x, y));
            circuit
                .add_wire(pin, PinAddr::input(gid, 0))
                .expect("synthesized pins are valid");
            (PinAddr::output(gid, 0), y)
        }
        Expr::And(a, b) | Expr::Xor(a, b) | Expr::Or(a, b) => {
            let (left, left_y) = synthesize(circuit, sources, a, depth + 1, row);
            let (right, right_y) = synthesize(circuit, sources, b, depth + 1, row + 1);
            let y = (left_y + right_y) / 2.0;
            let kind = match expr {
                Expr::And(..) => GateKind::And,
                Expr::Xor(..) => GateKind::Xor,
                _ => GateKind::Or,
            };
            let gid = circuit.add_gate(kind, Position::new(x, y));
            circuit
                .add_wire(left, PinAddr::input(gid, 0))
                .expect("synthesized pins are valid");
            circuit
                .add_wire(right, PinAddr::input(gid, 1))
                .expect("synthesized pins are valid");
            (PinAddr::output(gid, 0), y)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    fn postfix_of(text: &str) -> String {
        let tokens = tokenize(text).unwrap();
        to_postfix(tokens)
            .unwrap()
            .into_iter()
            .map(|s| s.token.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_precedence_order() {
        assert_eq!(postfix_of("A + B ^ C . D"), "A B C D . ^ +");
        assert_eq!(postfix_of("A . B + C"), "A B . C +");
    }

    #[test]
    fn test_not_binds_tightest() {
        assert_eq!(postfix_of("!A . B"), "A ! B .");
        assert_eq!(postfix_of("!!A"), "A ! !");
        assert_eq!(postfix_of("!(A + B)"), "A B + !");
    }

    #[test]
    fn test_parens_override() {
        assert_eq!(postfix_of("A . (B + C)"), "A B C + .");
    }

    #[test]
    fn test_lex_rejects_stray_characters() {
        let err = tokenize("A & B").unwrap_err();
        assert_eq!(err, LexError { pos: 2, ch: '&' });
    }

    #[test]
    fn test_operator_where_operand_expected() {
        assert!(matches!(
            parse("A + + B"),
            Err(ParseError::UnexpectedToken { pos: 4, .. })
        ));
        assert!(matches!(parse("A B"), Err(ParseError::UnexpectedToken { .. })));
    }

    #[test]
    fn test_unbalanced_parens() {
        assert!(matches!(
            parse("(A + B"),
            Err(ParseError::UnbalancedParen { pos: 0 })
        ));
        assert!(matches!(
            parse("A + B)"),
            Err(ParseError::UnbalancedParen { pos: 5 })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), Err(ParseError::UnexpectedEnd));
        assert_eq!(parse("A +"), Err(ParseError::UnexpectedEnd));
    }

    #[test]
    fn test_ast_shape() {
        let expr = parse("A . B + C").unwrap();
        let Expr::Or(lhs, rhs) = expr else {
            panic!("top operator should be +");
        };
        assert_eq!(*rhs, Expr::Var("C".to_string()));
        assert!(matches!(*lhs, Expr::And(..)));
    }
}
