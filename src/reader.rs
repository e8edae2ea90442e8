// ABOUTME: Reader — turns a token stream into S-expressions (Value trees)

use crate::error::{Position, ReadError};
use crate::token::{tokenize, PositionedToken, Token};
use crate::value::Value;

struct TokenStream {
    tokens: Vec<PositionedToken>,
    idx: usize,
}

impl TokenStream {
    fn peek(&self) -> Option<&PositionedToken> {
        self.tokens.get(self.idx)
    }

    fn next(&mut self) -> Option<PositionedToken> {
        let t = self.tokens.get(self.idx).cloned();
        self.idx += 1;
        t
    }

    fn eof_position(&self) -> Position {
        self.tokens
            .last()
            .map(|t| t.position)
            .unwrap_or(Position::start())
    }
}

/// Reads every top-level datum out of `input`, left to right.
pub fn read_all(input: &str) -> Result<Vec<Value>, ReadError> {
    let tokens = tokenize(input)?;
    let mut stream = TokenStream { tokens, idx: 0 };
    let mut forms = Vec::new();
    while stream.peek().is_some() {
        forms.push(read_datum(&mut stream)?);
    }
    Ok(forms)
}

/// Reads a single datum, returning `None` if `input` holds no more forms.
pub fn read_one(input: &str) -> Result<Option<Value>, ReadError> {
    let tokens = tokenize(input)?;
    let mut stream = TokenStream { tokens, idx: 0 };
    if stream.peek().is_none() {
        return Ok(None);
    }
    Ok(Some(read_datum(&mut stream)?))
}

fn read_datum(stream: &mut TokenStream) -> Result<Value, ReadError> {
    let Some(PositionedToken { token, position }) = stream.next() else {
        return Err(ReadError::new("unexpected end of input", stream.eof_position()));
    };

    match token {
        Token::Integer(n) => Ok(Value::Integer(n)),
        Token::Real(n) => Ok(Value::Real(n)),
        Token::Str(s) => Ok(Value::string(s)),
        Token::Bool(b) => Ok(Value::Bool(b)),
        Token::Symbol(s) => Ok(Value::symbol(&s)),
        Token::Quote => {
            let datum = read_datum(stream)?;
            Ok(Value::list(vec![Value::symbol("quote"), datum]))
        }
        Token::LParen => read_list(stream, position),
        Token::RParen => Err(ReadError::new("unexpected ')'", position)),
        Token::Dot => Err(ReadError::new("unexpected '.'", position)),
    }
}

fn read_list(stream: &mut TokenStream, open_paren: Position) -> Result<Value, ReadError> {
    let mut items = Vec::new();
    loop {
        match stream.peek() {
            None => return Err(ReadError::new("unterminated list", open_paren)),
            Some(PositionedToken {
                token: Token::RParen,
                ..
            }) => {
                stream.next();
                return Ok(Value::list(items));
            }
            Some(PositionedToken {
                token: Token::Dot, ..
            }) => {
                stream.next();
                let tail = read_datum(stream)?;
                match stream.next() {
                    Some(PositionedToken {
                        token: Token::RParen,
                        ..
                    }) => {
                        return Ok(items
                            .into_iter()
                            .rev()
                            .fold(tail, |acc, item| Value::cons(item, acc)));
                    }
                    Some(other) => {
                        return Err(ReadError::new("expected ')' after dotted tail", other.position))
                    }
                    None => return Err(ReadError::new("unterminated list", open_paren)),
                }
            }
            Some(_) => items.push(read_datum(stream)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str) -> Value {
        read_one(input).unwrap().unwrap()
    }

    #[test]
    fn reads_atoms() {
        assert_eq!(read("42").to_string(), "42");
        assert_eq!(read("3.5").to_string(), "3.5");
        assert_eq!(read("#t").to_string(), "#t");
        assert_eq!(read(r#""hi""#).to_string(), "\"hi\"");
        assert_eq!(read("foo").to_string(), "foo");
    }

    #[test]
    fn reads_proper_list() {
        assert_eq!(read("(+ 1 2)").to_string(), "(+ 1 2)");
    }

    #[test]
    fn reads_dotted_pair() {
        assert_eq!(read("(1 . 2)").to_string(), "(1 . 2)");
    }

    #[test]
    fn reads_dotted_list_with_fixed_head() {
        assert_eq!(read("(a b . c)").to_string(), "(a b . c)");
    }

    #[test]
    fn reads_nested_lists() {
        assert_eq!(read("(a (b c) d)").to_string(), "(a (b c) d)");
    }

    #[test]
    fn quote_tick_rewrites_to_quote_form() {
        assert_eq!(read("'x").to_string(), "(quote x)");
        assert_eq!(read("'(1 2)").to_string(), "(quote (1 2))");
    }

    #[test]
    fn reads_multiple_top_level_forms() {
        let forms = read_all("(+ 1 2) (* 3 4)").unwrap();
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[0].to_string(), "(+ 1 2)");
        assert_eq!(forms[1].to_string(), "(* 3 4)");
    }

    #[test]
    fn empty_list_reads_as_nil() {
        assert_eq!(read("()").to_string(), "()");
    }

    #[test]
    fn unterminated_list_is_read_error() {
        let err = read_one("(+ 1 2").unwrap_err();
        assert!(err.message.contains("unterminated list"));
    }

    #[test]
    fn stray_close_paren_is_read_error() {
        let err = read_one(")").unwrap_err();
        assert!(err.message.contains("unexpected ')'"));
    }

    #[test]
    fn read_one_on_blank_input_returns_none() {
        assert!(read_one("   ").unwrap().is_none());
    }
}
