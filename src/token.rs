// ABOUTME: Tokenizer — turns a character stream into a token stream, each carrying a position

use crate::error::{Position, ReadError};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Quote,
    Dot,
    Integer(i64),
    Real(f64),
    Str(String),
    Bool(bool),
    Symbol(String),
}

#[derive(Debug, Clone)]
pub struct PositionedToken {
    pub token: Token,
    pub position: Position,
}

fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || c == '(' || c == ')' || c == '\'' || c == ';' || c == '"'
}

struct Cursor {
    chars: Vec<char>,
    idx: usize,
    line: usize,
    col: usize,
}

impl Cursor {
    fn new(input: &str) -> Self {
        Cursor {
            chars: input.chars().collect(),
            idx: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            col: self.col,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some(';') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }
}

/// Turns `input` into an ordered sequence of positioned tokens.
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken>, ReadError> {
    let mut cursor = Cursor::new(input);
    let mut tokens = Vec::new();

    loop {
        cursor.skip_whitespace_and_comments();
        let start = cursor.position();
        let Some(c) = cursor.peek() else { break };

        let token = match c {
            '(' => {
                cursor.advance();
                Token::LParen
            }
            ')' => {
                cursor.advance();
                Token::RParen
            }
            '\'' => {
                cursor.advance();
                Token::Quote
            }
            '"' => read_string(&mut cursor)?,
            '#' if cursor.peek_at(1) == Some('t') || cursor.peek_at(1) == Some('f') => {
                read_bool(&mut cursor)
            }
            '.' if cursor.peek_at(1).map(is_delimiter).unwrap_or(true) => {
                cursor.advance();
                Token::Dot
            }
            _ => read_number_or_symbol(&mut cursor, start)?,
        };

        tokens.push(PositionedToken {
            token,
            position: start,
        });
    }

    Ok(tokens)
}

fn read_string(cursor: &mut Cursor) -> Result<Token, ReadError> {
    let start = cursor.position();
    cursor.advance(); // opening quote
    let mut s = String::new();
    loop {
        match cursor.advance() {
            None => return Err(ReadError::new("unterminated string", start)),
            Some('"') => break,
            Some('\\') => match cursor.advance() {
                Some('"') => s.push('"'),
                Some('\\') => s.push('\\'),
                Some('n') => s.push('\n'),
                Some('t') => s.push('\t'),
                Some(other) => s.push(other),
                None => return Err(ReadError::new("unterminated string", start)),
            },
            Some(c) => s.push(c),
        }
    }
    Ok(Token::Str(s))
}

fn read_bool(cursor: &mut Cursor) -> Token {
    cursor.advance(); // '#'
    let c = cursor.advance();
    Token::Bool(c == Some('t'))
}

fn looks_numeric(chars: &[char]) -> bool {
    let mut i = 0;
    if matches!(chars.first(), Some('+') | Some('-')) {
        i += 1;
    }
    let mut saw_digit = false;
    while i < chars.len() && chars[i].is_ascii_digit() {
        saw_digit = true;
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            saw_digit = true;
            i += 1;
        }
    }
    saw_digit && i == chars.len()
}

fn read_number_or_symbol(cursor: &mut Cursor, start: Position) -> Result<Token, ReadError> {
    let mut lexeme = Vec::new();
    loop {
        match cursor.peek() {
            Some(c) if !is_delimiter(c) => {
                lexeme.push(c);
                cursor.advance();
            }
            _ => break,
        }
    }

    if lexeme.is_empty() {
        let c = cursor.advance();
        return Err(ReadError::new(
            format!("unexpected character {:?}", c),
            start,
        ));
    }

    let text: String = lexeme.iter().collect();

    if looks_numeric(&lexeme) {
        if text.contains('.') {
            return parse_real(&text, start);
        }
        return text
            .parse::<i64>()
            .map(Token::Integer)
            .map_err(|_| ReadError::new(format!("malformed number '{text}'"), start));
    }

    // Anything that starts like a number but isn't fully numeric (e.g.
    // "1.2.3" or "1abc") is a malformed number, not a symbol.
    if lexeme[0].is_ascii_digit()
        || (lexeme.len() > 1 && matches!(lexeme[0], '+' | '-') && lexeme[1].is_ascii_digit())
    {
        return Err(ReadError::new(format!("malformed number '{text}'"), start));
    }

    Ok(Token::Symbol(text))
}

fn parse_real(text: &str, start: Position) -> Result<Token, ReadError> {
    let dot_count = text.chars().filter(|&c| c == '.').count();
    if dot_count != 1 {
        return Err(ReadError::new(format!("malformed number '{text}'"), start));
    }
    text.parse::<f64>()
        .map(Token::Real)
        .map_err(|_| ReadError::new(format!("malformed number '{text}'"), start))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn tokenizes_parens_and_atoms() {
        assert_eq!(
            toks("(+ 1 2)"),
            vec![
                Token::LParen,
                Token::Symbol("+".into()),
                Token::Integer(1),
                Token::Integer(2),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn tokenizes_negative_and_real_numbers() {
        assert_eq!(toks("-5 3.75 -2.5"), vec![
            Token::Integer(-5),
            Token::Real(3.75),
            Token::Real(-2.5),
        ]);
    }

    #[test]
    fn tokenizes_strings_with_escapes() {
        assert_eq!(toks(r#""a\"b\\c""#), vec![Token::Str("a\"b\\c".to_string())]);
    }

    #[test]
    fn tokenizes_booleans() {
        assert_eq!(toks("#t #f"), vec![Token::Bool(true), Token::Bool(false)]);
    }

    #[test]
    fn comments_are_discarded() {
        assert_eq!(toks("1 ; comment\n2"), vec![Token::Integer(1), Token::Integer(2)]);
    }

    #[test]
    fn unterminated_string_is_read_error() {
        let err = tokenize("\"abc").unwrap_err();
        assert!(err.message.contains("unterminated string"));
    }

    #[test]
    fn malformed_number_is_read_error() {
        let err = tokenize("1.2.3").unwrap_err();
        assert!(err.message.contains("malformed number"));
    }

    #[test]
    fn quote_and_dot_tokens() {
        assert_eq!(toks("'x (a . b)"), vec![
            Token::Quote,
            Token::Symbol("x".into()),
            Token::LParen,
            Token::Symbol("a".into()),
            Token::Dot,
            Token::Symbol("b".into()),
            Token::RParen,
        ]);
    }

    #[test]
    fn symbol_characters() {
        assert_eq!(toks("list->vector"), vec![Token::Symbol("list->vector".into())]);
    }
}
