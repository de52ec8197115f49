// Filter lexer - tokenizes the serialized postfix filter

use super::error::{ParseError, ParseResult};
use super::token::{Lexeme, Token};

pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// Get the next token from the input, or `None` at end of input
    pub fn next_token(&mut self) -> ParseResult<Option<Lexeme>> {
        let Some(marker) = self.current_byte() else {
            return Ok(None);
        };
        let offset = self.position;

        let token = match marker {
            b'a' => {
                self.advance();
                let index = self.read_number("column index")?;
                let index = usize::try_from(index)
                    .map_err(|_| ParseError::NumberOutOfRange { offset })?;
                Token::Attribute(index)
            }
            b'c' => {
                self.advance();
                self.read_constant()?
            }
            b'o' => {
                self.advance();
                Token::Operator(self.read_opcode()?)
            }
            b'l' => {
                self.advance();
                Token::Connective(self.read_opcode()?)
            }
            _ => {
                return Err(ParseError::UnexpectedCharacter {
                    ch: self.current_char(),
                    offset,
                })
            }
        };

        Ok(Some(Lexeme { token, offset }))
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> ParseResult<Vec<Lexeme>> {
        let mut lexemes = Vec::new();
        while let Some(lexeme) = self.next_token()? {
            lexemes.push(lexeme);
        }
        Ok(lexemes)
    }

    // c<oid>s<len>d<bytes>
    fn read_constant(&mut self) -> ParseResult<Token> {
        let type_oid = self.read_number("constant type")?;
        let type_oid =
            u32::try_from(type_oid).map_err(|_| ParseError::NumberOutOfRange {
                offset: self.position,
            })?;

        self.expect(b's', "'s' before constant length")?;
        let length = self.read_number("constant length")?;
        let length = usize::try_from(length).map_err(|_| ParseError::NumberOutOfRange {
            offset: self.position,
        })?;

        self.expect(b'd', "'d' before constant data")?;
        let start = self.position;
        let available = self.input.len() - start;
        if length > available {
            return Err(ParseError::TruncatedLiteral {
                declared: length,
                available,
                offset: start,
            });
        }
        let literal = self
            .input
            .get(start..start + length)
            .ok_or(ParseError::Expected {
                expected: "literal ending on a character boundary",
                offset: start + length,
            })?
            .to_string();
        self.position += length;

        Ok(Token::Constant { type_oid, literal })
    }

    fn read_opcode(&mut self) -> ParseResult<u32> {
        let offset = self.position;
        let opcode = self.read_number("opcode")?;
        u32::try_from(opcode).map_err(|_| ParseError::NumberOutOfRange { offset })
    }

    fn read_number(&mut self, expected: &'static str) -> ParseResult<u64> {
        let start = self.position;
        while matches!(self.current_byte(), Some(b'0'..=b'9')) {
            self.advance();
        }
        if start == self.position {
            return Err(ParseError::Expected {
                expected,
                offset: start,
            });
        }
        self.input[start..self.position]
            .parse::<u64>()
            .map_err(|_| ParseError::NumberOutOfRange { offset: start })
    }

    fn expect(&mut self, marker: u8, expected: &'static str) -> ParseResult<()> {
        if self.current_byte() == Some(marker) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected,
                offset: self.position,
            })
        }
    }

    fn current_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.position).copied()
    }

    fn current_char(&self) -> char {
        self.input[self.position..].chars().next().unwrap_or('\0')
    }

    fn advance(&mut self) {
        self.position += 1;
    }
}
