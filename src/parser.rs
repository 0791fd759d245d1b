// ABOUTME: Recursive-descent parser turning a token stream into an Ast

use crate::ast::Ast;
use crate::error::EngineError;
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Parses a complete formula. Demands end-of-input after the single top
/// level entity; trailing tokens are an error.
pub fn parse(source: &str) -> Result<Ast, EngineError> {
    let mut parser = Parser::new(source);
    let entity = parser.parse_entity()?;
    match parser.lexer.next() {
        None => Ok(entity),
        Some(tok) => Err(EngineError::TrailingInput {
            found: tok.text,
            line: tok.line,
            col: tok.col,
        }),
    }
}

struct Parser {
    lexer: Lexer,
}

impl Parser {
    fn new(source: &str) -> Self {
        Parser {
            lexer: Lexer::new(source),
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        self.lexer.peek()
    }

    fn next(&mut self) -> Option<Token> {
        self.lexer.next()
    }

    fn expect_punctuation(&mut self, expected: &str) -> Result<Token, EngineError> {
        match self.next() {
            Some(tok) if tok.is_punctuation(expected) => Ok(tok),
            Some(tok) => Err(EngineError::MissingDelimiter {
                expected: expected.to_string(),
                found: tok.text,
                line: tok.line,
                col: tok.col,
            }),
            None => Err(EngineError::UnexpectedEof),
        }
    }

    /// `entity = immediate, { "(" tuple-tail }` — left-associative currying.
    fn parse_entity(&mut self) -> Result<Ast, EngineError> {
        let mut node = self.parse_immediate()?;
        while matches!(self.peek(), Some(tok) if tok.is_punctuation("(")) {
            let args = self.parse_tuple()?;
            node = Ast::Application {
                expr: Box::new(node),
                args: Box::new(args),
            };
        }
        Ok(node)
    }

    fn parse_immediate(&mut self) -> Result<Ast, EngineError> {
        let tok = match self.peek() {
            Some(tok) => tok.clone(),
            None => return Err(EngineError::UnexpectedEof),
        };

        match tok.kind {
            TokenKind::Number => {
                self.next();
                Ok(Ast::Number(tok.text))
            }
            TokenKind::String => {
                self.next();
                Ok(Ast::String(tok.text))
            }
            TokenKind::Keyword => {
                self.next();
                let b = tok.text.eq_ignore_ascii_case("true");
                Ok(Ast::Boolean(b))
            }
            TokenKind::Identifier => {
                self.next();
                Ok(Ast::Variable(tok.text))
            }
            TokenKind::Punctuation if tok.text == "[" => self.parse_list(),
            TokenKind::Punctuation if tok.text == "{" => self.parse_record(),
            TokenKind::Punctuation if tok.text == "(" => self.parse_paren_form(),
            _ => Err(EngineError::UnexpectedToken {
                found: tok.text,
                line: tok.line,
                col: tok.col,
            }),
        }
    }

    /// `"[" [ entity { "," entity } [","]? ] "]"`
    fn parse_list(&mut self) -> Result<Ast, EngineError> {
        self.expect_punctuation("[")?;
        let mut elements = Vec::new();
        loop {
            if matches!(self.peek(), Some(tok) if tok.is_punctuation("]")) {
                self.next();
                break;
            }
            elements.push(self.parse_entity()?);
            match self.next() {
                Some(tok) if tok.is_punctuation("]") => break,
                Some(tok) if tok.is_punctuation(",") => continue,
                Some(tok) => {
                    return Err(EngineError::MissingDelimiter {
                        expected: "`,` or `]`".to_string(),
                        found: tok.text,
                        line: tok.line,
                        col: tok.col,
                    })
                }
                None => return Err(EngineError::UnexpectedEof),
            }
        }
        Ok(Ast::List(elements))
    }

    /// `"{" [ prop { "," prop } [","]? ] "}"`, `prop = IDENT "=" entity`
    fn parse_record(&mut self) -> Result<Ast, EngineError> {
        self.expect_punctuation("{")?;
        let mut properties = Vec::new();
        loop {
            if matches!(self.peek(), Some(tok) if tok.is_punctuation("}")) {
                self.next();
                break;
            }

            let name_tok = match self.next() {
                Some(tok) if tok.kind == TokenKind::Identifier => tok,
                Some(tok) => {
                    return Err(EngineError::UnexpectedToken {
                        found: tok.text,
                        line: tok.line,
                        col: tok.col,
                    })
                }
                None => return Err(EngineError::UnexpectedEof),
            };
            self.expect_punctuation("=")?;
            let value = self.parse_entity()?;
            properties.push((name_tok.text, value));

            match self.next() {
                Some(tok) if tok.is_punctuation("}") => break,
                Some(tok) if tok.is_punctuation(",") => continue,
                Some(tok) => {
                    return Err(EngineError::MissingDelimiter {
                        expected: "`,` or `}`".to_string(),
                        found: tok.text,
                        line: tok.line,
                        col: tok.col,
                    })
                }
                None => return Err(EngineError::UnexpectedEof),
            }
        }
        Ok(Ast::Record(properties))
    }

    /// `"(" [ entity { "," entity } ] ")"` — a bare tuple used for call args.
    fn parse_tuple(&mut self) -> Result<Ast, EngineError> {
        self.expect_punctuation("(")?;
        let mut elements = Vec::new();
        loop {
            if matches!(self.peek(), Some(tok) if tok.is_punctuation(")")) {
                self.next();
                break;
            }
            elements.push(self.parse_entity()?);
            match self.next() {
                Some(tok) if tok.is_punctuation(")") => break,
                Some(tok) if tok.is_punctuation(",") => continue,
                Some(tok) => {
                    return Err(EngineError::MissingDelimiter {
                        expected: "`,` or `)`".to_string(),
                        found: tok.text,
                        line: tok.line,
                        col: tok.col,
                    })
                }
                None => return Err(EngineError::UnexpectedEof),
            }
        }
        Ok(Ast::Tuple(elements))
    }

    /// A parenthesised group: lambda params if followed by `=>`, else a tuple.
    fn parse_paren_form(&mut self) -> Result<Ast, EngineError> {
        let params = self.parse_tuple()?;
        if matches!(self.peek(), Some(tok) if tok.is_punctuation("=>")) {
            self.next();
            validate_lambda_params(&params)?;
            let body = self.parse_entity()?;
            return Ok(Ast::Lambda {
                params: Box::new(params),
                body: Box::new(body),
            });
        }
        Ok(params)
    }
}

fn validate_lambda_params(params: &Ast) -> Result<(), EngineError> {
    let elements = match params {
        Ast::Tuple(elements) => elements,
        other => {
            return Err(EngineError::LambdaParamNotVariable {
                found: format!("{other:?}"),
            })
        }
    };
    for element in elements {
        if !matches!(element, Ast::Variable(_)) {
            return Err(EngineError::LambdaParamNotVariable {
                found: format!("{element:?}"),
            });
        }
    }
    Ok(())
}
