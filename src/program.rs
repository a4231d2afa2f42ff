//! Tokenizer: turns raw source text into an immutable [`Program`].
//!
//! Only the eight Brainfuck instructions `><+-.,[]` survive tokenization.
//! Everything else (whitespace, comments, stray punctuation) is dropped
//! silently, so any text is a valid program.

use std::fmt;
use std::sync::Arc;

/// A single Brainfuck instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// `>`
    Right,
    /// `<`
    Left,
    /// `+`
    Inc,
    /// `-`
    Dec,
    /// `.`
    Output,
    /// `,`
    Input,
    /// `[`
    Open,
    /// `]`
    Close,
}

impl Token {
    pub fn from_char(ch: char) -> Option<Self> {
        Some(match ch {
            '>' => Token::Right,
            '<' => Token::Left,
            '+' => Token::Inc,
            '-' => Token::Dec,
            '.' => Token::Output,
            ',' => Token::Input,
            '[' => Token::Open,
            ']' => Token::Close,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Token::Right => '>',
            Token::Left => '<',
            Token::Inc => '+',
            Token::Dec => '-',
            Token::Output => '.',
            Token::Input => ',',
            Token::Open => '[',
            Token::Close => ']',
        }
    }

    pub fn is_bracket(self) -> bool {
        matches!(self, Token::Open | Token::Close)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// An ordered, immutable sequence of tokens.
///
/// Cloning is cheap: the tokens live behind an `Arc`, so the engine and the
/// view can hold the same program without copying it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    tokens: Arc<[Token]>,
}

impl Program {
    /// Keep only Brainfuck instruction characters, in source order.
    pub fn tokenize(source: &str) -> Self {
        let tokens: Vec<Token> = source.chars().filter_map(Token::from_char).collect();
        Self { tokens: tokens.into() }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Token> {
        self.tokens.get(index).copied()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in self.tokens.iter() {
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

/// Free-function form of [`Program::tokenize`].
pub fn tokenize(source: &str) -> Program {
    Program::tokenize(source)
}
