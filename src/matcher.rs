//! Bracket resolution by scanning with a nesting counter.
//!
//! There is no precomputed jump table: a jump is resolved at the moment the
//! guard fires, so a malformed program runs normally until it actually takes
//! the unmatched branch.

use std::fmt;

use crate::program::Token;

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Open,
    Close,
}

impl BracketKind {
    pub fn as_char(self) -> char {
        match self {
            BracketKind::Open => '[',
            BracketKind::Close => ']',
        }
    }

    /// The direction a scan starting from this bracket travels.
    pub fn scan_direction(self) -> ScanDirection {
        match self {
            BracketKind::Open => ScanDirection::Forward,
            BracketKind::Close => ScanDirection::Backward,
        }
    }
}

impl fmt::Display for BracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketKind::Open => write!(f, "'['"),
            BracketKind::Close => write!(f, "']'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    Forward,
    Backward,
}

/// A bracket whose counterpart could not be found within program bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Unmatched bracket {kind} at instruction {ip}")]
pub struct UnmatchedBracket {
    pub ip: usize,
    pub kind: BracketKind,
}

/// Find the bracket matching the one at `position`.
///
/// Brackets in the scan direction deepen the nesting, opposite brackets
/// close it; the scan stops where depth returns to zero. Running off either
/// end of `tokens` reports [`UnmatchedBracket`] for the starting bracket.
pub fn find_match(
    tokens: &[Token],
    position: usize,
    direction: ScanDirection,
) -> Result<usize, UnmatchedBracket> {
    let (deeper, shallower, kind) = match direction {
        ScanDirection::Forward => (Token::Open, Token::Close, BracketKind::Open),
        ScanDirection::Backward => (Token::Close, Token::Open, BracketKind::Close),
    };
    let unmatched = UnmatchedBracket { ip: position, kind };

    let mut depth: usize = 1;
    let mut i = position;
    loop {
        i = match direction {
            ScanDirection::Forward => i + 1,
            ScanDirection::Backward => i.checked_sub(1).ok_or(unmatched)?,
        };
        let Some(&token) = tokens.get(i) else {
            return Err(unmatched);
        };
        if token == deeper {
            depth += 1;
        } else if token == shallower {
            depth -= 1;
            if depth == 0 {
                return Ok(i);
            }
        }
    }
}
