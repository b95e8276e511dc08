//! Shell-style tokenizer for command lines.
//!
//! Splits a line into words following POSIX shell quoting:
//! - Whitespace separates words
//! - Single quotes preserve everything literally: `'a b'` → `a b`
//! - Double quotes allow `\"`, `\\`, `\$` and `` \` `` escapes
//! - A backslash outside quotes escapes the next character
//! - Adjacent quoted and unquoted parts join: `a"b c"d` → `ab cd`
//!
//! `#` is an ordinary character here; comments are removed by the console
//! with [`strip_comment`] before a line reaches the tokenizer.

use std::iter::Peekable;
use std::str::Chars;
use thiserror::Error;

/// Malformed quoting in a command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("no closing quotation")]
    UnclosedQuote,
    #[error("no escaped character")]
    TrailingEscape,
}

/// Tokenizes a command line into words.
pub fn tokenize(input: &str) -> Result<Vec<String>, TokenizeError> {
    let mut words = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        // Skip whitespace
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }
        words.push(collect_word(&mut chars)?);
    }

    Ok(words)
}

/// Collects one word, joining adjacent quoted and unquoted parts.
fn collect_word(chars: &mut Peekable<Chars<'_>>) -> Result<String, TokenizeError> {
    let mut word = String::new();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            break;
        }
        chars.next();
        match c {
            '\'' => collect_single_quoted(chars, &mut word)?,
            '"' => collect_double_quoted(chars, &mut word)?,
            '\\' => word.push(chars.next().ok_or(TokenizeError::TrailingEscape)?),
            _ => word.push(c),
        }
    }

    Ok(word)
}

fn collect_single_quoted(
    chars: &mut Peekable<Chars<'_>>,
    word: &mut String,
) -> Result<(), TokenizeError> {
    for c in chars.by_ref() {
        if c == '\'' {
            return Ok(());
        }
        word.push(c);
    }
    Err(TokenizeError::UnclosedQuote)
}

fn collect_double_quoted(
    chars: &mut Peekable<Chars<'_>>,
    word: &mut String,
) -> Result<(), TokenizeError> {
    while let Some(c) = chars.next() {
        match c {
            '"' => return Ok(()),
            '\\' => match chars.next() {
                Some(escaped @ ('"' | '\\' | '$' | '`')) => word.push(escaped),
                // Unknown escape, keep as-is
                Some(other) => {
                    word.push('\\');
                    word.push(other);
                }
                None => return Err(TokenizeError::UnclosedQuote),
            },
            _ => word.push(c),
        }
    }
    Err(TokenizeError::UnclosedQuote)
}

/// Removes a trailing `#` comment that is not quoted or escaped, then trims.
///
/// `help  # show commands` → `help`, while `echo "a#b"` is left intact.
pub fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some('\''), '\'') => quote = None,
            (Some('\''), _) => {}
            (_, '\\') => escaped = true,
            (Some('"'), '"') => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '#') => return line[..i].trim(),
            (None, _) => {}
        }
    }

    line.trim()
}
