//! A recursive-descent parser driven by [`crate::tokenizer::Tokenizer`],
//! assembling a [`Value`] tree under configurable structural policies.

use std::path::Path;

use tracing::warn;

use crate::error::{ParseError, ParseErrorKind};
use crate::io::{BufferSource, FsBufferSource};
use crate::token::{Token, TokenKind};
use crate::tokenizer::{decode_string_token, Tokenizer};
use crate::value::{Number, Object, Value};

/// Parser configuration. `0` in any size/depth field means "unlimited".
#[derive(Debug, Clone)]
pub struct ParserOptions {
    pub allow_duplicates_in_obj: bool,
    pub allow_relaxed_format: bool,
    pub max_depth: usize,
    pub max_array_size: usize,
    pub max_object_size: usize,
    pub max_errors: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            allow_duplicates_in_obj: false,
            allow_relaxed_format: false,
            max_depth: 0,
            max_array_size: 0,
            max_object_size: 0,
            max_errors: 1,
        }
    }
}

/// Internal signal that parsing should stop; the accumulated errors are
/// already recorded in [`State::errors`].
struct Abort;

struct State<'a> {
    tokenizer: Tokenizer<'a>,
    current: Option<Token<'a>>,
    errors: Vec<ParseError>,
    options: &'a ParserOptions,
    file: Option<String>,
}

impl<'a> State<'a> {
    fn new(input: &'a str, options: &'a ParserOptions, file: Option<String>) -> State<'a> {
        let mut tokenizer = Tokenizer::new(input, options.allow_relaxed_format);
        let current = tokenizer.next_token();
        State { tokenizer, current, errors: Vec::new(), options, file }
    }

    fn advance(&mut self) {
        self.current = self.tokenizer.next_token();
    }

    fn record(&mut self, kind: ParseErrorKind, row: usize, col: usize, message: impl Into<String>) -> Result<(), Abort> {
        let mut err = ParseError::new(kind, row, col, message);
        if let Some(file) = &self.file {
            err = err.with_file(file.clone());
        }
        self.errors.push(err);
        if self.options.max_errors != 0 && self.errors.len() >= self.options.max_errors {
            Err(Abort)
        } else {
            Ok(())
        }
    }

    fn fatal(&mut self, kind: ParseErrorKind, row: usize, col: usize, message: impl Into<String>) -> Abort {
        let _ = self.record(kind, row, col, message);
        Abort
    }
}

/// Parses JSON text into a [`Value`] tree.
///
/// A single `Parser` is meant to run one [`parse_string`](Parser::parse_string)
/// / [`parse_buffer`](Parser::parse_buffer) / [`parse_file`](Parser::parse_file)
/// call at a time; reuse it across calls freely, but don't share it across
/// threads mid-parse.
pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    pub fn new(options: ParserOptions) -> Parser {
        Parser { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn parse_string(&self, text: &str) -> Result<Value, Vec<ParseError>> {
        self.run(text, None)
    }

    /// Validates `buf` as UTF-8 up front, then parses it. A single
    /// `invalid_utf8` error is reported at the first offending byte if
    /// validation fails; see the design notes for why this crate does not
    /// attempt mid-token UTF-8 recovery.
    pub fn parse_buffer(&self, buf: &[u8]) -> Result<Value, Vec<ParseError>> {
        match std::str::from_utf8(buf) {
            Ok(text) => self.run(text, None),
            Err(e) => {
                let valid = &buf[..e.valid_up_to()];
                let text = std::str::from_utf8(valid).unwrap();
                let (row, col) = position_at_end(text);
                Err(vec![ParseError::new(
                    ParseErrorKind::InvalidUtf8,
                    row,
                    col,
                    "invalid UTF-8 byte sequence",
                )])
            }
        }
    }

    pub fn parse_file(&self, path: &Path) -> Result<Value, Vec<ParseError>> {
        self.parse_file_with(path, &FsBufferSource)
    }

    pub fn parse_file_with(&self, path: &Path, source: &dyn BufferSource) -> Result<Value, Vec<ParseError>> {
        let text = source.read_to_string(path).map_err(|e| {
            vec![ParseError::new(ParseErrorKind::Io, 0, 0, e.to_string())
                .with_file(path.display().to_string())]
        })?;
        self.run(&text, Some(path.display().to_string()))
    }

    fn run(&self, text: &str, file: Option<String>) -> Result<Value, Vec<ParseError>> {
        let mut state = State::new(text, &self.options, file);
        match parse_value(&mut state, 0) {
            Ok(value) if state.errors.is_empty() => {
                if let Some(tok) = &state.current {
                    warn!(row = tok.row, col = tok.col, "trailing content after top-level value");
                    let _ = state.record(
                        ParseErrorKind::InvalidToken,
                        tok.row,
                        tok.col,
                        "unexpected trailing content after JSON value",
                    );
                }
                if state.errors.is_empty() {
                    return Ok(value);
                }
            }
            _ => {}
        }
        warn!(error_count = state.errors.len(), "discarding partial parse tree after errors");
        Err(state.errors)
    }
}

fn position_at_end(text: &str) -> (usize, usize) {
    let mut row = 1usize;
    let mut col = 1usize;
    for c in text.chars() {
        if c == '\n' {
            row += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (row, col)
}

fn parse_value(state: &mut State, depth: usize) -> Result<Value, Abort> {
    if state.options.max_depth != 0 && depth > state.options.max_depth {
        let (row, col) = state.current.map(|t| (t.row, t.col)).unwrap_or((0, 0));
        return Err(state.fatal(ParseErrorKind::MaxDepthExceeded, row, col, "maximum nesting depth exceeded"));
    }

    let tok = match state.current {
        Some(tok) => tok,
        None => return Err(state.fatal(ParseErrorKind::Eob, 0, 0, "unexpected end of input")),
    };

    if !tok.is_ok() {
        let kind = tok.error.unwrap();
        return Err(state.fatal(kind, tok.row, tok.col, format!("invalid token {:?}", tok.text)));
    }

    match tok.kind {
        TokenKind::LCBrace => parse_object(state, depth),
        TokenKind::LBracket => parse_array(state, depth),
        TokenKind::String => {
            let text = decode_string_token(tok.text).map_err(|kind| {
                state.fatal(kind, tok.row, tok.col, "invalid string literal")
            })?;
            state.advance();
            Ok(Value::String(text))
        }
        TokenKind::Number => {
            let n = Number::from_decimal_str(tok.text);
            state.advance();
            Ok(Value::Number(n))
        }
        TokenKind::True => {
            state.advance();
            Ok(Value::Boolean(true))
        }
        TokenKind::False => {
            state.advance();
            Ok(Value::Boolean(false))
        }
        TokenKind::Null => {
            state.advance();
            Ok(Value::Null)
        }
        TokenKind::RCBrace => Err(state.fatal(
            ParseErrorKind::MisplacedRightCurlyBracket,
            tok.row,
            tok.col,
            "unexpected '}'",
        )),
        TokenKind::RBracket => Err(state.fatal(
            ParseErrorKind::MisplacedRightBracket,
            tok.row,
            tok.col,
            "unexpected ']'",
        )),
        TokenKind::Comma => Err(state.fatal(
            ParseErrorKind::MisplacedSeparator,
            tok.row,
            tok.col,
            "unexpected ','",
        )),
        TokenKind::Colon => Err(state.fatal(ParseErrorKind::MisplacedColon, tok.row, tok.col, "unexpected ':'")),
        TokenKind::Identifier | TokenKind::Comment | TokenKind::Invalid => Err(state.fatal(
            ParseErrorKind::UnexpectedCharacter,
            tok.row,
            tok.col,
            "unexpected token in value position",
        )),
    }
}

fn parse_object(state: &mut State, depth: usize) -> Result<Value, Abort> {
    let open = state.current.unwrap();
    state.advance();
    let mut obj = Object::new();

    if matches!(state.current.map(|t| t.kind), Some(TokenKind::RCBrace)) {
        state.advance();
        return Ok(Value::Object(obj));
    }

    loop {
        let key_tok = match state.current {
            Some(t) if matches!(t.kind, TokenKind::String | TokenKind::Identifier) => t,
            Some(t) => {
                return Err(state.fatal(
                    ParseErrorKind::ExpectedObjMemberName,
                    t.row,
                    t.col,
                    "expected an object member name",
                ))
            }
            None => {
                return Err(state.fatal(
                    ParseErrorKind::UnterminatedObject,
                    open.row,
                    open.col,
                    "unterminated object",
                ))
            }
        };
        let key = if key_tok.kind == TokenKind::String {
            decode_string_token(key_tok.text)
                .map_err(|kind| state.fatal(kind, key_tok.row, key_tok.col, "invalid string literal"))?
        } else {
            key_tok.text.to_string()
        };
        state.advance();

        match state.current.map(|t| t.kind) {
            Some(TokenKind::Colon) => state.advance(),
            Some(_) | None => {
                let (row, col) = state.current.map(|t| (t.row, t.col)).unwrap_or((key_tok.row, key_tok.col));
                return Err(state.fatal(ParseErrorKind::ExpectedColon, row, col, "expected ':'"));
            }
        }

        let value = parse_value(state, depth + 1)?;

        let is_duplicate = obj.has(&key);
        if is_duplicate && !state.options.allow_duplicates_in_obj {
            state.record(
                ParseErrorKind::DuplicateObjMember,
                key_tok.row,
                key_tok.col,
                format!("duplicate object member \"{key}\""),
            )?;
        } else if is_duplicate {
            obj.push(key, value);
        } else {
            obj.push(key, value);
        }

        if state.options.max_object_size != 0 && obj.len() > state.options.max_object_size {
            return Err(state.fatal(
                ParseErrorKind::MaxObjSizeExceeded,
                open.row,
                open.col,
                "maximum object size exceeded",
            ));
        }

        match state.current.map(|t| t.kind) {
            Some(TokenKind::Comma) => {
                state.advance();
                if matches!(state.current.map(|t| t.kind), Some(TokenKind::RCBrace)) {
                    let t = state.current.unwrap();
                    return Err(state.fatal(
                        ParseErrorKind::ExpectedObjMemberName,
                        t.row,
                        t.col,
                        "trailing comma before '}'",
                    ));
                }
            }
            Some(TokenKind::RCBrace) => {
                state.advance();
                break;
            }
            Some(t) => {
                let tok = state.current.unwrap();
                let _ = t;
                return Err(state.fatal(
                    ParseErrorKind::ExpectedSeparatorOrRightCurlyBracket,
                    tok.row,
                    tok.col,
                    "expected ',' or '}'",
                ));
            }
            None => {
                return Err(state.fatal(
                    ParseErrorKind::UnterminatedObject,
                    open.row,
                    open.col,
                    "unterminated object",
                ))
            }
        }
    }

    Ok(Value::Object(obj))
}

fn parse_array(state: &mut State, depth: usize) -> Result<Value, Abort> {
    let open = state.current.unwrap();
    state.advance();
    let mut items = Vec::new();

    if matches!(state.current.map(|t| t.kind), Some(TokenKind::RBracket)) {
        state.advance();
        return Ok(Value::Array(items));
    }

    loop {
        if state.current.is_none() {
            return Err(state.fatal(
                ParseErrorKind::UnterminatedArray,
                open.row,
                open.col,
                "unterminated array",
            ));
        }
        items.push(parse_value(state, depth + 1)?);

        if state.options.max_array_size != 0 && items.len() > state.options.max_array_size {
            return Err(state.fatal(
                ParseErrorKind::MaxArraySizeExceeded,
                open.row,
                open.col,
                "maximum array size exceeded",
            ));
        }

        match state.current.map(|t| t.kind) {
            Some(TokenKind::Comma) => {
                state.advance();
                if matches!(state.current.map(|t| t.kind), Some(TokenKind::RBracket)) {
                    let t = state.current.unwrap();
                    return Err(state.fatal(
                        ParseErrorKind::UnexpectedCharacter,
                        t.row,
                        t.col,
                        "trailing comma before ']'",
                    ));
                }
            }
            Some(TokenKind::RBracket) => {
                state.advance();
                break;
            }
            Some(_) => {
                let tok = state.current.unwrap();
                return Err(state.fatal(
                    ParseErrorKind::ExpectedSeparatorOrRightBracket,
                    tok.row,
                    tok.col,
                    "expected ',' or ']'",
                ));
            }
            None => {
                return Err(state.fatal(
                    ParseErrorKind::UnterminatedArray,
                    open.row,
                    open.col,
                    "unterminated array",
                ))
            }
        }
    }

    Ok(Value::Array(items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Value, Vec<ParseError>> {
        Parser::new(ParserOptions::default()).parse_string(text)
    }

    #[test]
    fn parses_nested_object_and_array() {
        let v = parse(r#"{"a":1,"b":[true,null,"x"]}"#).unwrap();
        let obj = v.object_pairs().unwrap();
        assert_eq!(obj.len(), 2);
        let b = obj.get("b").unwrap();
        assert_eq!(b.array_items().unwrap().len(), 3);
    }

    #[test]
    fn duplicate_keys_rejected_by_default_with_position() {
        let errs = parse(r#"{"a":1,"a":2}"#).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, ParseErrorKind::DuplicateObjMember);
        assert_eq!(errs[0].row, 1);
        assert_eq!(errs[0].col, 8);
    }

    #[test]
    fn duplicate_keys_allowed_when_configured() {
        let mut opts = ParserOptions::default();
        opts.allow_duplicates_in_obj = true;
        let v = Parser::new(opts).parse_string(r#"{"a":1,"a":2}"#).unwrap();
        let obj = v.object_pairs().unwrap();
        assert_eq!(obj.get("a"), Some(&Value::from(1i64)));
        let pairs: Vec<_> = obj.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        assert_eq!(pairs, vec![("a".into(), Value::from(1i64)), ("a".into(), Value::from(2i64))]);
    }

    #[test]
    fn trailing_comma_rejected() {
        assert!(parse("[1,2,]").is_err());
        assert!(parse(r#"{"a":1,}"#).is_err());
    }

    #[test]
    fn depth_cap_fails_one_past_limit() {
        let mut opts = ParserOptions::default();
        opts.max_depth = 2;
        let ok = Parser::new(opts.clone()).parse_string("[[1]]");
        assert!(ok.is_ok());
        let too_deep = Parser::new(opts).parse_string("[[[1]]]");
        let errs = too_deep.unwrap_err();
        assert_eq!(errs[0].kind, ParseErrorKind::MaxDepthExceeded);
    }

    #[test]
    fn array_size_cap_fails_one_past_limit() {
        let mut opts = ParserOptions::default();
        opts.max_array_size = 2;
        assert!(Parser::new(opts.clone()).parse_string("[1,2]").is_ok());
        let errs = Parser::new(opts).parse_string("[1,2,3]").unwrap_err();
        assert_eq!(errs[0].kind, ParseErrorKind::MaxArraySizeExceeded);
    }

    #[test]
    fn invalid_parse_discards_partial_tree() {
        let result = parse(r#"{"a": invalid}"#);
        assert!(result.is_err());
    }

    #[test]
    fn relaxed_mode_parses_identifier_keys_and_comments() {
        let mut opts = ParserOptions::default();
        opts.allow_relaxed_format = true;
        let v = Parser::new(opts).parse_string("{ // comment\n  a: 1 }").unwrap();
        assert_eq!(v.object_pairs().unwrap().get("a"), Some(&Value::from(1i64)));
    }

    #[test]
    fn surrogate_pair_decodes_to_one_char() {
        let v = parse("\"\\uD834\\uDD1E\"").unwrap();
        assert_eq!(v.str().unwrap().chars().count(), 1);
    }
}
