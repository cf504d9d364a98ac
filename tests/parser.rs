use jschema::value::Format;
use jschema::{parse_str, stringify, Parser, ParserOptions};

#[test]
fn round_trip_reparses_to_the_same_tree() {
    let samples = [
        r#"{"a":1,"b":[true,false,null],"c":"x\ny"}"#,
        r#"[1,2.5,-3,1e10]"#,
        r#""hello world""#,
        "null",
    ];
    for text in samples {
        let parsed = parse_str(text).unwrap();
        let printed = stringify(&parsed);
        let reparsed = parse_str(&printed).unwrap();
        assert_eq!(parsed, reparsed, "round trip mismatch for {text}");
    }
}

#[test]
fn pretty_printed_output_reparses_identically() {
    let parsed = parse_str(r#"{"nested":{"list":[1,2,3]}}"#).unwrap();
    let pretty = parsed.describe(Format::Pretty);
    let reparsed = parse_str(&pretty).unwrap();
    assert_eq!(parsed, reparsed);
}

#[test]
fn structural_errors_map_to_their_expected_kind() {
    let cases = [
        ("]", "misplaced_right_bracket"),
        ("}", "misplaced_right_curly_bracket"),
        (":", "misplaced_colon"),
        ("[,]", "misplaced_separator"),
        ("{,}", "expected_obj_member_name"),
        ("{1:2}", "expected_obj_member_name"),
        ("[1,]", "unexpected_character"),
        ("{\"a\" 1}", "expected_colon"),
        ("[1 2]", "expected_separator_or_right_bracket"),
        ("{\"a\":1 \"b\":2}", "expected_separator_or_right_curly_bracket"),
        ("{\"a\":1", "unterminated_object"),
        ("[1,2", "unterminated_array"),
        (r#"{"a":1,"a":2}"#, "duplicate_obj_member"),
    ];
    for (text, expected_kind) in cases {
        let errors = parse_str(text).unwrap_err();
        assert!(
            errors.iter().any(|e| e.kind.to_string() == expected_kind),
            "expected {expected_kind} for input {text:?}, got {errors:?}"
        );
    }
}

#[test]
fn duplicate_object_keys_are_rejected_unless_allowed() {
    let strict = parse_str(r#"{"a":1,"a":2}"#);
    assert!(strict.is_err());

    let relaxed = Parser::new(ParserOptions {
        allow_duplicates_in_obj: true,
        ..ParserOptions::default()
    })
    .parse_string(r#"{"a":1,"a":2}"#);
    assert!(relaxed.is_ok());
}

#[test]
fn depth_cap_fails_exactly_one_level_past_the_limit() {
    let within = Parser::new(ParserOptions { max_depth: 2, ..ParserOptions::default() }).parse_string("[[1]]");
    assert!(within.is_ok());

    let one_past = Parser::new(ParserOptions { max_depth: 2, ..ParserOptions::default() }).parse_string("[[[1]]]");
    assert!(one_past.is_err());
}

#[test]
fn invalid_input_discards_the_partial_tree() {
    let err = parse_str(r#"{"a":1,"b":}"#).unwrap_err();
    assert!(!err.is_empty());
}

#[test]
fn relaxed_mode_accepts_identifier_keys_and_comments() {
    let text = "{\n  // a comment\n  a: 1,\n  b: [1, 2]\n}";
    let options = ParserOptions { allow_relaxed_format: true, ..ParserOptions::default() };
    let parsed = Parser::new(options).parse_string(text).unwrap();
    assert_eq!(parsed["a"], jschema::Value::from(1i64));
    assert_eq!(parsed["b"].array_items().unwrap().len(), 2);
}

#[test]
fn buffer_parsing_rejects_invalid_utf8() {
    let buf = b"{\"a\": \"\xff\xfe\"}";
    let parser = Parser::new(ParserOptions::default());
    assert!(parser.parse_buffer(buf).is_err());
}
