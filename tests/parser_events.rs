use std::fmt::Write as _;

use pretty_assertions::assert_eq;
use safe_yaml_core::{
    EventData, MappingStyle, Mark, Parser, ParserError, ScalarStyle, ScannerError, SequenceStyle,
};

/// Render the event stream of `input` in the notation of the YAML test
/// suite, one event per line.
fn test_suite_events(input: &str) -> Result<String, ParserError> {
    let mut parser = Parser::new();
    let mut bytes = input.as_bytes();
    parser.set_input_string(&mut bytes);

    let mut out = String::new();
    for event in parser {
        match event?.data {
            EventData::StreamStart { .. } => out.push_str("+STR"),
            EventData::StreamEnd => out.push_str("-STR"),
            EventData::DocumentStart { implicit, .. } => {
                out.push_str(if implicit { "+DOC" } else { "+DOC ---" });
            }
            EventData::DocumentEnd { implicit } => {
                out.push_str(if implicit { "-DOC" } else { "-DOC ..." });
            }
            EventData::Alias { anchor } => {
                let _ = write!(out, "=ALI *{anchor}");
            }
            EventData::Scalar {
                anchor,
                tag,
                value,
                style,
                ..
            } => {
                out.push_str("=VAL");
                write_properties(&mut out, anchor.as_deref(), tag.as_deref());
                out.push_str(match style {
                    ScalarStyle::SingleQuoted => " '",
                    ScalarStyle::DoubleQuoted => " \"",
                    ScalarStyle::Literal => " |",
                    ScalarStyle::Folded => " >",
                    _ => " :",
                });
                write_escaped(&mut out, &value);
            }
            EventData::SequenceStart {
                anchor, tag, style, ..
            } => {
                out.push_str("+SEQ");
                if style == SequenceStyle::Flow {
                    out.push_str(" []");
                }
                write_properties(&mut out, anchor.as_deref(), tag.as_deref());
            }
            EventData::SequenceEnd => out.push_str("-SEQ"),
            EventData::MappingStart {
                anchor, tag, style, ..
            } => {
                out.push_str("+MAP");
                if style == MappingStyle::Flow {
                    out.push_str(" {}");
                }
                write_properties(&mut out, anchor.as_deref(), tag.as_deref());
            }
            EventData::MappingEnd => out.push_str("-MAP"),
        }
        out.push('\n');
    }
    Ok(out)
}

fn write_properties(out: &mut String, anchor: Option<&str>, tag: Option<&str>) {
    if let Some(anchor) = anchor {
        let _ = write!(out, " &{anchor}");
    }
    if let Some(tag) = tag {
        let _ = write!(out, " <{tag}>");
    }
}

fn write_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            '\x08' => out.push_str("\\b"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
}

#[test]
fn sequence_of_scalars() {
    let input = "- Mark McGwire\n- Sammy Sosa\n- Ken Griffey\n";
    let expected = "\
+STR
+DOC
+SEQ
=VAL :Mark McGwire
=VAL :Sammy Sosa
=VAL :Ken Griffey
-SEQ
-DOC
-STR
";
    assert_eq!(test_suite_events(input).unwrap(), expected);
}

#[test]
fn sequence_of_mappings() {
    let input = "-\n  name: Mark McGwire\n  hr:   65\n-\n  name: Sammy Sosa\n  hr:   63\n";
    let expected = "\
+STR
+DOC
+SEQ
+MAP
=VAL :name
=VAL :Mark McGwire
=VAL :hr
=VAL :65
-MAP
+MAP
=VAL :name
=VAL :Sammy Sosa
=VAL :hr
=VAL :63
-MAP
-SEQ
-DOC
-STR
";
    assert_eq!(test_suite_events(input).unwrap(), expected);
}

#[test]
fn block_scalars() {
    let input = "a: |\n  line one\n  line two\nb: >\n  folded\n  text\n\n  para\n";
    let expected = "\
+STR
+DOC
+MAP
=VAL :a
=VAL |line one\\nline two\\n
=VAL :b
=VAL >folded text\\npara\\n
-MAP
-DOC
-STR
";
    assert_eq!(test_suite_events(input).unwrap(), expected);
}

#[test]
fn quoted_scalars() {
    let input = "- 'it''s'\n- \"tab\\there\\n\"\n";
    let expected = "\
+STR
+DOC
+SEQ
=VAL 'it's
=VAL \"tab\\there\\n
-SEQ
-DOC
-STR
";
    assert_eq!(test_suite_events(input).unwrap(), expected);
}

#[test]
fn node_properties_and_explicit_keys() {
    let input = "--- !!map\n&a key: !local value\n? complex\n: *a\n...\n";
    let expected = "\
+STR
+DOC ---
+MAP <tag:yaml.org,2002:map>
=VAL &a :key
=VAL <!local> :value
=VAL :complex
=ALI *a
-MAP
-DOC ...
-STR
";
    assert_eq!(test_suite_events(input).unwrap(), expected);
}

#[test]
fn flow_collections() {
    let input = "[a, {b: c}, 'd']\n";
    let expected = "\
+STR
+DOC
+SEQ []
=VAL :a
+MAP {}
=VAL :b
=VAL :c
-MAP
=VAL 'd
-SEQ
-DOC
-STR
";
    assert_eq!(test_suite_events(input).unwrap(), expected);

    let input = "{a, b: }";
    let expected = "\
+STR
+DOC
+MAP {}
=VAL :a
=VAL :
=VAL :b
=VAL :
-MAP
-DOC
-STR
";
    assert_eq!(test_suite_events(input).unwrap(), expected);
}

#[test]
fn multiple_documents() {
    let input = "a\n---\nb\n...\n";
    let expected = "\
+STR
+DOC
=VAL :a
-DOC
+DOC ---
=VAL :b
-DOC ...
-STR
";
    assert_eq!(test_suite_events(input).unwrap(), expected);
}

#[test]
fn document_starting_with_fullwidth_letter() {
    let expected = "\
+STR
+DOC
+MAP
=VAL :\u{FF4B}
=VAL :1
-MAP
-DOC
-STR
";
    assert_eq!(test_suite_events("\u{FF4B}: 1\n").unwrap(), expected);
}

#[test]
fn lexical_and_structural_errors() {
    let err = test_suite_events("a: 1\nb\nc: 2").unwrap_err();
    assert!(matches!(
        err,
        ParserError::Scanner(ScannerError::Problem {
            problem: "could not find expected ':'",
            ..
        })
    ));

    let err = test_suite_events("a: 1\n- b\n").unwrap_err();
    assert!(matches!(
        err,
        ParserError::ProblemWithContext {
            problem: "did not find expected key",
            ..
        }
    ));
    assert_eq!(err.problem_mark(), Some(Mark::new(5, 1, 0)));
}

#[test]
fn second_value_indicator_points_at_second_colon() {
    let err = test_suite_events("key: : value").unwrap_err();
    assert_eq!(err.problem_mark(), Some(Mark::new(5, 0, 5)));
    assert!(matches!(
        err,
        ParserError::Scanner(ScannerError::Problem {
            problem: "mapping values are not allowed in this context",
            ..
        })
    ));
}

#[test]
fn unclosed_flow_sequence() {
    let err = test_suite_events("[a, b").unwrap_err();
    assert!(matches!(
        err,
        ParserError::ProblemWithContext {
            context: "while parsing a flow sequence",
            problem: "did not find expected ',' or ']'",
            ..
        }
    ));
}

#[test]
fn events_are_balanced() {
    let input = "a:\n  - [1, {x: y}]\n  - b: {c: [d]}\n---\n- - - e\n";
    let mut parser = Parser::new();
    let mut bytes = input.as_bytes();
    parser.set_input_string(&mut bytes);

    let mut open = Vec::new();
    let mut documents = 0;
    for event in parser {
        let event = event.unwrap();
        match event.data {
            EventData::DocumentStart { .. } => documents += 1,
            EventData::SequenceStart { .. } => open.push('['),
            EventData::MappingStart { .. } => open.push('{'),
            EventData::SequenceEnd => assert_eq!(open.pop(), Some('[')),
            EventData::MappingEnd => assert_eq!(open.pop(), Some('{')),
            _ => {}
        }
        assert!(event.start_mark.index <= event.end_mark.index);
    }
    assert!(open.is_empty());
    assert_eq!(documents, 2);
}
