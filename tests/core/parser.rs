use aki::core::parser::{CommandDescriptor, parse, strip_syntax};

const CORPUS: &[&str] = &[
    ">find< /akademik (chill) [concise] what is X",
    ">academic search< >juridical research< /lawyer (serious) [developed] droit d'auteur",
    "What is the capital of France?",
    "",
    "   ",
    "/[x]ab nested tokens",
    "((happy)) double parens",
    ">>find<< doubled arrows",
    "> spaced command < and (not a tone) [or output]",
    "tabs\tand\nnewlines  everywhere",
    "3 > 2 < 4 (math) [1]",
];

fn assert_bare(d: &CommandDescriptor) {
    assert!(d.command_tokens.is_empty(), "{:?}", d);
    assert!(d.persona_tag.is_none(), "{:?}", d);
    assert!(d.tone_tag.is_none(), "{:?}", d);
    assert!(d.output_tag.is_none(), "{:?}", d);
}

#[test]
fn reparsing_content_is_a_fixpoint() {
    for raw in CORPUS {
        let first = parse(raw);
        let second = parse(&first.content);
        assert_bare(&second);
        assert_eq!(second.content, first.content, "input {:?}", raw);
    }
}

#[test]
fn content_is_trimmed() {
    for raw in CORPUS {
        let content = parse(raw).content;
        assert_eq!(content, content.trim());
    }
}

#[test]
fn syntax_free_content_is_the_trimmed_raw_text() {
    for raw in [
        "  line one\n\n    indented  code  ",
        "tabs\tand\nnewlines  everywhere",
        "def f():\n    return 1\n",
    ] {
        let d = parse(raw);
        assert_bare(&d);
        assert_eq!(d.content, raw.trim());
    }
}

#[test]
fn removed_tokens_leave_single_spaces_and_keep_line_breaks() {
    let d = parse("explain  /akademik  this\n    indented  (chill) block [concise]");
    assert_eq!(d.content, "explain this\n    indented block");

    let d = parse(">explain< /shrink\nfirst line\n  second line");
    assert_eq!(d.content, "first line\n  second line");
}

#[test]
fn raw_text_is_preserved_verbatim() {
    for raw in CORPUS {
        assert_eq!(parse(raw).raw_text, *raw);
    }
}

#[test]
fn spaced_command_keeps_inner_spacing() {
    let d = parse("> spaced command < and (not a tone) [or output]");
    assert_eq!(d.command_tokens, vec![" spaced command "]);
    assert!(d.tone_tag.is_none());
    assert!(d.output_tag.is_none());
    assert_eq!(d.content, "and (not a tone) [or output]");
}

#[test]
fn comparison_operators_read_as_a_command_token() {
    let d = parse("3 > 2 < 4 (math) [1]");
    assert_eq!(d.command_tokens, vec![" 2 "]);
    assert_eq!(d.tone_tag.as_deref(), Some("math"));
    assert_eq!(d.output_tag.as_deref(), Some("1"));
    assert_eq!(d.content, "3 4");
}

#[test]
fn strip_syntax_matches_parse_content() {
    for raw in CORPUS {
        assert_eq!(strip_syntax(raw), parse(raw).content);
    }
}

#[test]
fn unparsed_descriptor_carries_only_raw_text() {
    let d = CommandDescriptor::unparsed(">find< /core hi");
    assert_eq!(d.raw_text, ">find< /core hi");
    assert_bare(&d);
    assert!(d.content.is_empty());
    assert!(!d.has_commands());
}
