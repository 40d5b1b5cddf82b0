use typed_pattern_rs::{CompiledPattern, PatternEngine, Value, ValueError};

fn compile(pattern: &str) -> CompiledPattern {
    PatternEngine::new()
        .compile(pattern)
        .expect("pattern should compile")
}

#[test]
fn match_when_input_is_empty_then_nothing_matches() {
    for pattern in ["X(-{a:int}-{b:int})", "{a:int}?", "({a:str})", "PAGE{id:int}"] {
        assert!(compile(pattern).match_input("").is_none(), "{pattern}");
    }
}

#[test]
fn match_when_subsequence_is_partial_then_whole_match_fails() {
    let compiled = compile("X(-{a:int}-{b:int})");
    assert!(compiled.match_input("X-1-").is_none());
    assert!(compiled.match_input("X-1").is_none());
}

#[test]
fn match_when_subsequence_is_complete_then_all_members_resolve() {
    let compiled = compile("X(-{a:int}-{b:int})");
    let result = compiled.match_input("X-1-2").expect("should match");
    assert_eq!(result.get("a"), Some(&Value::Int(1)));
    assert_eq!(result.get("b"), Some(&Value::Int(2)));
    assert!(!result.is_failed());
}

#[test]
fn match_when_subsequence_is_absent_then_members_are_missing() {
    let compiled = compile("X(-{a:int}-{b:int})");
    let result = compiled.match_input("X").expect("should match");
    assert_eq!(result.get("a"), None);
    assert_eq!(result.get("b"), None);
    assert!(result.groups().is_empty());
    assert!(!result.is_failed());
}

#[test]
fn match_when_optional_section_holds_two_groups_then_both_or_neither() {
    let compiled = compile("USER({name:str}-{age:int})");

    let full = compiled.match_input("USERjohn-25").expect("should match");
    assert_eq!(full.get("name"), Some(&Value::Str("john".into())));
    assert_eq!(full.get("age"), Some(&Value::Int(25)));

    let bare = compiled.match_input("USER").expect("should match");
    assert!(bare.groups().is_empty());

    assert!(compiled.match_input("USERjohn").is_none());
    assert!(compiled.match_input("USER-25").is_none());
}

#[test]
fn match_when_sections_nest_then_inner_needs_outer() {
    let compiled = compile("{a:int}(-{b:int}-{c:int}(-{d:int}))");

    let result = compiled.match_input("1").expect("outer omitted");
    assert_eq!(result.values().len(), 1);

    let result = compiled.match_input("1-2-3").expect("inner omitted");
    assert_eq!(result.get("c"), Some(&Value::Int(3)));
    assert_eq!(result.get("d"), None);

    let result = compiled.match_input("1-2-3-4").expect("everything present");
    assert_eq!(result.get("d"), Some(&Value::Int(4)));

    assert!(compiled.match_input("1-2").is_none());
    assert!(compiled.match_input("1-4").is_none());
}

#[test]
fn match_when_string_precedes_multichar_literal_then_capture_stops_there() {
    let compiled = compile("BASE({x:int}-data-{y:str}(-extra-{z:int}))");

    let result = compiled
        .match_input("BASE123-data-test-extra-456")
        .expect("should match");
    assert_eq!(result.get("x"), Some(&Value::Int(123)));
    assert_eq!(result.get("y"), Some(&Value::Str("test".into())));
    assert_eq!(result.get("z"), Some(&Value::Int(456)));

    let result = compiled.match_input("BASE1-data-plain").expect("should match");
    assert_eq!(result.get("y"), Some(&Value::Str("plain".into())));
    assert_eq!(result.get("z"), None);
}

#[test]
fn match_when_default_is_declared_then_absent_member_takes_it() {
    let compiled = compile("PAGE{id:int}(-{lang:str(default=en)})");

    let result = compiled.match_input("PAGE5").expect("should match");
    assert_eq!(result.get("lang"), Some(&Value::Str("en".into())));

    let result = compiled.match_input("PAGE5-de").expect("should match");
    assert_eq!(result.get("lang"), Some(&Value::Str("de".into())));
    assert_eq!(result.groups()["lang"].type_name, "str");
    assert_eq!(result.groups()["lang"].constraints.get("default"), Some("en"));
}

#[test]
fn match_when_constraint_fails_then_error_is_recorded_not_raised() {
    let compiled = compile("P{n:int(min=10)}");
    let result = compiled.match_input("P5").expect("regex matches");
    assert!(result.is_failed());
    assert_eq!(result.errors()[0].group, "n");
    assert_eq!(result.get("n"), None);
    assert_eq!(result.input(), "P5");
}

#[test]
fn match_when_non_negative_range_is_declared_then_longer_digits_do_not_match() {
    let compiled = compile("P{n:int(min=0,max=99)}");
    assert!(compiled.match_input("P99").is_some());
    assert!(compiled.match_input("P100").is_none());
}

#[test]
fn match_when_only_maximum_is_declared_then_negatives_are_values() {
    let compiled = compile("P{n:int(max=5)}");

    let result = compiled.match_input("P-10").expect("negative matches");
    assert!(!result.is_failed());
    assert_eq!(result.get("n"), Some(&Value::Int(-10)));

    let result = compiled.match_input("P10").expect("regex matches");
    assert!(result.is_failed());
    assert_eq!(result.errors()[0].group, "n");
    assert_eq!(
        result.errors()[0].error,
        ValueError::AboveMax { value: 10, max: 5 }
    );
}

#[test]
fn generate_when_range_spans_zero_then_output_matches_again() {
    let compiled = compile("P{n:int(min=-500,max=10)}");
    let text = compiled
        .generate(&[("n", Value::Int(-100))])
        .expect("in range");
    assert_eq!(text, "P-100");
    let result = compiled.match_input(&text).expect("generated text matches");
    assert_eq!(result.get("n"), Some(&Value::Int(-100)));
}

#[test]
fn match_then_generate_round_trips() {
    let cases = [
        ("X(-{a:int}-{b:int})", "X-1-2"),
        ("X(-{a:int}-{b:int})", "X"),
        ("USER({name:str}-{age:int})", "USERjohn-25"),
        ("{a:int}(-{b:int}-{c:int}(-{d:int}))", "1-2-3-4"),
        ("BASE({x:int}-data-{y:str}(-extra-{z:int}))", "BASE123-data-test-extra-456"),
        ("PAGE{id:int}(-{lang:str(default=en)})", "PAGE5-de"),
    ];
    for (pattern, input) in cases {
        let compiled = compile(pattern);
        let result = compiled.match_input(input).expect("should match");
        assert!(!result.is_failed(), "{pattern}");
        let generated = compiled.generate(&result.values()).expect("should generate");
        assert!(compiled.match_input(&generated).is_some(), "{pattern}: {generated}");
        assert_eq!(generated, input, "{pattern}");
    }
}

#[test]
fn match_when_max_length_is_declared_then_characters_are_counted() {
    let compiled = compile("T{s:str(maxLen=3)}");
    let result = compiled.match_input("T日本語").expect("three characters match");
    assert_eq!(result.get("s"), Some(&Value::from("日本語")));
    assert!(compiled.match_input("T日本語x").is_none());
    assert_eq!(
        compiled
            .generate(&[("s", Value::from("日本語"))])
            .expect("within bound"),
        "T日本語"
    );
}
