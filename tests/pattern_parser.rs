use typed_pattern_rs::ast::{NodeKind, NodeRecord};
use typed_pattern_rs::pattern::{GroupCounter, parse_pattern};
use typed_pattern_rs::types::TypeRegistry;
use typed_pattern_rs::{EngineError, PatternEngine, PatternError, Value};

fn kinds(pattern: &str) -> Vec<&'static str> {
    let ast = parse_pattern(pattern, &TypeRegistry::with_defaults()).expect("pattern should parse");
    ast.walk().iter().map(|n| n.kind().tag()).collect()
}

#[test]
fn parse_when_literals_surround_group_then_regex_is_anchored_and_escaped() {
    let compiled = PatternEngine::new()
        .compile("item.{id:int}.json")
        .expect("pattern should compile");
    assert_eq!(compiled.regex(), "^item\\.(?P<g1>-?[0-9]+)\\.json$");
    assert_eq!(
        compiled.named_groups(),
        &[("g1".to_string(), "id".to_string())]
    );
}

#[test]
fn parse_when_group_is_followed_by_question_mark_then_it_is_wrapped() {
    assert_eq!(
        kinds("USER{id:int}-{role:str}?"),
        vec!["sequence", "literal", "group", "literal", "subsequence", "group"]
    );
}

#[test]
fn parse_when_subsequences_nest_then_tree_mirrors_nesting() {
    assert_eq!(
        kinds("{a:int}(-{b:int}(-{c:int}))"),
        vec![
            "sequence",
            "group",
            "subsequence",
            "literal",
            "group",
            "subsequence",
            "literal",
            "group"
        ]
    );
}

#[test]
fn parse_when_type_alias_is_used_then_canonical_name_is_recorded() {
    let engine = PatternEngine::new();
    let compiled = engine
        .compile("{a:integer}-{b:string}")
        .expect("aliases should resolve");
    assert_eq!(compiled.group_types()["a"], "int");
    assert_eq!(compiled.group_types()["b"], "str");

    match &compiled.dehydrate().ast {
        NodeRecord::Sequence { children, .. } => match &children[0] {
            NodeRecord::Group { type_name, .. } => assert_eq!(type_name, "int"),
            other => panic!("expected group record, got {other:?}"),
        },
        other => panic!("expected sequence record, got {other:?}"),
    }
}

#[test]
fn parse_when_constraint_value_is_quoted_then_commas_do_not_split() {
    let compiled = PatternEngine::new()
        .compile(r#"tag-{t:str(contains="a,b", maxLen=10)}"#)
        .expect("pattern should compile");
    let args = &compiled.group_constraints()["t"];
    assert_eq!(args.len(), 2);
    assert_eq!(args.get("contains"), Some(r#""a,b""#));
    assert_eq!(args.get("maxLen"), Some("10"));

    let result = compiled.match_input("tag-xa,by").expect("should match");
    assert!(!result.is_failed());
    let miss = compiled.match_input("tag-xyz").expect("regex still matches");
    assert!(miss.is_failed());
}

#[test]
fn parse_when_constraint_key_repeats_then_later_value_wins() {
    let compiled = PatternEngine::new()
        .compile("n{v:int(max=5, max=50)}")
        .expect("pattern should compile");
    assert_eq!(compiled.group_constraints()["v"].get("max"), Some("50"));
    assert!(compiled.match_input("n42").is_some());
}

#[test]
fn parse_when_many_groups_nest_then_ids_stay_unique() {
    let compiled = PatternEngine::new()
        .compile("{a:int}(-{b:int}(-{c:int}(-{d:int})))-x{e:int}")
        .expect("pattern should compile");
    let ids: Vec<&str> = compiled
        .named_groups()
        .iter()
        .map(|(id, _)| id.as_str())
        .collect();
    assert_eq!(ids, vec!["g1", "g2", "g3", "g4", "g5"]);
}

#[test]
fn counter_is_fresh_per_parse() {
    let counter = GroupCounter::new();
    assert_eq!(counter.next_group_id(), "g1");
    assert_eq!(counter.next_group_id(), "g2");
    assert_eq!(counter.count(), 2);

    let engine = PatternEngine::new();
    let first = engine.compile("{a:int}").expect("compiles");
    let second = engine.compile("{b:int}").expect("compiles");
    assert_eq!(first.named_groups()[0].0, "g1");
    assert_eq!(second.named_groups()[0].0, "g1");
}

#[test]
fn parse_when_group_is_unclosed_then_offset_points_at_brace() {
    let err = PatternEngine::new()
        .compile("PAGE{id:int")
        .expect_err("unclosed group");
    match err {
        EngineError::Pattern(PatternError::UnclosedGroup { pattern, index }) => {
            assert_eq!(pattern, "PAGE{id:int");
            assert_eq!(index, 4);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn parse_when_literal_is_non_ascii_then_it_is_matched_verbatim() {
    let ast = parse_pattern("日本-{id:int}", &TypeRegistry::with_defaults()).expect("parses");
    match ast.walk()[1].kind() {
        NodeKind::Literal(text) => assert_eq!(text, "日本-"),
        other => panic!("expected literal, got {other:?}"),
    }
    let compiled = PatternEngine::new().compile("日本-{id:int}").expect("compiles");
    assert_eq!(
        compiled.match_input("日本-7").and_then(|r| r.get("id").cloned()),
        Some(Value::Int(7))
    );
}
