use super::constraints::parse_constraint_list;
use super::counter::GroupCounter;
use super::error::{ParseResult, PatternError};
use crate::ast::{Ast, AstBuilder, Children, GroupNode, NodeId};
use crate::types::TypeRegistry;
use smallvec::smallvec;

/// Parses DSL text into a complete tree. Types are instantiated from `registry`.
#[tracing::instrument(level = "trace", skip(registry), fields(pattern_len = pattern.len()))]
pub fn parse_pattern(pattern: &str, registry: &TypeRegistry) -> ParseResult<Ast> {
    let counter = GroupCounter::new();
    let mut builder = AstBuilder::new();
    let mut parser = PatternParser::new(pattern, 0, pattern.len(), &counter, registry);
    let children = parser.parse_children(&mut builder)?;
    let root = builder.sequence(children)?;
    let ast = builder.finish(root)?;

    tracing::event!(
        tracing::Level::TRACE,
        operation = "parse_pattern",
        nodes = ast.len(),
        groups = counter.count()
    );
    Ok(ast)
}

/// Parser over the window `start..end` of the full pattern text.
struct PatternParser<'p> {
    pattern: &'p str,
    bytes: &'p [u8],
    end: usize,
    pos: usize,
    counter: &'p GroupCounter,
    registry: &'p TypeRegistry,
}

impl<'p> PatternParser<'p> {
    fn new(
        pattern: &'p str,
        start: usize,
        end: usize,
        counter: &'p GroupCounter,
        registry: &'p TypeRegistry,
    ) -> Self {
        Self {
            pattern,
            bytes: pattern.as_bytes(),
            end,
            pos: start,
            counter,
            registry,
        }
    }

    fn parse_children(&mut self, builder: &mut AstBuilder) -> ParseResult<Children> {
        let mut children = Children::new();
        while let Some(byte) = self.peek() {
            let id = match byte {
                b'{' => self.parse_group(builder)?,
                b'(' => self.parse_sub_sequence(builder)?,
                _ => self.parse_literal(builder)?,
            };
            children.push(id);
        }
        Ok(children)
    }

    fn parse_literal(&mut self, builder: &mut AstBuilder) -> ParseResult<NodeId> {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte == b'{' || byte == b'(' {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(PatternError::EmptyLiteral {
                pattern: self.pattern.to_string(),
                index: start,
            }
            .into());
        }
        Ok(builder.literal(&self.pattern[start..self.pos]))
    }

    fn parse_group(&mut self, builder: &mut AstBuilder) -> ParseResult<NodeId> {
        let start = self.pos;
        let close = self
            .find_group_end(start)
            .ok_or_else(|| PatternError::UnclosedGroup {
                pattern: self.pattern.to_string(),
                index: start,
            })?;
        let pattern = self.pattern;
        let content = &pattern[start + 1..close];
        self.pos = close + 1;

        let (name, type_name, constraints) = self.split_group(content, start)?;
        let args = match constraints {
            Some(list) => parse_constraint_list(list).ok_or_else(|| self.invalid_group(content, start))?,
            None => Default::default(),
        };
        let ty = self.registry.create(type_name, &args)?;
        let group = builder.group(GroupNode::new(name, self.counter.next_group_id(), ty));

        // {name:type}? is shorthand for ({name:type})
        if self.peek() == Some(b'?') {
            self.pos += 1;
            return Ok(builder.sub_sequence(smallvec![group])?);
        }
        Ok(group)
    }

    /// `name:type` with an optional trailing `(constraints)`.
    fn split_group<'c>(
        &self,
        content: &'c str,
        start: usize,
    ) -> ParseResult<(&'c str, &'c str, Option<&'c str>)> {
        let (name, rest) = content
            .split_once(':')
            .ok_or_else(|| self.invalid_group(content, start))?;

        let mut name_bytes = name.bytes();
        let valid_name = name_bytes
            .next()
            .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
            && name_bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_');
        if !valid_name {
            return Err(PatternError::InvalidGroupName {
                pattern: self.pattern.to_string(),
                index: start,
                name: name.to_string(),
            }
            .into());
        }

        let mut type_bytes = rest.bytes();
        let type_len = match type_bytes.next() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                1 + type_bytes
                    .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
                    .count()
            }
            _ => 0,
        };
        if type_len == 0 {
            return Err(self.invalid_group(content, start));
        }
        let (type_name, tail) = rest.split_at(type_len);

        if tail.is_empty() {
            return Ok((name, type_name, None));
        }
        match tail.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            Some(list) if !list.trim().is_empty() => Ok((name, type_name, Some(list))),
            _ => Err(self.invalid_group(content, start)),
        }
    }

    fn parse_sub_sequence(&mut self, builder: &mut AstBuilder) -> ParseResult<NodeId> {
        let start = self.pos;
        let close = self.find_sub_sequence_end(start)?;

        let mut inner = PatternParser::new(self.pattern, start + 1, close, self.counter, self.registry);
        let children = inner.parse_children(builder)?;
        self.pos = close + 1;
        Ok(builder.sub_sequence(children)?)
    }

    /// Index of the `}` closing the group opened at `open`; quotes and escapes are skipped.
    fn find_group_end(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut in_quotes = false;
        let mut i = open;
        while i < self.end {
            match self.bytes[i] {
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'"' => in_quotes = !in_quotes,
                b'{' if !in_quotes => depth += 1,
                b'}' if !in_quotes => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        None
    }

    /// Index of the `)` closing the subsequence opened at `open`; group bodies are skipped whole.
    fn find_sub_sequence_end(&self, open: usize) -> ParseResult<usize> {
        let mut depth = 0usize;
        let mut i = open;
        while i < self.end {
            match self.bytes[i] {
                b'{' => {
                    i = self
                        .find_group_end(i)
                        .ok_or_else(|| PatternError::UnclosedGroup {
                            pattern: self.pattern.to_string(),
                            index: i,
                        })?;
                }
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        Err(PatternError::UnclosedSubSequence {
            pattern: self.pattern.to_string(),
            index: open,
        }
        .into())
    }

    fn invalid_group(&self, content: &str, start: usize) -> super::error::ParseError {
        PatternError::InvalidGroupSyntax {
            pattern: self.pattern.to_string(),
            index: start,
            content: content.to_string(),
        }
        .into()
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        (self.pos < self.end).then(|| self.bytes[self.pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{NodeKind, NodeOps};
    use crate::pattern::ParseError;
    use crate::types::TypeSystemError;

    fn parse(pattern: &str) -> ParseResult<Ast> {
        parse_pattern(pattern, &TypeRegistry::with_defaults())
    }

    fn kinds(ast: &Ast) -> Vec<&'static str> {
        ast.walk().iter().map(|n| n.kind().tag()).collect()
    }

    #[test]
    fn literal_group_literal() {
        let ast = parse("PAGE{id:int}.html").expect("valid pattern");
        assert_eq!(kinds(&ast), vec!["sequence", "literal", "group", "literal"]);
        assert_eq!(ast.regex(), "PAGE(?P<g1>-?[0-9]+)\\.html");
    }

    #[test]
    fn question_mark_wraps_group_in_subsequence() {
        let ast = parse("USER{id:int}-{role:str}?").expect("valid pattern");
        assert_eq!(
            kinds(&ast),
            vec!["sequence", "literal", "group", "literal", "subsequence", "group"]
        );
    }

    #[test]
    fn group_ids_continue_across_nesting() {
        let ast = parse("{a:int}(-{b:int}(-{c:int}))-{d:int}").expect("valid pattern");
        let ids: Vec<_> = ast.groups().iter().map(|(_, g)| g.group_id().to_string()).collect();
        assert_eq!(ids, vec!["g1", "g2", "g3", "g4"]);
    }

    #[test]
    fn constraint_values_may_hold_braces_and_parens() {
        let ast = parse(r#"A({v:str(default="x)}{", maxLen=9)})"#).expect("valid pattern");
        let (_, group) = ast.groups()[0];
        assert_eq!(
            group.pattern_type().constraint_arguments().get("default"),
            Some(r#""x)}{""#)
        );
    }

    #[test]
    fn unclosed_delimiters_report_offsets() {
        match parse("AB{id:int") {
            Err(ParseError::Syntax(PatternError::UnclosedGroup { index, .. })) => assert_eq!(index, 2),
            other => panic!("unexpected result: {other:?}"),
        }
        match parse("A(-{id:int}") {
            Err(ParseError::Syntax(PatternError::UnclosedSubSequence { index, .. })) => {
                assert_eq!(index, 1)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn malformed_groups_are_rejected() {
        for pattern in ["{id}", "{id:}", "{id:int()}", "{id:int(min)}", "{a:{b:int}}", "{id:int(min=1)x}"] {
            match parse(pattern) {
                Err(ParseError::Syntax(PatternError::InvalidGroupSyntax { .. })) => {}
                other => panic!("{pattern}: unexpected result: {other:?}"),
            }
        }
        match parse("{1name:int}") {
            Err(ParseError::Syntax(PatternError::InvalidGroupName { name, .. })) => assert_eq!(name, "1name"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_a_type_system_error() {
        assert!(matches!(parse("{x:bogus}"), Err(ParseError::TypeSystem(_))));
        for pattern in ["{x:uuid4}", "{x:short_id}", "{x:_v2(min=1)}"] {
            match parse(pattern) {
                Err(ParseError::TypeSystem(TypeSystemError::UnknownType { .. })) => {}
                other => panic!("{pattern}: unexpected result: {other:?}"),
            }
        }
        assert!(matches!(
            parse("{x:4int}"),
            Err(ParseError::Syntax(PatternError::InvalidGroupSyntax { .. }))
        ));
    }

    #[test]
    fn empty_subsequence_parses() {
        let ast = parse("PAGE()").expect("rejected later by validation");
        let sub = ast.walk()[2];
        assert!(matches!(sub.kind(), NodeKind::SubSequence(s) if s.children().is_empty()));
        assert!(sub.validate_tree_context().is_err());
    }

    #[test]
    fn unicode_literals_are_kept_whole() {
        let ast = parse("Straße-{id:int}").expect("valid pattern");
        assert_eq!(ast.walk()[1].first_boundary(), Some("Straße-"));
    }
}
