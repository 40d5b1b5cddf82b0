use super::bytes::ByteSet;
use super::probe::TypeProber;
use crate::ast::{NodeKind, NodeRef};

/// Structural summary of one node and its subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzerResult {
    pub min_len: usize,
    pub max_len: usize,
    /// Literal texts with a required flag, in first-seen order.
    pub literals: Vec<(String, bool)>,
    pub allowed: ByteSet,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl AnalyzerResult {
    fn merge_literal(&mut self, text: &str, required: bool) {
        match self.literals.iter_mut().find(|(existing, _)| existing == text) {
            Some(entry) => entry.1 |= required,
            None => self.literals.push((text.to_string(), required)),
        }
    }

    pub fn required_literals(&self) -> impl Iterator<Item = &str> {
        self.literals
            .iter()
            .filter(|(_, required)| *required)
            .map(|(text, _)| text.as_str())
    }
}

pub(crate) struct NodeAnalyzer<'c> {
    prober: &'c TypeProber,
    group_max_len: usize,
}

impl<'c> NodeAnalyzer<'c> {
    pub(crate) fn new(prober: &'c TypeProber, group_max_len: usize) -> Self {
        Self {
            prober,
            group_max_len,
        }
    }

    pub(crate) fn analyze(&self, node: NodeRef<'_>) -> AnalyzerResult {
        match node.kind() {
            NodeKind::Literal(text) => {
                let optional = node.is_optional();
                let mut allowed = ByteSet::new();
                allowed.insert_all(text.as_bytes());
                AnalyzerResult {
                    min_len: if optional { 0 } else { text.len() },
                    max_len: text.len(),
                    literals: vec![(text.clone(), !optional)],
                    allowed,
                    prefix: Some(text.clone()),
                    suffix: Some(text.clone()),
                }
            }
            NodeKind::Group(group) => {
                let probe = self.prober.probe(group.pattern_type());
                let min_len = if node.is_optional() || probe.can_be_empty {
                    0
                } else {
                    1
                };
                AnalyzerResult {
                    min_len,
                    max_len: self.group_max_len,
                    literals: Vec::new(),
                    allowed: probe.allowed,
                    prefix: None,
                    suffix: None,
                }
            }
            NodeKind::Sequence(_) | NodeKind::SubSequence(_) => self.analyze_tree(node),
        }
    }

    fn analyze_tree(&self, node: NodeRef<'_>) -> AnalyzerResult {
        let optional = matches!(node.kind(), NodeKind::SubSequence(_));
        let children: Vec<AnalyzerResult> = node.children().map(|c| self.analyze(c)).collect();

        let mut result = AnalyzerResult::default();
        let last = children.len().saturating_sub(1);
        for (i, child) in children.iter().enumerate() {
            result.min_len = result.min_len.saturating_add(child.min_len);
            result.max_len = result.max_len.saturating_add(child.max_len);
            result.allowed.union_with(&child.allowed);
            for (text, required) in &child.literals {
                result.merge_literal(text, *required && !optional);
            }
            // only a child that is always present pins the edges
            if i == 0 && child.min_len > 0 {
                result.prefix = child.prefix.clone();
            }
            if i == last && child.min_len > 0 {
                result.suffix = child.suffix.clone();
            }
        }

        if optional {
            result.min_len = 0;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse_pattern;
    use crate::types::TypeRegistry;

    fn analyze(pattern: &str) -> AnalyzerResult {
        let ast = parse_pattern(pattern, &TypeRegistry::with_defaults()).expect("parses");
        let prober = TypeProber::new();
        NodeAnalyzer::new(&prober, 1000).analyze(ast.root())
    }

    #[test]
    fn literal_and_group_lengths_add_up() {
        let result = analyze("PAGE{id:int}");
        assert_eq!(result.min_len, 5);
        assert_eq!(result.max_len, 1004);
        assert_eq!(result.prefix.as_deref(), Some("PAGE"));
        assert_eq!(result.suffix, None);
        assert_eq!(result.required_literals().collect::<Vec<_>>(), vec!["PAGE"]);
    }

    #[test]
    fn subsequence_contributes_only_to_max() {
        let result = analyze("X(-{a:int}-{b:int})");
        assert_eq!(result.min_len, 1);
        assert_eq!(result.max_len, 1 + 1 + 1000 + 1 + 1000);
        assert_eq!(result.literals, vec![("X".to_string(), true), ("-".to_string(), false)]);
        assert_eq!(result.suffix, None);
    }

    #[test]
    fn literal_seen_required_anywhere_stays_required() {
        let result = analyze("{a:int}-{b:int}(-{c:int})");
        assert_eq!(result.literals, vec![("-".to_string(), true)]);
    }
}
