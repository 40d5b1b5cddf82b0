mod analyzer;
mod bytes;
mod probe;

pub use analyzer::AnalyzerResult;
pub use bytes::ByteSet;
pub use probe::{TypeProbe, TypeProber};

use crate::compiler::CompiledPattern;
use crate::options::EngineOptions;
use analyzer::NodeAnalyzer;
use memchr::memmem::Finder;
use serde::{Deserialize, Serialize};

/// Per-pattern part of a heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicSummary {
    pub min_len: usize,
    pub max_len: usize,
    pub required_literals: Vec<String>,
    pub allowed: ByteSet,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

/// Persisted form of a [`PatternHeuristic`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeuristicRecord {
    pub min_len: usize,
    pub max_len: usize,
    pub allowed: ByteSet,
    pub patterns: Vec<HeuristicSummary>,
}

#[derive(Debug, Clone)]
struct PreparedSummary {
    summary: HeuristicSummary,
    finders: Vec<Finder<'static>>,
}

impl PreparedSummary {
    fn new(summary: HeuristicSummary) -> Self {
        let finders = summary
            .required_literals
            .iter()
            .map(|lit| Finder::new(lit.as_bytes()).into_owned())
            .collect();
        Self { summary, finders }
    }

    fn supports(&self, candidate: &[u8]) -> bool {
        let s = &self.summary;
        if candidate.len() < s.min_len || candidate.len() > s.max_len {
            return false;
        }
        if let Some(prefix) = &s.prefix
            && !candidate.starts_with(prefix.as_bytes())
        {
            return false;
        }
        if let Some(suffix) = &s.suffix
            && !candidate.ends_with(suffix.as_bytes())
        {
            return false;
        }
        self.finders.iter().all(|f| f.find(candidate).is_some()) && s.allowed.contains_all(candidate)
    }
}

/// Fast-reject predicate over a set of compiled patterns. `false` means no pattern can match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "HeuristicRecord", into = "HeuristicRecord")]
pub struct PatternHeuristic {
    min_len: usize,
    max_len: usize,
    allowed: ByteSet,
    patterns: Vec<PreparedSummary>,
}

impl PatternHeuristic {
    fn from_summaries(summaries: Vec<HeuristicSummary>) -> Self {
        let mut allowed = ByteSet::new();
        for summary in &summaries {
            allowed.union_with(&summary.allowed);
        }
        Self {
            min_len: summaries.iter().map(|s| s.min_len).min().unwrap_or(0),
            max_len: summaries.iter().map(|s| s.max_len).max().unwrap_or(0),
            allowed,
            patterns: summaries.into_iter().map(PreparedSummary::new).collect(),
        }
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn allowed(&self) -> &ByteSet {
        &self.allowed
    }

    pub fn summaries(&self) -> impl Iterator<Item = &HeuristicSummary> {
        self.patterns.iter().map(|p| &p.summary)
    }

    /// `false` means no compiled pattern can match `candidate`.
    ///
    /// Length bounds assume each unbounded group captures at most
    /// `heuristic_group_max_len` bytes, and the pattern total is capped at
    /// `heuristic_max_len_limit`. An input whose group values are longer is
    /// rejected here even though the regex would match it, so raise those
    /// options when such values are expected.
    pub fn support(&self, candidate: &str) -> bool {
        let bytes = candidate.as_bytes();
        if bytes.is_empty() || bytes.len() < self.min_len || bytes.len() > self.max_len {
            return false;
        }
        if !self.allowed.contains_all(bytes) {
            return false;
        }
        self.patterns.iter().any(|p| p.supports(bytes))
    }
}

impl From<HeuristicRecord> for PatternHeuristic {
    fn from(record: HeuristicRecord) -> Self {
        Self {
            min_len: record.min_len,
            max_len: record.max_len,
            allowed: record.allowed,
            patterns: record.patterns.into_iter().map(PreparedSummary::new).collect(),
        }
    }
}

impl From<PatternHeuristic> for HeuristicRecord {
    fn from(heuristic: PatternHeuristic) -> Self {
        Self {
            min_len: heuristic.min_len,
            max_len: heuristic.max_len,
            allowed: heuristic.allowed,
            patterns: heuristic.patterns.into_iter().map(|p| p.summary).collect(),
        }
    }
}

/// Builds, persists and restores heuristics. Holds the type-probe cache.
#[derive(Debug)]
pub struct HeuristicCompiler {
    prober: TypeProber,
    group_max_len: usize,
    max_len_limit: usize,
}

impl Default for HeuristicCompiler {
    fn default() -> Self {
        Self::new(&EngineOptions::default())
    }
}

impl HeuristicCompiler {
    pub fn new(options: &EngineOptions) -> Self {
        Self {
            prober: TypeProber::new(),
            group_max_len: options.heuristic_group_max_len,
            max_len_limit: options.heuristic_max_len_limit,
        }
    }

    #[tracing::instrument(level = "trace", skip(self, patterns))]
    pub fn compile<'p, I>(&self, patterns: I) -> PatternHeuristic
    where
        I: IntoIterator<Item = &'p CompiledPattern>,
    {
        let analyzer = NodeAnalyzer::new(&self.prober, self.group_max_len);
        let summaries: Vec<HeuristicSummary> = patterns
            .into_iter()
            .map(|pattern| {
                let result = analyzer.analyze(pattern.ast().root());
                HeuristicSummary {
                    min_len: result.min_len,
                    max_len: result.max_len.min(self.max_len_limit),
                    required_literals: result.required_literals().map(str::to_string).collect(),
                    allowed: result.allowed,
                    prefix: result.prefix,
                    suffix: result.suffix,
                }
            })
            .collect();

        tracing::event!(
            tracing::Level::DEBUG,
            operation = "compile_heuristic",
            patterns = summaries.len(),
            cached_types = self.prober.cached()
        );
        PatternHeuristic::from_summaries(summaries)
    }

    pub fn dehydrate(&self, heuristic: &PatternHeuristic) -> HeuristicRecord {
        heuristic.clone().into()
    }

    pub fn hydrate(&self, record: &HeuristicRecord) -> PatternHeuristic {
        record.clone().into()
    }

    pub fn prober(&self) -> &TypeProber {
        &self.prober
    }

    pub fn clear_cache(&self) {
        self.prober.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse_pattern;
    use crate::types::TypeRegistry;

    fn compile_all(patterns: &[&str]) -> Vec<CompiledPattern> {
        let registry = TypeRegistry::with_defaults();
        patterns
            .iter()
            .map(|p| {
                let ast = parse_pattern(p, &registry).expect("parses");
                CompiledPattern::create(p, ast).expect("compiles")
            })
            .collect()
    }

    #[test]
    fn rejects_inputs_no_pattern_can_match() {
        let compiled = compile_all(&["PAGE{uid:int}", "ARTICLE{id:int}"]);
        let heuristic = HeuristicCompiler::default().compile(&compiled);

        assert!(!heuristic.support(""));
        assert!(!heuristic.support("P"));
        assert!(heuristic.support("PAGE1"));
        assert!(heuristic.support("ARTICLE-42"));
        assert!(!heuristic.support("\x00\x01\x02"));
        assert!(!heuristic.support(&format!("PAGE{}", "1".repeat(5000))));
        assert!(!heuristic.support("page123"));
        assert!(!heuristic.support("PAG123"));
        assert!(!heuristic.support("PAGE123$%^"));
    }

    #[test]
    fn optional_parts_do_not_raise_the_minimum() {
        let compiled = compile_all(&["USER({name:str}-{age:int})"]);
        let heuristic = HeuristicCompiler::default().compile(&compiled);
        assert_eq!(heuristic.min_len(), 4);
        assert!(heuristic.support("USER"));
        assert!(heuristic.support("USERjohn-25"));
        assert!(!heuristic.support("USE"));
    }

    #[test]
    fn empty_pattern_set_supports_nothing() {
        let heuristic = HeuristicCompiler::default().compile(std::iter::empty());
        assert!(!heuristic.support("anything"));
    }

    #[test]
    fn max_len_is_capped_by_the_limit() {
        let options = EngineOptions {
            heuristic_group_max_len: 1000,
            heuristic_max_len_limit: 1500,
            ..EngineOptions::default()
        };
        let compiled = compile_all(&["{a:str}-{b:str}"]);
        let heuristic = HeuristicCompiler::new(&options).compile(&compiled);
        assert_eq!(heuristic.max_len(), 1500);
    }

    #[test]
    fn hydrated_heuristic_gives_the_same_answers() {
        let compiler = HeuristicCompiler::default();
        let compiled = compile_all(&["PAGE{uid:int}", "ARTICLE{id:int}"]);
        let heuristic = compiler.compile(&compiled);
        let record = compiler.dehydrate(&heuristic);
        let restored = compiler.hydrate(&record);

        assert_eq!(compiler.dehydrate(&restored), record);
        for input in ["PAGE1", "PAG123", "ARTICLE7", "page1"] {
            assert_eq!(restored.support(input), heuristic.support(input), "{input}");
        }
    }
}
