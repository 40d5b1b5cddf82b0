use super::bytes::ByteSet;
use crate::types::{PatternType, Value};
use hashbrown::HashMap as FastHashMap;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

const NUMERIC_PROBES: [&str; 4] = ["123", "456", "999", "1000"];
const NEGATIVE_PROBES: [&str; 4] = ["-100", "-1", "-123", "-999"];
const DECIMAL_PROBES: [&str; 3] = ["1.0", "3.14", "0.5"];
const NON_ASCII_PROBES: [&str; 3] = ["é", "日本", "ß"];
const CHAR_SETS: [&str; 5] = [
    "0123456789",
    "abcdefghijklmnopqrstuvwxyz",
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "!@#$%^&*()_+-=[]{}|;:,.<>?/\\'\"`~",
    " \t\n\r",
];

/// What probing learned about one type instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeProbe {
    pub allowed: ByteSet,
    pub can_be_empty: bool,
    /// Nothing was accepted, so nothing can be ruled out.
    pub opaque: bool,
}

struct CacheEntry {
    ty: Weak<dyn PatternType>,
    probe: Arc<TypeProbe>,
}

/// Discovers accepted characters by feeding candidates to `parse_value`.
/// Results are cached per type instance.
#[derive(Default)]
pub struct TypeProber {
    cache: RwLock<FastHashMap<usize, CacheEntry>>,
}

impl std::fmt::Debug for TypeProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeProber")
            .field("cached", &self.cache.read().len())
            .finish()
    }
}

fn accepts(ty: &dyn PatternType, candidate: &str) -> bool {
    ty.parse_value(Some(&Value::Str(candidate.to_string()))).is_ok()
}

fn identity(ty: &Arc<dyn PatternType>) -> usize {
    Arc::as_ptr(ty) as *const () as usize
}

impl TypeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self, ty: &Arc<dyn PatternType>) -> Arc<TypeProbe> {
        let key = identity(ty);
        if let Some(entry) = self.cache.read().get(&key)
            && entry.ty.upgrade().is_some_and(|live| Arc::ptr_eq(&live, ty))
        {
            return Arc::clone(&entry.probe);
        }

        let probe = Arc::new(analyze_type(ty.as_ref()));
        let mut cache = self.cache.write();
        // drop entries whose type is gone so a reused address cannot hit
        cache.retain(|_, entry| entry.ty.strong_count() > 0);
        cache.insert(
            key,
            CacheEntry {
                ty: Arc::downgrade(ty),
                probe: Arc::clone(&probe),
            },
        );
        probe
    }

    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }
}

#[tracing::instrument(level = "trace", skip(ty), fields(type_name = ty.name()))]
fn analyze_type(ty: &dyn PatternType) -> TypeProbe {
    let mut allowed = ByteSet::new();
    let mut tested = ByteSet::new();
    let mut anchor: Option<String> = None;

    let numeric = NUMERIC_PROBES.iter().find(|probe| accepts(ty, probe));
    if let Some(sample) = numeric {
        allowed.insert_range(b'0'..=b'9');
        tested.insert_range(b'0'..=b'9');
        anchor = Some((*sample).to_string());
    }

    for (idx, set) in CHAR_SETS.iter().enumerate() {
        if idx == 0 && numeric.is_some() {
            continue;
        }
        if accepts(ty, set) {
            allowed.insert_all(set.as_bytes());
            tested.insert_all(set.as_bytes());
            anchor.get_or_insert_with(|| (*set).to_string());
            continue;
        }
        for &b in set.as_bytes() {
            if tested.contains(b) || allowed.contains(b) {
                continue;
            }
            let single = (b as char).to_string();
            if accepts(ty, &single) {
                allowed.insert(b);
                anchor.get_or_insert(single);
            }
            tested.insert(b);
        }
    }

    // every remaining ASCII byte, control characters and DEL included
    for b in 0u8..0x80 {
        if tested.contains(b) || allowed.contains(b) {
            continue;
        }
        let single = (b as char).to_string();
        if accepts(ty, &single) {
            allowed.insert(b);
            anchor.get_or_insert(single);
        }
    }

    if NEGATIVE_PROBES.iter().any(|probe| accepts(ty, probe)) {
        allowed.insert(b'-');
    }
    if DECIMAL_PROBES.iter().any(|probe| accepts(ty, probe)) {
        allowed.insert(b'.');
    }

    // Seeds from the declared default and constraint arguments reach types that
    // reject every short probe (prefix or substring requirements).
    if anchor.is_none() {
        anchor = seed_candidates(ty).into_iter().find(|seed| accepts(ty, seed));
    }

    if let Some(anchor) = anchor.as_deref() {
        allowed.insert_all(anchor.as_bytes());
        for b in 0u8..0x80 {
            if allowed.contains(b) {
                continue;
            }
            let c = b as char;
            if accepts(ty, &format!("{anchor}{c}")) || accepts(ty, &format!("{c}{anchor}")) {
                allowed.insert(b);
            }
        }
        let non_ascii = NON_ASCII_PROBES.iter().any(|probe| {
            accepts(ty, probe)
                || accepts(ty, &format!("{anchor}{probe}"))
                || accepts(ty, &format!("{probe}{anchor}"))
        });
        if non_ascii {
            allowed.insert_range(0x80..=0xFF);
        }
    }

    let can_be_empty = accepts(ty, "");
    let opaque = allowed.is_empty();
    if opaque {
        allowed = ByteSet::full();
    }

    tracing::event!(
        tracing::Level::TRACE,
        operation = "probe_type",
        allowed = allowed.len(),
        can_be_empty,
        opaque
    );
    TypeProbe {
        allowed,
        can_be_empty,
        opaque,
    }
}

fn seed_candidates(ty: &dyn PatternType) -> Vec<String> {
    let mut seeds = Vec::new();
    if let Some(Ok(default)) = ty.default_value() {
        seeds.push(default.to_string());
    }
    let values: Vec<String> = ty
        .constraint_arguments()
        .iter()
        .map(|(_, raw)| crate::types::fragment::unquote(raw))
        .filter(|v| !v.is_empty())
        .collect();
    seeds.extend(values.iter().cloned());
    if values.len() > 1 {
        seeds.push(values.concat());
    }
    seeds
}
