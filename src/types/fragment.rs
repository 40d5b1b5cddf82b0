//! Small rewriting helpers over the regex fragments types emit.
//!
//! Fragments are always of the shape `<prefix><atom><repetition>`, e.g. `[^/]+` or
//! `-?[0-9]+`, so only the trailing repetition and the first negated class are
//! ever touched.

use regex::escape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Repetition {
    pub min: usize,
    pub max: Option<usize>,
    pub lazy: bool,
}

impl Repetition {
    fn render(&self) -> String {
        let mut out = match (self.min, self.max) {
            (1, None) => String::from("+"),
            (0, None) => String::from("*"),
            (0, Some(1)) => String::from("?"),
            (n, None) => format!("{{{n},}}"),
            (n, Some(m)) if n == m => format!("{{{n}}}"),
            (n, Some(m)) => format!("{{{n},{m}}}"),
        };
        if self.lazy {
            out.push('?');
        }
        out
    }

    fn is_fixed(&self) -> bool {
        self.max == Some(self.min)
    }
}

fn is_escaped(bytes: &[u8], idx: usize) -> bool {
    let mut count = 0usize;
    let mut i = idx;
    while i > 0 && bytes[i - 1] == b'\\' {
        count += 1;
        i -= 1;
    }
    count % 2 == 1
}

/// Splits the trailing repetition off `pattern`, if there is one.
pub(crate) fn split_repetition(pattern: &str) -> (&str, Option<Repetition>) {
    let bytes = pattern.as_bytes();
    let mut end = bytes.len();
    if end == 0 {
        return (pattern, None);
    }

    let mut lazy = false;
    if end >= 2
        && bytes[end - 1] == b'?'
        && matches!(bytes[end - 2], b'+' | b'*' | b'}' | b'?')
        && !is_escaped(bytes, end - 2)
    {
        lazy = true;
        end -= 1;
    }

    let last = end - 1;
    if is_escaped(bytes, last) {
        return (pattern, None);
    }

    let (start, min, max) = match bytes[last] {
        b'+' => (last, 1, None),
        b'*' => (last, 0, None),
        b'?' => (last, 0, Some(1)),
        b'}' => {
            let Some(open) = pattern[..last].rfind('{') else {
                return (pattern, None);
            };
            let body = &pattern[open + 1..last];
            let parsed = match body.split_once(',') {
                None => body.parse::<usize>().ok().map(|n| (n, Some(n))),
                Some((lo, "")) => lo.parse::<usize>().ok().map(|n| (n, None)),
                Some((lo, hi)) => match (lo.parse::<usize>(), hi.parse::<usize>()) {
                    (Ok(lo), Ok(hi)) => Some((lo, Some(hi))),
                    _ => None,
                },
            };
            match parsed {
                Some((lo, hi)) => (open, lo, hi),
                None => return (pattern, None),
            }
        }
        _ => return (pattern, None),
    };

    (&pattern[..start], Some(Repetition { min, max, lazy }))
}

/// Narrows the trailing repetition to `min..=max`; fragments without one are returned as-is.
pub(crate) fn bound_repetition(pattern: &str, min: Option<usize>, max: Option<usize>) -> String {
    let (atom, rep) = split_repetition(pattern);
    let Some(mut rep) = rep else {
        return pattern.to_string();
    };

    if let Some(min) = min {
        rep.min = rep.min.max(min);
    }
    if let Some(max) = max {
        rep.max = Some(rep.max.map_or(max, |current| current.min(max)));
    }
    if let Some(max) = rep.max
        && max < rep.min
    {
        rep.min = max;
    }

    format!("{atom}{}", rep.render())
}

/// Makes the trailing repetition lazy so the capture stops as early as the remainder allows.
pub(crate) fn make_lazy(pattern: &str) -> String {
    let (atom, rep) = split_repetition(pattern);
    match rep {
        Some(mut rep) if !rep.lazy && !rep.is_fixed() => {
            rep.lazy = true;
            format!("{atom}{}", rep.render())
        }
        _ => pattern.to_string(),
    }
}

/// Adds `ch` to the first negated character class of `pattern`.
pub(crate) fn exclude_from_class(pattern: &str, ch: char) -> String {
    let bytes = pattern.as_bytes();
    let mut open = None;
    let mut i = 0usize;
    while i + 1 < bytes.len() {
        if bytes[i] == b'[' && bytes[i + 1] == b'^' && !is_escaped(bytes, i) {
            open = Some(i);
            break;
        }
        i += 1;
    }
    let Some(open) = open else {
        return pattern.to_string();
    };

    let mut close = None;
    let mut j = open + 2;
    while j < bytes.len() {
        if bytes[j] == b']' && !is_escaped(bytes, j) {
            close = Some(j);
            break;
        }
        j += 1;
    }
    let Some(close) = close else {
        return pattern.to_string();
    };

    let class = &pattern[open + 2..close];
    let escaped = escape(ch.encode_utf8(&mut [0u8; 4]));
    if class.contains(escaped.as_str()) {
        return pattern.to_string();
    }

    let mut out = String::with_capacity(pattern.len() + escaped.len());
    out.push_str(&pattern[..close]);
    out.push_str(&escaped);
    out.push_str(&pattern[close..]);
    out
}

/// Number of decimal digits in `value`, ignoring the sign.
pub(crate) fn decimal_digits(value: i64) -> usize {
    let mut n = value.unsigned_abs();
    let mut digits = 1usize;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

/// Strips surrounding double quotes and resolves `\"` / `\\`.
pub(crate) fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    let inner = if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\')) => out.push(next),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
