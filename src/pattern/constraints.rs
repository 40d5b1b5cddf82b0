use crate::types::ConstraintArgs;

/// Splits `a=1, b="x,y"` on commas outside double quotes. Backslash escapes the next byte.
pub(crate) fn split_constraint_list(list: &str) -> Vec<&str> {
    let bytes = list.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0usize;
    let mut in_quotes = false;
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'"' => in_quotes = !in_quotes,
            b',' if !in_quotes => {
                let part = list[start..i].trim();
                if !part.is_empty() {
                    parts.push(part);
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    let tail = list[start.min(list.len())..].trim();
    if !tail.is_empty() {
        parts.push(tail);
    }
    parts
}

/// Parses a constraint list into ordered arguments; `None` when a pair has no `=` or no key.
pub(crate) fn parse_constraint_list(list: &str) -> Option<ConstraintArgs> {
    let mut args = ConstraintArgs::new();
    for pair in split_constraint_list(list) {
        let (key, value) = pair.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        args.insert(key, value.trim());
    }
    Some(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commas_inside_quotes_do_not_split() {
        assert_eq!(
            split_constraint_list(r#"contains=",", default="a,b", min=1"#),
            vec![r#"contains=",""#, r#"default="a,b""#, "min=1"]
        );
    }

    #[test]
    fn escaped_quote_does_not_toggle() {
        assert_eq!(
            split_constraint_list(r#"default="say \"hi, you\"", maxLen=9"#),
            vec![r#"default="say \"hi, you\"""#, "maxLen=9"]
        );
    }

    #[test]
    fn pairs_keep_raw_values_and_overwrite_duplicates() {
        let args = parse_constraint_list("min=1, max=5, min=2").expect("well formed");
        assert_eq!(args.iter().collect::<Vec<_>>(), vec![("min", "2"), ("max", "5")]);

        let args = parse_constraint_list("min=").expect("empty value is syntactically fine");
        assert_eq!(args.get("min"), Some(""));
    }

    #[test]
    fn pair_without_equals_is_malformed() {
        assert!(parse_constraint_list("min").is_none());
        assert!(parse_constraint_list("=3").is_none());
    }
}
