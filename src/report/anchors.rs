//! Sheet names used as cross-reference anchors in the exported workbook
//!
//! Feature names are only shortened here, at the export boundary. The
//! in-memory feature tables stay keyed by the full column name.

use std::collections::HashSet;

/// Longest sheet name accepted by spreadsheet applications
pub const SHEET_NAME_LIMIT: usize = 31;

const FORBIDDEN: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Assign a unique sheet anchor to every feature, in the given order.
///
/// Names are sanitized and truncated to `limit` characters. When two
/// features collide after truncation (case-insensitively), or a feature
/// collides with a `reserved` name, the later one gets a `~N` suffix.
pub fn assign_anchors<'a, I>(features: I, limit: usize, reserved: &[&str]) -> Vec<(String, String)>
where
    I: IntoIterator<Item = &'a str>,
{
    let limit = limit.max(3);
    let mut used: HashSet<String> = reserved.iter().map(|r| r.to_lowercase()).collect();

    features
        .into_iter()
        .map(|feature| {
            let base = truncate_chars(&sanitize(feature), limit);
            let mut anchor = base.clone();
            let mut n = 1;
            while used.contains(&anchor.to_lowercase()) {
                let suffix = format!("~{}", n);
                let room = limit.saturating_sub(suffix.chars().count());
                anchor = format!("{}{}", truncate_chars(&base, room), suffix);
                n += 1;
            }

            if anchor != base {
                log::warn!(
                    "Sheet name for '{}' collides after truncation, using '{}'",
                    feature,
                    anchor
                );
            }

            used.insert(anchor.to_lowercase());
            (feature.to_string(), anchor)
        })
        .collect()
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('\'').to_string();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_names_unchanged() {
        let anchors = assign_anchors(["age", "income"], SHEET_NAME_LIMIT, &["Summary"]);
        assert_eq!(anchors[0].1, "age");
        assert_eq!(anchors[1].1, "income");
    }

    #[test]
    fn test_truncation_collision_gets_suffix() {
        let a = "customer_account_balance_average_q1";
        let b = "customer_account_balance_average_q2";
        let anchors = assign_anchors([a, b], SHEET_NAME_LIMIT, &[]);

        assert_eq!(anchors[0].1, "customer_account_balance_averag");
        assert_eq!(anchors[1].1, "customer_account_balance_aver~1");
        assert!(anchors.iter().all(|(_, s)| s.chars().count() <= SHEET_NAME_LIMIT));
        assert_eq!(anchors[0].0, a);
        assert_eq!(anchors[1].0, b);
    }

    #[test]
    fn test_reserved_name_is_avoided() {
        let anchors = assign_anchors(["summary"], SHEET_NAME_LIMIT, &["Summary"]);
        assert_eq!(anchors[0].1, "summary~1");
    }

    #[test]
    fn test_forbidden_characters_replaced() {
        let anchors = assign_anchors(["a/b:c"], SHEET_NAME_LIMIT, &[]);
        assert_eq!(anchors[0].1, "a_b_c");
    }
}
