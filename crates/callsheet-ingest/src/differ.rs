//! Scalar field diffing helpers.
//!
//! Entity classes list their diffable fields explicitly in
//! [`apply_fields`](crate::entity::Reconcilable::apply_fields); these helpers
//! keep the copy-if-different pattern to one line per field. Dates, integer
//! amounts and options all compare by value through [`copy_if_changed`];
//! strings go through the trimming variants because sources pad them
//! inconsistently.

/// Copies `source` into `target` when they differ. Returns whether it copied.
pub fn copy_if_changed<T: PartialEq + Clone>(target: &mut T, source: &T) -> bool {
    if *target == *source {
        false
    } else {
        target.clone_from(source);
        true
    }
}

/// Copies `source` into `target` after trimming surrounding whitespace.
pub fn copy_trimmed(target: &mut String, source: &str) -> bool {
    let trimmed = source.trim();
    if *target == trimmed {
        false
    } else {
        target.clear();
        target.push_str(trimmed);
        true
    }
}

/// Optional-string variant of [`copy_trimmed`]; blank values normalize to
/// `None`, and `None` vs. `Some` counts as a difference.
pub fn copy_trimmed_opt(target: &mut Option<String>, source: Option<&str>) -> bool {
    let normalized: Option<&str> = source.map(str::trim).filter(|s| !s.is_empty());
    if target.as_deref() == normalized {
        false
    } else {
        *target = normalized.map(String::from);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_if_changed() {
        let mut price = Some(1999_i64);
        assert!(!copy_if_changed(&mut price, &Some(1999)));
        assert!(copy_if_changed(&mut price, &Some(2499)));
        assert_eq!(price, Some(2499));
        assert!(copy_if_changed(&mut price, &None));
        assert_eq!(price, None);
    }

    #[test]
    fn test_copy_trimmed() {
        let mut title = String::from("Tin Can Brothers");
        assert!(!copy_trimmed(&mut title, "  Tin Can Brothers "));
        assert!(copy_trimmed(&mut title, "Tin Can Bros"));
        assert_eq!(title, "Tin Can Bros");
    }

    #[test]
    fn test_copy_trimmed_opt_normalizes_blank_to_none() {
        let mut bio = Some(String::from("hello"));
        assert!(copy_trimmed_opt(&mut bio, Some("   ")));
        assert_eq!(bio, None);
        assert!(!copy_trimmed_opt(&mut bio, None));
    }

    #[test]
    fn test_copy_trimmed_opt_presence_flip_is_a_change() {
        let mut bio: Option<String> = None;
        assert!(copy_trimmed_opt(&mut bio, Some(" writer ")));
        assert_eq!(bio.as_deref(), Some("writer"));
    }
}
