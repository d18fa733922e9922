use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Locale-aware string comparison settings produced by `collator`.
///
/// Strings are decomposed to NFD. The base level ignores combining marks and
/// case, and orders whitespace and punctuation before digits before letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collator {
    pub case_sensitive: bool,
    pub diacritic_sensitive: bool,
    pub locale: Option<String>,
}

impl Collator {
    pub fn new(case_sensitive: bool, diacritic_sensitive: bool, locale: Option<String>) -> Self {
        Collator {
            case_sensitive,
            diacritic_sensitive,
            locale,
        }
    }

    /// Compares level by level: base letters first, then accents when
    /// diacritic-sensitive, then case when case-sensitive.
    pub fn compare(&self, lhs: &str, rhs: &str) -> Ordering {
        let primary = compare_primary(&base_letters(lhs), &base_letters(rhs));
        if primary != Ordering::Equal {
            return primary;
        }
        if self.diacritic_sensitive {
            let secondary = lowercase_nfd(lhs).cmp(&lowercase_nfd(rhs));
            if secondary != Ordering::Equal {
                return secondary;
            }
        }
        if self.case_sensitive {
            return compare_case(&self.cased(lhs), &self.cased(rhs));
        }
        Ordering::Equal
    }

    fn cased(&self, s: &str) -> Vec<char> {
        if self.diacritic_sensitive {
            s.nfd().collect()
        } else {
            s.nfd().filter(|c| !is_combining_mark(*c)).collect()
        }
    }

    pub fn resolved_locale(&self) -> String {
        self.locale.clone().unwrap_or_else(|| "en".to_string())
    }
}

fn base_letters(s: &str) -> Vec<char> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn lowercase_nfd(s: &str) -> Vec<char> {
    s.nfd().flat_map(char::to_lowercase).collect()
}

fn rank(c: char) -> u8 {
    if c.is_alphabetic() {
        2
    } else if c.is_numeric() {
        1
    } else {
        0
    }
}

fn compare_primary(lhs: &[char], rhs: &[char]) -> Ordering {
    lhs.iter()
        .map(|&c| (rank(c), c))
        .cmp(rhs.iter().map(|&c| (rank(c), c)))
}

// Lowercase sorts before uppercase at the first differing position.
fn compare_case(lhs: &[char], rhs: &[char]) -> Ordering {
    for (a, b) in lhs.iter().zip(rhs) {
        if a == b {
            continue;
        }
        return match (a.is_lowercase(), b.is_lowercase()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => a.cmp(b),
        };
    }
    lhs.len().cmp(&rhs.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitivity() {
        let base = Collator::new(false, false, None);
        assert_eq!(base.compare("Résumé", "resume"), Ordering::Equal);
        let case = Collator::new(true, false, None);
        assert_ne!(case.compare("A", "a"), Ordering::Equal);
        assert_eq!(case.compare("é", "e"), Ordering::Equal);
        let accent = Collator::new(false, true, None);
        assert_ne!(accent.compare("é", "e"), Ordering::Equal);
        assert_eq!(accent.compare("É", "é"), Ordering::Equal);
    }

    #[test]
    fn test_ordering() {
        let variant = Collator::new(true, true, None);
        assert_eq!(variant.compare("a", "B"), Ordering::Less);
        assert_eq!(variant.compare("a", "A"), Ordering::Less);
        assert_eq!(variant.compare("é", "f"), Ordering::Less);
        assert_eq!(variant.compare("e", "é"), Ordering::Less);
        assert_eq!(variant.compare("Z", "a"), Ordering::Greater);
        let base = Collator::new(false, false, None);
        assert_eq!(base.compare("10", "a"), Ordering::Less);
        assert_eq!(base.compare(" z", "a"), Ordering::Less);
        assert_eq!(base.compare("Éclair", "eclairs"), Ordering::Less);
    }

    #[test]
    fn test_resolved_locale() {
        assert_eq!(Collator::new(false, false, None).resolved_locale(), "en");
        assert_eq!(Collator::new(false, false, Some("fr".into())).resolved_locale(), "fr");
    }
}
