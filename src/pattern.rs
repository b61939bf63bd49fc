///// Otter: Pattern-Matching fuer Device Instance IDs – Ganzstring, Perl-Semantik.
///// Schneefuchs: fancy-regex wegen Lookahead (std::wregex-Paritaet); Anker via (?:...)-Gruppe.
///// Maus: Kompilierfehler frueh und beschreibend; Laufzeitfehler zaehlen als kein Treffer.
///// Datei: src/pattern.rs

use fancy_regex::Regex;

use crate::term::out_warn;

/// Kompiliertes Muster fuer den Ganzstring-Vergleich gegen eine Device Instance ID.
#[derive(Debug)]
pub struct IdPattern {
    re: Regex,
}

impl IdPattern {
    /// Kompiliert `pattern` mit Ganzstring-Ankern. Die nicht-fangende Gruppe
    /// erhaelt die Nummerierung der Benutzer-Gruppen.
    pub fn compile(pattern: &str) -> Result<Self, String> {
        let anchored = format!(r"\A(?:{pattern})\z");
        match Regex::new(&anchored) {
            Ok(re) => Ok(IdPattern { re }),
            Err(e) => Err(format!("invalid pattern {:?}: {}", pattern, e)),
        }
    }

    /// Ganzstring-Match; ein blosser Teilstring-Treffer zaehlt nicht.
    pub fn matches(&self, instance_id: &str) -> bool {
        match self.re.is_match(instance_id) {
            Ok(hit) => hit,
            Err(e) => {
                // Backtracking-Limit o.ae.: konservativ als "kein Treffer" werten.
                out_warn("MATCH", &format!("pattern evaluation failed on {:?}: {}", instance_id, e));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_string_only() {
        let p = IdPattern::compile(r"VID_\w+").unwrap();
        assert!(p.matches("VID_05E3"));
        // Teilstring darf nicht reichen.
        assert!(!p.matches(r"USB\VID_05E3&PID_0727\000000000207"));
    }

    #[test]
    fn match_anything_matches_anything() {
        let p = IdPattern::compile(".*").unwrap();
        assert!(p.matches(r"USB\ROOT_HUB30\4&1D3B9C2&0&0"));
        assert!(p.matches(""));
    }

    #[test]
    fn backslash_classes_and_groups() {
        let p = IdPattern::compile(r"C\\.*").unwrap();
        assert!(p.matches(r"C\Z\3"));
        assert!(!p.matches(r"B\Y\2"));
    }

    #[test]
    fn alternation_stays_anchored() {
        // Ohne (?:...)-Gruppe wuerde nur der linke Zweig verankert.
        let p = IdPattern::compile("AAA|BBB").unwrap();
        assert!(p.matches("AAA"));
        assert!(p.matches("BBB"));
        assert!(!p.matches("xAAA"));
        assert!(!p.matches("BBBx"));
    }

    #[test]
    fn negative_lookahead_supported() {
        // Das klassische Muster: VID/PID plus Seriennummer ohne '&' oder '_'.
        let p = IdPattern::compile(r"USB\\VID_(\w+)&PID_(\w+)\\(?!.*[&_].*)(\w+)").unwrap();
        assert!(p.matches(r"USB\VID_05E3&PID_0727\000000000207"));
        assert!(!p.matches(r"USB\VID_05E3&PID_0727\5&2C543B2&0&3"));
    }

    #[test]
    fn malformed_pattern_is_a_descriptive_error() {
        let err = IdPattern::compile("[unclosed").unwrap_err();
        assert!(err.contains("invalid pattern"));
        assert!(err.contains("[unclosed"));
    }
}
