//! Parameter name syntax.

use std::sync::LazyLock;

use regex::Regex;

/// The four accepted bracket syntaxes over a restricted character class.
static VALID_NAME: LazyLock<Regex> = LazyLock::new(|| {
    let class = r"[A-Za-z0-9$.\[\]/='\-_]+";
    Regex::new(&format!(
        r"^(?:<{class}>|<\{{{class}\}}>|<\({class}\)>|<\[{class}\]>)$"
    ))
    .unwrap()
});

/// Minimal `<...>` placeholder in template text.
pub(crate) static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<.*?>").unwrap());

/// Placeholder-shaped token that is never a parameter (a CLI wildcard).
const WILDCARD: &str = "<*>";

/// Whether `name` is a well-formed parameter name:
/// `<x>`, `<{x}>`, `<(x)>` or `<[x]>` where `x` uses only letters, digits
/// and `$ . [ ] / = ' - _`.
pub fn is_valid_parameter_name(name: &str) -> bool {
    VALID_NAME.is_match(name)
}

/// Whether a placeholder match should be ignored.
pub fn is_false_positive(candidate: &str) -> bool {
    candidate.chars().any(char::is_whitespace) || candidate == WILDCARD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in [
            "<IF_NAME>",
            "<{vlan-id}>",
            "<(peer.address)>",
            "<[a/b=c]>",
            "<$var'x>",
            "<a[0]>",
        ] {
            assert!(is_valid_parameter_name(name), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in [
            "IF_NAME",
            "<>",
            "<IF NAME>",
            "<a,b>",
            "<a+b>",
            "<{abc)>",
            "<abc> trailing",
            "x<abc>",
            "<é>",
        ] {
            assert!(!is_valid_parameter_name(name), "{name} should be invalid");
        }
    }

    #[test]
    fn test_false_positives() {
        assert!(is_false_positive("<*>"));
        assert!(is_false_positive("<a b>"));
        assert!(is_false_positive("<a\tb>"));
        assert!(!is_false_positive("<IF_NAME>"));
        assert!(!is_false_positive("<**>"));
    }

    #[test]
    fn test_placeholder_is_minimal() {
        let found: Vec<_> = PLACEHOLDER
            .find_iter("set interface <IF_NAME> description <DESC>")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["<IF_NAME>", "<DESC>"]);
    }
}
