//! `PlantUML` source preparation.
//!
//! Sources are cleaned before rendering:
//! - `@startuml <args>` becomes a bare `@startuml` so pyang's output path
//!   argument doesn't redirect the renderer
//! - pyang's generated title and footer lines are removed

use std::sync::LazyLock;

use regex::Regex;

use crate::consts::PYANG_BANNER_LINES;

static STARTUML_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(\s*)@startuml\b.*$").unwrap());

/// Reduce `@startuml` lines to the bare directive.
pub fn strip_startuml_args(source: &str) -> String {
    STARTUML_ARGS.replace_all(source, "${1}@startuml").into_owned()
}

/// Remove pyang's banner lines from generated UML.
///
/// `stem` is the YANG module's file stem; pyang titles the diagram with it.
pub fn strip_pyang_banner(source: &str, stem: &str) -> String {
    let title = format!("Title {stem}");
    source
        .split_inclusive('\n')
        .filter(|line| {
            !PYANG_BANNER_LINES.iter().any(|p| line.contains(p)) && !line.contains(&title)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_strip_startuml_args() {
        let source = "@startuml out/ietf-interfaces.png\nA -> B\n@enduml\n";
        assert_eq!(strip_startuml_args(source), "@startuml\nA -> B\n@enduml\n");
    }

    #[test]
    fn test_strip_startuml_keeps_bare_directive() {
        let source = "  @startuml\nA -> B\n@enduml";
        assert_eq!(strip_startuml_args(source), source);
    }

    #[test]
    fn test_strip_pyang_banner() {
        let source = "@startuml\n\
                      Title ietf-interfaces\n\
                      class A\n\
                      center footer\n \
                      <size:20> UML Generated : 2024-01-01</size>\n \
                      endfooter\n\
                      @enduml\n";
        assert_eq!(
            strip_pyang_banner(source, "ietf-interfaces"),
            "@startuml\nclass A\n@enduml\n"
        );
    }

    #[test]
    fn test_strip_pyang_banner_other_title_kept() {
        let source = "Title other-module\n";
        assert_eq!(strip_pyang_banner(source, "ietf-interfaces"), source);
    }
}
