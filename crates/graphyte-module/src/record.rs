//! Parameter findings.

use std::fmt;

/// Outcome of checking a parameter against the authorized set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Present in the authorized set.
    Legal,
    /// An authorized set is loaded and the name is not in it.
    Unauthorized,
    /// No authorized set was loaded for this module.
    NotChecked,
}

impl Verdict {
    /// Text shown in the parameter table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legal => "ok",
            Self::Unauthorized => "unauthorized",
            Self::NotChecked => "not checked",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter was mined from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterCategory {
    /// A row of a tabular (CSV) linked file.
    Decision,
    /// A placeholder in a free-text linked file.
    Template,
}

/// One detected placeholder occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterRecord {
    /// Raw placeholder text, brackets included.
    pub name: String,
    /// Linked file the placeholder came from.
    pub file: String,
    /// Authorization verdict.
    pub verdict: Verdict,
    /// Source context, free of commas.
    pub data: String,
}

impl ParameterRecord {
    /// Create a record. Commas are removed from `data` so the rendered row
    /// keeps a fixed column count.
    pub fn new(
        name: impl Into<String>,
        file: impl Into<String>,
        verdict: Verdict,
        data: &str,
    ) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            verdict,
            data: data.replace(',', ""),
        }
    }

    /// Render as `name,file,verdict,data`.
    pub fn to_row(&self) -> String {
        format!("{},{},{},{}", self.name, self.file, self.verdict, self.data)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_row_rendering() {
        let rec = ParameterRecord::new(
            "<IF_NAME>",
            "cmds.txt",
            Verdict::NotChecked,
            "set interface <IF_NAME> description <DESC>",
        );
        assert_eq!(
            rec.to_row(),
            "<IF_NAME>,cmds.txt,not checked,set interface <IF_NAME> description <DESC>"
        );
    }

    #[test]
    fn test_data_commas_removed() {
        let rec = ParameterRecord::new("<A>", "f", Verdict::Legal, "a, b,c");
        assert_eq!(rec.data, "a bc");
        assert_eq!(rec.to_row().matches(',').count(), 3);
    }

    #[test]
    fn test_verdict_text() {
        assert_eq!(Verdict::Legal.to_string(), "ok");
        assert_eq!(Verdict::Unauthorized.to_string(), "unauthorized");
        assert_eq!(Verdict::NotChecked.to_string(), "not checked");
    }
}
