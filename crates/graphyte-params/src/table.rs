//! The per-module parameter table.

use graphyte_module::ModuleContext;
use graphyte_module::script::{render_array, var_name_for_file};

/// Header row of a non-empty table.
pub const TABLE_HEADER: &str = "Module,Parameter,File,Validation,Data";

/// Single row shown when a module has no parameters.
pub const EMPTY_TABLE: &str = "No parameters found in module.";

/// File name the viewer offers the table under.
pub fn parameter_table_file_name(ctx: &ModuleContext) -> String {
    format!("{}_parameters.csv", ctx.output_stem())
}

/// Finalize the context's parameter lists and render them as one script
/// array: decision rows first, then template rows, each prefixed with the
/// module's output stem.
pub fn render_parameter_table(ctx: &mut ModuleContext) -> String {
    ctx.finalize_parameters();
    let file_name = parameter_table_file_name(ctx);
    let stem = ctx.output_stem();

    let mut lines = Vec::new();
    if ctx.decisions().is_empty() && ctx.templates().is_empty() {
        lines.push(EMPTY_TABLE.to_owned());
    } else {
        lines.push(TABLE_HEADER.to_owned());
        lines.extend(
            ctx.decisions()
                .iter()
                .chain(ctx.templates())
                .map(|r| format!("{stem},{}", r.to_row())),
        );
    }

    render_array(
        &var_name_for_file(&file_name),
        &file_name,
        lines.iter().map(String::as_str),
    )
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use graphyte_module::{ModuleSettings, ParameterCategory, ParameterRecord, Verdict};
    use pretty_assertions::assert_eq;

    use super::*;

    fn context() -> ModuleContext {
        ModuleContext::new(ModuleSettings {
            model: "M".to_owned(),
            module: "A".to_owned(),
            version: "1".to_owned(),
            diagram_path: PathBuf::from("A.uml"),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_empty_table() {
        let mut ctx = context();
        assert_eq!(
            render_parameter_table(&mut ctx),
            "    var v_M_A_v1_parameters_csv = [\n \"M_A_v1_parameters.csv\",\n\"No parameters found in module.\"];\n\n"
        );
    }

    #[test]
    fn test_rows_sorted_case_insensitively() {
        let mut ctx = context();
        ctx.record(
            ParameterCategory::Decision,
            ParameterRecord::new("b", "f1", Verdict::NotChecked, "x"),
        );
        ctx.record(
            ParameterCategory::Decision,
            ParameterRecord::new("A", "f2", Verdict::NotChecked, "y"),
        );
        ctx.record(
            ParameterCategory::Template,
            ParameterRecord::new("<T>", "t.txt", Verdict::Legal, "use <T>"),
        );
        let table = render_parameter_table(&mut ctx);
        let a = table.find("M_A_v1,A,f2").unwrap();
        let b = table.find("M_A_v1,b,f1").unwrap();
        let t = table.find("M_A_v1,<T>,t.txt,ok").unwrap();
        assert!(a < b && b < t);
        assert!(table.contains("Module,Parameter,File,Validation,Data"));
    }
}
