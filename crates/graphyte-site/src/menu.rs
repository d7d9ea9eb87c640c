//! Cross-module navigation menu.

use std::fmt::Write;

use graphyte_module::{ModuleContext, module_file_name};

use crate::template::escape_html;

/// One `<li>` per menu label, linking to that module's page.
pub fn build_menu(ctx: &ModuleContext) -> String {
    let mut html = String::new();
    for label in ctx.menu_labels() {
        let href = escape_html(&module_file_name(ctx.model(), label, ctx.version()));
        let _ = write!(html, "<li><a href=\"{href}\">{}</a></li>", escape_html(label));
    }
    html
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use graphyte_module::ModuleSettings;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_menu_from_nav_items() {
        let ctx = ModuleContext::new(ModuleSettings {
            model: "L3 VPN".to_owned(),
            module: "Core".to_owned(),
            version: "1.0".to_owned(),
            diagram_path: PathBuf::from("Core.svg"),
            nav_items: vec!["Overview".to_owned(), "Access Ring.uml".to_owned()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            build_menu(&ctx),
            "<li><a href=\"L3_VPN_Overview_v1.0.html\">Overview</a></li>\
             <li><a href=\"L3_VPN_Access_Ring_v1.0.html\">Access Ring</a></li>"
        );
    }

    #[test]
    fn test_menu_labels_escaped() {
        let ctx = ModuleContext::new(ModuleSettings {
            model: "M".to_owned(),
            module: "R&D".to_owned(),
            version: "1".to_owned(),
            diagram_path: PathBuf::from("R&D.uml"),
            nav_items: vec!["R&D".to_owned(), "<Edge>".to_owned()],
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            build_menu(&ctx),
            "<li><a href=\"M_R&amp;D_v1.html\">R&amp;D</a></li>\
             <li><a href=\"M_&lt;Edge&gt;_v1.html\">&lt;Edge&gt;</a></li>"
        );
    }

    #[test]
    fn test_menu_defaults_to_own_module() {
        let ctx = ModuleContext::new(ModuleSettings {
            model: "M".to_owned(),
            module: "Solo".to_owned(),
            version: "2".to_owned(),
            diagram_path: PathBuf::from("Solo.uml"),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(build_menu(&ctx), "<li><a href=\"M_Solo_v2.html\">Solo</a></li>");
    }
}
