//! Diagram conversion to SVG through external tools.
//!
//! YANG modules go through pyang to become UML; UML goes through `PlantUML`
//! to become SVG. Both tools sit behind traits so builds can be exercised
//! without Java or pyang installed.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use std::time::Duration;

use graphyte_module::{DiagramKind, ModuleContext};
use tracing::info;

use crate::consts::PLANTUML_JVM_HEAP;
use crate::plantuml::{strip_pyang_banner, strip_startuml_args};
use crate::tools::{ToolError, run_with_timeout};

/// Diagram features pyang can leave out of generated UML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UmlFeature {
    Uses,
    Leafref,
    Identity,
    Identityref,
    Typedef,
    Annotation,
    Import,
    Circles,
    Stereotypes,
}

impl UmlFeature {
    /// Every accepted option, in pyang's spelling.
    pub const ALL: [Self; 9] = [
        Self::Uses,
        Self::Leafref,
        Self::Identity,
        Self::Identityref,
        Self::Typedef,
        Self::Annotation,
        Self::Import,
        Self::Circles,
        Self::Stereotypes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uses => "uses",
            Self::Leafref => "leafref",
            Self::Identity => "identity",
            Self::Identityref => "identityref",
            Self::Typedef => "typedef",
            Self::Annotation => "annotation",
            Self::Import => "import",
            Self::Circles => "circles",
            Self::Stereotypes => "stereotypes",
        }
    }

    /// Parse a list of option names.
    ///
    /// # Errors
    ///
    /// Returns the first name that is not a known feature.
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<Self>, UnknownUmlFeature> {
        names.iter().map(|n| n.as_ref().parse()).collect()
    }
}

impl fmt::Display for UmlFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `pyang_uml_no` entry outside the accepted set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown pyang UML exclusion \"{0}\"")]
pub struct UnknownUmlFeature(pub String);

impl FromStr for UmlFeature {
    type Err = UnknownUmlFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownUmlFeature(s.to_owned()))
    }
}

/// Converts a YANG module into `PlantUML` source.
pub trait SchemaConverter {
    /// Write UML for `yang` to `output`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the converter cannot run or fails.
    fn to_uml(&self, yang: &Path, output: &Path, exclude: &[UmlFeature]) -> Result<(), ToolError>;
}

/// Renders `PlantUML` source into SVG.
pub trait UmlRenderer {
    /// Render `uml` into `out_dir/<stem>.svg`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the renderer cannot run or fails.
    fn to_svg(&self, uml: &Path, out_dir: &Path) -> Result<(), ToolError>;
}

/// The pyang command-line tool.
#[derive(Debug, Clone)]
pub struct Pyang {
    program: String,
    timeout: Duration,
}

impl Pyang {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl SchemaConverter for Pyang {
    fn to_uml(&self, yang: &Path, output: &Path, exclude: &[UmlFeature]) -> Result<(), ToolError> {
        let uml_no = exclude
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let mut cmd = Command::new(&self.program);
        cmd.arg("--ignore-errors")
            .arg(format!("--uml-no={uml_no}"))
            .args(["-f", "uml"])
            .arg(yang)
            .arg("-o")
            .arg(output);
        run_with_timeout(&mut cmd, self.timeout).map(drop)
    }
}

/// `PlantUML` run through a JVM.
#[derive(Debug, Clone)]
pub struct PlantUml {
    java: String,
    jar: PathBuf,
    timeout: Duration,
}

impl PlantUml {
    pub fn new(java: impl Into<String>, jar: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            java: java.into(),
            jar: jar.into(),
            timeout,
        }
    }
}

impl UmlRenderer for PlantUml {
    fn to_svg(&self, uml: &Path, out_dir: &Path) -> Result<(), ToolError> {
        let mut cmd = Command::new(&self.java);
        cmd.arg(PLANTUML_JVM_HEAP)
            .arg("-jar")
            .arg(&self.jar)
            .arg("-tsvg")
            .arg(uml)
            .arg("-o")
            .arg(out_dir);
        run_with_timeout(&mut cmd, self.timeout).map(drop)
    }
}

/// Error converting a diagram to SVG.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The external tool failed.
    #[error(transparent)]
    Tool(#[from] ToolError),
    /// The tool exited successfully without producing its output file.
    #[error("{tool} produced no output file {}", .path.display())]
    MissingOutput {
        /// Tool name.
        tool: &'static str,
        /// Expected output.
        path: PathBuf,
    },
    /// Reading or writing an intermediate file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ConversionError + '_ {
    move |source| ConversionError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Bring the module's diagram to SVG form.
///
/// SVG diagrams are returned as-is. UML is cleaned and rendered in the
/// context's work directory; YANG is first converted to UML there.
///
/// # Errors
///
/// Tool failures and missing output files are returned as
/// [`ConversionError`]; neither is downgraded to a warning.
pub fn render_diagram(
    ctx: &ModuleContext,
    converter: &dyn SchemaConverter,
    renderer: &dyn UmlRenderer,
    exclude: &[UmlFeature],
) -> Result<PathBuf, ConversionError> {
    let diagram = ctx.diagram_path();
    let work_dir = ctx.work_dir();
    let stem = file_stem(diagram);

    let uml_source = match ctx.diagram_kind() {
        DiagramKind::Svg => return Ok(diagram.to_path_buf()),
        DiagramKind::Uml => std::fs::read_to_string(diagram).map_err(io_err(diagram))?,
        DiagramKind::Yang => {
            let generated = work_dir.join(format!("{stem}.uml"));
            info!(yang = %diagram.display(), "Converting YANG to UML");
            converter.to_uml(diagram, &generated, exclude)?;
            if !generated.is_file() {
                return Err(ConversionError::MissingOutput {
                    tool: "pyang",
                    path: generated,
                });
            }
            let raw = std::fs::read_to_string(&generated).map_err(io_err(&generated))?;
            strip_pyang_banner(&raw, &stem)
        }
    };

    let uml_path = work_dir.join(format!("{stem}.uml"));
    std::fs::write(&uml_path, strip_startuml_args(&uml_source)).map_err(io_err(&uml_path))?;

    info!(uml = %uml_path.display(), "Rendering UML to SVG");
    renderer.to_svg(&uml_path, work_dir)?;

    let svg_path = work_dir.join(format!("{stem}.svg"));
    if !svg_path.is_file() {
        return Err(ConversionError::MissingOutput {
            tool: "PlantUML",
            path: svg_path,
        });
    }
    Ok(svg_path)
}
