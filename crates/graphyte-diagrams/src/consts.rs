//! Internal constants for diagram conversion.

use std::time::Duration;

/// Interval between child-process status polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Heap limit handed to the JVM running `PlantUML`.
pub const PLANTUML_JVM_HEAP: &str = "-Xmx1024m";

/// Substrings identifying an SVG exported by draw.io / diagrams.net.
pub const DRAWIO_SIGNATURES: &[&str] = &[
    "editor=&quot;www.draw.io&quot;",
    "host=&quot;www.draw.io&quot;",
    "host=&quot;app.diagrams.net&quot;",
    "host=&quot;scdp.cisco.com&quot;",
];

/// Target prefix for cross-module links.
pub const MODULE_LINK_PREFIX: &str = "mod:";

/// Target prefix for literal links.
pub const LITERAL_LINK_PREFIX: &str = "lit:";

/// Lines pyang adds to generated UML that would clutter the diagram.
pub const PYANG_BANNER_LINES: &[&str] = &[
    "center footer",
    " <size:20> UML Generated :",
    " endfooter",
];
