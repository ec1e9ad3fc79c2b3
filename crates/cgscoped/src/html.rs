//! HTML rendering for the report page.

use std::fmt::Write as _;

use cgscope::report::{CgroupReport, SectionBody};

const STYLE: &str = "\
body { font-family: sans-serif; margin: 2em; }
h1 { font-size: 1.4em; }
h2 { font-size: 1.1em; margin-bottom: 0.2em; }
ul { list-style: none; padding-left: 1em; margin-top: 0.2em; }
pre { background: #f4f4f4; padding: 0.5em; margin: 0.2em 0 0 1em; }
.error { color: #a00; }
";

/// Render a complete report page.
#[must_use]
pub fn render_page(report: &CgroupReport) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "<p>Detected cgroup version: <strong>{}</strong></p>",
        escape(&report.version().to_string())
    );

    for section in report.sections() {
        let _ = writeln!(body, "<h2>{}</h2>", escape(&section.title));
        match &section.body {
            SectionBody::Error(err) => {
                let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(err));
            }
            SectionBody::Rows(rows) => {
                body.push_str("<ul>\n");
                for row in rows {
                    if row.block {
                        let _ = writeln!(
                            body,
                            "<li><strong>{}:</strong><pre>{}</pre></li>",
                            escape(row.label),
                            escape(&row.value)
                        );
                    } else {
                        let _ = writeln!(
                            body,
                            "<li><strong>{}:</strong> {}</li>",
                            escape(row.label),
                            escape(&row.value)
                        );
                    }
                }
                body.push_str("</ul>\n");
            }
        }
    }

    page(&body)
}

/// Render a page for a probe that failed outright.
#[must_use]
pub fn render_error_page(message: &str) -> String {
    page(&format!("<p class=\"error\">{}</p>\n", escape(message)))
}

fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>cgscope</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n\
         <h1>Cgroup Information</h1>\n{body}</body>\n</html>\n"
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
