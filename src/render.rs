//! Plain-text rendering of the panel list.
//!
//! The panel model owns content and order; this module only decides how a
//! terminal line looks. It builds a single string so callers control the
//! output stream.
use crate::panel::{Panel, PanelBody, Row, Section};
use crate::util::inline_value;
use serde_json::Value;

pub fn render_text(panels: &[Panel]) -> String {
    let mut out = String::new();
    for panel in panels {
        if !out.is_empty() {
            out.push('\n');
        }
        render_panel(&mut out, panel);
    }
    out
}

fn render_panel(out: &mut String, panel: &Panel) {
    match &panel.header {
        Some(header) => push_line(
            out,
            &format!(
                "== {} [pack: {} / {}] ==",
                panel.title, header.id, header.version
            ),
        ),
        None => push_line(out, &format!("== {} ==", panel.title)),
    }

    match &panel.body {
        PanelBody::Absent { path } => push_line(out, &format!("(absent) {path}")),
        PanelBody::Malformed { error, raw } => {
            push_line(out, &format!("(unparseable JSON: {error})"));
            for line in raw.lines() {
                push_line(out, line);
            }
        }
        PanelBody::Raw { value } => push_pretty(out, value, ""),
        PanelBody::Fields { rows } => {
            for row in rows {
                render_row(out, row);
            }
        }
    }

    for section in &panel.sections {
        render_section(out, section);
    }
}

fn render_row(out: &mut String, row: &Row) {
    match &row.value {
        // Multiline strings (patch bundles, traces) pass through verbatim.
        Value::String(text) if text.contains('\n') => {
            push_line(out, &format!("{}:", row.label));
            for line in text.lines() {
                push_line(out, line);
            }
        }
        Value::String(text) => push_line(out, &format!("{}: {text}", row.label)),
        Value::Object(_) | Value::Array(_) => {
            push_line(out, &format!("{}:", row.label));
            push_pretty(out, &row.value, "  ");
        }
        other => push_line(out, &format!("{}: {other}", row.label)),
    }
}

fn render_section(out: &mut String, section: &Section) {
    match section {
        Section::Verdicts { entries } => {
            push_line(out, &format!("{}:", section.title()));
            for entry in entries {
                let mut parts = Vec::new();
                if let Some(id) = &entry.id {
                    parts.push(format!("id={}", inline_value(id)));
                }
                if let Some(status) = &entry.status {
                    parts.push(format!("status={}", inline_value(status)));
                }
                if let Some(message) = &entry.message {
                    parts.push(format!("message={}", inline_value(message)));
                }
                if parts.is_empty() {
                    parts.push("(empty)".to_string());
                }
                push_line(out, &format!("  - {}", parts.join(" ")));
                if let Some(details) = &entry.details {
                    push_line(out, "    details:");
                    push_pretty(out, details, "    ");
                }
            }
        }
        Section::Timeline { nodes } => {
            push_line(out, &format!("{}:", section.title()));
            for node in nodes {
                push_line(
                    out,
                    &format!(
                        "  - id={} status={} hash={} timestamp={}",
                        cell(&node.id),
                        cell(&node.status),
                        cell(&node.hash),
                        cell(&node.timestamp)
                    ),
                );
            }
        }
        Section::Fixtures { rows } => {
            push_line(out, &format!("{}:", section.title()));
            for row in rows {
                let mut parts = vec![format!("[{}]", row.badge.label())];
                if let Some(id) = &row.id {
                    parts.push(format!("id={}", inline_value(id)));
                }
                if let Some(hash) = &row.hash {
                    parts.push(format!("hash={}", inline_value(hash)));
                }
                push_line(out, &format!("  - {}", parts.join(" ")));
            }
        }
        Section::Negotiation { rows } => {
            push_line(out, &format!("{}:", section.title()));
            for row in rows {
                push_line(
                    out,
                    &format!(
                        "  - {}: requested={} resolved={}",
                        row.at,
                        inline_value(&row.requested),
                        inline_value(&row.resolved)
                    ),
                );
            }
        }
        Section::Lines { title, lines } => {
            push_line(out, &format!("{title}:"));
            for line in lines {
                push_line(out, &format!("  - {line}"));
            }
        }
        Section::Tally {
            passed,
            failed,
            skipped,
            total,
        } => push_line(
            out,
            &format!("Summary: passed={passed} failed={failed} skipped={skipped} total={total}"),
        ),
        Section::Degraded { label, reason } => {
            push_line(out, &format!("{label}: (degraded: {reason})"));
        }
    }
}

fn cell(value: &Option<Value>) -> String {
    value.as_ref().map(inline_value).unwrap_or_default()
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn push_pretty(out: &mut String, value: &Value, indent: &str) {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    for line in pretty.lines() {
        out.push_str(indent);
        push_line(out, line);
    }
}
