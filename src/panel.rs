//! Schema-tolerant panel model derived from loaded artifacts.
//!
//! The transformation is pure and forward-compatible: suggested fields are
//! optional lookups, unknown fields are kept in original order, and values
//! pass through verbatim. Nothing here touches the filesystem.
use crate::loader::{ArtifactData, ArtifactSlot, InputMode, LoadedArtifacts};
use serde::Serialize;
use serde_json::{Map, Value};

/// Current schema version for `aview json` output.
pub const PANEL_SCHEMA_VERSION: u32 = 1;

/// Envelope for `aview json` output.
#[derive(Debug, Serialize)]
pub struct PanelReport {
    pub schema_version: u32,
    pub panels: Vec<Panel>,
}

/// Pack id/version annotation attached to a panel title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackHeader {
    pub id: String,
    pub version: String,
}

/// One labeled display row; the value is the artifact's JSON, untouched.
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    pub label: String,
    pub value: Value,
}

/// Panel body, one variant per resolution outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelBody {
    /// Canonical file not found; placeholder keeps the fixed layout visible.
    Absent { path: String },
    /// File existed but was not valid JSON.
    Malformed { error: String, raw: String },
    /// Object artifact broken out into labeled rows.
    Fields { rows: Vec<Row> },
    /// Verbatim dump for unrecognized files and non-object artifacts.
    Raw { value: Value },
}

/// One entry of the verdicts array; all fields verbatim and optional.
#[derive(Debug, Clone, Serialize)]
pub struct VerdictEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// One run-graph node; missing cells render blank, nodes are never dropped.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
}

/// Derived status comparing a fixture's hash across receipt and replay.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationBadge {
    Verified,
    Mismatch,
    Unknown,
}

impl VerificationBadge {
    pub fn label(self) -> &'static str {
        match self {
            VerificationBadge::Verified => "verified",
            VerificationBadge::Mismatch => "mismatch",
            VerificationBadge::Unknown => "unknown",
        }
    }
}

/// One fixture reference row with its derived badge.
#[derive(Debug, Clone, Serialize)]
pub struct FixtureRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<Value>,
    pub badge: VerificationBadge,
}

/// An observed requested/resolved pair; never computed by this tool.
#[derive(Debug, Clone, Serialize)]
pub struct NegotiationRow {
    pub at: String,
    pub requested: Value,
    pub resolved: Value,
}

/// A derived sub-panel attached to a panel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Section {
    Verdicts { entries: Vec<VerdictEntry> },
    Timeline { nodes: Vec<TimelineNode> },
    Fixtures { rows: Vec<FixtureRow> },
    Negotiation { rows: Vec<NegotiationRow> },
    Lines { title: String, lines: Vec<String> },
    Tally { passed: usize, failed: usize, skipped: usize, total: usize },
    /// An enrichment input had an unexpected shape; the rest of the panel
    /// still renders.
    Degraded { label: String, reason: String },
}

impl Section {
    pub fn title(&self) -> &str {
        match self {
            Section::Verdicts { .. } => "Verdicts",
            Section::Timeline { .. } => "Run Steps",
            Section::Fixtures { .. } => "Fixture Verification",
            Section::Negotiation { .. } => "Version Negotiation",
            Section::Lines { title, .. } => title,
            Section::Tally { .. } => "Summary",
            Section::Degraded { label, .. } => label,
        }
    }
}

/// A renderable unit: title, optional pack header, body, derived sections.
#[derive(Debug, Clone, Serialize)]
pub struct Panel {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<ArtifactSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<PackHeader>,
    pub body: PanelBody,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
}

impl Panel {
    fn for_slot(slot: ArtifactSlot, body: PanelBody) -> Self {
        Self {
            title: slot.title().to_string(),
            slot: Some(slot),
            header: None,
            body,
            sections: Vec::new(),
        }
    }
}

/// Derive the ordered panel list from the loaded artifacts.
///
/// Directory mode yields one panel per canonical slot (absent slots produce
/// placeholders) followed by one raw panel per unrecognized file in
/// filename order. Single-file mode yields exactly the resolved panel.
pub fn build_panels(artifacts: &LoadedArtifacts) -> Vec<Panel> {
    let mut panels = Vec::new();
    for slot in ArtifactSlot::ALL {
        match artifacts.get(slot) {
            ArtifactData::Absent => {
                if artifacts.mode() == InputMode::Directory {
                    panels.push(Panel::for_slot(
                        slot,
                        PanelBody::Absent {
                            path: artifacts.absent_path(slot),
                        },
                    ));
                }
            }
            ArtifactData::Malformed { raw, error } => {
                panels.push(Panel::for_slot(
                    slot,
                    PanelBody::Malformed {
                        error: error.clone(),
                        raw: raw.clone(),
                    },
                ));
            }
            ArtifactData::Parsed(value) => panels.push(populated_panel(slot, value)),
        }
    }

    for file in artifacts.extras() {
        let title = format!("Raw JSON: {}", file.filename);
        let body = match &file.data {
            ArtifactData::Parsed(value) => PanelBody::Raw {
                value: value.clone(),
            },
            ArtifactData::Malformed { raw, error } => PanelBody::Malformed {
                error: error.clone(),
                raw: raw.clone(),
            },
            ArtifactData::Absent => continue,
        };
        panels.push(Panel {
            title,
            slot: None,
            header: None,
            body,
            sections: Vec::new(),
        });
    }

    panels
}

fn populated_panel(slot: ArtifactSlot, value: &Value) -> Panel {
    let Some(object) = value.as_object() else {
        // Non-object top level: nothing to break into rows, dump verbatim.
        return Panel::for_slot(
            slot,
            PanelBody::Raw {
                value: value.clone(),
            },
        );
    };

    let mut sections = Vec::new();
    let rows = if slot == ArtifactSlot::Verdicts {
        verdict_rows(object, &mut sections)
    } else {
        ordered_rows(object, suggested_fields(slot))
    };

    let mut panel = Panel::for_slot(slot, PanelBody::Fields { rows });
    panel.sections = sections;
    panel
}

/// Suggested field order per slot; everything else follows in JSON order.
fn suggested_fields(slot: ArtifactSlot) -> &'static [&'static str] {
    match slot {
        ArtifactSlot::Intent => &["problem_spec", "goal_spec", "constraints"],
        ArtifactSlot::Reasoning => {
            &["summary", "artifacts", "trace", "options", "comparison_matrix"]
        }
        ArtifactSlot::Build => &["summary", "outputs", "files", "patch_bundle"],
        ArtifactSlot::ReceiptAgent => {
            &["system_snapshot_ref", "timestamp", "agent_runs", "versions", "hashes"]
        }
        ArtifactSlot::HarnessReport => &["summary", "totals", "results_summary"],
        _ => &[],
    }
}

fn ordered_rows(object: &Map<String, Value>, suggested: &[&str]) -> Vec<Row> {
    let mut rows = Vec::with_capacity(object.len());
    for key in suggested {
        if let Some(value) = object.get(*key) {
            rows.push(Row {
                label: (*key).to_string(),
                value: value.clone(),
            });
        }
    }
    for (key, value) in object {
        if suggested.contains(&key.as_str()) {
            continue;
        }
        rows.push(Row {
            label: key.clone(),
            value: value.clone(),
        });
    }
    rows
}

/// Rows for the verdicts artifact: a well-formed `verdicts` array becomes a
/// section; any other shape stays a plain row.
fn verdict_rows(object: &Map<String, Value>, sections: &mut Vec<Section>) -> Vec<Row> {
    let mut rows = Vec::new();
    for (key, value) in object {
        if key == "verdicts" {
            if let Some(items) = value.as_array() {
                sections.push(Section::Verdicts {
                    entries: verdict_entries(items),
                });
                continue;
            }
        }
        rows.push(Row {
            label: key.clone(),
            value: value.clone(),
        });
    }
    rows
}

fn verdict_entries(items: &[Value]) -> Vec<VerdictEntry> {
    items
        .iter()
        .map(|item| match item.as_object() {
            Some(entry) => VerdictEntry {
                id: entry.get("id").cloned(),
                status: entry.get("status").cloned(),
                message: entry.get("message").cloned(),
                details: entry.get("details").cloned(),
            },
            None => VerdictEntry {
                id: Some(item.clone()),
                status: None,
                message: None,
                details: None,
            },
        })
        .collect()
}
