//! Cross-artifact derivations layered onto the panel list.
//!
//! Each augmentation is independent and tolerant: a missing artifact or an
//! unexpected shape degrades the affected section, never the run. The only
//! computed value in the whole tool is the verification badge; everything
//! else is observational.
use crate::loader::{ArtifactSlot, LoadedArtifacts};
use crate::panel::{
    FixtureRow, NegotiationRow, PackHeader, Panel, Section, TimelineNode, VerificationBadge,
};
use crate::util::{inline_value, scalar_label};
use serde_json::{Map, Value};
use std::collections::HashMap;

const FIXTURE_ID_KEYS: [&str; 3] = ["id", "fixture_id", "name"];
const FIXTURE_HASH_KEYS: [&str; 2] = ["hash", "content_hash"];
const REPLAY_ENTRY_KEYS: [&str; 3] = ["fixtures", "results", "cases"];
const RECEIPT_SLOTS: [ArtifactSlot; 2] = [ArtifactSlot::ReceiptAgent, ArtifactSlot::ReceiptSystem];

/// Apply all augmentations to the panel list in place.
pub fn apply(artifacts: &LoadedArtifacts, panels: &mut [Panel]) {
    apply_pack_headers(artifacts, panels);
    apply_reasoning_options(artifacts, panels);
    apply_receipt_sections(artifacts, panels);
    apply_report_sections(artifacts, panels);
}

fn panel_for(panels: &mut [Panel], slot: ArtifactSlot) -> Option<&mut Panel> {
    panels.iter_mut().find(|panel| panel.slot == Some(slot))
}

fn first_present<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

// Pack headers -------------------------------------------------------------

fn apply_pack_headers(artifacts: &LoadedArtifacts, panels: &mut [Panel]) {
    let pack_keys = [
        (ArtifactSlot::Reasoning, "reasoning_pack"),
        (ArtifactSlot::Build, "policy_pack"),
    ];
    for (slot, key) in pack_keys {
        let Some(value) = artifacts.value(slot) else {
            continue;
        };
        let Some(header) = find_pack_header(value, key) else {
            continue;
        };
        if let Some(panel) = panel_for(panels, slot) {
            panel.header = Some(header);
        }
    }
}

/// Deep search for a pack object carrying both `id` and `version`; first
/// match in document order wins.
fn find_pack_header(value: &Value, key: &str) -> Option<PackHeader> {
    match value {
        Value::Object(object) => {
            if let Some(Value::Object(pack)) = object.get(key) {
                if let Some(header) = pack_header_from(pack) {
                    return Some(header);
                }
            }
            object
                .values()
                .find_map(|nested| find_pack_header(nested, key))
        }
        Value::Array(items) => items.iter().find_map(|item| find_pack_header(item, key)),
        _ => None,
    }
}

fn pack_header_from(pack: &Map<String, Value>) -> Option<PackHeader> {
    let id = pack.get("id").and_then(scalar_label)?;
    let version = pack.get("version").and_then(scalar_label)?;
    Some(PackHeader { id, version })
}

// Reasoning options --------------------------------------------------------

fn apply_reasoning_options(artifacts: &LoadedArtifacts, panels: &mut [Panel]) {
    let Some(object) = artifacts
        .value(ArtifactSlot::Reasoning)
        .and_then(Value::as_object)
    else {
        return;
    };
    let Some(options) = object.get("options").and_then(Value::as_array) else {
        return;
    };
    if options.is_empty() {
        return;
    }
    let lines = options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            let label = option
                .as_object()
                .and_then(|entry| first_present(entry, &["name", "title", "summary"]))
                .and_then(scalar_label)
                .unwrap_or_else(|| inline_value(option));
            format!("{}. {label}", index + 1)
        })
        .collect();
    if let Some(panel) = panel_for(panels, ArtifactSlot::Reasoning) {
        panel.sections.push(Section::Lines {
            title: "Options".to_string(),
            lines,
        });
    }
}

// Receipt sections: timeline, negotiation, fixture badges ------------------

fn apply_receipt_sections(artifacts: &LoadedArtifacts, panels: &mut [Panel]) {
    let replay = replay_index(artifacts.value(ArtifactSlot::ReplayReport));
    for slot in RECEIPT_SLOTS {
        let Some(value) = artifacts.value(slot) else {
            continue;
        };
        let mut sections = Vec::new();
        if let Some(object) = value.as_object() {
            if let Some(section) = timeline_section(object) {
                sections.push(section);
            }
        }
        if let Some(section) = negotiation_section(value) {
            sections.push(section);
        }
        if let Some(object) = value.as_object() {
            if let Some(section) = fixtures_section(object, &replay) {
                sections.push(section);
            }
        }
        if let Some(panel) = panel_for(panels, slot) {
            panel.sections.extend(sections);
        }
    }
}

fn timeline_section(object: &Map<String, Value>) -> Option<Section> {
    let steps = object.get("steps").or_else(|| object.get("run_graph"))?;
    let items = match steps {
        Value::Array(items) => items,
        Value::Object(graph) => {
            match first_present(graph, &["steps", "nodes"]).and_then(Value::as_array) {
                Some(items) => items,
                None => {
                    return Some(Section::Degraded {
                        label: "Run Steps".to_string(),
                        reason: "run graph carries no step array".to_string(),
                    })
                }
            }
        }
        _ => {
            return Some(Section::Degraded {
                label: "Run Steps".to_string(),
                reason: "steps is not an array".to_string(),
            })
        }
    };
    let nodes: Vec<TimelineNode> = items
        .iter()
        .map(|item| match item.as_object() {
            Some(step) => TimelineNode {
                id: step.get("id").cloned(),
                status: step.get("status").cloned(),
                hash: step.get("hash").cloned(),
                timestamp: step.get("timestamp").cloned(),
            },
            None => TimelineNode {
                id: Some(item.clone()),
                status: None,
                hash: None,
                timestamp: None,
            },
        })
        .collect();
    if nodes.is_empty() {
        None
    } else {
        Some(Section::Timeline { nodes })
    }
}

fn negotiation_section(value: &Value) -> Option<Section> {
    let mut rows = Vec::new();
    collect_negotiation(value, "$", &mut rows);
    if rows.is_empty() {
        None
    } else {
        Some(Section::Negotiation { rows })
    }
}

fn collect_negotiation(value: &Value, path: &str, rows: &mut Vec<NegotiationRow>) {
    match value {
        Value::Object(object) => {
            if let (Some(requested), Some(resolved)) =
                (object.get("requested"), object.get("resolved"))
            {
                rows.push(NegotiationRow {
                    at: path.to_string(),
                    requested: requested.clone(),
                    resolved: resolved.clone(),
                });
            }
            for (key, nested) in object {
                collect_negotiation(nested, &format!("{path}.{key}"), rows);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_negotiation(item, &format!("{path}[{index}]"), rows);
            }
        }
        _ => {}
    }
}

/// Index the replay report's fixture entries by id. Duplicate ids keep the
/// last occurrence.
fn replay_index(replay: Option<&Value>) -> HashMap<String, Option<Value>> {
    let mut index = HashMap::new();
    let Some(object) = replay.and_then(Value::as_object) else {
        return index;
    };
    let Some(entries) = first_present(object, &REPLAY_ENTRY_KEYS).and_then(Value::as_array) else {
        return index;
    };
    for entry in entries {
        let Some(entry) = entry.as_object() else {
            continue;
        };
        let Some(id) = first_present(entry, &FIXTURE_ID_KEYS).and_then(scalar_label) else {
            continue;
        };
        let hash = first_present(entry, &FIXTURE_HASH_KEYS).cloned();
        index.insert(id, hash);
    }
    index
}

fn fixtures_section(
    object: &Map<String, Value>,
    replay: &HashMap<String, Option<Value>>,
) -> Option<Section> {
    let fixtures = object.get("fixtures")?;
    let Some(items) = fixtures.as_array() else {
        return Some(Section::Degraded {
            label: "Fixture Verification".to_string(),
            reason: "fixtures is not an array".to_string(),
        });
    };
    let rows: Vec<FixtureRow> = items
        .iter()
        .map(|item| {
            let (id, hash) = match item.as_object() {
                Some(entry) => (
                    first_present(entry, &FIXTURE_ID_KEYS).cloned(),
                    first_present(entry, &FIXTURE_HASH_KEYS).cloned(),
                ),
                None => (Some(item.clone()), None),
            };
            let badge = badge_for(id.as_ref(), hash.as_ref(), replay);
            FixtureRow { id, hash, badge }
        })
        .collect();
    if rows.is_empty() {
        None
    } else {
        Some(Section::Fixtures { rows })
    }
}

/// Badge law: `verified` iff a replay entry matches by id and hashes are
/// equal, `mismatch` iff it matches and hashes differ, `unknown` otherwise.
fn badge_for(
    id: Option<&Value>,
    hash: Option<&Value>,
    replay: &HashMap<String, Option<Value>>,
) -> VerificationBadge {
    let Some(key) = id.and_then(scalar_label) else {
        return VerificationBadge::Unknown;
    };
    match replay.get(&key) {
        None => VerificationBadge::Unknown,
        Some(replay_hash) if *replay_hash == hash.cloned() => VerificationBadge::Verified,
        Some(_) => VerificationBadge::Mismatch,
    }
}

// Report sections: replay, acceptance, harness -----------------------------

fn apply_report_sections(artifacts: &LoadedArtifacts, panels: &mut [Panel]) {
    if let Some(object) = artifacts
        .value(ArtifactSlot::ReplayReport)
        .and_then(Value::as_object)
    {
        if let Some(section) = entry_lines_section(object, &REPLAY_ENTRY_KEYS, "Replay Fixtures") {
            if let Some(panel) = panel_for(panels, ArtifactSlot::ReplayReport) {
                panel.sections.push(section);
            }
        }
    }

    if let Some(object) = artifacts
        .value(ArtifactSlot::AcceptReport)
        .and_then(Value::as_object)
    {
        if let Some(section) = entry_lines_section(
            object,
            &["verdicts", "acceptance", "results"],
            "Acceptance Verdicts",
        ) {
            if let Some(panel) = panel_for(panels, ArtifactSlot::AcceptReport) {
                panel.sections.push(section);
            }
        }
    }

    if let Some(object) = artifacts
        .value(ArtifactSlot::HarnessReport)
        .and_then(Value::as_object)
    {
        let mut sections = Vec::new();
        if let Some(entries) = first_present(object, &REPLAY_ENTRY_KEYS).and_then(Value::as_array) {
            if first_present(object, &["summary", "totals", "results_summary"]).is_none() {
                sections.push(harness_tally(entries));
            }
            if !entries.is_empty() {
                sections.push(Section::Lines {
                    title: "Harness Fixtures".to_string(),
                    lines: entries.iter().map(harness_line).collect(),
                });
            }
        }
        if let Some(panel) = panel_for(panels, ArtifactSlot::HarnessReport) {
            panel.sections.extend(sections);
        }
    }
}

fn entry_lines_section(
    object: &Map<String, Value>,
    keys: &[&str],
    title: &str,
) -> Option<Section> {
    let entries = first_present(object, keys).and_then(Value::as_array)?;
    if entries.is_empty() {
        return None;
    }
    Some(Section::Lines {
        title: title.to_string(),
        lines: entries.iter().map(fixture_line).collect(),
    })
}

fn fixture_line(entry: &Value) -> String {
    let Some(object) = entry.as_object() else {
        return inline_value(entry);
    };
    let name = first_present(object, &["name", "id", "fixture"])
        .and_then(scalar_label)
        .unwrap_or_else(|| "fixture".to_string());
    let status = first_present(object, &["status", "verdict"])
        .and_then(scalar_label)
        .unwrap_or_else(|| "unknown".to_string());
    match first_present(object, &["details", "note"]) {
        Some(details) => format!("{name}: {status} ({})", inline_value(details)),
        None => format!("{name}: {status}"),
    }
}

fn harness_line(entry: &Value) -> String {
    let Some(object) = entry.as_object() else {
        return inline_value(entry);
    };
    let name = first_present(object, &["name", "id"])
        .and_then(scalar_label)
        .unwrap_or_else(|| "fixture".to_string());
    let status = entry_status(object).unwrap_or_else(|| "unknown".to_string());
    match first_present(object, &["duration_ms", "duration"]) {
        Some(duration) => format!("{name}: {status} ({})", inline_value(duration)),
        None => format!("{name}: {status}"),
    }
}

fn entry_status(object: &Map<String, Value>) -> Option<String> {
    object
        .get("status")
        .and_then(scalar_label)
        .or_else(|| match object.get("passed") {
            Some(Value::Bool(true)) => Some("passed".to_string()),
            Some(Value::Bool(false)) => Some("failed".to_string()),
            _ => None,
        })
}

/// Pass/fail/skip tally when the harness report carries no summary of its
/// own. Entries without a recognizable status only count toward the total.
fn harness_tally(entries: &[Value]) -> Section {
    let mut passed = 0;
    let mut failed = 0;
    let mut skipped = 0;
    for entry in entries {
        let status = entry.as_object().and_then(entry_status);
        match status {
            Some(status) if status.to_lowercase().starts_with("pass") => passed += 1,
            Some(status) if status.to_lowercase().starts_with("skip") => skipped += 1,
            Some(_) => failed += 1,
            None => {}
        }
    }
    Section::Tally {
        passed,
        failed,
        skipped,
        total: entries.len(),
    }
}
