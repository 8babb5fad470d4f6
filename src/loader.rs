//! Artifact resolution for a pipeline run directory.
//!
//! The loader maps the nine canonical artifact filenames onto slots, parses
//! whatever is present, and records absence and parse failures as values so
//! the rest of the pipeline never has to special-case them.
use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Canonical artifact slots, one per known pipeline output file.
///
/// The slot-to-filename mapping is fixed and total; no two slots share a
/// filename.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactSlot {
    Intent,
    Reasoning,
    Build,
    Verdicts,
    ReceiptAgent,
    ReceiptSystem,
    ReplayReport,
    AcceptReport,
    HarnessReport,
}

impl ArtifactSlot {
    /// All slots in fixed display order.
    pub const ALL: [ArtifactSlot; 9] = [
        ArtifactSlot::Intent,
        ArtifactSlot::Reasoning,
        ArtifactSlot::Build,
        ArtifactSlot::Verdicts,
        ArtifactSlot::ReceiptAgent,
        ArtifactSlot::ReceiptSystem,
        ArtifactSlot::ReplayReport,
        ArtifactSlot::AcceptReport,
        ArtifactSlot::HarnessReport,
    ];

    /// Canonical filename resolved beneath the run directory.
    pub fn filename(self) -> &'static str {
        match self {
            ArtifactSlot::Intent => "intent.json",
            ArtifactSlot::Reasoning => "coga.json",
            ArtifactSlot::Build => "ca.json",
            ArtifactSlot::Verdicts => "verdicts.json",
            ArtifactSlot::ReceiptAgent => "receipt.json",
            ArtifactSlot::ReceiptSystem => "execution_receipt.json",
            ArtifactSlot::ReplayReport => "replay_report.json",
            ArtifactSlot::AcceptReport => "accept_report.json",
            ArtifactSlot::HarnessReport => "report.json",
        }
    }

    /// Fixed panel title for this slot.
    pub fn title(self) -> &'static str {
        match self {
            ArtifactSlot::Intent => "Intent",
            ArtifactSlot::Reasoning => "Reasoning (CogA)",
            ArtifactSlot::Build => "Build (cA)",
            ArtifactSlot::Verdicts => "Verdicts",
            ArtifactSlot::ReceiptAgent => "Execution Receipt",
            ArtifactSlot::ReceiptSystem => "Execution Receipt (System)",
            ArtifactSlot::ReplayReport => "Replay Report",
            ArtifactSlot::AcceptReport => "Acceptance Report",
            ArtifactSlot::HarnessReport => "Harness Report",
        }
    }

    /// Reverse lookup from a bare filename.
    pub fn from_filename(name: &str) -> Option<ArtifactSlot> {
        Self::ALL.iter().copied().find(|slot| slot.filename() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Resolution result for one slot or unrecognized file.
///
/// Absence is a first-class value, not an error; parse failures keep the raw
/// text so degraded panels can still show the file contents.
#[derive(Debug, Clone)]
pub enum ArtifactData {
    Absent,
    Parsed(Value),
    Malformed { raw: String, error: String },
}

impl ArtifactData {
    pub fn value(&self) -> Option<&Value> {
        match self {
            ArtifactData::Parsed(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ArtifactData::Malformed { .. })
    }
}

/// An unrecognized `*.json` file discovered next to the canonical set.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub filename: String,
    pub data: ArtifactData,
}

/// How the input path was interpreted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// All nine slots resolved beneath a run directory.
    Directory,
    /// Exactly one artifact resolved from a file path.
    SingleFile,
}

/// The full resolution of one invocation's input.
#[derive(Debug)]
pub struct LoadedArtifacts {
    mode: InputMode,
    root: PathBuf,
    slots: [ArtifactData; 9],
    extras: Vec<RawFile>,
}

impl LoadedArtifacts {
    fn new(mode: InputMode, root: PathBuf) -> Self {
        Self {
            mode,
            root,
            slots: std::array::from_fn(|_| ArtifactData::Absent),
            extras: Vec::new(),
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn get(&self, slot: ArtifactSlot) -> &ArtifactData {
        &self.slots[slot.index()]
    }

    pub fn value(&self, slot: ArtifactSlot) -> Option<&Value> {
        self.get(slot).value()
    }

    /// Unrecognized files, filename-lexical order.
    pub fn extras(&self) -> &[RawFile] {
        &self.extras
    }

    /// Display path for an absent slot's placeholder panel.
    pub fn absent_path(&self, slot: ArtifactSlot) -> String {
        self.root.join(slot.filename()).display().to_string()
    }

    /// True when at least one file was present but unparseable.
    pub fn has_malformed(&self) -> bool {
        self.slots.iter().any(ArtifactData::is_malformed)
            || self.extras.iter().any(|file| file.data.is_malformed())
    }

    fn set(&mut self, slot: ArtifactSlot, data: ArtifactData) {
        self.slots[slot.index()] = data;
    }
}

/// Resolve an input path, dispatching on directory vs. single-file mode.
pub fn load(input: &Path) -> Result<LoadedArtifacts> {
    let meta = fs::metadata(input)
        .with_context(|| format!("inspect input path {}", input.display()))?;
    if meta.is_dir() {
        load_dir(input)
    } else {
        load_file(input)
    }
}

/// Resolve all nine canonical slots beneath `root` and scan for extras.
pub fn load_dir(root: &Path) -> Result<LoadedArtifacts> {
    if !root.is_dir() {
        bail!("input path is not a directory: {}", root.display());
    }
    let mut artifacts = LoadedArtifacts::new(InputMode::Directory, root.to_path_buf());

    for slot in ArtifactSlot::ALL {
        let path = root.join(slot.filename());
        if !path.is_file() {
            continue;
        }
        artifacts.set(slot, read_artifact(&path)?);
    }

    let mut extra_paths = Vec::new();
    let entries =
        fs::read_dir(root).with_context(|| format!("scan run directory {}", root.display()))?;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("scan run directory {}", root.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !name.ends_with(".json") || ArtifactSlot::from_filename(name).is_some() {
            continue;
        }
        extra_paths.push(path);
    }
    extra_paths.sort();
    tracing::debug!(extras = extra_paths.len(), "scanned run directory");

    for path in extra_paths {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let data = read_artifact(&path)?;
        artifacts.extras.push(RawFile { filename, data });
    }

    Ok(artifacts)
}

/// Resolve exactly one artifact from a file path, inferring its slot from
/// the filename; non-canonical names become raw artifacts.
pub fn load_file(path: &Path) -> Result<LoadedArtifacts> {
    if !path.is_file() {
        bail!("input path is not a file: {}", path.display());
    }
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("input filename is not valid UTF-8: {}", path.display()))?
        .to_string();

    let root = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut artifacts = LoadedArtifacts::new(InputMode::SingleFile, root);
    let data = read_artifact(path)?;
    match ArtifactSlot::from_filename(&filename) {
        Some(slot) => artifacts.set(slot, data),
        None => artifacts.extras.push(RawFile { filename, data }),
    }
    Ok(artifacts)
}

fn read_artifact(path: &Path) -> Result<ArtifactData> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(match serde_json::from_str::<Value>(&raw) {
        Ok(value) => ArtifactData::Parsed(value),
        Err(err) => {
            tracing::debug!(file = %path.display(), "artifact failed to parse");
            ArtifactData::Malformed {
                raw,
                error: err.to_string(),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn write_file(path: &Path, contents: &str) {
        fs::write(path, contents).expect("write file");
    }

    #[test]
    fn slot_filename_mapping_is_total_and_injective() {
        let filenames: BTreeSet<&str> = ArtifactSlot::ALL
            .iter()
            .map(|slot| slot.filename())
            .collect();
        assert_eq!(filenames.len(), ArtifactSlot::ALL.len());
        for slot in ArtifactSlot::ALL {
            assert_eq!(ArtifactSlot::from_filename(slot.filename()), Some(slot));
        }
        assert_eq!(ArtifactSlot::from_filename("notes.json"), None);
    }

    #[test]
    fn empty_directory_resolves_every_slot_absent() {
        let dir = TempDir::new().expect("temp dir");
        let artifacts = load_dir(dir.path()).expect("load");
        for slot in ArtifactSlot::ALL {
            assert!(matches!(artifacts.get(slot), ArtifactData::Absent));
        }
        assert!(artifacts.extras().is_empty());
        assert!(!artifacts.has_malformed());
    }

    #[test]
    fn parse_failure_is_captured_not_fatal() {
        let dir = TempDir::new().expect("temp dir");
        write_file(&dir.path().join("ca.json"), "{\"summary\": \"trunc");
        let artifacts = load_dir(dir.path()).expect("load");
        match artifacts.get(ArtifactSlot::Build) {
            ArtifactData::Malformed { raw, error } => {
                assert!(raw.contains("trunc"));
                assert!(!error.is_empty());
            }
            other => panic!("expected malformed, got {other:?}"),
        }
        assert!(artifacts.has_malformed());
    }

    #[test]
    fn extra_json_files_are_listed_in_filename_order() {
        let dir = TempDir::new().expect("temp dir");
        write_file(&dir.path().join("zeta.json"), "{}");
        write_file(&dir.path().join("alpha.json"), "[1, 2]");
        write_file(&dir.path().join("notes.txt"), "not json");
        write_file(&dir.path().join("intent.json"), "{}");
        let artifacts = load_dir(dir.path()).expect("load");
        let names: Vec<&str> = artifacts
            .extras()
            .iter()
            .map(|file| file.filename.as_str())
            .collect();
        assert_eq!(names, ["alpha.json", "zeta.json"]);
        assert!(artifacts.value(ArtifactSlot::Intent).is_some());
    }

    #[test]
    fn single_file_mode_resolves_one_canonical_slot() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("verdicts.json");
        write_file(&path, "{\"verdicts\": []}");
        let artifacts = load_file(&path).expect("load");
        assert_eq!(artifacts.mode(), InputMode::SingleFile);
        assert!(artifacts.value(ArtifactSlot::Verdicts).is_some());
        assert!(artifacts.extras().is_empty());
        for slot in ArtifactSlot::ALL {
            if slot != ArtifactSlot::Verdicts {
                assert!(matches!(artifacts.get(slot), ArtifactData::Absent));
            }
        }
    }

    #[test]
    fn single_file_mode_treats_unknown_names_as_raw() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("scratch.json");
        write_file(&path, "{\"note\": true}");
        let artifacts = load_file(&path).expect("load");
        assert_eq!(artifacts.extras().len(), 1);
        assert_eq!(artifacts.extras()[0].filename, "scratch.json");
    }

    #[test]
    fn missing_input_path_is_fatal() {
        let dir = TempDir::new().expect("temp dir");
        assert!(load(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn parsed_values_keep_key_order() {
        let dir = TempDir::new().expect("temp dir");
        write_file(
            &dir.path().join("intent.json"),
            "{\"zulu\": 1, \"alpha\": 2, \"mike\": 3}",
        );
        let artifacts = load_dir(dir.path()).expect("load");
        let value = artifacts.value(ArtifactSlot::Intent).expect("parsed");
        let keys: Vec<&String> = value.as_object().expect("object").keys().collect();
        assert_eq!(keys, ["zulu", "alpha", "mike"]);
    }
}
