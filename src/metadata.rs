/*!
 * Project metadata detection for ctxpack
 *
 * Walks upward from each input path looking for recognized manifest files,
 * and parses the first match per project kind into a tagged metadata value.
 */

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use toml::Value;

use crate::error::{PackError, Result};

/// Manifest filename for the Rust kind
pub const RUST_MANIFEST: &str = "Cargo.toml";

/// Python manifest candidates, in priority order
pub const PYTHON_MANIFESTS: [&str; 3] = ["pyproject.toml", "setup.py", "requirements.txt"];

/// A dependency as (name, optional version-or-spec)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub spec: Option<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>, spec: Option<String>) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }
}

/// Parsed Cargo manifest data
#[derive(Debug, Clone, Default)]
pub struct RustManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub dependencies: Vec<Dependency>,
    pub dev_dependencies: Vec<Dependency>,
}

/// Which Python manifest flavor produced the metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PythonFlavor {
    Poetry,
    Pep621,
    Flit,
    SetupPy,
    Requirements,
}

impl PythonFlavor {
    /// Human-readable label used in the python-info block
    pub fn label(&self) -> &'static str {
        match self {
            PythonFlavor::Poetry => "Python (Poetry)",
            PythonFlavor::Pep621 => "Python (PEP 621)",
            PythonFlavor::Flit => "Python (Flit)",
            PythonFlavor::SetupPy => "Python (setup.py)",
            PythonFlavor::Requirements => "Python (requirements.txt)",
        }
    }
}

/// Parsed Python project data
#[derive(Debug, Clone)]
pub struct PythonProject {
    pub flavor: PythonFlavor,
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub dependencies: Vec<Dependency>,
    /// Named groups of optional dependencies (extras)
    pub optional_dependencies: Vec<(String, Vec<Dependency>)>,
}

impl PythonProject {
    fn empty(flavor: PythonFlavor) -> Self {
        Self {
            flavor,
            name: None,
            version: None,
            description: None,
            dependencies: Vec::new(),
            optional_dependencies: Vec::new(),
        }
    }
}

/// Tagged project-kind metadata
#[derive(Debug, Clone)]
pub enum ProjectMetadata {
    Rust(RustManifest),
    Python(PythonProject),
}

/// At most one metadata value per kind for a run
#[derive(Debug, Clone, Default)]
pub struct DetectedProjects {
    pub rust: Option<RustManifest>,
    pub python: Option<PythonProject>,
}

impl DetectedProjects {
    /// Label reported in the run summary
    pub fn kind_label(&self) -> &'static str {
        match (&self.rust, &self.python) {
            (Some(_), None) => "Rust",
            (None, Some(_)) => "Python",
            (Some(_), Some(_)) => "mixed",
            (None, None) => "unknown",
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rust.is_none() && self.python.is_none()
    }

    /// Metadata blocks in serialization order (Rust before Python)
    pub fn blocks(&self) -> Vec<ProjectMetadata> {
        let mut blocks = Vec::new();
        if let Some(manifest) = &self.rust {
            blocks.push(ProjectMetadata::Rust(manifest.clone()));
        }
        if let Some(project) = &self.python {
            blocks.push(ProjectMetadata::Python(project.clone()));
        }
        blocks
    }

    fn complete(&self) -> bool {
        self.rust.is_some() && self.python.is_some()
    }
}

/// Detector for project manifests near the input paths
#[derive(Debug, Clone, Default)]
pub struct MetadataDetector {
    /// Explicit Cargo.toml path supplied by the caller
    pub cargo_manifest: Option<PathBuf>,
    /// Explicit Python project file supplied by the caller
    pub pyproject: Option<PathBuf>,
}

impl MetadataDetector {
    pub fn new(cargo_manifest: Option<PathBuf>, pyproject: Option<PathBuf>) -> Self {
        Self {
            cargo_manifest,
            pyproject,
        }
    }

    /// Detect project metadata for the given inputs.
    ///
    /// Explicit overrides claim their kind first. The remaining kinds are
    /// searched by walking upward from each input path in order; the first
    /// manifest found per kind wins and the walk stops once every kind has
    /// been claimed. A manifest that fails to parse is reported and its kind
    /// omitted; the run continues.
    pub fn detect(&self, inputs: &[PathBuf]) -> DetectedProjects {
        let mut detected = DetectedProjects::default();

        if let Some(path) = &self.cargo_manifest {
            match parse_cargo_manifest(path) {
                Ok(manifest) => detected.rust = Some(manifest),
                Err(e) => eprintln!("Warning: {}", e),
            }
        }
        if let Some(path) = &self.pyproject {
            match parse_python_file(path) {
                Ok(Some(project)) => detected.python = Some(project),
                Ok(None) => eprintln!(
                    "Warning: unrecognized Python project file: {}",
                    path.display()
                ),
                Err(e) => eprintln!("Warning: {}", e),
            }
        }

        for input in inputs {
            if detected.complete() {
                break;
            }
            let start = if input.is_file() {
                input.parent().map(Path::to_path_buf)
            } else if input.is_dir() {
                Some(input.clone())
            } else {
                None
            };
            if let Some(dir) = start {
                self.search_upward(&dir, &mut detected);
            }
        }

        detected
    }

    /// Walk from `start` toward the filesystem root, filling missing kinds
    fn search_upward(&self, start: &Path, detected: &mut DetectedProjects) {
        let mut rust_searched = detected.rust.is_some() || self.cargo_manifest.is_some();
        let python_searched = self.pyproject.is_some();
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            if !rust_searched {
                let candidate = dir.join(RUST_MANIFEST);
                if candidate.exists() {
                    // First Cargo.toml on the way up claims the kind, parsed
                    // or not.
                    rust_searched = true;
                    match parse_cargo_manifest(&candidate) {
                        Ok(manifest) => detected.rust = Some(manifest),
                        Err(e) => eprintln!("Warning: {}", e),
                    }
                }
            }

            if detected.python.is_none() && !python_searched {
                for name in PYTHON_MANIFESTS {
                    let candidate = dir.join(name);
                    if !candidate.exists() {
                        continue;
                    }
                    match parse_python_file(&candidate) {
                        Ok(Some(project)) => {
                            detected.python = Some(project);
                            break;
                        }
                        // Unparseable candidates yield to the next one.
                        Ok(None) => {}
                        Err(e) => eprintln!("Warning: {}", e),
                    }
                }
            }

            if rust_searched && (python_searched || detected.python.is_some()) {
                break;
            }
            current = dir.parent().map(Path::to_path_buf);
        }
    }
}

//--------------------------------------------------------------------
// Cargo manifests
//--------------------------------------------------------------------

/// Parse a Cargo.toml into a [`RustManifest`]
pub fn parse_cargo_manifest(path: &Path) -> Result<RustManifest> {
    let content = fs::read_to_string(path)
        .map_err(|e| PackError::Manifest(format!("cannot read {}: {}", path.display(), e)))?;
    let value: Value = content
        .parse()
        .map_err(|e| PackError::Manifest(format!("cannot parse {}: {}", path.display(), e)))?;

    let mut manifest = RustManifest::default();

    if let Some(package) = value.get("package") {
        manifest.name = str_field(package, "name");
        manifest.version = str_field(package, "version");
        manifest.description = str_field(package, "description");
    }
    if let Some(deps) = value.get("dependencies").and_then(Value::as_table) {
        manifest.dependencies = cargo_dependency_list(deps);
    }
    if let Some(deps) = value.get("dev-dependencies").and_then(Value::as_table) {
        manifest.dev_dependencies = cargo_dependency_list(deps);
    }

    Ok(manifest)
}

fn cargo_dependency_list(table: &toml::map::Map<String, Value>) -> Vec<Dependency> {
    table
        .iter()
        .map(|(name, value)| {
            let spec = match value {
                Value::String(version) => Some(version.clone()),
                Value::Table(detail) => detail
                    .get("version")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                _ => None,
            };
            Dependency::new(name.clone(), spec)
        })
        .collect()
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

//--------------------------------------------------------------------
// Python projects
//--------------------------------------------------------------------

/// Parse any recognized Python project file by its file name
pub fn parse_python_file(path: &Path) -> Result<Option<PythonProject>> {
    match path.file_name().and_then(|n| n.to_str()) {
        Some("pyproject.toml") => parse_pyproject(path),
        Some("setup.py") => parse_setup_py(path),
        Some("requirements.txt") => parse_requirements(path).map(Some),
        _ => Ok(None),
    }
}

/// Parse a pyproject.toml, trying Poetry, PEP 621, then Flit layouts
pub fn parse_pyproject(path: &Path) -> Result<Option<PythonProject>> {
    let content = fs::read_to_string(path)
        .map_err(|e| PackError::Manifest(format!("cannot read {}: {}", path.display(), e)))?;
    let value: Value = content
        .parse()
        .map_err(|e| PackError::Manifest(format!("cannot parse {}: {}", path.display(), e)))?;

    if let Some(poetry) = value.get("tool").and_then(|t| t.get("poetry")) {
        let mut project = PythonProject::empty(PythonFlavor::Poetry);
        project.name = str_field(poetry, "name");
        project.version = str_field(poetry, "version");
        project.description = str_field(poetry, "description");
        if let Some(deps) = poetry.get("dependencies").and_then(Value::as_table) {
            project.dependencies = deps
                .iter()
                .filter(|(name, _)| name.as_str() != "python")
                .map(|(name, value)| {
                    let spec = value.as_str().map(str::to_string);
                    Dependency::new(name.clone(), spec)
                })
                .collect();
        }
        if let Some(deps) = poetry.get("dev-dependencies").and_then(Value::as_table) {
            let group = deps
                .iter()
                .map(|(name, value)| {
                    Dependency::new(name.clone(), value.as_str().map(str::to_string))
                })
                .collect();
            project.optional_dependencies.push(("dev".to_string(), group));
        }
        return Ok(Some(project));
    }

    if let Some(meta) = value.get("project") {
        let mut project = PythonProject::empty(PythonFlavor::Pep621);
        project.name = str_field(meta, "name");
        project.version = str_field(meta, "version");
        project.description = str_field(meta, "description");
        if let Some(deps) = meta.get("dependencies").and_then(Value::as_array) {
            project.dependencies = requirement_array(deps);
        }
        if let Some(optional) = meta.get("optional-dependencies").and_then(Value::as_table) {
            for (group, deps) in optional {
                if let Some(array) = deps.as_array() {
                    project
                        .optional_dependencies
                        .push((group.clone(), requirement_array(array)));
                }
            }
        }
        return Ok(Some(project));
    }

    if let Some(meta) = value
        .get("tool")
        .and_then(|t| t.get("flit"))
        .and_then(|f| f.get("metadata"))
    {
        let mut project = PythonProject::empty(PythonFlavor::Flit);
        project.name = str_field(meta, "module");
        project.description = str_field(meta, "description");
        if let Some(deps) = meta.get("requires").and_then(Value::as_array) {
            project.dependencies = requirement_array(deps);
        }
        if let Some(extras) = meta.get("requires-extra").and_then(Value::as_table) {
            for (group, deps) in extras {
                if let Some(array) = deps.as_array() {
                    project
                        .optional_dependencies
                        .push((group.clone(), requirement_array(array)));
                }
            }
        }
        return Ok(Some(project));
    }

    Ok(None)
}

fn requirement_array(values: &[Value]) -> Vec<Dependency> {
    values
        .iter()
        .filter_map(Value::as_str)
        .map(split_requirement)
        .collect()
}

/// Split a PEP 508-style requirement string into name and spec remainder
pub fn split_requirement(requirement: &str) -> Dependency {
    let trimmed = requirement.trim();
    let boundary = trimmed
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'))
        .unwrap_or(trimmed.len());
    let (name, rest) = trimmed.split_at(boundary);
    let spec = rest.trim();
    Dependency::new(
        name.to_string(),
        (!spec.is_empty()).then(|| spec.to_string()),
    )
}

static SETUP_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"name\s*=\s*["']([^"']*)["']"#).unwrap());
static SETUP_VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"version\s*=\s*["']([^"']*)["']"#).unwrap());
static SETUP_DESCRIPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"description\s*=\s*["']([^"']*)["']"#).unwrap());
static SETUP_REQUIRES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)install_requires\s*=\s*\[(.*?)\]"#).unwrap());
static SETUP_EXTRAS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)extras_require\s*=\s*\{(.*?)\}"#).unwrap());
static SETUP_EXTRAS_GROUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)["']([^"']+)["']\s*:\s*\[(.*?)\]"#).unwrap());
static QUOTED_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"["']([^"']+)["']"#).unwrap());

/// Best-effort extraction of setup() parameters from a setup.py.
///
/// Not a Python parser; covers the common literal-keyword form and gives up
/// quietly on anything dynamic.
pub fn parse_setup_py(path: &Path) -> Result<Option<PythonProject>> {
    let content = fs::read_to_string(path)
        .map_err(|e| PackError::Manifest(format!("cannot read {}: {}", path.display(), e)))?;

    let mut project = PythonProject::empty(PythonFlavor::SetupPy);
    project.name = capture(&SETUP_NAME_RE, &content);
    project.version = capture(&SETUP_VERSION_RE, &content);
    project.description = capture(&SETUP_DESCRIPTION_RE, &content);

    if let Some(body) = capture(&SETUP_REQUIRES_RE, &content) {
        project.dependencies = quoted_items(&body).map(|s| split_requirement(&s)).collect();
    }
    if let Some(body) = capture(&SETUP_EXTRAS_RE, &content) {
        for group in SETUP_EXTRAS_GROUP_RE.captures_iter(&body) {
            let name = group[1].to_string();
            let deps = quoted_items(&group[2])
                .map(|s| split_requirement(&s))
                .collect();
            project.optional_dependencies.push((name, deps));
        }
    }

    if project.name.is_none() && project.dependencies.is_empty() {
        return Ok(None);
    }
    Ok(Some(project))
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text).map(|c| c[1].to_string())
}

fn quoted_items(body: &str) -> impl Iterator<Item = String> + '_ {
    QUOTED_ITEM_RE
        .captures_iter(body)
        .map(|c| c[1].to_string())
}

/// Parse a requirements.txt dependency list
pub fn parse_requirements(path: &Path) -> Result<PythonProject> {
    let content = fs::read_to_string(path)
        .map_err(|e| PackError::Manifest(format!("cannot read {}: {}", path.display(), e)))?;

    let mut project = PythonProject::empty(PythonFlavor::Requirements);
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let requirement = match line.find('#') {
            Some(idx) => line[..idx].trim(),
            None => line,
        };
        if !requirement.is_empty() {
            project.dependencies.push(split_requirement(requirement));
        }
    }
    Ok(project)
}
