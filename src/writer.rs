/*!
 * Document serialization for ctxpack
 *
 * Assembles the metadata blocks, the file-structure block, and one block per
 * collected file into the final project document.
 */

use quick_xml::escape::escape;

use crate::collector::FileEntry;
use crate::metadata::{Dependency, DetectedProjects, ProjectMetadata, PythonProject, RustManifest};
use crate::tree::TreeNode;

/// Serializer for the packed project document
#[derive(Debug, Default)]
pub struct DocumentWriter;

impl DocumentWriter {
    pub fn new() -> Self {
        Self
    }

    /// Compose the full document.
    ///
    /// Block order is fixed: per-kind metadata, file structure, then file
    /// contents, all inside one `project` element. File content is embedded
    /// verbatim; only the path attribute is escaped.
    pub fn build(
        &self,
        entries: &[FileEntry],
        projects: &DetectedProjects,
        tree: &TreeNode,
    ) -> String {
        let mut out = String::new();
        out.push_str("<project>\n");

        for block in projects.blocks() {
            match block {
                ProjectMetadata::Rust(manifest) => self.write_cargo_info(&mut out, &manifest),
                ProjectMetadata::Python(project) => self.write_python_info(&mut out, &project),
            }
        }

        out.push_str("<file_structure>\n");
        out.push_str(&tree.render());
        out.push_str("</file_structure>\n\n");

        for entry in entries {
            self.write_file_block(&mut out, entry);
        }

        out.push_str("</project>");
        out
    }

    fn write_cargo_info(&self, out: &mut String, manifest: &RustManifest) {
        out.push_str("<cargo_info>\n");
        if let Some(name) = &manifest.name {
            out.push_str(&format!("Project Name: {}\n", name));
        }
        if let Some(version) = &manifest.version {
            out.push_str(&format!("Version: {}\n", version));
        }
        if let Some(description) = &manifest.description {
            out.push_str(&format!("Description: {}\n", description));
        }
        self.write_dependency_section(out, "Dependencies:", &manifest.dependencies);
        self.write_dependency_section(out, "Dev Dependencies:", &manifest.dev_dependencies);
        out.push_str("</cargo_info>\n\n");
    }

    fn write_python_info(&self, out: &mut String, project: &PythonProject) {
        out.push_str("<python_info>\n");
        out.push_str(&format!("Project Type: {}\n", project.flavor.label()));
        if let Some(name) = &project.name {
            out.push_str(&format!("Project Name: {}\n", name));
        }
        if let Some(version) = &project.version {
            out.push_str(&format!("Version: {}\n", version));
        }
        if let Some(description) = &project.description {
            out.push_str(&format!("Description: {}\n", description));
        }
        self.write_dependency_section(out, "Dependencies:", &project.dependencies);
        if !project.optional_dependencies.is_empty() {
            out.push_str("\nOptional Dependencies:\n");
            for (group, deps) in &project.optional_dependencies {
                out.push_str(&format!("Group '{}':\n", group));
                for dep in deps {
                    out.push_str("  ");
                    push_dependency_line(out, dep);
                }
            }
        }
        out.push_str("</python_info>\n\n");
    }

    fn write_dependency_section(&self, out: &mut String, title: &str, deps: &[Dependency]) {
        if deps.is_empty() {
            return;
        }
        out.push_str(&format!("\n{}\n", title));
        for dep in deps {
            push_dependency_line(out, dep);
        }
    }

    fn write_file_block(&self, out: &mut String, entry: &FileEntry) {
        out.push_str(&format!(
            "<file path=\"{}\">\n",
            escape(entry.relative_display().as_str())
        ));
        out.push_str(&entry.content);
        if !entry.content.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("</file>\n\n");
    }
}

fn push_dependency_line(out: &mut String, dep: &Dependency) {
    match &dep.spec {
        Some(spec) => out.push_str(&format!("- {} = \"{}\"\n", dep.name, spec)),
        None => out.push_str(&format!("- {}\n", dep.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Dependency;
    use std::path::PathBuf;

    fn entry(rel: &str, content: &str) -> FileEntry {
        FileEntry {
            relative_path: PathBuf::from(rel),
            absolute_path: PathBuf::from("/abs").join(rel),
            content: content.to_string(),
            size: content.len() as u64,
        }
    }

    #[test]
    fn test_no_metadata_block_when_undetected() {
        let entries = vec![entry("lone.rs", "fn main() {}\n")];
        let tree = TreeNode::from_entries(&entries);
        let doc = DocumentWriter::new().build(&entries, &DetectedProjects::default(), &tree);

        assert!(doc.starts_with("<project>\n<file_structure>\n"));
        assert!(!doc.contains("<cargo_info>"));
        assert!(!doc.contains("<python_info>"));
        assert!(doc.contains("<file path=\"lone.rs\">\nfn main() {}\n</file>"));
        assert!(doc.ends_with("</project>"));
    }

    #[test]
    fn test_cargo_block_lists_dependencies() {
        let manifest = RustManifest {
            name: Some("demo".into()),
            version: Some("0.2.0".into()),
            description: None,
            dependencies: vec![
                Dependency::new("serde", Some("1.0".into())),
                Dependency::new("local-helper", None),
            ],
            dev_dependencies: vec![Dependency::new("tempfile", Some("3.8".into()))],
        };
        let projects = DetectedProjects {
            rust: Some(manifest),
            python: None,
        };
        let entries: Vec<FileEntry> = Vec::new();
        let tree = TreeNode::from_entries(&entries);
        let doc = DocumentWriter::new().build(&entries, &projects, &tree);

        assert!(doc.contains("<cargo_info>\nProject Name: demo\nVersion: 0.2.0\n"));
        assert!(doc.contains("\nDependencies:\n- serde = \"1.0\"\n- local-helper\n"));
        assert!(doc.contains("\nDev Dependencies:\n- tempfile = \"3.8\"\n"));
    }

    #[test]
    fn test_path_attribute_is_escaped() {
        let entries = vec![entry("odd\"name.rs", "x\n")];
        let tree = TreeNode::from_entries(&entries);
        let doc = DocumentWriter::new().build(&entries, &DetectedProjects::default(), &tree);
        assert!(doc.contains("<file path=\"odd&quot;name.rs\">"));
    }

    #[test]
    fn test_content_embedded_verbatim() {
        let content = "let tag = \"<file path=x>\"; // not escaped\n";
        let entries = vec![entry("snippet.rs", content)];
        let tree = TreeNode::from_entries(&entries);
        let doc = DocumentWriter::new().build(&entries, &DetectedProjects::default(), &tree);
        assert!(doc.contains(content));
    }
}
