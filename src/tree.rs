/*!
 * Directory tree rendering for ctxpack
 *
 * Builds a hierarchy from the collected relative paths and renders it as an
 * indented ASCII-art tree for the file-structure block.
 */

use std::path::Component;

use crate::collector::FileEntry;

/// A node in the rendered directory tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Entry name (single path component)
    pub name: String,
    /// Child nodes; directories sort before files, lexicographic within each
    pub children: Vec<TreeNode>,
    /// Whether this node is a directory
    pub is_dir: bool,
}

impl TreeNode {
    fn new(name: impl Into<String>, is_dir: bool) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            is_dir,
        }
    }

    /// Build the tree for the final entry set.
    ///
    /// Relative paths already share the per-input common root, so the
    /// returned node is an unnamed root holding the top-level children.
    pub fn from_entries(entries: &[FileEntry]) -> TreeNode {
        let mut root = TreeNode::new("", true);
        for entry in entries {
            let components: Vec<String> = entry
                .relative_path
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().to_string()),
                    _ => None,
                })
                .collect();
            root.insert(&components);
        }
        root.sort();
        root
    }

    /// Insert a path given as components; all but the last are directories
    fn insert(&mut self, components: &[String]) {
        let Some((head, rest)) = components.split_first() else {
            return;
        };
        let is_dir = !rest.is_empty();

        let position = self
            .children
            .iter()
            .position(|c| c.name == *head && c.is_dir == is_dir);
        let child = match position {
            Some(idx) => &mut self.children[idx],
            None => {
                self.children.push(TreeNode::new(head.clone(), is_dir));
                self.children.last_mut().unwrap()
            }
        };
        child.insert(rest);
    }

    /// Sort children recursively: directories first, then lexicographic
    fn sort(&mut self) {
        self.children
            .sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
        for child in &mut self.children {
            child.sort();
        }
    }

    /// Render the tree with conventional connector glyphs
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_children("", &mut out);
        out
    }

    fn render_children(&self, prefix: &str, out: &mut String) {
        let count = self.children.len();
        for (idx, child) in self.children.iter().enumerate() {
            let last = idx + 1 == count;
            let connector = if last { "└── " } else { "├── " };
            out.push_str(prefix);
            out.push_str(connector);
            out.push_str(&child.name);
            if child.is_dir {
                out.push('/');
            }
            out.push('\n');

            if !child.children.is_empty() {
                let extension = if last { "    " } else { "│   " };
                let child_prefix = format!("{}{}", prefix, extension);
                child.render_children(&child_prefix, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(rel: &str) -> FileEntry {
        FileEntry {
            relative_path: PathBuf::from(rel),
            absolute_path: PathBuf::from("/abs").join(rel),
            content: String::new(),
            size: 0,
        }
    }

    #[test]
    fn test_render_single_leaf() {
        let entries = vec![entry("main.rs")];
        let tree = TreeNode::from_entries(&entries);
        assert_eq!(tree.render(), "└── main.rs\n");
    }

    #[test]
    fn test_directories_before_files() {
        let entries = vec![entry("zz.txt"), entry("aa/inner.rs")];
        let tree = TreeNode::from_entries(&entries);
        assert_eq!(
            tree.render(),
            "├── aa/\n│   └── inner.rs\n└── zz.txt\n"
        );
    }

    #[test]
    fn test_last_child_uses_terminal_connector() {
        let entries = vec![
            entry("src/lib.rs"),
            entry("src/main.rs"),
            entry("Cargo.toml"),
        ];
        let tree = TreeNode::from_entries(&entries);
        let expected = "\
├── src/
│   ├── lib.rs
│   └── main.rs
└── Cargo.toml
";
        assert_eq!(tree.render(), expected);
    }

    #[test]
    fn test_render_is_deterministic() {
        let forward = vec![entry("b/x.rs"), entry("a/y.rs"), entry("a/b/z.rs")];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(
            TreeNode::from_entries(&forward).render(),
            TreeNode::from_entries(&reversed).render()
        );
    }
}
