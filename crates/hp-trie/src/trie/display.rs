//! Indented structural rendering, for debugging.

use std::fmt::{self, Display};

use super::{nodes::Node, Trie};

impl Display for Trie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            None => write!(f, "Trie {{ EMPTY }}"),
            Some(root) => fmt_node(f, root, 0),
        }
    }
}

fn fmt_node(f: &mut fmt::Formatter<'_>, node: &Node, indent: usize) -> fmt::Result {
    write!(f, "{}", " ".repeat(indent))?;
    match node {
        Node::Leaf(leaf) => {
            write!(f, "Leaf {:?} = {}", leaf.path.to_vec(), leaf.value)
        }
        Node::Extension(ext) => {
            writeln!(f, "Extension {:?}", ext.path.to_vec())?;
            fmt_node(f, &ext.child, indent + 4)
        }
        Node::Branch(branch) => {
            write!(f, "Branch")?;
            if let Some(value) = &branch.value {
                write!(f, " @ {value}")?;
            }
            for (idx, child) in branch.children.iter().enumerate() {
                if let Some(child) = child {
                    writeln!(f)?;
                    write!(f, "{}[{idx:x}]:", " ".repeat(indent + 2))?;
                    writeln!(f)?;
                    fmt_node(f, child, indent + 4)?;
                }
            }
            Ok(())
        }
    }
}
