use crate::core::CommitDag;

/// Renders a commit graph as Graphviz DOT source.
///
/// One filled node per commit, labeled with its sequence id and colored by
/// its outcome; one edge per recorded parent. The output is plain DOT text,
/// ready for an external `dot -Tsvg` invocation.
pub struct DotRenderer {
    graph_name: String,
}

impl DotRenderer {
    pub fn new(graph_name: impl Into<String>) -> Self {
        Self {
            graph_name: graph_name.into(),
        }
    }

    /// Render the graph in insertion order, so the output is stable for a
    /// given history.
    pub fn render(&self, dag: &CommitDag) -> String {
        let mut out = String::new();
        out.push_str(&format!("digraph {} {{\n", self.graph_name));

        for node in dag.iter() {
            out.push_str(&format!(
                "    \"{}\" [label=\"{}\" style=filled fontcolor=white fillcolor={}]\n",
                node.hash,
                node.id,
                node.state.color()
            ));
        }

        for node in dag.iter() {
            for parent in &node.parents {
                out.push_str(&format!("    \"{}\" -> \"{}\"\n", node.hash, parent));
            }
        }

        out.push_str("}\n");
        out
    }
}
