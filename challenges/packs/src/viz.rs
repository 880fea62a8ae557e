use std::collections::HashSet;
use std::fmt::{self, Write};

use crate::graph::{Edge, EdgeId, Graph};

/// Graphviz DOT rendering of a pack graph. Borrows the graph, nothing is
/// copied until [`Dot::render`] writes it out.
pub struct Dot<'a> {
    graph: &'a Graph,
    highlight: HashSet<EdgeId>,
}

impl<'a> Dot<'a> {
    pub fn new(graph: &'a Graph) -> Dot<'a> {
        Dot {
            graph,
            highlight: HashSet::new(),
        }
    }

    /// Draws the given edges, usually the chosen path, in bold.
    pub fn highlight(mut self, path: &[Edge]) -> Dot<'a> {
        self.highlight.extend(path.iter().map(|edge| edge.id));
        self
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        writeln!(out, "digraph packs {{")?;
        writeln!(out, "  rankdir=TB;")?;
        for node in self.graph.nodes() {
            let shape = if node.value <= 0 { "doublecircle" } else { "circle" };
            writeln!(
                out,
                "  n{} [label=\"{}\", shape={}];",
                node.id.index(),
                node.value,
                shape
            )?;
        }
        for edge in self.graph.edges() {
            let style = if self.highlight.contains(&edge.id) {
                ", style=bold, color=red"
            } else {
                ""
            };
            writeln!(
                out,
                "  n{} -> n{} [label=\"{}\"{}];",
                edge.from.index(),
                edge.to.index(),
                edge.pack_size,
                style
            )?;
        }
        writeln!(out, "}}")
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_to(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::PackCalc;

    #[test]
    fn test_render_small_graph() {
        let mut graph = Graph::new();
        let a = graph.create_node(3);
        let b = graph.create_node(-2);
        graph.create_edge(a, b, 5);

        let dot = Dot::new(&graph).render();
        assert_eq!(
            dot,
            "digraph packs {\n  rankdir=TB;\n  n0 [label=\"3\", shape=circle];\n  n1 [label=\"-2\", shape=doublecircle];\n  n0 -> n1 [label=\"5\"];\n}\n"
        );
    }

    #[test]
    fn test_highlight_path() {
        let mut calc = PackCalc::new(501, &[250, 500]).unwrap();
        calc.calculate().unwrap();
        let dot = Dot::new(calc.graph()).highlight(calc.path()).render();
        assert_eq!(dot.matches("style=bold").count(), calc.path().len());
        assert!(dot.contains("label=\"501\""));
    }
}
