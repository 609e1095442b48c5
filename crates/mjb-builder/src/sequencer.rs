//! Dependency ordering of classes: enclosing classes, bases, template
//! bases, by-value field types and by-value defaulted argument types come
//! before the classes using them. An enum-typed field depends on the class
//! declaring the enum.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicUsize, Ordering};

use mjb_config::DebugLevel;
use mjb_meta::{ClassArena, ClassId};
use mjb_typesystem::TypeEntry;
use rustworkx_core::petgraph::algo::{tarjan_scc, toposort};
use rustworkx_core::petgraph::graph::{DiGraph, NodeIndex};

use crate::builder::MetaBuilder;

static CYCLE_DUMPS: AtomicUsize = AtomicUsize::new(0);

/// `parent` must be ordered before `child`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub parent: ClassId,
    pub child: ClassId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortResult {
    /// Sorted classes; the input order when the graph is cyclic.
    pub order: Vec<ClassId>,
    /// Classes taking part in a dependency cycle.
    pub cyclic: Vec<ClassId>,
}

impl SortResult {
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        !self.cyclic.is_empty()
    }
}

struct DependencyGraph {
    graph: DiGraph<ClassId, ()>,
}

impl DependencyGraph {
    fn build(arena: &ClassArena, classes: &[ClassId], extra: &[Dependency]) -> Self {
        let mut graph = DiGraph::new();
        let mut index: HashMap<ClassId, NodeIndex> = HashMap::new();
        for &id in classes {
            index.entry(id).or_insert_with(|| graph.add_node(id));
        }

        let class_of = |entry: &TypeEntry| {
            let name = if entry.is_enum() { entry.scope() } else { entry.name() };
            classes.iter().copied().find(|c| arena[*c].type_entry.name() == name)
        };

        let mut edges = Vec::new();
        for &id in classes {
            let class = &arena[id];
            edges.extend(arena.all_base_classes(id).into_iter().map(|base| (base, id)));
            if let Some(template) = class.template_base_class {
                edges.push((template, id));
            }
            if let Some(enclosing) = class.enclosing_class {
                edges.push((enclosing, id));
            }
            for field in class.fields.iter().filter(|f| f.is_value_dependency()) {
                if let Some(dependency) = class_of(&**field.meta_type.type_entry()) {
                    edges.push((dependency, id));
                }
            }
            // `Str s = Str()` needs the complete type of `Str`.
            let defaulted_values = class
                .functions()
                .iter()
                .flat_map(|f| f.arguments.iter())
                .filter(|a| !a.original_default_value_expression.is_empty() && a.meta_type.is_value());
            for argument in defaulted_values {
                if let Some(dependency) = class_of(&**argument.meta_type.type_entry()) {
                    edges.push((dependency, id));
                }
            }
        }
        edges.extend(extra.iter().map(|d| (d.parent, d.child)));

        for (parent, child) in edges {
            if parent == child {
                continue;
            }
            if let (Some(&from), Some(&to)) = (index.get(&parent), index.get(&child)) {
                if graph.find_edge(from, to).is_none() {
                    graph.add_edge(from, to, ());
                }
            }
        }
        Self { graph }
    }

    fn cyclic_nodes(&self) -> Vec<ClassId> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .flatten()
            .map(|node| self.graph[node])
            .collect()
    }

    fn to_dot(&self, arena: &ClassArena, only: Option<&[ClassId]>) -> String {
        let included = |id: ClassId| only.is_none_or(|ids| ids.contains(&id));
        let mut dot = String::from("digraph D {\n");
        for node in self.graph.node_indices() {
            let id = self.graph[node];
            if included(id) {
                let _ = writeln!(dot, "    n{} [label=\"{}\"];", node.index(), arena[id].name());
            }
        }
        for edge in self.graph.edge_indices() {
            let Some((from, to)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            if included(self.graph[from]) && included(self.graph[to]) {
                let _ = writeln!(dot, "    n{} -> n{};", from.index(), to.index());
            }
        }
        dot.push_str("}\n");
        dot
    }
}

/// Order `classes` so that every dependency precedes its dependents.
#[must_use]
pub fn classes_topological_sorted(
    arena: &ClassArena,
    classes: &[ClassId],
    extra: &[Dependency],
) -> SortResult {
    let graph = DependencyGraph::build(arena, classes, extra);
    match toposort(&graph.graph, None) {
        Ok(nodes) => SortResult {
            order: nodes.into_iter().map(|node| graph.graph[node]).collect(),
            cyclic: Vec::new(),
        },
        Err(_) => SortResult {
            order: classes.to_vec(),
            cyclic: graph.cyclic_nodes(),
        },
    }
}

impl MetaBuilder {
    /// Sorted `classes`; on a cycle, warns, dumps the graph as DOT to the
    /// temp directory and keeps the input order.
    pub(crate) fn sorted_classes(&self, classes: &[ClassId], extra: &[Dependency]) -> Vec<ClassId> {
        let result = classes_topological_sorted(&self.arena, classes, extra);
        if !result.is_cyclic() {
            return result.order;
        }

        let names: Vec<&str> = result.cyclic.iter().map(|id| self.arena[*id].name()).collect();
        let graph = DependencyGraph::build(&self.arena, classes, extra);
        let only = (self.config.builder.debug_level == DebugLevel::Sparse)
            .then_some(result.cyclic.as_slice());
        let dot = graph.to_dot(&self.arena, only);

        let n = CYCLE_DUMPS.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!("cyclic_dep_{n}.dot"));
        match std::fs::write(&path, dot) {
            Ok(()) => tracing::warn!(
                classes = ?names,
                graph = %path.display(),
                "cyclic class dependency; keeping declaration order"
            ),
            Err(error) => tracing::warn!(
                classes = ?names,
                %error,
                "cyclic class dependency; keeping declaration order (graph not written)"
            ),
        }
        result.order
    }
}
