use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::graph::NodeIndex;
use petgraph::{Directed, Graph};
use tracing::debug;

use warden_core::record::{ServiceId, ServiceRecord};

/// Result of validating one service's dependency graph
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Whether the graph is safe to execute
    pub is_valid: bool,
    /// Every issue found; empty when valid
    pub issues: Vec<ValidationIssue>,
    /// Topological startup order, dependencies first. Present even for an
    /// invalid graph (whatever partial order was computable), but must not
    /// be treated as safe to execute unless `is_valid` holds.
    pub startup_order: Vec<ServiceId>,
}

impl ValidationReport {
    /// Render every issue as a human-readable message
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.to_string()).collect()
    }
}

/// Validation issue types
#[derive(Debug, Clone)]
pub enum ValidationIssue {
    /// A declared dependency id does not exist in the known record set
    MissingDependency {
        dependency: ServiceId,
        required_by: String,
    },
    /// A service declares itself as a dependency
    SelfDependency { service: String },
    /// A dependency chain closes back on itself
    CircularDependency { chain: Vec<String> },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingDependency {
                dependency,
                required_by,
            } => write!(
                f,
                "missing dependency {} required by '{}'",
                dependency, required_by
            ),
            ValidationIssue::SelfDependency { service } => {
                write!(f, "service '{}' depends on itself", service)
            }
            ValidationIssue::CircularDependency { chain } => {
                write!(f, "circular dependency: {}", chain.join(" -> "))
            }
        }
    }
}

/// Validates the dependency graph implied by a set of service records and
/// computes a safe startup order for one target service.
#[derive(Debug, Clone, Default)]
pub struct DependencyValidator;

impl DependencyValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate `target` against the full known record set.
    ///
    /// Reports every missing dependency (no short-circuit on the first),
    /// every cycle reachable from the target, and the post-order startup
    /// order. Ordering is deterministic: traversal follows each record's
    /// declared dependency order.
    pub fn validate(&self, target: &ServiceRecord, known: &[ServiceRecord]) -> ValidationReport {
        let ctx = GraphContext::build(target, known);
        let mut issues = ctx.structural_issues();
        issues.extend(ctx.find_cycles());

        let startup_order = ctx.startup_order();
        debug!(
            target = %target.name,
            issues = issues.len(),
            order_len = startup_order.len(),
            "dependency validation finished"
        );

        ValidationReport {
            is_valid: issues.is_empty(),
            issues,
            startup_order,
        }
    }
}

/// Dependency graph built from the known record set, rooted at one target.
/// Edges to unknown ids and self-edges never enter the graph; they are
/// reported as structural issues from the raw records instead.
struct GraphContext<'a> {
    graph: Graph<ServiceId, (), Directed>,
    records: HashMap<ServiceId, &'a ServiceRecord>,
    target: NodeIndex,
}

impl<'a> GraphContext<'a> {
    fn build(target: &'a ServiceRecord, known: &'a [ServiceRecord]) -> Self {
        let mut records: HashMap<ServiceId, &ServiceRecord> =
            known.iter().map(|r| (r.id, r)).collect();
        records.entry(target.id).or_insert(target);

        let mut graph = Graph::new();
        let mut index_of = HashMap::new();
        for record in known {
            let idx = graph.add_node(record.id);
            index_of.insert(record.id, idx);
        }
        let target_idx = match index_of.get(&target.id) {
            Some(&idx) => idx,
            None => {
                let idx = graph.add_node(target.id);
                index_of.insert(target.id, idx);
                idx
            }
        };

        // Edges in declared order per record
        for record in records.values() {
            let from = index_of[&record.id];
            for dep in &record.dependencies {
                if *dep == record.id {
                    continue;
                }
                if let Some(&to) = index_of.get(dep) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        Self {
            graph,
            records,
            target: target_idx,
        }
    }

    fn name_of(&self, idx: NodeIndex) -> String {
        let id = self.graph[idx];
        self.records
            .get(&id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Outgoing neighbors in declared dependency order. `neighbors` walks
    /// edges most-recently-added first, so the collected list is reversed
    /// to restore insertion order.
    fn ordered_deps(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut deps: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        deps.reverse();
        deps
    }

    /// Existence and self-reference checks over everything reachable from
    /// the target. All missing dependencies are reported, not just the
    /// first.
    fn structural_issues(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = vec![self.target];
        while let Some(idx) = queue.pop() {
            if !seen.insert(idx) {
                continue;
            }
            let record = self.records[&self.graph[idx]];
            for dep in &record.dependencies {
                if *dep == record.id {
                    issues.push(ValidationIssue::SelfDependency {
                        service: record.name.clone(),
                    });
                } else if !self.records.contains_key(dep) {
                    issues.push(ValidationIssue::MissingDependency {
                        dependency: *dep,
                        required_by: record.name.clone(),
                    });
                }
            }
            let mut deps = self.ordered_deps(idx);
            deps.reverse();
            queue.extend(deps);
        }
        issues
    }

    /// Depth-first cycle detection with a visited set and an active
    /// recursion stack. A dependency already on the stack closes a cycle;
    /// the reported chain runs from its first occurrence on the stack back
    /// to itself.
    fn find_cycles(&self) -> Vec<ValidationIssue> {
        let mut cycles = Vec::new();
        let mut visited = HashSet::new();
        let mut on_stack = HashSet::new();
        let mut stack = Vec::new();
        self.find_cycles_recursive(
            self.target,
            &mut visited,
            &mut on_stack,
            &mut stack,
            &mut cycles,
        );
        cycles
    }

    fn find_cycles_recursive(
        &self,
        idx: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        on_stack: &mut HashSet<NodeIndex>,
        stack: &mut Vec<NodeIndex>,
        cycles: &mut Vec<ValidationIssue>,
    ) {
        visited.insert(idx);
        on_stack.insert(idx);
        stack.push(idx);

        for dep in self.ordered_deps(idx) {
            if on_stack.contains(&dep) {
                let start = stack.iter().position(|&n| n == dep).unwrap();
                let mut chain: Vec<String> =
                    stack[start..].iter().map(|&n| self.name_of(n)).collect();
                chain.push(self.name_of(dep));
                cycles.push(ValidationIssue::CircularDependency { chain });
            } else if !visited.contains(&dep) {
                self.find_cycles_recursive(dep, visited, on_stack, stack, cycles);
            }
        }

        stack.pop();
        on_stack.remove(&idx);
    }

    /// Depth-first post-order from the target: each dependency is fully
    /// ordered before its dependent is appended, and a node already placed
    /// is never appended again, so shared ancestors in a diamond come out
    /// once, before all of their dependents.
    fn startup_order(&self) -> Vec<ServiceId> {
        let mut placed = HashSet::new();
        let mut on_path = HashSet::new();
        let mut order = Vec::new();
        self.order_recursive(self.target, &mut placed, &mut on_path, &mut order);
        order.into_iter().map(|idx| self.graph[idx]).collect()
    }

    fn order_recursive(
        &self,
        idx: NodeIndex,
        placed: &mut HashSet<NodeIndex>,
        on_path: &mut HashSet<NodeIndex>,
        order: &mut Vec<NodeIndex>,
    ) {
        if placed.contains(&idx) {
            return;
        }
        on_path.insert(idx);
        for dep in self.ordered_deps(idx) {
            // a dependency already on the active path is a cycle; the
            // cycle pass reports it, ordering just refuses to recurse
            if !on_path.contains(&dep) {
                self.order_recursive(dep, placed, on_path, order);
            }
        }
        on_path.remove(&idx);
        placed.insert(idx);
        order.push(idx);
    }
}
