//! Reference graph validation.
//!
//! Walks the references between definitions ahead of time:
//! - Detects reference cycles
//! - Checks that every referenced identifier is registered
//!
//! Nothing is built. Resolution performs the same checks lazily, so
//! validating is optional and only moves the failures earlier.

use std::collections::{HashMap, HashSet};

use tracing::{debug, instrument, warn};

use stowage_support::rendering::suggest_similar;

use crate::error::{CyclicReferenceError, Result, ServiceNotFoundError, StowageError};

/// One registered definition, reduced to what validation needs.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    /// Identifier as registered
    pub id: String,
    /// Identifiers referenced by arguments and method calls
    pub references: Vec<String>,
}

/// Depth-first validator over the reference graph.
///
/// Identifiers are matched case-insensitively, like container lookups.
pub(crate) struct GraphValidator {
    /// lower-cased identifier → node
    nodes: HashMap<String, Node>,
    /// Nodes on the current DFS path (lower-cased)
    visiting: HashSet<String>,
    /// Nodes whose whole subgraph is known good (lower-cased)
    validated: HashSet<String>,
    /// Current DFS path, as registered, for error reporting
    path: Vec<String>,
}

impl GraphValidator {
    pub fn new(nodes: impl IntoIterator<Item = Node>) -> Self {
        Self {
            nodes: nodes
                .into_iter()
                .map(|node| (node.id.to_lowercase(), node))
                .collect(),
            visiting: HashSet::new(),
            validated: HashSet::new(),
            path: Vec::new(),
        }
    }

    /// Validates the entire graph.
    ///
    /// Roots are visited in sorted order so the reported error is
    /// deterministic.
    ///
    /// # Errors
    /// - [`StowageError::CyclicReference`]: cycle detected
    /// - [`StowageError::ServiceNotFound`]: dangling reference
    #[instrument(skip(self), name = "graph_validation")]
    pub fn validate(&mut self) -> Result<()> {
        let mut roots: Vec<String> = self.nodes.values().map(|node| node.id.clone()).collect();
        roots.sort();

        debug!(
            definition_count = roots.len(),
            "Starting reference graph validation"
        );

        for id in roots {
            self.visit(&id)?;
        }

        debug!("Reference graph validation passed");
        Ok(())
    }

    fn visit(&mut self, id: &str) -> Result<()> {
        let folded = id.to_lowercase();

        if self.validated.contains(&folded) {
            return Ok(());
        }

        if self.visiting.contains(&folded) {
            let start = self
                .path
                .iter()
                .position(|entry| entry.to_lowercase() == folded)
                .unwrap_or(0);

            let mut chain = self.path[start..].to_vec();
            chain.push(self.path[start].clone());

            warn!(cycle = ?chain, "Reference cycle detected");
            return Err(StowageError::CyclicReference(
                CyclicReferenceError { chain },
            ));
        }

        let Some(node) = self.nodes.get(&folded).cloned() else {
            let known: Vec<&str> = self.nodes.values().map(|node| node.id.as_str()).collect();
            return Err(StowageError::ServiceNotFound(ServiceNotFoundError {
                requested: id.to_owned(),
                required_by: self.path.last().cloned(),
                suggestions: suggest_similar(id, &known, 3),
            }));
        };

        self.visiting.insert(folded.clone());
        self.path.push(node.id.clone());

        for reference in &node.references {
            self.visit(reference)?;
        }

        self.path.pop();
        self.visiting.remove(&folded);
        self.validated.insert(folded);

        Ok(())
    }
}
