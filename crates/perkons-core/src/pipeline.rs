//! Pipeline topology: step registry, ordering edges, and traversal.

use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::spec::StepSpec;

/// Unique identifier of a step within one pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(pub String);

impl StepId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StepId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StepId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A declarative DAG of component steps.
///
/// Steps are kept in registration order. Two kinds of edges order them:
/// explicit constraints declared with [`Pipeline::after`], and data
/// dependencies derived from volume claims (a step that mounts a claim
/// runs after the volume step providing it). [`Pipeline::edges`] returns
/// the transitive reduction of the union, so an ordering already implied
/// by a longer path is not reported as a separate edge.
///
/// Registration validates each spec's own fields. Cross-step checks
/// (claim resolution, acyclicity) run when the topology is queried, since
/// a claim may legitimately be registered before its provider.
#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    description: String,
    steps: IndexMap<StepId, StepSpec>,
    /// Declared constraints, stored as (prerequisite, dependent).
    orderings: Vec<(StepId, StepId)>,
}

impl Pipeline {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        let name = name.into();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(PipelineError::InvalidPipelineName(name));
        }
        Ok(Self {
            name,
            description: description.into(),
            steps: IndexMap::new(),
            orderings: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Register a step. The spec's field constraints are checked here;
    /// the returned id is handed back for use in [`Pipeline::after`].
    pub fn add_step(
        &mut self,
        id: impl Into<StepId>,
        spec: impl Into<StepSpec>,
    ) -> Result<StepId, PipelineError> {
        let id = id.into();
        if id.as_str().trim().is_empty() {
            return Err(PipelineError::EmptyStepId);
        }
        let spec = spec.into();
        spec.validate()?;
        if self.steps.contains_key(&id) {
            return Err(PipelineError::DuplicateStep(id.0));
        }
        self.steps.insert(id.clone(), spec);
        Ok(id)
    }

    /// Declare that `step` must run after `prerequisite`. Declaring the
    /// same constraint twice is a no-op.
    pub fn after(&mut self, step: &StepId, prerequisite: &StepId) -> Result<(), PipelineError> {
        if !self.steps.contains_key(step) {
            return Err(PipelineError::UnknownStep(step.to_string()));
        }
        if !self.steps.contains_key(prerequisite) {
            return Err(PipelineError::UnknownStep(prerequisite.to_string()));
        }
        if step == prerequisite {
            return Err(PipelineError::SelfDependency(step.to_string()));
        }
        let edge = (prerequisite.clone(), step.clone());
        if !self.orderings.contains(&edge) {
            self.orderings.push(edge);
        }
        Ok(())
    }

    pub fn get(&self, id: &StepId) -> Option<&StepSpec> {
        self.steps.get(id)
    }

    pub fn get_mut(&mut self, id: &StepId) -> Option<&mut StepSpec> {
        self.steps.get_mut(id)
    }

    /// Step ids in registration order.
    pub fn step_ids(&self) -> impl Iterator<Item = &StepId> {
        self.steps.keys()
    }

    /// Steps with their specs, in registration order.
    pub fn steps(&self) -> impl Iterator<Item = (&StepId, &StepSpec)> {
        self.steps.iter()
    }

    /// Map each provided claim name to its volume step.
    fn claim_providers(&self) -> Result<HashMap<&str, &StepId>, PipelineError> {
        let mut providers: HashMap<&str, &StepId> = HashMap::new();
        for (id, spec) in &self.steps {
            if let Some(claim) = spec.provided_claim() {
                if let Some(first) = providers.insert(claim, id) {
                    return Err(PipelineError::DuplicateClaim {
                        claim: claim.to_string(),
                        first: first.to_string(),
                        second: id.to_string(),
                    });
                }
            }
        }
        Ok(providers)
    }

    /// Claim edges followed by declared orderings, deduplicated, before
    /// reduction. Both endpoints of every returned edge are registered
    /// steps.
    fn raw_edges(&self) -> Result<Vec<(StepId, StepId)>, PipelineError> {
        let providers = self.claim_providers()?;
        let mut edges: Vec<(StepId, StepId)> = Vec::new();
        for (id, spec) in &self.steps {
            if let Some(claim) = spec.claim_reference() {
                let provider = match providers.get(claim) {
                    Some(provider) => *provider,
                    None => {
                        return Err(PipelineError::DanglingClaim {
                            step: id.to_string(),
                            claim: claim.to_string(),
                        })
                    }
                };
                let edge = (provider.clone(), id.clone());
                if !edges.contains(&edge) {
                    edges.push(edge);
                }
            }
        }
        for edge in &self.orderings {
            if !edges.contains(edge) {
                edges.push(edge.clone());
            }
        }
        Ok(edges)
    }

    /// Edges of the resolved graph as (prerequisite, dependent) pairs,
    /// transitively reduced and in deterministic order.
    pub fn edges(&self) -> Result<Vec<(StepId, StepId)>, PipelineError> {
        let raw = self.raw_edges()?;
        let mut successors: HashMap<&StepId, Vec<&StepId>> = HashMap::new();
        for (from, to) in &raw {
            successors.entry(from).or_default().push(to);
        }
        let reduced = raw
            .iter()
            .filter(|(from, to)| !has_indirect_path(&successors, from, to))
            .cloned()
            .collect();
        Ok(reduced)
    }

    /// Direct prerequisites of `id` after reduction.
    pub fn dependencies_of(&self, id: &StepId) -> Result<Vec<StepId>, PipelineError> {
        if !self.steps.contains_key(id) {
            return Err(PipelineError::UnknownStep(id.to_string()));
        }
        let deps = self
            .edges()?
            .into_iter()
            .filter(|(_, to)| to == id)
            .map(|(from, _)| from)
            .collect();
        Ok(deps)
    }

    /// Number of direct prerequisites of `id` after reduction.
    pub fn in_degree(&self, id: &StepId) -> Result<usize, PipelineError> {
        Ok(self.dependencies_of(id)?.len())
    }

    /// Total number of edges after reduction.
    pub fn edge_count(&self) -> Result<usize, PipelineError> {
        Ok(self.edges()?.len())
    }

    /// Steps in execution order: a topological sort of the resolved
    /// graph, with ties broken by registration order so the result is
    /// stable across runs.
    pub fn execution_order(&self) -> Result<Vec<StepId>, PipelineError> {
        let edges = self.raw_edges()?;
        let index_of: HashMap<&StepId, usize> = self
            .steps
            .keys()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        let mut in_degree = vec![0usize; self.steps.len()];
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); self.steps.len()];
        for (from, to) in &edges {
            if let (Some(&f), Some(&t)) = (index_of.get(from), index_of.get(to)) {
                in_degree[t] += 1;
                successors[f].push(t);
            }
        }

        let mut emitted = vec![false; self.steps.len()];
        let mut order = Vec::with_capacity(self.steps.len());
        for _ in 0..self.steps.len() {
            let next = (0..self.steps.len()).find(|&i| !emitted[i] && in_degree[i] == 0);
            match next {
                Some(i) => {
                    emitted[i] = true;
                    if let Some((id, _)) = self.steps.get_index(i) {
                        order.push(id.clone());
                    }
                    for &t in &successors[i] {
                        in_degree[t] -= 1;
                    }
                }
                None => {
                    let stuck = self
                        .steps
                        .keys()
                        .enumerate()
                        .find(|(i, _)| !emitted[*i])
                        .map(|(_, id)| id.to_string())
                        .unwrap_or_default();
                    return Err(PipelineError::CycleDetected(stuck));
                }
            }
        }
        Ok(order)
    }

    /// Check the whole pipeline: every spec's fields, claim resolution,
    /// and acyclicity.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for spec in self.steps.values() {
            spec.validate()?;
        }
        self.edges()?;
        self.execution_order()?;
        Ok(())
    }
}

/// True when `to` is reachable from `from` through at least one
/// intermediate step, i.e. the direct edge is implied by a longer path.
fn has_indirect_path(
    successors: &HashMap<&StepId, Vec<&StepId>>,
    from: &StepId,
    to: &StepId,
) -> bool {
    let starts = match successors.get(from) {
        Some(starts) => starts,
        None => return false,
    };
    let mut stack: Vec<&StepId> = starts.iter().copied().filter(|next| *next != to).collect();
    let mut visited: HashSet<&StepId> = stack.iter().copied().collect();
    while let Some(node) = stack.pop() {
        if let Some(nexts) = successors.get(node) {
            for &next in nexts {
                if next == to {
                    return true;
                }
                if visited.insert(next) {
                    stack.push(next);
                }
            }
        }
    }
    false
}
