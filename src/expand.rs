//! Dependency Expansion Engine
//!
//! Turns algorithm trees into the full list of concrete instantiations. Each
//! slot is expanded on its own, then the cartesian product across slots is
//! taken with the first slot varying slowest.
//!
//! # Hierarchy
//!
//! Every level prepends its own name to the concatenated hierarchies of the
//! chosen alternatives, so names that recur at several depths appear once per
//! occurrence. The balancer counts these labels, which makes deeply shared
//! components weigh more when picking a split.

use thiserror::Error;
use tracing::debug;

use crate::model::{AlgorithmSpec, Kind};
use crate::naming;

/// Expansion errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    #[error("algorithm `{algorithm}` has no alternatives for slot {slot}")]
    EmptySlot { algorithm: String, slot: usize },
}

/// Result type for expansion.
pub type ExpandResult<T> = Result<T, ExpandError>;

/// One concrete instantiation of an algorithm tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Headers needed to compile the instantiation, first-seen order, no duplicates
    pub headers: Vec<String>,
    /// Canonical type expression, e.g. `B<A,C>`
    pub type_expression: String,
    /// Every algorithm name in the instantiation, used for grouping affinity
    pub hierarchy: Vec<String>,
    /// Stable identifier derived from the type expression
    pub identifier: String,
}

impl Instance {
    fn new(headers: Vec<String>, type_expression: String, hierarchy: Vec<String>) -> Self {
        let identifier = naming::identifier(&type_expression);
        Self {
            headers,
            type_expression,
            hierarchy,
            identifier,
        }
    }

    /// Whether `label` appears anywhere in the hierarchy
    pub fn has_label(&self, label: &str) -> bool {
        self.hierarchy.iter().any(|name| name == label)
    }
}

/// Expand every tree of the list, in order.
pub fn expand_all(specs: &[AlgorithmSpec]) -> ExpandResult<Vec<Instance>> {
    let mut out = Vec::new();
    for spec in specs {
        out.extend(expand(spec)?);
    }
    Ok(out)
}

/// Expand the algorithms of one kind.
pub fn expand_kind(kind: &Kind) -> ExpandResult<Vec<Instance>> {
    let instances = expand_all(&kind.algorithms)?;
    debug!(
        kind = %kind.name,
        roots = kind.algorithms.len(),
        instances = instances.len(),
        "expanded kind"
    );
    Ok(instances)
}

/// Expand a single tree into all of its instantiations.
pub fn expand(spec: &AlgorithmSpec) -> ExpandResult<Vec<Instance>> {
    if spec.is_leaf() {
        return Ok(vec![Instance::new(
            vec![spec.header.clone()],
            spec.name.clone(),
            vec![spec.name.clone()],
        )]);
    }

    let mut choices: Vec<Vec<Instance>> = Vec::with_capacity(spec.slots.len());
    for (slot, alternatives) in spec.slots.iter().enumerate() {
        let expanded = expand_all(alternatives)?;
        if expanded.is_empty() {
            return Err(ExpandError::EmptySlot {
                algorithm: spec.name.clone(),
                slot,
            });
        }
        choices.push(expanded);
    }

    Ok(Product::new(&choices)
        .map(|combination| compose(spec, &combination))
        .collect())
}

fn compose(spec: &AlgorithmSpec, combination: &[&Instance]) -> Instance {
    let mut headers: Vec<String> = Vec::new();
    let mut args = Vec::with_capacity(combination.len());
    let mut hierarchy = vec![spec.name.clone()];

    for child in combination {
        for header in &child.headers {
            push_unique(&mut headers, header);
        }
        args.push(child.type_expression.as_str());
        hierarchy.extend(child.hierarchy.iter().cloned());
    }
    push_unique(&mut headers, &spec.header);

    let expression = format!("{}<{}>", spec.name, args.join(","));
    Instance::new(headers, expression, hierarchy)
}

fn push_unique(headers: &mut Vec<String>, header: &str) {
    if !headers.iter().any(|h| h == header) {
        headers.push(header.to_string());
    }
}

/// Lexicographic cartesian product over non-empty choice lists.
struct Product<'a> {
    choices: &'a [Vec<Instance>],
    cursor: Vec<usize>,
    done: bool,
}

impl<'a> Product<'a> {
    fn new(choices: &'a [Vec<Instance>]) -> Self {
        Self {
            choices,
            cursor: vec![0; choices.len()],
            done: choices.iter().any(Vec::is_empty),
        }
    }
}

impl<'a> Iterator for Product<'a> {
    type Item = Vec<&'a Instance>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self
            .cursor
            .iter()
            .zip(self.choices)
            .map(|(&i, list)| &list[i])
            .collect();

        // Advance the last slot first
        self.done = true;
        for pos in (0..self.cursor.len()).rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] < self.choices[pos].len() {
                self.done = false;
                break;
            }
            self.cursor[pos] = 0;
        }
        Some(item)
    }
}
