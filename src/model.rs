//! Algorithm Tree Model
//!
//! In-memory description of a family of algorithms. Every [`AlgorithmSpec`]
//! names a type, the header that declares it, and an ordered list of
//! dependency slots. A slot is one template parameter position and holds the
//! ordered alternatives that may fill it.

/// One algorithm and the slots of its template parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmSpec {
    /// Type name as it appears in the generated type expression
    pub name: String,
    /// Header that declares the type
    pub header: String,
    /// Template parameter slots, each an ordered list of alternatives
    pub slots: Vec<Vec<AlgorithmSpec>>,
}

impl AlgorithmSpec {
    /// Create a spec with no slots
    pub fn leaf(name: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: header.into(),
            slots: Vec::new(),
        }
    }

    /// Append a slot filled by the given alternatives
    pub fn with_slot(mut self, alternatives: impl IntoIterator<Item = AlgorithmSpec>) -> Self {
        self.slots.push(alternatives.into_iter().collect());
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of instantiations this spec expands to.
    ///
    /// Returns zero when any slot, at any depth, has no alternatives.
    pub fn instance_count(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| slot.iter().map(AlgorithmSpec::instance_count).sum::<usize>())
            .product()
    }
}

/// A named category of algorithms sharing one registry type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kind {
    /// Registry type name, e.g. `Compressor`
    pub name: String,
    /// Top-level algorithm trees registered under this kind
    pub algorithms: Vec<AlgorithmSpec>,
}

impl Kind {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            algorithms: Vec::new(),
        }
    }

    /// Add a top-level algorithm tree
    pub fn with_algorithm(mut self, spec: AlgorithmSpec) -> Self {
        self.algorithms.push(spec);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_count() {
        let a = AlgorithmSpec::leaf("A", "a.h");
        let b = AlgorithmSpec::leaf("B", "b.h");
        let c = AlgorithmSpec::leaf("C", "c.h");

        assert_eq!(a.instance_count(), 1);

        let top = AlgorithmSpec::leaf("T", "t.h")
            .with_slot([a.clone(), b.clone()])
            .with_slot([a.clone(), b.clone(), c.clone()]);
        assert_eq!(top.instance_count(), 6);

        let nested = AlgorithmSpec::leaf("N", "n.h").with_slot([top, c]);
        assert_eq!(nested.instance_count(), 7);
    }

    #[test]
    fn test_empty_slot_counts_zero() {
        let spec = AlgorithmSpec::leaf("T", "t.h").with_slot([]);
        assert!(!spec.is_leaf());
        assert_eq!(spec.instance_count(), 0);
    }
}
