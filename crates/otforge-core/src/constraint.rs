//! Constraints and constraint universes.
//!
//! A [`ConstraintUniverse`] is the fixed, ordered set of constraints every
//! ERC, hierarchy and competition of a run is built over. It is created once
//! and shared through an [`Arc`]; nothing in the engine mutates it.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{OtError, Result};

/// Index of a constraint in its universe.
pub type ConstraintId = usize;

/// Classification of a constraint.
///
/// # Example
///
/// ```
/// use otforge_core::ConstraintKind;
///
/// assert_eq!(ConstraintKind::Markedness.to_string(), "M");
/// assert_ne!(ConstraintKind::Markedness, ConstraintKind::Faithfulness);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKind {
    /// Evaluates output forms only.
    Markedness,
    /// Evaluates input/output correspondence.
    Faithfulness,
}

impl ConstraintKind {
    /// Returns the opposite kind.
    pub fn opposite(self) -> Self {
        match self {
            ConstraintKind::Markedness => ConstraintKind::Faithfulness,
            ConstraintKind::Faithfulness => ConstraintKind::Markedness,
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstraintKind::Markedness => write!(f, "M"),
            ConstraintKind::Faithfulness => write!(f, "F"),
        }
    }
}

/// A named constraint.
///
/// Identity is the pair of name and kind; `id` only records the position of
/// the constraint in its universe.
#[derive(Debug, Clone)]
pub struct Constraint {
    name: String,
    id: ConstraintId,
    kind: ConstraintKind,
}

impl Constraint {
    /// Returns the constraint name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the index of this constraint in its universe.
    #[inline]
    pub fn id(&self) -> ConstraintId {
        self.id
    }

    /// Returns the constraint kind.
    #[inline]
    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn is_markedness(&self) -> bool {
        self.kind == ConstraintKind::Markedness
    }

    pub fn is_faithfulness(&self) -> bool {
        self.kind == ConstraintKind::Faithfulness
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.kind.hash(state);
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The ordered, immutable set of constraints for one learning run.
///
/// # Example
///
/// ```
/// use otforge_core::{ConstraintKind, ConstraintUniverse};
///
/// let universe = ConstraintUniverse::builder()
///     .markedness("Onset")
///     .markedness("NoCoda")
///     .faithfulness("Max")
///     .build()
///     .unwrap();
///
/// assert_eq!(universe.len(), 3);
/// assert_eq!(universe.id_of("Max"), Some(2));
/// assert_eq!(universe.get(0).unwrap().kind(), ConstraintKind::Markedness);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintUniverse {
    constraints: Vec<Constraint>,
}

impl ConstraintUniverse {
    /// Creates a universe from `(name, kind)` pairs in ranking-irrelevant order.
    ///
    /// # Errors
    ///
    /// Returns [`OtError::DuplicateConstraint`] if two constraints share a name.
    pub fn new<I, S>(specs: I) -> Result<Arc<Self>>
    where
        I: IntoIterator<Item = (S, ConstraintKind)>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut constraints = Vec::new();
        for (id, (name, kind)) in specs.into_iter().enumerate() {
            let name = name.into();
            if !seen.insert(name.clone()) {
                return Err(OtError::DuplicateConstraint(name));
            }
            constraints.push(Constraint { name, id, kind });
        }
        Ok(Arc::new(Self { constraints }))
    }

    /// Starts building a universe constraint by constraint.
    pub fn builder() -> UniverseBuilder {
        UniverseBuilder::default()
    }

    /// Returns the number of constraints.
    #[inline]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Returns the constraint at `id`.
    pub fn get(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    /// Returns the constraint named `name`.
    pub fn by_name(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Returns the id of the constraint named `name`.
    pub fn id_of(&self, name: &str) -> Option<ConstraintId> {
        self.by_name(name).map(Constraint::id)
    }

    /// Resolves a constraint name, failing on unknown names.
    pub fn require(&self, name: &str) -> Result<ConstraintId> {
        self.id_of(name)
            .ok_or_else(|| OtError::UnknownConstraint(name.to_string()))
    }

    /// Returns the name of the constraint at `id`, or `"?"` when out of range.
    pub fn name_of(&self, id: ConstraintId) -> &str {
        self.constraints.get(id).map_or("?", |c| c.name.as_str())
    }

    /// Returns the kind of the constraint at `id`.
    pub fn kind_of(&self, id: ConstraintId) -> Option<ConstraintKind> {
        self.constraints.get(id).map(Constraint::kind)
    }

    /// Iterates over the constraints in id order.
    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    /// Returns the ids of all constraints of the given kind.
    pub fn of_kind(&self, kind: ConstraintKind) -> Vec<ConstraintId> {
        self.constraints
            .iter()
            .filter(|c| c.kind == kind)
            .map(Constraint::id)
            .collect()
    }

    pub fn markedness(&self) -> Vec<ConstraintId> {
        self.of_kind(ConstraintKind::Markedness)
    }

    pub fn faithfulness(&self) -> Vec<ConstraintId> {
        self.of_kind(ConstraintKind::Faithfulness)
    }

    /// Returns true if both universes hold the same constraints in the same order.
    pub fn same_as(&self, other: &ConstraintUniverse) -> bool {
        std::ptr::eq(self, other) || self == other
    }
}

impl<'a> IntoIterator for &'a ConstraintUniverse {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}

/// Builder for [`ConstraintUniverse`].
#[derive(Debug, Default)]
pub struct UniverseBuilder {
    specs: Vec<(String, ConstraintKind)>,
}

impl UniverseBuilder {
    /// Adds a markedness constraint.
    pub fn markedness(mut self, name: impl Into<String>) -> Self {
        self.specs.push((name.into(), ConstraintKind::Markedness));
        self
    }

    /// Adds a faithfulness constraint.
    pub fn faithfulness(mut self, name: impl Into<String>) -> Self {
        self.specs.push((name.into(), ConstraintKind::Faithfulness));
        self
    }

    /// Adds a constraint of the given kind.
    pub fn constraint(mut self, name: impl Into<String>, kind: ConstraintKind) -> Self {
        self.specs.push((name.into(), kind));
        self
    }

    /// Builds the universe.
    pub fn build(self) -> Result<Arc<ConstraintUniverse>> {
        ConstraintUniverse::new(self.specs)
    }
}
