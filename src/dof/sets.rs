//! Named DOF subsets and the union hierarchy derived from them

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::{FEAError, FEAResult};

/// An ordered sequence of DOF indices with an optional parallel value sequence
/// (enforced SPC values, MPC dependent coefficients).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DofSubset {
    pub indices: Vec<usize>,
    pub values: Option<Vec<f64>>,
}

static EMPTY: DofSubset = DofSubset {
    indices: Vec::new(),
    values: None,
};

impl DofSubset {
    /// An index-only subset
    pub fn new() -> Self {
        Self::default()
    }

    /// A subset that carries one value per index
    pub fn valued() -> Self {
        Self {
            indices: Vec::new(),
            values: Some(Vec::new()),
        }
    }

    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self {
            indices,
            values: None,
        }
    }

    pub fn push(&mut self, index: usize) {
        self.indices.push(index);
        if let Some(values) = self.values.as_mut() {
            values.push(0.0);
        }
    }

    pub fn push_value(&mut self, index: usize, value: f64) {
        self.indices.push(index);
        self.values.get_or_insert_with(Vec::new).push(value);
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Value stored at position `i`; zero for index-only subsets
    pub fn value_at(&self, i: usize) -> f64 {
        self.values
            .as_ref()
            .and_then(|v| v.get(i).copied())
            .unwrap_or(0.0)
    }

    /// `(index, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices
            .iter()
            .enumerate()
            .map(move |(i, &idx)| (idx, self.value_at(i)))
    }
}

/// Nastran set names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SetName {
    /// SPC-eliminated by SPC records (and automatic SPC)
    Sb,
    /// SPC-eliminated by the PS field on grid points
    Sg,
    S,
    /// MPC-eliminated by MPC records
    Mp,
    /// MPC-eliminated by rigid elements
    Mr,
    M,
    C,
    Lm,
    L,
    R,
    T,
    Q,
    A,
    E,
    D,
    O,
    F,
    Fe,
    N,
    Ne,
    G,
    P,
    K,
    J,
    Sa,
    Ks,
    Js,
    Fr,
    V,
}

impl SetName {
    pub const BASE: [SetName; 13] = [
        SetName::Sb,
        SetName::Sg,
        SetName::Mp,
        SetName::Mr,
        SetName::C,
        SetName::Lm,
        SetName::R,
        SetName::Q,
        SetName::O,
        SetName::E,
        SetName::K,
        SetName::J,
        SetName::Sa,
    ];

    pub fn is_base(self) -> bool {
        Self::BASE.contains(&self)
    }
}

impl fmt::Display for SetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{:?}", self).to_lowercase();
        f.write_str(&name)
    }
}

/// Derived sets in dependency order: each entry only reads base sets or
/// entries above it.
pub const UNION_TABLE: &[(SetName, &[SetName])] = &[
    (SetName::S, &[SetName::Sb, SetName::Sg]),
    (SetName::M, &[SetName::Mp, SetName::Mr]),
    (SetName::L, &[SetName::C, SetName::Lm]),
    (SetName::T, &[SetName::L, SetName::R]),
    (SetName::A, &[SetName::T, SetName::Q]),
    (SetName::D, &[SetName::A, SetName::E]),
    (SetName::F, &[SetName::A, SetName::O]),
    (SetName::Fe, &[SetName::F, SetName::E]),
    (SetName::N, &[SetName::F, SetName::S]),
    (SetName::Ne, &[SetName::N, SetName::E]),
    (SetName::G, &[SetName::N, SetName::M]),
    (SetName::P, &[SetName::G, SetName::E]),
    (SetName::Ks, &[SetName::K, SetName::Sa]),
    (SetName::Js, &[SetName::J, SetName::Sa]),
    (SetName::Fr, &[SetName::O, SetName::L]),
    (SetName::V, &[SetName::O, SetName::C, SetName::R]),
];

/// The full named subset hierarchy for one analysis case
#[derive(Debug, Clone, Default, Serialize)]
pub struct DofSets {
    subsets: BTreeMap<SetName, DofSubset>,
}

impl DofSets {
    /// Evaluate [`UNION_TABLE`] over the base sets. Absent base sets are empty.
    pub fn build(mut base: BTreeMap<SetName, DofSubset>) -> FEAResult<Self> {
        if let Some(name) = base.keys().find(|name| !name.is_base()) {
            return Err(FEAError::Configuration(format!(
                "set '{}' is derived and cannot be supplied as a base set",
                name
            )));
        }
        for name in SetName::BASE {
            base.entry(name).or_default();
        }

        let mut subsets = base;
        for (name, inputs) in UNION_TABLE {
            let parts: Vec<&DofSubset> = inputs
                .iter()
                .map(|input| subsets.get(input).unwrap_or(&EMPTY))
                .collect();
            let derived = union(*name, &parts)?;
            subsets.insert(*name, derived);
        }
        Ok(Self { subsets })
    }

    pub fn get(&self, name: SetName) -> &DofSubset {
        self.subsets.get(&name).unwrap_or(&EMPTY)
    }

    pub fn indices(&self, name: SetName) -> &[usize] {
        &self.get(name).indices
    }

    /// The base sets this hierarchy was built from
    pub fn base(&self) -> BTreeMap<SetName, DofSubset> {
        self.subsets
            .iter()
            .filter(|(name, _)| name.is_base())
            .map(|(name, subset)| (*name, subset.clone()))
            .collect()
    }
}

/// Order-preserving union that rejects an index appearing in two inputs.
fn union(name: SetName, parts: &[&DofSubset]) -> FEAResult<DofSubset> {
    let carry_values = parts
        .iter()
        .all(|p| p.is_empty() || p.values.is_some());
    let any_values = parts.iter().any(|p| p.values.is_some());

    let mut result = if carry_values && any_values {
        DofSubset::valued()
    } else {
        DofSubset::new()
    };
    let mut seen = HashSet::with_capacity(parts.iter().map(|p| p.len()).sum());

    for part in parts {
        for (i, &index) in part.indices.iter().enumerate() {
            if !seen.insert(index) {
                return Err(FEAError::DuplicateDof {
                    set: name.to_string(),
                    index,
                });
            }
            if result.values.is_some() {
                result.push_value(index, part.value_at(i));
            } else {
                result.push(index);
            }
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_with(entries: &[(SetName, &[usize])]) -> BTreeMap<SetName, DofSubset> {
        entries
            .iter()
            .map(|(name, idx)| (*name, DofSubset::from_indices(idx.to_vec())))
            .collect()
    }

    #[test]
    fn test_set_names_display_lowercase() {
        assert_eq!(SetName::Sb.to_string(), "sb");
        assert_eq!(SetName::Fe.to_string(), "fe");
    }

    #[test]
    fn test_table_only_reads_earlier_sets() {
        let mut known: Vec<SetName> = SetName::BASE.to_vec();
        for (name, inputs) in UNION_TABLE {
            for input in *inputs {
                assert!(known.contains(input), "{} reads {} before it exists", name, input);
            }
            known.push(*name);
        }
    }

    #[test]
    fn test_disjoint_unions_preserve_order_and_length() {
        let base = base_with(&[
            (SetName::Sb, &[7, 3]),
            (SetName::Sg, &[0, 1]),
            (SetName::Lm, &[2, 4, 5]),
            (SetName::Mp, &[6]),
        ]);
        let sets = DofSets::build(base).unwrap();

        assert_eq!(sets.indices(SetName::S), &[7, 3, 0, 1]);
        assert_eq!(sets.indices(SetName::A), &[2, 4, 5]);
        assert_eq!(sets.indices(SetName::F), &[2, 4, 5]);
        assert_eq!(sets.indices(SetName::N), &[2, 4, 5, 7, 3, 0, 1]);
        assert_eq!(sets.indices(SetName::G), &[2, 4, 5, 7, 3, 0, 1, 6]);
        assert_eq!(sets.get(SetName::G).len(), 8);
        assert!(sets.get(SetName::E).is_empty());
        assert_eq!(sets.indices(SetName::P), sets.indices(SetName::G));
    }

    #[test]
    fn test_overlap_is_flagged() {
        let base = base_with(&[(SetName::Sb, &[1, 2]), (SetName::Sg, &[2])]);
        match DofSets::build(base) {
            Err(FEAError::DuplicateDof { set, index }) => {
                assert_eq!(set, "s");
                assert_eq!(index, 2);
            }
            other => panic!("expected duplicate error, got {:?}", other),
        }
    }

    #[test]
    fn test_spc_and_mpc_overlap_is_flagged_at_g() {
        let base = base_with(&[(SetName::Sb, &[4]), (SetName::Mp, &[4])]);
        assert!(matches!(
            DofSets::build(base),
            Err(FEAError::DuplicateDof { .. })
        ));
    }

    #[test]
    fn test_values_follow_indices() {
        let mut sb = DofSubset::valued();
        sb.push_value(3, 0.25);
        let mut sg = DofSubset::valued();
        sg.push_value(0, 0.0);
        let mut base = BTreeMap::new();
        base.insert(SetName::Sb, sb);
        base.insert(SetName::Sg, sg);
        base.insert(SetName::Lm, DofSubset::from_indices(vec![1, 2]));

        let sets = DofSets::build(base).unwrap();
        assert_eq!(sets.get(SetName::S).values, Some(vec![0.25, 0.0]));
        // mixing valued and index-only inputs drops values
        assert_eq!(sets.get(SetName::N).values, None);
    }

    #[test]
    fn test_build_is_idempotent() {
        let base = base_with(&[(SetName::Sb, &[5]), (SetName::Lm, &[0, 1, 2, 3, 4])]);
        let first = DofSets::build(base).unwrap();
        let second = DofSets::build(first.base()).unwrap();
        for (name, _) in UNION_TABLE {
            assert_eq!(first.get(*name), second.get(*name));
        }
    }

    #[test]
    fn test_derived_name_rejected_as_base() {
        let base = base_with(&[(SetName::A, &[0])]);
        assert!(DofSets::build(base).is_err());
    }
}
