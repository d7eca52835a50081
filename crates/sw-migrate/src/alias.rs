//! Unique alias derivation for existing rows.
//!
//! Rows carry a free-text label. Each row gets an alias derived from that
//! label through an [`AliasProjection`]. Labels that project to the same
//! alias but differ in their original text are a collision: the first label
//! (by ascending row id) keeps the bare alias, the others get a numeric
//! suffix starting at 2. Rows with identical labels always share an alias.
//!
//! The computation is pure; persisting the result is the caller's job.

use std::collections::{HashMap, HashSet};

/// Alias used when a label projects to nothing (e.g. it is all punctuation).
pub const FALLBACK_ALIAS: &str = "group";

/// Reduces a display label to its candidate alias.
pub trait AliasProjection {
    fn project(&self, text: &str) -> String;
}

/// ASCII case-folded projection keeping only letters and digits.
#[derive(Debug, Default, Clone, Copy)]
pub struct SafeAlias;

impl AliasProjection for SafeAlias {
    fn project(&self, text: &str) -> String {
        let alias: String = text
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if alias.is_empty() {
            FALLBACK_ALIAS.to_string()
        } else {
            alias
        }
    }
}

impl<F: Fn(&str) -> String> AliasProjection for F {
    fn project(&self, text: &str) -> String {
        self(text)
    }
}

/// Input row: key and display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelledRow {
    pub id: i64,
    pub text: String,
}

impl LabelledRow {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Alias chosen for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasAssignment {
    pub id: i64,
    pub alias: String,
}

/// Labels that shared a projected alias and had to be told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasCollision {
    /// Shared projected alias, kept by the first label
    pub alias: String,
    /// Distinct labels in assignment order
    pub texts: Vec<String>,
}

/// Result of [`plan_aliases`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasPlan {
    /// One entry per input row, ordered by ascending id
    pub assignments: Vec<AliasAssignment>,
    /// One entry per colliding partition, in partition order
    pub collisions: Vec<AliasCollision>,
}

impl AliasPlan {
    pub fn alias_of(&self, id: i64) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.alias.as_str())
    }
}

struct Partition<'r> {
    key: String,
    // (label, ids) in first-appearance order
    groups: Vec<(&'r str, Vec<i64>)>,
}

/// Compute a unique alias for every row.
///
/// Rows are visited by ascending id, so the result does not depend on the
/// order the caller fetched them in.
pub fn plan_aliases<P: AliasProjection + ?Sized>(rows: &[LabelledRow], projection: &P) -> AliasPlan {
    let mut ordered: Vec<&LabelledRow> = rows.iter().collect();
    ordered.sort_by_key(|row| row.id);

    let mut partitions: Vec<Partition<'_>> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for row in &ordered {
        let key = projection.project(&row.text);
        let index = *by_key.entry(key.clone()).or_insert_with(|| {
            partitions.push(Partition {
                key,
                groups: Vec::new(),
            });
            partitions.len() - 1
        });

        let partition = &mut partitions[index];
        match partition
            .groups
            .iter_mut()
            .find(|(text, _)| *text == row.text.as_str())
        {
            Some((_, ids)) => ids.push(row.id),
            None => partition.groups.push((row.text.as_str(), vec![row.id])),
        }
    }

    // Every bare key is spoken for before any suffix is handed out, so a
    // suffixed alias can never shadow another partition's natural alias.
    let mut taken: HashSet<String> = partitions.iter().map(|p| p.key.clone()).collect();
    let mut alias_by_id: HashMap<i64, String> = HashMap::with_capacity(rows.len());
    let mut collisions = Vec::new();

    for partition in &partitions {
        let mut suffix = 2u32;
        for (position, (_, ids)) in partition.groups.iter().enumerate() {
            let alias = if position == 0 {
                partition.key.clone()
            } else {
                loop {
                    let candidate = format!("{}{}", partition.key, suffix);
                    suffix += 1;
                    if taken.insert(candidate.clone()) {
                        break candidate;
                    }
                }
            };
            for id in ids {
                alias_by_id.insert(*id, alias.clone());
            }
        }

        if partition.groups.len() > 1 {
            collisions.push(AliasCollision {
                alias: partition.key.clone(),
                texts: partition
                    .groups
                    .iter()
                    .map(|(text, _)| text.to_string())
                    .collect(),
            });
        }
    }

    let assignments = ordered
        .iter()
        .map(|row| AliasAssignment {
            id: row.id,
            alias: alias_by_id.get(&row.id).cloned().unwrap_or_default(),
        })
        .collect();

    AliasPlan {
        assignments,
        collisions,
    }
}

#[cfg(test)]
#[path = "alias_test.rs"]
mod tests;
