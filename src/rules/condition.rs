//! Condition trees.
//!
//! ```text
//!            Composite(or)
//!            /           \
//!   Clause(ph > 7.8)   Composite(and)
//!                       /          \
//!               Clause(do < 5)  Clause(waterTemp >= 28)
//! ```
//!
//! A [`Condition`] is either a leaf [`Clause`] or a [`Composite`] of child
//! conditions.  The JSON layout matches the dashboard's rule editor:
//! composites carry `op: "and" | "or"` and a `clauses` array (an optional
//! `"type": "composite"` tag is accepted and ignored); leaves carry
//! `metric`, `op` and `value`.
//!
//! Evaluation is side-effect free, so `and`/`or` short-circuit.  A clause
//! whose metric is absent from the snapshot is `false` (fail-closed).

use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::snapshot::MetricSnapshot;

/// Comparison operator of a leaf clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
}

impl CompareOp {
    pub fn compare(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Self::Gt => lhs > rhs,
            Self::Lt => lhs < rhs,
            Self::Ge => lhs >= rhs,
            Self::Le => lhs <= rhs,
            Self::Eq => lhs == rhs,
        }
    }
}

/// Boolean connective of a composite node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicOp {
    And,
    Or,
}

/// Leaf: `snapshot[metric] <op> value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    pub metric: String,
    pub op: CompareOp,
    pub value: f64,
}

impl Clause {
    pub fn evaluate(&self, snap: &MetricSnapshot) -> bool {
        snap.get(&self.metric)
            .is_some_and(|reading| self.op.compare(reading, self.value))
    }
}

/// Internal node combining one or more child conditions.
///
/// Deserialization rejects an empty `clauses` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawComposite")]
pub struct Composite {
    pub op: LogicOp,
    pub clauses: Vec<Condition>,
}

#[derive(Deserialize)]
struct RawComposite {
    op: LogicOp,
    clauses: Vec<Condition>,
}

impl TryFrom<RawComposite> for Composite {
    type Error = RuleError;

    fn try_from(raw: RawComposite) -> Result<Self, Self::Error> {
        if raw.clauses.is_empty() {
            return Err(RuleError::EmptyComposite);
        }
        Ok(Self {
            op: raw.op,
            clauses: raw.clauses,
        })
    }
}

/// A composite boolean expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Composite(Composite),
    Clause(Clause),
}

impl Condition {
    /// Leaf clause shorthand.
    pub fn clause(metric: impl Into<String>, op: CompareOp, value: f64) -> Self {
        Self::Clause(Clause {
            metric: metric.into(),
            op,
            value,
        })
    }

    /// `and` over `clauses`; rejects an empty list.
    pub fn all(clauses: Vec<Condition>) -> Result<Self, RuleError> {
        Self::composite(LogicOp::And, clauses)
    }

    /// `or` over `clauses`; rejects an empty list.
    pub fn any(clauses: Vec<Condition>) -> Result<Self, RuleError> {
        Self::composite(LogicOp::Or, clauses)
    }

    pub fn composite(op: LogicOp, clauses: Vec<Condition>) -> Result<Self, RuleError> {
        if clauses.is_empty() {
            return Err(RuleError::EmptyComposite);
        }
        Ok(Self::Composite(Composite { op, clauses }))
    }

    /// Evaluate against a snapshot.
    ///
    /// An empty composite (only reachable by bypassing validation) is
    /// `false`, never vacuously true.
    pub fn evaluate(&self, snap: &MetricSnapshot) -> bool {
        match self {
            Self::Clause(c) => c.evaluate(snap),
            Self::Composite(Composite { op, clauses }) => match op {
                LogicOp::Or => clauses.iter().any(|c| c.evaluate(snap)),
                LogicOp::And => {
                    !clauses.is_empty() && clauses.iter().all(|c| c.evaluate(snap))
                }
            },
        }
    }

    /// Structural validation: every composite non-empty, every clause names a
    /// metric and compares against a finite value, nesting no deeper than
    /// `max_depth`.
    ///
    /// Walks the tree with an explicit stack so a hostile tree cannot blow
    /// the call stack during validation.
    pub fn validate(&self, max_depth: usize) -> Result<(), RuleError> {
        let mut stack: Vec<(&Condition, usize)> = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            if depth > max_depth {
                return Err(RuleError::TooDeep { max: max_depth });
            }
            match node {
                Self::Clause(c) => {
                    if c.metric.trim().is_empty() {
                        return Err(RuleError::EmptyMetric);
                    }
                    if !c.value.is_finite() {
                        return Err(RuleError::NonFiniteThreshold);
                    }
                }
                Self::Composite(c) => {
                    if c.clauses.is_empty() {
                        return Err(RuleError::EmptyComposite);
                    }
                    stack.extend(c.clauses.iter().rev().map(|child| (child, depth + 1)));
                }
            }
        }
        Ok(())
    }

    /// Clause metrics in depth-first, left-to-right order (with repeats).
    pub fn metrics(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                Self::Clause(c) => out.push(c.metric.as_str()),
                Self::Composite(c) => stack.extend(c.clauses.iter().rev()),
            }
        }
        out
    }

    /// First clause metric in depth-first order.
    pub fn first_metric(&self) -> Option<&str> {
        self.metrics().into_iter().next()
    }
}
