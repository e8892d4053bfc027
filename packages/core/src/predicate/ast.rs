//! Predicate tree types
//!
//! Predicates are immutable once built. Composite nodes cache the union of
//! the property ids their children reference, and same-operator children are
//! flattened into their parent at construction.

use std::fmt;

use hashbrown::HashSet;

use crate::property::PropertyId;

/// Relational operators of comparison leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// Equality comparison (=)
    Equal,
    /// Inequality comparison (!=)
    NotEqual,
    /// Less than comparison (<)
    Less,
    /// Less than or equal comparison (<=)
    LessEq,
    /// Greater than comparison (>)
    Greater,
    /// Greater than or equal comparison (>=)
    GreaterEq,
}

impl ComparisonOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::Less => "<",
            ComparisonOp::LessEq => "<=",
            ComparisonOp::Greater => ">",
            ComparisonOp::GreaterEq => ">=",
        }
    }

    /// Whether the operator orders its operands rather than testing equality
    #[must_use]
    pub fn is_ordering(self) -> bool {
        !matches!(self, ComparisonOp::Equal | ComparisonOp::NotEqual)
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Logical operators of composite predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// Logical AND
    And,
    /// Logical OR
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => f.write_str("AND"),
            LogicalOp::Or => f.write_str("OR"),
        }
    }
}

/// Leaf comparing one property against a literal operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonPredicate {
    pub property_id: PropertyId,
    pub operator: ComparisonOp,
    pub operand: String,
}

/// AND/OR over two or more child predicates
#[derive(Debug, Clone)]
pub struct CompositePredicate {
    operator: LogicalOp,
    children: Vec<Predicate>,
    property_ids: HashSet<PropertyId>,
}

impl CompositePredicate {
    /// Build a composite, absorbing children that use the same operator.
    #[must_use]
    pub fn new(operator: LogicalOp, children: Vec<Predicate>) -> Self {
        let mut flattened = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Predicate::Composite(inner) if inner.operator == operator => {
                    flattened.extend(inner.children);
                }
                other => flattened.push(other),
            }
        }

        let mut property_ids = HashSet::new();
        for child in &flattened {
            child.collect_property_ids(&mut property_ids);
        }

        Self {
            operator,
            children: flattened,
            property_ids,
        }
    }

    #[must_use]
    pub fn operator(&self) -> LogicalOp {
        self.operator
    }

    #[must_use]
    pub fn children(&self) -> &[Predicate] {
        &self.children
    }

    /// Union of the property ids referenced by all children
    #[must_use]
    pub fn property_ids(&self) -> &HashSet<PropertyId> {
        &self.property_ids
    }
}

impl PartialEq for CompositePredicate {
    fn eq(&self, other: &Self) -> bool {
        if self.operator != other.operator
            || self.children.len() != other.children.len()
            || self.property_ids != other.property_ids
        {
            return false;
        }

        // Children compare as a multiset.
        let mut matched = vec![false; other.children.len()];
        self.children.iter().all(|child| {
            let found = other
                .children
                .iter()
                .enumerate()
                .position(|(index, candidate)| !matched[index] && candidate == child);
            match found {
                Some(index) => {
                    matched[index] = true;
                    true
                }
                None => false,
            }
        })
    }
}

impl Eq for CompositePredicate {}

/// A boolean test over a resource's properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Comparison(ComparisonPredicate),
    Composite(CompositePredicate),
    Not(Box<Predicate>),
}

impl Predicate {
    #[must_use]
    pub fn comparison(property_id: PropertyId, operator: ComparisonOp, operand: impl Into<String>) -> Self {
        Predicate::Comparison(ComparisonPredicate {
            property_id,
            operator,
            operand: operand.into(),
        })
    }

    #[must_use]
    pub fn equals(property_id: PropertyId, operand: impl Into<String>) -> Self {
        Self::comparison(property_id, ComparisonOp::Equal, operand)
    }

    /// Conjunction of `children`; a single child is returned unchanged.
    #[must_use]
    pub fn and(children: Vec<Predicate>) -> Self {
        Self::composite(LogicalOp::And, children)
    }

    /// Disjunction of `children`; a single child is returned unchanged.
    #[must_use]
    pub fn or(children: Vec<Predicate>) -> Self {
        Self::composite(LogicalOp::Or, children)
    }

    #[must_use]
    pub fn composite(operator: LogicalOp, mut children: Vec<Predicate>) -> Self {
        if children.len() == 1 {
            if let Some(only) = children.pop() {
                return only;
            }
        }
        Predicate::Composite(CompositePredicate::new(operator, children))
    }

    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(child: Predicate) -> Self {
        Predicate::Not(Box::new(child))
    }

    /// Desugar `property IN (items)` into an OR of EQUALS leaves.
    ///
    /// A single item yields a bare EQUALS leaf; an empty list yields `None`.
    ///
    /// ```
    /// use resq_core::predicate::Predicate;
    /// use resq_core::property::PropertyId;
    ///
    /// let id = PropertyId::new("version", None);
    /// assert_eq!(
    ///     Predicate::in_list(id.clone(), vec!["2.1".to_string()]),
    ///     Some(Predicate::equals(id, "2.1"))
    /// );
    /// ```
    #[must_use]
    pub fn in_list(property_id: PropertyId, items: Vec<String>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        let leaves = items
            .into_iter()
            .map(|item| Self::equals(property_id.clone(), item))
            .collect();
        Some(Self::or(leaves))
    }

    /// Property ids referenced anywhere in this predicate
    #[must_use]
    pub fn property_ids(&self) -> HashSet<PropertyId> {
        match self {
            Predicate::Composite(composite) => composite.property_ids.clone(),
            _ => {
                let mut ids = HashSet::new();
                self.collect_property_ids(&mut ids);
                ids
            }
        }
    }

    fn collect_property_ids(&self, out: &mut HashSet<PropertyId>) {
        match self {
            Predicate::Comparison(leaf) => {
                out.insert(leaf.property_id.clone());
            }
            Predicate::Composite(composite) => {
                out.extend(composite.property_ids.iter().cloned());
            }
            Predicate::Not(child) => child.collect_property_ids(out),
        }
    }
}

fn needs_quoting(operand: &str) -> bool {
    operand.is_empty()
        || operand.chars().any(|c| {
            c.is_whitespace() || matches!(c, '(' | ')' | '\'' | '"' | '\\' | '=' | '!' | '<' | '>')
        })
        || ["AND", "OR", "NOT", "IN"]
            .iter()
            .any(|keyword| operand.eq_ignore_ascii_case(keyword))
}

fn write_operand(f: &mut fmt::Formatter<'_>, operand: &str) -> fmt::Result {
    if !needs_quoting(operand) {
        return f.write_str(operand);
    }
    f.write_str("'")?;
    for c in operand.chars() {
        if c == '\'' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("'")
}

/// Renders the predicate in filter syntax; the output parses back to an
/// equal predicate.
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Comparison(leaf) => {
                write!(f, "{}{}", leaf.property_id, leaf.operator)?;
                write_operand(f, &leaf.operand)
            }
            Predicate::Composite(composite) => {
                for (index, child) in composite.children.iter().enumerate() {
                    if index > 0 {
                        write!(f, " {} ", composite.operator)?;
                    }
                    match child {
                        Predicate::Composite(_) => write!(f, "({child})")?,
                        _ => write!(f, "{child}")?,
                    }
                }
                Ok(())
            }
            Predicate::Not(child) => match child.as_ref() {
                Predicate::Composite(_) => write!(f, "NOT ({child})"),
                _ => write!(f, "NOT {child}"),
            },
        }
    }
}
