//! User-declared "if state then action" hypotheses.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tagwerk_core::{ActionTag, Component, EngineError, Result, StateVector};

/// Comparison of a state component against a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operator {
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
}

impl Operator {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::GreaterOrEqual => ">=",
            Operator::LessOrEqual => "<=",
        }
    }

    #[must_use]
    pub fn compare(self, value: f64, threshold: f64) -> bool {
        match self {
            Operator::Greater => value > threshold,
            Operator::Less => value < threshold,
            Operator::GreaterOrEqual => value >= threshold,
            Operator::LessOrEqual => value <= threshold,
        }
    }
}

impl FromStr for Operator {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            ">" => Ok(Operator::Greater),
            "<" => Ok(Operator::Less),
            ">=" => Ok(Operator::GreaterOrEqual),
            "<=" => Ok(Operator::LessOrEqual),
            other => Err(EngineError::InvalidOperator(other.to_string())),
        }
    }
}

impl TryFrom<String> for Operator {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One clause of a rule. The component is kept as written so that rules
/// naming unknown components can still be loaded and reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub component: String,
    pub operator: Operator,
    pub threshold: f64,
}

impl Condition {
    #[must_use]
    pub fn new(component: Component, operator: Operator, threshold: f64) -> Self {
        Self {
            component: component.as_str().to_string(),
            operator,
            threshold,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.component, self.operator, self.threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub action: ActionTag,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reasoning: String,
}

impl PolicyRule {
    /// Resolves every condition against the component vocabulary.
    ///
    /// The error carries a human-readable reason; callers annotate the rule
    /// instead of aborting.
    pub fn compile(&self) -> std::result::Result<CompiledRule, String> {
        if self.conditions.is_empty() {
            return Err("rule has no conditions".to_string());
        }
        let clauses = self
            .conditions
            .iter()
            .map(|c| {
                let component: Component = c
                    .component
                    .parse()
                    .map_err(|_| format!("unknown state component '{}'", c.component))?;
                if !c.threshold.is_finite() {
                    return Err(format!("threshold of '{c}' is not a finite number"));
                }
                Ok((component, c.operator, c.threshold))
            })
            .collect::<std::result::Result<Vec<_>, String>>()?;
        Ok(CompiledRule { clauses })
    }
}

/// A rule whose conditions all reference known components.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    clauses: Vec<(Component, Operator, f64)>,
}

impl CompiledRule {
    /// True when every clause holds. A clause on a component the state does
    /// not carry does not hold.
    #[must_use]
    pub fn holds(&self, state: &StateVector) -> bool {
        self.clauses.iter().all(|&(component, op, threshold)| {
            state
                .get(component)
                .is_some_and(|value| op.compare(value, threshold))
        })
    }
}

/// Supplies the rules of one person. Rule editing happens elsewhere; the
/// engine treats the list as immutable per call.
pub trait RuleSource {
    fn rules(&self) -> Result<Vec<PolicyRule>>;
}

impl RuleSource for Vec<PolicyRule> {
    fn rules(&self) -> Result<Vec<PolicyRule>> {
        Ok(self.clone())
    }
}
