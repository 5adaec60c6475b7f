//! Field selectors for event listing.
//!
//! The API server accepts a comma separated conjunction of `field=value` /
//! `field!=value` terms. The same expression is evaluated locally when events
//! come from a dump file instead of a live cluster.

use std::fmt;
use std::str::FromStr;

use k8s_openapi::api::core::v1::Event;

/// Anything that is neither `Normal` nor `Warning`.
pub const GENERAL_SELECTOR: &str = "type!=Normal,type!=Warning";

/// Non-`Normal` events about Node objects.
pub const NODE_SELECTOR: &str = "type!=Normal,involvedObject.kind=Node";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("empty term at position {0}")]
    EmptyTerm(usize),
    #[error("missing operator in `{0}`")]
    MissingOperator(String),
    #[error("missing field name in `{0}`")]
    MissingField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub field: String,
    pub op: Operator,
    pub value: String,
}

impl Requirement {
    fn matches(&self, event: &Event) -> bool {
        match (field_value(event, &self.field), self.op) {
            (Some(actual), Operator::Equals) => actual == self.value,
            (Some(actual), Operator::NotEquals) => actual != self.value,
            (None, Operator::Equals) => false,
            (None, Operator::NotEquals) => true,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
        };
        write!(f, "{}{}{}", self.field, op, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelector {
    requirements: Vec<Requirement>,
}

impl FieldSelector {
    pub fn parse(expr: &str) -> Result<Self, SelectorError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(SelectorError::Empty);
        }

        let requirements = expr
            .split(',')
            .enumerate()
            .map(|(idx, term)| parse_term(idx, term.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { requirements })
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Evaluates every term against `event`; all of them must hold.
    pub fn matches(&self, event: &Event) -> bool {
        self.requirements.iter().all(|r| r.matches(event))
    }
}

impl FromStr for FieldSelector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, req) in self.requirements.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{req}")?;
        }
        Ok(())
    }
}

fn parse_term(idx: usize, term: &str) -> Result<Requirement, SelectorError> {
    if term.is_empty() {
        return Err(SelectorError::EmptyTerm(idx));
    }

    // `!=` must be tried before `=`, and `==` before `=`.
    let (field, op, value) = if let Some((f, v)) = term.split_once("!=") {
        (f, Operator::NotEquals, v)
    } else if let Some((f, v)) = term.split_once("==") {
        (f, Operator::Equals, v)
    } else if let Some((f, v)) = term.split_once('=') {
        (f, Operator::Equals, v)
    } else {
        return Err(SelectorError::MissingOperator(term.to_string()));
    };

    let field = field.trim();
    if field.is_empty() {
        return Err(SelectorError::MissingField(term.to_string()));
    }

    Ok(Requirement {
        field: field.to_string(),
        op,
        value: value.trim().to_string(),
    })
}

/// Field lookup mirroring the selectable fields the API server exposes for
/// core/v1 events. Unknown fields yield `None`.
fn field_value<'a>(event: &'a Event, field: &str) -> Option<&'a str> {
    let obj = &event.involved_object;
    let value = match field {
        "type" => event.type_.as_deref(),
        "reason" => event.reason.as_deref(),
        "source" => event.source.as_ref().and_then(|s| s.component.as_deref()),
        "metadata.name" => event.metadata.name.as_deref(),
        "metadata.namespace" => event.metadata.namespace.as_deref(),
        "involvedObject.kind" => obj.kind.as_deref(),
        "involvedObject.namespace" => obj.namespace.as_deref(),
        "involvedObject.name" => obj.name.as_deref(),
        "involvedObject.uid" => obj.uid.as_deref(),
        "involvedObject.apiVersion" => obj.api_version.as_deref(),
        "involvedObject.fieldPath" => obj.field_path.as_deref(),
        "involvedObject.resourceVersion" => obj.resource_version.as_deref(),
        _ => return None,
    };
    Some(value.unwrap_or(""))
}
