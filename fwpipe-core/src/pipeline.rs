//! Ordered stages produced by the parser and consumed by the executor.

use crate::visitor::Visitor;

/// One command from the token stream together with the visitor built from it.
#[derive(Debug)]
pub struct Stage {
    name: String,
    args: Vec<String>,
    visitor: Box<dyn Visitor>,
}

impl Stage {
    pub fn new(name: impl Into<String>, args: Vec<String>, visitor: Box<dyn Visitor>) -> Self {
        Self {
            name: name.into(),
            args,
            visitor,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn visitor_mut(&mut self) -> &mut dyn Visitor {
        self.visitor.as_mut()
    }
}

#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stages_mut(&mut self) -> &mut [Stage] {
        &mut self.stages
    }

    /// Stage names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// Total number of tokens the stages were built from.
    pub fn token_count(&self) -> usize {
        self.stages.iter().map(|s| 1 + s.args.len()).sum()
    }
}
