//! Plan tree node.

use anyhow::Result;

use crate::operations::{Operation, OperationContext};

/// One phase or action of an upgrade plan.
///
/// A step owns its children; their order is the execution order. Steps
/// without an operation are phases that only group their children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    description: String,
    children: Vec<Step>,
    operation: Option<Operation>,
    parallel: bool,
    requires_confirmation: bool,
}

impl Step {
    /// A serial phase step that asks for confirmation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            children: Vec::new(),
            operation: None,
            parallel: false,
            requires_confirmation: true,
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Mark this step as safe to run alongside its parallel siblings.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run this step without prompting the operator.
    pub fn without_confirmation(mut self) -> Self {
        self.requires_confirmation = false;
        self
    }

    /// Append a child and return it, so further children attach below it.
    pub fn add_step(&mut self, child: Step) -> &mut Step {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Run the bound operation, if any.
    pub async fn run(&self, ctx: &OperationContext) -> Result<()> {
        match &self.operation {
            Some(operation) => operation.execute(ctx).await,
            None => Ok(()),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn children(&self) -> &[Step] {
        &self.children
    }

    pub fn operation(&self) -> Option<&Operation> {
        self.operation.as_ref()
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn requires_confirmation(&self) -> bool {
        self.requires_confirmation
    }

    /// Number of steps in this subtree, this one included.
    pub fn step_count(&self) -> usize {
        1 + self.children.iter().map(Step::step_count).sum::<usize>()
    }
}
