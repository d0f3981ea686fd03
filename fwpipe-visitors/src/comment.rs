use tracing::info;

use fwpipe_core::{Node, RegistryResult, VisitResult, Visitor, VisitorEntry, VisitorRegistry};

pub fn register(registry: &mut VisitorRegistry) -> RegistryResult<()> {
    registry.register_entry(
        "comment",
        VisitorEntry::new(1, |args| Ok(Box::new(CommentVisitor::new(&args[0]))))
            .with_summary("<text>: print a message between stages"),
    )
}

#[derive(Debug)]
pub struct CommentVisitor {
    text: String,
}

impl CommentVisitor {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl Visitor for CommentVisitor {
    fn name(&self) -> &str {
        "comment"
    }

    fn visit(&mut self, _node: &mut Node) -> VisitResult<()> {
        info!("comment: {}", self.text);
        println!("{}", self.text);
        Ok(())
    }
}
