/*!
 * Visitor trait
 *
 * A visitor is constructed once from its command-line arguments and then run
 * against a document root. `run` is the entry point the document calls;
 * `visit` is invoked per node and usually recurses with
 * [`Node::apply_children`](crate::document::Node::apply_children).
 */

use crate::document::Node;
use crate::error::VisitResult;

pub trait Visitor {
    /// Command name this visitor was registered under.
    fn name(&self) -> &str;

    /// Called once per application with the document root. Visitors that
    /// need a summary step after the walk override this.
    fn run(&mut self, root: &mut Node) -> VisitResult<()> {
        self.visit(root)
    }

    fn visit(&mut self, node: &mut Node) -> VisitResult<()>;
}

impl std::fmt::Debug for dyn Visitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visitor").field("name", &self.name()).finish()
    }
}
