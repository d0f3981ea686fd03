/*!
 * Builtin visitors
 *
 * Every module is an independent extension unit exposing
 * `register(&mut VisitorRegistry)`. [`builtin_registry`] is the composition
 * root used by the command line tool; embedders that bring their own
 * visitors call [`register_builtin_visitors`] and then register theirs.
 */

pub(crate) mod matcher;

pub mod comment;
pub mod extract;
pub mod find;
pub mod inject;
pub mod inspect;
pub mod remove;
pub mod replace;
pub mod save;
pub mod validate;

pub use comment::CommentVisitor;
pub use extract::{ExtractVisitor, ExtractedEntry};
pub use find::{FindVisitor, FoundNode};
pub use inject::InjectVisitor;
pub use inspect::{ChecksumVisitor, CountVisitor, JsonVisitor, TableVisitor};
pub use remove::{RemoveVisitor, StripVisitor};
pub use replace::ReplaceVisitor;
pub use save::SaveVisitor;
pub use validate::ValidateVisitor;

use fwpipe_core::{RegistryResult, VisitorRegistry};
use tracing::debug;

pub fn register_builtin_visitors(registry: &mut VisitorRegistry) -> RegistryResult<()> {
    inspect::register(registry)?;
    validate::register(registry)?;
    find::register(registry)?;
    remove::register(registry)?;
    inject::register(registry)?;
    replace::register(registry)?;
    extract::register(registry)?;
    save::register(registry)?;
    comment::register(registry)?;
    debug!("registered {} builtin visitors", registry.len());
    Ok(())
}

pub fn builtin_registry() -> RegistryResult<VisitorRegistry> {
    let mut registry = VisitorRegistry::new();
    register_builtin_visitors(&mut registry)?;
    Ok(registry)
}
