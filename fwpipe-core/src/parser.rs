/*!
 * Token stream to pipeline
 *
 * The stream has no delimiters: every command's arity is known from the
 * registry, so a single left-to-right pass partitions it. Any error abandons
 * the stages built so far.
 */

use tracing::debug;

use crate::error::{ParseError, ParseResult};
use crate::pipeline::{Pipeline, Stage};
use crate::registry::VisitorRegistry;

/// Build a pipeline from `tokens`, e.g. `["strip", "replace", "Dxe.*", "pad.bin"]`
/// becomes `strip` followed by `replace("Dxe.*", "pad.bin")`.
pub fn parse_cli<S: AsRef<str>>(registry: &VisitorRegistry, tokens: &[S]) -> ParseResult<Pipeline> {
    let mut pipeline = Pipeline::new();
    let mut rest = tokens;

    while let Some((command, tail)) = rest.split_first() {
        let name = command.as_ref();
        let entry = registry
            .get(name)
            .ok_or_else(|| ParseError::UnknownVisitor {
                name: name.to_string(),
            })?;

        let needed = entry.arity();
        if tail.len() < needed {
            return Err(ParseError::InsufficientArguments {
                name: name.to_string(),
                needed,
                available: tail.len(),
            });
        }

        let (args, remaining) = tail.split_at(needed);
        let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
        let visitor = entry
            .construct(&args)
            .map_err(|source| ParseError::ConstructionFailed {
                name: name.to_string(),
                source,
            })?;

        debug!("parsed stage {}: {} {:?}", pipeline.len() + 1, name, args);
        pipeline.push(Stage::new(name, args, visitor));
        rest = remaining;
    }

    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Node;
    use crate::error::{VisitResult, VisitorError};
    use crate::visitor::Visitor;

    struct Named(String);

    impl Visitor for Named {
        fn name(&self) -> &str {
            &self.0
        }

        fn visit(&mut self, _node: &mut Node) -> VisitResult<()> {
            Ok(())
        }
    }

    fn registry() -> VisitorRegistry {
        let mut registry = VisitorRegistry::new();
        registry
            .register("noop", 0, |_args: &[String]| -> VisitResult<Box<dyn Visitor>> {
                Ok(Box::new(Named("noop".to_string())))
            })
            .unwrap();
        registry
            .register("set", 1, |args: &[String]| -> VisitResult<Box<dyn Visitor>> {
                Ok(Box::new(Named(format!("set({})", args[0]))))
            })
            .unwrap();
        registry
            .register("pair", 2, |args: &[String]| -> VisitResult<Box<dyn Visitor>> {
                if args[0].is_empty() {
                    return Err(VisitorError::invalid_argument("pair", "", "must not be empty"));
                }
                Ok(Box::new(Named("pair".to_string())))
            })
            .unwrap();
        registry
    }

    #[test]
    fn test_empty_tokens_give_empty_pipeline() {
        let tokens: [&str; 0] = [];
        let pipeline = parse_cli(&registry(), &tokens).unwrap();
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_unknown_visitor() {
        let err = parse_cli(&registry(), &["unknown-cmd"]).unwrap_err();
        assert!(matches!(err, ParseError::UnknownVisitor { ref name } if name == "unknown-cmd"));
    }

    #[test]
    fn test_unknown_after_valid_stages_abandons_pipeline() {
        let err = parse_cli(&registry(), &["noop", "set", "x", "bogus"]).unwrap_err();
        assert!(matches!(err, ParseError::UnknownVisitor { ref name } if name == "bogus"));
    }

    #[test]
    fn test_variable_arity_partitioning() {
        let tokens = ["noop", "set", "v1", "noop"];
        let mut pipeline = parse_cli(&registry(), &tokens).unwrap();

        assert_eq!(pipeline.names(), vec!["noop", "set", "noop"]);
        assert_eq!(pipeline.stages()[1].args(), ["v1".to_string()]);
        assert!(pipeline.stages()[0].args().is_empty());
        assert_eq!(pipeline.token_count(), tokens.len());
        assert_eq!(pipeline.stages_mut()[1].visitor_mut().name(), "set(v1)");
    }

    #[test]
    fn test_command_names_are_valid_arguments() {
        // "noop" is consumed as set's argument, not as a command
        let pipeline = parse_cli(&registry(), &["set", "noop"]).unwrap();
        assert_eq!(pipeline.names(), vec!["set"]);
        assert_eq!(pipeline.stages()[0].args(), ["noop".to_string()]);
    }

    #[test]
    fn test_missing_argument() {
        let err = parse_cli(&registry(), &["set"]).unwrap_err();
        match err {
            ParseError::InsufficientArguments {
                name,
                needed,
                available,
            } => {
                assert_eq!(name, "set");
                assert_eq!(needed, 1);
                assert_eq!(available, 0);
            }
            other => panic!("Expected InsufficientArguments, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_arguments_reported() {
        let err = parse_cli(&registry(), &["noop", "pair", "a"]).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InsufficientArguments { needed: 2, available: 1, .. }
        ));
    }

    #[test]
    fn test_construction_failure_is_wrapped() {
        let err = parse_cli(&registry(), &["pair", "", "b"]).unwrap_err();
        match err {
            ParseError::ConstructionFailed { name, source } => {
                assert_eq!(name, "pair");
                assert!(matches!(source, VisitorError::InvalidArgument { .. }));
            }
            other => panic!("Expected ConstructionFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_accepts_owned_strings() {
        let tokens: Vec<String> = vec!["set".into(), "--odd".into()];
        let pipeline = parse_cli(&registry(), &tokens).unwrap();
        assert_eq!(pipeline.stages()[0].args(), ["--odd".to_string()]);
    }
}
