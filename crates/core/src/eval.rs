//! Substitution and merging: [`Document`] to [`Value`].
//!
//! Every `$name` is replaced by a fresh evaluation of its binding, so two
//! uses of one variable never share data. Bindings are only visible to the
//! body and to bindings written after them.

use crate::ast::{Document, ListItem, MapItem, Node, NodeKind, Span};
use crate::error::EvalError;
use crate::merge::{insert_at_path, MergeConflict};
use crate::scope::Bindings;
use crate::value::{Map, Value};

/// Default for [`EvalOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOptions {
    /// Deepest allowed evaluation, counting every nested value and every
    /// variable substitution on the way down.
    pub max_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

struct Evaluator<'d> {
    bindings: &'d Bindings,
    options: EvalOptions,
}

impl<'d> Evaluator<'d> {
    /// Reject self references and references to names that are not bound
    /// earlier in the block, before any value is built.
    fn validate(&self) -> Result<(), EvalError> {
        for (index, binding) in self.bindings.iter().enumerate() {
            for (name, site) in binding.value.var_refs() {
                if name == binding.name {
                    return Err(EvalError::Cyclic {
                        name: name.to_owned(),
                        site,
                    });
                }
                match self.bindings.position(name) {
                    Some(earlier) if earlier < index => {}
                    _ => {
                        return Err(EvalError::UndefinedVariable {
                            name: name.to_owned(),
                            site,
                        })
                    }
                }
            }
        }
        Ok(())
    }

    /// Evaluate `node` with the first `visible` bindings in scope, `depth`
    /// levels below the document body.
    fn eval(&self, node: &Node, visible: usize, depth: usize) -> Result<Value, EvalError> {
        if depth >= self.options.max_depth {
            return Err(EvalError::TooDeep {
                site: node.span,
                limit: self.options.max_depth,
            });
        }
        let depth = depth + 1;
        match &node.kind {
            NodeKind::Null => Ok(Value::Null),
            NodeKind::Bool(b) => Ok(Value::Bool(*b)),
            NodeKind::Integer(n) => Ok(Value::Integer(*n)),
            NodeKind::Float(x) => Ok(Value::Float(*x)),
            NodeKind::Str(s) => Ok(Value::String(s.clone())),
            NodeKind::VarRef(name) => self.substitute(name, node.span, visible, depth),
            NodeKind::List(items) => self.eval_list(items, visible, depth),
            NodeKind::Map(items) => self.eval_map(items, visible, depth),
        }
    }

    fn substitute(
        &self,
        name: &str,
        site: Span,
        visible: usize,
        depth: usize,
    ) -> Result<Value, EvalError> {
        let (index, binding) = self.bindings.lookup_before(name, visible).ok_or_else(|| {
            EvalError::UndefinedVariable {
                name: name.to_owned(),
                site,
            }
        })?;
        tracing::trace!(variable = name, %site, "substituting variable");
        self.eval(&binding.value, index, depth)
            .map_err(|source| match source {
                // reported once, where the limit was hit
                too_deep @ EvalError::TooDeep { .. } => too_deep,
                source => EvalError::InBinding {
                    name: name.to_owned(),
                    reference: site,
                    binding: binding.span,
                    source: Box::new(source),
                },
            })
    }

    fn eval_list(&self, items: &[ListItem], visible: usize, depth: usize) -> Result<Value, EvalError> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            match item {
                ListItem::Value(node) => out.push(self.eval(node, visible, depth)?),
                ListItem::Spread { name, span } => match self.substitute(name, *span, visible, depth)? {
                    Value::List(spliced) => out.extend(spliced),
                    other => {
                        return Err(EvalError::SpreadMismatch {
                            name: name.clone(),
                            site: *span,
                            expected: "a list",
                            found: other.type_name(),
                        })
                    }
                },
            }
        }
        Ok(Value::List(out))
    }

    fn eval_map(&self, items: &[MapItem], visible: usize, depth: usize) -> Result<Value, EvalError> {
        let mut map = Map::new();
        for item in items {
            match item {
                MapItem::Entry { path, value } => {
                    let value = self.eval(value, visible, depth)?;
                    insert_at_path(&mut map, &path.segments, value)
                        .map_err(|conflict| type_conflict(conflict, path.span))?;
                }
                MapItem::Spread { name, span } => match self.substitute(name, *span, visible, depth)? {
                    Value::Map(source) => {
                        for (key, value) in source {
                            insert_at_path(&mut map, std::slice::from_ref(&key), value)
                                .map_err(|conflict| type_conflict(conflict, *span))?;
                        }
                    }
                    other => {
                        return Err(EvalError::SpreadMismatch {
                            name: name.clone(),
                            site: *span,
                            expected: "a map",
                            found: other.type_name(),
                        })
                    }
                },
            }
        }
        Ok(Value::Map(map))
    }
}

fn type_conflict(conflict: MergeConflict, site: Span) -> EvalError {
    EvalError::TypeConflict {
        key: conflict.key,
        site,
        existing: conflict.existing,
        incoming: conflict.incoming,
    }
}

/// Evaluate a parsed document into its value tree with default options.
pub fn evaluate(doc: &Document) -> Result<Value, EvalError> {
    evaluate_with(doc, EvalOptions::default())
}

/// Evaluate a parsed document. Fails with [`EvalError::TooDeep`] rather
/// than exhausting the stack when substitutions nest past
/// `options.max_depth`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn evaluate_with(doc: &Document, options: EvalOptions) -> Result<Value, EvalError> {
    let evaluator = Evaluator {
        bindings: &doc.bindings,
        options,
    };
    evaluator.validate()?;
    let value = evaluator.eval(&doc.body, doc.bindings.len(), 0)?;
    tracing::debug!(
        keys = value.as_map().map_or(0, Map::len),
        "evaluated document"
    );
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn eval_src(src: &str) -> Result<Value, EvalError> {
        let tokens = tokenize(src).expect("lex should succeed");
        let doc = parse(&tokens).expect("parse should succeed");
        evaluate(&doc)
    }

    #[test]
    fn backward_reference_composes() {
        let v = eval_src("let { $a = 1 $b = $a } in $b").unwrap();
        assert_eq!(v, Value::Integer(1));
    }

    #[test]
    fn forward_reference_is_undefined_at_the_definition() {
        let err = eval_src("let { $a = $b $b = 1 } in { v = $a }").unwrap_err();
        assert_eq!(
            err,
            EvalError::UndefinedVariable {
                name: "b".into(),
                site: Span::new(1, 12),
            }
        );
    }

    #[test]
    fn self_reference_is_cyclic() {
        let err = eval_src("let { $a = [ $a ] } in { v = 1 }").unwrap_err();
        assert!(matches!(err, EvalError::Cyclic { ref name, .. } if name == "a"));
    }

    #[test]
    fn unknown_variable_in_body() {
        let err = eval_src("{ v = $nope }").unwrap_err();
        assert_eq!(
            err,
            EvalError::UndefinedVariable {
                name: "nope".into(),
                site: Span::new(1, 7),
            }
        );
    }

    #[test]
    fn unused_bad_binding_still_fails() {
        let err = eval_src("let { $a = $missing } in {}").unwrap_err();
        assert!(matches!(err, EvalError::UndefinedVariable { ref name, .. } if name == "missing"));
    }

    #[test]
    fn conflict_inside_binding_carries_both_sites() {
        let err = eval_src("let {\n  $w = { x = 1 x.y = 2 }\n} in { a = $w }").unwrap_err();
        match &err {
            EvalError::InBinding {
                name,
                reference,
                binding,
                source,
            } => {
                assert_eq!(name, "w");
                assert_eq!(*reference, Span::new(3, 12));
                assert_eq!(*binding, Span::new(2, 3));
                assert!(matches!(**source, EvalError::TypeConflict { ref key, .. } if key == "x"));
            }
            other => panic!("expected InBinding, got {:?}", other),
        }
        assert!(matches!(err.root_cause(), EvalError::TypeConflict { .. }));
        assert_eq!(err.span(), Span::new(3, 12));
    }

    #[test]
    fn nested_lists_are_not_flattened() {
        let v = eval_src("[ [1 2] [] 3 ]").unwrap();
        assert_eq!(
            v,
            Value::List(vec![
                Value::List(vec![1i64.into(), 2i64.into()]),
                Value::List(vec![]),
                3i64.into(),
            ])
        );
    }

    #[test]
    fn map_spread_merges_and_later_keys_win() {
        let v = eval_src(
            r#"let { $base = { type = "label" label = "x" } } in { w = { ..$base label = "y" } }"#,
        )
        .unwrap();
        let w = v.get_path("w").and_then(Value::as_map).unwrap();
        let keys: Vec<_> = w.keys().map(String::as_str).collect();
        assert_eq!(keys, ["type", "label"]);
        assert_eq!(w["label"], Value::from("y"));
    }

    #[test]
    fn list_spread_splices_items() {
        let v = eval_src("let { $l = [1 2] } in [0 ..$l 3]").unwrap();
        assert_eq!(
            v,
            Value::List(vec![0i64.into(), 1i64.into(), 2i64.into(), 3i64.into()])
        );
    }

    #[test]
    fn spread_of_the_wrong_shape() {
        let err = eval_src("let { $l = [1] } in { ..$l }").unwrap_err();
        assert!(matches!(
            err,
            EvalError::SpreadMismatch { expected: "a map", found: "a list", .. }
        ));
    }

    /// `$a0 = [1]`, `$a1 = [$a0]`, ... each binding one level deeper.
    fn chain(len: usize) -> String {
        let mut src = String::from("let {\n  $a0 = [1]\n");
        for k in 1..len {
            src.push_str(&format!("  $a{} = [ $a{} ]\n", k, k - 1));
        }
        src.push_str(&format!("}} in {{ v = $a{} }}", len - 1));
        src
    }

    #[test]
    fn substitution_chain_stops_at_depth_limit() {
        let tokens = tokenize(&chain(5_000)).expect("lex should succeed");
        let doc = parse(&tokens).expect("parse should succeed");
        let err = evaluate(&doc).unwrap_err();
        match err {
            EvalError::TooDeep { limit, .. } => assert_eq!(limit, DEFAULT_MAX_DEPTH),
            other => panic!("expected TooDeep, got {:?}", other),
        }
    }

    #[test]
    fn depth_limit_counts_substitutions() {
        let tokens = tokenize(&chain(3)).expect("lex should succeed");
        let doc = parse(&tokens).expect("parse should succeed");
        // { } -> $a2 -> [ ] -> $a1 -> [ ] -> $a0 -> [ ] -> 1
        assert!(evaluate_with(&doc, EvalOptions { max_depth: 8 }).is_ok());
        let err = evaluate_with(&doc, EvalOptions { max_depth: 7 }).unwrap_err();
        assert!(matches!(err, EvalError::TooDeep { limit: 7, site } if site == Span::new(2, 10)));
    }

    #[test]
    fn plain_alias_chain_is_bounded() {
        let mut src = String::from("let { $a0 = 1\n");
        for k in 1..20_000 {
            src.push_str(&format!("$a{} = $a{}\n", k, k - 1));
        }
        src.push_str("} in $a19999");
        let tokens = tokenize(&src).expect("lex should succeed");
        let doc = parse(&tokens).expect("parse should succeed");
        assert!(matches!(evaluate(&doc), Err(EvalError::TooDeep { .. })));
    }

    #[test]
    fn strings_are_not_interpolated() {
        let v = eval_src(r#"let { $x = 1 } in { s = "$x ${x}" }"#).unwrap();
        assert_eq!(v.get_path("s"), Some(&Value::from("$x ${x}")));
    }
}
