// ABOUTME: The tree-walking resolver: eval, variable dereferencing, lambda application

use crate::builtins;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::parser;
use crate::store::{normalize, VariableStore};
use crate::value::{lower, Value};
use log::{debug, warn};
use std::collections::HashMap;

/// Truncates a formula to a bounded excerpt for log lines, so a pathological
/// multi-kilobyte formula never blows up log volume (§7: "a redacted formula
/// excerpt").
fn excerpt(formula: &str) -> String {
    const MAX: usize = 80;
    if formula.chars().count() <= MAX {
        formula.to_string()
    } else {
        let head: String = formula.chars().take(MAX).collect();
        format!("{head}...")
    }
}

/// Per-query context: the page scope, the variable store, and the
/// configured recursion/history bounds. Carries no mutable state of its
/// own — everything that changes across a single `eval` invocation lives in
/// the `history` vector and the native call stack (§4.F "State machine").
pub struct Engine<'a> {
    store: &'a dyn VariableStore,
    config: EngineConfig,
}

impl<'a> Engine<'a> {
    pub fn new(store: &'a dyn VariableStore) -> Self {
        Engine {
            store,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(store: &'a dyn VariableStore, config: EngineConfig) -> Self {
        Engine { store, config }
    }

    /// `Query(ctx, page_id, formula) → Value` (§4.F).
    pub fn query(&self, page_id: &str, formula: &str) -> Result<Value, EngineError> {
        debug!("query page={page_id} formula={}", excerpt(formula));
        if page_id.is_empty() {
            warn!("query rejected: empty pageId");
            return Err(EngineError::MissingPageId);
        }
        let result = parse_and_lower(formula).and_then(|value| self.eval(page_id, &value, &[], 0));
        if let Err(ref e) = result {
            warn!("query failed page={page_id} formula={}: {e}", excerpt(formula));
        }
        result
    }

    /// Parses and evaluates `formula` exactly as a variable's own formula
    /// would be, continuing the caller's `history`/depth bookkeeping.
    fn resolve_formula(
        &self,
        page_id: &str,
        formula: &str,
        history: &[String],
        depth: usize,
    ) -> Result<Value, EngineError> {
        let value = parse_and_lower(formula)?;
        self.eval(page_id, &value, history, depth)
    }

    fn check_depth(&self, depth: usize) -> Result<(), EngineError> {
        if depth > self.config.max_recursion_depth {
            return Err(EngineError::RecursionDepthExceeded {
                limit: self.config.max_recursion_depth,
            });
        }
        Ok(())
    }

    fn check_history(&self, history: &[String]) -> Result<(), EngineError> {
        if history.len() > self.config.max_history_length {
            return Err(EngineError::HistoryLengthExceeded {
                limit: self.config.max_history_length,
            });
        }
        Ok(())
    }

    /// Per-variant evaluation rules (§4.F `eval`).
    fn eval(
        &self,
        page_id: &str,
        value: &Value,
        history: &[String],
        depth: usize,
    ) -> Result<Value, EngineError> {
        self.check_depth(depth)?;
        let depth = depth + 1;

        match value {
            Value::Boolean(_) | Value::Number(_) | Value::String(_) => Ok(value.clone()),
            Value::Lambda { .. } | Value::Function(_) => Ok(value.clone()),
            Value::List(elements) => {
                let mut out = Vec::with_capacity(elements.len());
                for el in elements {
                    out.push(self.eval(page_id, el, history, depth)?);
                }
                Ok(Value::List(out))
            }
            Value::Record(props) => {
                let mut out = HashMap::with_capacity(props.len());
                for (key, val) in props {
                    out.insert(key.clone(), self.eval(page_id, val, history, depth)?);
                }
                Ok(Value::Record(out))
            }
            Value::Variable(name) => {
                self.resolve_variable(page_id, name, history, depth, true)?
                    .ok_or_else(|| EngineError::UndefinedVariable { name: name.clone() })
            }
            Value::Application { expr, args } => {
                self.resolve_application(page_id, expr, args, history, depth)
            }
        }
    }

    /// `resolve_variable(name, history, required)` (§4.F).
    fn resolve_variable(
        &self,
        page_id: &str,
        name: &str,
        history: &[String],
        depth: usize,
        required: bool,
    ) -> Result<Option<Value>, EngineError> {
        let normalised = normalize(name);
        if history.iter().any(|seen| *seen == normalised) {
            warn!("variable cycle detected page={page_id} name={name}");
            return Err(EngineError::VariableCycle {
                name: name.to_string(),
            });
        }
        self.check_history(history)?;

        let found = self
            .store
            .lookup(page_id, name)
            .map_err(|e| EngineError::StoreLookupFailed {
                message: e.to_string(),
            })?;

        if let Some(var) = found {
            let mut new_history = history.to_vec();
            new_history.push(normalised);
            return Ok(Some(self.resolve_formula(
                page_id,
                &var.formula,
                &new_history,
                depth,
            )?));
        }

        if let Some(builtin) = builtins::find(name) {
            return Ok(Some(Value::Function(builtin)));
        }

        if required {
            Err(EngineError::UndefinedVariable {
                name: name.to_string(),
            })
        } else {
            Ok(None)
        }
    }

    /// `Application(expr, args)` evaluation (§4.F step 4-5 and the full
    /// bind-then-eval lambda application flow).
    fn resolve_application(
        &self,
        page_id: &str,
        expr: &Value,
        args: &[Value],
        history: &[String],
        depth: usize,
    ) -> Result<Value, EngineError> {
        let resolved_expr = self.eval(page_id, expr, history, depth)?;

        let mut resolved_args = Vec::with_capacity(args.len());
        for arg in args {
            resolved_args.push(self.eval(page_id, arg, history, depth)?);
        }

        if let Value::Function(f) = &resolved_expr {
            return f(&resolved_args);
        }

        let (free_variables, body) = match &resolved_expr {
            Value::Lambda {
                free_variables,
                body,
            } => (free_variables, body.as_ref()),
            other => return Err(EngineError::not_callable(other.kind())),
        };

        let mut sub_map = HashMap::with_capacity(free_variables.len());
        for (i, param) in free_variables.iter().enumerate() {
            match resolved_args.get(i) {
                Some(arg) => {
                    sub_map.insert(normalize(param), arg.clone());
                }
                None => {
                    return Err(EngineError::IncompleteVarSet {
                        missing: free_variables[i..].to_vec(),
                    })
                }
            }
        }

        let bound = bind(body, &sub_map);
        self.eval(page_id, &bound, history, depth)
    }
}

fn parse_and_lower(formula: &str) -> Result<Value, EngineError> {
    let ast = parser::parse(formula)?;
    lower(&ast)
}

/// Capture-avoiding substitution `bind(value, sub_map)` (§4.F).
fn bind(value: &Value, sub_map: &HashMap<String, Value>) -> Value {
    match value {
        Value::Boolean(_) | Value::Number(_) | Value::String(_) | Value::Function(_) => {
            value.clone()
        }
        Value::Variable(name) => match sub_map.get(&normalize(name)) {
            Some(substituted) => substituted.clone(),
            None => value.clone(),
        },
        Value::List(elements) => {
            Value::List(elements.iter().map(|el| bind(el, sub_map)).collect())
        }
        Value::Record(props) => Value::Record(
            props
                .iter()
                .map(|(k, v)| (k.clone(), bind(v, sub_map)))
                .collect(),
        ),
        Value::Application { expr, args } => Value::Application {
            expr: Box::new(bind(expr, sub_map)),
            args: args.iter().map(|a| bind(a, sub_map)).collect(),
        },
        Value::Lambda {
            free_variables,
            body,
        } => {
            // Shadowing: remove this lambda's own params from the incoming
            // map before recursing, then rebuild with the ORIGINAL param
            // list (not the substituted one) — see §8.3.
            let mut reduced = sub_map.clone();
            for param in free_variables {
                reduced.remove(&normalize(param));
            }
            Value::Lambda {
                free_variables: free_variables.clone(),
                body: Box::new(bind(body, &reduced)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryVariableStore;

    fn engine(store: &InMemoryVariableStore) -> Engine<'_> {
        Engine::new(store)
    }

    #[test]
    fn empty_page_id_is_an_error() {
        let store = InMemoryVariableStore::new();
        let err = engine(&store).query("", "1").unwrap_err();
        assert!(matches!(err, EngineError::MissingPageId));
    }

    #[test]
    fn scenario_sum_of_three() {
        let store = InMemoryVariableStore::new();
        let result = engine(&store).query("P", "SUM(1, 2, 3)").unwrap();
        assert!(matches!(result, Value::Number(n) if n == 6.0));
    }

    #[test]
    fn scenario_nested_concatenate() {
        let store = InMemoryVariableStore::new();
        let result = engine(&store)
            .query("P", r#"CONCATENATE("Hello, ", CONCATENATE("World", "!"))"#)
            .unwrap();
        assert!(matches!(result, Value::String(s) if s == "Hello, World!"));
    }

    #[test]
    fn scenario_variable_dereference_through_coercion() {
        let store = InMemoryVariableStore::new();
        store.set("P", "var1", "\"Hello\"");
        let result = engine(&store).query("P", "[var1]").unwrap();
        match result {
            Value::List(elements) => {
                assert_eq!(elements.len(), 1);
                assert!(matches!(&elements[0], Value::String(s) if s == "Hello"));
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn scenario_lambda_value_carries_free_variables() {
        let store = InMemoryVariableStore::new();
        let result = engine(&store).query("P", "(a, b) => SUM(a, b)").unwrap();
        match result {
            Value::Lambda { free_variables, .. } => {
                assert_eq!(free_variables, vec!["a".to_string(), "b".to_string()])
            }
            other => panic!("expected lambda, got {other:?}"),
        }
    }

    #[test]
    fn scenario_boolean_keyword() {
        let store = InMemoryVariableStore::new();
        let result = engine(&store).query("P", "TRUE").unwrap();
        assert!(matches!(result, Value::Boolean(true)));
    }

    #[test]
    fn scenario_negative_number() {
        let store = InMemoryVariableStore::new();
        let result = engine(&store).query("P", "-34.9").unwrap();
        assert!(matches!(result, Value::Number(n) if n == -34.9));
    }

    #[test]
    fn scenario_variable_cycle_is_detected() {
        let store = InMemoryVariableStore::new();
        store.set("P", "x", "y");
        store.set("P", "y", "x");
        let err = engine(&store).query("P", "x").unwrap_err();
        let message = err.to_string();
        assert!(message.contains('x') || message.contains('y'));
    }

    #[test]
    fn scenario_if_not_equal() {
        let store = InMemoryVariableStore::new();
        let result = engine(&store)
            .query("P", r#"IF(NOT(EQUAL(1,2)), "a", "b")"#)
            .unwrap();
        assert!(matches!(result, Value::String(s) if s == "a"));
    }

    #[test]
    fn currying_matches_uncurried_call() {
        // A lambda binds all of its parameters in one application (§4.F step
        // 4); `f(3)(4)` only reduces when `f` is itself a one-param lambda
        // returning a lambda, not when called short against a two-param one.
        let store = InMemoryVariableStore::new();
        store.set("P", "f", "(a) => (b) => SUM(a, b)");
        store.set("P", "g", "(a, b) => SUM(a, b)");
        let curried = engine(&store).query("P", "f(3)(4)").unwrap();
        let direct = engine(&store).query("P", "g(3, 4)").unwrap();
        assert!(matches!(curried, Value::Number(n) if n == 7.0));
        assert!(matches!(direct, Value::Number(n) if n == 7.0));
    }

    #[test]
    fn calling_a_multi_param_lambda_short_is_incomplete_var_set() {
        let store = InMemoryVariableStore::new();
        store.set("P", "f", "(a, b) => SUM(a, b)");
        let err = engine(&store).query("P", "f(3)(4)").unwrap_err();
        match err {
            EngineError::IncompleteVarSet { missing } => assert_eq!(missing, vec!["b".to_string()]),
            other => panic!("expected incomplete var set, got {other:?}"),
        }
    }

    #[test]
    fn substitution_preserves_inner_shadowing() {
        // `nest` returns an inner `(x) => x` lambda; applying the outer
        // lambda to 1 must not capture the inner lambda's own bound `x`.
        let store = InMemoryVariableStore::new();
        store.set("P", "nest", "(x) => (x) => x");
        let result = engine(&store).query("P", "nest(1)(2)").unwrap();
        assert!(matches!(result, Value::Number(n) if n == 2.0));
    }

    #[test]
    fn undefined_variable_is_an_error() {
        let store = InMemoryVariableStore::new();
        let err = engine(&store).query("P", "nope").unwrap_err();
        assert!(matches!(err, EngineError::UndefinedVariable { .. }));
    }

    #[test]
    fn calling_a_non_callable_is_an_error() {
        let store = InMemoryVariableStore::new();
        store.set("P", "n", "1");
        let err = engine(&store).query("P", "n(2)").unwrap_err();
        assert!(matches!(err, EngineError::NotCallable { .. }));
    }

    #[test]
    fn a_redundant_parenthesised_group_is_an_unsupported_tuple() {
        let store = InMemoryVariableStore::new();
        let err = engine(&store).query("P", "(1)").unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedTuple));
    }

    #[test]
    fn incomplete_lambda_arguments_list_missing_params() {
        let store = InMemoryVariableStore::new();
        let err = engine(&store)
            .query("P", "((a, b) => SUM(a, b))(1)")
            .unwrap_err();
        match err {
            EngineError::IncompleteVarSet { missing } => assert_eq!(missing, vec!["b".to_string()]),
            other => panic!("expected incomplete var set, got {other:?}"),
        }
    }

    #[test]
    fn determinism_given_fixed_store_snapshot() {
        let store = InMemoryVariableStore::new();
        store.set("P", "x", "5");
        let e = engine(&store);
        let a = e.query("P", "SUM(x, 1)").unwrap();
        let b = e.query("P", "SUM(x, 1)").unwrap();
        assert!(matches!((a, b), (Value::Number(x), Value::Number(y)) if x == y));
    }
}
