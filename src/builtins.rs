// ABOUTME: The standard builtin library: sum, concatenate, list, if, equal, not, love

use crate::error::{EngineError, ARITY_EXACTLY_ONE, ARITY_EXACTLY_THREE, ARITY_EXACTLY_TWO};
use crate::value::{Builtin, Value};

/// Static table of `(name, fn-pointer)` consulted by case-insensitive name
/// lookup (§9 Design Notes). This table is the single source of truth for
/// which names the builtin registry recognises.
const TABLE: &[(&str, Builtin)] = &[
    ("sum", sum),
    ("concatenate", concatenate),
    ("list", list),
    ("if", if_),
    ("equal", equal),
    ("not", not),
    ("love", love),
];

/// Looks up a builtin by case-insensitive name, returning its function
/// pointer if registered.
pub fn find(name: &str) -> Option<Builtin> {
    TABLE
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, f)| *f)
}

/// Each argument coerced to number; result is their sum (`+0.0` on empty).
fn sum(args: &[Value]) -> Result<Value, EngineError> {
    let mut acc = 0.0;
    for (i, arg) in args.iter().enumerate() {
        let n = arg
            .as_number()
            .map_err(|_| EngineError::bad_argument_type("sum", i, "number", arg.kind()))?;
        acc += n;
    }
    Ok(Value::Number(acc))
}

/// Each argument coerced to string; result is their concatenation.
fn concatenate(args: &[Value]) -> Result<Value, EngineError> {
    let mut acc = String::new();
    for (i, arg) in args.iter().enumerate() {
        let s = arg
            .as_string()
            .map_err(|_| EngineError::bad_argument_type("concatenate", i, "string", arg.kind()))?;
        acc.push_str(&s);
    }
    Ok(Value::String(acc))
}

/// Returns `List(args)` (copies the argument slice).
fn list(args: &[Value]) -> Result<Value, EngineError> {
    Ok(Value::List(args.to_vec()))
}

/// Arg0 coerced to boolean; returns arg1 when true, else arg2. Both branches
/// arrive already evaluated — `if` is a builtin `Function`, not a special
/// form, so strict evaluation already happened in the resolver (§4.E).
fn if_(args: &[Value]) -> Result<Value, EngineError> {
    if args.len() != 3 {
        return Err(EngineError::arity("if", ARITY_EXACTLY_THREE, args.len()));
    }
    let condition = args[0]
        .as_boolean()
        .map_err(|_| EngineError::bad_argument_type("if", 0, "boolean", args[0].kind()))?;
    Ok(if condition {
        args[1].clone()
    } else {
        args[2].clone()
    })
}

/// Deep structural equality; different-typed operands are `false`.
/// Applications, lambdas, functions, and variables are not comparable.
fn equal(args: &[Value]) -> Result<Value, EngineError> {
    if args.len() != 2 {
        return Err(EngineError::arity("equal", ARITY_EXACTLY_TWO, args.len()));
    }
    Ok(Value::Boolean(compare(&args[0], &args[1])?))
}

fn compare(left: &Value, right: &Value) -> Result<bool, EngineError> {
    if left.kind() != right.kind() {
        return Ok(false);
    }
    match (left, right) {
        (Value::Boolean(a), Value::Boolean(b)) => Ok(a == b),
        (Value::Number(a), Value::Number(b)) => Ok(a == b),
        (Value::String(a), Value::String(b)) => Ok(a == b),
        (Value::List(a), Value::List(b)) => {
            if a.len() != b.len() {
                return Ok(false);
            }
            for (x, y) in a.iter().zip(b.iter()) {
                if !compare(x, y)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        (Value::Record(a), Value::Record(b)) => {
            if a.len() != b.len() {
                return Ok(false);
            }
            for (key, x) in a {
                match b.get(key) {
                    Some(y) if compare(x, y)? => continue,
                    _ => return Ok(false),
                }
            }
            Ok(true)
        }
        (Value::Application { .. }, Value::Application { .. }) => Err(
            EngineError::NotComparable {
                left: "application".to_string(),
                right: "application".to_string(),
            },
        ),
        (Value::Lambda { .. }, Value::Lambda { .. }) => Err(EngineError::NotComparable {
            left: "lambda".to_string(),
            right: "lambda".to_string(),
        }),
        (Value::Function(_), Value::Function(_)) => Err(EngineError::NotComparable {
            left: "function".to_string(),
            right: "function".to_string(),
        }),
        (Value::Variable(_), Value::Variable(_)) => Err(EngineError::NotComparable {
            left: "variable".to_string(),
            right: "variable".to_string(),
        }),
        _ => Ok(false),
    }
}

/// Boolean negation.
fn not(args: &[Value]) -> Result<Value, EngineError> {
    if args.len() != 1 {
        return Err(EngineError::arity("not", ARITY_EXACTLY_ONE, args.len()));
    }
    let b = args[0]
        .as_boolean()
        .map_err(|_| EngineError::bad_argument_type("not", 0, "boolean", args[0].kind()))?;
    Ok(Value::Boolean(!b))
}

/// Returns `"I love you, " + arg + "!"`; arg must be a string.
fn love(args: &[Value]) -> Result<Value, EngineError> {
    if args.len() != 1 {
        return Err(EngineError::arity("love", ARITY_EXACTLY_ONE, args.len()));
    }
    let name = args[0]
        .as_string()
        .map_err(|_| EngineError::bad_argument_type("love", 0, "string", args[0].kind()))?;
    Ok(Value::String(format!("I love you, {name}!")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_builtins_case_insensitively() {
        assert!(find("SUM").is_some());
        assert!(find("Concatenate").is_some());
        assert!(find("nope").is_none());
    }

    #[test]
    fn sum_of_empty_is_positive_zero() {
        let result = sum(&[]).unwrap();
        assert!(matches!(result, Value::Number(n) if n == 0.0));
    }

    #[test]
    fn sum_coerces_string_arguments() {
        let args = vec![Value::Number(1.0), Value::String("2".to_string())];
        let result = sum(&args).unwrap();
        assert!(matches!(result, Value::Number(n) if n == 3.0));
    }

    #[test]
    fn concatenate_of_empty_is_empty_string() {
        let result = concatenate(&[]).unwrap();
        assert!(matches!(result, Value::String(s) if s.is_empty()));
    }

    #[test]
    fn if_returns_consequent_or_alternative() {
        let t = if_(&[
            Value::Boolean(true),
            Value::String("a".to_string()),
            Value::String("b".to_string()),
        ])
        .unwrap();
        assert!(matches!(t, Value::String(s) if s == "a"));

        let f = if_(&[
            Value::Boolean(false),
            Value::String("a".to_string()),
            Value::String("b".to_string()),
        ])
        .unwrap();
        assert!(matches!(f, Value::String(s) if s == "b"));
    }

    #[test]
    fn equal_differs_by_type_without_erroring() {
        let result = equal(&[Value::Number(1.0), Value::String("1".to_string())]).unwrap();
        assert!(matches!(result, Value::Boolean(false)));
    }

    #[test]
    fn equal_on_numbers_is_bitwise_ieee() {
        let nan_eq = equal(&[Value::Number(f64::NAN), Value::Number(f64::NAN)]).unwrap();
        assert!(matches!(nan_eq, Value::Boolean(false)));

        let zero_eq = equal(&[Value::Number(0.0), Value::Number(-0.0)]).unwrap();
        assert!(matches!(zero_eq, Value::Boolean(true)));
    }

    #[test]
    fn equal_on_lambdas_errors() {
        let lambda = Value::Lambda {
            free_variables: vec!["a".to_string()],
            body: Box::new(Value::Variable("a".to_string())),
        };
        let err = equal(&[lambda.clone(), lambda]).unwrap_err();
        assert!(matches!(err, EngineError::NotComparable { .. }));
    }

    #[test]
    fn not_negates_boolean() {
        assert!(matches!(not(&[Value::Boolean(true)]).unwrap(), Value::Boolean(false)));
    }

    #[test]
    fn love_formats_greeting() {
        let result = love(&[Value::String("World".to_string())]).unwrap();
        assert!(matches!(result, Value::String(s) if s == "I love you, World!"));
    }

    #[test]
    fn arity_violations_name_the_builtin() {
        let err = not(&[]).unwrap_err();
        match err {
            EngineError::Arity { builtin, .. } => assert_eq!(builtin, "not"),
            other => panic!("expected arity error, got {other:?}"),
        }
    }
}
