// ABOUTME: Runtime value algebra: the lowering target of Ast and the resolver's domain

use crate::ast::Ast;
use crate::error::EngineError;
use std::collections::HashMap;
use std::fmt;

pub type Builtin = fn(&[Value]) -> Result<Value, EngineError>;

/// The one runtime value type. Shares representation with lowered ASTs: a
/// `Variable` or `Application` value means "not yet resolved", while
/// scalars, `Lambda`, and `Function` are self-reducing (invariant 5, §3).
#[derive(Debug, Clone)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Record(HashMap<String, Value>),
    Variable(String),
    Lambda {
        free_variables: Vec<String>,
        body: Box<Value>,
    },
    Function(Builtin),
    Application {
        expr: Box<Value>,
        args: Vec<Value>,
    },
}

impl Value {
    /// Stable name used in error messages and the result mapper.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::Variable(_) => "variable",
            Value::Lambda { .. } => "lambda",
            Value::Function(_) => "function",
            Value::Application { .. } => "application",
        }
    }

    pub fn as_boolean(&self) -> Result<bool, EngineError> {
        match self {
            Value::Boolean(b) => Ok(*b),
            _ => Err(EngineError::wrong_value_kind("boolean")),
        }
    }

    /// `Number → String` via shortest round-trippable decimal formatting
    /// (Rust's `f64` `Display` already produces this).
    pub fn as_string(&self) -> Result<String, EngineError> {
        match self {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(format!("{n}")),
            _ => Err(EngineError::wrong_value_kind("string")),
        }
    }

    /// `String → Number` via base-10 float parse; failure propagates.
    pub fn as_number(&self) -> Result<f64, EngineError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::String(s) => s
                .parse::<f64>()
                .map_err(|_| EngineError::wrong_value_kind("number")),
            _ => Err(EngineError::wrong_value_kind("number")),
        }
    }

    pub fn as_list(&self) -> Result<&[Value], EngineError> {
        match self {
            Value::List(elements) => Ok(elements),
            _ => Err(EngineError::wrong_value_kind("list")),
        }
    }

    pub fn as_record(&self) -> Result<&HashMap<String, Value>, EngineError> {
        match self {
            Value::Record(props) => Ok(props),
            _ => Err(EngineError::wrong_value_kind("record")),
        }
    }

    pub fn as_variable(&self) -> Result<&str, EngineError> {
        match self {
            Value::Variable(name) => Ok(name),
            _ => Err(EngineError::wrong_value_kind("variable")),
        }
    }

    pub fn as_lambda(&self) -> Result<(&[String], &Value), EngineError> {
        match self {
            Value::Lambda {
                free_variables,
                body,
            } => Ok((free_variables, body)),
            _ => Err(EngineError::wrong_value_kind("lambda")),
        }
    }

    pub fn as_function(&self) -> Result<Builtin, EngineError> {
        match self {
            Value::Function(f) => Ok(*f),
            _ => Err(EngineError::wrong_value_kind("function")),
        }
    }

    pub fn as_application(&self) -> Result<(&Value, &[Value]), EngineError> {
        match self {
            Value::Application { expr, args } => Ok((expr, args)),
            _ => Err(EngineError::wrong_value_kind("application")),
        }
    }
}

/// Lowers a parsed `Ast` into a `Value`, per §3's mapping table. A lambda's
/// parameter tuple must consist solely of `Variable` elements; this is
/// enforced again here as the authoritative check (the parser also checks
/// it, but lowering is where the free-variables list is actually built).
pub fn lower(ast: &Ast) -> Result<Value, EngineError> {
    match ast {
        Ast::Number(lexeme) => {
            let n: f64 = lexeme
                .parse()
                .map_err(|_| EngineError::wrong_value_kind("number"))?;
            Ok(Value::Number(n))
        }
        Ast::String(text) => Ok(Value::String(text.clone())),
        Ast::Boolean(b) => Ok(Value::Boolean(*b)),
        Ast::Variable(name) => Ok(Value::Variable(name.clone())),
        Ast::List(elements) => {
            let mut out = Vec::with_capacity(elements.len());
            for el in elements {
                out.push(lower(el)?);
            }
            Ok(Value::List(out))
        }
        Ast::Record(properties) => {
            let mut out = HashMap::with_capacity(properties.len());
            for (name, value) in properties {
                out.insert(name.clone(), lower(value)?);
            }
            Ok(Value::Record(out))
        }
        Ast::Tuple(_) => {
            // A bare tuple is purely syntactic grouping for lambda params
            // and application argument lists, both unwrapped directly by
            // their own branches below. A tuple reaching `lower` on its own
            // (e.g. a parenthesised group wrapping something other than a
            // lambda) has no value-algebra counterpart.
            Err(EngineError::UnsupportedTuple)
        }
        Ast::Lambda { params, body } => {
            let param_nodes = match params.as_ref() {
                Ast::Tuple(elements) => elements,
                other => {
                    return Err(EngineError::LambdaParamNotVariable {
                        found: format!("{other:?}"),
                    })
                }
            };
            let mut free_variables = Vec::with_capacity(param_nodes.len());
            for node in param_nodes {
                match lower(node)? {
                    Value::Variable(name) => free_variables.push(name),
                    other => {
                        return Err(EngineError::LambdaParamNotVariable {
                            found: other.kind().to_string(),
                        })
                    }
                }
            }
            Ok(Value::Lambda {
                free_variables,
                body: Box::new(lower(body)?),
            })
        }
        Ast::Application { expr, args } => {
            let arg_nodes = match args.as_ref() {
                Ast::Tuple(elements) => elements,
                other => std::slice::from_ref(other),
            };
            let mut lowered_args = Vec::with_capacity(arg_nodes.len());
            for arg in arg_nodes {
                lowered_args.push(lower(arg)?);
            }
            Ok(Value::Application {
                expr: Box::new(lower(expr)?),
                args: lowered_args,
            })
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::List(elements) => {
                write!(f, "[")?;
                for (i, el) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{el}")?;
                }
                write!(f, "]")
            }
            Value::Record(props) => {
                write!(f, "{{")?;
                let mut keys: Vec<_> = props.keys().collect();
                keys.sort();
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key} = {}", props[*key])?;
                }
                write!(f, "}}")
            }
            Value::Variable(name) => write!(f, "{name}"),
            Value::Lambda { free_variables, .. } => {
                write!(f, "({}) => <body>", free_variables.join(", "))
            }
            Value::Function(_) => write!(f, "<builtin>"),
            Value::Application { expr, args } => {
                write!(f, "{expr}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_coerces_to_string_via_shortest_roundtrip_formatting() {
        let v = Value::Number(-34.9);
        assert_eq!(v.as_string().unwrap(), "-34.9");
    }

    #[test]
    fn string_coerces_to_number() {
        let v = Value::String("6".to_string());
        assert_eq!(v.as_number().unwrap(), 6.0);
    }

    #[test]
    fn string_to_number_failure_propagates() {
        let v = Value::String("not a number".to_string());
        assert!(v.as_number().is_err());
    }

    #[test]
    fn accessors_reject_mismatched_kind() {
        let v = Value::Boolean(true);
        assert!(v.as_number().is_err());
        assert!(v.as_string().is_err());
    }

    #[test]
    fn lowers_number_ast_with_sign() {
        let value = lower(&Ast::Number("-34.9".to_string())).unwrap();
        assert!(matches!(value, Value::Number(n) if n == -34.9));
    }

    #[test]
    fn lowers_lambda_requiring_variable_params() {
        let ast = Ast::Lambda {
            params: Box::new(Ast::Tuple(vec![Ast::Variable("a".to_string())])),
            body: Box::new(Ast::Variable("a".to_string())),
        };
        let value = lower(&ast).unwrap();
        match value {
            Value::Lambda { free_variables, .. } => assert_eq!(free_variables, vec!["a"]),
            other => panic!("expected lambda, got {other:?}"),
        }
    }

    #[test]
    fn lowers_application_args_from_tuple() {
        let ast = Ast::Application {
            expr: Box::new(Ast::Variable("sum".to_string())),
            args: Box::new(Ast::Tuple(vec![
                Ast::Number("1".to_string()),
                Ast::Number("2".to_string()),
            ])),
        };
        let value = lower(&ast).unwrap();
        match value {
            Value::Application { args, .. } => assert_eq!(args.len(), 2),
            other => panic!("expected application, got {other:?}"),
        }
    }

    #[test]
    fn kind_names_match_spec_vocabulary() {
        assert_eq!(Value::Boolean(true).kind(), "boolean");
        assert_eq!(Value::Number(1.0).kind(), "number");
        assert_eq!(Value::String(String::new()).kind(), "string");
    }
}
