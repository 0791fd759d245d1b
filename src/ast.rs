// ABOUTME: Parse-time tree produced by the parser, consumed by lowering

/// The tree the parser emits. Distinct from `Value` (see `value.rs`): `Tuple`
/// is a syntactic grouping that only exists before lowering decides whether a
/// parenthesised group is a lambda's parameter list or an argument list.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    Number(String),
    String(String),
    Boolean(bool),
    Variable(String),
    List(Vec<Ast>),
    Record(Vec<(String, Ast)>),
    Tuple(Vec<Ast>),
    Lambda { params: Box<Ast>, body: Box<Ast> },
    Application { expr: Box<Ast>, args: Box<Ast> },
}
