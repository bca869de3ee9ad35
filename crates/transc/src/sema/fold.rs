//! Constant folding of binary operators over numbers

/// Meaning of `%` when folding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuloMode {
    /// `%` folds as `<`, matching what existing generated code expects
    #[default]
    Legacy,
    /// `%` folds as the arithmetic remainder
    Remainder,
}

/// Result of folding one operator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Folded {
    Number(f64),
    Bool(bool),
}

/// Evaluate `left operator right`, or `None` for operators that do not fold
pub fn fold_binary(left: f64, right: f64, operator: &str, modulo: ModuloMode) -> Option<Folded> {
    let folded = match operator {
        "+" => Folded::Number(left + right),
        "-" => Folded::Number(left - right),
        "*" => Folded::Number(left * right),
        "/" => Folded::Number(left / right),
        ">" => Folded::Bool(left > right),
        "<" => Folded::Bool(left < right),
        "==" => Folded::Bool(left == right),
        "%" => match modulo {
            ModuloMode::Legacy => Folded::Bool(left < right),
            ModuloMode::Remainder => Folded::Number(left % right),
        },
        _ => return None,
    };
    Some(folded)
}
