mod operator;
mod tree;

pub use operator::{InfixOperator, Precedence, PrefixOperator};
pub use tree::{ConditionalBranch, Expression, HashKey};
