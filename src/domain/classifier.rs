use crate::domain::model::CardType;

pub const OP_ADD: &str = "+";
pub const OP_SUBTRACT: &str = "-";
pub const OP_MULTIPLY: &str = "*";
pub const OP_DIVIDE: &str = "/";
pub const OP_POWER: &str = "^";

pub const OPERATORS: [&str; 5] = [OP_ADD, OP_SUBTRACT, OP_MULTIPLY, OP_DIVIDE, OP_POWER];

/// Derives a card's type from its raw value.
///
/// Only an exact match on one of the operator symbols is an operator; everything
/// else, including values that merely look numeric, is a number card. This is the
/// only place card types are decided; a type tag received from outside is ignored.
pub fn classify(value: &str) -> CardType {
    if OPERATORS.contains(&value) {
        CardType::Operator
    } else {
        CardType::Number
    }
}
