pub mod lexer;
mod reader;

pub use reader::check_balanced;
pub use reader::read;
pub use reader::read_many;
pub use reader::BalancedState;
