mod pretty;

pub use pretty::{pretty_print, print_flat, PrettyPrinter};
