pub mod interactor;
pub mod lexer;
pub mod parser;
