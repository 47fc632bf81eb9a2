pub mod adapter;
pub mod cpf;
pub mod pattern;
pub mod validation;
