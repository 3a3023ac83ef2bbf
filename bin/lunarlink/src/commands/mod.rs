pub mod codes;
pub mod context;
pub mod login;
