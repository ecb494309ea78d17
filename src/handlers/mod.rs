// handlers/mod.rs - HTTP handlers grouped by the credential they expect
//
// public     no credential (listings, reading by slug, login)
// protected  any role guard below superusuario
// elevated   superusuario only
//
// Guards themselves are attached per route in `routes.rs`; handlers only
// receive the resulting `AuthUser`.

pub mod elevated;
pub mod protected;
pub mod public;
pub mod utils;
