// handlers/elevated/mod.rs - superusuario-only administration

pub mod users;
