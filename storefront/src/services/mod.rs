// storefront/src/services/mod.rs

pub mod email;
