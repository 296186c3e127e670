//! Configuration access port trait.
//!
//! Typed getters return `Ok(None)` for an absent key and `Err(raw)` when the
//! key is present but does not parse, so callers can tell a default apart
//! from a typo.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, String>;
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, String>;
}
