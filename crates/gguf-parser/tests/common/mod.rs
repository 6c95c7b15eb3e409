#[path = "../../src/test_factory.rs"]
mod test_factory;

pub use test_factory::*;
