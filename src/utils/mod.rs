pub mod geo;
pub mod id_generator;
