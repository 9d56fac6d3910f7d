// Domain layer: models, the profile form shape and the ports the rest of the crate talks through.

pub mod model;
pub mod ports;
pub mod profile;
