pub mod fingerprint;
pub mod keygen;
pub mod open;
pub mod seal;
