//! Build-time scalar precision. Selected via the `f32`/`f64` Cargo features;
//! `f64` wins if both are enabled, matching the crate's `default = ["f64"]`.

#[cfg(feature = "f64")]
pub type Real = f64;

#[cfg(all(feature = "f32", not(feature = "f64")))]
pub type Real = f32;
