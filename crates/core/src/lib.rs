//! Meridian domain core.
//!
//! Pure domain types, closed enums, validation, and matching logic for the
//! marketing automation and segmentation engine. This crate has no internal
//! dependencies so it can be used by the DB/repository layer, the API server,
//! and any future CLI or worker tooling.

pub mod automation;
pub mod campaigns;
pub mod coupons;
pub mod error;
pub mod offers;
pub mod pagination;
pub mod roles;
pub mod segments;
pub mod types;
