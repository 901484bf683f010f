//! `CatalogEntity` implementations, one module per collection.
//!
//! Records without foreign keys use `impl_catalog_entity!`; the rest
//! implement reference resolution and any lookup or import quirks by hand.

mod airline;
mod airplane;
mod airplanemake;
mod country;
mod model;
mod modelmake;
