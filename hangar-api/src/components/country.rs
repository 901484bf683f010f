//! Country component implementation.

use hangar_core::Country;

crate::impl_catalog_entity!(Country, "country", countries);
