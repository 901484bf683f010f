//! Model make component implementation.

use hangar_core::ModelMake;

crate::impl_catalog_entity!(ModelMake, "modelmake", model_makes);
