//! Utility macros for reducing boilerplate

/// Macro to implement `FromRef<AppState>` for state extractors.
///
/// # Example
/// ```ignore
/// impl_from_ref!(Arc<Catalog>, catalog);
/// // Expands to:
/// impl axum::extract::FromRef<AppState> for Arc<Catalog> {
///     fn from_ref(state: &AppState) -> Self {
///         state.catalog.clone()
///     }
/// }
/// ```
#[macro_export]
macro_rules! impl_from_ref {
    ($type:ty, $field:ident) => {
        impl axum::extract::FromRef<$crate::state::AppState> for $type {
            fn from_ref(state: &$crate::state::AppState) -> Self {
                state.$field.clone()
            }
        }
    };
}

/// Macro to implement `CatalogEntity` for records without foreign keys.
///
/// # Example
/// ```ignore
/// impl_catalog_entity!(Country, "country", countries);
/// ```
#[macro_export]
macro_rules! impl_catalog_entity {
    ($type:ty, $collection:expr, $adapter:ident) => {
        impl $crate::component::CatalogEntity for $type {
            const COLLECTION: &'static str = $collection;

            fn adapter(
                catalog: &$crate::catalog::Catalog,
            ) -> &hangar_storage::CachedAdapter<Self> {
                &catalog.$adapter
            }
        }
    };
}
