//! Picture Service
//!
//! Pictures and models are many-to-many. Each link is an association row
//! `{code: model, picture: name}` in the model table, found from the picture
//! side through the picture secondary index. Blobs live in the catalogue's
//! object store.
//!
//! Row deletes always happen before blob deletes when a model is untagged,
//! so a crash in between leaves an orphan blob rather than rows pointing at
//! a missing picture.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use hangar_core::Model;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::component::CatalogEntity;
use crate::error::{ApiError, ApiResult};

/// Collision-resistant object name for a new picture.
///
/// RFC 3339 timestamp with `:` replaced, then a random UUID.
pub fn picture_name(now: DateTime<Utc>, id: Uuid) -> String {
    format!("{}-{}", now.to_rfc3339().replace(':', "_"), id)
}

/// Upload `bytes` and attach the picture to every valid model code.
///
/// Unknown codes are dropped. With no valid code nothing is uploaded and
/// the result is empty.
pub async fn add_picture(
    catalog: &Catalog,
    bytes: Vec<u8>,
    codes: &[String],
) -> ApiResult<Vec<Model>> {
    let models = existing_models(catalog, codes).await?;
    if models.is_empty() {
        tracing::warn!(requested = codes.len(), "No valid model codes, picture not stored");
        return Ok(Vec::new());
    }

    let name = picture_name(Utc::now(), Uuid::new_v4());
    let size = bytes.len();
    let location = catalog.pictures().upload(&name, bytes).await?;
    tracing::info!(picture = %name, %location, size, models = models.len(), "Picture uploaded");

    attach(catalog, &name, models).await
}

/// Attach an already stored picture to more models.
pub async fn tag_picture(catalog: &Catalog, name: &str, codes: &[String]) -> ApiResult<Vec<Model>> {
    ensure_not_model_code(name, codes)?;
    let models = existing_models(catalog, codes).await?;
    attach(catalog, name, models).await
}

/// Detach the picture from one model, deleting the blob once nothing
/// references it. Returns the refreshed model, if it still exists.
pub async fn remove_picture(catalog: &Catalog, name: &str, code: &str) -> ApiResult<Option<Model>> {
    ensure_not_model_code(name, &[code.to_string()])?;
    catalog.models.delete_association(code, name).await?;

    let remaining = catalog.models.list_associations(name).await?;
    if remaining.is_empty() {
        catalog.pictures().delete_objects(&[name.to_string()]).await?;
        tracing::info!(picture = %name, "Picture no longer referenced, blob deleted");
    } else {
        tracing::debug!(picture = %name, remaining = remaining.len(), "Picture still referenced");
    }

    Ok(Model::get_by_code(catalog, code).await?)
}

/// Detach the picture from each of `codes`.
pub async fn untag_picture(catalog: &Catalog, name: &str, codes: &[String]) -> ApiResult<Vec<Model>> {
    ensure_not_model_code(name, codes)?;
    let mut models = Vec::new();
    for code in dedup_codes(codes) {
        if let Some(model) = remove_picture(catalog, name, &code).await? {
            models.push(model);
        }
    }
    Ok(models)
}

/// Delete the blob, then every association row pointing at it. Returns the
/// models that referenced the picture.
pub async fn delete_all_for_picture(catalog: &Catalog, name: &str) -> ApiResult<Vec<Model>> {
    catalog.pictures().delete_objects(&[name.to_string()]).await?;

    let links = catalog.models.list_associations(name).await?;
    let mut models = Vec::with_capacity(links.len());
    for link in links {
        catalog.models.delete_association(&link.code, name).await?;
        if let Some(model) = Model::get_by_code(catalog, &link.code).await? {
            models.push(model);
        }
    }
    tracing::info!(picture = %name, models = models.len(), "Picture deleted");
    Ok(models)
}

/// Canonical models the picture is attached to.
pub async fn models_for_picture(catalog: &Catalog, name: &str) -> ApiResult<Vec<Model>> {
    let links = catalog.models.list_associations(name).await?;
    let mut models = Vec::with_capacity(links.len());
    for link in links {
        if let Some(model) = Model::get_by_code(catalog, &link.code).await? {
            models.push(model);
        }
    }
    Ok(models)
}

// ============================================================================
// HELPERS
// ============================================================================

/// A picture named after one of the models would address that model's
/// canonical row.
fn ensure_not_model_code(name: &str, codes: &[String]) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::missing_field("pictureID"));
    }
    if codes.iter().any(|code| code.trim() == name) {
        return Err(ApiError::invalid_input(format!(
            "Picture name {} collides with a model code",
            name
        )));
    }
    Ok(())
}

fn dedup_codes(codes: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    codes
        .iter()
        .map(|code| code.trim())
        .filter(|code| !code.is_empty() && seen.insert(code.to_string()))
        .map(str::to_string)
        .collect()
}

async fn existing_models(catalog: &Catalog, codes: &[String]) -> ApiResult<Vec<Model>> {
    let mut models = Vec::new();
    for code in dedup_codes(codes) {
        match Model::get_by_code(catalog, &code).await? {
            Some(model) => models.push(model),
            None => tracing::debug!(code = %code, "Dropping unknown model code"),
        }
    }
    Ok(models)
}

/// Write one association row per model. The returned models carry the
/// picture in `picture_list` without being re-read.
async fn attach(catalog: &Catalog, name: &str, models: Vec<Model>) -> ApiResult<Vec<Model>> {
    let mut tagged = Vec::with_capacity(models.len());
    for mut model in models {
        catalog
            .models
            .put_association(&Model::picture_link(&model.code, name))
            .await?;
        if !model.picture_list.iter().any(|p| p == name) {
            model.picture_list.push(name.to_string());
        }
        tagged.push(model);
    }
    Ok(tagged)
}
