use std::collections::HashSet;

use chrono::Utc;

use crate::{
    dto::settings::{UpsertSettingsRequest, VariantTaxonomyInput},
    error::{AppError, AppResult},
    ids::new_document_id,
    middleware::auth::{Identity, ensure_admin},
    models::{ProductSettings, VariantDefinition, VariantOption},
    response::{ApiResponse, Meta},
    state::AppState,
};

fn settings_not_found() -> AppError {
    AppError::NotFound("Product settings not found".into())
}

/// Trims and lower-cases categories, dropping blanks. Fails if two entries
/// collapse to the same value.
pub fn normalize_categories(raw: &[String]) -> AppResult<Vec<String>> {
    let normalized: Vec<String> = raw
        .iter()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect();

    let mut seen = HashSet::new();
    if normalized.iter().any(|c| !seen.insert(c.as_str())) {
        return Err(AppError::BadRequest(
            "Duplicate or invalid categories are not allowed".into(),
        ));
    }
    Ok(normalized)
}

pub async fn get_settings(state: &AppState) -> AppResult<ApiResponse<ProductSettings>> {
    let settings = state
        .store
        .find_settings()
        .await?
        .ok_or_else(settings_not_found)?;
    Ok(ApiResponse::success("Product settings", settings, None))
}

pub async fn upsert_settings(
    state: &AppState,
    identity: &Identity,
    payload: UpsertSettingsRequest,
) -> AppResult<ApiResponse<ProductSettings>> {
    ensure_admin(identity)?;
    let categories = normalize_categories(&payload.categories)?;
    let now = Utc::now();

    match payload.id {
        Some(id) => {
            let mut settings = state
                .store
                .find_settings_by_id(&id)
                .await?
                .ok_or_else(settings_not_found)?;
            settings.categories = categories;
            if payload.product_card_type.is_some() {
                settings.product_card_type = payload.product_card_type;
            }
            settings.updated_at = now;

            if !state.store.save_settings(&settings).await? {
                return Err(settings_not_found());
            }
            Ok(ApiResponse::success(
                "Updated successfully",
                settings,
                Some(Meta::empty()),
            ))
        }
        None => {
            if state.store.find_settings().await?.is_some() {
                return Err(AppError::BadRequest("Product settings already exist".into()));
            }
            let settings = ProductSettings {
                id: new_document_id(),
                categories,
                variants: Vec::new(),
                product_card_type: payload.product_card_type,
                created_at: now,
                updated_at: now,
            };
            state.store.insert_settings(&settings).await?;
            Ok(ApiResponse::success(
                "Added successfully",
                settings,
                Some(Meta::empty()),
            ))
        }
    }
}

/// Adds a variant taxonomy, or edits the one whose id matches.
pub async fn upsert_variant(
    state: &AppState,
    identity: &Identity,
    settings_id: &str,
    variant: VariantTaxonomyInput,
) -> AppResult<ApiResponse<ProductSettings>> {
    ensure_admin(identity)?;

    let mut settings = state
        .store
        .find_settings_by_id(settings_id)
        .await?
        .ok_or_else(settings_not_found)?;

    let name_taken = settings.variants.iter().any(|existing| {
        existing.name.to_lowercase() == variant.name.to_lowercase()
            && Some(existing.id.as_str()) != variant.id.as_deref()
    });
    if name_taken {
        return Err(AppError::BadRequest(format!(
            "Variant name '{}' already exists",
            variant.name
        )));
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = variant
        .options
        .iter()
        .find(|option| !seen.insert(option.value.as_str()))
    {
        return Err(AppError::BadRequest(format!(
            "Duplicate option value '{}' found in variant '{}'.",
            duplicate.value, variant.name
        )));
    }

    let options: Vec<VariantOption> = variant
        .options
        .into_iter()
        .map(|option| VariantOption {
            id: option.id.unwrap_or_else(new_document_id),
            value: option.value,
            meta: option.meta,
        })
        .collect();

    let existing = variant
        .id
        .as_deref()
        .and_then(|id| settings.variants.iter_mut().find(|v| v.id == id));

    let message = match existing {
        Some(existing) => {
            existing.name = variant.name;
            existing.options = options;
            "Variant updated successfully"
        }
        None => {
            settings.variants.push(VariantDefinition {
                id: new_document_id(),
                name: variant.name,
                options,
            });
            "Variant added successfully"
        }
    };
    settings.updated_at = Utc::now();

    if !state.store.save_settings(&settings).await? {
        return Err(settings_not_found());
    }

    Ok(ApiResponse::success(message, settings, Some(Meta::empty())))
}

pub async fn delete_variant(
    state: &AppState,
    identity: &Identity,
    settings_id: &str,
    variant_id: &str,
) -> AppResult<ApiResponse<ProductSettings>> {
    ensure_admin(identity)?;

    let mut settings = state
        .store
        .find_settings_by_id(settings_id)
        .await?
        .ok_or_else(settings_not_found)?;

    let before = settings.variants.len();
    settings.variants.retain(|v| v.id != variant_id);
    if settings.variants.len() == before {
        return Err(AppError::NotFound("Variant not found".into()));
    }
    settings.updated_at = Utc::now();

    if !state.store.save_settings(&settings).await? {
        return Err(settings_not_found());
    }

    Ok(ApiResponse::success(
        "Deleted variant successfully",
        settings,
        Some(Meta::empty()),
    ))
}
