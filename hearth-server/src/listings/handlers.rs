use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};

use hearth_core::service::ImageSource;
use hearth_model::{Property, PropertyDraft, PropertyId, PropertyPatch, UserId};

use crate::auth::identity::caller_identity;
use crate::infra::app_state::AppState;
use crate::infra::errors::AppResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    pub title: String,
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_per_night: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    pub owner: UserId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePropertyRequest {
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PropertyEnvelope {
    pub message: String,
    pub property: Property,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn create_property(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreatePropertyRequest>,
) -> AppResult<(StatusCode, Json<PropertyEnvelope>)> {
    let owner = caller_identity(&state, &headers, request.owner)?;

    let draft = PropertyDraft {
        title: request.title,
        address: request.address,
        description: request.description,
        price_per_night: request.price_per_night,
    };
    let image = ImageSource::Url(request.image_url.unwrap_or_default());

    let property = state.listings.create_listing(owner, draft, image).await?;

    Ok((
        StatusCode::CREATED,
        Json(PropertyEnvelope {
            message: "Property created successfully".to_string(),
            property,
        }),
    ))
}

pub async fn list_properties(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Property>>> {
    let properties = state
        .listings
        .list_listings(query.location.as_deref())
        .await?;
    Ok(Json(properties))
}

pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<PropertyId>,
) -> AppResult<Json<Property>> {
    let property = state.listings.get_listing(id).await?;
    Ok(Json(property))
}

pub async fn list_my_properties(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<Property>>> {
    let properties = state.listings.list_owned_listings(user_id).await?;
    Ok(Json(properties))
}

/// PUT takes the full document, `owner` included; the body-asserted
/// owner doubles as the caller identity when no token is presented.
pub async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<PropertyId>,
    headers: HeaderMap,
    Json(patch): Json<PropertyPatch>,
) -> AppResult<Json<PropertyEnvelope>> {
    let caller = caller_identity(&state, &headers, patch.owner)?;

    let property = state.listings.update_listing(id, caller, patch).await?;

    Ok(Json(PropertyEnvelope {
        message: "Property updated successfully".to_string(),
        property,
    }))
}

pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<PropertyId>,
    headers: HeaderMap,
    Json(request): Json<DeletePropertyRequest>,
) -> AppResult<Json<MessageResponse>> {
    let caller = caller_identity(&state, &headers, request.user_id)?;

    state.listings.delete_listing(id, caller).await?;

    Ok(Json(MessageResponse {
        message: "Property deleted successfully".to_string(),
    }))
}
