//! Request handlers for the product pages.

use axum::{
    Form, Json,
    extract::{FromRequest, Request, State},
    http::{HeaderMap, Method, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde_json::json;
use shelf_core::{AjaxProductForm, FormErrors, Product, ProductFields, ProductForm, ProductId};

use crate::auth::CurrentUser;
use crate::cookies::{self, LAST_LOGIN_COOKIE};
use crate::csrf::{self, CsrfToken};
use crate::error::ShelfError;
use crate::extract::IdPath;
use crate::pages::{self, ProductFormMode};
use crate::state::AppState;

// =============================================================================
// Listing
// =============================================================================

/// Handler for the product listing of the current user.
pub async fn show_main(
    State(state): State<AppState>,
    current: CurrentUser,
    headers: HeaderMap,
) -> Result<Response, ShelfError> {
    let last_login = cookies::get(&headers, LAST_LOGIN_COOKIE)
        .ok_or(ShelfError::MissingCookie(LAST_LOGIN_COOKIE))?;
    let products = state.db().products_for_owner(current.user.id).await?;

    let page = pages::main_page(
        &state.config().site,
        &current.user.username,
        &products,
        &last_login,
    );
    Ok(Html(page).into_response())
}

// =============================================================================
// Create / edit / delete
// =============================================================================

pub async fn create_product_page(
    State(state): State<AppState>,
    current: CurrentUser,
    headers: HeaderMap,
) -> Response {
    render_product_form(
        &state,
        &current,
        &headers,
        ProductFormMode::Create,
        &ProductForm::default(),
        &FormErrors::new(),
    )
}

pub async fn create_product(
    State(state): State<AppState>,
    current: CurrentUser,
    headers: HeaderMap,
    Form(form): Form<ProductForm>,
) -> Result<Response, ShelfError> {
    csrf::verify(&headers, &form.csrf_token)?;

    match form.validate() {
        Ok(fields) => {
            let product = state.db().insert_product(current.user.id, &fields).await?;
            tracing::info!(product_id = %product.id, user_id = %current.user.id, "Product created");
            Ok(Redirect::to("/").into_response())
        }
        Err(errors) => Ok(render_product_form(
            &state,
            &current,
            &headers,
            ProductFormMode::Create,
            &form,
            &errors,
        )),
    }
}

pub async fn edit_product_page(
    State(state): State<AppState>,
    current: CurrentUser,
    headers: HeaderMap,
    IdPath(id): IdPath,
) -> Result<Response, ShelfError> {
    let product = editable_product(&state, &current, id).await?;
    let form = ProductForm::from_fields(&ProductFields::from(&product));

    Ok(render_product_form(
        &state,
        &current,
        &headers,
        ProductFormMode::Edit(product.id),
        &form,
        &FormErrors::new(),
    ))
}

pub async fn edit_product(
    State(state): State<AppState>,
    current: CurrentUser,
    headers: HeaderMap,
    IdPath(id): IdPath,
    Form(form): Form<ProductForm>,
) -> Result<Response, ShelfError> {
    csrf::verify(&headers, &form.csrf_token)?;
    let product = editable_product(&state, &current, id).await?;

    match form.validate() {
        Ok(fields) => {
            state.db().update_product(product.id, &fields).await?;
            tracing::info!(product_id = %product.id, user_id = %current.user.id, "Product updated");
            Ok(Redirect::to("/").into_response())
        }
        Err(errors) => Ok(render_product_form(
            &state,
            &current,
            &headers,
            ProductFormMode::Edit(product.id),
            &form,
            &errors,
        )),
    }
}

/// Deletes without confirmation.
pub async fn delete_product(
    State(state): State<AppState>,
    current: CurrentUser,
    IdPath(id): IdPath,
) -> Result<Response, ShelfError> {
    let product = editable_product(&state, &current, id).await?;
    state.db().delete_product(product.id).await?;
    tracing::info!(product_id = %product.id, user_id = %current.user.id, "Product deleted");
    Ok(Redirect::to("/").into_response())
}

/// Look a product up for modification. Any id is reachable unless ownership
/// is enforced, in which case foreign products look missing.
async fn editable_product(
    state: &AppState,
    current: &CurrentUser,
    id: ProductId,
) -> Result<Product, ShelfError> {
    let product = state.db().get_product(id).await?;
    if state.config().products.enforce_ownership && product.owner != current.user.id {
        tracing::warn!(product_id = %id, user_id = %current.user.id, "Refusing access to a foreign product");
        return Err(ShelfError::Lookup {
            entity: "product",
            id: id.to_string(),
        });
    }
    Ok(product)
}

fn render_product_form(
    state: &AppState,
    current: &CurrentUser,
    headers: &HeaderMap,
    mode: ProductFormMode,
    form: &ProductForm,
    errors: &FormErrors,
) -> Response {
    let csrf = CsrfToken::for_request(headers);
    let page = pages::product_form_page(
        &state.config().site,
        &current.user.username,
        mode,
        form,
        errors,
        csrf.value(),
    );
    csrf.render(page, state.config().session.secure)
}

// =============================================================================
// AJAX
// =============================================================================

/// Stores the submitted fields as-is.
///
/// Only POST is routed here; every other method is a 404. There is no CSRF
/// check on this endpoint.
pub async fn add_product_ajax(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ShelfError> {
    if request.method() != Method::POST {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    let current = request
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or(ShelfError::NotAuthenticated)?;

    let form = match Form::<AjaxProductForm>::from_request(request, &state).await {
        Ok(Form(form)) => form,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let product = state
        .db()
        .insert_product(current.user.id, &form.into_fields())
        .await?;
    tracing::info!(product_id = %product.id, user_id = %current.user.id, "Product created via AJAX");

    Ok((StatusCode::CREATED, "CREATED").into_response())
}

// =============================================================================
// Health
// =============================================================================

pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "service": "shelf" }))
}
