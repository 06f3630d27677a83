//! Back-office surface: management list with pagination/filter/sort,
//! token-guarded create/modify/remove, and BO file downloads.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::ports::file_store::UrlScope;
use crate::application::ports::project_repository::SortMode;
use crate::application::use_cases::projects::create_project::CreateProject;
use crate::application::use_cases::projects::get_project::GetProject;
use crate::application::use_cases::projects::get_projects_by_ids::GetProjectsByIds;
use crate::application::use_cases::projects::list_project_ids::ListProjectIds;
use crate::application::use_cases::projects::reference_list::GetReferenceList;
use crate::application::use_cases::projects::remove_project::RemoveProject;
use crate::application::use_cases::projects::update_project::UpdateProject;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::forms::{
    ProjectForm, ProjectResponse, ReferenceItemResponse, read_project_multipart, validation_failed,
};

// Security token actions
pub const ACTION_CREATE_PROJECT: &str = "createProject";
pub const ACTION_MODIFY_PROJECT: &str = "modifyProject";
pub const ACTION_REMOVE_PROJECT: &str = "removeProject";

// Query parameters with a meaning of their own; everything else is treated
// as a column filter.
const RESERVED_PARAMS: [&str; 4] = ["page", "per_page", "orderby", "sort"];

#[derive(Debug, Serialize, ToSchema)]
pub struct ManageProjectsResponse {
    pub items: Vec<ProjectResponse>,
    pub total_items: usize,
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectFormResponse {
    pub project: Option<ProjectResponse>,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemoveConfirmation {
    pub id: i32,
    pub token: String,
}

/// GET /api/admin/projects
///
/// Pipeline of the management screen: filtered/sorted id list, page slice,
/// batch load by ids (input order preserved), attachment hydration.
#[utoipa::path(get, path = "/api/admin/projects", tag = "Admin Projects",
    params(
        ("page" = Option<usize>, Query, description = "1-based page index"),
        ("per_page" = Option<usize>, Query, description = "Items per page"),
        ("orderby" = Option<String>, Query, description = "Column to order by"),
        ("sort" = Option<String>, Query, description = "asc or desc")
    ),
    responses((status = 200, body = ManageProjectsResponse)))]
pub async fn manage_projects(
    State(ctx): State<AppContext>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ManageProjectsResponse>, StatusCode> {
    let page: usize = match params.get("page") {
        Some(raw) => raw.parse().map_err(|_| StatusCode::BAD_REQUEST)?,
        None => 1,
    };
    if page == 0 {
        return Err(StatusCode::BAD_REQUEST);
    }
    let per_page: usize = match params.get("per_page") {
        Some(raw) => raw.parse().map_err(|_| StatusCode::BAD_REQUEST)?,
        None => ctx.cfg.default_items_per_page,
    };
    if per_page == 0 {
        return Err(StatusCode::BAD_REQUEST);
    }
    let order_by = params.get("orderby").map(|s| s.as_str());
    let sort = match params.get("sort") {
        Some(raw) => SortMode::parse(raw).ok_or(StatusCode::BAD_REQUEST)?,
        None => SortMode::default(),
    };
    let filters: Vec<(String, String)> = params
        .iter()
        .filter(|(k, _)| !RESERVED_PARAMS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let repo = ctx.project_repo();
    let files = ctx.file_store();
    let ids = ListProjectIds { repo: repo.as_ref() }
        .execute(&filters, order_by, sort)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "select_project_ids_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let total_items = ids.len();
    let start = (page - 1).saturating_mul(per_page).min(total_items);
    let end = start.saturating_add(per_page).min(total_items);
    let page_ids = &ids[start..end];

    let uc = GetProjectsByIds {
        repo: repo.as_ref(),
        files: files.as_ref(),
    };
    let projects = uc
        .execute(page_ids, UrlScope::BackOffice)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "load_projects_page_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(ManageProjectsResponse {
        items: projects.into_iter().map(ProjectResponse::from).collect(),
        total_items,
        page,
        per_page,
    }))
}

/// GET /api/admin/projects/new — create-form data: no project yet, a fresh
/// token for the create action.
#[utoipa::path(get, path = "/api/admin/projects/new", tag = "Admin Projects",
    responses((status = 200, body = ProjectFormResponse)))]
pub async fn create_project_form(
    State(ctx): State<AppContext>,
) -> Result<Json<ProjectFormResponse>, StatusCode> {
    let token = ctx
        .token_service()
        .generate(ACTION_CREATE_PROJECT)
        .map_err(|err| {
            tracing::error!(error = ?err, "token_generation_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(Json(ProjectFormResponse {
        project: None,
        token,
    }))
}

/// POST /api/admin/projects (multipart/form-data)
#[utoipa::path(post, path = "/api/admin/projects", tag = "Admin Projects",
    request_body(content = ProjectForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, body = ProjectResponse),
        (status = 403, description = "Invalid security token"),
        (status = 422, description = "Validation failure")
    ))]
pub async fn do_create_project(
    State(ctx): State<AppContext>,
    multipart: Multipart,
) -> Result<Response, StatusCode> {
    let submission = read_project_multipart(multipart, ctx.cfg.upload_max_bytes).await?;
    require_token(&ctx, ACTION_CREATE_PROJECT, submission.token.as_deref())?;
    if let Err(errors) = submission.form.validate() {
        return Ok(validation_failed(errors));
    }

    let repo = ctx.project_repo();
    let files = ctx.file_store();
    let uc = CreateProject {
        repo: repo.as_ref(),
        files: files.as_ref(),
    };
    let project = uc
        .execute(submission.form.into_project(0, None), submission.upload)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "create_project_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))).into_response())
}

/// GET /api/admin/projects/{id} — modify-form data: the project (attachment
/// hydrated with BO URLs) and a token for the modify action.
#[utoipa::path(get, path = "/api/admin/projects/{id}", tag = "Admin Projects",
    params(("id" = i32, Path, description = "Project id")),
    responses((status = 200, body = ProjectFormResponse), (status = 404)))]
pub async fn modify_project_form(
    State(ctx): State<AppContext>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectFormResponse>, StatusCode> {
    let repo = ctx.project_repo();
    let files = ctx.file_store();
    let uc = GetProject {
        repo: repo.as_ref(),
        files: files.as_ref(),
    };
    let project = uc
        .execute(id, UrlScope::BackOffice)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, project_id = id, "load_project_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;
    let token = ctx
        .token_service()
        .generate(ACTION_MODIFY_PROJECT)
        .map_err(|err| {
            tracing::error!(error = ?err, "token_generation_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(Json(ProjectFormResponse {
        project: Some(ProjectResponse::from(project)),
        token,
    }))
}

/// PUT /api/admin/projects/{id} (multipart/form-data)
#[utoipa::path(put, path = "/api/admin/projects/{id}", tag = "Admin Projects",
    request_body(content = ProjectForm, content_type = "multipart/form-data"),
    params(("id" = i32, Path, description = "Project id")),
    responses(
        (status = 200, body = ProjectResponse),
        (status = 403, description = "Invalid security token"),
        (status = 404),
        (status = 422, description = "Validation failure")
    ))]
pub async fn do_modify_project(
    State(ctx): State<AppContext>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response, StatusCode> {
    let submission = read_project_multipart(multipart, ctx.cfg.upload_max_bytes).await?;
    require_token(&ctx, ACTION_MODIFY_PROJECT, submission.token.as_deref())?;

    let repo = ctx.project_repo();
    let existing = repo
        .load(id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, project_id = id, "load_project_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    if let Err(errors) = submission.form.validate() {
        return Ok(validation_failed(errors));
    }

    let files = ctx.file_store();
    let uc = UpdateProject {
        repo: repo.as_ref(),
        files: files.as_ref(),
    };
    let project = uc
        .execute(
            submission.form.into_project(id, existing.neuf_file),
            submission.upload,
        )
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, project_id = id, "update_project_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(ProjectResponse::from(project)).into_response())
}

/// GET /api/admin/projects/{id}/confirm-remove — removal confirmation
/// payload carrying a token for the remove action.
#[utoipa::path(get, path = "/api/admin/projects/{id}/confirm-remove", tag = "Admin Projects",
    params(("id" = i32, Path, description = "Project id")),
    responses((status = 200, body = RemoveConfirmation), (status = 404)))]
pub async fn confirm_remove_project(
    State(ctx): State<AppContext>,
    Path(id): Path<i32>,
) -> Result<Json<RemoveConfirmation>, StatusCode> {
    let repo = ctx.project_repo();
    let exists = repo
        .load(id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, project_id = id, "load_project_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .is_some();
    if !exists {
        return Err(StatusCode::NOT_FOUND);
    }
    let token = ctx
        .token_service()
        .generate(ACTION_REMOVE_PROJECT)
        .map_err(|err| {
            tracing::error!(error = ?err, "token_generation_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    Ok(Json(RemoveConfirmation { id, token }))
}

/// DELETE /api/admin/projects/{id}?token=...
#[utoipa::path(delete, path = "/api/admin/projects/{id}", tag = "Admin Projects",
    params(
        ("id" = i32, Path, description = "Project id"),
        ("token" = String, Query, description = "Security token for the remove action")
    ),
    responses((status = 204), (status = 403), (status = 404)))]
pub async fn do_remove_project(
    State(ctx): State<AppContext>,
    Path(id): Path<i32>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<StatusCode, StatusCode> {
    require_token(
        &ctx,
        ACTION_REMOVE_PROJECT,
        params.get("token").map(|s| s.as_str()),
    )?;
    let repo = ctx.project_repo();
    let files = ctx.file_store();
    let uc = RemoveProject {
        repo: repo.as_ref(),
        files: files.as_ref(),
    };
    let removed = uc.execute(id).await.map_err(|err| {
        tracing::error!(error = ?err, project_id = id, "remove_project_failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

/// GET /api/admin/projects/reference-list — (id, label) pairs for combos.
#[utoipa::path(get, path = "/api/admin/projects/reference-list", tag = "Admin Projects",
    responses((status = 200, body = [ReferenceItemResponse])))]
pub async fn reference_list(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<ReferenceItemResponse>>, StatusCode> {
    let repo = ctx.project_repo();
    let uc = GetReferenceList { repo: repo.as_ref() };
    let items = uc.execute().await.map_err(|err| {
        tracing::error!(error = ?err, "reference_list_failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(
        items.into_iter().map(ReferenceItemResponse::from).collect(),
    ))
}

/// GET /api/admin/projects/files/{key} — BO attachment download.
#[utoipa::path(get, path = "/api/admin/projects/files/{key}", tag = "Admin Projects",
    params(("key" = String, Path, description = "File key")),
    responses((status = 200, description = "File bytes", body = Vec<u8>, content_type = "application/octet-stream")))]
pub async fn download_file(
    State(ctx): State<AppContext>,
    Path(key): Path<String>,
) -> Result<Response, StatusCode> {
    serve_stored_file(&ctx, &key).await
}

/// Shared download path for both surfaces: metadata lookup, bytes, headers.
pub(crate) async fn serve_stored_file(ctx: &AppContext, key: &str) -> Result<Response, StatusCode> {
    let files = ctx.file_store();
    let meta = files
        .get_file_metadata(key)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, file_key = %key, "file_metadata_failed");
            StatusCode::NOT_FOUND
        })?
        .ok_or(StatusCode::NOT_FOUND)?;
    let data = files.read_bytes(key).await.map_err(|err| {
        tracing::error!(error = ?err, file_key = %key, "file_read_failed");
        StatusCode::NOT_FOUND
    })?;

    let content_type = meta.content_type.unwrap_or_else(|| {
        mime_guess::from_path(&meta.title)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    });

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        axum::http::header::HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    let disposition = format!("attachment; filename=\"{}\"", meta.title);
    headers.insert(
        axum::http::header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?,
    );
    Ok((headers, data).into_response())
}

/// Invalid or missing tokens end the request with 403.
pub(crate) fn require_token(
    ctx: &AppContext,
    action: &str,
    token: Option<&str>,
) -> Result<(), StatusCode> {
    let valid = token
        .map(|t| ctx.token_service().validate(action, t))
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        tracing::warn!(action, "invalid_security_token");
        Err(StatusCode::FORBIDDEN)
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/projects", get(manage_projects).post(do_create_project))
        .route("/projects/new", get(create_project_form))
        .route("/projects/reference-list", get(reference_list))
        .route(
            "/projects/:id",
            get(modify_project_form)
                .put(do_modify_project)
                .delete(do_remove_project),
        )
        .route("/projects/:id/confirm-remove", get(confirm_remove_project))
        .route("/projects/files/:key", get(download_file))
        .with_state(ctx)
}
