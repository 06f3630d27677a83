//! Public surface. Read endpoints are open; the mutating endpoints mirror
//! the back-office ones and reuse the same token actions, so a site can
//! expose self-service project management without the admin router.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::ports::file_store::UrlScope;
use crate::application::use_cases::projects::create_project::CreateProject;
use crate::application::use_cases::projects::get_project::GetProject;
use crate::application::use_cases::projects::list_projects::ListProjects;
use crate::application::use_cases::projects::remove_project::RemoveProject;
use crate::application::use_cases::projects::update_project::UpdateProject;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::admin::{
    ACTION_CREATE_PROJECT, ACTION_MODIFY_PROJECT, ACTION_REMOVE_PROJECT, ProjectFormResponse,
    RemoveConfirmation, require_token, serve_stored_file,
};
use crate::presentation::http::forms::{
    ProjectForm, ProjectResponse, read_project_multipart, validation_failed,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectListResponse {
    pub items: Vec<ProjectResponse>,
}

/// GET /api/projects — every project, attachments carrying public URLs.
#[utoipa::path(get, path = "/api/projects", tag = "Projects",
    responses((status = 200, body = ProjectListResponse)))]
pub async fn list_projects(
    State(ctx): State<AppContext>,
) -> Result<Json<ProjectListResponse>, StatusCode> {
    let repo = ctx.project_repo();
    let files = ctx.file_store();
    let uc = ListProjects {
        repo: repo.as_ref(),
        files: files.as_ref(),
    };
    let projects = uc.execute(UrlScope::FrontOffice).await.map_err(|err| {
        tracing::error!(error = ?err, "list_projects_failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(ProjectListResponse {
        items: projects.into_iter().map(ProjectResponse::from).collect(),
    }))
}

/// GET /api/projects/{id}
#[utoipa::path(get, path = "/api/projects/{id}", tag = "Projects",
    params(("id" = i32, Path, description = "Project id")),
    responses((status = 200, body = ProjectResponse), (status = 404)))]
pub async fn get_project(
    State(ctx): State<AppContext>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectResponse>, StatusCode> {
    load_project(&ctx, id)
        .await
        .map(|p| Json(ProjectResponse::from(p)))
}

/// GET /api/projects/new — fresh create token for the public form.
#[utoipa::path(get, path = "/api/projects/new", tag = "Projects",
    responses((status = 200, body = ProjectFormResponse)))]
pub async fn create_project_form(
    State(ctx): State<AppContext>,
) -> Result<Json<ProjectFormResponse>, StatusCode> {
    let token = generate_token(&ctx, ACTION_CREATE_PROJECT)?;
    Ok(Json(ProjectFormResponse {
        project: None,
        token,
    }))
}

/// POST /api/projects (multipart/form-data)
#[utoipa::path(post, path = "/api/projects", tag = "Projects",
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

/// GET /api/projects/{id}/edit — project plus a modify token.
#[utoipa::path(get, path = "/api/projects/{id}/edit", tag = "Projects",
    params(("id" = i32, Path, description = "Project id")),
    responses((status = 200, body = ProjectFormResponse), (status = 404)))]
pub async fn modify_project_form(
    State(ctx): State<AppContext>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectFormResponse>, StatusCode> {
    let project = load_project(&ctx, id).await?;
    let token = generate_token(&ctx, ACTION_MODIFY_PROJECT)?;
    Ok(Json(ProjectFormResponse {
        project: Some(ProjectResponse::from(project)),
        token,
    }))
}

/// PUT /api/projects/{id} (multipart/form-data)
#[utoipa::path(put, path = "/api/projects/{id}", tag = "Projects",
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

/// GET /api/projects/{id}/confirm-remove
#[utoipa::path(get, path = "/api/projects/{id}/confirm-remove", tag = "Projects",
    params(("id" = i32, Path, description = "Project id")),
    responses((status = 200, body = RemoveConfirmation), (status = 404)))]
pub async fn confirm_remove_project(
    State(ctx): State<AppContext>,
    Path(id): Path<i32>,
) -> Result<Json<RemoveConfirmation>, StatusCode> {
    load_project(&ctx, id).await?;
    let token = generate_token(&ctx, ACTION_REMOVE_PROJECT)?;
    Ok(Json(RemoveConfirmation { id, token }))
}

/// DELETE /api/projects/{id}?token=...
#[utoipa::path(delete, path = "/api/projects/{id}", tag = "Projects",
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

/// GET /api/projects/files/{key} — public attachment download.
#[utoipa::path(get, path = "/api/projects/files/{key}", tag = "Projects",
    params(("key" = String, Path, description = "File key")),
    responses((status = 200, description = "File bytes", body = Vec<u8>, content_type = "application/octet-stream")))]
pub async fn download_file(
    State(ctx): State<AppContext>,
    Path(key): Path<String>,
) -> Result<Response, StatusCode> {
    serve_stored_file(&ctx, &key).await
}

async fn load_project(
    ctx: &AppContext,
    id: i32,
) -> Result<crate::domain::projects::project::Project, StatusCode> {
    let repo = ctx.project_repo();
    let files = ctx.file_store();
    let uc = GetProject {
        repo: repo.as_ref(),
        files: files.as_ref(),
    };
    uc.execute(id, UrlScope::FrontOffice)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, project_id = id, "load_project_failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)
}

fn generate_token(ctx: &AppContext, action: &str) -> Result<String, StatusCode> {
    ctx.token_service().generate(action).map_err(|err| {
        tracing::error!(error = ?err, "token_generation_failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/projects", get(list_projects).post(do_create_project))
        .route("/projects/new", get(create_project_form))
        .route(
            "/projects/:id",
            get(get_project)
                .put(do_modify_project)
                .delete(do_remove_project),
        )
        .route("/projects/:id/edit", get(modify_project_form))
        .route("/projects/:id/confirm-remove", get(confirm_remove_project))
        .route("/projects/files/:key", get(download_file))
        .with_state(ctx)
}
