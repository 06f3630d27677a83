//! Shared form handling for both controller surfaces: the multipart project
//! form, its validation rules, and the response DTOs.

use axum::Json;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidateUrl, ValidationError};

use crate::application::ports::file_store::FileUpload;
use crate::domain::projects::project::{Project, ProjectFile, ReferenceItem};

/// Field values of the create/modify form. Validation mirrors the column
/// constraints; email and url accept the empty string (optional inputs).
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ProjectForm {
    pub un_entier: i32,
    #[validate(length(max = 50))]
    pub deux_sh: String,
    #[validate(length(max = 255))]
    pub trois_md: String,
    pub quatre_lg: String,
    #[validate(length(max = 255), custom(function = "optional_email"))]
    pub cinq_mail: String,
    #[validate(length(max = 255), custom(function = "optional_url"))]
    pub six_url: String,
    #[validate(required)]
    #[schema(value_type = String, format = Date)]
    pub sept_date: Option<NaiveDate>,
    pub huit_b: bool,
}

fn optional_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

fn optional_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url"))
    }
}

impl ProjectForm {
    /// Applies the form onto a project row. `neuf_file` is untouched; the
    /// upload pass-through owns attachment changes.
    pub fn into_project(self, id: i32, neuf_file: Option<ProjectFile>) -> Project {
        Project {
            id,
            un_entier: self.un_entier,
            deux_sh: self.deux_sh,
            trois_md: self.trois_md,
            quatre_lg: self.quatre_lg,
            cinq_mail: self.cinq_mail,
            six_url: self.six_url,
            sept_date: self.sept_date.unwrap_or_default(),
            huit_b: self.huit_b,
            neuf_file,
        }
    }
}

/// A parsed multipart submission: form fields, the optional `neuf_file`
/// upload, and the security token field.
pub struct ProjectSubmission {
    pub form: ProjectForm,
    pub upload: Option<FileUpload>,
    pub token: Option<String>,
}

/// Reads the multipart body field by field. Unknown fields are ignored, the
/// upload size is capped by `max_upload_bytes`.
pub async fn read_project_multipart(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<ProjectSubmission, StatusCode> {
    let mut form = ProjectForm::default();
    let mut upload: Option<FileUpload> = None;
    let mut token: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("neuf_file") => {
                let filename = field.file_name().map(|s| s.to_string());
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
                if data.len() > max_upload_bytes {
                    return Err(StatusCode::PAYLOAD_TOO_LARGE);
                }
                // An empty file part means "no file chosen" in a browser form
                if !data.is_empty() {
                    upload = Some(FileUpload {
                        filename,
                        content_type,
                        bytes: data.to_vec(),
                    });
                }
            }
            Some("token") => {
                token = Some(field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?);
            }
            Some("un_entier") => {
                let text = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
                form.un_entier = text.trim().parse().map_err(|_| StatusCode::BAD_REQUEST)?;
            }
            Some("deux_sh") => {
                form.deux_sh = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            }
            Some("trois_md") => {
                form.trois_md = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            }
            Some("quatre_lg") => {
                form.quatre_lg = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            }
            Some("cinq_mail") => {
                form.cinq_mail = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            }
            Some("six_url") => {
                form.six_url = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            }
            Some("sept_date") => {
                let text = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    form.sept_date = Some(
                        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                            .map_err(|_| StatusCode::BAD_REQUEST)?,
                    );
                }
            }
            Some("huit_b") => {
                let text = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
                form.huit_b = matches!(text.trim(), "true" | "on" | "1");
            }
            _ => { /* ignore additional fields */ }
        }
    }

    Ok(ProjectSubmission {
        form,
        upload,
        token,
    })
}

/// 422 carrying the per-field validation messages.
pub fn validation_failed(errors: validator::ValidationErrors) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(serde_json::json!({ "errors": errors })),
    )
        .into_response()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectFileResponse {
    pub file_key: String,
    pub title: Option<String>,
    pub size: Option<i64>,
    pub content_type: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectResponse {
    pub id: i32,
    pub un_entier: i32,
    pub deux_sh: String,
    pub trois_md: String,
    pub quatre_lg: String,
    pub cinq_mail: String,
    pub six_url: String,
    #[schema(value_type = String, format = Date)]
    pub sept_date: NaiveDate,
    pub huit_b: bool,
    pub neuf_file: Option<ProjectFileResponse>,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            un_entier: p.un_entier,
            deux_sh: p.deux_sh,
            trois_md: p.trois_md,
            quatre_lg: p.quatre_lg,
            cinq_mail: p.cinq_mail,
            six_url: p.six_url,
            sept_date: p.sept_date,
            huit_b: p.huit_b,
            neuf_file: p.neuf_file.map(|f| ProjectFileResponse {
                file_key: f.file_key,
                title: f.title,
                size: f.size,
                content_type: f.content_type,
                url: f.url,
            }),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReferenceItemResponse {
    pub code: i32,
    pub name: String,
}

impl From<ReferenceItem> for ReferenceItemResponse {
    fn from(item: ReferenceItem) -> Self {
        Self {
            code: item.code,
            name: item.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ProjectForm {
        ProjectForm {
            un_entier: 1,
            deux_sh: "short".into(),
            trois_md: "medium".into(),
            quatre_lg: "long text".into(),
            cinq_mail: "someone@example.com".into(),
            six_url: "https://example.com".into(),
            sept_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            huit_b: false,
        }
    }

    #[test]
    fn valid_form_passes() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn deux_sh_is_capped_at_50() {
        let mut form = valid_form();
        form.deux_sh = "x".repeat(51);
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("deux_sh"));
    }

    #[test]
    fn trois_md_is_capped_at_255() {
        let mut form = valid_form();
        form.trois_md = "x".repeat(256);
        assert!(form.validate().is_err());
    }

    #[test]
    fn empty_email_and_url_are_accepted() {
        let mut form = valid_form();
        form.cinq_mail = String::new();
        form.six_url = String::new();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut form = valid_form();
        form.cinq_mail = "not-an-email".into();
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("cinq_mail"));
    }

    #[test]
    fn malformed_url_is_rejected() {
        let mut form = valid_form();
        form.six_url = "not a url".into();
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("six_url"));
    }

    #[test]
    fn missing_date_is_rejected() {
        let mut form = valid_form();
        form.sept_date = None;
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("sept_date"));
    }
}
