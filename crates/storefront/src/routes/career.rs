//! Job listings and applications.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use delegends_core::{Email, JobId, JobType, Phone};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{Job, JobApplication};
use crate::error::{AppError, Result};
use crate::filters;
use crate::page::{Flash, PageContext, set_flash};
use crate::state::AppState;

/// Listing filters. Empty values mean "all".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CareerQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, rename = "type")]
    pub job_type: String,
}

impl CareerQuery {
    fn matches(&self, job: &Job) -> bool {
        let q = self.q.trim().to_lowercase();
        let text_ok = q.is_empty()
            || job.title.to_lowercase().contains(&q)
            || job.description.to_lowercase().contains(&q);
        let location_ok = self.location.is_empty() || job.location == self.location;
        let type_ok = match self.job_type.parse::<JobType>() {
            Ok(wanted) => job.job_type == Some(wanted),
            Err(_) => true,
        };
        text_ok && location_ok && type_ok
    }
}

/// Filter listings.
#[must_use]
pub fn filter_jobs(jobs: Vec<Job>, query: &CareerQuery) -> Vec<Job> {
    jobs.into_iter().filter(|job| query.matches(job)).collect()
}

/// Distinct job locations, sorted.
fn locations(jobs: &[Job]) -> Vec<String> {
    let mut locations: Vec<String> = jobs.iter().map(|job| job.location.clone()).collect();
    locations.sort();
    locations.dedup();
    locations
}

/// Career page template.
#[derive(Template, WebTemplate)]
#[template(path = "career/index.html")]
pub struct CareerTemplate {
    pub page: PageContext,
    pub jobs: Vec<Job>,
    pub locations: Vec<String>,
    pub job_types: [JobType; 3],
    pub query: CareerQuery,
    pub unavailable: bool,
}

/// Job detail template.
#[derive(Template, WebTemplate)]
#[template(path = "career/show.html")]
pub struct JobTemplate {
    pub page: PageContext,
    pub job: Job,
}

/// Application form data.
#[derive(Debug, Deserialize)]
pub struct ApplicationForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

impl ApplicationForm {
    /// Translation key of the first problem, if any.
    fn problem(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() || self.email.trim().is_empty() || self.phone.trim().is_empty() {
            return Some("career.errors.missingFields");
        }
        if Email::parse(&self.email).is_err() {
            return Some("career.errors.invalidEmail");
        }
        if Phone::parse(&self.phone).is_err() {
            return Some("career.errors.invalidPhone");
        }
        None
    }
}

/// Display open positions.
#[instrument(skip(state, page))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CareerQuery>,
    page: PageContext,
) -> impl IntoResponse {
    let (jobs, unavailable) = match state.api().list_jobs().await {
        Ok(jobs) => (jobs, false),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load job listings");
            (Vec::new(), true)
        }
    };

    CareerTemplate {
        page,
        locations: locations(&jobs),
        jobs: filter_jobs(jobs, &query),
        job_types: [JobType::FullTime, JobType::PartTime, JobType::Contract],
        query,
        unavailable,
    }
}

async fn find_job(state: &AppState, id: &JobId) -> Result<Job> {
    state
        .api()
        .list_jobs()
        .await?
        .into_iter()
        .find(|job| &job.id == id)
        .ok_or_else(|| AppError::NotFound(format!("job {id}")))
}

/// Display one position with the application form.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
    page: PageContext,
) -> Result<impl IntoResponse> {
    let job = find_job(&state, &id).await?;
    Ok(JobTemplate { page, job })
}

/// Submit an application.
#[instrument(skip(state, session, form))]
pub async fn apply(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<JobId>,
    Form(form): Form<ApplicationForm>,
) -> Result<Redirect> {
    let back = Redirect::to(&format!("/career/{}", urlencoding::encode(id.as_str())));

    if let Some(problem) = form.problem() {
        set_flash(&session, Flash::error(problem)).await;
        return Ok(back);
    }

    let job = find_job(&state, &id).await?;
    let application = JobApplication {
        job_id: &job.id,
        name: form.name.trim(),
        email: form.email.trim(),
        phone: form.phone.trim(),
        message: form.message.trim(),
    };

    let flash = match state.api().apply_for_job(&application).await {
        Ok(_) => {
            tracing::info!(job_id = %job.id, "Job application submitted");
            Flash::success("career.applicationSent")
        }
        Err(e) => {
            tracing::warn!(error = %e, "Job application failed");
            Flash::error(e.user_message("career.errors.submitFailed").to_string())
        }
    };
    set_flash(&session, flash).await;
    Ok(back)
}

/// Create the career routes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{id}", get(show))
        .route("/{id}/apply", post(apply))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn job(id: &str, title: &str, location: &str, job_type: &str) -> Job {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "title": title,
            "location": location,
            "jobType": job_type,
            "description": format!("{title} wanted")
        }))
        .unwrap()
    }

    fn jobs() -> Vec<Job> {
        vec![
            job("j1", "Senior Barber", "Vilnius", "full-time"),
            job("j2", "Junior Barber", "Kaunas", "part-time"),
            job("j3", "Receptionist", "Vilnius", "contract"),
        ]
    }

    #[test]
    fn test_filter_by_text_location_and_type() {
        let query = CareerQuery {
            q: "barber".to_string(),
            ..CareerQuery::default()
        };
        assert_eq!(filter_jobs(jobs(), &query).len(), 2);

        let query = CareerQuery {
            location: "Vilnius".to_string(),
            job_type: "contract".to_string(),
            ..CareerQuery::default()
        };
        let found = filter_jobs(jobs(), &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Receptionist");

        assert_eq!(filter_jobs(jobs(), &CareerQuery::default()).len(), 3);
    }

    #[test]
    fn test_locations_are_distinct() {
        assert_eq!(locations(&jobs()), vec!["Kaunas", "Vilnius"]);
    }

    #[test]
    fn test_application_form_problems() {
        let form = ApplicationForm {
            name: "Jonas".to_string(),
            email: "jonas@example.lt".to_string(),
            phone: "+370 600 00000".to_string(),
            message: String::new(),
        };
        assert_eq!(form.problem(), None);

        let bad = ApplicationForm {
            email: "nope".to_string(),
            ..form
        };
        assert_eq!(bad.problem(), Some("career.errors.invalidEmail"));
    }
}
