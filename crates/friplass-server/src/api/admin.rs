//! Maintenance endpoints.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use friplass_core::Environment;
use friplass_store::{run_category_migration, MigrationReport};
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct MigrateQuery {
    #[serde(default)]
    pub secret: String,
}

/// Check the `secret` query parameter against the configured secret.
///
/// Without a configured secret the endpoint is closed in production and
/// open to any non-empty secret elsewhere.
fn authorize(
    req_id: &str,
    configured: Option<&str>,
    env: &Environment,
    given: &str,
) -> Result<(), ApiError> {
    match configured {
        Some(expected) => {
            if bool::from(given.as_bytes().ct_eq(expected.as_bytes())) {
                Ok(())
            } else {
                Err(ApiError::new(req_id, "unauthorized", "Unauthorized (bad secret)"))
            }
        }
        None if *env == Environment::Production => Err(ApiError::new(
            req_id,
            "forbidden",
            "Migration disabled in production without MIGRATE_SECRET. Set env MIGRATE_SECRET to enable.",
        )),
        None if given.is_empty() => Err(ApiError::new(
            req_id,
            "bad_request",
            "Missing secret. Outside production any secret works, e.g. ?secret=dev",
        )),
        None => Ok(()),
    }
}

/// `GET /admin/migrate-category?secret=...`
pub(super) async fn migrate_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<MigrateQuery>,
) -> Result<Json<MigrationReport>, ApiError> {
    authorize(
        &req_id.0,
        state.config.migrate_secret.as_deref(),
        &state.config.env,
        &query.secret,
    )?;

    let report = run_category_migration(state.repo.store().as_ref(), None, false)
        .await
        .map_err(|e| map_store_error(req_id.0, e))?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(result: Result<(), ApiError>) -> Option<String> {
        result.err().map(|e| e.error.code)
    }

    #[test]
    fn configured_secret_must_match() {
        let env = Environment::Development;
        assert_eq!(code(authorize("r", Some("s3cret"), &env, "s3cret")), None);
        assert_eq!(
            code(authorize("r", Some("s3cret"), &env, "wrong")).as_deref(),
            Some("unauthorized")
        );
        assert_eq!(
            code(authorize("r", Some("s3cret"), &env, "")).as_deref(),
            Some("unauthorized")
        );
    }

    #[test]
    fn unset_secret_is_closed_in_production() {
        assert_eq!(
            code(authorize("r", None, &Environment::Production, "anything")).as_deref(),
            Some("forbidden")
        );
    }

    #[test]
    fn unset_secret_needs_some_secret_elsewhere() {
        let env = Environment::Development;
        assert_eq!(code(authorize("r", None, &env, "")).as_deref(), Some("bad_request"));
        assert_eq!(code(authorize("r", None, &env, "dev")), None);
    }
}
