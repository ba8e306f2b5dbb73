/// Calculation Routes
///
/// Per-user CRUD over stored calculations. Every handler runs behind the
/// JWT middleware, so claims are always present and results are scoped to
/// the authenticated user.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::auth::Claims;
use crate::calculation::{evaluate, Operation};
use crate::error::{AppError, CalculationError, DatabaseError, ErrorContext, ValidationError};
use crate::models::Calculation;
use crate::repository::CalculationRepository;

/// Calculation creation request
#[derive(Deserialize)]
pub struct CreateCalculationRequest {
    #[serde(rename = "type")]
    pub operation: String,
    pub inputs: Vec<f64>,
}

/// Calculation update request. Omitted fields keep their stored value.
#[derive(Deserialize)]
pub struct UpdateCalculationRequest {
    #[serde(rename = "type")]
    pub operation: Option<String>,
    pub inputs: Option<Vec<f64>>,
}

/// Calculation representation returned to clients. The result is always
/// recomputed from the stored operation and inputs.
#[derive(Serialize)]
pub struct CalculationResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub operation: String,
    pub inputs: Vec<f64>,
    pub result: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl CalculationResponse {
    fn from_calculation(calculation: &Calculation) -> Result<Self, AppError> {
        let result = calculation.result().map_err(AppError::Calculation)?;
        Ok(Self {
            id: calculation.id.to_string(),
            operation: calculation.operation.as_str().to_string(),
            inputs: calculation.inputs.clone(),
            result,
            created_at: calculation.created_at.to_rfc3339(),
            updated_at: calculation.updated_at.to_rfc3339(),
        })
    }
}

/// Map evaluation failures caused by the request payload shape to 422 and
/// arithmetic failures to 400.
fn payload_error(e: CalculationError) -> AppError {
    if e.is_structural() {
        AppError::Unprocessable(e.to_string())
    } else {
        AppError::Calculation(e)
    }
}

fn parse_calculation_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| {
        AppError::Validation(ValidationError::InvalidFormat(
            "calculation id must be a valid UUID".to_string(),
        ))
    })
}

/// POST /calculations
///
/// Create and persist a calculation for the authenticated user.
///
/// # Errors
/// - 400: Arithmetic error (division by zero, non-finite result)
/// - 422: Unknown operation or wrong input arity
pub async fn create_calculation(
    form: web::Json<CreateCalculationRequest>,
    claims: web::ReqData<Claims>,
    calculations: web::Data<dyn CalculationRepository>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("calculation_create");
    let user_id = claims.user_id()?;

    let operation = Operation::from_str(&form.operation).map_err(payload_error)?;
    // Validate up front so nothing unevaluable is ever stored.
    evaluate(operation, &form.inputs).map_err(payload_error)?;

    let calculation = Calculation::new(user_id, operation, form.inputs.clone());
    calculations.insert(&calculation).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        calculation_id = %calculation.id,
        operation = %calculation.operation,
        "Calculation created"
    );

    Ok(HttpResponse::Created().json(CalculationResponse::from_calculation(&calculation)?))
}

/// GET /calculations
///
/// List the authenticated user's calculations, newest first.
pub async fn list_calculations(
    claims: web::ReqData<Claims>,
    calculations: web::Data<dyn CalculationRepository>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    let stored = calculations.list_for_user(user_id).await?;
    let response: Vec<CalculationResponse> = stored
        .iter()
        .map(CalculationResponse::from_calculation)
        .collect::<Result<_, _>>()?;

    Ok(HttpResponse::Ok().json(response))
}

/// GET /calculations/{id}
///
/// Fetch one calculation. Other users' calculations are indistinguishable
/// from missing ones.
///
/// # Errors
/// - 400: Malformed id
/// - 404: Not found, or owned by a different user
pub async fn get_calculation(
    path: web::Path<String>,
    claims: web::ReqData<Claims>,
    calculations: web::Data<dyn CalculationRepository>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;
    let calculation_id = parse_calculation_id(&path)?;

    let calculation = calculations
        .find(calculation_id, user_id)
        .await?
        .ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound("Calculation not found".to_string()))
        })?;

    Ok(HttpResponse::Ok().json(CalculationResponse::from_calculation(&calculation)?))
}

/// PUT /calculations/{id}
///
/// Update the operation and/or inputs of a calculation; the result is
/// recomputed from the merged state.
///
/// # Errors
/// - 400: Malformed id, or the merged state fails to evaluate
/// - 404: Not found, or owned by a different user
/// - 422: New inputs make the payload structurally invalid
pub async fn update_calculation(
    path: web::Path<String>,
    form: web::Json<UpdateCalculationRequest>,
    claims: web::ReqData<Claims>,
    calculations: web::Data<dyn CalculationRepository>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("calculation_update");
    let user_id = claims.user_id()?;
    let calculation_id = parse_calculation_id(&path)?;

    let mut calculation = calculations
        .find(calculation_id, user_id)
        .await?
        .ok_or_else(|| {
            AppError::Database(DatabaseError::NotFound("Calculation not found".to_string()))
        })?;

    if let Some(operation) = &form.operation {
        calculation.operation = Operation::from_str(operation).map_err(payload_error)?;
    }
    let inputs_changed = form.inputs.is_some();
    if let Some(inputs) = &form.inputs {
        calculation.inputs = inputs.clone();
    }

    // A structural failure is only the client's payload's fault when the
    // inputs came from this request; a stale arity against a new operation
    // alone reads as a plain bad request.
    evaluate(calculation.operation, &calculation.inputs).map_err(|e| {
        if inputs_changed {
            payload_error(e)
        } else {
            AppError::Calculation(e)
        }
    })?;

    calculation.updated_at = Utc::now();
    calculations.update(&calculation).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        calculation_id = %calculation.id,
        "Calculation updated"
    );

    Ok(HttpResponse::Ok().json(CalculationResponse::from_calculation(&calculation)?))
}

/// DELETE /calculations/{id}
///
/// # Errors
/// - 400: Malformed id
/// - 404: Not found, or owned by a different user
pub async fn delete_calculation(
    path: web::Path<String>,
    claims: web::ReqData<Claims>,
    calculations: web::Data<dyn CalculationRepository>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("calculation_delete");
    let user_id = claims.user_id()?;
    let calculation_id = parse_calculation_id(&path)?;

    let deleted = calculations.delete(calculation_id, user_id).await?;
    if !deleted {
        return Err(AppError::Database(DatabaseError::NotFound(
            "Calculation not found".to_string(),
        )));
    }

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        calculation_id = %calculation_id,
        "Calculation deleted"
    );

    Ok(HttpResponse::NoContent().finish())
}
