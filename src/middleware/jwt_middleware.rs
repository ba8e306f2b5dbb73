/// JWT Authentication Middleware
///
/// Runs the full token verifier (signature, expiry, type, revocation) on
/// the Authorization header and injects the decoded claims into request
/// extensions for route handlers.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::{verify_token, RevocationList, TokenType};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// JWT middleware for protecting routes.
///
/// Only ACCESS tokens are accepted; refresh tokens presented here fail the
/// type check.
pub struct JwtMiddleware {
    jwt_config: JwtSettings,
    revocations: RevocationList,
}

impl JwtMiddleware {
    pub fn new(jwt_config: JwtSettings, revocations: RevocationList) -> Self {
        Self {
            jwt_config,
            revocations,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            jwt_config: self.jwt_config.clone(),
            revocations: self.revocations.clone(),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    jwt_config: JwtSettings,
    revocations: RevocationList,
}

/// Extract the bearer token from an Authorization header value.
pub fn bearer_token(header: Option<&str>) -> Option<String> {
    header.and_then(|h| h.strip_prefix("Bearer ")).and_then(|t| {
        let t = t.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = bearer_token(
            req.headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok()),
        );

        let jwt_config = self.jwt_config.clone();
        let revocations = self.revocations.clone();
        let service = self.service.clone();

        Box::pin(async move {
            let token = match token {
                Some(token) => token,
                None => {
                    tracing::warn!("Missing or invalid Authorization header");
                    return Err(AppError::Auth(AuthError::MissingToken).into());
                }
            };

            match verify_token(&token, TokenType::Access, &jwt_config, &revocations).await {
                Ok(claims) => {
                    tracing::debug!(user_id = %claims.sub, "JWT validated successfully");
                    req.extensions_mut().insert(claims);
                    service.call(req).await
                }
                Err(e) => Err(e.into()),
            }
        })
    }
}
