use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, ResponseError,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::{
    database::SheetStore, models::AuthenticatedUser, services::auth_service, utils::error::AppError,
};

/// The `Authorization` header carries the user's email, optionally prefixed
/// with `Bearer `.
fn token_from_header(value: &str) -> Option<String> {
    let value = value.trim();
    let token = match (value.get(..6), value.get(6..)) {
        (Some(scheme), Some(rest))
            if scheme.eq_ignore_ascii_case("bearer")
                && (rest.is_empty() || rest.starts_with(char::is_whitespace)) =>
        {
            rest.trim()
        }
        _ => value,
    };
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            match resolve_user(&req).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(e) => {
                    log::warn!("🔒 Rejected {} {}: {}", req.method(), req.path(), e);
                    let response = e.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

async fn resolve_user(req: &ServiceRequest) -> Result<AuthenticatedUser, AppError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(token_from_header)
        .ok_or_else(|| {
            AppError::Unauthorized("Authentication token is missing or invalid".to_string())
        })?;

    let store = req
        .app_data::<web::Data<SheetStore>>()
        .cloned()
        .ok_or_else(|| AppError::Storage("Sheet store is not configured".to_string()))?;

    auth_service::authenticate(&store, &token).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_header() {
        assert_eq!(token_from_header("a@b.com").as_deref(), Some("a@b.com"));
        assert_eq!(token_from_header("Bearer a@b.com").as_deref(), Some("a@b.com"));
        assert_eq!(token_from_header("   "), None);
        assert_eq!(token_from_header("Bearer "), None);
        assert_eq!(token_from_header("Bearer"), None);
        assert_eq!(token_from_header("bearer  a@b.com ").as_deref(), Some("a@b.com"));
        assert_eq!(token_from_header("bearerman@b.com").as_deref(), Some("bearerman@b.com"));
    }
}
