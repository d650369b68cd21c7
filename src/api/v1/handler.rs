use super::error::*;
use crate::application_impl::SessionCache;
use crate::application_port::*;
use crate::domain_model::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

pub async fn get_session(
    query: UserQuery,
    sessions: Arc<SessionCache>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let record = sessions
        .get(&UserId(query.user_id))
        .await
        .ok_or_else(|| reject::custom(ApiErrorCode::SessionNotFound))?;

    Ok(warp::reply::json(&ApiResponse::ok(record)))
}

pub async fn refresh_token(
    query: UserQuery,
    token_refresher: Arc<dyn TokenRefresher>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let record = token_refresher
        .refresh(&UserId(query.user_id))
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(record)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user_id: UserId,
}

pub async fn login(
    event: LoginEvent,
    login_handler: Arc<dyn LoginHandler>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let user_id = login_handler
        .on_login_success(event)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(LoginResponse { user_id })))
}

#[derive(Debug, Deserialize)]
pub struct LogoutQuery {
    pub user_id: String,
    pub return_to: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub redirect: String,
}

pub async fn logout(
    query: LogoutQuery,
    login_handler: Arc<dyn LoginHandler>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let redirect = login_handler
        .logout(&UserId(query.user_id), &query.return_to)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(LogoutResponse { redirect })))
}
