use super::handler::{self, LogoutQuery, UserQuery};
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.login_handler.clone()))
        .and_then(handler::login);

    let session = warp::get()
        .and(warp::path("session"))
        .and(warp::path::end())
        .and(warp::query::<UserQuery>())
        .and(with(server.sessions.clone()))
        .and_then(handler::get_session);

    let refresh_token = warp::post()
        .and(warp::path("refresh_token"))
        .and(warp::path::end())
        .and(warp::query::<UserQuery>())
        .and(with(server.token_refresher.clone()))
        .and_then(handler::refresh_token);

    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(warp::query::<LogoutQuery>())
        .and(with(server.login_handler.clone()))
        .and_then(handler::logout);

    login.or(session).or(refresh_token).or(logout)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}
