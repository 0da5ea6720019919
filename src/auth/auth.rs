use crate::error::ApiError;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

/// Authenticated identity, inserted into request extensions by the auth
/// middleware and pulled out here by handlers.
#[derive(Clone)]
pub struct AuthUser {
    pub account_id: u64,
    pub username: String,

    /// `None` when the token carries a role name the enum does not know; the
    /// policy turns that into a `forbidden-role` denial instead of this layer
    /// rejecting the request outright.
    pub role: Option<Role>,
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ApiError::unauthorized("not authenticated")),
        )
    }
}
