use rocket::serde::Serialize;
use rocket::serde::json::Json;
use rocket::{Request, catch};

/// Catcher body matching the shape emitted by `AppError`. Guard rejections
/// reach the client through these catchers, not through the responder, so
/// the two have to agree.
#[derive(Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub msg: String,
}

impl ErrorBody {
    fn fail(msg: impl Into<String>) -> Self {
        Self {
            status: "fail",
            msg: msg.into(),
        }
    }
}

#[catch(400)]
pub fn bad_request(_: &Request) -> Json<ErrorBody> {
    Json(ErrorBody::fail("Bad request"))
}

#[catch(401)]
pub fn unauthorized(_: &Request) -> Json<ErrorBody> {
    Json(ErrorBody::fail("Authentication Failed!"))
}

#[catch(403)]
pub fn forbidden(_: &Request) -> Json<ErrorBody> {
    Json(ErrorBody::fail("Unauthorized to access this route"))
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<ErrorBody> {
    Json(ErrorBody::fail("Not found"))
}

#[catch(422)]
pub fn unprocessable(_: &Request) -> Json<ErrorBody> {
    Json(ErrorBody::fail("Bad request"))
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<ErrorBody> {
    Json(ErrorBody::fail("Something went wrong, please try again later"))
}

pub fn catchers() -> Vec<rocket::Catcher> {
    rocket::catchers![bad_request, unauthorized, forbidden, not_found, unprocessable, internal_error]
}
