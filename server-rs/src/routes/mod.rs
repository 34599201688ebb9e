use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

pub mod health;
pub mod members;
pub mod teams;

// Extractor wrappers whose rejections come back as `AppError::BadRequest`,
// so every failure carries the usual `{"error": ...}` body.

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
