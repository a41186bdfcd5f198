//! 本地上传文件回放模块

mod handler;

#[cfg(test)]
mod tests;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/uploads/{filename}", get(handler::serve))
}
