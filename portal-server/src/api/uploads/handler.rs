//! 上传文件回放 Handler

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};

use crate::api::{AppError, AppResult};
use crate::core::ServerState;

/// GET /uploads/{filename} - 回放本地保存的上传文件
///
/// 文件名只接受单段路径，含分隔符或 ".." 一律 404 (不泄露存在性)。
pub async fn serve(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !is_safe_filename(&filename) {
        return Err(AppError::not_found("File"));
    }

    let path = state.store.uploads_dir().join(&filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::not_found("File"))?;

    let mime = mime_guess::from_path(&filename).first_or_octet_stream();

    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_DISPOSITION, "inline".to_string()),
        ],
        bytes,
    ))
}

/// 拒绝路径遍历: 空名、分隔符、".." 都不合法
pub(super) fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains('/')
        && !filename.contains('\\')
        && filename != "."
        && !filename.contains("..")
}
