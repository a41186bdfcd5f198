//! Data-URL 解码
//!
//! 前端以 `data:<mime>;base64,<payload>` 形式提交文件内容。

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// 解码 data-URL 形式的 base64 负载
///
/// 缺逗号分隔符、空负载或非法 base64 都算本地验证失败，
/// 返回 Err(描述) 而不是 panic。
pub fn decode_data_url(file_data: &str) -> Result<Vec<u8>, String> {
    let Some((_, payload)) = file_data.split_once(',') else {
        return Err("Invalid file data format".to_string());
    };
    if payload.is_empty() {
        return Err("No base64 data found".to_string());
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("Invalid base64 payload: {}", e))?;
    if bytes.is_empty() {
        return Err("Decoded file is empty".to_string());
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_valid_data_url() {
        let data = format!("data:text/plain;base64,{}", STANDARD.encode(b"hello"));
        assert_eq!(decode_data_url(&data).unwrap(), b"hello");
    }

    #[test]
    fn rejects_missing_separator() {
        assert!(decode_data_url("SGVsbG8=").is_err());
    }

    #[test]
    fn rejects_empty_payload() {
        assert!(decode_data_url("data:text/plain;base64,").is_err());
    }

    #[test]
    fn rejects_garbage_base64() {
        assert!(decode_data_url("data:text/plain;base64,!!!not-base64!!!").is_err());
    }
}
