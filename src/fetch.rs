use thiserror::Error;

pub const MAX_SCRIPT_BYTES: usize = 512 * 1024;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FetchState {
    Idle,
    Loading,
    Loaded(String),
    Failed(String),
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch {filename} (HTTP {status})")]
    Status { filename: String, status: u16 },
    #[error("Failed to fetch {filename}: {message}")]
    Network { filename: String, message: String },
    #[error("Failed to read {filename}: {message}")]
    Body { filename: String, message: String },
    #[error("{filename} is too large to display")]
    TooLarge { filename: String },
    #[error("Invalid script location for {filename}")]
    InvalidUrl { filename: String },
}

impl FetchError {
    pub fn class(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Network { .. } => "network",
            Self::Body { .. } => "body",
            Self::TooLarge { .. } => "too_large",
            Self::InvalidUrl { .. } => "invalid_url",
        }
    }
}

pub fn script_url(base_path: &str, filename: &str) -> String {
    let base = base_path.trim_end_matches('/');
    let name = filename.trim_start_matches('/');
    format!("{base}/{name}")
}

fn ensure_success(filename: &str, status: u16) -> Result<(), FetchError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(FetchError::Status {
            filename: filename.to_string(),
            status,
        })
    }
}

#[cfg(target_arch = "wasm32")]
pub async fn fetch_script(url: &str, filename: &str) -> Result<String, FetchError> {
    use gloo_net::http::Request;

    let response = Request::get(url)
        .send()
        .await
        .map_err(|error| FetchError::Network {
            filename: filename.to_string(),
            message: error.to_string(),
        })?;
    ensure_success(filename, response.status())?;

    let text = response.text().await.map_err(|error| FetchError::Body {
        filename: filename.to_string(),
        message: error.to_string(),
    })?;

    if text.len() > MAX_SCRIPT_BYTES {
        return Err(FetchError::TooLarge {
            filename: filename.to_string(),
        });
    }

    Ok(text)
}

/// Native counterpart used against the asset server. `url` must be absolute.
#[cfg(not(target_arch = "wasm32"))]
pub async fn fetch_script(url: &str, filename: &str) -> Result<String, FetchError> {
    let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl {
        filename: filename.to_string(),
    })?;

    let response = reqwest::get(parsed)
        .await
        .map_err(|error| FetchError::Network {
            filename: filename.to_string(),
            message: error.to_string(),
        })?;
    ensure_success(filename, response.status().as_u16())?;

    read_limited_body(response, filename).await
}

#[cfg(not(target_arch = "wasm32"))]
async fn read_limited_body(response: reqwest::Response, filename: &str) -> Result<String, FetchError> {
    use futures_util::StreamExt;

    if response
        .content_length()
        .is_some_and(|length| length > MAX_SCRIPT_BYTES as u64)
    {
        return Err(FetchError::TooLarge {
            filename: filename.to_string(),
        });
    }

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|error| FetchError::Body {
            filename: filename.to_string(),
            message: error.to_string(),
        })?;

        if body.len() + chunk.len() > MAX_SCRIPT_BYTES {
            return Err(FetchError::TooLarge {
                filename: filename.to_string(),
            });
        }
        body.extend_from_slice(&chunk);
    }

    String::from_utf8(body).map_err(|_| FetchError::Body {
        filename: filename.to_string(),
        message: "response is not valid UTF-8".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_url_joins_with_a_single_slash() {
        assert_eq!(script_url("/code/ElementsGame", "TriggerCast.lua"), "/code/ElementsGame/TriggerCast.lua");
        assert_eq!(script_url("/code/ElementsGame/", "/TriggerCast.lua"), "/code/ElementsGame/TriggerCast.lua");
    }

    #[test]
    fn not_found_is_a_status_error_naming_the_file() {
        let error = ensure_success("a.lua", 404).expect_err("404 must fail");

        assert_eq!(error.class(), "status");
        assert!(error.to_string().contains("a.lua"));
        assert!(error.to_string().contains("404"));
    }

    #[test]
    fn any_2xx_is_success() {
        assert!(ensure_success("a.lua", 200).is_ok());
        assert!(ensure_success("a.lua", 204).is_ok());
        assert!(ensure_success("a.lua", 304).is_err());
    }

    #[test]
    fn every_error_message_mentions_the_filename() {
        let errors = [
            FetchError::Network { filename: "b.lua".into(), message: "offline".into() },
            FetchError::Body { filename: "b.lua".into(), message: "truncated".into() },
            FetchError::TooLarge { filename: "b.lua".into() },
            FetchError::InvalidUrl { filename: "b.lua".into() },
        ];

        for error in errors {
            assert!(error.to_string().contains("b.lua"), "{error}");
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn relative_url_is_rejected_natively() {
        let error = fetch_script("/code/a.lua", "a.lua").await.expect_err("relative URL");
        assert_eq!(error, FetchError::InvalidUrl { filename: "a.lua".into() });
    }
}
