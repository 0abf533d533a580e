//! Video references: codes and watch/embed URLs

use url::Url;

use crate::error::VideoError;

fn is_video_code(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Extract the video code from a bare code or a watch/embed URL.
///
/// Accepted forms: `CODE`, `.../watch?v=CODE` (the `v` parameter may appear
/// anywhere in the query), `.../v/CODE`, `.../embed/CODE` and
/// `youtu.be/CODE`. URLs without a scheme are read as `http`.
pub fn extract_video_code(input: &str) -> Result<String, VideoError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(VideoError::Empty);
    }
    if is_video_code(input) {
        return Ok(input.to_string());
    }

    let url = Url::parse(input)
        .or_else(|_| Url::parse(&format!("http://{}", input)))
        .map_err(|_| VideoError::UnrecognizedUrl(input.to_string()))?;
    let unrecognized = || VideoError::UnrecognizedUrl(input.to_string());

    let path = url.path();
    let code = if url.host_str().is_some_and(|host| host.ends_with("youtu.be")) {
        path.trim_start_matches('/').split('/').next().map(str::to_string)
    } else if path == "/watch" {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
    } else if let Some(rest) = path.strip_prefix("/v/").or_else(|| path.strip_prefix("/embed/")) {
        rest.split('/').next().map(str::to_string)
    } else {
        None
    };

    code.filter(|code| is_video_code(code)).ok_or_else(unrecognized)
}
