use futures::future::LocalBoxFuture;
use gloo_net::http::Request;
use scene::components::MeshGeometry;
use viewer::{GeometryLoader, LoadError, ProgressCallback, ProgressEvent};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

/// Upper bound on the buffer reserved up front from `Content-Length`.
const MAX_RESERVE_BYTES: usize = 64 * 1024 * 1024;

/// Fetches PLY assets over HTTP, reporting progress per body chunk.
#[derive(Debug, Default)]
pub struct FetchLoader;

impl GeometryLoader for FetchLoader {
    fn load(
        &self,
        path: &str,
        on_progress: ProgressCallback,
    ) -> LocalBoxFuture<'static, Result<MeshGeometry, LoadError>> {
        let path = path.to_string();
        Box::pin(async move {
            let bytes = fetch_bytes(&path, on_progress).await?;
            formats::decode_ply(&bytes).map_err(|e| LoadError::Decode {
                path: path.clone(),
                message: e.to_string(),
            })
        })
    }
}

/// Bytes to reserve for a body of `total` bytes. Larger bodies grow per chunk.
fn initial_capacity(total: Option<u64>) -> usize {
    total.map_or(0, |total| {
        usize::try_from(total).map_or(MAX_RESERVE_BYTES, |total| total.min(MAX_RESERVE_BYTES))
    })
}

fn network_error(path: &str, err: impl std::fmt::Debug) -> LoadError {
    LoadError::Network {
        path: path.to_string(),
        message: format!("{err:?}"),
    }
}

async fn fetch_bytes(path: &str, mut on_progress: ProgressCallback) -> Result<Vec<u8>, LoadError> {
    let resp = Request::get(path).send().await.map_err(|e| LoadError::Network {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    if !resp.ok() {
        return Err(LoadError::Http {
            path: path.to_string(),
            status: resp.status(),
        });
    }

    let total = resp
        .headers()
        .get("content-length")
        .and_then(|v| v.trim().parse::<u64>().ok());

    let Some(body) = resp.body() else {
        // No stream exposed: fall back to a single read.
        let bytes = resp.binary().await.map_err(|e| LoadError::Network {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        on_progress(ProgressEvent::new(bytes.len() as u64, total));
        return Ok(bytes);
    };

    let reader = body
        .get_reader()
        .dyn_into::<web_sys::ReadableStreamDefaultReader>()
        .map_err(|e| network_error(path, e))?;

    let mut bytes = Vec::with_capacity(initial_capacity(total));
    loop {
        let chunk = JsFuture::from(reader.read())
            .await
            .map_err(|e| network_error(path, e))?;
        let done = js_sys::Reflect::get(&chunk, &JsValue::from_str("done"))
            .map_err(|e| network_error(path, e))?
            .as_bool()
            .unwrap_or(true);
        if done {
            break;
        }
        let value = js_sys::Reflect::get(&chunk, &JsValue::from_str("value"))
            .map_err(|e| network_error(path, e))?;
        let value = js_sys::Uint8Array::new(&value);
        let start = bytes.len();
        bytes.resize(start + value.length() as usize, 0);
        value.copy_to(&mut bytes[start..]);
        on_progress(ProgressEvent::new(bytes.len() as u64, total));
    }

    log::debug!("fetched {path}: {} bytes", bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::{MAX_RESERVE_BYTES, initial_capacity};

    #[test]
    fn reservation_follows_small_content_length() {
        assert_eq!(initial_capacity(Some(4096)), 4096);
        assert_eq!(initial_capacity(None), 0);
    }

    #[test]
    fn reservation_is_capped_for_huge_content_length() {
        assert_eq!(initial_capacity(Some(5 << 30)), MAX_RESERVE_BYTES);
        assert_eq!(initial_capacity(Some(u64::MAX)), MAX_RESERVE_BYTES);
    }
}
