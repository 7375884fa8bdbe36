//! Browser `fetch()` adapter for the HTTP port.
//!
//! Buffered calls go through gloo-net. Streaming calls read the response
//! `ReadableStream` chunk by chunk so answer text can be shown as it arrives.

use async_trait::async_trait;
use futures::stream;
use gloo_net::http::{Request, RequestBuilder, Response};
use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::ReadableStreamDefaultReader;

use lanshan_core::ports::{ByteStream, HttpPort, HttpRequest, HttpResponse, StreamingResponse};
use lanshan_types::{ChatError, Result};

#[derive(Default)]
pub struct FetchHttp;

impl FetchHttp {
    pub fn new() -> Self {
        Self
    }

    async fn send(&self, req: HttpRequest) -> Result<Response> {
        let mut builder: RequestBuilder = Request::post(&req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }
        builder
            .json(&req.body)
            .map_err(|e| ChatError::network(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatError::network(e.to_string()))
    }
}

#[async_trait(?Send)]
impl HttpPort for FetchHttp {
    async fn post(&self, req: HttpRequest) -> Result<HttpResponse> {
        let response = self.send(req).await?;
        buffered(response).await
    }

    async fn post_streaming(&self, req: HttpRequest) -> Result<StreamingResponse> {
        let url = req.url.clone();
        let response = self.send(req).await?;
        log::debug!("{} answered {} {}", url, response.status(), response.status_text());

        let body: ByteStream = match response.body() {
            Some(readable) => {
                let reader = readable
                    .get_reader()
                    .unchecked_into::<ReadableStreamDefaultReader>();
                Box::pin(reader_stream(reader))
            }
            None => Box::pin(stream::empty()),
        };
        Ok(StreamingResponse {
            status: response.status(),
            status_text: response.status_text(),
            body,
        })
    }

    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = Request::get(url)
            .send()
            .await
            .map_err(|e| ChatError::network(e.to_string()))?;
        buffered(response).await
    }
}

async fn buffered(response: Response) -> Result<HttpResponse> {
    let status = response.status();
    let status_text = response.status_text();
    let body = response
        .text()
        .await
        .map_err(|e| ChatError::network(e.to_string()))?;
    Ok(HttpResponse { status, status_text, body })
}

/// Body chunks until the reader reports `done`. A read failure ends the
/// stream after yielding the error.
fn reader_stream(reader: ReadableStreamDefaultReader) -> impl futures::Stream<Item = Result<Vec<u8>>> {
    stream::unfold(Some(reader), |state| async move {
        let reader = state?;
        match read_chunk(&reader).await {
            Ok(Some(bytes)) => Some((Ok(bytes), Some(reader))),
            Ok(None) => None,
            Err(e) => Some((Err(e), None)),
        }
    })
}

async fn read_chunk(reader: &ReadableStreamDefaultReader) -> Result<Option<Vec<u8>>> {
    let result = JsFuture::from(reader.read())
        .await
        .map_err(|e| ChatError::network(js_error(&e)))?;

    let done = Reflect::get(&result, &JsValue::from_str("done"))
        .map_err(|e| ChatError::JsInterop(js_error(&e)))?
        .as_bool()
        .unwrap_or(true);
    if done {
        return Ok(None);
    }

    let value = Reflect::get(&result, &JsValue::from_str("value"))
        .map_err(|e| ChatError::JsInterop(js_error(&e)))?;
    Ok(Some(Uint8Array::new(&value).to_vec()))
}

fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
