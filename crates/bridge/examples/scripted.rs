//! Drives the bridge with a scripted sequence of server events, standing in
//! for the event-driven server that would normally produce them.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Request, StatusCode, header};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use rack_bridge::connection::{ConnectionSink, RackBridge};
use rack_bridge::handler::make_handler;
use rack_bridge::protocol::{RackResponse, RequestMeta, ResponseBody, SendError};

struct StdoutSink;

impl ConnectionSink for StdoutSink {
    fn write_headers(&self, status: StatusCode, headers: &HeaderMap) -> Result<(), SendError> {
        println!("<- {status}");
        for (name, value) in headers {
            println!("<- {name}: {}", value.to_str().unwrap_or("<binary>"));
        }
        Ok(())
    }

    fn write_body_chunk(&self, chunk: &[u8]) -> Result<(), SendError> {
        println!("<- {}", String::from_utf8_lossy(chunk));
        Ok(())
    }

    fn mark_succeeded_early(&self) {
        println!("-- request marked succeeded");
    }

    fn terminate(&self, keep_alive: bool) {
        println!("-- terminated, keep_alive: {keep_alive}");
    }
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let bridge = RackBridge::builder()
        .rack_app(make_handler(|mut request| {
            let body = request.input().read(None)?.unwrap_or_default();
            info!(bytes = body.len(), "handler received the full request body");

            let mut headers = HeaderMap::new();
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
            Ok(RackResponse::new(StatusCode::OK, headers, ResponseBody::from(body)))
        }))
        .build()
        .expect("rack app is set");

    let meta: RequestMeta = Request::builder().method("POST").uri("/echo").body(()).unwrap().into();
    let mut driver = bridge.on_headers(meta, Arc::new(StdoutSink)).expect("input channel");

    for chunk in [&b"hello "[..], b"from ", b"the ", b"bridge"] {
        println!("-> {}", String::from_utf8_lossy(chunk));
        driver.on_body_chunk(Bytes::from_static(chunk));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    driver.on_body_complete();

    driver.wait().await;
}
