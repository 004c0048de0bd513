//! HTTP upload surface for review stations
//!
//! `premaster serve --port 3001` → accepts raw audio uploads, returns
//! screening verdicts and rendered WAVs
//!
//! Every audio endpoint takes the upload as the raw request body; options
//! ride in the query string. Rendering and screening are CPU-bound, so a
//! small pool of worker threads shares the listener and each request is
//! handled start to finish on one worker.

use std::io::Read;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};

use crate::analyzer::Analyzer;
use crate::audio::{self, EncodedAudio};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }
}

impl ApiResponse<()> {
    fn failure(message: String) -> Self {
        Self { ok: false, data: None, error: Some(message) }
    }
}

#[derive(Deserialize, Debug)]
struct NormalizeParams {
    #[serde(default = "default_title")]
    title: String,
}

#[derive(Deserialize, Debug)]
struct ClipParams {
    #[serde(default = "default_title")]
    title: String,
    start: f64,
    #[serde(default = "default_clip_duration")]
    duration: f64,
}

fn default_title() -> String {
    "track".to_string()
}

fn default_clip_duration() -> f64 {
    audio::CLIP_SECONDS
}

#[derive(Serialize)]
struct ServiceDescriptor {
    name: &'static str,
    version: &'static str,
    endpoints: &'static [&'static str],
}

const ENDPOINTS: &[&str] = &[
    "POST /api/analyze",
    "POST /api/normalize?title=",
    "POST /api/clip?title=&start=&duration=",
    "POST /api/inspect",
];

/// Start the server and block, handling uploads until killed
pub fn start(port: u16, analyzer: Analyzer) -> std::io::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let server = Arc::new(server);
    let analyzer = Arc::new(analyzer);

    eprintln!("\n\x1b[1;32m🎚 Premaster\x1b[0m");
    eprintln!("   http://localhost:{}", port);
    eprintln!(
        "   Catalog: {} reference track(s)\n",
        analyzer.catalog().len()
    );

    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);

    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let server = Arc::clone(&server);
        let analyzer = Arc::clone(&analyzer);
        handles.push(std::thread::spawn(move || {
            for request in server.incoming_requests() {
                if let Err(e) = handle_request(request, &analyzer) {
                    log::error!("request failed: {}", e);
                }
            }
        }));
    }

    for handle in handles {
        let _ = handle.join();
    }

    Ok(())
}

fn handle_request(mut request: Request, analyzer: &Analyzer) -> std::io::Result<()> {
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or("/").to_string();
    let query = url.split('?').nth(1).unwrap_or("").to_string();
    let method = request.method().clone();

    match (&method, path.as_str()) {
        // Service descriptor, handy for health checks
        (&Method::Get, "/") => {
            let descriptor = ServiceDescriptor {
                name: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
                endpoints: ENDPOINTS,
            };
            respond_json(request, 200, &ApiResponse::success(descriptor))
        }

        // Screen an upload; never fails, undecodable input gets the
        // fallback verdict
        (&Method::Post, "/api/analyze") => {
            let body = read_body(&mut request)?;
            log::info!("→ analyze ({} bytes)", body.len());

            let result = analyzer.analyze(&body);
            respond_json(request, 200, &ApiResponse::success(result))
        }

        // Full-track canonical render
        (&Method::Post, "/api/normalize") => {
            let params: NormalizeParams = match serde_urlencoded::from_str(&query) {
                Ok(p) => p,
                Err(e) => return bad_params(request, e),
            };
            let body = read_body(&mut request)?;
            log::info!("→ normalize \"{}\" ({} bytes)", params.title, body.len());

            match audio::normalize_track(&body, &params.title) {
                Ok(encoded) => respond_wav(request, encoded),
                Err(e) => conversion_failed(request, e),
            }
        }

        // Preview clip render
        (&Method::Post, "/api/clip") => {
            let params: ClipParams = match serde_urlencoded::from_str(&query) {
                Ok(p) => p,
                Err(e) => return bad_params(request, e),
            };
            let body = read_body(&mut request)?;
            log::info!(
                "→ clip \"{}\" start={} duration={} ({} bytes)",
                params.title,
                params.start,
                params.duration,
                body.len()
            );

            match audio::extract_clip(&body, &params.title, params.start, params.duration) {
                Ok(encoded) => respond_wav(request, encoded),
                Err(e) => conversion_failed(request, e),
            }
        }

        // Source format facts without rendering
        (&Method::Post, "/api/inspect") => {
            let body = read_body(&mut request)?;
            log::info!("→ inspect ({} bytes)", body.len());

            match audio::inspect(&body) {
                Ok(info) => respond_json(request, 200, &ApiResponse::success(info)),
                Err(e) => conversion_failed(request, e),
            }
        }

        // 404
        _ => {
            let response = Response::from_string("Not found").with_status_code(404);
            request.respond(response)
        }
    }
}

fn read_body(request: &mut Request) -> std::io::Result<Vec<u8>> {
    let mut body = Vec::new();
    request.as_reader().read_to_end(&mut body)?;
    Ok(body)
}

fn json_header() -> Header {
    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap()
}

fn respond_json<T: Serialize>(
    request: Request,
    status: u16,
    payload: &ApiResponse<T>,
) -> std::io::Result<()> {
    let json = serde_json::to_string(payload)?;
    let response = Response::from_string(json)
        .with_status_code(status)
        .with_header(json_header());
    request.respond(response)
}

fn respond_wav(request: Request, encoded: EncodedAudio) -> std::io::Result<()> {
    let disposition = format!("attachment; filename=\"{}\"", encoded.file_name);
    let response = Response::from_data(encoded.data)
        .with_header(
            Header::from_bytes(&b"Content-Type"[..], encoded.content_type.as_bytes()).unwrap(),
        )
        .with_header(
            Header::from_bytes(&b"Content-Disposition"[..], disposition.as_bytes()).unwrap(),
        );
    request.respond(response)
}

fn bad_params(request: Request, err: serde_urlencoded::de::Error) -> std::io::Result<()> {
    respond_json(
        request,
        422,
        &ApiResponse::failure(format!("invalid query parameters: {}", err)),
    )
}

fn conversion_failed(request: Request, err: crate::error::Error) -> std::io::Result<()> {
    respond_json(
        request,
        422,
        &ApiResponse::failure(format!("failed to convert audio: {}", err)),
    )
}
