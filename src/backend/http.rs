use super::types::{
    ButtonLogRequest, ButtonLogResponse, FileNameResponse, ProgressResponse, SwitchResponse,
    TraceEnvelope,
};
use super::{Backend, Endpoint};
use crate::config::AppConfig;
use crate::trace::Trace;
use crate::{Result, ToneCanvasError};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Field name and file name the backend expects for uploads
const UPLOAD_FIELD: &str = "audio";
const UPLOAD_FILE_NAME: &str = "recording.wav";
const UPLOAD_MIME: &str = "audio/wav";

/// Merge the static header set with per-call overrides
///
/// Names are compared case-insensitively and stored lower-case; an override
/// replaces a static header of the same name.
pub fn merge_headers(
    base: &BTreeMap<String, String>,
    extra: &[(&str, &str)],
) -> BTreeMap<String, String> {
    let mut merged: BTreeMap<String, String> = base
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
        .collect();
    for (k, v) in extra {
        merged.insert(k.to_ascii_lowercase(), (*v).to_string());
    }
    merged
}

/// `reqwest`-backed client for the Tone Canvas backend
pub struct HttpBackend {
    client: Client,
    base_url: String,
    headers: BTreeMap<String, String>,
}

impl HttpBackend {
    pub fn new(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ToneCanvasError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        info!("Backend client for {}", config.base_url());

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            headers: config.headers.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    fn header_map(&self, extra: &[(&str, &str)]) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        for (name, value) in merge_headers(&self.headers, extra) {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ToneCanvasError::ConfigError(format!("Bad header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(&value)
                .map_err(|e| ToneCanvasError::ConfigError(format!("Bad header value for {:?}: {}", name, e)))?;
            map.insert(name, value);
        }
        Ok(map)
    }

    fn get(&self, endpoint: Endpoint) -> Result<Response> {
        let request = self.client.get(self.url(endpoint)).headers(self.header_map(&[])?);
        self.send(endpoint, request)
    }

    fn post_json<T: serde::Serialize + ?Sized>(&self, endpoint: Endpoint, body: &T) -> Result<Response> {
        let headers = self.header_map(&[("Content-Type", "application/json")])?;
        let request = self.client.post(self.url(endpoint)).headers(headers).json(body);
        self.send(endpoint, request)
    }

    fn send(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<Response> {
        debug!("Backend request {}", endpoint);
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ToneCanvasError::HttpStatus {
                endpoint: endpoint.path().to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl Backend for HttpBackend {
    fn fetch_wav(&self) -> Result<Vec<u8>> {
        let bytes = self.get(Endpoint::GetWavFile)?.bytes()?;
        debug!("Fetched {} bytes of audio", bytes.len());
        Ok(bytes.to_vec())
    }

    fn file_name(&self) -> Result<String> {
        let body: FileNameResponse = self.get(Endpoint::GetFileName)?.json()?;
        Ok(body.file_name)
    }

    fn progress(&self) -> Result<ProgressResponse> {
        Ok(self.get(Endpoint::GetProgress)?.json()?)
    }

    fn log_button(&self, button_name: &str) -> Result<String> {
        let body = ButtonLogRequest {
            button_name: button_name.to_string(),
        };
        let reply: ButtonLogResponse = self.post_json(Endpoint::SendButtonLog, &body)?.json()?;
        Ok(reply.message)
    }

    fn switch_wav(&self) -> Result<u32> {
        let request = self
            .client
            .post(self.url(Endpoint::SwitchWavFile))
            .headers(self.header_map(&[])?);
        let reply: SwitchResponse = self.send(Endpoint::SwitchWavFile, request)?.json()?;
        Ok(reply.current_index)
    }

    fn upload_audio(&self, wav: Vec<u8>) -> Result<serde_json::Value> {
        let part = Part::bytes(wav)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(UPLOAD_MIME)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        // multipart sets its own boundary content type
        let mut headers = self.header_map(&[])?;
        headers.remove(CONTENT_TYPE);

        let request = self
            .client
            .post(self.url(Endpoint::UploadAudio))
            .headers(headers)
            .multipart(form);
        Ok(self.send(Endpoint::UploadAudio, request)?.json()?)
    }

    fn send_trace(&self, trace: &Trace) -> Result<()> {
        self.post_json(Endpoint::SendTrace, &TraceEnvelope { trace })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::PointerSample;
    use chrono::Utc;
    use crossbeam_channel::{bounded, Receiver};
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::time::Duration;

    /// Request as seen by the stub server; the head is lower-cased
    struct Captured {
        head: String,
        body: Vec<u8>,
    }

    impl Captured {
        fn request_line(&self) -> &str {
            self.head.lines().next().unwrap_or_default()
        }

        fn body_text(&self) -> String {
            String::from_utf8_lossy(&self.body).into_owned()
        }
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    fn read_request(stream: &mut TcpStream) -> Captured {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let head_end = loop {
            if let Some(pos) = find(&buf, b"\r\n\r\n") {
                break pos + 4;
            }
            let n = stream.read(&mut chunk).unwrap();
            assert!(n > 0, "connection closed before request head");
            buf.extend_from_slice(&chunk[..n]);
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).to_ascii_lowercase();
        let mut body = buf[head_end..].to_vec();

        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok());

        let complete = |body: &[u8]| match content_length {
            Some(len) => body.len() >= len,
            None if head.contains("transfer-encoding: chunked") => body.ends_with(b"0\r\n\r\n"),
            None => true,
        };
        while !complete(&body) {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }

        Captured { head, body }
    }

    /// Answer one request with `status` and a JSON `body`
    fn serve_once(status: u16, body: &'static str) -> (String, Receiver<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = bounded(1);

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            let _ = tx.send(request);
        });

        (format!("http://{}", addr), rx)
    }

    fn backend_for(url: &str) -> HttpBackend {
        let config = AppConfig::default()
            .with_backend_url(url)
            .with_header("X-Session", "abc123");
        HttpBackend::new(&config).unwrap()
    }

    fn captured(rx: &Receiver<Captured>) -> Captured {
        rx.recv_timeout(Duration::from_secs(5)).expect("request reached the stub")
    }

    #[test]
    fn test_override_wins_case_insensitively() {
        let mut base = BTreeMap::new();
        base.insert("Content-Type".to_string(), "text/plain".to_string());
        base.insert("X-Session".to_string(), "abc".to_string());

        let merged = merge_headers(&base, &[("content-type", "application/json")]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged["content-type"], "application/json");
        assert_eq!(merged["x-session"], "abc");
    }

    #[test]
    fn test_urls_join_without_double_slash() {
        let config = AppConfig::default().with_backend_url("http://localhost:9000/");
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:9000");
        assert_eq!(
            backend.url(Endpoint::SendTrace),
            "http://localhost:9000/api/send-trace"
        );
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let config = AppConfig::default().with_header("bad header", "x");
        let backend = HttpBackend::new(&config).unwrap();
        assert!(matches!(
            backend.header_map(&[]),
            Err(ToneCanvasError::ConfigError(_))
        ));
    }

    #[test]
    fn test_unreachable_backend_is_network_error() {
        // Port 9 (discard) on localhost is closed on test machines
        let config = AppConfig::default().with_backend_url("http://127.0.0.1:9");
        let backend = HttpBackend::new(&config).unwrap();
        let err = backend.file_name().unwrap_err();
        assert!(matches!(err, ToneCanvasError::NetworkError(_)), "got {:?}", err);
    }

    #[test]
    fn test_get_sends_static_headers() {
        let (url, rx) = serve_once(200, r#"{"fileName":"item_4.wav"}"#);
        let backend = backend_for(&url);

        assert_eq!(backend.file_name().unwrap(), "item_4.wav");

        let request = captured(&rx);
        assert!(request.request_line().starts_with("get /api/get-file-name "));
        assert!(request.head.contains("x-session: abc123"));
    }

    #[test]
    fn test_progress_reads_snake_case_fields() {
        let (url, _rx) = serve_once(200, r#"{"current_index":2,"total_files":7}"#);
        let progress = backend_for(&url).progress().unwrap();
        assert_eq!(progress.current_index, 2);
        assert_eq!(progress.total_files, 7);
    }

    #[test]
    fn test_non_success_status_is_http_status_error() {
        let (url, _rx) = serve_once(503, r#"{"error":"busy"}"#);
        let err = backend_for(&url).switch_wav().unwrap_err();
        match err {
            ToneCanvasError::HttpStatus { endpoint, status } => {
                assert_eq!(endpoint, "/api/switch-wav-file");
                assert_eq!(status, 503);
            }
            other => panic!("expected HttpStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        let (url, _rx) = serve_once(200, "{ not json");
        let err = backend_for(&url).progress().unwrap_err();
        assert!(matches!(err, ToneCanvasError::DecodeError(_)), "got {:?}", err);
    }

    #[test]
    fn test_button_log_posts_json_body() {
        let (url, rx) = serve_once(200, r#"{"message":"logged"}"#);
        let reply = backend_for(&url).log_button("Play").unwrap();
        assert_eq!(reply, "logged");

        let request = captured(&rx);
        assert!(request.request_line().starts_with("post /api/send-button-log "));
        assert!(request.head.contains("content-type: application/json"));
        assert!(request.head.contains("x-session: abc123"));
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body, serde_json::json!({ "button_name": "Play" }));
    }

    #[test]
    fn test_switch_posts_and_reads_index() {
        let (url, rx) = serve_once(200, r#"{"currentIndex":5}"#);
        assert_eq!(backend_for(&url).switch_wav().unwrap(), 5);
        assert!(captured(&rx)
            .request_line()
            .starts_with("post /api/switch-wav-file "));
    }

    #[test]
    fn test_upload_sends_multipart_audio_field() {
        let (url, rx) = serve_once(200, r#"{"message":"stored"}"#);
        let wav = b"RIFF....WAVEfmt ".to_vec();
        let reply = backend_for(&url).upload_audio(wav).unwrap();
        assert_eq!(reply["message"], "stored");

        let request = captured(&rx);
        assert!(request.request_line().starts_with("post /api/upload-audio "));
        assert!(request.head.contains("content-type: multipart/form-data; boundary="));
        assert!(request.head.contains("x-session: abc123"));

        let body = request.body_text();
        assert!(body.contains(r#"name="audio""#));
        assert!(body.contains(r#"filename="recording.wav""#));
        assert!(body.contains("Content-Type: audio/wav"));
        assert!(body.contains("RIFF....WAVEfmt "));
    }

    #[test]
    fn test_send_trace_wraps_trace() {
        let (url, rx) = serve_once(200, "{}");
        let now = Utc::now();
        let trace = Trace {
            trace_start: now,
            trace_body: vec![PointerSample {
                x: 10.0,
                y: 50.0,
                pitch: 550.0,
                timestamp: now,
            }],
            trace_end: now,
        };
        backend_for(&url).send_trace(&trace).unwrap();

        let request = captured(&rx);
        assert!(request.request_line().starts_with("post /api/send-trace "));
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        let sent = &body["trace"];
        assert!(sent["trace_start"].is_string());
        assert!(sent["trace_end"].is_string());
        assert_eq!(sent["trace_body"][0]["pitch"], 550.0);
        assert_eq!(sent["trace_body"][0]["y"], 50.0);
    }

    #[test]
    fn test_fetch_wav_returns_raw_bytes() {
        let (url, rx) = serve_once(200, "RIFFDATA");
        assert_eq!(backend_for(&url).fetch_wav().unwrap(), b"RIFFDATA".to_vec());
        assert!(captured(&rx)
            .request_line()
            .starts_with("get /api/get-wav-file "));
    }
}
