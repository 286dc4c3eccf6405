use axum::body::to_bytes;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;

use crate::shared::format::format_number;

/// Потоковые ответы (SSE) нельзя читать целиком: поток не завершается
fn is_streaming(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("text/event-stream"))
        .unwrap_or(false)
}

fn print_line(status: StatusCode, size: &str, method: &axum::http::Method, path: &str, ms: u128) {
    let timestamp = Utc::now() + chrono::Duration::hours(3);
    // Голубой для 200, коричневый для остальных
    let color_code = if status == StatusCode::OK { "36" } else { "33" };
    println!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
        color_code,
        timestamp.format("%H:%M:%S"),
        ms,
        size,
        status.as_u16(),
        method,
        path
    );
}

/// Middleware для логирования HTTP запросов
///
/// Выводит в консоль:
/// - Timestamp (MSK, UTC+3)
/// - Длительность (ms)
/// - Размер ответа (форматированный)
/// - Статус код
/// - Метод и путь
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    if is_streaming(response.headers()) {
        print_line(response.status(), "stream", &method, uri.path(), start.elapsed().as_millis());
        return response;
    }

    let (parts, body) = response.into_parts();

    // Читаем тело ответа, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(_) => {
            print_line(parts.status, "error", &method, uri.path(), start.elapsed().as_millis());
            return Response::from_parts(parts, Body::default());
        }
    };

    print_line(
        parts.status,
        &format_number(bytes.len()),
        &method,
        uri.path(),
        start.elapsed().as_millis(),
    );

    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_event_stream_is_not_buffered() {
        let mut headers = HeaderMap::new();
        assert!(!is_streaming(&headers));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert!(!is_streaming(&headers));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
        assert!(is_streaming(&headers));
    }
}
