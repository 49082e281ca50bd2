use hyper::{
    header::{
        HeaderName, HeaderValue, CONTENT_SECURITY_POLICY, STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS,
        X_FRAME_OPTIONS, X_XSS_PROTECTION,
    },
    HeaderMap,
};

const POLICY: &str = "default-src 'self'; \
    style-src 'self' 'unsafe-inline' https://cdnjs.cloudflare.com; \
    font-src 'self' https://cdnjs.cloudflare.com; \
    img-src 'self' data:; \
    script-src 'self'";

const SECURITY_HEADERS: [(HeaderName, &str); 5] = [
    (X_CONTENT_TYPE_OPTIONS, "nosniff"),
    (X_FRAME_OPTIONS, "DENY"),
    (X_XSS_PROTECTION, "1; mode=block"),
    (STRICT_TRANSPORT_SECURITY, "max-age=31536000; includeSubDomains"),
    (CONTENT_SECURITY_POLICY, POLICY),
];

/// Applies the browser hardening headers sent with every response.
pub fn secure(headers: &mut HeaderMap) {
    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
}
