//! Product-code shortening (§4.1): long UPC/ISBN tokens may be replaced by a short alphanumeric
//! code the document provides alongside them; otherwise pass through untouched.

use crate::pattern_cache::cached;

/// `long_token` is a 10-13 digit UPC/ISBN run found in the document text; `context` is the
/// surrounding text it was found in. If a short alphanumeric code (2-3 letters + digits, the
/// Creative-Coop/HarperCollins product-code shape) appears within the same context, that code
/// replaces the long token for display purposes. Otherwise the long token passes through.
pub fn shorten(long_token: &str, context: &str) -> String {
    let re = cached(r"^\d{10,13}$");
    if !re.is_match(long_token) {
        return long_token.to_string();
    }
    let code_re = cached(r"\b([A-Z]{2,3}\d{3,6}[A-Z]?)\b");
    if let Some(caps) = code_re.captures(context) {
        return caps[1].to_string();
    }
    long_token.to_string()
}
