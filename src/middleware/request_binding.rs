use actix_web::{dev::ServiceRequest, HttpRequest};
use log::{debug, warn};

use crate::middleware::rejection::AuthRejection;
use crate::models::token_claims::Claims;

/// Header carrying the caller's device identifier.
pub const DEVICE_ID_HEADER: &str = "X-Device-ID";

/// Soft device binding: a mismatch when the token carries a device id AND the
/// caller presents one is a validation failure; absence of either side is not
/// an error.
pub fn validate_device_binding(req: &ServiceRequest, claims: &Claims) -> Result<(), AuthRejection> {
    let presented = req
        .headers()
        .get(DEVICE_ID_HEADER)
        .and_then(|h| h.to_str().ok());

    match (&claims.device_id, presented) {
        (Some(bound), Some(presented)) if bound != presented => {
            warn!("Device ID mismatch for subject {}", claims.sub);
            Err(AuthRejection::DeviceMismatch)
        }
        (Some(_), None) => {
            debug!("Device-bound token presented without {} header", DEVICE_ID_HEADER);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Extracts the client IP, preferring forwarding headers over the peer
/// address. Used to stamp the `ipAddress` claim at issuance time.
pub fn extract_client_ip(req: &HttpRequest) -> String {
    if let Some(forwarded_for) = req.headers().get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded_for.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                return first_ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = req.headers().get("x-real-ip") {
        if let Ok(real_ip_str) = real_ip.to_str() {
            return real_ip_str.to_string();
        }
    }

    if let Some(peer_addr) = req.peer_addr() {
        peer_addr.ip().to_string()
    } else {
        "unknown".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn claims_with_device(device_id: Option<&str>) -> Claims {
        Claims {
            sub: "2348012345678".to_string(),
            exp: 4_102_444_800,
            iat: 1_700_000_000,
            device_id: device_id.map(|s| s.to_string()),
            ip_address: None,
            wallet_number: None,
            bank_code: None,
            client_code: None,
        }
    }

    #[test]
    fn test_device_binding_mismatch_rejected() {
        let req = TestRequest::default()
            .insert_header((DEVICE_ID_HEADER, "device-b"))
            .to_srv_request();
        let result = validate_device_binding(&req, &claims_with_device(Some("device-a")));
        assert_eq!(result, Err(AuthRejection::DeviceMismatch));
    }

    #[test]
    fn test_device_binding_match_passes() {
        let req = TestRequest::default()
            .insert_header((DEVICE_ID_HEADER, "device-a"))
            .to_srv_request();
        assert!(validate_device_binding(&req, &claims_with_device(Some("device-a"))).is_ok());
    }

    #[test]
    fn test_device_binding_is_soft_on_absence() {
        // Token bound, header absent
        let req = TestRequest::default().to_srv_request();
        assert!(validate_device_binding(&req, &claims_with_device(Some("device-a"))).is_ok());

        // Header present, token unbound
        let req = TestRequest::default()
            .insert_header((DEVICE_ID_HEADER, "device-a"))
            .to_srv_request();
        assert!(validate_device_binding(&req, &claims_with_device(None)).is_ok());
    }

    #[test]
    fn test_extract_client_ip_prefers_forwarded_for() {
        let req = TestRequest::default()
            .insert_header(("x-forwarded-for", "203.0.113.9, 10.0.0.2"))
            .insert_header(("x-real-ip", "10.0.0.3"))
            .to_http_request();
        assert_eq!(extract_client_ip(&req), "203.0.113.9");
    }

    #[test]
    fn test_extract_client_ip_falls_back_to_real_ip() {
        let req = TestRequest::default()
            .insert_header(("x-real-ip", "10.0.0.3"))
            .to_http_request();
        assert_eq!(extract_client_ip(&req), "10.0.0.3");
    }
}
