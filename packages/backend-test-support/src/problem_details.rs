//! Problem-details assertions for the stable error contract.
//!
//! Error responses are `application/problem+json` with a stable `code`
//! string and a `trace_id` that must match the `x-trace-id` response
//! header. The struct here deliberately mirrors the backend's wire
//! shape without depending on backend types, so a field rename that
//! would break real clients also breaks these tests.

use actix_web::http::StatusCode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ProblemDetailsLike {
    #[serde(rename = "type")]
    type_: String,
    title: String,
    status: u16,
    detail: String,
    code: String,
    trace_id: String,
}

/// Assert that raw response parts conform to the error contract:
/// expected status, expected `code`, trace id parity between header and
/// body, and (optionally) a substring of `detail`.
pub async fn assert_problem_details_from_parts(
    status: StatusCode,
    headers: &actix_web::http::header::HeaderMap,
    body_bytes: &[u8],
    expected_code: &str,
    expected_status: StatusCode,
    expected_detail_contains: Option<&str>,
) {
    assert_eq!(status, expected_status);

    let body_str =
        String::from_utf8(body_bytes.to_vec()).expect("Response body should be valid UTF-8");
    let problem: ProblemDetailsLike = serde_json::from_str(&body_str)
        .expect("Response body should be valid ProblemDetails JSON");

    let trace_id_header = headers
        .get("x-trace-id")
        .expect("x-trace-id header should be present")
        .to_str()
        .expect("x-trace-id header should be valid UTF-8");

    assert_eq!(
        problem.trace_id, trace_id_header,
        "trace_id in body should match x-trace-id header"
    );

    assert_eq!(problem.code, expected_code);
    assert_eq!(problem.status, expected_status.as_u16());
    assert!(
        problem.type_.ends_with(&problem.code),
        "type URI should end with the error code"
    );
    assert!(!problem.title.is_empty(), "title should be populated");

    if let Some(expected_detail) = expected_detail_contains {
        assert!(
            problem.detail.contains(expected_detail),
            "Expected detail to contain '{}', but got '{}'",
            expected_detail,
            problem.detail
        );
    }
}

/// Assert that a `ServiceResponse` (the `actix_web::test` call result)
/// conforms to the error contract.
pub async fn assert_problem_details_from_service_response(
    resp: actix_web::dev::ServiceResponse<actix_web::body::BoxBody>,
    expected_code: &str,
    expected_status: StatusCode,
    expected_detail_contains: Option<&str>,
) {
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = actix_web::test::read_body(resp).await;

    assert_problem_details_from_parts(
        status,
        &headers,
        &body,
        expected_code,
        expected_status,
        expected_detail_contains,
    )
    .await;
}
