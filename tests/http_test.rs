mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode, header};
use common::{
    HANK, KUMAR, SARAH, StandardCards, body_bytes, body_json, principal, request, send, test_app,
};
use serde_json::json;

#[tokio::test]
async fn test_create_returns_location_of_new_card() -> Result<()> {
    let (app, _service, _temp) = test_app().await?;

    let response = send(
        &app,
        request(Method::POST, "/cashcards", Some(SARAH), Some(json!({"amount": 123.45}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response
        .headers()
        .get(header::LOCATION)
        .expect("Location header")
        .to_str()?
        .to_string();
    assert!(location.starts_with("/cashcards/"));
    assert!(body_bytes(response).await.is_empty());

    let response = send(&app, request(Method::GET, &location, Some(SARAH), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["amount"], json!(123.45));
    assert_eq!(body["owner"], json!("sarah1"));
    assert_eq!(
        format!("/cashcards/{}", body["id"]),
        location,
        "Location must point at the created id"
    );

    // Another user cannot see it
    let response = send(&app, request(Method::GET, &location, Some(KUMAR), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(response).await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_create_ignores_client_id_and_owner() -> Result<()> {
    let (app, service, _temp) = test_app().await?;

    let response = send(
        &app,
        request(
            Method::POST,
            "/cashcards",
            Some(SARAH),
            Some(json!({"id": 4242, "amount": 250.00, "owner": "kumar2"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_ne!(
        response.headers().get(header::LOCATION).unwrap(),
        "/cashcards/4242"
    );

    let sarah_cards = service
        .list_all_cash_cards("sarah1")
        .await?;
    assert_eq!(sarah_cards.len(), 1);
    assert_eq!(sarah_cards[0].amount, 25000);
    assert!(service.list_all_cash_cards("kumar2").await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_create_rejects_bad_payloads() -> Result<()> {
    let (app, service, _temp) = test_app().await?;

    for body in [
        json!({}),
        json!({"amount": -1.0}),
        json!({"amount": 1.001}),
        json!({"amount": 0.1 + 0.2}),
        json!({"amount": "ten"}),
    ] {
        let response = send(
            &app,
            request(Method::POST, "/cashcards", Some(SARAH), Some(body.clone())),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        assert!(body_json(response).await["error"].is_string());
    }

    assert!(service.list_all_cash_cards("sarah1").await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_requires_authentication() -> Result<()> {
    let (app, _service, _temp) = test_app().await?;

    let response = send(&app, request(Method::GET, "/cashcards", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Basic realm=\"cashcard\""
    );

    for user in [("BAD-USER", "abc123"), ("sarah1", "BAD-PASSWORD")] {
        let response = send(&app, request(Method::GET, "/cashcards/1", Some(user), None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    Ok(())
}

#[tokio::test]
async fn test_users_without_role_are_forbidden() -> Result<()> {
    let (app, service, _temp) = test_app().await?;
    let cards = StandardCards::create(&service).await?;
    let id = cards[0].id.unwrap();

    let response = send(
        &app,
        request(Method::GET, &format!("/cashcards/{id}"), Some(HANK), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        request(Method::POST, "/cashcards", Some(HANK), Some(json!({"amount": 1}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn test_list_is_owner_filtered_and_sorted_by_amount() -> Result<()> {
    let (app, service, _temp) = test_app().await?;
    StandardCards::create(&service).await?;

    let response = send(&app, request(Method::GET, "/cashcards", Some(SARAH), None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let cards = body.as_array().expect("array of cards");
    let amounts: Vec<_> = cards.iter().map(|c| c["amount"].clone()).collect();
    assert_eq!(amounts, vec![json!(1.0), json!(123.45), json!(150.0)]);
    assert!(cards.iter().all(|c| c["owner"] == "sarah1"));

    Ok(())
}

#[tokio::test]
async fn test_list_pagination_and_sort_parameters() -> Result<()> {
    let (app, service, _temp) = test_app().await?;
    StandardCards::create(&service).await?;

    let response = send(
        &app,
        request(
            Method::GET,
            "/cashcards?page=0&size=1&sort=amount,desc",
            Some(SARAH),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["amount"], json!(150.0));

    let response = send(
        &app,
        request(Method::GET, "/cashcards?page=1&size=2", Some(SARAH), None),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["amount"], json!(150.0));

    let response = send(
        &app,
        request(Method::GET, "/cashcards?sort=balance", Some(SARAH), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_list_clamps_out_of_range_paging() -> Result<()> {
    let (app, service, _temp) = test_app().await?;
    StandardCards::create(&service).await?;

    for uri in [
        "/cashcards?size=0",
        "/cashcards?size=101",
        "/cashcards?size=1000",
        "/cashcards?size=-5",
        "/cashcards?page=-1",
        "/cashcards?page=first",
    ] {
        let response = send(&app, request(Method::GET, uri, Some(SARAH), None)).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 3, "{uri}");
    }

    let response = send(
        &app,
        request(
            Method::GET,
            "/cashcards?page=4294967295&size=4294967295",
            Some(SARAH),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));

    Ok(())
}

#[tokio::test]
async fn test_non_numeric_id_is_a_json_bad_request() -> Result<()> {
    let (app, _service, _temp) = test_app().await?;

    for (method, body) in [
        (Method::GET, None),
        (Method::PUT, Some(json!({"amount": 1.0}))),
    ] {
        for uri in ["/cashcards/abc", "/cashcards/99999999999999999999"] {
            let response = send(&app, request(method.clone(), uri, Some(SARAH), body.clone())).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {uri}");
            assert!(body_json(response).await["error"].is_string(), "{method} {uri}");
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_large_amounts_keep_their_cents() -> Result<()> {
    let (app, _service, _temp) = test_app().await?;

    for amount in [1234567890.12, 166545974.14] {
        let response = send(
            &app,
            request(Method::POST, "/cashcards", Some(SARAH), Some(json!({"amount": amount}))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED, "{amount}");
        let location = response
            .headers()
            .get(header::LOCATION)
            .expect("Location header")
            .to_str()?
            .to_string();

        let response = send(&app, request(Method::GET, &location, Some(SARAH), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["amount"], json!(amount));
    }

    Ok(())
}

#[tokio::test]
async fn test_update_existing_card() -> Result<()> {
    let (app, service, _temp) = test_app().await?;
    let cards = StandardCards::create(&service).await?;
    let id = cards[0].id.unwrap();
    let uri = format!("/cashcards/{id}");

    let response = send(
        &app,
        request(Method::PUT, &uri, Some(SARAH), Some(json!({"amount": 19.99}))),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response).await.is_empty());

    let response = send(&app, request(Method::GET, &uri, Some(SARAH), None)).await;
    let body = body_json(response).await;
    assert_eq!(body, json!({"id": id, "amount": 19.99, "owner": "sarah1"}));

    Ok(())
}

#[tokio::test]
async fn test_update_of_foreign_or_missing_card_is_not_found() -> Result<()> {
    let (app, service, _temp) = test_app().await?;
    let cards = StandardCards::create(&service).await?;
    let kumar_id = cards[3].id.unwrap();

    let response = send(
        &app,
        request(
            Method::PUT,
            &format!("/cashcards/{kumar_id}"),
            Some(SARAH),
            Some(json!({"amount": 333.33})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let unchanged = service.get_cash_card(kumar_id, &principal(KUMAR)).await?;
    assert_eq!(unchanged.amount, 20000);

    let response = send(
        &app,
        request(
            Method::PUT,
            "/cashcards/99999",
            Some(SARAH),
            Some(json!({"amount": 333.33})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() -> Result<()> {
    let (app, _service, _temp) = test_app().await?;

    let mut req = request(Method::GET, "/cashcards", Some(SARAH), None);
    req.headers_mut()
        .insert("x-request-id", "trace-me-123".parse()?);
    let response = send(&app, req).await;
    assert_eq!(response.headers().get("x-request-id").unwrap(), "trace-me-123");

    let response = send(&app, request(Method::GET, "/cashcards", Some(SARAH), None)).await;
    let generated = response.headers().get("x-request-id").unwrap().to_str()?;
    assert_eq!(generated.len(), 36);

    Ok(())
}
