//! Mock backend tests for token injection and the renew-and-replay protocol.
//!
//! These tests use wiremock to stand in for the REST API. Requests carrying
//! the stale token and the renewed token are told apart by their
//! `Authorization` header.

mod common;

use std::sync::Arc;

use futures_util::future::join_all;
use newmusic_client::{ApiRequest, ClientConfig, ClientFactory, LOGIN_ENTRY_PATH};
use newmusic_core::{AccessToken, ApiUrl, Error, RefreshToken, TokenSnapshot};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{RecordingHolder, factory_for, factory_with_fatal_log};

async fn mount_stale_token_rejection(server: &MockServer, route: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "mensagem": "Token expirado"
        })))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_refresh_success(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "old-refresh" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "new-access",
            "refreshToken": "new-refresh",
            "id": 1,
            "email": "secretaria@newmusic.com.br",
            "nome": "Secretaria",
            "perfil": "FUNCIONARIO"
        })))
        .expect(expected)
        .mount(server)
        .await;
}

// ============================================================================
// Token Injection
// ============================================================================

#[tokio::test]
async fn test_anonymous_request_has_no_authorization_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/instrumentos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let factory = factory_for(&server);

    // No accessor installed at all.
    let _: Value = factory.client().unwrap().get_json("instrumentos").await.unwrap();

    // Accessor installed, but signed out.
    factory.configure_auth_accessor(Arc::new(TokenSnapshot::anonymous()));
    let _: Value = factory.client().unwrap().get_json("instrumentos").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(
        requests
            .iter()
            .all(|r| !r.headers.contains_key("authorization"))
    );
}

#[tokio::test]
async fn test_bearer_token_injected_on_every_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/turmas"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 4 }])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/turmas"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_json(json!({ "nome": "Violão iniciante" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 5 })))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory_for(&server);
    factory.configure_auth_accessor(Arc::new(TokenSnapshot::new(
        Some(AccessToken::new("tok-1")),
        None,
    )));
    let client = factory.client().unwrap();

    let turmas: Value = client.get_json("turmas").await.unwrap();
    assert_eq!(turmas[0]["id"], 4);

    let created: Value = client
        .post_json("turmas", &json!({ "nome": "Violão iniciante" }))
        .await
        .unwrap();
    assert_eq!(created["id"], 5);
}

#[tokio::test]
async fn test_reconfigured_accessor_takes_effect() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/professores"))
        .and(header("authorization", "Bearer second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory_for(&server);
    factory.configure_auth_accessor(Arc::new(TokenSnapshot::new(
        Some(AccessToken::new("first")),
        None,
    )));
    let before = factory.client().unwrap();

    factory.configure_auth_accessor(Arc::new(TokenSnapshot::new(
        Some(AccessToken::new("second")),
        None,
    )));
    let after = factory.client().unwrap();

    assert!(!newmusic_client::ApiClient::ptr_eq(&before, &after));
    let _: Value = after.get_json("professores").await.unwrap();
}

// ============================================================================
// Renew and Replay
// ============================================================================

#[tokio::test]
async fn test_single_retry_after_successful_refresh() {
    let server = MockServer::start().await;

    mount_stale_token_rejection(&server, "/api/alunos", 1).await;
    mount_refresh_success(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/alunos"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "nome": "Clara" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (factory, fatal) = factory_with_fatal_log(&server);
    let holder = RecordingHolder::new(Some("old-access"), Some("old-refresh"));
    factory.configure_auth_accessor(holder.clone());

    let alunos: Value = factory.client().unwrap().get_json("alunos").await.unwrap();

    assert_eq!(alunos[0]["nome"], "Clara");
    assert_eq!(
        *holder.updates.lock().unwrap(),
        vec![("new-access".to_string(), "new-refresh".to_string())]
    );
    assert_eq!(holder.current_access().as_deref(), Some("new-access"));
    assert_eq!(holder.logout_count(), 0);
    assert!(fatal.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_replayed_request_keeps_method_query_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/mensalidades/9"))
        .and(header("authorization", "Bearer old-access"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    mount_refresh_success(&server, 1).await;

    Mock::given(method("PUT"))
        .and(path("/api/mensalidades/9"))
        .and(header("authorization", "Bearer new-access"))
        .and(wiremock::matchers::query_param("baixa", "true"))
        .and(body_json(json!({ "valorPago": 180.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "PAGO" })))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory_for(&server);
    factory.configure_auth_accessor(RecordingHolder::new(Some("old-access"), Some("old-refresh")));

    let request = ApiRequest::put("mensalidades/9")
        .query("baixa", "true")
        .json(&json!({ "valorPago": 180.0 }))
        .unwrap();
    let response = factory.client().unwrap().send(request).await.unwrap();

    let body: Value = response.json().unwrap();
    assert_eq!(body["status"], "PAGO");
}

#[tokio::test]
async fn test_second_unauthorized_is_returned_without_another_refresh() {
    let server = MockServer::start().await;

    mount_stale_token_rejection(&server, "/api/usuarios", 1).await;
    mount_refresh_success(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/usuarios"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "mensagem": "Acesso negado"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (factory, fatal) = factory_with_fatal_log(&server);
    factory.configure_auth_accessor(RecordingHolder::new(Some("old-access"), Some("old-refresh")));

    let err = factory
        .client()
        .unwrap()
        .get_json::<Value>("usuarios")
        .await
        .unwrap_err();

    let api = err.as_api().expect("expected an API error");
    assert_eq!(api.status, 401);
    assert_eq!(api.message(), "Acesso negado");
    assert!(fatal.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_refresh_logs_out_and_returns_original_error() {
    let server = MockServer::start().await;

    mount_stale_token_rejection(&server, "/api/relatorios/inadimplencia", 1).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "mensagem": "Refresh token inválido"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (factory, fatal) = factory_with_fatal_log(&server);
    let holder = RecordingHolder::new(Some("old-access"), Some("old-refresh"));
    factory.configure_auth_accessor(holder.clone());

    let err = factory
        .client()
        .unwrap()
        .get_json::<Value>("relatorios/inadimplencia")
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.as_api().unwrap().message(), "Token expirado");
    assert_eq!(holder.logout_count(), 1);
    assert_eq!(holder.current_access(), None);
    assert_eq!(*fatal.lock().unwrap(), vec![LOGIN_ENTRY_PATH.to_string()]);
    assert_eq!(LOGIN_ENTRY_PATH, "/login");
}

#[tokio::test]
async fn test_unauthorized_without_refresh_token_is_not_renewed() {
    let server = MockServer::start().await;

    mount_stale_token_rejection(&server, "/api/matriculas", 1).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (factory, fatal) = factory_with_fatal_log(&server);
    let holder = RecordingHolder::new(Some("old-access"), None);
    factory.configure_auth_accessor(holder.clone());

    let err = factory
        .client()
        .unwrap()
        .get_json::<Value>("matriculas")
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(holder.logout_count(), 0);
    assert!(fatal.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_other_errors_pass_through_without_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/presencas"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "mensagem": "Sem permissão"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/alunos"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "mensagem": "Erro de validação",
            "erros": { "cpf": "CPF inválido" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let factory = factory_for(&server);
    factory.configure_auth_accessor(RecordingHolder::new(Some("old-access"), Some("old-refresh")));
    let client = factory.client().unwrap();

    let err = client.get_json::<Value>("presencas").await.unwrap_err();
    assert_eq!(err.status(), Some(403));

    let err = client
        .post_json::<_, Value>("alunos", &json!({ "cpf": "123" }))
        .await
        .unwrap_err();
    assert_eq!(err.as_api().unwrap().field_error("cpf"), Some("CPF inválido"));
}

#[tokio::test]
async fn test_renewal_without_token_updater_still_replays() {
    let server = MockServer::start().await;

    mount_stale_token_rejection(&server, "/api/grupos", 1).await;
    mount_refresh_success(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/grupos"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory_for(&server);
    factory.configure_auth_accessor(Arc::new(TokenSnapshot::new(
        Some(AccessToken::new("old-access")),
        Some(RefreshToken::new("old-refresh")),
    )));

    let grupos: Value = factory.client().unwrap().get_json("grupos").await.unwrap();
    assert_eq!(grupos, json!([]));
}

#[tokio::test]
async fn test_concurrent_unauthorized_requests_refresh_independently() {
    let server = MockServer::start().await;

    mount_stale_token_rejection(&server, "/api/alunos", 3).await;
    mount_refresh_success(&server, 3).await;

    Mock::given(method("GET"))
        .and(path("/api/alunos"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(3)
        .mount(&server)
        .await;

    let factory = factory_for(&server);
    factory.configure_auth_accessor(Arc::new(TokenSnapshot::new(
        Some(AccessToken::new("old-access")),
        Some(RefreshToken::new("old-refresh")),
    )));
    let client = factory.client().unwrap();

    let results = join_all((0..3).map(|_| client.get_json::<Value>("alunos"))).await;
    assert!(results.iter().all(|r| r.is_ok()));
}

#[tokio::test]
async fn test_logout_failure_propagates_to_caller() {
    let server = MockServer::start().await;

    mount_stale_token_rejection(&server, "/api/alunos", 1).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let (factory, fatal) = factory_with_fatal_log(&server);
    let holder = RecordingHolder::failing_logout("old-access", "old-refresh");
    factory.configure_auth_accessor(holder.clone());

    let err = factory
        .client()
        .unwrap()
        .get_json::<Value>("alunos")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(holder.logout_count(), 1);
    assert!(fatal.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_token_update_failure_counts_as_failed_renewal() {
    let server = MockServer::start().await;

    mount_stale_token_rejection(&server, "/api/alunos", 1).await;
    mount_refresh_success(&server, 1).await;

    Mock::given(method("GET"))
        .and(path("/api/alunos"))
        .and(header("authorization", "Bearer new-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (factory, fatal) = factory_with_fatal_log(&server);
    let holder = RecordingHolder::failing_update("old-access", "old-refresh");
    factory.configure_auth_accessor(holder.clone());

    let err = factory
        .client()
        .unwrap()
        .get_json::<Value>("alunos")
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.as_api().unwrap().message(), "Token expirado");
    assert_eq!(holder.logout_count(), 1);
    assert_eq!(holder.current_access(), None);
    assert_eq!(*fatal.lock().unwrap(), vec![LOGIN_ENTRY_PATH.to_string()]);
}

#[tokio::test]
async fn test_null_field_message_keeps_backend_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/professores"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "mensagem": "Erro de validação",
            "erros": { "nome": null, "email": "E-mail inválido" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let factory = factory_for(&server);
    let err = factory
        .client()
        .unwrap()
        .post_json::<_, Value>("professores", &json!({ "nome": "" }))
        .await
        .unwrap_err();

    let api = err.as_api().unwrap();
    assert_eq!(api.message(), "Erro de validação");
    assert_eq!(api.field_error("email"), Some("E-mail inválido"));
    assert_eq!(api.field_error("nome"), None);
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    // Nothing listens on port 1.
    let base = ApiUrl::new("http://127.0.0.1:1/api").unwrap();
    let factory = ClientFactory::new(ClientConfig::new(base)).unwrap();

    factory.configure_auth_accessor(RecordingHolder::new(Some("old-access"), Some("old-refresh")));
    let err = factory
        .client()
        .unwrap()
        .delete("alunos/1")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}
