use dealserver::llm::{LLMProvider, OpenAIClient};

#[tokio::test]
async fn generate_extracts_message_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"choices":[{"message":{"role":"assistant","content":"  Acme is a strategic fit for the industrial unit.  "}}]}"#,
        )
        .create_async()
        .await;

    let client = OpenAIClient::new(
        "test-key".to_string(),
        Some(server.url()),
        "gpt-4o".to_string(),
    );
    let out = client
        .generate("summarize this deal", 200)
        .await
        .expect("generation should succeed");

    assert_eq!(out, "Acme is a strategic fit for the industrial unit.");
    mock.assert_async().await;
}

#[tokio::test]
async fn generate_maps_http_errors() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let client = OpenAIClient::new(
        "test-key".to_string(),
        Some(server.url()),
        "gpt-4o".to_string(),
    );

    assert!(client.generate("summarize this deal", 200).await.is_err());
}

#[tokio::test]
async fn generate_rejects_empty_content() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":""}}]}"#)
        .create_async()
        .await;

    let client = OpenAIClient::new(
        "test-key".to_string(),
        Some(server.url()),
        "gpt-4o".to_string(),
    );

    assert!(client.generate("summarize this deal", 200).await.is_err());
}
