use super::*;
use crate::config::OllamaConfig;

fn test_config() -> Config {
    Config {
        ollama: OllamaConfig {
            protocol: "http".to_string(),
            host: "test-host".to_string(),
            port: 1234,
            chat_model: "test-chat".to_string(),
            embedding_model: "test-embed".to_string(),
            batch_size: 8,
        },
        ..Config::default()
    }
}

#[test]
fn client_configuration() {
    let client = OllamaClient::new(&test_config()).expect("Failed to create client");

    assert_eq!(client.chat_model, "test-chat");
    assert_eq!(client.embedding_model, "test-embed");
    assert_eq!(client.batch_size, 8);
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(1234));
    assert_eq!(client.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
}

#[test]
fn client_builder_methods() {
    let client = OllamaClient::new(&test_config())
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60))
        .with_retry_attempts(5);

    assert_eq!(client.retry_attempts, 5);
}

#[test]
fn embed_batch_with_no_texts_is_empty() {
    let client = OllamaClient::new(&test_config()).expect("Failed to create client");

    let embeddings = client.embed_batch(&[]).expect("empty batch should succeed");
    assert!(embeddings.is_empty());
}

#[test]
fn request_payloads_serialize_to_ollama_wire_format() {
    let embed = EmbedRequest {
        model: "test-embed".to_string(),
        prompt: "hello".to_string(),
    };
    let json = serde_json::to_value(&embed).expect("should serialize");
    assert_eq!(json["model"], "test-embed");
    assert_eq!(json["prompt"], "hello");

    let batch = BatchEmbedRequest {
        model: "test-embed".to_string(),
        inputs: vec!["a".to_string(), "b".to_string()],
    };
    let json = serde_json::to_value(&batch).expect("should serialize");
    assert_eq!(json["input"][1], "b");

    let generate = GenerateRequest {
        model: "test-chat".to_string(),
        prompt: "Question: hi".to_string(),
        stream: false,
    };
    let json = serde_json::to_value(&generate).expect("should serialize");
    assert_eq!(json["stream"], false);
}
