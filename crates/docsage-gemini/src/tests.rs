//! Snapshot tests for the Gemini client

#[cfg(test)]
mod snapshot_tests {
    use crate::client::{Content, EmbedContentRequest, Part, build_generate_request};
    use crate::{GeminiConfig, GenerationConfig};
    use insta::{assert_json_snapshot, assert_yaml_snapshot};

    #[test]
    fn test_config_snapshot_hides_api_key() {
        let config = GeminiConfig::new("test_api_key");

        assert_yaml_snapshot!(config, @r###"
        model: gemini-2.0-flash
        embedding_model: text-embedding-004
        api_url: "https://generativelanguage.googleapis.com/v1beta"
        "###);
    }

    #[test]
    fn test_generate_request_body() {
        let config = GenerationConfig {
            temperature: None,
            top_p: None,
            stop_sequences: vec!["QUESTION:".to_string()],
            ..Default::default()
        };
        let body = build_generate_request("What is the mission?", &config);

        assert_json_snapshot!(body, @r###"
        {
          "contents": [
            {
              "role": "user",
              "parts": [
                {
                  "text": "What is the mission?"
                }
              ]
            }
          ],
          "generationConfig": {
            "maxOutputTokens": 1024,
            "topK": 40,
            "stopSequences": [
              "QUESTION:"
            ]
          }
        }
        "###);
    }

    #[test]
    fn test_embed_request_body() {
        let body = EmbedContentRequest {
            model: "models/text-embedding-004".to_string(),
            content: Content {
                role: None,
                parts: vec![Part {
                    text: "remote work".to_string(),
                }],
            },
        };

        assert_json_snapshot!(body, @r###"
        {
          "model": "models/text-embedding-004",
          "content": {
            "parts": [
              {
                "text": "remote work"
              }
            ]
          }
        }
        "###);
    }
}
