//! HTTP client for the ViaCEP postal code service
//!
//! `GET {base}/ws/{code}/json/` answers with the address fields, or with
//! `{"erro": true}` for a well-formed code that does not exist.

use super::PostalLookup;
use crate::state::forms::{AddressRecord, NormalizedPostalCode};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Default ViaCEP address
pub const DEFAULT_BASE_URL: &str = "https://viacep.com.br";

/// Why a lookup produced no address
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("postal lookup request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("postal lookup service answered with status {0}")]
    Status(u16),
    #[error("postal code {0} not found")]
    NotFound(String),
    #[error("postal lookup response is missing `{0}`")]
    Malformed(&'static str),
}

impl LookupError {
    /// Short message for the status bar
    pub fn user_message(&self) -> &'static str {
        match self {
            LookupError::NotFound(_) => "CEP não encontrado",
            _ => "Falha ao consultar CEP",
        }
    }
}

/// Response body of ViaCEP; every field is optional on the wire
#[derive(Debug, Deserialize)]
struct ViaCepBody {
    localidade: Option<String>,
    bairro: Option<String>,
    logradouro: Option<String>,
    uf: Option<String>,
    #[serde(default)]
    erro: Option<Value>,
}

impl ViaCepBody {
    fn into_address(self, code: &NormalizedPostalCode) -> Result<AddressRecord, LookupError> {
        // ViaCEP has sent both `true` and `"true"` here
        if !matches!(self.erro, None | Some(Value::Bool(false))) {
            return Err(LookupError::NotFound(code.to_string()));
        }
        Ok(AddressRecord {
            city: self.localidade.ok_or(LookupError::Malformed("localidade"))?,
            neighborhood: self.bairro.ok_or(LookupError::Malformed("bairro"))?,
            street: self.logradouro.ok_or(LookupError::Malformed("logradouro"))?,
            state_code: self.uf.ok_or(LookupError::Malformed("uf"))?,
        })
    }
}

/// Client for ViaCEP
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    http: reqwest::Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, code: &NormalizedPostalCode) -> String {
        format!("{}/ws/{}/json/", self.base_url, code)
    }
}

#[async_trait]
impl PostalLookup for ViaCepClient {
    async fn lookup(&self, code: &NormalizedPostalCode) -> Result<AddressRecord, LookupError> {
        let url = self.url_for(code);
        tracing::debug!(%url, "requesting address");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: ViaCepBody = response.json().await?;
        body.into_address(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn code(raw: &str) -> NormalizedPostalCode {
        NormalizedPostalCode::parse(raw).unwrap()
    }

    fn decode(json: &str) -> Result<AddressRecord, LookupError> {
        let body: ViaCepBody = serde_json::from_str(json).unwrap();
        body.into_address(&code("01001000"))
    }

    /// Serve a single canned HTTP response on a local port and return its base URL
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_decode_full_body() {
        let address = decode(
            r#"{"cep":"01001-000","logradouro":"Praça da Sé","complemento":"lado ímpar",
                "bairro":"Sé","localidade":"São Paulo","uf":"SP","ibge":"3550308"}"#,
        )
        .unwrap();
        assert_eq!(
            address,
            AddressRecord {
                city: "São Paulo".to_string(),
                neighborhood: "Sé".to_string(),
                street: "Praça da Sé".to_string(),
                state_code: "SP".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_accepts_empty_strings() {
        // Small towns have a single CEP with no street or neighborhood
        let address = decode(
            r#"{"logradouro":"","bairro":"","localidade":"Borá","uf":"SP"}"#,
        )
        .unwrap();
        assert_eq!(address.city, "Borá");
        assert_eq!(address.street, "");
    }

    #[test]
    fn test_decode_erro_flag_is_not_found() {
        assert!(matches!(decode(r#"{"erro": true}"#), Err(LookupError::NotFound(c)) if c == "01001000"));
        assert!(matches!(decode(r#"{"erro": "true"}"#), Err(LookupError::NotFound(_))));
    }

    #[test]
    fn test_decode_missing_field_is_malformed() {
        let result = decode(r#"{"logradouro":"Rua X","bairro":"Centro","uf":"RJ"}"#);
        assert!(matches!(result, Err(LookupError::Malformed("localidade"))));
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let client = ViaCepClient::new("https://viacep.com.br/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.url_for(&code("01001-000")),
            "https://viacep.com.br/ws/01001000/json/"
        );
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            LookupError::NotFound("x".to_string()).user_message(),
            "CEP não encontrado"
        );
        assert_eq!(LookupError::Status(500).user_message(), "Falha ao consultar CEP");
    }

    #[tokio::test]
    async fn test_lookup_against_local_server() {
        let base = serve_once(
            "200 OK",
            r#"{"logradouro":"Rua X","bairro":"Centro","localidade":"Rio de Janeiro","uf":"RJ"}"#,
        )
        .await;
        let client = ViaCepClient::new(&base, Duration::from_secs(5)).unwrap();
        let address = client.lookup(&code("12345678")).await.unwrap();
        assert_eq!(address.city, "Rio de Janeiro");
        assert_eq!(address.state_code, "RJ");
    }

    #[tokio::test]
    async fn test_lookup_bad_status() {
        let base = serve_once("400 Bad Request", "{}").await;
        let client = ViaCepClient::new(&base, Duration::from_secs(5)).unwrap();
        let result = client.lookup(&code("12345678")).await;
        assert!(matches!(result, Err(LookupError::Status(400))));
    }

    #[tokio::test]
    async fn test_lookup_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ViaCepClient::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        let result = client.lookup(&code("12345678")).await;
        assert!(matches!(result, Err(LookupError::Http(_))));
    }
}
