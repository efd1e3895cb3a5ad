use thiserror::Error;
use tracing::debug;
use ureq::Agent;

/// Erreur de transport (connexion, TLS, timeout, lecture du corps).
///
/// Distincte d'une erreur de parsing et d'un refus de transaction : l'appelant
/// doit pouvoir les différencier.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error when sending request to {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: ureq::Error,
    },
    #[error("Failed to read response body: {0}")]
    Body(#[source] ureq::Error),
}

/// Collaborateur de transport : POST d'un corps XML, réponse XML brute.
pub trait XmlTransport: Send + Sync {
    fn post_xml(&self, url: &str, body: &str) -> Result<String, TransportError>;
}

/// Transport HTTPS basé sur ureq.
pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    pub fn new() -> Self {
        // Ne pas traiter les 4xx/5xx comme des erreurs : un SOAP Fault arrive
        // avec un statut HTTP 500 et son corps doit rester lisible.
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .build();

        Self {
            agent: config.into(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlTransport for HttpTransport {
    fn post_xml(&self, url: &str, body: &str) -> Result<String, TransportError> {
        let mut response = self
            .agent
            .post(url)
            .header("Content-Type", r#"text/xml; charset="utf-8""#)
            .send(body)
            .map_err(|source| TransportError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(%status, url, "SOAP reply received");

        // Lire le corps quel que soit le statut HTTP
        response
            .body_mut()
            .read_to_string()
            .map_err(TransportError::Body)
    }
}
