//! Configuration du client CyberSource
//!
//! La configuration est portée par l'instance de [`crate::Gateway`] pour toute
//! sa durée de vie. Un mode global test/production peut être forcé au niveau
//! du processus, comme pour le reste de la configuration applicative.

use crate::errors::GatewayError;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{fs, path::Path, sync::RwLock};

/// Mode global du processus, prioritaire sur le flag `test` du client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
    Live,
    Test,
}

static GATEWAY_MODE: Lazy<RwLock<GatewayMode>> = Lazy::new(|| RwLock::new(GatewayMode::Live));

/// Force le mode test/production pour tout le processus
pub fn set_gateway_mode(mode: GatewayMode) {
    if let Ok(mut current) = GATEWAY_MODE.write() {
        *current = mode;
    }
}

/// Mode courant du processus
pub fn gateway_mode() -> GatewayMode {
    GATEWAY_MODE
        .read()
        .map(|mode| *mode)
        .unwrap_or(GatewayMode::Live)
}

/// Identifiants et options du marchand
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Identifiant marchand (Business Center)
    pub login: String,

    /// Clé de transaction générée dans le Business Center
    pub password: String,

    /// Utiliser le serveur de test
    #[serde(default)]
    pub test: bool,

    /// Numéro d'immatriculation TVA pour le calcul de taxe à l'étranger
    #[serde(default)]
    pub vat_reg_number: Option<String>,

    /// Liste d'états/provinces avec présence physique, séparés par des
    /// espaces, transmise telle quelle (ex: "WI CA QC")
    #[serde(default)]
    pub nexus: Option<String>,

    /// Continuer le traitement même si l'AVS aurait échoué
    #[serde(default)]
    pub ignore_avs: bool,

    /// Continuer le traitement même si le CVV aurait échoué
    #[serde(default)]
    pub ignore_cvv: bool,
}

impl GatewayConfig {
    /// Crée une configuration minimale ; `login` et `password` sont requis
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Result<Self, GatewayError> {
        let login = login.into();
        let password = password.into();
        if login.is_empty() {
            return Err(GatewayError::MissingOption("login"));
        }
        if password.is_empty() {
            return Err(GatewayError::MissingOption("password"));
        }

        Ok(Self {
            login,
            password,
            test: false,
            vat_reg_number: None,
            nexus: None,
            ignore_avs: false,
            ignore_cvv: false,
        })
    }

    /// Charge la configuration depuis un fichier YAML
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Charge la configuration depuis une chaîne YAML
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).context("Failed to parse gateway configuration")?;
        if config.login.is_empty() {
            anyhow::bail!("Missing required option: login");
        }
        if config.password.is_empty() {
            anyhow::bail!("Missing required option: password");
        }
        Ok(config)
    }

    /// Le client doit-il viser le serveur de test ?
    pub fn is_test(&self) -> bool {
        self.test || gateway_mode() == GatewayMode::Test
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_login_and_password() {
        assert!(matches!(
            GatewayConfig::new("", "secret"),
            Err(GatewayError::MissingOption("login"))
        ));
        assert!(matches!(
            GatewayConfig::new("merchant", ""),
            Err(GatewayError::MissingOption("password"))
        ));
        assert!(GatewayConfig::new("merchant", "secret").is_ok());
    }

    #[test]
    fn test_from_yaml_str() {
        let config = GatewayConfig::from_yaml_str(
            r#"
login: merchant
password: secret
test: true
nexus: "WI CA QC"
ignore_avs: true
"#,
        )
        .unwrap();

        assert_eq!(config.login, "merchant");
        assert!(config.test);
        assert_eq!(config.nexus.as_deref(), Some("WI CA QC"));
        assert!(config.ignore_avs);
        assert!(!config.ignore_cvv);
        assert_eq!(config.vat_reg_number, None);
    }

    #[test]
    fn test_global_mode_overrides_client_flag() {
        let config = GatewayConfig::new("merchant", "secret").unwrap();
        assert!(!config.is_test());

        set_gateway_mode(GatewayMode::Test);
        assert!(config.is_test());

        set_gateway_mode(GatewayMode::Live);
        assert!(!config.is_test());
    }

    #[test]
    fn test_from_yaml_str_missing_password() {
        let result = GatewayConfig::from_yaml_str("login: merchant\npassword: \"\"\n");
        assert!(result.is_err());
    }
}
