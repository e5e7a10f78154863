use super::*;
use crate::server::{load_tls_config, TlsConfig};
use rustls::RootCertStore;

pub const TEST_CERT_PATH: &str = "test/cert.pem";
pub const TEST_KEY_PATH: &str = "test/key.pem";

/// A freshly generated self-signed certificate for localhost
pub struct TestCertificate {
    pub cert_pem: String,
    pub key_pem: String,
}

impl TestCertificate {
    pub fn generate() -> Self {
        let key_pair = rcgen::KeyPair::generate().expect("failed to generate key pair");
        let cert = rcgen::CertificateParams::new(vec!["localhost".to_string()])
            .expect("invalid certificate params")
            .self_signed(&key_pair)
            .expect("failed to self-sign certificate");
        Self {
            cert_pem: cert.pem(),
            key_pem: key_pair.serialize_pem(),
        }
    }

    /// A filesystem holding the certificate and key at TEST_CERT_PATH and TEST_KEY_PATH
    pub fn filesystem(&self) -> MockFilesystem {
        MockFilesystem::new()
            .add_file(TEST_CERT_PATH, &self.cert_pem)
            .add_file(TEST_KEY_PATH, &self.key_pem)
    }

    pub fn tls_config() -> TlsConfig {
        TlsConfig {
            cert_path: TEST_CERT_PATH.to_string(),
            key_path: TEST_KEY_PATH.to_string(),
        }
    }

    pub fn server_config(&self) -> Arc<rustls::ServerConfig> {
        load_tls_config(&Self::tls_config(), &self.filesystem().boxed())
            .expect("failed to load generated certificate")
    }

    /// Roots a client needs to trust this certificate
    pub fn root_store(&self) -> RootCertStore {
        let mut roots = RootCertStore::empty();
        for cert in rustls_pemfile::certs(&mut self.cert_pem.as_bytes()) {
            roots
                .add(cert.expect("failed to parse generated certificate"))
                .expect("failed to add root certificate");
        }
        roots
    }
}
