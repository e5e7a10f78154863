use super::*;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};

fn read_pem(path: &str, what: &str, fs: &Filesystem) -> Result<String, Box<dyn Error>> {
    fs.read_to_string(path)
        .map_err(|e| format!("failed to load {} {}: {}", what, path, e).into())
}

fn load_certs(path: &str, fs: &Filesystem) -> Result<Vec<CertificateDer<'static>>, Box<dyn Error>> {
    let pem = read_pem(path, "certificate", fs)?;
    let certs = rustls_pemfile::certs(&mut pem.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("failed to parse certificate {}: {}", path, e))?;
    if certs.is_empty() {
        return Err(format!("no certificates found in {}", path).into());
    }
    Ok(certs)
}

fn load_key(path: &str, fs: &Filesystem) -> Result<PrivateKeyDer<'static>, Box<dyn Error>> {
    let pem = read_pem(path, "private key", fs)?;
    rustls_pemfile::private_key(&mut pem.as_bytes())
        .map_err(|e| format!("failed to parse private key {}: {}", path, e))?
        .ok_or_else(|| format!("no private key found in {}", path).into())
}

/// Builds the rustls server configuration shared by every TLS connection
pub fn load_tls_config(
    tls: &TlsConfig,
    fs: &Filesystem,
) -> Result<Arc<rustls::ServerConfig>, Box<dyn Error>> {
    let certs = load_certs(&tls.cert_path, fs)?;
    let key = load_key(&tls.key_path, fs)?;
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| {
            format!(
                "certificate {} does not work with key {}: {}",
                tls.cert_path, tls.key_path, e
            )
        })?;
    info!("loaded TLS certificate {}", tls.cert_path);
    Ok(Arc::new(config))
}
