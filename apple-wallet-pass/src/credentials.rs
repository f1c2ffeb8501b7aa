use core::cmp::Ordering;
use std::{error, fmt};

use openssl::{
    asn1::Asn1Time,
    error::ErrorStack as OpensslErrorStack,
    pkey::{PKey, Private},
    x509::X509,
};
use tracing::debug;

/// Raw PEM inputs needed to sign a pass.
#[derive(Clone)]
pub struct Credentials {
    /// Apple Worldwide Developer Relations intermediate certificate.
    pub wwdr: Vec<u8>,
    /// Pass Type ID certificate.
    pub signer_cert: Vec<u8>,
    pub signer_key: Vec<u8>,
    pub signer_key_passphrase: Option<Box<str>>,
}

impl Credentials {
    pub fn new(
        wwdr: impl Into<Vec<u8>>,
        signer_cert: impl Into<Vec<u8>>,
        signer_key: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            wwdr: wwdr.into(),
            signer_cert: signer_cert.into(),
            signer_key: signer_key.into(),
            signer_key_passphrase: None,
        }
    }

    pub fn with_signer_key_passphrase(mut self, passphrase: impl AsRef<str>) -> Self {
        self.signer_key_passphrase = Some(passphrase.as_ref().into());
        self
    }

    /// Parses the PEM inputs and checks that they can sign.
    ///
    /// The signer key must belong to the signer certificate, and neither
    /// certificate may be outside its `notBefore`..`notAfter` window.
    pub fn parse(&self) -> Result<SigningIdentity, CredentialsError> {
        let wwdr = X509::from_pem(&self.wwdr).map_err(CredentialsError::ParseWwdrFailed)?;
        let signer_cert =
            X509::from_pem(&self.signer_cert).map_err(CredentialsError::ParseSignerCertFailed)?;
        let signer_key = match self.signer_key_passphrase.as_deref() {
            Some(passphrase) => {
                PKey::private_key_from_pem_passphrase(&self.signer_key, passphrase.as_bytes())
            }
            None => PKey::private_key_from_pem(&self.signer_key),
        }
        .map_err(CredentialsError::ParseSignerKeyFailed)?;

        let signer_public_key = signer_cert
            .public_key()
            .map_err(CredentialsError::ParseSignerCertFailed)?;
        if !signer_public_key.public_eq(&signer_key) {
            return Err(CredentialsError::SignerKeyMismatch);
        }

        let now = Asn1Time::days_from_now(0).map_err(CredentialsError::CheckValidityFailed)?;
        for (name, cert) in [("wwdr", &wwdr), ("signerCert", &signer_cert)] {
            let ord = cert
                .not_before()
                .compare(&now)
                .map_err(CredentialsError::CheckValidityFailed)?;
            if ord == Ordering::Greater {
                return Err(CredentialsError::CertificateNotYetValid(name.into()));
            }

            let ord = cert
                .not_after()
                .compare(&now)
                .map_err(CredentialsError::CheckValidityFailed)?;
            if ord == Ordering::Less {
                return Err(CredentialsError::CertificateExpired(name.into()));
            }
        }

        debug!(
            signer_not_after = %signer_cert.not_after(),
            "signing credentials parsed"
        );

        Ok(SigningIdentity {
            wwdr,
            signer_cert,
            signer_key,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("wwdr", &format_args!("[{} bytes]", self.wwdr.len()))
            .field(
                "signer_cert",
                &format_args!("[{} bytes]", self.signer_cert.len()),
            )
            .field("signer_key", &"[redacted]")
            .field(
                "signer_key_passphrase",
                &self.signer_key_passphrase.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

//
pub struct SigningIdentity {
    pub(crate) wwdr: X509,
    pub(crate) signer_cert: X509,
    pub(crate) signer_key: PKey<Private>,
}

impl SigningIdentity {
    pub fn wwdr(&self) -> &X509 {
        &self.wwdr
    }

    pub fn signer_cert(&self) -> &X509 {
        &self.signer_cert
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("wwdr", &self.wwdr.subject_name())
            .field("signer_cert", &self.signer_cert.subject_name())
            .finish_non_exhaustive()
    }
}

//
#[derive(Debug)]
pub enum CredentialsError {
    ParseWwdrFailed(OpensslErrorStack),
    ParseSignerCertFailed(OpensslErrorStack),
    ParseSignerKeyFailed(OpensslErrorStack),
    SignerKeyMismatch,
    CertificateExpired(Box<str>),
    CertificateNotYetValid(Box<str>),
    CheckValidityFailed(OpensslErrorStack),
}
impl fmt::Display for CredentialsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
impl error::Error for CredentialsError {}
