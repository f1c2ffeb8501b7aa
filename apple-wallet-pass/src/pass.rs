//! [Doc](https://developer.apple.com/documentation/walletpasses/building_a_pass)

use std::{
    collections::BTreeMap,
    error, fmt,
    fmt::Write as _,
    io::{Cursor, Write as _},
    iter,
};

use openssl::{
    error::ErrorStack as OpensslErrorStack,
    pkcs7::{Pkcs7, Pkcs7Flags},
    sha::sha1,
    stack::Stack,
    x509::X509,
};
use serde_json::{Error as SerdeJsonError, Map, Value};
use tracing::debug;
use zip::{result::ZipError, write::FileOptions, CompressionMethod, ZipWriter};

use crate::{
    credentials::{Credentials, CredentialsError, SigningIdentity},
    model::{PassModel, MANIFEST_JSON, PASS_JSON, SIGNATURE},
    props::PassProps,
};

pub const FORMAT_VERSION: u64 = 1;

pub const PASS_STYLES: &[&str] = &[
    "boardingPass",
    "coupon",
    "eventTicket",
    "generic",
    "storeCard",
];

const REQUIRED_STRING_KEYS: &[&str] = &[
    "passTypeIdentifier",
    "teamIdentifier",
    "serialNumber",
    "organizationName",
    "description",
];

const COLOR_KEYS: &[&str] = &["backgroundColor", "foregroundColor", "labelColor"];

const ICON_FILES: &[&str] = &["icon.png", "icon@2x.png", "icon@3x.png"];

const AUTHENTICATION_TOKEN_LEN_MIN: usize = 16;

//
#[derive(Debug)]
pub struct Pass {
    pass_json: Map<String, Value>,
    files: BTreeMap<String, Vec<u8>>,
    identity: SigningIdentity,
}

impl Pass {
    /// Parses the credentials and overlays `props` onto the model's `pass.json`.
    pub fn from_model(
        model: PassModel,
        credentials: &Credentials,
        props: &PassProps,
    ) -> Result<Self, PassError> {
        let identity = credentials
            .parse()
            .map_err(PassError::CredentialsInvalid)?;

        let (mut pass_json, files) = model.into_parts();
        let overrides = props
            .to_json_map()
            .map_err(PassError::SerializePropsFailed)?;
        debug!(keys = ?overrides.keys().collect::<Vec<_>>(), "applying props");
        pass_json.extend(overrides);

        Ok(Self {
            pass_json,
            files,
            identity,
        })
    }

    pub fn pass_json(&self) -> &Map<String, Value> {
        &self.pass_json
    }

    pub fn files(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.files
    }

    /// Validates, signs and packages the pass into `.pkpass` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PassError> {
        let pass_json = self.validated_pass_json()?;
        let pass_json_bytes =
            serde_json::to_vec(&pass_json).map_err(PassError::SerializePassJsonFailed)?;

        let manifest = build_manifest(
            iter::once((PASS_JSON, pass_json_bytes.as_slice()))
                .chain(self.files.iter().map(|(k, v)| (k.as_str(), v.as_slice()))),
        );
        let manifest_bytes =
            serde_json::to_vec(&manifest).map_err(PassError::SerializeManifestFailed)?;

        let signature = sign(&self.identity, &manifest_bytes).map_err(PassError::SignFailed)?;

        let entries = iter::once((PASS_JSON, pass_json_bytes.as_slice()))
            .chain(self.files.iter().map(|(k, v)| (k.as_str(), v.as_slice())))
            .chain([
                (MANIFEST_JSON, manifest_bytes.as_slice()),
                (SIGNATURE, signature.as_slice()),
            ]);
        let bytes = archive(entries).map_err(PassError::ArchiveFailed)?;

        debug!(
            files = self.files.len(),
            size = bytes.len(),
            "pass packaged"
        );

        Ok(bytes)
    }

    fn validated_pass_json(&self) -> Result<Map<String, Value>, PassError> {
        let mut pass_json = self.pass_json.clone();
        pass_json.insert("formatVersion".to_owned(), Value::from(FORMAT_VERSION));

        for key in REQUIRED_STRING_KEYS {
            match pass_json.get(*key) {
                Some(Value::String(s)) if !s.is_empty() => {}
                _ => {
                    return Err(PassError::InvalidPassJson(
                        format!("{key} must be a non-empty string").into(),
                    ))
                }
            }
        }

        let styles = PASS_STYLES
            .iter()
            .filter(|style| pass_json.contains_key(**style))
            .collect::<Vec<_>>();
        if styles.len() != 1 {
            return Err(PassError::InvalidPassJson(
                format!("expected exactly one pass style, found {styles:?}").into(),
            ));
        }

        for key in COLOR_KEYS {
            if let Some(value) = pass_json.get(*key) {
                if !value.as_str().map_or(false, is_rgb_color) {
                    return Err(PassError::InvalidColor {
                        key: (*key).into(),
                        value: value.to_string().into(),
                    });
                }
            }
        }

        if pass_json.contains_key("webServiceURL") {
            match pass_json.get("authenticationToken").and_then(Value::as_str) {
                Some(token) if token.chars().count() >= AUTHENTICATION_TOKEN_LEN_MIN => {}
                _ => {
                    return Err(PassError::InvalidPassJson(
                        format!(
                            "webServiceURL requires an authenticationToken of at least {AUTHENTICATION_TOKEN_LEN_MIN} characters"
                        )
                        .into(),
                    ))
                }
            }
        }

        if !ICON_FILES.iter().any(|name| self.files.contains_key(*name)) {
            return Err(PassError::IconMissing);
        }

        // generated at packaging time, a model copy would clash in the archive
        for name in [PASS_JSON, MANIFEST_JSON, SIGNATURE] {
            if self.files.contains_key(name) {
                return Err(PassError::ReservedFileName(name.into()));
            }
        }

        Ok(pass_json)
    }
}

// e.g. rgb(255, 255, 255)
fn is_rgb_color(s: &str) -> bool {
    let inner = match s
        .trim()
        .strip_prefix("rgb(")
        .and_then(|s| s.strip_suffix(')'))
    {
        Some(x) => x,
        None => return false,
    };

    let components = inner.split(',').map(str::trim).collect::<Vec<_>>();
    components.len() == 3
        && components.iter().all(|c| {
            !c.is_empty() && c.bytes().all(|b| b.is_ascii_digit()) && c.parse::<u8>().is_ok()
        })
}

fn build_manifest<'a>(
    entries: impl IntoIterator<Item = (&'a str, &'a [u8])>,
) -> BTreeMap<&'a str, String> {
    entries
        .into_iter()
        .map(|(name, bytes)| {
            let mut hex = String::with_capacity(40);
            for b in sha1(bytes) {
                let _ = write!(hex, "{b:02x}");
            }
            (name, hex)
        })
        .collect()
}

fn sign(identity: &SigningIdentity, manifest: &[u8]) -> Result<Vec<u8>, OpensslErrorStack> {
    let mut certs = Stack::<X509>::new()?;
    certs.push(identity.wwdr.clone())?;

    let pkcs7 = Pkcs7::sign(
        &identity.signer_cert,
        &identity.signer_key,
        &certs,
        manifest,
        Pkcs7Flags::BINARY | Pkcs7Flags::DETACHED,
    )?;
    pkcs7.to_der()
}

fn archive<'a>(
    entries: impl IntoIterator<Item = (&'a str, &'a [u8])>,
) -> Result<Vec<u8>, ZipError> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        zip.start_file(name, options)?;
        zip.write_all(bytes)?;
    }
    Ok(zip.finish()?.into_inner())
}

//
#[derive(Debug)]
pub enum PassError {
    CredentialsInvalid(CredentialsError),
    SerializePropsFailed(SerdeJsonError),
    InvalidPassJson(Box<str>),
    InvalidColor { key: Box<str>, value: Box<str> },
    IconMissing,
    ReservedFileName(Box<str>),
    SerializePassJsonFailed(SerdeJsonError),
    SerializeManifestFailed(SerdeJsonError),
    SignFailed(OpensslErrorStack),
    ArchiveFailed(ZipError),
}
impl fmt::Display for PassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
impl error::Error for PassError {}
