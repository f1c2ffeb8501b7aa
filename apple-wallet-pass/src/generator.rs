use std::{
    error, fmt, fs,
    io::Error as IoError,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    credentials::Credentials,
    model::{ModelError, PassModel},
    pass::{Pass, PassError},
    props::PassProps,
};

pub const DEFAULT_MODEL_DIR: &str = "../pass";
pub const DEFAULT_WWDR_PATH: &str = "../cert/wwdr.pem";
pub const DEFAULT_SIGNER_CERT_PATH: &str = "../cert/signerCert.pem";
pub const DEFAULT_SIGNER_KEY_PATH: &str = "../cert/signerKey.pem";
pub const DEFAULT_OUTPUT_PATH: &str = "../pass.pass/pass.pkpass";

pub const DEFAULT_PASS_TYPE_IDENTIFIER: &str = "pass.com.acmw.passmaker";
pub const DEFAULT_TEAM_IDENTIFIER: &str = "LUB2L5GCLL";
pub const DEFAULT_SERIAL_NUMBER: &str = "000";
pub const DEFAULT_ORGANIZATION_NAME: &str = "Toy Town";
pub const DEFAULT_DESCRIPTION: &str = "Toy Town Membership";
pub const DEFAULT_LOGO_TEXT: &str = "Gay Company";

/// Everything one run needs. `Default` is the fixed deployment layout,
/// paths relative to the working directory.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub model_dir: PathBuf,
    pub wwdr_path: PathBuf,
    pub signer_cert_path: PathBuf,
    pub signer_key_path: PathBuf,
    pub signer_key_passphrase: Option<Box<str>>,
    pub output_path: PathBuf,
    pub props: PassProps,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model_dir: DEFAULT_MODEL_DIR.into(),
            wwdr_path: DEFAULT_WWDR_PATH.into(),
            signer_cert_path: DEFAULT_SIGNER_CERT_PATH.into(),
            signer_key_path: DEFAULT_SIGNER_KEY_PATH.into(),
            signer_key_passphrase: None,
            output_path: DEFAULT_OUTPUT_PATH.into(),
            props: PassProps {
                pass_type_identifier: Some(DEFAULT_PASS_TYPE_IDENTIFIER.into()),
                team_identifier: Some(DEFAULT_TEAM_IDENTIFIER.into()),
                serial_number: Some(DEFAULT_SERIAL_NUMBER.into()),
                organization_name: Some(DEFAULT_ORGANIZATION_NAME.into()),
                description: Some(DEFAULT_DESCRIPTION.into()),
                logo_text: Some(DEFAULT_LOGO_TEXT.into()),
                ..Default::default()
            },
        }
    }
}

/// Reads the credentials and model, builds the pass and writes it to
/// `config.output_path`, replacing any previous file.
///
/// Nothing is written unless every earlier step succeeded. The output's
/// parent directory must already exist.
pub fn generate(config: &GeneratorConfig) -> Result<PathBuf, GenerateError> {
    let mut credentials = Credentials::new(
        read_credential(&config.wwdr_path)?,
        read_credential(&config.signer_cert_path)?,
        read_credential(&config.signer_key_path)?,
    );
    if let Some(passphrase) = config.signer_key_passphrase.as_deref() {
        credentials = credentials.with_signer_key_passphrase(passphrase);
    }

    let model =
        PassModel::from_dir(&config.model_dir).map_err(GenerateError::LoadModelFailed)?;

    let pass = Pass::from_model(model, &credentials, &config.props)
        .map_err(GenerateError::PassBuildFailed)?;
    let bytes = pass.to_bytes().map_err(GenerateError::PassBuildFailed)?;

    fs::write(&config.output_path, &bytes)
        .map_err(|err| GenerateError::WriteOutputFailed(config.output_path.to_owned(), err))?;

    info!(
        path = %config.output_path.display(),
        size = bytes.len(),
        "pass written"
    );

    Ok(config.output_path.to_owned())
}

fn read_credential(path: &Path) -> Result<Vec<u8>, GenerateError> {
    debug!(path = %path.display(), "reading credential");
    fs::read(path).map_err(|err| GenerateError::ReadCredentialFailed(path.to_owned(), err))
}

//
#[derive(Debug)]
pub enum GenerateError {
    ReadCredentialFailed(PathBuf, IoError),
    LoadModelFailed(ModelError),
    PassBuildFailed(PassError),
    WriteOutputFailed(PathBuf, IoError),
}
impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
impl error::Error for GenerateError {}
