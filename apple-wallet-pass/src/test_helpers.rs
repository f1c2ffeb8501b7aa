use std::{fs, path::Path};

use openssl::{
    asn1::{Asn1Time, Asn1TimeRef},
    bn::BigNum,
    ec::{EcGroup, EcKey},
    hash::MessageDigest,
    nid::Nid,
    pkey::{PKey, Private},
    symm::Cipher,
    x509::{extension::BasicConstraints, X509Builder, X509Name, X509NameBuilder, X509NameRef, X509},
};

use crate::{credentials::Credentials, generator::GeneratorConfig, props::PassProps};

pub(crate) const PASS_JSON: &str = r#"
{
    "formatVersion": 1,
    "passTypeIdentifier": "pass.com.example.template",
    "teamIdentifier": "TEMPLATE00",
    "serialNumber": "template",
    "organizationName": "Template Org",
    "description": "Template",
    "generic": {
        "primaryFields": [
            { "key": "member", "label": "Member", "value": "Jane Doe" }
        ]
    }
}
"#;

pub(crate) const ICON_PNG: &[u8] = b"\x89PNG\r\n\x1a\nicon";
pub(crate) const LOGO_PNG: &[u8] = b"\x89PNG\r\n\x1a\nlogo";

//
pub(crate) struct TestPki {
    pub wwdr_pem: Vec<u8>,
    pub signer_cert_pem: Vec<u8>,
    pub signer_key_pem: Vec<u8>,
}

impl TestPki {
    pub fn generate() -> Self {
        Self::build(
            &Asn1Time::days_from_now(0).unwrap(),
            &Asn1Time::days_from_now(365).unwrap(),
        )
    }

    pub fn generate_expired_signer() -> Self {
        Self::build(
            &Asn1Time::from_unix(0).unwrap(),
            &Asn1Time::from_unix(86400).unwrap(),
        )
    }

    pub fn generate_not_yet_valid_signer() -> Self {
        Self::build(
            &Asn1Time::days_from_now(30).unwrap(),
            &Asn1Time::days_from_now(365).unwrap(),
        )
    }

    fn build(signer_not_before: &Asn1TimeRef, signer_not_after: &Asn1TimeRef) -> Self {
        let wwdr_key = make_key();
        let wwdr_name = make_name("Test Worldwide Developer Relations");
        let wwdr = make_cert(
            &wwdr_name,
            &wwdr_key,
            &wwdr_name,
            &wwdr_key,
            &Asn1Time::days_from_now(0).unwrap(),
            &Asn1Time::days_from_now(3650).unwrap(),
            true,
        );

        let signer_key = make_key();
        let signer_name = make_name("Pass Type ID: pass.com.example.test");
        let signer_cert = make_cert(
            &signer_name,
            &signer_key,
            &wwdr_name,
            &wwdr_key,
            signer_not_before,
            signer_not_after,
            false,
        );

        Self {
            wwdr_pem: wwdr.to_pem().unwrap(),
            signer_cert_pem: signer_cert.to_pem().unwrap(),
            signer_key_pem: signer_key.private_key_to_pem_pkcs8().unwrap(),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.wwdr_pem.clone(),
            self.signer_cert_pem.clone(),
            self.signer_key_pem.clone(),
        )
    }

    pub fn write_to(&self, dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("wwdr.pem"), &self.wwdr_pem).unwrap();
        fs::write(dir.join("signerCert.pem"), &self.signer_cert_pem).unwrap();
        fs::write(dir.join("signerKey.pem"), &self.signer_key_pem).unwrap();
    }
}

pub(crate) fn encrypt_key_pem(key_pem: &[u8], passphrase: &str) -> Vec<u8> {
    PKey::private_key_from_pem(key_pem)
        .unwrap()
        .private_key_to_pem_pkcs8_passphrase(Cipher::aes_256_cbc(), passphrase.as_bytes())
        .unwrap()
}

/// Writes a minimal valid model (`pass.json`, `icon.png`, `logo.png`).
pub(crate) fn write_model(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join("pass.json"), PASS_JSON).unwrap();
    fs::write(dir.join("icon.png"), ICON_PNG).unwrap();
    fs::write(dir.join("logo.png"), LOGO_PNG).unwrap();
}

/// Lays out `<root>/pass`, `<root>/cert/*.pem` and `<root>/pass.pass/` the way
/// the default config expects them relative to its working directory.
pub(crate) fn write_fixture(root: &Path) -> GeneratorConfig {
    let model_dir = root.join("pass");
    let cert_dir = root.join("cert");
    let output_dir = root.join("pass.pass");

    write_model(&model_dir);
    TestPki::generate().write_to(&cert_dir);
    fs::create_dir_all(&output_dir).unwrap();

    GeneratorConfig {
        model_dir,
        wwdr_path: cert_dir.join("wwdr.pem"),
        signer_cert_path: cert_dir.join("signerCert.pem"),
        signer_key_path: cert_dir.join("signerKey.pem"),
        signer_key_passphrase: None,
        output_path: output_dir.join("pass.pkpass"),
        props: PassProps::default(),
    }
}

fn make_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

fn make_name(common_name: &str) -> X509Name {
    let mut builder = X509NameBuilder::new().unwrap();
    builder.append_entry_by_nid(Nid::COMMONNAME, common_name).unwrap();
    builder.build()
}

fn make_cert(
    subject: &X509NameRef,
    subject_key: &PKey<Private>,
    issuer: &X509NameRef,
    issuer_key: &PKey<Private>,
    not_before: &Asn1TimeRef,
    not_after: &Asn1TimeRef,
    ca: bool,
) -> X509 {
    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(subject).unwrap();
    builder.set_issuer_name(issuer).unwrap();
    builder.set_pubkey(subject_key).unwrap();
    builder.set_not_before(not_before).unwrap();
    builder.set_not_after(not_after).unwrap();
    if ca {
        builder
            .append_extension(BasicConstraints::new().critical().ca().build().unwrap())
            .unwrap();
    }
    builder.sign(issuer_key, MessageDigest::sha256()).unwrap();
    builder.build()
}
