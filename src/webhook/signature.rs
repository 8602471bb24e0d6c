//! Verifying that a webhook delivery was signed by Kick.
//!
//! Kick signs `"{message_id}.{message_timestamp}.{body}"` with RSA PKCS#1 v1.5
//! over SHA-256 and sends the base64 signature in `Kick-Event-Signature`.

use crate::webhook::WebhookEventHeader;
use crate::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ring::signature::{UnparsedPublicKey, RSA_PKCS1_2048_8192_SHA256};
use rustls_pemfile::Item;
use std::io::BufReader;
use std::str::FromStr;

/// The key Kick signs webhook deliveries with.
///
/// It can also be fetched at runtime with [`Client::public_key`](crate::Client::public_key).
pub const DEFAULT_PUBLIC_KEY_PEM: &str = "-----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAq/+l1WnlRrGSolDMA+A8
6rAhMbQGmQ2SapVcGM3zq8ANXjnhDWocMqfWcTd95btDydITa10kDvHzw9WQOqp2
MZI7ZyrfzJuz5nhTPCiJwTwnEtWft7nV14BYRDHvlfqPUaZ+1KR4OCaO/wWIk/rQ
L/TjY0M70gse8rlBkbo2a8rKhu69RQTRsoaf4DVhDPEeSeI5jVrRDGAMGL3cGuyY
6CLKGdjVEM78g3JfYOvDU/RvfqD7L89TZ3iN94jrmWdGz34JNlEI5hqK8dd7C5EF
BEbZ5jgB8s8ReQV8H+MkuffjdAj3ajDDX3DOJMIut1lBrUVD1AaSrGCKHooWoL2e
twIDAQAB
-----END PUBLIC KEY-----
";

const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

// 1.2.840.113549.1.1.1
const RSA_ENCRYPTION_OID: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];

const TAG_INTEGER: u8 = 0x02;
const TAG_BIT_STRING: u8 = 0x03;
const TAG_OID: u8 = 0x06;
const TAG_SEQUENCE: u8 = 0x30;

/// An RSA public key parsed from a PEM `PUBLIC KEY` (SubjectPublicKeyInfo) block.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    // DER encoded PKCS#1 RSAPublicKey, the form ring verifies against.
    rsa_der: Vec<u8>,
}

impl PublicKey {
    /// Parses a PEM encoded public key.
    ///
    /// # Errors
    ///
    /// * [`Error::PublicKeyParse`] if the input is not a PEM `PUBLIC KEY` block
    ///   holding a well-formed SubjectPublicKeyInfo.
    /// * [`Error::UnexpectedKeyType`] if the key is valid but not an RSA key.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let der = decode_pem(pem)?;
        let rsa_der = rsa_key_from_spki(&der)?;
        Ok(Self { rsa_der })
    }

    /// The Kick key compiled into this crate.
    pub fn kick_default() -> Result<Self> {
        Self::from_pem(DEFAULT_PUBLIC_KEY_PEM)
    }

    /// Checks a base64 encoded PKCS#1 v1.5 SHA-256 signature over `message`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SignatureVerification`] if the signature is not valid
    /// base64 or does not match.
    pub fn verify(&self, message: &[u8], signature_b64: &str) -> Result<()> {
        let signature = STANDARD
            .decode(signature_b64.trim())
            .map_err(|e| Error::SignatureVerification(format!("invalid base64 signature: {}", e)))?;

        UnparsedPublicKey::new(&RSA_PKCS1_2048_8192_SHA256, &self.rsa_der)
            .verify(message, &signature)
            .map_err(|_| Error::SignatureVerification("signature does not match".to_string()))
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_pem(s)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("der_len", &self.rsa_der.len())
            .finish()
    }
}

/// Builds the exact byte string Kick signs for a delivery.
pub fn signed_message(header: &WebhookEventHeader, body: &[u8]) -> Vec<u8> {
    let len = header.message_id.len() + header.message_timestamp.len() + body.len() + 2;
    let mut message = Vec::with_capacity(len);
    message.extend_from_slice(header.message_id.as_bytes());
    message.push(b'.');
    message.extend_from_slice(header.message_timestamp.as_bytes());
    message.push(b'.');
    message.extend_from_slice(body);
    message
}

/// Verifies that `body` with the given headers was signed by the holder of `key`.
///
/// # Errors
///
/// Returns [`Error::SignatureVerification`] if the signature is malformed or
/// does not match.
pub fn verify_event(header: &WebhookEventHeader, key: &PublicKey, body: &[u8]) -> Result<()> {
    key.verify(&signed_message(header, body), &header.signature)
}

/// Same as [`verify_event`], parsing the PEM key first.
///
/// # Errors
///
/// Key parsing errors from [`PublicKey::from_pem`] and verification errors
/// from [`verify_event`].
pub fn verify_event_pem(
    header: &WebhookEventHeader,
    public_key_pem: &str,
    body: &[u8],
) -> Result<()> {
    let key = PublicKey::from_pem(public_key_pem)?;
    verify_event(header, &key, body)
}

fn decode_pem(pem: &str) -> Result<Vec<u8>> {
    let mut reader = BufReader::new(pem.as_bytes());

    match rustls_pemfile::read_one(&mut reader) {
        Ok(Some(Item::SubjectPublicKeyInfo(spki))) => Ok(spki.as_ref().to_vec()),
        Ok(Some(item)) => Err(Error::PublicKeyParse(format!(
            "expected a {PUBLIC_KEY_LABEL} block, found {}",
            pem_label(&item)
        ))),
        Ok(None) => Err(Error::PublicKeyParse("no PEM block found".to_string())),
        Err(e) => Err(Error::PublicKeyParse(format!("invalid PEM block: {}", e))),
    }
}

fn pem_label(item: &Item) -> &'static str {
    match item {
        Item::X509Certificate(_) => "CERTIFICATE",
        Item::Pkcs1Key(_) => "RSA PRIVATE KEY",
        Item::Pkcs8Key(_) => "PRIVATE KEY",
        Item::Sec1Key(_) => "EC PRIVATE KEY",
        _ => "another PEM block",
    }
}

fn rsa_key_from_spki(der: &[u8]) -> Result<Vec<u8>> {
    let malformed = || Error::PublicKeyParse("malformed SubjectPublicKeyInfo".to_string());

    let mut spki = DerReader::new(der).read(TAG_SEQUENCE).ok_or_else(malformed)?;
    let mut algorithm = spki.read(TAG_SEQUENCE).ok_or_else(malformed)?;
    let oid = algorithm.read_raw(TAG_OID).ok_or_else(malformed)?;
    let bits = spki.read_raw(TAG_BIT_STRING).ok_or_else(malformed)?;

    if oid != RSA_ENCRYPTION_OID {
        return Err(Error::UnexpectedKeyType(format!(
            "algorithm OID {} is not rsaEncryption",
            format_oid(oid)
        )));
    }

    // First byte of a BIT STRING counts unused trailing bits; keys have none.
    let (&unused_bits, key) = bits.split_first().ok_or_else(malformed)?;
    if unused_bits != 0 {
        return Err(malformed());
    }

    let mut rsa = DerReader::new(key).read(TAG_SEQUENCE).ok_or_else(malformed)?;
    rsa.read_raw(TAG_INTEGER).ok_or_else(malformed)?;
    rsa.read_raw(TAG_INTEGER).ok_or_else(malformed)?;

    Ok(key.to_vec())
}

fn format_oid(oid: &[u8]) -> String {
    let Some((&first, rest)) = oid.split_first() else {
        return String::new();
    };

    let mut arcs = vec![u64::from(first / 40), u64::from(first % 40)];
    let mut arc = 0u64;
    for &byte in rest {
        arc = (arc << 7) | u64::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            arcs.push(arc);
            arc = 0;
        }
    }

    arcs.iter().map(u64::to_string).collect::<Vec<_>>().join(".")
}

/// Just enough DER to walk a SubjectPublicKeyInfo.
struct DerReader<'a> {
    input: &'a [u8],
}

impl<'a> DerReader<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self { input }
    }

    /// Reads a constructed element and returns a reader over its contents.
    fn read(&mut self, tag: u8) -> Option<DerReader<'a>> {
        self.read_raw(tag).map(DerReader::new)
    }

    /// Reads the next element if it has `tag`, returning its contents.
    fn read_raw(&mut self, tag: u8) -> Option<&'a [u8]> {
        let (&actual, rest) = self.input.split_first()?;
        if actual != tag {
            return None;
        }

        let (&first, mut rest) = rest.split_first()?;
        let len = if first & 0x80 == 0 {
            usize::from(first)
        } else {
            let count = usize::from(first & 0x7f);
            if count == 0 || count > std::mem::size_of::<usize>() || rest.len() < count {
                return None;
            }
            let (len_bytes, tail) = rest.split_at(count);
            rest = tail;
            len_bytes
                .iter()
                .fold(0usize, |acc, &b| (acc << 8) | usize::from(b))
        };

        if rest.len() < len {
            return None;
        }
        let (contents, tail) = rest.split_at(len);
        self.input = tail;
        Some(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSA_PUBLIC_PEM: &str = include_str!("../../tests/fixtures/rsa_public.pem");
    const RSA_OTHER_PUBLIC_PEM: &str = include_str!("../../tests/fixtures/rsa_other_public.pem");
    const RSA_PRIVATE_PEM: &str = include_str!("../../tests/fixtures/rsa_private.pem");
    const EC_PUBLIC_PEM: &str = include_str!("../../tests/fixtures/ec_public.pem");
    const SIGNATURE_B64: &str = include_str!("../../tests/fixtures/signature.b64");

    const BODY: &[u8] = br#"{"content":"hello"}"#;

    fn header() -> WebhookEventHeader {
        WebhookEventHeader {
            message_id: "test-id".to_string(),
            message_timestamp: "2023-01-01T00:00:00Z".to_string(),
            signature: SIGNATURE_B64.trim().to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_key_parses() {
        assert!(PublicKey::kick_default().is_ok());
    }

    #[test]
    fn test_signed_message_layout() {
        assert_eq!(
            signed_message(&header(), BODY),
            br#"test-id.2023-01-01T00:00:00Z.{"content":"hello"}"#.to_vec()
        );
    }

    #[test]
    fn test_valid_signature_verifies() {
        let key = PublicKey::from_pem(RSA_PUBLIC_PEM).unwrap();
        verify_event(&header(), &key, BODY).unwrap();
        verify_event_pem(&header(), RSA_PUBLIC_PEM, BODY).unwrap();
    }

    #[test]
    fn test_any_changed_byte_fails() {
        let key = PublicKey::from_pem(RSA_PUBLIC_PEM).unwrap();

        let mut changed_id = header();
        changed_id.message_id = "test-iD".to_string();
        let mut changed_timestamp = header();
        changed_timestamp.message_timestamp = "2023-01-01T00:00:01Z".to_string();
        let changed_body = br#"{"content":"hellO"}"#;

        for (header, body) in [
            (changed_id, BODY),
            (changed_timestamp, BODY),
            (header(), &changed_body[..]),
        ] {
            assert!(matches!(
                verify_event(&header, &key, body),
                Err(Error::SignatureVerification(_))
            ));
        }
    }

    #[test]
    fn test_mismatched_key_fails() {
        let key = PublicKey::from_pem(RSA_OTHER_PUBLIC_PEM).unwrap();
        assert!(matches!(
            verify_event(&header(), &key, BODY),
            Err(Error::SignatureVerification(_))
        ));
    }

    #[test]
    fn test_bad_base64_signature_is_a_verification_error() {
        let key = PublicKey::from_pem(RSA_PUBLIC_PEM).unwrap();
        let mut header = header();
        header.signature = "invalid-base64-signature".to_string();

        assert!(matches!(
            verify_event(&header, &key, BODY),
            Err(Error::SignatureVerification(_))
        ));
    }

    #[test]
    fn test_non_pem_input_is_a_parse_error() {
        assert!(matches!(
            PublicKey::from_pem("invalid-public-key"),
            Err(Error::PublicKeyParse(_))
        ));
        assert!(matches!(
            verify_event_pem(&header(), "invalid-public-key", BODY),
            Err(Error::PublicKeyParse(_))
        ));
    }

    #[test]
    fn test_private_key_block_is_a_parse_error() {
        assert!(matches!(
            PublicKey::from_pem(RSA_PRIVATE_PEM),
            Err(Error::PublicKeyParse(message)) if message.contains("PRIVATE KEY")
        ));
    }

    #[test]
    fn test_garbage_key_bytes_is_a_parse_error() {
        let pem =
            "-----BEGIN PUBLIC KEY-----\naW52YWxpZCBrZXkgYnl0ZXM=\n-----END PUBLIC KEY-----\n";
        assert!(matches!(PublicKey::from_pem(pem), Err(Error::PublicKeyParse(_))));
    }

    #[test]
    fn test_text_before_the_block_is_skipped() {
        let pem = format!("Kick webhook key\n{RSA_PUBLIC_PEM}");
        let key = PublicKey::from_pem(&pem).unwrap();

        assert_eq!(key, PublicKey::from_pem(RSA_PUBLIC_PEM).unwrap());
        verify_event(&header(), &key, BODY).unwrap();
    }

    #[test]
    fn test_unterminated_block_is_a_parse_error() {
        let truncated: String = RSA_PUBLIC_PEM.lines().take(3).collect::<Vec<_>>().join("\n");
        assert!(matches!(PublicKey::from_pem(&truncated), Err(Error::PublicKeyParse(_))));
    }

    #[test]
    fn test_ec_key_is_an_unexpected_key_type() {
        match PublicKey::from_pem(EC_PUBLIC_PEM) {
            Err(Error::UnexpectedKeyType(message)) => {
                assert!(message.contains("1.2.840.10045.2.1"))
            }
            other => panic!("Expected UnexpectedKeyType, got {:?}", other),
        }
    }
}
