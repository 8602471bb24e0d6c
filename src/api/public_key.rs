use crate::request::{AuthType, RequestOptions};
use crate::webhook::PublicKey;
use crate::{Client, ResourceKind, Response, Result};
use http::Method;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PublicKeyOutput {
    /// PEM encoded key Kick signs webhook deliveries with.
    pub public_key: String,
}

impl PublicKeyOutput {
    /// Parses the fetched key for use with [`verify_event`](crate::webhook::verify_event).
    pub fn parse(&self) -> Result<PublicKey> {
        PublicKey::from_pem(&self.public_key)
    }
}

impl Client {
    /// Retrieves the public key used to sign webhook deliveries.
    pub async fn public_key(&self) -> Result<Response<PublicKeyOutput>> {
        let options = RequestOptions::new(
            self.resource(ResourceKind::Api, "public/v1/public-key"),
            Method::GET,
        )
        .auth(AuthType::UserToken);

        self.execute(options).await
    }
}
