use anyhow::Context;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Who is booking. Produced by an external identity provider; the engine
/// treats it as opaque profile data and never verifies it beyond shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    pub name: String,
    pub email: String,
    pub picture_url: Option<String>,
}

impl UserIdentity {
    /// Decode the profile out of a Google Identity Services credential.
    ///
    /// The credential is a JWT issued by Google's own sign-in widget; the
    /// upstream already verified it, so only the payload segment is read
    /// here. Signature bytes are ignored.
    pub fn from_google_credential(credential: &str) -> anyhow::Result<Self> {
        let payload_b64 = credential
            .split('.')
            .nth(1)
            .context("credential is not a JWT")?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64.trim_end_matches('='))
            .context("credential payload is not base64url")?;

        let claims: serde_json::Value =
            serde_json::from_slice(&payload).context("credential payload is not JSON")?;

        let name = claims["name"]
            .as_str()
            .context("credential has no name claim")?
            .to_string();
        let email = claims["email"]
            .as_str()
            .context("credential has no email claim")?
            .to_string();
        let picture_url = claims["picture"].as_str().map(|s| s.to_string());

        Ok(UserIdentity {
            name,
            email,
            picture_url,
        })
    }
}
