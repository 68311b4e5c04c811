use argon2::{password_hash::SaltString, Argon2, PasswordHasher};
use rand::rngs::OsRng;
use tracing::error;

use crate::users::{dto::SubmissionData, repo::NewUser};

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn parse_submission(raw: &str) -> Result<SubmissionData, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Builds the insert payload around an already-stored upload.
pub fn new_user_from_submission(
    data: SubmissionData,
    profile_image: String,
) -> anyhow::Result<NewUser> {
    let password_hash = data.password.as_deref().map(hash_password).transpose()?;
    Ok(NewUser {
        username: data.username,
        email: data.email,
        password_hash,
        profession: data.profession,
        company: data.company,
        address_line1: data.address_line1,
        country: data.country,
        state: data.state,
        city: data.city,
        plan: data.plan,
        newsletter: data.newsletter,
        profile_image,
    })
}

#[cfg(test)]
mod submission_tests {
    use super::*;
    use argon2::{PasswordHash, PasswordVerifier};

    fn verifies(plain: &str, hash: &str) -> bool {
        let parsed = PasswordHash::new(hash).unwrap();
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    #[test]
    fn test_parse_camel_case_and_ignore_profile_image() {
        let data = parse_submission(
            r#"{"username":"asha","email":"a@x.io","addressLine1":"12 Hill Rd",
                "newsletter":true,"profileImage":"evil.png","extra":1}"#,
        )
        .unwrap();
        assert_eq!(data.username, "asha");
        assert_eq!(data.address_line1.as_deref(), Some("12 Hill Rd"));
        assert_eq!(data.newsletter, Some(true));

        let user = new_user_from_submission(data, "17-a.png".into()).unwrap();
        assert_eq!(user.profile_image, "17-a.png");
        assert!(user.password_hash.is_none());
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(parse_submission("{not json").is_err());
        assert!(parse_submission(r#"{"newsletter":"maybe"}"#).is_err());
        assert!(parse_submission(r#"{"newsletter":2}"#).is_err());
        assert!(parse_submission(r#"{"username":{"first":"a"}}"#).is_err());
        assert!(parse_submission(r#"{"city":["Pune"]}"#).is_err());
    }

    #[test]
    fn test_parse_casts_loose_scalars() {
        let data = parse_submission(
            r#"{"username":1234,"email":"n@x.io","newsletter":"yes","plan":null,"company":false}"#,
        )
        .unwrap();
        assert_eq!(data.username, "1234");
        assert_eq!(data.newsletter, Some(true));
        assert_eq!(data.plan, None);
        assert_eq!(data.company.as_deref(), Some("false"));

        for (raw, expected) in [
            (r#""true""#, Some(true)),
            (r#""1""#, Some(true)),
            ("1", Some(true)),
            (r#""no""#, Some(false)),
            (r#""0""#, Some(false)),
            ("0", Some(false)),
            ("false", Some(false)),
            ("null", None),
        ] {
            let data = parse_submission(&format!(r#"{{"newsletter":{raw}}}"#)).unwrap();
            assert_eq!(data.newsletter, expected, "newsletter {raw}");
        }

        let missing = parse_submission("{}").unwrap();
        assert!(missing.username.is_empty());
        assert_eq!(missing.newsletter, None);
    }

    #[test]
    fn test_password_is_hashed() {
        let data = SubmissionData {
            username: "u".into(),
            email: "e@x.io".into(),
            password: Some("hunter22".into()),
            ..Default::default()
        };
        let user = new_user_from_submission(data, "1-a.jpg".into()).unwrap();
        let hash = user.password_hash.unwrap();
        assert_ne!(hash, "hunter22");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verifies("hunter22", &hash));
        assert!(!verifies("hunter23", &hash));
    }
}
