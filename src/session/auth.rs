use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether this session is signed in, and as whom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    SignedIn {
        identity: String,
    },
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }

    pub fn identity(&self) -> Option<&str> {
        match self {
            Self::SignedIn { identity } => Some(identity),
            Self::Anonymous => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationStatus {
    pub is_authenticated: bool,
    pub identity: Option<String>,
    pub has_session_cookies: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LoginOutcome {
    Success,
    Rejected(String),
    Captcha,
}

#[derive(Debug, Deserialize)]
struct LoginReply {
    message: Option<String>,
    email: Option<String>,
    act: Option<String>,
    #[serde(default)]
    error: Value,
    #[serde(default)]
    accountcaptchaerror: Value,
}

/// Reads a login reply. JSON is authoritative; a body that is not JSON falls
/// back to looking for the success phrase.
pub(crate) fn evaluate_login(body: &str, identity: &str) -> LoginOutcome {
    let Ok(reply) = serde_json::from_str::<LoginReply>(body) else {
        return if body.to_lowercase().contains("log in successful") {
            LoginOutcome::Success
        } else {
            LoginOutcome::Rejected("unrecognised login response".to_string())
        };
    };

    if is_one(&reply.accountcaptchaerror) {
        return LoginOutcome::Captcha;
    }
    if is_truthy(&reply.error) {
        let message = match &reply.error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return LoginOutcome::Rejected(message);
    }

    let accepted = reply.message.as_deref() == Some("Log In Successful")
        && reply.email.as_deref() == Some(identity)
        && reply.act.as_deref() == Some("login");
    if accepted {
        LoginOutcome::Success
    } else {
        LoginOutcome::Rejected(reply.message.unwrap_or_else(|| "login not confirmed".to_string()))
    }
}

fn is_one(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => s.trim() == "1",
        Value::Bool(b) => *b,
        _ => false,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMAIL: &str = "driver@example.com";

    #[test]
    fn exact_json_reply_signs_in() {
        let body = r#"{"message":"Log In Successful","email":"driver@example.com","act":"login"}"#;
        assert_eq!(evaluate_login(body, EMAIL), LoginOutcome::Success);
    }

    #[test]
    fn mismatched_email_is_rejected() {
        let body = r#"{"message":"Log In Successful","email":"other@example.com","act":"login"}"#;
        assert!(matches!(evaluate_login(body, EMAIL), LoginOutcome::Rejected(_)));
    }

    #[test]
    fn captcha_flag_wins() {
        let body = r#"{"accountcaptchaerror":1,"error":"Security code required"}"#;
        assert_eq!(evaluate_login(body, EMAIL), LoginOutcome::Captcha);
    }

    #[test]
    fn error_field_is_a_rejection() {
        let body = r#"{"error":"Incorrect password"}"#;
        assert_eq!(
            evaluate_login(body, EMAIL),
            LoginOutcome::Rejected("Incorrect password".to_string())
        );
    }

    #[test]
    fn text_fallback() {
        assert_eq!(evaluate_login("<p>Log In Successful</p>", EMAIL), LoginOutcome::Success);
        assert!(matches!(evaluate_login("<p>nope</p>", EMAIL), LoginOutcome::Rejected(_)));
    }

    #[test]
    fn state_accessors() {
        let state = AuthState::SignedIn {
            identity: EMAIL.to_string(),
        };
        assert!(state.is_authenticated());
        assert_eq!(state.identity(), Some(EMAIL));
        assert!(!AuthState::default().is_authenticated());
    }
}
