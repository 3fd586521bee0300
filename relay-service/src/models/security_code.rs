use serde_json::Value;

/// Raw `POST /send_code` fields.
///
/// Both fields are kept as JSON values: clients send the code as either a
/// string or a number.
#[derive(Debug, Default, Clone)]
pub struct SendCodeRequest {
    pub phone_number: Option<Value>,
    pub code: Option<Value>,
}

impl SendCodeRequest {
    /// Read `phoneNumber` and `code` from a JSON object. Any other JSON value
    /// carries neither field.
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Object(mut fields) => Self {
                phone_number: fields.remove("phoneNumber"),
                code: fields.remove("code"),
            },
            _ => Self::default(),
        }
    }

    /// Returns the request as a deliverable code, or `None` when either field
    /// is missing, null or empty.
    pub fn into_security_code(self) -> Option<SecurityCode> {
        match (self.phone_number, self.code) {
            (Some(phone), Some(code)) if is_present(&phone) && is_present(&code) => {
                Some(SecurityCode {
                    phone_number: render(&phone),
                    code: render(&code),
                })
            }
            _ => None,
        }
    }
}

/// A destination and code that passed the presence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityCode {
    pub phone_number: String,
    pub code: String,
}

impl SecurityCode {
    pub fn message_body(&self) -> String {
        format!("Your security code is: {}", self.code)
    }
}

/// Chat protocol the provider delivers over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatChannel {
    #[default]
    WhatsApp,
}

impl ChatChannel {
    /// Address a bare phone number on this channel.
    pub fn address(&self, phone_number: &str) -> String {
        format!("{}:{}", self, phone_number)
    }
}

impl std::fmt::Display for ChatChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatChannel::WhatsApp => write!(f, "whatsapp"),
        }
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
